use rkyv::rancor::Error;
use rkyv::util::AlignedVec;

use crate::error::CodecError;
use crate::snapshot::BoardSnapshot;

pub fn encode_snapshot(snapshot: &BoardSnapshot) -> Result<Vec<u8>, CodecError> {
    rkyv::to_bytes::<Error>(snapshot)
        .map(|bytes| bytes.into_vec())
        .map_err(|err| CodecError::Encode(err.to_string()))
}

pub fn decode_snapshot(bytes: &[u8]) -> Result<BoardSnapshot, CodecError> {
    // Archived data must be aligned; file and network buffers are not.
    let mut aligned = AlignedVec::<16>::with_capacity(bytes.len());
    aligned.extend_from_slice(bytes);
    rkyv::from_bytes::<BoardSnapshot, Error>(&aligned)
        .map_err(|err| CodecError::Decode(err.to_string()))
}
