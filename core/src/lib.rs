pub mod codec;
pub mod config;
pub mod connectivity;
pub mod deal;
pub mod error;
pub mod grid;
pub mod hint;
pub mod mover;
pub mod occupancy;
pub mod piece;
pub mod present;
pub mod session;
pub mod snapshot;

pub use codec::{decode_snapshot, encode_snapshot};
pub use config::{LevelCatalog, LevelEntry, SessionRules};
pub use connectivity::{ConnectionProgress, ConnectivityEngine};
pub use error::{CodecError, ConfigError, DealError, GridError, SessionError};
pub use grid::{Cell, GridSpec, Point};
pub use hint::{Hint, HintEngine};
pub use mover::{Anchor, MoveOutcome, MovePlan, MovePolicy, MoveResolver, Placement};
pub use occupancy::Occupancy;
pub use piece::{ConnectionMask, Piece, PieceId};
pub use present::{Gesture, Presenter, Slicer};
pub use session::{MoveReport, Session};
pub use snapshot::{BoardSnapshot, SNAPSHOT_VERSION};
