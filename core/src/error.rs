use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("grid must have at least one row and one column, got {rows}x{cols}")]
    EmptyGrid { rows: usize, cols: usize },
    #[error("cell size must be positive, got {width}x{height}")]
    CellSize { width: f32, height: f32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DealError {
    #[error("permutation has {found} entries, board has {expected} cells")]
    Length { expected: usize, found: usize },
    #[error("home index {home} at cell {index} is out of range")]
    OutOfRange { home: usize, index: usize },
    #[error("home index {home} is dealt twice")]
    Duplicate { home: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("unsupported snapshot version {found}, expected {expected}")]
    Version { expected: u32, found: u32 },
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Deal(#[from] DealError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("snapshot encode failed: {0}")]
    Encode(String),
    #[error("snapshot decode failed: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("level catalog has no entries")]
    EmptyCatalog,
    #[error("level {index} ({label}) has an empty grid {rows}x{cols}")]
    EmptyLevel {
        index: usize,
        label: String,
        rows: usize,
        cols: usize,
    },
    #[error("field size must be positive, got {width}x{height}")]
    Field { width: f32, height: f32 },
}
