use rkyv::{Archive, Deserialize, Serialize};

pub const SNAPSHOT_VERSION: u32 = 1;

/// The facts a saved board depends on: grid size and which home index sits
/// on each cell.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub version: u32,
    pub level: u32,
    pub seed: u32,
    pub rows: u32,
    pub cols: u32,
    pub homes: Vec<u32>,
    pub moves: u32,
}

impl BoardSnapshot {
    pub fn homes_usize(&self) -> Vec<usize> {
        self.homes.iter().map(|home| *home as usize).collect()
    }
}
