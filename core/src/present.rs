use crate::grid::{GridSpec, Point};
use crate::hint::Hint;
use crate::piece::{ConnectionMask, PieceId};

/// Renderer/animator side of a session. Calls are fire-and-forget; nothing
/// a presenter does feeds back into board state.
pub trait Presenter {
    fn move_to(&mut self, piece: PieceId, position: Point, duration: f32);

    /// Each edge shows a border iff its connection bit is false.
    fn set_visual_state(&mut self, piece: PieceId, connections: ConnectionMask);

    fn show_hint(&mut self, _hint: &Hint) {}

    /// Completion side effects for pieces that gained an edge.
    fn on_connected(&mut self, _pieces: &[PieceId]) {}
}

pub fn border_visible(connections: ConnectionMask, dir: usize) -> bool {
    !connections.get(dir).copied().unwrap_or(false)
}

/// Produces one tile per home index; tile `i` belongs to home index `i`.
pub trait Slicer {
    type Tile;

    fn slice(&self, grid: &GridSpec) -> Vec<Self::Tile>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gesture {
    pub piece: PieceId,
    pub drag_delta: (f32, f32),
    pub pointer_up: Point,
}
