use std::fmt::Write;

use gridjig_core::grid::{DIR_DOWN, DIR_RIGHT};
use gridjig_core::present::border_visible;
use gridjig_core::{
    Cell, ConnectionMask, GridSpec, Hint, PieceId, Point, Presenter, Session, Slicer,
};

/// Two-character label per home index: column letter, row digit(s).
pub(crate) struct LabelSlicer;

impl Slicer for LabelSlicer {
    type Tile = String;

    fn slice(&self, grid: &GridSpec) -> Vec<String> {
        (0..grid.total())
            .map(|home| {
                let cell = grid.cell_at(home);
                let letter = (b'A' + (cell.col % 26) as u8) as char;
                format!("{letter}{}", cell.row + 1)
            })
            .collect()
    }
}

/// Terminal stand-in for the renderer: keeps the last position and border
/// state it was told about and draws from that.
pub(crate) struct TextPresenter {
    grid: GridSpec,
    tiles: Vec<String>,
    positions: Vec<Option<Point>>,
    masks: Vec<ConnectionMask>,
    verbose: bool,
}

impl TextPresenter {
    pub(crate) fn new(session: &Session, verbose: bool) -> Self {
        let grid = *session.grid();
        let total = grid.total();
        let mut presenter = Self {
            grid,
            tiles: LabelSlicer.slice(&grid),
            positions: vec![None; total],
            masks: vec![[false; 4]; total],
            verbose,
        };
        session.sync_presenter(&mut presenter);
        presenter
    }

    fn label(&self, piece: PieceId) -> &str {
        self.tiles.get(piece).map(String::as_str).unwrap_or("??")
    }

    fn piece_on(&self, cell: Cell) -> Option<PieceId> {
        self.positions
            .iter()
            .position(|pos| pos.map(|pos| self.grid.grid_position(pos)) == Some(cell))
    }

    pub(crate) fn render(&self) -> String {
        let mut out = String::new();
        let width = self.tiles.iter().map(String::len).max().unwrap_or(2);
        for row in 0..self.grid.rows() {
            let mut line = String::new();
            let mut under = String::new();
            for col in 0..self.grid.cols() {
                let piece = self.piece_on(Cell::new(row, col));
                let label = piece.map(|id| self.label(id)).unwrap_or("..");
                let mask = piece.map(|id| self.masks[id]).unwrap_or([false; 4]);
                let _ = write!(line, "{label:>width$}");
                if col + 1 < self.grid.cols() {
                    line.push_str(if border_visible(mask, DIR_RIGHT) { " | " } else { " = " });
                }
                let join = if border_visible(mask, DIR_DOWN) { "-" } else { "\"" };
                under.push_str(&join.repeat(width));
                if col + 1 < self.grid.cols() {
                    under.push_str("   ");
                }
            }
            let _ = writeln!(out, "{line}");
            if row + 1 < self.grid.rows() {
                let _ = writeln!(out, "{under}");
            }
        }
        out
    }

    pub(crate) fn describe_hint(&self, hint: &Hint) -> String {
        match hint {
            Hint::Swap { first, second } => {
                format!("swap {} and {}", self.label(*first), self.label(*second))
            }
            Hint::Relocate { piece, group, target, .. } => format!(
                "move the group of {} ({} pieces) so it lands on {target}",
                self.label(*piece),
                group.len()
            ),
            Hint::None => "no hint available".to_string(),
        }
    }
}

impl Presenter for TextPresenter {
    fn move_to(&mut self, piece: PieceId, position: Point, duration: f32) {
        if let Some(slot) = self.positions.get_mut(piece) {
            *slot = Some(position);
        }
        if self.verbose && duration > 0.0 {
            println!(
                "  {} -> {}",
                self.label(piece),
                self.grid.grid_position(position)
            );
        }
    }

    fn set_visual_state(&mut self, piece: PieceId, connections: ConnectionMask) {
        if let Some(slot) = self.masks.get_mut(piece) {
            *slot = connections;
        }
    }

    fn show_hint(&mut self, hint: &Hint) {
        println!("hint: {}", self.describe_hint(hint));
    }

    fn on_connected(&mut self, pieces: &[PieceId]) {
        if self.verbose {
            let labels: Vec<&str> = pieces.iter().map(|id| self.label(*id)).collect();
            println!("  connected: {}", labels.join(" "));
        }
    }
}
