pub use random::*;

mod random;

use crate::{BoardConfig, Coord2};

/// Strategy deciding which cells hold mines.
pub trait MinePlacer {
    /// Returns exactly `config.mines` distinct in-bounds coordinates.
    fn pick_mines(self, config: BoardConfig) -> Vec<Coord2>;
}
