use serde::{Deserialize, Serialize};

pub use board::*;
pub use cell::*;
pub use error::*;
pub use events::*;
pub use generator::*;
pub use round::*;
pub use types::*;

mod board;
mod cell;
mod error;
mod events;
mod generator;
mod round;
mod types;

/// Validated board shape: dimensions plus mine count.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub rows: Coord,
    pub cols: Coord,
    pub mines: CellCount,
}

impl BoardConfig {
    pub const fn new_unchecked(rows: Coord, cols: Coord, mines: CellCount) -> Self {
        Self { rows, cols, mines }
    }

    /// Rejects degenerate shapes outright: a zero dimension, or a mine
    /// count at or above the cell count, which would make placement
    /// impossible. Never silently capped.
    pub fn new(rows: Coord, cols: Coord, mines: CellCount) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(BoardError::InvalidDimensions);
        }
        if mines >= mult(rows, cols) {
            return Err(BoardError::TooManyMines);
        }
        Ok(Self::new_unchecked(rows, cols, mines))
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.rows, self.cols)
    }
}
