use serde::{Deserialize, Serialize};

use crate::types::{Coord, Coord2};

/// Content sentinel for a mined cell. Every other cell holds its adjacent
/// mine count in `0..=8`.
pub const MINE: i8 = -1;

/// Player-visible state of a single cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    Hidden,
    Revealed,
    Flagged,
}

impl Default for CellState {
    fn default() -> Self {
        Self::Hidden
    }
}

/// Whether a transition actually changed anything; `Changed` is what gets
/// forwarded to observers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ChangeOutcome {
    NoChange,
    Changed,
}

impl ChangeOutcome {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// A single grid position: content value plus visibility state. Owned by the
/// board; carries its `(row, col)` handle for neighbor lookup through it.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    row: Coord,
    col: Coord,
    value: i8,
    state: CellState,
    exploded: bool,
}

impl Cell {
    pub(crate) fn new(row: Coord, col: Coord) -> Self {
        Self {
            row,
            col,
            value: 0,
            state: CellState::default(),
            exploded: false,
        }
    }

    pub const fn row(&self) -> Coord {
        self.row
    }

    pub const fn col(&self) -> Coord {
        self.col
    }

    /// Position of this cell inside its owning board.
    pub const fn coords(&self) -> Coord2 {
        (self.row, self.col)
    }

    pub const fn state(&self) -> CellState {
        self.state
    }

    /// Adjacent mine count, or [`MINE`] for a mined cell.
    pub const fn value(&self) -> i8 {
        self.value
    }

    pub const fn is_hidden(&self) -> bool {
        matches!(self.state, CellState::Hidden)
    }

    pub const fn is_revealed(&self) -> bool {
        matches!(self.state, CellState::Revealed)
    }

    pub const fn is_flagged(&self) -> bool {
        matches!(self.state, CellState::Flagged)
    }

    /// No mine here and none in any neighbor.
    pub const fn is_empty(&self) -> bool {
        self.value == 0
    }

    /// Touches at least one mine.
    pub const fn is_filled(&self) -> bool {
        self.value > 0
    }

    pub const fn is_mined(&self) -> bool {
        self.value == MINE
    }

    /// A mine the player has flagged.
    pub const fn is_completed(&self) -> bool {
        self.is_flagged() && self.is_mined()
    }

    /// Whether revealing this mine is what ended the round.
    pub const fn is_exploded(&self) -> bool {
        self.exploded
    }

    /// Callers only reveal hidden cells during play; the end-of-round
    /// board sweep also force-reveals flagged cells through here.
    pub(crate) fn reveal(&mut self) -> ChangeOutcome {
        self.set_state(CellState::Revealed)
    }

    pub(crate) fn set_flag(&mut self) -> ChangeOutcome {
        self.set_state(CellState::Flagged)
    }

    pub(crate) fn clear_flag(&mut self) -> ChangeOutcome {
        self.set_state(CellState::Hidden)
    }

    /// One-time content mutation during generation.
    pub(crate) fn set_mine(&mut self) {
        self.value = MINE;
    }

    /// Only the adjacency pass writes values.
    pub(crate) fn set_value(&mut self, value: i8) {
        self.value = value;
    }

    pub(crate) fn mark_exploded(&mut self) -> ChangeOutcome {
        if self.exploded {
            ChangeOutcome::NoChange
        } else {
            self.exploded = true;
            ChangeOutcome::Changed
        }
    }

    fn set_state(&mut self, state: CellState) -> ChangeOutcome {
        if self.state == state {
            ChangeOutcome::NoChange
        } else {
            self.state = state;
            ChangeOutcome::Changed
        }
    }
}
