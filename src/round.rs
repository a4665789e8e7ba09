use chrono::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

/// Round lifecycle. Valid transitions:
/// - Ready -> Active (first reveal)
/// - Ready -> Lost (first reveal hits a mine)
/// - Active -> Won
/// - Active -> Lost
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RoundState {
    Ready,
    Active,
    Won,
    Lost,
}

impl RoundState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for RoundState {
    fn default() -> Self {
        Self::Ready
    }
}

/// Outcome of a reveal gesture.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Opened,
    Exploded,
    Solved,
}

impl RevealOutcome {
    /// Whether this outcome could have caused an update to the board.
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Opened => true,
            Exploded => true,
            Solved => true,
        }
    }
}

/// Outcome of a flag gesture.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FlagOutcome {
    NoChange,
    Placed,
    Removed,
}

impl FlagOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// One game from first gesture to win or loss. Turns the two logical
/// gestures into board commands, enforces the flag budget (one flag per
/// mine), and runs the end-of-round flow: mark the exploded mine, reveal
/// the whole board, stop accepting moves.
#[derive(Debug, Serialize, Deserialize)]
pub struct Round {
    board: Board,
    state: RoundState,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
}

impl Round {
    pub fn new(rows: Coord, cols: Coord, mines: CellCount) -> Result<Self> {
        Ok(Self::with_board(Board::new(rows, cols, mines)?))
    }

    /// Wraps an existing board, for fixed layouts in replays and tests.
    pub fn with_board(board: Board) -> Self {
        Self {
            board,
            state: Default::default(),
            started_at: None,
            ended_at: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Registers an observer on the underlying board.
    pub fn subscribe(&mut self, listener: impl FnMut(CellChange) + 'static) {
        self.board.subscribe(listener);
    }

    /// Flags still available; placing one per mine exhausts the budget.
    pub fn flags_left(&self) -> CellCount {
        self.board
            .mine_count()
            .saturating_sub(self.board.count_flagged())
    }

    /// Seconds since the first reveal, 0 if the round has not started.
    pub fn elapsed_secs(&self) -> u32 {
        if let Some(started_at) = self.started_at {
            (self.ended_at.unwrap_or_else(Utc::now) - started_at)
                .num_seconds()
                .max(0) as u32
        } else {
            0
        }
    }

    /// The reveal gesture (left click). A hidden cell is revealed: a mine
    /// loses the round, an empty cell cascades into its region. On an
    /// already-revealed cell the solved check runs and a fully flagged
    /// board wins. Flagged cells ignore the gesture.
    pub fn reveal_cell(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        use RevealOutcome::*;

        let coords = self.board.validate_coords(coords)?;
        self.check_not_finished()?;
        let cell = self.board.cell_at(coords);

        if cell.is_hidden() {
            self.board.reveal(coords)?;
            if cell.is_mined() {
                self.board.mark_exploded(coords)?;
                self.finish(false);
                Ok(Exploded)
            } else {
                if cell.is_empty() {
                    self.board.cascade_reveal(coords)?;
                }
                self.mark_started();
                Ok(Opened)
            }
        } else if cell.is_revealed() {
            if self.board.is_solved() {
                self.finish(true);
                Ok(Solved)
            } else {
                Ok(NoChange)
            }
        } else {
            Ok(NoChange)
        }
    }

    /// The flag gesture (right click): place a flag on a hidden cell while
    /// the budget lasts, or lift an existing flag.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<FlagOutcome> {
        use FlagOutcome::*;

        let coords = self.board.validate_coords(coords)?;
        self.check_not_finished()?;
        let cell = self.board.cell_at(coords);

        if cell.is_hidden() && self.flags_left() > 0 {
            self.board.set_flag(coords)?;
            Ok(Placed)
        } else if cell.is_flagged() {
            self.board.clear_flag(coords)?;
            Ok(Removed)
        } else {
            Ok(NoChange)
        }
    }

    fn mark_started(&mut self) {
        if matches!(self.state, RoundState::Ready) {
            let now = Utc::now();
            log::debug!("round started at {}", now);
            self.started_at.replace(now);
            self.state = RoundState::Active;
        }
    }

    fn finish(&mut self, won: bool) {
        self.state = if won {
            RoundState::Won
        } else {
            RoundState::Lost
        };
        let now = Utc::now();
        self.ended_at.replace(now);
        if self.started_at.is_none() {
            self.started_at.replace(now);
        }
        log::debug!("round ended at {}, won: {}", now, won);
        self.board.reveal_all();
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.state.is_finished() {
            Err(BoardError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}
