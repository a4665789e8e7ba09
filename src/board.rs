use std::collections::VecDeque;

use hashbrown::HashSet;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// The full grid of cells plus generation, cascade reveal, and the
/// aggregate win-condition check. Sole owner of every [`Cell`]; all
/// mutations go through it so observers see each state change.
#[derive(Debug, Serialize, Deserialize)]
pub struct Board {
    config: BoardConfig,
    cells: Array2<Cell>,
    #[serde(skip)]
    observers: ChangeHub,
}

impl Board {
    /// Generates a board with uniformly random mine placement.
    pub fn new(rows: Coord, cols: Coord, mines: CellCount) -> Result<Self> {
        Self::with_placer(rows, cols, mines, RandomPlacer::from_entropy())
    }

    /// Generates a board with the given placement strategy.
    pub fn with_placer(
        rows: Coord,
        cols: Coord,
        mines: CellCount,
        placer: impl MinePlacer,
    ) -> Result<Self> {
        let config = BoardConfig::new(rows, cols, mines)?;
        let mine_coords = placer.pick_mines(config);
        Self::build(config, &mine_coords)
    }

    /// Builds a board with mines at exactly the given cells, for replays and
    /// tests. Out-of-range or repeated coordinates are rejected.
    pub fn from_mine_coords(rows: Coord, cols: Coord, mine_coords: &[Coord2]) -> Result<Self> {
        let mines = mine_coords
            .len()
            .try_into()
            .map_err(|_| BoardError::TooManyMines)?;
        let config = BoardConfig::new(rows, cols, mines)?;
        Self::build(config, mine_coords)
    }

    fn build(config: BoardConfig, mine_coords: &[Coord2]) -> Result<Self> {
        let shape = (config.rows as usize, config.cols as usize);
        let mut cells =
            Array2::from_shape_fn(shape, |(row, col)| Cell::new(row as Coord, col as Coord));

        for &(row, col) in mine_coords {
            if row >= config.rows || col >= config.cols {
                return Err(BoardError::InvalidCoords);
            }
            let cell = &mut cells[(row, col).to_nd_index()];
            if cell.is_mined() {
                return Err(BoardError::InvalidCoords);
            }
            cell.set_mine();
        }

        // Adjacency pass: every mined cell bumps each non-mined neighbor,
        // leaving it with the count of mines it touches.
        for &coords in mine_coords {
            for pos in cells.iter_neighbors(coords) {
                let neighbor = &mut cells[pos.to_nd_index()];
                if !neighbor.is_mined() {
                    neighbor.set_value(neighbor.value() + 1);
                }
            }
        }

        log::debug!(
            "generated {}x{} board with {} mines",
            config.rows,
            config.cols,
            config.mines
        );
        Ok(Self {
            config,
            cells,
            observers: ChangeHub::default(),
        })
    }

    pub fn config(&self) -> BoardConfig {
        self.config
    }

    pub const fn rows(&self) -> Coord {
        self.config.rows
    }

    pub const fn cols(&self) -> Coord {
        self.config.cols
    }

    pub const fn size(&self) -> Coord2 {
        (self.config.rows, self.config.cols)
    }

    pub const fn mine_count(&self) -> CellCount {
        self.config.mines
    }

    pub const fn total_cells(&self) -> CellCount {
        self.config.total_cells()
    }

    /// The cell at `coords`, or `None` outside the board. Edge neighbors are
    /// an expected case, not an error.
    pub fn cell(&self, coords: Coord2) -> Option<&Cell> {
        self.contains(coords)
            .then(|| &self.cells[coords.to_nd_index()])
    }

    /// Copy of the cell at `coords`. Panics out of bounds; use
    /// [`Board::cell`] for checked lookup.
    pub fn cell_at(&self, coords: Coord2) -> Cell {
        self.cells[coords.to_nd_index()]
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.contains(coords) {
            Ok(coords)
        } else {
            Err(BoardError::InvalidCoords)
        }
    }

    fn contains(&self, (row, col): Coord2) -> bool {
        row < self.config.rows && col < self.config.cols
    }

    /// Coordinates of the up-to-8 existing neighbors, in canonical order.
    pub fn neighbors(&self, coords: Coord2) -> NeighborIter {
        self.cells.iter_neighbors(coords)
    }

    /// The existing neighboring cells, in canonical order.
    pub fn neighbor_cells(&self, coords: Coord2) -> SmallVec<[&Cell; 8]> {
        self.neighbors(coords)
            .map(|pos| &self.cells[pos.to_nd_index()])
            .collect()
    }

    /// Registers an observer invoked once per actual cell state change.
    pub fn subscribe(&mut self, listener: impl FnMut(CellChange) + 'static) {
        self.observers.subscribe(listener);
    }

    pub fn count_flagged(&self) -> CellCount {
        self.cells
            .iter()
            .filter(|cell| cell.is_flagged())
            .count()
            .try_into()
            .unwrap()
    }

    /// True when the number of flagged mines equals the total mine count.
    /// Counting completed cells alone is sound only together with the flag
    /// budget the round enforces: with at most `mine_count` flags on the
    /// board, the count is reached exactly when every flag sits on a mine.
    pub fn is_solved(&self) -> bool {
        let completed: CellCount = self
            .cells
            .iter()
            .filter(|cell| cell.is_completed())
            .count()
            .try_into()
            .unwrap();
        completed == self.config.mines
    }

    /// Reveals one cell. Does not cascade; callers decide based on the
    /// cell's content (see [`Board::cascade_reveal`]).
    pub fn reveal(&mut self, coords: Coord2) -> Result<ChangeOutcome> {
        let coords = self.validate_coords(coords)?;
        let outcome = self.cells[coords.to_nd_index()].reveal();
        self.notify(coords, ChangeKind::Revealed, outcome);
        Ok(outcome)
    }

    /// Flags a cell. Valid from hidden; the caller checks the predicate
    /// first, the model stays minimal.
    pub fn set_flag(&mut self, coords: Coord2) -> Result<ChangeOutcome> {
        let coords = self.validate_coords(coords)?;
        let outcome = self.cells[coords.to_nd_index()].set_flag();
        self.notify(coords, ChangeKind::Flagged, outcome);
        Ok(outcome)
    }

    /// Removes a flag, returning the cell to hidden.
    pub fn clear_flag(&mut self, coords: Coord2) -> Result<ChangeOutcome> {
        let coords = self.validate_coords(coords)?;
        let outcome = self.cells[coords.to_nd_index()].clear_flag();
        self.notify(coords, ChangeKind::Unflagged, outcome);
        Ok(outcome)
    }

    /// Marks the one mine whose reveal ended the round in a loss.
    pub fn mark_exploded(&mut self, coords: Coord2) -> Result<ChangeOutcome> {
        let coords = self.validate_coords(coords)?;
        let outcome = self.cells[coords.to_nd_index()].mark_exploded();
        self.notify(coords, ChangeKind::Exploded, outcome);
        Ok(outcome)
    }

    /// Starting from an already-revealed empty cell, reveals every connected
    /// hidden cell, recursing through empty ones and stopping at numbered
    /// cells and board edges. Flagged cells are skipped. Returns the number
    /// of newly revealed cells; running it again from the same origin
    /// reveals nothing further.
    pub fn cascade_reveal(&mut self, coords: Coord2) -> Result<CellCount> {
        let coords = self.validate_coords(coords)?;

        let mut visited: HashSet<Coord2> = HashSet::new();
        visited.insert(coords);
        let mut to_visit: VecDeque<Coord2> = self
            .neighbors(coords)
            .filter(|&pos| self.cells[pos.to_nd_index()].is_hidden())
            .collect();
        let mut opened: CellCount = 0;

        while let Some(pos) = to_visit.pop_front() {
            if !visited.insert(pos) {
                continue;
            }

            let cell = self.cells[pos.to_nd_index()];
            if !cell.is_hidden() {
                // flagged or revealed since it was enqueued
                continue;
            }

            let outcome = self.cells[pos.to_nd_index()].reveal();
            self.notify(pos, ChangeKind::Revealed, outcome);
            opened += 1;
            log::trace!("cascade revealed {:?}, value {}", pos, cell.value());

            if cell.is_empty() {
                to_visit.extend(
                    self.neighbors(pos)
                        .filter(|&next| self.cells[next.to_nd_index()].is_hidden())
                        .filter(|next| !visited.contains(next)),
                );
            }
        }

        log::debug!("cascade from {:?} revealed {} cells", coords, opened);
        Ok(opened)
    }

    /// Forces every cell to revealed, used at round end to show the whole
    /// board. Cells already revealed emit nothing, so a second call is a
    /// no-op.
    pub fn reveal_all(&mut self) {
        for row in 0..self.config.rows {
            for col in 0..self.config.cols {
                let coords = (row, col);
                let outcome = self.cells[coords.to_nd_index()].reveal();
                self.notify(coords, ChangeKind::Revealed, outcome);
            }
        }
    }

    fn notify(&mut self, coords: Coord2, kind: ChangeKind, outcome: ChangeOutcome) {
        if outcome.has_update() {
            self.observers.emit(CellChange { coords, kind });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn board(size: Coord2, mines: &[Coord2]) -> Board {
        Board::from_mine_coords(size.0, size.1, mines).unwrap()
    }

    fn record_changes(board: &mut Board) -> Rc<RefCell<Vec<CellChange>>> {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        board.subscribe(move |change| sink.borrow_mut().push(change));
        changes
    }

    #[test]
    fn rejects_degenerate_shapes() {
        assert_eq!(Board::new(0, 5, 0).unwrap_err(), BoardError::InvalidDimensions);
        assert_eq!(Board::new(5, 0, 0).unwrap_err(), BoardError::InvalidDimensions);
        assert_eq!(Board::new(2, 2, 4).unwrap_err(), BoardError::TooManyMines);
        assert_eq!(Board::new(2, 2, 9).unwrap_err(), BoardError::TooManyMines);
    }

    #[test]
    fn rejects_out_of_range_and_repeated_mines() {
        assert_eq!(
            Board::from_mine_coords(2, 2, &[(2, 0)]).unwrap_err(),
            BoardError::InvalidCoords
        );
        assert_eq!(
            Board::from_mine_coords(3, 3, &[(1, 1), (1, 1)]).unwrap_err(),
            BoardError::InvalidCoords
        );
    }

    #[test]
    fn random_generation_places_exact_mine_count() {
        let board = Board::with_placer(8, 8, 10, RandomPlacer::new(42)).unwrap();

        let mine_cells = (0..8)
            .flat_map(|row| (0..8).map(move |col| (row, col)))
            .filter(|&coords| board.cell_at(coords).is_mined())
            .count();
        assert_eq!(mine_cells, 10);
    }

    #[test]
    fn every_value_equals_its_mined_neighbor_count() {
        let board = Board::with_placer(8, 8, 10, RandomPlacer::new(42)).unwrap();

        for row in 0..8 {
            for col in 0..8 {
                let cell = board.cell_at((row, col));
                if cell.is_mined() {
                    continue;
                }
                let mined_neighbors = board
                    .neighbor_cells((row, col))
                    .iter()
                    .filter(|neighbor| neighbor.is_mined())
                    .count() as i8;
                assert_eq!(cell.value(), mined_neighbors, "at ({row}, {col})");
            }
        }
    }

    #[test]
    fn center_mine_surrounds_itself_with_ones() {
        let board = board((3, 3), &[(1, 1)]);

        for neighbor in board.neighbor_cells((1, 1)) {
            assert_eq!(neighbor.value(), 1);
        }
        assert!(board.cell_at((1, 1)).is_mined());
    }

    #[test]
    fn dense_board_generates_with_one_safe_cell() {
        let board = Board::with_placer(3, 3, 8, RandomPlacer::new(1)).unwrap();

        let board = &board;
        let safe: Vec<Cell> = (0..3)
            .flat_map(|row| (0..3).map(move |col| board.cell_at((row, col))))
            .filter(|cell| !cell.is_mined())
            .collect();
        assert_eq!(safe.len(), 1);
        assert_eq!(safe[0].value(), board.neighbor_cells(safe[0].coords()).len() as i8);
    }

    #[test]
    fn cell_lookup_covers_bounds() {
        let board = board((2, 3), &[(0, 0)]);

        for row in 0..2 {
            for col in 0..3 {
                let cell = board.cell((row, col)).unwrap();
                assert_eq!(cell.coords(), (row, col));
            }
        }
        assert!(board.cell((2, 0)).is_none());
        assert!(board.cell((0, 3)).is_none());
        assert!(board.cell((255, 255)).is_none());
    }

    #[test]
    fn cascade_reveals_connected_empty_region_and_border() {
        // Mine in a corner: everything except the mine and its three
        // numbered neighbors is empty.
        let mut board = board((4, 4), &[(3, 3)]);

        board.reveal((0, 0)).unwrap();
        let opened = board.cascade_reveal((0, 0)).unwrap();

        // 16 cells - origin - mine = 14
        assert_eq!(opened, 14);
        assert!(board.cell_at((3, 3)).is_hidden());
        assert!(board.cell_at((2, 2)).is_revealed());
        assert_eq!(board.cell_at((2, 2)).value(), 1);
    }

    #[test]
    fn cascade_is_idempotent() {
        let mut board = board((4, 4), &[(3, 3)]);
        board.reveal((0, 0)).unwrap();
        board.cascade_reveal((0, 0)).unwrap();

        let changes = record_changes(&mut board);
        let opened = board.cascade_reveal((0, 0)).unwrap();

        assert_eq!(opened, 0);
        assert!(changes.borrow().is_empty());
    }

    #[test]
    fn cascade_skips_flagged_cells() {
        let mut board = board((3, 3), &[]);
        board.set_flag((1, 1)).unwrap();

        board.reveal((0, 0)).unwrap();
        board.cascade_reveal((0, 0)).unwrap();

        assert!(board.cell_at((1, 1)).is_flagged());
        assert!(board.cell_at((2, 2)).is_revealed());
    }

    #[test]
    fn reveal_all_is_idempotent() {
        let mut board = board((2, 2), &[(0, 0)]);
        board.set_flag((0, 0)).unwrap();

        board.reveal_all();
        for row in 0..2 {
            for col in 0..2 {
                assert!(board.cell_at((row, col)).is_revealed());
            }
        }

        let changes = record_changes(&mut board);
        board.reveal_all();
        assert!(changes.borrow().is_empty());
    }

    #[test]
    fn solved_when_flagged_mines_match_mine_count() {
        let mut board = board((2, 2), &[(0, 0)]);
        assert!(!board.is_solved());

        board.set_flag((0, 0)).unwrap();

        assert!(board.is_solved());
        assert_eq!(board.count_flagged(), 1);
    }

    #[test]
    fn misplaced_flag_does_not_solve() {
        let mut board = board((2, 2), &[(0, 0)]);

        board.set_flag((1, 1)).unwrap();

        assert!(!board.is_solved());
        assert_eq!(board.count_flagged(), 1);
    }

    #[test]
    fn flag_round_trip_emits_two_changes() {
        let mut board = board((2, 2), &[(0, 0)]);
        let changes = record_changes(&mut board);

        board.set_flag((1, 0)).unwrap();
        board.clear_flag((1, 0)).unwrap();

        assert!(board.cell_at((1, 0)).is_hidden());
        assert_eq!(
            *changes.borrow(),
            vec![
                CellChange {
                    coords: (1, 0),
                    kind: ChangeKind::Flagged
                },
                CellChange {
                    coords: (1, 0),
                    kind: ChangeKind::Unflagged
                },
            ]
        );
    }

    #[test]
    fn commands_reject_out_of_range_coordinates() {
        let mut board = board((2, 2), &[(0, 0)]);

        assert_eq!(board.reveal((5, 5)).unwrap_err(), BoardError::InvalidCoords);
        assert_eq!(board.set_flag((2, 0)).unwrap_err(), BoardError::InvalidCoords);
        assert_eq!(
            board.cascade_reveal((0, 9)).unwrap_err(),
            BoardError::InvalidCoords
        );
    }
}
