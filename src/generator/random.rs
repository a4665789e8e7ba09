use hashbrown::HashSet;
use rand::prelude::*;

use super::MinePlacer;
use crate::{BoardConfig, CellCount, Coord, Coord2};

/// Uniform placement by rejection sampling: draw a random cell among all
/// cells and retry when it was already picked. Expected O(mines) draws on
/// sparse boards; termination is guaranteed because a config never lets the
/// mine count reach the cell count.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RandomPlacer {
    seed: u64,
}

impl RandomPlacer {
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Placer with a seed drawn from the thread-local generator.
    pub fn from_entropy() -> Self {
        Self {
            seed: rand::rng().random(),
        }
    }
}

impl MinePlacer for RandomPlacer {
    fn pick_mines(self, config: BoardConfig) -> Vec<Coord2> {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let total = config.total_cells();
        let cols = config.cols as CellCount;

        let mut taken: HashSet<CellCount> = HashSet::with_capacity(config.mines as usize);
        let mut mines = Vec::with_capacity(config.mines as usize);
        while mines.len() < config.mines as usize {
            let index: CellCount = rng.random_range(0..total);
            if taken.insert(index) {
                mines.push(((index / cols) as Coord, (index % cols) as Coord));
            }
        }
        log::trace!(
            "picked {} of {} cells as mines, seed {}",
            mines.len(),
            total,
            self.seed
        );
        mines
    }
}
