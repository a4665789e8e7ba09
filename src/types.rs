use ndarray::Array2;

/// Linear dimension, used for row/column indices and board width/height.
pub type Coord = u8;

/// Area dimension, used for mine and cell counts.
pub type CellCount = u16;

/// Shorthand for a `(row, col)` position.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// The 8 neighbor offsets as `(row, col)` deltas, in the canonical
/// enumeration order relied on for deterministic replays.
const NEIGHBOR_OFFSETS: [(i8, i8); 8] = [
    (0, 1),   // right
    (0, -1),  // left
    (1, 0),   // down
    (1, 1),   // down-right
    (1, -1),  // down-left
    (-1, 0),  // up
    (-1, 1),  // up-right
    (-1, -1), // up-left
];

/// Applies `offset` to `center`, returning a value only while it stays
/// inside `[0, rows) x [0, cols)`. No wraparound.
fn shift((row, col): Coord2, (dr, dc): (i8, i8), (rows, cols): Coord2) -> Option<Coord2> {
    let row = row.checked_add_signed(dr)?;
    let col = col.checked_add_signed(dc)?;
    if row < rows && col < cols {
        Some((row, col))
    } else {
        None
    }
}

/// Iterator over the up-to-8 existing neighbors of a cell.
#[derive(Debug)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    offsets: core::slice::Iter<'static, (i8, i8)>,
}

impl NeighborIter {
    pub(crate) fn new(center: Coord2, bounds: Coord2) -> Self {
        Self {
            center,
            bounds,
            offsets: NEIGHBOR_OFFSETS.iter(),
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let &offset = self.offsets.next()?;
            if let Some(coords) = shift(self.center, offset, self.bounds) {
                return Some(coords);
            }
        }
    }
}

pub trait NeighborIterExt {
    fn iter_neighbors(&self, center: Coord2) -> NeighborIter;
}

impl<T> NeighborIterExt for Array2<T> {
    fn iter_neighbors(&self, center: Coord2) -> NeighborIter {
        let dim = self.dim();
        let bounds = (dim.0.try_into().unwrap(), dim.1.try_into().unwrap());
        NeighborIter::new(center, bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_cell_yields_all_neighbors_in_canonical_order() {
        let neighbors: Vec<Coord2> = NeighborIter::new((1, 1), (3, 3)).collect();

        assert_eq!(
            neighbors,
            vec![
                (1, 2),
                (1, 0),
                (2, 1),
                (2, 2),
                (2, 0),
                (0, 1),
                (0, 2),
                (0, 0),
            ]
        );
    }

    #[test]
    fn corner_cell_skips_out_of_bounds_offsets() {
        let neighbors: Vec<Coord2> = NeighborIter::new((0, 0), (3, 3)).collect();

        assert_eq!(neighbors, vec![(0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn single_cell_board_has_no_neighbors() {
        assert_eq!(NeighborIter::new((0, 0), (1, 1)).count(), 0);
    }
}
