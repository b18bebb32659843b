//! Random prize placement.

use log::{debug, warn};
use rand::Rng;
use worm_core::{CellCoord, CellState, OutOfBounds};

use crate::grid::Grid;

/// Consecutive misses tolerated before falling back to a row-major scan.
const MAX_REJECTED_SAMPLES: u32 = 1_024;

/// Places up to `requested` prizes on empty cells and returns how many landed.
///
/// Cells are drawn uniformly over the whole board and redrawn until an empty
/// one turns up. Placement stops early once the board has no empty cell left.
pub(crate) fn scatter<R>(grid: &mut Grid, rng: &mut R, requested: u32) -> Result<u32, OutOfBounds>
where
    R: Rng,
{
    let mut placed = 0;
    while placed < requested {
        let Some(cell) = sample_empty(grid, rng) else {
            warn!("board filled up after {placed} of {requested} prizes");
            break;
        };
        grid.set(cell, CellState::Prize)?;
        placed += 1;
    }

    debug!("scattered {placed} prizes");
    Ok(placed)
}

fn sample_empty<R>(grid: &Grid, rng: &mut R) -> Option<CellCoord>
where
    R: Rng,
{
    let (columns, rows) = grid.dimensions();
    if columns == 0 || rows == 0 {
        return None;
    }

    for _ in 0..MAX_REJECTED_SAMPLES {
        let cell = CellCoord::new(rng.gen_range(0..columns), rng.gen_range(0..rows));
        if grid.get(cell) == Ok(CellState::Empty) {
            return Some(cell);
        }
    }

    let fallback = grid.first_empty();
    if fallback.is_some() {
        warn!("prize sampler fell back to scanning after {MAX_REJECTED_SAMPLES} misses");
    }
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn prizes_land_on_interior_empty_cells() {
        let mut grid = Grid::new(12, 9);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let placed = scatter(&mut grid, &mut rng, 15).expect("in bounds");

        assert_eq!(placed, 15);
        let view = grid.view();
        assert_eq!(view.count(CellState::Prize), 15);
        for (cell, state) in view.iter() {
            if view.is_border(cell) {
                assert_eq!(state, CellState::Wall);
            }
        }
    }

    #[test]
    fn crowded_board_is_filled_completely() {
        let mut grid = Grid::new(4, 4);
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let placed = scatter(&mut grid, &mut rng, 10).expect("in bounds");

        assert_eq!(placed, 4, "only the 2x2 interior can hold prizes");
        assert_eq!(grid.first_empty(), None);
    }

    #[test]
    fn same_seed_places_prizes_identically() {
        let place = || {
            let mut grid = Grid::new(20, 10);
            let mut rng = ChaCha8Rng::seed_from_u64(0xfeed);
            let _ = scatter(&mut grid, &mut rng, 12).expect("in bounds");
            grid.drain_changes()
        };
        assert_eq!(place(), place());
    }
}
