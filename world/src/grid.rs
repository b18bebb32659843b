//! Dense cell grid that records every committed write.

use std::mem;

use worm_core::{BoardView, CellChange, CellCoord, CellState, Heading, OutOfBounds};

/// Row-major grid of cell states plus the log of writes since the last drain.
#[derive(Clone, Debug)]
pub(crate) struct Grid {
    columns: u32,
    rows: u32,
    cells: Vec<CellState>,
    changes: Vec<CellChange>,
}

impl Grid {
    /// Builds the wall ring, then clears the interior.
    ///
    /// Every write is logged so the first drain describes the whole board.
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        let mut grid = Self {
            columns,
            rows,
            cells: vec![CellState::Empty; capacity],
            changes: Vec::with_capacity(capacity),
        };

        for walls in [true, false] {
            for row in 0..rows {
                for column in 0..columns {
                    let cell = CellCoord::new(column, row);
                    if grid.is_border(cell) != walls {
                        continue;
                    }
                    let state = if walls {
                        CellState::Wall
                    } else {
                        CellState::Empty
                    };
                    if let Some(index) = grid.index(cell) {
                        grid.commit(index, cell, state);
                    }
                }
            }
        }

        grid
    }

    pub(crate) fn get(&self, cell: CellCoord) -> Result<CellState, OutOfBounds> {
        self.index(cell)
            .map(|index| self.cells[index])
            .ok_or_else(|| self.out_of_bounds(cell))
    }

    pub(crate) fn set(&mut self, cell: CellCoord, state: CellState) -> Result<(), OutOfBounds> {
        let index = self.index(cell).ok_or_else(|| self.out_of_bounds(cell))?;
        debug_assert!(
            state == CellState::Wall || !self.is_border(cell),
            "the wall ring is immutable"
        );
        self.commit(index, cell, state);
        Ok(())
    }

    /// Looks one step past `cell`; `None` when that step leaves the board.
    pub(crate) fn neighbour(
        &self,
        cell: CellCoord,
        heading: Heading,
    ) -> Option<(CellCoord, CellState)> {
        let next = cell.step(heading)?;
        self.get(next).ok().map(|state| (next, state))
    }

    pub(crate) fn drain_changes(&mut self) -> Vec<CellChange> {
        mem::take(&mut self.changes)
    }

    pub(crate) fn first_empty(&self) -> Option<CellCoord> {
        self.view()
            .iter()
            .find(|(_, state)| *state == CellState::Empty)
            .map(|(cell, _)| cell)
    }

    pub(crate) fn view(&self) -> BoardView<'_> {
        BoardView::new(&self.cells, self.columns, self.rows)
    }

    pub(crate) const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    pub(crate) fn out_of_bounds(&self, cell: CellCoord) -> OutOfBounds {
        OutOfBounds {
            cell,
            columns: self.columns,
            rows: self.rows,
        }
    }

    const fn is_border(&self, cell: CellCoord) -> bool {
        cell.column() == 0
            || cell.row() == 0
            || cell.column() + 1 == self.columns
            || cell.row() + 1 == self.rows
    }

    fn commit(&mut self, index: usize, cell: CellCoord, state: CellState) {
        self.cells[index] = state;
        self.changes.push(CellChange::new(cell, state));
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
