//! Segment chain of the worm and its movement rules.

use std::mem;

use worm_core::{CellCoord, CellState, Heading, OutOfBounds, SegmentSnapshot};

use crate::grid::Grid;

#[derive(Clone, Copy, Debug)]
struct Segment {
    cell: CellCoord,
    heading: Heading,
    pending: Option<Heading>,
}

/// Result of advancing the whole chain by one move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Advance {
    /// Every segment moved.
    Moved {
        /// Cell the head left.
        from: CellCoord,
        /// Cell the head entered.
        to: CellCoord,
        /// The head entered a prize cell and the chain grew by one segment.
        consumed_prize: bool,
    },
    /// The head hit an obstacle; nothing moved.
    Collided {
        /// Cell the head attempted to enter, or its own cell at the board edge.
        cell: CellCoord,
        /// State of the blocking cell.
        obstacle: CellState,
    },
}

/// Ordered segments, head first. Never empty once spawned.
#[derive(Clone, Debug)]
pub(crate) struct Chain {
    segments: Vec<Segment>,
}

impl Chain {
    /// Lays out `length` segments trailing behind `head`, all facing `heading`.
    pub(crate) fn spawn(
        grid: &mut Grid,
        head: CellCoord,
        heading: Heading,
        length: u32,
    ) -> Result<Self, OutOfBounds> {
        let capacity = usize::try_from(length).unwrap_or(0);
        let mut segments = Vec::with_capacity(capacity);
        let mut cell = head;

        for ordinal in 0..length {
            if ordinal > 0 {
                cell = cell
                    .step(heading.opposite())
                    .ok_or_else(|| grid.out_of_bounds(cell))?;
            }
            let state = if ordinal == 0 {
                CellState::WormHead
            } else {
                CellState::WormPart
            };
            grid.set(cell, state)?;
            segments.push(Segment {
                cell,
                heading,
                pending: None,
            });
        }

        Ok(Self { segments })
    }

    /// Queues a heading on the head; applied on its next move.
    pub(crate) fn steer(&mut self, heading: Heading) {
        if let Some(head) = self.segments.first_mut() {
            head.pending = Some(heading);
        }
    }

    /// Moves every segment one cell, head to tail.
    ///
    /// Each segment commits before its successor moves, so a successor always
    /// enters the cell its predecessor just vacated. Growth keeps the cell the
    /// tail vacated, so no cell outside the chain's path is ever written.
    /// Stepping off the board counts as hitting the wall and reports the
    /// head's own cell, since no coordinate exists past the edge. Yields
    /// `None` for an empty chain.
    pub(crate) fn advance(&mut self, grid: &mut Grid) -> Result<Option<Advance>, OutOfBounds> {
        let tail_before = self.segments.last().copied();
        let mut head_move = None;
        let mut consumed_prize = false;

        for (index, segment) in self.segments.iter_mut().enumerate() {
            let is_head = index == 0;
            let heading = segment.pending.unwrap_or(segment.heading);
            let from = segment.cell;

            let Some((to, state)) = grid.neighbour(from, heading) else {
                return Ok(Some(Advance::Collided {
                    cell: from,
                    obstacle: CellState::Wall,
                }));
            };
            if state.is_obstacle() {
                return Ok(Some(Advance::Collided {
                    cell: to,
                    obstacle: state,
                }));
            }

            grid.set(from, CellState::Empty)?;
            segment.heading = heading;
            segment.cell = to;

            let occupant = if is_head {
                CellState::WormHead
            } else {
                CellState::WormPart
            };
            grid.set(to, occupant)?;

            if is_head {
                consumed_prize = state == CellState::Prize;
                head_move = Some(Advance::Moved {
                    from,
                    to,
                    consumed_prize,
                });
            }
        }

        if consumed_prize {
            if let Some(tail) = tail_before {
                self.grow(grid, tail)?;
            }
        }
        self.relay_pending();
        Ok(head_move)
    }

    /// Number of segments, head included.
    pub(crate) fn len(&self) -> u32 {
        u32::try_from(self.segments.len()).unwrap_or(u32::MAX)
    }

    pub(crate) fn tail_cell(&self) -> Option<CellCoord> {
        self.segments.last().map(|segment| segment.cell)
    }

    pub(crate) fn snapshots(&self) -> Vec<SegmentSnapshot> {
        self.segments
            .iter()
            .zip(1u32..)
            .map(|(segment, ordinal)| SegmentSnapshot {
                ordinal,
                cell: segment.cell,
                heading: segment.heading,
                pending: segment.pending,
            })
            .collect()
    }

    /// Appends a segment where the tail stood before this move.
    ///
    /// The new segment keeps the tail's old heading; the relay that follows
    /// hands it the tail's pending turn, if any.
    fn grow(&mut self, grid: &mut Grid, tail_before: Segment) -> Result<(), OutOfBounds> {
        grid.set(tail_before.cell, CellState::WormPart)?;
        self.segments.push(Segment {
            cell: tail_before.cell,
            heading: tail_before.heading,
            pending: None,
        });
        Ok(())
    }

    /// Hands every pending heading one segment toward the tail.
    fn relay_pending(&mut self) {
        let mut carried = None;
        for segment in &mut self.segments {
            carried = mem::replace(&mut segment.pending, carried);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_on(columns: u32, rows: u32, length: u32) -> (Grid, Chain) {
        let mut grid = Grid::new(columns, rows);
        let chain = Chain::spawn(&mut grid, CellCoord::new(5, 3), Heading::Right, length)
            .expect("worm fits");
        let _ = grid.drain_changes();
        (grid, chain)
    }

    fn cells(chain: &Chain) -> Vec<CellCoord> {
        chain.snapshots().iter().map(|segment| segment.cell).collect()
    }

    #[test]
    fn spawn_trails_opposite_to_heading() {
        let (grid, chain) = spawn_on(10, 6, 3);
        assert_eq!(
            cells(&chain),
            vec![
                CellCoord::new(5, 3),
                CellCoord::new(4, 3),
                CellCoord::new(3, 3)
            ]
        );
        assert_eq!(grid.get(CellCoord::new(5, 3)), Ok(CellState::WormHead));
        assert_eq!(grid.get(CellCoord::new(3, 3)), Ok(CellState::WormPart));
    }

    #[test]
    fn advance_logs_vacate_then_occupy_head_to_tail() {
        let (mut grid, mut chain) = spawn_on(10, 6, 2);

        let outcome = chain.advance(&mut grid).expect("in bounds");

        assert_eq!(
            outcome,
            Some(Advance::Moved {
                from: CellCoord::new(5, 3),
                to: CellCoord::new(6, 3),
                consumed_prize: false,
            })
        );
        let logged: Vec<_> = grid
            .drain_changes()
            .into_iter()
            .map(|change| (change.cell.column(), change.state))
            .collect();
        assert_eq!(
            logged,
            vec![
                (5, CellState::Empty),
                (6, CellState::WormHead),
                (4, CellState::Empty),
                (5, CellState::WormPart),
            ]
        );
    }

    #[test]
    fn reversal_collides_with_the_neck() {
        let (mut grid, mut chain) = spawn_on(10, 6, 3);
        let before = cells(&chain);
        chain.steer(Heading::Left);

        let outcome = chain.advance(&mut grid).expect("in bounds");

        assert_eq!(
            outcome,
            Some(Advance::Collided {
                cell: CellCoord::new(4, 3),
                obstacle: CellState::WormPart,
            })
        );
        assert_eq!(cells(&chain), before);
        assert!(grid.drain_changes().is_empty());
    }

    #[test]
    fn pending_heading_travels_one_segment_per_move() {
        let (mut grid, mut chain) = spawn_on(10, 8, 3);
        chain.steer(Heading::Bottom);

        let _ = chain.advance(&mut grid).expect("in bounds");
        let headings: Vec<_> = chain.snapshots().iter().map(|s| s.heading).collect();
        assert_eq!(headings, vec![Heading::Bottom, Heading::Right, Heading::Right]);

        let _ = chain.advance(&mut grid).expect("in bounds");
        let headings: Vec<_> = chain.snapshots().iter().map(|s| s.heading).collect();
        assert_eq!(headings, vec![Heading::Bottom, Heading::Bottom, Heading::Right]);

        let _ = chain.advance(&mut grid).expect("in bounds");
        assert!(chain
            .snapshots()
            .iter()
            .all(|segment| segment.heading == Heading::Bottom && segment.pending.is_none()));
        assert_eq!(
            cells(&chain),
            vec![
                CellCoord::new(5, 6),
                CellCoord::new(5, 5),
                CellCoord::new(5, 4)
            ]
        );
    }

    #[test]
    fn eating_keeps_the_cell_the_tail_vacated() {
        let (mut grid, mut chain) = spawn_on(10, 6, 2);
        grid.set(CellCoord::new(6, 3), CellState::Prize)
            .expect("interior cell");
        grid.set(CellCoord::new(3, 3), CellState::Prize)
            .expect("interior cell");

        let outcome = chain.advance(&mut grid).expect("in bounds");

        assert!(matches!(
            outcome,
            Some(Advance::Moved {
                consumed_prize: true,
                ..
            })
        ));
        assert_eq!(chain.len(), 3);
        assert_eq!(
            cells(&chain),
            vec![
                CellCoord::new(6, 3),
                CellCoord::new(5, 3),
                CellCoord::new(4, 3)
            ]
        );
        assert_eq!(grid.get(CellCoord::new(3, 3)), Ok(CellState::Prize));
        assert_eq!(grid.get(CellCoord::new(4, 3)), Ok(CellState::WormPart));
        assert!(grid
            .drain_changes()
            .iter()
            .all(|change| change.cell != CellCoord::new(3, 3)));
    }

    #[test]
    fn single_segment_grows_into_the_cell_it_left() {
        let (mut grid, mut chain) = spawn_on(10, 8, 1);
        grid.set(CellCoord::new(5, 4), CellState::Prize)
            .expect("interior cell");
        chain.steer(Heading::Bottom);

        let _ = chain.advance(&mut grid).expect("in bounds");

        let snapshots = chain.snapshots();
        assert_eq!(cells(&chain), vec![CellCoord::new(5, 4), CellCoord::new(5, 3)]);
        assert_eq!(snapshots[1].heading, Heading::Right);
        assert_eq!(snapshots[1].pending, Some(Heading::Bottom));
        assert_eq!(grid.get(CellCoord::new(5, 3)), Ok(CellState::WormPart));

        let _ = chain.advance(&mut grid).expect("in bounds");
        assert_eq!(cells(&chain), vec![CellCoord::new(5, 5), CellCoord::new(5, 4)]);
    }

    #[test]
    fn stepping_off_the_board_reports_the_head_cell() {
        let mut grid = Grid::new(10, 6);
        let mut chain = Chain::spawn(&mut grid, CellCoord::new(0, 3), Heading::Left, 1)
            .expect("edge cell is on the board");

        let outcome = chain.advance(&mut grid).expect("in bounds");

        assert_eq!(
            outcome,
            Some(Advance::Collided {
                cell: CellCoord::new(0, 3),
                obstacle: CellState::Wall,
            })
        );
    }
}
