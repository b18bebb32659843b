//! Worm orchestration: speed gating and steering.

use worm_core::{CellCoord, GameConfig, Heading, OutOfBounds, SegmentSnapshot};

use crate::{
    chain::{Advance, Chain},
    grid::Grid,
};

/// Heading every worm starts a game with.
pub(crate) const START_HEADING: Heading = Heading::Right;

#[derive(Clone, Debug)]
pub(crate) struct Worm {
    chain: Chain,
    speed_divisor: u32,
    tick_counter: u32,
}

impl Worm {
    pub(crate) fn spawn(grid: &mut Grid, config: &GameConfig) -> Result<Self, OutOfBounds> {
        let chain = Chain::spawn(
            grid,
            config.start_cell(),
            START_HEADING,
            config.initial_length,
        )?;
        Ok(Self {
            chain,
            speed_divisor: config.level.speed_divisor().max(1),
            tick_counter: 0,
        })
    }

    /// Counts an external tick and moves the chain on every `speed_divisor`-th one.
    ///
    /// Returns `None` for ticks that do not move the worm.
    pub(crate) fn advance_tick(&mut self, grid: &mut Grid) -> Result<Option<Advance>, OutOfBounds> {
        self.tick_counter += 1;
        if self.tick_counter % self.speed_divisor != 0 {
            return Ok(None);
        }
        self.tick_counter = 0;
        self.chain.advance(grid)
    }

    /// Queues a heading on the head without checking it against the current one.
    pub(crate) fn set_direction(&mut self, heading: Heading) {
        self.chain.steer(heading);
    }

    pub(crate) fn len(&self) -> u32 {
        self.chain.len()
    }

    pub(crate) fn tail_cell(&self) -> Option<CellCoord> {
        self.chain.tail_cell()
    }

    pub(crate) fn snapshots(&self) -> Vec<SegmentSnapshot> {
        self.chain.snapshots()
    }
}
