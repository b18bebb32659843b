#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that picks the level for the next game.
//!
//! A won game raises the level by one. Players may also step the level up or
//! down between frames. The world applies the selection when the next game
//! starts.

use log::debug;
use worm_core::{Command, Event, GameStatus, Level};

/// Input snapshot distilled from adapter-provided menu actions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LevelInput {
    /// The player asked for a faster game.
    pub raise: bool,
    /// The player asked for a slower game.
    pub lower: bool,
}

impl LevelInput {
    /// Creates a new input descriptor with explicit field values.
    #[must_use]
    pub const fn new(raise: bool, lower: bool) -> Self {
        Self { raise, lower }
    }
}

/// Translates wins and menu input into level selection commands.
#[derive(Clone, Debug, Default)]
pub struct LevelProgression {
    wins: u32,
}

impl LevelProgression {
    /// Creates a new level progression system.
    #[must_use]
    pub const fn new() -> Self {
        Self { wins: 0 }
    }

    /// Games won since the system was created.
    #[must_use]
    pub const fn wins(&self) -> u32 {
        self.wins
    }

    /// Consumes world events and input, emitting at most one `SetLevel`.
    ///
    /// `selected` should mirror the world's `query::next_level`. Nothing is
    /// emitted when the resulting level equals it.
    pub fn handle(
        &mut self,
        events: &[Event],
        input: LevelInput,
        selected: Level,
        out: &mut Vec<Command>,
    ) {
        let mut level = selected;

        for event in events {
            if let Event::StatusChanged { transition } = event {
                if transition.to == GameStatus::YouWin {
                    self.wins = self.wins.saturating_add(1);
                    level = level.raised();
                }
            }
        }

        if input.raise {
            level = level.raised();
        }
        if input.lower {
            level = level.lowered();
        }

        if level != selected {
            debug!("level {} -> {}", selected.get(), level.get());
            out.push(Command::SetLevel { level });
        }
    }
}
