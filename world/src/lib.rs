#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Worm.
//!
//! The [`World`] owns the bordered grid, the worm and the game status. Adapters
//! mutate it exclusively through [`apply`], read it through [`query`], and
//! collect what changed for painting through [`drain_changes`].

mod chain;
mod grid;
mod prizes;
mod worm;

use std::mem;

use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use worm_core::{
    CellChange, Changes, Command, ConfigError, Event, GameConfig, GameStatus, Level, OutOfBounds,
    StatusTransition, WELCOME_BANNER,
};

use crate::{chain::Advance, grid::Grid, worm::Worm};

/// Reasons a world cannot be created.
#[derive(Debug, Error)]
pub enum WorldError {
    /// The configuration was rejected before any state was built.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The initial worm or prizes could not be placed.
    #[error(transparent)]
    OutOfBounds(#[from] OutOfBounds),
}

/// State that lives exactly as long as one game.
#[derive(Debug)]
struct Session {
    grid: Grid,
    worm: Worm,
    status: GameStatus,
    level: Level,
    remaining_prizes: u32,
    tick_index: u64,
}

impl Session {
    fn start(config: &GameConfig, rng: &mut ChaCha8Rng) -> Result<Self, OutOfBounds> {
        let mut grid = Grid::new(config.columns, config.rows);
        let worm = Worm::spawn(&mut grid, config)?;
        let remaining_prizes = prizes::scatter(&mut grid, rng, config.prize_count())?;
        Ok(Self {
            grid,
            worm,
            status: GameStatus::Play,
            level: config.level,
            remaining_prizes,
            tick_index: 0,
        })
    }
}

/// Represents the authoritative Worm world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: GameConfig,
    next_level: Level,
    rng: ChaCha8Rng,
    session: Session,
    status_changes: Vec<StatusTransition>,
}

impl World {
    /// Validates the configuration and starts the first game.
    pub fn new(config: GameConfig) -> Result<Self, WorldError> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        let session = Session::start(&config, &mut rng)?;
        info!(
            "world created: {}x{} board, {} prizes, level {}",
            config.columns,
            config.rows,
            session.remaining_prizes,
            config.level.get()
        );

        Ok(Self {
            banner: WELCOME_BANNER,
            next_level: config.level,
            config,
            rng,
            session,
            status_changes: vec![StatusTransition {
                from: None,
                to: GameStatus::Play,
                tick: 0,
            }],
        })
    }

    fn start_game(&mut self, out_events: &mut Vec<Event>) -> Result<(), OutOfBounds> {
        let config = GameConfig {
            level: self.next_level,
            ..self.config.clone()
        };
        let session = Session::start(&config, &mut self.rng)?;
        let previous = mem::replace(&mut self.session, session);
        self.status_changes.clear();

        info!(
            "new game at level {} with {} prizes",
            self.session.level.get(),
            self.session.remaining_prizes
        );
        out_events.push(Event::GameStarted {
            columns: config.columns,
            rows: config.rows,
            prizes: self.session.remaining_prizes,
            level: self.session.level,
        });
        self.record_transition(Some(previous.status), GameStatus::Play, out_events);
        Ok(())
    }

    fn tick(&mut self, out_events: &mut Vec<Event>) -> Result<(), OutOfBounds> {
        if self.session.status != GameStatus::Play {
            return Ok(());
        }

        let session = &mut self.session;
        session.tick_index = session.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced {
            tick: session.tick_index,
        });

        match session.worm.advance_tick(&mut session.grid)? {
            None => {}
            Some(Advance::Moved {
                from,
                to,
                consumed_prize,
            }) => {
                out_events.push(Event::WormAdvanced { from, to });
                if consumed_prize {
                    session.remaining_prizes = session.remaining_prizes.saturating_sub(1);
                    out_events.push(Event::PrizeConsumed {
                        cell: to,
                        remaining: session.remaining_prizes,
                    });
                    if let Some(tail) = session.worm.tail_cell() {
                        debug!("worm grew to {} segments", session.worm.len());
                        out_events.push(Event::WormGrew {
                            length: session.worm.len(),
                            tail,
                        });
                    }
                    if session.remaining_prizes == 0 {
                        self.change_status(GameStatus::YouWin, out_events);
                    }
                }
            }
            Some(Advance::Collided { cell, obstacle }) => {
                out_events.push(Event::WormCollided { cell, obstacle });
                self.change_status(GameStatus::GameOver, out_events);
            }
        }

        Ok(())
    }

    fn change_status(&mut self, to: GameStatus, out_events: &mut Vec<Event>) {
        let from = mem::replace(&mut self.session.status, to);
        self.record_transition(Some(from), to, out_events);
    }

    fn record_transition(
        &mut self,
        from: Option<GameStatus>,
        to: GameStatus,
        out_events: &mut Vec<Event>,
    ) {
        let transition = StatusTransition {
            from,
            to,
            tick: self.session.tick_index,
        };
        info!("status {from:?} -> {to:?} at tick {}", transition.tick);
        self.status_changes.push(transition);
        out_events.push(Event::StatusChanged { transition });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Only an internal invariant breach can produce [`OutOfBounds`]; collisions
/// are reported as status transitions.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), OutOfBounds> {
    match command {
        Command::NewGame => world.start_game(out_events)?,
        Command::Tick => world.tick(out_events)?,
        Command::SetDirection { heading } => {
            world.session.worm.set_direction(heading);
            out_events.push(Event::HeadingRequested { heading });
        }
        Command::TogglePause => match world.session.status {
            GameStatus::Play => world.change_status(GameStatus::Pause, out_events),
            GameStatus::Pause => world.change_status(GameStatus::Play, out_events),
            GameStatus::GameOver | GameStatus::YouWin => {}
        },
        Command::SetLevel { level } => {
            if level != world.next_level {
                world.next_level = level;
                info!("level {} selected for the next game", level.get());
                out_events.push(Event::LevelChanged { level });
            }
        }
    }
    Ok(())
}

/// Returns and clears every cell write and status transition since the previous drain.
///
/// Like [`drain_status_changes`], pending writes of a finished game are
/// replaced by the fresh board once `NewGame` is applied.
pub fn drain_changes(world: &mut World) -> Changes {
    Changes {
        cells: drain_cell_changes(world),
        statuses: drain_status_changes(world),
    }
}

/// Returns and clears the cell writes recorded since the previous cell drain.
pub fn drain_cell_changes(world: &mut World) -> Vec<CellChange> {
    world.session.grid.drain_changes()
}

/// Returns and clears the status transitions recorded since the previous status drain.
///
/// Each transition is reported once, but only within its own game: `NewGame`
/// discards anything still undrained, including a final `GameOver` or
/// `YouWin`, so the first drain afterwards starts with the new game's
/// transition to `Play`. Consumers that need every outcome should drain
/// before issuing `NewGame` or watch the `StatusChanged` events instead.
pub fn drain_status_changes(world: &mut World) -> Vec<StatusTransition> {
    mem::take(&mut world.status_changes)
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use worm_core::{
        BoardView, CellCoord, CellState, GameConfig, GameStatus, Level, OutOfBounds, WormView,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Board dimensions as `(columns, rows)`, wall ring included.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        world.session.grid.dimensions()
    }

    /// State of a single cell.
    pub fn cell_state(world: &World, cell: CellCoord) -> Result<CellState, OutOfBounds> {
        world.session.grid.get(cell)
    }

    /// Exposes a read-only view of the whole board, e.g. for a full repaint.
    #[must_use]
    pub fn board_view(world: &World) -> BoardView<'_> {
        world.session.grid.view()
    }

    /// Current game status.
    #[must_use]
    pub fn status(world: &World) -> GameStatus {
        world.session.status
    }

    /// Prizes still waiting on the board.
    #[must_use]
    pub fn remaining_prizes(world: &World) -> u32 {
        world.session.remaining_prizes
    }

    /// Captures the worm's segments, head first.
    #[must_use]
    pub fn worm_view(world: &World) -> WormView {
        WormView::from_snapshots(world.session.worm.snapshots())
    }

    /// Number of segments, head included.
    #[must_use]
    pub fn worm_length(world: &World) -> u32 {
        world.session.worm.len()
    }

    /// Level of the running game.
    #[must_use]
    pub fn level(world: &World) -> Level {
        world.session.level
    }

    /// Level the next game will start with.
    #[must_use]
    pub fn next_level(world: &World) -> Level {
        world.next_level
    }

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &GameConfig {
        &world.config
    }

    /// Ticks processed in play since the running game started.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.session.tick_index
    }
}
