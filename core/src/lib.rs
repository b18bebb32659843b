#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Worm engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Painters do not consume events; they drain the
//! world's [`Changes`] feed, which lists every committed cell write and status
//! transition exactly once.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Worm.";

/// Smallest board edge that still leaves an interior inside the wall ring.
pub const MIN_BOARD_EDGE: u32 = 3;

/// Seed used by [`GameConfig::default`] for prize placement.
pub const DEFAULT_RNG_SEED: u64 = 0x2f95_32c8_2a36_ffc1;

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Discards the current session and starts a fresh game.
    NewGame,
    /// Advances the simulation by a single external tick.
    Tick,
    /// Requests that the worm's head turn toward the provided heading.
    SetDirection {
        /// Heading the head adopts on its next move.
        heading: Heading,
    },
    /// Flips between [`GameStatus::Play`] and [`GameStatus::Pause`].
    TogglePause,
    /// Selects the level used by the next game.
    SetLevel {
        /// Level that determines the worm's speed divisor.
        level: Level,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    /// Announces that a fresh game replaced the previous session.
    GameStarted {
        /// Number of board columns, wall ring included.
        columns: u32,
        /// Number of board rows, wall ring included.
        rows: u32,
        /// Number of prizes scattered across the board.
        prizes: u32,
        /// Level driving the worm's speed for this game.
        level: Level,
    },
    /// Indicates that the simulation processed a tick while in play.
    TimeAdvanced {
        /// Number of ticks processed since the game started.
        tick: u64,
    },
    /// Confirms that a heading change was queued on the worm's head.
    HeadingRequested {
        /// Heading stored in the head's pending slot.
        heading: Heading,
    },
    /// Confirms that the head moved between two cells.
    WormAdvanced {
        /// Cell the head occupied before moving.
        from: CellCoord,
        /// Cell the head occupies after the move.
        to: CellCoord,
    },
    /// Reports that the head consumed a prize.
    PrizeConsumed {
        /// Cell that held the prize.
        cell: CellCoord,
        /// Prizes left on the board after the consumption.
        remaining: u32,
    },
    /// Reports that a segment was appended to the tail.
    WormGrew {
        /// Number of segments after growth.
        length: u32,
        /// Cell the tail occupies once the move completes.
        tail: CellCoord,
    },
    /// Reports that the head ran into an obstacle.
    WormCollided {
        /// Cell the head attempted to enter; the head's own cell when the
        /// step would leave the board.
        cell: CellCoord,
        /// State of the cell that blocked the move.
        obstacle: CellState,
    },
    /// Announces a change of game status.
    StatusChanged {
        /// Transition that was recorded.
        transition: StatusTransition,
    },
    /// Announces that the level for upcoming games changed.
    LevelChanged {
        /// Newly selected level.
        level: Level,
    },
}

/// Cardinal headings available to worm segments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    /// Movement toward decreasing row indices.
    Top,
    /// Movement toward increasing column indices.
    Right,
    /// Movement toward increasing row indices.
    Bottom,
    /// Movement toward decreasing column indices.
    Left,
}

impl Heading {
    /// All headings in clockwise order starting at [`Heading::Top`].
    pub const ALL: [Heading; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];

    /// Heading pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Right => Self::Left,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Returns the neighbouring cell in the provided heading.
    ///
    /// Yields `None` when the step would leave the non-negative coordinate
    /// space. Upper bounds are the grid's concern.
    #[must_use]
    pub fn step(self, heading: Heading) -> Option<Self> {
        let (column, row) = match heading {
            Heading::Top => (Some(self.column), self.row.checked_sub(1)),
            Heading::Right => (self.column.checked_add(1), Some(self.row)),
            Heading::Bottom => (Some(self.column), self.row.checked_add(1)),
            Heading::Left => (self.column.checked_sub(1), Some(self.row)),
        };
        Some(Self::new(column?, row?))
    }
}

/// Occupancy of a single board cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// Nothing occupies the cell.
    #[default]
    Empty,
    /// The worm's head occupies the cell.
    WormHead,
    /// A body segment occupies the cell.
    WormPart,
    /// A prize waits to be consumed.
    Prize,
    /// Part of the perimeter wall.
    Wall,
}

impl CellState {
    /// Reports whether entering the cell ends the game.
    #[must_use]
    pub const fn is_obstacle(self) -> bool {
        matches!(self, Self::WormPart | Self::Wall)
    }

    /// Reports whether a worm segment occupies the cell.
    #[must_use]
    pub const fn is_worm(self) -> bool {
        matches!(self, Self::WormHead | Self::WormPart)
    }
}

/// Lifecycle state of a game session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// Ticks advance the worm.
    Play,
    /// Ticks are ignored until play resumes.
    Pause,
    /// The head hit a wall or the body.
    GameOver,
    /// Every prize was consumed.
    YouWin,
}

impl GameStatus {
    /// Reports whether only a new game can leave this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver | Self::YouWin)
    }
}

/// Recorded change of game status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusTransition {
    /// Status before the transition; `None` for the opening transition of the first session.
    pub from: Option<GameStatus>,
    /// Status after the transition.
    pub to: GameStatus,
    /// Tick index of the session when the transition happened.
    pub tick: u64,
}

/// Committed write of a single board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellChange {
    /// Cell that was written.
    pub cell: CellCoord,
    /// State the cell holds after the write.
    pub state: CellState,
}

impl CellChange {
    /// Creates a new change record.
    #[must_use]
    pub const fn new(cell: CellCoord, state: CellState) -> Self {
        Self { cell, state }
    }
}

/// Everything recorded since the previous drain.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changes {
    /// Cell writes in the exact order they were committed.
    pub cells: Vec<CellChange>,
    /// Status transitions in the order they happened.
    pub statuses: Vec<StatusTransition>,
}

impl Changes {
    /// Reports whether nothing changed since the previous drain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.statuses.is_empty()
    }
}

/// Difficulty level; higher levels move the worm more often.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Level(u8);

impl Level {
    /// Slowest level.
    pub const MIN: Level = Level(1);
    /// Fastest level.
    pub const MAX: Level = Level(10);

    /// Creates a level when the value lies within [`Level::MIN`]..=[`Level::MAX`].
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value >= Self::MIN.0 && value <= Self::MAX.0 {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Numeric value of the level.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Number of ticks between two worm moves.
    ///
    /// Level 1 moves on every tenth tick, level 10 on every tick.
    #[must_use]
    pub const fn speed_divisor(self) -> u32 {
        (Self::MAX.0 + 1 - self.0) as u32
    }

    /// Next faster level, saturating at [`Level::MAX`].
    #[must_use]
    pub const fn raised(self) -> Self {
        if self.0 < Self::MAX.0 {
            Self(self.0 + 1)
        } else {
            self
        }
    }

    /// Next slower level, saturating at [`Level::MIN`].
    #[must_use]
    pub const fn lowered(self) -> Self {
        if self.0 > Self::MIN.0 {
            Self(self.0 - 1)
        } else {
            self
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::MIN
    }
}

impl TryFrom<u8> for Level {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(ConfigError::LevelOutOfRange { level: value })
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.0
    }
}

/// Session-start parameters of a game.
///
/// Every field falls back to its default when omitted from a TOML document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Board width in cells, wall ring included.
    pub columns: u32,
    /// Board height in cells, wall ring included.
    pub rows: u32,
    /// Number of segments the worm starts with, head included.
    pub initial_length: u32,
    /// Level of the first game.
    pub level: Level,
    /// Fraction of the board area turned into prizes.
    pub prize_density: f64,
    /// Seed of the prize placement generator.
    pub rng_seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            columns: 60,
            rows: 30,
            initial_length: 4,
            level: Level::MIN,
            prize_density: 1.0 / 90.0,
            rng_seed: DEFAULT_RNG_SEED,
        }
    }
}

impl GameConfig {
    /// Checks that a session can be built from the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns < MIN_BOARD_EDGE || self.rows < MIN_BOARD_EDGE {
            return Err(ConfigError::BoardTooSmall {
                columns: self.columns,
                rows: self.rows,
            });
        }

        if self.initial_length == 0 {
            return Err(ConfigError::EmptyWorm);
        }

        // The tail must lie east of the west wall.
        if self.initial_length > self.start_cell().column() {
            return Err(ConfigError::WormDoesNotFit {
                initial_length: self.initial_length,
                columns: self.columns,
            });
        }

        let interior = u64::from(self.columns - 2) * u64::from(self.rows - 2);
        if interior <= u64::from(self.initial_length) {
            return Err(ConfigError::NoRoomForPrizes {
                columns: self.columns,
                rows: self.rows,
            });
        }

        if !(self.prize_density > 0.0 && self.prize_density <= 1.0) {
            return Err(ConfigError::InvalidPrizeDensity {
                density: self.prize_density,
            });
        }

        Ok(())
    }

    /// Cell the worm's head occupies when a game starts.
    #[must_use]
    pub const fn start_cell(&self) -> CellCoord {
        CellCoord::new(self.columns / 2, self.rows / 2)
    }

    /// Number of prizes requested for a game, before capping to free cells.
    #[must_use]
    pub fn prize_count(&self) -> u32 {
        let area = f64::from(self.columns) * f64::from(self.rows);
        let requested = (area * self.prize_density).round();
        if requested < 1.0 {
            1
        } else if requested >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            requested as u32
        }
    }
}

/// Reasons a configuration may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The board cannot hold a wall ring around an interior.
    #[error(
        "board must be at least {}x{} cells (received {columns}x{rows})",
        MIN_BOARD_EDGE,
        MIN_BOARD_EDGE
    )]
    BoardTooSmall {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// A worm needs at least its head.
    #[error("initial worm length must be positive")]
    EmptyWorm,
    /// The worm's tail would overlap the west wall.
    #[error("a worm of length {initial_length} does not fit on a board {columns} cells wide")]
    WormDoesNotFit {
        /// Requested initial length.
        initial_length: u32,
        /// Requested column count.
        columns: u32,
    },
    /// The worm fills the whole interior.
    #[error("a {columns}x{rows} board leaves no room for prizes")]
    NoRoomForPrizes {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// Prize density outside `(0, 1]`.
    #[error("prize density must lie in (0, 1] (received {density})")]
    InvalidPrizeDensity {
        /// Rejected density.
        density: f64,
    },
    /// Level outside the supported range.
    #[error("level {level} is outside {}..={}", Level::MIN.get(), Level::MAX.get())]
    LevelOutOfRange {
        /// Rejected level value.
        level: u8,
    },
}

/// Access to a coordinate outside the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
#[error("cell ({}, {}) lies outside the {columns}x{rows} board", .cell.column(), .cell.row())]
pub struct OutOfBounds {
    /// Offending coordinate.
    pub cell: CellCoord,
    /// Board width.
    pub columns: u32,
    /// Board height.
    pub rows: u32,
}

/// Read-only view into the dense cell grid.
#[derive(Clone, Copy, Debug)]
pub struct BoardView<'a> {
    cells: &'a [CellState],
    columns: u32,
    rows: u32,
}

impl<'a> BoardView<'a> {
    /// Captures a new board view backed by the provided row-major cell slice.
    #[must_use]
    pub fn new(cells: &'a [CellState], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Returns the state of the provided cell.
    pub fn state(&self, cell: CellCoord) -> Result<CellState, OutOfBounds> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .ok_or(OutOfBounds {
                cell,
                columns: self.columns,
                rows: self.rows,
            })
    }

    /// Provides the dimensions of the underlying grid as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Reports whether the cell belongs to the outermost ring.
    #[must_use]
    pub const fn is_border(&self, cell: CellCoord) -> bool {
        cell.column() == 0
            || cell.row() == 0
            || cell.column() + 1 == self.columns
            || cell.row() + 1 == self.rows
    }

    /// Iterates over every cell in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, CellState)> + 'a {
        let columns = self.columns.max(1);
        self.cells.iter().enumerate().map(move |(index, state)| {
            let index = index as u32;
            (CellCoord::new(index % columns, index / columns), *state)
        })
    }

    /// Number of cells currently holding the provided state.
    #[must_use]
    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|candidate| **candidate == state).count()
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

/// Immutable representation of a single segment used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SegmentSnapshot {
    /// Position in the chain, 1 being the head.
    pub ordinal: u32,
    /// Cell the segment occupies.
    pub cell: CellCoord,
    /// Heading used by the segment's latest move.
    pub heading: Heading,
    /// Heading the segment adopts on its next move, if any.
    pub pending: Option<Heading>,
}

/// Read-only snapshot of the worm, head first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WormView {
    segments: Vec<SegmentSnapshot>,
}

impl WormView {
    /// Creates a new worm view from snapshots ordered head to tail.
    #[must_use]
    pub fn from_snapshots(segments: Vec<SegmentSnapshot>) -> Self {
        Self { segments }
    }

    /// Iterator over the segments, head first.
    pub fn iter(&self) -> impl Iterator<Item = &SegmentSnapshot> {
        self.segments.iter()
    }

    /// Snapshot of the head segment.
    #[must_use]
    pub fn head(&self) -> Option<&SegmentSnapshot> {
        self.segments.first()
    }

    /// Snapshot of the tail segment.
    #[must_use]
    pub fn tail(&self) -> Option<&SegmentSnapshot> {
        self.segments.last()
    }

    /// Number of segments in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Reports whether the view holds no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
