#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Worm adapters.
//!
//! Backends never read the world directly. They keep a [`TextFrame`] (or their
//! own pixel surface) in sync by feeding it drained cell changes, repaint the
//! [`DirtyRegion`] those changes cover, and overlay a [`StatusBanner`] once the
//! game has ended.
//!
//! Two families of backend share these contracts. Character-cell backends,
//! like the terminal renderer of the `worm` binary, draw a [`TextFrame`] with
//! [`glyph`] and never touch pixels. Pixel backends drawing into a window size
//! the board with [`Layout::fit`], paint each cell at [`Layout::cell_rect`]
//! using [`Palette`], repaint only [`Layout::region_rect`] of each drained
//! [`DirtyRegion`], and map pointer positions back with [`Layout::cell_at`].

use anyhow::Result as AnyResult;
use glam::Vec2;
use std::{error::Error, fmt};
use worm_core::{BoardView, CellChange, CellCoord, CellState, GameStatus};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Converts the color back to byte RGB values, ignoring alpha.
    #[must_use]
    pub fn to_rgb_u8(self) -> [u8; 3] {
        [
            channel_to_u8(self.red),
            channel_to_u8(self.green),
            channel_to_u8(self.blue),
        ]
    }
}

fn channel_to_u8(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// How a cell is drawn inside its square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellShape {
    /// Only the square's outline is stroked.
    Outline,
    /// A filled circle inscribed in the square.
    Disc,
    /// The whole square is filled.
    Square,
}

/// Color and shape used for one cell state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellStyle {
    /// Stroke or fill color.
    pub color: Color,
    /// Shape drawn with the color.
    pub shape: CellShape,
}

/// Colors used when presenting the board.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Fill behind every cell and the margins around the board.
    pub background: Color,
    /// Outline of empty cells.
    pub empty: Color,
    /// Worm head disc.
    pub head: Color,
    /// Worm body discs.
    pub body: Color,
    /// Prize squares.
    pub prize: Color,
    /// Wall squares.
    pub wall: Color,
    /// Status banner text.
    pub banner: Color,
}

impl Palette {
    /// Gray field, silver grid, green head, orange body, red prizes, black walls.
    #[must_use]
    pub const fn classic() -> Self {
        Self {
            background: Color::from_rgb_u8(128, 128, 128),
            empty: Color::from_rgb_u8(192, 192, 192),
            head: Color::from_rgb_u8(0, 128, 0),
            body: Color::from_rgb_u8(255, 165, 0),
            prize: Color::from_rgb_u8(255, 0, 0),
            wall: Color::from_rgb_u8(0, 0, 0),
            banner: Color::from_rgb_u8(0, 0, 0),
        }
    }

    /// Style used to draw a cell in the provided state.
    #[must_use]
    pub const fn style(&self, state: CellState) -> CellStyle {
        match state {
            CellState::Empty => CellStyle {
                color: self.empty,
                shape: CellShape::Outline,
            },
            CellState::WormHead => CellStyle {
                color: self.head,
                shape: CellShape::Disc,
            },
            CellState::WormPart => CellStyle {
                color: self.body,
                shape: CellShape::Disc,
            },
            CellState::Prize => CellStyle {
                color: self.prize,
                shape: CellShape::Square,
            },
            CellState::Wall => CellStyle {
                color: self.wall,
                shape: CellShape::Square,
            },
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::classic()
    }
}

/// Axis-aligned rectangle in viewport pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelRect {
    /// Top-left corner.
    pub min: Vec2,
    /// Bottom-right corner, exclusive.
    pub max: Vec2,
}

impl PixelRect {
    /// Width and height of the rectangle.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

/// Maps board cells onto a viewport with square cells, centered.
///
/// Used by pixel backends only; character-cell backends address cells directly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    viewport: Vec2,
    origin: Vec2,
    cell_size: f32,
    columns: u32,
    rows: u32,
}

impl Layout {
    /// Picks the largest whole-pixel cell size at which the board fits.
    ///
    /// Left-over space is split evenly on both sides of each axis.
    pub fn fit(viewport: Vec2, columns: u32, rows: u32) -> Result<Self, RenderingError> {
        if columns == 0 || rows == 0 {
            return Err(RenderingError::EmptyBoard { columns, rows });
        }

        let board = Vec2::new(columns as f32, rows as f32);
        let cell_size = (viewport / board).min_element().floor();
        if !cell_size.is_finite() || cell_size < 1.0 {
            return Err(RenderingError::ViewportTooSmall {
                width: viewport.x,
                height: viewport.y,
            });
        }

        let origin = ((viewport - board * cell_size) * 0.5).floor();
        Ok(Self {
            viewport,
            origin,
            cell_size,
            columns,
            rows,
        })
    }

    /// Side length of a cell in pixels.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Top-left corner of cell `(0, 0)`.
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Pixel rectangle covered by a cell.
    #[must_use]
    pub fn cell_rect(&self, cell: CellCoord) -> PixelRect {
        let min = self.origin + Vec2::new(cell.column() as f32, cell.row() as f32) * self.cell_size;
        PixelRect {
            min,
            max: min + Vec2::splat(self.cell_size),
        }
    }

    /// Pixel rectangle to repaint for a dirty region.
    ///
    /// A region spanning the whole board repaints the whole viewport so the
    /// margins are cleared too.
    #[must_use]
    pub fn region_rect(&self, region: &DirtyRegion) -> PixelRect {
        if region.is_full_board() {
            return PixelRect {
                min: Vec2::ZERO,
                max: self.viewport,
            };
        }
        PixelRect {
            min: self.cell_rect(region.min()).min,
            max: self.cell_rect(region.max()).max,
        }
    }

    /// Cell under a viewport position, if any.
    #[must_use]
    pub fn cell_at(&self, position: Vec2) -> Option<CellCoord> {
        let local = (position - self.origin) / self.cell_size;
        if local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        let column = local.x.floor() as u32;
        let row = local.y.floor() as u32;
        (column < self.columns && row < self.rows).then(|| CellCoord::new(column, row))
    }
}

/// Bounding box of the cells touched by a batch of changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DirtyRegion {
    min: CellCoord,
    max: CellCoord,
    full_board: bool,
}

impl DirtyRegion {
    /// Computes the region covered by `changes` on a `columns` x `rows` board.
    ///
    /// Returns `None` when nothing changed.
    #[must_use]
    pub fn from_changes(changes: &[CellChange], columns: u32, rows: u32) -> Option<Self> {
        let first = changes.first()?.cell;
        let (mut min_column, mut min_row) = (first.column(), first.row());
        let (mut max_column, mut max_row) = (first.column(), first.row());
        for change in changes {
            min_column = min_column.min(change.cell.column());
            min_row = min_row.min(change.cell.row());
            max_column = max_column.max(change.cell.column());
            max_row = max_row.max(change.cell.row());
        }

        let full_board = min_column == 0
            && min_row == 0
            && max_column.saturating_add(1) >= columns
            && max_row.saturating_add(1) >= rows;
        Some(Self {
            min: CellCoord::new(min_column, min_row),
            max: CellCoord::new(max_column, max_row),
            full_board,
        })
    }

    /// Top-left cell of the region.
    #[must_use]
    pub const fn min(&self) -> CellCoord {
        self.min
    }

    /// Bottom-right cell of the region, inclusive.
    #[must_use]
    pub const fn max(&self) -> CellCoord {
        self.max
    }

    /// Reports whether the region covers the whole board.
    #[must_use]
    pub const fn is_full_board(&self) -> bool {
        self.full_board
    }

    /// Cells inside the region in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let (min, max) = (self.min, self.max);
        (min.row()..=max.row())
            .flat_map(move |row| (min.column()..=max.column()).map(move |col| CellCoord::new(col, row)))
    }
}

/// Message overlaid on the board once a game has ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusBanner {
    /// The worm crashed.
    GameOver,
    /// Every prize was eaten.
    YouWin,
}

impl StatusBanner {
    /// Banner shown for a status, if any.
    #[must_use]
    pub const fn for_status(status: GameStatus) -> Option<Self> {
        match status {
            GameStatus::GameOver => Some(Self::GameOver),
            GameStatus::YouWin => Some(Self::YouWin),
            GameStatus::Play | GameStatus::Pause => None,
        }
    }

    /// Text of the banner.
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::GameOver => "Game Over",
            Self::YouWin => "You Win",
        }
    }
}

impl fmt::Display for StatusBanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Character used for a cell state in text frames.
#[must_use]
pub const fn glyph(state: CellState) -> char {
    match state {
        CellState::Empty => '.',
        CellState::WormHead => '@',
        CellState::WormPart => 'o',
        CellState::Prize => '*',
        CellState::Wall => '#',
    }
}

/// Character grid mirroring the board, patched from drained changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextFrame {
    columns: u32,
    rows: u32,
    states: Vec<CellState>,
}

impl TextFrame {
    /// Creates a frame of empty cells.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let area = u64::from(columns) * u64::from(rows);
        Self {
            columns,
            rows,
            states: vec![CellState::Empty; usize::try_from(area).unwrap_or(0)],
        }
    }

    /// Creates a frame holding a full copy of the board.
    #[must_use]
    pub fn from_board(board: &BoardView<'_>) -> Self {
        let (columns, rows) = board.dimensions();
        let mut frame = Self::new(columns, rows);
        for (cell, state) in board.iter() {
            if let Some(index) = frame.index(cell) {
                frame.states[index] = state;
            }
        }
        frame
    }

    /// Dimensions of the frame as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Applies changes in order and reports the region that needs repainting.
    ///
    /// Changes outside the frame are ignored.
    pub fn apply(&mut self, changes: &[CellChange]) -> Option<DirtyRegion> {
        for change in changes {
            if let Some(index) = self.index(change.cell) {
                self.states[index] = change.state;
            }
        }
        DirtyRegion::from_changes(changes, self.columns, self.rows)
    }

    /// State last recorded for a cell.
    #[must_use]
    pub fn state(&self, cell: CellCoord) -> Option<CellState> {
        self.index(cell).map(|index| self.states[index])
    }

    /// Rows of glyphs, top to bottom.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        let width = usize::try_from(self.columns).unwrap_or(0).max(1);
        self.states
            .chunks(width)
            .map(|row| row.iter().copied().map(glyph).collect())
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }
}

impl fmt::Display for TextFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Rendering backend capable of presenting Worm frames.
pub trait RenderingBackend {
    /// Presents the current frame, overlaying the banner when one is given.
    fn present(&mut self, frame: &TextFrame, banner: Option<StatusBanner>) -> AnyResult<()>;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The board has no cells along at least one axis.
    EmptyBoard {
        /// Provided column count.
        columns: u32,
        /// Provided row count.
        rows: u32,
    },
    /// The viewport cannot fit one pixel per cell.
    ViewportTooSmall {
        /// Viewport width in pixels.
        width: f32,
        /// Viewport height in pixels.
        height: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyBoard { columns, rows } => {
                write!(f, "cannot lay out a {columns}x{rows} board")
            }
            Self::ViewportTooSmall { width, height } => {
                write!(f, "viewport {width}x{height} is too small for the board")
            }
        }
    }
}

impl Error for RenderingError {}
