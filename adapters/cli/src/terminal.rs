//! Plain-text rendering backend writing frames to any `Write` sink.

use std::io::Write;

use anyhow::Result as AnyResult;
use worm_core::{CellCoord, CellState};
use worm_rendering::{glyph, Palette, RenderingBackend, StatusBanner, TextFrame};

/// Prints frames as glyph grids, optionally colored with ANSI escapes.
#[derive(Debug)]
pub(crate) struct TerminalBackend<W> {
    out: W,
    palette: Option<Palette>,
}

impl<W: Write> TerminalBackend<W> {
    /// Creates a backend; `color` enables 24-bit ANSI colors from the classic palette.
    pub(crate) fn new(out: W, color: bool) -> Self {
        Self {
            out,
            palette: color.then(Palette::classic),
        }
    }

    fn push_glyph(&self, line: &mut String, state: CellState) {
        match self.palette {
            Some(palette) => {
                let [red, green, blue] = palette.style(state).color.to_rgb_u8();
                line.push_str(&format!("\x1b[38;2;{red};{green};{blue}m{}\x1b[0m", glyph(state)));
            }
            None => line.push(glyph(state)),
        }
    }
}

impl<W: Write> RenderingBackend for TerminalBackend<W> {
    fn present(&mut self, frame: &TextFrame, banner: Option<StatusBanner>) -> AnyResult<()> {
        let (columns, rows) = frame.dimensions();
        let text = banner.map(StatusBanner::text);
        let slot = text.and_then(|text| banner_slot(text, columns, rows));

        for row in 0..rows {
            let mut line = String::new();
            let mut column = 0;
            while column < columns {
                if let (Some(text), Some((banner_row, start))) = (text, slot) {
                    if row == banner_row && column == start {
                        line.push_str(text);
                        column += text.chars().count() as u32;
                        continue;
                    }
                }
                let state = frame
                    .state(CellCoord::new(column, row))
                    .unwrap_or_default();
                self.push_glyph(&mut line, state);
                column += 1;
            }
            writeln!(self.out, "{line}")?;
        }

        if let (Some(text), None) = (text, slot) {
            writeln!(self.out, "{text}")?;
        }
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Row and first column of a banner centered on the board, if it fits.
fn banner_slot(text: &str, columns: u32, rows: u32) -> Option<(u32, u32)> {
    let width = u32::try_from(text.chars().count()).ok()?;
    if width > columns || rows == 0 {
        return None;
    }
    Some((rows / 2, (columns - width) / 2))
}
