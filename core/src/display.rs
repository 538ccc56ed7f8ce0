//! Character display service and an in-memory 16x2 implementation.

pub const LCD_COLS: u8 = 16;
pub const LCD_ROWS: u8 = 2;

/// HD44780-style character display.
pub trait CharDisplay {
    fn clear(&mut self);

    /// Move the write position; columns and rows start at 0.
    fn set_cursor(&mut self, col: u8, row: u8);

    /// Print at the write position, advancing it.
    fn print(&mut self, text: &str);

    /// Show the blinking caret at the write position.
    fn show_caret(&mut self) {}

    fn hide_caret(&mut self) {}
}

/// Display contents held in memory.
///
/// Text past the last column is dropped, non-ASCII characters print as `?`.
/// The simulator draws this grid; tests read it back with [`CharGrid::row`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharGrid {
    cells: [[u8; LCD_COLS as usize]; LCD_ROWS as usize],
    col: u8,
    row: u8,
    caret: bool,
}

impl CharGrid {
    pub fn new() -> Self {
        Self {
            cells: [[b' '; LCD_COLS as usize]; LCD_ROWS as usize],
            col: 0,
            row: 0,
            caret: false,
        }
    }

    /// One row as text, padded with spaces to the full width.
    pub fn row(&self, row: u8) -> &str {
        self.cells
            .get(row as usize)
            .and_then(|cells| core::str::from_utf8(cells).ok())
            .unwrap_or("")
    }

    /// Caret position when the caret is visible.
    pub fn caret(&self) -> Option<(u8, u8)> {
        self.caret.then_some((self.col, self.row))
    }
}

impl Default for CharGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl CharDisplay for CharGrid {
    fn clear(&mut self) {
        self.cells = [[b' '; LCD_COLS as usize]; LCD_ROWS as usize];
        self.col = 0;
        self.row = 0;
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        self.col = col.min(LCD_COLS);
        self.row = row.min(LCD_ROWS - 1);
    }

    fn print(&mut self, text: &str) {
        for ch in text.chars() {
            if self.col >= LCD_COLS {
                break;
            }
            let byte = if ch.is_ascii() && !ch.is_ascii_control() { ch as u8 } else { b'?' };
            self.cells[self.row as usize][self.col as usize] = byte;
            self.col += 1;
        }
    }

    fn show_caret(&mut self) {
        self.caret = true;
    }

    fn hide_caret(&mut self) {
        self.caret = false;
    }
}
