//! Drawing the character grid as a backlit 16x2 panel.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use cardmate_core::{CharDisplay, CharGrid, LCD_COLS, LCD_ROWS};
use embedded_graphics::mono_font::ascii::FONT_10X20;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay, Window};

const CELL_WIDTH: u32 = 12;
const CELL_HEIGHT: u32 = 22;
const MARGIN: u32 = 12;

pub const PANEL_WIDTH: u32 = MARGIN * 2 + CELL_WIDTH * LCD_COLS as u32;
pub const PANEL_HEIGHT: u32 = MARGIN * 2 + CELL_HEIGHT * LCD_ROWS as u32;

const BACKLIGHT: Rgb565 = Rgb565::new(2, 10, 24);
const CELL: Rgb565 = Rgb565::new(3, 14, 29);
const INK: Rgb565 = Rgb565::WHITE;

fn cell_origin(col: u32, row: u32) -> Point {
    Point::new((MARGIN + col * CELL_WIDTH) as i32, (MARGIN + row * CELL_HEIGHT) as i32)
}

pub fn new_panel() -> SimulatorDisplay<Rgb565> {
    SimulatorDisplay::new(Size::new(PANEL_WIDTH, PANEL_HEIGHT))
}

/// Render `grid` onto `target`, one glyph per cell.
pub fn draw_grid<D>(target: &mut D, grid: &CharGrid) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    target.clear(BACKLIGHT)?;
    let text_style = MonoTextStyle::new(&FONT_10X20, INK);
    let cell_style = PrimitiveStyle::with_fill(CELL);
    let glyph = Size::new(CELL_WIDTH - 2, CELL_HEIGHT - 2);

    for row in 0..LCD_ROWS {
        for (col, ch) in grid.row(row).chars().enumerate() {
            let origin = cell_origin(col as u32, u32::from(row));
            Rectangle::new(origin, glyph).into_styled(cell_style).draw(target)?;
            let mut buf = [0u8; 4];
            Text::with_baseline(ch.encode_utf8(&mut buf), origin, text_style, Baseline::Top).draw(target)?;
        }
    }

    if let Some((col, row)) = grid.caret().filter(|&(col, _)| col < LCD_COLS) {
        let origin = cell_origin(u32::from(col), u32::from(row)) + Point::new(0, glyph.height as i32 - 2);
        Rectangle::new(origin, Size::new(glyph.width, 2))
            .into_styled(PrimitiveStyle::with_fill(INK))
            .draw(target)?;
    }
    Ok(())
}

/// LCD shown in an SDL window, redrawn on every change.
pub struct WindowLcd {
    grid: CharGrid,
    panel: SimulatorDisplay<Rgb565>,
    pub window: Window,
}

impl WindowLcd {
    pub fn new(title: &str) -> Self {
        let output_settings = OutputSettingsBuilder::new().scale(2).pixel_spacing(0).build();
        Self {
            grid: CharGrid::new(),
            panel: new_panel(),
            window: Window::new(title, &output_settings),
        }
    }

    fn refresh(&mut self) {
        if let Err(e) = draw_grid(&mut self.panel, &self.grid) {
            log::error!("Render error: {e:?}");
        }
        self.window.update(&self.panel);
    }
}

impl CharDisplay for WindowLcd {
    fn clear(&mut self) {
        self.grid.clear();
        self.refresh();
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        self.grid.set_cursor(col, row);
    }

    fn print(&mut self, text: &str) {
        self.grid.print(text);
        self.refresh();
    }

    fn show_caret(&mut self) {
        self.grid.show_caret();
        self.refresh();
    }

    fn hide_caret(&mut self) {
        self.grid.hide_caret();
    }
}

/// LCD that keeps every completed screen for later export.
#[derive(Default)]
pub struct FrameLog {
    grid: CharGrid,
    pub frames: Vec<CharGrid>,
}

impl FrameLog {
    fn capture(&mut self) {
        let blank = (0..LCD_ROWS).all(|row| self.grid.row(row).trim().is_empty());
        if !blank && self.frames.last() != Some(&self.grid) {
            self.frames.push(self.grid.clone());
        }
    }

    /// Frames including the screen currently shown.
    pub fn finish(mut self) -> Vec<CharGrid> {
        self.capture();
        self.frames
    }
}

impl CharDisplay for FrameLog {
    fn clear(&mut self) {
        self.capture();
        self.grid.clear();
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        self.grid.set_cursor(col, row);
    }

    fn print(&mut self, text: &str) {
        self.grid.print(text);
    }

    fn show_caret(&mut self) {
        self.grid.show_caret();
    }

    fn hide_caret(&mut self) {
        self.grid.hide_caret();
    }
}

/// Write the panel as an uncompressed 24-bit top-down BMP.
pub fn save_bmp(panel: &SimulatorDisplay<Rgb565>, path: &Path) -> anyhow::Result<()> {
    let width = PANEL_WIDTH;
    let height = PANEL_HEIGHT;

    // rows padded to 4 bytes
    let row_size = (width * 3).div_ceil(4) * 4;
    let pixel_data_size = row_size * height;
    let file_size = 54 + pixel_data_size;

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);

    out.write_all(b"BM")?;
    out.write_all(&file_size.to_le_bytes())?;
    out.write_all(&[0u8; 4])?;
    out.write_all(&54u32.to_le_bytes())?;

    // BITMAPINFOHEADER, negative height for top-down rows
    out.write_all(&40u32.to_le_bytes())?;
    out.write_all(&(width as i32).to_le_bytes())?;
    out.write_all(&(-(height as i32)).to_le_bytes())?;
    out.write_all(&1u16.to_le_bytes())?;
    out.write_all(&24u16.to_le_bytes())?;
    out.write_all(&0u32.to_le_bytes())?;
    out.write_all(&pixel_data_size.to_le_bytes())?;
    out.write_all(&2835u32.to_le_bytes())?;
    out.write_all(&2835u32.to_le_bytes())?;
    out.write_all(&0u32.to_le_bytes())?;
    out.write_all(&0u32.to_le_bytes())?;

    let padding = [0u8; 3];
    let padding = &padding[..(row_size - width * 3) as usize];
    for y in 0..height {
        for x in 0..width {
            let color = panel.get_pixel(Point::new(x as i32, y as i32));
            let r = ((u32::from(color.r()) * 255) / 31) as u8;
            let g = ((u32::from(color.g()) * 255) / 63) as u8;
            let b = ((u32::from(color.b()) * 255) / 31) as u8;
            out.write_all(&[b, g, r])?;
        }
        out.write_all(padding)?;
    }
    out.flush()?;
    Ok(())
}
