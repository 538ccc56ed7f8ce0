//! CardMate PC Simulator
//!
//! Runs the card station on the desktop: the LCD in an SDL window, the
//! console on stdin/stdout and an in-memory MIFARE Classic 1K as the card.
//!
//! # Usage
//! ```bash
//! # Interactive mode (requires display)
//! cargo run --release
//!
//! # Headless mode - plays a scripted session and saves every LCD screen as BMP
//! cargo run --release -- --headless
//!
//! # Shorter card wait
//! cargo run --release -- --timeout-ms 3000
//! ```
//!
//! # Controls (interactive mode)
//! - Arrow keys: Up/Down/Left/Right buttons
//! - Enter: Select
//! - C: Put the card on / take it off the reader
//! - Q/Esc: Quit
//!
//! The window does not redraw input while an operation waits for a card, so
//! place the card before choosing an action.

mod host;
mod lcd;

use std::path::Path;

use anyhow::{bail, Context};
use cardmate_core::{
    App, Board, Button, Config, ManualClock, Runtime, VirtualCard, LCD_ROWS,
};
use embedded_graphics_simulator::{sdl2::Keycode, SimulatorEvent};
use host::{HostClock, KeyQueue, StdioSerial};
use lcd::{FrameLog, WindowLcd};
use log::info;

const DEMO_UID: [u8; 4] = [0x04, 0xA2, 0x3B, 0x91];

struct Options {
    headless: bool,
    config: Config,
}

fn parse_args() -> anyhow::Result<Options> {
    let mut options = Options {
        headless: false,
        config: Config::default(),
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--headless" => options.headless = true,
            "--timeout-ms" => {
                let value = args.next().context("--timeout-ms needs a value")?;
                let ms = value.parse().with_context(|| format!("invalid timeout {value:?}"))?;
                options.config = options.config.with_card_timeout_ms(ms);
            }
            other => bail!("unknown argument {other:?}"),
        }
    }
    Ok(options)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = parse_args()?;
    if options.headless {
        run_headless(options.config)
    } else {
        run_interactive(options.config);
        Ok(())
    }
}

enum Step {
    Press(Button),
    Line(&'static str),
    Card(bool),
}

/// Keypad write, console read, keypad custom text, a failed format without a
/// card, then a console key change.
const SCRIPT: &[Step] = &[
    Step::Press(Button::Select),
    Step::Line("2"),
    Step::Press(Button::Down),
    Step::Press(Button::Select),
    Step::Press(Button::Up),
    Step::Press(Button::Up),
    Step::Press(Button::Right),
    Step::Press(Button::Up),
    Step::Press(Button::Select),
    Step::Card(false),
    Step::Line("3"),
    Step::Card(true),
    Step::Line("5"),
    Step::Line("A0A1A2A3A4A5"),
];

fn run_headless(config: Config) -> anyhow::Result<()> {
    info!("CardMate Simulator - HEADLESS MODE");

    let mut board = Board {
        reader: VirtualCard::classic_1k(DEMO_UID),
        lcd: FrameLog::default(),
        serial: StdioSerial::detached(),
        clock: ManualClock::new(),
    };
    let mut app = App::new(config);
    app.start(&mut board);

    for step in SCRIPT {
        match *step {
            Step::Press(button) => app.handle_button(&mut board, button),
            Step::Line(line) => {
                println!("{line}");
                app.handle_line(&mut board, line);
            }
            Step::Card(present) => board.reader.set_present(present),
        }
    }

    let out_dir = Path::new("screenshots");
    std::fs::create_dir_all(out_dir).context("creating screenshots/")?;
    let mut panel = lcd::new_panel();
    for (index, frame) in board.lcd.finish().iter().enumerate() {
        let _ = lcd::draw_grid(&mut panel, frame);
        let path = out_dir.join(format!("frame_{index:02}.bmp"));
        lcd::save_bmp(&panel, &path)?;
        let rows: Vec<&str> = (0..LCD_ROWS).map(|row| frame.row(row)).collect();
        info!("Saved {}: {:?}", path.display(), rows);
    }

    info!("All screenshots saved to screenshots/ directory");
    Ok(())
}

fn run_interactive(config: Config) {
    info!("CardMate Simulator starting...");
    info!("Controls:");
    info!("  Arrows: Up/Down/Left/Right");
    info!("  Enter: Select");
    info!("  C: Toggle card on reader");
    info!("  Q/Esc: Quit");
    info!("Console: type menu choices and text in this terminal");

    let board = Board {
        reader: VirtualCard::classic_1k(DEMO_UID),
        lcd: WindowLcd::new("CardMate Simulator"),
        serial: StdioSerial::attached(),
        clock: HostClock::new(),
    };
    let mut runtime = Runtime::new(config, board, KeyQueue::default());
    runtime.start();

    'running: loop {
        let events: Vec<SimulatorEvent> = runtime.board_mut().lcd.window.events().collect();
        for event in events {
            match event {
                SimulatorEvent::Quit => break 'running,
                SimulatorEvent::KeyDown { keycode, .. } => {
                    let button = match keycode {
                        Keycode::Q | Keycode::Escape => break 'running,
                        Keycode::C => {
                            let reader = &mut runtime.board_mut().reader;
                            let present = !reader.is_present();
                            reader.set_present(present);
                            info!("Card {}", if present { "placed" } else { "removed" });
                            continue;
                        }
                        Keycode::Up => Button::Up,
                        Keycode::Down => Button::Down,
                        Keycode::Left => Button::Left,
                        Keycode::Right => Button::Right,
                        Keycode::Return => Button::Select,
                        _ => continue,
                    };
                    runtime.buttons_mut().push(button);
                }
                _ => {}
            }
        }

        runtime.tick();
    }

    info!("Simulator closed.");
}
