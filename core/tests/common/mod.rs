//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::fmt;

use cardmate_core::{
    App, Board, Button, ButtonSource, CharDisplay, CharGrid, ManualClock, SerialPort, VirtualCard,
};

pub const UID: [u8; 4] = [0x01, 0x02, 0x03, 0x04];

/// Console with scripted input and captured output.
#[derive(Debug, Default)]
pub struct ScriptedSerial {
    input: VecDeque<u8>,
    pub output: String,
}

impl ScriptedSerial {
    pub fn send(&mut self, text: &str) {
        self.input.extend(text.bytes());
    }

    pub fn send_bytes(&mut self, bytes: &[u8]) {
        self.input.extend(bytes.iter().copied());
    }

    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}

impl fmt::Write for ScriptedSerial {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.output.push_str(s);
        Ok(())
    }
}

impl SerialPort for ScriptedSerial {
    fn read_byte(&mut self) -> Option<u8> {
        self.input.pop_front()
    }
}

/// LCD that keeps every printed string, so screens shown during a hold
/// can be checked after the menu has been redrawn.
#[derive(Debug, Default)]
pub struct RecordingLcd {
    pub grid: CharGrid,
    pub printed: Vec<String>,
}

impl RecordingLcd {
    pub fn saw(&self, text: &str) -> bool {
        self.printed.iter().any(|printed| printed.contains(text))
    }

    pub fn forget(&mut self) {
        self.printed.clear();
    }
}

impl CharDisplay for RecordingLcd {
    fn clear(&mut self) {
        self.grid.clear();
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        self.grid.set_cursor(col, row);
    }

    fn print(&mut self, text: &str) {
        self.printed.push(text.to_string());
        self.grid.print(text);
    }

    fn show_caret(&mut self) {
        self.grid.show_caret();
    }

    fn hide_caret(&mut self) {
        self.grid.hide_caret();
    }
}

/// Keypad replaying queued samples, then reporting `held` forever.
#[derive(Debug, Default)]
pub struct ScriptedButtons {
    pub queue: VecDeque<Option<Button>>,
    pub held: Option<Button>,
}

impl ButtonSource for ScriptedButtons {
    fn sample(&mut self) -> Option<Button> {
        self.queue.pop_front().unwrap_or(self.held)
    }
}

pub type TestBoard = Board<VirtualCard, RecordingLcd, ScriptedSerial, ManualClock>;

pub fn board(card: VirtualCard) -> TestBoard {
    Board {
        reader: card,
        lcd: RecordingLcd::default(),
        serial: ScriptedSerial::default(),
        clock: ManualClock::new(),
    }
}

/// App on the main menu with start-up output discarded.
pub fn started(card: VirtualCard) -> (App, TestBoard) {
    let mut board = board(card);
    let mut app = App::default();
    app.start(&mut board);
    board.serial.output.clear();
    board.lcd.forget();
    (app, board)
}

pub fn press(app: &mut App, board: &mut TestBoard, buttons: &[Button]) {
    for &button in buttons {
        app.handle_button(board, button);
    }
}
