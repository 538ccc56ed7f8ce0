//! Cooperative control loop.
//!
//! One tick: sample the keypad (rate limited), drain every byte the serial
//! port has buffered, sleep for the tick interval. A card operation started
//! from either channel blocks the tick until it completes or times out.
//!
//! The console does its own echo: typed characters, the erase sequence for a
//! backspace and a line break on enter.

use log::{debug, info};

use crate::app::{App, Board};
use crate::card::CardReader;
use crate::clock::Clock;
use crate::config::Config;
use crate::display::CharDisplay;
use crate::input::{ButtonSource, Debouncer};
use crate::serial::{Feed, LineBuffer, SerialPort, ERASE_SEQUENCE};

pub struct Runtime<R, D, S, K, B> {
    app: App,
    board: Board<R, D, S, K>,
    buttons: B,
    debouncer: Debouncer,
    line: LineBuffer,
}

impl<R, D, S, K, B> Runtime<R, D, S, K, B>
where
    R: CardReader,
    D: CharDisplay,
    S: SerialPort,
    K: Clock,
    B: ButtonSource,
{
    pub fn new(config: Config, board: Board<R, D, S, K>, buttons: B) -> Self {
        let debouncer = Debouncer::new(config.button_debounce_ms);
        Self {
            app: App::new(config),
            board,
            buttons,
            debouncer,
            line: LineBuffer::new(),
        }
    }

    /// Draw the initial screens.
    pub fn start(&mut self) {
        info!("CardMate starting");
        self.app.start(&mut self.board);
    }

    /// Handle pending input without sleeping.
    pub fn poll(&mut self) {
        if let Some(button) = self.buttons.sample() {
            if self.debouncer.accept(self.board.clock.now_ms()) {
                self.app.handle_button(&mut self.board, button);
            }
        }

        while let Some(byte) = self.board.serial.read_byte() {
            match self.line.feed(byte) {
                Feed::Line(line) => {
                    let _ = self.board.serial.write_str("\r\n");
                    self.app.handle_line(&mut self.board, &line);
                }
                Feed::Erased => {
                    let _ = self.board.serial.write_str(ERASE_SEQUENCE);
                }
                Feed::Buffered => {
                    let _ = self.board.serial.write_char(char::from(byte));
                }
                Feed::Ignored => debug!("Serial byte {byte:#04x} ignored"),
            }
        }
    }

    /// One loop iteration: [`Runtime::poll`] then sleep.
    pub fn tick(&mut self) {
        self.poll();
        let interval = self.app.config().tick_interval_ms;
        self.board.clock.delay_ms(interval);
    }

    /// Run forever.
    pub fn run(mut self) -> ! {
        self.start();
        loop {
            self.tick();
        }
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn board(&self) -> &Board<R, D, S, K> {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board<R, D, S, K> {
        &mut self.board
    }

    pub fn buttons_mut(&mut self) -> &mut B {
        &mut self.buttons
    }
}
