//! Menu/input state machine.
//!
//! [`App`] owns the interaction mode shared by the keypad/LCD and the serial
//! console, the two editors, and the key table. It reacts to discrete events
//! (one accepted button press, one complete console line) and drives the
//! hardware handed to it in a [`Board`].
//!
//! Both front-ends always see the same mode. The editors are separate though:
//! a text edit started on the keypad can be finished by a console line, in
//! which case the keypad buffer is simply dropped.

use core::fmt::Write;

use heapless::String;
use log::{debug, info, warn};

use crate::card::{Block, CardReader};
use crate::clock::Clock;
use crate::config::Config;
use crate::display::CharDisplay;
use crate::editor::{trim_trailing_spaces, KeyEditBuffer, KeyStep, TextEditBuffer, TEXT_CAPACITY};
use crate::engine::{CardEngine, CardReadout, DEFAULT_PAYLOAD};
use crate::error::CardError;
use crate::input::Button;
use crate::keys::{format_key, parse_hex_key, Key, KeySet};
use crate::render;
use crate::serial::SerialPort;
use crate::state::{InteractionState, MenuItem, MenuSelection};

/// The peripherals the state machine drives.
pub struct Board<R, D, S, K> {
    pub reader: R,
    pub lcd: D,
    pub serial: S,
    pub clock: K,
}

/// Front-end an event came from. Keypad-initiated results stay on the LCD
/// for the hold delay; console-initiated ones return to the menu at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Keypad,
    Serial,
}

enum CardOp<'t> {
    Write(&'t str),
    Read,
    Format,
}

enum Outcome {
    Written(Block),
    Read(CardReadout),
    Formatted(u8),
}

#[derive(Debug, Clone)]
pub struct App {
    state: InteractionState,
    selection: MenuSelection,
    text: Option<TextEditBuffer>,
    key: Option<KeyEditBuffer>,
    keys: KeySet,
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            state: InteractionState::MainMenu,
            selection: MenuSelection::default(),
            text: None,
            key: None,
            keys: KeySet::new(),
            config,
        }
    }

    /// Greet on the console and draw the main menu on both front-ends.
    pub fn start<R, D, S, K>(&mut self, board: &mut Board<R, D, S, K>)
    where
        D: CharDisplay,
        S: SerialPort,
    {
        render::serial_banner(&mut board.serial);
        self.enter_main_menu(board);
    }

    /// Handle one accepted (already debounced) keypad press.
    pub fn handle_button<R, D, S, K>(&mut self, board: &mut Board<R, D, S, K>, button: Button)
    where
        R: CardReader,
        D: CharDisplay,
        S: SerialPort,
        K: Clock,
    {
        debug!("Button {button:?} in {:?}", self.state);
        match self.state {
            InteractionState::MainMenu => match button {
                Button::Up => {
                    self.selection.prev();
                    render::lcd_menu(&mut board.lcd, &self.selection);
                }
                Button::Down => {
                    self.selection.next();
                    render::lcd_menu(&mut board.lcd, &self.selection);
                }
                Button::Select => self.dispatch(board, self.selection.current(), Channel::Keypad),
                Button::Left | Button::Right => {}
            },
            InteractionState::TextInput => self.on_text_button(board, button),
            InteractionState::KeyInput => self.on_key_button(board, button),
            InteractionState::Processing => {}
            InteractionState::SerialTextInput | InteractionState::SerialKeyInput => {
                if button == Button::Select {
                    info!("Console input cancelled from keypad");
                    self.enter_main_menu(board);
                }
            }
        }
    }

    /// Handle one complete, non-empty console line.
    pub fn handle_line<R, D, S, K>(&mut self, board: &mut Board<R, D, S, K>, line: &str)
    where
        R: CardReader,
        D: CharDisplay,
        S: SerialPort,
        K: Clock,
    {
        debug!("Console line {line:?} in {:?}", self.state);
        match self.state {
            InteractionState::MainMenu => match line.trim() {
                "?" | "h" | "help" => render::serial_menu(&mut board.serial),
                choice => match MenuItem::from_serial(choice) {
                    Some(item) => self.dispatch(board, item, Channel::Serial),
                    None => render::serial_invalid_option(&mut board.serial, choice),
                },
            },
            InteractionState::TextInput | InteractionState::SerialTextInput => {
                self.text = None;
                self.run_card_op(board, MenuItem::WriteCustom, CardOp::Write(line), Channel::Serial);
            }
            InteractionState::KeyInput | InteractionState::SerialKeyInput => {
                self.key = None;
                self.change_key(board, parse_hex_key(line), Channel::Serial);
            }
            InteractionState::Processing => debug!("Console line ignored while processing"),
        }
    }

    fn dispatch<R, D, S, K>(&mut self, board: &mut Board<R, D, S, K>, item: MenuItem, channel: Channel)
    where
        R: CardReader,
        D: CharDisplay,
        S: SerialPort,
        K: Clock,
    {
        info!("{} selected from {channel:?}", item.label());
        match (item, channel) {
            (MenuItem::WriteDefault, _) => self.run_card_op(board, item, CardOp::Write(DEFAULT_PAYLOAD), channel),
            (MenuItem::ReadCard, _) => self.run_card_op(board, item, CardOp::Read, channel),
            (MenuItem::FormatCard, _) => self.run_card_op(board, item, CardOp::Format, channel),
            (MenuItem::WriteCustom, Channel::Keypad) => {
                let text = self.text.insert(TextEditBuffer::new());
                self.state = InteractionState::TextInput;
                render::lcd_text_editor(&mut board.lcd, text);
                render::serial_text_prompt(&mut board.serial);
            }
            (MenuItem::WriteCustom, Channel::Serial) => {
                self.state = InteractionState::SerialTextInput;
                render::lcd_serial_prompt(&mut board.lcd);
                render::serial_text_prompt(&mut board.serial);
            }
            (MenuItem::ChangeKey, Channel::Keypad) => {
                let key = self.key.insert(KeyEditBuffer::new());
                self.state = InteractionState::KeyInput;
                render::lcd_key_editor(&mut board.lcd, key);
                render::serial_key_prompt(&mut board.serial);
            }
            (MenuItem::ChangeKey, Channel::Serial) => {
                self.state = InteractionState::SerialKeyInput;
                render::lcd_serial_prompt(&mut board.lcd);
                render::serial_key_prompt(&mut board.serial);
            }
        }
    }

    fn on_text_button<R, D, S, K>(&mut self, board: &mut Board<R, D, S, K>, button: Button)
    where
        R: CardReader,
        D: CharDisplay,
        S: SerialPort,
        K: Clock,
    {
        let Some(text) = self.text.as_mut() else {
            return self.enter_main_menu(board);
        };
        match button {
            Button::Up => text.next_char(),
            Button::Down => text.prev_char(),
            Button::Left => text.move_left(),
            Button::Right => text.move_right(),
            Button::Select => {
                let value: String<TEXT_CAPACITY> = String::try_from(text.value()).unwrap_or_default();
                self.text = None;
                self.run_card_op(board, MenuItem::WriteCustom, CardOp::Write(&value), Channel::Keypad);
                return;
            }
        }
        render::lcd_text_editor(&mut board.lcd, text);
    }

    fn on_key_button<R, D, S, K>(&mut self, board: &mut Board<R, D, S, K>, button: Button)
    where
        R: CardReader,
        D: CharDisplay,
        S: SerialPort,
        K: Clock,
    {
        let Some(key) = self.key.as_mut() else {
            return self.enter_main_menu(board);
        };
        match button {
            Button::Up => key.next_digit(),
            Button::Down => key.prev_digit(),
            Button::Left => key.move_left(),
            Button::Right => key.move_right(),
            Button::Select => {
                if let KeyStep::Finished(result) = key.select() {
                    self.key = None;
                    self.change_key(board, result, Channel::Keypad);
                    return;
                }
            }
        }
        render::lcd_key_editor(&mut board.lcd, key);
    }

    fn run_card_op<R, D, S, K>(
        &mut self,
        board: &mut Board<R, D, S, K>,
        item: MenuItem,
        op: CardOp<'_>,
        channel: Channel,
    ) where
        R: CardReader,
        D: CharDisplay,
        S: SerialPort,
        K: Clock,
    {
        self.state = InteractionState::Processing;
        render::lcd_waiting(&mut board.lcd, item);
        render::serial_waiting(&mut board.serial, item);

        let result = {
            let mut engine = CardEngine::new(&mut board.reader, &mut board.clock, &self.keys, &self.config);
            match op {
                CardOp::Write(text) => engine.write_text(text).map(Outcome::Written),
                CardOp::Read => engine.read().map(Outcome::Read),
                CardOp::Format => engine.format().map(Outcome::Formatted),
            }
        };

        match result {
            Ok(Outcome::Written(block)) => {
                let text = core::str::from_utf8(trim_trailing_spaces(&block)).unwrap_or("");
                info!("{} succeeded: {text:?}", item.label());
                render::lcd_status(&mut board.lcd, "Write OK", text);
                render::serial_written(&mut board.serial, item, text);
            }
            Ok(Outcome::Read(readout)) => {
                info!("Read card {}: {:?}", readout.uid_hex(), readout.printable());
                render::lcd_readout(&mut board.lcd, &readout);
                render::serial_readout(&mut board.serial, &readout);
            }
            Ok(Outcome::Formatted(sectors)) => {
                let mut summary: String<16> = String::new();
                let _ = write!(summary, "{sectors} sectors wiped");
                render::lcd_status(&mut board.lcd, "Format OK", &summary);
                render::serial_formatted(&mut board.serial, sectors);
            }
            Err(err) => {
                warn!("{} failed: {err}", item.label());
                render::lcd_status(&mut board.lcd, item.label(), err.status());
                render::serial_failure(&mut board.serial, item, &err);
            }
        }
        self.finish(board, channel);
    }

    fn change_key<R, D, S, K>(
        &mut self,
        board: &mut Board<R, D, S, K>,
        result: Result<Key, CardError>,
        channel: Channel,
    ) where
        D: CharDisplay,
        S: SerialPort,
        K: Clock,
    {
        self.state = InteractionState::Processing;
        match result {
            Ok(key) => {
                self.keys.set_user_key(key);
                render::lcd_status(&mut board.lcd, "Key changed", &format_key(&key));
                render::serial_key_changed(&mut board.serial, &key);
            }
            Err(err) => {
                warn!("Key change rejected: {err}");
                render::lcd_status(&mut board.lcd, MenuItem::ChangeKey.label(), err.status());
                render::serial_failure(&mut board.serial, MenuItem::ChangeKey, &err);
            }
        }
        self.finish(board, channel);
    }

    fn finish<R, D, S, K>(&mut self, board: &mut Board<R, D, S, K>, channel: Channel)
    where
        D: CharDisplay,
        S: SerialPort,
        K: Clock,
    {
        if channel == Channel::Keypad {
            board.clock.delay_ms(self.config.result_hold_ms);
        }
        self.enter_main_menu(board);
    }

    fn enter_main_menu<R, D, S, K>(&mut self, board: &mut Board<R, D, S, K>)
    where
        D: CharDisplay,
        S: SerialPort,
    {
        self.state = InteractionState::MainMenu;
        self.text = None;
        self.key = None;
        render::lcd_menu(&mut board.lcd, &self.selection);
        render::serial_menu(&mut board.serial);
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn selection(&self) -> MenuSelection {
        self.selection
    }

    pub fn keys(&self) -> &KeySet {
        &self.keys
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Keypad text editor, present only in [`InteractionState::TextInput`].
    pub fn text_editor(&self) -> Option<&TextEditBuffer> {
        self.text.as_ref()
    }

    /// Keypad key editor, present only in [`InteractionState::KeyInput`].
    pub fn key_editor(&self) -> Option<&KeyEditBuffer> {
        self.key.as_ref()
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
