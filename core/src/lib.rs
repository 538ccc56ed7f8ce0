//! CardMate core - hardware-agnostic logic for a MIFARE Classic card station
//!
//! Everything that does not touch a pin lives here: the menu/input state
//! machine shared by the LCD keypad and the serial console, the card operation
//! engine (wait, authenticate with key fallback, transfer, halt), the key
//! store and the two editors. Hardware is reached only through the traits in
//! [`card`], [`display`], [`serial`], [`input`] and [`clock`], so the firmware
//! image, the desktop simulator and the tests all run the same code.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod app;
pub mod card;
pub mod clock;
pub mod config;
pub mod display;
pub mod editor;
pub mod engine;
pub mod error;
pub mod input;
pub mod keys;
mod render;
pub mod runtime;
pub mod serial;
pub mod state;
pub mod virtual_card;

pub use app::{App, Board, Channel};
pub use card::{Block, CardInfo, CardReader, CardType};
pub use clock::{Clock, ManualClock};
pub use config::Config;
pub use display::{CharDisplay, CharGrid, LCD_COLS, LCD_ROWS};
pub use editor::{KeyEditBuffer, KeyStep, TextEditBuffer, ALPHABET};
pub use engine::{CardEngine, CardReadout, DATA_BLOCK, DEFAULT_PAYLOAD};
pub use error::CardError;
pub use input::{AnalogKeypad, Button, ButtonSource, Debouncer};
pub use keys::{Key, KeySet, KeySlot, FACTORY_KEY, SECONDARY_KEY};
pub use runtime::Runtime;
pub use serial::{Feed, LineBuffer, SerialPort};
pub use state::{InteractionState, MenuItem, MenuSelection};
pub use virtual_card::{VirtualCard, VirtualCardError};
