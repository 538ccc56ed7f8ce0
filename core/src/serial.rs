//! Serial console: byte input, text output, and line assembly.

use heapless::String;
use log::warn;

/// Longest line the console keeps; extra characters are dropped.
pub const LINE_CAPACITY: usize = 64;

/// Echoed after a backspace to wipe the character on the terminal.
pub const ERASE_SEQUENCE: &str = "\x08 \x08";

/// Byte-oriented console. Output goes through [`core::fmt::Write`]; write
/// errors are ignored since there is nobody to report them to.
pub trait SerialPort: core::fmt::Write {
    /// Next received byte, `None` if the receive buffer is empty.
    fn read_byte(&mut self) -> Option<u8>;
}

/// What a received byte did to the pending line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feed {
    /// Appended to the pending line.
    Buffered,
    /// Removed the last pending character; echo [`ERASE_SEQUENCE`].
    Erased,
    /// Ignored: control byte, overflow, empty line or nothing to erase.
    Ignored,
    /// A terminator completed a non-empty line.
    Line(String<LINE_CAPACITY>),
}

#[derive(Debug, Default, Clone)]
pub struct LineBuffer {
    line: String<LINE_CAPACITY>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, byte: u8) -> Feed {
        match byte {
            b'\n' | b'\r' if self.line.is_empty() => Feed::Ignored,
            b'\n' | b'\r' => Feed::Line(core::mem::take(&mut self.line)),
            0x08 | 0x7F => match self.line.pop() {
                Some(_) => Feed::Erased,
                None => Feed::Ignored,
            },
            0x20..=0x7E => match self.line.push(byte as char) {
                Ok(()) => Feed::Buffered,
                Err(()) => {
                    warn!("Serial line longer than {LINE_CAPACITY} characters, dropping input");
                    Feed::Ignored
                }
            },
            _ => Feed::Ignored,
        }
    }

    pub fn pending(&self) -> &str {
        &self.line
    }
}
