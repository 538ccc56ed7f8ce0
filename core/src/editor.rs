//! Keypad editors for the custom text and the user key.
//!
//! Both editors are fixed-capacity arrays with an explicit logical length.
//! Writing past the end fills the gap (spaces for text, `0` for hex) so the
//! length is always the smallest one covering the highest written position.

use core::str;

use crate::error::CardError;
use crate::keys::{parse_hex_key, Key, KEY_HEX_LEN};

/// Cells in the text editor; one LCD row, one card block.
///
/// The cursor addresses a cell, so its last reachable position is
/// `TEXT_CAPACITY - 1` (15).
pub const TEXT_CAPACITY: usize = 16;

/// Characters reachable with up/down, in cycling order. Index 0 is space.
pub const ALPHABET: &[u8; 95] = b" ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

pub const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Drop trailing spaces.
pub fn trim_trailing_spaces(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| b != b' ').map_or(0, |pos| pos + 1);
    &bytes[..end]
}

fn alphabet_index(ch: u8) -> usize {
    ALPHABET.iter().position(|&c| c == ch).unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEditBuffer {
    cells: [u8; TEXT_CAPACITY],
    len: usize,
    cursor: usize,
    candidate: usize,
}

impl TextEditBuffer {
    pub fn new() -> Self {
        Self {
            cells: [b' '; TEXT_CAPACITY],
            len: 0,
            cursor: 0,
            candidate: 0,
        }
    }

    /// Next alphabet character, written at the cursor.
    pub fn next_char(&mut self) {
        self.candidate = (self.candidate + 1) % ALPHABET.len();
        self.commit();
    }

    /// Previous alphabet character, written at the cursor.
    pub fn prev_char(&mut self) {
        self.candidate = (self.candidate + ALPHABET.len() - 1) % ALPHABET.len();
        self.commit();
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
        self.candidate = alphabet_index(self.char_at(self.cursor));
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(TEXT_CAPACITY - 1);
        self.candidate = alphabet_index(self.char_at(self.cursor));
    }

    fn commit(&mut self) {
        // cells past len are always spaces, so growing len pads the gap
        self.cells[self.cursor] = ALPHABET[self.candidate];
        self.len = self.len.max(self.cursor + 1);
    }

    /// Character at `pos`, space if never written.
    pub fn char_at(&self, pos: usize) -> u8 {
        if pos < self.len {
            self.cells[pos]
        } else {
            b' '
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn candidate_index(&self) -> usize {
        self.candidate
    }

    pub fn candidate_char(&self) -> u8 {
        ALPHABET[self.candidate]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Raw cells including trailing spaces.
    pub fn as_str(&self) -> &str {
        str::from_utf8(&self.cells[..self.len]).unwrap_or("")
    }

    /// Effective value: written cells with trailing spaces trimmed.
    pub fn value(&self) -> &str {
        str::from_utf8(trim_trailing_spaces(&self.cells[..self.len])).unwrap_or("")
    }
}

impl Default for TextEditBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of pressing select in the key editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStep {
    /// Digit committed, cursor moved to the next position.
    Next,
    /// Last digit committed; the parsed key or why it was rejected.
    Finished(Result<Key, CardError>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEditBuffer {
    digits: [u8; KEY_HEX_LEN],
    len: usize,
    cursor: usize,
    candidate: usize,
}

impl KeyEditBuffer {
    pub fn new() -> Self {
        Self {
            digits: [b'0'; KEY_HEX_LEN],
            len: 0,
            cursor: 0,
            candidate: 0,
        }
    }

    pub fn next_digit(&mut self) {
        self.candidate = (self.candidate + 1) % HEX_DIGITS.len();
    }

    pub fn prev_digit(&mut self) {
        self.candidate = (self.candidate + HEX_DIGITS.len() - 1) % HEX_DIGITS.len();
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(KEY_HEX_LEN - 1);
    }

    /// Commit the candidate digit at the cursor, then advance or finish.
    pub fn select(&mut self) -> KeyStep {
        self.digits[self.cursor] = HEX_DIGITS[self.candidate];
        self.len = self.len.max(self.cursor + 1);

        if self.cursor < KEY_HEX_LEN - 1 {
            self.cursor += 1;
            KeyStep::Next
        } else {
            KeyStep::Finished(self.finalize())
        }
    }

    /// Convert the accumulated digits; fails unless all 12 are present.
    pub fn finalize(&self) -> Result<Key, CardError> {
        parse_hex_key(self.as_str())
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn candidate_digit(&self) -> u8 {
        HEX_DIGITS[self.candidate]
    }

    /// Digit at `pos` if it has been written.
    pub fn digit_at(&self, pos: usize) -> Option<u8> {
        (pos < self.len).then(|| self.digits[pos])
    }

    pub fn as_str(&self) -> &str {
        str::from_utf8(&self.digits[..self.len]).unwrap_or("")
    }
}

impl Default for KeyEditBuffer {
    fn default() -> Self {
        Self::new()
    }
}
