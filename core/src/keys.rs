//! Authentication key table.
//!
//! Three fixed slots tried in order by the card engine: the factory default,
//! a fixed secondary key, and one user key that the operator can replace from
//! either front-end. Nothing is persisted; the user slot is back to the
//! factory value after a power cycle.

use core::fmt::Write;

use heapless::String;
use log::info;

use crate::error::CardError;

pub const KEY_LEN: usize = 6;

/// Hex characters in a printed key.
pub const KEY_HEX_LEN: usize = KEY_LEN * 2;

pub type Key = [u8; KEY_LEN];

/// Transport key every blank MIFARE Classic ships with.
pub const FACTORY_KEY: Key = [0xFF; KEY_LEN];

/// NFC Forum public key A used by NDEF-formatted sectors.
pub const SECONDARY_KEY: Key = [0xD3, 0xF7, 0xD3, 0xF7, 0xD3, 0xF7];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySlot {
    Factory,
    Secondary,
    User,
}

impl KeySlot {
    /// Authentication order: factory first since blank cards are the common
    /// case, user key last.
    pub const ALL: [KeySlot; 3] = [KeySlot::Factory, KeySlot::Secondary, KeySlot::User];

    pub fn index(self) -> usize {
        match self {
            KeySlot::Factory => 0,
            KeySlot::Secondary => 1,
            KeySlot::User => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySet {
    keys: [Key; 3],
}

impl KeySet {
    pub fn new() -> Self {
        Self {
            keys: [FACTORY_KEY, SECONDARY_KEY, FACTORY_KEY],
        }
    }

    pub fn get(&self, slot: KeySlot) -> &Key {
        &self.keys[slot.index()]
    }

    pub fn user_key(&self) -> &Key {
        self.get(KeySlot::User)
    }

    /// Slots with their keys in authentication order.
    pub fn iter(&self) -> impl Iterator<Item = (KeySlot, &Key)> + '_ {
        KeySlot::ALL.into_iter().map(move |slot| (slot, self.get(slot)))
    }

    pub fn set_user_key(&mut self, key: Key) {
        self.keys[KeySlot::User.index()] = key;
        info!("User key set to {}", format_key(&key));
    }

    /// Parse `text` as a key and install it in the user slot.
    ///
    /// On error the slot keeps its previous value.
    pub fn install_user_key(&mut self, text: &str) -> Result<Key, CardError> {
        let key = parse_hex_key(text)?;
        self.set_user_key(key);
        Ok(key)
    }
}

impl Default for KeySet {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse exactly 12 hex digits (either case, surrounding whitespace ignored),
/// most significant nibble first.
pub fn parse_hex_key(text: &str) -> Result<Key, CardError> {
    let digits = text.trim();
    // from_str_radix also accepts a leading '+'
    if digits.len() != KEY_HEX_LEN || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CardError::InvalidKeyFormat);
    }

    let mut key = [0u8; KEY_LEN];
    for (i, byte) in key.iter_mut().enumerate() {
        let pair = digits.get(i * 2..i * 2 + 2).ok_or(CardError::InvalidKeyFormat)?;
        *byte = u8::from_str_radix(pair, 16).map_err(|_| CardError::InvalidKeyFormat)?;
    }
    Ok(key)
}

/// Uppercase hex without separators, e.g. `FFFFFFFFFFFF`.
pub fn format_key(key: &Key) -> String<KEY_HEX_LEN> {
    let mut out = String::new();
    for byte in key {
        let _ = write!(out, "{byte:02X}");
    }
    out
}
