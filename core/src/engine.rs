//! Card operation engine.
//!
//! Every operation follows the same shape: wait for a compatible card,
//! authenticate the sector trailer trying each key slot in order, transfer,
//! and deselect the card on the way out whatever happened. Failures are
//! mapped to [`CardError`] here and never retried.

use core::fmt::Write;

use heapless::String;
use log::{debug, info, warn};

use crate::card::{first_block, sector_of, trailer_block, Block, CardInfo, CardReader, BLOCK_SIZE};
use crate::clock::Clock;
use crate::config::Config;
use crate::error::CardError;
use crate::keys::{KeySet, KeySlot};

/// Block holding the operator data (sector 1, trailer 7).
pub const DATA_BLOCK: u8 = 4;

pub const DEFAULT_PAYLOAD: &str = "Hello NFC!";

/// Sectors wiped by format. Sector 0 holds the manufacturer block.
pub const FORMAT_SECTORS: core::ops::RangeInclusive<u8> = 1..=15;

/// Shown instead of bytes outside printable ASCII.
pub const PLACEHOLDER: char = '.';

/// Two hex digits and a separator per byte.
pub const HEX_DUMP_LEN: usize = BLOCK_SIZE * 3;

/// Truncate or blank-pad `bytes` to one block.
pub fn pad_block(bytes: &[u8]) -> Block {
    let mut block = [b' '; BLOCK_SIZE];
    let len = bytes.len().min(BLOCK_SIZE);
    block[..len].copy_from_slice(&bytes[..len]);
    block
}

/// UID prefix and data block of a read card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardReadout {
    pub uid: [u8; 4],
    pub data: Block,
}

impl CardReadout {
    pub fn uid_hex(&self) -> String<8> {
        let mut out = String::new();
        for byte in &self.uid {
            let _ = write!(out, "{byte:02X}");
        }
        out
    }

    /// Data block as text, non-printable bytes replaced by [`PLACEHOLDER`].
    pub fn printable(&self) -> String<BLOCK_SIZE> {
        self.data
            .iter()
            .map(|&b| if (0x20..=0x7E).contains(&b) { b as char } else { PLACEHOLDER })
            .collect()
    }

    /// Space separated hex dump of the data block.
    pub fn hex_dump(&self) -> String<HEX_DUMP_LEN> {
        let mut out = String::new();
        for (i, byte) in self.data.iter().enumerate() {
            let sep = if i == 0 { "" } else { " " };
            let _ = write!(out, "{sep}{byte:02X}");
        }
        out
    }
}

pub struct CardEngine<'a, R, K> {
    reader: &'a mut R,
    clock: &'a mut K,
    keys: &'a KeySet,
    config: &'a Config,
}

impl<'a, R, K> CardEngine<'a, R, K>
where
    R: CardReader,
    K: Clock,
{
    pub fn new(reader: &'a mut R, clock: &'a mut K, keys: &'a KeySet, config: &'a Config) -> Self {
        Self {
            reader,
            clock,
            keys,
            config,
        }
    }

    /// Poll until a MIFARE Classic card is selected or the timeout expires.
    ///
    /// Blocks the caller for up to `card_timeout_ms`. Unsupported cards are
    /// deselected and polling continues; if one was the last thing seen when
    /// time runs out the outcome is [`CardError::IncompatibleCardType`].
    pub fn wait_for_card(&mut self) -> Result<CardInfo, CardError> {
        let started = self.clock.now_ms();
        let timeout = u64::from(self.config.card_timeout_ms);
        let mut saw_incompatible = false;

        loop {
            match self.reader.detect() {
                Ok(Some(card)) if card.card_type.is_supported() => {
                    info!("Card detected: {} uid={:02X?}", card.card_type.name(), card.uid.as_slice());
                    return Ok(card);
                }
                Ok(Some(card)) => {
                    warn!("Ignoring unsupported card (SAK {:#04x})", card.card_type.sak());
                    self.reader.deselect();
                    saw_incompatible = true;
                }
                Ok(None) => saw_incompatible = false,
                Err(err) => debug!("Card detect error: {err:?}"),
            }

            if self.clock.now_ms().saturating_sub(started) >= timeout {
                warn!("No compatible card within {timeout} ms");
                return Err(if saw_incompatible {
                    CardError::IncompatibleCardType
                } else {
                    CardError::NoCardDetected
                });
            }
            self.clock.delay_ms(self.config.card_poll_interval_ms);
        }
    }

    /// Authenticate the sector of `trailer` with slots 0, 1, 2, stopping at
    /// the first key the card accepts.
    pub fn authenticate(&mut self, trailer: u8) -> Result<KeySlot, CardError> {
        for (slot, key) in self.keys.iter() {
            match self.reader.authenticate(key, trailer) {
                Ok(()) => {
                    debug!("Block {trailer} authenticated with {slot:?} key");
                    return Ok(slot);
                }
                Err(err) => debug!("{slot:?} key rejected for block {trailer}: {err:?}"),
            }
        }
        warn!("Authentication failed for block {trailer} with all keys");
        Err(CardError::AuthenticationFailed { block: trailer })
    }

    pub fn read_block(&mut self, block: u8) -> Result<Block, CardError> {
        self.reader.read_block(block).map_err(|err| {
            warn!("Read of block {block} failed: {err:?}");
            CardError::TransferFailed { block }
        })
    }

    pub fn write_block(&mut self, block: u8, data: &Block) -> Result<(), CardError> {
        self.reader.write_block(block, data).map_err(|err| {
            warn!("Write of block {block} failed: {err:?}");
            CardError::TransferFailed { block }
        })
    }

    /// Write [`DEFAULT_PAYLOAD`] to the data block.
    pub fn write_default(&mut self) -> Result<Block, CardError> {
        self.write_text(DEFAULT_PAYLOAD)
    }

    /// Write `text`, truncated or blank-padded to 16 bytes, to the data block.
    /// Returns the block as written.
    pub fn write_text(&mut self, text: &str) -> Result<Block, CardError> {
        let block = pad_block(text.as_bytes());
        self.session(|engine, _| {
            engine.authenticate(trailer_block(sector_of(DATA_BLOCK)))?;
            engine.write_block(DATA_BLOCK, &block)?;
            info!("Wrote block {DATA_BLOCK}");
            Ok(block)
        })
    }

    pub fn read(&mut self) -> Result<CardReadout, CardError> {
        self.session(|engine, card| {
            engine.authenticate(trailer_block(sector_of(DATA_BLOCK)))?;
            let data = engine.read_block(DATA_BLOCK)?;
            Ok(CardReadout {
                uid: card.uid_prefix(),
                data,
            })
        })
    }

    /// Zero the data blocks of sectors 1-15, stopping at the first sector that
    /// fails. Returns the number of sectors wiped.
    pub fn format(&mut self) -> Result<u8, CardError> {
        self.session(|engine, _| {
            let mut wiped = 0;
            for sector in FORMAT_SECTORS {
                let trailer = trailer_block(sector);
                engine.authenticate(trailer).inspect_err(|_| {
                    warn!("Format aborted at sector {sector}");
                })?;
                for block in first_block(sector)..trailer {
                    engine.write_block(block, &[0u8; BLOCK_SIZE]).inspect_err(|_| {
                        warn!("Format aborted at sector {sector}");
                    })?;
                }
                debug!("Sector {sector} wiped");
                wiped += 1;
            }
            info!("Format complete, {wiped} sectors wiped");
            Ok(wiped)
        })
    }

    /// Run `op` against a selected card. The reader is halted on every exit,
    /// including a wait that timed out.
    fn session<T>(
        &mut self,
        op: impl FnOnce(&mut Self, &CardInfo) -> Result<T, CardError>,
    ) -> Result<T, CardError> {
        let result = self.wait_for_card().and_then(|card| op(self, &card));
        self.reader.deselect();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_and_truncates() {
        assert_eq!(&pad_block(b"Hello NFC!"), b"Hello NFC!      ");
        assert_eq!(&pad_block(b"0123456789ABCDEFXYZ"), b"0123456789ABCDEF");
        assert_eq!(&pad_block(b""), &[b' '; 16]);
    }

    #[test]
    fn readout_rendering() {
        let mut data = *b"Hi there        ";
        data[2] = 0x00;
        data[15] = 0xFF;
        let readout = CardReadout {
            uid: [0xDE, 0xAD, 0xBE, 0xEF],
            data,
        };
        assert_eq!(readout.uid_hex().as_str(), "DEADBEEF");
        assert_eq!(readout.printable().as_str(), "Hi.there       .");
        assert!(readout.hex_dump().starts_with("48 69 00 74"));
        assert!(readout.hex_dump().ends_with("20 FF"));
        assert_eq!(readout.hex_dump().len(), 47);
    }
}
