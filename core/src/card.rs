//! Card access service boundary and MIFARE Classic memory layout.
//!
//! The reader chip driver (anticollision, Crypto-1, block commands) lives
//! behind [`CardReader`]. Layout used by everything above it:
//!
//! - 16-byte blocks, 4 blocks per sector (sectors 0-31)
//! - block `4N + 3` is the sector trailer holding the keys and access bits
//! - sector 0 block 0 is the manufacturer block and is never written

use heapless::Vec;

use crate::keys::Key;

pub const BLOCK_SIZE: usize = 16;
pub const BLOCKS_PER_SECTOR: u8 = 4;

/// Longest ISO 14443A UID (triple size).
pub const MAX_UID_LEN: usize = 10;

pub type Block = [u8; BLOCK_SIZE];

/// First block of a sector.
pub const fn first_block(sector: u8) -> u8 {
    sector * BLOCKS_PER_SECTOR
}

/// Trailer (authentication) block of a sector.
pub const fn trailer_block(sector: u8) -> u8 {
    sector * BLOCKS_PER_SECTOR + BLOCKS_PER_SECTOR - 1
}

pub const fn sector_of(block: u8) -> u8 {
    block / BLOCKS_PER_SECTOR
}

pub const fn is_trailer(block: u8) -> bool {
    block % BLOCKS_PER_SECTOR == BLOCKS_PER_SECTOR - 1
}

/// Card family, classified from the SAK byte returned during select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardType {
    Mini,
    Classic1K,
    Classic4K,
    /// Anything else (Ultralight/NTAG, DESFire, Plus in SL3, ...), raw SAK.
    Unsupported(u8),
}

impl CardType {
    pub fn from_sak(sak: u8) -> Self {
        // bit 7 is reserved and some readers leave it set
        match sak & 0x7F {
            0x09 => CardType::Mini,
            0x08 => CardType::Classic1K,
            0x18 => CardType::Classic4K,
            other => CardType::Unsupported(other),
        }
    }

    pub fn sak(&self) -> u8 {
        match self {
            CardType::Mini => 0x09,
            CardType::Classic1K => 0x08,
            CardType::Classic4K => 0x18,
            CardType::Unsupported(sak) => *sak,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, CardType::Unsupported(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            CardType::Mini => "MIFARE Mini",
            CardType::Classic1K => "MIFARE 1K",
            CardType::Classic4K => "MIFARE 4K",
            CardType::Unsupported(_) => "Unsupported",
        }
    }
}

/// A selected card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardInfo {
    /// UID (4, 7, or 10 bytes)
    pub uid: Vec<u8, MAX_UID_LEN>,
    pub card_type: CardType,
}

impl CardInfo {
    /// Build from raw select data; UID bytes past [`MAX_UID_LEN`] are dropped.
    pub fn new(uid: &[u8], sak: u8) -> Self {
        let uid = Vec::from_iter(uid.iter().copied().take(MAX_UID_LEN));
        Self {
            uid,
            card_type: CardType::from_sak(sak),
        }
    }

    /// First four UID bytes, zero-filled for shorter UIDs.
    pub fn uid_prefix(&self) -> [u8; 4] {
        let mut prefix = [0u8; 4];
        for (dst, src) in prefix.iter_mut().zip(self.uid.iter()) {
            *dst = *src;
        }
        prefix
    }
}

/// Opaque card access service.
///
/// Every method maps one-to-one to a reader primitive. Authentication state is
/// kept by the implementation: after `authenticate` succeeds on a trailer,
/// blocks of that sector may be read and written until the next
/// `authenticate` or `deselect`.
pub trait CardReader {
    /// Driver specific failure, logged by the engine before being mapped.
    type Error: core::fmt::Debug;

    /// Look for a card in the field and select it. `Ok(None)` if the field is
    /// empty.
    fn detect(&mut self) -> Result<Option<CardInfo>, Self::Error>;

    /// Authenticate the sector owning `trailer_block` with `key` (key A).
    fn authenticate(&mut self, key: &Key, trailer_block: u8) -> Result<(), Self::Error>;

    fn read_block(&mut self, block: u8) -> Result<Block, Self::Error>;

    fn write_block(&mut self, block: u8, data: &Block) -> Result<(), Self::Error>;

    /// Halt the card and stop crypto. Called after every operation.
    fn deselect(&mut self);
}
