//! In-memory MIFARE Classic card implementing [`CardReader`].
//!
//! Stands in for reader plus card in the simulator and in tests. Models the
//! parts of the card the engine relies on: per-sector key A, authentication
//! scoped to one sector at a time, trailer writes changing the key, and the
//! card leaving the authenticated state on a failed attempt or deselect.
//! Sectors 0-15 are modelled (blocks 0-63), also for 4K cards.

use log::debug;

use crate::card::{is_trailer, sector_of, trailer_block, Block, CardInfo, CardReader, CardType, BLOCK_SIZE};
use crate::keys::{Key, FACTORY_KEY, KEY_LEN};

pub const VIRTUAL_SECTORS: usize = 16;
pub const VIRTUAL_BLOCKS: usize = VIRTUAL_SECTORS * 4;

/// Access bits of a blank card (transport configuration).
const TRANSPORT_ACCESS: [u8; 4] = [0xFF, 0x07, 0x80, 0x69];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirtualCardError {
    NotPresent,
    OutOfRange(u8),
    NotTrailer(u8),
    WrongKey,
    NotAuthenticated(u8),
    WriteRejected(u8),
    ReadOnly(u8),
}

#[derive(Debug, Clone)]
pub struct VirtualCard {
    present: bool,
    uid: [u8; 4],
    card_type: CardType,
    blocks: [Block; VIRTUAL_BLOCKS],
    authenticated: Option<u8>,
    reject_writes_to: Option<u8>,
    auth_attempts: usize,
    deselects: usize,
}

impl VirtualCard {
    /// Blank 1K card with factory keys, placed on the reader.
    pub fn classic_1k(uid: [u8; 4]) -> Self {
        Self::blank(uid, CardType::Classic1K)
    }

    pub fn blank(uid: [u8; 4], card_type: CardType) -> Self {
        let mut blocks = [[0u8; BLOCK_SIZE]; VIRTUAL_BLOCKS];

        let bcc = uid.iter().fold(0u8, |acc, b| acc ^ b);
        blocks[0][..4].copy_from_slice(&uid);
        blocks[0][4] = bcc;
        blocks[0][5] = card_type.sak();

        for sector in 0..VIRTUAL_SECTORS as u8 {
            blocks[trailer_block(sector) as usize] = trailer(&FACTORY_KEY);
        }

        Self {
            present: true,
            uid,
            card_type,
            blocks,
            authenticated: None,
            reject_writes_to: None,
            auth_attempts: 0,
            deselects: 0,
        }
    }

    pub fn with_sector_key(mut self, sector: u8, key: Key) -> Self {
        self.set_sector_key(sector, key);
        self
    }

    /// Key every sector with `key`.
    pub fn with_key(mut self, key: Key) -> Self {
        for sector in 0..VIRTUAL_SECTORS as u8 {
            self.set_sector_key(sector, key);
        }
        self
    }

    pub fn set_sector_key(&mut self, sector: u8, key: Key) {
        if let Some(block) = self.blocks.get_mut(trailer_block(sector) as usize) {
            block[..KEY_LEN].copy_from_slice(&key);
        }
    }

    pub fn sector_key(&self, sector: u8) -> Key {
        let mut key = [0u8; KEY_LEN];
        if let Some(block) = self.blocks.get(trailer_block(sector) as usize) {
            key.copy_from_slice(&block[..KEY_LEN]);
        }
        key
    }

    pub fn set_present(&mut self, present: bool) {
        self.present = present;
        self.authenticated = None;
    }

    pub fn is_present(&self) -> bool {
        self.present
    }

    pub fn card_type(&self) -> CardType {
        self.card_type
    }

    /// Make writes to `block` fail, e.g. a block locked by its access bits.
    pub fn reject_writes_to(&mut self, block: Option<u8>) {
        self.reject_writes_to = block;
    }

    pub fn block(&self, block: u8) -> Block {
        self.blocks.get(block as usize).copied().unwrap_or([0u8; BLOCK_SIZE])
    }

    pub fn set_block(&mut self, block: u8, data: Block) {
        if let Some(slot) = self.blocks.get_mut(block as usize) {
            *slot = data;
        }
    }

    pub fn auth_attempts(&self) -> usize {
        self.auth_attempts
    }

    pub fn deselects(&self) -> usize {
        self.deselects
    }

    pub fn reset_counters(&mut self) {
        self.auth_attempts = 0;
        self.deselects = 0;
    }

    fn sector_count(&self) -> u8 {
        match self.card_type {
            CardType::Mini => 5,
            _ => VIRTUAL_SECTORS as u8,
        }
    }

    fn check_access(&self, block: u8) -> Result<(), VirtualCardError> {
        if !self.present {
            return Err(VirtualCardError::NotPresent);
        }
        if sector_of(block) >= self.sector_count() {
            return Err(VirtualCardError::OutOfRange(block));
        }
        if self.authenticated != Some(sector_of(block)) {
            return Err(VirtualCardError::NotAuthenticated(block));
        }
        Ok(())
    }
}

fn trailer(key_a: &Key) -> Block {
    let mut block = [0u8; BLOCK_SIZE];
    block[..KEY_LEN].copy_from_slice(key_a);
    block[KEY_LEN..KEY_LEN + 4].copy_from_slice(&TRANSPORT_ACCESS);
    block[KEY_LEN + 4..].copy_from_slice(&FACTORY_KEY);
    block
}

impl CardReader for VirtualCard {
    type Error = VirtualCardError;

    fn detect(&mut self) -> Result<Option<CardInfo>, Self::Error> {
        if !self.present {
            return Ok(None);
        }
        Ok(Some(CardInfo::new(&self.uid, self.card_type.sak())))
    }

    fn authenticate(&mut self, key: &Key, trailer_block: u8) -> Result<(), Self::Error> {
        self.auth_attempts += 1;
        self.authenticated = None;
        if !self.present {
            return Err(VirtualCardError::NotPresent);
        }
        if !is_trailer(trailer_block) {
            return Err(VirtualCardError::NotTrailer(trailer_block));
        }
        let sector = sector_of(trailer_block);
        if sector >= self.sector_count() {
            return Err(VirtualCardError::OutOfRange(trailer_block));
        }
        if self.sector_key(sector) != *key {
            return Err(VirtualCardError::WrongKey);
        }
        self.authenticated = Some(sector);
        Ok(())
    }

    fn read_block(&mut self, block: u8) -> Result<Block, Self::Error> {
        self.check_access(block)?;
        let mut data = self.blocks[block as usize];
        if is_trailer(block) {
            // key A never reads back
            data[..KEY_LEN].fill(0);
        }
        Ok(data)
    }

    fn write_block(&mut self, block: u8, data: &Block) -> Result<(), Self::Error> {
        self.check_access(block)?;
        if block == 0 {
            return Err(VirtualCardError::ReadOnly(block));
        }
        if self.reject_writes_to == Some(block) {
            return Err(VirtualCardError::WriteRejected(block));
        }
        self.blocks[block as usize] = *data;
        Ok(())
    }

    fn deselect(&mut self) {
        debug!("Virtual card halted");
        self.authenticated = None;
        self.deselects += 1;
    }
}
