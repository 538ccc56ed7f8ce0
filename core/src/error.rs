//! Outcome taxonomy for card operations and key input.

use thiserror::Error;

/// Why a card operation or key change did not complete.
///
/// Every variant ends the current operation only; the device returns to the
/// main menu and nothing is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CardError {
    #[error("no card detected before timeout")]
    NoCardDetected,

    #[error("card is not a MIFARE Classic MINI/1K/4K")]
    IncompatibleCardType,

    #[error("authentication failed for block {block} with every key")]
    AuthenticationFailed { block: u8 },

    #[error("card rejected transfer of block {block}")]
    TransferFailed { block: u8 },

    #[error("key must be exactly 12 hexadecimal characters")]
    InvalidKeyFormat,
}

impl CardError {
    /// Short status for the second LCD row (at most 16 characters).
    pub fn status(&self) -> &'static str {
        match self {
            CardError::NoCardDetected => "No card found",
            CardError::IncompatibleCardType => "Wrong card type",
            CardError::AuthenticationFailed { .. } => "Auth failed",
            CardError::TransferFailed { .. } => "Transfer failed",
            CardError::InvalidKeyFormat => "Invalid key",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_fit_on_one_lcd_row() {
        let all = [
            CardError::NoCardDetected,
            CardError::IncompatibleCardType,
            CardError::AuthenticationFailed { block: 7 },
            CardError::TransferFailed { block: 4 },
            CardError::InvalidKeyFormat,
        ];
        for err in all {
            assert!(err.status().len() <= crate::display::LCD_COLS as usize);
        }
    }
}
