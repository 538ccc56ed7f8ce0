//! Timing configuration.
//!
//! Nothing here is persisted: the device boots with [`Config::default`] every
//! time. The simulator overrides individual fields from its command line.

/// Timing knobs for the control loop and the card engine (all milliseconds).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Minimum gap between two accepted keypad presses.
    pub button_debounce_ms: u32,
    /// How long a result stays on the LCD before the menu comes back.
    pub result_hold_ms: u32,
    /// How long to wait for a compatible card before giving up.
    pub card_timeout_ms: u32,
    /// Delay between two card detection attempts.
    pub card_poll_interval_ms: u32,
    /// Sleep at the end of every control loop tick.
    pub tick_interval_ms: u32,
}

impl Config {
    pub const DEFAULT_BUTTON_DEBOUNCE_MS: u32 = 200;
    pub const DEFAULT_RESULT_HOLD_MS: u32 = 2_000;
    pub const DEFAULT_CARD_TIMEOUT_MS: u32 = 10_000;
    pub const DEFAULT_CARD_POLL_INTERVAL_MS: u32 = 100;
    pub const DEFAULT_TICK_INTERVAL_MS: u32 = 10;

    pub fn with_card_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.card_timeout_ms = timeout_ms;
        self
    }

    pub fn with_result_hold_ms(mut self, hold_ms: u32) -> Self {
        self.result_hold_ms = hold_ms;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            button_debounce_ms: Self::DEFAULT_BUTTON_DEBOUNCE_MS,
            result_hold_ms: Self::DEFAULT_RESULT_HOLD_MS,
            card_timeout_ms: Self::DEFAULT_CARD_TIMEOUT_MS,
            card_poll_interval_ms: Self::DEFAULT_CARD_POLL_INTERVAL_MS,
            tick_interval_ms: Self::DEFAULT_TICK_INTERVAL_MS,
        }
    }
}
