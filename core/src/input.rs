//! Keypad input: analog ladder decoding and press rate limiting.

use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Right,
    Up,
    Down,
    Left,
    Select,
}

impl Button {
    /// Decode a 10-bit reading from the resistor-ladder keypad of an LCD
    /// shield. Readings above the select band mean no key is pressed.
    pub fn from_adc(raw: u16) -> Option<Button> {
        match raw {
            0..=59 => Some(Button::Right),
            60..=199 => Some(Button::Up),
            200..=399 => Some(Button::Down),
            400..=599 => Some(Button::Left),
            600..=799 => Some(Button::Select),
            _ => None,
        }
    }
}

/// Anything that can report the currently held button.
pub trait ButtonSource {
    fn sample(&mut self) -> Option<Button>;
}

/// Keypad read through an ADC channel.
///
/// `read` returns the raw 10-bit conversion; wrap the HAL's one-shot ADC read
/// in a closure.
pub struct AnalogKeypad<F> {
    read: F,
}

impl<F> AnalogKeypad<F>
where
    F: FnMut() -> u16,
{
    pub fn new(read: F) -> Self {
        Self { read }
    }
}

impl<F> ButtonSource for AnalogKeypad<F>
where
    F: FnMut() -> u16,
{
    fn sample(&mut self) -> Option<Button> {
        Button::from_adc((self.read)())
    }
}

/// Accepts a press only when the previous accepted one is at least
/// `interval_ms` old. A held key therefore repeats at that rate.
#[derive(Debug, Clone)]
pub struct Debouncer {
    interval_ms: u64,
    last_accepted: Option<u64>,
}

impl Debouncer {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms: u64::from(interval_ms),
            last_accepted: None,
        }
    }

    pub fn accept(&mut self, now_ms: u64) -> bool {
        match self.last_accepted {
            Some(last) if now_ms.saturating_sub(last) < self.interval_ms => {
                debug!("Press ignored, {} ms since last", now_ms.saturating_sub(last));
                false
            }
            _ => {
                self.last_accepted = Some(now_ms);
                true
            }
        }
    }
}
