//! Host stand-ins for the board's clock, console and keypad.

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, Read, Write as _};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use cardmate_core::{Button, ButtonSource, Clock, SerialPort};
use embedded_hal::delay::DelayNs;

/// Wall clock backed by [`Instant`]; delays sleep the thread.
pub struct HostClock {
    origin: Instant,
}

impl HostClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl DelayNs for HostClock {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

impl Clock for HostClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Console on stdout, fed from stdin by a reader thread when attached.
pub struct StdioSerial {
    rx: Option<Receiver<u8>>,
}

impl StdioSerial {
    /// Output only.
    pub fn detached() -> Self {
        Self { rx: None }
    }

    /// Spawn a thread forwarding stdin bytes.
    pub fn attached() -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for byte in io::stdin().lock().bytes() {
                let Ok(byte) = byte else { break };
                if tx.send(byte).is_err() {
                    break;
                }
            }
            log::debug!("stdin closed");
        });
        Self { rx: Some(rx) }
    }
}

impl fmt::Write for StdioSerial {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut stdout = io::stdout().lock();
        stdout.write_all(s.as_bytes()).map_err(|_| fmt::Error)?;
        stdout.flush().map_err(|_| fmt::Error)
    }
}

impl SerialPort for StdioSerial {
    fn read_byte(&mut self) -> Option<u8> {
        let rx = self.rx.as_ref()?;
        match rx.try_recv() {
            Ok(byte) => Some(byte),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.rx = None;
                None
            }
        }
    }
}

/// Button presses queued from window key events.
#[derive(Default)]
pub struct KeyQueue {
    pending: VecDeque<Button>,
}

impl KeyQueue {
    pub fn push(&mut self, button: Button) {
        self.pending.push_back(button);
    }
}

impl ButtonSource for KeyQueue {
    fn sample(&mut self) -> Option<Button> {
        self.pending.pop_front()
    }
}
