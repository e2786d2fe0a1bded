//! Interval-driven trigger messenger.

#[cfg(not(feature = "std"))]
use alloc::{string::String, vec::Vec};

use telar_core::{AudioConfig, Message, Messenger, Record};

/// Emits a fixed payload to a fixed address at a fixed interval.
///
/// Fire times are tracked as absolute sample positions, so the interval is
/// honored exactly across block boundaries (several fires can land in one
/// block). Addressed payloads control the transport: command `"start"`,
/// command `"stop"`, and an `"interval"` float in seconds.
pub struct Metronome {
    address: String,
    payload: Record,
    interval_secs: f32,
    next_fire: u64,
    running: bool,
}

impl Metronome {
    /// Creates a running metronome. The first fire lands at timestamp zero.
    pub fn new(address: impl Into<String>, payload: Record, interval_secs: f32) -> Self {
        Self {
            address: address.into(),
            payload,
            interval_secs,
            next_fire: 0,
            running: true,
        }
    }

    /// Whether the metronome is currently firing.
    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Messenger for Metronome {
    fn messages(&mut self, timestamp: u64, config: &AudioConfig) -> Vec<Message> {
        let mut out = Vec::new();
        if !self.running {
            return out;
        }
        let interval = config.seconds_to_samples(self.interval_secs).max(1) as u64;
        let block_end = timestamp + config.block_size as u64;
        if self.next_fire < timestamp {
            // stopped and restarted: resume from the current block
            self.next_fire = timestamp;
        }
        while self.next_fire < block_end {
            out.push(Message::new(self.address.clone(), self.payload.clone()));
            self.next_fire += interval;
        }
        out
    }

    fn receive_message(&mut self, payload: &Record) {
        match payload.command() {
            Some("start") => self.running = true,
            Some("stop") => self.running = false,
            _ => {}
        }
        if let Some(interval) = payload.float("interval") {
            self.interval_secs = interval;
        }
    }
}
