//! Control-rate collaborators: messengers and controls.
//!
//! Two kinds of collaborators run once per block, decoupled from the
//! per-sample audio path. [`Messenger`]s produce zero or more addressed
//! [`Message`]s each block — sequencers, clocks, transports. [`Control`]s
//! are ticked each block and exchange scalar values over a lightweight
//! control-only wiring owned by the patch, with no per-sample buffering.
//!
//! Both run before the audio graph is pulled, so anything they trigger is
//! heard in the same block. The timestamp they receive is a monotone sample
//! count advanced by the block size after every block, which gives them
//! sample-accurate scheduling without wall-clock time.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::config::AudioConfig;
use crate::message::{Message, Record};

/// Identifier of a control registered with a patch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ControlId(pub(crate) u32);

impl ControlId {
    /// Returns the raw numeric identifier.
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Produces addressed messages once per block.
pub trait Messenger {
    /// Returns every message the messenger wants delivered during the block
    /// starting at `timestamp` samples.
    fn messages(&mut self, timestamp: u64, config: &AudioConfig) -> Vec<Message>;

    /// Accepts a payload addressed to this messenger (e.g. transport
    /// commands). Malformed payloads are ignored.
    fn receive_message(&mut self, payload: &Record) {
        let _ = payload;
    }
}

/// A control-rate scalar processor.
///
/// Controls are ticked in registration order; after each tick the patch
/// pushes the control's outputs along its control wires, so a control wired
/// from an earlier-registered control sees the fresh value in the same
/// block.
pub trait Control {
    /// Advances the control by one block.
    fn tick(&mut self, timestamp: u64, config: &AudioConfig);

    /// Reads a control output value after the tick.
    fn control_output(&self, output: usize) -> f32;

    /// Accepts a scalar from a control wire.
    fn receive_control(&mut self, value: f32, input: usize) {
        let _ = (value, input);
    }

    /// Accepts a payload addressed to this control. Malformed payloads are
    /// ignored.
    fn receive_message(&mut self, payload: &Record) {
        let _ = payload;
    }
}
