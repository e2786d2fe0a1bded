//! One-pole control-rate smoother.

use libm::expf;
use telar_core::{AudioConfig, Control, Record};

/// Lags toward a target value with an exponential (RC-like) response, one
/// step per block.
///
/// Control input 0 sets the target; output 0 reads the smoothed value.
/// Addressed payloads may set `"target"`, snap with `"value"`, or change
/// the `"time"` constant in seconds.
#[derive(Clone, Copy, Debug)]
pub struct Smoother {
    value: f32,
    target: f32,
    time_secs: f32,
}

impl Smoother {
    /// Creates a smoother settled at `value` with the given time constant.
    pub fn new(value: f32, time_secs: f32) -> Self {
        Self {
            value,
            target: value,
            time_secs: time_secs.max(0.0),
        }
    }

    /// Current smoothed value.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Sets the target the value lags toward.
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }
}

impl Control for Smoother {
    fn tick(&mut self, _timestamp: u64, config: &AudioConfig) {
        if self.time_secs <= 0.0 {
            self.value = self.target;
            return;
        }
        let alpha = 1.0 - expf(-config.block_seconds() / self.time_secs);
        self.value += (self.target - self.value) * alpha;
    }

    fn control_output(&self, _output: usize) -> f32 {
        self.value
    }

    fn receive_control(&mut self, value: f32, input: usize) {
        if input == 0 {
            self.target = value;
        }
    }

    fn receive_message(&mut self, payload: &Record) {
        if let Some(target) = payload.float("target") {
            self.target = target;
        }
        if let Some(value) = payload.float("value") {
            self.value = value;
            self.target = value;
        }
        if let Some(time) = payload.float("time") {
            self.time_secs = time.max(0.0);
        }
    }
}
