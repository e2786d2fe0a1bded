//! Sine oscillator module.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use libm::sinf;
use telar_core::{AudioConfig, Buffer, Message, Module, Record, Socket};

const TAU: f32 = core::f32::consts::TAU;

/// Phase-accumulating sine oscillator (0 inputs / 1 output).
///
/// Frequency and amplitude are settable by message (`"frequency"`,
/// `"amplitude"` float fields) and by control inputs 0 and 1.
#[derive(Clone, Debug)]
pub struct SineOscillator {
    frequency: f32,
    amplitude: f32,
    phase: f32,
}

impl SineOscillator {
    /// Creates an oscillator at the given frequency with unit amplitude.
    pub fn new(frequency: f32) -> Self {
        Self {
            frequency,
            amplitude: 1.0,
            phase: 0.0,
        }
    }

    /// Current frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Sets the frequency in Hz.
    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
    }

    /// Sets the output amplitude.
    pub fn set_amplitude(&mut self, amplitude: f32) {
        self.amplitude = amplitude;
    }

    /// Resets the phase to zero.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

impl Module for SineOscillator {
    fn num_inputs(&self) -> usize {
        0
    }

    fn num_outputs(&self) -> usize {
        1
    }

    fn synthesize(&mut self, _inputs: &[Socket], outputs: &mut [Buffer], config: &AudioConfig) {
        let increment = self.frequency / config.sample_rate;
        for sample in outputs[0].as_mut_slice() {
            *sample = sinf(TAU * self.phase) * self.amplitude;
            self.phase += increment;
            if self.phase >= 1.0 {
                self.phase -= libm::floorf(self.phase);
            }
        }
    }

    fn receive_message(&mut self, payload: &Record, _config: &AudioConfig) -> Vec<Message> {
        if let Some(frequency) = payload.float("frequency") {
            self.frequency = frequency;
        }
        if let Some(amplitude) = payload.float("amplitude") {
            self.amplitude = amplitude;
        }
        Vec::new()
    }

    fn receive_control(&mut self, value: f32, input: usize) {
        match input {
            0 => self.frequency = value,
            1 => self.amplitude = value,
            _ => {}
        }
    }
}
