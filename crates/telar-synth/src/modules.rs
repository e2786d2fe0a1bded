//! Small utility modules: gain, mixing, and control-style ramps.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use telar_core::{AudioConfig, Buffer, Message, Module, Record, Socket};

/// Scales its summed input by a gain factor (1 input / 1 output).
///
/// Gain is settable by message (`"gain"` float field) or control input 0.
#[derive(Clone, Debug)]
pub struct GainModule {
    gain: f32,
}

impl GainModule {
    /// Creates a gain stage with the given factor.
    pub fn new(gain: f32) -> Self {
        Self { gain }
    }

    /// Current gain factor.
    pub fn gain(&self) -> f32 {
        self.gain
    }
}

impl Module for GainModule {
    fn num_inputs(&self) -> usize {
        1
    }

    fn num_outputs(&self) -> usize {
        1
    }

    fn synthesize(&mut self, inputs: &[Socket], outputs: &mut [Buffer], _config: &AudioConfig) {
        for (out, inp) in outputs[0]
            .as_mut_slice()
            .iter_mut()
            .zip(inputs[0].as_slice())
        {
            *out = inp * self.gain;
        }
    }

    fn receive_message(&mut self, payload: &Record, _config: &AudioConfig) -> Vec<Message> {
        if let Some(gain) = payload.float("gain") {
            self.gain = gain;
        }
        Vec::new()
    }

    fn receive_control(&mut self, value: f32, input: usize) {
        if input == 0 {
            self.gain = value;
        }
    }
}

/// Sums k input sockets into one output (k inputs / 1 output).
///
/// Individual sockets already sum their own fan-in; this module exists for
/// graphs that want separately addressable input ports.
#[derive(Clone, Debug)]
pub struct MixModule {
    inputs: usize,
}

impl MixModule {
    /// Creates a mixer with the given number of input ports.
    pub fn new(inputs: usize) -> Self {
        Self { inputs }
    }
}

impl Module for MixModule {
    fn num_inputs(&self) -> usize {
        self.inputs
    }

    fn num_outputs(&self) -> usize {
        1
    }

    fn synthesize(&mut self, inputs: &[Socket], outputs: &mut [Buffer], _config: &AudioConfig) {
        outputs[0].clear();
        for socket in inputs {
            outputs[0].accumulate(socket.buffer());
        }
    }
}

/// Emits a constant value, optionally ramping toward a target
/// (0 inputs / 1 output).
///
/// Messages: `"value"` jumps immediately; `"target"` with `"seconds"` ramps
/// linearly at audio rate.
#[derive(Clone, Debug)]
pub struct LineRamp {
    value: f32,
    target: f32,
    step: f32,
}

impl LineRamp {
    /// Creates a ramp holding the given value.
    pub fn new(value: f32) -> Self {
        Self {
            value,
            target: value,
            step: 0.0,
        }
    }

    /// Current output value.
    pub fn value(&self) -> f32 {
        self.value
    }

    #[inline]
    fn advance(&mut self) -> f32 {
        if self.step != 0.0 {
            let next = self.value + self.step;
            let overshot = (self.step > 0.0 && next >= self.target)
                || (self.step < 0.0 && next <= self.target);
            if overshot {
                self.value = self.target;
                self.step = 0.0;
            } else {
                self.value = next;
            }
        }
        self.value
    }
}

impl Module for LineRamp {
    fn num_inputs(&self) -> usize {
        0
    }

    fn num_outputs(&self) -> usize {
        1
    }

    fn synthesize(&mut self, _inputs: &[Socket], outputs: &mut [Buffer], _config: &AudioConfig) {
        for sample in outputs[0].as_mut_slice() {
            *sample = self.advance();
        }
    }

    fn receive_message(&mut self, payload: &Record, config: &AudioConfig) -> Vec<Message> {
        if let Some(value) = payload.float("value") {
            self.value = value;
            self.target = value;
            self.step = 0.0;
        }
        if let Some(target) = payload.float("target") {
            let seconds = payload.float("seconds").unwrap_or(0.0);
            let samples = config.seconds_to_samples(seconds);
            self.target = target;
            if samples == 0 {
                self.value = target;
                self.step = 0.0;
            } else {
                self.step = (target - self.value) / samples as f32;
            }
        }
        Vec::new()
    }
}
