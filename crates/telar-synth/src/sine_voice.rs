//! A minimal voice: sine oscillator through an attack/release envelope.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use libm::sinf;
use telar_core::{AudioConfig, Buffer, Message, Module, Record, Socket};

use crate::envelope::ArEnvelope;
use crate::voice::Voice;

const TAU: f32 = core::f32::consts::TAU;

/// Sine voice with a linear attack/release envelope (0 inputs / 1 output).
///
/// `note` schedules the gate to close after the attack plus the requested
/// duration; `note_on`/`note_off` gate it manually. Broadcast `voice`
/// payloads may set `attack`, `release`, `gain`, and `frequency` fields;
/// `trigger` payloads may carry a per-note `frequency`.
pub struct SineVoice {
    frequency: f32,
    gain: f32,
    amplitude: f32,
    phase: f32,
    env: ArEnvelope,
    gate_remaining: Option<u64>,
}

impl SineVoice {
    /// Creates a voice at the given frequency with 5 ms attack and 50 ms
    /// release.
    pub fn new(frequency: f32) -> Self {
        Self {
            frequency,
            gain: 1.0,
            amplitude: 0.0,
            phase: 0.0,
            env: ArEnvelope::default(),
            gate_remaining: None,
        }
    }

    /// Current frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    fn start(&mut self, amplitude: f32, payload: &Record, config: &AudioConfig) {
        if let Some(frequency) = payload.float("frequency") {
            self.frequency = frequency;
        }
        self.amplitude = amplitude;
        self.phase = 0.0;
        self.env.gate_on(config);
    }
}

impl Module for SineVoice {
    fn num_inputs(&self) -> usize {
        0
    }

    fn num_outputs(&self) -> usize {
        1
    }

    fn synthesize(&mut self, _inputs: &[Socket], outputs: &mut [Buffer], config: &AudioConfig) {
        if !self.env.is_active() {
            outputs[0].clear();
            return;
        }
        let increment = self.frequency / config.sample_rate;
        for sample in outputs[0].as_mut_slice() {
            if let Some(remaining) = self.gate_remaining {
                if remaining == 0 {
                    self.env.gate_off();
                    self.gate_remaining = None;
                } else {
                    self.gate_remaining = Some(remaining - 1);
                }
            }
            *sample = sinf(TAU * self.phase) * self.env.advance() * self.amplitude * self.gain;
            self.phase += increment;
            if self.phase >= 1.0 {
                self.phase -= libm::floorf(self.phase);
            }
        }
    }

    fn receive_message(&mut self, payload: &Record, _config: &AudioConfig) -> Vec<Message> {
        if let Some(attack) = payload.float("attack") {
            self.env.set_attack_secs(attack);
        }
        if let Some(release) = payload.float("release") {
            self.env.set_release_secs(release);
        }
        if let Some(gain) = payload.float("gain") {
            self.gain = gain;
        }
        if let Some(frequency) = payload.float("frequency") {
            self.frequency = frequency;
        }
        Vec::new()
    }
}

impl Voice for SineVoice {
    fn note(&mut self, duration_secs: f32, amplitude: f32, payload: &Record, config: &AudioConfig) {
        self.start(amplitude, payload, config);
        let hold = self.env.attack_secs() + duration_secs.max(0.0);
        self.gate_remaining = Some(config.seconds_to_samples(hold) as u64);
    }

    fn note_on(&mut self, amplitude: f32, payload: &Record, config: &AudioConfig) {
        self.start(amplitude, payload, config);
        self.gate_remaining = None;
    }

    fn note_off(&mut self) {
        self.env.gate_off();
        self.gate_remaining = None;
    }

    fn is_active(&self) -> bool {
        self.env.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AudioConfig {
        AudioConfig::new(44_100.0, 64)
    }

    #[test]
    fn test_silent_until_note() {
        let config = config();
        let mut voice = SineVoice::new(220.0);
        let mut out = [Buffer::new(64)];
        voice.synthesize(&[], &mut out, &config);
        assert!(out[0].as_slice().iter().all(|&s| s == 0.0));
        assert!(!voice.is_active());
    }

    #[test]
    fn test_zero_duration_note_still_sounds() {
        let config = config();
        let mut voice = SineVoice::new(220.0);
        voice.note(0.0, 1.0, &Record::new(), &config);
        assert!(voice.is_active());

        let mut out = [Buffer::new(64)];
        voice.synthesize(&[], &mut out, &config);
        assert!(out[0].as_slice().iter().any(|&s| s != 0.0));
    }

    #[test]
    fn test_note_runs_to_completion() {
        let config = config();
        let mut voice = SineVoice::new(220.0);
        voice.note(0.01, 1.0, &Record::new(), &config);

        let mut out = [Buffer::new(64)];
        // attack (5ms) + duration (10ms) + release (50ms) ≈ 65ms ≈ 45 blocks
        for _ in 0..100 {
            voice.synthesize(&[], &mut out, &config);
        }
        assert!(!voice.is_active());
    }

    #[test]
    fn test_note_on_holds_until_note_off() {
        let config = config();
        let mut voice = SineVoice::new(220.0);
        voice.note_on(1.0, &Record::new(), &config);

        let mut out = [Buffer::new(64)];
        for _ in 0..500 {
            voice.synthesize(&[], &mut out, &config);
        }
        assert!(voice.is_active(), "held note must not decay on its own");

        voice.note_off();
        for _ in 0..100 {
            voice.synthesize(&[], &mut out, &config);
        }
        assert!(!voice.is_active());
    }

    #[test]
    fn test_trigger_payload_overrides_frequency() {
        let config = config();
        let mut voice = SineVoice::new(220.0);
        voice.note(0.1, 1.0, &Record::new().with("frequency", 880.0f32), &config);
        assert_eq!(voice.frequency(), 880.0);
    }
}
