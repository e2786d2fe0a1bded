//! Grain collaborators: parameters, sources, and onset sequences.
//!
//! The granulator is generic over its [`GrainParameter`] type and drives two
//! pluggable capability interfaces: a [`GrainSource`] producing samples for
//! one grain, and a [`Sequence`] yielding (parameter, inter-onset) steps.
//! New grain content or new scheduling strategies plug in without touching
//! the scheduler.

use libm::sinf;
use telar_core::AudioConfig;

const TAU: f32 = core::f32::consts::TAU;

/// Per-grain activation parameters.
pub trait GrainParameter {
    /// Grain length in seconds.
    fn duration_secs(&self) -> f32;
    /// Peak amplitude.
    fn amplitude(&self) -> f32;
    /// Stereo position, -1 (left) to 1 (right).
    fn panning(&self) -> f32;
    /// Envelope attack as a ratio of the duration.
    fn attack(&self) -> f32;
    /// Envelope release as a ratio of the duration.
    fn release(&self) -> f32;
}

/// Plain-struct parameter set for the bundled sources and sequences.
#[derive(Clone, Copy, Debug)]
pub struct GrainSettings {
    /// Oscillator frequency for tonal sources, in Hz.
    pub frequency: f32,
    /// Grain length in seconds.
    pub duration_secs: f32,
    /// Peak amplitude.
    pub amplitude: f32,
    /// Stereo position, -1 to 1.
    pub panning: f32,
    /// Envelope attack ratio.
    pub attack: f32,
    /// Envelope release ratio.
    pub release: f32,
}

impl Default for GrainSettings {
    fn default() -> Self {
        Self {
            frequency: 440.0,
            duration_secs: 0.05,
            amplitude: 0.5,
            panning: 0.0,
            attack: 0.25,
            release: 0.25,
        }
    }
}

impl GrainParameter for GrainSettings {
    fn duration_secs(&self) -> f32 {
        self.duration_secs
    }

    fn amplitude(&self) -> f32 {
        self.amplitude
    }

    fn panning(&self) -> f32 {
        self.panning
    }

    fn attack(&self) -> f32 {
        self.attack
    }

    fn release(&self) -> f32 {
        self.release
    }
}

/// Sample producer for one grain, re-aimed at each activation.
pub trait GrainSource<P: GrainParameter> {
    /// Points the source at a new grain.
    fn activate(&mut self, parameter: &P, config: &AudioConfig);

    /// Produces the next source sample (pre-envelope).
    fn next_sample(&mut self) -> f32;
}

/// Sine source: one oscillator per grain at the parameter's frequency.
#[derive(Clone, Debug, Default)]
pub struct SineGrainSource {
    phase: f32,
    increment: f32,
}

impl SineGrainSource {
    /// Creates an inactive sine source.
    pub fn new() -> Self {
        Self::default()
    }
}

impl GrainSource<GrainSettings> for SineGrainSource {
    fn activate(&mut self, parameter: &GrainSettings, config: &AudioConfig) {
        self.phase = 0.0;
        self.increment = parameter.frequency / config.sample_rate;
    }

    fn next_sample(&mut self) -> f32 {
        let out = sinf(TAU * self.phase);
        self.phase += self.increment;
        if self.phase >= 1.0 {
            self.phase -= libm::floorf(self.phase);
        }
        out
    }
}

/// Small deterministic PRNG (xorshift32) for noise sources and jittered
/// sequences. Seeded, so renders are reproducible.
#[derive(Clone, Copy, Debug)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    /// Creates a generator from a non-zero seed (zero is remapped).
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0x9e37_79b9 } else { seed },
        }
    }

    /// Next raw 32-bit value.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform value in [0, 1).
    #[inline]
    pub fn next_unit(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1 << 24) as f32
    }

    /// Uniform value in [-1, 1).
    #[inline]
    pub fn next_bipolar(&mut self) -> f32 {
        self.next_unit() * 2.0 - 1.0
    }
}

/// White-noise source for textural grains.
#[derive(Clone, Copy, Debug)]
pub struct NoiseGrainSource {
    rng: XorShift32,
}

impl NoiseGrainSource {
    /// Creates a noise source with the given seed.
    pub fn new(seed: u32) -> Self {
        Self {
            rng: XorShift32::new(seed),
        }
    }
}

impl<P: GrainParameter> GrainSource<P> for NoiseGrainSource {
    fn activate(&mut self, _parameter: &P, _config: &AudioConfig) {}

    fn next_sample(&mut self) -> f32 {
        self.rng.next_bipolar()
    }
}

/// One scheduling step: what to play, and how many samples until the
/// following onset.
#[derive(Clone, Copy, Debug)]
pub struct Step<P> {
    /// Activation parameters for the grain fired at this onset.
    pub parameter: P,
    /// Samples between this onset and the next.
    pub inter_onset: usize,
}

/// Yields (parameter, inter-onset) steps for the granulator.
pub trait Sequence<P: GrainParameter> {
    /// Returns the next step. `timestamp` is the sample position of the
    /// onset being scheduled.
    fn next_step(&mut self, timestamp: u64, config: &AudioConfig) -> Step<P>;
}

/// Fixed parameters at a fixed inter-onset interval.
#[derive(Clone, Copy, Debug)]
pub struct UniformSequence {
    settings: GrainSettings,
    interval: Interval,
}

#[derive(Clone, Copy, Debug)]
enum Interval {
    Secs(f32),
    Samples(usize),
}

impl UniformSequence {
    /// Fixed interval in seconds.
    pub fn new(settings: GrainSettings, interval_secs: f32) -> Self {
        Self {
            settings,
            interval: Interval::Secs(interval_secs),
        }
    }

    /// Fixed interval in samples, independent of the sample rate.
    pub fn from_samples(settings: GrainSettings, inter_onset: usize) -> Self {
        Self {
            settings,
            interval: Interval::Samples(inter_onset),
        }
    }
}

impl Sequence<GrainSettings> for UniformSequence {
    fn next_step(&mut self, _timestamp: u64, config: &AudioConfig) -> Step<GrainSettings> {
        let inter_onset = match self.interval {
            Interval::Secs(secs) => config.seconds_to_samples(secs),
            Interval::Samples(samples) => samples,
        };
        Step {
            parameter: self.settings,
            inter_onset: inter_onset.max(1),
        }
    }
}

/// Uniform sequence with deterministic pseudo-random spread on the onset
/// interval and the stereo position.
#[derive(Clone, Copy, Debug)]
pub struct JitterSequence {
    settings: GrainSettings,
    interval_secs: f32,
    /// Fraction of the interval to spread onsets by, 0 to 1.
    onset_jitter: f32,
    /// Pan offset range added to the base panning.
    pan_spread: f32,
    rng: XorShift32,
}

impl JitterSequence {
    /// Creates a jittered sequence seeded for reproducible renders.
    pub fn new(
        settings: GrainSettings,
        interval_secs: f32,
        onset_jitter: f32,
        pan_spread: f32,
        seed: u32,
    ) -> Self {
        Self {
            settings,
            interval_secs,
            onset_jitter: onset_jitter.clamp(0.0, 1.0),
            pan_spread: pan_spread.max(0.0),
            rng: XorShift32::new(seed),
        }
    }
}

impl Sequence<GrainSettings> for JitterSequence {
    fn next_step(&mut self, _timestamp: u64, config: &AudioConfig) -> Step<GrainSettings> {
        let scale = 1.0 + self.onset_jitter * self.rng.next_bipolar();
        let inter_onset = config.seconds_to_samples(self.interval_secs * scale);
        let mut parameter = self.settings;
        parameter.panning =
            (parameter.panning + self.pan_spread * self.rng.next_bipolar()).clamp(-1.0, 1.0);
        Step {
            parameter,
            inter_onset: inter_onset.max(1),
        }
    }
}
