//! Per-grain amplitude envelopes.
//!
//! A grain envelope is re-initialized on every activation from the grain's
//! duration and the parameter's shape hints, and produces one amplitude
//! multiplier per sample. Shapes are deterministic: identical activation
//! arguments yield an identical sample sequence.

use libm::cosf;

const PI: f32 = core::f32::consts::PI;

/// Which curve an envelope instance produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrainShape {
    /// Single parabolic arc over the whole grain, computed with a
    /// second-difference recurrence (two additions per sample).
    Parabolic,
    /// Linear attack / sustain / linear release, proportioned by the
    /// parameter's attack and release ratios. With `cosine` set, the linear
    /// segments are mapped through a raised cosine.
    Asr {
        /// Smooth the linear segments with a raised-cosine transfer.
        cosine: bool,
    },
}

/// State machine producing per-sample gain multipliers for one grain.
#[derive(Clone, Debug)]
pub struct GrainEnvelope {
    shape: GrainShape,
    amplitude: f32,
    duration: usize,
    position: usize,
    // parabolic recurrence state
    value: f32,
    slope: f32,
    curve: f32,
    // asr segment boundaries in samples
    attack_end: usize,
    release_start: usize,
}

impl GrainEnvelope {
    /// Creates an idle envelope of the given shape.
    pub fn new(shape: GrainShape) -> Self {
        Self {
            shape,
            amplitude: 0.0,
            duration: 0,
            position: 0,
            value: 0.0,
            slope: 0.0,
            curve: 0.0,
            attack_end: 0,
            release_start: 0,
        }
    }

    /// Re-initializes for a grain of `duration_samples` peaking at
    /// `amplitude`. `attack_ratio` and `release_ratio` proportion the ASR
    /// segments and are ignored by the parabolic shape; together they are
    /// capped at the full duration, attack first.
    pub fn activate(
        &mut self,
        amplitude: f32,
        duration_samples: usize,
        attack_ratio: f32,
        release_ratio: f32,
    ) {
        let duration = duration_samples.max(1);
        self.amplitude = amplitude;
        self.duration = duration;
        self.position = 0;
        match self.shape {
            GrainShape::Parabolic => {
                let rdur = 1.0 / duration as f32;
                let rdur2 = rdur * rdur;
                self.value = 0.0;
                self.slope = 4.0 * amplitude * (rdur - rdur2);
                self.curve = -8.0 * amplitude * rdur2;
            }
            GrainShape::Asr { .. } => {
                let attack = (attack_ratio.clamp(0.0, 1.0) * duration as f32) as usize;
                let release = (release_ratio.clamp(0.0, 1.0) * duration as f32) as usize;
                self.attack_end = attack.min(duration);
                self.release_start = duration - release.min(duration - self.attack_end);
            }
        }
    }

    /// Samples remaining before the envelope ends.
    pub fn remaining(&self) -> usize {
        self.duration.saturating_sub(self.position)
    }

    /// Writes the next `buf.len()` multipliers. Positions past the grain's
    /// end write zero.
    pub fn synthesize(&mut self, buf: &mut [f32]) {
        for sample in buf.iter_mut() {
            *sample = self.next_multiplier();
        }
    }

    #[inline]
    fn next_multiplier(&mut self) -> f32 {
        if self.position >= self.duration {
            return 0.0;
        }
        let out = match self.shape {
            GrainShape::Parabolic => {
                self.value += self.slope;
                self.slope += self.curve;
                self.value.max(0.0)
            }
            GrainShape::Asr { cosine } => {
                let pos = self.position;
                let linear = if pos < self.attack_end {
                    (pos + 1) as f32 / self.attack_end as f32
                } else if pos >= self.release_start {
                    (self.duration - pos) as f32 / (self.duration - self.release_start) as f32
                } else {
                    1.0
                };
                let shaped = if cosine {
                    0.5 * (1.0 - cosf(PI * linear))
                } else {
                    linear
                };
                self.amplitude * shaped
            }
        };
        self.position += 1;
        out
    }
}
