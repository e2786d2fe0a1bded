//! Gate-driven attack/release envelope.

use telar_core::AudioConfig;

/// Envelope stages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopeStage {
    /// Inactive — output is zero.
    #[default]
    Idle,
    /// Output ramps linearly toward full level.
    Attack,
    /// Output holds at full level while the gate is open.
    Sustain,
    /// Output ramps linearly to zero after the gate closes.
    Release,
}

/// Linear attack/release envelope for voices.
///
/// `gate_on` starts the attack from the current level (smooth retrigger);
/// `gate_off` begins the release from wherever the level is. Rates are
/// computed when the gate opens, so time changes apply from the next note.
#[derive(Clone, Debug)]
pub struct ArEnvelope {
    stage: EnvelopeStage,
    level: f32,
    attack_secs: f32,
    release_secs: f32,
    attack_rate: f32,
    release_rate: f32,
}

impl Default for ArEnvelope {
    fn default() -> Self {
        Self::new(0.005, 0.05)
    }
}

impl ArEnvelope {
    /// Creates an envelope with the given attack and release times in
    /// seconds.
    pub fn new(attack_secs: f32, release_secs: f32) -> Self {
        Self {
            stage: EnvelopeStage::Idle,
            level: 0.0,
            attack_secs: attack_secs.max(0.0),
            release_secs: release_secs.max(0.0),
            attack_rate: 0.0,
            release_rate: 0.0,
        }
    }

    /// Attack time in seconds.
    pub fn attack_secs(&self) -> f32 {
        self.attack_secs
    }

    /// Sets the attack time in seconds.
    pub fn set_attack_secs(&mut self, secs: f32) {
        self.attack_secs = secs.max(0.0);
    }

    /// Release time in seconds.
    pub fn release_secs(&self) -> f32 {
        self.release_secs
    }

    /// Sets the release time in seconds.
    pub fn set_release_secs(&mut self, secs: f32) {
        self.release_secs = secs.max(0.0);
    }

    /// Opens the gate, entering the attack stage from the current level.
    pub fn gate_on(&mut self, config: &AudioConfig) {
        let attack_samples = config.seconds_to_samples(self.attack_secs).max(1);
        let release_samples = config.seconds_to_samples(self.release_secs).max(1);
        self.attack_rate = 1.0 / attack_samples as f32;
        self.release_rate = 1.0 / release_samples as f32;
        self.stage = EnvelopeStage::Attack;
    }

    /// Closes the gate, entering the release stage.
    pub fn gate_off(&mut self) {
        if self.stage != EnvelopeStage::Idle {
            self.stage = EnvelopeStage::Release;
        }
    }

    /// Forces the envelope back to idle.
    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Idle;
        self.level = 0.0;
    }

    /// Current stage.
    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    /// True until the release completes.
    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Idle
    }

    /// Advances one sample and returns the level.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        match self.stage {
            EnvelopeStage::Idle => {
                self.level = 0.0;
            }
            EnvelopeStage::Attack => {
                self.level += self.attack_rate;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = EnvelopeStage::Sustain;
                }
            }
            EnvelopeStage::Sustain => {
                self.level = 1.0;
            }
            EnvelopeStage::Release => {
                self.level -= self.release_rate;
                if self.level <= 0.0 {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Idle;
                }
            }
        }
        self.level
    }
}
