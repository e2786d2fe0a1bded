//! Engine configuration: sample rate and block size.
//!
//! An [`AudioConfig`] is created once by the driver and passed by reference
//! through every call that needs it. There is no global configuration state;
//! a sub-graph rendered at a different rate is simply handed a different
//! value for the duration of that render.

/// Sample rate and block size for one synthesis context.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AudioConfig {
    /// Sample rate in Hz (e.g., 44100.0).
    pub sample_rate: f32,
    /// Number of samples per processing block (e.g., 64).
    pub block_size: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100.0,
            block_size: 64,
        }
    }
}

impl AudioConfig {
    /// Creates a configuration with the given sample rate and block size.
    pub fn new(sample_rate: f32, block_size: usize) -> Self {
        Self {
            sample_rate,
            block_size,
        }
    }

    /// Converts a duration in seconds to a sample count, rounding to nearest.
    #[inline]
    pub fn seconds_to_samples(&self, seconds: f32) -> usize {
        let samples = seconds * self.sample_rate + 0.5;
        if samples <= 0.0 { 0 } else { samples as usize }
    }

    /// Converts a sample count to a duration in seconds.
    #[inline]
    pub fn samples_to_seconds(&self, samples: usize) -> f32 {
        samples as f32 / self.sample_rate
    }

    /// Duration of one block in seconds.
    #[inline]
    pub fn block_seconds(&self) -> f32 {
        self.samples_to_seconds(self.block_size)
    }

    /// Returns a copy with a different sample rate (sub-render override).
    pub fn with_sample_rate(self, sample_rate: f32) -> Self {
        Self {
            sample_rate,
            ..self
        }
    }

    /// Returns a copy with a different block size (sub-render override).
    pub fn with_block_size(self, block_size: usize) -> Self {
        Self { block_size, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_to_samples_rounds() {
        let config = AudioConfig::new(44_100.0, 64);
        assert_eq!(config.seconds_to_samples(1.0), 44_100);
        assert_eq!(config.seconds_to_samples(0.0), 0);
        // 37 samples at 44.1kHz is ~0.839ms
        let secs = config.samples_to_seconds(37);
        assert_eq!(config.seconds_to_samples(secs), 37);
    }

    #[test]
    fn test_negative_duration_clamps_to_zero() {
        let config = AudioConfig::default();
        assert_eq!(config.seconds_to_samples(-1.0), 0);
    }

    #[test]
    fn test_overrides_are_local_copies() {
        let config = AudioConfig::new(48_000.0, 128);
        let half = config.with_sample_rate(24_000.0);
        assert_eq!(half.sample_rate, 24_000.0);
        assert_eq!(half.block_size, 128);
        // the original is untouched
        assert_eq!(config.sample_rate, 48_000.0);
    }

    #[test]
    fn test_block_seconds() {
        let config = AudioConfig::new(48_000.0, 480);
        assert!((config.block_seconds() - 0.01).abs() < 1e-6);
    }
}
