//! Telar Synth - voices and granular synthesis for the telar framework
//!
//! This crate builds the playable layer on top of the `telar-core` signal
//! graph: a polyphonic voice pool, a sample-accurate granular scheduler, and
//! the leaf modules, messengers, and controls needed to assemble patches.
//!
//! # Core Components
//!
//! ## Polyphony
//!
//! - [`Voice`] - Note-lifecycle trait over [`Module`](telar_core::Module)
//! - [`Polyphony`] - Fixed pool of voices behind one module, free/active
//!   partition with O(1) allocation-free churn
//! - [`SineVoice`] - Minimal voice: sine oscillator × attack/release envelope
//!
//! Triggers that find the pool exhausted are dropped, never queued; a voice
//! is reclaimed only after it reports itself inactive, so releases ring out.
//!
//! ## Granular Synthesis
//!
//! - [`Granulator`] - Bounded grain pool with sample-accurate onsets
//! - [`GrainSource`] / [`Sequence`] / [`GrainParameter`] - Pluggable
//!   capability interfaces for grain content and scheduling
//! - [`GrainEnvelope`] - Parabolic or attack/sustain/release grain shapes
//!
//! An onset whose inter-onset gap lands inside a block starts its grain at
//! exactly that sample offset, envelope at phase zero.
//!
//! ## Leaf Modules & Control Tier
//!
//! - [`SineOscillator`], [`GainModule`], [`MixModule`], [`LineRamp`]
//! - [`Metronome`] - Interval-driven trigger messenger
//! - [`Smoother`] - One-pole control-rate lag
//!
//! # Example: one-voice synth
//!
//! ```rust
//! use telar_core::{AudioConfig, Patch, Record};
//! use telar_synth::{Polyphony, SineVoice, Voice};
//!
//! let config = AudioConfig::new(44_100.0, 64);
//! let mut patch = Patch::new("root", &config);
//!
//! let voices: Vec<Box<dyn Voice>> = vec![Box::new(SineVoice::new(440.0))];
//! let poly = patch.add_module("poly", Box::new(Polyphony::new(voices, &config)));
//! let out = patch.add_boundary_output();
//! patch.connect(poly, 0, out, 0).unwrap();
//!
//! patch.send(
//!     "poly",
//!     Record::new().with("command", "trigger").with("duration", 0.1f32),
//!     &config,
//! );
//! patch.process_block(&config);
//! assert!(patch.output(0).iter().any(|&s| s != 0.0));
//! ```
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! telar-synth = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod envelope;
pub mod grain_env;
pub mod grain_src;
pub mod granular;
pub mod metronome;
pub mod modules;
pub mod oscillator;
pub mod pool;
pub mod sine_voice;
pub mod smoother;
pub mod voice;

// Re-export main types at crate root
pub use envelope::{ArEnvelope, EnvelopeStage};
pub use grain_env::{GrainEnvelope, GrainShape};
pub use grain_src::{
    GrainParameter, GrainSettings, GrainSource, JitterSequence, NoiseGrainSource, Sequence,
    SineGrainSource, Step, UniformSequence, XorShift32,
};
pub use granular::Granulator;
pub use metronome::Metronome;
pub use modules::{GainModule, LineRamp, MixModule};
pub use oscillator::SineOscillator;
pub use pool::SlotLinks;
pub use sine_voice::SineVoice;
pub use smoother::Smoother;
pub use voice::{Polyphony, Voice};
