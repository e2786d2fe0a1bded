//! Offline driving and WAV export for the telar synthesis framework.
//!
//! This crate is the external driver at the engine's boundary: it owns a
//! root [`Patch`](telar_core::Patch), invokes exactly one `process_block`
//! per fixed-size block, and collects the boundary outputs.
//!
//! - **Offline rendering**: [`OfflineRenderer`] for block-loop renders
//! - **WAV export**: [`write_wav`] and [`write_wav_stereo`] via `hound`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use telar_core::{AudioConfig, Patch};
//! use telar_io::{OfflineRenderer, WavSpec, write_wav};
//!
//! let config = AudioConfig::new(48_000.0, 128);
//! let patch = build_patch(&config);
//!
//! let mut renderer = OfflineRenderer::new(patch, config);
//! let channels = renderer.render_secs(2.0);
//! write_wav("out.wav", &channels[0], WavSpec::default())?;
//! ```

mod render;
mod wav;

pub use render::OfflineRenderer;
pub use wav::{WavSpec, write_wav, write_wav_stereo};

/// Error types for rendering and export operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Graph construction error surfaced while building a patch to render.
    #[error("graph error: {0}")]
    Graph(#[from] telar_core::GraphError),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for rendering and export operations.
pub type Result<T> = std::result::Result<T, Error>;
