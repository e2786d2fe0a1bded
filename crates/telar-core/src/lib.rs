//! Telar Core - pull-based signal graph engine
//!
//! This crate provides the block-synchronous evaluation core of the telar
//! synthesis framework: modules, sockets, patches, and the control-rate
//! messenger/control subsystem.
//!
//! # Core Abstractions
//!
//! ## Signal Graph
//!
//! - [`Module`] - Object-safe trait for all graph nodes
//! - [`Patch`] - Composite module owning a sub-graph with boundary ports
//! - [`Socket`] / [`Connection`] - Input ports with summed fan-in
//! - [`Buffer`] - One block of samples, owned by a socket or output port
//!
//! Evaluation is pull-based and memoized: each block, the patch pulls its
//! boundary outputs, which transitively synthesize upstream producers through
//! connections. A node computes at most once per block regardless of fan-out,
//! so a diamond-shaped graph evaluates its shared ancestor exactly once.
//!
//! ## Control Rate
//!
//! Once per block, before any audio is pulled, a patch drains its registered
//! [`Messenger`]s (producers of addressed [`Message`]s) and ticks its
//! [`Control`]s (scalar control-value processors with their own lightweight
//! wiring). Message addresses are dot-delimited paths resolved against each
//! patch's receiver registry; unresolvable addresses are dropped.
//!
//! ## Configuration
//!
//! [`AudioConfig`] carries the sample rate and block size and is passed by
//! reference through every call that needs it. Sub-graphs rendered at a
//! different rate receive a locally-scoped override value.
//!
//! # Example
//!
//! ```rust,ignore
//! use telar_core::{AudioConfig, Patch};
//!
//! let config = AudioConfig::new(48_000.0, 128);
//! let mut patch = Patch::new("root", &config);
//! let osc = patch.add_module("osc", Box::new(my_oscillator));
//! let out = patch.add_boundary_output();
//! patch.connect(osc, 0, out, 0)?;
//!
//! patch.process_block(&config);
//! let block = patch.output(0);
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: the audio-rate pull path performs no allocation;
//!   buffers, sockets, and node slots are sized once at graph-build time
//! - **Fail fast at build time**: out-of-range ports and cyclic wiring are
//!   rejected when connecting, never on the audio path
//! - **Fail closed at control rate**: malformed payloads and unresolvable
//!   addresses are ignored, never raised
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible with `alloc`. Disable the default `std`
//! feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! telar-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod buffer;
pub mod config;
pub mod control;
pub mod message;
pub mod module;
pub mod patch;
pub mod socket;

// Re-export main types at crate root
pub use buffer::Buffer;
pub use config::AudioConfig;
pub use control::{Control, ControlId, Messenger};
pub use message::{Message, Record, Value};
pub use module::Module;
pub use patch::{ControlTarget, GraphError, ModuleId, Passthrough, Patch};
pub use socket::{Connection, Socket};
