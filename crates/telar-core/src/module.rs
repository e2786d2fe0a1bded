//! The module trait: one node of the signal graph.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::buffer::Buffer;
use crate::config::AudioConfig;
use crate::message::{Message, Record};
use crate::socket::Socket;

/// A graph node with fixed input/output port arity and a per-block compute
/// operation.
///
/// Modules are heterogeneous (`Box<dyn Module>`) and owned by the [`Patch`]
/// that wires them. The patch owns the plumbing — input sockets, output
/// buffers, the did-run memoization flag — so an implementor only describes
/// its arity and its computation:
///
/// - [`synthesize`](Module::synthesize) receives the already-summed input
///   socket buffers and must fill every output buffer. It is called at most
///   once per block per node.
/// - [`prepare`](Module::prepare) runs once per block before any synthesis,
///   for modules that carry per-block state.
/// - [`receive_message`](Module::receive_message) and
///   [`receive_control`](Module::receive_control) are the control-rate
///   surface; both must fail closed on unexpected input.
///
/// [`Patch`]: crate::Patch
pub trait Module {
    /// Number of input ports.
    fn num_inputs(&self) -> usize;

    /// Number of output ports.
    fn num_outputs(&self) -> usize;

    /// Per-block reset hook, called before the block's synthesis pass.
    fn prepare(&mut self) {}

    /// Computes one block into `outputs`, reading the summed `inputs`.
    fn synthesize(&mut self, inputs: &[Socket], outputs: &mut [Buffer], config: &AudioConfig);

    /// Accepts an addressed payload. Returns follow-up messages for the
    /// owning patch to route. Unknown commands and malformed fields are
    /// ignored.
    fn receive_message(&mut self, payload: &Record, config: &AudioConfig) -> Vec<Message> {
        let _ = (payload, config);
        Vec::new()
    }

    /// Delivers a payload whose address resolved to this module. `path` is
    /// the residual dot-delimited address after the matched segment; empty
    /// for a direct hit. The default forwards direct hits to
    /// [`receive_message`](Module::receive_message) and drops anything with
    /// a residual path; [`Patch`](crate::Patch) overrides this to recurse
    /// into its own registry.
    fn deliver(&mut self, path: &str, payload: &Record, config: &AudioConfig) -> Vec<Message> {
        if path.is_empty() {
            self.receive_message(payload, config)
        } else {
            Vec::new()
        }
    }

    /// Control-rate scalar input at the given control input index.
    fn receive_control(&mut self, value: f32, input: usize) {
        let _ = (value, input);
    }
}
