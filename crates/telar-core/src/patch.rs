//! Composite patches: the signal graph container.
//!
//! A [`Patch`] owns an arena of node slots (module + input sockets + output
//! buffers + bookkeeping flags), boundary pass-through nodes that form its
//! externally visible ports, and the control-rate subsystem (messengers,
//! controls, control wires, and the identifier → receiver registry).
//!
//! Evaluation is pull-based and memoized. `process_block` first drains the
//! control tier, then pulls every must-synthesize node and every boundary
//! output; pulling a node recursively synthesizes its upstream producers
//! through the socket connections, accumulating each producer's selected
//! output buffer into the consumer's input socket. The per-slot `did_run`
//! flag — set before descending — guarantees each node computes at most once
//! per block regardless of fan-out.
//!
//! Topology errors (out-of-range ports, cyclic wiring) are rejected when
//! connecting; the audio path never validates and never fails.

#[cfg(not(feature = "std"))]
use alloc::{
    boxed::Box,
    collections::{BTreeMap, VecDeque},
    string::{String, ToString},
    vec::Vec,
};
#[cfg(feature = "std")]
use std::collections::{BTreeMap, VecDeque};

use crate::buffer::Buffer;
use crate::config::AudioConfig;
use crate::control::{Control, ControlId, Messenger};
use crate::message::{Message, Record};
use crate::module::Module;
use crate::socket::{Connection, Socket};

/// Unique identifier for a node within one patch.
///
/// Module IDs are assigned sequentially at `add_module` time and remain
/// stable for the lifetime of the patch. An ID from one patch is meaningless
/// in another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModuleId(pub(crate) u32);

impl ModuleId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ModuleId({})", self.0)
    }
}

/// Errors raised by graph mutations.
///
/// All variants are construction-time failures; nothing on the audio path
/// returns or raises them.
#[derive(Debug, PartialEq, Eq)]
pub enum GraphError {
    /// The node ID does not name a slot in this patch.
    NodeNotFound(ModuleId),
    /// The producer has no output port at this index.
    OutputOutOfRange(ModuleId, usize),
    /// The consumer has no input port at this index.
    InputOutOfRange(ModuleId, usize),
    /// The wiring would make a node its own transitive input.
    CycleDetected,
    /// No such connection exists between these ports.
    ConnectionNotFound,
    /// The control ID does not name a registered control.
    ControlNotFound(ControlId),
    /// A boundary port index is out of range.
    BoundaryOutOfRange(usize),
}

impl core::fmt::Display for GraphError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "node {id} not found"),
            Self::OutputOutOfRange(id, port) => {
                write!(f, "node {id} has no output port {port}")
            }
            Self::InputOutOfRange(id, port) => {
                write!(f, "node {id} has no input port {port}")
            }
            Self::CycleDetected => write!(f, "wiring would make a node its own input"),
            Self::ConnectionNotFound => write!(f, "no such connection"),
            Self::ControlNotFound(id) => write!(f, "control {} not found", id.index()),
            Self::BoundaryOutOfRange(port) => write!(f, "no boundary port {port}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GraphError {}

/// Identity module used for a patch's boundary ports.
///
/// One input, one output; copies its summed input straight through. External
/// connections to a nested patch terminate on these, which is what lets the
/// patch sit in a larger graph as an opaque node.
#[derive(Debug, Default)]
pub struct Passthrough;

impl Module for Passthrough {
    fn num_inputs(&self) -> usize {
        1
    }

    fn num_outputs(&self) -> usize {
        1
    }

    fn synthesize(&mut self, inputs: &[Socket], outputs: &mut [Buffer], _config: &AudioConfig) {
        outputs[0].copy_from(inputs[0].buffer());
    }
}

/// One arena slot: a module plus the plumbing the patch owns for it.
struct NodeSlot {
    module: Box<dyn Module>,
    inputs: Vec<Socket>,
    outputs: Vec<Buffer>,
    did_run: bool,
    must_synthesize: bool,
}

impl NodeSlot {
    /// Disjoint-field borrow for the synthesis call.
    fn split(&mut self) -> (&mut dyn Module, &[Socket], &mut [Buffer]) {
        (self.module.as_mut(), &self.inputs, &mut self.outputs)
    }
}

/// What an identifier in the receiver registry resolves to.
#[derive(Clone, Copy)]
enum ReceiverKind {
    Node(ModuleId),
    Messenger(usize),
    Control(usize),
}

/// Destination of a control wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlTarget {
    /// Another registered control.
    Control(ControlId),
    /// A module's control input.
    Module(ModuleId),
}

#[derive(Clone, Copy)]
struct ControlWire {
    source: usize,
    output: usize,
    target: ControlTarget,
    input: usize,
}

/// A composite module: sub-graph, boundary ports, and control tier.
pub struct Patch {
    identifier: String,
    block_size: usize,
    nodes: Vec<NodeSlot>,
    boundary_inputs: Vec<ModuleId>,
    boundary_outputs: Vec<ModuleId>,
    messengers: Vec<Box<dyn Messenger>>,
    controls: Vec<Box<dyn Control>>,
    control_wires: Vec<ControlWire>,
    receivers: BTreeMap<String, ReceiverKind>,
    timestamp: u64,
    queue: VecDeque<Message>,
}

impl Patch {
    /// Creates an empty patch. The identifier is used for hierarchical
    /// message addressing once the patch is nested inside another.
    pub fn new(identifier: impl Into<String>, config: &AudioConfig) -> Self {
        Self {
            identifier: identifier.into(),
            block_size: config.block_size,
            nodes: Vec::new(),
            boundary_inputs: Vec::new(),
            boundary_outputs: Vec::new(),
            messengers: Vec::new(),
            controls: Vec::new(),
            control_wires: Vec::new(),
            receivers: BTreeMap::new(),
            timestamp: 0,
            queue: VecDeque::new(),
        }
    }

    /// The patch's own identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Monotone sample count, advanced by the block size after every block.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Number of nodes in the patch (boundaries included).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // --- Graph mutations ---

    /// Adds a module under the given identifier and returns its ID.
    ///
    /// A non-empty identifier registers the module in the receiver registry
    /// for message addressing; a later registration under the same name
    /// wins. An empty identifier leaves the module unaddressed.
    pub fn add_module(&mut self, identifier: &str, module: Box<dyn Module>) -> ModuleId {
        let id = ModuleId(self.nodes.len() as u32);
        let inputs = (0..module.num_inputs())
            .map(|_| Socket::new(self.block_size))
            .collect();
        let outputs = (0..module.num_outputs())
            .map(|_| Buffer::new(self.block_size))
            .collect();
        self.nodes.push(NodeSlot {
            module,
            inputs,
            outputs,
            did_run: false,
            must_synthesize: false,
        });
        if !identifier.is_empty() {
            self.receivers
                .insert(identifier.to_string(), ReceiverKind::Node(id));
        }
        #[cfg(feature = "tracing")]
        tracing::debug!("patch_add: module '{identifier}' as {id}");
        id
    }

    /// Adds a boundary input port (a pass-through node) and returns its ID.
    ///
    /// When the patch is nested, its n-th outer input feeds the n-th
    /// boundary input node.
    pub fn add_boundary_input(&mut self) -> ModuleId {
        let id = self.add_module("", Box::new(Passthrough));
        self.boundary_inputs.push(id);
        id
    }

    /// Adds a boundary output port (a pass-through node) and returns its ID.
    ///
    /// Boundary outputs are the roots of the pull traversal: wiring a node
    /// to one makes it audible outside the patch.
    pub fn add_boundary_output(&mut self) -> ModuleId {
        let id = self.add_module("", Box::new(Passthrough));
        self.boundary_outputs.push(id);
        id
    }

    /// Connects a producer output port to a consumer input port.
    ///
    /// Fails fast on unknown nodes, out-of-range ports, and wiring that
    /// would make a node its own transitive input. The engine assumes
    /// acyclic wiring at audio rate and performs no runtime cycle checks.
    pub fn connect(
        &mut self,
        source: ModuleId,
        output: usize,
        dest: ModuleId,
        input: usize,
    ) -> Result<(), GraphError> {
        let src = self
            .nodes
            .get(source.0 as usize)
            .ok_or(GraphError::NodeNotFound(source))?;
        if output >= src.outputs.len() {
            return Err(GraphError::OutputOutOfRange(source, output));
        }
        let dst = self
            .nodes
            .get(dest.0 as usize)
            .ok_or(GraphError::NodeNotFound(dest))?;
        if input >= dst.inputs.len() {
            return Err(GraphError::InputOutOfRange(dest, input));
        }
        if source == dest || self.reaches_upstream(source, dest) {
            return Err(GraphError::CycleDetected);
        }

        self.nodes[dest.0 as usize].inputs[input].attach(Connection { source, output });
        #[cfg(feature = "tracing")]
        tracing::debug!("patch_connect: {source}[{output}] -> {dest}[{input}]");
        Ok(())
    }

    /// Removes a previously made connection.
    pub fn disconnect(
        &mut self,
        source: ModuleId,
        output: usize,
        dest: ModuleId,
        input: usize,
    ) -> Result<(), GraphError> {
        let dst = self
            .nodes
            .get_mut(dest.0 as usize)
            .ok_or(GraphError::NodeNotFound(dest))?;
        let socket = dst
            .inputs
            .get_mut(input)
            .ok_or(GraphError::InputOutOfRange(dest, input))?;
        if socket.detach(Connection { source, output }) {
            #[cfg(feature = "tracing")]
            tracing::debug!("patch_disconnect: {source}[{output}] -/-> {dest}[{input}]");
            Ok(())
        } else {
            Err(GraphError::ConnectionNotFound)
        }
    }

    /// Marks a node to be pulled every block even when nothing consumes it.
    ///
    /// For side-effectful sinks (recorders, meters) that would otherwise be
    /// unreachable from the boundary outputs.
    pub fn set_must_synthesize(&mut self, id: ModuleId, flag: bool) -> Result<(), GraphError> {
        let slot = self
            .nodes
            .get_mut(id.0 as usize)
            .ok_or(GraphError::NodeNotFound(id))?;
        slot.must_synthesize = flag;
        Ok(())
    }

    /// Borrows a module for parameter access.
    pub fn module_mut(&mut self, id: ModuleId) -> Option<&mut (dyn Module + 'static)> {
        self.nodes.get_mut(id.0 as usize).map(|s| s.module.as_mut())
    }

    /// Read access to a module.
    pub fn module_ref(&self, id: ModuleId) -> Option<&dyn Module> {
        self.nodes.get(id.0 as usize).map(|s| s.module.as_ref())
    }

    // --- Control tier registration ---

    /// Registers a messenger under the given identifier.
    ///
    /// Messengers are drained in registration order at the start of every
    /// block, before controls tick and before any audio is pulled.
    pub fn add_messenger(&mut self, identifier: &str, messenger: Box<dyn Messenger>) {
        let index = self.messengers.len();
        self.messengers.push(messenger);
        if !identifier.is_empty() {
            self.receivers
                .insert(identifier.to_string(), ReceiverKind::Messenger(index));
        }
    }

    /// Registers a control under the given identifier and returns its ID.
    ///
    /// Controls tick in registration order after the messengers drain; each
    /// control's wires are pushed immediately after its tick.
    pub fn add_control(&mut self, identifier: &str, control: Box<dyn Control>) -> ControlId {
        let index = self.controls.len();
        self.controls.push(control);
        if !identifier.is_empty() {
            self.receivers
                .insert(identifier.to_string(), ReceiverKind::Control(index));
        }
        ControlId(index as u32)
    }

    /// Wires a control output to another control or to a module's control
    /// input.
    pub fn connect_control(
        &mut self,
        source: ControlId,
        output: usize,
        target: ControlTarget,
        input: usize,
    ) -> Result<(), GraphError> {
        if source.0 as usize >= self.controls.len() {
            return Err(GraphError::ControlNotFound(source));
        }
        match target {
            ControlTarget::Control(id) if id.0 as usize >= self.controls.len() => {
                return Err(GraphError::ControlNotFound(id));
            }
            ControlTarget::Module(id) if id.0 as usize >= self.nodes.len() => {
                return Err(GraphError::NodeNotFound(id));
            }
            _ => {}
        }
        self.control_wires.push(ControlWire {
            source: source.0 as usize,
            output,
            target,
            input,
        });
        Ok(())
    }

    // --- Message routing ---

    /// Routes a payload to the receiver at the given dot-delimited address.
    ///
    /// Resolution walks the receiver registry one segment at a time; a
    /// segment that resolves to a nested patch recurses into it. Messages
    /// emitted by receivers are routed the same way until the queue drains.
    /// Unresolvable addresses are dropped.
    pub fn send(&mut self, address: &str, payload: Record, config: &AudioConfig) {
        self.queue.push_back(Message::new(address, payload));
        self.route_pending(config);
    }

    fn route_pending(&mut self, config: &AudioConfig) {
        while let Some(message) = self.queue.pop_front() {
            self.route_one(message, config);
        }
    }

    fn route_one(&mut self, message: Message, config: &AudioConfig) {
        let (head, rest) = match message.address.split_once('.') {
            Some((head, rest)) => (head, rest),
            None => (message.address.as_str(), ""),
        };

        // An address rooted at this patch's own identifier re-enters the
        // registry with the residual path.
        if head == self.identifier && !rest.is_empty() {
            let payload = message.payload.clone();
            self.queue.push_back(Message::new(rest, payload));
            return;
        }

        match self.receivers.get(head).copied() {
            Some(ReceiverKind::Node(id)) => {
                let follow =
                    self.nodes[id.0 as usize]
                        .module
                        .deliver(rest, &message.payload, config);
                self.queue.extend(follow);
            }
            Some(ReceiverKind::Messenger(index)) if rest.is_empty() => {
                self.messengers[index].receive_message(&message.payload);
            }
            Some(ReceiverKind::Control(index)) if rest.is_empty() => {
                self.controls[index].receive_message(&message.payload);
            }
            _ => {
                #[cfg(feature = "tracing")]
                tracing::debug!("patch_route: dropped message to '{}'", message.address);
            }
        }
    }

    // --- Block evaluation ---

    /// Runs one full block as the root of the graph: prepare pass, control
    /// tier, audio pull, timestamp advance.
    pub fn process_block(&mut self, config: &AudioConfig) {
        debug_assert_eq!(config.block_size, self.block_size);
        self.begin_block();
        self.run_block(config);
    }

    /// Reads a boundary output's samples for the block just processed.
    ///
    /// # Panics
    ///
    /// Panics if `port` is not a boundary output index.
    pub fn output(&self, port: usize) -> &[f32] {
        let id = self.boundary_outputs[port];
        self.nodes[id.0 as usize].outputs[0].as_slice()
    }

    /// Prepare pass: clear every input socket, reset did-run flags, run
    /// module prepare hooks.
    fn begin_block(&mut self) {
        for slot in &mut self.nodes {
            slot.did_run = false;
            for socket in &mut slot.inputs {
                socket.buffer_mut().clear();
            }
            slot.module.prepare();
        }
    }

    /// Control tier plus audio pull; advances the timestamp.
    fn run_block(&mut self, config: &AudioConfig) {
        // Messengers first: everything they trigger sounds this block.
        for index in 0..self.messengers.len() {
            let produced = self.messengers[index].messages(self.timestamp, config);
            self.queue.extend(produced);
            self.route_pending(config);
        }

        // Controls tick in registration order; wires push after each tick.
        for index in 0..self.controls.len() {
            self.controls[index].tick(self.timestamp, config);
            self.push_control_wires(index);
        }

        // Side-effectful nodes run even when unconsumed.
        for index in 0..self.nodes.len() {
            if self.nodes[index].must_synthesize {
                self.pull(ModuleId(index as u32), config);
            }
        }

        // Pull the boundary outputs; this transitively synthesizes the
        // whole reachable interior.
        for index in 0..self.boundary_outputs.len() {
            let id = self.boundary_outputs[index];
            self.pull(id, config);
        }

        self.timestamp += config.block_size as u64;
    }

    fn push_control_wires(&mut self, source: usize) {
        for w in 0..self.control_wires.len() {
            if self.control_wires[w].source != source {
                continue;
            }
            let ControlWire {
                output,
                target,
                input,
                ..
            } = self.control_wires[w];
            let value = self.controls[source].control_output(output);
            match target {
                ControlTarget::Control(id) => {
                    self.controls[id.0 as usize].receive_control(value, input);
                }
                ControlTarget::Module(id) => {
                    self.nodes[id.0 as usize].module.receive_control(value, input);
                }
            }
        }
    }

    /// Memoized pull: synthesizes the node's producers, accumulates their
    /// outputs into the node's input sockets, then synthesizes the node.
    /// Re-entry within a block is a no-op.
    fn pull(&mut self, id: ModuleId, config: &AudioConfig) {
        let idx = id.0 as usize;
        if self.nodes[idx].did_run {
            return;
        }
        self.nodes[idx].did_run = true;

        for socket in 0..self.nodes[idx].inputs.len() {
            for c in 0..self.nodes[idx].inputs[socket].connections().len() {
                let Connection { source, output } = self.nodes[idx].inputs[socket].connections()[c];
                self.pull(source, config);
                let (consumer, producer) = self.slot_pair(idx, source.0 as usize);
                consumer.inputs[socket]
                    .buffer_mut()
                    .accumulate(&producer.outputs[output]);
            }
        }

        let (module, inputs, outputs) = self.nodes[idx].split();
        module.synthesize(inputs, outputs, config);
    }

    /// Split borrow of two distinct slots: the first mutably, the second
    /// immutably. Wiring is acyclic, so a node never accumulates from
    /// itself.
    fn slot_pair(&mut self, a: usize, b: usize) -> (&mut NodeSlot, &NodeSlot) {
        debug_assert_ne!(a, b);
        if a < b {
            let (lo, hi) = self.nodes.split_at_mut(b);
            (&mut lo[a], &hi[0])
        } else {
            let (lo, hi) = self.nodes.split_at_mut(a);
            (&mut hi[0], &lo[b])
        }
    }

    /// DFS over the upstream connection lists: can `target` be reached from
    /// `start` walking producer-ward?
    fn reaches_upstream(&self, start: ModuleId, target: ModuleId) -> bool {
        let mut visited = Vec::new();
        visited.resize(self.nodes.len(), false);
        let mut stack = Vec::new();
        stack.push(start.0 as usize);

        while let Some(current) = stack.pop() {
            if current == target.0 as usize {
                return true;
            }
            if visited[current] {
                continue;
            }
            visited[current] = true;
            for socket in &self.nodes[current].inputs {
                for connection in socket.connections() {
                    stack.push(connection.source.0 as usize);
                }
            }
        }
        false
    }
}

impl Module for Patch {
    fn num_inputs(&self) -> usize {
        self.boundary_inputs.len()
    }

    fn num_outputs(&self) -> usize {
        self.boundary_outputs.len()
    }

    fn synthesize(&mut self, inputs: &[Socket], outputs: &mut [Buffer], config: &AudioConfig) {
        self.begin_block();
        // Outer inputs land on the boundary input nodes' sockets.
        for (port, socket) in inputs.iter().enumerate() {
            let id = self.boundary_inputs[port];
            self.nodes[id.0 as usize].inputs[0]
                .buffer_mut()
                .copy_from(socket.buffer());
        }
        self.run_block(config);
        for (port, out) in outputs.iter_mut().enumerate() {
            let id = self.boundary_outputs[port];
            out.copy_from(&self.nodes[id.0 as usize].outputs[0]);
        }
    }

    fn receive_message(&mut self, _payload: &Record, _config: &AudioConfig) -> Vec<Message> {
        // A bare payload with no residual path has nowhere to go inside the
        // patch; hierarchical addressing goes through `deliver`.
        Vec::new()
    }

    fn deliver(&mut self, path: &str, payload: &Record, config: &AudioConfig) -> Vec<Message> {
        if !path.is_empty() {
            self.send(path, payload.clone(), config);
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(not(feature = "std"))]
    use alloc::rc::Rc;
    use core::cell::Cell;
    #[cfg(feature = "std")]
    use std::rc::Rc;

    /// Emits a constant, counting how many times it actually synthesizes.
    struct CountingSource {
        value: f32,
        runs: Rc<Cell<usize>>,
    }

    impl Module for CountingSource {
        fn num_inputs(&self) -> usize {
            0
        }
        fn num_outputs(&self) -> usize {
            1
        }
        fn synthesize(&mut self, _inputs: &[Socket], outputs: &mut [Buffer], _config: &AudioConfig) {
            self.runs.set(self.runs.get() + 1);
            outputs[0].fill(self.value);
        }
    }

    /// Doubles its summed input.
    struct Doubler;

    impl Module for Doubler {
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
                *out = inp * 2.0;
            }
        }
    }

    /// Remembers the last scalar it received on a control input.
    struct ControlSink {
        seen: Rc<Cell<f32>>,
    }

    impl Module for ControlSink {
        fn num_inputs(&self) -> usize {
            0
        }
        fn num_outputs(&self) -> usize {
            1
        }
        fn synthesize(&mut self, _inputs: &[Socket], outputs: &mut [Buffer], _config: &AudioConfig) {
            outputs[0].clear();
        }
        fn receive_control(&mut self, value: f32, _input: usize) {
            self.seen.set(value);
        }
    }

    fn config() -> AudioConfig {
        AudioConfig::new(44_100.0, 16)
    }

    fn counting(value: f32) -> (Box<CountingSource>, Rc<Cell<usize>>) {
        let runs = Rc::new(Cell::new(0));
        (
            Box::new(CountingSource {
                value,
                runs: Rc::clone(&runs),
            }),
            runs,
        )
    }

    #[test]
    fn test_diamond_synthesizes_shared_ancestor_once() {
        let config = config();
        let mut patch = Patch::new("root", &config);
        let (src, runs) = counting(1.0);
        let source = patch.add_module("src", src);
        let left = patch.add_module("left", Box::new(Doubler));
        let right = patch.add_module("right", Box::new(Doubler));
        let out = patch.add_boundary_output();

        patch.connect(source, 0, left, 0).unwrap();
        patch.connect(source, 0, right, 0).unwrap();
        patch.connect(left, 0, out, 0).unwrap();
        patch.connect(right, 0, out, 0).unwrap();

        patch.process_block(&config);
        assert_eq!(runs.get(), 1);
        // 1.0 doubled on each branch, summed at the boundary socket.
        assert!(patch.output(0).iter().all(|&s| s == 4.0));

        patch.process_block(&config);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_socket_sums_all_connections() {
        let config = config();
        let mut patch = Patch::new("root", &config);
        let (a, _) = counting(0.25);
        let (b, _) = counting(0.5);
        let (c, _) = counting(1.0);
        let a = patch.add_module("a", a);
        let b = patch.add_module("b", b);
        let c = patch.add_module("c", c);
        let out = patch.add_boundary_output();

        patch.connect(a, 0, out, 0).unwrap();
        patch.connect(b, 0, out, 0).unwrap();
        patch.connect(c, 0, out, 0).unwrap();

        patch.process_block(&config);
        assert!(patch.output(0).iter().all(|&s| s == 1.75));
    }

    #[test]
    fn test_unconnected_node_does_not_run_without_flag() {
        let config = config();
        let mut patch = Patch::new("root", &config);
        let (src, runs) = counting(1.0);
        patch.add_module("orphan", src);
        let out = patch.add_boundary_output();
        let _ = out;

        patch.process_block(&config);
        assert_eq!(runs.get(), 0);
    }

    #[test]
    fn test_must_synthesize_forces_unconnected_node() {
        let config = config();
        let mut patch = Patch::new("root", &config);
        let (src, runs) = counting(1.0);
        let orphan = patch.add_module("orphan", src);
        patch.add_boundary_output();
        patch.set_must_synthesize(orphan, true).unwrap();

        patch.process_block(&config);
        patch.process_block(&config);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_connect_rejects_out_of_range_ports() {
        let config = config();
        let mut patch = Patch::new("root", &config);
        let (src, _) = counting(1.0);
        let source = patch.add_module("src", src);
        let sink = patch.add_module("sink", Box::new(Doubler));

        assert_eq!(
            patch.connect(source, 1, sink, 0),
            Err(GraphError::OutputOutOfRange(source, 1))
        );
        assert_eq!(
            patch.connect(source, 0, sink, 3),
            Err(GraphError::InputOutOfRange(sink, 3))
        );
    }

    #[test]
    fn test_connect_rejects_cycles() {
        let config = config();
        let mut patch = Patch::new("root", &config);
        let a = patch.add_module("a", Box::new(Doubler));
        let b = patch.add_module("b", Box::new(Doubler));
        let c = patch.add_module("c", Box::new(Doubler));

        patch.connect(a, 0, b, 0).unwrap();
        patch.connect(b, 0, c, 0).unwrap();
        assert_eq!(patch.connect(c, 0, a, 0), Err(GraphError::CycleDetected));
        assert_eq!(patch.connect(a, 0, a, 0), Err(GraphError::CycleDetected));
    }

    #[test]
    fn test_disconnect_silences_branch() {
        let config = config();
        let mut patch = Patch::new("root", &config);
        let (src, _) = counting(1.0);
        let source = patch.add_module("src", src);
        let out = patch.add_boundary_output();
        patch.connect(source, 0, out, 0).unwrap();

        patch.process_block(&config);
        assert!(patch.output(0).iter().all(|&s| s == 1.0));

        patch.disconnect(source, 0, out, 0).unwrap();
        patch.process_block(&config);
        assert!(patch.output(0).iter().all(|&s| s == 0.0));

        assert_eq!(
            patch.disconnect(source, 0, out, 0),
            Err(GraphError::ConnectionNotFound)
        );
    }

    #[test]
    fn test_nested_patch_passes_signal_through_boundaries() {
        let config = config();

        let mut inner = Patch::new("inner", &config);
        let b_in = inner.add_boundary_input();
        let doubler = inner.add_module("double", Box::new(Doubler));
        let b_out = inner.add_boundary_output();
        inner.connect(b_in, 0, doubler, 0).unwrap();
        inner.connect(doubler, 0, b_out, 0).unwrap();

        let mut root = Patch::new("root", &config);
        let (src, _) = counting(0.5);
        let source = root.add_module("src", src);
        let nested = root.add_module("inner", Box::new(inner));
        let out = root.add_boundary_output();
        root.connect(source, 0, nested, 0).unwrap();
        root.connect(nested, 0, out, 0).unwrap();

        root.process_block(&config);
        assert!(root.output(0).iter().all(|&s| s == 1.0));
    }

    #[test]
    fn test_control_wire_pushes_scalar_to_module() {
        let config = config();
        let mut patch = Patch::new("root", &config);

        struct FixedControl(f32);
        impl Control for FixedControl {
            fn tick(&mut self, _timestamp: u64, _config: &AudioConfig) {}
            fn control_output(&self, _output: usize) -> f32 {
                self.0
            }
        }

        let seen = Rc::new(Cell::new(0.0));
        let sink = patch.add_module(
            "sink",
            Box::new(ControlSink {
                seen: Rc::clone(&seen),
            }),
        );
        let out = patch.add_boundary_output();
        patch.connect(sink, 0, out, 0).unwrap();

        let ctl = patch.add_control("lfo", Box::new(FixedControl(0.75)));
        patch
            .connect_control(ctl, 0, ControlTarget::Module(sink), 0)
            .unwrap();

        patch.process_block(&config);
        assert_eq!(seen.get(), 0.75);
    }

    #[test]
    fn test_timestamp_advances_by_block() {
        let config = config();
        let mut patch = Patch::new("root", &config);
        patch.add_boundary_output();
        assert_eq!(patch.timestamp(), 0);
        patch.process_block(&config);
        patch.process_block(&config);
        assert_eq!(patch.timestamp(), 32);
    }

    #[test]
    fn test_unresolvable_address_is_dropped() {
        let config = config();
        let mut patch = Patch::new("root", &config);
        patch.add_boundary_output();
        // No receiver named "ghost": must be a silent no-op.
        patch.send("ghost.param", Record::new().with("value", 1.0f32), &config);
        patch.process_block(&config);
    }
}
