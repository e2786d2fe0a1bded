//! Input ports and their connections.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::buffer::Buffer;
use crate::patch::ModuleId;

/// A directed edge into an input socket: which node produces the signal and
/// which of its output ports to read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Connection {
    /// Producer node.
    pub source: ModuleId,
    /// Output port index on the producer.
    pub output: usize,
}

/// One input port of a node.
///
/// A socket owns its [`Buffer`] and the list of connections feeding it. The
/// buffer is cleared at the start of every block, then each connected
/// producer's output is accumulated into it during the pull traversal, so by
/// the time the node synthesizes, the socket holds the element-wise sum of
/// all its sources.
#[derive(Debug)]
pub struct Socket {
    buffer: Buffer,
    connections: Vec<Connection>,
}

impl Socket {
    pub(crate) fn new(block_size: usize) -> Self {
        Self {
            buffer: Buffer::new(block_size),
            connections: Vec::new(),
        }
    }

    /// The summed input signal for the current block.
    #[inline]
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Shorthand for `buffer().as_slice()`.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        self.buffer.as_slice()
    }

    /// The connections feeding this socket.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Whether any producer feeds this socket.
    pub fn is_connected(&self) -> bool {
        !self.connections.is_empty()
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut Buffer {
        &mut self.buffer
    }

    pub(crate) fn attach(&mut self, connection: Connection) {
        self.connections.push(connection);
    }

    pub(crate) fn detach(&mut self, connection: Connection) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| *c != connection);
        self.connections.len() != before
    }
}
