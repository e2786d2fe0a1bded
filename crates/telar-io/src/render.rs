//! Offline block-loop driver.

use telar_core::{AudioConfig, Module, Patch, Record};

/// Drives a root patch block by block and collects its boundary outputs.
///
/// The renderer is the single execution context the engine assumes: one
/// `process_block` per block, strictly sequential. Messages can be injected
/// between blocks through [`send`](OfflineRenderer::send).
pub struct OfflineRenderer {
    patch: Patch,
    config: AudioConfig,
}

impl OfflineRenderer {
    /// Wraps a root patch and the configuration to drive it with.
    pub fn new(patch: Patch, config: AudioConfig) -> Self {
        Self { patch, config }
    }

    /// The configuration the renderer drives with.
    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    /// Mutable access to the patch between blocks.
    pub fn patch_mut(&mut self) -> &mut Patch {
        &mut self.patch
    }

    /// Routes a message into the patch before the next block.
    pub fn send(&mut self, address: &str, payload: Record) {
        self.patch.send(address, payload, &self.config);
    }

    /// Renders the given number of blocks, returning one sample vector per
    /// boundary output.
    pub fn render_blocks(&mut self, blocks: usize) -> Vec<Vec<f32>> {
        let ports = self.patch.num_outputs();
        let mut channels: Vec<Vec<f32>> =
            (0..ports).map(|_| Vec::with_capacity(blocks * self.config.block_size)).collect();

        tracing::debug!(
            blocks,
            ports,
            block_size = self.config.block_size,
            "offline render"
        );

        for _ in 0..blocks {
            self.patch.process_block(&self.config);
            for (port, channel) in channels.iter_mut().enumerate() {
                channel.extend_from_slice(self.patch.output(port));
            }
        }
        channels
    }

    /// Renders at least `seconds` of audio (rounded up to whole blocks).
    pub fn render_secs(&mut self, seconds: f32) -> Vec<Vec<f32>> {
        let samples = self.config.seconds_to_samples(seconds);
        let blocks = samples.div_ceil(self.config.block_size);
        self.render_blocks(blocks)
    }
}
