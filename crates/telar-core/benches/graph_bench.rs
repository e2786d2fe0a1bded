//! Criterion benchmarks for the pull-based graph engine.
//!
//! Measures traversal overhead independently of DSP cost using a trivial
//! gain node. Two topologies:
//!
//! - **chain** — N nodes in series (pull recursion depth)
//! - **fan** — N producers summed into one socket (accumulation cost)
//!
//! Run with: `cargo bench -p telar-core`
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use telar_core::{AudioConfig, Buffer, Module, Patch, Socket};

const BLOCK_SIZE: usize = 128;
const NODE_COUNTS: &[usize] = &[4, 16, 64];

/// Trivial gain node that isolates graph overhead from DSP cost.
struct Gain(f32);

impl Module for Gain {
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
            *out = inp * self.0;
        }
    }
}

struct Level(f32);

impl Module for Level {
    fn num_inputs(&self) -> usize {
        0
    }
    fn num_outputs(&self) -> usize {
        1
    }
    fn synthesize(&mut self, _inputs: &[Socket], outputs: &mut [Buffer], _config: &AudioConfig) {
        outputs[0].fill(self.0);
    }
}

fn chain_patch(nodes: usize, config: &AudioConfig) -> Patch {
    let mut patch = Patch::new("bench", config);
    let mut prev = patch.add_module("src", Box::new(Level(0.5)));
    for _ in 0..nodes {
        let gain = patch.add_module("", Box::new(Gain(0.999)));
        patch.connect(prev, 0, gain, 0).unwrap();
        prev = gain;
    }
    let out = patch.add_boundary_output();
    patch.connect(prev, 0, out, 0).unwrap();
    patch
}

fn fan_patch(nodes: usize, config: &AudioConfig) -> Patch {
    let mut patch = Patch::new("bench", config);
    let out = patch.add_boundary_output();
    for _ in 0..nodes {
        let src = patch.add_module("", Box::new(Level(0.01)));
        patch.connect(src, 0, out, 0).unwrap();
    }
    patch
}

fn bench_pull(c: &mut Criterion) {
    let config = AudioConfig::new(48_000.0, BLOCK_SIZE);

    let mut group = c.benchmark_group("graph/chain");
    for &nodes in NODE_COUNTS {
        let mut patch = chain_patch(nodes, &config);
        group.bench_with_input(BenchmarkId::from_parameter(nodes), &nodes, |b, _| {
            b.iter(|| {
                patch.process_block(&config);
                black_box(patch.output(0)[0])
            });
        });
    }
    group.finish();

    let mut group = c.benchmark_group("graph/fan");
    for &nodes in NODE_COUNTS {
        let mut patch = fan_patch(nodes, &config);
        group.bench_with_input(BenchmarkId::from_parameter(nodes), &nodes, |b, _| {
            b.iter(|| {
                patch.process_block(&config);
                black_box(patch.output(0)[0])
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pull);
criterion_main!(benches);
