//! Granular synthesis scheduler.
//!
//! [`Granulator`] owns a bounded pool of pre-built grains across three
//! intrusive lists — free, active, and freshly-activated-this-block — and a
//! pluggable [`Sequence`] yielding (parameter, inter-onset) steps. Onsets
//! are sample-accurate: a step whose inter-onset lands inside the current
//! block starts its grain at exactly that sample offset, with the envelope
//! at phase zero, rather than at the next block boundary.
//!
//! Per block: active grains render a full block first; then the scheduler
//! walks the block in inter-onset increments, rendering fresh grains
//! segment by segment between onsets; finally the fresh list splices onto
//! the active list for full-block treatment from the next block on. Onsets
//! that find the free pool exhausted are dropped silently.

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, vec, vec::Vec};

use libm::sincosf;
use telar_core::{AudioConfig, Buffer, Module, Socket};

use crate::grain_env::{GrainEnvelope, GrainShape};
use crate::grain_src::{GrainParameter, GrainSource, Sequence};
use crate::pool::SlotLinks;

const FREE: usize = 0;
const ACTIVE: usize = 1;
const FRESH: usize = 2;

const FRAC_PI_4: f32 = core::f32::consts::FRAC_PI_4;

struct GrainSlot<P> {
    source: Box<dyn GrainSource<P>>,
    envelope: GrainEnvelope,
    remaining: usize,
    gain_left: f32,
    gain_right: f32,
}

struct PendingStep<P> {
    parameter: P,
    remaining: usize,
}

/// Stereo granular synthesis module (0 inputs / 2 outputs).
///
/// Generic over the parameter type its sequence and sources share, fixed
/// per instance.
pub struct Granulator<P: GrainParameter> {
    grains: Vec<GrainSlot<P>>,
    links: SlotLinks,
    sequence: Box<dyn Sequence<P>>,
    pending: PendingStep<P>,
    clock: u64,
    env_scratch: Vec<f32>,
}

impl<P: GrainParameter> Granulator<P> {
    /// Builds a granulator with one grain per supplied source.
    ///
    /// The first step is requested immediately, so the first onset lands
    /// `inter_onset` samples into the first block.
    ///
    /// # Panics
    ///
    /// Panics at construction time if `sources` is empty.
    pub fn new(
        sources: Vec<Box<dyn GrainSource<P>>>,
        shape: GrainShape,
        mut sequence: Box<dyn Sequence<P>>,
        config: &AudioConfig,
    ) -> Self {
        assert!(!sources.is_empty(), "granulator needs at least one grain");
        let count = sources.len();
        let first = sequence.next_step(0, config);
        Self {
            grains: sources
                .into_iter()
                .map(|source| GrainSlot {
                    source,
                    envelope: GrainEnvelope::new(shape),
                    remaining: 0,
                    gain_left: 0.0,
                    gain_right: 0.0,
                })
                .collect(),
            links: SlotLinks::new(count, 3),
            sequence,
            pending: PendingStep {
                parameter: first.parameter,
                remaining: first.inter_onset.max(1),
            },
            clock: 0,
            env_scratch: vec![0.0; config.block_size],
        }
    }

    /// Grains waiting in the free pool.
    pub fn free_len(&self) -> usize {
        self.links.len(FREE)
    }

    /// Grains currently sounding (including ones activated this block).
    pub fn active_len(&self) -> usize {
        self.links.len(ACTIVE) + self.links.len(FRESH)
    }
}

/// Renders up to `len` samples of one grain at `offset`, returning true
/// once the grain's remaining count reaches zero.
fn render_segment<P: GrainParameter>(
    slot: &mut GrainSlot<P>,
    env_scratch: &mut [f32],
    left: &mut [f32],
    right: &mut [f32],
    offset: usize,
    len: usize,
) -> bool {
    let count = len.min(slot.remaining);
    if count > 0 {
        let env = &mut env_scratch[..count];
        slot.envelope.synthesize(env);
        for (k, &gain) in env.iter().enumerate() {
            let sample = slot.source.next_sample() * gain;
            left[offset + k] += sample * slot.gain_left;
            right[offset + k] += sample * slot.gain_right;
        }
        slot.remaining -= count;
    }
    slot.remaining == 0
}

/// Advances every grain in `list` by `len` samples at `offset`, reclaiming
/// exhausted grains to the free pool mid-walk.
fn advance_list<P: GrainParameter>(
    grains: &mut [GrainSlot<P>],
    links: &mut SlotLinks,
    env_scratch: &mut [f32],
    left: &mut [f32],
    right: &mut [f32],
    list: usize,
    offset: usize,
    len: usize,
) {
    let mut cursor = links.first(list);
    while let Some(i) = cursor {
        let next = links.next_of(i);
        if render_segment(&mut grains[i], env_scratch, left, right, offset, len) {
            links.unlink(i);
            links.push_back(FREE, i);
        }
        cursor = next;
    }
}

fn activate_slot<P: GrainParameter>(slot: &mut GrainSlot<P>, parameter: &P, config: &AudioConfig) {
    let duration = config.seconds_to_samples(parameter.duration_secs()).max(1);
    slot.remaining = duration;
    // equal-power pan
    let angle = (parameter.panning().clamp(-1.0, 1.0) + 1.0) * FRAC_PI_4;
    let (sin_a, cos_a) = sincosf(angle);
    slot.gain_left = cos_a;
    slot.gain_right = sin_a;
    slot.envelope.activate(
        parameter.amplitude(),
        duration,
        parameter.attack(),
        parameter.release(),
    );
    slot.source.activate(parameter, config);
}

impl<P: GrainParameter> Module for Granulator<P> {
    fn num_inputs(&self) -> usize {
        0
    }

    fn num_outputs(&self) -> usize {
        2
    }

    fn synthesize(&mut self, _inputs: &[Socket], outputs: &mut [Buffer], config: &AudioConfig) {
        let Self {
            grains,
            links,
            sequence,
            pending,
            clock,
            env_scratch,
        } = self;

        let (left_buf, right_buf) = outputs.split_at_mut(1);
        let left = left_buf[0].as_mut_slice();
        let right = right_buf[0].as_mut_slice();
        left.fill(0.0);
        right.fill(0.0);
        let n = left.len();

        // (a) grains already running get the full block.
        advance_list(grains, links, env_scratch, left, right, ACTIVE, 0, n);

        // (b) walk the block in inter-onset increments. Fresh grains render
        // exactly the gap between onsets, so each begins at its own offset.
        let mut offset = 0;
        while pending.remaining < n - offset {
            let gap = pending.remaining;
            advance_list(grains, links, env_scratch, left, right, FRESH, offset, gap);
            offset += gap;

            if let Some(i) = links.pop_front(FREE) {
                activate_slot(&mut grains[i], &pending.parameter, config);
                links.push_back(FRESH, i);
            }
            let step = sequence.next_step(*clock + offset as u64, config);
            *pending = PendingStep {
                parameter: step.parameter,
                remaining: step.inter_onset.max(1),
            };
        }

        let tail = n - offset;
        advance_list(grains, links, env_scratch, left, right, FRESH, offset, tail);
        pending.remaining -= tail;

        // (c) everything activated this block runs full blocks from now on.
        links.append(FRESH, ACTIVE);
        *clock += n as u64;
    }
}
