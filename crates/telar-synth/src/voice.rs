//! Polyphonic voice pool.
//!
//! [`Polyphony`] is a module owning a fixed set of pre-built voices
//! partitioned across intrusive free/active lists. Trigger messages pop a
//! voice from the free list and start its note; the voice is reclaimed —
//! once per block, after its final block has sounded — when it reports
//! inactive. Triggers that arrive with the free list exhausted are dropped,
//! never queued: a defined degradation, not an error.

#[cfg(not(feature = "std"))]
use alloc::{
    boxed::Box,
    string::{String, ToString},
    vec,
    vec::Vec,
};

use telar_core::{AudioConfig, Buffer, Message, Module, Record, Socket};

use crate::pool::SlotLinks;

/// A playable note instance: a module with a note lifecycle.
///
/// Voices stay owned by their pool for the whole program; only list
/// membership changes. After `note_off` (or a `note` duration elapsing) a
/// voice keeps sounding until its envelope tail finishes, then reports
/// `is_active() == false` and is reclaimed.
pub trait Voice: Module {
    /// Starts a note that schedules its own release after `duration_secs`.
    fn note(&mut self, duration_secs: f32, amplitude: f32, payload: &Record, config: &AudioConfig);

    /// Starts a held note; it sounds until `note_off`.
    fn note_on(&mut self, amplitude: f32, payload: &Record, config: &AudioConfig);

    /// Begins the release of a held note.
    fn note_off(&mut self);

    /// True while the voice still produces sound.
    fn is_active(&self) -> bool;
}

const FREE: usize = 0;
const ACTIVE: usize = 1;

struct VoiceSlot {
    voice: Box<dyn Voice>,
    tag: Option<String>,
}

/// Module that fans one per-block synthesis call across a pool of voices.
///
/// Commands accepted by [`receive_message`](Module::receive_message):
///
/// - `trigger` with a `duration` float: timed note (drops silently when the
///   free pool is exhausted);
/// - `trigger` with a `note_on` string key: held note, tagged for matching;
/// - `trigger` with a `note_off` string key: releases the matching held
///   note; a key with no matching active voice is a no-op;
/// - `voice`: broadcast to every voice in both pools, for global parameter
///   updates regardless of note state.
pub struct Polyphony {
    slots: Vec<VoiceSlot>,
    links: SlotLinks,
    outputs: usize,
    scratch: Vec<Buffer>,
}

impl Polyphony {
    /// Builds a pool from pre-constructed voices. All voices must share the
    /// same output arity.
    ///
    /// # Panics
    ///
    /// Panics at construction time if `voices` is empty or arities differ.
    pub fn new(voices: Vec<Box<dyn Voice>>, config: &AudioConfig) -> Self {
        assert!(!voices.is_empty(), "polyphony needs at least one voice");
        let outputs = voices[0].num_outputs();
        assert!(
            voices.iter().all(|v| v.num_outputs() == outputs),
            "all voices must share one output arity"
        );
        let count = voices.len();
        Self {
            slots: voices
                .into_iter()
                .map(|voice| VoiceSlot { voice, tag: None })
                .collect(),
            links: SlotLinks::new(count, 2),
            outputs,
            scratch: vec![Buffer::new(config.block_size); outputs],
        }
    }

    /// Number of voices waiting in the free pool.
    pub fn free_len(&self) -> usize {
        self.links.len(FREE)
    }

    /// Number of voices currently allocated to notes.
    pub fn active_len(&self) -> usize {
        self.links.len(ACTIVE)
    }

    /// Begins the release of every active voice.
    pub fn all_notes_off(&mut self) {
        let mut cursor = self.links.first(ACTIVE);
        while let Some(i) = cursor {
            self.slots[i].voice.note_off();
            cursor = self.links.next_of(i);
        }
    }

    fn trigger(&mut self, payload: &Record, config: &AudioConfig) {
        let amplitude = payload.float("amplitude").unwrap_or(1.0);

        if let Some(duration) = payload.float("duration") {
            if let Some(i) = self.links.pop_front(FREE) {
                self.slots[i].voice.note(duration, amplitude, payload, config);
                self.slots[i].tag = None;
                self.links.push_back(ACTIVE, i);
            }
        } else if let Some(key) = payload.string("note_on") {
            if let Some(i) = self.links.pop_front(FREE) {
                self.slots[i].voice.note_on(amplitude, payload, config);
                self.slots[i].tag = Some(key.to_string());
                self.links.push_back(ACTIVE, i);
            }
        } else if let Some(key) = payload.string("note_off") {
            let mut cursor = self.links.first(ACTIVE);
            while let Some(i) = cursor {
                if self.slots[i].tag.as_deref() == Some(key) {
                    self.slots[i].voice.note_off();
                    break;
                }
                cursor = self.links.next_of(i);
            }
        }
    }
}

impl Module for Polyphony {
    fn num_inputs(&self) -> usize {
        0
    }

    fn num_outputs(&self) -> usize {
        self.outputs
    }

    fn synthesize(&mut self, _inputs: &[Socket], outputs: &mut [Buffer], config: &AudioConfig) {
        for out in outputs.iter_mut() {
            out.clear();
        }

        let mut cursor = self.links.first(ACTIVE);
        while let Some(i) = cursor {
            self.slots[i].voice.prepare();
            cursor = self.links.next_of(i);
        }

        let Self {
            slots,
            links,
            scratch,
            ..
        } = self;

        let mut cursor = links.first(ACTIVE);
        while let Some(i) = cursor {
            let next = links.next_of(i);
            if slots[i].voice.is_active() {
                for buf in scratch.iter_mut() {
                    buf.clear();
                }
                slots[i].voice.synthesize(&[], scratch, config);
                for (out, rendered) in outputs.iter_mut().zip(scratch.iter()) {
                    out.accumulate(rendered);
                }
            } else {
                links.unlink(i);
                slots[i].tag = None;
                links.push_back(FREE, i);
            }
            cursor = next;
        }
    }

    fn receive_message(&mut self, payload: &Record, config: &AudioConfig) -> Vec<Message> {
        match payload.command() {
            Some("trigger") => {
                self.trigger(payload, config);
                Vec::new()
            }
            Some("voice") => {
                let mut follow = Vec::new();
                for slot in &mut self.slots {
                    follow.extend(slot.voice.receive_message(payload, config));
                }
                follow
            }
            _ => Vec::new(),
        }
    }
}
