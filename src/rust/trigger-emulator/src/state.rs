// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::sync::atomic::{AtomicU64, Ordering};

const EMITTING: u64 = 1 << 32;
const INDEX_MASK: u64 = u32::MAX as u64;
const NEVER_STOP: u64 = INDEX_MASK;

/// Whether the emulator is emitting, and the phase index at which it stops.
///
/// Both fields live in one atomic word so the boundary callback never sees a stop index
/// from one update paired with the emitting flag of another.
#[derive(Debug)]
pub struct EmulationState {
    word: AtomicU64,
}

impl Default for EmulationState {
    fn default() -> Self {
        EmulationState {
            word: AtomicU64::new(EMITTING | NEVER_STOP),
        }
    }
}

fn encode_index(index: usize) -> u64 {
    // Saturates below the sentinel; no phase table is that long.
    u64::try_from(index).map_or(NEVER_STOP - 1, |i| i.min(NEVER_STOP - 1))
}

impl EmulationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_emitting(&self) -> bool {
        self.word.load(Ordering::Acquire) & EMITTING != 0
    }

    pub fn stop_at_index(&self) -> Option<usize> {
        match self.word.load(Ordering::Acquire) & INDEX_MASK {
            NEVER_STOP => None,
            index => usize::try_from(index).ok(),
        }
    }

    pub(crate) fn set_stop_at_index(&self, index: usize) {
        let index = encode_index(index);
        // The closure never returns `None`, so the update always succeeds.
        let _ = self
            .word
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |word| {
                Some((word & EMITTING) | index)
            });
    }

    pub(crate) fn resume(&self) {
        self.word.store(EMITTING | NEVER_STOP, Ordering::Release);
    }

    /// Apply the stop condition for the boundary entering `phase_index`.
    ///
    /// Returns whether the boundary should be emitted.
    pub(crate) fn check_boundary(&self, phase_index: usize) -> bool {
        let index = encode_index(phase_index);
        match self
            .word
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |word| {
                if word & EMITTING != 0 && word & INDEX_MASK == index {
                    Some(word & !EMITTING)
                } else {
                    None
                }
            }) {
            Ok(_) => false,
            Err(word) => word & EMITTING != 0,
        }
    }
}
