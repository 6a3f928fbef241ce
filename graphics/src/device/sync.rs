//! Deferred synchronization helpers.

use std::collections::VecDeque;

use super::MAX_TEXTURE_SLOTS;

/// Whether a piece of cached state still has to reach the native layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum SyncState {
    #[default]
    Clean,
    Dirty,
}

impl SyncState {
    pub(crate) fn mark_dirty(&mut self) {
        *self = Self::Dirty;
    }

    /// Returns true if the state was dirty, leaving it clean.
    pub(crate) fn take(&mut self) -> bool {
        std::mem::take(self) == Self::Dirty
    }
}

/// FIFO of texture slots whose texture or sampler changed since the last draw.
///
/// A slot is queued at most once until it is popped.
#[derive(Debug, Default)]
pub(crate) struct SamplerQueue {
    order: VecDeque<usize>,
    queued: [bool; MAX_TEXTURE_SLOTS],
}

impl SamplerQueue {
    pub(crate) fn push(&mut self, slot: usize) {
        if !self.queued[slot] {
            self.queued[slot] = true;
            self.order.push_back(slot);
        }
    }

    pub(crate) fn pop(&mut self) -> Option<usize> {
        let slot = self.order.pop_front()?;
        self.queued[slot] = false;
        Some(slot)
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }
}
