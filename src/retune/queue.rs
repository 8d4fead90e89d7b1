//! Deferred Retune Queue
//!
//! Fixed-capacity FIFO ring buffer of pending retunes. No allocation; the
//! capacity is a compile-time power of two so cursors wrap with a mask.

use super::entry::RetuneEntry;
use crate::config::RETUNE_QUEUE_CAPACITY;
use crate::error::RetuneError;
use crate::types::{LmsFreq, Module};

/// Bounded FIFO of deferred retunes
///
/// Only [`insert`](Self::insert), [`remove`](Self::remove) and
/// [`reset`](Self::reset) move the cursors. The slot at the remove cursor is
/// the head: the oldest request, and the only one the scheduler progresses.
#[derive(Clone, Debug)]
pub struct RetuneQueue<const N: usize = RETUNE_QUEUE_CAPACITY> {
    entries: [Option<RetuneEntry>; N],
    count: usize,
    ins_idx: usize,
    rem_idx: usize,
}

impl<const N: usize> RetuneQueue<N> {
    const MASK: usize = {
        assert!(N.is_power_of_two(), "retune queue capacity must be a power of two");
        N - 1
    };

    /// Create an empty queue
    #[must_use]
    pub const fn new() -> Self {
        let _ = Self::MASK;
        Self {
            entries: [None; N],
            count: 0,
            ins_idx: 0,
            rem_idx: 0,
        }
    }

    /// Return to the empty state, discarding all pending retunes
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Append a retune at the tail
    ///
    /// Returns the queue size after the insert.
    ///
    /// # Errors
    /// `QueueFull` when at capacity; nothing is modified.
    pub fn insert(
        &mut self,
        freq: LmsFreq,
        module: Module,
        timestamp: u64,
    ) -> Result<usize, RetuneError> {
        if self.count >= N {
            return Err(RetuneError::QueueFull);
        }

        self.entries[self.ins_idx] = Some(RetuneEntry::new(freq, module, timestamp));
        self.ins_idx = (self.ins_idx + 1) & Self::MASK;
        self.count += 1;

        Ok(self.count)
    }

    /// Take the head entry out of the queue
    ///
    /// Callers that only need to drop the head can ignore the returned copy;
    /// [`len`](Self::len) gives the remaining size.
    ///
    /// # Errors
    /// `QueueEmpty` when there is nothing to remove; nothing is modified.
    pub fn remove(&mut self) -> Result<RetuneEntry, RetuneError> {
        if self.count == 0 {
            return Err(RetuneError::QueueEmpty);
        }

        let entry = self.entries[self.rem_idx]
            .take()
            .ok_or(RetuneError::QueueEmpty)?;
        self.rem_idx = (self.rem_idx + 1) & Self::MASK;
        self.count -= 1;

        Ok(entry)
    }

    /// Head entry, without removing it
    #[must_use]
    pub fn head(&self) -> Option<&RetuneEntry> {
        if self.count == 0 {
            None
        } else {
            self.entries[self.rem_idx].as_ref()
        }
    }

    /// Head entry, for state progression
    pub fn peek_head(&mut self) -> Option<&mut RetuneEntry> {
        if self.count == 0 {
            None
        } else {
            self.entries[self.rem_idx].as_mut()
        }
    }

    /// Pending entries, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &RetuneEntry> + '_ {
        (0..self.count).filter_map(move |i| self.entries[(self.rem_idx + i) & Self::MASK].as_ref())
    }

    /// Number of pending retunes
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Check if no retunes are pending
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Check if another insert would be rejected
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.count >= N
    }

    /// Maximum number of pending retunes
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Insert and remove cursor positions
    #[must_use]
    pub const fn cursors(&self) -> (usize, usize) {
        (self.ins_idx, self.rem_idx)
    }
}

impl<const N: usize> Default for RetuneQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}
