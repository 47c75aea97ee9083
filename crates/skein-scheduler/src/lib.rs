//! Indexed event queue ordered by next firing time.
//!
//! [`Scheduler`] is a binary min-heap over `(tau, insertion seq)` keys
//! with a handle → slot index on the side, giving O(1) peek-minimum
//! and O(log n) insert, remove, and re-key of an arbitrary entry. The
//! re-key path is what makes incremental next-reaction simulation
//! tractable: after each firing only the affected reactions' entries
//! move, instead of the whole queue being rebuilt.
//!
//! # Ordering
//!
//! Entries compare by `(tau, seq)`, where `seq` is a monotonic
//! insertion sequence number. Ties on `tau` therefore resolve in
//! insertion order — stable and deterministic, which reproducible test
//! traces rely on. `seq` survives re-keying: updating an entry's tau
//! does not demote it behind later insertions at the same time.
//!
//! # Contract with the engine
//!
//! The scheduler never computes firing times. Keys are pushed in by
//! the engine after each reaction recomputes its own tau; the entry's
//! key always equals the reaction's current tau. An empty queue, or a
//! minimum entry with infinite tau, means "no more events" — normal
//! termination, not an error.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

use std::error::Error;
use std::fmt;

use indexmap::IndexMap;
use skein_core::{ReactionHandle, Time};

/// Errors from scheduler operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerError {
    /// `add()` was called for a handle that already has an entry.
    ///
    /// Every live reaction has exactly one entry; a second `add` is a
    /// caller bug, unlike `remove`/`update` of an absent handle which
    /// are tolerated no-ops.
    AlreadyScheduled {
        /// The handle with the pre-existing entry.
        handle: ReactionHandle,
    },
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyScheduled { handle } => {
                write!(f, "reaction {handle} is already scheduled")
            }
        }
    }
}

impl Error for SchedulerError {}

#[derive(Clone, Copy, Debug)]
struct Entry {
    handle: ReactionHandle,
    tau: Time,
    seq: u64,
}

impl Entry {
    fn key(&self) -> (Time, u64) {
        (self.tau, self.seq)
    }
}

/// Indexed min-heap over scheduled reactions.
#[derive(Debug, Default)]
pub struct Scheduler {
    heap: Vec<Entry>,
    positions: IndexMap<ReactionHandle, usize>,
    next_seq: u64,
}

impl Scheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self {
            heap: Vec::new(),
            positions: IndexMap::new(),
            next_seq: 0,
        }
    }

    /// Insert an entry for `handle` keyed at `tau`. O(log n).
    ///
    /// # Errors
    ///
    /// [`SchedulerError::AlreadyScheduled`] if `handle` already has an
    /// entry.
    pub fn add(&mut self, handle: ReactionHandle, tau: Time) -> Result<(), SchedulerError> {
        if self.positions.contains_key(&handle) {
            return Err(SchedulerError::AlreadyScheduled { handle });
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        let idx = self.heap.len();
        self.heap.push(Entry { handle, tau, seq });
        self.positions.insert(handle, idx);
        self.sift_up(idx);
        Ok(())
    }

    /// Remove `handle`'s entry. O(log n).
    ///
    /// Returns `false` (a defensive no-op) if the handle has no entry,
    /// so idempotent teardown paths never error.
    pub fn remove(&mut self, handle: ReactionHandle) -> bool {
        let Some(idx) = self.positions.swap_remove(&handle) else {
            return false;
        };
        let last = self.heap.len() - 1;
        if idx == last {
            self.heap.pop();
            return true;
        }
        self.heap.swap(idx, last);
        self.heap.pop();
        self.place(idx);
        let idx = self.sift_up(idx);
        self.sift_down(idx);
        true
    }

    /// Re-key `handle`'s entry to `tau` after the reaction recomputed
    /// it. O(log n). The entry's insertion sequence is preserved.
    ///
    /// Returns `false` (a defensive no-op) if the handle has no entry.
    pub fn update(&mut self, handle: ReactionHandle, tau: Time) -> bool {
        let Some(&idx) = self.positions.get(&handle) else {
            return false;
        };
        self.heap[idx].tau = tau;
        let idx = self.sift_up(idx);
        self.sift_down(idx);
        true
    }

    /// The entry with the globally minimum `(tau, seq)` key. O(1).
    pub fn peek_next(&self) -> Option<(ReactionHandle, Time)> {
        self.heap.first().map(|e| (e.handle, e.tau))
    }

    /// The tau currently keyed for `handle`, if scheduled.
    pub fn tau_of(&self, handle: ReactionHandle) -> Option<Time> {
        self.positions.get(&handle).map(|&idx| self.heap[idx].tau)
    }

    /// Whether `handle` has an entry.
    pub fn contains(&self, handle: ReactionHandle) -> bool {
        self.positions.contains_key(&handle)
    }

    /// Number of scheduled entries.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether no entries are scheduled.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Record that `heap[idx]` lives at `idx`.
    fn place(&mut self, idx: usize) {
        let handle = self.heap[idx].handle;
        self.positions.insert(handle, idx);
    }

    /// Move `heap[idx]` toward the root until its parent's key is not
    /// larger. Returns the entry's final index.
    fn sift_up(&mut self, mut idx: usize) -> usize {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if self.heap[idx].key() >= self.heap[parent].key() {
                break;
            }
            self.heap.swap(idx, parent);
            self.place(idx);
            idx = parent;
        }
        self.place(idx);
        idx
    }

    /// Move `heap[idx]` toward the leaves until both children's keys
    /// are not smaller.
    fn sift_down(&mut self, mut idx: usize) {
        loop {
            let left = 2 * idx + 1;
            if left >= self.heap.len() {
                break;
            }
            let right = left + 1;
            let smallest = if right < self.heap.len()
                && self.heap[right].key() < self.heap[left].key()
            {
                right
            } else {
                left
            };
            if self.heap[idx].key() <= self.heap[smallest].key() {
                break;
            }
            self.heap.swap(idx, smallest);
            self.place(idx);
            idx = smallest;
        }
        self.place(idx);
    }

    /// Verify the heap property and the position index. Test-only.
    #[cfg(test)]
    fn check_invariants(&self) {
        assert_eq!(self.heap.len(), self.positions.len());
        for idx in 1..self.heap.len() {
            let parent = (idx - 1) / 2;
            assert!(
                self.heap[parent].key() <= self.heap[idx].key(),
                "heap property violated at index {idx}"
            );
        }
        for (handle, &idx) in &self.positions {
            assert_eq!(self.heap[idx].handle, *handle, "position index out of sync");
        }
    }
}
