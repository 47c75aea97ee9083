//! Handle-indexed reaction storage.
//!
//! [`ReactionArena`] owns every reaction in a simulation behind stable
//! [`ReactionHandle`]s. The dependency graph and the scheduler store
//! handles rather than references, which keeps the (cyclic) dependency
//! structure free of ownership cycles and makes removal O(edges).
//!
//! Handles are generation-checked: removing a reaction bumps its
//! slot's generation, so a handle held across a removal resolves to
//! `None` instead of aliasing whatever reaction reuses the slot.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

use skein_core::{Reaction, ReactionHandle};

/// One storage slot: the generation counts how many times the slot has
/// been vacated.
struct Slot {
    generation: u32,
    entry: Option<Box<dyn Reaction>>,
}

/// Slab arena over boxed reactions with generation-checked handles.
///
/// All lookups are O(1). Freed slots are recycled through a free list;
/// a recycled slot mints handles of a newer generation, so stale
/// handles never resolve.
#[derive(Default)]
pub struct ReactionArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl ReactionArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Store a reaction and mint its handle.
    pub fn insert(&mut self, reaction: Box<dyn Reaction>) -> ReactionHandle {
        self.live += 1;
        if let Some(slot_idx) = self.free.pop() {
            let slot = &mut self.slots[slot_idx as usize];
            slot.entry = Some(reaction);
            return ReactionHandle::from_parts(slot_idx, slot.generation);
        }
        let slot_idx = u32::try_from(self.slots.len()).expect("arena slot count exceeds u32");
        self.slots.push(Slot {
            generation: 0,
            entry: Some(reaction),
        });
        ReactionHandle::from_parts(slot_idx, 0)
    }

    /// Take a reaction out of the arena, invalidating its handle.
    ///
    /// Returns `None` (a defensive no-op) if the handle is stale or was
    /// already removed.
    pub fn remove(&mut self, handle: ReactionHandle) -> Option<Box<dyn Reaction>> {
        let slot = self.slots.get_mut(handle.slot() as usize)?;
        if slot.generation != handle.generation() || slot.entry.is_none() {
            return None;
        }
        let reaction = slot.entry.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.slot());
        self.live -= 1;
        reaction
    }

    /// Borrow the reaction behind `handle`, if it is still live.
    pub fn get(&self, handle: ReactionHandle) -> Option<&dyn Reaction> {
        let slot = self.slots.get(handle.slot() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.entry.as_deref()
    }

    /// Mutably borrow the reaction behind `handle`, if it is still live.
    pub fn get_mut(&mut self, handle: ReactionHandle) -> Option<&mut (dyn Reaction + 'static)> {
        let slot = self.slots.get_mut(handle.slot() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.entry.as_deref_mut()
    }

    /// Whether `handle` still points at a live reaction.
    pub fn contains(&self, handle: ReactionHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Number of live reactions.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether the arena holds no live reactions.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterate over live handles in slot order (stable across calls
    /// while the arena is unmodified).
    pub fn handles(&self) -> impl Iterator<Item = ReactionHandle> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.entry
                .as_ref()
                .map(|_| ReactionHandle::from_parts(i as u32, slot.generation))
        })
    }

    /// Iterate over live `(handle, reaction)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ReactionHandle, &dyn Reaction)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.entry
                .as_deref()
                .map(|r| (ReactionHandle::from_parts(i as u32, slot.generation), r))
        })
    }
}

impl std::fmt::Debug for ReactionArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactionArena")
            .field("live", &self.live)
            .field("slots", &self.slots.len())
            .field("free", &self.free.len())
            .finish()
    }
}
