//! Per-objective tracking state: tracked entities, slots, and the disallow-list

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;
use std::hash::Hash;

use hashbrown::{HashMap, HashSet};
use serde::Serialize;

/// One occupied tracking position within an objective (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Slot(u32);

impl Slot {
    pub const FIRST: Slot = Slot(1);

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why `try_track` refused an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Every slot is occupied
    AtCapacity,
    /// Entity is on the disallow-list
    Disallowed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOutcome {
    /// Newly tracked in this slot
    Tracked(Slot),
    /// Was already tracked; nothing changed
    AlreadyTracked(Slot),
    Rejected(RejectReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UntrackOutcome {
    /// Removed; the slot is free for reuse
    Released(Slot),
    NotTracked,
}

/// Bookkeeping for one objective.
///
/// Invariants:
/// - `tracked.len() <= capacity`
/// - slots in `tracked` are unique and all `<= capacity`
/// - released slots are handed out lowest-first before any fresh slot
#[derive(Debug, Clone)]
pub struct TrackingState<E> {
    capacity: u32,
    tracked: HashMap<E, Slot>,
    disallowed: HashSet<E>,
    /// Slots freed by `untrack`, smallest on top
    released: BinaryHeap<Reverse<Slot>>,
    /// Next never-issued slot number
    next_slot: u32,
}

impl<E: Copy + Eq + Hash> TrackingState<E> {
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            tracked: HashMap::new(),
            disallowed: HashSet::new(),
            released: BinaryHeap::new(),
            next_slot: Slot::FIRST.0,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    pub fn available_slots(&self) -> u32 {
        self.capacity.saturating_sub(self.tracked.len() as u32)
    }

    pub fn is_tracked(&self, entity: E) -> bool {
        self.tracked.contains_key(&entity)
    }

    pub fn slot_of(&self, entity: E) -> Option<Slot> {
        self.tracked.get(&entity).copied()
    }

    pub fn is_disallowed(&self, entity: E) -> bool {
        self.disallowed.contains(&entity)
    }

    pub fn disallowed_count(&self) -> usize {
        self.disallowed.len()
    }

    /// Tracked entities with their slots, in no particular order
    pub fn tracked(&self) -> impl Iterator<Item = (E, Slot)> + '_ {
        self.tracked.iter().map(|(e, s)| (*e, *s))
    }

    /// Start tracking `entity` in the lowest free slot.
    pub fn try_track(&mut self, entity: E) -> TrackOutcome {
        if self.disallowed.contains(&entity) {
            return TrackOutcome::Rejected(RejectReason::Disallowed);
        }
        if let Some(slot) = self.tracked.get(&entity) {
            return TrackOutcome::AlreadyTracked(*slot);
        }
        if self.tracked.len() >= self.capacity as usize {
            return TrackOutcome::Rejected(RejectReason::AtCapacity);
        }

        let slot = self.allocate_slot();
        self.tracked.insert(entity, slot);
        TrackOutcome::Tracked(slot)
    }

    /// Stop tracking `entity`, freeing its slot.
    pub fn untrack(&mut self, entity: E) -> UntrackOutcome {
        match self.tracked.remove(&entity) {
            Some(slot) => {
                self.released.push(Reverse(slot));
                UntrackOutcome::Released(slot)
            }
            None => UntrackOutcome::NotTracked,
        }
    }

    /// Permanently exclude `entity` (until `reset`).
    ///
    /// Returns the released slot if the entity was tracked; the caller owes
    /// the consumer a removal notification for it.
    pub fn disallow(&mut self, entity: E) -> Option<Slot> {
        let released = match self.untrack(entity) {
            UntrackOutcome::Released(slot) => Some(slot),
            UntrackOutcome::NotTracked => None,
        };
        self.disallowed.insert(entity);
        released
    }

    /// Forget everything: tracked entities, disallow-list, and slot pool.
    pub fn reset(&mut self) {
        self.tracked.clear();
        self.disallowed.clear();
        self.released.clear();
        self.next_slot = Slot::FIRST.0;
    }

    fn allocate_slot(&mut self) -> Slot {
        if let Some(Reverse(slot)) = self.released.pop() {
            return slot;
        }
        let slot = Slot(self.next_slot);
        self.next_slot += 1;
        slot
    }
}
