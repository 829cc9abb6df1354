//! Registry of per-objective tracking state

use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use markers_types::TrackingConfig;

use super::{Objective, ObjectiveSummary, Slot, TrackingState};

/// One objective and its lock-protected state
#[derive(Debug)]
pub struct ObjectiveTracker<E> {
    objective: Arc<Objective>,
    state: Mutex<TrackingState<E>>,
}

impl<E: Copy + Eq + Hash> ObjectiveTracker<E> {
    fn new(objective: Objective) -> Self {
        let state = TrackingState::new(objective.capacity());
        Self {
            objective: Arc::new(objective),
            state: Mutex::new(state),
        }
    }

    pub fn objective(&self) -> &Arc<Objective> {
        &self.objective
    }

    /// Exclusive access to this objective's state.
    ///
    /// A panic while holding the lock can't leave the state half-written
    /// (every mutation is a single map operation), so poisoning is ignored.
    pub fn lock(&self) -> MutexGuard<'_, TrackingState<E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Owns exactly one `TrackingState` per configured objective
#[derive(Debug)]
pub struct TrackingRegistry<E> {
    trackers: Vec<ObjectiveTracker<E>>,
}

impl<E: Copy + Eq + Hash> Default for TrackingRegistry<E> {
    fn default() -> Self {
        Self { trackers: Vec::new() }
    }
}

impl<E: Copy + Eq + Hash> TrackingRegistry<E> {
    pub fn new(objectives: impl IntoIterator<Item = Objective>) -> Self {
        Self {
            trackers: objectives.into_iter().map(ObjectiveTracker::new).collect(),
        }
    }

    pub fn from_config(config: &TrackingConfig) -> Self {
        Self::new(Objective::all_from_config(config))
    }

    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectiveTracker<E>> {
        self.trackers.iter()
    }

    pub fn get(&self, objective_id: &str) -> Option<&ObjectiveTracker<E>> {
        self.trackers.iter().find(|t| t.objective.id() == objective_id)
    }

    pub fn objectives(&self) -> Vec<ObjectiveSummary> {
        self.trackers.iter().map(|t| t.objective.summary()).collect()
    }

    /// Disallow `entity` for every objective.
    ///
    /// `on_release` runs while the objective's lock is still held, for each
    /// objective that was tracking the entity.
    pub fn disallow(&self, entity: E, mut on_release: impl FnMut(&Objective, Slot)) -> usize {
        let mut released = 0;
        for tracker in &self.trackers {
            let mut state = tracker.lock();
            if let Some(slot) = state.disallow(entity) {
                on_release(&tracker.objective, slot);
                released += 1;
            }
        }
        released
    }

    /// Clear every objective's state, keeping the objectives themselves
    pub fn reset(&self) {
        for tracker in &self.trackers {
            tracker.lock().reset();
        }
    }

    /// Total tracked entities across all objectives
    pub fn tracked_count(&self) -> usize {
        self.trackers.iter().map(|t| t.lock().len()).sum()
    }
}
