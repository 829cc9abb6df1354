//! Translates slot changes into outbound events

use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use markers_types::ModEventNames;

use super::{EventBus, EventKind, TrackingEvent};
use crate::tracking::{Objective, Slot};

/// Builds TRACK/UNTRACK events and hands them to the bus.
///
/// Delivery is never awaited or retried: if the bus drops an event, the
/// tracking state stays authoritative and the next pass corrects the consumer.
pub struct NotificationEmitter<E> {
    bus: Arc<dyn EventBus<E>>,
    names: ModEventNames,
    sent: AtomicU64,
}

impl<E: Copy + Debug> NotificationEmitter<E> {
    pub fn new(bus: Arc<dyn EventBus<E>>, names: ModEventNames) -> Self {
        Self {
            bus,
            names,
            sent: AtomicU64::new(0),
        }
    }

    pub fn emit_track(&self, entity: E, objective: &Objective, slot: Slot) {
        tracing::debug!(
            objective = objective.id(),
            ?entity,
            %slot,
            "Telling consumer to track reference"
        );
        self.emit(EventKind::Track, entity, objective, slot);
    }

    pub fn emit_untrack(&self, entity: E, objective: &Objective, slot: Slot) {
        tracing::debug!(
            objective = objective.id(),
            ?entity,
            %slot,
            "Telling consumer to untrack reference"
        );
        self.emit(EventKind::Untrack, entity, objective, slot);
    }

    /// Number of events handed to the bus since creation
    pub fn sent_count(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    pub fn names(&self) -> &ModEventNames {
        &self.names
    }

    pub(crate) fn set_names(&mut self, names: ModEventNames) {
        self.names = names;
    }

    fn emit(&self, kind: EventKind, entity: E, objective: &Objective, slot: Slot) {
        let name = match kind {
            EventKind::Track => &self.names.start_tracking,
            EventKind::Untrack => &self.names.stop_tracking,
        };
        self.bus.send_event(TrackingEvent {
            kind,
            name: name.clone(),
            label: objective.slot_label(slot),
            payload: slot.get() as f32,
            objective: objective.id().to_string(),
            entity,
        });
        self.sent.fetch_add(1, Ordering::Relaxed);
    }
}
