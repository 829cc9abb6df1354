use serde::Serialize;

/// What the consumer should do with the slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Start tracking the entity in the labelled slot
    Track,
    /// Stop tracking; the slot is free again
    Untrack,
}

/// Outbound notification for the host's event bus.
/// One event per slot assignment change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingEvent<E> {
    pub kind: EventKind,
    /// Configured event name for `kind`
    pub name: String,
    /// Slot-scoped label (`<objective id>_<slot>`)
    pub label: String,
    /// Slot number as the host's numeric event argument
    pub payload: f32,
    pub objective: String,
    pub entity: E,
}
