pub mod events;
pub mod matching;
pub mod scan;
pub mod tracking;
pub mod world;

// Re-exports for convenience
pub use events::{EventBus, EventKind, NotificationEmitter, TrackingEvent};
pub use matching::{FormKind, MatchCriteria, ObjectiveMatcher};
pub use scan::{Clock, ManualClock, ScanOutcome, ScanReport, ScanScheduler, SystemClock};
pub use tracking::{
    ConfigError, Objective, ObjectiveSummary, Slot, TrackOutcome, TrackingRegistry, TrackingState,
    UntrackOutcome,
};
pub use world::{InventoryItem, World};
