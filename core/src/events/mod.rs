pub mod bus;
pub mod emitter;
pub mod signal;

pub use bus::EventBus;
pub use emitter::NotificationEmitter;
pub use signal::{EventKind, TrackingEvent};
