use tokio::sync::mpsc::UnboundedSender;

use super::TrackingEvent;

/// Fire-and-forget delivery of tracking events.
///
/// Implementations must not block and must not call back into the scheduler
/// synchronously: events are sent while an objective's lock is held.
pub trait EventBus<E>: Send + Sync {
    fn send_event(&self, event: TrackingEvent<E>);
}

impl<E: Send> EventBus<E> for UnboundedSender<TrackingEvent<E>> {
    fn send_event(&self, event: TrackingEvent<E>) {
        if let Err(e) = self.send(event) {
            // Receiver gone; the next pass's diff is still authoritative
            tracing::trace!(label = %e.0.label, "Event receiver dropped, discarding event");
        }
    }
}
