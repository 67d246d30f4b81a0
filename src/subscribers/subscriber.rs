//! Observer contract for the agent's runtime events.
//!
//! A subscriber sees everything the agent publishes on its [`Bus`](crate::Bus)
//! during one [`Agent::start`](crate::Agent::start): state changes, scope
//! cancellations, the authorization outcome and every component that starts,
//! stops or fails. Delivery ends after the terminal `StateChanged(Stopped)`.
//!
//! [`SubscriberSet`](super::SubscriberSet) feeds each subscriber from its own
//! queue, so one that falls behind loses events (reported as
//! `SubscriberOverflow`) while the agent and the other subscribers carry on.

use async_trait::async_trait;

use crate::events::Event;

/// Queue depth a subscriber gets unless it asks for another.
const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Receives agent events in publication order.
///
/// [`LogWriter`](super::LogWriter) is the stock implementation. Others
/// typically forward failures to an alerting sink or count restarts.
///
/// A panic in `on_event` is caught and republished as `SubscriberPanicked`;
/// the subscriber keeps receiving later events.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event. Must not block the runtime thread.
    async fn on_event(&self, event: &Event);

    /// Label carried by `SubscriberOverflow` and `SubscriberPanicked`.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Events buffered before this subscriber starts dropping; at least 1.
    fn queue_capacity(&self) -> usize {
        DEFAULT_QUEUE_CAPACITY
    }
}
