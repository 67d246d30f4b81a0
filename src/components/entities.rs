use super::Component;
use crate::handlers::{DeltasHandler, EntitiesResyncHandler};

/// Watches cluster objects and reports them as deltas and periodic resyncs.
///
/// Ordering of deltas relative to each other is this component's
/// responsibility; the agent forwards them as delivered.
pub trait EntitiesSource: Component {
    fn set_deltas_handler(&self, handler: DeltasHandler);
    fn set_entities_resync_handler(&self, handler: EntitiesResyncHandler);
}
