use super::Component;
use crate::handlers::MetricsHandler;

/// Periodically collects metrics (e.g. from kubelets) and hands them to the
/// registered [`MetricsHandler`].
pub trait MetricsSource: Component {
    fn set_metrics_handler(&self, handler: MetricsHandler);
}
