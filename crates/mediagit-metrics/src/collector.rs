//! Prometheus metrics collector for MediaGit
//!
//! Provides a custom Prometheus collector that gathers metrics from MediaGit operations.

use prometheus::{core::Collector, proto::MetricFamily};
use std::sync::Arc;
use tracing::debug;

use crate::MetricsRegistry;

/// Custom Prometheus collector for MediaGit operations
///
/// This collector wraps the MetricsRegistry and implements the Prometheus
/// Collector trait for integration with the Prometheus ecosystem.
pub struct MediaGitCollector {
    registry: Arc<MetricsRegistry>,
}

impl MediaGitCollector {
    /// Create a new collector wrapping the given metrics registry
    pub fn new(registry: MetricsRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Get reference to the underlying metrics registry
    pub fn registry(&self) -> &MetricsRegistry {
        &self.registry
    }
}

impl Collector for MediaGitCollector {
    fn desc(&self) -> Vec<&prometheus::core::Desc> {
        // Return descriptors for all metrics
        // This is called by Prometheus to understand what metrics are available
        vec![]
    }

    fn collect(&self) -> Vec<MetricFamily> {
        // Gather all metrics from the registry
        debug!("Collecting MediaGit metrics");

        let mut families = Vec::new();
        let gatherer = self.registry.registry();

        // Gather metrics from the Prometheus registry
        match gatherer.gather() {
            metrics => {
                families.extend(metrics);
            }
        }

        families
    }
}
