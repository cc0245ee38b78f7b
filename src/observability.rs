//! Metrics hooks for repository operations.
//!
//! Implement [`ListMetrics`] to feed your monitoring system; the default
//! methods log through the `log` crate, and [`NoOpMetrics`] silences them
//! entirely. Wire a custom implementation with
//! [`ListRepository::with_metrics`](crate::ListRepository::with_metrics).

use std::time::Duration;

/// Trait for repository metrics collection.
pub trait ListMetrics: Send + Sync {
    /// Record a successful read (collection or element found).
    fn record_hit(&self, key: &str, duration: Duration) {
        debug!("List HIT: {} took {:?}", key, duration);
    }

    /// Record a read that found nothing (missing or expired).
    fn record_miss(&self, key: &str, duration: Duration) {
        debug!("List MISS: {} took {:?}", key, duration);
    }

    /// Record a mutating operation (create, push, update, ttl change).
    fn record_write(&self, key: &str, duration: Duration) {
        debug!("List WRITE: {} took {:?}", key, duration);
    }

    /// Record a delete operation (element, collection or flush).
    fn record_delete(&self, key: &str, duration: Duration) {
        debug!("List DELETE: {} took {:?}", key, duration);
    }

    /// Record a failed operation.
    fn record_error(&self, key: &str, error: &str) {
        warn!("List ERROR for {}: {}", key, error);
    }
}

/// Default metrics implementation (no-op).
#[derive(Clone, Default)]
pub struct NoOpMetrics;

impl ListMetrics for NoOpMetrics {
    fn record_hit(&self, _key: &str, _duration: Duration) {}
    fn record_miss(&self, _key: &str, _duration: Duration) {}
    fn record_write(&self, _key: &str, _duration: Duration) {}
    fn record_delete(&self, _key: &str, _duration: Duration) {}
    fn record_error(&self, _key: &str, _error: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_metrics() {
        let metrics = NoOpMetrics;
        metrics.record_hit("key", Duration::from_secs(1));
        metrics.record_miss("key", Duration::from_secs(2));
        metrics.record_error("key", "boom");
    }

    #[test]
    fn test_default_methods_log_only() {
        struct LoggingMetrics;
        impl ListMetrics for LoggingMetrics {}

        let metrics = LoggingMetrics;
        metrics.record_write("key", Duration::from_millis(3));
        metrics.record_delete("key", Duration::from_millis(3));
    }
}
