use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;

/// Global runtime metrics for the collector.
///
/// Purpose:
/// - Track raw inbound traffic on the subscribed topic
/// - Track how many payloads were accepted or rejected
/// - Track transport-level churn (subscriptions, disconnects)
///
/// Design:
/// - Lock-free (Atomics)
/// - Safe in async + multithreaded contexts
#[derive(Default)]
pub struct RuntimeMetrics {
    // Throughput
    pub messages_received: AtomicUsize,
    pub readings_accepted: AtomicUsize,
    pub messages_rejected: AtomicUsize,

    // Transport
    pub subscriptions_sent: AtomicUsize,
    pub unexpected_disconnects: AtomicUsize,
}

impl RuntimeMetrics {
    /// One-line summary in the same shape as the periodic metrics line.
    pub fn line(&self) -> String {
        format!(
            "[METRICS] recv={} accepted={} rejected={} subs={} disconnects={}",
            self.messages_received.load(Ordering::Relaxed),
            self.readings_accepted.load(Ordering::Relaxed),
            self.messages_rejected.load(Ordering::Relaxed),
            self.subscriptions_sent.load(Ordering::Relaxed),
            self.unexpected_disconnects.load(Ordering::Relaxed),
        )
    }
}

/// Global metrics registry (singleton)
pub static METRICS: Lazy<Arc<RuntimeMetrics>> =
    Lazy::new(|| Arc::new(RuntimeMetrics::default()));
