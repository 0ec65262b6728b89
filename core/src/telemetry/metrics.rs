use serde::Serialize;
use std::sync::{Arc, Mutex};

/// Shared counters for the live stream pipeline.
#[derive(Clone, Default)]
pub struct StreamMetrics {
    inner: Arc<Mutex<MetricsSnapshot>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub frames_applied: usize,
    pub status_messages: usize,
    pub malformed_lines: usize,
    pub stale_events: usize,
    pub degenerate_positions: usize,
    pub discarded_fragment_bytes: usize,
}

impl StreamMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn update(&self, apply: impl FnOnce(&mut MetricsSnapshot)) {
        if let Ok(mut metrics) = self.inner.lock() {
            apply(&mut metrics);
        }
    }

    pub fn record_frame(&self) {
        self.update(|m| m.frames_applied += 1);
    }

    pub fn record_status(&self) {
        self.update(|m| m.status_messages += 1);
    }

    pub fn record_malformed(&self) {
        self.update(|m| m.malformed_lines += 1);
    }

    pub fn record_stale(&self) {
        self.update(|m| m.stale_events += 1);
    }

    pub fn record_degenerate(&self, count: usize) {
        self.update(|m| m.degenerate_positions += count);
    }

    pub fn record_discarded_fragment(&self, bytes: usize) {
        self.update(|m| m.discarded_fragment_bytes += bytes);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }
}
