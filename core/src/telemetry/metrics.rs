use serde::Serialize;
use std::sync::Mutex;

pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

/// Counter snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub inspections: usize,
    pub responses_applied: usize,
    pub stale_dropped: usize,
    pub provider_failures: usize,
    pub exports: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    fn bump(&self, field: impl FnOnce(&mut Metrics) -> &mut usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            *field(&mut *metrics) += 1;
        }
    }

    pub fn record_inspection(&self) {
        self.bump(|m| &mut m.inspections);
    }

    pub fn record_applied(&self) {
        self.bump(|m| &mut m.responses_applied);
    }

    pub fn record_stale(&self) {
        self.bump(|m| &mut m.stale_dropped);
    }

    pub fn record_failure(&self) {
        self.bump(|m| &mut m.provider_failures);
    }

    pub fn record_export(&self) {
        self.bump(|m| &mut m.exports);
    }

    pub fn snapshot(&self) -> Metrics {
        self.inner.lock().map(|m| *m).unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
