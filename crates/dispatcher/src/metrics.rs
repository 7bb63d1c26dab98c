//! Sink metrics for observability

/// Metrics for a single sink
#[derive(Debug, Default, Clone, Copy)]
pub struct SinkMetrics {
    write_count: u64,
    failure_count: u64,
}

impl SinkMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total write count
    pub fn write_count(&self) -> u64 {
        self.write_count
    }

    /// Get failure count
    pub fn failure_count(&self) -> u64 {
        self.failure_count
    }

    /// Record the outcome of one write
    pub fn record(&mut self, success: bool) {
        if success {
            self.write_count += 1;
        } else {
            self.failure_count += 1;
        }
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            write_count: self.write_count,
            failure_count: self.failure_count,
        }
    }
}

/// Snapshot of sink metrics (for reporting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub write_count: u64,
    pub failure_count: u64,
}
