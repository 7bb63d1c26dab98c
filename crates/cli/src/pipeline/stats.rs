//! Pipeline statistics and metrics.

use std::time::Duration;

use dispatcher::MetricsSnapshot;
use ingestion::{PollStats, StopReason};

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Poll loop statistics
    pub poll: PollStats,

    /// Per-sink write counts
    pub sinks: Vec<(String, MetricsSnapshot)>,
}

impl PipelineStats {
    pub fn readings(&self) -> u64 {
        self.poll.readings
    }

    pub fn duration(&self) -> Duration {
        self.poll.duration
    }

    /// Print detailed summary
    ///
    /// Goes to stderr: stdout carries nothing but measurement lines.
    pub fn print_summary(&self) {
        eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
        eprintln!("║                    Polling Statistics                        ║");
        eprintln!("╚══════════════════════════════════════════════════════════════╝\n");

        let stop_reason = match self.poll.stop_reason {
            StopReason::Shutdown => "shutdown requested",
            StopReason::LimitReached => "reading limit reached",
        };

        eprintln!("📊 Overview");
        eprintln!("   ├─ Duration: {:.2}s", self.poll.duration.as_secs_f64());
        eprintln!("   ├─ Readings: {}", self.poll.readings);
        eprintln!("   ├─ Skipped polls: {}", self.poll.skipped);
        eprintln!("   ├─ Rate: {:.2} Hz", self.poll.rate_hz());
        eprintln!("   └─ Stopped: {}", stop_reason);

        let summary = self.poll.range_stats.summary();

        eprintln!("\n📏 Ranges");
        eprintln!("   ├─ Range (mm): {}", summary.range_mm);
        eprintln!("   └─ Read latency (ms): {}", summary.latency_ms);

        if !summary.error_counts.is_empty() {
            eprintln!("\n⚠️  Failed Polls ({:.2}%)", summary.error_rate);
            for (kind, count) in &summary.error_counts {
                eprintln!("   ├─ {}: {}", kind, count);
            }
        }

        if !self.sinks.is_empty() {
            eprintln!("\n📤 Sinks");
            for (i, (name, snapshot)) in self.sinks.iter().enumerate() {
                let prefix = if i == self.sinks.len() - 1 { "└─" } else { "├─" };
                eprintln!(
                    "   {} {}: {} written, {} failed",
                    prefix, name, snapshot.write_count, snapshot.failure_count
                );
            }
        }

        eprintln!();
    }
}
