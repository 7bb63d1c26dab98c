//! Range poller - the read/emit/sleep loop

use std::time::{Duration, Instant};

use contracts::{DataSink, ErrorPolicy, PollConfig, RangeReading};
use observability::{record_read_error, record_reading, RangeStatsAggregator};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::device::RangeDevice;
use crate::error::{IngestionError, Result};
use crate::reader::RangeReader;

/// Fixed delay between the end of one poll and the next device open
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Poller settings
#[derive(Debug, Clone, Copy, Default)]
pub struct PollerConfig {
    /// What to do when a poll fails
    pub on_error: ErrorPolicy,

    /// Stop after this many readings (None = unlimited)
    pub max_readings: Option<u64>,
}

impl From<&PollConfig> for PollerConfig {
    fn from(config: &PollConfig) -> Self {
        Self {
            on_error: config.on_error,
            max_readings: config.reading_limit(),
        }
    }
}

/// Why the poll loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopReason {
    /// Shutdown was requested
    #[default]
    Shutdown,
    /// The configured number of readings was reached
    LimitReached,
}

/// Statistics from a poll run
#[derive(Debug, Clone, Default)]
pub struct PollStats {
    /// Readings emitted to the sink
    pub readings: u64,

    /// Polls that failed and were skipped
    pub skipped: u64,

    /// Why the loop ended
    pub stop_reason: StopReason,

    /// Total duration of the run
    pub duration: Duration,

    /// Aggregated ranges, latencies and error kinds
    pub range_stats: RangeStatsAggregator,
}

impl PollStats {
    /// Readings per second
    pub fn rate_hz(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.readings as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Polls a [`RangeDevice`] and feeds every reading to a sink
///
/// Strictly sequential: open, read, close, emit, sleep. Only one handle is
/// ever open and the sink has finished with a reading before the sleep starts.
pub struct RangePoller<D> {
    reader: RangeReader<D>,
    config: PollerConfig,
}

impl<D: RangeDevice> RangePoller<D> {
    pub fn new(reader: RangeReader<D>, config: PollerConfig) -> Self {
        Self { reader, config }
    }

    /// Run until shutdown, the reading limit, or an aborting error
    ///
    /// Shutdown is signalled by sending `true` on the watch channel. A dropped
    /// sender is treated as "never shut down".
    ///
    /// The sink is flushed before returning, but not closed.
    #[instrument(
        name = "range_poller_run",
        skip_all,
        fields(path = %self.reader.device().path().display())
    )]
    pub async fn run<S: DataSink>(
        &self,
        sink: &mut S,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<PollStats> {
        let started = Instant::now();
        let mut stats = PollStats::default();

        info!(
            byte_order = %self.reader.byte_order(),
            on_error = ?self.config.on_error,
            max_readings = ?self.config.max_readings,
            "Polling started"
        );

        let outcome = self.poll_loop(sink, &mut shutdown, &mut stats).await;
        stats.duration = started.elapsed();

        match outcome {
            Ok(()) => {
                sink.flush().await?;
                info!(
                    readings = stats.readings,
                    skipped = stats.skipped,
                    stop_reason = ?stats.stop_reason,
                    "Polling stopped"
                );
                Ok(stats)
            }
            Err(e) => {
                if let Err(flush_err) = sink.flush().await {
                    warn!(error = %flush_err, "Failed to flush sink after poll error");
                }
                Err(e)
            }
        }
    }

    async fn poll_loop<S: DataSink>(
        &self,
        sink: &mut S,
        shutdown: &mut watch::Receiver<bool>,
        stats: &mut PollStats,
    ) -> Result<()> {
        loop {
            if *shutdown.borrow() {
                stats.stop_reason = StopReason::Shutdown;
                return Ok(());
            }

            let poll_started = Instant::now();
            match self.reader.read_once().await {
                Ok(measurement) => {
                    let latency_ms = poll_started.elapsed().as_secs_f64() * 1000.0;
                    stats.readings += 1;
                    let reading = RangeReading::now(stats.readings, measurement);

                    record_reading(reading.range_mm(), latency_ms);
                    stats
                        .range_stats
                        .update_reading(reading.range_mm(), latency_ms);
                    debug!(seq = reading.seq, range_mm = reading.range_mm(), "Reading taken");

                    sink.write(&reading).await?;
                }
                Err(e) => self.handle_poll_error(e, stats)?,
            }

            if self
                .config
                .max_readings
                .is_some_and(|max| stats.readings >= max)
            {
                info!(readings = stats.readings, "Reached reading limit");
                stats.stop_reason = StopReason::LimitReached;
                return Ok(());
            }

            tokio::select! {
                _ = tokio::time::sleep(POLL_INTERVAL) => {}
                _ = shutdown_requested(shutdown) => {
                    stats.stop_reason = StopReason::Shutdown;
                    return Ok(());
                }
            }
        }
    }

    fn handle_poll_error(&self, error: IngestionError, stats: &mut PollStats) -> Result<()> {
        record_read_error(error.kind());
        stats.range_stats.update_error(error.kind());

        match self.config.on_error {
            ErrorPolicy::Abort => Err(error),
            ErrorPolicy::Skip => {
                stats.skipped += 1;
                warn!(
                    error = %error,
                    kind = error.kind(),
                    transient = error.is_transient(),
                    "Poll failed, skipping"
                );
                Ok(())
            }
        }
    }
}

async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
