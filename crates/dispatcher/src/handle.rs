//! SinkHandle - a configured sink together with its write accounting

use contracts::{ContractError, DataSink, RangeReading};
use observability::record_sink_write;
use tracing::{instrument, warn};

use crate::metrics::SinkMetrics;
use crate::sinks::{ConsoleSink, FileSink, LogSink, StdoutSink};

/// One of the built-in sinks
pub enum AnySink {
    Console(StdoutSink),
    Log(LogSink),
    File(FileSink),
}

impl From<StdoutSink> for AnySink {
    fn from(sink: ConsoleSink<std::io::Stdout>) -> Self {
        Self::Console(sink)
    }
}

impl From<LogSink> for AnySink {
    fn from(sink: LogSink) -> Self {
        Self::Log(sink)
    }
}

impl From<FileSink> for AnySink {
    fn from(sink: FileSink) -> Self {
        Self::File(sink)
    }
}

impl DataSink for AnySink {
    fn name(&self) -> &str {
        match self {
            Self::Console(s) => s.name(),
            Self::Log(s) => s.name(),
            Self::File(s) => s.name(),
        }
    }

    async fn write(&mut self, reading: &RangeReading) -> Result<(), ContractError> {
        match self {
            Self::Console(s) => s.write(reading).await,
            Self::Log(s) => s.write(reading).await,
            Self::File(s) => s.write(reading).await,
        }
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        match self {
            Self::Console(s) => s.flush().await,
            Self::Log(s) => s.flush().await,
            Self::File(s) => s.flush().await,
        }
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        match self {
            Self::Console(s) => s.close().await,
            Self::Log(s) => s.close().await,
            Self::File(s) => s.close().await,
        }
    }
}

/// Handle to a sink owned by the dispatcher
pub struct SinkHandle {
    sink: AnySink,
    metrics: SinkMetrics,
}

impl SinkHandle {
    pub fn new(sink: impl Into<AnySink>) -> Self {
        Self {
            sink: sink.into(),
            metrics: SinkMetrics::new(),
        }
    }

    /// Get sink name
    pub fn name(&self) -> &str {
        self.sink.name()
    }

    /// Get current metrics
    pub fn metrics(&self) -> &SinkMetrics {
        &self.metrics
    }

    /// Write a reading and account for the outcome
    #[instrument(name = "sink_handle_write", skip(self, reading), fields(sink = %self.name()))]
    pub async fn write(&mut self, reading: &RangeReading) -> Result<(), ContractError> {
        let result = self.sink.write(reading).await;
        let success = result.is_ok();

        self.metrics.record(success);
        record_sink_write(self.sink.name(), success);

        if let Err(ref e) = result {
            warn!(sink = %self.sink.name(), seq = reading.seq, error = %e, "Sink write failed");
        }
        result
    }

    pub async fn flush(&mut self) -> Result<(), ContractError> {
        self.sink.flush().await
    }

    pub async fn close(&mut self) -> Result<(), ContractError> {
        self.sink.close().await
    }
}
