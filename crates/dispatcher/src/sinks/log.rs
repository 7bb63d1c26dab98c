//! LogSink - logs readings via tracing

use chrono::SecondsFormat;
use contracts::{ContractError, DataSink, RangeReading};
use tracing::{info, instrument};

/// Sink that emits each reading as a structured tracing event
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl DataSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, reading),
        fields(sink = %self.name, seq = reading.seq)
    )]
    async fn write(&mut self, reading: &RangeReading) -> Result<(), ContractError> {
        info!(
            sink = %self.name,
            seq = reading.seq,
            range_mm = reading.range_mm(),
            read_at = %reading.read_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            "Range reading"
        );
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Measurement;

    #[tokio::test]
    async fn test_log_sink_write() {
        let mut sink = LogSink::new("test_log");
        let reading = RangeReading::now(1, Measurement::from_mm(300));

        let result = sink.write(&reading).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_log_sink_name() {
        let sink = LogSink::new("my_logger");
        assert_eq!(sink.name(), "my_logger");
    }
}
