//! Dispatcher - sequential fan-out of readings to sinks

use tracing::{debug, info, instrument, warn};

use contracts::{ContractError, DataSink, RangeReading, SinkConfig, SinkType};

use crate::error::DispatcherError;
use crate::handle::SinkHandle;
use crate::metrics::MetricsSnapshot;
use crate::sinks::{ConsoleSink, FileSink, LogSink};

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Sink configurations
    pub sinks: Vec<SinkConfig>,
}

/// Builder for creating a Dispatcher
pub struct DispatcherBuilder {
    config: DispatcherConfig,
}

impl DispatcherBuilder {
    /// Create a new DispatcherBuilder
    pub fn new(config: DispatcherConfig) -> Self {
        Self { config }
    }

    /// Build the dispatcher, opening every configured sink
    #[instrument(
        name = "dispatcher_builder_build",
        skip(self),
        fields(sink_count = self.config.sinks.len())
    )]
    pub fn build(self) -> Result<Dispatcher, DispatcherError> {
        let handles = self
            .config
            .sinks
            .iter()
            .map(create_sink_handle)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Dispatcher::with_handles(handles))
    }
}

/// Create a SinkHandle from configuration
#[instrument(
    name = "dispatcher_create_sink_handle",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
fn create_sink_handle(config: &SinkConfig) -> Result<SinkHandle, DispatcherError> {
    match config.sink_type {
        SinkType::Console => Ok(SinkHandle::new(ConsoleSink::stdout(&config.name))),
        SinkType::Log => Ok(SinkHandle::new(LogSink::new(&config.name))),
        SinkType::File => {
            let sink = FileSink::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            Ok(SinkHandle::new(sink))
        }
    }
}

/// Fans every reading out to all sinks, in configuration order
///
/// Writes happen on the caller's task and complete before `write` returns.
/// The first failing sink aborts the write; later sinks do not see the reading.
pub struct Dispatcher {
    handles: Vec<SinkHandle>,
    dispatched: u64,
}

impl Dispatcher {
    /// Create a dispatcher with custom sink handles (for testing)
    pub fn with_handles(handles: Vec<SinkHandle>) -> Self {
        Self {
            handles,
            dispatched: 0,
        }
    }

    /// Number of sinks
    pub fn sink_count(&self) -> usize {
        self.handles.len()
    }

    /// Readings dispatched so far
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Get metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }
}

impl DataSink for Dispatcher {
    fn name(&self) -> &str {
        "dispatcher"
    }

    async fn write(&mut self, reading: &RangeReading) -> Result<(), ContractError> {
        for handle in &mut self.handles {
            handle.write(reading).await?;
        }

        self.dispatched += 1;
        if self.dispatched.is_multiple_of(100) {
            debug!(readings = self.dispatched, "Dispatcher progress");
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        for handle in &mut self.handles {
            handle.flush().await?;
        }
        Ok(())
    }

    /// Close every sink, reporting the first failure after trying them all
    async fn close(&mut self) -> Result<(), ContractError> {
        let mut first_error = None;
        for handle in &mut self.handles {
            if let Err(e) = handle.close().await {
                warn!(sink = %handle.name(), error = %e, "Failed to close sink");
                first_error.get_or_insert(e);
            }
        }

        info!(readings = self.dispatched, "Dispatcher shutdown complete");
        first_error.map_or(Ok(()), Err)
    }
}

/// Convenience function to create a dispatcher from sink configs
#[instrument(name = "dispatcher_create", skip(sink_configs))]
pub fn create_dispatcher(sink_configs: Vec<SinkConfig>) -> Result<Dispatcher, DispatcherError> {
    let config = DispatcherConfig {
        sinks: sink_configs,
    };
    DispatcherBuilder::new(config).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Measurement;
    use std::collections::HashMap;

    fn reading(seq: u64) -> RangeReading {
        RangeReading::now(seq, Measurement::from_mm(100 + seq as i32))
    }

    #[tokio::test]
    async fn test_dispatcher_fanout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranges.jsonl");
        let file = FileSink::from_params(
            "file",
            &HashMap::from([("path".to_string(), path.display().to_string())]),
        )
        .unwrap();

        let mut dispatcher =
            Dispatcher::with_handles(vec![SinkHandle::new(LogSink::new("log")), SinkHandle::new(file)]);

        for seq in 1..=5 {
            dispatcher.write(&reading(seq)).await.unwrap();
        }
        dispatcher.close().await.unwrap();

        assert_eq!(dispatcher.dispatched(), 5);
        for (_, snapshot) in dispatcher.metrics() {
            assert_eq!(snapshot.write_count, 5);
            assert_eq!(snapshot.failure_count, 0);
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 5);
    }

    #[test]
    fn test_create_dispatcher_from_config() {
        let configs = vec![
            SinkConfig::console(),
            SinkConfig {
                name: "test_log".to_string(),
                sink_type: SinkType::Log,
                params: HashMap::new(),
            },
        ];

        let dispatcher = create_dispatcher(configs).unwrap();
        assert_eq!(dispatcher.sink_count(), 2);
        assert_eq!(dispatcher.dispatched(), 0);

        let names: Vec<String> = dispatcher.metrics().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["console", "test_log"]);
    }

    #[test]
    fn test_file_sink_without_path_is_a_creation_error() {
        let configs = vec![SinkConfig {
            name: "archive".to_string(),
            sink_type: SinkType::File,
            params: HashMap::new(),
        }];

        let err = create_dispatcher(configs).err().unwrap();
        assert!(matches!(err, DispatcherError::SinkCreation { ref name, .. } if name == "archive"));
    }
}
