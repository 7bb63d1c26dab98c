//! Pipeline orchestrator - wires device, poller and sinks together.

use anyhow::{Context, Result};
use contracts::{DataSink, RangerBlueprint};
use dispatcher::Dispatcher;
use ingestion::{CharDevice, PollerConfig, RangeDevice, RangePoller, RangeReader};
use tokio::sync::watch;
use tracing::{info, warn};

use super::PipelineStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The validated poller configuration
    pub blueprint: RangerBlueprint,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Poll the configured character device until shutdown, the reading limit, or an error
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> Result<PipelineStats> {
        let device = CharDevice::new(&self.config.blueprint.device.path);
        self.run_with_device(device, shutdown).await
    }

    /// Poll an arbitrary device; the configured path is ignored
    pub async fn run_with_device<D: RangeDevice>(
        self,
        device: D,
        shutdown: watch::Receiver<bool>,
    ) -> Result<PipelineStats> {
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Setup Dispatcher
        let sink_configs = blueprint.effective_sinks();
        if blueprint.sinks.is_empty() {
            info!("No sinks configured, printing to stdout");
        }
        let mut dispatcher =
            dispatcher::create_dispatcher(sink_configs).context("Failed to create dispatcher")?;
        info!(sinks = dispatcher.sink_count(), "Dispatcher ready");

        // Setup Poller
        info!(
            path = %device.path().display(),
            byte_order = %blueprint.device.byte_order,
            "Opening range device per poll"
        );
        let reader = RangeReader::new(device, blueprint.device.byte_order);
        let poller = RangePoller::new(reader, PollerConfig::from(&blueprint.poll));

        let outcome = poller.run(&mut dispatcher, shutdown).await;

        // Shutdown
        close_dispatcher(&mut dispatcher).await;

        let poll = outcome.context("Polling failed")?;
        Ok(PipelineStats {
            poll,
            sinks: dispatcher.metrics(),
        })
    }
}

async fn close_dispatcher(dispatcher: &mut Dispatcher) {
    if let Err(e) = dispatcher.close().await {
        warn!(error = %e, "Error while closing sinks");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ErrorPolicy, SinkConfig, SinkType};
    use ingestion::{MockRangeDevice, MockResponse, StopReason};
    use std::collections::HashMap;

    fn blueprint_with_file_sink(path: &std::path::Path) -> RangerBlueprint {
        let mut blueprint = RangerBlueprint::default();
        blueprint.sinks = vec![SinkConfig {
            name: "archive".to_string(),
            sink_type: SinkType::File,
            params: HashMap::from([("path".to_string(), path.display().to_string())]),
        }];
        blueprint
    }

    #[tokio::test]
    async fn test_pipeline_runs_to_limit() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("ranges.jsonl");
        let mut blueprint = blueprint_with_file_sink(&out);
        blueprint.poll.max_readings = 2;

        let (_tx, rx) = watch::channel(false);
        let pipeline = Pipeline::new(PipelineConfig {
            blueprint,
            metrics_port: None,
        });
        let stats = pipeline
            .run_with_device(MockRangeDevice::with_ranges([300, 310]), rx)
            .await
            .unwrap();

        assert_eq!(stats.readings(), 2);
        assert_eq!(stats.poll.stop_reason, StopReason::LimitReached);
        assert_eq!(stats.sinks[0].1.write_count, 2);
        assert_eq!(std::fs::read_to_string(&out).unwrap().lines().count(), 2);
    }

    #[tokio::test]
    async fn test_pipeline_propagates_abort() {
        let dir = tempfile::tempdir().unwrap();
        let mut blueprint = blueprint_with_file_sink(&dir.path().join("ranges.jsonl"));
        blueprint.poll.on_error = ErrorPolicy::Abort;

        let (_tx, rx) = watch::channel(false);
        let pipeline = Pipeline::new(PipelineConfig {
            blueprint,
            metrics_port: None,
        });
        let err = pipeline
            .run_with_device(MockRangeDevice::new([MockResponse::bytes([1, 2, 3])]), rx)
            .await
            .unwrap_err();

        assert!(format!("{err:#}").contains("short read"), "got: {err:#}");
    }
}
