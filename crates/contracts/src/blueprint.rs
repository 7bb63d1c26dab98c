//! RangerBlueprint - Config Loader output
//!
//! Describes the complete poller setup: which device to read, how to decode
//! it, what to do on failed reads and where readings go.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::ByteOrder;

/// Path the HC-SR04 driver registers its character device under
pub const DEFAULT_DEVICE_PATH: &str = "/dev/hc-sr04";

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete poller configuration
///
/// Every section is optional; an empty document yields the defaults, which
/// poll `/dev/hc-sr04` in native byte order and print to stdout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RangerBlueprint {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Device settings
    #[serde(default)]
    pub device: DeviceConfig,

    /// Poll loop settings
    #[serde(default)]
    pub poll: PollConfig,

    /// Output routing
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

impl RangerBlueprint {
    /// Sinks to build, falling back to a single console sink when none are configured
    pub fn effective_sinks(&self) -> Vec<SinkConfig> {
        if self.sinks.is_empty() {
            vec![SinkConfig::console()]
        } else {
            self.sinks.clone()
        }
    }
}

/// Device settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Character device path
    #[serde(default = "default_device_path")]
    pub path: PathBuf,

    /// Record byte order
    #[serde(default)]
    pub byte_order: ByteOrder,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            path: default_device_path(),
            byte_order: ByteOrder::default(),
        }
    }
}

fn default_device_path() -> PathBuf {
    PathBuf::from(DEFAULT_DEVICE_PATH)
}

/// Poll loop settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollConfig {
    /// What to do when an iteration fails
    #[serde(default)]
    pub on_error: ErrorPolicy,

    /// Stop after this many readings (0 = unlimited)
    #[serde(default)]
    pub max_readings: u64,
}

impl PollConfig {
    pub fn reading_limit(&self) -> Option<u64> {
        (self.max_readings > 0).then_some(self.max_readings)
    }
}

/// Failure policy for a single poll iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Stop polling on the first failed iteration
    #[default]
    Abort,
    /// Log the failure, print nothing and continue with the next poll
    Skip,
}

/// Sink config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name (used for logging/metrics)
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl SinkConfig {
    /// The default stdout sink
    pub fn console() -> Self {
        Self {
            name: "console".to_string(),
            sink_type: SinkType::Console,
            params: HashMap::new(),
        }
    }
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// `Measured range in mm: <n>` lines on stdout
    Console,
    /// Structured tracing events
    Log,
    /// JSON lines appended to a file
    File,
}
