//! # Ingestion
//!
//! Range sensor ingestion module.
//!
//! Responsibilities:
//! - Open the sensor's character device once per poll and close it again
//! - Read exactly one 4-byte record and decode it as a signed distance
//! - Classify driver failures (busy, echo timeout, short read)
//! - Drive the poll loop and hand readings to a `DataSink`
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{CharDevice, PollerConfig, RangePoller, RangeReader};
//! use contracts::ByteOrder;
//!
//! let reader = RangeReader::new(CharDevice::new("/dev/hc-sr04"), ByteOrder::Native);
//! let poller = RangePoller::new(reader, PollerConfig::default());
//!
//! let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let stats = poller.run(&mut sink, shutdown_rx).await?;
//! ```
//!
//! ## Mock Testing
//!
//! ```ignore
//! use ingestion::MockRangeDevice;
//!
//! let device = MockRangeDevice::with_ranges([300, 301, 302]);
//! let stats = device.stats();
//! ```

mod decode;
mod device;
mod error;
mod mock;
mod poller;
mod reader;

// Re-exports
pub use contracts::{Measurement, RangeReading};
pub use decode::decode_record;
pub use device::{CharDevice, RangeDevice};
pub use error::{DecodeError, IngestionError, Result};
pub use mock::{MockDeviceStats, MockHandle, MockRangeDevice, MockResponse};
pub use poller::{PollStats, PollerConfig, RangePoller, StopReason, POLL_INTERVAL};
pub use reader::RangeReader;
