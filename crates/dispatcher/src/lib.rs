//! # Dispatcher
//!
//! Reading distribution module.
//!
//! Responsibilities:
//! - Build sinks from configuration
//! - Fan each `RangeReading` out to every sink, in order, on the polling task
//! - Account for successful and failed writes per sink

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod sinks;

pub use contracts::{DataSink, RangeReading};
pub use dispatcher::{create_dispatcher, Dispatcher, DispatcherBuilder, DispatcherConfig};
pub use error::DispatcherError;
pub use handle::{AnySink, SinkHandle};
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{format_line, ConsoleSink, FileSink, FileSinkConfig, LogSink, StdoutSink};
