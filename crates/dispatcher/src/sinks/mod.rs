//! Sink implementations
//!
//! Contains ConsoleSink, LogSink, and FileSink.

mod console;
mod file;
mod log;

pub use self::console::{format_line, ConsoleSink, StdoutSink};
pub use self::file::{FileSink, FileSinkConfig};
pub use self::log::LogSink;
