//! ConsoleSink - prints one line per reading

use std::io::{self, Write};

use contracts::{ContractError, DataSink, RangeReading};
use tracing::instrument;

/// Render the human-readable line for a reading
pub fn format_line(reading: &RangeReading) -> String {
    format!("Measured range in mm: {}", reading.measurement)
}

/// Console sink writing to the process's stdout
pub type StdoutSink = ConsoleSink<io::Stdout>;

/// Sink that writes `Measured range in mm: <n>` lines
///
/// Each line is flushed as soon as it is written so that it is visible before
/// the poller goes to sleep.
pub struct ConsoleSink<W> {
    name: String,
    writer: W,
}

impl ConsoleSink<io::Stdout> {
    /// Console sink on stdout
    pub fn stdout(name: impl Into<String>) -> Self {
        Self::new(name, io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    /// Console sink on an arbitrary writer
    pub fn new(name: impl Into<String>, writer: W) -> Self {
        Self {
            name: name.into(),
            writer,
        }
    }

    /// Give back the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, reading: &RangeReading) -> io::Result<()> {
        writeln!(self.writer, "{}", format_line(reading))?;
        self.writer.flush()
    }
}

impl<W: Write + Send> DataSink for ConsoleSink<W> {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "console_sink_write",
        skip(self, reading),
        fields(sink = %self.name, seq = reading.seq)
    )]
    async fn write(&mut self, reading: &RangeReading) -> Result<(), ContractError> {
        self.write_line(reading)
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        self.writer
            .flush()
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        self.flush().await
    }
}
