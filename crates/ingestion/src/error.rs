//! Ingestion error types

use std::path::PathBuf;

use contracts::{ContractError, RECORD_LEN};
use thiserror::Error;

/// Record decoding error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Fewer bytes than one record
    #[error("truncated record: need {requested} bytes, got {available}")]
    Truncated { requested: usize, available: usize },

    /// More bytes than one record
    #[error("record has {actual} bytes, expected exactly {expected}")]
    TrailingBytes { expected: usize, actual: usize },
}

/// Ingestion error
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Device could not be opened
    #[error("failed to open {}: {source}", path.display())]
    DeviceOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Driver refused the read because the previous measurement was too recent
    #[error("device {} busy: measurement requested too soon", path.display())]
    DeviceBusy { path: PathBuf },

    /// Driver timed out waiting for the echo
    #[error("device {} not ready: echo timed out", path.display())]
    NotReady { path: PathBuf },

    /// Stream ended before a full record was read
    #[error("short read from {}: got {got} of {expected} bytes", path.display())]
    ShortRead {
        path: PathBuf,
        expected: usize,
        got: usize,
    },

    /// Any other read failure
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Record could not be decoded
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// A sink rejected a reading
    #[error("sink error: {0}")]
    Sink(#[from] ContractError),
}

impl IngestionError {
    pub(crate) fn short_read(path: impl Into<PathBuf>, got: usize) -> Self {
        Self::ShortRead {
            path: path.into(),
            expected: RECORD_LEN,
            got,
        }
    }

    /// Classify a failed read on an open handle
    pub(crate) fn from_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::ResourceBusy => Self::DeviceBusy { path },
            std::io::ErrorKind::WouldBlock => Self::NotReady { path },
            _ => Self::Read { path, source },
        }
    }

    /// Whether the driver is expected to succeed on a later poll
    ///
    /// EBUSY on open means another process holds the device, which is
    /// transient as well.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::DeviceBusy { .. } | Self::NotReady { .. } => true,
            Self::DeviceOpen { source, .. } => source.kind() == std::io::ErrorKind::ResourceBusy,
            _ => false,
        }
    }

    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DeviceOpen { .. } => "open",
            Self::DeviceBusy { .. } => "busy",
            Self::NotReady { .. } => "not_ready",
            Self::ShortRead { .. } => "short_read",
            Self::Read { .. } => "read",
            Self::Decode(_) => "decode",
            Self::Sink(_) => "sink",
        }
    }
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;
