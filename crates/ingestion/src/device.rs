//! Range device abstraction
//!
//! A device hands out one read handle per poll. Dropping the handle closes it,
//! so a handle never outlives the poll that opened it.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncRead;

/// Source of measurement records
///
/// Implemented by the real character device and by [`crate::MockRangeDevice`].
pub trait RangeDevice: Send + Sync {
    /// Read handle for a single poll
    type Handle: AsyncRead + Unpin + Send;

    /// Path the handle is opened from (used in errors and logs)
    fn path(&self) -> &Path;

    /// Open a fresh handle
    fn open(&self) -> impl Future<Output = io::Result<Self::Handle>> + Send;
}

/// The HC-SR04 character device
///
/// The driver admits a single opener at a time and triggers one hardware
/// measurement per read, returning 4 bytes and then end-of-file.
#[derive(Debug, Clone)]
pub struct CharDevice {
    path: PathBuf,
}

impl CharDevice {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RangeDevice for CharDevice {
    type Handle = File;

    fn path(&self) -> &Path {
        &self.path
    }

    async fn open(&self) -> io::Result<File> {
        OpenOptions::new().read(true).open(&self.path).await
    }
}
