//! Mock range device
//!
//! Replays a scripted sequence of poll outcomes and keeps count of how the
//! handles were used, so the poller can be exercised without the driver.

use std::collections::VecDeque;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Instant;

use tokio::io::{AsyncRead, ReadBuf};
use tracing::debug;

use crate::device::RangeDevice;

/// Outcome of one scripted poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    /// Open succeeds and the stream yields these bytes, then end-of-file
    Bytes(Vec<u8>),
    /// Open fails
    OpenError(ErrorKind),
    /// Open succeeds, the first read fails
    ReadError(ErrorKind),
}

impl MockResponse {
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(data.into())
    }

    /// A well-formed record in native byte order
    pub fn range(range_mm: i32) -> Self {
        Self::Bytes(range_mm.to_ne_bytes().to_vec())
    }
}

/// Handle usage accounting shared between a mock device and its handles
#[derive(Debug, Default)]
pub struct MockDeviceStats {
    open_attempts: AtomicUsize,
    opens: AtomicUsize,
    closes: AtomicUsize,
    open_now: AtomicUsize,
    max_open: AtomicUsize,
    bytes_read: AtomicUsize,
    open_times: Mutex<Vec<Instant>>,
}

impl MockDeviceStats {
    /// Calls to `open`, successful or not
    pub fn open_attempts(&self) -> usize {
        self.open_attempts.load(Ordering::SeqCst)
    }

    /// Handles handed out
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Handles dropped
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Handles currently alive
    pub fn open_now(&self) -> usize {
        self.open_now.load(Ordering::SeqCst)
    }

    /// Highest number of handles ever alive at once
    pub fn max_open(&self) -> usize {
        self.max_open.load(Ordering::SeqCst)
    }

    /// Bytes delivered across all handles
    pub fn bytes_read(&self) -> usize {
        self.bytes_read.load(Ordering::SeqCst)
    }

    /// Instants at which `open` was called
    pub fn open_times(&self) -> Vec<Instant> {
        lock(&self.open_times).clone()
    }

    fn handle_opened(&self) {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let now_open = self.open_now.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_open.fetch_max(now_open, Ordering::SeqCst);
    }

    fn handle_closed(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.open_now.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Scripted stand-in for the HC-SR04 character device
///
/// Once the script is exhausted every further open fails with `NotFound`.
#[derive(Debug)]
pub struct MockRangeDevice {
    path: PathBuf,
    script: Mutex<VecDeque<MockResponse>>,
    stats: Arc<MockDeviceStats>,
}

impl MockRangeDevice {
    pub fn new(script: impl IntoIterator<Item = MockResponse>) -> Self {
        Self {
            path: PathBuf::from("mock://hc-sr04"),
            script: Mutex::new(script.into_iter().collect()),
            stats: Arc::new(MockDeviceStats::default()),
        }
    }

    /// Device yielding the given distances in order, in native byte order
    pub fn with_ranges(ranges: impl IntoIterator<Item = i32>) -> Self {
        Self::new(ranges.into_iter().map(MockResponse::range))
    }

    /// Shared accounting, still readable after the device is moved into a reader
    pub fn stats(&self) -> Arc<MockDeviceStats> {
        Arc::clone(&self.stats)
    }

    /// Scripted responses not yet consumed
    pub fn remaining(&self) -> usize {
        lock(&self.script).len()
    }

    fn next_response(&self) -> Option<MockResponse> {
        lock(&self.script).pop_front()
    }
}

impl RangeDevice for MockRangeDevice {
    type Handle = MockHandle;

    fn path(&self) -> &Path {
        &self.path
    }

    async fn open(&self) -> io::Result<MockHandle> {
        self.stats.open_attempts.fetch_add(1, Ordering::SeqCst);
        lock(&self.stats.open_times).push(Instant::now());

        let (data, read_error) = match self.next_response() {
            Some(MockResponse::Bytes(data)) => (data, None),
            Some(MockResponse::ReadError(kind)) => (Vec::new(), Some(kind)),
            Some(MockResponse::OpenError(kind)) => return Err(io::Error::from(kind)),
            None => {
                debug!("mock script exhausted");
                return Err(io::Error::new(ErrorKind::NotFound, "mock script exhausted"));
            }
        };

        self.stats.handle_opened();
        Ok(MockHandle {
            data,
            pos: 0,
            read_error,
            stats: Arc::clone(&self.stats),
        })
    }
}

/// Read handle returned by [`MockRangeDevice`]
#[derive(Debug)]
pub struct MockHandle {
    data: Vec<u8>,
    pos: usize,
    read_error: Option<ErrorKind>,
    stats: Arc<MockDeviceStats>,
}

impl AsyncRead for MockHandle {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if let Some(kind) = this.read_error.take() {
            return Poll::Ready(Err(io::Error::from(kind)));
        }

        let remaining = &this.data[this.pos..];
        let n = remaining.len().min(buf.remaining());
        buf.put_slice(&remaining[..n]);
        this.pos += n;
        this.stats.bytes_read.fetch_add(n, Ordering::SeqCst);
        Poll::Ready(Ok(()))
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        self.stats.handle_closed();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_mock_replays_script_in_order() {
        let device = MockRangeDevice::with_ranges([10, 20]);
        assert_eq!(device.remaining(), 2);

        let mut buf = Vec::new();
        device.open().await.unwrap().read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, 10i32.to_ne_bytes());

        buf.clear();
        device.open().await.unwrap().read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, 20i32.to_ne_bytes());

        assert!(device.open().await.is_err());
        assert_eq!(device.stats().open_attempts(), 3);
    }

    #[tokio::test]
    async fn test_mock_tracks_open_handles() {
        let device = MockRangeDevice::with_ranges([1, 2]);
        let stats = device.stats();

        let first = device.open().await.unwrap();
        let second = device.open().await.unwrap();
        assert_eq!(stats.open_now(), 2);
        assert_eq!(stats.max_open(), 2);

        drop(first);
        drop(second);
        assert_eq!(stats.open_now(), 0);
        assert_eq!(stats.closes(), 2);
    }
}
