//! Single-record reader
//!
//! One call to [`RangeReader::read_once`] is one poll: open, read exactly one
//! record, close, decode.

use std::io::ErrorKind;
use std::path::Path;

use contracts::{ByteOrder, Measurement, RECORD_LEN};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{instrument, trace};

use crate::decode::decode_record;
use crate::device::RangeDevice;
use crate::error::{IngestionError, Result};

/// Reads measurements from a [`RangeDevice`]
#[derive(Debug, Clone)]
pub struct RangeReader<D> {
    device: D,
    byte_order: ByteOrder,
}

impl<D: RangeDevice> RangeReader<D> {
    pub fn new(device: D, byte_order: ByteOrder) -> Self {
        Self { device, byte_order }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Take one measurement
    ///
    /// The handle is opened and dropped within this call, on success and on
    /// every error path alike.
    #[instrument(
        name = "range_reader_read_once",
        skip(self),
        fields(path = %self.device.path().display())
    )]
    pub async fn read_once(&self) -> Result<Measurement> {
        let record = {
            let mut handle =
                self.device
                    .open()
                    .await
                    .map_err(|source| IngestionError::DeviceOpen {
                        path: self.device.path().to_path_buf(),
                        source,
                    })?;
            read_record(&mut handle, self.device.path()).await?
        };

        let measurement = decode_record(&record, self.byte_order)?;
        trace!(range_mm = measurement.range_mm(), "record decoded");
        Ok(measurement)
    }
}

/// Read exactly one record, never asking the handle for more than what is missing
async fn read_record<R>(handle: &mut R, path: &Path) -> Result<[u8; RECORD_LEN]>
where
    R: AsyncRead + Unpin,
{
    let mut record = [0u8; RECORD_LEN];
    let mut filled = 0;

    while filled < RECORD_LEN {
        match handle.read(&mut record[filled..]).await {
            Ok(0) => return Err(IngestionError::short_read(path, filled)),
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(IngestionError::from_read(path, e)),
        }
    }

    Ok(record)
}
