//! Measurement record decoding

use bytes::Buf;
use contracts::{ByteOrder, Measurement, RECORD_LEN};

use crate::error::DecodeError;

/// Decode one measurement record
///
/// The record must be exactly [`RECORD_LEN`] bytes. `ByteOrder::Native`
/// follows the byte order of the machine running this process.
pub fn decode_record(record: &[u8], order: ByteOrder) -> Result<Measurement, DecodeError> {
    if record.len() > RECORD_LEN {
        return Err(DecodeError::TrailingBytes {
            expected: RECORD_LEN,
            actual: record.len(),
        });
    }

    let mut buf = record;
    let value = match order {
        ByteOrder::Native => buf.try_get_i32_ne(),
        ByteOrder::Little => buf.try_get_i32_le(),
        ByteOrder::Big => buf.try_get_i32(),
    }
    .map_err(|e| DecodeError::Truncated {
        requested: e.requested,
        available: e.available,
    })?;

    Ok(Measurement::from_mm(value))
}
