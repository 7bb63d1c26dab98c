//! Measurement - Ingestion output
//!
//! Distance readings as decoded from the driver's 4-byte records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Size of one measurement record in bytes
pub const RECORD_LEN: usize = 4;

/// A single distance measurement in millimetres
///
/// No range validation is applied: the driver is trusted to encode either a
/// valid distance or its own sentinel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Measurement(i32);

impl Measurement {
    pub const fn from_mm(range_mm: i32) -> Self {
        Self(range_mm)
    }

    /// Distance in millimetres
    pub const fn range_mm(self) -> i32 {
        self.0
    }
}

impl From<i32> for Measurement {
    fn from(range_mm: i32) -> Self {
        Self(range_mm)
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A measurement together with when it was taken
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeReading {
    /// 1-based position of this reading within the run
    pub seq: u64,

    /// Decoded distance
    pub measurement: Measurement,

    /// Wall-clock time the record was read
    pub read_at: DateTime<Utc>,
}

impl RangeReading {
    /// Create a reading stamped with the current time
    pub fn now(seq: u64, measurement: Measurement) -> Self {
        Self {
            seq,
            measurement,
            read_at: Utc::now(),
        }
    }

    pub fn range_mm(&self) -> i32 {
        self.measurement.range_mm()
    }
}

/// Byte order used to decode measurement records
///
/// The driver copies an in-kernel integer straight to user space, so its wire
/// order is the order of the machine the driver runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    /// Order of the machine running this process
    #[default]
    Native,
    Little,
    Big,
}

impl ByteOrder {
    /// Resolve `Native` to the concrete order of this target
    pub const fn resolve(self) -> Self {
        match self {
            Self::Native if cfg!(target_endian = "big") => Self::Big,
            Self::Native => Self::Little,
            other => other,
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Native => "native",
            Self::Little => "little",
            Self::Big => "big",
        };
        f.write_str(name)
    }
}
