//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Measurement Model
//! - One reading is a signed 32-bit distance in millimetres
//! - The driver encodes it as a bare 4-byte record with no framing or checksum
//! - Readings carry a 1-based sequence number and the UTC time they were read

mod blueprint;
mod error;
mod measurement;
mod sink;

pub use blueprint::*;
pub use error::*;
pub use measurement::*;
pub use sink::*;
