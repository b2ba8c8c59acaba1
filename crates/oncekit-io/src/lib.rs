#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the io module.
pub mod error;

/// JPEG image encoding and decoding.
pub mod jpeg;

/// Raw lidar sweep files.
pub mod lidar;

pub use crate::error::IoError;
