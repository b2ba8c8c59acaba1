#![deny(missing_docs)]
//! Owned image container used by the oncekit geometry pipeline

/// image representation for computer vision purposes.
pub mod image;

/// Error types for the image module.
pub mod error;

/// Pixel type conversions between images.
pub mod ops;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
