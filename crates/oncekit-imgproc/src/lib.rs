#![deny(missing_docs)]
//! Image undistortion, remapping and drawing for the oncekit pipeline

/// camera intrinsics and lens distortion module.
pub mod calibration;

/// utilities to draw on images.
pub mod draw;

/// Error types for the image processing module.
pub mod error;

/// utilities for interpolation.
pub mod interpolation;

/// module containing parallization utilities.
pub mod parallel;

/// image undistortion module.
pub mod undistort;

pub use crate::error::ImgprocError;
