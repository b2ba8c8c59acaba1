#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Multi-sweep accumulation into a common frame.
pub mod accumulate;

/// Camera names and per-camera calibration.
pub mod camera;

/// Linear algebra utilities.
pub mod linalg;

/// Lidar sweep container.
pub mod pointcloud;

/// Vehicle pose.
pub mod pose;

/// Projection of points and boxes into camera images.
pub mod projection;

/// 3D transforms algorithms.
pub mod transforms;
