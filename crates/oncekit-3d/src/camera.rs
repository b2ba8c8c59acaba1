use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The cameras mounted on the data collection vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraName {
    /// front facing camera
    Cam01,
    /// second front facing camera
    Cam03,
    /// left backward camera
    Cam05,
    /// left forward camera
    Cam06,
    /// right forward camera
    Cam07,
    /// right backward camera
    Cam08,
    /// rear camera
    Cam09,
}

/// Camera directory names in the fixed camera order.
pub const CAMERA_NAMES: [&str; 7] = [
    "cam01", "cam03", "cam05", "cam06", "cam07", "cam08", "cam09",
];

/// Display tags, index `i` belongs to `CAMERA_NAMES[i]`.
pub const CAMERA_TAGS: [&str; 7] = [
    "top",
    "top2",
    "left_back",
    "left_front",
    "right_front",
    "right_back",
    "back",
];

/// Error returned when parsing an unknown camera name.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown camera name {0:?}")]
pub struct UnknownCameraName(pub String);

impl CameraName {
    /// Every camera in the fixed camera order.
    pub const ALL: [CameraName; 7] = [
        CameraName::Cam01,
        CameraName::Cam03,
        CameraName::Cam05,
        CameraName::Cam06,
        CameraName::Cam07,
        CameraName::Cam08,
        CameraName::Cam09,
    ];

    /// Position of the camera in the fixed camera order.
    pub fn index(&self) -> usize {
        match self {
            CameraName::Cam01 => 0,
            CameraName::Cam03 => 1,
            CameraName::Cam05 => 2,
            CameraName::Cam06 => 3,
            CameraName::Cam07 => 4,
            CameraName::Cam08 => 5,
            CameraName::Cam09 => 6,
        }
    }

    /// The on-disk directory name, e.g. `cam01`.
    pub fn as_str(&self) -> &'static str {
        CAMERA_NAMES[self.index()]
    }

    /// The human readable tag, e.g. `top`.
    pub fn tag(&self) -> &'static str {
        CAMERA_TAGS[self.index()]
    }

    /// Look up a camera by its display tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        CAMERA_TAGS
            .iter()
            .position(|t| *t == tag)
            .map(|i| Self::ALL[i])
    }
}

impl fmt::Display for CameraName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CameraName {
    type Err = UnknownCameraName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CAMERA_NAMES
            .iter()
            .position(|name| *name == s)
            .map(|i| Self::ALL[i])
            .ok_or_else(|| UnknownCameraName(s.to_string()))
    }
}

/// Calibration of a single camera as stored in the sequence annotation file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraCalibration {
    /// Row-major homogeneous transform from the camera frame to the lidar frame.
    pub cam_to_velo: [[f64; 4]; 4],
    /// Row-major 3x3 pinhole camera matrix.
    pub cam_intrinsic: [[f64; 3]; 3],
    /// OpenCV ordered distortion coefficients, 5 or 8 values.
    pub distortion: Vec<f64>,
}
