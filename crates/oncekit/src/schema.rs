use oncekit_3d::camera::{CameraCalibration, CameraName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Content of `data/<seq_id>/<seq_id>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceFile {
    /// The frames of the sequence in file order.
    pub frames: Vec<FrameEntry>,
    /// Calibration of every camera, keyed by camera directory name.
    pub calib: BTreeMap<String, CameraCalibration>,
}

/// A frame as listed in the annotation file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameEntry {
    /// The frame id, usually the capture timestamp.
    pub frame_id: FrameId,
    /// `[qx, qy, qz, qw, tx, ty, tz]`, absent or null when not available.
    #[serde(default)]
    pub pose: Option<Vec<f64>>,
    /// Object annotations, only present for annotated splits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annos: Option<Annotations>,
}

/// A frame id written either as a string or as an integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrameId {
    /// `"1616100800400"`
    Text(String),
    /// `1616100800400`
    Number(i64),
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameId::Text(s) => f.write_str(s),
            FrameId::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Object annotations of a frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    /// The class name of each object.
    #[serde(default)]
    pub names: Vec<String>,
    /// `[x, y, z, dx, dy, dz, yaw]` of each object in the lidar frame.
    #[serde(default)]
    pub boxes_3d: Vec<[f64; 7]>,
    /// `[x1, y1, x2, y2]` per camera and object, a negative `x1` means not visible.
    #[serde(default)]
    pub boxes_2d: BTreeMap<CameraName, Vec<[f64; 4]>>,
}
