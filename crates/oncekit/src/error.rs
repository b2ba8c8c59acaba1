use crate::split::Split;
use oncekit_3d::camera::CameraName;
use oncekit_3d::projection::ProjectionError;
use std::path::PathBuf;

/// An error type for the sequence catalog.
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    /// The sequence id is not listed in any split file.
    #[error("Sequence {seq_id} corresponds to no split")]
    UnresolvedSequence {
        /// the offending sequence id
        seq_id: String,
    },

    /// The annotation file of a sequence to load is missing.
    #[error("No annotation file for sequence {seq_id}: {}", path.display())]
    MissingAnnotationFile {
        /// the sequence id
        seq_id: String,
        /// the expected annotation file
        path: PathBuf,
    },

    /// The annotation file lacks the calibration of a camera.
    #[error("Sequence {seq_id} has no calibration for camera {camera}")]
    MissingCalibration {
        /// the sequence id
        seq_id: String,
        /// the camera without calibration
        camera: CameraName,
    },

    /// The sequence belongs to a split that was not requested when building the catalog.
    #[error("Sequence {seq_id} of split {split} is not loaded")]
    SequenceNotLoaded {
        /// the sequence id
        seq_id: String,
        /// the split the sequence resolves to
        split: Split,
    },

    /// The frame is not part of the sequence.
    #[error("Frame {frame_id} not found in sequence {seq_id}")]
    FrameNotFound {
        /// the sequence id
        seq_id: String,
        /// the missing frame id
        frame_id: String,
    },

    /// An unknown split name.
    #[error("Unknown split name {0:?}")]
    UnknownSplit(String),

    /// The annotation file is not valid JSON or does not follow the expected layout.
    #[error("Failed to parse the annotation file of sequence {seq_id}: {}. {source}", path.display())]
    InvalidAnnotationFile {
        /// the sequence id
        seq_id: String,
        /// the annotation file
        path: PathBuf,
        /// the parser error
        source: serde_json::Error,
    },

    /// The annotation file of a sequence exists but cannot be read.
    #[error("Failed to read the annotation file of sequence {seq_id}: {}. {source}", path.display())]
    AnnotationFileError {
        /// the sequence id
        seq_id: String,
        /// the annotation file
        path: PathBuf,
        /// the io error
        source: std::io::Error,
    },

    /// A split list file exists but cannot be read.
    #[error("Failed to read the split list {}. {source}", path.display())]
    SplitListError {
        /// the split list file
        path: PathBuf,
        /// the io error
        source: std::io::Error,
    },
}

/// An error type for the dataset facade.
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    /// Error from the sequence catalog.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Error reading an image or a lidar sweep.
    #[error(transparent)]
    Io(#[from] oncekit_io::IoError),

    /// The calibration of a camera cannot be used to project points.
    #[error("Cannot project into camera {camera} of sequence {seq_id} frame {frame_id}. {source}")]
    Projection {
        /// the sequence id
        seq_id: String,
        /// the frame id
        frame_id: String,
        /// the camera
        camera: CameraName,
        /// the projection error
        source: ProjectionError,
    },

    /// The image of a camera cannot be undistorted with its calibration.
    #[error("Cannot undistort camera {camera} of sequence {seq_id} frame {frame_id}. {source}")]
    Undistortion {
        /// the sequence id
        seq_id: String,
        /// the frame id
        frame_id: String,
        /// the camera
        camera: CameraName,
        /// the undistortion error
        source: oncekit_imgproc::ImgprocError,
    },
}
