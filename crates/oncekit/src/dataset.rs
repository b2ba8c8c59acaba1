use crate::catalog::{FrameRecord, SequenceCatalog};
use crate::error::{CatalogError, DatasetError};
use crate::overlay::{draw_boxes_2d, draw_boxes_3d, draw_points, visible_boxes_2d, OverlayStyle};
use crate::split::Split;
use oncekit_3d::accumulate::accumulate_sweeps;
use oncekit_3d::camera::{CameraCalibration, CameraName};
use oncekit_3d::pointcloud::LidarSweep;
use oncekit_3d::pose::Pose;
use oncekit_3d::projection::{CameraProjector, ProjectedBox, ProjectedPoint};
use oncekit_image::Image;
use oncekit_imgproc::calibration::{distortion::PolynomialDistortion, CameraIntrinsic};
use oncekit_imgproc::undistort::{
    undistort_image, undistort_image_optimal, UndistortOptions, Undistorted,
};
use oncekit_imgproc::ImgprocError;
use oncekit_io::{jpeg, lidar};
use rayon::prelude::*;
use std::path::Path;

/// Lidar points projected into the undistorted image of one camera.
#[derive(Debug, Clone)]
pub struct LidarOverlay {
    /// The camera.
    pub camera: CameraName,
    /// The undistorted image with the points drawn on it.
    pub image: Image<u8, 3>,
    /// The intrinsics of the undistorted image.
    pub intrinsic: CameraIntrinsic,
    /// The points in front of the camera.
    pub points: Vec<ProjectedPoint>,
    /// Number of points that could not be drawn.
    pub skipped: usize,
}

/// Annotated boxes projected into the undistorted image of one camera.
#[derive(Debug, Clone)]
pub struct BoxOverlay {
    /// The camera.
    pub camera: CameraName,
    /// The undistorted image with the boxes drawn on it.
    pub image: Image<u8, 3>,
    /// The intrinsics of the undistorted image.
    pub intrinsic: CameraIntrinsic,
    /// The 3D boxes entirely in front of the camera.
    pub boxes_3d: Vec<ProjectedBox>,
    /// The visible 2D boxes truncated to integers.
    pub boxes_2d: Vec<[i64; 4]>,
}

/// Why a sweep accumulation returned the start frame only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConcatFallback {
    /// The window runs past the last frame of the sequence.
    WindowPastEnd {
        /// index of the start frame
        start_index: usize,
        /// number of frames requested after the start frame
        concat_cnt: usize,
        /// number of frames in the sequence
        num_frames: usize,
    },
    /// A frame of the window has no usable pose.
    MissingPose {
        /// the frame without pose
        frame_id: String,
    },
}

/// Result of a sweep accumulation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcatResult {
    /// One sweep per frame of the window, relative to the start frame.
    ///
    /// On fallback, only the untransformed start sweep.
    pub sweeps: Vec<LidarSweep>,
    /// Set when the accumulation degraded to the start frame.
    pub fallback: Option<ConcatFallback>,
}

/// Entry point to the dataset: catalog queries, file loading and the geometric pipeline.
#[derive(Debug, Clone)]
pub struct OnceDataset {
    catalog: SequenceCatalog,
    undistort_options: UndistortOptions,
    overlay_style: OverlayStyle,
}

impl OnceDataset {
    /// Open the dataset, loading the catalog of the requested splits.
    pub fn new(root: impl AsRef<Path>, splits: &[Split]) -> Result<Self, DatasetError> {
        Ok(Self::from_catalog(SequenceCatalog::build(root, splits)?))
    }

    /// Wrap an already built catalog.
    pub fn from_catalog(catalog: SequenceCatalog) -> Self {
        Self {
            catalog,
            undistort_options: UndistortOptions::default(),
            overlay_style: OverlayStyle::default(),
        }
    }

    /// Set the undistortion options.
    pub fn with_undistort_options(mut self, options: UndistortOptions) -> Self {
        self.undistort_options = options;
        self
    }

    /// Set the overlay style.
    pub fn with_overlay_style(mut self, style: OverlayStyle) -> Self {
        self.overlay_style = style;
        self
    }

    /// The sequence catalog.
    pub fn catalog(&self) -> &SequenceCatalog {
        &self.catalog
    }

    /// Read the roof lidar sweep of a frame.
    pub fn load_point_cloud(&self, seq_id: &str, frame_id: &str) -> Result<LidarSweep, DatasetError> {
        Ok(lidar::read_lidar_sweep(
            self.catalog.lidar_path(seq_id, frame_id),
        )?)
    }

    /// Read the RGB image of a camera.
    pub fn load_image(
        &self,
        seq_id: &str,
        frame_id: &str,
        camera: CameraName,
    ) -> Result<Image<u8, 3>, DatasetError> {
        Ok(jpeg::read_image_jpeg_rgb8(
            self.catalog.image_path(seq_id, frame_id, camera),
        )?)
    }

    /// Undistort the images of every camera keeping their original intrinsics.
    ///
    /// The images are returned in the fixed camera order. Do not project with the
    /// calibration intrinsics onto these images, see [`Self::undistort_image_v2`].
    pub fn undistort_image(
        &self,
        seq_id: &str,
        frame_id: &str,
    ) -> Result<Vec<(CameraName, Image<u8, 3>)>, DatasetError> {
        let options = self.undistort_options;
        self.undistort_cameras(seq_id, frame_id, |image, intrinsic, distortion| {
            undistort_image(image, intrinsic, distortion, &options)
        })
    }

    /// Undistort the images of every camera into their optimal new intrinsics.
    ///
    /// Each image is paired with the intrinsics it must be projected with.
    pub fn undistort_image_v2(
        &self,
        seq_id: &str,
        frame_id: &str,
    ) -> Result<Vec<(CameraName, Undistorted<3>)>, DatasetError> {
        let options = self.undistort_options;
        self.undistort_cameras(seq_id, frame_id, |image, intrinsic, distortion| {
            undistort_image_optimal(image, intrinsic, distortion, &options)
        })
    }

    /// Project the lidar sweep of a frame into every undistorted camera image.
    pub fn project_lidar_to_image(
        &self,
        seq_id: &str,
        frame_id: &str,
    ) -> Result<Vec<LidarOverlay>, DatasetError> {
        let record = self.catalog.frame(seq_id, frame_id)?;
        let sweep = self.load_point_cloud(seq_id, frame_id)?;
        let views = self.undistort_image_v2(seq_id, frame_id)?;

        views
            .into_par_iter()
            .map(|(camera, view)| {
                let projector = self.projector(seq_id, frame_id, record, camera, &view.intrinsic)?;
                let points = projector.project_points(sweep.points());

                let mut image = view.image;
                let skipped = draw_points(&mut image, &points, &self.overlay_style);
                if skipped > 0 {
                    log::warn!(
                        "sequence {seq_id} frame {frame_id} camera {camera}: skipped {skipped} points"
                    );
                }

                Ok(LidarOverlay {
                    camera,
                    image,
                    intrinsic: view.intrinsic,
                    points,
                    skipped,
                })
            })
            .collect()
    }

    /// Project the annotated boxes of a frame into every undistorted camera image.
    ///
    /// Returns `None` when the sequence's split has no annotations.
    pub fn project_boxes_to_image(
        &self,
        seq_id: &str,
        frame_id: &str,
    ) -> Result<Option<Vec<BoxOverlay>>, DatasetError> {
        let split = self.catalog.find_split_name(seq_id)?;
        if !split.has_annotations() {
            log::warn!("sequence {seq_id} is in {split}, it has no box annotations");
            return Ok(None);
        }
        let record = self.catalog.frame(seq_id, frame_id)?;
        let Some(annos) = record.annos.as_ref() else {
            log::warn!("sequence {seq_id} frame {frame_id} has no annotations");
            return Ok(None);
        };

        let views = self.undistort_image_v2(seq_id, frame_id)?;
        let overlays = views
            .into_par_iter()
            .map(|(camera, view)| {
                let projector = self.projector(seq_id, frame_id, record, camera, &view.intrinsic)?;
                let boxes_3d = projector.project_boxes(&annos.boxes_3d);
                let boxes_2d = annos
                    .boxes_2d
                    .get(&camera)
                    .map(|boxes| visible_boxes_2d(boxes))
                    .unwrap_or_default();

                let mut image = view.image;
                let skipped = draw_boxes_3d(&mut image, &boxes_3d, &self.overlay_style);
                if skipped > 0 {
                    log::warn!(
                        "sequence {seq_id} frame {frame_id} camera {camera}: skipped {skipped} boxes"
                    );
                }
                draw_boxes_2d(&mut image, &boxes_2d, &self.overlay_style);

                Ok(BoxOverlay {
                    camera,
                    image,
                    intrinsic: view.intrinsic,
                    boxes_3d,
                    boxes_2d,
                })
            })
            .collect::<Result<Vec<_>, DatasetError>>()?;

        Ok(Some(overlays))
    }

    /// Express the sweeps of `concat_cnt + 1` consecutive frames relative to `frame_id`.
    ///
    /// Falls back to the untransformed sweep of `frame_id` when the window runs past the
    /// end of the sequence or a frame of the window has no usable pose.
    pub fn frame_concat(
        &self,
        seq_id: &str,
        frame_id: &str,
        concat_cnt: usize,
    ) -> Result<ConcatResult, DatasetError> {
        let sequence = self.catalog.sequence(seq_id)?;
        let frame_list = sequence.frame_list();
        let start_index = frame_list
            .iter()
            .position(|f| f == frame_id)
            .ok_or_else(|| CatalogError::FrameNotFound {
                seq_id: seq_id.to_string(),
                frame_id: frame_id.to_string(),
            })?;

        let window = match start_index
            .checked_add(concat_cnt)
            .and_then(|end| frame_list.get(start_index..=end))
        {
            Some(window) => window,
            None => {
                let fallback = ConcatFallback::WindowPastEnd {
                    start_index,
                    concat_cnt,
                    num_frames: frame_list.len(),
                };
                return self.concat_fallback(seq_id, frame_id, fallback);
            }
        };

        let mut poses: Vec<Pose> = Vec::with_capacity(window.len());
        for id in window {
            match sequence.frame(id).and_then(|record| record.pose) {
                Some(pose) => poses.push(pose),
                None => {
                    let fallback = ConcatFallback::MissingPose {
                        frame_id: id.clone(),
                    };
                    return self.concat_fallback(seq_id, frame_id, fallback);
                }
            }
        }

        let frames = window
            .par_iter()
            .zip(poses.into_par_iter())
            .map(|(id, pose)| Ok((pose, self.load_point_cloud(seq_id, id)?)))
            .collect::<Result<Vec<_>, DatasetError>>()?;

        Ok(ConcatResult {
            sweeps: accumulate_sweeps(&frames),
            fallback: None,
        })
    }

    fn concat_fallback(
        &self,
        seq_id: &str,
        frame_id: &str,
        fallback: ConcatFallback,
    ) -> Result<ConcatResult, DatasetError> {
        log::warn!(
            "sequence {seq_id} frame {frame_id}: {fallback:?}, returning the start frame points only"
        );
        Ok(ConcatResult {
            sweeps: vec![self.load_point_cloud(seq_id, frame_id)?],
            fallback: Some(fallback),
        })
    }

    fn projector(
        &self,
        seq_id: &str,
        frame_id: &str,
        record: &FrameRecord,
        camera: CameraName,
        intrinsic: &CameraIntrinsic,
    ) -> Result<CameraProjector, DatasetError> {
        let calib = calibration(seq_id, record, camera)?;
        CameraProjector::new(&calib.cam_to_velo, &intrinsic.to_matrix()).map_err(|source| {
            DatasetError::Projection {
                seq_id: seq_id.to_string(),
                frame_id: frame_id.to_string(),
                camera,
                source,
            }
        })
    }

    // Shared by both undistortion variants: every camera is loaded and undistorted with
    // the calibration stored in the frame record.
    fn undistort_cameras<R, F>(
        &self,
        seq_id: &str,
        frame_id: &str,
        undistort: F,
    ) -> Result<Vec<(CameraName, R)>, DatasetError>
    where
        R: Send,
        F: Fn(&Image<u8, 3>, &CameraIntrinsic, &PolynomialDistortion) -> Result<R, ImgprocError>
            + Sync,
    {
        let record = self.catalog.frame(seq_id, frame_id)?;

        CameraName::ALL
            .par_iter()
            .map(|&camera| {
                let calib = calibration(seq_id, record, camera)?;
                let image = self.load_image(seq_id, frame_id, camera)?;

                let undistortion_error = |source| DatasetError::Undistortion {
                    seq_id: seq_id.to_string(),
                    frame_id: frame_id.to_string(),
                    camera,
                    source,
                };
                let intrinsic =
                    CameraIntrinsic::from_matrix(&calib.cam_intrinsic).map_err(undistortion_error)?;
                let distortion =
                    PolynomialDistortion::from_coeffs(&calib.distortion).map_err(undistortion_error)?;

                let out = undistort(&image, &intrinsic, &distortion).map_err(undistortion_error)?;
                Ok((camera, out))
            })
            .collect()
    }
}

fn calibration<'a>(
    seq_id: &str,
    record: &'a FrameRecord,
    camera: CameraName,
) -> Result<&'a CameraCalibration, DatasetError> {
    record.camera(camera).ok_or_else(|| {
        DatasetError::Catalog(CatalogError::MissingCalibration {
            seq_id: seq_id.to_string(),
            camera,
        })
    })
}
