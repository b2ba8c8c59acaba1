use crate::linalg::{mat3_from_rows, mat4_from_rows};
use crate::transforms::rotation_z;
use glam::{DMat3, DMat4, DVec3, DVec4};

/// Extrinsics with an absolute determinant below this value are not invertible.
const SINGULAR_DETERMINANT_EPS: f64 = 1e-12;

/// Traversal of the 8 box corners drawing the 12 edges as one polyline.
pub const BOX_VERTEX_ORDER: [usize; 16] = [0, 1, 3, 2, 0, 4, 5, 7, 6, 4, 5, 1, 3, 7, 6, 2];

/// Error types for the projection module.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// The camera to lidar transform cannot be inverted.
    #[error("cam_to_velo is singular (determinant {0})")]
    SingularExtrinsic(f64),
}

/// A lidar point that survived depth culling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    /// Index of the point in the input slice.
    pub index: usize,
    /// The pixel coordinates `(u, v)`.
    pub pixel: [f64; 2],
    /// Depth of the point in the camera frame.
    pub depth: f64,
}

/// The projected wireframe of a 3D box visible by the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedBox {
    /// Index of the box in the input slice.
    pub index: usize,
    /// The 16 polyline vertices in pixel coordinates, see [`BOX_VERTEX_ORDER`].
    pub vertices: [[f64; 2]; 16],
}

/// Projects points given in the lidar frame into the pixel plane of one camera.
///
/// Points with a non-positive depth in the camera frame are culled before the
/// perspective division.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraProjector {
    velo_to_cam: DMat4,
    intrinsic: DMat3,
}

impl CameraProjector {
    /// Create a projector from the camera calibration.
    ///
    /// # Arguments
    ///
    /// * `cam_to_velo` - Row-major transform from the camera frame to the lidar frame.
    /// * `intrinsic` - Row-major camera matrix of the image the points are projected on.
    ///
    /// # Errors
    ///
    /// If `cam_to_velo` is not invertible.
    pub fn new(
        cam_to_velo: &[[f64; 4]; 4],
        intrinsic: &[[f64; 3]; 3],
    ) -> Result<Self, ProjectionError> {
        let cam_to_velo = mat4_from_rows(cam_to_velo);
        let det = cam_to_velo.determinant();
        if !(det.abs() >= SINGULAR_DETERMINANT_EPS) {
            return Err(ProjectionError::SingularExtrinsic(det));
        }
        Ok(Self {
            velo_to_cam: cam_to_velo.inverse(),
            intrinsic: mat3_from_rows(intrinsic),
        })
    }

    /// Transform a lidar point into the camera frame.
    #[inline]
    pub fn to_camera(&self, point: &[f64; 3]) -> [f64; 3] {
        let p = self.velo_to_cam * DVec4::new(point[0], point[1], point[2], 1.0);
        p.truncate().to_array()
    }

    /// Project a single lidar point.
    ///
    /// # Returns
    ///
    /// The pixel coordinates and the camera frame depth, or `None` if the point is
    /// on or behind the camera plane.
    #[inline]
    pub fn project_point(&self, point: &[f64; 3]) -> Option<([f64; 2], f64)> {
        let cam = DVec3::from_array(self.to_camera(point));
        if cam.z <= 0.0 || cam.z.is_nan() {
            return None;
        }
        // [K | 0] applied to the homogeneous camera point
        let img = self.intrinsic * cam;
        Some(([img.x / img.z, img.y / img.z], cam.z))
    }

    /// Project a set of lidar points, dropping the culled ones.
    ///
    /// The output keeps the input order and records the index of each surviving point.
    pub fn project_points<T: Copy + Into<f64>>(&self, points: &[[T; 3]]) -> Vec<ProjectedPoint> {
        let projected: Vec<ProjectedPoint> = points
            .iter()
            .enumerate()
            .filter_map(|(index, p)| {
                let point = [p[0].into(), p[1].into(), p[2].into()];
                self.project_point(&point)
                    .map(|(pixel, depth)| ProjectedPoint {
                        index,
                        pixel,
                        depth,
                    })
            })
            .collect();

        log::debug!(
            "projected {} of {} points, {} culled",
            projected.len(),
            points.len(),
            points.len() - projected.len()
        );

        projected
    }

    /// Project the wireframe of a single box.
    ///
    /// Returns `None` unless all 16 vertices are in front of the camera.
    pub fn project_box(&self, bbox: &[f64; 7]) -> Option<[[f64; 2]; 16]> {
        let mut vertices = [[0.0; 2]; 16];
        for (vertex, corner) in vertices.iter_mut().zip(box_corners(bbox).iter()) {
            *vertex = self.project_point(corner)?.0;
        }
        Some(vertices)
    }

    /// Project the wireframes of a set of boxes, skipping partially visible ones.
    pub fn project_boxes(&self, boxes: &[[f64; 7]]) -> Vec<ProjectedBox> {
        boxes
            .iter()
            .enumerate()
            .filter_map(|(index, bbox)| {
                self.project_box(bbox)
                    .map(|vertices| ProjectedBox { index, vertices })
            })
            .collect()
    }
}

/// Compute the 16 polyline vertices of a 3D box.
///
/// # Arguments
///
/// * `bbox` - `[x, y, z, dx, dy, dz, yaw]`: center, extents and heading about z.
///
/// # Returns
///
/// The box corners visited in [`BOX_VERTEX_ORDER`]. Corner `i` of the unit cube sits
/// at the offsets given by the bits of `i`, `(i >> 2, i >> 1, i) & 1` minus one half.
pub fn box_corners(bbox: &[f64; 7]) -> [[f64; 3]; 16] {
    let center = DVec3::new(bbox[0], bbox[1], bbox[2]);
    let extent = DVec3::new(bbox[3], bbox[4], bbox[5]);
    let rotation = mat3_from_rows(&rotation_z(bbox[6]));

    let mut corners = [[0.0; 3]; 16];
    for (corner, &i) in corners.iter_mut().zip(BOX_VERTEX_ORDER.iter()) {
        let unit = DVec3::new(
            ((i >> 2) & 1) as f64,
            ((i >> 1) & 1) as f64,
            (i & 1) as f64,
        ) - 0.5;
        *corner = (rotation * (unit * extent) + center).to_array();
    }
    corners
}

/// Truncate a pixel to integer coordinates.
///
/// Returns `None` for coordinates that are not finite or do not fit a 32 bit pixel
/// index, these points are skipped by the drawing code.
pub fn pixel_to_int(pixel: &[f64; 2]) -> Option<(i64, i64)> {
    let cast = |v: f64| -> Option<i64> {
        let t = v.trunc();
        if t.is_finite() && t >= i32::MIN as f64 && t <= i32::MAX as f64 {
            Some(t as i64)
        } else {
            None
        }
    };
    Some((cast(pixel[0])?, cast(pixel[1])?))
}

/// Project lidar points into a camera image.
///
/// # Arguments
///
/// * `points` - Points in the lidar frame, as `f32` or `f64`.
/// * `cam_to_velo` - Row-major transform from the camera frame to the lidar frame.
/// * `intrinsic` - Row-major camera matrix of the target image.
///
/// # Returns
///
/// The points in front of the camera with their pixel coordinates.
///
/// Example:
///
/// ```
/// use oncekit_3d::projection::project_points;
///
/// let identity = [
///     [1.0, 0.0, 0.0, 0.0],
///     [0.0, 1.0, 0.0, 0.0],
///     [0.0, 0.0, 1.0, 0.0],
///     [0.0, 0.0, 0.0, 1.0],
/// ];
/// let k = [[100.0, 0.0, 50.0], [0.0, 100.0, 40.0], [0.0, 0.0, 1.0]];
/// let projected = project_points(&[[1.0, 2.0, 4.0], [0.0, 0.0, -1.0]], &identity, &k).unwrap();
/// assert_eq!(projected.len(), 1);
/// assert_eq!(projected[0].pixel, [75.0, 90.0]);
/// ```
pub fn project_points<T: Copy + Into<f64>>(
    points: &[[T; 3]],
    cam_to_velo: &[[f64; 4]; 4],
    intrinsic: &[[f64; 3]; 3],
) -> Result<Vec<ProjectedPoint>, ProjectionError> {
    Ok(CameraProjector::new(cam_to_velo, intrinsic)?.project_points(points))
}

/// Project the wireframes of 3D boxes into a camera image.
///
/// Boxes with any vertex on or behind the camera plane are skipped entirely.
pub fn project_boxes(
    boxes: &[[f64; 7]],
    cam_to_velo: &[[f64; 4]; 4],
    intrinsic: &[[f64; 3]; 3],
) -> Result<Vec<ProjectedBox>, ProjectionError> {
    Ok(CameraProjector::new(cam_to_velo, intrinsic)?.project_boxes(boxes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const IDENTITY: [[f64; 4]; 4] = [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ];

    const K: [[f64; 3]; 3] = [[500.0, 0.0, 320.0], [0.0, 400.0, 240.0], [0.0, 0.0, 1.0]];

    #[test]
    fn test_project_points_pinhole() -> Result<(), ProjectionError> {
        let points = [[0.5f32, -0.25, 2.0], [1.0, 1.0, 4.0]];
        let projected = project_points(&points, &IDENTITY, &K)?;
        assert_eq!(projected.len(), 2);

        assert_eq!(projected[0].index, 0);
        assert_relative_eq!(projected[0].pixel[0], 500.0 * 0.25 + 320.0);
        assert_relative_eq!(projected[0].pixel[1], 400.0 * -0.125 + 240.0);
        assert_relative_eq!(projected[0].depth, 2.0);

        assert_relative_eq!(projected[1].pixel[0], 445.0);
        assert_relative_eq!(projected[1].pixel[1], 340.0);
        Ok(())
    }

    #[test]
    fn test_project_points_culls_behind_camera() -> Result<(), ProjectionError> {
        let points = [[0.0, 0.0, -1.0], [0.0, 0.0, 0.0], [1.0, 0.0, 1.0], [2.0, 2.0, -3.0]];
        let projected = project_points(&points, &IDENTITY, &K)?;
        assert_eq!(projected.len(), 1);
        assert_eq!(projected[0].index, 2);
        assert_eq!(projected[0].pixel, [820.0, 240.0]);
        Ok(())
    }

    #[test]
    fn test_project_points_uses_inverse_extrinsic() -> Result<(), ProjectionError> {
        // camera sits 2m ahead of the lidar along its own optical axis
        let mut cam_to_velo = IDENTITY;
        cam_to_velo[2][3] = 2.0;

        let projected = project_points(&[[0.0, 0.0, 5.0], [0.0, 0.0, 1.5]], &cam_to_velo, &K)?;
        assert_eq!(projected.len(), 1);
        assert_relative_eq!(projected[0].depth, 3.0);
        assert_eq!(projected[0].pixel, [320.0, 240.0]);
        Ok(())
    }

    #[test]
    fn test_singular_extrinsic() {
        let mut cam_to_velo = IDENTITY;
        cam_to_velo[2][2] = 0.0;
        assert_eq!(
            CameraProjector::new(&cam_to_velo, &K),
            Err(ProjectionError::SingularExtrinsic(0.0))
        );
    }

    #[test]
    fn test_box_corners() {
        let corners = box_corners(&[10.0, 0.0, 0.0, 4.0, 2.0, 1.0, 0.0]);
        assert_eq!(corners[0], [8.0, -1.0, -0.5]);
        assert_eq!(corners[1], [8.0, -1.0, 0.5]);
        assert_eq!(corners[2], [8.0, 1.0, 0.5]);
        assert_eq!(corners[5], [12.0, -1.0, -0.5]);
        // the loop starts and closes on the same corner
        assert_eq!(corners[0], corners[4]);

        // a quarter turn swaps the length and the width
        let rotated = box_corners(&[0.0, 0.0, 0.0, 4.0, 2.0, 1.0, std::f64::consts::FRAC_PI_2]);
        assert_relative_eq!(rotated[0][0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(rotated[0][1], -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_project_boxes_skips_partial() -> Result<(), ProjectionError> {
        let boxes = [
            // fully in front of the camera
            [0.0, 0.0, 10.0, 2.0, 2.0, 2.0, 0.3],
            // straddles the camera plane
            [0.0, 0.0, 0.5, 2.0, 2.0, 2.0, 0.0],
            // behind the camera
            [0.0, 0.0, -10.0, 2.0, 2.0, 2.0, 0.0],
        ];
        let projected = project_boxes(&boxes, &IDENTITY, &K)?;
        assert_eq!(projected.len(), 1);
        assert_eq!(projected[0].index, 0);
        assert_eq!(projected[0].vertices[0], projected[0].vertices[4]);
        Ok(())
    }

    #[test]
    fn test_pixel_to_int() {
        assert_eq!(pixel_to_int(&[3.9, -2.7]), Some((3, -2)));
        assert_eq!(pixel_to_int(&[f64::NAN, 0.0]), None);
        assert_eq!(pixel_to_int(&[0.0, f64::INFINITY]), None);
        assert_eq!(pixel_to_int(&[1e12, 0.0]), None);
    }
}
