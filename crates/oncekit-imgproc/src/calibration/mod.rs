use crate::error::ImgprocError;

/// lens distortion models.
pub mod distortion;

/// optimal new camera matrix after undistortion.
pub mod optimal;

/// Represents the instrinsic parameters of a pinhole camera
///
/// # Fields
///
/// * `fx` - The focal length in the x direction
/// * `fy` - The focal length in the y direction
/// * `cx` - The x coordinate of the principal point
/// * `cy` - The y coordinate of the principal point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraIntrinsic {
    /// The focal length in the x direction
    pub fx: f64,
    /// The focal length in the y direction
    pub fy: f64,
    /// The x coordinate of the principal point
    pub cx: f64,
    /// The y coordinate of the principal point
    pub cy: f64,
}

impl CameraIntrinsic {
    /// Create the intrinsics from a row-major 3x3 camera matrix.
    ///
    /// Only the focal lengths and the principal point are read; skew is ignored.
    ///
    /// # Errors
    ///
    /// If a focal length is zero or any of the read entries is not finite.
    pub fn from_matrix(k: &[[f64; 3]; 3]) -> Result<Self, ImgprocError> {
        let intrinsic = Self {
            fx: k[0][0],
            fy: k[1][1],
            cx: k[0][2],
            cy: k[1][2],
        };
        intrinsic.validate()?;
        Ok(intrinsic)
    }

    /// Convert to a row-major 3x3 camera matrix.
    pub fn to_matrix(&self) -> [[f64; 3]; 3] {
        [
            [self.fx, 0.0, self.cx],
            [0.0, self.fy, self.cy],
            [0.0, 0.0, 1.0],
        ]
    }

    /// Map a pixel to normalized image coordinates.
    #[inline]
    pub fn normalize(&self, u: f64, v: f64) -> (f64, f64) {
        ((u - self.cx) / self.fx, (v - self.cy) / self.fy)
    }

    /// Map normalized image coordinates to a pixel.
    #[inline]
    pub fn denormalize(&self, x: f64, y: f64) -> (f64, f64) {
        (self.fx * x + self.cx, self.fy * y + self.cy)
    }

    pub(crate) fn validate(&self) -> Result<(), ImgprocError> {
        let finite = [self.fx, self.fy, self.cx, self.cy]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.fx == 0.0 || self.fy == 0.0 {
            return Err(ImgprocError::InvalidIntrinsics(format!(
                "fx={}, fy={}, cx={}, cy={}",
                self.fx, self.fy, self.cx, self.cy
            )));
        }
        Ok(())
    }
}
