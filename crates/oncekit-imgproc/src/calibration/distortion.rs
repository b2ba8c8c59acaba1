use super::CameraIntrinsic;
use crate::error::ImgprocError;
use crate::interpolation::grid::meshgrid_from_fn;
use oncekit_image::{Image, ImageSize};

/// Maximum number of fixed point iterations used to invert the distortion model.
const UNDISTORT_MAX_ITERS: usize = 20;

/// Represents the polynomial distortion parameters of a camera
///
/// The rational radial model with tangential terms, using the same coefficients
/// as OpenCV's `(k1, k2, p1, p2[, k3[, k4, k5, k6]])` vectors.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PolynomialDistortion {
    /// The first radial distortion coefficient
    pub k1: f64,
    /// The second radial distortion coefficient
    pub k2: f64,
    /// The third radial distortion coefficient
    pub k3: f64,
    /// The fourth radial distortion coefficient
    pub k4: f64,
    /// The fifth radial distortion coefficient
    pub k5: f64,
    /// The sixth radial distortion coefficient
    pub k6: f64,
    /// The first tangential distortion coefficient
    pub p1: f64,
    /// The second tangential distortion coefficient
    pub p2: f64,
}

impl PolynomialDistortion {
    /// Build the distortion from an OpenCV ordered coefficient vector.
    ///
    /// # Arguments
    ///
    /// * `coeffs` - `(k1, k2, p1, p2)`, `(k1, k2, p1, p2, k3)` or
    ///   `(k1, k2, p1, p2, k3, k4, k5, k6)`.
    ///
    /// # Errors
    ///
    /// If the vector has any other length.
    pub fn from_coeffs(coeffs: &[f64]) -> Result<Self, ImgprocError> {
        if !matches!(coeffs.len(), 4 | 5 | 8) {
            return Err(ImgprocError::InvalidDistortionCoefficients(coeffs.len()));
        }
        let at = |i: usize| coeffs.get(i).copied().unwrap_or(0.0);
        Ok(Self {
            k1: at(0),
            k2: at(1),
            p1: at(2),
            p2: at(3),
            k3: at(4),
            k4: at(5),
            k5: at(6),
            k6: at(7),
        })
    }

    /// Apply the distortion to normalized image coordinates.
    pub fn distort_normalized(&self, x: f64, y: f64) -> (f64, f64) {
        let r2 = x * x + y * y;
        let r4 = r2 * r2;
        let r6 = r4 * r2;

        // radial distortion
        let kr = (1.0 + self.k1 * r2 + self.k2 * r4 + self.k3 * r6)
            / (1.0 + self.k4 * r2 + self.k5 * r4 + self.k6 * r6);

        // tangential distortion
        let xd = x * kr + 2.0 * self.p1 * x * y + self.p2 * (r2 + 2.0 * x * x);
        let yd = y * kr + self.p1 * (r2 + 2.0 * y * y) + 2.0 * self.p2 * x * y;

        (xd, yd)
    }

    /// Invert the distortion for normalized image coordinates.
    ///
    /// Uses the fixed point iteration of OpenCV's `undistortPoints`. The iteration
    /// stops early once the update is below `1e-12`, and falls back to the
    /// distorted coordinates when the radial factor turns negative.
    pub fn undistort_normalized(&self, xd: f64, yd: f64) -> (f64, f64) {
        let (mut x, mut y) = (xd, yd);
        for _ in 0..UNDISTORT_MAX_ITERS {
            let r2 = x * x + y * y;
            let r4 = r2 * r2;
            let r6 = r4 * r2;
            let icdist = (1.0 + self.k4 * r2 + self.k5 * r4 + self.k6 * r6)
                / (1.0 + self.k1 * r2 + self.k2 * r4 + self.k3 * r6);
            if icdist < 0.0 {
                return (xd, yd);
            }
            let delta_x = 2.0 * self.p1 * x * y + self.p2 * (r2 + 2.0 * x * x);
            let delta_y = self.p1 * (r2 + 2.0 * y * y) + 2.0 * self.p2 * x * y;
            let nx = (xd - delta_x) * icdist;
            let ny = (yd - delta_y) * icdist;
            let step = (nx - x).abs().max((ny - y).abs());
            x = nx;
            y = ny;
            if step < 1e-12 {
                break;
            }
        }
        (x, y)
    }
}

/// Distort a point using polynomial distortion
///
/// # Arguments
///
/// * `x` - The x coordinate of the point
/// * `y` - The y coordinate of the point
/// * `intrinsic` - The intrinsic parameters of the camera
/// * `distortion` - The distortion parameters of the camera
///
/// # Returns
///
/// The pixel coordinates of the distorted point.
pub fn distort_point_polynomial(
    x: f64,
    y: f64,
    intrinsic: &CameraIntrinsic,
    distortion: &PolynomialDistortion,
) -> (f64, f64) {
    let (xn, yn) = intrinsic.normalize(x, y);
    let (xd, yd) = distortion.distort_normalized(xn, yn);
    intrinsic.denormalize(xd, yd)
}

/// Undistort a pixel using polynomial distortion
///
/// # Returns
///
/// The ideal pixel coordinates of the point, expressed with `new_intrinsic`.
pub fn undistort_point_polynomial(
    u: f64,
    v: f64,
    intrinsic: &CameraIntrinsic,
    distortion: &PolynomialDistortion,
    new_intrinsic: &CameraIntrinsic,
) -> (f64, f64) {
    let (xd, yd) = intrinsic.normalize(u, v);
    let (x, y) = distortion.undistort_normalized(xd, yd);
    new_intrinsic.denormalize(x, y)
}

/// Generate the undistortion map for a polynomial distortion model
///
/// Every destination pixel is normalized with `new_intrinsic`, distorted, and
/// projected with `intrinsic` to find where it has to be sampled in the raw image.
///
/// # Arguments
///
/// * `intrinsic` - The intrinsic parameters the raw image was captured with
/// * `new_intrinsic` - The intrinsic parameters of the undistorted image
/// * `distortion` - The distortion parameters of the camera
/// * `size` - The size of the undistorted image
///
/// # Returns
///
/// * `map_x` - The x map for undistorting the image
/// * `map_y` - The y map for undistorting the image
pub fn generate_correction_map_polynomial(
    intrinsic: &CameraIntrinsic,
    new_intrinsic: &CameraIntrinsic,
    distortion: &PolynomialDistortion,
    size: &ImageSize,
) -> Result<(Image<f32, 1>, Image<f32, 1>), ImgprocError> {
    intrinsic.validate()?;
    new_intrinsic.validate()?;

    let (map_x, map_y) = meshgrid_from_fn(size.width, size.height, |x, y| {
        let (xn, yn) = new_intrinsic.normalize(x as f64, y as f64);
        let (xd, yd) = distortion.distort_normalized(xn, yn);
        let (xsrc, ysrc) = intrinsic.denormalize(xd, yd);
        (xsrc as f32, ysrc as f32)
    })?;

    Ok((map_x, map_y))
}
