use super::distortion::PolynomialDistortion;
use super::CameraIntrinsic;
use crate::error::ImgprocError;
use oncekit_image::ImageSize;

/// Number of samples per image side used to trace the undistorted border.
const BORDER_GRID_SAMPLES: usize = 9;

/// Axis aligned rectangle in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedRect {
    /// left edge
    pub x: f64,
    /// top edge
    pub y: f64,
    /// horizontal extent
    pub width: f64,
    /// vertical extent
    pub height: f64,
}

/// Compute the rectangles covered by the undistorted image.
///
/// A 9x9 grid spanning the raw image is undistorted into normalized coordinates.
/// The outer rectangle bounds every sample, the inner one is the largest rectangle
/// bounded by the left, right, top and bottom sample rows.
///
/// # Returns
///
/// `(inner, outer)` rectangles in normalized image coordinates.
pub fn undistorted_rectangles(
    intrinsic: &CameraIntrinsic,
    distortion: &PolynomialDistortion,
    size: &ImageSize,
) -> (NormalizedRect, NormalizedRect) {
    let n = BORDER_GRID_SAMPLES;
    let (mut ix0, mut ix1, mut iy0, mut iy1) = (f64::MIN, f64::MAX, f64::MIN, f64::MAX);
    let (mut ox0, mut ox1, mut oy0, mut oy1) = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);

    for y in 0..n {
        for x in 0..n {
            let u = x as f64 * size.width as f64 / (n - 1) as f64;
            let v = y as f64 * size.height as f64 / (n - 1) as f64;
            let (xd, yd) = intrinsic.normalize(u, v);
            let (px, py) = distortion.undistort_normalized(xd, yd);

            ox0 = ox0.min(px);
            ox1 = ox1.max(px);
            oy0 = oy0.min(py);
            oy1 = oy1.max(py);

            if x == 0 {
                ix0 = ix0.max(px);
            }
            if x == n - 1 {
                ix1 = ix1.min(px);
            }
            if y == 0 {
                iy0 = iy0.max(py);
            }
            if y == n - 1 {
                iy1 = iy1.min(py);
            }
        }
    }

    let inner = NormalizedRect {
        x: ix0,
        y: iy0,
        width: ix1 - ix0,
        height: iy1 - iy0,
    };
    let outer = NormalizedRect {
        x: ox0,
        y: oy0,
        width: ox1 - ox0,
        height: oy1 - oy0,
    };
    (inner, outer)
}

/// Compute the new camera intrinsics for an undistorted image.
///
/// Mirrors OpenCV's `getOptimalNewCameraMatrix` without centering the principal point.
///
/// # Arguments
///
/// * `intrinsic` - The intrinsics the raw image was captured with.
/// * `distortion` - The lens distortion of the camera.
/// * `size` - The size of the raw image.
/// * `alpha` - Free scaling parameter: `0` keeps only valid pixels (zero crop of
///   invalid regions), `1` keeps every source pixel.
/// * `new_size` - The size of the undistorted image.
///
/// # Errors
///
/// If `alpha` is outside of `[0, 1]` or the undistorted border collapses.
pub fn get_optimal_new_camera_matrix(
    intrinsic: &CameraIntrinsic,
    distortion: &PolynomialDistortion,
    size: &ImageSize,
    alpha: f64,
    new_size: &ImageSize,
) -> Result<CameraIntrinsic, ImgprocError> {
    if !(0.0..=1.0).contains(&alpha) {
        return Err(ImgprocError::InvalidAlpha(alpha));
    }
    intrinsic.validate()?;

    let (inner, outer) = undistorted_rectangles(intrinsic, distortion, size);
    for rect in [&inner, &outer] {
        if !(rect.width > 0.0 && rect.height > 0.0) {
            return Err(ImgprocError::InvalidIntrinsics(format!(
                "undistorted border collapses to {:?}",
                rect
            )));
        }
    }

    let new_w = new_size.width.saturating_sub(1) as f64;
    let new_h = new_size.height.saturating_sub(1) as f64;

    // projection mapping the inner rectangle to the viewport
    let fx0 = new_w / inner.width;
    let fy0 = new_h / inner.height;
    let cx0 = -fx0 * inner.x;
    let cy0 = -fy0 * inner.y;

    // projection mapping the outer rectangle to the viewport
    let fx1 = new_w / outer.width;
    let fy1 = new_h / outer.height;
    let cx1 = -fx1 * outer.x;
    let cy1 = -fy1 * outer.y;

    let new_intrinsic = CameraIntrinsic {
        fx: fx0 * (1.0 - alpha) + fx1 * alpha,
        fy: fy0 * (1.0 - alpha) + fy1 * alpha,
        cx: cx0 * (1.0 - alpha) + cx1 * alpha,
        cy: cy0 * (1.0 - alpha) + cy1 * alpha,
    };
    new_intrinsic.validate()?;

    Ok(new_intrinsic)
}
