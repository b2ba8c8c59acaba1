use crate::calibration::distortion::{generate_correction_map_polynomial, PolynomialDistortion};
use crate::calibration::optimal::get_optimal_new_camera_matrix;
use crate::calibration::CameraIntrinsic;
use crate::error::ImgprocError;
use crate::interpolation::{remap, InterpolationMode};
use oncekit_image::{ops, Image};

/// Options controlling image undistortion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UndistortOptions {
    /// Free scaling parameter of the new camera matrix, see
    /// [`get_optimal_new_camera_matrix`].
    pub alpha: f64,
    /// Interpolation used to resample the raw image.
    pub interpolation: InterpolationMode,
}

impl Default for UndistortOptions {
    fn default() -> Self {
        Self {
            alpha: 0.0,
            interpolation: InterpolationMode::Bilinear,
        }
    }
}

/// An undistorted image together with the intrinsics it is expressed in.
///
/// Projections onto `image` must use `intrinsic`.
#[derive(Debug, Clone)]
pub struct Undistorted<const C: usize> {
    /// The undistorted image.
    pub image: Image<u8, C>,
    /// The camera intrinsics valid for `image`.
    pub intrinsic: CameraIntrinsic,
}

/// Undistort an image keeping the pixel grid of the original intrinsics.
///
/// Convenient to compare against the raw calibration, but points projected with the
/// original intrinsics do not line up with this image near the borders. Use
/// [`undistort_image_optimal`] when projecting into the image.
///
/// # Arguments
///
/// * `src` - The raw image.
/// * `intrinsic` - The intrinsics the raw image was captured with.
/// * `distortion` - The lens distortion of the camera.
/// * `options` - Resampling options; `alpha` is not used by this variant.
pub fn undistort_image<const C: usize>(
    src: &Image<u8, C>,
    intrinsic: &CameraIntrinsic,
    distortion: &PolynomialDistortion,
    options: &UndistortOptions,
) -> Result<Image<u8, C>, ImgprocError> {
    undistort_to(src, intrinsic, distortion, intrinsic, options.interpolation)
}

/// Undistort an image into the optimal new camera matrix.
///
/// The new intrinsics are computed for the same image size with the free scaling
/// parameter in `options` and returned along with the image.
///
/// # Arguments
///
/// * `src` - The raw image.
/// * `intrinsic` - The intrinsics the raw image was captured with.
/// * `distortion` - The lens distortion of the camera.
/// * `options` - Scaling and resampling options.
pub fn undistort_image_optimal<const C: usize>(
    src: &Image<u8, C>,
    intrinsic: &CameraIntrinsic,
    distortion: &PolynomialDistortion,
    options: &UndistortOptions,
) -> Result<Undistorted<C>, ImgprocError> {
    let size = src.size();
    let new_intrinsic =
        get_optimal_new_camera_matrix(intrinsic, distortion, &size, options.alpha, &size)?;
    log::debug!(
        "optimal intrinsics for {} with alpha {}: {:?}",
        size,
        options.alpha,
        new_intrinsic
    );
    let image = undistort_to(
        src,
        intrinsic,
        distortion,
        &new_intrinsic,
        options.interpolation,
    )?;
    Ok(Undistorted {
        image,
        intrinsic: new_intrinsic,
    })
}

fn undistort_to<const C: usize>(
    src: &Image<u8, C>,
    intrinsic: &CameraIntrinsic,
    distortion: &PolynomialDistortion,
    new_intrinsic: &CameraIntrinsic,
    interpolation: InterpolationMode,
) -> Result<Image<u8, C>, ImgprocError> {
    let size = src.size();
    let (map_x, map_y) =
        generate_correction_map_polynomial(intrinsic, new_intrinsic, distortion, &size)?;

    let src_f32 = src.cast::<f32>()?;
    let mut dst_f32 = Image::<f32, C>::from_size_val(size, 0.0)?;
    remap(&src_f32, &mut dst_f32, &map_x, &map_y, interpolation)?;

    let mut dst = Image::<u8, C>::from_size_val(size, 0)?;
    ops::saturate_to_u8(&dst_f32, &mut dst)?;
    Ok(dst)
}
