use super::bilinear::bilinear_interpolation;
use super::nearest::nearest_neighbor_interpolation;
use oncekit_image::Image;

/// Interpolation mode for the remap operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InterpolationMode {
    /// Bilinear interpolation
    #[default]
    Bilinear,
    /// Nearest neighbor interpolation
    Nearest,
}

/// Kernel for interpolating a pixel value
///
/// # Arguments
///
/// * `image` - The input image container with shape (height, width, C).
/// * `u` - The x coordinate of the pixel to interpolate.
/// * `v` - The y coordinate of the pixel to interpolate.
/// * `interpolation` - The interpolation mode to use.
///
/// # Returns
///
/// The interpolated pixel values, zero when `(u, v)` lies outside of the image.
pub fn interpolate_pixel<const C: usize>(
    image: &Image<f32, C>,
    u: f32,
    v: f32,
    interpolation: InterpolationMode,
) -> [f32; C] {
    if !inside_half_pixel_border(image, u, v) {
        return [0.0; C];
    }
    match interpolation {
        InterpolationMode::Bilinear => bilinear_interpolation(image, u, v),
        InterpolationMode::Nearest => nearest_neighbor_interpolation(image, u, v),
    }
}

// accept samples up to half a pixel past the outermost pixel centers
fn inside_half_pixel_border<const C: usize>(image: &Image<f32, C>, u: f32, v: f32) -> bool {
    if image.cols() == 0 || image.rows() == 0 || !u.is_finite() || !v.is_finite() {
        return false;
    }
    let max_u = image.cols() as f32 - 0.5;
    let max_v = image.rows() as f32 - 0.5;
    u >= -0.5 && v >= -0.5 && u < max_u && v < max_v
}
