use glam::{DMat3, DMat4, DVec3};

/// Build a glam matrix from a row-major 4x4 array.
#[inline]
pub fn mat4_from_rows(m: &[[f64; 4]; 4]) -> DMat4 {
    DMat4::from_cols_array_2d(m).transpose()
}

/// Build a glam matrix from a row-major 3x3 array.
#[inline]
pub fn mat3_from_rows(m: &[[f64; 3]; 3]) -> DMat3 {
    DMat3::from_cols_array_2d(m).transpose()
}

/// Convert a glam matrix into a row-major 3x3 array.
#[inline]
pub fn mat3_to_rows(m: &DMat3) -> [[f64; 3]; 3] {
    m.transpose().to_cols_array_2d()
}

/// Transform a set of points using a rotation and translation.
///
/// # Arguments
///
/// * `src_points` - A set of points to be transformed.
/// * `dst_r_src` - A row-major rotation matrix.
/// * `dst_t_src` - A translation vector.
/// * `dst_points` - A pre-allocated vector to store the transformed points.
///
/// PRECONDITION: dst_points is a pre-allocated vector of the same size as source.
///
/// Example:
///
/// ```
/// use oncekit_3d::linalg::transform_points;
///
/// let src_points = vec![[2.0, 2.0, 2.0], [3.0, 4.0, 5.0]];
/// let rotation = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
/// let translation = [1.0, 0.0, 0.0];
/// let mut dst_points = vec![[0.0; 3]; src_points.len()];
/// transform_points(&src_points, &rotation, &translation, &mut dst_points);
/// assert_eq!(dst_points[1], [4.0, 4.0, 5.0]);
/// ```
pub fn transform_points(
    src_points: &[[f64; 3]],
    dst_r_src: &[[f64; 3]; 3],
    dst_t_src: &[f64; 3],
    dst_points: &mut [[f64; 3]],
) {
    debug_assert_eq!(src_points.len(), dst_points.len());

    let rotation = mat3_from_rows(dst_r_src);
    let translation = DVec3::from_array(*dst_t_src);

    for (dst, src) in dst_points.iter_mut().zip(src_points.iter()) {
        *dst = (rotation * DVec3::from_array(*src) + translation).to_array();
    }
}
