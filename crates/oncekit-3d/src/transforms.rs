use glam::DQuat;

/// Quaternions with a norm below this value are rejected.
const QUATERNION_NORM_EPS: f64 = 1e-12;

/// Compute the rotation matrix about the vertical (z) axis.
///
/// # Arguments
///
/// * `theta` - The heading angle in radians.
///
/// # Returns
///
/// The row-major rotation matrix.
///
/// Example:
///
/// ```
/// use oncekit_3d::transforms::rotation_z;
///
/// let rotation = rotation_z(0.0);
/// assert_eq!(rotation, [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
/// ```
pub fn rotation_z(theta: f64) -> [[f64; 3]; 3] {
    let (s, c) = theta.sin_cos();
    [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]]
}

/// Normalize a scalar-last `[qx, qy, qz, qw]` quaternion.
///
/// Returns `None` when the quaternion is not finite or has zero norm.
pub fn normalize_quaternion(q: &[f64; 4]) -> Option<DQuat> {
    let quat = DQuat::from_array(*q);
    if !quat.is_finite() {
        return None;
    }
    let norm = quat.length();
    if norm < QUATERNION_NORM_EPS {
        return None;
    }
    Some(quat / norm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_rotation_z_quarter_turn() {
        let rotation = rotation_z(FRAC_PI_2);
        let expected = [[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]];
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(rotation[i][j], expected[i][j], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_normalize_quaternion() {
        let q = normalize_quaternion(&[0.0, 0.0, 0.0, 4.0]);
        assert_eq!(q, Some(DQuat::IDENTITY));
    }

    #[test]
    fn test_quaternion_zero_norm() {
        assert!(normalize_quaternion(&[0.0; 4]).is_none());
        assert!(normalize_quaternion(&[f64::NAN, 0.0, 0.0, 1.0]).is_none());
    }
}
