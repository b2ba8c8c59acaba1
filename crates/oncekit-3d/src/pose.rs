use crate::linalg::mat3_to_rows;
use crate::transforms::normalize_quaternion;
use glam::{DMat3, DQuat, DVec3};

/// Error types for the pose module.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PoseError {
    /// The pose vector does not hold `[qx, qy, qz, qw, tx, ty, tz]`.
    #[error("Pose vector must have 7 elements, got {0}")]
    InvalidLength(usize),

    /// The translation holds NaN or infinite values.
    #[error("Pose translation is not finite: {0:?}")]
    NonFiniteTranslation([f64; 3]),

    /// The rotation quaternion is zero or not finite.
    #[error("Pose quaternion cannot be normalized: {0:?}")]
    InvalidQuaternion([f64; 4]),
}

/// Rigid transform locating the vehicle in the world frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    rotation: DQuat,
    translation: DVec3,
}

impl Pose {
    /// The identity pose.
    pub const IDENTITY: Pose = Pose {
        rotation: DQuat::IDENTITY,
        translation: DVec3::ZERO,
    };

    /// Create a pose from a scalar-last quaternion and a translation.
    ///
    /// The quaternion is normalized.
    pub fn new(quaternion: [f64; 4], translation: [f64; 3]) -> Result<Self, PoseError> {
        let rotation =
            normalize_quaternion(&quaternion).ok_or(PoseError::InvalidQuaternion(quaternion))?;
        let translation_vec = DVec3::from_array(translation);
        if !translation_vec.is_finite() {
            return Err(PoseError::NonFiniteTranslation(translation));
        }
        Ok(Self {
            rotation,
            translation: translation_vec,
        })
    }

    /// Create a pose from a `[qx, qy, qz, qw, tx, ty, tz]` vector.
    ///
    /// Example:
    ///
    /// ```
    /// use oncekit_3d::pose::Pose;
    ///
    /// let pose = Pose::from_vector(&[0.0, 0.0, 0.0, 1.0, 1.0, 2.0, 3.0]).unwrap();
    /// assert_eq!(pose.translation(), [1.0, 2.0, 3.0]);
    /// ```
    pub fn from_vector(v: &[f64]) -> Result<Self, PoseError> {
        match v {
            [qx, qy, qz, qw, tx, ty, tz] => Self::new([*qx, *qy, *qz, *qw], [*tx, *ty, *tz]),
            _ => Err(PoseError::InvalidLength(v.len())),
        }
    }

    /// The unit rotation quaternion as `[qx, qy, qz, qw]`.
    pub fn quaternion(&self) -> [f64; 4] {
        self.rotation.to_array()
    }

    /// The row-major rotation matrix.
    pub fn rotation_matrix(&self) -> [[f64; 3]; 3] {
        mat3_to_rows(&DMat3::from_quat(self.rotation))
    }

    /// The translation of the pose.
    pub fn translation(&self) -> [f64; 3] {
        self.translation.to_array()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::transform_points;
    use crate::transforms::rotation_z;
    use approx::assert_relative_eq;

    #[test]
    fn test_pose_from_vector() -> Result<(), PoseError> {
        let pose = Pose::from_vector(&[0.0, 0.0, 0.0, 2.0, 1.0, -2.0, 0.5])?;
        assert_eq!(pose.quaternion(), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(pose.translation(), [1.0, -2.0, 0.5]);
        assert_eq!(pose.rotation_matrix(), [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
        Ok(())
    }

    #[test]
    fn test_pose_rotates_then_translates() -> Result<(), PoseError> {
        // quarter turn about z
        let h = std::f64::consts::FRAC_1_SQRT_2;
        let pose = Pose::new([0.0, 0.0, h, h], [10.0, 0.0, 0.0])?;
        let r = pose.rotation_matrix();
        assert_relative_eq!(r[0][1], -1.0, epsilon = 1e-12);
        assert_relative_eq!(r[1][0], 1.0, epsilon = 1e-12);

        let mut p = [[0.0; 3]];
        transform_points(&[[1.0, 0.0, 0.0]], &r, &pose.translation(), &mut p);
        assert_relative_eq!(p[0][0], 10.0, epsilon = 1e-12);
        assert_relative_eq!(p[0][1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(p[0][2], 0.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_pose_rotation_matches_rotation_z() -> Result<(), PoseError> {
        let yaw = 0.3f64;
        // scaled quaternions are normalized first
        let q = [0.0, 0.0, 3.0 * (yaw / 2.0).sin(), 3.0 * (yaw / 2.0).cos()];
        let r = Pose::new(q, [0.0; 3])?.rotation_matrix();
        let expected = rotation_z(yaw);
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(r[i][j], expected[i][j], epsilon = 1e-12);
            }
        }
        Ok(())
    }

    #[test]
    fn test_pose_errors() {
        assert_eq!(
            Pose::from_vector(&[0.0, 0.0, 0.0, 1.0]),
            Err(PoseError::InvalidLength(4))
        );
        assert_eq!(
            Pose::from_vector(&[0.0; 7]),
            Err(PoseError::InvalidQuaternion([0.0; 4]))
        );
        assert!(matches!(
            Pose::from_vector(&[0.0, 0.0, 0.0, 1.0, f64::INFINITY, 0.0, 0.0]),
            Err(PoseError::NonFiniteTranslation(_))
        ));
    }
}
