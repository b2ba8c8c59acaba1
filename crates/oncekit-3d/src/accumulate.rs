use crate::linalg::transform_points;
use crate::pointcloud::LidarSweep;
use crate::pose::Pose;

/// Move a sweep into the world frame and shift it by `-origin`.
///
/// Intensities are kept unchanged.
pub fn transform_sweep(sweep: &LidarSweep, pose: &Pose, origin: &[f64; 3]) -> LidarSweep {
    let t = pose.translation();
    let shift = [t[0] - origin[0], t[1] - origin[1], t[2] - origin[2]];

    let mut points = vec![[0.0; 3]; sweep.len()];
    transform_points(sweep.points(), &pose.rotation_matrix(), &shift, &mut points);
    sweep.with_points(points)
}

/// Express consecutive lidar sweeps relative to the first one.
///
/// Every sweep is rotated and translated by its own pose, then the world translation of
/// the first pose is subtracted so that the result is centered at the first sweep's
/// origin. The rotation of the first pose is not undone.
///
/// # Arguments
///
/// * `frames` - The poses and sweeps of a contiguous run of frames, first frame first.
///
/// # Returns
///
/// One transformed sweep per input frame, in input order. Empty for an empty input.
pub fn accumulate_sweeps(frames: &[(Pose, LidarSweep)]) -> Vec<LidarSweep> {
    let Some((first_pose, _)) = frames.first() else {
        return Vec::new();
    };
    let origin = first_pose.translation();

    let sweeps: Vec<LidarSweep> = frames
        .iter()
        .map(|(pose, sweep)| transform_sweep(sweep, pose, &origin))
        .collect();

    log::debug!(
        "accumulated {} sweeps with {} points",
        sweeps.len(),
        sweeps.iter().map(LidarSweep::len).sum::<usize>()
    );

    sweeps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::PoseError;
    use approx::assert_relative_eq;

    fn sweep() -> LidarSweep {
        LidarSweep::from_rows(&[[1.0f32, 2.0, 3.0, 0.1], [-4.0, 0.5, 0.0, 0.9]])
    }

    fn translated(t: [f64; 3]) -> Result<Pose, PoseError> {
        Pose::new([0.0, 0.0, 0.0, 1.0], t)
    }

    #[test]
    fn test_single_frame_is_raw() -> Result<(), PoseError> {
        let frames = [(translated([100.0, -50.0, 3.0])?, sweep())];
        let out = accumulate_sweeps(&frames);
        assert_eq!(out.len(), 1);
        for (p, raw) in out[0].points().iter().zip(sweep().points().iter()) {
            for i in 0..3 {
                assert_relative_eq!(p[i], raw[i], epsilon = 1e-9);
            }
        }
        assert_eq!(out[0].intensities(), sweep().intensities());
        Ok(())
    }

    #[test]
    fn test_translations_relative_to_first() -> Result<(), PoseError> {
        let t = [[10.0, 0.0, 0.0], [11.5, 2.0, 0.0], [13.0, 4.0, -1.0]];
        let frames = [
            (translated(t[0])?, sweep()),
            (translated(t[1])?, sweep()),
            (translated(t[2])?, sweep()),
        ];
        let out = accumulate_sweeps(&frames);
        assert_eq!(out.len(), 3);

        for (i, accumulated) in out.iter().enumerate() {
            for (p, raw) in accumulated.points().iter().zip(sweep().points().iter()) {
                for j in 0..3 {
                    assert_relative_eq!(p[j], raw[j] + t[i][j] - t[0][j], epsilon = 1e-9);
                }
            }
            assert_eq!(accumulated.intensities(), sweep().intensities());
        }
        Ok(())
    }

    #[test]
    fn test_rotation_is_applied_before_translation() -> Result<(), PoseError> {
        let h = std::f64::consts::FRAC_1_SQRT_2;
        let frames = [
            (translated([5.0, 5.0, 0.0])?, LidarSweep::default()),
            (
                Pose::new([0.0, 0.0, h, h], [6.0, 5.0, 0.0])?,
                LidarSweep::from_rows(&[[1.0f64, 0.0, 0.0, 7.0]]),
            ),
        ];
        let out = accumulate_sweeps(&frames);
        assert!(out[0].is_empty());
        let p = out[1].points()[0];
        assert_relative_eq!(p[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(p[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(p[2], 0.0, epsilon = 1e-12);
        assert_eq!(out[1].intensities(), &[7.0]);
        Ok(())
    }

    #[test]
    fn test_empty_window() {
        assert!(accumulate_sweeps(&[]).is_empty());
    }
}
