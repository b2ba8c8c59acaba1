mod common;

use approx::assert_abs_diff_eq;
use oncekit::dataset::ConcatFallback;
use oncekit::k3d::camera::CameraName;
use oncekit::{DatasetError, OnceDataset, Split};

fn open(root: &std::path::Path) -> Result<OnceDataset, Box<dyn std::error::Error>> {
    common::init_logger();
    common::write_dataset(root)?;
    Ok(OnceDataset::new(root, &[Split::Train, Split::Val, Split::Test])?)
}

#[test]
fn load_point_cloud_and_image() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempfile::tempdir()?;
    let dataset = open(tmp_dir.path())?;

    let sweep = dataset.load_point_cloud("seq_train", "100")?;
    assert_eq!(sweep.len(), common::POINTS.len());
    assert_eq!(sweep.points()[1], [1.0, 0.5, 5.0]);

    let image = dataset.load_image("seq_train", "100", CameraName::Cam05)?;
    assert_eq!(image.width(), common::WIDTH);
    assert_eq!(image.height(), common::HEIGHT);
    Ok(())
}

#[test]
fn undistort_variants_keep_camera_order() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempfile::tempdir()?;
    let dataset = open(tmp_dir.path())?;

    let v1 = dataset.undistort_image("seq_train", "200")?;
    let v2 = dataset.undistort_image_v2("seq_train", "200")?;
    assert_eq!(v1.len(), 7);
    assert_eq!(v2.len(), 7);

    for (i, ((cam1, image1), (cam2, view))) in v1.iter().zip(v2.iter()).enumerate() {
        assert_eq!(*cam1, CameraName::ALL[i]);
        assert_eq!(*cam2, CameraName::ALL[i]);
        assert_eq!(image1.size(), view.image.size());
        // zero distortion: the new principal point is the pixel grid center
        assert_abs_diff_eq!(view.intrinsic.cx, (common::WIDTH as f64 - 1.0) / 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(view.intrinsic.cy, (common::HEIGHT as f64 - 1.0) / 2.0, epsilon = 1e-9);
    }
    Ok(())
}

#[test]
fn lidar_projection_lands_at_image_center() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempfile::tempdir()?;
    let dataset = open(tmp_dir.path())?;

    let overlays = dataset.project_lidar_to_image("seq_train", "100")?;
    assert_eq!(overlays.len(), 7);

    for overlay in &overlays {
        // the point behind the camera is culled
        assert_eq!(overlay.points.len(), 2);
        assert_eq!(overlay.skipped, 0);
        assert!(overlay.points.iter().all(|p| p.index != 2));

        // the optical axis point projects to the image center
        let center = overlay.points[0];
        assert_eq!(center.index, 0);
        assert!((center.pixel[0] - common::WIDTH as f64 / 2.0).abs() <= 1.0);
        assert!((center.pixel[1] - common::HEIGHT as f64 / 2.0).abs() <= 1.0);

        // projected with the intrinsics paired with the image
        let off_axis = overlay.points[1];
        assert_abs_diff_eq!(
            off_axis.pixel[0],
            overlay.intrinsic.fx * 0.2 + overlay.intrinsic.cx,
            epsilon = 1e-9
        );

        // the point is drawn with the default color
        let (u, v) = (center.pixel[0] as usize, center.pixel[1] as usize);
        assert_eq!(overlay.image.pixel(u, v), Some(&[0u8, 0, 255][..]));
    }
    Ok(())
}

#[test]
fn box_projection_skips_partial_boxes() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempfile::tempdir()?;
    let dataset = open(tmp_dir.path())?;

    let overlays = dataset
        .project_boxes_to_image("seq_train", "300")?
        .ok_or("train frames have boxes")?;
    assert_eq!(overlays.len(), 7);

    for overlay in &overlays {
        // the second box straddles the camera plane
        assert_eq!(overlay.boxes_3d.len(), 1);
        assert_eq!(overlay.boxes_3d[0].index, 0);
        let vertices = overlay.boxes_3d[0].vertices;
        assert_eq!(vertices[0], vertices[4]);
    }

    // only cam01 has a visible 2D box, truncated to integers
    assert_eq!(overlays[0].camera, CameraName::Cam01);
    assert_eq!(overlays[0].boxes_2d, vec![[10, 12, 30, 40]]);
    assert!(overlays[1..].iter().all(|o| o.boxes_2d.is_empty()));

    // splits without annotations are a no-op
    assert!(dataset.project_boxes_to_image("seq_test", "7")?.is_none());
    Ok(())
}

#[test]
fn frame_concat_single_frame_is_raw() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempfile::tempdir()?;
    let dataset = open(tmp_dir.path())?;

    let result = dataset.frame_concat("seq_train", "200", 0)?;
    assert!(result.fallback.is_none());
    assert_eq!(result.sweeps.len(), 1);

    let raw = dataset.load_point_cloud("seq_train", "200")?;
    for (p, r) in result.sweeps[0].points().iter().zip(raw.points().iter()) {
        for i in 0..3 {
            assert_abs_diff_eq!(p[i], r[i], epsilon = 1e-9);
        }
    }
    assert_eq!(result.sweeps[0].intensities(), raw.intensities());
    Ok(())
}

#[test]
fn frame_concat_translates_relative_to_start() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempfile::tempdir()?;
    let dataset = open(tmp_dir.path())?;

    let result = dataset.frame_concat("seq_train", "100", 2)?;
    assert!(result.fallback.is_none());
    assert_eq!(result.sweeps.len(), 3);

    let raw = dataset.load_point_cloud("seq_train", "100")?;
    let translations = [[10.0, 0.0, 0.0], [12.0, 1.0, 0.0], [15.0, 3.0, -1.0]];
    for (sweep, t) in result.sweeps.iter().zip(translations.iter()) {
        for (p, r) in sweep.points().iter().zip(raw.points().iter()) {
            for i in 0..3 {
                assert_abs_diff_eq!(p[i], r[i] + t[i] - translations[0][i], epsilon = 1e-9);
            }
        }
        assert_eq!(sweep.intensities(), raw.intensities());
    }
    Ok(())
}

#[test]
fn frame_concat_falls_back_to_start_frame() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempfile::tempdir()?;
    let dataset = open(tmp_dir.path())?;
    let raw = dataset.load_point_cloud("seq_train", "200")?;

    let past_end = dataset.frame_concat("seq_train", "200", 2)?;
    assert_eq!(
        past_end.fallback,
        Some(ConcatFallback::WindowPastEnd {
            start_index: 1,
            concat_cnt: 2,
            num_frames: 3,
        })
    );
    assert_eq!(past_end.sweeps, vec![raw]);

    let missing_pose = dataset.frame_concat("seq_val", "1", 1)?;
    assert_eq!(
        missing_pose.fallback,
        Some(ConcatFallback::MissingPose {
            frame_id: "2".to_string()
        })
    );
    assert_eq!(missing_pose.sweeps.len(), 1);

    // a zero quaternion is not a usable pose either
    let zero_quat = dataset.frame_concat("seq_val", "3", 0)?;
    assert!(matches!(
        zero_quat.fallback,
        Some(ConcatFallback::MissingPose { .. })
    ));
    Ok(())
}

#[test]
fn undistortion_error_names_the_frame() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempfile::tempdir()?;
    common::write_dataset(tmp_dir.path())?;

    let path = tmp_dir.path().join("data/seq_train/seq_train.json");
    let mut anno: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    anno["calib"]["cam05"]["distortion"] = serde_json::json!([0.0, 0.0, 0.0]);
    std::fs::write(&path, anno.to_string())?;

    let dataset = OnceDataset::new(tmp_dir.path(), &[Split::Train])?;
    match dataset.undistort_image_v2("seq_train", "100") {
        Err(DatasetError::Undistortion {
            seq_id,
            frame_id,
            camera,
            ..
        }) => {
            assert_eq!(seq_id, "seq_train");
            assert_eq!(frame_id, "100");
            assert_eq!(camera, CameraName::Cam05);
        }
        other => panic!("unexpected {other:?}"),
    }
    Ok(())
}
