#![allow(dead_code)]

use oncekit::image::{Image, ImageSize};
use oncekit::io::{jpeg, lidar};
use oncekit::k3d::camera::CameraName;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 48;
pub const FX: f64 = 40.0;

/// Points shared by every frame: one on the optical axis, one off axis, one behind.
pub const POINTS: [[f32; 4]; 3] = [
    [0.0, 0.0, 5.0, 0.5],
    [1.0, 0.5, 5.0, 0.7],
    [0.0, 0.0, -3.0, 0.1],
];

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn calib() -> Value {
    let mut calib = serde_json::Map::new();
    for camera in CameraName::ALL {
        calib.insert(
            camera.as_str().to_string(),
            json!({
                "cam_to_velo": [[1, 0, 0, 0], [0, 1, 0, 0], [0, 0, 1, 0], [0, 0, 0, 1]],
                "cam_intrinsic": [[FX, 0, WIDTH / 2], [0, FX, HEIGHT / 2], [0, 0, 1]],
                "distortion": [0.0, 0.0, 0.0, 0.0, 0.0]
            }),
        );
    }
    Value::Object(calib)
}

fn write_frame_files(seq_dir: &Path, frame_id: &str) -> std::io::Result<()> {
    fs::create_dir_all(seq_dir.join("lidar_roof"))?;
    lidar::write_lidar_bin(seq_dir.join("lidar_roof").join(format!("{frame_id}.bin")), &POINTS)
        .map_err(std::io::Error::other)?;

    let size = ImageSize {
        width: WIDTH,
        height: HEIGHT,
    };
    let image = Image::<u8, 3>::from_size_val(size, 90).map_err(std::io::Error::other)?;
    for camera in CameraName::ALL {
        let cam_dir = seq_dir.join(camera.as_str());
        fs::create_dir_all(&cam_dir)?;
        jpeg::write_image_jpeg_rgb8(cam_dir.join(format!("{frame_id}.jpg")), &image, 90)
            .map_err(std::io::Error::other)?;
    }
    Ok(())
}

fn write_sequence(root: &Path, seq_id: &str, frames: Value) -> std::io::Result<()> {
    let seq_dir = root.join("data").join(seq_id);
    fs::create_dir_all(&seq_dir)?;
    if let Some(entries) = frames.as_array() {
        for entry in entries {
            let frame_id = match &entry["frame_id"] {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            write_frame_files(&seq_dir, &frame_id)?;
        }
    }
    let anno = json!({ "meta_info": {}, "calib": calib(), "frames": frames });
    fs::write(seq_dir.join(format!("{seq_id}.json")), anno.to_string())
}

fn annos() -> Value {
    json!({
        "names": ["Car", "Pedestrian"],
        "boxes_3d": [
            [0.0, 0.0, 10.0, 2.0, 2.0, 2.0, 0.2],
            [0.0, 0.0, 0.5, 2.0, 2.0, 2.0, 0.0]
        ],
        "boxes_2d": {
            "cam01": [[10.4, 12.0, 30.0, 40.0], [-1.0, -1.0, -1.0, -1.0]]
        }
    })
}

/// Write a small dataset:
///
/// - `seq_train` in train: frames 100 (integer id), 200 (listed twice) and 300.
/// - `seq_val` in val: frame 1, frame 2 without pose, frame 3 with a zero quaternion.
/// - `seq_test` in test.
/// - `seq_dup` in train and raw_small.
pub fn write_dataset(root: &Path) -> std::io::Result<()> {
    let image_sets = root.join("ImageSets");
    fs::create_dir_all(&image_sets)?;
    fs::write(image_sets.join("train.txt"), "seq_train\n\nseq_dup\n")?;
    fs::write(image_sets.join("val.txt"), "seq_val\n")?;
    fs::write(image_sets.join("test.txt"), " seq_test \n")?;
    fs::write(image_sets.join("raw_small.txt"), "seq_dup\n")?;

    write_sequence(
        root,
        "seq_train",
        json!([
            {"frame_id": "300", "pose": [0, 0, 0, 1, 15.0, 3.0, -1.0], "annos": annos()},
            {"frame_id": 100, "pose": [0, 0, 0, 1, 10.0, 0.0, 0.0], "annos": annos()},
            {"frame_id": "200", "pose": [0, 0, 0, 1, 12.0, 1.0, 0.0], "annos": annos()},
            {"frame_id": "200", "pose": [0, 0, 0, 1, 12.0, 1.0, 0.0], "annos": annos()}
        ]),
    )?;
    write_sequence(
        root,
        "seq_val",
        json!([
            {"frame_id": "1", "pose": [0, 0, 0, 1, 0.0, 0.0, 0.0], "annos": annos()},
            {"frame_id": "2", "pose": null, "annos": annos()},
            {"frame_id": "3", "pose": [0, 0, 0, 0, 1.0, 1.0, 1.0], "annos": annos()}
        ]),
    )?;
    write_sequence(
        root,
        "seq_test",
        json!([{"frame_id": "7", "pose": [0, 0, 0, 1, 0.0, 0.0, 0.0], "annos": annos()}]),
    )?;
    write_sequence(
        root,
        "seq_dup",
        json!([{"frame_id": "5", "pose": [0, 0, 0, 1, 0.0, 0.0, 0.0], "annos": annos()}]),
    )?;
    Ok(())
}
