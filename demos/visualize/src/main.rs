use argh::FromArgs;
use std::path::PathBuf;

use oncekit::io::jpeg;
use oncekit::{OnceDataset, Split};

#[derive(FromArgs)]
/// Project the lidar points and the annotated boxes of a ONCE sequence into its cameras
struct Args {
    /// path to the dataset root
    #[argh(option, short = 'd')]
    dataset_root: PathBuf,

    /// split to load, can be repeated
    #[argh(option, short = 's')]
    split: Vec<Split>,

    /// sequence to visualize, defaults to the first sequence of the first split
    #[argh(option)]
    seq_id: Option<String>,

    /// directory to write the overlays to
    #[argh(option, short = 'o')]
    output_dir: PathBuf,

    /// maximum number of frames to process
    #[argh(option, default = "1")]
    max_frames: usize,

    /// number of following frames to accumulate into each sweep
    #[argh(option, default = "0")]
    concat: usize,

    /// JPEG quality of the written overlays
    #[argh(option, default = "90")]
    quality: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let splits = if args.split.is_empty() {
        vec![Split::Train, Split::Val]
    } else {
        args.split
    };

    let dataset = OnceDataset::new(&args.dataset_root, &splits)?;
    let seq_id = match args.seq_id {
        Some(seq_id) => seq_id,
        None => dataset
            .catalog()
            .sequence_ids(splits[0])
            .next()
            .ok_or_else(|| format!("no sequence loaded for split {}", splits[0]))?
            .to_string(),
    };
    let frame_list = dataset.catalog().frame_list(&seq_id)?;
    log::info!("sequence {seq_id}: {} frames", frame_list.len());
    std::fs::create_dir_all(&args.output_dir)?;

    for frame_id in frame_list.iter().take(args.max_frames) {
        for overlay in dataset.project_lidar_to_image(&seq_id, frame_id)? {
            let path = args
                .output_dir
                .join(format!("{frame_id}_{}_lidar.jpg", overlay.camera.tag()));
            jpeg::write_image_jpeg_rgb8(&path, &overlay.image, args.quality)?;
            log::info!(
                "frame {frame_id} {}: {} points in view",
                overlay.camera,
                overlay.points.len()
            );
        }

        if let Some(overlays) = dataset.project_boxes_to_image(&seq_id, frame_id)? {
            for overlay in overlays {
                let path = args
                    .output_dir
                    .join(format!("{frame_id}_{}_boxes.jpg", overlay.camera.tag()));
                jpeg::write_image_jpeg_rgb8(&path, &overlay.image, args.quality)?;
            }
        }

        if args.concat > 0 {
            let result = dataset.frame_concat(&seq_id, frame_id, args.concat)?;
            let num_points: usize = result.sweeps.iter().map(|s| s.len()).sum();
            log::info!(
                "frame {frame_id}: {} sweeps with {num_points} points accumulated",
                result.sweeps.len()
            );
        }
    }

    Ok(())
}
