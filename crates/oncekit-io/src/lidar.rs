use crate::error::IoError;
use oncekit_3d::pointcloud::LidarSweep;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Size in bytes of one `[x, y, z, intensity]` record.
const RECORD_SIZE: usize = 4 * std::mem::size_of::<f32>();

/// Read a raw lidar file as `[x, y, z, intensity]` rows.
///
/// The file is a flat array of little endian `f32` values, four per point.
///
/// # Errors
///
/// If the file does not exist or its size is not a multiple of 16 bytes.
pub fn read_lidar_bin(file_path: impl AsRef<Path>) -> Result<Vec<[f32; 4]>, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let bytes = fs::read(file_path)?;
    if bytes.len() % RECORD_SIZE != 0 {
        return Err(IoError::InvalidLidarFileSize(
            file_path.to_path_buf(),
            bytes.len(),
        ));
    }

    let rows = bytes
        .chunks_exact(RECORD_SIZE)
        .map(|record| {
            let mut row = [0f32; 4];
            for (value, raw) in row.iter_mut().zip(record.chunks_exact(4)) {
                *value = f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
            }
            row
        })
        .collect::<Vec<_>>();

    log::debug!("read {} lidar points from {}", rows.len(), file_path.display());

    Ok(rows)
}

/// Read a raw lidar file into a [`LidarSweep`].
pub fn read_lidar_sweep(file_path: impl AsRef<Path>) -> Result<LidarSweep, IoError> {
    Ok(LidarSweep::from_rows(&read_lidar_bin(file_path)?))
}

/// Write `[x, y, z, intensity]` rows as a raw little endian lidar file.
pub fn write_lidar_bin(file_path: impl AsRef<Path>, rows: &[[f32; 4]]) -> Result<(), IoError> {
    let mut writer = BufWriter::new(File::create(file_path)?);
    for row in rows {
        for value in row {
            writer.write_all(&value.to_le_bytes())?;
        }
    }
    writer.flush()?;
    Ok(())
}
