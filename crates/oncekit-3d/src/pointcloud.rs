/// Error types for the lidar sweep container.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PointCloudError {
    /// The points and intensities have different lengths.
    #[error("Got {0} points but {1} intensities")]
    LengthMismatch(usize, usize),
}

/// A single lidar sweep: point positions and their intensities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LidarSweep {
    // The xyz coordinates of each return.
    points: Vec<[f64; 3]>,
    // The intensity of each return.
    intensities: Vec<f64>,
}

impl LidarSweep {
    /// Create a new sweep from points and one intensity per point.
    pub fn new(points: Vec<[f64; 3]>, intensities: Vec<f64>) -> Result<Self, PointCloudError> {
        if points.len() != intensities.len() {
            return Err(PointCloudError::LengthMismatch(
                points.len(),
                intensities.len(),
            ));
        }
        Ok(Self {
            points,
            intensities,
        })
    }

    /// Create a sweep from raw `[x, y, z, intensity]` rows.
    pub fn from_rows<T: Copy + Into<f64>>(rows: &[[T; 4]]) -> Self {
        let (points, intensities) = rows
            .iter()
            .map(|r| ([r[0].into(), r[1].into(), r[2].into()], r[3].into()))
            .unzip();
        Self {
            points,
            intensities,
        }
    }

    /// Get the number of points in the sweep.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the sweep is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get as reference the points of the sweep.
    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    /// Get as reference the intensities of the sweep.
    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }

    /// Replace the positions keeping the intensities.
    pub(crate) fn with_points(&self, points: Vec<[f64; 3]>) -> Self {
        debug_assert_eq!(points.len(), self.intensities.len());
        Self {
            points,
            intensities: self.intensities.clone(),
        }
    }
}
