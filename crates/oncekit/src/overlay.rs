use oncekit_3d::projection::{pixel_to_int, ProjectedBox, ProjectedPoint};
use oncekit_image::Image;
use oncekit_imgproc::draw::{draw_filled_circle, draw_polyline, draw_rect};

/// Colors and sizes used to draw overlays on RGB images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayStyle {
    /// Radius of the disc drawn for each lidar point.
    pub point_radius: i64,
    /// Color of the lidar points.
    pub point_color: [u8; 3],
    /// Color of the 3D box wireframes.
    pub box_color: [u8; 3],
    /// Color of the 2D boxes.
    pub box_2d_color: [u8; 3],
    /// Thickness of the box lines.
    pub thickness: usize,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            point_radius: 2,
            point_color: [0, 0, 255],
            box_color: [0, 255, 0],
            box_2d_color: [255, 0, 0],
            thickness: 2,
        }
    }
}

/// Draw projected lidar points.
///
/// # Returns
///
/// The number of points skipped because their pixel does not fit an integer index.
pub fn draw_points(img: &mut Image<u8, 3>, points: &[ProjectedPoint], style: &OverlayStyle) -> usize {
    let mut skipped = 0;
    for point in points {
        match pixel_to_int(&point.pixel) {
            Some(center) => draw_filled_circle(img, center, style.point_radius, style.point_color),
            None => {
                log::debug!("skipping point {} at pixel {:?}", point.index, point.pixel);
                skipped += 1;
            }
        }
    }
    skipped
}

/// Draw 3D box wireframes as 16 vertex polylines.
///
/// # Returns
///
/// The number of boxes skipped because a vertex does not fit an integer index.
pub fn draw_boxes_3d(img: &mut Image<u8, 3>, boxes: &[ProjectedBox], style: &OverlayStyle) -> usize {
    let mut skipped = 0;
    for projected in boxes {
        let vertices: Option<Vec<(i64, i64)>> =
            projected.vertices.iter().map(pixel_to_int).collect();
        match vertices {
            Some(vertices) => draw_polyline(img, &vertices, style.box_color, style.thickness),
            None => {
                log::debug!("skipping box {} with a non drawable vertex", projected.index);
                skipped += 1;
            }
        }
    }
    skipped
}

/// Truncate 2D boxes to integers, dropping the ones not visible in the camera.
///
/// A box whose truncated `x1` is negative is not visible.
pub fn visible_boxes_2d(boxes: &[[f64; 4]]) -> Vec<[i64; 4]> {
    boxes
        .iter()
        .filter_map(|b| {
            let (x1, y1) = pixel_to_int(&[b[0], b[1]])?;
            let (x2, y2) = pixel_to_int(&[b[2], b[3]])?;
            (x1 >= 0).then_some([x1, y1, x2, y2])
        })
        .collect()
}

/// Draw 2D boxes as rectangles.
pub fn draw_boxes_2d(img: &mut Image<u8, 3>, boxes: &[[i64; 4]], style: &OverlayStyle) {
    for b in boxes {
        draw_rect(
            img,
            (b[0], b[1]),
            (b[2], b[3]),
            style.box_2d_color,
            style.thickness,
        );
    }
}
