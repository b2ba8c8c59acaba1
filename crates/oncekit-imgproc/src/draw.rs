use oncekit_image::Image;
use std::cmp::{max, min};

/// Set a pixel's color, ignoring coordinates outside of the image.
#[inline]
fn set_pixel<const C: usize>(img: &mut Image<u8, C>, x: i64, y: i64, color: [u8; C]) {
    if x < 0 || y < 0 || x >= img.cols() as i64 || y >= img.rows() as i64 {
        return;
    }
    let start = (y as usize * img.cols() + x as usize) * C;
    img.as_slice_mut()[start..start + C].copy_from_slice(&color);
}

/// Draws a line on an image inplace using Bresenham's line algorithm.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `p0` - The start point of the line as a tuple of (x, y).
/// * `p1` - The end point of the line as a tuple of (x, y).
/// * `color` - The color of the line as an array of `C` elements.
/// * `thickness` - The thickness of the line. (Note: thickness > 1 is approximate).
pub fn draw_line<const C: usize>(
    img: &mut Image<u8, C>,
    p0: (i64, i64),
    p1: (i64, i64),
    color: [u8; C],
    thickness: usize,
) {
    let half_thickness = if thickness > 1 {
        thickness as i64 / 2
    } else {
        0
    };

    // only walk the part of the segment that can touch the image
    let bounds = (
        (-half_thickness, -half_thickness),
        (
            img.cols() as i64 - 1 + half_thickness,
            img.rows() as i64 - 1 + half_thickness,
        ),
    );
    let Some(((mut x0, mut y0), (x1, y1))) = clip_segment(p0, p1, bounds) else {
        return;
    };

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };

    let mut err = dx - dy;

    loop {
        // stamp a square to approximate the thickness
        for i in -half_thickness..=half_thickness {
            for j in -half_thickness..=half_thickness {
                set_pixel(img, x0 + i, y0 + j, color);
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Clip a segment to the inclusive rectangle `bounds = ((x_min, y_min), (x_max, y_max))`.
///
/// Liang-Barsky clipping; the clipped endpoints are rounded back to pixels. Returns
/// `None` when the segment misses the rectangle.
fn clip_segment(
    p0: (i64, i64),
    p1: (i64, i64),
    bounds: ((i64, i64), (i64, i64)),
) -> Option<((i64, i64), (i64, i64))> {
    let ((x_min, y_min), (x_max, y_max)) = bounds;
    if x_min > x_max || y_min > y_max {
        return None;
    }
    let inside = |(x, y): (i64, i64)| x >= x_min && x <= x_max && y >= y_min && y <= y_max;
    if inside(p0) && inside(p1) {
        return Some((p0, p1));
    }

    let (x0, y0) = (p0.0 as f64, p0.1 as f64);
    let (dx, dy) = (p1.0 as f64 - x0, p1.1 as f64 - y0);
    let (mut t0, mut t1) = (0.0f64, 1.0f64);

    for (p, q) in [
        (-dx, x0 - x_min as f64),
        (dx, x_max as f64 - x0),
        (-dy, y0 - y_min as f64),
        (dy, y_max as f64 - y0),
    ] {
        if p == 0.0 {
            // parallel to this edge and outside of it
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
            if t0 > t1 {
                return None;
            }
        }
    }

    let at = |t: f64| {
        (
            ((x0 + t * dx).round() as i64).clamp(x_min, x_max),
            ((y0 + t * dy).round() as i64).clamp(y_min, y_max),
        )
    };
    Some((at(t0), at(t1)))
}

/// Draws connected line segments through `points` inplace.
///
/// Nothing is drawn for fewer than two points.
pub fn draw_polyline<const C: usize>(
    img: &mut Image<u8, C>,
    points: &[(i64, i64)],
    color: [u8; C],
    thickness: usize,
) {
    for segment in points.windows(2) {
        draw_line(img, segment[0], segment[1], color, thickness);
    }
}

/// Draws a rectangle outline on an image inplace.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `top_left` - The top-left corner coordinates (x, y).
/// * `bottom_right` - The bottom-right corner coordinates (x, y).
/// * `color` - The color of the rectangle outline.
/// * `thickness` - The thickness of the lines.
pub fn draw_rect<const C: usize>(
    img: &mut Image<u8, C>,
    top_left: (i64, i64),
    bottom_right: (i64, i64),
    color: [u8; C],
    thickness: usize,
) {
    let (x0, y0) = top_left;
    let (x1, y1) = bottom_right;

    let (lx0, lx1) = (min(x0, x1), max(x0, x1));
    let (ly0, ly1) = (min(y0, y1), max(y0, y1));

    draw_line(img, (lx0, ly0), (lx1, ly0), color, thickness); // top
    draw_line(img, (lx0, ly1), (lx1, ly1), color, thickness); // bottom
    draw_line(img, (lx0, ly0), (lx0, ly1), color, thickness); // left
    draw_line(img, (lx1, ly0), (lx1, ly1), color, thickness); // right
}

/// Draws a filled circle on an image inplace.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `center` - The center of the circle (x, y).
/// * `radius` - The radius in pixels; a radius of zero sets a single pixel.
/// * `color` - The fill color.
pub fn draw_filled_circle<const C: usize>(
    img: &mut Image<u8, C>,
    center: (i64, i64),
    radius: i64,
    color: [u8; C],
) {
    let (cx, cy) = center;
    let r2 = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= r2 {
                set_pixel(img, cx + dx, cy + dy, color);
            }
        }
    }
}
