//! Contour rasterization.

use super::contour::{Contour, Point};
use image::GenericImage;

/// Draws every contour as a closed polyline with the given stroke.
pub fn draw_contours<I: GenericImage>(
    image: &mut I,
    contours: &[Contour],
    color: I::Pixel,
    stroke_width: u8,
) {
    for contour in contours {
        draw_closed_polyline(image, contour.points(), color, stroke_width);
    }
}

/// Draws segments between consecutive points and back to the first one.
pub fn draw_closed_polyline<I: GenericImage>(
    image: &mut I,
    points: &[Point],
    color: I::Pixel,
    stroke_width: u8,
) {
    match points {
        [] => {}
        [only] => stamp(image, only.x, only.y, color, stroke_width),
        _ => {
            for pair in points.windows(2) {
                draw_line(image, pair[0], pair[1], color, stroke_width);
            }
            if let (Some(&last), Some(&first)) = (points.last(), points.first()) {
                draw_line(image, last, first, color, stroke_width);
            }
        }
    }
}

/// Bresenham line with a round brush.
fn draw_line<I: GenericImage>(image: &mut I, from: Point, to: Point, color: I::Pixel, stroke_width: u8) {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (from.x, from.y);

    loop {
        stamp(image, x, y, color, stroke_width);
        if x == to.x && y == to.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Paints a disc of diameter `stroke_width` centred on `(x, y)`.
///
/// Width 1 is a single pixel, width 2 a plus-shaped cross.
fn stamp<I: GenericImage>(image: &mut I, x: i32, y: i32, color: I::Pixel, stroke_width: u8) {
    let radius = (stroke_width / 2) as i32;
    for oy in -radius..=radius {
        for ox in -radius..=radius {
            if ox * ox + oy * oy <= radius * radius {
                put(image, x + ox, y + oy, color);
            }
        }
    }
}

#[inline]
fn put<I: GenericImage>(image: &mut I, x: i32, y: i32, color: I::Pixel) {
    let (width, height) = image.dimensions();
    if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
        image.put_pixel(x as u32, y as u32, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn lit(image: &GrayImage) -> Vec<(u32, u32)> {
        image
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] != 0)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn test_square_outline() {
        let mut image = GrayImage::new(6, 6);
        let corners = [
            Point::new(1, 1),
            Point::new(1, 4),
            Point::new(4, 4),
            Point::new(4, 1),
        ];
        draw_closed_polyline(&mut image, &corners, Luma([255]), 1);

        let pixels = lit(&image);
        assert_eq!(pixels.len(), 12);
        assert!(image.get_pixel(1, 1)[0] == 255 && image.get_pixel(4, 4)[0] == 255);
        assert_eq!(image.get_pixel(2, 2)[0], 0);
    }

    #[test]
    fn test_width_two_brush_is_cross() {
        let mut image = GrayImage::new(5, 5);
        draw_closed_polyline(&mut image, &[Point::new(2, 2)], Luma([255]), 2);

        assert_eq!(
            lit(&image),
            vec![(2, 1), (1, 2), (2, 2), (3, 2), (2, 3)]
        );
    }

    #[test]
    fn test_clipped_at_edges() {
        let mut image = GrayImage::new(3, 3);
        draw_closed_polyline(
            &mut image,
            &[Point::new(-5, 0), Point::new(10, 0)],
            Luma([255]),
            3,
        );
        assert_eq!(lit(&image), vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);
    }
}
