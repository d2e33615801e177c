//! Border following on binary images.
//!
//! Implements Suzuki–Abe topological border following: a raster scan
//! finds the starting pixel of every outer border and hole border of the
//! 8-connected foreground regions, each border is traced once, and its
//! parent in the border hierarchy is derived from the last border crossed
//! on the current row. Traced pixels are labelled in a padded working
//! image so that no border is followed twice.

use image::GrayImage;

/// A pixel position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounds, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

/// One traced border.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    points: Vec<Point>,
    is_hole: bool,
    parent: Option<usize>,
}

impl Contour {
    /// Border points; only points where the direction changes are kept.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// True for the inner border of a hole in a region.
    pub fn is_hole(&self) -> bool {
        self.is_hole
    }

    /// Index of the enclosing border in the same contour list.
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = *self.points.first()?;
        let bounds = self.points.iter().fold(
            BoundingBox {
                min: first,
                max: first,
            },
            |b, p| BoundingBox {
                min: Point::new(b.min.x.min(p.x), b.min.y.min(p.y)),
                max: Point::new(b.max.x.max(p.x), b.max.y.max(p.y)),
            },
        );
        Some(bounds)
    }
}

/// Neighbour offsets `(dy, dx)` in counter-clockwise order, starting east.
const NEIGHBOURS: [(isize, isize); 8] = [
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const EAST: usize = 0;
const WEST: usize = 4;

#[inline]
fn direction(dy: isize, dx: isize) -> usize {
    match (dy, dx) {
        (0, 1) => 0,
        (-1, 1) => 1,
        (-1, 0) => 2,
        (-1, -1) => 3,
        (0, -1) => 4,
        (1, -1) => 5,
        (1, 0) => 6,
        _ => 7,
    }
}

/// Padded label image. Foreground starts at 1; traced borders are
/// labelled with their border number, negated where the pixel's east
/// neighbour is background.
struct Labels {
    cells: Vec<i32>,
    stride: usize,
}

impl Labels {
    fn from_binary(binary: &GrayImage) -> Self {
        let stride = binary.width() as usize + 2;
        let rows = binary.height() as usize + 2;
        let mut cells = vec![0i32; stride * rows];
        for (x, y, p) in binary.enumerate_pixels() {
            if p[0] != 0 {
                cells[(y as usize + 1) * stride + x as usize + 1] = 1;
            }
        }
        Self { cells, stride }
    }

    #[inline]
    fn at(&self, pos: (usize, usize)) -> i32 {
        self.cells[pos.0 * self.stride + pos.1]
    }

    #[inline]
    fn set(&mut self, pos: (usize, usize), value: i32) {
        self.cells[pos.0 * self.stride + pos.1] = value;
    }
}

#[inline]
fn step(pos: (usize, usize), dir: usize) -> (usize, usize) {
    let (dy, dx) = NEIGHBOURS[dir];
    (
        pos.0.wrapping_add_signed(dy),
        pos.1.wrapping_add_signed(dx),
    )
}

#[inline]
fn to_point(pos: (usize, usize)) -> Point {
    // Undo the one-pixel padding.
    Point::new(pos.1 as i32 - 1, pos.0 as i32 - 1)
}

/// Finds all outer and hole borders of the foreground (non-zero) pixels.
///
/// Contours are returned in discovery order (raster order of their
/// starting pixels); `parent` indices refer into the returned list.
pub fn find_contours(binary: &GrayImage) -> Vec<Contour> {
    let mut labels = Labels::from_binary(binary);
    let rows = binary.height() as usize;
    let cols = binary.width() as usize;
    let mut contours: Vec<Contour> = Vec::new();
    // Border number 1 is the image frame; traced borders start at 2.
    let mut nbd: i32 = 1;

    for r in 1..=rows {
        let mut lnbd: i32 = 1;
        for c in 1..=cols {
            let value = labels.at((r, c));
            if value == 0 {
                continue;
            }

            let start = if value == 1 && labels.at((r, c - 1)) == 0 {
                Some((false, WEST))
            } else if value >= 1 && labels.at((r, c + 1)) == 0 {
                if value > 1 {
                    lnbd = value;
                }
                Some((true, EAST))
            } else {
                None
            };

            if let Some((is_hole, from)) = start {
                nbd += 1;
                let parent = parent_of(is_hole, lnbd, &contours);
                let points = trace_border(&mut labels, (r, c), from, nbd);
                contours.push(Contour {
                    points: simplify(points),
                    is_hole,
                    parent,
                });
            }

            let value = labels.at((r, c));
            if value != 1 {
                lnbd = value.abs();
            }
        }
    }

    contours
}

/// Parent of a new border given the last border crossed on this row.
fn parent_of(is_hole: bool, lnbd: i32, contours: &[Contour]) -> Option<usize> {
    if lnbd <= 1 {
        return None;
    }
    let index = (lnbd - 2) as usize;
    let last = &contours[index];
    if last.is_hole == is_hole {
        last.parent
    } else {
        Some(index)
    }
}

/// Follows one border starting at `start`, labelling it with `nbd`.
fn trace_border(labels: &mut Labels, start: (usize, usize), from: usize, nbd: i32) -> Vec<Point> {
    // Clockwise search for the first foreground neighbour.
    let first = (0..8)
        .map(|k| step(start, (from + 8 - k) % 8))
        .find(|&pos| labels.at(pos) != 0);

    let Some(first) = first else {
        labels.set(start, -nbd);
        return vec![to_point(start)];
    };

    let mut points = Vec::new();
    let mut prev = first;
    let mut current = start;
    loop {
        points.push(to_point(current));

        // Counter-clockwise search starting just past the previous pixel.
        let back = direction(
            prev.0 as isize - current.0 as isize,
            prev.1 as isize - current.1 as isize,
        );
        let mut east_is_background = false;
        let mut next = prev;
        for k in 1..=8 {
            let dir = (back + k) % 8;
            let pos = step(current, dir);
            if labels.at(pos) != 0 {
                next = pos;
                break;
            }
            if dir == EAST {
                east_is_background = true;
            }
        }

        if east_is_background {
            labels.set(current, -nbd);
        } else if labels.at(current) == 1 {
            labels.set(current, nbd);
        }

        if next == start && current == first {
            break;
        }
        prev = current;
        current = next;
    }

    points
}

/// Drops points lying on a straight run, keeping only the corners of a
/// closed border.
fn simplify(points: Vec<Point>) -> Vec<Point> {
    let n = points.len();
    if n < 3 {
        return points;
    }

    let delta = |a: Point, b: Point| (b.x - a.x, b.y - a.y);
    let kept: Vec<Point> = (0..n)
        .filter(|&k| {
            let prev = points[(k + n - 1) % n];
            let next = points[(k + 1) % n];
            delta(prev, points[k]) != delta(points[k], next)
        })
        .map(|k| points[k])
        .collect();

    if kept.is_empty() {
        points
    } else {
        kept
    }
}
