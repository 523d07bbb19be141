//! Box geometry: overlap measures and regression-based calibration.
//!
//! Boxes use integer pixel corners `(x0, y0)`-`(x1, y1)`. The area is
//! `(x1 - x0) * (y1 - y0)`, while intersections count both edge pixels
//! (`+ 1`), matching the conventions the stage networks were tuned with.

use crate::util::math::round_i32;

/// 2D point in image pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Point {
    /// Creates a point.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned integer box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    /// Left edge.
    pub x0: i32,
    /// Top edge.
    pub y0: i32,
    /// Right edge.
    pub x1: i32,
    /// Bottom edge.
    pub y1: i32,
}

impl BoundingBox {
    /// Creates a box from its corners.
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// `x1 - x0`.
    pub fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    /// `y1 - y0`.
    pub fn height(&self) -> i32 {
        self.y1 - self.y0
    }

    /// Area as `(x1 - x0) * (y1 - y0)`; zero for degenerate boxes.
    pub fn area(&self) -> f32 {
        (self.width().max(0) as f32) * (self.height().max(0) as f32)
    }

    /// Returns `true` when `p` lies inside the closed box.
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x0 as f32
            && p.x <= self.x1 as f32
            && p.y >= self.y0 as f32
            && p.y <= self.y1 as f32
    }

    /// Returns `true` when `other` lies entirely inside this box.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.x0 >= self.x0 && other.y0 >= self.y0 && other.x1 <= self.x1 && other.y1 <= self.y1
    }
}

/// Denominator used when normalizing an intersection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlapMode {
    /// Intersection over union.
    Union,
    /// Intersection over the smaller of the two areas.
    Min,
}

/// Overlap ratio of two boxes under `mode`.
///
/// A non-positive denominator (degenerate boxes) yields 0.
pub fn overlap(a: &BoundingBox, b: &BoundingBox, mode: OverlapMode) -> f32 {
    let ix0 = a.x0.max(b.x0);
    let iy0 = a.y0.max(b.y0);
    let ix1 = a.x1.min(b.x1);
    let iy1 = a.y1.min(b.y1);
    let iw = (ix1 - ix0 + 1).max(0);
    let ih = (iy1 - iy0 + 1).max(0);
    let inter = (iw as f32) * (ih as f32);
    let denom = match mode {
        OverlapMode::Union => a.area() + b.area() - inter,
        OverlapMode::Min => a.area().min(b.area()),
    };
    if denom <= 0.0 {
        return 0.0;
    }
    inter / denom
}

/// Applies box regression offsets, optionally squarifies, then clips.
///
/// Offsets are fractions of the inclusive box size (`x1 - x0 + 1`). With
/// `square` set, the shorter side grows to the longer one around the box
/// center. Coordinates are rounded and clamped to `[0, width - 1]` x
/// `[0, height - 1]`; the result always satisfies `x0 <= x1`, `y0 <= y1`.
pub fn calibrate(
    bbox: &BoundingBox,
    regression: [f32; 4],
    square: bool,
    width: usize,
    height: usize,
) -> BoundingBox {
    let bw = (bbox.x1 - bbox.x0 + 1) as f32;
    let bh = (bbox.y1 - bbox.y0 + 1) as f32;
    let mut x0 = bbox.x0 as f32 + regression[0] * bw;
    let mut y0 = bbox.y0 as f32 + regression[1] * bh;
    let mut x1 = bbox.x1 as f32 + regression[2] * bw;
    let mut y1 = bbox.y1 as f32 + regression[3] * bh;

    if square {
        let w = x1 - x0 + 1.0;
        let h = y1 - y0 + 1.0;
        let side = w.max(h);
        x0 += (w - side) * 0.5;
        y0 += (h - side) * 0.5;
        x1 = x0 + side - 1.0;
        y1 = y0 + side - 1.0;
    }

    clip(
        BoundingBox::new(round_i32(x0), round_i32(y0), round_i32(x1), round_i32(y1)),
        width,
        height,
    )
}

/// Clamps a box into `[0, width - 1]` x `[0, height - 1]` keeping corners ordered.
pub fn clip(bbox: BoundingBox, width: usize, height: usize) -> BoundingBox {
    let max_x = (width as i32 - 1).max(0);
    let max_y = (height as i32 - 1).max(0);
    let x0 = bbox.x0.clamp(0, max_x);
    let y0 = bbox.y0.clamp(0, max_y);
    let x1 = bbox.x1.clamp(0, max_x).max(x0);
    let y1 = bbox.y1.clamp(0, max_y).max(y0);
    BoundingBox::new(x0, y0, x1, y1)
}
