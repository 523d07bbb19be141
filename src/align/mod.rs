//! Face alignment onto a canonical five-point template.
//!
//! [`estimate_similarity`] fits rotation, uniform scale, and translation
//! between detected landmarks and an [`AlignmentTemplate`]; [`align_face`]
//! then warps the face into the template's output frame.

use crate::candidate::{FaceCandidate, NUM_LANDMARKS};
use crate::geometry::Point;
use crate::image::{warp_affine, ImageView, OwnedImage};
use crate::util::FaceResult;

mod solver;

pub use solver::{estimate_similarity, SimilarityFit, LOSS_TOLERANCE, MAX_ITERATIONS};

/// 2x3 affine transform `[a, b, tx, c, d, ty]` mapping `(x, y)` to
/// `(a x + b y + tx, c x + d y + ty)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AffineMatrix {
    m: [f32; 6],
}

impl AffineMatrix {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        m: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    };

    /// Wraps row-major coefficients.
    pub const fn new(m: [f32; 6]) -> Self {
        Self { m }
    }

    /// Builds `{s cos, s sin, tx; -s sin, s cos, ty}`.
    pub fn similarity(scale: f32, theta: f32, tx: f32, ty: f32) -> Self {
        let (sin, cos) = theta.sin_cos();
        Self::new([scale * cos, scale * sin, tx, -scale * sin, scale * cos, ty])
    }

    /// Row-major coefficients.
    pub fn as_array(&self) -> [f32; 6] {
        self.m
    }

    /// Transforms a point.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        let m = &self.m;
        (m[0] * x + m[1] * y + m[2], m[3] * x + m[4] * y + m[5])
    }

    /// Transforms a [`Point`].
    pub fn apply_point(&self, p: Point) -> Point {
        let (x, y) = self.apply(p.x, p.y);
        Point::new(x, y)
    }

    /// Inverse transform, or `None` when the linear part is singular.
    pub fn invert(&self) -> Option<Self> {
        let [a, b, tx, c, d, ty] = self.m;
        let det = a * d - b * c;
        if !det.is_finite() || det.abs() < 1e-12 {
            return None;
        }
        let inv = 1.0 / det;
        let (ia, ib, ic, id) = (d * inv, -b * inv, -c * inv, a * inv);
        Some(Self::new([
            ia,
            ib,
            -(ia * tx + ib * ty),
            ic,
            id,
            -(ic * tx + id * ty),
        ]))
    }

    /// Uniform scale of a similarity transform.
    pub fn scale(&self) -> f32 {
        self.m[0].hypot(self.m[1])
    }

    /// Rotation angle `theta` (radians) of a similarity transform.
    pub fn rotation(&self) -> f32 {
        self.m[1].atan2(self.m[0])
    }

    /// Translation part `(tx, ty)`.
    pub fn translation(&self) -> (f32, f32) {
        (self.m[2], self.m[5])
    }
}

/// Canonical landmark positions and the output frame they live in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlignmentTemplate {
    points: [Point; NUM_LANDMARKS],
    width: usize,
    height: usize,
}

impl AlignmentTemplate {
    /// Five-point template for a 96x112 crop.
    pub const ARCFACE_96: Self = Self {
        points: [
            Point::new(30.2946, 51.6963),
            Point::new(65.5318, 51.5014),
            Point::new(48.0252, 71.7366),
            Point::new(33.5493, 92.3655),
            Point::new(62.7299, 92.2041),
        ],
        width: 96,
        height: 112,
    };

    /// Five-point template for a 112x112 crop: the 96-wide template with x
    /// shifted by 8.
    pub const ARCFACE_112: Self = Self {
        points: [
            Point::new(38.2946, 51.6963),
            Point::new(73.5318, 51.5014),
            Point::new(56.0252, 71.7366),
            Point::new(41.5493, 92.3655),
            Point::new(70.7299, 92.2041),
        ],
        width: 112,
        height: 112,
    };

    /// Creates a custom template.
    pub fn new(points: [Point; NUM_LANDMARKS], width: usize, height: usize) -> Self {
        Self {
            points,
            width,
            height,
        }
    }

    /// Template landmarks in output coordinates.
    pub fn points(&self) -> &[Point; NUM_LANDMARKS] {
        &self.points
    }

    /// Output width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Output height.
    pub fn height(&self) -> usize {
        self.height
    }
}

impl Default for AlignmentTemplate {
    fn default() -> Self {
        Self::ARCFACE_112
    }
}

/// Aligns `face` onto `template` and returns the warped crop.
pub fn align_face(
    image: ImageView<'_>,
    face: &FaceCandidate,
    template: &AlignmentTemplate,
) -> FaceResult<OwnedImage> {
    let fit = estimate_similarity(&face.landmarks, template.points())?;
    warp_affine(image, &fit.matrix, template.width(), template.height())
}

#[cfg(test)]
mod tests {
    use super::{AffineMatrix, AlignmentTemplate};

    #[test]
    fn invert_round_trips_points() {
        let m = AffineMatrix::similarity(1.7, 0.4, 12.0, -3.0);
        let inv = m.invert().unwrap();
        let (x, y) = m.apply(5.0, 9.0);
        let (bx, by) = inv.apply(x, y);
        assert!((bx - 5.0).abs() < 1e-4);
        assert!((by - 9.0).abs() < 1e-4);
    }

    #[test]
    fn similarity_decomposes() {
        let m = AffineMatrix::similarity(0.8, -0.3, 1.0, 2.0);
        assert!((m.scale() - 0.8).abs() < 1e-5);
        assert!((m.rotation() + 0.3).abs() < 1e-5);
        assert_eq!(m.translation(), (1.0, 2.0));
    }

    #[test]
    fn wide_template_is_shifted_by_eight() {
        let narrow = AlignmentTemplate::ARCFACE_96.points()[2];
        let wide = AlignmentTemplate::ARCFACE_112.points()[2];
        assert!((wide.x - narrow.x - 8.0).abs() < 1e-4);
        assert_eq!(wide.y, narrow.y);
        assert_eq!(AlignmentTemplate::default().width(), 112);
    }
}
