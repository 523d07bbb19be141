//! Iterative similarity-transform fit between two five-point sets.
//!
//! Both sets are centered on their own centroids. The rotation and scale are
//! bootstrapped from the eye-to-mouth axis (mean of points 3 and 4 minus mean
//! of points 0 and 1), then refined by alternating least-squares updates of
//! the rotation, the scale, and the translation until the squared residual
//! stops changing or the iteration cap is reached. The rotation estimate is
//! sign-corrected to keep `cos(theta) >= 0`.

use crate::align::AffineMatrix;
use crate::candidate::NUM_LANDMARKS;
use crate::geometry::Point;
use crate::trace::{trace_event, trace_span};
use crate::util::{FaceError, FaceResult};

/// Upper bound on refinement rounds.
pub const MAX_ITERATIONS: usize = 200;
/// Early stop when the squared loss changes by less than this.
pub const LOSS_TOLERANCE: f32 = 1e-2;

const MIN_SPREAD: f32 = 1e-6;

/// Result of a similarity fit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimilarityFit {
    /// Transform mapping source landmarks onto the destination set.
    pub matrix: AffineMatrix,
    /// Uniform scale.
    pub scale: f32,
    /// Rotation angle in radians.
    pub theta: f32,
    /// Refinement rounds executed.
    pub iterations: usize,
    /// Final sum of squared landmark residuals.
    pub loss: f32,
}

type Points = [Point; NUM_LANDMARKS];

fn centroid(points: &Points) -> Point {
    let n = NUM_LANDMARKS as f32;
    let (sx, sy) = points
        .iter()
        .fold((0.0f32, 0.0f32), |(x, y), p| (x + p.x, y + p.y));
    Point::new(sx / n, sy / n)
}

fn centered(points: &Points, c: Point) -> Points {
    points.map(|p| Point::new(p.x - c.x, p.y - c.y))
}

/// Eye-to-mouth axis of a centered landmark set.
fn vertical_axis(p: &Points) -> (f32, f32) {
    (
        (p[3].x + p[4].x - p[0].x - p[1].x) / 2.0,
        (p[3].y + p[4].y - p[0].y - p[1].y) / 2.0,
    )
}

fn rotate_scale(src: &Points, scale: f32, sin: f32, cos: f32) -> Points {
    src.map(|p| {
        Point::new(
            scale * (p.x * cos + p.y * sin),
            scale * (-p.x * sin + p.y * cos),
        )
    })
}

fn mean_residual(dst: &Points, moved: &Points) -> Point {
    let n = NUM_LANDMARKS as f32;
    let (sx, sy) = dst
        .iter()
        .zip(moved.iter())
        .fold((0.0f32, 0.0f32), |(x, y), (d, m)| (x + d.x - m.x, y + d.y - m.y));
    Point::new(sx / n, sy / n)
}

fn squared_loss(dst: &Points, moved: &Points, t: Point) -> f32 {
    dst.iter()
        .zip(moved.iter())
        .map(|(d, m)| {
            let ex = t.x + m.x - d.x;
            let ey = t.y + m.y - d.y;
            ex * ex + ey * ey
        })
        .sum()
}

/// Fits `dst ~ s * R(theta) * src + t`.
///
/// Fails with [`FaceError::DegenerateLandmarks`] when either set has no
/// usable spread (coincident points or a zero eye-to-mouth axis).
pub fn estimate_similarity(src: &Points, dst: &Points) -> FaceResult<SimilarityFit> {
    let _span = trace_span!("estimate_similarity").entered();

    let src_center = centroid(src);
    let dst_center = centroid(dst);
    let s = centered(src, src_center);
    let d = centered(dst, dst_center);

    let (sax, say) = vertical_axis(&s);
    let (dax, day) = vertical_axis(&d);
    let src_axis = sax.hypot(say);
    let dst_axis = dax.hypot(day);
    if !src_axis.is_finite() || src_axis < MIN_SPREAD {
        return Err(FaceError::DegenerateLandmarks {
            reason: "source landmarks have no eye-to-mouth spread",
        });
    }
    if !dst_axis.is_finite() || dst_axis < MIN_SPREAD {
        return Err(FaceError::DegenerateLandmarks {
            reason: "template landmarks have no eye-to-mouth spread",
        });
    }
    let square_sum: f32 = s.iter().map(|p| p.x * p.x + p.y * p.y).sum();

    let theta = dax.atan2(day) - sax.atan2(say);
    let mut scale = dst_axis / src_axis;
    let (mut sin, mut cos) = theta.sin_cos();
    let mut moved = rotate_scale(&s, scale, sin, cos);
    let mut t = mean_residual(&d, &moved);
    let mut loss = squared_loss(&d, &moved, t);

    let mut iterations = 0;
    while iterations < MAX_ITERATIONS {
        iterations += 1;

        let (mut a, mut b) = (0.0f32, 0.0f32);
        for (sp, dp) in s.iter().zip(d.iter()) {
            a += (t.x - dp.x) * sp.y - (t.y - dp.y) * sp.x;
            b += (t.x - dp.x) * sp.x + (t.y - dp.y) * sp.y;
        }
        if b < 0.0 {
            a = -a;
            b = -b;
        }
        let norm = a.hypot(b);
        if !norm.is_finite() || norm < MIN_SPREAD {
            break;
        }
        sin = a / norm;
        cos = b / norm;
        moved = rotate_scale(&s, scale, sin, cos);

        let projection: f32 = d
            .iter()
            .zip(moved.iter())
            .map(|(dp, mp)| (dp.x - t.x) * mp.x + (dp.y - t.y) * mp.y)
            .sum();
        let next_scale = projection / (square_sum * scale);
        if !next_scale.is_finite() || next_scale.abs() < MIN_SPREAD {
            return Err(FaceError::DegenerateLandmarks {
                reason: "scale estimate collapsed",
            });
        }
        let ratio = next_scale / scale;
        for p in moved.iter_mut() {
            p.x *= ratio;
            p.y *= ratio;
        }
        scale = next_scale;

        t = mean_residual(&d, &moved);
        let next_loss = squared_loss(&d, &moved, t);
        let delta = (next_loss - loss).abs();
        loss = next_loss;
        if delta < LOSS_TOLERANCE {
            break;
        }
    }

    let tx = t.x + dst_center.x - scale * (src_center.x * cos + src_center.y * sin);
    let ty = t.y + dst_center.y - scale * (-src_center.x * sin + src_center.y * cos);
    let matrix = AffineMatrix::new([
        cos * scale,
        sin * scale,
        tx,
        -sin * scale,
        cos * scale,
        ty,
    ]);

    trace_event!("similarity_fit", iterations = iterations, loss = loss as f64);
    Ok(SimilarityFit {
        matrix,
        scale,
        theta: sin.atan2(cos),
        iterations,
        loss,
    })
}
