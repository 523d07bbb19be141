//! Face candidates carried through the detection cascade.
//!
//! A candidate is created by the proposal stage, refined in place by the
//! later stages, and dropped when a stage rejects it.

use crate::geometry::{calibrate, BoundingBox, Point};

pub(crate) mod nms;

/// Number of facial landmarks (eyes, nose tip, mouth corners).
pub const NUM_LANDMARKS: usize = 5;

/// A face hypothesis: box, confidence, pending regression, and landmarks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceCandidate {
    /// Face probability reported by the last stage that scored the box.
    pub score: f32,
    /// Current box in original image coordinates.
    pub bbox: BoundingBox,
    /// Pending `(dx0, dy0, dx1, dy1)` offsets, relative to box size.
    pub regression: [f32; 4],
    /// Landmarks in absolute pixels: left eye, right eye, nose, left and
    /// right mouth corner. All zero until the fine refine stage runs.
    pub landmarks: [Point; NUM_LANDMARKS],
}

impl FaceCandidate {
    /// Creates a candidate with no regression and unset landmarks.
    pub fn new(score: f32, bbox: BoundingBox) -> Self {
        Self {
            score,
            bbox,
            regression: [0.0; 4],
            landmarks: [Point::default(); NUM_LANDMARKS],
        }
    }

    /// Attaches regression offsets.
    pub fn with_regression(mut self, regression: [f32; 4]) -> Self {
        self.regression = regression;
        self
    }

    /// Box area, derived from the current corners.
    pub fn area(&self) -> f32 {
        self.bbox.area()
    }

    /// Landmarks as `[x0, y0, x1, y1, ...]`.
    pub fn landmarks_flat(&self) -> [f32; 2 * NUM_LANDMARKS] {
        let mut out = [0.0f32; 2 * NUM_LANDMARKS];
        for (i, p) in self.landmarks.iter().enumerate() {
            out[2 * i] = p.x;
            out[2 * i + 1] = p.y;
        }
        out
    }
}

/// Applies every candidate's regression and clips to a `width x height` image.
pub fn calibrate_all(candidates: &mut [FaceCandidate], width: usize, height: usize, square: bool) {
    for cand in candidates.iter_mut() {
        cand.bbox = calibrate(&cand.bbox, cand.regression, square, width, height);
    }
}
