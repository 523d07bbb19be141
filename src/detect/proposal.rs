//! Proposal stage: dense 12x12 window scoring over the scale pyramid.
//!
//! Each pyramid level is scored by the proposal network, which emits a face
//! probability map and a 4-channel regression map at stride 2. Cells above
//! the threshold become candidates mapped back to original coordinates.

use crate::candidate::nms::nms;
use crate::candidate::FaceCandidate;
use crate::detect::pyramid::{scaled_size, ScaleSchedule};
use crate::detect::{run_items, DetectorConfig};
use crate::engine::{blobs, InferenceEngine};
use crate::geometry::{BoundingBox, OverlapMode};
use crate::image::{resize_bilinear, ImageView};
use crate::tensor::{Tensor, DETECTOR_MEAN, DETECTOR_SCALE};
use crate::trace::{trace_event, trace_span};
use crate::util::math::round_i32;
use crate::util::{FaceError, FaceResult};

/// Stride of the proposal score map in resized-image pixels.
pub const PROPOSAL_STRIDE: usize = 2;
/// Window covered by one score map cell in resized-image pixels.
pub const PROPOSAL_CELL: usize = 12;

/// Runs the proposal network on every pyramid level.
///
/// Per-level candidates are suppressed with union NMS before being merged;
/// the merged list keeps level order (largest scale first).
pub(crate) fn propose(
    net: &dyn InferenceEngine,
    image: ImageView<'_>,
    cfg: &DetectorConfig,
) -> FaceResult<Vec<FaceCandidate>> {
    let schedule = ScaleSchedule::new(
        image.width(),
        image.height(),
        cfg.min_face_size,
        cfg.scale_factor,
    );
    let _span = trace_span!("proposal", levels = schedule.len()).entered();

    let per_level = run_items(schedule.into_scales(), cfg.parallel, |scale| {
        propose_at_scale(net, image, scale, cfg)
    })?;

    let out: Vec<FaceCandidate> = per_level.into_iter().flatten().collect();
    trace_event!("proposal_candidates", count = out.len());
    Ok(out)
}

fn propose_at_scale(
    net: &dyn InferenceEngine,
    image: ImageView<'_>,
    scale: f64,
    cfg: &DetectorConfig,
) -> FaceResult<Vec<FaceCandidate>> {
    let (ws, hs) = scaled_size(image.width(), image.height(), scale);
    let resized = resize_bilinear(image, ws, hs)?;
    let input = Tensor::from_image(resized.view(), DETECTOR_MEAN, DETECTOR_SCALE);
    let outputs = net.infer(blobs::INPUT, &input)?;
    let scores = outputs.map(blobs::PROB, 2)?;
    let regression = outputs.map(blobs::PROPOSAL_REGRESSION, 4)?;

    let mut candidates = generate_candidates(scores, regression, scale, cfg.thresholds[0])?;
    nms(&mut candidates, cfg.proposal_nms, OverlapMode::Union);
    Ok(candidates)
}

/// Turns a proposal score map into candidates.
///
/// `scores` channel 1 holds the face probability; `regression` channels 0..4
/// hold the box offsets for the same cell. A cell at `(row, col)` covers
/// `[2 * col + 1, 2 * col + 13]` horizontally in the resized image, mapped back
/// through `1 / scale`.
pub fn generate_candidates(
    scores: &Tensor,
    regression: &Tensor,
    scale: f64,
    threshold: f32,
) -> FaceResult<Vec<FaceCandidate>> {
    let (height, width) = (scores.height(), scores.width());
    if regression.height() != height || regression.width() != width {
        return Err(FaceError::TensorShape {
            name: "proposal regression".to_string(),
            expected: height * width,
            got: regression.height() * regression.width(),
        });
    }
    let (Some(face), Some(dx0), Some(dy0), Some(dx1), Some(dy1)) = (
        scores.channel(1),
        regression.channel(0),
        regression.channel(1),
        regression.channel(2),
        regression.channel(3),
    ) else {
        return Err(FaceError::TensorShape {
            name: "proposal maps".to_string(),
            expected: 4,
            got: regression.channels().min(scores.channels()),
        });
    };

    let inv_scale = (1.0 / scale) as f32;
    let mut out = Vec::new();
    for row in 0..height {
        for col in 0..width {
            let idx = row * width + col;
            let score = face[idx];
            if score <= threshold {
                continue;
            }
            let left = (PROPOSAL_STRIDE * col + 1) as f32;
            let top = (PROPOSAL_STRIDE * row + 1) as f32;
            let cell = PROPOSAL_CELL as f32;
            let bbox = BoundingBox::new(
                round_i32(left * inv_scale),
                round_i32(top * inv_scale),
                round_i32((left + cell) * inv_scale),
                round_i32((top + cell) * inv_scale),
            );
            out.push(
                FaceCandidate::new(score, bbox)
                    .with_regression([dx0[idx], dy0[idx], dx1[idx], dy1[idx]]),
            );
        }
    }
    Ok(out)
}
