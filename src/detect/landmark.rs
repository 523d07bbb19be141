//! Landmark refinement: local patches around each point nudge landmarks.
//!
//! The patch half-size `m` follows the box's longer side: a quarter of it,
//! rounded, bumped to even, then halved. Each landmark contributes a
//! `2m x 2m` patch resized to 24x24; the five patches are stacked into one
//! 15-channel input. The network answers with a `(dx, dy)` pair per point in
//! patch-relative units centered on 0.5.

use crate::candidate::{FaceCandidate, NUM_LANDMARKS};
use crate::detect::{run_items, DetectorConfig};
use crate::engine::{blobs, InferenceEngine};
use crate::image::{crop_with_pad, resize_bilinear, ImageView};
use crate::tensor::{Tensor, DETECTOR_MEAN, DETECTOR_SCALE};
use crate::trace::{trace_event, trace_span};
use crate::util::math::round_i32;
use crate::util::FaceResult;

/// Input side of each landmark patch.
pub const PATCH_INPUT: usize = 24;
/// Offsets farther than this from 0.5 are discarded.
pub const MAX_OFFSET_DEVIATION: f32 = 0.35;

/// Half-size of the landmark patches for a candidate box.
pub fn patch_half_size(cand: &FaceCandidate) -> i32 {
    let w = cand.bbox.x1 - cand.bbox.x0 + 1;
    let h = cand.bbox.y1 - cand.bbox.y0 + 1;
    let mut m = round_i32(w.max(h) as f32 * 0.25);
    if m % 2 == 1 {
        m += 1;
    }
    m / 2
}

/// Snaps an unstable offset back to the patch center.
pub fn clamp_offset(offset: f32) -> f32 {
    if (offset - 0.5).abs() > MAX_OFFSET_DEVIATION {
        0.5
    } else {
        offset
    }
}

/// Integer patch center on one axis, kept within one patch of the image.
///
/// Points far outside the image all yield the same fully padded patch, so
/// the center is pinned to `[-m, extent + m]` before any window arithmetic.
pub fn patch_center(coord: f32, extent: i32, m: i32) -> i32 {
    (coord as i64).clamp(-(m as i64), extent as i64 + m as i64) as i32
}

/// Refines the landmarks of every candidate in place. Never drops candidates.
pub(crate) fn refine_landmarks(
    net: &dyn InferenceEngine,
    image: ImageView<'_>,
    candidates: &mut Vec<FaceCandidate>,
    cfg: &DetectorConfig,
) -> FaceResult<()> {
    let _span = trace_span!("refine_landmarks", input = candidates.len()).entered();
    let (img_w, img_h) = (image.width() as i32, image.height() as i32);

    let refined = run_items(std::mem::take(candidates), cfg.parallel, |mut cand| {
        let m = patch_half_size(&cand);
        if m <= 0 {
            return Ok(cand);
        }

        let mut patches = Vec::with_capacity(NUM_LANDMARKS);
        for lm in cand.landmarks.iter() {
            let px = patch_center(lm.x, img_w, m);
            let py = patch_center(lm.y, img_h, m);
            let cut = crop_with_pad(
                image,
                py - m,
                img_h - py - m,
                px - m,
                img_w - px - m,
            )?;
            let resized = resize_bilinear(cut.view(), PATCH_INPUT, PATCH_INPUT)?;
            patches.push(Tensor::from_image(
                resized.view(),
                DETECTOR_MEAN,
                DETECTOR_SCALE,
            ));
        }
        let input = Tensor::stack_channels(&patches)?;
        let outputs = net.infer(blobs::INPUT, &input)?;

        let span = (2 * m) as f32;
        for (lm, name) in cand.landmarks.iter_mut().zip(blobs::LANDMARK_OFFSETS) {
            let offset = outputs.values(name, 2)?;
            let dx = clamp_offset(offset[0]);
            let dy = clamp_offset(offset[1]);
            lm.x += round_i32((dx - 0.5) * span) as f32;
            lm.y += round_i32((dy - 0.5) * span) as f32;
        }
        Ok(cand)
    })?;

    *candidates = refined;
    trace_event!("refine_landmarks_done", count = candidates.len());
    Ok(())
}
