//! Coarse (24x24) and fine (48x48) refine stages.
//!
//! Both stages crop every surviving box from the original image (zero padded
//! where the box leaves the image), score it with their network, and keep it
//! only when the face probability exceeds the stage threshold. Kept boxes get
//! fresh regression offsets; the fine stage also places the five landmarks.

use crate::candidate::{FaceCandidate, NUM_LANDMARKS};
use crate::detect::{run_items, DetectorConfig};
use crate::engine::{blobs, InferenceEngine};
use crate::geometry::{BoundingBox, Point};
use crate::image::{crop_with_pad, resize_bilinear, ImageView};
use crate::tensor::{Tensor, DETECTOR_MEAN, DETECTOR_SCALE};
use crate::trace::{trace_event, trace_span};
use crate::util::FaceResult;

/// Input side of the coarse refine network.
pub const COARSE_INPUT: usize = 24;
/// Input side of the fine refine network.
pub const FINE_INPUT: usize = 48;

/// Crops `bbox` from `image`, resizes it to `side x side`, and normalizes it.
///
/// Returns `None` for boxes with no area.
pub(crate) fn box_patch(
    image: ImageView<'_>,
    bbox: &BoundingBox,
    side: usize,
) -> FaceResult<Option<Tensor>> {
    if bbox.width() <= 0 || bbox.height() <= 0 {
        return Ok(None);
    }
    let crop = crop_with_pad(
        image,
        bbox.y0,
        image.height() as i32 - bbox.y1,
        bbox.x0,
        image.width() as i32 - bbox.x1,
    )?;
    let resized = resize_bilinear(crop.view(), side, side)?;
    Ok(Some(Tensor::from_image(
        resized.view(),
        DETECTOR_MEAN,
        DETECTOR_SCALE,
    )))
}

/// Coarse pass: rescoring and regression only.
pub(crate) fn refine_coarse(
    net: &dyn InferenceEngine,
    image: ImageView<'_>,
    candidates: Vec<FaceCandidate>,
    cfg: &DetectorConfig,
) -> FaceResult<Vec<FaceCandidate>> {
    let _span = trace_span!("refine_coarse", input = candidates.len()).entered();
    let threshold = cfg.thresholds[1];

    let scored = run_items(candidates, cfg.parallel, |mut cand| {
        let Some(input) = box_patch(image, &cand.bbox, COARSE_INPUT)? else {
            return Ok(None);
        };
        let outputs = net.infer(blobs::INPUT, &input)?;
        let score = outputs.values(blobs::PROB, 2)?[1];
        if score <= threshold {
            return Ok(None);
        }
        let reg = outputs.values(blobs::REFINE_REGRESSION, 4)?;
        cand.regression = [reg[0], reg[1], reg[2], reg[3]];
        cand.score = score;
        Ok(Some(cand))
    })?;

    let out: Vec<FaceCandidate> = scored.into_iter().flatten().collect();
    trace_event!("refine_coarse_candidates", count = out.len());
    Ok(out)
}

/// Fine pass: rescoring, regression, and initial landmarks.
///
/// Landmark `i` is placed at `x0 + (x1 - x0) * p[i]`, `y0 + (y1 - y0) * p[i + 5]`
/// where `p` is the network's landmark output.
pub(crate) fn refine_fine(
    net: &dyn InferenceEngine,
    image: ImageView<'_>,
    candidates: Vec<FaceCandidate>,
    cfg: &DetectorConfig,
) -> FaceResult<Vec<FaceCandidate>> {
    let _span = trace_span!("refine_fine", input = candidates.len()).entered();
    let threshold = cfg.thresholds[2];

    let scored = run_items(candidates, cfg.parallel, |mut cand| {
        let Some(input) = box_patch(image, &cand.bbox, FINE_INPUT)? else {
            return Ok(None);
        };
        let outputs = net.infer(blobs::INPUT, &input)?;
        let score = outputs.values(blobs::PROB, 2)?[1];
        if score <= threshold {
            return Ok(None);
        }
        let reg = outputs.values(blobs::OUTPUT_REGRESSION, 4)?;
        let points = outputs.values(blobs::OUTPUT_LANDMARKS, 2 * NUM_LANDMARKS)?;
        let b = cand.bbox;
        let (w, h) = (b.width() as f32, b.height() as f32);
        for (i, lm) in cand.landmarks.iter_mut().enumerate() {
            *lm = Point::new(
                b.x0 as f32 + w * points[i],
                b.y0 as f32 + h * points[i + NUM_LANDMARKS],
            );
        }
        cand.regression = [reg[0], reg[1], reg[2], reg[3]];
        cand.score = score;
        Ok(Some(cand))
    })?;

    let out: Vec<FaceCandidate> = scored.into_iter().flatten().collect();
    trace_event!("refine_fine_candidates", count = out.len());
    Ok(out)
}
