//! Four-stage cascaded face detector.
//!
//! Stages run strictly in order, each consuming the previous stage's
//! survivors:
//!
//! 1. proposal: dense window scoring over a scale pyramid, union NMS per
//!    level and across levels, then squarified regression;
//! 2. coarse refine (24x24): rescoring, union NMS, squarified regression;
//! 3. fine refine (48x48): rescoring and landmarks, plain regression, then
//!    NMS over the smaller area;
//! 4. landmark refinement on local patches.
//!
//! With the `rayon` feature and [`DetectorConfig::parallel`] set, pyramid
//! levels and per-candidate crops are evaluated in parallel. Every parallel
//! unit returns its own list; suppression always runs on the merged list.

use crate::candidate::nms::nms;
use crate::candidate::{calibrate_all, FaceCandidate};
use crate::engine::{InferenceEngine, ModelBundle};
use crate::geometry::OverlapMode;
use crate::image::ImageView;
use crate::trace::{trace_event, trace_span};
use crate::util::{FaceError, FaceResult};

pub(crate) mod landmark;
pub mod pyramid;
pub(crate) mod proposal;
pub(crate) mod refine;

/// Detector thresholds and pyramid parameters.
#[derive(Clone, Debug)]
pub struct DetectorConfig {
    /// Smallest face side, in pixels, the pyramid is built to find.
    pub min_face_size: f32,
    /// Ratio between consecutive pyramid scales, in `(0, 1)`.
    pub scale_factor: f32,
    /// Face probability thresholds for proposal, coarse, and fine stages.
    pub thresholds: [f32; 3],
    /// Union overlap threshold within one pyramid level.
    pub proposal_nms: f32,
    /// Union overlap threshold across pyramid levels.
    pub merge_nms: f32,
    /// Union overlap threshold after the coarse refine stage.
    pub refine_nms: f32,
    /// Min-area overlap threshold after the fine refine stage.
    pub output_nms: f32,
    /// Evaluate levels and candidates in parallel (requires `rayon`).
    pub parallel: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_face_size: 20.0,
            scale_factor: 0.709,
            thresholds: [0.6, 0.7, 0.8],
            proposal_nms: 0.5,
            merge_nms: 0.7,
            refine_nms: 0.7,
            output_nms: 0.7,
            parallel: false,
        }
    }
}

impl DetectorConfig {
    /// Checks that every parameter is finite and within range.
    pub fn validate(&self) -> FaceResult<()> {
        if !self.min_face_size.is_finite() || self.min_face_size < 1.0 {
            return Err(FaceError::InvalidConfig {
                reason: "min_face_size must be >= 1",
            });
        }
        if !self.scale_factor.is_finite() || self.scale_factor <= 0.0 || self.scale_factor >= 1.0 {
            return Err(FaceError::InvalidConfig {
                reason: "scale_factor must be in (0, 1)",
            });
        }
        if self
            .thresholds
            .iter()
            .any(|t| !t.is_finite() || *t < 0.0 || *t > 1.0)
        {
            return Err(FaceError::InvalidConfig {
                reason: "stage thresholds must be in [0, 1]",
            });
        }
        let overlaps = [
            self.proposal_nms,
            self.merge_nms,
            self.refine_nms,
            self.output_nms,
        ];
        if overlaps.iter().any(|t| !t.is_finite() || *t < 0.0) {
            return Err(FaceError::InvalidConfig {
                reason: "nms thresholds must be finite and >= 0",
            });
        }
        Ok(())
    }
}

/// One inference engine per cascade stage.
pub struct StageNetworks {
    /// Dense 12x12 window scorer.
    pub proposal: Box<dyn InferenceEngine>,
    /// 24x24 rescoring network.
    pub refine: Box<dyn InferenceEngine>,
    /// 48x48 rescoring and landmark network.
    pub output: Box<dyn InferenceEngine>,
    /// Patch-based landmark refinement network.
    pub landmark: Box<dyn InferenceEngine>,
}

/// Cascaded face detector returning boxes with five landmarks.
pub struct CascadeDetector {
    nets: StageNetworks,
    cfg: DetectorConfig,
}

impl CascadeDetector {
    /// Creates a detector from already loaded stage networks.
    pub fn new(nets: StageNetworks, cfg: DetectorConfig) -> FaceResult<Self> {
        cfg.validate()?;
        Ok(Self { nets, cfg })
    }

    /// Loads `det1`..`det4` from `bundle` with backend `E`.
    pub fn load<E: InferenceEngine + 'static>(
        bundle: &ModelBundle,
        cfg: DetectorConfig,
    ) -> FaceResult<Self> {
        let [p, r, o, l] = ModelBundle::DETECTOR_STAGES;
        let nets = StageNetworks {
            proposal: Box::new(bundle.load::<E>(p)?),
            refine: Box::new(bundle.load::<E>(r)?),
            output: Box::new(bundle.load::<E>(o)?),
            landmark: Box::new(bundle.load::<E>(l)?),
        };
        Self::new(nets, cfg)
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &DetectorConfig {
        &self.cfg
    }

    /// Detects faces in `image`.
    ///
    /// Returns an empty list when nothing passes the thresholds; errors only
    /// come from the inference engines.
    pub fn detect(&self, image: ImageView<'_>) -> FaceResult<Vec<FaceCandidate>> {
        let (width, height) = (image.width(), image.height());
        let _span = trace_span!("detect", width = width, height = height).entered();
        let cfg = &self.cfg;

        let mut candidates = proposal::propose(&*self.nets.proposal, image, cfg)?;
        nms(&mut candidates, cfg.merge_nms, OverlapMode::Union);
        calibrate_all(&mut candidates, width, height, true);
        if candidates.is_empty() {
            return Ok(candidates);
        }

        let mut candidates = refine::refine_coarse(&*self.nets.refine, image, candidates, cfg)?;
        nms(&mut candidates, cfg.refine_nms, OverlapMode::Union);
        calibrate_all(&mut candidates, width, height, true);
        if candidates.is_empty() {
            return Ok(candidates);
        }

        let mut candidates = refine::refine_fine(&*self.nets.output, image, candidates, cfg)?;
        calibrate_all(&mut candidates, width, height, false);
        nms(&mut candidates, cfg.output_nms, OverlapMode::Min);

        landmark::refine_landmarks(&*self.nets.landmark, image, &mut candidates, cfg)?;
        trace_event!("faces", count = candidates.len());
        Ok(candidates)
    }
}

/// Applies `f` to every item, in parallel when requested and available.
///
/// Output order always matches input order.
#[cfg(feature = "rayon")]
pub(crate) fn run_items<T, U, F>(items: Vec<T>, parallel: bool, f: F) -> FaceResult<Vec<U>>
where
    T: Send,
    U: Send,
    F: Fn(T) -> FaceResult<U> + Sync + Send,
{
    use rayon::prelude::*;

    if parallel {
        items.into_par_iter().map(f).collect()
    } else {
        items.into_iter().map(f).collect()
    }
}

/// Applies `f` to every item in order.
#[cfg(not(feature = "rayon"))]
pub(crate) fn run_items<T, U, F>(items: Vec<T>, _parallel: bool, f: F) -> FaceResult<Vec<U>>
where
    F: Fn(T) -> FaceResult<U>,
{
    items.into_iter().map(f).collect()
}
