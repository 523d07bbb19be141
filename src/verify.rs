//! Detect, align, and embed: the full one-to-one verification flow.

use crate::align::{align_face, AlignmentTemplate};
use crate::detect::{CascadeDetector, DetectorConfig};
use crate::embed::{Embedder, FeatureVector};
use crate::engine::{InferenceEngine, ModelBundle};
use crate::image::ImageView;
use crate::trace::{trace_event, trace_span};
use crate::util::FaceResult;

/// Compares the first detected face of two images.
pub struct FaceVerifier {
    detector: CascadeDetector,
    embedder: Embedder,
    template: AlignmentTemplate,
}

impl FaceVerifier {
    /// Assembles a verifier from its parts.
    pub fn new(detector: CascadeDetector, embedder: Embedder, template: AlignmentTemplate) -> Self {
        Self {
            detector,
            embedder,
            template,
        }
    }

    /// Loads all five models from `bundle` with backend `E`, aligning onto the
    /// 112x112 template.
    pub fn load<E: InferenceEngine + 'static>(
        bundle: &ModelBundle,
        cfg: DetectorConfig,
    ) -> FaceResult<Self> {
        let detector = CascadeDetector::load::<E>(bundle, cfg)?;
        let embedder = Embedder::load::<E>(bundle)?;
        Ok(Self::new(detector, embedder, AlignmentTemplate::ARCFACE_112))
    }

    /// The underlying detector.
    pub fn detector(&self) -> &CascadeDetector {
        &self.detector
    }

    /// The underlying embedder.
    pub fn embedder(&self) -> &Embedder {
        &self.embedder
    }

    /// Embeds the first face found in `image`, or `None` when no face passes
    /// detection.
    pub fn embed_first_face(&self, image: ImageView<'_>) -> FaceResult<Option<FeatureVector>> {
        let faces = self.detector.detect(image)?;
        let Some(face) = faces.first() else {
            return Ok(None);
        };
        let aligned = align_face(image, face, &self.template)?;
        self.embedder.extract(aligned.view()).map(Some)
    }

    /// Similarity between the first faces of `a` and `b`.
    ///
    /// Returns `None` when either image yields no face.
    pub fn verify(&self, a: ImageView<'_>, b: ImageView<'_>) -> FaceResult<Option<f32>> {
        let _span = trace_span!("verify").entered();
        let Some(fa) = self.embed_first_face(a)? else {
            trace_event!("no_face", image = 0u32);
            return Ok(None);
        };
        let Some(fb) = self.embed_first_face(b)? else {
            trace_event!("no_face", image = 1u32);
            return Ok(None);
        };
        let sim = fa.similarity(&fb)?;
        trace_event!("similarity", value = sim as f64);
        Ok(Some(sim))
    }
}
