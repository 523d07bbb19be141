//! FaceVerify is a CPU face verification pipeline built around a four-stage
//! cascaded detector.
//!
//! The crate detects faces with five landmarks, aligns each face onto a
//! canonical template with an iterative similarity fit, and compares L2
//! normalized embeddings by dot product. Network inference sits behind the
//! [`InferenceEngine`] trait so any backend can drive the stages; optional
//! parallelism is available via the `rayon` feature.

pub mod align;
mod candidate;
pub mod detect;
pub mod embed;
pub mod engine;
pub mod geometry;
pub mod image;
pub mod lowlevel;
pub mod tensor;
mod trace;
pub mod util;
pub mod verify;

#[cfg(feature = "image-io")]
pub use image::io;

pub use align::{align_face, AffineMatrix, AlignmentTemplate, SimilarityFit};
pub use candidate::{FaceCandidate, NUM_LANDMARKS};
pub use detect::{CascadeDetector, DetectorConfig, StageNetworks};
pub use embed::{Embedder, FeatureVector, FEATURE_DIM};
pub use engine::{InferenceEngine, ModelBundle};
pub use geometry::{BoundingBox, OverlapMode, Point};
pub use image::{ImageView, OwnedImage};
pub use tensor::{Outputs, Tensor};
pub use util::{FaceError, FaceResult};
pub use verify::FaceVerifier;

pub use candidate::nms::nms;
