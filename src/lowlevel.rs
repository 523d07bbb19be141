//! Low-level building blocks for custom detection pipelines.
//!
//! These functions expose the individual cascade steps (candidate generation,
//! suppression, regression, alignment fitting) and the image primitives
//! beyond the high-level `CascadeDetector` and `FaceVerifier` API.

pub use crate::align::{estimate_similarity, LOSS_TOLERANCE, MAX_ITERATIONS};
pub use crate::candidate::calibrate_all;
pub use crate::candidate::nms::nms;
pub use crate::detect::landmark::{clamp_offset, patch_center, patch_half_size};
pub use crate::detect::proposal::generate_candidates;
pub use crate::detect::pyramid::{scaled_size, ScaleSchedule};
pub use crate::geometry::{calibrate, clip, overlap};
pub use crate::image::{crop_with_pad, resize_bilinear, swap_rb, warp_affine};
