//! Inference backend seam and model bundle layout.
//!
//! Stage networks are opaque: the cascade hands a named input tensor to an
//! [`InferenceEngine`] and reads named outputs back. Any backend that can load
//! a parameter/weights pair and run a forward pass satisfies the contract.

use std::path::{Path, PathBuf};

use crate::tensor::{Outputs, Tensor};
use crate::util::FaceResult;

/// A loaded network that maps one named input tensor to named outputs.
///
/// `infer` takes `&self`: implementations create a fresh execution context
/// per call (or serialize internally) so one engine can serve concurrent
/// callers when the `rayon` feature parallelizes stages.
pub trait InferenceEngine: Send + Sync {
    /// Loads a network from its parameter and weights files.
    fn load(param_path: &Path, weights_path: &Path) -> FaceResult<Self>
    where
        Self: Sized;

    /// Runs a forward pass with `input` bound to `input_name`.
    fn infer(&self, input_name: &str, input: &Tensor) -> FaceResult<Outputs>;
}

/// Blob names used by the reference detector and embedding models.
pub mod blobs {
    /// Input blob of every network.
    pub const INPUT: &str = "data";
    /// Two-channel face/background probability.
    pub const PROB: &str = "prob1";
    /// Proposal stage box regression map.
    pub const PROPOSAL_REGRESSION: &str = "conv4_2";
    /// Coarse refine stage box regression.
    pub const REFINE_REGRESSION: &str = "conv5_2";
    /// Fine refine stage box regression.
    pub const OUTPUT_REGRESSION: &str = "conv6_2";
    /// Fine refine stage landmark offsets (five x values, then five y values).
    pub const OUTPUT_LANDMARKS: &str = "conv6_3";
    /// Landmark refinement outputs, one `(dx, dy)` pair per point.
    pub const LANDMARK_OFFSETS: [&str; 5] = ["fc5_1", "fc5_2", "fc5_3", "fc5_4", "fc5_5"];
    /// Embedding network feature output.
    pub const EMBEDDING: &str = "fc1";
}

/// File layout of the detector and embedding models under one directory.
#[derive(Clone, Debug)]
pub struct ModelBundle {
    root: PathBuf,
}

impl ModelBundle {
    /// Detector stage model names, proposal first.
    pub const DETECTOR_STAGES: [&'static str; 4] = ["det1", "det2", "det3", "det4"];
    /// Embedding model name.
    pub const EMBEDDING: &'static str = "mobilefacenet";

    /// Creates a bundle rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the bundle directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the `(param, weights)` paths for model `name`.
    pub fn paths(&self, name: &str) -> (PathBuf, PathBuf) {
        (
            self.root.join(format!("{name}.param")),
            self.root.join(format!("{name}.bin")),
        )
    }

    /// Loads model `name` with backend `E`.
    pub fn load<E: InferenceEngine>(&self, name: &str) -> FaceResult<E> {
        let (param, weights) = self.paths(name);
        E::load(&param, &weights)
    }
}

#[cfg(test)]
mod tests {
    use super::ModelBundle;
    use std::path::PathBuf;

    #[test]
    fn bundle_resolves_param_and_weight_pairs() {
        let bundle = ModelBundle::new("/models");
        let (param, weights) = bundle.paths("det2");
        assert_eq!(param, PathBuf::from("/models/det2.param"));
        assert_eq!(weights, PathBuf::from("/models/det2.bin"));
    }
}
