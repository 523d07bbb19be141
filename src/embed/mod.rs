//! Face embeddings and cosine similarity.
//!
//! An [`Embedder`] maps an aligned face crop to a unit-length
//! [`FeatureVector`]. Similarity between two normalized vectors is their dot
//! product, so identical faces score 1.0 and unrelated ones drift toward 0.

use crate::engine::{blobs, InferenceEngine, ModelBundle};
use crate::image::{resize_bilinear, swap_rb, ImageView};
use crate::tensor::Tensor;
use crate::trace::{trace_event, trace_span};
use crate::util::math::{dot, l2_norm};
use crate::util::{FaceError, FaceResult};

/// Length of the embedding read from the network output.
pub const FEATURE_DIM: usize = 128;
/// Side of the square crop the embedding network consumes.
pub const EMBED_INPUT: usize = 112;

/// A face feature vector.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureVector {
    values: Vec<f32>,
}

impl FeatureVector {
    /// Wraps raw values without normalizing them.
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Raw values.
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Number of dimensions.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` for a zero-dimensional vector.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f32 {
        l2_norm(&self.values)
    }

    /// Scales the vector to unit length in place.
    ///
    /// A vector whose norm is zero (or not finite) is left untouched and
    /// reported as [`FaceError::ZeroNorm`].
    pub fn normalize(&mut self) -> FaceResult<()> {
        let norm = self.norm();
        if !norm.is_finite() || norm <= f32::EPSILON {
            return Err(FaceError::ZeroNorm);
        }
        let inv = 1.0 / norm;
        for v in self.values.iter_mut() {
            *v *= inv;
        }
        Ok(())
    }

    /// Consuming variant of [`FeatureVector::normalize`].
    pub fn normalized(mut self) -> FaceResult<Self> {
        self.normalize()?;
        Ok(self)
    }

    /// Dot product with `other`; the cosine similarity for unit vectors.
    pub fn similarity(&self, other: &FeatureVector) -> FaceResult<f32> {
        if self.len() != other.len() {
            return Err(FaceError::DimensionMismatch {
                left: self.len(),
                right: other.len(),
            });
        }
        Ok(dot(&self.values, &other.values))
    }
}

impl From<Vec<f32>> for FeatureVector {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}

/// Extracts normalized embeddings from aligned face crops.
pub struct Embedder {
    net: Box<dyn InferenceEngine>,
}

impl Embedder {
    /// Wraps an already loaded embedding network.
    pub fn new(net: Box<dyn InferenceEngine>) -> Self {
        Self { net }
    }

    /// Loads the embedding model from `bundle` with backend `E`.
    pub fn load<E: InferenceEngine + 'static>(bundle: &ModelBundle) -> FaceResult<Self> {
        let net = bundle.load::<E>(ModelBundle::EMBEDDING)?;
        Ok(Self::new(Box::new(net)))
    }

    /// Embeds one BGR face crop.
    ///
    /// Crops that are not 112x112 are resized first. The network sees raw
    /// RGB byte values; the first [`FEATURE_DIM`] outputs are normalized.
    pub fn extract(&self, face: ImageView<'_>) -> FaceResult<FeatureVector> {
        let _span = trace_span!("embed", width = face.width(), height = face.height()).entered();
        let rgb = if face.width() == EMBED_INPUT && face.height() == EMBED_INPUT {
            swap_rb(face)
        } else {
            let resized = resize_bilinear(face, EMBED_INPUT, EMBED_INPUT)?;
            swap_rb(resized.view())
        };
        let input = Tensor::from_image(rgb.view(), 0.0, 1.0);
        let outputs = self.net.infer(blobs::INPUT, &input)?;
        let values = outputs.values(blobs::EMBEDDING, FEATURE_DIM)?;
        let feature = FeatureVector::new(values[..FEATURE_DIM].to_vec()).normalized()?;
        trace_event!("embedding", dim = feature.len());
        Ok(feature)
    }
}

#[cfg(test)]
mod tests {
    use super::FeatureVector;
    use crate::util::FaceError;

    #[test]
    fn normalize_yields_unit_length() {
        let f = FeatureVector::new(vec![3.0, 4.0]).normalized().unwrap();
        assert!((f.norm() - 1.0).abs() < 1e-6);
        assert!((f.as_slice()[0] - 0.6).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_cannot_be_normalized() {
        let err = FeatureVector::new(vec![0.0; 4]).normalized().unwrap_err();
        assert_eq!(err, FaceError::ZeroNorm);
    }

    #[test]
    fn similarity_requires_equal_lengths() {
        let a = FeatureVector::new(vec![1.0, 0.0]);
        let b = FeatureVector::new(vec![1.0, 0.0, 0.0]);
        assert_eq!(
            a.similarity(&b).unwrap_err(),
            FaceError::DimensionMismatch { left: 2, right: 3 }
        );
        assert_eq!(a.similarity(&a).unwrap(), 1.0);
    }
}
