//! Small numeric helpers shared by geometry, alignment, and embeddings.

/// Rounds half away from zero and converts to `i32`.
///
/// Non-finite values map to 0 so degenerate regressions collapse to the
/// origin instead of saturating.
pub(crate) fn round_i32(value: f32) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    value.round() as i32
}

/// Dot product over the common prefix of two slices.
pub(crate) fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Euclidean norm of a slice.
pub(crate) fn l2_norm(values: &[f32]) -> f32 {
    dot(values, values).sqrt()
}
