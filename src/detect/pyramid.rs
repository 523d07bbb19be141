//! Scale schedule for the proposal stage.
//!
//! The proposal network sees a fixed 12x12 window. To find faces no smaller
//! than `min_face_size`, the image is first scaled by `12 / min_face_size` and
//! then repeatedly shrunk by `factor` while its shorter side stays above the
//! window size.

/// Receptive field of the proposal network in pixels.
pub const PROPOSAL_WINDOW: f64 = 12.0;

/// Ordered scale factors, largest first.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleSchedule {
    scales: Vec<f64>,
}

impl ScaleSchedule {
    /// Builds the schedule for a `width x height` image.
    ///
    /// Returns an empty schedule when the first scaled shorter side is
    /// already at or below the window size.
    pub fn new(width: usize, height: usize, min_face_size: f32, factor: f32) -> Self {
        let factor = factor as f64;
        let mut scale = PROPOSAL_WINDOW / min_face_size as f64;
        let mut min_side = width.min(height) as f64 * scale;
        let mut scales = Vec::new();
        while min_side > PROPOSAL_WINDOW {
            scales.push(scale);
            min_side *= factor;
            scale *= factor;
        }
        Self { scales }
    }

    /// Scale factors, largest first.
    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    /// Number of pyramid levels.
    pub fn len(&self) -> usize {
        self.scales.len()
    }

    /// Returns `true` when no level is large enough for the proposal window.
    pub fn is_empty(&self) -> bool {
        self.scales.is_empty()
    }

    /// Consumes the schedule and returns its scales.
    pub fn into_scales(self) -> Vec<f64> {
        self.scales
    }
}

/// Size of the image resized by `scale`, rounding up.
pub fn scaled_size(width: usize, height: usize, scale: f64) -> (usize, usize) {
    let w = (width as f64 * scale).ceil() as usize;
    let h = (height as f64 * scale).ceil() as usize;
    (w.max(1), h.max(1))
}

#[cfg(test)]
mod tests {
    use super::{scaled_size, ScaleSchedule};

    #[test]
    fn tiny_image_yields_no_levels() {
        let s = ScaleSchedule::new(16, 16, 20.0, 0.709);
        assert!(s.is_empty());
    }

    #[test]
    fn scales_decay_geometrically() {
        let s = ScaleSchedule::new(100, 80, 24.0, 0.5);
        assert_eq!(s.scales(), &[0.5, 0.25]);
    }

    #[test]
    fn scaled_size_rounds_up() {
        assert_eq!(scaled_size(640, 480, 0.25), (160, 120));
        assert_eq!(scaled_size(101, 33, 0.5), (51, 17));
    }
}
