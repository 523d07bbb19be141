//! Affine warping used to cut aligned face crops.

use crate::align::AffineMatrix;
use crate::image::{ImageView, OwnedImage, CHANNELS};
use crate::util::{FaceError, FaceResult};

/// Warps `src` into a `width x height` image with the forward transform `m`.
///
/// `m` maps source coordinates to destination coordinates. Each destination
/// pixel `(x, y)` is pulled back through the inverse transform and sampled
/// bilinearly. Samples that fall outside the source are black.
pub fn warp_affine(
    src: ImageView<'_>,
    m: &AffineMatrix,
    width: usize,
    height: usize,
) -> FaceResult<OwnedImage> {
    let inv = m.invert().ok_or(FaceError::DegenerateLandmarks {
        reason: "singular alignment transform",
    })?;
    let mut out = OwnedImage::zeros(width, height)?;
    let row_len = width * CHANNELS;
    let max_x = src.width() as f32 - 1.0;
    let max_y = src.height() as f32 - 1.0;
    let epsilon = 1e-4;
    let dst = out.data_mut();

    for y in 0..height {
        for x in 0..width {
            let (sx, sy) = inv.apply(x as f32, y as f32);
            if !sx.is_finite()
                || !sy.is_finite()
                || sx < -epsilon
                || sy < -epsilon
                || sx > max_x + epsilon
                || sy > max_y + epsilon
            {
                continue;
            }

            let sx = sx.clamp(0.0, max_x);
            let sy = sy.clamp(0.0, max_y);
            let x0 = sx.floor() as usize;
            let y0 = sy.floor() as usize;
            let x1 = (x0 + 1).min(src.width() - 1);
            let y1 = (y0 + 1).min(src.height() - 1);
            let fx = sx - x0 as f32;
            let fy = sy - y0 as f32;

            let (Some(row0), Some(row1)) = (src.row(y0), src.row(y1)) else {
                continue;
            };
            let base = y * row_len + x * CHANNELS;
            for c in 0..CHANNELS {
                let a = row0[x0 * CHANNELS + c] as f32;
                let b = row0[x1 * CHANNELS + c] as f32;
                let p = row1[x0 * CHANNELS + c] as f32;
                let q = row1[x1 * CHANNELS + c] as f32;
                let value = a * (1.0 - fx) * (1.0 - fy)
                    + b * fx * (1.0 - fy)
                    + p * (1.0 - fx) * fy
                    + q * fx * fy;
                dst[base + c] = value.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    Ok(out)
}
