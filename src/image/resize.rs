//! Bilinear resampling for 3-channel images.
//!
//! Destination pixel centers map to source coordinates with the half-pixel
//! convention `src = (dst + 0.5) * (src_len / dst_len) - 0.5`, clamped to the
//! valid range so edges replicate instead of reading outside the buffer.

use crate::image::{ImageView, OwnedImage, CHANNELS};
use crate::util::FaceResult;

/// Resizes `src` to `width x height` with bilinear interpolation.
pub fn resize_bilinear(src: ImageView<'_>, width: usize, height: usize) -> FaceResult<OwnedImage> {
    let mut out = OwnedImage::zeros(width, height)?;

    let xs = sample_table(src.width(), width);
    let ys = sample_table(src.height(), height);
    let row_len = width * CHANNELS;
    let dst = out.data_mut();

    for (dy, &(y0, y1, fy)) in ys.iter().enumerate() {
        let (Some(row0), Some(row1)) = (src.row(y0), src.row(y1)) else {
            continue;
        };
        let dst_row = &mut dst[dy * row_len..(dy + 1) * row_len];
        for (dx, &(x0, x1, fx)) in xs.iter().enumerate() {
            for c in 0..CHANNELS {
                let a = row0[x0 * CHANNELS + c] as f32;
                let b = row0[x1 * CHANNELS + c] as f32;
                let p = row1[x0 * CHANNELS + c] as f32;
                let q = row1[x1 * CHANNELS + c] as f32;
                let top = a + (b - a) * fx;
                let bottom = p + (q - p) * fx;
                let value = top + (bottom - top) * fy;
                dst_row[dx * CHANNELS + c] = value.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    Ok(out)
}

/// Precomputes `(i0, i1, frac)` for each destination index along one axis.
fn sample_table(src_len: usize, dst_len: usize) -> Vec<(usize, usize, f32)> {
    let scale = src_len as f32 / dst_len as f32;
    let max = (src_len - 1) as f32;
    (0..dst_len)
        .map(|d| {
            let s = ((d as f32 + 0.5) * scale - 0.5).clamp(0.0, max);
            let i0 = s.floor() as usize;
            let i1 = (i0 + 1).min(src_len - 1);
            (i0, i1, s - i0 as f32)
        })
        .collect()
}
