//! Cropping with implicit zero padding.

use crate::image::{ImageView, OwnedImage, CHANNELS};
use crate::util::{FaceError, FaceResult};

/// Cuts `top`, `bottom`, `left` and `right` pixels off the borders of `src`.
///
/// Negative amounts grow the image instead; the added region is zero-filled.
/// The output is `(width - left - right) x (height - top - bottom)` and must
/// be non-empty.
pub fn crop_with_pad(
    src: ImageView<'_>,
    top: i32,
    bottom: i32,
    left: i32,
    right: i32,
) -> FaceResult<OwnedImage> {
    let out_w = src.width() as i64 - left as i64 - right as i64;
    let out_h = src.height() as i64 - top as i64 - bottom as i64;
    if out_w <= 0 || out_h <= 0 {
        return Err(FaceError::InvalidDimensions {
            width: out_w.max(0) as usize,
            height: out_h.max(0) as usize,
        });
    }
    let (out_w, out_h) = (out_w as usize, out_h as usize);
    let mut out = OwnedImage::zeros(out_w, out_h)?;
    let row_len = out_w * CHANNELS;
    let dst = out.data_mut();

    // Overlap of the output window with the source, in output coordinates.
    let x_start = (-(left as i64)).clamp(0, out_w as i64) as usize;
    let x_end = (src.width() as i64 - left as i64).clamp(0, out_w as i64) as usize;
    if x_start >= x_end {
        return Ok(out);
    }
    let src_x0 = (x_start as i64 + left as i64) as usize;
    let span = (x_end - x_start) * CHANNELS;

    for oy in 0..out_h {
        let sy = oy as i64 + top as i64;
        if sy < 0 || sy >= src.height() as i64 {
            continue;
        }
        let Some(row) = src.row(sy as usize) else {
            continue;
        };
        let src_start = src_x0 * CHANNELS;
        let dst_start = oy * row_len + x_start * CHANNELS;
        dst[dst_start..dst_start + span].copy_from_slice(&row[src_start..src_start + span]);
    }

    Ok(out)
}
