//! Convenience helpers for loading and saving images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled. The detector and the
//! embedding network expect BGR input, so loaders return BGR buffers and the
//! saver converts back to RGB.

use crate::image::{swap_rb, ImageView, OwnedImage};
use crate::util::{FaceError, FaceResult};
use std::path::Path;

/// Creates a borrowed view from an RGB image buffer (channels stay RGB).
pub fn view_from_rgb_image(img: &image::RgbImage) -> FaceResult<ImageView<'_>> {
    ImageView::from_slice(img.as_raw(), img.width() as usize, img.height() as usize)
}

/// Converts a dynamic image into an owned BGR buffer.
pub fn owned_bgr_from_dynamic_image(img: &image::DynamicImage) -> FaceResult<OwnedImage> {
    let rgb = img.to_rgb8();
    Ok(swap_rb(view_from_rgb_image(&rgb)?))
}

/// Loads an image from disk as a BGR owned image.
pub fn load_bgr_image<P: AsRef<Path>>(path: P) -> FaceResult<OwnedImage> {
    let img = image::open(path).map_err(|err| FaceError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_bgr_from_dynamic_image(&img)
}

/// Saves a BGR image to disk; the format follows the file extension.
pub fn save_bgr_image<P: AsRef<Path>>(img: ImageView<'_>, path: P) -> FaceResult<()> {
    let rgb = swap_rb(img);
    let (width, height) = (rgb.width() as u32, rgb.height() as u32);
    let buffer = image::RgbImage::from_raw(width, height, rgb.into_raw()).ok_or(
        FaceError::BufferTooSmall {
            needed: (width * height * 3) as usize,
            got: 0,
        },
    )?;
    buffer.save(path).map_err(|err| FaceError::ImageIo {
        reason: err.to_string(),
    })
}
