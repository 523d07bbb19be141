//! Channel reordering.

use crate::image::{ImageView, OwnedImage, CHANNELS};

/// Swaps the first and third channel of every pixel (BGR <-> RGB).
pub fn swap_rb(src: ImageView<'_>) -> OwnedImage {
    let mut out = OwnedImage::from_view(src);
    for px in out.data_mut().chunks_exact_mut(CHANNELS) {
        px.swap(0, 2);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::swap_rb;
    use crate::image::OwnedImage;

    #[test]
    fn swap_is_an_involution() {
        let img = OwnedImage::new(vec![1, 2, 3, 4, 5, 6], 2, 1).unwrap();
        let swapped = swap_rb(img.view());
        assert_eq!(swapped.data(), &[3, 2, 1, 6, 5, 4]);
        assert_eq!(swap_rb(swapped.view()), img);
    }
}
