//! Interleaved 3-channel image buffers and the pixel primitives the cascade
//! consumes.
//!
//! `ImageView` is a borrowed 2D view into a 1D byte buffer with an explicit
//! stride. Pixels are stored as interleaved triplets; the stride counts bytes
//! between the starts of consecutive rows, so a stride larger than
//! `3 * width` represents padded rows. Channel order is whatever the caller
//! supplies (the reference models expect BGR); [`swap_rb`] converts between
//! BGR and RGB.

use crate::util::{FaceError, FaceResult};

mod border;
mod color;
#[cfg(feature = "image-io")]
pub mod io;
mod resize;
mod warp;

pub use border::crop_with_pad;
pub use color::swap_rb;
pub use resize::resize_bilinear;
pub use warp::warp_affine;

/// Number of interleaved channels per pixel.
pub const CHANNELS: usize = 3;

/// Borrowed 3-channel image view with an explicit row stride in bytes.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a> ImageView<'a> {
    /// Creates a contiguous view with `stride == 3 * width`.
    pub fn from_slice(data: &'a [u8], width: usize, height: usize) -> FaceResult<Self> {
        let stride = width
            .checked_mul(CHANNELS)
            .ok_or(FaceError::InvalidDimensions { width, height })?;
        Self::new(data, width, height, stride)
    }

    /// Creates a view with an explicit stride in bytes.
    pub fn new(data: &'a [u8], width: usize, height: usize, stride: usize) -> FaceResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(FaceError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in bytes between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [u8] {
        self.data
    }

    /// Returns the interleaved bytes of row `y` (length `3 * width`).
    pub fn row(&self, y: usize) -> Option<&'a [u8]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width * CHANNELS)?;
        self.data.get(start..end)
    }

    /// Returns the pixel at `(x, y)` if it is within bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; CHANNELS]> {
        if x >= self.width {
            return None;
        }
        let row = self.row(y)?;
        let base = x * CHANNELS;
        Some([row[base], row[base + 1], row[base + 2]])
    }
}

/// Owned contiguous 3-channel image buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct OwnedImage {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl OwnedImage {
    /// Wraps an interleaved buffer of exactly `3 * width * height` bytes.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> FaceResult<Self> {
        let needed = required_len(width, height, width * CHANNELS)?;
        if data.len() < needed {
            return Err(FaceError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(FaceError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Creates a black image.
    pub fn zeros(width: usize, height: usize) -> FaceResult<Self> {
        let len = required_len(width, height, width * CHANNELS)?;
        Ok(Self {
            data: vec![0u8; len],
            width,
            height,
        })
    }

    /// Copies a possibly strided view into a contiguous buffer.
    pub fn from_view(view: ImageView<'_>) -> Self {
        let row_len = view.width() * CHANNELS;
        let mut data = Vec::with_capacity(row_len * view.height());
        for y in 0..view.height() {
            if let Some(row) = view.row(y) {
                data.extend_from_slice(row);
            }
        }
        Self {
            data,
            width: view.width(),
            height: view.height(),
        }
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> ImageView<'_> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width * CHANNELS,
        }
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the interleaved pixel data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consumes the image and returns its interleaved buffer.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> FaceResult<usize> {
    if width == 0 || height == 0 {
        return Err(FaceError::InvalidDimensions { width, height });
    }
    let row_len = width
        .checked_mul(CHANNELS)
        .ok_or(FaceError::InvalidDimensions { width, height })?;
    if stride < row_len {
        return Err(FaceError::InvalidStride { row_len, stride });
    }
    (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(row_len))
        .ok_or(FaceError::InvalidDimensions { width, height })
}
