//! Dense planar float tensors exchanged with inference engines.
//!
//! A [`Tensor`] is a `channels x height x width` buffer in channel-major
//! order, the layout stage networks consume. [`Outputs`] maps output blob
//! names to tensors and turns missing or short outputs into errors.

use std::collections::HashMap;

use crate::image::{ImageView, CHANNELS};
use crate::util::{FaceError, FaceResult};

/// Per-channel mean subtracted before feeding detector stages.
pub const DETECTOR_MEAN: f32 = 127.5;
/// Scale applied after mean subtraction for detector stages.
pub const DETECTOR_SCALE: f32 = 0.007_812_5;

/// Channel-major float tensor.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    data: Vec<f32>,
    channels: usize,
    height: usize,
    width: usize,
}

impl Tensor {
    /// Wraps `data` laid out as `channels x height x width`.
    pub fn new(data: Vec<f32>, channels: usize, height: usize, width: usize) -> FaceResult<Self> {
        let needed = channels
            .checked_mul(height)
            .and_then(|v| v.checked_mul(width))
            .ok_or(FaceError::InvalidDimensions { width, height })?;
        if data.len() != needed {
            return Err(FaceError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            channels,
            height,
            width,
        })
    }

    /// Builds a flat `n x 1 x 1` tensor, the shape of fully-connected outputs.
    pub fn from_values(values: Vec<f32>) -> Self {
        let channels = values.len();
        Self {
            data: values,
            channels,
            height: 1,
            width: 1,
        }
    }

    /// Converts an interleaved image to a planar tensor, mapping every byte
    /// `v` to `(v - mean) * scale`.
    pub fn from_image(img: ImageView<'_>, mean: f32, scale: f32) -> Self {
        let (width, height) = (img.width(), img.height());
        let plane = width * height;
        let mut data = vec![0.0f32; plane * CHANNELS];
        for y in 0..height {
            let Some(row) = img.row(y) else {
                continue;
            };
            for (x, px) in row.chunks_exact(CHANNELS).enumerate() {
                for (c, &v) in px.iter().enumerate() {
                    data[c * plane + y * width + x] = (v as f32 - mean) * scale;
                }
            }
        }
        Self {
            data,
            channels: CHANNELS,
            height,
            width,
        }
    }

    /// Concatenates tensors of equal spatial size along the channel axis.
    pub fn stack_channels(parts: &[Tensor]) -> FaceResult<Self> {
        let Some(first) = parts.first() else {
            return Err(FaceError::InvalidDimensions {
                width: 0,
                height: 0,
            });
        };
        let (height, width) = (first.height, first.width);
        let mut data = Vec::with_capacity(parts.iter().map(|t| t.data.len()).sum());
        let mut channels = 0;
        for part in parts {
            if part.height != height || part.width != width {
                return Err(FaceError::InvalidDimensions {
                    width: part.width,
                    height: part.height,
                });
            }
            data.extend_from_slice(&part.data);
            channels += part.channels;
        }
        Ok(Self {
            data,
            channels,
            height,
            width,
        })
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Spatial height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Spatial width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Total number of values.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` when the tensor holds no values.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// All values in channel-major order.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// The `height * width` plane of channel `c`.
    pub fn channel(&self, c: usize) -> Option<&[f32]> {
        if c >= self.channels {
            return None;
        }
        let plane = self.height * self.width;
        self.data.get(c * plane..(c + 1) * plane)
    }

    /// Value at `(c, y, x)`.
    pub fn at(&self, c: usize, y: usize, x: usize) -> Option<f32> {
        if y >= self.height || x >= self.width {
            return None;
        }
        self.channel(c).map(|plane| plane[y * self.width + x])
    }
}

/// Named output tensors of a single inference call.
#[derive(Clone, Debug, Default)]
pub struct Outputs {
    tensors: HashMap<String, Tensor>,
}

impl Outputs {
    /// Creates an empty output set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `tensor` under `name`, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, tensor: Tensor) {
        self.tensors.insert(name.into(), tensor);
    }

    /// Builder-style [`Outputs::insert`].
    pub fn with(mut self, name: impl Into<String>, tensor: Tensor) -> Self {
        self.insert(name, tensor);
        self
    }

    /// Looks up an output by name.
    pub fn get(&self, name: &str) -> FaceResult<&Tensor> {
        self.tensors.get(name).ok_or_else(|| FaceError::MissingOutput {
            name: name.to_string(),
        })
    }

    /// Returns the values of `name`, requiring at least `min_len` of them.
    pub fn values(&self, name: &str, min_len: usize) -> FaceResult<&[f32]> {
        let tensor = self.get(name)?;
        if tensor.len() < min_len {
            return Err(FaceError::TensorShape {
                name: name.to_string(),
                expected: min_len,
                got: tensor.len(),
            });
        }
        Ok(tensor.as_slice())
    }

    /// Returns output `name` requiring at least `channels` channels.
    pub fn map(&self, name: &str, channels: usize) -> FaceResult<&Tensor> {
        let tensor = self.get(name)?;
        if tensor.channels() < channels {
            return Err(FaceError::TensorShape {
                name: name.to_string(),
                expected: channels,
                got: tensor.channels(),
            });
        }
        Ok(tensor)
    }
}
