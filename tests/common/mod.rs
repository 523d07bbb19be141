#![allow(dead_code)]

use std::path::Path;

use faceverify::engine::blobs;
use faceverify::{
    BoundingBox, Embedder, FaceError, FaceResult, InferenceEngine, OwnedImage, Outputs,
    StageNetworks, Tensor,
};

pub const IMAGE_SIDE: usize = 200;
/// Bright square standing in for a face.
pub const FACE_REGION: BoundingBox = BoundingBox::new(70, 70, 129, 129);
/// Box the proposal stage regresses towards: the region plus a margin.
pub const FACE_TARGET: BoundingBox = BoundingBox::new(64, 64, 135, 135);
/// Relative landmark positions emitted by the fine stage.
pub const LANDMARK_FRACTIONS: [(f32, f32); 5] = [
    (0.3, 0.35),
    (0.7, 0.35),
    (0.5, 0.55),
    (0.35, 0.75),
    (0.65, 0.75),
];

/// Inference engine backed by a closure.
pub struct FnEngine<F>(pub F);

/// Closure engine type usable as a backend parameter for `load`.
pub type NoModelEngine = FnEngine<fn(&Tensor) -> FaceResult<Outputs>>;

impl<F> InferenceEngine for FnEngine<F>
where
    F: Fn(&Tensor) -> FaceResult<Outputs> + Send + Sync,
{
    fn load(param_path: &Path, _weights_path: &Path) -> FaceResult<Self> {
        Err(FaceError::ModelLoad {
            path: param_path.display().to_string(),
            reason: "closure engines cannot be loaded from disk".to_string(),
        })
    }

    fn infer(&self, input_name: &str, input: &Tensor) -> FaceResult<Outputs> {
        assert_eq!(input_name, blobs::INPUT);
        (self.0)(input)
    }
}

pub fn boxed<F>(f: F) -> Box<dyn InferenceEngine>
where
    F: Fn(&Tensor) -> FaceResult<Outputs> + Send + Sync + 'static,
{
    Box::new(FnEngine(f))
}

/// Black BGR image with a white square at `region`.
pub fn square_image(width: usize, height: usize, region: BoundingBox) -> OwnedImage {
    let mut data = vec![0u8; width * height * 3];
    for y in region.y0.max(0) as usize..=(region.y1 as usize).min(height - 1) {
        for x in region.x0.max(0) as usize..=(region.x1 as usize).min(width - 1) {
            let idx = (y * width + x) * 3;
            data[idx..idx + 3].copy_from_slice(&[255, 255, 255]);
        }
    }
    OwnedImage::new(data, width, height).unwrap()
}

pub fn blank_image(width: usize, height: usize) -> OwnedImage {
    OwnedImage::zeros(width, height).unwrap()
}

/// Fraction of positive values in channel 0 over a window.
fn bright_fraction(t: &Tensor, x0: usize, y0: usize, w: usize, h: usize) -> f32 {
    let mut bright = 0usize;
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            if t.at(0, y, x).unwrap_or(-1.0) > 0.0 {
                bright += 1;
            }
        }
    }
    bright as f32 / (w * h) as f32
}

fn two_class(face: f32) -> Tensor {
    Tensor::from_values(vec![1.0 - face, face])
}

/// Proposal network: fires on fully bright 12x12 windows and regresses each
/// window towards [`FACE_TARGET`].
pub fn proposal_net() -> Box<dyn InferenceEngine> {
    boxed(|input: &Tensor| {
        let (h, w) = (input.height(), input.width());
        let mh = (h - 12) / 2 + 1;
        let mw = (w - 12) / 2 + 1;
        let plane = mh * mw;
        let s = w as f32 / IMAGE_SIDE as f32;
        let mut prob = vec![0.0f32; 2 * plane];
        let mut reg = vec![0.0f32; 4 * plane];
        let t = FACE_TARGET;
        for r in 0..mh {
            for c in 0..mw {
                let idx = r * mw + c;
                let face = if bright_fraction(input, 2 * c, 2 * r, 12, 12) >= 0.99 {
                    0.95
                } else {
                    0.05
                };
                prob[idx] = 1.0 - face;
                prob[plane + idx] = face;
                let denom = 12.0 + s;
                reg[idx] = (t.x0 as f32 * s - (2 * c + 1) as f32) / denom;
                reg[plane + idx] = (t.y0 as f32 * s - (2 * r + 1) as f32) / denom;
                reg[2 * plane + idx] = (t.x1 as f32 * s - (2 * c + 13) as f32) / denom;
                reg[3 * plane + idx] = (t.y1 as f32 * s - (2 * r + 13) as f32) / denom;
            }
        }
        Ok(Outputs::new()
            .with(blobs::PROB, Tensor::new(prob, 2, mh, mw)?)
            .with(blobs::PROPOSAL_REGRESSION, Tensor::new(reg, 4, mh, mw)?))
    })
}

pub fn coarse_net() -> Box<dyn InferenceEngine> {
    boxed(|input: &Tensor| {
        let frac = bright_fraction(input, 0, 0, input.width(), input.height());
        let face = if frac > 0.5 { 0.9 } else { 0.1 };
        Ok(Outputs::new()
            .with(blobs::PROB, two_class(face))
            .with(blobs::REFINE_REGRESSION, Tensor::from_values(vec![0.0; 4])))
    })
}

pub fn fine_net() -> Box<dyn InferenceEngine> {
    boxed(|input: &Tensor| {
        let frac = bright_fraction(input, 0, 0, input.width(), input.height());
        let face = if frac > 0.5 { 0.95 } else { 0.1 };
        let mut points = vec![0.0f32; 10];
        for (i, (fx, fy)) in LANDMARK_FRACTIONS.iter().enumerate() {
            points[i] = *fx;
            points[i + 5] = *fy;
        }
        Ok(Outputs::new()
            .with(blobs::PROB, two_class(face))
            .with(blobs::OUTPUT_REGRESSION, Tensor::from_values(vec![0.0; 4]))
            .with(blobs::OUTPUT_LANDMARKS, Tensor::from_values(points)))
    })
}

/// Landmark network reporting `(dx, dy)` for every point.
pub fn landmark_net(dx: f32, dy: f32) -> Box<dyn InferenceEngine> {
    boxed(move |input: &Tensor| {
        assert_eq!(input.channels(), 15);
        let mut out = Outputs::new();
        for name in blobs::LANDMARK_OFFSETS {
            out.insert(name, Tensor::from_values(vec![dx, dy]));
        }
        Ok(out)
    })
}

pub fn stage_networks() -> StageNetworks {
    StageNetworks {
        proposal: proposal_net(),
        refine: coarse_net(),
        output: fine_net(),
        landmark: landmark_net(0.5, 0.5),
    }
}

/// Embedding network whose output depends only on the mean of each channel.
pub fn embedding_net() -> Box<dyn InferenceEngine> {
    boxed(|input: &Tensor| {
        assert_eq!((input.height(), input.width()), (112, 112));
        let means: Vec<f32> = (0..3)
            .map(|c| {
                let plane = input.channel(c).unwrap();
                plane.iter().sum::<f32>() / plane.len() as f32
            })
            .collect();
        let values = (0..128)
            .map(|i| 1.0 + means[i % 3] / 255.0 * (i as f32 + 1.0))
            .collect();
        Ok(Outputs::new().with(blobs::EMBEDDING, Tensor::from_values(values)))
    })
}

pub fn embedder() -> Embedder {
    Embedder::new(embedding_net())
}
