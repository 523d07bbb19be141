use faceverify::lowlevel::{crop_with_pad, resize_bilinear, swap_rb};
use faceverify::{FaceError, ImageView, ModelBundle, OwnedImage, Tensor};

#[test]
fn image_view_rejects_invalid_dimensions() {
    let data = [0u8; 12];

    let err = ImageView::from_slice(&data, 0, 1).err().unwrap();
    assert_eq!(
        err,
        FaceError::InvalidDimensions {
            width: 0,
            height: 1,
        }
    );

    let err = ImageView::from_slice(&data, 1, 0).err().unwrap();
    assert_eq!(
        err,
        FaceError::InvalidDimensions {
            width: 1,
            height: 0,
        }
    );
}

#[test]
fn image_view_rejects_invalid_stride() {
    let data = [0u8; 24];

    let err = ImageView::new(&data, 4, 1, 6).err().unwrap();
    assert_eq!(
        err,
        FaceError::InvalidStride {
            row_len: 12,
            stride: 6,
        }
    );
}

#[test]
fn image_view_rejects_small_buffer() {
    let data = [0u8; 9];

    let err = ImageView::new(&data, 2, 2, 6).err().unwrap();
    assert_eq!(err, FaceError::BufferTooSmall { needed: 12, got: 9 });
}

#[test]
fn strided_rows_skip_padding() {
    let data: Vec<u8> = (0u8..16).collect();
    let view = ImageView::new(&data, 2, 2, 8).unwrap();
    assert_eq!(view.row(1).unwrap(), &[8, 9, 10, 11, 12, 13]);
    assert_eq!(view.pixel(1, 0), Some([3, 4, 5]));
    assert_eq!(view.pixel(2, 0), None);
    let owned = OwnedImage::from_view(view);
    assert_eq!(owned.data(), &[0, 1, 2, 3, 4, 5, 8, 9, 10, 11, 12, 13]);
}

#[test]
fn owned_image_requires_exact_length() {
    assert!(OwnedImage::new(vec![0; 12], 2, 2).is_ok());
    assert_eq!(
        OwnedImage::new(vec![0; 11], 2, 2).unwrap_err(),
        FaceError::BufferTooSmall { needed: 12, got: 11 }
    );
    assert!(OwnedImage::new(vec![0; 13], 2, 2).is_err());
}

#[test]
fn primitives_compose_on_strided_views() {
    let data: Vec<u8> = (0..4 * 20).map(|v| v as u8).collect();
    let view = ImageView::new(&data, 3, 4, 20).unwrap();
    let crop = crop_with_pad(view, 1, 1, 0, 0).unwrap();
    assert_eq!((crop.width(), crop.height()), (3, 2));
    assert_eq!(crop.view().pixel(0, 0), Some([20, 21, 22]));

    let swapped = swap_rb(crop.view());
    assert_eq!(swapped.view().pixel(0, 0), Some([22, 21, 20]));

    let resized = resize_bilinear(view, 6, 8).unwrap();
    assert_eq!((resized.width(), resized.height()), (6, 8));
}

#[test]
fn tensor_rejects_mismatched_buffers() {
    assert_eq!(
        Tensor::new(vec![0.0; 5], 1, 2, 3).unwrap_err(),
        FaceError::BufferTooSmall { needed: 6, got: 5 }
    );
    let t = Tensor::from_values(vec![1.0, 2.0, 3.0]);
    assert_eq!((t.channels(), t.height(), t.width()), (3, 1, 1));
}

#[test]
fn model_bundle_lists_all_models() {
    let bundle = ModelBundle::new("models");
    let names: Vec<String> = ModelBundle::DETECTOR_STAGES
        .iter()
        .chain(std::iter::once(&ModelBundle::EMBEDDING))
        .map(|name| bundle.paths(name).0.display().to_string())
        .collect();
    assert_eq!(names.len(), 5);
    assert!(names[4].ends_with("mobilefacenet.param"));
}
