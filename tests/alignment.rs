use faceverify::lowlevel::{estimate_similarity, warp_affine, MAX_ITERATIONS};
use faceverify::{
    align_face, AffineMatrix, AlignmentTemplate, BoundingBox, FaceCandidate, FaceError,
    OwnedImage, Point,
};

fn transformed(points: &[Point; 5], m: &AffineMatrix) -> [Point; 5] {
    points.map(|p| m.apply_point(p))
}

#[test]
fn template_against_itself_is_identity() {
    for template in [AlignmentTemplate::ARCFACE_96, AlignmentTemplate::ARCFACE_112] {
        let pts = template.points();
        let fit = estimate_similarity(pts, pts).unwrap();
        assert!((fit.scale - 1.0).abs() < 1e-3);
        assert!(fit.theta.abs() < 1e-3);
        let (tx, ty) = fit.matrix.translation();
        assert!(tx.abs() < 1e-3 && ty.abs() < 1e-3, "translation ({tx}, {ty})");
    }
}

#[test]
fn recovers_a_known_similarity() {
    let dst = *AlignmentTemplate::ARCFACE_112.points();
    // Source landmarks: the template pushed through the inverse of a
    // rotation + scale + shift, so fitting must return that transform.
    let forward = AffineMatrix::similarity(0.45, 0.2, -30.0, 12.0);
    let inverse = forward.invert().unwrap();
    let src = transformed(&dst, &inverse);

    let fit = estimate_similarity(&src, &dst).unwrap();
    assert!(fit.iterations <= MAX_ITERATIONS);
    assert!((fit.scale - 0.45).abs() < 1e-3, "scale {}", fit.scale);
    assert!((fit.theta - 0.2).abs() < 1e-3, "theta {}", fit.theta);
    for (s, d) in src.iter().zip(dst.iter()) {
        let p = fit.matrix.apply_point(*s);
        assert!((p.x - d.x).abs() < 0.05 && (p.y - d.y).abs() < 0.05);
    }
}

#[test]
fn noisy_landmarks_still_converge() {
    let dst = *AlignmentTemplate::ARCFACE_112.points();
    let src = [
        Point::new(141.0, 203.0),
        Point::new(212.5, 198.0),
        Point::new(178.0, 246.0),
        Point::new(150.0, 285.0),
        Point::new(207.0, 281.5),
    ];
    let fit = estimate_similarity(&src, &dst).unwrap();
    assert!(fit.loss.is_finite());
    assert!(fit.scale > 0.3 && fit.scale < 0.7);
    assert!(fit.theta.abs() < 0.2);
    // The transform is a pure similarity.
    let m = fit.matrix.as_array();
    assert!((m[0] - m[4]).abs() < 1e-5);
    assert!((m[1] + m[3]).abs() < 1e-5);
}

#[test]
fn degenerate_landmarks_fail_fast() {
    let dst = *AlignmentTemplate::ARCFACE_112.points();
    let collapsed = [Point::new(5.0, 5.0); 5];
    assert!(matches!(
        estimate_similarity(&collapsed, &dst),
        Err(FaceError::DegenerateLandmarks { .. })
    ));

    let face = FaceCandidate::new(0.9, BoundingBox::new(0, 0, 20, 20));
    let image = OwnedImage::zeros(32, 32).unwrap();
    assert!(matches!(
        align_face(image.view(), &face, &AlignmentTemplate::default()),
        Err(FaceError::DegenerateLandmarks { .. })
    ));
}

#[test]
fn aligned_crop_has_template_size_and_moves_landmarks() {
    let (w, h) = (160usize, 160usize);
    let mut data = vec![0u8; w * h * 3];
    for y in 0..h {
        for x in 0..w {
            let idx = (y * w + x) * 3;
            data[idx] = (x * 255 / w) as u8;
            data[idx + 1] = (y * 255 / h) as u8;
            data[idx + 2] = 128;
        }
    }
    let image = OwnedImage::new(data, w, h).unwrap();

    let template = AlignmentTemplate::ARCFACE_112;
    let shift = AffineMatrix::new([1.0, 0.0, 20.0, 0.0, 1.0, 15.0]);
    let mut face = FaceCandidate::new(0.99, BoundingBox::new(20, 15, 132, 127));
    face.landmarks = transformed(template.points(), &shift);

    let aligned = align_face(image.view(), &face, &template).unwrap();
    assert_eq!((aligned.width(), aligned.height()), (112, 112));

    // A pure translation: the crop equals the shifted window of the source.
    let direct = warp_affine(
        image.view(),
        &AffineMatrix::new([1.0, 0.0, -20.0, 0.0, 1.0, -15.0]),
        112,
        112,
    )
    .unwrap();
    let max_diff = aligned
        .data()
        .iter()
        .zip(direct.data())
        .map(|(a, b)| (*a as i32 - *b as i32).abs())
        .max()
        .unwrap();
    assert!(max_diff <= 2, "max pixel difference {max_diff}");
}
