use faceverify::lowlevel::ScaleSchedule;

fn closed_form_levels(width: usize, height: usize, min_face: f64, factor: f64) -> usize {
    let first = width.min(height) as f64 * 12.0 / min_face;
    if first <= 12.0 {
        return 0;
    }
    // Smallest n with first * factor^n <= 12.
    ((12.0 / first).ln() / factor.ln()).ceil() as usize
}

#[test]
fn vga_schedule_matches_closed_form() {
    let s = ScaleSchedule::new(640, 480, 20.0, 0.709);
    assert_eq!(s.len(), closed_form_levels(640, 480, 20.0, 0.709f32 as f64));
    assert_eq!(s.len(), 10);
    assert!((s.scales()[0] - 0.6).abs() < 1e-9);
}

#[test]
fn scales_decrease_geometrically() {
    let s = ScaleSchedule::new(300, 200, 24.0, 0.5);
    let scales = s.scales();
    assert!(!scales.is_empty());
    for pair in scales.windows(2) {
        assert!((pair[1] / pair[0] - 0.5).abs() < 1e-9);
    }
    let last = *scales.last().unwrap();
    assert!(200.0 * last > 12.0);
    assert!(200.0 * last * 0.5 <= 12.0);
}

#[test]
fn larger_minimum_face_means_fewer_levels() {
    let small = ScaleSchedule::new(640, 480, 20.0, 0.709);
    let large = ScaleSchedule::new(640, 480, 80.0, 0.709);
    assert!(large.len() < small.len());
    assert!(ScaleSchedule::new(10, 500, 20.0, 0.709).is_empty());
}
