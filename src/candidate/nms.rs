//! Greedy non-maximum suppression over face candidates.

use std::cmp::Ordering;

use crate::candidate::FaceCandidate;
use crate::geometry::{overlap, OverlapMode};

fn score_desc(a: &FaceCandidate, b: &FaceCandidate) -> Ordering {
    b.score.total_cmp(&a.score)
}

/// Suppresses overlapping candidates in place.
///
/// Candidates are stably sorted by descending score. Walking that order, each
/// still-active candidate deactivates every later active candidate whose
/// overlap under `mode` is strictly greater than `threshold`. Survivors keep
/// their sorted order. Removal is tracked in a separate mask, so a score of
/// zero is an ordinary score here.
pub fn nms(candidates: &mut Vec<FaceCandidate>, threshold: f32, mode: OverlapMode) {
    if candidates.len() < 2 {
        return;
    }
    candidates.sort_by(score_desc);

    let mut active = vec![true; candidates.len()];
    for i in 0..candidates.len() {
        if !active[i] {
            continue;
        }
        let keep = candidates[i].bbox;
        for j in (i + 1)..candidates.len() {
            if active[j] && overlap(&keep, &candidates[j].bbox, mode) > threshold {
                active[j] = false;
            }
        }
    }

    let mut flags = active.into_iter();
    candidates.retain(|_| flags.next().unwrap_or(false));
}

#[cfg(test)]
mod tests {
    use super::nms;
    use crate::candidate::FaceCandidate;
    use crate::geometry::{BoundingBox, OverlapMode};

    #[test]
    fn keeps_higher_scored_duplicate() {
        let b = BoundingBox::new(10, 10, 40, 40);
        let mut c = vec![FaceCandidate::new(0.7, b), FaceCandidate::new(0.9, b)];
        nms(&mut c, 0.5, OverlapMode::Union);
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].score, 0.9);
    }

    #[test]
    fn zero_scores_are_not_treated_as_removed() {
        let mut c = vec![
            FaceCandidate::new(0.0, BoundingBox::new(0, 0, 10, 10)),
            FaceCandidate::new(0.0, BoundingBox::new(50, 50, 60, 60)),
        ];
        nms(&mut c, 0.5, OverlapMode::Union);
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn suppressed_box_does_not_suppress_others() {
        // b overlaps a and c, but a and c do not overlap each other.
        let a = FaceCandidate::new(0.9, BoundingBox::new(0, 0, 20, 20));
        let b = FaceCandidate::new(0.8, BoundingBox::new(5, 0, 25, 20));
        let c = FaceCandidate::new(0.7, BoundingBox::new(12, 0, 32, 20));
        let mut list = vec![c, b, a];
        nms(&mut list, 0.5, OverlapMode::Union);
        let scores: Vec<f32> = list.iter().map(|x| x.score).collect();
        assert_eq!(scores, vec![0.9, 0.7]);
    }
}
