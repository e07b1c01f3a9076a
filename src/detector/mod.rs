//! Multi-scale sliding-window scanning over a trained [`Cascade`], plus the
//! non-maximum suppression pass that collapses overlapping detections.
use crate::cascade::geometry::{crop_resize, iou, GrayImage, Rect};
use crate::cascade::Cascade;
use crate::error::Result;
use crate::sample::ImageSample;
use crate::weak_learner::StumpOutput;

/// A surviving window: its location and the cascade's confidence (the last
/// stage's post-threshold score).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub rect: Rect,
    pub confidence: f64,
}

/// Scan `image` at every window position and scale, evaluating `cascade`
/// stage by stage and keeping windows that clear every stage, then apply
/// non-maximum suppression to the survivors.
///
/// The window starts at `cascade.window()` pixels, advances in steps of
/// `delta` pixels, and grows by a factor of 1.25 after each full pass, down
/// to the shorter image dimension. Each candidate window is cropped and
/// resized (nearest-neighbor, same path the trainer uses) back down to the
/// cascade's training size before evaluation, rather than rescaling the
/// integral-image queries in place.
pub fn scan<O: StumpOutput>(cascade: &Cascade<O>, image: &GrayImage, delta: usize) -> Result<Vec<Detection>> {
    let window = cascade.window();
    let min_dim = image.height.min(image.width);

    let mut candidates = Vec::new();
    let mut size = window;
    let mut step = delta.max(1);

    while size < min_dim {
        let mut y = 0;
        while y + size <= image.height {
            let mut x = 0;
            while x + size <= image.width {
                let rect = Rect::square(x, y, size);
                let grid = crop_resize(image, &rect, window);
                let sample = ImageSample::from_grid(&grid, window, window, 1);
                if let Some(confidence) = cascade.evaluate(&sample)? {
                    candidates.push(Detection { rect, confidence });
                }
                x += step;
            }
            y += step;
        }
        size = ((size as f64) * 1.25).round() as usize;
        step = ((step as f64) * 1.25).round().max(1.0) as usize;
    }

    Ok(non_max_suppression(candidates))
}

/// Repeatedly accept the highest-confidence remaining rectangle and drop
/// every other rectangle whose IoU against it exceeds `0.1`.
pub fn non_max_suppression(mut candidates: Vec<Detection>) -> Vec<Detection> {
    let mut accepted = Vec::new();
    while let Some((best_idx, _)) =
        candidates.iter().enumerate().max_by(|(_, a), (_, b)| a.confidence.partial_cmp(&b.confidence).unwrap())
    {
        let best = candidates.remove(best_idx);
        candidates.retain(|d| iou(&d.rect, &best.rect) <= 0.1);
        accepted.push(best);
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nms_keeps_only_the_best_of_overlapping_windows() {
        let a = Detection { rect: Rect::square(0, 0, 10), confidence: 2.0 };
        let b = Detection { rect: Rect::square(1, 1, 10), confidence: 5.0 };
        let c = Detection { rect: Rect::square(50, 50, 10), confidence: 1.0 };

        let kept = non_max_suppression(vec![a, b, c]);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().any(|d| d.confidence == 5.0));
        assert!(kept.iter().any(|d| d.confidence == 1.0));
    }

    #[test]
    fn nms_is_idempotent() {
        let dets = vec![
            Detection { rect: Rect::square(0, 0, 10), confidence: 2.0 },
            Detection { rect: Rect::square(40, 40, 10), confidence: 5.0 },
        ];
        let once = non_max_suppression(dets);
        let twice = non_max_suppression(once.clone());
        assert_eq!(once.len(), twice.len());
    }
}
