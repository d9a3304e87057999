use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::detect::backend::DetectorBackend;
use crate::detect::result::{
    validate_detections, BoundingBox, Detection, DetectionResult, ImageDimensions,
};

const SYNTHETIC_LABELS: &[&str] = &["garbage", "garbage_bag", "waste", "trash"];

/// Stub backend for testing. Replays a fixed script of detections, one entry per
/// frame, cycling when the script runs out.
pub struct StubBackend {
    script: Vec<Vec<Detection>>,
    frame: usize,
}

impl StubBackend {
    pub fn new(script: Vec<Vec<Detection>>) -> Self {
        Self { script, frame: 0 }
    }

    /// A backend that never reports anything.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Seeded pseudo-random script: `frames` entries of 0..=`max_per_frame`
    /// detections inside `dims`. Same seed, same script.
    pub fn synthetic(seed: u64, frames: usize, max_per_frame: usize, dims: ImageDimensions) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut script = Vec::with_capacity(frames);
        if dims.width < 2 || dims.height < 2 {
            return Self::new(script);
        }
        for _ in 0..frames {
            let count = rng.gen_range(0..=max_per_frame);
            let mut frame = Vec::with_capacity(count);
            for _ in 0..count {
                let x1 = rng.gen_range(0..dims.width - 1) as i64;
                let y1 = rng.gen_range(0..dims.height - 1) as i64;
                let x2 = rng.gen_range(x1 + 1..=dims.width as i64);
                let y2 = rng.gen_range(y1 + 1..=dims.height as i64);
                let label = SYNTHETIC_LABELS[rng.gen_range(0..SYNTHETIC_LABELS.len())];
                let confidence = rng.gen_range(0.25f32..=1.0);
                // Corners are generated ordered and non-negative.
                if let Ok(bbox) = BoundingBox::new(x1, y1, x2, y2) {
                    if let Ok(det) = Detection::new(label, confidence, bbox) {
                        frame.push(det);
                    }
                }
            }
            script.push(frame);
        }
        Self::new(script)
    }

    pub fn frames_served(&self) -> usize {
        self.frame
    }
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::empty()
    }
}

impl DetectorBackend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&mut self, _pixels: &[u8], width: u32, height: u32) -> Result<DetectionResult> {
        let dims = ImageDimensions::new(height, width);
        let detections = if self.script.is_empty() {
            Vec::new()
        } else {
            self.script[self.frame % self.script.len()].clone()
        };
        self.frame += 1;

        validate_detections(&detections, dims)?;
        Ok(DetectionResult { dims, detections })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(label: &str, x1: i64, y1: i64, x2: i64, y2: i64) -> Detection {
        Detection::new(label, 0.9, BoundingBox::new(x1, y1, x2, y2).unwrap()).unwrap()
    }

    #[test]
    fn replays_script_cyclically() {
        let mut backend = StubBackend::new(vec![vec![det("waste", 0, 0, 5, 5)], vec![]]);
        assert_eq!(backend.detect(&[], 10, 10).unwrap().detections.len(), 1);
        assert_eq!(backend.detect(&[], 10, 10).unwrap().detections.len(), 0);
        assert_eq!(backend.detect(&[], 10, 10).unwrap().detections.len(), 1);
        assert_eq!(backend.frames_served(), 3);
    }

    #[test]
    fn rejects_script_that_overflows_frame() {
        let mut backend = StubBackend::new(vec![vec![det("waste", 0, 0, 50, 50)]]);
        assert!(backend.detect(&[], 10, 10).is_err());
    }

    #[test]
    fn synthetic_is_deterministic_and_in_bounds() {
        let dims = ImageDimensions::new(120, 160);
        let a = StubBackend::synthetic(7, 20, 6, dims);
        let b = StubBackend::synthetic(7, 20, 6, dims);
        assert_eq!(a.script, b.script);
        for frame in &a.script {
            assert!(frame.len() <= 6);
            assert!(validate_detections(frame, dims).is_ok());
        }
    }
}
