//! Multi-frame triage for recorded footage.
//!
//! Long recordings are decimated to at most `max_frames` analysed frames. Each
//! analysed frame is triaged on its own; the summary keeps running totals, the
//! set of categories seen, a handful of sample frames that had detections, and
//! the worst single-frame assessment.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::detect::{Detection, DetectorBackend, ImageDimensions};
use crate::error::TriageError;
use crate::severity::{classify_severity, CategoryBreakdown, SeverityAssessment};

pub const DEFAULT_MAX_FRAMES: usize = 100;
pub const MAX_SAMPLE_FRAMES: usize = 5;

/// Frames to step over between analysed frames: `max(1, total / max_frames)`.
pub fn frame_skip(total_frames: usize, max_frames: usize) -> Result<usize> {
    if max_frames == 0 {
        return Err(TriageError::InvalidArgument("max_frames must be > 0".to_string()).into());
    }
    Ok((total_frames / max_frames).max(1))
}

/// Indices of the frames that get analysed.
pub fn selected_frames(total_frames: usize, max_frames: usize) -> Result<Vec<usize>> {
    let skip = frame_skip(total_frames, max_frames)?;
    Ok((0..total_frames).step_by(skip).take(max_frames).collect())
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FootageSummary {
    pub frames_analyzed: usize,
    pub total_detections: usize,
    pub average_per_frame: f64,
    pub unique_categories: Vec<String>,
    pub category_counts: CategoryBreakdown,
    /// Source indices of the first frames that had detections.
    pub sample_frames: Vec<usize>,
    pub worst_frame: Option<usize>,
    pub worst_assessment: Option<SeverityAssessment>,
}

#[derive(Debug, Default)]
pub struct FootageAggregator {
    frames_analyzed: usize,
    total_detections: usize,
    categories: BTreeSet<String>,
    category_counts: CategoryBreakdown,
    sample_frames: Vec<usize>,
    worst: Option<(usize, SeverityAssessment)>,
}

impl FootageAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Triage one frame and fold it into the running summary.
    pub fn push_frame(
        &mut self,
        frame_index: usize,
        detections: &[Detection],
        dims: ImageDimensions,
    ) -> Result<SeverityAssessment> {
        let assessment = classify_severity(detections, dims)?;
        self.frames_analyzed += 1;
        self.total_detections += assessment.detection_count;
        for (label, count) in &assessment.category_counts {
            self.categories.insert(label.clone());
            *self.category_counts.entry(label.clone()).or_insert(0) += count;
        }
        if assessment.detection_count > 0 && self.sample_frames.len() < MAX_SAMPLE_FRAMES {
            self.sample_frames.push(frame_index);
        }
        // Ties keep the earliest frame.
        let is_worse = match &self.worst {
            None => true,
            Some((_, worst)) => assessment.severity_tier > worst.severity_tier,
        };
        if is_worse {
            self.worst = Some((frame_index, assessment.clone()));
        }
        Ok(assessment)
    }

    pub fn finish(self) -> FootageSummary {
        let average_per_frame = if self.frames_analyzed > 0 {
            self.total_detections as f64 / self.frames_analyzed as f64
        } else {
            0.0
        };
        let (worst_frame, worst_assessment) = match self.worst {
            Some((index, assessment)) => (Some(index), Some(assessment)),
            None => (None, None),
        };
        FootageSummary {
            frames_analyzed: self.frames_analyzed,
            total_detections: self.total_detections,
            average_per_frame,
            unique_categories: self.categories.into_iter().collect(),
            category_counts: self.category_counts,
            sample_frames: self.sample_frames,
            worst_frame,
            worst_assessment,
        }
    }
}

/// One decoded frame handed to a detector backend.
#[derive(Clone, Debug)]
pub struct Frame {
    pub pixels: Vec<u8>,
    pub dims: ImageDimensions,
}

/// Run `backend` over a decimated subset of `frames` and summarise.
pub fn analyze_footage(
    backend: &mut dyn DetectorBackend,
    frames: &[Frame],
    max_frames: usize,
) -> Result<FootageSummary> {
    let selected = selected_frames(frames.len(), max_frames)?;
    log::info!(
        "analysing {} of {} frames with backend '{}'",
        selected.len(),
        frames.len(),
        backend.name()
    );
    backend.warm_up()?;

    let mut aggregator = FootageAggregator::new();
    for index in selected {
        let frame = &frames[index];
        let result = backend.detect(&frame.pixels, frame.dims.width, frame.dims.height)?;
        aggregator.push_frame(index, &result.detections, result.dims)?;
    }
    Ok(aggregator.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{BoundingBox, StubBackend};
    use crate::severity::SeverityTier;

    fn det(label: &str, x1: i64, y1: i64, x2: i64, y2: i64) -> Detection {
        Detection::new(label, 0.8, BoundingBox::new(x1, y1, x2, y2).unwrap()).unwrap()
    }

    #[test]
    fn frame_skip_never_drops_below_one() {
        assert_eq!(frame_skip(50, 100).unwrap(), 1);
        assert_eq!(frame_skip(1000, 100).unwrap(), 10);
        assert_eq!(frame_skip(1099, 100).unwrap(), 10);
        assert!(frame_skip(10, 0).is_err());
    }

    #[test]
    fn selection_is_capped() {
        let picked = selected_frames(1099, 100).unwrap();
        assert_eq!(picked.len(), 100);
        assert_eq!(picked[1], 10);
        assert_eq!(selected_frames(3, 100).unwrap(), vec![0, 1, 2]);
        assert!(selected_frames(0, 10).unwrap().is_empty());
    }

    #[test]
    fn aggregates_across_frames() {
        let dims = ImageDimensions::new(100, 100);
        let mut agg = FootageAggregator::new();
        agg.push_frame(0, &[], dims).unwrap();
        agg.push_frame(3, &[det("trash", 0, 0, 10, 10)], dims).unwrap();
        agg.push_frame(
            6,
            &[
                det("garbage", 0, 0, 50, 50),
                det("garbage", 50, 50, 100, 100),
                det("waste", 0, 50, 50, 100),
            ],
            dims,
        )
        .unwrap();

        let summary = agg.finish();
        assert_eq!(summary.frames_analyzed, 3);
        assert_eq!(summary.total_detections, 4);
        assert!((summary.average_per_frame - 4.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.unique_categories, vec!["garbage", "trash", "waste"]);
        assert_eq!(summary.category_counts.get("garbage"), Some(&2));
        assert_eq!(summary.sample_frames, vec![3, 6]);
        assert_eq!(summary.worst_frame, Some(6));
        assert_eq!(
            summary.worst_assessment.map(|a| a.severity_tier),
            Some(SeverityTier::Moderate)
        );
    }

    #[test]
    fn sample_frames_are_capped() {
        let dims = ImageDimensions::new(10, 10);
        let mut agg = FootageAggregator::new();
        for i in 0..9 {
            agg.push_frame(i, &[det("c", 0, 0, 1, 1)], dims).unwrap();
        }
        let summary = agg.finish();
        assert_eq!(summary.sample_frames, vec![0, 1, 2, 3, 4]);
        assert_eq!(summary.worst_frame, Some(0));
    }

    #[test]
    fn empty_footage_summary() {
        let summary = FootageAggregator::new().finish();
        assert_eq!(summary.frames_analyzed, 0);
        assert_eq!(summary.average_per_frame, 0.0);
        assert!(summary.worst_assessment.is_none());
    }

    #[test]
    fn drives_backend_over_decimated_frames() {
        let dims = ImageDimensions::new(20, 20);
        let frames: Vec<Frame> = (0..30)
            .map(|_| Frame {
                pixels: vec![0u8; 20 * 20 * 3],
                dims,
            })
            .collect();
        let mut backend = StubBackend::new(vec![vec![det("waste", 0, 0, 5, 5)], vec![]]);
        let summary = analyze_footage(&mut backend, &frames, 10).unwrap();
        assert_eq!(summary.frames_analyzed, 10);
        assert_eq!(summary.total_detections, 5);
        assert_eq!(summary.sample_frames, vec![0, 6, 12, 18, 24]);
        assert_eq!(backend.frames_served(), 10);
    }
}
