//! Detection aggregation and severity triage.
//!
//! A severity tier is a pure function of `(detection_count, coverage_percent)`.
//! The rules are evaluated in order and the first match wins:
//!
//! 1. no detections: `Clean`
//! 2. fewer than 3 detections OR coverage below 5%: `Light`
//! 3. fewer than 8 detections OR coverage below 15%: `Moderate`
//! 4. otherwise: `Severe`
//!
//! The OR makes a low count sufficient for `Light` even when the boxes cover most
//! of the frame. Coverage sums box areas, so overlapping boxes count twice.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::detect::{validate_detections, Detection, ImageDimensions};
use crate::error::TriageError;

pub const LIGHT_COUNT_BELOW: usize = 3;
pub const LIGHT_COVERAGE_BELOW: f64 = 5.0;
pub const MODERATE_COUNT_BELOW: usize = 8;
pub const MODERATE_COVERAGE_BELOW: f64 = 15.0;

/// Confidence threshold the dashboards used by default.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.25;

/// Occurrences per category label.
pub type CategoryBreakdown = BTreeMap<String, usize>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    Clean,
    Light,
    Moderate,
    Severe,
}

impl SeverityTier {
    pub fn from_metrics(detection_count: usize, coverage_percent: f64) -> Self {
        if detection_count == 0 {
            SeverityTier::Clean
        } else if detection_count < LIGHT_COUNT_BELOW || coverage_percent < LIGHT_COVERAGE_BELOW {
            SeverityTier::Light
        } else if detection_count < MODERATE_COUNT_BELOW
            || coverage_percent < MODERATE_COVERAGE_BELOW
        {
            SeverityTier::Moderate
        } else {
            SeverityTier::Severe
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            SeverityTier::Clean => "Area appears clean. Regular monitoring recommended.",
            SeverityTier::Light => "Minor waste detected. Schedule routine cleanup.",
            SeverityTier::Moderate => {
                "Moderate waste detected. Schedule cleanup within 24-48 hours."
            }
            SeverityTier::Severe => "High waste concentration! Immediate cleanup required.",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SeverityTier::Clean => "Clean",
            SeverityTier::Light => "Light",
            SeverityTier::Moderate => "Moderate",
            SeverityTier::Severe => "Severe",
        }
    }

    /// Status colour used when surfacing the tier.
    pub fn status_color(&self) -> &'static str {
        match self {
            SeverityTier::Clean => "green",
            SeverityTier::Light | SeverityTier::Moderate => "orange",
            SeverityTier::Severe => "red",
        }
    }
}

impl std::fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of triaging one frame. Computed fresh per request, never persisted here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeverityAssessment {
    #[serde(rename = "count")]
    pub detection_count: usize,
    pub total_detection_area: u64,
    pub coverage_percent: f64,
    pub severity_tier: SeverityTier,
    #[serde(rename = "recommendation")]
    pub recommendation_text: String,
    pub category_counts: CategoryBreakdown,
}

pub fn aggregate_categories(detections: &[Detection]) -> CategoryBreakdown {
    let mut counts = CategoryBreakdown::new();
    for det in detections {
        *counts.entry(det.label().to_string()).or_insert(0) += 1;
    }
    counts
}

/// Sum of box areas in pixels². Overlaps are not merged.
pub fn total_detection_area(detections: &[Detection]) -> u64 {
    detections.iter().map(|d| d.bounding_box().area()).sum()
}

/// Summed box area as a percentage of the frame; 0.0 for an empty frame.
pub fn compute_coverage(detections: &[Detection], dims: ImageDimensions) -> f64 {
    let image_area = dims.area();
    if image_area == 0 {
        return 0.0;
    }
    total_detection_area(detections) as f64 / image_area as f64 * 100.0
}

/// Validate the detections against the frame, then triage them.
pub fn classify_severity(
    detections: &[Detection],
    dims: ImageDimensions,
) -> Result<SeverityAssessment> {
    validate_detections(detections, dims)?;
    if detections.is_empty() {
        log::debug!("empty detection list, assessing as clean");
    }

    let detection_count = detections.len();
    let total_area = total_detection_area(detections);
    let coverage_percent = compute_coverage(detections, dims);
    let severity_tier = SeverityTier::from_metrics(detection_count, coverage_percent);
    log::debug!(
        "triage: count={} coverage={:.2}% tier={}",
        detection_count,
        coverage_percent,
        severity_tier
    );

    Ok(SeverityAssessment {
        detection_count,
        total_detection_area: total_area,
        coverage_percent,
        severity_tier,
        recommendation_text: severity_tier.recommendation().to_string(),
        category_counts: aggregate_categories(detections),
    })
}

/// Keep detections at or above `min_confidence`.
pub fn filter_by_confidence(detections: &[Detection], min_confidence: f32) -> Result<Vec<Detection>> {
    if !(0.0..=1.0).contains(&min_confidence) {
        return Err(TriageError::InvalidArgument(format!(
            "min_confidence {} outside [0, 1]",
            min_confidence
        ))
        .into());
    }
    Ok(detections
        .iter()
        .filter(|d| d.confidence() >= min_confidence)
        .cloned()
        .collect())
}

/// `garbage_bag` -> `Garbage Bag`.
pub fn display_label(label: &str) -> String {
    label
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::BoundingBox;

    fn det(label: &str, confidence: f32, bbox: (i64, i64, i64, i64)) -> Detection {
        let (x1, y1, x2, y2) = bbox;
        Detection::new(label, confidence, BoundingBox::new(x1, y1, x2, y2).unwrap()).unwrap()
    }

    #[test]
    fn zero_count_is_clean_regardless_of_coverage() {
        assert_eq!(SeverityTier::from_metrics(0, 0.0), SeverityTier::Clean);
        assert_eq!(SeverityTier::from_metrics(0, 99.0), SeverityTier::Clean);
    }

    #[test]
    fn boundary_table() {
        assert_eq!(SeverityTier::from_metrics(2, 4.9), SeverityTier::Light);
        assert_eq!(SeverityTier::from_metrics(3, 4.9), SeverityTier::Light);
        assert_eq!(SeverityTier::from_metrics(3, 5.0), SeverityTier::Moderate);
        assert_eq!(SeverityTier::from_metrics(7, 40.0), SeverityTier::Moderate);
        assert_eq!(SeverityTier::from_metrics(8, 14.9), SeverityTier::Moderate);
        assert_eq!(SeverityTier::from_metrics(8, 15.0), SeverityTier::Severe);
    }

    #[test]
    fn low_count_short_circuits_to_light_even_at_high_coverage() {
        assert_eq!(SeverityTier::from_metrics(1, 95.0), SeverityTier::Light);
    }

    #[test]
    fn end_to_end_example() {
        let dets = vec![
            det("garbage", 0.9, (10, 10, 50, 50)),
            det("trash", 0.8, (60, 60, 120, 130)),
        ];
        let assessment = classify_severity(&dets, ImageDimensions::new(200, 200)).unwrap();
        assert_eq!(assessment.detection_count, 2);
        assert_eq!(assessment.total_detection_area, 6500);
        assert!((assessment.coverage_percent - 16.25).abs() < 1e-9);
        assert_eq!(assessment.severity_tier, SeverityTier::Light);
        assert_eq!(
            assessment.recommendation_text,
            "Minor waste detected. Schedule routine cleanup."
        );
        assert_eq!(assessment.category_counts.get("garbage"), Some(&1));
        assert_eq!(assessment.category_counts.get("trash"), Some(&1));
    }

    #[test]
    fn overlapping_boxes_are_double_counted() {
        let dets = vec![
            det("waste", 0.5, (0, 0, 10, 10)),
            det("waste", 0.5, (0, 0, 10, 10)),
        ];
        assert_eq!(total_detection_area(&dets), 200);
        let coverage = compute_coverage(&dets, ImageDimensions::new(10, 10));
        assert!((coverage - 200.0).abs() < 1e-9);
    }

    #[test]
    fn coverage_on_zero_sized_frame_is_zero() {
        let dets = vec![det("waste", 0.5, (0, 0, 10, 10))];
        assert_eq!(compute_coverage(&dets, ImageDimensions::new(0, 100)), 0.0);
        assert_eq!(compute_coverage(&dets, ImageDimensions::new(100, 0)), 0.0);
    }

    #[test]
    fn severe_frame() {
        let dets: Vec<Detection> = (0..8)
            .map(|i| det("garbage_bag", 0.7, (i * 10, 0, i * 10 + 10, 20)))
            .collect();
        let assessment = classify_severity(&dets, ImageDimensions::new(20, 80)).unwrap();
        assert_eq!(assessment.severity_tier, SeverityTier::Severe);
        assert_eq!(assessment.category_counts.get("garbage_bag"), Some(&8));
        assert_eq!(assessment.severity_tier.status_color(), "red");
    }

    #[test]
    fn classification_is_deterministic() {
        let dets = vec![det("c", 0.4, (5, 5, 25, 30)), det("0", 0.6, (1, 1, 2, 2))];
        let dims = ImageDimensions::new(64, 64);
        let first = classify_severity(&dets, dims).unwrap();
        for _ in 0..10 {
            assert_eq!(classify_severity(&dets, dims).unwrap(), first);
        }
    }

    #[test]
    fn out_of_bounds_detection_is_rejected() {
        let dets = vec![det("waste", 0.5, (0, 0, 300, 10))];
        let err = classify_severity(&dets, ImageDimensions::new(200, 200)).unwrap_err();
        let typed = err.downcast_ref::<TriageError>().unwrap();
        assert_eq!(typed.code(), "INVALID_DETECTION");
    }

    #[test]
    fn empty_list_on_empty_frame_is_clean() {
        let assessment = classify_severity(&[], ImageDimensions::new(0, 0)).unwrap();
        assert_eq!(assessment.severity_tier, SeverityTier::Clean);
        assert_eq!(assessment.coverage_percent, 0.0);
        assert!(assessment.category_counts.is_empty());
    }

    #[test]
    fn confidence_filter() {
        let dets = vec![
            det("waste", 0.2, (0, 0, 1, 1)),
            det("waste", 0.25, (0, 0, 1, 1)),
            det("trash", 0.9, (0, 0, 1, 1)),
        ];
        let kept = filter_by_confidence(&dets, DEFAULT_MIN_CONFIDENCE).unwrap();
        assert_eq!(kept.len(), 2);
        assert!(filter_by_confidence(&dets, 1.5).is_err());
    }

    #[test]
    fn assessment_serializes_external_contract() {
        let dets = vec![det("garbage", 0.9, (10, 10, 50, 50))];
        let assessment = classify_severity(&dets, ImageDimensions::new(200, 200)).unwrap();
        let value = serde_json::to_value(&assessment).unwrap();
        assert_eq!(value["count"], 1);
        assert_eq!(value["severity_tier"], "light");
        assert!(value["recommendation"].is_string());
        assert_eq!(value["category_counts"]["garbage"], 1);
    }

    #[test]
    fn labels_are_title_cased() {
        assert_eq!(display_label("garbage_bag"), "Garbage Bag");
        assert_eq!(display_label("trash"), "Trash");
        assert_eq!(display_label("0"), "0");
    }
}
