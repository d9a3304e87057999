//! CleanScan
//!
//! Analytical core behind the waste-detection and text-utility dashboards.
//!
//! # Architecture
//!
//! Two independent, pure components:
//!
//! 1. **Severity triage**: detector boxes for one frame become a category
//!    breakdown, a coverage percentage and a severity tier with a recommendation.
//! 2. **Text frequency analysis**: keywords, extractive summary, cleaning and
//!    overlapping chunks over raw text.
//!
//! Object detection itself happens outside the crate. Detections arrive either as
//! detector JSON (`detect::parse_detections`) or through a `DetectorBackend`.
//!
//! # Module Structure
//!
//! - `detect`: detection data model, ingestion/validation, backend seam
//! - `severity`: aggregation and tier classification
//! - `annotate`: overlay instructions (raster output behind the `annotate` feature)
//! - `footage`: multi-frame summaries
//! - `text`: text operations
//! - `report`: human-readable renderings
//! - `config`: file + env configuration

pub mod annotate;
pub mod config;
pub mod detect;
pub mod error;
pub mod footage;
pub mod report;
pub mod severity;
pub mod text;

pub use detect::{
    parse_detections, BackendRegistry, BoundingBox, Detection, DetectionResult, DetectorBackend,
    ImageDimensions, StubBackend,
};
pub use error::TriageError;
pub use footage::{analyze_footage, FootageAggregator, FootageSummary, Frame};
pub use severity::{
    aggregate_categories, classify_severity, compute_coverage, filter_by_confidence,
    CategoryBreakdown, SeverityAssessment, SeverityTier,
};
pub use text::{analyze, AnalyzerSettings, TextAnalysisResult, TextOperation, TextOutput};
