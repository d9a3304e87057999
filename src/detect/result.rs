use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::TriageError;

/// Source frame size in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub height: u32,
    pub width: u32,
}

impl ImageDimensions {
    pub fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }

    pub fn area(&self) -> u64 {
        self.height as u64 * self.width as u64
    }
}

/// Axis-aligned box in pixel coordinates. Always non-empty: x1 < x2 and y1 < y2.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(into = "[u32; 4]")]
pub struct BoundingBox {
    x1: u32,
    y1: u32,
    x2: u32,
    y2: u32,
}

impl BoundingBox {
    /// Build a box from raw detector coordinates.
    ///
    /// Detectors hand over signed integers; negative or inverted corners are
    /// rejected here instead of producing a negative area later.
    pub fn new(x1: i64, y1: i64, x2: i64, y2: i64) -> std::result::Result<Self, String> {
        if x1 < 0 || y1 < 0 {
            return Err(format!("corner ({}, {}) is negative", x1, y1));
        }
        if x1 >= x2 {
            return Err(format!("x1 ({}) must be < x2 ({})", x1, x2));
        }
        if y1 >= y2 {
            return Err(format!("y1 ({}) must be < y2 ({})", y1, y2));
        }
        let to_u32 = |v: i64| u32::try_from(v).map_err(|_| format!("coordinate {} out of range", v));
        Ok(Self {
            x1: to_u32(x1)?,
            y1: to_u32(y1)?,
            x2: to_u32(x2)?,
            y2: to_u32(y2)?,
        })
    }

    pub fn x1(&self) -> u32 {
        self.x1
    }

    pub fn y1(&self) -> u32 {
        self.y1
    }

    pub fn x2(&self) -> u32 {
        self.x2
    }

    pub fn y2(&self) -> u32 {
        self.y2
    }

    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    pub fn fits_within(&self, dims: ImageDimensions) -> bool {
        self.x2 <= dims.width && self.y2 <= dims.height
    }
}

impl From<BoundingBox> for [u32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// One object reported by a detector.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Detection {
    label: String,
    confidence: f32,
    #[serde(rename = "bbox")]
    bounding_box: BoundingBox,
}

impl Detection {
    /// Confidence must lie in [0, 1]; the box is already known to be non-empty.
    ///
    /// A bad confidence is an `InvalidArgument`: only ingestion knows which
    /// record a detection came from.
    pub fn new(label: &str, confidence: f32, bounding_box: BoundingBox) -> Result<Self> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(TriageError::InvalidArgument(format!(
                "confidence {} outside [0, 1]",
                confidence
            ))
            .into());
        }
        Ok(Self {
            label: label.to_string(),
            confidence,
            bounding_box,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }
}

/// Wire shape of one detector record: `{"label", "confidence", "bbox": [x1, y1, x2, y2]}`.
#[derive(Clone, Debug, Deserialize)]
pub struct DetectionRecord {
    pub label: String,
    pub confidence: f64,
    pub bbox: [i64; 4],
}

impl DetectionRecord {
    fn into_detection(self, index: usize, dims: ImageDimensions) -> Result<Detection> {
        let [x1, y1, x2, y2] = self.bbox;
        let bounding_box = BoundingBox::new(x1, y1, x2, y2)
            .map_err(|reason| TriageError::invalid_detection(index, reason))?;
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(TriageError::invalid_detection(
                index,
                format!("confidence {} outside [0, 1]", self.confidence),
            )
            .into());
        }
        let detection = Detection {
            label: self.label,
            confidence: self.confidence as f32,
            bounding_box,
        };
        check_bounds(index, &detection, dims)?;
        Ok(detection)
    }
}

/// Convert raw detector records, rejecting the first malformed one.
pub fn ingest_records(records: Vec<DetectionRecord>, dims: ImageDimensions) -> Result<Vec<Detection>> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| record.into_detection(index, dims))
        .collect()
}

/// Parse a detector JSON array and validate every record against the frame.
pub fn parse_detections(json: &str, dims: ImageDimensions) -> Result<Vec<Detection>> {
    let records: Vec<DetectionRecord> = serde_json::from_str(json)
        .map_err(|e| anyhow::anyhow!("invalid detections payload: {}", e))?;
    ingest_records(records, dims)
}

/// Reject any detection whose box leaves the frame.
pub fn validate_detections(detections: &[Detection], dims: ImageDimensions) -> Result<()> {
    for (index, detection) in detections.iter().enumerate() {
        check_bounds(index, detection, dims)?;
    }
    Ok(())
}

fn check_bounds(index: usize, detection: &Detection, dims: ImageDimensions) -> Result<()> {
    let b = detection.bounding_box;
    if !b.fits_within(dims) {
        return Err(TriageError::invalid_detection(
            index,
            format!(
                "box ({}, {}, {}, {}) exceeds {}x{} frame",
                b.x1, b.y1, b.x2, b.y2, dims.width, dims.height
            ),
        )
        .into());
    }
    Ok(())
}

/// Output of one detector pass over a frame.
#[derive(Clone, Debug, Default)]
pub struct DetectionResult {
    pub dims: ImageDimensions,
    pub detections: Vec<Detection>,
}
