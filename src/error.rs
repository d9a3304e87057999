//! Error taxonomy.
//!
//! Fallible functions return `anyhow::Result`; the typed error travels inside and
//! callers that need to branch on it use `err.downcast_ref::<TriageError>()`.
//! Empty inputs are never errors: they have defined results.

#[derive(Clone, Debug, PartialEq)]
pub enum TriageError {
    /// Malformed bounding box, out-of-bounds box, or confidence outside [0, 1].
    InvalidDetection { index: usize, reason: String },
    /// Unknown text-operation tag.
    UnsupportedOperation(String),
    /// Zero lengths, chunk sizes not larger than the overlap, thresholds out of range.
    InvalidArgument(String),
}

impl TriageError {
    pub fn code(&self) -> &'static str {
        match self {
            TriageError::InvalidDetection { .. } => "INVALID_DETECTION",
            TriageError::UnsupportedOperation(_) => "UNSUPPORTED_OPERATION",
            TriageError::InvalidArgument(_) => "INVALID_ARGUMENT",
        }
    }

    pub(crate) fn invalid_detection(index: usize, reason: impl Into<String>) -> Self {
        TriageError::InvalidDetection {
            index,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for TriageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriageError::InvalidDetection { index, reason } => {
                write!(f, "{}: detection #{}: {}", self.code(), index, reason)
            }
            TriageError::UnsupportedOperation(op) => {
                write!(f, "{}: '{}' is not a text operation", self.code(), op)
            }
            TriageError::InvalidArgument(message) => write!(f, "{}: {}", self.code(), message),
        }
    }
}

impl std::error::Error for TriageError {}
