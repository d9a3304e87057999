//! Text frequency analysis.
//!
//! Four operations over raw text, selected by a closed [`TextOperation`] enum:
//! keyword extraction, extractive summary, cleaning and overlapping chunks.
//! All of them are total for empty input.
//!
//! ```compile_fail
//! // Operations are a closed set; there is no catch-all variant to smuggle a tag through.
//! let _ = cleanscan::text::TextOperation::Translate;
//! ```

mod chunk;
mod clean;
mod keywords;
mod summarize;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::TriageError;

pub use chunk::{chunk, DEFAULT_CHUNK_OVERLAP};
pub use clean::clean;
pub use keywords::extract_keywords;
pub use summarize::summarize;

pub const DEFAULT_KEYWORD_COUNT: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextOperation {
    Keywords,
    Summarize,
    Clean,
    Chunk,
}

impl TextOperation {
    pub const ALL: [TextOperation; 4] = [
        TextOperation::Keywords,
        TextOperation::Summarize,
        TextOperation::Clean,
        TextOperation::Chunk,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            TextOperation::Keywords => "keywords",
            TextOperation::Summarize => "summarize",
            TextOperation::Clean => "clean",
            TextOperation::Chunk => "chunk",
        }
    }
}

impl FromStr for TextOperation {
    type Err = TriageError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        TextOperation::ALL
            .into_iter()
            .find(|op| op.tag() == normalized)
            .ok_or_else(|| TriageError::UnsupportedOperation(s.to_string()))
    }
}

impl std::fmt::Display for TextOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Operation-specific payload. Serializes as a bare string or list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextOutput {
    Text(String),
    List(Vec<String>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextAnalysisResult {
    pub operation: TextOperation,
    pub result: TextOutput,
    pub word_count: usize,
}

/// Knobs that are fixed per deployment rather than per request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnalyzerSettings {
    pub keyword_count: usize,
    pub chunk_overlap: usize,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            keyword_count: DEFAULT_KEYWORD_COUNT,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// Run one operation.
///
/// `max_length` is the summary budget for `Summarize` and the window size for
/// `Chunk`; `Keywords` and `Clean` ignore it but it must still be positive.
///
/// `word_count` counts words in the output. For `Chunk` it counts words in the
/// source text, since overlapping windows would count shared words twice.
pub fn analyze(
    text: &str,
    operation: TextOperation,
    max_length: usize,
    settings: &AnalyzerSettings,
) -> Result<TextAnalysisResult> {
    if max_length == 0 {
        return Err(TriageError::InvalidArgument("max_length must be > 0".to_string()).into());
    }
    if text.is_empty() {
        log::debug!("empty text for {} operation", operation);
    }

    let (result, word_count) = match operation {
        TextOperation::Keywords => {
            let keywords = extract_keywords(text, settings.keyword_count);
            let count = keywords.len();
            (TextOutput::List(keywords), count)
        }
        TextOperation::Summarize => {
            let summary = summarize(text, max_length);
            let count = word_count(&summary);
            (TextOutput::Text(summary), count)
        }
        TextOperation::Clean => {
            let cleaned = clean(text);
            let count = word_count(&cleaned);
            (TextOutput::Text(cleaned), count)
        }
        TextOperation::Chunk => {
            let chunks = chunk(text, max_length, settings.chunk_overlap)?;
            (TextOutput::List(chunks), word_count(text))
        }
    };

    Ok(TextAnalysisResult {
        operation,
        result,
        word_count,
    })
}

/// Parse the operation tag, then [`analyze`].
pub fn analyze_tagged(
    text: &str,
    operation: &str,
    max_length: usize,
    settings: &AnalyzerSettings,
) -> Result<TextAnalysisResult> {
    let operation: TextOperation = operation.parse()?;
    analyze(text, operation, max_length, settings)
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
