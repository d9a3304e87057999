use anyhow::Result;

use crate::error::TriageError;

pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

/// Overlapping character windows: window `i` starts at `i * (chunk_size - overlap)`
/// and spans `chunk_size` characters. Stops once a window reaches the end of the
/// text, so the last chunk may be shorter.
pub fn chunk(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    if chunk_size == 0 {
        return Err(TriageError::InvalidArgument("chunk size must be > 0".to_string()).into());
    }
    if overlap >= chunk_size {
        return Err(TriageError::InvalidArgument(format!(
            "chunk size {} must exceed overlap {}",
            chunk_size, overlap
        ))
        .into());
    }

    let chars: Vec<char> = text.chars().collect();
    let stride = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0usize;
    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += stride;
    }
    Ok(chunks)
}
