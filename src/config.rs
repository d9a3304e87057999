use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;

use crate::error::TriageError;
use crate::footage::DEFAULT_MAX_FRAMES;
use crate::severity::DEFAULT_MIN_CONFIDENCE;
use crate::text::{AnalyzerSettings, DEFAULT_CHUNK_OVERLAP, DEFAULT_KEYWORD_COUNT};

pub const CONFIG_ENV: &str = "CLEANSCAN_CONFIG";
const DEFAULT_SUMMARY_LENGTH: usize = 300;

#[derive(Debug, Deserialize, Default)]
struct TriageConfigFile {
    detection: Option<DetectionConfigFile>,
    text: Option<TextConfigFile>,
    footage: Option<FootageConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectionConfigFile {
    min_confidence: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
struct TextConfigFile {
    keyword_count: Option<usize>,
    chunk_overlap: Option<usize>,
    summary_length: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
struct FootageConfigFile {
    max_frames: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct TriageConfig {
    pub min_confidence: f32,
    pub text: AnalyzerSettings,
    /// Default `max_length` when a caller does not pass one.
    pub summary_length: usize,
    pub max_frames: usize,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self::from_file(TriageConfigFile::default())
    }
}

impl TriageConfig {
    /// Defaults, then the file named by `CLEANSCAN_CONFIG` (JSON, or TOML for a
    /// `.toml` path), then `CLEANSCAN_*` env overrides, then validation.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var(CONFIG_ENV).ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) if !path.trim().is_empty() => Some(read_config_file(Path::new(path))?),
            _ => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        log::debug!("loaded config: {:?}", cfg);
        Ok(cfg)
    }

    fn from_file(file: TriageConfigFile) -> Self {
        let min_confidence = file
            .detection
            .and_then(|detection| detection.min_confidence)
            .unwrap_or(DEFAULT_MIN_CONFIDENCE);
        let keyword_count = file
            .text
            .as_ref()
            .and_then(|text| text.keyword_count)
            .unwrap_or(DEFAULT_KEYWORD_COUNT);
        let chunk_overlap = file
            .text
            .as_ref()
            .and_then(|text| text.chunk_overlap)
            .unwrap_or(DEFAULT_CHUNK_OVERLAP);
        let summary_length = file
            .text
            .and_then(|text| text.summary_length)
            .unwrap_or(DEFAULT_SUMMARY_LENGTH);
        let max_frames = file
            .footage
            .and_then(|footage| footage.max_frames)
            .unwrap_or(DEFAULT_MAX_FRAMES);
        Self {
            min_confidence,
            text: AnalyzerSettings {
                keyword_count,
                chunk_overlap,
            },
            summary_length,
            max_frames,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(value) = env_parse::<f32>("CLEANSCAN_MIN_CONFIDENCE")? {
            self.min_confidence = value;
        }
        if let Some(value) = env_parse::<usize>("CLEANSCAN_KEYWORD_COUNT")? {
            self.text.keyword_count = value;
        }
        if let Some(value) = env_parse::<usize>("CLEANSCAN_CHUNK_OVERLAP")? {
            self.text.chunk_overlap = value;
        }
        if let Some(value) = env_parse::<usize>("CLEANSCAN_SUMMARY_LENGTH")? {
            self.summary_length = value;
        }
        if let Some(value) = env_parse::<usize>("CLEANSCAN_MAX_FRAMES")? {
            self.max_frames = value;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(TriageError::InvalidArgument(format!(
                "min_confidence {} outside [0, 1]",
                self.min_confidence
            ))
            .into());
        }
        if self.summary_length == 0 {
            return Err(anyhow!("summary_length must be greater than zero"));
        }
        if self.max_frames == 0 {
            return Err(anyhow!("max_frames must be greater than zero"));
        }
        if self.text.chunk_overlap >= self.summary_length {
            log::warn!(
                "chunk_overlap {} is not below the default chunk size {}; chunking will need an explicit --max-length",
                self.text.chunk_overlap,
                self.summary_length
            );
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| anyhow!("{} has an invalid value '{}'", key, raw)),
        _ => Ok(None),
    }
}

fn read_config_file(path: &Path) -> Result<TriageConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let cfg: TriageConfigFile = if is_toml {
        toml::from_str(&raw).map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    };
    Ok(cfg)
}
