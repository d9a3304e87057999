use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};

use crate::detect::result::DetectionResult;
use crate::error::TriageError;
use crate::footage::{analyze_footage, FootageSummary, Frame};
use crate::severity::{
    classify_severity, filter_by_confidence, SeverityAssessment, DEFAULT_MIN_CONFIDENCE,
};

use super::backend::DetectorBackend;

pub type SharedBackend = Arc<Mutex<dyn DetectorBackend>>;

/// Named detector backends behind one confidence floor.
///
/// Every path out of the registry (single frame, triage, footage) drops
/// detections below `min_confidence` before anything is counted, so all
/// callers agree on what "detected" means.
pub struct BackendRegistry {
    backends: BTreeMap<String, SharedBackend>,
    active: Option<String>,
    min_confidence: f32,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self {
            backends: BTreeMap::new(),
            active: None,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }

    pub fn with_min_confidence(min_confidence: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&min_confidence) {
            return Err(TriageError::InvalidArgument(format!(
                "min_confidence {} outside [0, 1]",
                min_confidence
            ))
            .into());
        }
        Ok(Self {
            min_confidence,
            ..Self::new()
        })
    }

    pub fn min_confidence(&self) -> f32 {
        self.min_confidence
    }

    /// Add a backend under its own name. The first one added becomes active.
    pub fn register<B: DetectorBackend + 'static>(&mut self, backend: B) -> Result<()> {
        let name = backend.name();
        if self.backends.contains_key(name) {
            return Err(TriageError::InvalidArgument(format!(
                "detector backend '{}' already registered",
                name
            ))
            .into());
        }
        if self.active.is_none() {
            self.active = Some(name.to_string());
        }
        log::debug!("registered detector backend '{}'", name);
        self.backends
            .insert(name.to_string(), Arc::new(Mutex::new(backend)));
        Ok(())
    }

    pub fn activate(&mut self, name: &str) -> Result<()> {
        if !self.backends.contains_key(name) {
            return Err(anyhow!("detector backend '{}' not registered", name));
        }
        self.active = Some(name.to_string());
        Ok(())
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn names(&self) -> Vec<&str> {
        self.backends.keys().map(String::as_str).collect()
    }

    fn resolve(&self, name: Option<&str>) -> Result<SharedBackend> {
        let name = match name.or(self.active.as_deref()) {
            Some(name) => name,
            None => return Err(anyhow!("no detector backend registered")),
        };
        self.backends
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("detector backend '{}' not registered", name))
    }

    /// Detect on one frame with `name` (or the active backend), keeping only
    /// detections at or above the confidence floor.
    pub fn detect_with(
        &self,
        name: Option<&str>,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<DetectionResult> {
        let backend = self.resolve(name)?;
        let mut guard = backend
            .lock()
            .map_err(|_| anyhow!("backend lock poisoned"))?;
        Thresholded {
            inner: &mut *guard,
            min_confidence: self.min_confidence,
        }
        .detect(pixels, width, height)
    }

    /// Detect and classify one frame.
    pub fn triage_with(
        &self,
        name: Option<&str>,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<(DetectionResult, SeverityAssessment)> {
        let result = self.detect_with(name, pixels, width, height)?;
        let assessment = classify_severity(&result.detections, result.dims)?;
        Ok((result, assessment))
    }

    /// Summarise footage through the confidence floor.
    pub fn footage_with(
        &self,
        name: Option<&str>,
        frames: &[Frame],
        max_frames: usize,
    ) -> Result<FootageSummary> {
        let backend = self.resolve(name)?;
        let mut guard = backend
            .lock()
            .map_err(|_| anyhow!("backend lock poisoned"))?;
        let mut thresholded = Thresholded {
            inner: &mut *guard,
            min_confidence: self.min_confidence,
        };
        analyze_footage(&mut thresholded, frames, max_frames)
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Backend view that filters its inner backend's output.
struct Thresholded<'a> {
    inner: &'a mut dyn DetectorBackend,
    min_confidence: f32,
}

impl DetectorBackend for Thresholded<'_> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<DetectionResult> {
        let mut result = self.inner.detect(pixels, width, height)?;
        let before = result.detections.len();
        result.detections = filter_by_confidence(&result.detections, self.min_confidence)?;
        if result.detections.len() < before {
            log::debug!(
                "{}: dropped {} detections below {:.2}",
                self.inner.name(),
                before - result.detections.len(),
                self.min_confidence
            );
        }
        Ok(result)
    }

    fn warm_up(&mut self) -> Result<()> {
        self.inner.warm_up()
    }
}
