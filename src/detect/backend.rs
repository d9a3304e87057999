use anyhow::Result;

use crate::detect::result::DetectionResult;

/// Detector backend trait.
///
/// The object-detection model lives outside this crate. A backend wraps whatever
/// runs inference and hands back already-computed, validated detections; the
/// triage code never loads or caches a model itself.
pub trait DetectorBackend: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Run detection on a frame.
    ///
    /// Returned boxes must lie within `width` x `height`.
    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<DetectionResult>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
