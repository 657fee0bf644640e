//! Platform capability providers.
//!
//! Vibration, clipboard and native share are injected behind one trait.
//! Platforms without a feature use [`NoCapabilities`], so callers never
//! probe for support at runtime.

use std::fmt;

/// Error from a capability call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// The platform does not offer this capability
    Unsupported(&'static str),
    /// The capability exists but the call failed
    Failed(String),
}

impl fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityError::Unsupported(name) => write!(f, "{} is not supported", name),
            CapabilityError::Failed(message) => write!(f, "capability failed: {}", message),
        }
    }
}

impl std::error::Error for CapabilityError {}

/// Host platform features. Every method defaults to `Unsupported`.
pub trait Capabilities {
    fn vibrate(&self, _duration_ms: u32) -> Result<(), CapabilityError> {
        Err(CapabilityError::Unsupported("vibration"))
    }

    fn copy_to_clipboard(&self, _text: &str) -> Result<(), CapabilityError> {
        Err(CapabilityError::Unsupported("clipboard"))
    }

    fn share(&self, _title: &str, _url: &str) -> Result<(), CapabilityError> {
        Err(CapabilityError::Unsupported("share"))
    }
}

/// Provider for platforms with none of the features.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapabilities;

impl Capabilities for NoCapabilities {}

/// Desktop provider backed by the egui context.
///
/// Clipboard writes go through egui's platform output; vibration and
/// share stay unsupported.
#[derive(Clone)]
pub struct EguiCapabilities {
    ctx: egui::Context,
}

impl EguiCapabilities {
    pub fn new(ctx: egui::Context) -> Self {
        Self { ctx }
    }
}

impl Capabilities for EguiCapabilities {
    fn copy_to_clipboard(&self, text: &str) -> Result<(), CapabilityError> {
        self.ctx.copy_text(text.to_string());
        Ok(())
    }
}

/// Best-effort haptic pulse. Failures are dropped.
pub fn pulse(capabilities: &dyn Capabilities, duration_ms: u32) {
    if let Err(e) = capabilities.vibrate(duration_ms) {
        log::trace!("haptic pulse skipped: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_capabilities_reports_unsupported() {
        let caps = NoCapabilities;
        assert_eq!(caps.vibrate(10), Err(CapabilityError::Unsupported("vibration")));
        assert_eq!(
            caps.copy_to_clipboard("x"),
            Err(CapabilityError::Unsupported("clipboard"))
        );
        assert_eq!(caps.share("t", "u"), Err(CapabilityError::Unsupported("share")));
    }

    #[test]
    fn test_pulse_swallows_errors() {
        pulse(&NoCapabilities, 10);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            CapabilityError::Unsupported("share").to_string(),
            "share is not supported"
        );
        assert_eq!(
            CapabilityError::Failed("denied".into()).to_string(),
            "capability failed: denied"
        );
    }

    #[test]
    fn test_egui_clipboard_is_supported() {
        let caps = EguiCapabilities::new(egui::Context::default());
        assert!(caps.copy_to_clipboard("https://clip.example/v/1").is_ok());
        assert!(caps.vibrate(10).is_err());
    }
}
