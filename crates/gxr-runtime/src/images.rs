#![forbid(unsafe_code)]

//! Overlay and background image slots.
//!
//! Images are opaque [`ImageHandle`]s (URIs supplied by the platform). The
//! runtime never decodes or inspects pixels; background removal is an
//! external collaborator that receives a handle and answers with another.
//!
//! # Isolate workflow
//!
//! ```text
//! toggle_isolate ──► RequestRemoval(original) ──► on_background_removed(..)
//!      │                      │                          │
//!      │                      └─► on_background_removal_failed: revert
//!      └─ later toggles switch between original and removed variants
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Opaque image reference (blob/data/file URI).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageHandle(String);

impl ImageHandle {
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of [`OverlayImages::toggle_isolate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IsolateOutcome {
    /// Send this image to the background-removal collaborator.
    RequestRemoval(ImageHandle),
    /// Switched to the already-removed variant.
    ShowRemoved,
    /// Switched back to the original.
    ShowOriginal,
    /// A removal is already in flight.
    Pending,
    /// No overlay loaded.
    NoOverlay,
}

/// All image slots of an editing session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayImages {
    original: Option<ImageHandle>,
    removed: Option<ImageHandle>,
    background: Option<ImageHandle>,
    isolated: bool,
    removal_pending: bool,
}

impl OverlayImages {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The overlay to draw: the removed variant while isolated, else the
    /// original.
    #[must_use]
    pub fn active_overlay(&self) -> Option<&ImageHandle> {
        if self.isolated {
            self.removed.as_ref().or(self.original.as_ref())
        } else {
            self.original.as_ref()
        }
    }

    #[must_use]
    pub fn original(&self) -> Option<&ImageHandle> {
        self.original.as_ref()
    }

    #[must_use]
    pub fn removed(&self) -> Option<&ImageHandle> {
        self.removed.as_ref()
    }

    #[must_use]
    pub fn background(&self) -> Option<&ImageHandle> {
        self.background.as_ref()
    }

    #[must_use]
    pub fn is_isolated(&self) -> bool {
        self.isolated
    }

    #[must_use]
    pub fn is_removal_pending(&self) -> bool {
        self.removal_pending
    }

    /// Replace the overlay. Drops the removed variant and leaves isolate.
    pub fn load_overlay(&mut self, image: ImageHandle) {
        debug!(image = image.as_str(), "overlay loaded");
        self.original = Some(image);
        self.removed = None;
        self.isolated = false;
        self.removal_pending = false;
    }

    /// Restore all slots at once, e.g. from a project file.
    pub fn restore(
        &mut self,
        original: Option<ImageHandle>,
        removed: Option<ImageHandle>,
        background: Option<ImageHandle>,
    ) {
        self.original = original;
        self.removed = removed;
        self.background = background;
        self.isolated = false;
        self.removal_pending = false;
    }

    /// Set the mockup background.
    pub fn set_background(&mut self, image: ImageHandle) {
        self.background = Some(image);
    }

    /// Flip isolate mode. The first time, the caller must run background
    /// removal on the returned image.
    pub fn toggle_isolate(&mut self) -> IsolateOutcome {
        let Some(original) = &self.original else {
            return IsolateOutcome::NoOverlay;
        };
        if self.isolated {
            self.isolated = false;
            return IsolateOutcome::ShowOriginal;
        }
        if self.removed.is_some() {
            self.isolated = true;
            return IsolateOutcome::ShowRemoved;
        }
        if self.removal_pending {
            return IsolateOutcome::Pending;
        }
        self.isolated = true;
        self.removal_pending = true;
        IsolateOutcome::RequestRemoval(original.clone())
    }

    /// Store the removal result for `source`. Results for an overlay that
    /// has since been replaced are dropped; returns whether it was stored.
    pub fn on_background_removed(&mut self, source: &ImageHandle, result: ImageHandle) -> bool {
        if self.original.as_ref() != Some(source) {
            debug!(source = source.as_str(), "dropping stale background removal");
            return false;
        }
        self.removal_pending = false;
        self.removed = Some(result);
        true
    }

    /// Removal failed: leave isolate mode and show the original.
    pub fn on_background_removal_failed(&mut self, source: &ImageHandle, reason: &str) -> bool {
        if self.original.as_ref() != Some(source) {
            return false;
        }
        warn!(source = source.as_str(), reason, "background removal failed");
        self.removal_pending = false;
        self.isolated = false;
        true
    }
}
