#![forbid(unsafe_code)]

//! Editor modes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which view the overlay is composed onto.
///
/// The transform and adjustment state is shared by every mode; the mode only
/// decides which renderer consumes the published frame and whether placement
/// goes through the AR reticle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorMode {
    /// World-anchored overlay in an AR session.
    Ar,
    /// 2D overlay on the camera passthrough.
    #[default]
    Overlay,
    /// 2D overlay on a static background photo.
    Mockup,
    /// Overlay for tracing onto paper; a locked 2D placement.
    Trace,
}

impl EditorMode {
    pub const ALL: [Self; 4] = [Self::Ar, Self::Overlay, Self::Mockup, Self::Trace];

    /// Whether placement goes through the hit-test reticle.
    #[must_use]
    pub const fn uses_anchor(self) -> bool {
        matches!(self, Self::Ar)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ar => "ar",
            Self::Overlay => "overlay",
            Self::Mockup => "mockup",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for EditorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
