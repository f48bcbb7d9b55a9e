#![forbid(unsafe_code)]

//! User-facing informational notices.
//!
//! Nothing in the editor is fatal. Conditions the user should hear about are
//! queued as [`Notice`]s and drained by the UI layer, which decides how to
//! show them (toast, haptic, nothing).

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    NothingToUndo,
    NothingToRedo,
    /// A corner drag produced an unusable quad; the previous one is kept.
    DegenerateQuad,
    HitTestFailed,
    /// A gesture or reset was refused because the placement is locked.
    PlacementLocked,
    BackgroundRemovalFailed,
    ProjectLoaded,
}

impl Notice {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NothingToUndo => "Nothing to undo",
            Self::NothingToRedo => "Nothing to redo",
            Self::DegenerateQuad => "Corners can't line up; keeping the previous shape",
            Self::HitTestFailed => "Couldn't find a surface",
            Self::PlacementLocked => "Placement is locked",
            Self::BackgroundRemovalFailed => "Background removal failed",
            Self::ProjectLoaded => "Project loaded",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
