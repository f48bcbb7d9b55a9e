#![forbid(unsafe_code)]

//! The unit of undo/redo.

use crate::adjustment::AdjustmentState;
use crate::transform::TransformState;

/// Transform and adjustments captured together.
///
/// Snapshots are applied whole; there is no way to restore only one half.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EditSnapshot {
    pub transform: TransformState,
    pub adjustments: AdjustmentState,
}

impl EditSnapshot {
    #[must_use]
    pub const fn new(transform: TransformState, adjustments: AdjustmentState) -> Self {
        Self {
            transform,
            adjustments,
        }
    }
}
