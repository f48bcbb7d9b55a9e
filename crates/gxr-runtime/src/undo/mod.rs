#![forbid(unsafe_code)]

//! Undo/redo for the editor.
//!
//! There is exactly one history per editor session. Every committed edit
//! (image load, placement, corner drag end, adjustment settle, project load)
//! lands in the same [`HistoryManager`] as a whole [`EditSnapshot`](gxr_core::EditSnapshot).

pub mod history;

pub use history::{HistoryConfig, HistoryManager, MAX_HISTORY};
