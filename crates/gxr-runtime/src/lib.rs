#![forbid(unsafe_code)]

//! Runtime: the live editing session.
//!
//! # Role in GraffitiXR
//! `gxr-runtime` owns everything stateful that is not a renderer: the undo
//! history, the AR placement state machine, image slots, project files, and
//! the [`EditorSession`] that routes input through them.
//!
//! # Primary responsibilities
//! - **EditorSession**: gesture gating, commit points, corner editing.
//! - **HistoryManager**: one bounded undo/redo stack of edit snapshots.
//! - **PlacementController**: reticle to anchor, lock/unlock, hit-test guard.
//! - **FramePublisher**: immutable per-frame snapshots for renderers.
//!
//! # Concurrency
//! All editor methods run on one event loop and never block. Only frame
//! reads cross threads, through [`FrameReader`].

pub mod config;
pub mod editor;
pub mod frame;
pub mod images;
pub mod mode;
pub mod notice;
pub mod placement;
pub mod project;
pub mod undo;

pub use config::{ConfigError, EditorConfig};
pub use editor::EditorSession;
pub use frame::{
    FramePublisher, FrameReader, FrameSnapshot, RenderAdapter, RenderAdapterConfig, RotationAxis,
};
pub use images::{ImageHandle, IsolateOutcome, OverlayImages};
pub use mode::EditorMode;
pub use notice::Notice;
pub use placement::{HitTestSourceId, PlacementController, PlacementError, PlacementState};
pub use project::{PROJECT_VERSION, ProjectError, ProjectFile, ProjectImages};
pub use undo::{HistoryConfig, HistoryManager, MAX_HISTORY};
