#![forbid(unsafe_code)]

//! GraffitiXR public facade crate.
//!
//! This crate provides the stable surface for applications embedding the
//! overlay editor. It re-exports the common types from `gxr-core` and
//! `gxr-runtime`, adds a unified [`Error`] with [`RecoveryAction`]s, and
//! offers a prelude for day-to-day usage.
//!
//! ```
//! use gxr::prelude::*;
//!
//! let mut session = EditorSession::default();
//! session.on_pointer_down(1, 0.0, 0.0);
//! session.on_pointer_down(2, 100.0, 0.0);
//! session.on_pointer_move(2, 200.0, 0.0);
//! session.on_pointer_up(2);
//! session.on_pointer_up(1);
//! assert_eq!(session.transform().scale, 2.0);
//!
//! assert!(session.undo());
//! assert_eq!(session.transform().scale, 1.0);
//! ```

pub mod error;

pub use error::{Error, RecoveryAction, Result};

// --- Core re-exports -------------------------------------------------------

pub use gxr_core::geometry::UNIT_SQUARE;
pub use gxr_core::pipeline::{
    AdjustmentPipeline, Backend, BackendFidelity, CssFilter, Rgba, ShaderUniforms, Stages,
};
pub use gxr_core::{
    AdjustmentError, AdjustmentKey, AdjustmentState, ColorBalance, DegenerateConfiguration,
    EditSnapshot, GestureConfig, GestureDelta, GestureRecognizer, GestureSink, Homography,
    HomographySolver, Point, PointerEvent, PointerId, PointerPhase, Pose, Quad, QuadError,
    TransformState,
};

// --- Runtime re-exports ----------------------------------------------------

pub use gxr_runtime::{
    ConfigError, EditorConfig, EditorMode, EditorSession, FrameReader, FrameSnapshot,
    HistoryConfig, HistoryManager, HitTestSourceId, ImageHandle, IsolateOutcome, MAX_HISTORY,
    Notice, PlacementError, PlacementState, ProjectError, ProjectFile, RenderAdapter,
    RenderAdapterConfig, RotationAxis,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        AdjustmentKey, AdjustmentState, EditorConfig, EditorMode, EditorSession, Error,
        FrameSnapshot, Homography, ImageHandle, IsolateOutcome, Notice, PlacementState, Point,
        PointerEvent, Pose, RecoveryAction, RenderAdapter, Result, TransformState,
    };

    pub use crate::{core, runtime};
}

pub use gxr_core as core;
pub use gxr_runtime as runtime;
