#![forbid(unsafe_code)]

//! Core: geometry, pointer events, gestures, homography, and edit state.
//!
//! # Role in GraffitiXR
//! `gxr-core` is the value layer. It owns the canonical transform and
//! adjustment types, the pure algorithms that act on them, and the stateful
//! (but renderer-agnostic) gesture decoder that turns raw pointer streams
//! into incremental deltas.
//!
//! # Primary responsibilities
//! - **GestureRecognizer**: two-pointer pan/scale/rotate decoding.
//! - **HomographySolver**: four-point DLT with partial pivoting.
//! - **TransformState / AdjustmentState**: immutable-update value types.
//! - **AdjustmentPipeline**: the one per-pixel formula every backend shares.
//!
//! # How it fits in the system
//! The runtime (`gxr-runtime`) owns the live session: it feeds pointer events
//! into the recognizer, applies deltas to `TransformState`, and checkpoints
//! `EditSnapshot`s into history. Renderers only ever see values from this
//! crate.

pub mod adjustment;
pub mod event;
pub mod geometry;
pub mod gesture;
pub mod homography;
pub mod logging;
pub mod pipeline;
pub mod snapshot;
pub mod transform;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, error, info, trace, warn};

pub use adjustment::{AdjustmentError, AdjustmentKey, AdjustmentState, ColorBalance};
pub use event::{PointerEvent, PointerId, PointerPhase};
pub use geometry::{Point, Pose, Quad, QuadError};
pub use gesture::{GestureConfig, GestureDelta, GestureRecognizer, GestureSession, GestureSink};
pub use homography::{DegenerateConfiguration, Homography, HomographySolver};
pub use snapshot::EditSnapshot;
pub use transform::TransformState;
