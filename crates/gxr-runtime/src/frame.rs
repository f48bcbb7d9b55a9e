#![forbid(unsafe_code)]

//! Frame publishing for renderers.
//!
//! The editor publishes an immutable [`FrameSnapshot`] after every state
//! change. Renderers hold a [`FrameReader`] and load the latest snapshot at
//! the start of each frame. A render pass therefore always sees one fully
//! formed state, even while input events queue behind it.
//!
//! The store is an [`ArcSwap`]: loads never block and never observe a
//! partially written value. Publishing allocates one `Arc` per frame.
//!
//! Renderers do not own or mutate editor state. The [`RenderAdapter`] trait
//! is the consumer-side seam: an adapter receives snapshots and maps them
//! onto its own scene objects.

use std::sync::Arc;

use arc_swap::ArcSwap;
use gxr_core::pipeline::{Backend, BackendFidelity};
use gxr_core::{AdjustmentState, Homography, TransformState};
use serde::{Deserialize, Serialize};

use crate::images::ImageHandle;
use crate::mode::EditorMode;
use crate::placement::PlacementState;

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameSnapshot {
    /// Increments on every publish.
    pub sequence: u64,
    pub mode: EditorMode,
    pub transform: TransformState,
    pub adjustments: AdjustmentState,
    /// Derived from `transform.corners`; the last valid solve is kept while a
    /// drag passes through a degenerate quad.
    pub homography: Option<Homography>,
    pub placement: PlacementState,
    pub overlay: Option<ImageHandle>,
    pub background: Option<ImageHandle>,
}

// ---------------------------------------------------------------------------
// Publisher / reader
// ---------------------------------------------------------------------------

/// Write side, owned by the editor session.
#[derive(Debug)]
pub struct FramePublisher {
    inner: Arc<ArcSwap<FrameSnapshot>>,
    sequence: u64,
}

impl Default for FramePublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl FramePublisher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(FrameSnapshot::default())),
            sequence: 0,
        }
    }

    /// Publish `frame`, stamping the next sequence number. Returns it.
    pub fn publish(&mut self, mut frame: FrameSnapshot) -> u64 {
        self.sequence = self.sequence.wrapping_add(1);
        frame.sequence = self.sequence;
        self.inner.store(Arc::new(frame));
        self.sequence
    }

    /// Sequence number of the latest publish.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// A new read handle. Readers are cheap and may move to other threads.
    #[must_use]
    pub fn reader(&self) -> FrameReader {
        FrameReader {
            inner: Arc::clone(&self.inner),
            last_rendered: None,
        }
    }
}

/// Read side, one per renderer.
#[derive(Debug, Clone)]
pub struct FrameReader {
    inner: Arc<ArcSwap<FrameSnapshot>>,
    last_rendered: Option<u64>,
}

impl FrameReader {
    /// Latest published frame.
    #[inline]
    #[must_use]
    pub fn load(&self) -> Arc<FrameSnapshot> {
        self.inner.load_full()
    }

    /// Hand the latest frame to `adapter` if it changed since this reader's
    /// last render. Returns whether a render happened.
    pub fn render_if_changed<A: RenderAdapter + ?Sized>(&mut self, adapter: &mut A) -> bool {
        let frame = self.load();
        if self.last_rendered == Some(frame.sequence) {
            return false;
        }
        adapter.render(&frame);
        self.last_rendered = Some(frame.sequence);
        true
    }
}

// ---------------------------------------------------------------------------
// Render adapters
// ---------------------------------------------------------------------------

/// Axis the AR renderer rotates the placed overlay around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationAxis {
    /// The anchor's surface normal (local +Y of a hit-test pose).
    #[default]
    SurfaceNormal,
    /// The camera view axis (screen-plane rotation).
    ViewZ,
}

impl RotationAxis {
    /// Quaternion `[x, y, z, w]` rotating by `degrees` about this axis.
    #[must_use]
    pub fn quaternion(self, degrees: f64) -> [f64; 4] {
        let half = degrees.to_radians() / 2.0;
        let (s, c) = half.sin_cos();
        match self {
            Self::SurfaceNormal => [0.0, s, 0.0, c],
            Self::ViewZ => [0.0, 0.0, s, c],
        }
    }
}

/// Per-adapter settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderAdapterConfig {
    pub rotation_axis: RotationAxis,
    /// World-space width in metres of the overlay at scale 1.
    pub base_width_m: f64,
}

impl Default for RenderAdapterConfig {
    fn default() -> Self {
        Self {
            rotation_axis: RotationAxis::default(),
            base_width_m: 1.0,
        }
    }
}

/// A renderer consuming published frames.
pub trait RenderAdapter {
    /// Which pipeline implementation the adapter uses.
    fn backend(&self) -> Backend;

    /// Draw `frame`. Must not retain references into it beyond the call.
    fn render(&mut self, frame: &FrameSnapshot);

    /// The adapter's declared pipeline fidelity.
    fn fidelity(&self) -> BackendFidelity {
        self.backend().fidelity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[derive(Default)]
    struct Recorder {
        frames: Vec<u64>,
    }

    impl RenderAdapter for Recorder {
        fn backend(&self) -> Backend {
            Backend::CssFilter
        }

        fn render(&mut self, frame: &FrameSnapshot) {
            self.frames.push(frame.sequence);
        }
    }

    #[test]
    fn publish_stamps_sequence() {
        let mut publisher = FramePublisher::new();
        let reader = publisher.reader();
        assert_eq!(reader.load().sequence, 0);
        assert_eq!(publisher.publish(FrameSnapshot::default()), 1);
        assert_eq!(publisher.publish(FrameSnapshot::default()), 2);
        assert_eq!(reader.load().sequence, 2);
    }

    #[test]
    fn reader_renders_only_changes() {
        let mut publisher = FramePublisher::new();
        let mut reader = publisher.reader();
        let mut adapter = Recorder::default();
        publisher.publish(FrameSnapshot::default());
        assert!(reader.render_if_changed(&mut adapter));
        assert!(!reader.render_if_changed(&mut adapter));
        publisher.publish(FrameSnapshot::default());
        assert!(reader.render_if_changed(&mut adapter));
        assert_eq!(adapter.frames, vec![1, 2]);
        assert!(!adapter.fidelity().is_exact());
    }

    #[test]
    fn readers_on_other_threads_see_whole_frames() {
        let mut publisher = FramePublisher::new();
        let reader = publisher.reader();
        let handle = thread::spawn(move || {
            for _ in 0..1000 {
                let frame = reader.load();
                // Every publish writes scale == sequence.
                assert!(frame.sequence == 0 || frame.transform.scale == frame.sequence as f64);
            }
        });
        for i in 1..=200u64 {
            let mut frame = FrameSnapshot::default();
            frame.transform.scale = i as f64;
            publisher.publish(frame);
        }
        handle.join().unwrap();
    }

    #[test]
    fn rotation_axis_quaternions() {
        let q = RotationAxis::ViewZ.quaternion(180.0);
        assert!(q[2].abs() > 0.999 && q[3].abs() < 1e-12);
        let q = RotationAxis::SurfaceNormal.quaternion(90.0);
        assert!((q[1] - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
        assert_eq!(q[0], 0.0);
    }
}
