#![forbid(unsafe_code)]

//! Gesture recognition: transforms raw pointer events into transform deltas.
//!
//! [`GestureRecognizer`] is a stateful decoder that converts a stream of
//! [`PointerEvent`]s into incremental [`GestureDelta`]s (pan, scale, rotate).
//! All of its state lives in a [`GestureSession`] value whose
//! [`step`](GestureSession::step) is a pure transition function, so gesture
//! math can be tested without any platform input layer.
//!
//! # Gesture Model
//!
//! - Only the first two pointers to arrive are tracked. Further pointers are
//!   ignored until a slot frees.
//! - Deltas are produced only while two pointers are down. Single-pointer
//!   movement emits nothing: this is a two-finger gesture model, not an
//!   oversight.
//! - On each two-pointer move:
//!   - **pan** = midpoint(current) − midpoint(previous)
//!   - **scale** = span / previous span, emitted only when
//!     `|1 - factor| > scale_jitter_floor`
//!   - **rotate** = change in the pair angle, wrapped into `[-180, 180]`,
//!     emitted (in radians) only when `|delta°| > rotation_floor_deg`
//!
//! # Invariants
//!
//! 1. At most two pointers are tracked.
//! 2. A pair baseline (span and angle) exists iff both slots are occupied.
//! 3. When a tracked pointer lifts, the baseline is dropped; the next pair
//!    establishes a fresh one, so a re-grip never produces a scale or
//!    rotation spike.
//! 4. When the pointer count reaches zero the session is back to its
//!    initial value.
//! 5. The recognizer never touches transform state; callers apply deltas.
//!
//! # Failure Modes
//!
//! - Events for unknown pointer identifiers are ignored.
//! - Events with non-finite coordinates are ignored.

use crate::event::{PointerEvent, PointerId, PointerPhase};
use crate::geometry::Point;
use crate::logging::trace;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Thresholds for gesture recognition.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GestureConfig {
    /// Minimum `|1 - factor|` before a scale delta is emitted (default: 0.005).
    pub scale_jitter_floor: f64,
    /// Minimum absolute rotation in degrees before a rotate delta is
    /// emitted (default: 0.1).
    pub rotation_floor_deg: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            scale_jitter_floor: 0.005,
            rotation_floor_deg: 0.1,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// An incremental transform change decoded from pointer input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureDelta {
    /// Translate by `(dx, dy)` pixels.
    Pan { dx: f64, dy: f64 },
    /// Multiply the current scale by this factor.
    Scale(f64),
    /// Rotate by this many radians (positive is clockwise in screen space).
    Rotate(f64),
}

impl GestureDelta {
    /// Deliver this delta to the matching callback on `sink`.
    pub fn dispatch<S: GestureSink + ?Sized>(self, sink: &mut S) {
        match self {
            Self::Pan { dx, dy } => sink.on_pan(dx, dy),
            Self::Scale(factor) => sink.on_scale(factor),
            Self::Rotate(radians) => sink.on_rotate(radians),
        }
    }
}

/// Callback interface for consumers that prefer listener-style delivery.
///
/// All methods default to no-ops so a sink can subscribe to a subset.
pub trait GestureSink {
    fn on_pan(&mut self, _dx: f64, _dy: f64) {}
    fn on_scale(&mut self, _factor: f64) {}
    fn on_rotate(&mut self, _delta_radians: f64) {}
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
struct TrackedPointer {
    id: PointerId,
    pos: Point,
}

/// Span and angle of the tracked pair at the last two-pointer update.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PairBaseline {
    span: f64,
    angle_deg: f64,
}

impl PairBaseline {
    fn of(a: Point, b: Point) -> Self {
        Self {
            span: a.distance(b),
            angle_deg: a.angle_from_deg(b),
        }
    }
}

/// Transient state of one multi-touch interaction.
///
/// A plain value: [`step`](Self::step) consumes it and returns the next one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureSession {
    slots: [Option<TrackedPointer>; 2],
    baseline: Option<PairBaseline>,
}

impl GestureSession {
    /// An idle session with no tracked pointers.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [None, None],
            baseline: None,
        }
    }

    /// Number of tracked pointers (0, 1, or 2).
    #[must_use]
    pub fn active_pointers(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Whether `id` occupies one of the two slots.
    #[must_use]
    pub fn is_tracking(&self, id: PointerId) -> bool {
        self.slot_of(id).is_some()
    }

    /// Whether a two-pointer gesture is in progress.
    #[must_use]
    pub fn is_gesturing(&self) -> bool {
        self.baseline.is_some()
    }

    /// Whether no pointer is tracked.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.active_pointers() == 0
    }

    /// Advance the session by one event, appending any deltas to `out`.
    #[must_use]
    pub fn step(
        mut self,
        event: &PointerEvent,
        config: &GestureConfig,
        out: &mut Vec<GestureDelta>,
    ) -> Self {
        match event.phase {
            PointerPhase::Down => self.on_down(event.id, event.position()),
            PointerPhase::Move => self.on_move(event.id, event.position(), config, out),
            PointerPhase::Up | PointerPhase::Cancel => self.on_release(event.id),
        }
        self
    }

    fn slot_of(&self, id: PointerId) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.is_some_and(|p| p.id == id))
    }

    fn pair(&self) -> Option<(Point, Point)> {
        match self.slots {
            [Some(a), Some(b)] => Some((a.pos, b.pos)),
            _ => None,
        }
    }

    fn on_down(&mut self, id: PointerId, pos: Point) {
        if !pos.is_finite() {
            return;
        }
        let slot = match self.slot_of(id) {
            // Repeated down for a tracked id: treat as a re-grip.
            Some(existing) => existing,
            None => match self.slots.iter().position(Option::is_none) {
                Some(free) => free,
                None => return,
            },
        };
        self.slots[slot] = Some(TrackedPointer { id, pos });
        self.baseline = self.pair().map(|(a, b)| PairBaseline::of(a, b));
    }

    fn on_move(
        &mut self,
        id: PointerId,
        pos: Point,
        config: &GestureConfig,
        out: &mut Vec<GestureDelta>,
    ) {
        if !pos.is_finite() {
            return;
        }
        let Some(slot) = self.slot_of(id) else {
            return;
        };
        let previous = self.pair();
        self.slots[slot] = Some(TrackedPointer { id, pos });

        let (Some((prev_a, prev_b)), Some((a, b)), Some(baseline)) =
            (previous, self.pair(), self.baseline)
        else {
            return;
        };

        let prev_mid = prev_a.midpoint(prev_b);
        let mid = a.midpoint(b);
        let (dx, dy) = (mid.x - prev_mid.x, mid.y - prev_mid.y);
        if dx != 0.0 || dy != 0.0 {
            trace!(dx, dy, "gesture pan");
            out.push(GestureDelta::Pan { dx, dy });
        }

        let current = PairBaseline::of(a, b);

        if baseline.span > 0.0 {
            let factor = current.span / baseline.span;
            if (1.0 - factor).abs() > config.scale_jitter_floor {
                trace!(factor, "gesture scale");
                out.push(GestureDelta::Scale(factor));
            }
        }

        let delta_deg = wrap_degrees(current.angle_deg - baseline.angle_deg);
        if delta_deg.abs() > config.rotation_floor_deg {
            trace!(delta_deg, "gesture rotate");
            out.push(GestureDelta::Rotate(delta_deg.to_radians()));
        }

        self.baseline = Some(current);
    }

    fn on_release(&mut self, id: PointerId) {
        let Some(slot) = self.slot_of(id) else {
            return;
        };
        self.slots[slot] = None;
        self.baseline = None;
        if self.is_idle() {
            *self = Self::new();
        }
    }
}

/// Wrap an angle difference into `[-180, 180]` degrees.
#[must_use]
pub fn wrap_degrees(mut delta: f64) -> f64 {
    if delta > 180.0 {
        delta -= 360.0;
    }
    if delta < -180.0 {
        delta += 360.0;
    }
    delta
}

// ---------------------------------------------------------------------------
// GestureRecognizer
// ---------------------------------------------------------------------------

/// Stateful gesture recognizer that transforms pointer events into deltas.
///
/// Call [`process`](GestureRecognizer::process) for each incoming
/// [`PointerEvent`], or use the `on_pointer_*` entry points directly.
#[derive(Debug, Clone, Default)]
pub struct GestureRecognizer {
    config: GestureConfig,
    session: GestureSession,
}

impl GestureRecognizer {
    /// Create a new gesture recognizer with the given configuration.
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            session: GestureSession::new(),
        }
    }

    /// Process a pointer event, returning any deltas produced (0 to 3).
    pub fn process(&mut self, event: &PointerEvent) -> Vec<GestureDelta> {
        let mut out = Vec::with_capacity(3);
        self.session = self.session.step(event, &self.config, &mut out);
        out
    }

    /// Process a pointer event and deliver the deltas to `sink`.
    pub fn process_into<S: GestureSink + ?Sized>(&mut self, event: &PointerEvent, sink: &mut S) {
        for delta in self.process(event) {
            delta.dispatch(sink);
        }
    }

    /// A pointer made contact.
    pub fn on_pointer_down(&mut self, id: impl Into<PointerId>, x: f64, y: f64) {
        // Down never produces deltas.
        let _ = self.process(&PointerEvent::down(id, x, y));
    }

    /// A pointer moved.
    pub fn on_pointer_move(&mut self, id: impl Into<PointerId>, x: f64, y: f64) -> Vec<GestureDelta> {
        self.process(&PointerEvent::moved(id, x, y))
    }

    /// A pointer lifted.
    pub fn on_pointer_up(&mut self, id: impl Into<PointerId>) {
        let _ = self.process(&PointerEvent::up(id));
    }

    /// The platform cancelled a pointer.
    pub fn on_pointer_cancel(&mut self, id: impl Into<PointerId>) {
        let _ = self.process(&PointerEvent::cancel(id));
    }

    /// Number of tracked pointers.
    #[inline]
    #[must_use]
    pub fn active_pointers(&self) -> usize {
        self.session.active_pointers()
    }

    /// Whether a two-pointer gesture is in progress.
    #[inline]
    #[must_use]
    pub fn is_gesturing(&self) -> bool {
        self.session.is_gesturing()
    }

    /// Drop all tracked pointers (e.g. on focus loss).
    pub fn reset(&mut self) {
        self.session = GestureSession::new();
    }

    /// Get a reference to the current configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Update the configuration.
    pub fn set_config(&mut self, config: GestureConfig) {
        self.config = config;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
