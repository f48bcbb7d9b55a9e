#![forbid(unsafe_code)]

//! Reticle-to-anchor placement state machine.
//!
//! ```text
//!             hit pose                select
//! Searching ───────────► ReticleVisible ──────► Placed ◄──► Locked
//!     ▲      ◄───────────  (empty hits,           │   lock/unlock
//!     │       failure, session end)                │
//!     └────────────────────────────────────────────┘
//!                    reset_placement
//! ```
//!
//! [`PlacementController`] is the single authority on whether gesture deltas
//! may reach the transform: [`allows_gestures`](PlacementController::allows_gestures)
//! is `false` exactly while `Locked`.
//!
//! # Hit-test source guard
//!
//! The AR runtime hands out a hit-test source asynchronously. The request is
//! issued at most once per session: [`request_hit_test_source`] returns
//! `true` only for the first call. A delivered source is kept only if it was
//! requested in the current session. Session end clears both the guard and
//! the cached source.
//!
//! [`request_hit_test_source`]: PlacementController::request_hit_test_source
//!
//! # Failure Modes
//!
//! - Hit-test failures and non-finite poses are logged and leave the
//!   controller in `Searching`. They are never fatal.
//! - Invalid user transitions return [`PlacementError`] and change nothing.

use std::fmt;

use gxr_core::Pose;
use tracing::{debug, warn};

/// Opaque handle for the AR runtime's hit-test source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HitTestSourceId(pub u64);

/// Placement lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PlacementState {
    #[default]
    Searching,
    /// A candidate surface pose is under the reticle.
    ReticleVisible(Pose),
    Placed,
    /// Placed, with gesture edits suppressed.
    Locked,
}

impl PlacementState {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Searching => "searching",
            Self::ReticleVisible(_) => "reticle_visible",
            Self::Placed => "placed",
            Self::Locked => "locked",
        }
    }

    #[must_use]
    pub const fn is_placed(&self) -> bool {
        matches!(self, Self::Placed | Self::Locked)
    }
}

impl fmt::Display for PlacementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// User action that was not valid in the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    /// `select` without a visible reticle.
    NoReticle { state: &'static str },
    /// `lock` or `reset_placement` before anything was placed.
    NotPlaced { state: &'static str },
    /// The placement is locked; unlock first.
    Locked,
    /// `unlock` while not locked.
    NotLocked { state: &'static str },
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoReticle { state } => write!(f, "no reticle to place (state: {state})"),
            Self::NotPlaced { state } => write!(f, "nothing placed (state: {state})"),
            Self::Locked => f.write_str("placement is locked"),
            Self::NotLocked { state } => write!(f, "placement is not locked (state: {state})"),
        }
    }
}

impl std::error::Error for PlacementError {}

/// Placement state plus the per-session hit-test bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct PlacementController {
    state: PlacementState,
    session_active: bool,
    source_requested: bool,
    source: Option<HitTestSourceId>,
}

impl PlacementController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> PlacementState {
        self.state
    }

    /// `false` while locked.
    #[inline]
    #[must_use]
    pub fn allows_gestures(&self) -> bool {
        !matches!(self.state, PlacementState::Locked)
    }

    #[must_use]
    pub fn is_session_active(&self) -> bool {
        self.session_active
    }

    #[must_use]
    pub fn hit_test_source(&self) -> Option<HitTestSourceId> {
        self.source
    }

    fn transition(&mut self, to: PlacementState) {
        if self.state != to {
            debug!(from = self.state.name(), to = to.name(), "placement transition");
        }
        self.state = to;
    }

    // ====================================================================
    // AR session
    // ====================================================================

    /// The AR session started.
    pub fn begin_session(&mut self) {
        self.session_active = true;
        self.source_requested = false;
        self.source = None;
        debug!("ar session started");
    }

    /// Whether the caller should issue a hit-test source request now.
    /// Returns `true` once per session.
    pub fn request_hit_test_source(&mut self) -> bool {
        if !self.session_active || self.source_requested {
            return false;
        }
        self.source_requested = true;
        true
    }

    /// The runtime delivered the requested source. Deliveries nobody asked
    /// for in this session (late answers to an ended session) are dropped.
    pub fn on_hit_test_source(&mut self, source: HitTestSourceId) {
        if !self.session_active || !self.source_requested || self.source.is_some() {
            debug!(source = source.0, "dropping unrequested hit-test source");
            return;
        }
        self.source = Some(source);
    }

    /// Per-frame hit-test results, best first. Only the first pose is used.
    pub fn on_hit_test_results(&mut self, poses: &[Pose]) {
        if !self.session_active || self.state.is_placed() {
            return;
        }
        match poses.first() {
            Some(pose) if pose.is_finite() => self.transition(PlacementState::ReticleVisible(*pose)),
            Some(_) => {
                warn!(state = self.state.name(), "ignoring non-finite hit-test pose");
                self.transition(PlacementState::Searching);
            }
            None => self.transition(PlacementState::Searching),
        }
    }

    /// The runtime reported a hit-test or source failure.
    pub fn on_hit_test_failed(&mut self, reason: &str) {
        warn!(reason, state = self.state.name(), "hit test failed");
        if matches!(self.state, PlacementState::ReticleVisible(_)) {
            self.transition(PlacementState::Searching);
        }
    }

    /// The AR session ended. Any outstanding request is implicitly cancelled.
    pub fn end_session(&mut self) {
        self.session_active = false;
        self.source_requested = false;
        self.source = None;
        if matches!(self.state, PlacementState::ReticleVisible(_)) {
            self.transition(PlacementState::Searching);
        }
        debug!(state = self.state.name(), "ar session ended");
    }

    // ====================================================================
    // User actions
    // ====================================================================

    /// Place at the reticle. Returns the pose for the caller to commit.
    pub fn select(&mut self) -> Result<Pose, PlacementError> {
        match self.state {
            PlacementState::ReticleVisible(pose) => {
                self.transition(PlacementState::Placed);
                Ok(pose)
            }
            other => Err(PlacementError::NoReticle { state: other.name() }),
        }
    }

    /// Follow a history restore of the anchor. An undone anchor drops the
    /// placement back to `Searching`; a redone anchor places it again.
    pub fn sync_anchor(&mut self, anchored: bool) {
        match (anchored, self.state.is_placed()) {
            (false, true) => self.transition(PlacementState::Searching),
            (true, false) => self.transition(PlacementState::Placed),
            _ => {}
        }
    }

    /// Place without an anchor (2D overlay and mockup modes).
    pub fn place_on_screen(&mut self) {
        if !self.state.is_placed() {
            self.transition(PlacementState::Placed);
        }
    }

    pub fn lock(&mut self) -> Result<(), PlacementError> {
        match self.state {
            PlacementState::Placed => {
                self.transition(PlacementState::Locked);
                Ok(())
            }
            PlacementState::Locked => Ok(()),
            other => Err(PlacementError::NotPlaced { state: other.name() }),
        }
    }

    pub fn unlock(&mut self) -> Result<(), PlacementError> {
        match self.state {
            PlacementState::Locked => {
                self.transition(PlacementState::Placed);
                Ok(())
            }
            other => Err(PlacementError::NotLocked { state: other.name() }),
        }
    }

    /// Flip between `Placed` and `Locked`. Returns whether it is now locked.
    pub fn toggle_lock(&mut self) -> Result<bool, PlacementError> {
        if matches!(self.state, PlacementState::Locked) {
            self.unlock().map(|()| false)
        } else {
            self.lock().map(|()| true)
        }
    }

    /// Discard the placement and search again.
    pub fn reset_placement(&mut self) -> Result<(), PlacementError> {
        match self.state {
            PlacementState::Placed => {
                self.transition(PlacementState::Searching);
                Ok(())
            }
            PlacementState::Locked => Err(PlacementError::Locked),
            other => Err(PlacementError::NotPlaced { state: other.name() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose(z: f64) -> Pose {
        Pose::new([0.0, 0.0, z], [0.0, 0.0, 0.0, 1.0])
    }

    fn active() -> PlacementController {
        let mut c = PlacementController::new();
        c.begin_session();
        c
    }

    #[test]
    fn full_lifecycle() {
        let mut c = active();
        assert_eq!(c.state(), PlacementState::Searching);
        c.on_hit_test_results(&[pose(-1.0), pose(-2.0)]);
        assert_eq!(c.state(), PlacementState::ReticleVisible(pose(-1.0)));
        assert_eq!(c.select(), Ok(pose(-1.0)));
        assert_eq!(c.state(), PlacementState::Placed);
        assert_eq!(c.toggle_lock(), Ok(true));
        assert!(!c.allows_gestures());
        assert_eq!(c.toggle_lock(), Ok(false));
        assert!(c.allows_gestures());
        assert_eq!(c.reset_placement(), Ok(()));
        assert_eq!(c.state(), PlacementState::Searching);
    }

    #[test]
    fn select_without_reticle_fails() {
        let mut c = active();
        assert_eq!(
            c.select(),
            Err(PlacementError::NoReticle { state: "searching" })
        );
    }

    #[test]
    fn hits_ignored_without_session() {
        let mut c = PlacementController::new();
        c.on_hit_test_results(&[pose(-1.0)]);
        assert_eq!(c.state(), PlacementState::Searching);
    }

    #[test]
    fn empty_hits_drop_reticle() {
        let mut c = active();
        c.on_hit_test_results(&[pose(-1.0)]);
        c.on_hit_test_results(&[]);
        assert_eq!(c.state(), PlacementState::Searching);
    }

    #[test]
    fn non_finite_pose_is_not_a_hit() {
        let mut c = active();
        c.on_hit_test_results(&[Pose::new([f64::NAN, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0])]);
        assert_eq!(c.state(), PlacementState::Searching);
    }

    #[test]
    fn hits_after_placement_do_not_move_it() {
        let mut c = active();
        c.on_hit_test_results(&[pose(-1.0)]);
        c.select().unwrap();
        c.on_hit_test_results(&[pose(-3.0)]);
        assert_eq!(c.state(), PlacementState::Placed);
    }

    #[test]
    fn failure_returns_to_searching() {
        let mut c = active();
        c.on_hit_test_results(&[pose(-1.0)]);
        c.on_hit_test_failed("tracking lost");
        assert_eq!(c.state(), PlacementState::Searching);
    }

    #[test]
    fn source_requested_once_per_session() {
        let mut c = PlacementController::new();
        assert!(!c.request_hit_test_source());
        c.begin_session();
        assert!(c.request_hit_test_source());
        assert!(!c.request_hit_test_source());
        c.on_hit_test_source(HitTestSourceId(9));
        assert_eq!(c.hit_test_source(), Some(HitTestSourceId(9)));

        c.end_session();
        assert_eq!(c.hit_test_source(), None);
        assert!(!c.is_session_active());

        c.begin_session();
        assert!(c.request_hit_test_source());
    }

    #[test]
    fn stale_source_delivery_is_dropped() {
        let mut c = active();
        assert!(c.request_hit_test_source());
        c.end_session();

        // The previous session's answer arrives after a restart.
        c.begin_session();
        c.on_hit_test_source(HitTestSourceId(1));
        assert_eq!(c.hit_test_source(), None);

        assert!(c.request_hit_test_source());
        c.on_hit_test_source(HitTestSourceId(2));
        c.on_hit_test_source(HitTestSourceId(3));
        assert_eq!(c.hit_test_source(), Some(HitTestSourceId(2)));
    }

    #[test]
    fn anchor_sync_follows_history() {
        let mut c = active();
        c.on_hit_test_results(&[pose(-1.0)]);
        c.select().unwrap();
        c.sync_anchor(true);
        assert_eq!(c.state(), PlacementState::Placed);

        c.sync_anchor(false);
        assert_eq!(c.state(), PlacementState::Searching);
        c.sync_anchor(false);
        assert_eq!(c.state(), PlacementState::Searching);

        c.sync_anchor(true);
        assert_eq!(c.state(), PlacementState::Placed);
    }

    #[test]
    fn session_end_keeps_placement() {
        let mut c = active();
        c.on_hit_test_results(&[pose(-1.0)]);
        c.end_session();
        assert_eq!(c.state(), PlacementState::Searching);

        let mut c = active();
        c.on_hit_test_results(&[pose(-1.0)]);
        c.select().unwrap();
        c.lock().unwrap();
        c.end_session();
        assert_eq!(c.state(), PlacementState::Locked);
    }

    #[test]
    fn locked_placement_cannot_reset() {
        let mut c = PlacementController::new();
        c.place_on_screen();
        c.lock().unwrap();
        assert_eq!(c.reset_placement(), Err(PlacementError::Locked));
        assert_eq!(c.state(), PlacementState::Locked);
    }

    #[test]
    fn lock_requires_placement() {
        let mut c = PlacementController::new();
        assert_eq!(
            c.lock(),
            Err(PlacementError::NotPlaced { state: "searching" })
        );
        assert_eq!(
            c.unlock(),
            Err(PlacementError::NotLocked { state: "searching" })
        );
    }
}
