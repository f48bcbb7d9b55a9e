#![forbid(unsafe_code)]

//! The editor session.
//!
//! [`EditorSession`] owns the live edit state and wires the pieces together:
//!
//! ```text
//! pointer events ─► GestureRecognizer ─► deltas ─► TransformState
//!                        ▲ gated by PlacementController       │
//!                                                             ├─► HistoryManager (on commit)
//! corner drags ─► TransformState.corners ─► HomographySolver  │
//!                                                             └─► FramePublisher ─► renderers
//! hit-test poses / select ─► PlacementController ─► anchor + commit
//! ```
//!
//! # Commit points
//!
//! History checkpoints are taken on discrete events only: gesture end (when
//! `commit_on_gesture_end`), corner drag end, adjustment settle, placement
//! select and AR placement reset, overlay load, and project load. Live edits in between are
//! published to renderers but not checkpointed; undo treats them as
//! uncommitted changes.
//!
//! Image slots are not part of a snapshot. Placement state follows the
//! anchor in AR mode: undoing past `select` returns to `Searching`, and the
//! matching redo places again. Otherwise undo never un-places or un-locks.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Degenerate corner drag | Previous quad and homography kept, [`Notice::DegenerateQuad`] |
//! | Gesture while locked | Ignored, [`Notice::PlacementLocked`] on pointer down |
//! | Corner edit while locked | Ignored, [`Notice::PlacementLocked`] |
//! | Hit-test results outside AR mode | Ignored |
//! | Undo/redo on empty stack | No-op, [`Notice::NothingToUndo`] / [`Notice::NothingToRedo`] |
//! | Hit-test failure | Logged, stays `Searching`, [`Notice::HitTestFailed`] |
//! | Background removal failure | Isolate reverted, [`Notice::BackgroundRemovalFailed`] |

use gxr_core::geometry::UNIT_SQUARE;
use gxr_core::{
    AdjustmentError, AdjustmentKey, AdjustmentState, DegenerateConfiguration, EditSnapshot,
    GestureDelta, GestureRecognizer, GestureSink, Homography, Point, PointerEvent, PointerPhase,
    Pose, Quad, TransformState,
};
use tracing::{debug, warn};

use crate::config::EditorConfig;
use crate::frame::{FramePublisher, FrameReader, FrameSnapshot};
use crate::images::{ImageHandle, IsolateOutcome, OverlayImages};
use crate::mode::EditorMode;
use crate::notice::Notice;
use crate::placement::{HitTestSourceId, PlacementController, PlacementError, PlacementState};
use crate::project::{ProjectError, ProjectFile, ProjectImages};
use crate::undo::HistoryManager;

/// A live editing session.
#[derive(Debug)]
pub struct EditorSession {
    config: EditorConfig,
    mode: EditorMode,
    recognizer: GestureRecognizer,
    transform: TransformState,
    adjustments: AdjustmentState,
    /// Last successful solve for `transform.corners`.
    homography: Option<Homography>,
    history: HistoryManager<EditSnapshot>,
    placement: PlacementController,
    images: OverlayImages,
    publisher: FramePublisher,
    notices: Vec<Notice>,
    /// A gesture changed the transform since the last checkpoint.
    gesture_dirty: bool,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    /// Start a session. The neutral state is the first checkpoint, so the
    /// first edit can be undone.
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        let mut session = Self {
            mode: config.initial_mode,
            recognizer: GestureRecognizer::new(config.gesture),
            transform: TransformState::default(),
            adjustments: AdjustmentState::default(),
            homography: None,
            history: HistoryManager::new(config.history.clone()),
            placement: PlacementController::new(),
            images: OverlayImages::new(),
            publisher: FramePublisher::new(),
            notices: Vec::new(),
            gesture_dirty: false,
            config,
        };
        session.history.commit(session.snapshot());
        session.publish();
        session
    }

    // ====================================================================
    // Accessors
    // ====================================================================

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    #[must_use]
    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    #[must_use]
    pub fn transform(&self) -> &TransformState {
        &self.transform
    }

    #[must_use]
    pub fn adjustments(&self) -> &AdjustmentState {
        &self.adjustments
    }

    #[must_use]
    pub fn homography(&self) -> Option<&Homography> {
        self.homography.as_ref()
    }

    #[must_use]
    pub fn placement(&self) -> PlacementState {
        self.placement.state()
    }

    #[must_use]
    pub fn images(&self) -> &OverlayImages {
        &self.images
    }

    #[must_use]
    pub fn history(&self) -> &HistoryManager<EditSnapshot> {
        &self.history
    }

    /// The live state as a snapshot value.
    #[must_use]
    pub fn snapshot(&self) -> EditSnapshot {
        EditSnapshot::new(self.transform, self.adjustments)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo(&self.snapshot())
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// A read handle for a renderer.
    #[must_use]
    pub fn reader(&self) -> FrameReader {
        self.publisher.reader()
    }

    /// Drain queued notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // ====================================================================
    // Internals
    // ====================================================================

    fn frame(&self) -> FrameSnapshot {
        FrameSnapshot {
            sequence: 0,
            mode: self.mode,
            transform: self.transform,
            adjustments: self.adjustments,
            homography: self.homography,
            placement: self.placement.state(),
            overlay: self.images.active_overlay().cloned(),
            background: self.images.background().cloned(),
        }
    }

    fn publish(&mut self) {
        let frame = self.frame();
        self.publisher.publish(frame);
    }

    /// Checkpoint the live state unless it already is the newest checkpoint.
    fn checkpoint(&mut self) {
        let snapshot = self.snapshot();
        if self.history.latest() != Some(&snapshot) {
            self.history.commit(snapshot);
        }
        self.gesture_dirty = false;
    }

    fn notify(&mut self, notice: Notice) {
        debug!(notice = ?notice, "notice");
        self.notices.push(notice);
    }

    fn solve_corners(&self, corners: &Quad) -> Result<Homography, DegenerateConfiguration> {
        self.config.solver.solve_with(&UNIT_SQUARE, corners)
    }

    /// Apply a history or project state whole.
    fn apply_snapshot(&mut self, snapshot: EditSnapshot) {
        self.transform = snapshot.transform;
        self.adjustments = snapshot.adjustments;
        self.homography = match &self.transform.corners {
            Some(corners) => match self.solve_corners(corners) {
                Ok(h) => Some(h),
                Err(e) => {
                    warn!(error = %e, "restored corners are degenerate");
                    self.notices.push(Notice::DegenerateQuad);
                    None
                }
            },
            None => None,
        };
        self.recognizer.reset();
        self.gesture_dirty = false;
    }

    /// In AR mode the placement is `Placed` exactly when an anchor exists.
    fn sync_placement_with_anchor(&mut self) {
        if self.mode.uses_anchor() {
            self.placement.sync_anchor(self.transform.anchor.is_some());
        }
    }

    /// Corner edits are transform edits; refuse them while locked.
    fn corner_edits_locked(&mut self) -> bool {
        if self.placement.allows_gestures() {
            return false;
        }
        self.notify(Notice::PlacementLocked);
        true
    }

    fn apply_delta(&mut self, delta: GestureDelta) {
        self.transform = self.transform.apply_delta(delta, self.config.min_scale);
        self.gesture_dirty = true;
    }

    // ====================================================================
    // Mode
    // ====================================================================

    pub fn set_mode(&mut self, mode: EditorMode) {
        if mode == self.mode {
            return;
        }
        debug!(from = self.mode.as_str(), to = mode.as_str(), "editor mode");
        self.mode = mode;
        self.recognizer.reset();
        if !mode.uses_anchor() && self.images.original().is_some() {
            self.placement.place_on_screen();
        }
        self.sync_placement_with_anchor();
        self.publish();
    }

    // ====================================================================
    // Pointer input
    // ====================================================================

    /// Feed one pointer event. Returns the deltas applied to the transform.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> Vec<GestureDelta> {
        if !self.placement.allows_gestures() {
            if event.phase == PointerPhase::Down {
                self.notify(Notice::PlacementLocked);
            }
            return Vec::new();
        }

        let deltas = self.recognizer.process(event);
        for delta in &deltas {
            self.apply_delta(*delta);
        }
        if !deltas.is_empty() {
            self.publish();
        }

        if event.is_release()
            && self.recognizer.active_pointers() == 0
            && self.gesture_dirty
            && self.config.commit_on_gesture_end
        {
            self.checkpoint();
        }
        deltas
    }

    pub fn on_pointer_down(&mut self, id: i64, x: f64, y: f64) {
        self.handle_pointer(&PointerEvent::down(id, x, y));
    }

    pub fn on_pointer_move(&mut self, id: i64, x: f64, y: f64) -> Vec<GestureDelta> {
        self.handle_pointer(&PointerEvent::moved(id, x, y))
    }

    pub fn on_pointer_up(&mut self, id: i64) {
        self.handle_pointer(&PointerEvent::up(id));
    }

    pub fn on_pointer_cancel(&mut self, id: i64) {
        self.handle_pointer(&PointerEvent::cancel(id));
    }

    // ====================================================================
    // Adjustments
    // ====================================================================

    /// Live slider edit. Not checkpointed until [`settle_adjustments`].
    ///
    /// [`settle_adjustments`]: EditorSession::settle_adjustments
    pub fn set_adjustment(&mut self, key: AdjustmentKey, value: f64) -> Result<(), AdjustmentError> {
        self.adjustments = self.adjustments.set(key, value)?;
        self.publish();
        Ok(())
    }

    /// The slider was released.
    pub fn settle_adjustments(&mut self) {
        self.checkpoint();
    }

    pub fn reset_adjustments(&mut self) {
        self.adjustments = self.adjustments.reset();
        self.checkpoint();
        self.publish();
    }

    // ====================================================================
    // Perspective corners
    // ====================================================================

    /// Enter perspective mode with an axis-aligned quad of the overlay's
    /// on-screen size.
    pub fn enable_perspective(&mut self, width: f64, height: f64) -> Result<(), DegenerateConfiguration> {
        if self.corner_edits_locked() {
            return Ok(());
        }
        let corners = self.transform.initial_corners(width, height);
        self.set_corners(corners)?;
        self.checkpoint();
        Ok(())
    }

    /// Replace the whole quad (live; commit with [`end_corner_drag`]).
    ///
    /// [`end_corner_drag`]: EditorSession::end_corner_drag
    pub fn set_corners(&mut self, corners: Quad) -> Result<(), DegenerateConfiguration> {
        let next = self
            .transform
            .with_corners(corners)
            .map_err(DegenerateConfiguration::Destination);
        self.accept_corners(next)
    }

    /// Drag one handle (live; commit with [`end_corner_drag`]).
    ///
    /// [`end_corner_drag`]: EditorSession::end_corner_drag
    pub fn drag_corner(&mut self, index: usize, to: Point) -> Result<(), DegenerateConfiguration> {
        let seed = self.transform.initial_corners(1.0, 1.0);
        let next = self
            .transform
            .move_corner(index, to, &seed)
            .map_err(DegenerateConfiguration::Destination);
        self.accept_corners(next)
    }

    fn accept_corners(
        &mut self,
        next: Result<TransformState, DegenerateConfiguration>,
    ) -> Result<(), DegenerateConfiguration> {
        if self.corner_edits_locked() {
            return Ok(());
        }
        let solved = next.and_then(|t| {
            let corners = t.corners.unwrap_or(UNIT_SQUARE);
            self.solve_corners(&corners).map(|h| (t, h))
        });
        match solved {
            Ok((transform, homography)) => {
                self.transform = transform;
                self.homography = Some(homography);
                self.publish();
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "degenerate corner quad, keeping previous");
                self.notify(Notice::DegenerateQuad);
                Err(e)
            }
        }
    }

    /// The handle was released.
    pub fn end_corner_drag(&mut self) {
        self.checkpoint();
    }

    /// Back to affine placement.
    pub fn clear_perspective(&mut self) {
        if !self.transform.is_perspective() || self.corner_edits_locked() {
            return;
        }
        self.transform = self.transform.clear_corners();
        self.homography = None;
        self.checkpoint();
        self.publish();
    }

    // ====================================================================
    // History
    // ====================================================================

    /// Returns whether anything changed.
    pub fn undo(&mut self) -> bool {
        let live = self.snapshot();
        match self.history.undo(&live) {
            Some(snapshot) => {
                self.apply_snapshot(snapshot);
                self.sync_placement_with_anchor();
                self.publish();
                true
            }
            None => {
                self.notify(Notice::NothingToUndo);
                false
            }
        }
    }

    /// Returns whether anything changed.
    pub fn redo(&mut self) -> bool {
        let live = self.snapshot();
        match self.history.redo(&live) {
            Some(snapshot) => {
                self.apply_snapshot(snapshot);
                self.sync_placement_with_anchor();
                self.publish();
                true
            }
            None => {
                self.notify(Notice::NothingToRedo);
                false
            }
        }
    }

    // ====================================================================
    // AR placement
    // ====================================================================

    pub fn begin_ar_session(&mut self) {
        self.placement.begin_session();
    }

    /// Whether to issue the hit-test source request now (once per session).
    pub fn request_hit_test_source(&mut self) -> bool {
        self.placement.request_hit_test_source()
    }

    pub fn on_hit_test_source(&mut self, source: HitTestSourceId) {
        self.placement.on_hit_test_source(source);
    }

    /// Hit poses only drive the reticle in AR mode.
    pub fn on_hit_test_results(&mut self, poses: &[Pose]) {
        if !self.mode.uses_anchor() {
            return;
        }
        let before = self.placement.state();
        self.placement.on_hit_test_results(poses);
        if self.placement.state() != before {
            self.publish();
        }
    }

    pub fn on_hit_test_failed(&mut self, reason: &str) {
        self.placement.on_hit_test_failed(reason);
        self.notify(Notice::HitTestFailed);
        self.publish();
    }

    pub fn end_ar_session(&mut self) {
        self.placement.end_session();
        self.publish();
    }

    /// Place at the reticle and checkpoint.
    pub fn select(&mut self) -> Result<(), PlacementError> {
        let pose = self.placement.select()?;
        self.transform = self.transform.with_anchor(pose);
        self.checkpoint();
        self.publish();
        Ok(())
    }

    /// Returns whether the placement is now locked.
    pub fn toggle_lock(&mut self) -> Result<bool, PlacementError> {
        let locked = self.placement.toggle_lock()?;
        if locked {
            // Drop any half-finished gesture so unlock starts clean.
            self.recognizer.reset();
            if self.gesture_dirty {
                self.checkpoint();
            }
        }
        self.publish();
        Ok(locked)
    }

    /// Forget the placement and search again. In AR mode the anchor is
    /// dropped and checkpointed, so undo restores the placement.
    pub fn reset_placement(&mut self) -> Result<(), PlacementError> {
        if let Err(e) = self.placement.reset_placement() {
            if e == PlacementError::Locked {
                self.notify(Notice::PlacementLocked);
            }
            return Err(e);
        }
        self.recognizer.reset();
        if self.mode.uses_anchor() && self.transform.anchor.is_some() {
            self.transform = self.transform.clear_anchor();
            self.checkpoint();
        }
        self.publish();
        Ok(())
    }

    // ====================================================================
    // Images
    // ====================================================================

    /// Load a new overlay. Checkpoints the current state.
    pub fn load_overlay(&mut self, image: ImageHandle) {
        self.images.load_overlay(image);
        if !self.mode.uses_anchor() {
            self.placement.place_on_screen();
        }
        self.checkpoint();
        self.publish();
    }

    pub fn set_background(&mut self, image: ImageHandle) {
        self.images.set_background(image);
        self.publish();
    }

    pub fn toggle_isolate(&mut self) -> IsolateOutcome {
        let outcome = self.images.toggle_isolate();
        self.publish();
        outcome
    }

    pub fn on_background_removed(&mut self, source: &ImageHandle, result: ImageHandle) {
        if self.images.on_background_removed(source, result) {
            self.publish();
        }
    }

    pub fn on_background_removal_failed(&mut self, source: &ImageHandle, reason: &str) {
        if self.images.on_background_removal_failed(source, reason) {
            self.notify(Notice::BackgroundRemovalFailed);
            self.publish();
        }
    }

    // ====================================================================
    // Projects
    // ====================================================================

    /// Capture the session for saving.
    #[must_use]
    pub fn to_project(&self) -> ProjectFile {
        let images = ProjectImages {
            overlay: self.images.original().cloned(),
            background_removed: self.images.removed().cloned(),
            background: self.images.background().cloned(),
        };
        ProjectFile::new(self.snapshot(), images, self.mode)
    }

    /// Apply a project. Equivalent to a commit of its snapshot.
    pub fn load_project(&mut self, project: ProjectFile) -> Result<(), ProjectError> {
        project.validate()?;
        self.apply_snapshot(project.snapshot());
        let ProjectImages {
            overlay,
            background_removed,
            background,
        } = project.images;
        self.images.restore(overlay, background_removed, background);
        self.mode = project.mode;
        if !self.mode.uses_anchor() && self.images.original().is_some() {
            self.placement.place_on_screen();
        }
        self.sync_placement_with_anchor();
        self.history.commit(self.snapshot());
        self.notify(Notice::ProjectLoaded);
        self.publish();
        Ok(())
    }

    pub fn load_project_json(&mut self, json: &str) -> Result<(), ProjectError> {
        let project = ProjectFile::from_json(json)?;
        self.load_project(project)
    }
}

/// Listener-style delivery: external recognizers can drive the session.
impl GestureSink for EditorSession {
    fn on_pan(&mut self, dx: f64, dy: f64) {
        if self.placement.allows_gestures() {
            self.apply_delta(GestureDelta::Pan { dx, dy });
            self.publish();
        }
    }

    fn on_scale(&mut self, factor: f64) {
        if self.placement.allows_gestures() {
            self.apply_delta(GestureDelta::Scale(factor));
            self.publish();
        }
    }

    fn on_rotate(&mut self, delta_radians: f64) {
        if self.placement.allows_gestures() {
            self.apply_delta(GestureDelta::Rotate(delta_radians));
            self.publish();
        }
    }
}
