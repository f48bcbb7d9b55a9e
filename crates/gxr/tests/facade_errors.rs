//! The facade's unified error lets callers chain subsystem calls with `?`
//! and recover from any failure without tearing down the session.

use gxr::prelude::*;
use gxr::QuadError;

fn place_and_tune(session: &mut EditorSession, pose: Pose) -> gxr::Result<()> {
    session.begin_ar_session();
    session.on_hit_test_results(&[pose]);
    session.select()?;
    session.set_adjustment(AdjustmentKey::Opacity, 0.5)?;
    session.settle_adjustments();
    session.enable_perspective(100.0, 100.0)?;
    Ok(())
}

fn ar_session() -> EditorSession {
    EditorSession::new(EditorConfig {
        initial_mode: EditorMode::Ar,
        ..EditorConfig::default()
    })
}

#[test]
fn happy_path_chains_with_question_mark() {
    let mut session = ar_session();
    let pose = Pose::new([0.0, 1.0, -2.0], [0.0, 0.0, 0.0, 1.0]);
    place_and_tune(&mut session, pose).unwrap();
    assert_eq!(session.placement(), PlacementState::Placed);
    assert_eq!(session.adjustments().opacity, 0.5);
    assert!(session.homography().is_some());
}

#[test]
fn select_without_reticle_maps_to_reset_placement() {
    let mut session = ar_session();
    session.begin_ar_session();
    let err = Error::from(session.select().unwrap_err());
    assert_eq!(err.recovery(), RecoveryAction::ResetPlacement);
    assert_eq!(session.placement(), PlacementState::Searching);
}

#[test]
fn degenerate_drag_keeps_previous_homography() {
    let mut session = EditorSession::default();
    session.enable_perspective(100.0, 100.0).unwrap();
    let before = *session.homography().unwrap();

    let err = Error::from(session.drag_corner(3, Point::new(-50.0, -50.0)).unwrap_err());
    assert_eq!(err.recovery(), RecoveryAction::KeepPrevious);
    assert_eq!(session.homography(), Some(&before));
    assert_eq!(session.take_notices(), vec![Notice::DegenerateQuad]);
}

#[test]
fn bad_project_is_rejected() {
    let mut session = EditorSession::default();
    let err = Error::from(session.load_project_json(r#"{"version":2}"#).unwrap_err());
    assert_eq!(err.recovery(), RecoveryAction::Reject);
    assert_eq!(err.error_type(), "project");
}

#[test]
fn quad_error_reports_source() {
    let err = Error::from(QuadError::NonFinite { index: 2 });
    assert!(std::error::Error::source(&err).is_some());
    assert!(err.to_string().contains('2'));
}
