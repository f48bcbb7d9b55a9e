#![forbid(unsafe_code)]

//! Structured logging checks.
//!
//! Captures `tracing` events emitted by the editor and verifies that:
//! - warnings carry the fields needed to act on them
//! - history operations report stack depths as fields
//! - placement transitions name both ends
//!
//! Run:
//!   cargo test -p gxr-runtime --test log_capture

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use gxr_core::{Point, Pose};
use gxr_runtime::{EditorConfig, EditorMode, EditorSession, PlacementController};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Test Infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    fields: HashMap<String, String>,
    message: Option<String>,
}

impl CapturedEvent {
    fn has_structured_fields(&self) -> bool {
        self.fields.keys().any(|k| k != "message")
    }

    fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct EventCaptureHandle {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl EventCaptureHandle {
    fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    fn events_at_level(&self, level: tracing::Level) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.level == level)
            .collect()
    }

    fn with_message(&self, message: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.message.as_deref() == Some(message))
            .collect()
    }
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for EventCapture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let fields: HashMap<String, String> = visitor.0.into_iter().collect();
        let message = fields.get("message").cloned();
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            fields,
            message,
        });
    }
}

fn with_captured_events<F>(f: F) -> EventCaptureHandle
where
    F: FnOnce(),
{
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = EventCapture {
        events: Arc::clone(&events),
    };
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::TRACE)
        .with(layer);
    tracing::subscriber::with_default(subscriber, f);
    EventCaptureHandle { events }
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn history_commit_reports_depths() {
    let handle = with_captured_events(|| {
        let _session = EditorSession::default();
    });
    let commits = handle.with_message("history commit");
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].level, tracing::Level::DEBUG);
    assert_eq!(commits[0].field("undo_depth"), Some("1"));
    assert_eq!(commits[0].field("redo_depth"), Some("0"));
}

#[test]
fn undo_and_redo_report_depths() {
    let handle = with_captured_events(|| {
        let mut session = EditorSession::default();
        session.on_pointer_down(1, 0.0, 0.0);
        session.on_pointer_down(2, 100.0, 0.0);
        session.on_pointer_move(2, 200.0, 0.0);
        session.on_pointer_up(2);
        session.on_pointer_up(1);
        assert!(session.undo());
        assert!(session.redo());
    });

    let undo = handle.with_message("history undo");
    assert_eq!(undo.len(), 1);
    assert_eq!(undo[0].field("undo_depth"), Some("1"));
    assert_eq!(undo[0].field("redo_depth"), Some("1"));

    let redo = handle.with_message("history redo");
    assert_eq!(redo.len(), 1);
    assert_eq!(redo[0].field("undo_depth"), Some("2"));
    assert_eq!(redo[0].field("redo_depth"), Some("0"));
}

#[test]
fn degenerate_corner_drag_warns_with_error() {
    let handle = with_captured_events(|| {
        let mut session = EditorSession::default();
        session.enable_perspective(100.0, 100.0).unwrap();
        // Corner 1 of the initial quad sits at (50, -50).
        assert!(session.drag_corner(0, Point::new(50.0, -50.0)).is_err());
    });

    let warnings = handle.with_message("degenerate corner quad, keeping previous");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].level, tracing::Level::WARN);
    assert!(warnings[0].field("error").is_some_and(|e| !e.is_empty()));
}

#[test]
fn placement_transitions_name_both_states() {
    let handle = with_captured_events(|| {
        let mut c = PlacementController::new();
        c.begin_session();
        c.on_hit_test_results(&[Pose::new([0.0, 0.0, -1.0], [0.0, 0.0, 0.0, 1.0])]);
        c.select().unwrap();
    });

    let transitions: Vec<(String, String)> = handle
        .with_message("placement transition")
        .into_iter()
        .map(|e| {
            (
                e.field("from").unwrap_or_default().to_string(),
                e.field("to").unwrap_or_default().to_string(),
            )
        })
        .collect();
    assert_eq!(
        transitions,
        vec![
            ("searching".to_string(), "reticle_visible".to_string()),
            ("reticle_visible".to_string(), "placed".to_string()),
        ]
    );
}

#[test]
fn rejected_config_logs_each_problem() {
    let handle = with_captured_events(|| {
        let config = EditorConfig {
            min_scale: -1.0,
            ..EditorConfig::default()
        };
        assert!(config.validated().is_err());
    });

    let warnings = handle.events_at_level(tracing::Level::WARN);
    assert_eq!(warnings.len(), 1);
    assert!(
        warnings[0]
            .field("problem")
            .is_some_and(|p| p.contains("min_scale"))
    );
}

#[test]
fn warnings_always_carry_fields() {
    let handle = with_captured_events(|| {
        let mut session = EditorSession::new(EditorConfig {
            initial_mode: EditorMode::Ar,
            ..EditorConfig::default()
        });
        session.begin_ar_session();
        session.on_hit_test_results(&[Pose::new([f64::NAN, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0])]);
        session.on_hit_test_failed("tracking lost");
        session.enable_perspective(10.0, 10.0).unwrap();
        let _ = session.drag_corner(2, Point::new(0.0, 0.0));
        let photo = gxr_runtime::ImageHandle::new("blob:photo");
        session.load_overlay(photo.clone());
        session.toggle_isolate();
        session.on_background_removal_failed(&photo, "model unavailable");
    });

    let warnings = handle.events_at_level(tracing::Level::WARN);
    assert!(warnings.len() >= 3);
    for event in &warnings {
        assert!(
            event.has_structured_fields(),
            "WARN event '{}' has no structured fields",
            event.message.as_deref().unwrap_or("<none>")
        );
    }
}
