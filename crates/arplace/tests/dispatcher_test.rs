//! Integration tests for the scene dispatcher, its modes and the scene queue.

mod common;

use std::time::Duration;

use arplace::{
    ArPlaceError, Attachment, DispatchOutcome, FocusState, HintKind, LimitedReason, MeasureStep,
    Mode, ModeHandler, PlacementOptions, PlaneId, PlaneReference, SceneCommand, SceneDispatcher,
    SceneEvent, SceneGraph, SceneUpdateQueue, SharedScene, SimulatedSession, TrackingQuality,
    TrackingSeverity, Vec2, Vec3,
};
use common::ScriptedSession;
use proptest::prelude::*;

const VIEWPORT: Vec2 = Vec2::new(400.0, 800.0);

fn secs(s: f32) -> Duration {
    Duration::from_secs_f32(s)
}

fn tick(now: Duration) -> SceneEvent {
    SceneEvent::RenderTick {
        now,
        object_visible: false,
        coaching_active: false,
    }
}

/// Camera at the origin facing a wall 2m ahead.
fn wall_session() -> SimulatedSession {
    SimulatedSession::new(VIEWPORT).with_plane(PlaneReference::vertical(
        PlaneId::new(1),
        Vec3::new(0.0, 0.0, -2.0),
        Vec3::Z,
        Vec2::splat(4.0),
    ))
}

fn dispatcher(session: SimulatedSession) -> (SceneDispatcher<SimulatedSession>, SharedScene) {
    let scene = SharedScene::new();
    let queue = SceneUpdateQueue::spawn(scene.clone()).expect("spawn scene queue");
    let center = session.screen_center();
    let dispatcher = SceneDispatcher::new(session, PlacementOptions::default(), center, queue)
        .expect("valid options");
    (dispatcher, scene)
}

#[test]
fn test_invalid_options_rejected() {
    let queue = SceneUpdateQueue::spawn(SharedScene::new()).unwrap();
    let options = PlacementOptions::new().with_marker_camera_offset(-1.0);
    let result = SceneDispatcher::new(wall_session(), options, Vec2::ZERO, queue);
    assert!(matches!(result, Err(ArPlaceError::InvalidOption { .. })));
}

#[test]
fn test_placement_tick_detects_wall() {
    let (mut dispatcher, scene) = dispatcher(wall_session());
    assert_eq!(*dispatcher.current_state(), FocusState::Initializing);

    let outcome = dispatcher.handle(tick(secs(0.0))).unwrap();
    let DispatchOutcome::Ticked { state, hints } = outcome else {
        panic!("expected tick outcome");
    };
    assert!(matches!(state, FocusState::Detecting { plane: Some(_), .. }));
    assert!(hints.is_empty());

    dispatcher.queue().flush().unwrap();
    let snapshot = scene.snapshot();
    assert_eq!(snapshot.placement_indicator.0, Attachment::Scene);
    assert_eq!(snapshot.placement_indicator.1, state);
}

#[test]
fn test_placement_tap_requests_catalog_only_when_detecting() {
    let (mut dispatcher, _scene) = dispatcher(SimulatedSession::new(VIEWPORT));
    dispatcher.handle(tick(secs(0.0))).unwrap();
    assert_eq!(
        dispatcher.handle(SceneEvent::Tap(Vec2::ZERO)).unwrap(),
        DispatchOutcome::Ignored
    );

    let (mut dispatcher, _scene) = self::dispatcher(wall_session());
    dispatcher.handle(tick(secs(0.0))).unwrap();
    assert_eq!(
        dispatcher.handle(SceneEvent::Tap(Vec2::ZERO)).unwrap(),
        DispatchOutcome::CatalogRequested
    );
}

#[test]
fn test_focus_hint_fires_when_no_surface() {
    let (mut dispatcher, _scene) = dispatcher(SimulatedSession::new(VIEWPORT));
    dispatcher.handle(tick(secs(0.0))).unwrap();
    assert!(dispatcher.hints().is_pending(HintKind::FocusSquare));

    let DispatchOutcome::Ticked { hints, .. } = dispatcher.handle(tick(secs(5.0))).unwrap() else {
        panic!("expected tick outcome");
    };
    assert_eq!(hints.len(), 1);
    assert_eq!(hints[0].text, "TRY MOVING LEFT OR RIGHT");
}

#[test]
fn test_coaching_hides_indicator() {
    let (mut dispatcher, _scene) = dispatcher(wall_session());
    dispatcher.handle(tick(secs(0.0))).unwrap();
    let outcome = dispatcher
        .handle(SceneEvent::RenderTick {
            now: secs(0.1),
            object_visible: false,
            coaching_active: true,
        })
        .unwrap();
    assert!(matches!(
        outcome,
        DispatchOutcome::Ticked {
            state: FocusState::Hidden,
            ..
        }
    ));
    assert!(!dispatcher.focus().add_object_available());
}

#[test]
fn test_drag_resolves_with_infinite_plane_request() {
    let (mut dispatcher, _scene) = dispatcher(wall_session());
    let outcome = dispatcher
        .handle(SceneEvent::Drag {
            point: VIEWPORT * 0.5,
            object_position: Some(Vec3::new(0.0, -1.0, -1.0)),
        })
        .unwrap();
    let DispatchOutcome::Dragged(resolution) = outcome else {
        panic!("expected drag outcome");
    };
    assert!(resolution.hit_real);
    assert_eq!(resolution.plane.unwrap().id, PlaneId::new(1));
}

#[test]
fn test_measurement_mode_round_trip() {
    let (mut dispatcher, scene) = dispatcher(wall_session());
    dispatcher.set_mode(Mode::Measurement).unwrap();
    assert_eq!(dispatcher.mode(), Mode::Measurement);
    assert_eq!(*dispatcher.current_state(), FocusState::Hidden);

    let center = VIEWPORT * 0.5;
    let first = dispatcher.handle(SceneEvent::Tap(center)).unwrap();
    assert!(matches!(first, DispatchOutcome::Measured(MeasureStep::Started { .. })));
    let second = dispatcher.handle(SceneEvent::Tap(center)).unwrap();
    assert!(matches!(
        second,
        DispatchOutcome::Measured(MeasureStep::Completed { .. })
    ));

    dispatcher.queue().flush().unwrap();
    assert_eq!(scene.snapshot().markers.len(), 2);

    // Drags are placement-only
    let drag = SceneEvent::Drag {
        point: center,
        object_position: None,
    };
    assert_eq!(dispatcher.handle(drag).unwrap(), DispatchOutcome::Ignored);

    dispatcher.set_mode(Mode::Placement).unwrap();
    assert!(matches!(dispatcher.handler(), ModeHandler::Placement));
    dispatcher.queue().flush().unwrap();
    assert!(scene.snapshot().markers.is_empty());
}

#[test]
fn test_measurement_reset_removes_markers() {
    let (mut dispatcher, scene) = dispatcher(wall_session());
    dispatcher.set_mode(Mode::Measurement).unwrap();
    let center = VIEWPORT * 0.5;
    for _ in 0..3 {
        dispatcher.handle(SceneEvent::Tap(center)).unwrap();
    }
    dispatcher.queue().flush().unwrap();
    assert!(scene.snapshot().markers.is_empty());

    let ModeHandler::Measurement(measurement) = dispatcher.handler() else {
        panic!("expected measurement mode");
    };
    assert!(measurement.session().is_empty());
    assert_eq!(measurement.session().label(), "Distance: ?");
}

#[test]
fn test_measurement_crosshair_uses_resolver() {
    let (mut dispatcher, scene) = dispatcher(wall_session());
    dispatcher.set_mode(Mode::Measurement).unwrap();
    let outcome = dispatcher.handle(tick(secs(0.0))).unwrap();
    assert!(matches!(
        outcome,
        DispatchOutcome::Ticked {
            state: FocusState::Detecting { plane: Some(_), .. },
            ..
        }
    ));
    dispatcher.queue().flush().unwrap();
    assert_eq!(scene.snapshot().measurement_indicator.0, Attachment::Scene);
}

#[test]
fn test_tracking_status() {
    let (mut dispatcher, _scene) = dispatcher(wall_session());
    dispatcher.set_mode(Mode::Measurement).unwrap();
    let limited = TrackingQuality::Limited(LimitedReason::InsufficientFeatures);
    let outcome = dispatcher.handle(SceneEvent::TrackingChanged(limited)).unwrap();
    assert_eq!(
        outcome,
        DispatchOutcome::TrackingStatus {
            text: "Tracking limited: insufficient features",
            severity: TrackingSeverity::Warning,
        }
    );
    let ModeHandler::Measurement(measurement) = dispatcher.handler() else {
        panic!("expected measurement mode");
    };
    assert_eq!(
        measurement.tracking_label(),
        "Tracking limited: insufficient features"
    );
}

#[test]
fn test_restart_resets_state_and_respects_cooldown() {
    let (mut dispatcher, scene) = dispatcher(wall_session());
    dispatcher.handle(tick(secs(0.0))).unwrap();
    dispatcher.set_mode(Mode::Measurement).unwrap();
    dispatcher.handle(SceneEvent::Tap(VIEWPORT * 0.5)).unwrap();

    assert!(dispatcher.restart(secs(1.0)).unwrap());
    assert_eq!(*dispatcher.current_state(), FocusState::Initializing);
    assert!(dispatcher.hints().is_pending(HintKind::PlaneEstimation));
    assert!(!dispatcher.hints().is_pending(HintKind::FocusSquare));
    dispatcher.queue().flush().unwrap();
    assert!(scene.snapshot().markers.is_empty());

    // Inside the five second cooldown
    assert!(!dispatcher.restart(secs(3.0)).unwrap());
    assert!(dispatcher.restart(secs(6.0)).unwrap());
}

#[test]
fn test_plane_search_hint_survives_detection() {
    let (mut dispatcher, _scene) = dispatcher(wall_session());
    dispatcher.restart(secs(0.0)).unwrap();
    dispatcher.handle(tick(secs(1.0))).unwrap();
    assert!(dispatcher.hints().is_pending(HintKind::PlaneEstimation));

    let DispatchOutcome::Ticked { hints, .. } = dispatcher.handle(tick(secs(7.5))).unwrap() else {
        panic!("expected tick outcome");
    };
    assert_eq!(hints.len(), 1);
    assert_eq!(hints[0].kind, HintKind::PlaneEstimation);
}

#[test]
fn test_session_error_prompt() {
    let (dispatcher, _scene) = dispatcher(wall_session());
    let prompt =
        dispatcher.report_session_error(&ArPlaceError::SessionFailed("camera unavailable".into()));
    assert_eq!(prompt.action_label, "Restart Session");
    assert!(prompt.message.contains("camera unavailable"));
}

#[test]
fn test_error_recovery_ignores_restart_cooldown() {
    let (mut dispatcher, scene) = dispatcher(wall_session());
    assert!(dispatcher.restart(secs(0.0)).unwrap());
    dispatcher.set_mode(Mode::Measurement).unwrap();
    dispatcher.handle(tick(secs(1.0))).unwrap();
    dispatcher.handle(SceneEvent::Tap(VIEWPORT * 0.5)).unwrap();
    dispatcher.handle(SceneEvent::Tap(VIEWPORT * 0.5)).unwrap();
    dispatcher.queue().flush().unwrap();
    assert_eq!(scene.snapshot().markers.len(), 2);

    let prompt =
        dispatcher.report_session_error(&ArPlaceError::SessionFailed("sensor failure".into()));
    assert_eq!(prompt.action_label, "Restart Session");
    assert!(!dispatcher.restart(secs(2.0)).unwrap());

    dispatcher.recover_from_error(secs(2.0)).unwrap();
    dispatcher.queue().flush().unwrap();
    assert!(scene.snapshot().markers.is_empty());
    assert_eq!(*dispatcher.current_state(), FocusState::Initializing);
    assert!(dispatcher.hints().is_pending(HintKind::PlaneEstimation));
    let ModeHandler::Measurement(measurement) = dispatcher.handler() else {
        panic!("expected measurement mode");
    };
    assert!(measurement.session().is_empty());
    assert_eq!(*measurement.focus().state(), FocusState::Initializing);

    // Recovery counts as a restart for the cooldown.
    assert!(!dispatcher.restart(secs(6.0)).unwrap());
    assert!(dispatcher.restart(secs(7.0)).unwrap());
}

#[test]
fn test_crosshair_falls_back_to_placement_indicator_position() {
    let placed = Vec3::new(0.5, -1.0, -2.0);
    let session = ScriptedSession::new()
        .raycast_hit(placed)
        .infinite_plane(Vec3::ZERO);
    let queue = SceneUpdateQueue::spawn(SharedScene::new()).unwrap();
    let mut dispatcher =
        SceneDispatcher::new(session, PlacementOptions::default(), VIEWPORT * 0.5, queue).unwrap();

    dispatcher.handle(tick(secs(0.0))).unwrap();
    assert_eq!(dispatcher.focus().last_position(), Some(placed));

    dispatcher.set_mode(Mode::Measurement).unwrap();
    let outcome = dispatcher.handle(tick(secs(0.1))).unwrap();
    assert_eq!(dispatcher.session().last_reference.get(), Some(placed));
    assert!(matches!(
        outcome,
        DispatchOutcome::Ticked {
            state: FocusState::Detecting { position, .. },
            ..
        } if position == placed
    ));
}

#[test]
fn test_set_mode_on_closed_queue_keeps_mode() {
    struct Failing;
    impl SceneGraph for Failing {
        fn apply(&mut self, _command: SceneCommand) {
            panic!("scene graph failure");
        }
    }

    let session = wall_session();
    let center = session.screen_center();
    let queue = SceneUpdateQueue::spawn(Failing).unwrap();
    let mut dispatcher =
        SceneDispatcher::new(session, PlacementOptions::default(), center, queue).unwrap();
    dispatcher.queue().submit(SceneCommand::ClearMarkers).unwrap();
    assert!(dispatcher.queue().flush().is_err());

    assert!(matches!(
        dispatcher.set_mode(Mode::Measurement),
        Err(ArPlaceError::QueueClosed)
    ));
    assert_eq!(dispatcher.mode(), Mode::Placement);
    assert_eq!(*dispatcher.current_state(), FocusState::Initializing);
}

fn tracking_strategy() -> impl Strategy<Value = TrackingQuality> {
    prop_oneof![
        Just(TrackingQuality::NotAvailable),
        Just(TrackingQuality::Limited(LimitedReason::Initializing)),
        Just(TrackingQuality::Limited(LimitedReason::ExcessiveMotion)),
        Just(TrackingQuality::Limited(LimitedReason::InsufficientFeatures)),
        Just(TrackingQuality::Limited(LimitedReason::Relocalizing)),
    ]
}

proptest! {
    #[test]
    fn prop_lost_tracking_converges_to_initializing(
        warmup in 0usize..4,
        hidden in any::<bool>(),
        lost in proptest::collection::vec(tracking_strategy(), 1..6),
    ) {
        let (mut dispatcher, _scene) = dispatcher(wall_session());
        let mut now = 0.0;
        for _ in 0..warmup {
            dispatcher.handle(tick(secs(now))).unwrap();
            now += 0.1;
        }
        if hidden {
            dispatcher
                .handle(SceneEvent::RenderTick {
                    now: secs(now),
                    object_visible: true,
                    coaching_active: false,
                })
                .unwrap();
            now += 0.1;
        }

        for tracking in lost {
            dispatcher.session_mut().set_tracking(tracking);
            dispatcher.handle(tick(secs(now))).unwrap();
            now += 0.1;
            prop_assert_eq!(*dispatcher.current_state(), FocusState::Initializing);
            prop_assert_eq!(dispatcher.focus().attachment(), Attachment::Camera);
        }
    }
}
