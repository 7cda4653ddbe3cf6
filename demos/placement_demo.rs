//! Placement and measurement demo.
//!
//! Drives a [`SceneDispatcher`] over a simulated room: a floor and a wall,
//! with a handful of feature points. Run with `RUST_LOG=debug` to see the
//! focus indicator transitions.

use std::time::Duration;

use arplace::*;

fn main() -> Result<()> {
    let _ = env_logger::try_init();

    let viewport = Vec2::new(390.0, 844.0);
    let camera = CameraPose::looking_at(
        Vec3::new(0.0, 1.4, 0.0),
        Vec3::new(0.0, 0.0, -1.5),
        Vec3::Y,
    );
    let session = SimulatedSession::new(viewport)
        .with_camera(camera.with_tracking(TrackingQuality::Limited(
            LimitedReason::Initializing,
        )))
        .with_plane(PlaneReference::horizontal(
            PlaneId::new(1),
            Vec3::ZERO,
            Vec2::new(3.0, 3.0),
        ))
        .with_plane(PlaneReference::vertical(
            PlaneId::new(2),
            Vec3::new(0.0, 1.0, -3.0),
            Vec3::Z,
            Vec2::new(4.0, 2.0),
        ))
        .with_features([Vec3::new(0.3, 0.8, -1.2), Vec3::new(-0.5, 0.1, -2.0)]);

    let options = match std::env::args().nth(1) {
        Some(path) => PlacementOptions::load(path)?,
        None => PlacementOptions::default(),
    };

    let scene = SharedScene::new();
    let queue = SceneUpdateQueue::spawn(scene.clone())?;
    let center = session.screen_center();
    let mut dispatcher = SceneDispatcher::new(session, options, center, queue)?;

    dispatcher.restart(Duration::ZERO)?;

    // A few frames while tracking initializes, then tracking becomes normal.
    for frame in 0..90u32 {
        let now = Duration::from_millis(u64::from(frame) * 100);
        if frame == 30 {
            dispatcher.session_mut().set_tracking(TrackingQuality::Normal);
            let status = dispatcher.handle(SceneEvent::TrackingChanged(TrackingQuality::Normal))?;
            println!("{now:?}: {status:?}");
        }
        if let DispatchOutcome::Ticked { hints, .. } = dispatcher.handle(SceneEvent::RenderTick {
            now,
            object_visible: false,
            coaching_active: false,
        })? {
            for hint in hints {
                println!("{now:?}: hint {:?}: {}", hint.kind, hint.text);
            }
        }
    }
    println!("focus indicator: {:?}", dispatcher.current_state());

    // Measure from the floor to the wall.
    dispatcher.set_mode(Mode::Measurement)?;
    for point in [Vec2::new(195.0, 600.0), Vec2::new(195.0, 200.0)] {
        if let DispatchOutcome::Measured(step) = dispatcher.handle(SceneEvent::Tap(point))? {
            println!("tap at {point}: {step:?}");
        }
    }
    if let ModeHandler::Measurement(measurement) = dispatcher.handler() {
        println!("{}", measurement.session().label());
    }

    dispatcher.queue().flush()?;
    println!("scene has {} markers", scene.snapshot().markers.len());

    dispatcher.set_mode(Mode::Placement)?;
    Ok(())
}
