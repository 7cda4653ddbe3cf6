//! Focus indicator state machine.
//!
//! The focus indicator is the floating reticle that shows where content would
//! be placed. Each tick it is driven by three inputs only: whether a detection
//! was obtained, whether an object is visible, and whether a coaching overlay
//! is active.

use std::time::Duration;

use arplace_core::{
    ArSession, CameraPose, PlacementOptions, PlaneReference, Quat, RaycastAlignment,
    RaycastTarget, ScreenPoint, WorldPosition,
};

use crate::hints::{HintKind, HintScheduler, FOCUS_HINT};
use crate::resolver::PlacementResolver;

/// Where the indicator node is parented in the scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Attachment {
    /// Attached to the camera, floating in front of it.
    #[default]
    Camera,
    /// Attached to the scene root at a world position.
    Scene,
}

/// State of the focus indicator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FocusState {
    /// No placement information yet.
    #[default]
    Initializing,
    /// A surface was found at `position`.
    Detecting {
        /// World position of the surface.
        position: WorldPosition,
        /// Tracked plane under the indicator, used for orientation.
        plane: Option<PlaneReference>,
        /// Camera pose at detection time, used for orientation without a plane.
        camera: CameraPose,
    },
    /// Suppressed because an object is visible or coaching is active.
    Hidden,
}

/// Per-tick signals from the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusSignals {
    /// An object is currently placed and visible.
    pub object_visible: bool,
    /// The session's coaching overlay is showing.
    pub coaching_active: bool,
}

/// A successful surface detection for this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// World position of the surface.
    pub position: WorldPosition,
    /// Tracked plane, if the surface is one.
    pub plane: Option<PlaneReference>,
    /// Camera pose the detection was made from.
    pub camera: CameraPose,
}

/// Detects a surface by raycasting through `point` against tracked and
/// estimated planes of any alignment.
///
/// Returns `None` unless the camera's tracking is normal.
pub fn detect_by_raycast<S: ArSession + ?Sized>(
    session: &S,
    point: ScreenPoint,
) -> Option<Detection> {
    let camera = session.current_camera()?;
    if !camera.tracking.is_normal() {
        return None;
    }
    let query =
        session.raycast_query(point, RaycastTarget::EstimatedPlane, RaycastAlignment::Any)?;
    let result = session.raycast(&query).into_iter().next()?;
    Some(Detection {
        position: result.position,
        plane: result.plane,
        camera,
    })
}

/// Detects a surface with the full placement cascade.
///
/// `previous` anchors the infinite-plane fallback. Returns `None` unless the
/// camera's tracking is normal.
pub fn detect_by_resolver<S: ArSession + ?Sized>(
    resolver: &PlacementResolver,
    session: &S,
    point: ScreenPoint,
    previous: Option<WorldPosition>,
) -> Option<Detection> {
    let camera = session.current_camera()?;
    if !camera.tracking.is_normal() {
        return None;
    }
    let resolution = resolver.resolve(session, point, previous, false);
    Some(Detection {
        position: resolution.position?,
        plane: resolution.plane,
        camera,
    })
}

/// The focus indicator.
#[derive(Debug, Clone)]
pub struct FocusIndicator {
    state: FocusState,
    attachment: Attachment,
    coaching_active: bool,
    last_position: Option<WorldPosition>,
    hint_delay: Duration,
}

impl FocusIndicator {
    /// Creates an indicator in the `Initializing` state, attached to the camera.
    pub fn new(options: &PlacementOptions) -> Self {
        Self {
            state: FocusState::Initializing,
            attachment: Attachment::Camera,
            coaching_active: false,
            last_position: None,
            hint_delay: options.focus_hint_delay(),
        }
    }

    /// Current state.
    pub fn state(&self) -> &FocusState {
        &self.state
    }

    /// Current scene graph attachment.
    pub fn attachment(&self) -> Attachment {
        self.attachment
    }

    /// The most recently detected position, kept across `Hidden` and
    /// `Initializing` ticks.
    pub fn last_position(&self) -> Option<WorldPosition> {
        self.last_position
    }

    /// Whether the UI may offer to add an object.
    pub fn add_object_available(&self) -> bool {
        matches!(self.state, FocusState::Detecting { .. }) && !self.coaching_active
    }

    /// Orientation of the indicator while detecting.
    ///
    /// On a tracked plane the indicator takes the plane's orientation;
    /// otherwise it is turned about the vertical axis to face along the
    /// camera's heading.
    pub fn orientation(&self) -> Option<Quat> {
        match self.state {
            FocusState::Detecting {
                plane: Some(plane), ..
            } => Some(plane.rotation()),
            FocusState::Detecting { camera, .. } => {
                let forward = camera.forward();
                let yaw = (-forward.x).atan2(-forward.z);
                Some(Quat::from_rotation_y(yaw))
            }
            FocusState::Initializing | FocusState::Hidden => None,
        }
    }

    /// Advances the state machine by one tick.
    ///
    /// Returns true if the state or attachment changed. Whenever the indicator
    /// is visible the focus hint is scheduled; a detection cancels it.
    pub fn update(
        &mut self,
        signals: FocusSignals,
        detection: Option<Detection>,
        hints: &mut HintScheduler,
        now: Duration,
    ) -> bool {
        let previous = (self.state, self.attachment);
        self.coaching_active = signals.coaching_active;

        if signals.object_visible || signals.coaching_active {
            self.state = FocusState::Hidden;
        } else {
            hints.schedule(HintKind::FocusSquare, FOCUS_HINT, self.hint_delay, now);

            match detection {
                Some(detection) => {
                    self.state = FocusState::Detecting {
                        position: detection.position,
                        plane: detection.plane,
                        camera: detection.camera,
                    };
                    self.attachment = Attachment::Scene;
                    self.last_position = Some(detection.position);
                    hints.cancel(HintKind::FocusSquare);
                }
                None => {
                    self.state = FocusState::Initializing;
                    self.attachment = Attachment::Camera;
                }
            }
        }

        let changed = previous != (self.state, self.attachment);
        if changed {
            log::debug!(
                "focus indicator -> {} ({:?})",
                state_name(&self.state),
                self.attachment
            );
        }
        changed
    }

    /// Forces the `Hidden` state.
    pub fn hide(&mut self) {
        self.state = FocusState::Hidden;
    }

    /// Returns to `Initializing`, attached to the camera, forgetting the last position.
    pub fn reset(&mut self) {
        self.state = FocusState::Initializing;
        self.attachment = Attachment::Camera;
        self.last_position = None;
    }
}

fn state_name(state: &FocusState) -> &'static str {
    match state {
        FocusState::Initializing => "initializing",
        FocusState::Detecting { .. } => "detecting",
        FocusState::Hidden => "hidden",
    }
}
