//! arplace-rs: screen-to-world placement and measurement for AR scenes.
//!
//! Given a 2D screen point and an AR session that can hit test planes,
//! feature points and infinite planes, this crate decides where virtual
//! content should rest in the 3D scene.
//!
//! # Quick Start
//!
//! ```
//! use arplace::*;
//!
//! // A phone held 1.5m above the floor, looking at a point 1m ahead.
//! let camera = CameraPose::looking_at(Vec3::new(0.0, 1.5, 0.0), Vec3::new(0.0, 0.0, -1.0), Vec3::Y);
//! let floor = PlaneReference::horizontal(PlaneId::new(1), Vec3::ZERO, Vec2::splat(4.0));
//! let session = SimulatedSession::new(Vec2::new(390.0, 844.0))
//!     .with_camera(camera)
//!     .with_plane(floor);
//!
//! let resolver = PlacementResolver::new(PlacementOptions::default());
//! let resolution = resolver.resolve(&session, session.screen_center(), None, false);
//! assert!(resolution.hit_real);
//! assert_eq!(resolution.plane.map(|plane| plane.id), Some(PlaneId::new(1)));
//! ```
//!
//! # Components
//!
//! - [`PlacementResolver`] - the hit-test cascade turning screen points into positions
//! - [`FocusIndicator`] - the initializing / detecting / hidden reticle state machine
//! - [`MeasurementSession`] - two-tap distance measurement
//! - [`SceneDispatcher`] - routes frames and gestures to the current [`Mode`]
//! - [`SceneUpdateQueue`] - serializes scene graph mutations on one worker thread
//! - [`SimulatedSession`] - a geometric [`ArSession`] for tests and demos

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Accessors return values which don't need must_use
#![allow(clippy::must_use_candidate)]

pub mod dispatcher;
pub mod focus;
pub mod hints;
pub mod measure;
pub mod queue;
pub mod resolver;
pub mod sim;

// Re-export core types
pub use arplace_core::{
    camera::{CameraPose, LimitedReason, TrackingQuality, TrackingSeverity},
    error::{ArPlaceError, Result},
    hit::{FeatureHit, PlaneHit, RaycastAlignment, RaycastQuery, RaycastResult, RaycastTarget},
    options::{FeatureConeFilter, PlacementOptions},
    plane::{PlaneAlignment, PlaneId, PlaneReference},
    session::ArSession,
    Mat4, Quat, ScreenPoint, Vec2, Vec3, WorldPosition,
};

pub use dispatcher::{
    DispatchOutcome, ErrorPrompt, MeasurementMode, Mode, ModeHandler, SceneDispatcher, SceneEvent,
};
pub use focus::{Attachment, Detection, FocusIndicator, FocusSignals, FocusState};
pub use hints::{Hint, HintKind, HintScheduler};
pub use measure::{
    distance_between, format_distance, Marker, MarkerId, MeasureStep, MeasurementSession,
};
pub use queue::{
    IndicatorKind, SceneCommand, SceneGraph, SceneSnapshot, SceneUpdateQueue, SharedScene,
};
pub use resolver::{PlacementResolver, Resolution, Strategy, StrategyOutcome};
pub use sim::SimulatedSession;
