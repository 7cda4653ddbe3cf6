//! Core types for arplace-rs.
//!
//! This crate provides the data model shared by the placement logic:
//! - [`ArSession`] trait describing the external AR session's hit testing
//! - Hit and raycast result types, [`PlaneReference`] and [`CameraPose`]
//! - [`PlacementOptions`] configuration and the [`ArPlaceError`] type

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Constructors return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]

pub mod camera;
pub mod error;
pub mod hit;
pub mod options;
pub mod plane;
pub mod session;

pub use camera::{CameraPose, LimitedReason, TrackingQuality, TrackingSeverity};
pub use error::{ArPlaceError, Result};
pub use hit::{FeatureHit, PlaneHit, RaycastAlignment, RaycastQuery, RaycastResult, RaycastTarget};
pub use options::{FeatureConeFilter, PlacementOptions};
pub use plane::{PlaneAlignment, PlaneId, PlaneReference};
pub use session::ArSession;

// Re-export glam types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3};

/// A point in the view's coordinate space, in points, origin top-left.
pub type ScreenPoint = Vec2;

/// A point in the AR session's world space, in meters.
pub type WorldPosition = Vec3;
