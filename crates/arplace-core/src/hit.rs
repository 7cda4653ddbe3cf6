//! Result types returned by AR session hit tests and raycasts.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::plane::PlaneReference;

/// A hit against a tracked plane anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneHit {
    /// World position of the hit.
    pub position: Vec3,
    /// The plane that was hit.
    pub plane: PlaneReference,
    /// Distance from the camera to the hit, in meters.
    pub distance: f32,
}

/// A hit against the tracked feature point cloud.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureHit {
    /// World position of the feature point.
    pub position: Vec3,
    /// Distance from the camera along the screen ray, in meters.
    pub distance: f32,
}

/// Which geometry a raycast may hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RaycastTarget {
    /// Only tracked plane anchors, within their extent.
    ExistingPlaneGeometry,
    /// Tracked planes and surfaces estimated from scene features.
    #[default]
    EstimatedPlane,
}

/// Which plane orientations a raycast accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RaycastAlignment {
    /// Horizontal surfaces only.
    Horizontal,
    /// Vertical surfaces only.
    Vertical,
    /// Any orientation.
    #[default]
    Any,
}

/// A world-space ray prepared by the session from a screen point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastQuery {
    /// Ray origin (the camera position).
    pub origin: Vec3,
    /// Unit ray direction.
    pub direction: Vec3,
    /// Geometry the ray may hit.
    pub target: RaycastTarget,
    /// Accepted surface orientations.
    pub alignment: RaycastAlignment,
}

/// A single raycast hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastResult {
    /// World position of the hit.
    pub position: Vec3,
    /// The tracked plane, if the hit landed on one.
    pub plane: Option<PlaneReference>,
    /// Distance from the ray origin, in meters.
    pub distance: f32,
}
