//! Detected planar surfaces.

use std::fmt;

use glam::{Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Stable identifier of a plane anchor within one AR session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaneId(u64);

impl PlaneId {
    /// Creates a plane id from its raw value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PlaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "plane#{}", self.0)
    }
}

/// Orientation class of a detected plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlaneAlignment {
    /// Floors, tables and other surfaces facing up or down.
    Horizontal,
    /// Walls and other upright surfaces.
    Vertical,
    /// The session could not classify the surface.
    #[default]
    Unknown,
}

/// A reference to a plane anchor tracked by the AR session.
///
/// This is a snapshot of the anchor at query time. The placement code never
/// creates, mutates or removes planes; it only reports which one was hit.
///
/// The plane lies in the anchor's local XZ plane with its normal along local +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneReference {
    /// Anchor identifier.
    pub id: PlaneId,
    /// Orientation class.
    pub alignment: PlaneAlignment,
    /// Width (local X) and depth (local Z) of the detected extent, in meters.
    pub extent: Vec2,
    /// Anchor-to-world transform of the extent's center.
    pub transform: Mat4,
}

impl PlaneReference {
    /// Creates a plane reference.
    pub fn new(id: PlaneId, alignment: PlaneAlignment, extent: Vec2, transform: Mat4) -> Self {
        Self {
            id,
            alignment,
            extent,
            transform,
        }
    }

    /// A horizontal, upward-facing plane centered at `center`.
    pub fn horizontal(id: PlaneId, center: Vec3, extent: Vec2) -> Self {
        Self::new(
            id,
            PlaneAlignment::Horizontal,
            extent,
            Mat4::from_translation(center),
        )
    }

    /// A vertical plane centered at `center` whose normal points along `normal`.
    ///
    /// `normal` is projected onto the horizontal plane before use.
    pub fn vertical(id: PlaneId, center: Vec3, normal: Vec3, extent: Vec2) -> Self {
        let facing = Vec3::new(normal.x, 0.0, normal.z).normalize_or(Vec3::Z);
        let rotation = Quat::from_rotation_arc(Vec3::Y, facing);
        Self::new(
            id,
            PlaneAlignment::Vertical,
            extent,
            Mat4::from_rotation_translation(rotation, center),
        )
    }

    /// Center of the extent in world space.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.transform.w_axis.truncate()
    }

    /// Unit plane normal in world space.
    #[must_use]
    pub fn normal(&self) -> Vec3 {
        self.transform.transform_vector3(Vec3::Y).normalize_or_zero()
    }

    /// Anchor orientation.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        let (_, rotation, _) = self.transform.to_scale_rotation_translation();
        rotation
    }

    /// Returns whether a point on the plane lies within the detected extent.
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        let local = self.transform.inverse().transform_point3(point);
        let half = self.extent * 0.5;
        local.x.abs() <= half.x && local.z.abs() <= half.y
    }

    /// Intersects a ray with the unbounded plane.
    ///
    /// Returns the ray parameter `t` of the hit, or `None` if the ray is
    /// parallel to the plane or the plane is behind the origin.
    #[must_use]
    pub fn intersect_ray(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        intersect_plane(self.center(), self.normal(), origin, direction)
    }
}

/// Intersects a ray with the plane through `point` with normal `normal`.
///
/// Returns the non-negative ray parameter of the hit.
pub fn intersect_plane(point: Vec3, normal: Vec3, origin: Vec3, direction: Vec3) -> Option<f32> {
    let denom = normal.dot(direction);
    if denom.abs() < 1e-6 {
        return None;
    }
    let t = (point - origin).dot(normal) / denom;
    if t < 0.0 {
        return None;
    }
    Some(t)
}
