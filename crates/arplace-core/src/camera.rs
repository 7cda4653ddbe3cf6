//! Camera pose and tracking quality as reported by the AR session.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Reason the session's tracking is limited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LimitedReason {
    /// The session has just started and has not localized yet.
    Initializing,
    /// The device is moving too fast.
    ExcessiveMotion,
    /// The scene lacks visual detail to track against.
    InsufficientFeatures,
    /// The session is recovering from an interruption.
    Relocalizing,
}

/// How confident the session is in its camera pose estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TrackingQuality {
    /// Pose is reliable; placement queries may be issued.
    Normal,
    /// Pose is available but degraded.
    Limited(LimitedReason),
    /// No pose is available.
    #[default]
    NotAvailable,
}

/// Display severity of a tracking state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackingSeverity {
    /// Tracking is normal.
    Ok,
    /// Tracking is limited.
    Warning,
    /// Tracking is unavailable.
    Error,
}

impl TrackingQuality {
    /// Returns true if tracking is normal.
    #[must_use]
    pub fn is_normal(self) -> bool {
        matches!(self, TrackingQuality::Normal)
    }

    /// Short status line for the tracking state.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            TrackingQuality::Normal => "Tracking normal",
            TrackingQuality::NotAvailable => "Tracking not available",
            TrackingQuality::Limited(LimitedReason::ExcessiveMotion) => {
                "Tracking limited: excessive motion"
            }
            TrackingQuality::Limited(LimitedReason::InsufficientFeatures) => {
                "Tracking limited: insufficient features"
            }
            TrackingQuality::Limited(LimitedReason::Initializing) => {
                "Tracking limited: initializing"
            }
            TrackingQuality::Limited(LimitedReason::Relocalizing) => "Tracking limited",
        }
    }

    /// Severity used to colour the status line.
    #[must_use]
    pub fn severity(self) -> TrackingSeverity {
        match self {
            TrackingQuality::Normal => TrackingSeverity::Ok,
            TrackingQuality::Limited(_) => TrackingSeverity::Warning,
            TrackingQuality::NotAvailable => TrackingSeverity::Error,
        }
    }
}

/// The camera's world transform together with its tracking quality.
///
/// The camera looks down its local -Z axis with +Y up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// Camera-to-world transform.
    pub transform: Mat4,
    /// Tracking quality at the time the pose was sampled.
    pub tracking: TrackingQuality,
}

impl CameraPose {
    /// Creates a new camera pose.
    pub fn new(transform: Mat4, tracking: TrackingQuality) -> Self {
        Self {
            transform,
            tracking,
        }
    }

    /// A camera at the world origin looking down -Z with normal tracking.
    pub fn identity() -> Self {
        Self::new(Mat4::IDENTITY, TrackingQuality::Normal)
    }

    /// A camera at `position` looking at `target` with normal tracking.
    pub fn looking_at(position: Vec3, target: Vec3, up: Vec3) -> Self {
        let view = Mat4::look_at_rh(position, target, up);
        Self::new(view.inverse(), TrackingQuality::Normal)
    }

    /// Returns a copy with a different tracking quality.
    #[must_use]
    pub fn with_tracking(mut self, tracking: TrackingQuality) -> Self {
        self.tracking = tracking;
        self
    }

    /// Camera position in world space.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.transform.w_axis.truncate()
    }

    /// Unit forward direction (local -Z) in world space.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.transform.transform_vector3(-Vec3::Z).normalize_or_zero()
    }

    /// Unit up direction (local +Y) in world space.
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.transform.transform_vector3(Vec3::Y).normalize_or_zero()
    }

    /// Camera orientation.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        let (_, rotation, _) = self.transform.to_scale_rotation_translation();
        rotation
    }

    /// The point `distance` meters straight ahead of the camera.
    #[must_use]
    pub fn point_in_front(&self, distance: f32) -> Vec3 {
        self.transform.transform_point3(Vec3::new(0.0, 0.0, -distance))
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_pose() {
        let camera = CameraPose::identity();
        assert_eq!(camera.position(), Vec3::ZERO);
        assert_eq!(camera.forward(), -Vec3::Z);
        assert_eq!(camera.point_in_front(0.1), Vec3::new(0.0, 0.0, -0.1));
    }

    #[test]
    fn test_looking_at() {
        let camera = CameraPose::looking_at(
            Vec3::new(0.0, 1.0, 2.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::Y,
        );
        assert!((camera.position() - Vec3::new(0.0, 1.0, 2.0)).length() < 1e-5);
        assert!((camera.forward() - -Vec3::Z).length() < 1e-5);
        let ahead = camera.point_in_front(0.5);
        assert!((ahead - Vec3::new(0.0, 1.0, 1.5)).length() < 1e-5);
    }

    #[test]
    fn test_translated_camera_offset() {
        let camera = CameraPose::new(
            Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)),
            TrackingQuality::Normal,
        );
        let ahead = camera.point_in_front(0.1);
        assert!((ahead - Vec3::new(1.0, 2.0, 2.9)).length() < 1e-6);
    }

    #[test]
    fn test_tracking_descriptions() {
        assert_eq!(TrackingQuality::Normal.description(), "Tracking normal");
        assert_eq!(
            TrackingQuality::NotAvailable.description(),
            "Tracking not available"
        );
        assert_eq!(
            TrackingQuality::Limited(LimitedReason::ExcessiveMotion).description(),
            "Tracking limited: excessive motion"
        );
        assert_eq!(
            TrackingQuality::Limited(LimitedReason::Relocalizing).description(),
            "Tracking limited"
        );
    }

    #[test]
    fn test_tracking_severity() {
        assert_eq!(TrackingQuality::Normal.severity(), TrackingSeverity::Ok);
        assert_eq!(
            TrackingQuality::Limited(LimitedReason::Initializing).severity(),
            TrackingSeverity::Warning
        );
        assert_eq!(TrackingQuality::NotAvailable.severity(), TrackingSeverity::Error);
        assert!(!TrackingQuality::default().is_normal());
    }
}
