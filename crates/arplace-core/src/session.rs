//! The interface to the external AR session.

use glam::Vec3;

use crate::camera::CameraPose;
use crate::hit::{
    FeatureHit, PlaneHit, RaycastAlignment, RaycastQuery, RaycastResult, RaycastTarget,
};
use crate::options::FeatureConeFilter;
use crate::ScreenPoint;

/// Queries answered by the AR session's tracking subsystem.
///
/// Implementations own camera tracking, plane detection and the feature point
/// cloud. All methods are snapshots of the session's current understanding of
/// the scene and must not block.
pub trait ArSession {
    /// Hit tests tracked plane anchors, restricted to their detected extent.
    ///
    /// Results are ranked nearest first.
    fn hit_test_planes(&self, point: ScreenPoint) -> Vec<PlaneHit>;

    /// Hit tests the feature point cloud.
    ///
    /// With a `filter`, only points inside the cone around the screen ray and
    /// within the distance range are returned. Without one, every point in
    /// front of the camera is a candidate. Results are ranked best first.
    fn hit_test_features(
        &self,
        point: ScreenPoint,
        filter: Option<FeatureConeFilter>,
    ) -> Vec<FeatureHit>;

    /// Intersects the screen ray with the infinite horizontal plane through
    /// `reference`.
    fn hit_test_infinite_plane(&self, point: ScreenPoint, reference: Vec3) -> Option<Vec3>;

    /// The current camera pose, or `None` before the first frame.
    fn current_camera(&self) -> Option<CameraPose>;

    /// Builds a raycast query through a screen point.
    fn raycast_query(
        &self,
        point: ScreenPoint,
        target: RaycastTarget,
        alignment: RaycastAlignment,
    ) -> Option<RaycastQuery>;

    /// Performs a raycast; results are ranked nearest first.
    fn raycast(&self, query: &RaycastQuery) -> Vec<RaycastResult>;
}
