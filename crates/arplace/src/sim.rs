//! A deterministic, purely geometric AR session.
//!
//! [`SimulatedSession`] answers every [`ArSession`] query from a fixed scene
//! description: a pinhole camera, bounded plane anchors and a feature point
//! cloud. It is used by the tests and demos and is useful for driving the
//! placement logic without a device.

use arplace_core::{
    hit::{FeatureHit, PlaneHit, RaycastAlignment, RaycastQuery, RaycastResult, RaycastTarget},
    plane::intersect_plane,
    ArSession, CameraPose, FeatureConeFilter, PlaneAlignment, PlaneReference, ScreenPoint,
    TrackingQuality, Vec2, Vec3,
};

/// Maximum distance between a feature point and a ray for the point to count
/// as an estimated surface in [`RaycastTarget::EstimatedPlane`] raycasts.
const ESTIMATED_SURFACE_TOLERANCE: f32 = 0.05;

/// An in-memory AR session.
#[derive(Debug, Clone)]
pub struct SimulatedSession {
    camera: Option<CameraPose>,
    viewport: Vec2,
    fov_y_degrees: f32,
    planes: Vec<PlaneReference>,
    features: Vec<Vec3>,
}

impl SimulatedSession {
    /// Creates an empty session with the given viewport size in points.
    ///
    /// The camera is at the origin looking down -Z with normal tracking and a
    /// 60 degree vertical field of view.
    pub fn new(viewport: Vec2) -> Self {
        Self {
            camera: Some(CameraPose::identity()),
            viewport,
            fov_y_degrees: 60.0,
            planes: Vec::new(),
            features: Vec::new(),
        }
    }

    /// Sets the camera pose.
    #[must_use]
    pub fn with_camera(mut self, camera: CameraPose) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Sets the vertical field of view.
    #[must_use]
    pub fn with_fov_degrees(mut self, fov_y_degrees: f32) -> Self {
        self.fov_y_degrees = fov_y_degrees;
        self
    }

    /// Adds a plane anchor.
    #[must_use]
    pub fn with_plane(mut self, plane: PlaneReference) -> Self {
        self.planes.push(plane);
        self
    }

    /// Adds feature points.
    #[must_use]
    pub fn with_features(mut self, features: impl IntoIterator<Item = Vec3>) -> Self {
        self.features.extend(features);
        self
    }

    /// Replaces the camera pose; `None` simulates a session without frames.
    pub fn set_camera(&mut self, camera: Option<CameraPose>) {
        self.camera = camera;
    }

    /// Changes the tracking quality of the current camera.
    pub fn set_tracking(&mut self, tracking: TrackingQuality) {
        if let Some(camera) = self.camera.as_mut() {
            camera.tracking = tracking;
        }
    }

    /// Adds a plane anchor.
    pub fn add_plane(&mut self, plane: PlaneReference) {
        self.planes.push(plane);
    }

    /// Removes all plane anchors and feature points.
    pub fn clear_scene(&mut self) {
        self.planes.clear();
        self.features.clear();
    }

    /// The viewport size in points.
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// The center of the viewport.
    pub fn screen_center(&self) -> ScreenPoint {
        self.viewport * 0.5
    }

    /// Computes the world-space ray through a screen point.
    ///
    /// Returns `(origin, unit direction)`, or `None` without a camera or with
    /// an empty viewport.
    pub fn screen_ray(&self, point: ScreenPoint) -> Option<(Vec3, Vec3)> {
        let camera = self.camera?;
        if self.viewport.x <= 0.0 || self.viewport.y <= 0.0 {
            return None;
        }

        let half = self.viewport * 0.5;
        let ndc_x = (point.x / half.x) - 1.0;
        let ndc_y = 1.0 - (point.y / half.y);

        let tan_half_fov = (self.fov_y_degrees.to_radians() * 0.5).tan();
        let aspect = self.viewport.x / self.viewport.y;
        let local_dir = Vec3::new(ndc_x * tan_half_fov * aspect, ndc_y * tan_half_fov, -1.0);

        let direction = camera
            .transform
            .transform_vector3(local_dir)
            .normalize_or_zero();
        if direction.length_squared() < 1e-12 {
            return None;
        }

        Some((camera.position(), direction))
    }

    fn plane_hits_along(
        &self,
        origin: Vec3,
        direction: Vec3,
        alignment: RaycastAlignment,
    ) -> Vec<PlaneHit> {
        let mut hits: Vec<PlaneHit> = self
            .planes
            .iter()
            .filter(|plane| alignment_accepts(alignment, plane.alignment))
            .filter_map(|plane| {
                let t = plane.intersect_ray(origin, direction)?;
                let position = origin + direction * t;
                plane.contains(position).then_some(PlaneHit {
                    position,
                    plane: *plane,
                    distance: t,
                })
            })
            .collect();

        // Stable: equal distances keep anchor order.
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

fn alignment_accepts(accepted: RaycastAlignment, alignment: PlaneAlignment) -> bool {
    match accepted {
        RaycastAlignment::Any => true,
        RaycastAlignment::Horizontal => alignment == PlaneAlignment::Horizontal,
        RaycastAlignment::Vertical => alignment == PlaneAlignment::Vertical,
    }
}

/// Splits the offset to `point` into distance along the ray and distance from it.
fn ray_components(origin: Vec3, direction: Vec3, point: Vec3) -> (f32, f32) {
    let offset = point - origin;
    let along = offset.dot(direction);
    let off_axis = (offset - direction * along).length();
    (along, off_axis)
}

impl ArSession for SimulatedSession {
    fn hit_test_planes(&self, point: ScreenPoint) -> Vec<PlaneHit> {
        let Some((origin, direction)) = self.screen_ray(point) else {
            return Vec::new();
        };
        self.plane_hits_along(origin, direction, RaycastAlignment::Any)
    }

    fn hit_test_features(
        &self,
        point: ScreenPoint,
        filter: Option<FeatureConeFilter>,
    ) -> Vec<FeatureHit> {
        let Some((origin, direction)) = self.screen_ray(point) else {
            return Vec::new();
        };

        let mut ranked: Vec<(f32, FeatureHit)> = self
            .features
            .iter()
            .filter_map(|&position| {
                let (along, off_axis) = ray_components(origin, direction, position);
                if along <= 0.0 {
                    return None;
                }
                if let Some(cone) = filter {
                    let angle = off_axis.atan2(along);
                    if angle > cone.half_angle_radians()
                        || along < cone.min_distance
                        || along > cone.max_distance
                    {
                        return None;
                    }
                }
                Some((
                    off_axis,
                    FeatureHit {
                        position,
                        distance: along,
                    },
                ))
            })
            .collect();

        // Closest to the ray first, then nearest to the camera.
        ranked.sort_by(|(a_off, a), (b_off, b)| {
            a_off
                .total_cmp(b_off)
                .then(a.distance.total_cmp(&b.distance))
        });
        ranked.into_iter().map(|(_, hit)| hit).collect()
    }

    fn hit_test_infinite_plane(&self, point: ScreenPoint, reference: Vec3) -> Option<Vec3> {
        let (origin, direction) = self.screen_ray(point)?;
        let t = intersect_plane(reference, Vec3::Y, origin, direction)?;
        Some(origin + direction * t)
    }

    fn current_camera(&self) -> Option<CameraPose> {
        self.camera
    }

    fn raycast_query(
        &self,
        point: ScreenPoint,
        target: RaycastTarget,
        alignment: RaycastAlignment,
    ) -> Option<RaycastQuery> {
        let (origin, direction) = self.screen_ray(point)?;
        Some(RaycastQuery {
            origin,
            direction,
            target,
            alignment,
        })
    }

    fn raycast(&self, query: &RaycastQuery) -> Vec<RaycastResult> {
        let mut results: Vec<RaycastResult> = self
            .plane_hits_along(query.origin, query.direction, query.alignment)
            .into_iter()
            .map(|hit| RaycastResult {
                position: hit.position,
                plane: Some(hit.plane),
                distance: hit.distance,
            })
            .collect();

        if query.target == RaycastTarget::EstimatedPlane {
            results.extend(self.features.iter().filter_map(|&position| {
                let (along, off_axis) = ray_components(query.origin, query.direction, position);
                (along > 0.0 && off_axis <= ESTIMATED_SURFACE_TOLERANCE).then_some(
                    RaycastResult {
                        position,
                        plane: None,
                        distance: along,
                    },
                )
            }));
            results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        }

        results
    }
}
