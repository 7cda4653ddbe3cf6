//! A scripted AR session for integration tests.

#![allow(dead_code)]

use std::cell::Cell;

use arplace::*;

/// An [`ArSession`] that answers every query from canned results.
#[derive(Debug, Default)]
pub struct ScriptedSession {
    /// Plane hits returned for specific screen points.
    pub plane_hits: Vec<(ScreenPoint, PlaneHit)>,
    /// Results of the cone-filtered feature hit test.
    pub cone_features: Vec<FeatureHit>,
    /// Results of the unfiltered feature hit test.
    pub all_features: Vec<FeatureHit>,
    /// Result of the infinite plane hit test, relative to the reference point.
    pub infinite_plane_offset: Option<Vec3>,
    /// Current camera.
    pub camera: Option<CameraPose>,
    /// Raycast results.
    pub raycast_results: Vec<RaycastResult>,
    /// Reference point passed to the last infinite plane hit test.
    pub last_reference: Cell<Option<Vec3>>,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self {
            camera: Some(CameraPose::identity()),
            ..Self::default()
        }
    }

    /// Makes a tap at `point` hit plane `id` at `position`.
    pub fn plane_at(mut self, point: ScreenPoint, id: u64, position: Vec3) -> Self {
        let plane = PlaneReference::horizontal(PlaneId::new(id), position, Vec2::ONE);
        self.plane_hits.push((
            point,
            PlaneHit {
                position,
                plane,
                distance: position.length(),
            },
        ));
        self
    }

    pub fn cone_feature(mut self, position: Vec3) -> Self {
        self.cone_features.push(FeatureHit {
            position,
            distance: position.length(),
        });
        self.all_features.push(FeatureHit {
            position,
            distance: position.length(),
        });
        self
    }

    pub fn loose_feature(mut self, position: Vec3) -> Self {
        self.all_features.push(FeatureHit {
            position,
            distance: position.length(),
        });
        self
    }

    pub fn infinite_plane(mut self, offset: Vec3) -> Self {
        self.infinite_plane_offset = Some(offset);
        self
    }

    pub fn raycast_hit(mut self, position: Vec3) -> Self {
        self.raycast_results.push(RaycastResult {
            position,
            plane: None,
            distance: position.length(),
        });
        self
    }
}

impl ArSession for ScriptedSession {
    fn hit_test_planes(&self, point: ScreenPoint) -> Vec<PlaneHit> {
        self.plane_hits
            .iter()
            .filter(|(at, _)| *at == point)
            .map(|(_, hit)| *hit)
            .collect()
    }

    fn hit_test_features(
        &self,
        _point: ScreenPoint,
        filter: Option<FeatureConeFilter>,
    ) -> Vec<FeatureHit> {
        if filter.is_some() {
            self.cone_features.clone()
        } else {
            self.all_features.clone()
        }
    }

    fn hit_test_infinite_plane(&self, _point: ScreenPoint, reference: Vec3) -> Option<Vec3> {
        self.last_reference.set(Some(reference));
        self.infinite_plane_offset.map(|offset| reference + offset)
    }

    fn current_camera(&self) -> Option<CameraPose> {
        self.camera
    }

    fn raycast_query(
        &self,
        _point: ScreenPoint,
        target: RaycastTarget,
        alignment: RaycastAlignment,
    ) -> Option<RaycastQuery> {
        let camera = self.camera?;
        Some(RaycastQuery {
            origin: camera.position(),
            direction: camera.forward(),
            target,
            alignment,
        })
    }

    fn raycast(&self, _query: &RaycastQuery) -> Vec<RaycastResult> {
        self.raycast_results.clone()
    }
}

pub fn vec3_strategy() -> impl proptest::strategy::Strategy<Value = Vec3> {
    use proptest::prelude::*;
    (-10.0f32..10.0, -10.0f32..10.0, -10.0f32..10.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}
