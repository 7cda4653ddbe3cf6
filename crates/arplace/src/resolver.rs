//! Screen-to-world placement.
//!
//! [`PlacementResolver`] turns a screen point into a world position by running
//! an ordered cascade of hit-test strategies against the AR session:
//!
//! 1. [`Strategy::ExistingPlane`] - tracked planes within their extent. A hit
//!    here is returned immediately.
//! 2. [`Strategy::HighQualityFeatures`] - feature points inside a narrow cone
//!    around the screen ray. The hit is remembered, not returned.
//! 3. [`Strategy::InfinitePlane`] - the infinite horizontal plane through the
//!    previous object position (or the origin). Runs when a drag requests it
//!    and the options allow it, or when step 2 found nothing.
//! 4. The remembered high-quality feature, if any.
//! 5. [`Strategy::UnfilteredFeatures`] - any feature point in front of the camera.
//!
//! Every call is a one-shot snapshot; callers re-invoke it each frame.

use arplace_core::{
    ArSession, FeatureConeFilter, PlacementOptions, PlaneReference, ScreenPoint, WorldPosition,
};
use glam::Vec3;

/// A single hit-test strategy of the placement cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Tracked plane anchors, within their detected extent.
    ExistingPlane,
    /// Feature points inside the configured cone.
    HighQualityFeatures,
    /// Infinite horizontal plane through a reference point.
    InfinitePlane,
    /// Any feature point in front of the camera.
    UnfilteredFeatures,
}

/// Outcome of running one strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrategyOutcome {
    /// The strategy produced a position, with the plane it lies on if known.
    Found {
        position: WorldPosition,
        plane: Option<PlaneReference>,
    },
    /// The strategy produced nothing.
    NotFound,
}

impl StrategyOutcome {
    fn found(self) -> Option<(WorldPosition, Option<PlaneReference>)> {
        match self {
            StrategyOutcome::Found { position, plane } => Some((position, plane)),
            StrategyOutcome::NotFound => None,
        }
    }
}

/// Result of a placement query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Best-effort world position, if any strategy succeeded.
    pub position: Option<WorldPosition>,
    /// The tracked plane the position lies on.
    pub plane: Option<PlaneReference>,
    /// Whether the position lies on a plane (tracked or infinite) rather than
    /// on a loose feature point.
    pub hit_real: bool,
    /// The strategy that produced the position.
    pub strategy: Option<Strategy>,
}

impl Resolution {
    /// A resolution where every strategy failed.
    pub const NONE: Self = Self {
        position: None,
        plane: None,
        hit_real: false,
        strategy: None,
    };

    fn from_strategy(
        strategy: Strategy,
        position: WorldPosition,
        plane: Option<PlaneReference>,
        hit_real: bool,
    ) -> Self {
        Self {
            position: Some(position),
            plane,
            hit_real,
            strategy: Some(strategy),
        }
    }

    /// Returns true if a position was found.
    #[must_use]
    pub fn is_found(&self) -> bool {
        self.position.is_some()
    }
}

/// Resolves screen points to world positions.
#[derive(Debug, Clone, Default)]
pub struct PlacementResolver {
    options: PlacementOptions,
}

impl PlacementResolver {
    /// Creates a resolver with the given options.
    pub fn new(options: PlacementOptions) -> Self {
        Self { options }
    }

    /// The resolver's options.
    pub fn options(&self) -> &PlacementOptions {
        &self.options
    }

    /// Replaces the resolver's options.
    pub fn set_options(&mut self, options: PlacementOptions) {
        self.options = options;
    }

    /// Runs a single strategy.
    pub fn run<S: ArSession + ?Sized>(
        &self,
        strategy: Strategy,
        session: &S,
        point: ScreenPoint,
        reference: Vec3,
    ) -> StrategyOutcome {
        let found = match strategy {
            Strategy::ExistingPlane => session
                .hit_test_planes(point)
                .first()
                .map(|hit| (hit.position, Some(hit.plane))),
            Strategy::HighQualityFeatures => {
                nearest_feature(session, point, Some(self.options.feature_cone))
            }
            Strategy::InfinitePlane => session
                .hit_test_infinite_plane(point, reference)
                .map(|position| (position, None)),
            Strategy::UnfilteredFeatures => nearest_feature(session, point, None),
        };

        match found {
            Some((position, plane)) => StrategyOutcome::Found { position, plane },
            None => StrategyOutcome::NotFound,
        }
    }

    /// Resolves a screen point to a world position.
    ///
    /// `previous_position` is the current position of the object being
    /// placed; it anchors the infinite-plane fallback. `infinite_plane`
    /// requests that fallback (used while dragging); it only takes effect when
    /// [`PlacementOptions::drag_on_infinite_planes`] is set.
    pub fn resolve<S: ArSession + ?Sized>(
        &self,
        session: &S,
        point: ScreenPoint,
        previous_position: Option<WorldPosition>,
        infinite_plane: bool,
    ) -> Resolution {
        let reference = previous_position.unwrap_or(Vec3::ZERO);

        if let Some((position, plane)) = self
            .run(Strategy::ExistingPlane, session, point, reference)
            .found()
        {
            return Resolution::from_strategy(Strategy::ExistingPlane, position, plane, true);
        }

        let high_quality = self
            .run(Strategy::HighQualityFeatures, session, point, reference)
            .found();

        if (infinite_plane && self.options.drag_on_infinite_planes) || high_quality.is_none() {
            if let Some((position, _)) = self
                .run(Strategy::InfinitePlane, session, point, reference)
                .found()
            {
                return Resolution::from_strategy(Strategy::InfinitePlane, position, None, true);
            }
        }

        if let Some((position, _)) = high_quality {
            return Resolution::from_strategy(
                Strategy::HighQualityFeatures,
                position,
                None,
                false,
            );
        }

        if let Some((position, _)) = self
            .run(Strategy::UnfilteredFeatures, session, point, reference)
            .found()
        {
            return Resolution::from_strategy(Strategy::UnfilteredFeatures, position, None, false);
        }

        log::trace!("no placement found at {point}");
        Resolution::NONE
    }
}

fn nearest_feature<S: ArSession + ?Sized>(
    session: &S,
    point: ScreenPoint,
    filter: Option<FeatureConeFilter>,
) -> Option<(WorldPosition, Option<PlaneReference>)> {
    session
        .hit_test_features(point, filter)
        .first()
        .map(|hit| (hit.position, None))
}
