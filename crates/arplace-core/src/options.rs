//! Configuration options for placement, hints and measurement.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ArPlaceError, Result};

/// Cone filter applied to the high-quality feature point hit test.
///
/// Only feature points whose direction from the camera lies within
/// `cone_half_angle_degrees` of the screen ray, and whose distance along the
/// ray lies in `[min_distance, max_distance]`, are considered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConeFilter {
    /// Half-angle of the cone around the screen ray, in degrees.
    pub cone_half_angle_degrees: f32,
    /// Minimum distance along the ray, in meters.
    pub min_distance: f32,
    /// Maximum distance along the ray, in meters.
    pub max_distance: f32,
}

impl Default for FeatureConeFilter {
    fn default() -> Self {
        Self {
            cone_half_angle_degrees: 18.0,
            min_distance: 0.2,
            max_distance: 2.0,
        }
    }
}

impl FeatureConeFilter {
    /// Creates a new cone filter.
    pub fn new(cone_half_angle_degrees: f32, min_distance: f32, max_distance: f32) -> Self {
        Self {
            cone_half_angle_degrees,
            min_distance,
            max_distance,
        }
    }

    /// Returns the cone half-angle in radians.
    #[must_use]
    pub fn half_angle_radians(&self) -> f32 {
        self.cone_half_angle_degrees.to_radians()
    }

    fn validate(&self) -> Result<()> {
        if !(self.cone_half_angle_degrees > 0.0 && self.cone_half_angle_degrees < 180.0) {
            return Err(ArPlaceError::InvalidOption {
                field: "feature_cone.cone_half_angle_degrees",
                reason: format!(
                    "must be in (0, 180), got {}",
                    self.cone_half_angle_degrees
                ),
            });
        }
        if self.min_distance < 0.0 {
            return Err(ArPlaceError::InvalidOption {
                field: "feature_cone.min_distance",
                reason: format!("must not be negative, got {}", self.min_distance),
            });
        }
        if self.max_distance <= self.min_distance {
            return Err(ArPlaceError::InvalidOption {
                field: "feature_cone.max_distance",
                reason: format!(
                    "must exceed min_distance ({}), got {}",
                    self.min_distance, self.max_distance
                ),
            });
        }
        Ok(())
    }
}

/// Options controlling placement, the focus indicator and measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementOptions {
    /// Whether a dragged object may follow an infinite horizontal plane
    /// through its previous position.
    pub drag_on_infinite_planes: bool,

    /// Cone filter for the high-quality feature hit test.
    pub feature_cone: FeatureConeFilter,

    /// Distance in front of the camera used when a measurement tap hits no plane.
    pub marker_camera_offset: f32,

    /// Delay before the "try moving left or right" hint, in seconds.
    pub focus_hint_delay_secs: f32,

    /// Delay before the "find a surface" hint after a restart, in seconds.
    pub plane_search_hint_delay_secs: f32,

    /// Minimum time between two session restarts, in seconds.
    pub restart_cooldown_secs: f32,
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self {
            drag_on_infinite_planes: false,
            feature_cone: FeatureConeFilter::default(),
            marker_camera_offset: 0.1,
            focus_hint_delay_secs: 5.0,
            plane_search_hint_delay_secs: 7.5,
            restart_cooldown_secs: 5.0,
        }
    }
}

impl PlacementOptions {
    /// Creates options with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables dragging on infinite planes.
    #[must_use]
    pub fn with_drag_on_infinite_planes(mut self, enabled: bool) -> Self {
        self.drag_on_infinite_planes = enabled;
        self
    }

    /// Sets the feature cone filter.
    #[must_use]
    pub fn with_feature_cone(mut self, cone: FeatureConeFilter) -> Self {
        self.feature_cone = cone;
        self
    }

    /// Sets the camera offset used for fallback measurement markers.
    #[must_use]
    pub fn with_marker_camera_offset(mut self, offset: f32) -> Self {
        self.marker_camera_offset = offset;
        self
    }

    /// Sets the focus hint delay in seconds.
    #[must_use]
    pub fn with_focus_hint_delay(mut self, secs: f32) -> Self {
        self.focus_hint_delay_secs = secs;
        self
    }

    /// Sets the restart cooldown in seconds.
    #[must_use]
    pub fn with_restart_cooldown(mut self, secs: f32) -> Self {
        self.restart_cooldown_secs = secs;
        self
    }

    /// Delay before the focus hint fires.
    pub fn focus_hint_delay(&self) -> Duration {
        secs_to_duration(self.focus_hint_delay_secs)
    }

    /// Delay before the plane search hint fires.
    pub fn plane_search_hint_delay(&self) -> Duration {
        secs_to_duration(self.plane_search_hint_delay_secs)
    }

    /// Minimum time between restarts.
    pub fn restart_cooldown(&self) -> Duration {
        secs_to_duration(self.restart_cooldown_secs)
    }

    /// Checks that every option is within its valid range.
    pub fn validate(&self) -> Result<()> {
        self.feature_cone.validate()?;

        if !(self.marker_camera_offset >= 0.0 && self.marker_camera_offset.is_finite()) {
            return Err(ArPlaceError::InvalidOption {
                field: "marker_camera_offset",
                reason: format!(
                    "must be a finite non-negative distance, got {}",
                    self.marker_camera_offset
                ),
            });
        }

        for (field, value) in [
            ("focus_hint_delay_secs", self.focus_hint_delay_secs),
            ("plane_search_hint_delay_secs", self.plane_search_hint_delay_secs),
            ("restart_cooldown_secs", self.restart_cooldown_secs),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ArPlaceError::InvalidOption {
                    field,
                    reason: format!("must be a finite non-negative duration, got {value}"),
                });
            }
        }

        Ok(())
    }

    /// Parses and validates options from a JSON document.
    ///
    /// Missing fields take their default values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Loads and validates options from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let options = Self::from_json_str(&contents)?;
        log::debug!("loaded placement options from {}", path.display());
        Ok(options)
    }
}

/// Out-of-range values map to zero; `validate` reports them as errors.
fn secs_to_duration(secs: f32) -> Duration {
    Duration::try_from_secs_f32(secs).unwrap_or(Duration::ZERO)
}
