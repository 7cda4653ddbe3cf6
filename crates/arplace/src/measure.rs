//! Two-point distance measurement.
//!
//! A [`MeasurementSession`] cycles through three steps on successive taps:
//! the first tap places the start marker, the second places the end marker
//! and reports the distance, the third clears both.

use arplace_core::{ArSession, PlacementOptions, ScreenPoint, WorldPosition};

/// Identifier of a placed marker, unique within one measurement session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(u64);

impl MarkerId {
    /// Creates a marker id from its raw value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A marker placed in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    /// Marker identifier.
    pub id: MarkerId,
    /// World position of the marker.
    pub position: WorldPosition,
}

/// What a tap did to the measurement session.
#[derive(Debug, Clone, PartialEq)]
pub enum MeasureStep {
    /// The start marker was placed.
    Started { start: Marker },
    /// The end marker was placed and the distance computed.
    Completed {
        start: Marker,
        end: Marker,
        /// Distance in meters.
        distance: f32,
        /// Distance formatted like `"1.00m"`.
        label: String,
    },
    /// Both markers were removed.
    Reset { removed: Vec<MarkerId> },
}

/// Formats a distance in meters with two decimals, rounding up, and an `m` suffix.
///
/// Values within a few `f32` ulps above a centimeter boundary are treated as
/// lying on it, so `0.3` prints `"0.30m"` and `1.0000001` prints `"1.00m"`.
pub fn format_distance(meters: f32) -> String {
    let centimeters = f64::from(meters) * 100.0;
    let tolerance = (centimeters.abs() * ROUNDING_ULPS * f64::from(f32::EPSILON)).max(1e-6);
    let centimeters = (centimeters - tolerance).ceil();
    let centimeters = if centimeters <= 0.0 { 0.0 } else { centimeters };
    format!("{:.2}m", centimeters / 100.0)
}

/// Relative slack, in `f32` ulps, absorbed before rounding up.
const ROUNDING_ULPS: f64 = 16.0;

/// Euclidean distance between two points, formatted by [`format_distance`].
pub fn distance_between(start: WorldPosition, end: WorldPosition) -> String {
    format_distance(start.distance(end))
}

/// State of an in-progress measurement.
#[derive(Debug, Clone)]
pub struct MeasurementSession {
    start: Option<Marker>,
    end: Option<Marker>,
    distance: Option<f32>,
    next_id: u64,
    camera_offset: f32,
}

impl MeasurementSession {
    /// Creates an empty session.
    pub fn new(options: &PlacementOptions) -> Self {
        Self {
            start: None,
            end: None,
            distance: None,
            next_id: 0,
            camera_offset: options.marker_camera_offset,
        }
    }

    /// The start marker, if placed.
    pub fn start(&self) -> Option<&Marker> {
        self.start.as_ref()
    }

    /// The end marker, if placed.
    pub fn end(&self) -> Option<&Marker> {
        self.end.as_ref()
    }

    /// The measured distance in meters, once both markers are placed.
    pub fn distance(&self) -> Option<f32> {
        self.distance
    }

    /// Returns true if no marker is placed.
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Status line for the measurement.
    pub fn label(&self) -> String {
        match self.distance {
            Some(distance) => format!("Distance: {}", format_distance(distance)),
            None => "Distance: ?".to_string(),
        }
    }

    /// Where a marker for `point` would be placed.
    ///
    /// Uses the nearest tracked plane within its extent; failing that, the
    /// point [`PlacementOptions::marker_camera_offset`] meters in front of the
    /// camera. Returns `None` without a camera.
    pub fn marker_position<S: ArSession + ?Sized>(
        &self,
        point: ScreenPoint,
        session: &S,
    ) -> Option<WorldPosition> {
        if let Some(hit) = session.hit_test_planes(point).first() {
            return Some(hit.position);
        }
        let camera = session.current_camera()?;
        Some(camera.point_in_front(self.camera_offset))
    }

    /// Handles a tap at `point`.
    ///
    /// Returns `None` when a marker is needed but the session has no camera
    /// frame yet; the tap is then ignored.
    pub fn place_marker<S: ArSession + ?Sized>(
        &mut self,
        point: ScreenPoint,
        session: &S,
    ) -> Option<MeasureStep> {
        if self.end.is_some() {
            return Some(MeasureStep::Reset {
                removed: self.clear(),
            });
        }

        let position = self.marker_position(point, session)?;
        let marker = Marker {
            id: MarkerId(self.next_id),
            position,
        };
        self.next_id += 1;

        match self.start {
            None => {
                self.start = Some(marker);
                log::debug!("measurement start at {position}");
                Some(MeasureStep::Started { start: marker })
            }
            Some(start) => {
                let distance = start.position.distance(position);
                self.end = Some(marker);
                self.distance = Some(distance);
                let label = format_distance(distance);
                log::debug!("measurement end at {position}: {label}");
                Some(MeasureStep::Completed {
                    start,
                    end: marker,
                    distance,
                    label,
                })
            }
        }
    }

    /// Removes both markers, returning the ids that were placed.
    pub fn clear(&mut self) -> Vec<MarkerId> {
        let removed = [self.start.take(), self.end.take()]
            .into_iter()
            .flatten()
            .map(|marker| marker.id)
            .collect();
        self.distance = None;
        removed
    }
}
