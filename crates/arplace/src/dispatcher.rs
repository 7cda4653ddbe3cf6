//! Scene event dispatch between placement and measurement modes.
//!
//! [`SceneDispatcher`] receives every render tick, tracking change and
//! gesture, and forwards it to the handler of the current [`Mode`]. Scene
//! graph mutations are posted to the [`SceneUpdateQueue`].

use std::time::Duration;

use arplace_core::{
    ArPlaceError, ArSession, PlacementOptions, Result, ScreenPoint, TrackingQuality,
    TrackingSeverity, WorldPosition,
};

use crate::focus::{
    detect_by_raycast, detect_by_resolver, FocusIndicator, FocusSignals, FocusState,
};
use crate::hints::{Hint, HintKind, HintScheduler, PLANE_SEARCH_HINT};
use crate::measure::{MeasureStep, MeasurementSession};
use crate::queue::{IndicatorKind, SceneCommand, SceneUpdateQueue};
use crate::resolver::{PlacementResolver, Resolution};

/// Interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Placing virtual objects.
    Placement,
    /// Measuring distances between two taps.
    Measurement,
}

/// State owned by measurement mode; dropped when the mode is left.
#[derive(Debug, Clone)]
pub struct MeasurementMode {
    session: MeasurementSession,
    focus: FocusIndicator,
    tracking: TrackingQuality,
}

impl MeasurementMode {
    fn new(options: &PlacementOptions) -> Self {
        Self {
            session: MeasurementSession::new(options),
            focus: FocusIndicator::new(options),
            tracking: TrackingQuality::default(),
        }
    }

    /// The measurement in progress.
    pub fn session(&self) -> &MeasurementSession {
        &self.session
    }

    /// The measurement crosshair.
    pub fn focus(&self) -> &FocusIndicator {
        &self.focus
    }

    /// Tracking status line shown in measurement mode.
    pub fn tracking_label(&self) -> &'static str {
        self.tracking.description()
    }
}

/// The handler for the current mode.
#[derive(Debug, Clone)]
pub enum ModeHandler {
    /// Placement mode keeps no extra state.
    Placement,
    /// Measurement mode with its session and crosshair.
    Measurement(MeasurementMode),
}

impl ModeHandler {
    /// The mode this handler serves.
    pub fn mode(&self) -> Mode {
        match self {
            ModeHandler::Placement => Mode::Placement,
            ModeHandler::Measurement(_) => Mode::Measurement,
        }
    }
}

/// An event delivered to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneEvent {
    /// A rendered frame.
    RenderTick {
        /// Session time of the frame.
        now: Duration,
        /// A placed object is visible.
        object_visible: bool,
        /// The coaching overlay is showing.
        coaching_active: bool,
    },
    /// The camera's tracking quality changed.
    TrackingChanged(TrackingQuality),
    /// A completed tap gesture.
    Tap(ScreenPoint),
    /// A drag of the selected object.
    Drag {
        /// Current touch location.
        point: ScreenPoint,
        /// Where the dragged object currently is.
        object_position: Option<WorldPosition>,
    },
}

/// What the dispatcher did with an event.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// A tick was processed.
    Ticked {
        /// State of the current mode's indicator.
        state: FocusState,
        /// Hints that came due this tick.
        hints: Vec<Hint>,
    },
    /// Status line for a tracking change.
    TrackingStatus {
        /// Status line.
        text: &'static str,
        /// Severity for colouring.
        severity: TrackingSeverity,
    },
    /// The user asked to pick an object to place.
    CatalogRequested,
    /// A measurement tap was handled.
    Measured(MeasureStep),
    /// A drag was resolved to a world position.
    Dragged(Resolution),
    /// The event had no effect in the current mode or state.
    Ignored,
}

/// A session failure presented to the user, with restart as the only action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPrompt {
    /// Alert title.
    pub title: String,
    /// Alert body.
    pub message: String,
    /// Label of the single recovery action.
    pub action_label: &'static str,
}

/// Routes scene events to the current mode.
#[derive(Debug)]
pub struct SceneDispatcher<S> {
    session: S,
    options: PlacementOptions,
    resolver: PlacementResolver,
    screen_center: ScreenPoint,
    focus: FocusIndicator,
    hints: HintScheduler,
    queue: SceneUpdateQueue,
    handler: ModeHandler,
    last_restart: Option<Duration>,
}

impl<S: ArSession> SceneDispatcher<S> {
    /// Creates a dispatcher in placement mode.
    ///
    /// `screen_center` is where the focus indicators look for surfaces.
    pub fn new(
        session: S,
        options: PlacementOptions,
        screen_center: ScreenPoint,
        queue: SceneUpdateQueue,
    ) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            session,
            resolver: PlacementResolver::new(options.clone()),
            focus: FocusIndicator::new(&options),
            options,
            screen_center,
            hints: HintScheduler::new(),
            queue,
            handler: ModeHandler::Placement,
            last_restart: None,
        })
    }

    /// The AR session.
    pub fn session(&self) -> &S {
        &self.session
    }

    /// Mutable access to the AR session.
    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    /// The current mode.
    pub fn mode(&self) -> Mode {
        self.handler.mode()
    }

    /// The current mode's handler.
    pub fn handler(&self) -> &ModeHandler {
        &self.handler
    }

    /// State of the placement focus indicator.
    pub fn current_state(&self) -> &FocusState {
        self.focus.state()
    }

    /// The placement focus indicator.
    pub fn focus(&self) -> &FocusIndicator {
        &self.focus
    }

    /// The hint scheduler.
    pub fn hints(&self) -> &HintScheduler {
        &self.hints
    }

    /// The scene update queue.
    pub fn queue(&self) -> &SceneUpdateQueue {
        &self.queue
    }

    /// Switches modes. Switching to the current mode does nothing.
    ///
    /// The scene commands are submitted before local state changes, so a
    /// closed queue leaves the dispatcher in its previous mode.
    pub fn set_mode(&mut self, mode: Mode) -> Result<()> {
        if mode == self.mode() {
            return Ok(());
        }

        match mode {
            Mode::Measurement => {
                let mut hidden = self.focus.clone();
                hidden.hide();
                self.post_indicator(IndicatorKind::Placement, &hidden)?;
                self.focus = hidden;
                self.handler = ModeHandler::Measurement(MeasurementMode::new(&self.options));
            }
            Mode::Placement => {
                if let ModeHandler::Measurement(measurement) = &self.handler {
                    let mut crosshair = measurement.focus.clone();
                    crosshair.hide();
                    self.post_indicator(IndicatorKind::Measurement, &crosshair)?;
                }
                self.queue.submit(SceneCommand::ClearMarkers)?;
                self.handler = ModeHandler::Placement;
            }
        }

        log::info!("switched to {mode:?} mode");
        Ok(())
    }

    /// Handles one event.
    pub fn handle(&mut self, event: SceneEvent) -> Result<DispatchOutcome> {
        match event {
            SceneEvent::RenderTick {
                now,
                object_visible,
                coaching_active,
            } => self.tick(
                now,
                FocusSignals {
                    object_visible,
                    coaching_active,
                },
            ),
            SceneEvent::TrackingChanged(tracking) => {
                if let ModeHandler::Measurement(measurement) = &mut self.handler {
                    measurement.tracking = tracking;
                }
                log::debug!("tracking changed: {}", tracking.description());
                Ok(DispatchOutcome::TrackingStatus {
                    text: tracking.description(),
                    severity: tracking.severity(),
                })
            }
            SceneEvent::Tap(point) => self.tap(point),
            SceneEvent::Drag {
                point,
                object_position,
            } => Ok(match self.handler {
                ModeHandler::Placement => DispatchOutcome::Dragged(self.resolver.resolve(
                    &self.session,
                    point,
                    object_position,
                    true,
                )),
                ModeHandler::Measurement(_) => DispatchOutcome::Ignored,
            }),
        }
    }

    fn tick(&mut self, now: Duration, signals: FocusSignals) -> Result<DispatchOutcome> {
        let state = match &mut self.handler {
            ModeHandler::Placement => {
                let detection = detect_by_raycast(&self.session, self.screen_center);
                if self.focus.update(signals, detection, &mut self.hints, now) {
                    post_indicator(&self.queue, IndicatorKind::Placement, &self.focus)?;
                }
                *self.focus.state()
            }
            ModeHandler::Measurement(measurement) => {
                let detection = detect_by_resolver(
                    &self.resolver,
                    &self.session,
                    self.screen_center,
                    measurement
                        .focus
                        .last_position()
                        .or(self.focus.last_position()),
                );
                let crosshair = FocusSignals {
                    object_visible: false,
                    coaching_active: signals.coaching_active,
                };
                if measurement
                    .focus
                    .update(crosshair, detection, &mut self.hints, now)
                {
                    post_indicator(&self.queue, IndicatorKind::Measurement, &measurement.focus)?;
                }
                *measurement.focus.state()
            }
        };

        Ok(DispatchOutcome::Ticked {
            state,
            hints: self.hints.poll(now),
        })
    }

    fn tap(&mut self, point: ScreenPoint) -> Result<DispatchOutcome> {
        match &mut self.handler {
            ModeHandler::Placement => {
                if self.focus.add_object_available() {
                    self.hints.cancel(HintKind::ContentPlacement);
                    Ok(DispatchOutcome::CatalogRequested)
                } else {
                    Ok(DispatchOutcome::Ignored)
                }
            }
            ModeHandler::Measurement(measurement) => {
                let Some(step) = measurement.session.place_marker(point, &self.session) else {
                    return Ok(DispatchOutcome::Ignored);
                };
                match &step {
                    MeasureStep::Started { start } => {
                        self.queue.submit(SceneCommand::AddMarker(*start))?;
                    }
                    MeasureStep::Completed { end, .. } => {
                        self.queue.submit(SceneCommand::AddMarker(*end))?;
                    }
                    MeasureStep::Reset { removed } => {
                        for id in removed {
                            self.queue.submit(SceneCommand::RemoveMarker(*id))?;
                        }
                    }
                }
                Ok(DispatchOutcome::Measured(step))
            }
        }
    }

    /// Restarts the experience.
    ///
    /// Clears measurement and indicator state, cancels every hint and
    /// schedules the plane search hint. Returns `Ok(false)` without doing
    /// anything while the previous restart is still cooling down.
    pub fn restart(&mut self, now: Duration) -> Result<bool> {
        if let Some(last) = self.last_restart {
            if now < last + self.options.restart_cooldown() {
                log::debug!("restart refused during cooldown");
                return Ok(false);
            }
        }
        self.reset_experience(now)?;
        Ok(true)
    }

    /// Runs the recovery action of an [`ErrorPrompt`].
    ///
    /// Same as [`restart`](Self::restart) but ignores the cooldown, so a
    /// session that fails right after a restart can still be recovered.
    pub fn recover_from_error(&mut self, now: Duration) -> Result<()> {
        log::info!("recovering from session error");
        self.reset_experience(now)
    }

    fn reset_experience(&mut self, now: Duration) -> Result<()> {
        self.last_restart = Some(now);

        self.hints.cancel_all();
        self.focus.reset();
        self.post_indicator(IndicatorKind::Placement, &self.focus)?;

        if let ModeHandler::Measurement(measurement) = &mut self.handler {
            measurement.session.clear();
            measurement.focus.reset();
            post_indicator(&self.queue, IndicatorKind::Measurement, &measurement.focus)?;
        }
        self.queue.submit(SceneCommand::ClearMarkers)?;

        self.hints.schedule(
            HintKind::PlaneEstimation,
            PLANE_SEARCH_HINT,
            self.options.plane_search_hint_delay(),
            now,
        );
        log::info!("experience restarted");
        Ok(())
    }

    /// Builds the prompt shown for a session failure.
    ///
    /// Its action maps to [`recover_from_error`](Self::recover_from_error).
    pub fn report_session_error(&self, error: &ArPlaceError) -> ErrorPrompt {
        log::warn!("session error: {error}");
        ErrorPrompt {
            title: "The AR session failed.".to_string(),
            message: error.to_string(),
            action_label: "Restart Session",
        }
    }

    fn post_indicator(&self, kind: IndicatorKind, focus: &FocusIndicator) -> Result<()> {
        post_indicator(&self.queue, kind, focus)
    }
}

fn post_indicator(
    queue: &SceneUpdateQueue,
    kind: IndicatorKind,
    focus: &FocusIndicator,
) -> Result<()> {
    queue.submit(SceneCommand::AttachIndicator {
        indicator: kind,
        attachment: focus.attachment(),
    })?;
    queue.submit(SceneCommand::SetIndicatorState {
        indicator: kind,
        state: *focus.state(),
    })
}
