//! Serialized scene graph mutation.
//!
//! The renderer reads the scene graph on its own thread, so every mutation
//! (moving the focus indicator, adding or removing markers) goes through a
//! single [`SceneUpdateQueue`]. Commands are applied in submission order on a
//! dedicated worker thread.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use arplace_core::{ArPlaceError, Result};

use crate::focus::{Attachment, FocusState};
use crate::measure::{Marker, MarkerId};

/// Which focus indicator a command refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    /// The placement-mode focus indicator.
    Placement,
    /// The measurement-mode crosshair.
    Measurement,
}

/// A single scene graph mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneCommand {
    /// Reparents an indicator.
    AttachIndicator {
        indicator: IndicatorKind,
        attachment: Attachment,
    },
    /// Updates what an indicator displays.
    SetIndicatorState {
        indicator: IndicatorKind,
        state: FocusState,
    },
    /// Adds a marker node.
    AddMarker(Marker),
    /// Removes a marker node.
    RemoveMarker(MarkerId),
    /// Removes every marker node.
    ClearMarkers,
}

/// The scene graph the queue applies commands to.
pub trait SceneGraph: Send {
    /// Applies one command.
    fn apply(&mut self, command: SceneCommand);
}

enum Message {
    Apply(SceneCommand),
    Flush(Sender<()>),
}

/// A serial queue applying [`SceneCommand`]s on a worker thread.
pub struct SceneUpdateQueue {
    sender: Option<Sender<Message>>,
    worker: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for SceneUpdateQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneUpdateQueue")
            .field("running", &self.sender.is_some())
            .finish_non_exhaustive()
    }
}

impl SceneUpdateQueue {
    /// Starts the worker thread that owns `scene`.
    pub fn spawn(scene: impl SceneGraph + 'static) -> Result<Self> {
        let (sender, receiver) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("arplace-scene-queue".to_string())
            .spawn(move || run_worker(scene, &receiver))?;
        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// Enqueues a command.
    pub fn submit(&self, command: SceneCommand) -> Result<()> {
        self.send(Message::Apply(command))
    }

    /// Blocks until every previously submitted command has been applied.
    pub fn flush(&self) -> Result<()> {
        let (done, wait) = mpsc::channel();
        self.send(Message::Flush(done))?;
        wait.recv().map_err(|_| ArPlaceError::QueueClosed)
    }

    fn send(&self, message: Message) -> Result<()> {
        self.sender
            .as_ref()
            .ok_or(ArPlaceError::QueueClosed)?
            .send(message)
            .map_err(|_| {
                log::warn!("scene update queue worker has stopped");
                ArPlaceError::QueueClosed
            })
    }

    /// Applies all pending commands and stops the worker.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        // Closing the channel ends the worker loop after it drains.
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("scene update queue worker panicked");
            }
        }
    }
}

impl Drop for SceneUpdateQueue {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker(mut scene: impl SceneGraph, receiver: &Receiver<Message>) {
    for message in receiver {
        match message {
            Message::Apply(command) => scene.apply(command),
            Message::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}

/// A snapshot of what the scene graph contains.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneSnapshot {
    /// Placement indicator attachment and state.
    pub placement_indicator: (Attachment, FocusState),
    /// Measurement crosshair attachment and state.
    pub measurement_indicator: (Attachment, FocusState),
    /// Placed markers in insertion order.
    pub markers: Vec<Marker>,
    /// Number of commands applied so far.
    pub applied: usize,
}

impl SceneSnapshot {
    fn indicator_mut(&mut self, kind: IndicatorKind) -> &mut (Attachment, FocusState) {
        match kind {
            IndicatorKind::Placement => &mut self.placement_indicator,
            IndicatorKind::Measurement => &mut self.measurement_indicator,
        }
    }
}

/// An in-memory scene graph shared between the queue worker and readers.
#[derive(Debug, Clone, Default)]
pub struct SharedScene {
    inner: Arc<Mutex<SceneSnapshot>>,
}

impl SharedScene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the current scene contents.
    pub fn snapshot(&self) -> SceneSnapshot {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SceneGraph for SharedScene {
    fn apply(&mut self, command: SceneCommand) {
        let mut scene = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        match command {
            SceneCommand::AttachIndicator {
                indicator,
                attachment,
            } => scene.indicator_mut(indicator).0 = attachment,
            SceneCommand::SetIndicatorState { indicator, state } => {
                scene.indicator_mut(indicator).1 = state;
            }
            SceneCommand::AddMarker(marker) => scene.markers.push(marker),
            SceneCommand::RemoveMarker(id) => scene.markers.retain(|marker| marker.id != id),
            SceneCommand::ClearMarkers => scene.markers.clear(),
        }
        scene.applied += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arplace_core::Vec3;

    struct Recorder(Arc<Mutex<Vec<SceneCommand>>>);

    impl SceneGraph for Recorder {
        fn apply(&mut self, command: SceneCommand) {
            self.0.lock().unwrap().push(command);
        }
    }

    #[test]
    fn test_commands_applied_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let queue = SceneUpdateQueue::spawn(Recorder(Arc::clone(&log))).unwrap();
        queue.submit(SceneCommand::ClearMarkers).unwrap();
        queue
            .submit(SceneCommand::AttachIndicator {
                indicator: IndicatorKind::Placement,
                attachment: Attachment::Scene,
            })
            .unwrap();
        queue.flush().unwrap();

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0], SceneCommand::ClearMarkers);
    }

    #[test]
    fn test_shared_scene_markers() {
        let scene = SharedScene::new();
        let queue = SceneUpdateQueue::spawn(scene.clone()).unwrap();
        let marker = Marker {
            id: MarkerId::new(1),
            position: Vec3::X,
        };
        queue.submit(SceneCommand::AddMarker(marker)).unwrap();
        queue.flush().unwrap();
        assert_eq!(scene.snapshot().markers, vec![marker]);

        queue.submit(SceneCommand::RemoveMarker(marker.id)).unwrap();
        queue.flush().unwrap();
        let snapshot = scene.snapshot();
        assert!(snapshot.markers.is_empty());
        assert_eq!(snapshot.applied, 2);
    }

    #[test]
    fn test_shutdown_drains_pending_commands() {
        let scene = SharedScene::new();
        let queue = SceneUpdateQueue::spawn(scene.clone()).unwrap();
        for _ in 0..10 {
            queue.submit(SceneCommand::ClearMarkers).unwrap();
        }
        queue.shutdown();
        assert_eq!(scene.snapshot().applied, 10);
    }

    #[test]
    fn test_panicking_scene_closes_queue() {
        struct Exploding;
        impl SceneGraph for Exploding {
            fn apply(&mut self, _command: SceneCommand) {
                panic!("scene graph failure");
            }
        }

        let queue = SceneUpdateQueue::spawn(Exploding).unwrap();
        queue.submit(SceneCommand::ClearMarkers).unwrap();
        assert!(matches!(queue.flush(), Err(ArPlaceError::QueueClosed)));
        assert!(matches!(
            queue.submit(SceneCommand::ClearMarkers),
            Err(ArPlaceError::QueueClosed)
        ));
    }
}
