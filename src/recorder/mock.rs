//! Mock recorder for testing without a platform encoder.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use super::{RecorderEvent, RecorderHandle, RecorderPort};
use crate::stream::CompositeStream;
use crate::StreamRecorderError;

/// A scriptable recorder backend.
///
/// Tests drive it through the shared [`MockRecorderControl`]: emit chunks at
/// will, then let `request_stop` deliver the finalize event. Cloning the
/// port shares the control, so a test can keep a handle after moving a clone
/// into the controller.
///
/// # Example
///
/// ```
/// use stream_recorder::MockRecorderPort;
///
/// let recorder = MockRecorderPort::new();
/// let control = recorder.control();
/// // move `recorder` into the controller, drive chunks via `control`
/// assert!(!control.is_started());
/// ```
#[derive(Clone, Default)]
pub struct MockRecorderPort {
    control: Arc<MockRecorderControl>,
    unsupported: Option<String>,
}

/// Shared handle for driving a [`MockRecorderPort`] from tests.
#[derive(Default)]
pub struct MockRecorderControl {
    events: Mutex<Option<mpsc::Sender<RecorderEvent>>>,
    flush_interval: Mutex<Option<Duration>>,
    started: AtomicBool,
    stop_requested: AtomicBool,
    binds: AtomicUsize,
    bound_video: AtomicBool,
    bound_audio: AtomicBool,
}

impl MockRecorderPort {
    /// Creates a recorder that accepts any stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a recorder whose `bind` always fails with
    /// `RecorderUnsupported`.
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self {
            control: Arc::default(),
            unsupported: Some(reason.into()),
        }
    }

    /// The shared control handle.
    pub fn control(&self) -> Arc<MockRecorderControl> {
        Arc::clone(&self.control)
    }
}

impl RecorderPort for MockRecorderPort {
    fn bind(
        &mut self,
        stream: &CompositeStream,
    ) -> Result<Box<dyn RecorderHandle>, StreamRecorderError> {
        if let Some(reason) = &self.unsupported {
            return Err(StreamRecorderError::RecorderUnsupported {
                reason: reason.clone(),
            });
        }

        self.control.binds.fetch_add(1, Ordering::SeqCst);
        self.control
            .bound_video
            .store(stream.video_track().is_some(), Ordering::SeqCst);
        self.control
            .bound_audio
            .store(stream.audio_track().is_some(), Ordering::SeqCst);
        // New binding, fresh session flags.
        self.control.started.store(false, Ordering::SeqCst);
        self.control.stop_requested.store(false, Ordering::SeqCst);

        Ok(Box::new(MockRecorderHandle {
            control: Arc::clone(&self.control),
        }))
    }
}

struct MockRecorderHandle {
    control: Arc<MockRecorderControl>,
}

impl RecorderHandle for MockRecorderHandle {
    fn start(
        &mut self,
        flush_interval: Duration,
        events: mpsc::Sender<RecorderEvent>,
    ) -> Result<(), StreamRecorderError> {
        *self.control.events.lock().expect("mock recorder poisoned") = Some(events);
        *self
            .control
            .flush_interval
            .lock()
            .expect("mock recorder poisoned") = Some(flush_interval);
        self.control.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn request_stop(&mut self) {
        self.control.stop_requested.store(true, Ordering::SeqCst);
        // Pending chunks were already delivered through emit_chunk, so the
        // finalize event follows immediately.
        self.control.send(RecorderEvent::Finalized);
    }
}

impl MockRecorderControl {
    fn send(&self, event: RecorderEvent) -> bool {
        let guard = self.events.lock().expect("mock recorder poisoned");
        match guard.as_ref() {
            Some(sender) => sender.try_send(event).is_ok(),
            None => false,
        }
    }

    /// Emits one flush worth of data. Returns `false` if the recorder was
    /// never started.
    pub fn emit_chunk(&self, data: Vec<u8>) -> bool {
        self.send(RecorderEvent::Chunk(data))
    }

    /// Emits a finalize event without a stop request (abnormal platform
    /// flow).
    pub fn emit_finalized(&self) -> bool {
        self.send(RecorderEvent::Finalized)
    }

    /// Whether `start` has been called on the current binding.
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Whether `request_stop` has been called on the current binding.
    pub fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    /// Number of times the port was bound to a stream.
    pub fn bind_count(&self) -> usize {
        self.binds.load(Ordering::SeqCst)
    }

    /// Whether the most recent binding saw a video track.
    pub fn bound_video(&self) -> bool {
        self.bound_video.load(Ordering::SeqCst)
    }

    /// Whether the most recent binding saw an audio track.
    pub fn bound_audio(&self) -> bool {
        self.bound_audio.load(Ordering::SeqCst)
    }

    /// The flush interval the controller requested, once started.
    pub fn flush_interval(&self) -> Option<Duration> {
        *self
            .flush_interval
            .lock()
            .expect("mock recorder poisoned")
    }
}
