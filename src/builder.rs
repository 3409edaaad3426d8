//! Builder for [`RecordingController`].

use std::time::Duration;

use crate::config::SessionConfig;
use crate::event::StreamChangeCallback;
use crate::recorder::RecorderPort;
use crate::session::RecordingController;
use crate::source::CapturePort;
use crate::stream::StreamManager;
use crate::StreamRecorderError;

/// Configures and constructs a [`RecordingController`].
///
/// A capture port and a recorder port are mandatory; everything else has
/// defaults from [`SessionConfig`].
///
/// # Example
///
/// ```
/// use stream_recorder::{MockCapturePort, MockRecorderPort, RecordingController};
/// use std::time::Duration;
///
/// let controller = RecordingController::builder()
///     .capture_port(MockCapturePort::new())
///     .recorder_port(MockRecorderPort::new())
///     .flush_interval(Duration::from_millis(500))
///     .build()
///     .unwrap();
/// ```
#[derive(Default)]
#[must_use]
pub struct ControllerBuilder {
    capture: Option<Box<dyn CapturePort>>,
    recorder: Option<Box<dyn RecorderPort>>,
    config: SessionConfig,
    on_change: Option<StreamChangeCallback>,
}

impl ControllerBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Sets the device capture backend.
    pub fn capture_port(mut self, port: impl CapturePort + 'static) -> Self {
        self.capture = Some(Box::new(port));
        self
    }

    /// Sets the platform recorder backend.
    pub fn recorder_port(mut self, port: impl RecorderPort + 'static) -> Self {
        self.recorder = Some(Box::new(port));
        self
    }

    /// How often the recorder flushes a chunk. Default 1 second.
    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.config.flush_interval = interval;
        self
    }

    /// File extension for artifact names, including the dot. Default `.mp4`.
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.config.extension = extension.into();
        self
    }

    /// Vertical padding subtracted twice from the container height when
    /// sizing the preview. Default 20.0.
    pub fn preview_padding(mut self, padding: f64) -> Self {
        self.config.preview_padding = padding;
        self
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Callback invoked synchronously after every track replacement.
    pub fn on_stream_change(mut self, callback: StreamChangeCallback) -> Self {
        self.on_change = Some(callback);
        self
    }

    /// Builds the controller.
    ///
    /// # Errors
    ///
    /// [`NoCapturePort`](StreamRecorderError::NoCapturePort) or
    /// [`NoRecorderPort`](StreamRecorderError::NoRecorderPort) if a
    /// mandatory port was not provided.
    pub fn build(self) -> Result<RecordingController, StreamRecorderError> {
        let capture = self.capture.ok_or(StreamRecorderError::NoCapturePort)?;
        let recorder = self.recorder.ok_or(StreamRecorderError::NoRecorderPort)?;
        let manager = match self.on_change {
            Some(callback) => StreamManager::with_change_callback(callback),
            None => StreamManager::new(),
        };
        Ok(RecordingController::new(capture, recorder, manager, self.config))
    }
}
