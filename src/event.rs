//! Notifications surfaced to the presentation layer.
//!
//! Two channels exist: a synchronous stream-change callback fired by the
//! [`StreamManager`](crate::StreamManager) whenever the composite's track set
//! changes (preview rebinding), and [`ControllerEvent`]s yielded by
//! [`RecordingController::next_event()`](crate::RecordingController::next_event)
//! while a session runs.

use std::sync::Arc;

use crate::stream::CompositeStream;

/// Session progress events for the presentation layer.
///
/// These are informational; the session keeps running after a `Tick` and is
/// back at idle once `ResultReady` is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    /// One chunk flush was recorded.
    ///
    /// The elapsed counter is chunk-driven: it increments by exactly one per
    /// flush, so it only tracks wall time when the platform honors the
    /// configured flush cadence.
    Tick {
        /// Whole seconds recorded so far.
        elapsed_seconds: u64,
    },

    /// Finalization completed and the artifact is available for download.
    ///
    /// The presentation layer switches from live preview to playback here.
    ResultReady,
}

/// Callback invoked synchronously after each composite-stream mutation.
///
/// Fired by [`replace_track`](crate::StreamManager::replace_track) and not by
/// mute/unmute, so preview and recording pipelines are undisturbed by audio
/// pausing.
pub type StreamChangeCallback = Arc<dyn Fn(&CompositeStream) + Send + Sync>;

/// Creates a [`StreamChangeCallback`] from a closure.
///
/// # Example
///
/// ```
/// use stream_recorder::stream_change_callback;
///
/// let callback = stream_change_callback(|stream| {
///     println!("video present: {}", stream.video_track().is_some());
/// });
/// ```
pub fn stream_change_callback<F>(f: F) -> StreamChangeCallback
where
    F: Fn(&CompositeStream) + Send + Sync + 'static,
{
    Arc::new(f)
}
