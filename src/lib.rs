//! Device-stream orchestration and recording sessions.
//!
//! `stream-recorder` manages a composite audio/video stream built from
//! selectable capture devices and drives a record/stop/finalize lifecycle
//! over it, producing an in-memory artifact with a revocable download
//! handle and a timestamped filename.
//!
//! # Quick start
//!
//! ```no_run
//! use stream_recorder::{
//!     ControllerEvent, MockCapturePort, MockRecorderPort, RecordingController, TrackKind,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), stream_recorder::StreamRecorderError> {
//! let capture = MockCapturePort::new();
//! let camera = capture.add_device(TrackKind::Video, "cam-0", "Integrated Camera");
//!
//! let mut controller = RecordingController::builder()
//!     .capture_port(capture)
//!     .recorder_port(MockRecorderPort::new())
//!     .build()?;
//!
//! controller.select(camera).await?;
//! controller.start().await?;
//!
//! while let Some(event) = controller.next_event().await {
//!     match event {
//!         ControllerEvent::Tick { elapsed_seconds } => {
//!             println!("{elapsed_seconds}s recorded");
//!         }
//!         ControllerEvent::ResultReady => break,
//!     }
//! }
//!
//! if let Some(artifact) = controller.artifact() {
//!     println!("{} ({} bytes)", artifact.filename(), artifact.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`CapturePort`] acquires single-track streams from devices; the
//!   bundled backends are [`CpalAudioPort`] (microphones via cpal) and
//!   [`MockCapturePort`] for tests.
//! - [`StreamManager`] holds the composite stream, at most one track per
//!   kind, and performs atomic per-kind replacement.
//! - [`RecorderPort`] binds a platform recorder to the composite stream
//!   and delivers chunk/finalize events over a channel.
//! - [`RecordingController`] ties it all together: selection, preview
//!   geometry, the session state machine, and artifact assembly.

#![warn(missing_docs)]

mod artifact;
mod builder;
mod config;
mod error;
mod event;
mod geometry;
mod recorder;
mod selection;
mod session;
pub mod source;
mod stream;

pub use artifact::{Artifact, DownloadUrl, ObjectUrls};
pub use builder::ControllerBuilder;
pub use config::SessionConfig;
pub use error::StreamRecorderError;
pub use event::{stream_change_callback, ControllerEvent, StreamChangeCallback};
pub use geometry::{PreviewGeometry, DEFAULT_ASPECT_RATIO};
pub use recorder::{
    MockRecorderControl, MockRecorderPort, RecorderEvent, RecorderHandle, RecorderPort,
};
pub use selection::{PermissionStatus, Selection};
pub use session::{RecordingController, SessionStatus};
pub use source::{
    CapturePort, CpalAudioPort, DeviceDescriptor, MockCapturePort, SingleTrackStream, Track,
    TrackGuard, TrackKind, TrackSettings,
};
pub use stream::{CompositeStream, StreamManager};
