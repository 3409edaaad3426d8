//! Recording session controller.
//!
//! Wraps a platform recorder bound to the composite stream and drives the
//! `Idle -> Recording -> Finalizing -> Idle` lifecycle. All state lives in
//! explicit fields of the controller and is mutated only from the caller's
//! task; recorder callbacks arrive as typed events on an mpsc channel and
//! are applied in [`next_event()`](RecordingController::next_event).

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::artifact::{derive_filename, Artifact, ObjectUrls};
use crate::config::SessionConfig;
use crate::event::ControllerEvent;
use crate::geometry::PreviewGeometry;
use crate::recorder::{RecorderEvent, RecorderHandle, RecorderPort};
use crate::selection::{PermissionStatus, Selection};
use crate::source::{CapturePort, DeviceDescriptor, SingleTrackStream, TrackKind};
use crate::stream::{CompositeStream, StreamManager};
use crate::{ControllerBuilder, StreamRecorderError};

/// Capacity for the recorder event channel.
/// One chunk per second plus the finalize event leaves ample headroom.
const RECORDER_EVENT_CAPACITY: usize = 32;

/// Lifecycle state of the recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// No recording in progress.
    #[default]
    Idle,
    /// Recorder bound and flushing chunks.
    Recording,
    /// Stop requested; waiting for the platform's finalize event.
    Finalizing,
}

/// Orchestrates device streams and the record/stop/finalize lifecycle.
///
/// Built via [`RecordingController::builder()`]. The controller owns the
/// [`StreamManager`] (and with it every hardware track), the selection
/// state, the preview geometry, and the session's chunk buffer.
///
/// # Example
///
/// ```ignore
/// let mut controller = RecordingController::builder()
///     .capture_port(CpalAudioPort::new())
///     .recorder_port(platform_recorder)
///     .build()?;
///
/// controller.select(camera_descriptor).await?;
/// controller.start().await?;
/// while let Some(event) = controller.next_event().await {
///     match event {
///         ControllerEvent::Tick { elapsed_seconds } => update_timer(elapsed_seconds),
///         ControllerEvent::ResultReady => break,
///     }
/// }
/// let artifact = controller.artifact().unwrap();
/// ```
pub struct RecordingController {
    capture: Box<dyn CapturePort>,
    recorder: Box<dyn RecorderPort>,
    manager: StreamManager,
    selection: Selection,
    geometry: PreviewGeometry,
    config: SessionConfig,

    status: SessionStatus,
    chunks: Vec<Vec<u8>>,
    elapsed_seconds: u64,
    handle: Option<Box<dyn RecorderHandle>>,
    events: Option<mpsc::Receiver<RecorderEvent>>,

    urls: ObjectUrls,
    artifact: Option<Artifact>,
    result_ready: bool,
}

impl RecordingController {
    /// Creates a builder for configuring a controller.
    pub fn builder() -> ControllerBuilder {
        ControllerBuilder::new()
    }

    pub(crate) fn new(
        capture: Box<dyn CapturePort>,
        recorder: Box<dyn RecorderPort>,
        manager: StreamManager,
        config: SessionConfig,
    ) -> Self {
        let geometry = PreviewGeometry::new(config.preview_padding);
        Self {
            capture,
            recorder,
            manager,
            selection: Selection::new(),
            geometry,
            config,
            status: SessionStatus::Idle,
            chunks: Vec::new(),
            elapsed_seconds: 0,
            handle: None,
            events: None,
            urls: ObjectUrls::new(),
            artifact: None,
            result_ready: false,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Whole seconds recorded so far (chunk-driven, reset at finalize).
    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    /// Number of buffered chunks in the current session.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// The live composite stream, for preview binding and inspection.
    #[must_use]
    pub fn stream(&self) -> &CompositeStream {
        self.manager.current()
    }

    /// The current selection state.
    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The devices the capture port currently knows for `kind`.
    pub fn devices(&self, kind: TrackKind) -> Vec<DeviceDescriptor> {
        self.capture.devices(kind)
    }

    /// Current preview geometry.
    #[must_use]
    pub fn geometry(&self) -> &PreviewGeometry {
        &self.geometry
    }

    /// The finished artifact while a result is displayed.
    #[must_use]
    pub fn artifact(&self) -> Option<&Artifact> {
        self.artifact.as_ref()
    }

    /// `true` between finalize and the next start/reconfigure - the
    /// presentation layer shows playback instead of live preview.
    #[must_use]
    pub fn has_result(&self) -> bool {
        self.result_ready
    }

    /// Resolves a download handle against the controller's URL registry.
    #[must_use]
    pub fn resolve_download(&self, url: &crate::DownloadUrl) -> Option<Arc<Vec<u8>>> {
        self.urls.resolve(url)
    }

    /// Updates the externally-reported permission status.
    pub fn set_permission(&mut self, status: PermissionStatus) {
        self.selection.set_permission(status);
    }

    /// `true` while the denied-permission warning should show.
    #[must_use]
    pub fn permission_warning(&self) -> bool {
        self.selection.permission_warning()
    }

    /// Dismisses the denied-permission warning.
    pub fn dismiss_permission_warning(&mut self) {
        self.selection.dismiss_permission_warning();
    }

    /// Recomputes preview geometry for a new container measurement.
    pub fn resize_container(&mut self, raw_height: f64) {
        self.geometry.set_container_height(raw_height);
        self.geometry.observe(self.manager.current());
    }

    /// Mutes the audio track in place without replacing it.
    pub fn mute_audio(&mut self) {
        self.manager.mute_audio();
    }

    /// Unmutes the audio track in place.
    pub fn unmute_audio(&mut self) {
        self.manager.unmute_audio();
    }

    /// `true` while an installed audio track is muted.
    #[must_use]
    pub fn is_audio_muted(&self) -> bool {
        self.stream()
            .audio_track()
            .is_some_and(|t| !t.is_enabled())
    }

    /// Selects a device, acquires it, and installs its track.
    ///
    /// The previous track of the same kind is stopped and released by the
    /// replacement. An acquisition that resolves after a newer selection of
    /// the same kind superseded it is discarded. Geometry is recomputed
    /// after a video replacement.
    ///
    /// # Errors
    ///
    /// Acquisition failures are returned; the selection itself is retained
    /// so the user can retry.
    pub async fn select(
        &mut self,
        descriptor: DeviceDescriptor,
    ) -> Result<(), StreamRecorderError> {
        let kind = descriptor.kind;
        let generation = self.mark_selected(descriptor.clone());

        tracing::info!(%kind, device = %descriptor.label, "acquiring selected device");
        let stream = self.capture.acquire(&descriptor).await?;
        self.install_acquisition(kind, generation, stream);
        Ok(())
    }

    /// Records `descriptor` as the selected device of its kind without
    /// acquiring it, and returns the selection generation.
    ///
    /// For embedders that run acquisition on their own tasks: pair with
    /// [`install_acquisition()`](Self::install_acquisition), which uses the
    /// generation to discard results a newer selection superseded.
    /// [`select()`](Self::select) does both in one call.
    pub fn mark_selected(&mut self, descriptor: DeviceDescriptor) -> u64 {
        self.selection.select(descriptor)
    }

    /// Installs an acquired stream for `kind` unless its selection is stale.
    ///
    /// Returns `false` and drops the stream (stopping its tracks) when a
    /// newer selection of the same kind was recorded after `generation` -
    /// the late acquisition must not clobber the winner's track. On install,
    /// the previous track of `kind` is stopped and geometry is recomputed
    /// for video.
    pub fn install_acquisition(
        &mut self,
        kind: TrackKind,
        generation: u64,
        stream: SingleTrackStream,
    ) -> bool {
        if !self.selection.is_current(kind, generation) {
            tracing::debug!(%kind, generation, "discarding stale acquisition");
            return false;
        }

        self.manager.replace_track(kind, stream);
        if kind == TrackKind::Video {
            self.geometry.observe(self.manager.current());
        }
        true
    }

    /// Starts recording the composite stream.
    ///
    /// Requires a selected video device. If the previewed video stream is
    /// inactive (its device was stopped at a previous finalize), a fresh
    /// stream is re-acquired first; audio is re-acquired whenever an audio
    /// device is selected.
    ///
    /// # Errors
    ///
    /// [`NoVideoSelected`](StreamRecorderError::NoVideoSelected) without a
    /// video selection; acquisition errors from re-acquiring devices;
    /// [`RecorderUnsupported`](StreamRecorderError::RecorderUnsupported)
    /// from the recorder port. Every failure leaves the controller idle
    /// with no partial chunk state and the previous result, if any, still
    /// downloadable.
    pub async fn start(&mut self) -> Result<(), StreamRecorderError> {
        let Some(video) = self.selection.video().cloned() else {
            return Err(StreamRecorderError::NoVideoSelected);
        };
        if self.status != SessionStatus::Idle {
            tracing::warn!(status = ?self.status, "start ignored - session already running");
            return Ok(());
        }

        if let Some(audio) = self.selection.audio().cloned() {
            let stream = self.capture.acquire(&audio).await?;
            self.manager.replace_track(TrackKind::Audio, stream);
        }
        if !self.manager.current().is_video_active() {
            tracing::info!(device = %video.label, "previewed video inactive, re-acquiring");
            let stream = self.capture.acquire(&video).await?;
            self.manager.replace_track(TrackKind::Video, stream);
            self.geometry.observe(self.manager.current());
        }

        let mut handle = self.recorder.bind(self.manager.current())?;
        let (tx, rx) = mpsc::channel(RECORDER_EVENT_CAPACITY);
        handle.start(self.config.flush_interval, tx)?;

        // Only a recording that actually starts supersedes the previous
        // result; any failure above leaves its download intact.
        self.result_ready = false;
        self.chunks.clear();
        self.elapsed_seconds = 0;
        if let Some(previous) = self.artifact.take() {
            self.urls.revoke(previous.url());
        }

        self.handle = Some(handle);
        self.events = Some(rx);
        self.status = SessionStatus::Recording;
        tracing::info!(flush_interval = ?self.config.flush_interval, "recording started");
        Ok(())
    }

    /// Requests finalization of the running recording.
    ///
    /// No-op outside `Recording`. The transition back to idle happens when
    /// the platform's finalize event arrives through
    /// [`next_event()`](Self::next_event).
    pub fn stop(&mut self) {
        if self.status != SessionStatus::Recording {
            return;
        }
        if let Some(handle) = self.handle.as_mut() {
            handle.request_stop();
        }
        self.status = SessionStatus::Finalizing;
        tracing::info!("stop requested, finalizing");
    }

    /// Waits for the next recorder event and applies it to the session.
    ///
    /// Returns `None` once no recorder is bound (before `start()` or after
    /// finalization consumed the channel).
    pub async fn next_event(&mut self) -> Option<ControllerEvent> {
        let event = match self.events.as_mut() {
            Some(rx) => rx.recv().await?,
            None => return None,
        };
        Some(self.apply(event))
    }

    fn apply(&mut self, event: RecorderEvent) -> ControllerEvent {
        match event {
            RecorderEvent::Chunk(data) => {
                self.chunks.push(data);
                self.elapsed_seconds += 1;
                ControllerEvent::Tick {
                    elapsed_seconds: self.elapsed_seconds,
                }
            }
            RecorderEvent::Finalized => {
                self.finalize();
                ControllerEvent::ResultReady
            }
        }
    }

    /// Finalization: assemble the artifact, release all hardware, reset the
    /// session. Chunk state and tracks are cleared unconditionally so a
    /// surprising platform finalize can never leak device locks.
    fn finalize(&mut self) {
        let total: usize = self.chunks.iter().map(Vec::len).sum();
        let mut blob = Vec::with_capacity(total);
        for chunk in self.chunks.drain(..) {
            blob.extend_from_slice(&chunk);
        }

        let data = Arc::new(blob);
        let url = self.urls.create(Arc::clone(&data));
        let filename = derive_filename(Utc::now(), &self.config.extension);

        self.manager.teardown();
        self.elapsed_seconds = 0;
        self.handle = None;
        self.events = None;
        self.status = SessionStatus::Idle;

        tracing::info!(bytes = data.len(), %filename, "recording finalized");
        self.artifact = Some(Artifact::new(data, url, filename));
        self.result_ready = true;
    }

    /// Prepares the next recording after a result was displayed.
    ///
    /// Revokes the prior artifact's download handle and re-acquires fresh
    /// streams for the previously selected devices (their hardware was
    /// stopped at finalize). Device selections are kept. No-op unless a
    /// result is currently displayed.
    ///
    /// # Errors
    ///
    /// Acquisition failures are surfaced; the controller stays idle.
    pub async fn reconfigure_next(&mut self) -> Result<(), StreamRecorderError> {
        if !self.result_ready {
            tracing::warn!("reconfigure ignored - no result displayed");
            return Ok(());
        }

        self.result_ready = false;
        if let Some(previous) = self.artifact.take() {
            self.urls.revoke(previous.url());
        }

        if let Some(video) = self.selection.video().cloned() {
            let stream = self.capture.acquire(&video).await?;
            self.manager.replace_track(TrackKind::Video, stream);
            self.geometry.observe(self.manager.current());
        }
        if let Some(audio) = self.selection.audio().cloned() {
            let stream = self.capture.acquire(&audio).await?;
            self.manager.replace_track(TrackKind::Audio, stream);
        }
        Ok(())
    }

    /// Full disposal: stops an active recorder and every hardware track.
    pub fn teardown(&mut self) {
        if let Some(handle) = self.handle.as_mut() {
            handle.request_stop();
        }
        self.handle = None;
        self.events = None;
        self.manager.teardown();
        self.chunks.clear();
        self.elapsed_seconds = 0;
        self.status = SessionStatus::Idle;
    }
}
