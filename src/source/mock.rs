//! Mock capture port for testing without hardware.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{CapturePort, DeviceDescriptor, SingleTrackStream, Track, TrackGuard, TrackKind};
use crate::{StreamRecorderError, TrackSettings};

/// A scriptable capture backend for exercising the full pipeline without
/// actual devices, suitable for CI environments.
///
/// Cloning shares the underlying state, so tests can keep a handle after
/// moving a clone into the controller.
///
/// # Example
///
/// ```
/// use stream_recorder::{CapturePort, MockCapturePort, TrackKind};
///
/// let port = MockCapturePort::new();
/// let cam = port.add_device(TrackKind::Video, "cam-1", "FaceTime HD");
/// let mic = port.add_device(TrackKind::Audio, "mic-1", "Internal Microphone");
///
/// assert_eq!(port.devices(TrackKind::Video), vec![cam]);
/// assert_eq!(port.devices(TrackKind::Audio), vec![mic]);
/// ```
#[derive(Clone, Default)]
pub struct MockCapturePort {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    devices: Vec<MockDevice>,
    acquisitions: u64,
    guards: Vec<GuardProbe>,
}

struct MockDevice {
    descriptor: DeviceDescriptor,
    settings: TrackSettings,
    fail: bool,
    empty_stream: bool,
}

struct GuardProbe {
    device_id: String,
    released: Arc<AtomicBool>,
}

/// Guard handed out with every mock track; flips a flag on release so tests
/// can assert hardware was freed.
struct MockGuard {
    released: Arc<AtomicBool>,
}

impl TrackGuard for MockGuard {
    fn release(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

impl MockCapturePort {
    /// Creates an empty mock port with no devices.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a device and returns its descriptor.
    ///
    /// Video devices default to 1280x720 settings (16:9); audio devices to
    /// 48kHz stereo. Override with [`set_settings()`](Self::set_settings).
    pub fn add_device(
        &self,
        kind: TrackKind,
        id: impl Into<String>,
        label: impl Into<String>,
    ) -> DeviceDescriptor {
        let descriptor = DeviceDescriptor::new(kind, id, label);
        let settings = match kind {
            TrackKind::Video => TrackSettings::video(1280, 720),
            TrackKind::Audio => TrackSettings::audio(48_000, 2),
        };
        let mut state = self.inner.lock().expect("mock state poisoned");
        state.devices.push(MockDevice {
            descriptor: descriptor.clone(),
            settings,
            fail: false,
            empty_stream: false,
        });
        descriptor
    }

    /// Overrides the settings the device's tracks will report.
    ///
    /// Use `TrackSettings::default()` to model a platform that reports no
    /// aspect ratio.
    pub fn set_settings(&self, id: &str, settings: TrackSettings) {
        let mut state = self.inner.lock().expect("mock state poisoned");
        if let Some(device) = state.devices.iter_mut().find(|d| d.descriptor.id == id) {
            device.settings = settings;
        }
    }

    /// Makes subsequent acquisitions of `id` fail with `DeviceUnavailable`.
    pub fn fail_device(&self, id: &str) {
        let mut state = self.inner.lock().expect("mock state poisoned");
        if let Some(device) = state.devices.iter_mut().find(|d| d.descriptor.id == id) {
            device.fail = true;
        }
    }

    /// Makes subsequent acquisitions of `id` return a stream with no tracks.
    pub fn empty_stream_for(&self, id: &str) {
        let mut state = self.inner.lock().expect("mock state poisoned");
        if let Some(device) = state.devices.iter_mut().find(|d| d.descriptor.id == id) {
            device.empty_stream = true;
        }
    }

    /// Total number of successful acquisitions so far.
    pub fn acquire_count(&self) -> u64 {
        self.inner.lock().expect("mock state poisoned").acquisitions
    }

    /// Number of tracks handed out for `id` whose hardware has been released.
    pub fn released(&self, id: &str) -> usize {
        let state = self.inner.lock().expect("mock state poisoned");
        state
            .guards
            .iter()
            .filter(|g| g.device_id == id && g.released.load(Ordering::SeqCst))
            .count()
    }

    /// Number of tracks handed out for `id` still holding hardware open.
    pub fn live(&self, id: &str) -> usize {
        let state = self.inner.lock().expect("mock state poisoned");
        state
            .guards
            .iter()
            .filter(|g| g.device_id == id && !g.released.load(Ordering::SeqCst))
            .count()
    }
}

#[async_trait]
impl CapturePort for MockCapturePort {
    async fn acquire(
        &self,
        descriptor: &DeviceDescriptor,
    ) -> Result<SingleTrackStream, StreamRecorderError> {
        let mut state = self.inner.lock().expect("mock state poisoned");

        let device = state
            .devices
            .iter()
            .find(|d| d.descriptor.id == descriptor.id)
            .ok_or_else(|| StreamRecorderError::DeviceNotFound {
                name: descriptor.label.clone(),
            })?;

        if device.fail {
            return Err(StreamRecorderError::DeviceUnavailable {
                name: descriptor.label.clone(),
                reason: "mock device configured to fail".to_string(),
            });
        }

        let empty = device.empty_stream;
        let settings = device.settings.clone();
        let kind = device.descriptor.kind;
        let label = device.descriptor.label.clone();

        state.acquisitions += 1;

        if empty {
            return Ok(SingleTrackStream::empty());
        }

        let released = Arc::new(AtomicBool::new(false));
        state.guards.push(GuardProbe {
            device_id: descriptor.id.clone(),
            released: released.clone(),
        });

        let track = Track::with_guard(kind, label, settings, Box::new(MockGuard { released }));
        Ok(SingleTrackStream::from_track(track))
    }

    fn devices(&self, kind: TrackKind) -> Vec<DeviceDescriptor> {
        let state = self.inner.lock().expect("mock state poisoned");
        state
            .devices
            .iter()
            .filter(|d| d.descriptor.kind == kind)
            .map(|d| d.descriptor.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_acquire_returns_track_of_requested_kind() {
        let port = MockCapturePort::new();
        let cam = port.add_device(TrackKind::Video, "cam-1", "FaceTime HD");

        let stream = port.acquire(&cam).await.unwrap();
        assert_eq!(stream.tracks().len(), 1);
        assert_eq!(stream.tracks()[0].kind(), TrackKind::Video);
        assert_eq!(port.acquire_count(), 1);
    }

    #[tokio::test]
    async fn test_acquisitions_are_independent_instances() {
        let port = MockCapturePort::new();
        let mic = port.add_device(TrackKind::Audio, "mic-1", "Mic");

        let first = port.acquire(&mic).await.unwrap();
        let second = port.acquire(&mic).await.unwrap();
        assert_ne!(first.tracks()[0].id(), second.tracks()[0].id());
        assert_eq!(port.live("mic-1"), 2);
    }

    #[tokio::test]
    async fn test_failing_device() {
        let port = MockCapturePort::new();
        let cam = port.add_device(TrackKind::Video, "cam-1", "Cam");
        port.fail_device("cam-1");

        let result = port.acquire(&cam).await;
        assert!(matches!(
            result,
            Err(StreamRecorderError::DeviceUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_device() {
        let port = MockCapturePort::new();
        let ghost = DeviceDescriptor::new(TrackKind::Audio, "ghost", "Ghost");
        let result = port.acquire(&ghost).await;
        assert!(matches!(
            result,
            Err(StreamRecorderError::DeviceNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_dropping_stream_releases_hardware() {
        let port = MockCapturePort::new();
        let cam = port.add_device(TrackKind::Video, "cam-1", "Cam");

        let stream = port.acquire(&cam).await.unwrap();
        assert_eq!(port.live("cam-1"), 1);
        drop(stream);
        assert_eq!(port.released("cam-1"), 1);
    }

    #[tokio::test]
    async fn test_empty_stream_mode() {
        let port = MockCapturePort::new();
        let cam = port.add_device(TrackKind::Video, "cam-1", "Cam");
        port.empty_stream_for("cam-1");

        let stream = port.acquire(&cam).await.unwrap();
        assert!(stream.tracks().is_empty());
    }
}
