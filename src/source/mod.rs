//! Device descriptors and the capture-port seam.
//!
//! This module is the boundary between the platform's capture primitive and
//! the rest of the crate: a [`CapturePort`] turns a [`DeviceDescriptor`] into
//! a [`SingleTrackStream`] whose track the [`StreamManager`] then installs.
//!
//! [`StreamManager`]: crate::StreamManager

mod cpal_audio;
mod mock;
mod track;

pub use cpal_audio::CpalAudioPort;
pub use mock::MockCapturePort;
pub use track::{Track, TrackGuard, TrackSettings};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::StreamRecorderError;

/// The kind of media a device or track carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    /// Audio input (microphone).
    Audio,
    /// Video input (camera).
    Video,
}

impl std::fmt::Display for TrackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Audio => f.write_str("audio"),
            Self::Video => f.write_str("video"),
        }
    }
}

/// An input device as reported by enumeration.
///
/// Immutable once obtained; the enumeration source (plug/unplug refresh) is
/// an external collaborator and is treated as read-only input here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescriptor {
    /// Opaque platform identifier.
    pub id: String,
    /// Human-readable device label.
    pub label: String,
    /// Which kind of media this device produces.
    pub kind: TrackKind,
}

impl DeviceDescriptor {
    /// Creates a descriptor.
    pub fn new(kind: TrackKind, id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
        }
    }
}

/// The result of one device acquisition.
///
/// Normally carries exactly one track of the requested kind, but a backend
/// may legally return a stream without one; [`StreamManager::replace_track`]
/// is no-op-safe against that.
///
/// [`StreamManager::replace_track`]: crate::StreamManager::replace_track
#[derive(Debug, Default)]
pub struct SingleTrackStream {
    tracks: Vec<Track>,
}

impl SingleTrackStream {
    /// A stream with no tracks.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A stream carrying exactly one track.
    pub fn from_track(track: Track) -> Self {
        Self {
            tracks: vec![track],
        }
    }

    /// A stream carrying the given tracks.
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    /// The tracks in this stream, in acquisition order.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Removes and returns the first track of `kind`, if any.
    ///
    /// Remaining tracks stay in the stream and stop when it is dropped.
    pub(crate) fn take_track(&mut self, kind: TrackKind) -> Option<Track> {
        let index = self.tracks.iter().position(|t| t.kind() == kind)?;
        Some(self.tracks.remove(index))
    }
}

/// Platform capture primitive: opens devices and enumerates them.
///
/// Acquisition is the crate's only suspension point - it awaits a platform
/// response (and may trigger a permission prompt). Calling
/// [`acquire()`](CapturePort::acquire) twice with the same descriptor yields
/// two independent streams; the caller is responsible for stopping the
/// previous one, which [`StreamManager::replace_track`] does on install.
///
/// [`StreamManager::replace_track`]: crate::StreamManager::replace_track
#[async_trait]
pub trait CapturePort: Send + Sync {
    /// Opens `descriptor` and returns its capability stream.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceUnavailable`](StreamRecorderError::DeviceUnavailable)
    /// when the platform denies or cannot open the device.
    async fn acquire(
        &self,
        descriptor: &DeviceDescriptor,
    ) -> Result<SingleTrackStream, StreamRecorderError>;

    /// Lists the currently known devices of `kind`.
    fn devices(&self, kind: TrackKind) -> Vec<DeviceDescriptor>;
}
