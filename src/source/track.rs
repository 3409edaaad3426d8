//! Media track with RAII hardware release.

use uuid::Uuid;

use super::TrackKind;

/// Releases the underlying capture hardware when a [`Track`] stops.
///
/// Backends attach a guard to each track they hand out. The guard's
/// [`release()`](TrackGuard::release) is called exactly once, either from
/// [`Track::stop()`] or when the track is dropped without an explicit stop.
///
/// # Example
///
/// ```
/// use stream_recorder::{Track, TrackGuard, TrackKind, TrackSettings};
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
///
/// struct FlagGuard(Arc<AtomicBool>);
///
/// impl TrackGuard for FlagGuard {
///     fn release(&mut self) {
///         self.0.store(true, Ordering::SeqCst);
///     }
/// }
///
/// let released = Arc::new(AtomicBool::new(false));
/// let mut track = Track::with_guard(
///     TrackKind::Audio,
///     "Internal Microphone",
///     TrackSettings::default(),
///     Box::new(FlagGuard(released.clone())),
/// );
/// track.stop();
/// assert!(released.load(Ordering::SeqCst));
/// ```
pub trait TrackGuard: Send {
    /// Releases the hardware resource behind this track.
    fn release(&mut self);
}

/// Read-only snapshot of a track's reported capture settings.
///
/// Queried from the live track on every replacement, never cached stale.
/// Video tracks report geometry; audio tracks report format. Platforms may
/// legitimately report nothing, in which case consumers fall back to their
/// own defaults (e.g. the 16:9 preview aspect ratio).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackSettings {
    /// Width over height of the produced video, when reported.
    pub aspect_ratio: Option<f64>,
    /// Video frame width in pixels.
    pub width: Option<u32>,
    /// Video frame height in pixels.
    pub height: Option<u32>,
    /// Audio sample rate in Hz.
    pub sample_rate: Option<u32>,
    /// Audio channel count.
    pub channels: Option<u16>,
}

impl TrackSettings {
    /// Settings for a video track with known frame dimensions.
    ///
    /// The aspect ratio is derived from the dimensions.
    pub fn video(width: u32, height: u32) -> Self {
        let aspect_ratio = if height == 0 {
            None
        } else {
            Some(f64::from(width) / f64::from(height))
        };
        Self {
            aspect_ratio,
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    /// Settings for an audio track with a known capture format.
    pub fn audio(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate: Some(sample_rate),
            channels: Some(channels),
            ..Self::default()
        }
    }
}

/// One media channel (audio or video) that can be independently stopped,
/// muted, or replaced.
///
/// A track is exclusively owned: first by the [`SingleTrackStream`] that
/// acquisition returned, then by the [`StreamManager`] once installed.
/// Consumers only ever see `&Track`. Stopping is idempotent and releases the
/// underlying hardware through the attached [`TrackGuard`].
///
/// A freshly constructed track always starts enabled - mute state never
/// carries over from a replaced track to its replacement.
///
/// [`SingleTrackStream`]: crate::SingleTrackStream
/// [`StreamManager`]: crate::StreamManager
#[derive(Debug)]
pub struct Track {
    id: String,
    kind: TrackKind,
    label: String,
    settings: TrackSettings,
    enabled: bool,
    stopped: bool,
    guard: Option<Box<dyn TrackGuard>>,
}

impl std::fmt::Debug for dyn TrackGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TrackGuard")
    }
}

impl Track {
    /// Creates a track with no hardware guard (synthetic sources, tests).
    pub fn new(kind: TrackKind, label: impl Into<String>, settings: TrackSettings) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            label: label.into(),
            settings,
            enabled: true,
            stopped: false,
            guard: None,
        }
    }

    /// Creates a track whose hardware is released through `guard` on stop.
    pub fn with_guard(
        kind: TrackKind,
        label: impl Into<String>,
        settings: TrackSettings,
        guard: Box<dyn TrackGuard>,
    ) -> Self {
        let mut track = Self::new(kind, label, settings);
        track.guard = Some(guard);
        track
    }

    /// Unique id of this track instance.
    ///
    /// Two acquisitions of the same device yield tracks with different ids.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The kind of media this track carries.
    #[must_use]
    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    /// Human-readable label, usually the device label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The track's reported capture settings.
    #[must_use]
    pub fn settings(&self) -> &TrackSettings {
        &self.settings
    }

    /// Whether the track currently produces media (`false` = muted).
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Toggles the enabled flag in place without stopping the track.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// `true` until the track has been stopped.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.stopped
    }

    /// Stops the track and releases the underlying hardware. Idempotent.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        if let Some(mut guard) = self.guard.take() {
            guard.release();
        }
    }
}

impl Drop for Track {
    fn drop(&mut self) {
        // A dropped track must not leak an open device.
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingGuard(Arc<AtomicUsize>);

    impl TrackGuard for CountingGuard {
        fn release(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_track_starts_enabled_and_active() {
        let track = Track::new(TrackKind::Video, "cam", TrackSettings::video(1280, 720));
        assert!(track.is_enabled());
        assert!(track.is_active());
    }

    #[test]
    fn test_stop_releases_guard_once() {
        let releases = Arc::new(AtomicUsize::new(0));
        let mut track = Track::with_guard(
            TrackKind::Audio,
            "mic",
            TrackSettings::default(),
            Box::new(CountingGuard(releases.clone())),
        );

        track.stop();
        track.stop();
        assert!(!track.is_active());
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_releases_guard() {
        let releases = Arc::new(AtomicUsize::new(0));
        {
            let _track = Track::with_guard(
                TrackKind::Audio,
                "mic",
                TrackSettings::default(),
                Box::new(CountingGuard(releases.clone())),
            );
        }
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stopped_then_dropped_releases_once() {
        let releases = Arc::new(AtomicUsize::new(0));
        {
            let mut track = Track::with_guard(
                TrackKind::Video,
                "cam",
                TrackSettings::default(),
                Box::new(CountingGuard(releases.clone())),
            );
            track.stop();
        }
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_video_settings_aspect_ratio() {
        let settings = TrackSettings::video(1920, 1080);
        let aspect = settings.aspect_ratio.unwrap();
        assert!((aspect - 16.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_video_settings_zero_height() {
        let settings = TrackSettings::video(1920, 0);
        assert_eq!(settings.aspect_ratio, None);
    }

    #[test]
    fn test_unique_ids_per_acquisition() {
        let a = Track::new(TrackKind::Audio, "mic", TrackSettings::default());
        let b = Track::new(TrackKind::Audio, "mic", TrackSettings::default());
        assert_ne!(a.id(), b.id());
    }
}
