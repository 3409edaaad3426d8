//! Composite stream ownership and track replacement.

use crate::event::StreamChangeCallback;
use crate::source::{SingleTrackStream, Track, TrackKind};

/// A single logical audio+video stream assembled from at most one track of
/// each kind.
///
/// Exclusively owned by the [`StreamManager`]; every other component reads
/// through `&CompositeStream` and must never stop tracks it did not acquire.
#[derive(Debug, Default)]
pub struct CompositeStream {
    audio: Option<Track>,
    video: Option<Track>,
}

impl CompositeStream {
    /// The audio track, if one is installed.
    #[must_use]
    pub fn audio_track(&self) -> Option<&Track> {
        self.audio.as_ref()
    }

    /// The video track, if one is installed.
    #[must_use]
    pub fn video_track(&self) -> Option<&Track> {
        self.video.as_ref()
    }

    /// The track of `kind`, if one is installed.
    #[must_use]
    pub fn track(&self, kind: TrackKind) -> Option<&Track> {
        match kind {
            TrackKind::Audio => self.audio_track(),
            TrackKind::Video => self.video_track(),
        }
    }

    /// Number of installed tracks (0..=2).
    #[must_use]
    pub fn track_count(&self) -> usize {
        usize::from(self.audio.is_some()) + usize::from(self.video.is_some())
    }

    /// `true` while any installed track is still running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.audio.as_ref().is_some_and(Track::is_active)
            || self.video.as_ref().is_some_and(Track::is_active)
    }

    /// `true` while an installed video track is still running.
    ///
    /// Recording and preview are only meaningful in this state.
    #[must_use]
    pub fn is_video_active(&self) -> bool {
        self.video.as_ref().is_some_and(Track::is_active)
    }

    fn slot_mut(&mut self, kind: TrackKind) -> &mut Option<Track> {
        match kind {
            TrackKind::Audio => &mut self.audio,
            TrackKind::Video => &mut self.video,
        }
    }
}

/// Sole owner of the working [`CompositeStream`].
///
/// Supports atomic per-kind track replacement and in-place audio mute
/// without dropping the track. Subscribers are notified synchronously after
/// every replacement; mute is deliberately silent so preview and recording
/// pipelines are undisturbed.
#[derive(Default)]
pub struct StreamManager {
    stream: CompositeStream,
    on_change: Option<StreamChangeCallback>,
}

impl StreamManager {
    /// Creates a manager with an empty composite stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manager that invokes `callback` after every track mutation.
    pub fn with_change_callback(callback: StreamChangeCallback) -> Self {
        Self {
            stream: CompositeStream::default(),
            on_change: Some(callback),
        }
    }

    /// The live composite stream for preview rendering and recorder binding.
    #[must_use]
    pub fn current(&self) -> &CompositeStream {
        &self.stream
    }

    /// Stops and removes the existing track of `kind`, then installs the
    /// first track of `kind` found in `incoming`.
    ///
    /// No-op-safe: if `incoming` carries no track of `kind`, the slot is left
    /// empty (the previous track is still removed and stopped). The other
    /// kind's track is never touched. The installed track is forced enabled
    /// so a replacement never inherits the prior track's mute state. Any
    /// leftover tracks in `incoming` are stopped when it drops here.
    pub fn replace_track(&mut self, kind: TrackKind, mut incoming: SingleTrackStream) {
        let slot = self.stream.slot_mut(kind);
        if let Some(mut old) = slot.take() {
            tracing::debug!(%kind, track = old.id(), "stopping replaced track");
            old.stop();
        }

        if let Some(mut track) = incoming.take_track(kind) {
            track.set_enabled(true);
            tracing::debug!(%kind, track = track.id(), label = track.label(), "track installed");
            *slot = Some(track);
        } else {
            tracing::debug!(%kind, "no replacement track in acquired stream, slot left empty");
        }

        self.notify();
    }

    /// Disables the audio track in place. Does not stop or replace it, and
    /// emits no change notification.
    pub fn mute_audio(&mut self) {
        if let Some(track) = self.stream.audio.as_mut() {
            track.set_enabled(false);
        }
    }

    /// Re-enables a muted audio track in place.
    pub fn unmute_audio(&mut self) {
        if let Some(track) = self.stream.audio.as_mut() {
            track.set_enabled(true);
        }
    }

    /// Stops every track currently held. Used on full disposal and at
    /// recording finalize (ending camera/microphone hardware use).
    pub fn teardown(&mut self) {
        if let Some(track) = self.stream.audio.as_mut() {
            track.stop();
        }
        if let Some(track) = self.stream.video.as_mut() {
            track.stop();
        }
    }

    fn notify(&self) {
        if let Some(ref callback) = self.on_change {
            callback(&self.stream);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::stream_change_callback;
    use crate::source::TrackSettings;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn audio_stream(label: &str) -> SingleTrackStream {
        SingleTrackStream::from_track(Track::new(
            TrackKind::Audio,
            label,
            TrackSettings::audio(48_000, 2),
        ))
    }

    fn video_stream(label: &str) -> SingleTrackStream {
        SingleTrackStream::from_track(Track::new(
            TrackKind::Video,
            label,
            TrackSettings::video(1280, 720),
        ))
    }

    #[test]
    fn test_replace_video_keeps_audio_untouched() {
        let mut manager = StreamManager::new();
        manager.replace_track(TrackKind::Audio, audio_stream("mic"));
        let audio_id = manager.current().audio_track().unwrap().id().to_string();

        manager.replace_track(TrackKind::Video, video_stream("cam-a"));
        manager.replace_track(TrackKind::Video, video_stream("cam-b"));
        manager.replace_track(TrackKind::Video, video_stream("cam-c"));

        let stream = manager.current();
        assert_eq!(stream.track_count(), 2);
        assert_eq!(stream.video_track().unwrap().label(), "cam-c");
        assert_eq!(stream.audio_track().unwrap().id(), audio_id);
        assert!(stream.audio_track().unwrap().is_active());
    }

    #[test]
    fn test_replacement_starts_unmuted() {
        let mut manager = StreamManager::new();
        manager.replace_track(TrackKind::Audio, audio_stream("mic-a"));
        manager.mute_audio();
        assert!(!manager.current().audio_track().unwrap().is_enabled());

        manager.replace_track(TrackKind::Audio, audio_stream("mic-b"));
        assert!(manager.current().audio_track().unwrap().is_enabled());
    }

    #[test]
    fn test_replace_with_empty_stream_clears_slot() {
        let mut manager = StreamManager::new();
        manager.replace_track(TrackKind::Video, video_stream("cam"));
        assert!(manager.current().video_track().is_some());

        manager.replace_track(TrackKind::Video, SingleTrackStream::empty());
        assert!(manager.current().video_track().is_none());
    }

    #[test]
    fn test_mute_unmute_toggle_in_place() {
        let mut manager = StreamManager::new();
        manager.replace_track(TrackKind::Audio, audio_stream("mic"));
        let id = manager.current().audio_track().unwrap().id().to_string();

        manager.mute_audio();
        let track = manager.current().audio_track().unwrap();
        assert!(!track.is_enabled());
        assert!(track.is_active());
        assert_eq!(track.id(), id);

        manager.unmute_audio();
        assert!(manager.current().audio_track().unwrap().is_enabled());
    }

    #[test]
    fn test_change_notification_fires_on_replace_not_mute() {
        let notifications = Arc::new(AtomicUsize::new(0));
        let counter = notifications.clone();
        let mut manager = StreamManager::with_change_callback(stream_change_callback(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        manager.replace_track(TrackKind::Audio, audio_stream("mic"));
        assert_eq!(notifications.load(Ordering::SeqCst), 1);

        manager.mute_audio();
        manager.unmute_audio();
        assert_eq!(notifications.load(Ordering::SeqCst), 1);

        manager.replace_track(TrackKind::Video, video_stream("cam"));
        assert_eq!(notifications.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_notification_observes_post_replacement_track() {
        let mut manager = StreamManager::with_change_callback(stream_change_callback(|stream| {
            if let Some(video) = stream.video_track() {
                assert_eq!(video.label(), "cam");
            }
        }));
        manager.replace_track(TrackKind::Video, video_stream("cam"));
    }

    #[test]
    fn test_teardown_stops_everything() {
        let mut manager = StreamManager::new();
        manager.replace_track(TrackKind::Audio, audio_stream("mic"));
        manager.replace_track(TrackKind::Video, video_stream("cam"));

        manager.teardown();

        let stream = manager.current();
        assert!(!stream.is_active());
        assert!(!stream.audio_track().unwrap().is_active());
        assert!(!stream.video_track().unwrap().is_active());
    }

    #[test]
    fn test_is_video_active_after_stop() {
        let mut manager = StreamManager::new();
        manager.replace_track(TrackKind::Video, video_stream("cam"));
        assert!(manager.current().is_video_active());

        manager.teardown();
        assert!(!manager.current().is_video_active());
    }
}
