//! Aspect-ratio-correct preview sizing.

use crate::stream::CompositeStream;

/// Fallback when the platform does not report an aspect ratio for the
/// active video track.
pub const DEFAULT_ASPECT_RATIO: f64 = 16.0 / 9.0;

/// Derives the preview rectangle from the container height and the live
/// stream's reported video settings.
///
/// Height is the container minus a fixed padding on both sides; width is
/// height times the video track's aspect ratio. Recomputed after every video
/// track replacement and after every container resize - when both fire in
/// the same tick, the track change wins because the controller re-observes
/// after replacement.
#[derive(Debug, Clone)]
pub struct PreviewGeometry {
    padding: f64,
    height: f64,
    width: f64,
}

impl PreviewGeometry {
    /// Creates a calculator with the given fixed padding.
    pub fn new(padding: f64) -> Self {
        Self {
            padding,
            height: 0.0,
            width: 0.0,
        }
    }

    /// Derived preview height.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Derived preview width. Stays at its previous value while no video
    /// track is present or the height is unset.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Current `(width, height)` pair.
    #[must_use]
    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Updates the height from a raw container measurement.
    ///
    /// Call [`observe()`](Self::observe) afterwards to recompute the width.
    pub fn set_container_height(&mut self, raw_height: f64) {
        self.height = (raw_height - self.padding * 2.0).max(0.0);
    }

    /// Recomputes the width from the stream's video settings.
    ///
    /// Leaves the prior width unchanged when no video track is installed or
    /// the height is zero/unset - this avoids the preview flashing to zero
    /// between replacements. Falls back to [`DEFAULT_ASPECT_RATIO`] when the
    /// track reports none.
    pub fn observe(&mut self, stream: &CompositeStream) {
        let Some(video) = stream.video_track() else {
            return;
        };
        if self.height <= 0.0 {
            return;
        }

        let aspect = video
            .settings()
            .aspect_ratio
            .unwrap_or(DEFAULT_ASPECT_RATIO);
        self.width = self.height * aspect;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{SingleTrackStream, Track, TrackKind, TrackSettings};
    use crate::StreamManager;

    fn stream_with_video(settings: TrackSettings) -> StreamManager {
        let mut manager = StreamManager::new();
        manager.replace_track(
            TrackKind::Video,
            SingleTrackStream::from_track(Track::new(TrackKind::Video, "cam", settings)),
        );
        manager
    }

    #[test]
    fn test_width_from_reported_aspect() {
        let manager = stream_with_video(TrackSettings::video(1280, 720));
        let mut geometry = PreviewGeometry::new(20.0);
        geometry.set_container_height(520.0);
        geometry.observe(manager.current());

        assert_eq!(geometry.height(), 480.0);
        assert!((geometry.width() - 480.0 * (16.0 / 9.0)).abs() < 1e-6);
        assert!((geometry.width() - 853.333_333).abs() < 1e-3);
    }

    #[test]
    fn test_default_aspect_when_unreported() {
        let manager = stream_with_video(TrackSettings::default());
        let mut geometry = PreviewGeometry::new(0.0);
        geometry.set_container_height(480.0);
        geometry.observe(manager.current());

        assert!((geometry.width() - 480.0 * DEFAULT_ASPECT_RATIO).abs() < 1e-6);
    }

    #[test]
    fn test_no_video_track_keeps_prior_width() {
        let manager = stream_with_video(TrackSettings::video(1280, 720));
        let mut geometry = PreviewGeometry::new(0.0);
        geometry.set_container_height(480.0);
        geometry.observe(manager.current());
        let width = geometry.width();

        let empty = StreamManager::new();
        geometry.observe(empty.current());
        assert_eq!(geometry.width(), width);
    }

    #[test]
    fn test_zero_height_keeps_prior_width() {
        let manager = stream_with_video(TrackSettings::video(1280, 720));
        let mut geometry = PreviewGeometry::new(0.0);
        geometry.set_container_height(480.0);
        geometry.observe(manager.current());
        let width = geometry.width();

        geometry.set_container_height(0.0);
        geometry.observe(manager.current());
        assert_eq!(geometry.width(), width);
    }

    #[test]
    fn test_padding_clamps_to_zero() {
        let mut geometry = PreviewGeometry::new(20.0);
        geometry.set_container_height(10.0);
        assert_eq!(geometry.height(), 0.0);
    }

    #[test]
    fn test_wide_aspect() {
        let manager = stream_with_video(TrackSettings::video(1920, 800));
        let mut geometry = PreviewGeometry::new(0.0);
        geometry.set_container_height(400.0);
        geometry.observe(manager.current());
        assert!((geometry.width() - 960.0).abs() < 1e-6);
    }
}
