//! Device selection and permission state.

use serde::{Deserialize, Serialize};

use crate::source::{DeviceDescriptor, TrackKind};

/// Status of the platform's capture permission, reported by an external
/// collaborator.
///
/// The core reacts only to `Denied` (to decide whether a dismissible warning
/// should show); requesting permission happens implicitly through
/// acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    /// Capture permission was granted.
    Granted,
    /// Capture permission was denied; some devices will not enumerate.
    Denied,
    /// The permission prompt has not been answered yet.
    #[default]
    Pending,
    /// The platform does not support the permission query.
    Unsupported,
}

/// Currently chosen audio/video devices plus permission state.
///
/// Changing a selection drives acquisition and a subsequent track
/// replacement. Each kind carries a generation counter so an acquisition
/// that resolves after a newer selection superseded it can be discarded
/// (there is no explicit cancel for in-flight acquisitions).
#[derive(Debug, Default)]
pub struct Selection {
    audio: Option<DeviceDescriptor>,
    video: Option<DeviceDescriptor>,
    audio_generation: u64,
    video_generation: u64,
    permission: PermissionStatus,
    warning_dismissed: bool,
}

impl Selection {
    /// Creates an empty selection with pending permission.
    pub fn new() -> Self {
        Self::default()
    }

    /// The selected audio device, if any.
    #[must_use]
    pub fn audio(&self) -> Option<&DeviceDescriptor> {
        self.audio.as_ref()
    }

    /// The selected video device, if any.
    #[must_use]
    pub fn video(&self) -> Option<&DeviceDescriptor> {
        self.video.as_ref()
    }

    /// The selected device of `kind`, if any.
    #[must_use]
    pub fn device(&self, kind: TrackKind) -> Option<&DeviceDescriptor> {
        match kind {
            TrackKind::Audio => self.audio(),
            TrackKind::Video => self.video(),
        }
    }

    /// Records a new selection of `descriptor`'s kind and returns the
    /// generation the caller should check after its acquisition resolves.
    pub fn select(&mut self, descriptor: DeviceDescriptor) -> u64 {
        match descriptor.kind {
            TrackKind::Audio => {
                self.audio = Some(descriptor);
                self.audio_generation += 1;
                self.audio_generation
            }
            TrackKind::Video => {
                self.video = Some(descriptor);
                self.video_generation += 1;
                self.video_generation
            }
        }
    }

    /// Whether `generation` still corresponds to the current selection of
    /// `kind`. A stale acquisition must be discarded by the caller.
    #[must_use]
    pub fn is_current(&self, kind: TrackKind, generation: u64) -> bool {
        match kind {
            TrackKind::Audio => self.audio_generation == generation,
            TrackKind::Video => self.video_generation == generation,
        }
    }

    /// Current permission status.
    #[must_use]
    pub fn permission(&self) -> PermissionStatus {
        self.permission
    }

    /// Updates the permission status. A status change re-arms the
    /// dismissible warning.
    pub fn set_permission(&mut self, status: PermissionStatus) {
        if status != self.permission {
            self.warning_dismissed = false;
        }
        self.permission = status;
    }

    /// `true` while permission is denied and the warning has not been
    /// dismissed.
    #[must_use]
    pub fn permission_warning(&self) -> bool {
        self.permission == PermissionStatus::Denied && !self.warning_dismissed
    }

    /// Dismisses the permission warning until the status next changes.
    pub fn dismiss_permission_warning(&mut self) {
        self.warning_dismissed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mic() -> DeviceDescriptor {
        DeviceDescriptor::new(TrackKind::Audio, "mic-1", "Mic")
    }

    fn cam() -> DeviceDescriptor {
        DeviceDescriptor::new(TrackKind::Video, "cam-1", "Cam")
    }

    #[test]
    fn test_select_sets_device_per_kind() {
        let mut selection = Selection::new();
        selection.select(mic());
        selection.select(cam());

        assert_eq!(selection.audio().unwrap().id, "mic-1");
        assert_eq!(selection.video().unwrap().id, "cam-1");
        assert_eq!(selection.device(TrackKind::Audio).unwrap().id, "mic-1");
    }

    #[test]
    fn test_superseded_generation_is_stale() {
        let mut selection = Selection::new();
        let first = selection.select(cam());
        assert!(selection.is_current(TrackKind::Video, first));

        let second = selection.select(DeviceDescriptor::new(TrackKind::Video, "cam-2", "Cam 2"));
        assert!(!selection.is_current(TrackKind::Video, first));
        assert!(selection.is_current(TrackKind::Video, second));
    }

    #[test]
    fn test_generations_independent_per_kind() {
        let mut selection = Selection::new();
        let audio_gen = selection.select(mic());
        selection.select(cam());
        assert!(selection.is_current(TrackKind::Audio, audio_gen));
    }

    #[test]
    fn test_permission_warning_lifecycle() {
        let mut selection = Selection::new();
        assert!(!selection.permission_warning());

        selection.set_permission(PermissionStatus::Denied);
        assert!(selection.permission_warning());

        selection.dismiss_permission_warning();
        assert!(!selection.permission_warning());

        // A status change re-arms the warning.
        selection.set_permission(PermissionStatus::Granted);
        selection.set_permission(PermissionStatus::Denied);
        assert!(selection.permission_warning());
    }

    #[test]
    fn test_default_permission_is_pending() {
        assert_eq!(Selection::new().permission(), PermissionStatus::Pending);
    }
}
