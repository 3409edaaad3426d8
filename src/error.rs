//! Error types for stream-recorder.
//!
//! Errors are split into two categories:
//! - **Blocking errors** ([`StreamRecorderError`]): an acquisition or session
//!   transition could not be performed
//! - **Runtime notifications**: session progress surfaced via
//!   [`ControllerEvent`](crate::ControllerEvent)
//!
//! Acquisition and start-precondition failures are caught at the controller
//! boundary and never leave the session in a partially-recording state.

/// Errors returned from device acquisition and session control.
///
/// Acquisition failures (`DeviceNotFound`, `DeviceUnavailable`,
/// `PermissionDenied`) are recoverable - the user retries device selection.
/// [`NoVideoSelected`](StreamRecorderError::NoVideoSelected) blocks `start()`
/// only. [`RecorderUnsupported`](StreamRecorderError::RecorderUnsupported) is
/// fatal to the current session; the controller resets itself to idle.
#[derive(Debug, thiserror::Error)]
pub enum StreamRecorderError {
    /// The requested device was not found during enumeration or open.
    #[error("device not found: {name}")]
    DeviceNotFound {
        /// Name of the device that wasn't found.
        name: String,
    },

    /// The requested device exists but could not be opened.
    ///
    /// Typical causes: device already in use by another application, revoked
    /// permission, or the device was disconnected after enumeration.
    #[error("device unavailable: {name} - {reason}")]
    DeviceUnavailable {
        /// Name of the unavailable device.
        name: String,
        /// Reason the device is unavailable.
        reason: String,
    },

    /// `start()` was called without a video device selected.
    ///
    /// Recording requires a video track; the controller stays idle.
    #[error("no video input selected - select a video device before recording")]
    NoVideoSelected,

    /// The platform recorder cannot produce the requested media.
    #[error("recorder unsupported: {reason}")]
    RecorderUnsupported {
        /// Why the recorder could not be bound or started.
        reason: String,
    },

    /// Permission to capture was denied at the OS level.
    #[error("permission denied for media capture (check OS settings)")]
    PermissionDenied,

    /// No capture port was configured before building the controller.
    #[error("no capture port configured - provide one with capture_port()")]
    NoCapturePort,

    /// No recorder port was configured before building the controller.
    #[error("no recorder port configured - provide one with recorder_port()")]
    NoRecorderPort,

    /// An error from an underlying platform library.
    #[error("capture backend error: {0}")]
    BackendError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_unavailable_display() {
        let err = StreamRecorderError::DeviceUnavailable {
            name: "USB Camera".to_string(),
            reason: "already in use".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "device unavailable: USB Camera - already in use"
        );
    }

    #[test]
    fn test_device_not_found_display() {
        let err = StreamRecorderError::DeviceNotFound {
            name: "Built-in Mic".to_string(),
        };
        assert_eq!(err.to_string(), "device not found: Built-in Mic");
    }

    #[test]
    fn test_no_video_selected_display() {
        let err = StreamRecorderError::NoVideoSelected;
        assert!(err.to_string().contains("no video input selected"));
    }

    #[test]
    fn test_recorder_unsupported_display() {
        let err = StreamRecorderError::RecorderUnsupported {
            reason: "requested container not available".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "recorder unsupported: requested container not available"
        );
    }
}
