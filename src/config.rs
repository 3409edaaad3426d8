//! Configuration for recording sessions.

use std::time::Duration;

/// Configuration for session behavior.
///
/// Use [`SessionConfig::default()`] for the stock behavior, or customize as
/// needed.
///
/// # Example
///
/// ```
/// use stream_recorder::SessionConfig;
/// use std::time::Duration;
///
/// let config = SessionConfig {
///     flush_interval: Duration::from_millis(500),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Interval at which the platform recorder flushes buffered data.
    ///
    /// The elapsed counter increments once per flush, so it only matches
    /// wall time when the platform honors this cadence.
    /// Default: 1 second
    pub flush_interval: Duration,

    /// Extension appended to the derived download filename, dot included.
    ///
    /// Default: `.mp4`. Note the artifact's actual container is whatever the
    /// platform recorder emits; the extension is not validated against it.
    pub extension: String,

    /// Fixed padding subtracted twice from the container height when
    /// deriving preview geometry.
    /// Default: 20.0
    pub preview_padding: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            flush_interval: Duration::from_secs(1),
            extension: ".mp4".to_string(),
            preview_padding: 20.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.flush_interval, Duration::from_secs(1));
        assert_eq!(config.extension, ".mp4");
        assert_eq!(config.preview_padding, 20.0);
    }
}
