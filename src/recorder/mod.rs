//! Platform recorder seam.
//!
//! The recorder primitive is callback-driven on real platforms; here its
//! events arrive as typed messages on a tokio mpsc channel so all state
//! transitions stay on the controller's task (no shared mutable state is
//! touched from another execution context).

mod mock;

pub use mock::{MockRecorderControl, MockRecorderPort};

use std::time::Duration;

use tokio::sync::mpsc;

use crate::stream::CompositeStream;
use crate::StreamRecorderError;

/// Events emitted by a bound recorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    /// One flush worth of encoded media data.
    Chunk(Vec<u8>),
    /// The recorder finalized; all pending chunks were delivered before this.
    Finalized,
}

/// Platform recorder primitive: binds to a composite stream and produces a
/// controllable [`RecorderHandle`].
pub trait RecorderPort: Send {
    /// Binds a recorder to `stream`.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderUnsupported`](StreamRecorderError::RecorderUnsupported)
    /// when the platform cannot produce the requested media for this stream.
    fn bind(
        &mut self,
        stream: &CompositeStream,
    ) -> Result<Box<dyn RecorderHandle>, StreamRecorderError>;
}

/// A bound recorder.
///
/// Once started it emits [`RecorderEvent::Chunk`] on every flush and exactly
/// one [`RecorderEvent::Finalized`] after [`request_stop()`] - delivered
/// after all pending chunks. There is no cancellation beyond stop; a hung
/// platform callback stalls the affected transition.
///
/// [`request_stop()`]: RecorderHandle::request_stop
pub trait RecorderHandle: Send {
    /// Starts capture with periodic flushes every `flush_interval`.
    ///
    /// Events are delivered on `events`.
    fn start(
        &mut self,
        flush_interval: Duration,
        events: mpsc::Sender<RecorderEvent>,
    ) -> Result<(), StreamRecorderError>;

    /// Requests finalization. The recorder flushes pending data, then emits
    /// [`RecorderEvent::Finalized`].
    fn request_stop(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_event_equality() {
        assert_eq!(
            RecorderEvent::Chunk(vec![1, 2, 3]),
            RecorderEvent::Chunk(vec![1, 2, 3])
        );
        assert_ne!(RecorderEvent::Chunk(vec![]), RecorderEvent::Finalized);
    }
}
