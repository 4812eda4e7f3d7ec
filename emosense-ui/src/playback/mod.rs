//! Audio playback behind a trait
//!
//! At most one clip plays at a time; the controller enforces that by owning
//! a single [`SinkHandle`] and stopping it before starting another. Sinks
//! report natural completion and mid-play failure over an event channel so
//! the controller can clear the handle without polling.

mod audio;
mod dummy;

pub use audio::RodioPlaybackSink;
pub use dummy::RecordingPlaybackSink;

use futures::future::BoxFuture;
use tokio::sync::mpsc;

#[derive(thiserror::Error, Debug)]
pub enum PlaybackError {
    #[error("audio output unavailable: {details}")]
    AudioOutputUnavailable { details: String },

    #[error("audio fetch failed: {0}")]
    Fetch(String),

    #[error("audio decode failed: {0}")]
    Decode(String),
}

/// Lifecycle notification from an active playback, keyed by the URL it plays.
///
/// An explicitly stopped playback emits nothing; only natural end and
/// failure are reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    Ended { url: String },
    Failed { url: String, details: String },
}

/// Handle to one active playback.
///
/// Identified by the resolved absolute URL it plays. Stopping is idempotent.
pub struct SinkHandle {
    url: String,
    stop: Box<dyn Fn() + Send + Sync>,
}

impl SinkHandle {
    pub fn new(url: String, stop: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            url,
            stop: Box::new(stop),
        }
    }

    /// The resolved absolute URL this handle is playing
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Stop the audio. No event is emitted for an explicit stop.
    pub fn stop(&self) {
        (self.stop)();
    }
}

impl std::fmt::Debug for SinkHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkHandle").field("url", &self.url).finish()
    }
}

pub trait PlaybackSink: Send + Sync {
    /// Start playing the audio at `url`.
    ///
    /// On success the returned handle is the only way to stop the clip;
    /// completion or failure after a successful start arrives on `events`.
    fn start(
        &self,
        url: String,
        events: mpsc::UnboundedSender<PlaybackEvent>,
    ) -> BoxFuture<'_, Result<SinkHandle, PlaybackError>>;
}
