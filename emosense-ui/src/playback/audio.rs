//! Rodio-backed playback sink
//!
//! Clips are fetched in full over HTTP before decoding; the segment files
//! the service produces are a few seconds long. The [`rodio::OutputStream`]
//! must be kept alive for the duration of playback: opening a new stream
//! per clip drops the previous one mid-flight and truncates or blanks the
//! audio, so a single lazily opened stream is shared across plays.

use crate::playback::{PlaybackError, PlaybackEvent, PlaybackSink, SinkHandle};
use futures::future::BoxFuture;
use futures::FutureExt;
use rodio::{OutputStream, OutputStreamBuilder, Sink};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Lazily opened output stream, shared across plays and clones
struct OutputCell {
    value: Mutex<Option<OutputStream>>,
}

impl OutputCell {
    fn new() -> Self {
        Self {
            value: Mutex::new(None),
        }
    }

    fn connect_sink(&self) -> Result<Sink, PlaybackError> {
        let mut guard = match self.value.lock() {
            Ok(g) => g,
            Err(poisoned) => {
                warn!("playback output stream lock was poisoned; recovering and continuing");
                poisoned.into_inner()
            }
        };

        if guard.is_none() {
            let stream = OutputStreamBuilder::open_default_stream().map_err(|e| {
                PlaybackError::AudioOutputUnavailable {
                    details: e.to_string(),
                }
            })?;
            *guard = Some(stream);
        }

        match guard.as_ref() {
            Some(stream) => {
                let mixer = stream.mixer();
                Ok(Sink::connect_new(&mixer))
            }
            None => Err(PlaybackError::AudioOutputUnavailable {
                details: "output stream cache invariant violated".to_owned(),
            }),
        }
    }
}

#[derive(Clone)]
pub struct RodioPlaybackSink {
    http: reqwest::Client,
    output: Arc<OutputCell>,
}

impl RodioPlaybackSink {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            output: Arc::new(OutputCell::new()),
        }
    }
}

impl PlaybackSink for RodioPlaybackSink {
    fn start(
        &self,
        url: String,
        events: mpsc::UnboundedSender<PlaybackEvent>,
    ) -> BoxFuture<'_, Result<SinkHandle, PlaybackError>> {
        async move {
            debug!(url = %url, "fetching audio clip");
            let response = self
                .http
                .get(&url)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| PlaybackError::Fetch(e.to_string()))?;
            let bytes = response
                .bytes()
                .await
                .map_err(|e| PlaybackError::Fetch(e.to_string()))?;

            let source = rodio::Decoder::new(Cursor::new(bytes.to_vec()))
                .map_err(|e| PlaybackError::Decode(e.to_string()))?;

            let sink = Arc::new(self.output.connect_sink()?);
            sink.append(source);
            debug!(url = %url, "playback started");

            // An explicit stop must not surface as a natural end, so the
            // watcher checks the flag after the sink drains.
            let cancelled = Arc::new(AtomicBool::new(false));

            let watcher = Arc::clone(&sink);
            let watcher_cancelled = Arc::clone(&cancelled);
            let watcher_url = url.clone();
            tokio::task::spawn_blocking(move || {
                watcher.sleep_until_end();
                if !watcher_cancelled.load(Ordering::Relaxed) {
                    let _ = events.send(PlaybackEvent::Ended { url: watcher_url });
                }
            });

            let stopper = Arc::clone(&sink);
            Ok(SinkHandle::new(url, move || {
                cancelled.store(true, Ordering::Relaxed);
                stopper.stop();
            }))
        }
        .boxed()
    }
}
