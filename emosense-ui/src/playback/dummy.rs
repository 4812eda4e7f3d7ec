//! Recording playback sink for tests: no audio device, no network

use crate::playback::{PlaybackError, PlaybackEvent, PlaybackSink, SinkHandle};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

#[derive(Clone, Default)]
pub struct RecordingPlaybackSink {
    started: Arc<Mutex<Vec<String>>>,
    stopped: Arc<Mutex<Vec<String>>>,
    fail_next: Arc<AtomicBool>,
}

impl RecordingPlaybackSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs handed to `start`, in order
    pub fn started(&self) -> Vec<String> {
        lock_tolerant(&self.started).clone()
    }

    /// URLs whose handle was stopped, in order
    pub fn stopped(&self) -> Vec<String> {
        lock_tolerant(&self.stopped).clone()
    }

    /// Make the next `start` call fail
    pub fn fail_next_start(&self) {
        self.fail_next.store(true, Ordering::Relaxed);
    }
}

fn lock_tolerant(m: &Mutex<Vec<String>>) -> std::sync::MutexGuard<'_, Vec<String>> {
    match m.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl PlaybackSink for RecordingPlaybackSink {
    fn start(
        &self,
        url: String,
        _events: mpsc::UnboundedSender<PlaybackEvent>,
    ) -> BoxFuture<'_, Result<SinkHandle, PlaybackError>> {
        async move {
            if self.fail_next.swap(false, Ordering::Relaxed) {
                return Err(PlaybackError::AudioOutputUnavailable {
                    details: "recording sink was told to fail".to_owned(),
                });
            }

            lock_tolerant(&self.started).push(url.clone());

            let stopped = Arc::clone(&self.stopped);
            let stopped_url = url.clone();
            Ok(SinkHandle::new(url, move || {
                lock_tolerant(&stopped).push(stopped_url.clone());
            }))
        }
        .boxed()
    }
}
