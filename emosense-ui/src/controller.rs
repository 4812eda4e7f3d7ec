//! Upload and playback state machine
//!
//! Five fields drive everything the renderer shows: the selected file, the
//! in-flight flag, the last result, the visible error message, and the
//! single active playback handle. Every operation runs to completion on the
//! caller's task; the only suspension point is the network round-trip
//! inside `submit`.

use crate::client::{ClassifyError, EmotionClient};
use crate::playback::{PlaybackEvent, PlaybackSink, SinkHandle};
use emosense_common::api::{resolve_audio_url, EmotionResult};
use std::path::Path;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// The only declared media type the controller accepts
pub const WAV_MEDIA_TYPE: &str = "audio/wav";

const INVALID_FILE_MESSAGE: &str = "Please select a valid WAV file";
const PLAYBACK_FAILED_MESSAGE: &str = "Failed to play audio file";

/// A candidate file as the user handed it over: name, declared media type,
/// and the raw bytes
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// Declared media type for a path, by extension.
///
/// Stands in for the browser-reported type of the original file input.
pub fn media_type_for_path(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("wav") => WAV_MEDIA_TYPE,
        _ => "application/octet-stream",
    }
}

pub struct Controller {
    client: EmotionClient,
    sink: Box<dyn PlaybackSink>,
    events_tx: mpsc::UnboundedSender<PlaybackEvent>,

    selected: Option<CandidateFile>,
    loading: bool,
    result: Option<EmotionResult>,
    error: Option<String>,
    playing: Option<SinkHandle>,
}

impl Controller {
    /// Create a controller and the receiving end of its playback events.
    ///
    /// The caller's event loop feeds received events back through
    /// [`Controller::handle_playback_event`].
    pub fn new(
        client: EmotionClient,
        sink: Box<dyn PlaybackSink>,
    ) -> (Self, mpsc::UnboundedReceiver<PlaybackEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        (
            Self {
                client,
                sink,
                events_tx,
                selected: None,
                loading: false,
                result: None,
                error: None,
                playing: None,
            },
            events_rx,
        )
    }

    pub fn selected(&self) -> Option<&CandidateFile> {
        self.selected.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn result(&self) -> Option<&EmotionResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// URL of the currently playing clip, if any
    pub fn playing_url(&self) -> Option<&str> {
        self.playing.as_ref().map(|h| h.url())
    }

    /// Base URL of the inference service (also hosts the result audio)
    pub fn service_url(&self) -> &str {
        self.client.base_url()
    }

    /// Whether a submit would currently be accepted
    pub fn can_submit(&self) -> bool {
        self.selected.is_some() && !self.loading
    }

    /// Take a candidate file from the user.
    ///
    /// Only `audio/wav` is accepted; anything else clears the selection and
    /// shows the validation message. Either way the previous result is
    /// dropped and active playback stops.
    pub fn select_file(&mut self, candidate: CandidateFile) {
        self.stop_playback();

        if candidate.media_type == WAV_MEDIA_TYPE {
            info!(file = %candidate.name, "file selected");
            self.selected = Some(candidate);
            self.error = None;
            self.result = None;
        } else {
            warn!(
                file = %candidate.name,
                media_type = %candidate.media_type,
                "rejecting non-WAV file"
            );
            self.error = Some(INVALID_FILE_MESSAGE.to_string());
            self.selected = None;
            self.result = None;
        }
    }

    /// Upload the selected file and store the classification outcome.
    ///
    /// A no-op unless a file is selected and nothing is in flight; the
    /// loading flag is the admission control for concurrent submissions.
    pub async fn submit(&mut self) {
        if !self.can_submit() {
            return;
        }
        let (name, bytes) = match &self.selected {
            Some(file) => (file.name.clone(), file.bytes.clone()),
            None => return,
        };

        self.stop_playback();
        self.loading = true;
        self.error = None;
        self.result = None;

        info!(file = %name, "submitting file for analysis");
        match self.client.classify(&name, bytes).await {
            Ok(result) => {
                self.result = Some(result);
            }
            Err(err) => {
                warn!(error = %err, "classification request failed");
                self.error = Some(err.user_message());
            }
        }
        self.loading = false;
    }

    /// Toggle playback of a result audio path.
    ///
    /// Single mutation entry point for the playback handle: any active clip
    /// is stopped first. Requesting the clip that is already playing is a
    /// pause; requesting a different one switches to it.
    pub async fn toggle_playback(&mut self, file_path: &str) {
        let Some(url) = resolve_audio_url(self.client.base_url(), file_path) else {
            return;
        };

        if let Some(active) = self.playing.take() {
            active.stop();
            if active.url() == url {
                return;
            }
        }

        match self.sink.start(url.clone(), self.events_tx.clone()).await {
            Ok(handle) => {
                self.playing = Some(handle);
            }
            Err(err) => {
                warn!(url = %url, error = %err, "failed to start playback");
                self.error = Some(PLAYBACK_FAILED_MESSAGE.to_string());
            }
        }
    }

    /// Apply a playback lifecycle event from the sink.
    ///
    /// Events are keyed by URL; one from a clip that is no longer the
    /// active handle only carries its error message, never clears the
    /// current handle.
    pub fn handle_playback_event(&mut self, event: PlaybackEvent) {
        match event {
            PlaybackEvent::Ended { url } => {
                if self.playing.as_ref().is_some_and(|h| h.url() == url) {
                    self.playing = None;
                }
            }
            PlaybackEvent::Failed { url, details } => {
                warn!(url = %url, details = %details, "playback failed");
                if self.playing.as_ref().is_some_and(|h| h.url() == url) {
                    self.playing = None;
                }
                self.error = Some(PLAYBACK_FAILED_MESSAGE.to_string());
            }
        }
    }

    fn stop_playback(&mut self) {
        if let Some(active) = self.playing.take() {
            active.stop();
        }
    }
}
