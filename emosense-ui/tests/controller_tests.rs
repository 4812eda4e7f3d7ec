//! Integration tests for the upload/playback state machine
//!
//! Tests cover:
//! - WAV-only file validation
//! - One network request per submit, admission control while loading
//! - Service error detail vs. status-derived fallback message
//! - Transport failures naming the configured service address
//! - Playback toggle/switch semantics and event handling

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use emosense_ui::client::EmotionClient;
use emosense_ui::controller::{CandidateFile, Controller};
use emosense_ui::playback::{PlaybackEvent, RecordingPlaybackSink};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

fn sample_result_json() -> Value {
    json!({
        "original_file": "call.wav",
        "original_duration": 12.5,
        "original_file_path": "/files/call.wav",
        "overview_percentage": {
            "positive_percentage": 42.5,
            "negative_percentage": 57.5
        },
        "emotion_percentages": {
            "Vui Vẻ": 42.5,
            "Giận": 57.5
        },
        "predictions_details": [
            {
                "file": "call_0.wav",
                "file_path": "/files/call_0.wav",
                "duration": 4.2,
                "emotion": "Giận",
                "probability": 88.1
            }
        ]
    })
}

#[derive(Clone)]
struct StubState {
    hits: Arc<AtomicUsize>,
    status: StatusCode,
    body: Value,
}

async fn predict(State(stub): State<StubState>) -> impl IntoResponse {
    stub.hits.fetch_add(1, Ordering::SeqCst);
    (stub.status, Json(stub.body.clone()))
}

/// Spawn a stub inference service answering `POST /predict-emotion/` with a
/// fixed status and body; returns its address and a request counter.
async fn spawn_service(status: StatusCode, body: Value) -> (SocketAddr, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/predict-emotion/", post(predict))
        .with_state(StubState {
            hits: Arc::clone(&hits),
            status,
            body,
        });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, hits)
}

fn setup_controller(
    base_url: &str,
) -> (
    Controller,
    RecordingPlaybackSink,
    UnboundedReceiver<PlaybackEvent>,
) {
    let sink = RecordingPlaybackSink::new();
    let client = EmotionClient::new(base_url.to_string()).unwrap();
    let (controller, events) = Controller::new(client, Box::new(sink.clone()));
    (controller, sink, events)
}

fn wav_candidate() -> CandidateFile {
    CandidateFile {
        name: "call.wav".to_string(),
        media_type: "audio/wav".to_string(),
        bytes: b"RIFF....WAVE".to_vec(),
    }
}

// =============================================================================
// File validation
// =============================================================================

#[tokio::test]
async fn non_wav_file_is_rejected_with_fixed_message() {
    let (mut controller, _sink, _events) = setup_controller("http://127.0.0.1:1");

    controller.select_file(CandidateFile {
        name: "song.mp3".to_string(),
        media_type: "audio/mpeg".to_string(),
        bytes: vec![0u8; 4],
    });

    assert_eq!(controller.error(), Some("Please select a valid WAV file"));
    assert!(controller.selected().is_none());
    assert!(controller.result().is_none());
    assert!(!controller.can_submit());
}

#[tokio::test]
async fn submit_without_file_makes_no_request() {
    let (addr, hits) = spawn_service(StatusCode::OK, sample_result_json()).await;
    let (mut controller, _sink, _events) = setup_controller(&format!("http://{}", addr));

    controller.submit().await;

    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert!(controller.result().is_none());
}

#[tokio::test]
async fn selecting_a_wav_clears_previous_error_and_result() {
    let (addr, _hits) = spawn_service(StatusCode::OK, sample_result_json()).await;
    let (mut controller, _sink, _events) = setup_controller(&format!("http://{}", addr));

    controller.select_file(wav_candidate());
    controller.submit().await;
    assert!(controller.result().is_some());

    controller.select_file(wav_candidate());
    assert!(controller.result().is_none());
    assert!(controller.error().is_none());
    assert!(controller.can_submit());
}

// =============================================================================
// Submission lifecycle
// =============================================================================

#[tokio::test]
async fn successful_submit_stores_result_and_clears_loading() {
    let (addr, hits) = spawn_service(StatusCode::OK, sample_result_json()).await;
    let (mut controller, _sink, _events) = setup_controller(&format!("http://{}", addr));

    controller.select_file(wav_candidate());
    assert!(!controller.is_loading());

    controller.submit().await;

    assert!(!controller.is_loading());
    assert!(controller.error().is_none());
    let result = controller.result().expect("result stored");
    assert_eq!(result.original_file, "call.wav");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn each_submit_makes_exactly_one_request() {
    let (addr, hits) = spawn_service(StatusCode::OK, sample_result_json()).await;
    let (mut controller, _sink, _events) = setup_controller(&format!("http://{}", addr));

    controller.select_file(wav_candidate());
    controller.submit().await;
    controller.submit().await;

    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn service_detail_message_is_shown_verbatim() {
    let (addr, _hits) = spawn_service(
        StatusCode::PAYLOAD_TOO_LARGE,
        json!({"detail": "file too large"}),
    )
    .await;
    let (mut controller, _sink, _events) = setup_controller(&format!("http://{}", addr));

    controller.select_file(wav_candidate());
    controller.submit().await;

    assert_eq!(controller.error(), Some("file too large"));
    assert!(controller.result().is_none());
    assert!(!controller.is_loading());
}

#[tokio::test]
async fn service_error_without_detail_falls_back_to_status_text() {
    let (addr, _hits) = spawn_service(StatusCode::INTERNAL_SERVER_ERROR, json!({})).await;
    let (mut controller, _sink, _events) = setup_controller(&format!("http://{}", addr));

    controller.select_file(wav_candidate());
    controller.submit().await;

    assert_eq!(
        controller.error(),
        Some("Server error: 500 Internal Server Error")
    );
}

#[tokio::test]
async fn transport_failure_names_the_service_address() {
    // Bind then drop to get an address nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = listener.local_addr().unwrap();
    drop(listener);

    let base = format!("http://{}", dead_addr);
    let (mut controller, _sink, _events) = setup_controller(&base);

    controller.select_file(wav_candidate());
    controller.submit().await;

    let message = controller.error().expect("error set");
    assert!(message.starts_with("Unable to connect"));
    assert!(message.contains(&base));
    assert!(!controller.is_loading());
}

// =============================================================================
// Playback state machine
// =============================================================================

#[tokio::test]
async fn toggle_twice_returns_to_not_playing() {
    let (mut controller, sink, _events) = setup_controller("http://127.0.0.1:8386");

    controller.toggle_playback("/files/a.wav").await;
    assert_eq!(
        controller.playing_url(),
        Some("http://127.0.0.1:8386/files/a.wav")
    );

    controller.toggle_playback("/files/a.wav").await;
    assert!(controller.playing_url().is_none());

    assert_eq!(sink.started(), vec!["http://127.0.0.1:8386/files/a.wav"]);
    assert_eq!(sink.stopped(), vec!["http://127.0.0.1:8386/files/a.wav"]);
}

#[tokio::test]
async fn switching_targets_leaves_exactly_one_active_handle() {
    let (mut controller, sink, _events) = setup_controller("http://127.0.0.1:8386");

    controller.toggle_playback("/files/a.wav").await;
    controller.toggle_playback("/files/b.wav").await;

    assert_eq!(
        controller.playing_url(),
        Some("http://127.0.0.1:8386/files/b.wav")
    );
    assert_eq!(
        sink.started(),
        vec![
            "http://127.0.0.1:8386/files/a.wav",
            "http://127.0.0.1:8386/files/b.wav"
        ]
    );
    assert_eq!(sink.stopped(), vec!["http://127.0.0.1:8386/files/a.wav"]);
}

#[tokio::test]
async fn selecting_a_file_stops_active_playback() {
    let (mut controller, sink, _events) = setup_controller("http://127.0.0.1:8386");

    controller.toggle_playback("/files/a.wav").await;
    controller.select_file(wav_candidate());

    assert!(controller.playing_url().is_none());
    assert_eq!(sink.stopped(), vec!["http://127.0.0.1:8386/files/a.wav"]);
}

#[tokio::test]
async fn submitting_stops_active_playback() {
    let (addr, _hits) = spawn_service(StatusCode::OK, sample_result_json()).await;
    let base = format!("http://{}", addr);
    let (mut controller, sink, _events) = setup_controller(&base);

    controller.select_file(wav_candidate());
    controller.toggle_playback("/files/a.wav").await;
    controller.submit().await;

    assert!(controller.playing_url().is_none());
    assert_eq!(sink.stopped(), vec![format!("{}/files/a.wav", base)]);
}

#[tokio::test]
async fn natural_end_clears_the_matching_handle() {
    let (mut controller, _sink, _events) = setup_controller("http://127.0.0.1:8386");

    controller.toggle_playback("/files/a.wav").await;
    controller.handle_playback_event(PlaybackEvent::Ended {
        url: "http://127.0.0.1:8386/files/a.wav".to_string(),
    });

    assert!(controller.playing_url().is_none());
}

#[tokio::test]
async fn stale_end_event_does_not_clear_the_new_handle() {
    let (mut controller, _sink, _events) = setup_controller("http://127.0.0.1:8386");

    controller.toggle_playback("/files/a.wav").await;
    controller.toggle_playback("/files/b.wav").await;
    controller.handle_playback_event(PlaybackEvent::Ended {
        url: "http://127.0.0.1:8386/files/a.wav".to_string(),
    });

    assert_eq!(
        controller.playing_url(),
        Some("http://127.0.0.1:8386/files/b.wav")
    );
}

#[tokio::test]
async fn playback_failure_clears_handle_and_sets_message() {
    let (mut controller, _sink, _events) = setup_controller("http://127.0.0.1:8386");

    controller.toggle_playback("/files/a.wav").await;
    controller.handle_playback_event(PlaybackEvent::Failed {
        url: "http://127.0.0.1:8386/files/a.wav".to_string(),
        details: "decode error".to_string(),
    });

    assert!(controller.playing_url().is_none());
    assert_eq!(controller.error(), Some("Failed to play audio file"));
}

#[tokio::test]
async fn failed_start_sets_message_without_a_handle() {
    let (mut controller, sink, _events) = setup_controller("http://127.0.0.1:8386");

    sink.fail_next_start();
    controller.toggle_playback("/files/a.wav").await;

    assert!(controller.playing_url().is_none());
    assert_eq!(controller.error(), Some("Failed to play audio file"));
    assert!(sink.started().is_empty());
}
