//! Wire types for the emotion-classification service
//!
//! The service returns one JSON document per uploaded WAV file: overall
//! positive/negative split, a per-label percentage map, and one prediction
//! per analyzed segment. Relative file paths inside the document are served
//! by the same host and must be resolved against its base address before
//! playback.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Labels rendered with the positive accent; everything else is negative
pub const POSITIVE_EMOTIONS: [&str; 2] = ["Thân Thiện", "Vui Vẻ"];

/// Classification result for one uploaded file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmotionResult {
    /// Name of the uploaded file as the service recorded it
    pub original_file: String,

    /// Duration of the uploaded file in seconds
    pub original_duration: f64,

    /// Relative path under which the service re-serves the uploaded file
    pub original_file_path: String,

    /// Overall positive/negative split
    pub overview_percentage: OverviewPercentage,

    /// Emotion label to percentage. BTreeMap keeps rendering order stable.
    pub emotion_percentages: BTreeMap<String, f64>,

    /// Per-segment predictions, in segment order
    pub predictions_details: Vec<SegmentPrediction>,
}

/// Overall positive/negative percentages (informally summing to 100)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OverviewPercentage {
    pub positive_percentage: f64,
    pub negative_percentage: f64,
}

/// One scored sub-clip of the uploaded audio
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SegmentPrediction {
    /// Segment file name
    pub file: String,

    /// Relative path under which the service serves the segment audio
    pub file_path: String,

    /// Segment duration in seconds
    pub duration: f64,

    /// Predicted emotion label
    pub emotion: String,

    /// Prediction confidence as a percentage
    pub probability: f64,
}

/// Error body the service may return alongside a non-2xx status
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceErrorBody {
    pub detail: Option<String>,
}

/// Whether a label belongs to the fixed positive set
pub fn is_positive_emotion(label: &str) -> bool {
    POSITIVE_EMOTIONS.contains(&label)
}

/// Resolve a relative audio path from a result against the service base URL.
///
/// Returns `None` for an empty path. `base_url` is expected without a
/// trailing slash (see `config::resolve_service_url`).
pub fn resolve_audio_url(base_url: &str, file_path: &str) -> Option<String> {
    if file_path.is_empty() {
        return None;
    }
    if file_path.starts_with('/') {
        Some(format!("{}{}", base_url, file_path))
    } else {
        Some(format!("{}/{}", base_url, file_path))
    }
}
