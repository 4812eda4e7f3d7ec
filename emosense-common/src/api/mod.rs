//! Inference service API surface shared by the gateway and the client

pub mod types;

pub use types::{
    is_positive_emotion, resolve_audio_url, EmotionResult, OverviewPercentage, SegmentPrediction,
    ServiceErrorBody,
};

/// Path of the classification endpoint on the inference service
pub const PREDICT_PATH: &str = "/predict-emotion/";
