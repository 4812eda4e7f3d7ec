//! HTTP client for the emotion-classification service
//!
//! One multipart POST per submit cycle; no retry, no custom timeout
//! (transport defaults apply). Service failures and transport failures are
//! distinct variants so the controller can phrase them differently.

use emosense_common::api::{EmotionResult, ServiceErrorBody, PREDICT_PATH};
use thiserror::Error;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("emosense/", env!("CARGO_PKG_VERSION"));

/// Multipart field name the service expects the WAV under
const UPLOAD_FIELD: &str = "file";

/// Classification request errors
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The request could not be constructed
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The service answered with a failure status
    #[error("{detail}")]
    Service { detail: String },

    /// The service could not be reached at all
    #[error("service unreachable at {target}: {details}")]
    Transport { target: String, details: String },

    /// A success status whose body did not parse as a result
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ClassifyError {
    /// The single visible message the controller surfaces for this error
    pub fn user_message(&self) -> String {
        match self {
            ClassifyError::Service { detail } => detail.clone(),
            ClassifyError::Transport { target, .. } => format!(
                "Unable to connect to the analysis service. \
                 Please check if the service is running at {}",
                target
            ),
            other => other.to_string(),
        }
    }
}

/// Client for `POST /predict-emotion/`
#[derive(Clone)]
pub struct EmotionClient {
    http: reqwest::Client,
    base_url: String,
}

impl EmotionClient {
    pub fn new(base_url: String) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL of the service; also the base for resolving result audio paths
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload one WAV file and return the parsed classification result
    pub async fn classify(
        &self,
        file_name: &str,
        wav_bytes: Vec<u8>,
    ) -> Result<EmotionResult, ClassifyError> {
        let part = reqwest::multipart::Part::bytes(wav_bytes)
            .file_name(file_name.to_string())
            .mime_str("audio/wav")
            .map_err(|e| ClassifyError::InvalidRequest(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part(UPLOAD_FIELD, part);

        let url = format!("{}{}", self.base_url, PREDICT_PATH);
        debug!(url = %url, file = %file_name, "uploading file for classification");

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClassifyError::Transport {
                target: self.base_url.clone(),
                details: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            // Prefer the service's own detail message when it sent one.
            let detail = response
                .json::<ServiceErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail)
                .unwrap_or_else(|| {
                    format!(
                        "Server error: {} {}",
                        status.as_u16(),
                        status.canonical_reason().unwrap_or("Unknown Error")
                    )
                });
            return Err(ClassifyError::Service { detail });
        }

        let result = response
            .json::<EmotionResult>()
            .await
            .map_err(|e| ClassifyError::InvalidResponse(e.to_string()))?;

        info!(
            file = %result.original_file,
            segments = result.predictions_details.len(),
            "classification complete"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_message_is_the_detail_verbatim() {
        let err = ClassifyError::Service {
            detail: "file too large".to_string(),
        };
        assert_eq!(err.user_message(), "file too large");
    }

    #[test]
    fn transport_error_message_names_the_service_address() {
        let err = ClassifyError::Transport {
            target: "http://127.0.0.1:8386".to_string(),
            details: "connection refused".to_string(),
        };
        let message = err.user_message();
        assert!(message.contains("http://127.0.0.1:8386"));
        assert!(message.starts_with("Unable to connect"));
    }

    #[test]
    fn client_normalizes_trailing_slash() {
        let client = EmotionClient::new("http://127.0.0.1:8386/".to_string()).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8386");
    }
}
