//! Client for the downstream workflow engine.
//!
//! Each finished utterance is posted as multipart form data (the WAV file
//! plus caller metadata) to a webhook; the engine answers with a list of
//! reply items describing what to say or do next.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("workflow error: {0}")]
pub struct WorkflowError(pub String);

impl From<reqwest::Error> for WorkflowError {
    fn from(err: reqwest::Error) -> Self {
        WorkflowError(err.to_string())
    }
}

/// One reply item from the workflow engine.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowReply {
    pub answer: String,
    #[serde(rename = "dialNumber")]
    pub dial_number: Option<String>,
    #[serde(rename = "shouldEnd")]
    pub should_end: Option<bool>,
}

/// Everything the workflow needs to handle one utterance.
#[derive(Debug, Clone)]
pub struct WorkflowRequest {
    pub from_number: String,
    pub dial_number: Option<String>,
    /// Complete WAV file, header included.
    pub audio_wav: Vec<u8>,
}

#[async_trait]
pub trait WorkflowClient: Send + Sync {
    async fn trigger(&self, request: WorkflowRequest) -> Result<Vec<WorkflowReply>, WorkflowError>;
}

pub struct HttpWorkflowClient {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpWorkflowClient {
    pub fn new(base_url: String, path: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), path),
        }
    }
}

#[async_trait]
impl WorkflowClient for HttpWorkflowClient {
    async fn trigger(&self, request: WorkflowRequest) -> Result<Vec<WorkflowReply>, WorkflowError> {
        let file_name = format!(
            "utterance-{}.wav",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0)
        );

        let audio_part = reqwest::multipart::Part::bytes(request.audio_wav)
            .file_name(file_name)
            .mime_str("audio/wav")
            .map_err(|e| WorkflowError(format!("invalid mime type: {e}")))?;

        let mut form = reqwest::multipart::Form::new()
            .part("audio", audio_part)
            .text("fromNumber", request.from_number);
        if let Some(dial_number) = request.dial_number {
            form = form.text("dialNumber", dial_number);
        }

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        let replies: Vec<WorkflowReply> = response.json().await?;
        Ok(replies)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_deserializes_with_optional_fields() {
        let raw = r#"[{"answer":"Sure, transferring you now.","dialNumber":"+15559876543","shouldEnd":true}]"#;
        let replies: Vec<WorkflowReply> = serde_json::from_str(raw).unwrap();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].answer, "Sure, transferring you now.");
        assert_eq!(replies[0].dial_number.as_deref(), Some("+15559876543"));
        assert_eq!(replies[0].should_end, Some(true));
    }

    #[test]
    fn test_reply_tolerates_answer_only() {
        let raw = r#"[{"answer":"Our hours are nine to five."}]"#;
        let replies: Vec<WorkflowReply> = serde_json::from_str(raw).unwrap();
        assert!(replies[0].dial_number.is_none());
        assert!(replies[0].should_end.is_none());
    }

    #[test]
    fn test_endpoint_joins_base_and_path() {
        let client = HttpWorkflowClient::new("http://workflow:5678/".into(), "/webhook/voice");
        assert_eq!(client.endpoint, "http://workflow:5678/webhook/voice");
    }
}
