use hotline_foundation::StreamError;

/// Process configuration, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Base URL of the workflow engine, e.g. `http://workflow:5678`.
    pub workflow_base_url: String,
    /// Webhook path appended to the base URL.
    pub workflow_path: String,
    /// Optional pre-encoded audio payload played when a stream starts.
    pub greeting_payload: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, StreamError> {
        let host = std::env::var("HOTLINE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = match std::env::var("HOTLINE_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| StreamError::Config(format!("invalid HOTLINE_PORT: {raw}")))?,
            Err(_) => 8080,
        };

        let workflow_base_url = std::env::var("WORKFLOW_BASE_URL")
            .map_err(|_| StreamError::Config("WORKFLOW_BASE_URL must be set".into()))?;

        let workflow_path =
            std::env::var("WORKFLOW_PATH").unwrap_or_else(|_| "/webhook/voice".to_string());

        let greeting_payload = std::env::var("HOTLINE_GREETING_PAYLOAD").ok();

        Ok(Self {
            host,
            port,
            workflow_base_url,
            workflow_path,
            greeting_payload,
        })
    }
}
