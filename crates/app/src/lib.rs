pub mod config;
pub mod dispatch;
pub mod stream;
pub mod twilio;
pub mod workflow;

use std::sync::Arc;

use hotline_vad::EngineConfig;

use crate::workflow::WorkflowClient;

/// Shared process state handed to every websocket connection. Everything
/// stream-specific (engine, pool, session) is constructed per connection
/// in `stream::StreamContext`.
pub struct AppState {
    pub engine_config: EngineConfig,
    pub workflow: Arc<dyn WorkflowClient>,
    /// Optional pre-encoded greeting payload played on stream start.
    pub greeting_payload: Option<String>,
}
