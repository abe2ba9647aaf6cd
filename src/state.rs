use crate::config::VisionConfig;

/// Shared application state passed to all handlers.
/// Vision credentials are read once at startup rather than re-read from the
/// environment on every request; the reqwest client is shared so connections
/// are pooled across invocations.
#[derive(Clone)]
pub struct AppState {
    pub vision: Option<VisionConfig>,
    pub http_client: reqwest::Client,
}
