use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Caption Models
// ============================================================================

/// Raw request body for POST /api/caption. Either field may be present; the
/// caption handler validates this into a `CaptionSource` before any upstream
/// call is made.
#[derive(Debug, Deserialize)]
pub struct CaptionRequest {
    pub url: Option<String>,
    pub image: Option<String>,
}

/// Validated caption input. Each variant maps to one upstream call path:
/// `Url` is forwarded as a JSON body, `Image` as raw octet-stream bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptionSource {
    Url(String),
    Image(Bytes),
}

/// Response body for POST /api/caption.
///
/// `caption` is the vision service's JSON reply passed through unmodified —
/// the upstream schema is deliberately not enforced here. Only `confidence`
/// is interpreted, and it serializes as `null` when absent.
#[derive(Debug, Serialize)]
pub struct CaptionResponse {
    pub caption: Value,
    pub confidence: Option<f64>,
}
