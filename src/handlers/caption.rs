use axum::{extract::State, Json};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

use crate::{
    config::VisionConfig,
    error::{AppError, AppResult},
    models::{CaptionRequest, CaptionResponse, CaptionSource},
    state::AppState,
};

pub const API_VERSION: &str = "2023-02-01-preview";

/// Maximum accepted decoded image size in bytes (5 MiB). Checked against the
/// base64-length estimate, not the exact decoded length, so the rejection
/// boundary sits at the estimate.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

static HTTP_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://").expect("valid URL regex"));

// ── Public helpers ─────────────────────────────────────────────────────────

/// Returns `true` if `url` starts like an absolute http(s) URL.
pub fn is_http_url(url: &str) -> bool {
    HTTP_URL_RE.is_match(url)
}

/// Estimated decoded size of a base64 payload: `ceil(len * 3 / 4)`.
/// Padding characters are not subtracted, so the estimate can overshoot the
/// exact byte count by up to two bytes.
pub fn estimated_decoded_len(base64_len: usize) -> usize {
    (base64_len * 3).div_ceil(4)
}

/// Validate the raw request body into a caption source. The `url` field is
/// checked first and wins when both fields are present.
pub fn validate_request(req: CaptionRequest) -> AppResult<CaptionSource> {
    if let Some(url) = req.url {
        let url = url.trim().to_string();
        if !is_http_url(&url) {
            return Err(AppError::Validation("Invalid URL.".into()));
        }
        return Ok(CaptionSource::Url(url));
    }

    if let Some(image) = req.image {
        if estimated_decoded_len(image.len()) > MAX_IMAGE_BYTES {
            return Err(AppError::PayloadTooLarge(
                "Image too large (max 5MB).".into(),
            ));
        }
        let bytes = BASE64
            .decode(image.as_bytes())
            .map_err(|_| AppError::Validation("Invalid base64 image data.".into()))?;
        return Ok(CaptionSource::Image(Bytes::from(bytes)));
    }

    Err(AppError::Validation("Missing image or url in request.".into()))
}

/// Pull a confidence score out of the vision response, checking the newer
/// `captionResult.confidence` location first and falling back to the legacy
/// `description.captions[0].confidence`. A score of zero counts as absent at
/// either location, as does anything non-numeric.
pub fn extract_confidence(data: &Value) -> Option<f64> {
    if data.is_null() {
        return None;
    }
    if let Some(c) = data["captionResult"]["confidence"].as_f64() {
        if c != 0.0 {
            return Some(c);
        }
    }
    if let Some(c) = data["description"]["captions"][0]["confidence"].as_f64() {
        if c != 0.0 {
            return Some(c);
        }
    }
    None
}

// ── Upstream call ──────────────────────────────────────────────────────────

/// Send one analyze request to the vision service and return its reply as an
/// untyped JSON value. A non-success status fails with the status code and
/// body text; an unparseable success body degrades to an empty object.
async fn analyze(
    client: &reqwest::Client,
    vision: &VisionConfig,
    source: CaptionSource,
) -> AppResult<Value> {
    let base = vision
        .endpoint
        .strip_suffix('/')
        .unwrap_or(&vision.endpoint);
    let route = format!(
        "{base}/computervision/imageanalysis:analyze?api-version={API_VERSION}&features=caption"
    );

    let request = client
        .post(&route)
        .header("Ocp-Apim-Subscription-Key", &vision.key);
    let request = match source {
        CaptionSource::Url(url) => request.json(&json!({ "url": url })),
        CaptionSource::Image(bytes) => request
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes),
    };

    let resp = request.send().await?;

    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        return Err(AppError::Upstream(format!(
            "Azure Vision error: {} {}",
            status.as_u16(),
            text
        )));
    }

    let parsed = match resp.bytes().await {
        Ok(body) => serde_json::from_slice(&body).unwrap_or_else(|_| json!({})),
        Err(_) => json!({}),
    };
    Ok(parsed)
}

// ── Handler ────────────────────────────────────────────────────────────────

/// POST /api/caption
///
/// Accepts `{ "url": "<absolute http(s) URL>" }` or `{ "image": "<base64>" }`
/// and relays it to the vision service. The reply's JSON is returned
/// unmodified as `caption`, alongside the extracted `confidence`.
pub async fn generate_caption(
    State(state): State<AppState>,
    Json(body): Json<CaptionRequest>,
) -> AppResult<Json<CaptionResponse>> {
    let vision = state.vision.as_ref().ok_or(AppError::Misconfigured)?;

    let source = validate_request(body)?;
    let caption = analyze(&state.http_client, vision, source).await?;
    let confidence = extract_confidence(&caption);

    Ok(Json(CaptionResponse {
        caption,
        confidence,
    }))
}

// ── Unit tests ─────────────────────────────────────────────────────────────
