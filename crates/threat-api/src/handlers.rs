//! Request handlers for the threat analysis HTTP surface.
//!
//! Multipart extraction follows the same "drain every field into local
//! variables, then validate" shape as `security_api/crates/api/src/llm_handler.rs`'s
//! `analyze_logs_with_llm`, generalized from a single log file upload to
//! the several optional content fields an analysis request can carry.

use std::sync::Arc;

use axum::extract::{Extension, Multipart};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde_json::json;

use threat_common::{AnalysisOptions, ContentData, ContentType, ThreatError, VideoInput};

use crate::AppState;

/// Wraps a `ThreatError` so it can be returned directly from a handler and
/// rendered as `{"error": {"code": ..., "message": ...}}` with a matching
/// HTTP status.
pub struct ApiError(pub ThreatError);

impl From<ThreatError> for ApiError {
    fn from(err: ThreatError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            ThreatError::InvalidInput(_) | ThreatError::UnsupportedMedia(_) => StatusCode::BAD_REQUEST,
            ThreatError::NotFound(_) => StatusCode::NOT_FOUND,
            ThreatError::DuplicatePattern(_) => StatusCode::CONFLICT,
            ThreatError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            ThreatError::Cancelled => StatusCode::REQUEST_TIMEOUT,
            ThreatError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({
            "error": {
                "code": self.0.code(),
                "message": self.0.to_string(),
            }
        }));
        (status, body).into_response()
    }
}

pub async fn health(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({ "status": "healthy", "uptime_s": state.registry.uptime_seconds() }))
}

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Threat Analysis API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn admin_stats(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "total_analyses": state.registry.total_analyses(),
        "threats_detected": state.registry.threats_detected(),
        "uptime": state.registry.uptime_seconds(),
        "pattern_count": state.registry.pattern_matcher.pattern_count(),
    }))
}

pub async fn analyze_complete(
    Extension(state): Extension<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut content_type: Option<String> = None;
    let mut text_content: Option<String> = None;
    let mut sender = String::new();
    let mut subject = String::new();
    let mut image_bytes: Option<Vec<u8>> = None;
    let mut video_frames: Vec<Vec<u8>> = Vec::new();
    let mut options = AnalysisOptions::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| ThreatError::InvalidInput(e.to_string()))? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "content_type" => {
                let data = field.bytes().await.map_err(|e| ThreatError::InvalidInput(e.to_string()))?;
                content_type = Some(String::from_utf8_lossy(&data).to_string());
            }
            "text_content" => {
                let data = field.bytes().await.map_err(|e| ThreatError::InvalidInput(e.to_string()))?;
                text_content = Some(String::from_utf8_lossy(&data).to_string());
            }
            "sender" => {
                let data = field.bytes().await.map_err(|e| ThreatError::InvalidInput(e.to_string()))?;
                sender = String::from_utf8_lossy(&data).to_string();
            }
            "subject" => {
                let data = field.bytes().await.map_err(|e| ThreatError::InvalidInput(e.to_string()))?;
                subject = String::from_utf8_lossy(&data).to_string();
            }
            "auto_respond" => {
                let data = field.bytes().await.map_err(|e| ThreatError::InvalidInput(e.to_string()))?;
                options.auto_respond = String::from_utf8_lossy(&data).trim() == "true";
            }
            "deploy_decoy" => {
                let data = field.bytes().await.map_err(|e| ThreatError::InvalidInput(e.to_string()))?;
                options.deploy_decoy = String::from_utf8_lossy(&data).trim() == "true";
            }
            "frame_interval_s" => {
                let data = field.bytes().await.map_err(|e| ThreatError::InvalidInput(e.to_string()))?;
                if let Ok(value) = String::from_utf8_lossy(&data).trim().parse() {
                    options.frame_interval_s = value;
                }
            }
            "confidence_threshold" => {
                let data = field.bytes().await.map_err(|e| ThreatError::InvalidInput(e.to_string()))?;
                if let Ok(value) = String::from_utf8_lossy(&data).trim().parse() {
                    options.confidence_threshold = value;
                }
            }
            "image" => {
                let data = field.bytes().await.map_err(|e| ThreatError::InvalidInput(e.to_string()))?;
                image_bytes = Some(data.to_vec());
            }
            "video_frame" => {
                let data = field.bytes().await.map_err(|e| ThreatError::InvalidInput(e.to_string()))?;
                video_frames.push(data.to_vec());
            }
            _ => {}
        }
    }

    let content_type = content_type
        .as_deref()
        .and_then(ContentType::from_str)
        .ok_or_else(|| ThreatError::InvalidInput("missing or unrecognized content_type".to_string()))?;

    if sender.is_empty() {
        return Err(ThreatError::InvalidInput("sender is required".to_string()).into());
    }

    let mut content = ContentData::new(content_type, sender);
    content.text_content = text_content;
    content.subject = subject;
    content.image_bytes = image_bytes;
    content.video_input = if video_frames.is_empty() { None } else { Some(VideoInput::Frames(video_frames)) };

    println!("[INFO] analyzing {:?} content from {}", content_type, content.sender);

    let result = state.orchestrator.analyze_complete(&content, &options).await;

    match &result {
        Ok(analysis) => println!(
            "[INFO] analysis {} complete: {} ({:.1}/100) in {}ms",
            analysis.analysis_id, analysis.threat_category, analysis.threat_score, analysis.analysis_duration_ms
        ),
        Err(e) => eprintln!("[ERROR] analysis failed: {e}"),
    }

    Ok(Json(result?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let response = ApiError(ThreatError::InvalidInput("x".to_string())).into_response();
        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn upstream_unavailable_maps_to_bad_gateway() {
        let response = ApiError(ThreatError::UpstreamUnavailable("x".to_string())).into_response();
        assert_eq!(response.status(), axum::http::StatusCode::BAD_GATEWAY);
    }
}
