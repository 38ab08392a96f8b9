use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use mailshield_core::corpus::demo_texts;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EmailResponse {
    pub original_text: String,
    pub masked_text: String,
    pub category: String,
    pub confidence_score: f64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/classify", post(classify))
        .route("/ui", get(ui))
        .route("/demo-texts", get(demo_texts_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "running",
        "message": "Email Classifier is online."
    }))
}

async fn ui() -> impl IntoResponse {
    Html(include_str!("templates/index.html"))
}

async fn demo_texts_handler() -> impl IntoResponse {
    let texts: Vec<serde_json::Value> = demo_texts()
        .iter()
        .map(|(domain, text)| serde_json::json!({ "domain": domain, "text": text }))
        .collect();
    Json(texts)
}

/// Token from an `Authorization: Bearer <token>` header. The scheme is
/// matched case-insensitively; everything after the first space is the token,
/// untrimmed.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    (!token.is_empty()).then_some(token)
}

/// Masks then classifies one email. Credentials are checked before the
/// body, so a bad token is a 403 even when the payload is malformed.
async fn classify(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> Result<Json<EmailResponse>, ApiError> {
    match bearer_token(&headers) {
        Some(token) if token == &*state.api_secret => {}
        _ => return Err(ApiError::Forbidden),
    }
    let Json(request) = payload.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;

    let response = tokio::task::spawn_blocking(move || {
        let masked_text = state.masker.mask_all(&request.text);
        let prediction = state.classifier.predict(&masked_text);
        EmailResponse {
            original_text: request.text,
            masked_text,
            category: prediction.category,
            confidence_score: prediction.confidence,
        }
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    tracing::info!(
        category = %response.category,
        confidence = response.confidence_score,
        "Email classified"
    );
    Ok(Json(response))
}
