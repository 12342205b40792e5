//! HTTP API for the farore TTS service.
//!
//! Two routes: `GET /health` for readiness probing and `POST /tts` for
//! synthesis. Parameters arrive as query string, JSON body, or both; when
//! `text` is present in the query string the query parameters win and the
//! body is ignored. CORS-permissive so browser frontends can call directly.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{FromRequest, FromRequestParts, Query, Request, State};
use axum::http::request::Parts;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use reqwest::Client;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::info;

use farore_core::types::{EngineKind, Gender, VoiceParams};

use crate::config::AppConfig;
use crate::engine::gemini::GeminiEngine;
use crate::engine::gtts::GttsEngine;
use crate::engine::local::init_local;
use crate::engine::Synthesizer;
use crate::error::TtsError;
use crate::policy::{Dispatcher, SynthesisRequest};

/// Shared server state, built once before the listener binds.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    /// Why the local engine is absent, if it is.
    pub startup_error: Option<String>,
}

impl AppState {
    /// Construct engines and the dispatcher from process configuration.
    /// A failed local engine init degrades to cloud-only mode.
    pub fn from_config(config: &AppConfig) -> Self {
        let client = Client::new();
        let init = init_local(config);
        let local = init.engine.map(|e| e as Arc<dyn Synthesizer>);

        let dispatcher = Dispatcher::new(
            local,
            Arc::new(GttsEngine::new(client.clone(), &config.gtts)),
            Arc::new(GeminiEngine::new(client, &config.gemini)),
        );

        Self {
            dispatcher: Arc::new(dispatcher),
            startup_error: init.error,
        }
    }
}

/// Build the axum router with shared [`AppState`].
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tts", post(tts))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let ready = state.dispatcher.local_available();
    let engine = if ready {
        "sherpa-onnx(matcha)"
    } else {
        "gtts-only"
    };
    Json(json!({
        "status": "ok",
        "engine": engine,
        "ready": ready,
        "error": state.startup_error,
    }))
}

/// Synthesis parameters, identical shape for query string and JSON body.
#[derive(Debug, Default, serde::Deserialize)]
pub struct TtsParams {
    text: Option<String>,
    engine: Option<String>,
    #[serde(alias = "sid")]
    speaker_id: Option<u32>,
    speed: Option<f32>,
    gender: Option<String>,
}

/// [`Query`] whose rejection carries the service's JSON error body instead
/// of axum's plain-text default.
struct QueryParams(TtsParams);

impl<S: Send + Sync> FromRequestParts<S> for QueryParams {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<TtsParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError(TtsError::InvalidParams(e.body_text())))?;
        Ok(Self(params))
    }
}

/// Optional JSON body with the same rejection treatment.
struct BodyParams(Option<TtsParams>);

impl<S: Send + Sync> FromRequest<S> for BodyParams {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Option::<Json<TtsParams>>::from_request(req, state)
            .await
            .map_err(|e| ApiError(TtsError::InvalidParams(e.body_text())))?;
        Ok(Self(body.map(|Json(b)| b)))
    }
}

async fn tts(
    State(state): State<AppState>,
    QueryParams(query): QueryParams,
    BodyParams(body): BodyParams,
) -> Result<Response, ApiError> {
    let req = merge_request(query, body)?;

    info!(
        engine = %req.engine,
        chars = req.text.chars().count(),
        speed = req.params.speed,
        "tts request"
    );

    let result = state.dispatcher.dispatch(&req).await?;
    Ok((
        [(header::CONTENT_TYPE, result.media_type.as_str())],
        result.audio,
    )
        .into_response())
}

/// Resolve the effective parameters. Query wins over body when its `text`
/// is present; the two sources are never mixed field-by-field.
fn merge_request(query: TtsParams, body: Option<TtsParams>) -> Result<SynthesisRequest, TtsError> {
    let source = if query.text.is_some() {
        query
    } else {
        body.unwrap_or_default()
    };

    let text = source.text.ok_or(TtsError::MissingText)?;

    let engine = match source.engine.as_deref() {
        Some(raw) => EngineKind::from_str(raw).map_err(TtsError::UnknownEngine)?,
        None => EngineKind::Auto,
    };

    let gender = match source.gender.as_deref() {
        Some(raw) => Some(Gender::from_str(raw).map_err(TtsError::InvalidGender)?),
        None => None,
    };

    Ok(SynthesisRequest {
        text,
        params: VoiceParams {
            speaker_id: source.speaker_id.unwrap_or(0),
            speed: source.speed.unwrap_or(1.0),
            gender,
        },
        engine,
    })
}

/// Maps synthesis errors onto HTTP statuses with a JSON error body.
pub struct ApiError(TtsError);

impl From<TtsError> for ApiError {
    fn from(err: TtsError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            TtsError::EmptyText | TtsError::MissingText | TtsError::InvalidSpeed(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            TtsError::UnknownEngine(_)
            | TtsError::InvalidGender(_)
            | TtsError::InvalidParams(_) => StatusCode::BAD_REQUEST,
            TtsError::EngineUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            TtsError::MissingCredential(_)
            | TtsError::Backend(_)
            | TtsError::Http(_)
            | TtsError::Audio(_)
            | TtsError::EmptyAudio => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
