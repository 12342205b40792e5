//! Error types for farore-lib.

use thiserror::Error;

/// Synthesis errors.
///
/// Three families: validation (client errors, always terminal),
/// configuration (missing engine or credential), and transient backend
/// failures (recoverable only via the `auto` fallback step).
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("text is empty")]
    EmptyText,

    #[error("missing text")]
    MissingText,

    #[error("speed must be positive, got {0}")]
    InvalidSpeed(f32),

    #[error("{0}")]
    UnknownEngine(String),

    #[error("{0}")]
    InvalidGender(String),

    #[error("invalid request parameters: {0}")]
    InvalidParams(String),

    #[error("engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("missing credential: {0} is not set")]
    MissingCredential(&'static str),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("audio encoding failed: {0}")]
    Audio(#[from] hound::Error),

    #[error("engine produced no audio")]
    EmptyAudio,
}
