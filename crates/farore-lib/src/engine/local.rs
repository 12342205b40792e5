//! Local neural engine — on-device acoustic model + vocoder.
//!
//! The inference library does the actual work; this wrapper normalizes the
//! text for the model's locale, keeps generation off the event loop, and
//! converts the sample buffer to WAV.
//!
//! Exactly one [`LocalEngine`] is constructed per process, before the
//! server binds. When mandatory model assets are missing or construction
//! fails, the process runs in degraded cloud-only mode for its lifetime —
//! initialization is never retried.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use farore_core::{audio, text_prep, types::VoiceParams};

use super::{MediaType, SynthesisResult, Synthesizer};
use crate::config::AppConfig;
use crate::error::TtsError;

/// Raw audio as the inference library hands it back.
pub struct RawAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Blocking text-to-samples backend. Implementations must tolerate
/// concurrent calls from multiple requests.
pub trait AcousticModel: Send + Sync {
    fn generate(&self, text: &str, speaker_id: u32, speed: f32) -> Result<RawAudio, TtsError>;
}

/// Run a native constructor that aborts by panicking on malformed input,
/// containing the panic so a bad model file degrades the process instead
/// of killing it.
pub(crate) fn catch_panic<T>(what: &str, f: impl FnOnce() -> T) -> Result<T, TtsError> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".into());
        TtsError::Backend(format!("{what} construction panicked: {message}"))
    })
}

pub struct LocalEngine {
    model: Arc<dyn AcousticModel>,
}

impl LocalEngine {
    pub fn new(model: Arc<dyn AcousticModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Synthesizer for LocalEngine {
    async fn synthesize(
        &self,
        text: &str,
        params: &VoiceParams,
    ) -> Result<SynthesisResult, TtsError> {
        let prepared = text_prep::prepare_for_local(text);
        let model = self.model.clone();
        let speaker_id = params.speaker_id;
        let speed = params.speed;

        // Generation is CPU-bound; keep it off the event loop.
        let raw = tokio::task::spawn_blocking(move || model.generate(&prepared, speaker_id, speed))
            .await
            .map_err(|e| TtsError::Backend(format!("generation task failed: {e}")))??;

        if raw.samples.is_empty() {
            return Err(TtsError::EmptyAudio);
        }

        let wav = audio::encode_wav_f32(&raw.samples, raw.sample_rate)?;
        Ok(SynthesisResult {
            audio: wav.into(),
            media_type: MediaType::Wav,
        })
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

/// Outcome of the one-shot local engine initialization.
pub struct LocalInit {
    pub engine: Option<Arc<LocalEngine>>,
    /// Why the engine is absent, surfaced through `/health`.
    pub error: Option<String>,
}

/// Initialize the local engine from on-disk model assets. Runs once at
/// process startup; missing assets or a construction failure degrade to
/// cloud-only mode instead of crashing.
#[cfg(feature = "matcha")]
pub fn init_local(config: &AppConfig) -> LocalInit {
    let missing = config.matcha.missing_mandatory();
    if !missing.is_empty() {
        let listing = missing
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let message = format!("missing model assets: {listing}");
        warn!("local engine disabled: {message}");
        return LocalInit {
            engine: None,
            error: Some(message),
        };
    }

    if let Some(lexicon) = &config.matcha.lexicon {
        if !lexicon.exists() {
            let message = format!("lexicon not found: {}", lexicon.display());
            warn!("local engine disabled: {message}");
            return LocalInit {
                engine: None,
                error: Some(message),
            };
        }
    }

    match super::matcha::MatchaModel::load(config) {
        Ok(model) => {
            tracing::info!(
                acoustic_model = %config.matcha.acoustic_model.display(),
                "local engine initialized"
            );
            LocalInit {
                engine: Some(Arc::new(LocalEngine::new(Arc::new(model)))),
                error: None,
            }
        }
        Err(e) => {
            warn!("local engine construction failed: {e}");
            LocalInit {
                engine: None,
                error: Some(e.to_string()),
            }
        }
    }
}

#[cfg(not(feature = "matcha"))]
pub fn init_local(config: &AppConfig) -> LocalInit {
    let _ = config;
    let message = "built without local inference support (matcha feature)".to_string();
    warn!("local engine disabled: {message}");
    LocalInit {
        engine: None,
        error: Some(message),
    }
}
