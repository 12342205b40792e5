//! Cloud-generative engine — audio out of a multimodal generate call.
//!
//! One JSON POST per request; the audio comes back as base64 s16le PCM
//! nested in the candidate payload and is re-wrapped as WAV. Requires an
//! API key; the credential is checked before any network traffic.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::debug;

use farore_core::{audio, types::VoiceParams};

use super::{MediaType, SynthesisResult, Synthesizer};
use crate::config::GeminiConfig;
use crate::error::TtsError;

/// Sample rate assumed when the response mime type does not carry one.
const DEFAULT_PCM_RATE: u32 = 24_000;

pub struct GeminiEngine {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    voice: String,
}

impl GeminiEngine {
    pub fn new(client: Client, config: &GeminiConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            voice: config.voice.clone(),
        }
    }
}

#[async_trait]
impl Synthesizer for GeminiEngine {
    async fn synthesize(
        &self,
        text: &str,
        _params: &VoiceParams,
    ) -> Result<SynthesisResult, TtsError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(TtsError::MissingCredential("GEMINI_API_KEY"))?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": text }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": self.voice }
                    }
                }
            }
        });

        debug!(model = %self.model, chars = text.chars().count(), "gemini: generate");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(TtsError::Backend(format!(
                "generative endpoint returned {status}: {detail}"
            )));
        }

        let payload: Value = response.json().await?;
        let inline = payload
            .pointer("/candidates/0/content/parts/0/inlineData")
            .ok_or_else(|| TtsError::Backend("response carries no inline audio data".into()))?;

        let data = inline
            .get("data")
            .and_then(Value::as_str)
            .ok_or_else(|| TtsError::Backend("inline audio data is not a string".into()))?;

        let pcm = general_purpose::STANDARD
            .decode(data)
            .map_err(|e| TtsError::Backend(format!("failed to decode base64 audio: {e}")))?;
        if pcm.is_empty() {
            return Err(TtsError::EmptyAudio);
        }

        let rate = inline
            .get("mimeType")
            .and_then(Value::as_str)
            .and_then(parse_pcm_rate)
            .unwrap_or(DEFAULT_PCM_RATE);

        let wav = audio::encode_wav_pcm16(&pcm, rate)?;
        Ok(SynthesisResult {
            audio: wav.into(),
            media_type: MediaType::Wav,
        })
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

/// Extract the sample rate from a mime type like `audio/L16;codec=pcm;rate=24000`.
fn parse_pcm_rate(mime: &str) -> Option<u32> {
    mime.split(';')
        .filter_map(|part| part.trim().strip_prefix("rate="))
        .find_map(|rate| rate.parse().ok())
}
