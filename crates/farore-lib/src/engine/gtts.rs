//! Cloud-simple engine — the translate TTS endpoint.
//!
//! Stateless; one GET per text chunk, MPEG segments concatenated in order.
//! `speaker_id` and `gender` are accepted but have no effect here.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::debug;

use farore_core::text_prep::{self, DEFAULT_MAX_CHUNK_CHARS};
use farore_core::types::VoiceParams;

use super::{MediaType, SynthesisResult, Synthesizer};
use crate::config::GttsConfig;
use crate::error::TtsError;

/// Below this, the endpoint's "slow" rendering flag is used.
const SLOW_SPEED_THRESHOLD: f32 = 0.85;

/// `ttsspeed` values the endpoint understands.
const TTSSPEED_NORMAL: &str = "1";
const TTSSPEED_SLOW: &str = "0.3";

pub struct GttsEngine {
    client: Client,
    endpoint: String,
    lang: String,
}

impl GttsEngine {
    pub fn new(client: Client, config: &GttsConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            lang: config.lang.clone(),
        }
    }
}

#[async_trait]
impl Synthesizer for GttsEngine {
    async fn synthesize(
        &self,
        text: &str,
        params: &VoiceParams,
    ) -> Result<SynthesisResult, TtsError> {
        let ttsspeed = if params.speed < SLOW_SPEED_THRESHOLD {
            TTSSPEED_SLOW
        } else {
            TTSSPEED_NORMAL
        };

        let chunks = text_prep::split_chunks(text, DEFAULT_MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(TtsError::EmptyText);
        }

        let total = chunks.len().to_string();
        let mut audio = Vec::new();

        for (idx, chunk) in chunks.iter().enumerate() {
            debug!(idx, chars = chunk.chars().count(), "gtts: fetching chunk");

            let idx = idx.to_string();
            let textlen = chunk.chars().count().to_string();
            let response = self
                .client
                .get(&self.endpoint)
                .query(&[
                    ("ie", "UTF-8"),
                    ("client", "tw-ob"),
                    ("tl", self.lang.as_str()),
                    ("ttsspeed", ttsspeed),
                    ("q", chunk.as_str()),
                    ("total", total.as_str()),
                    ("idx", idx.as_str()),
                    ("textlen", textlen.as_str()),
                ])
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(TtsError::Backend(format!(
                    "translate endpoint returned {}",
                    response.status()
                )));
            }

            audio.extend_from_slice(&response.bytes().await?);
        }

        if audio.is_empty() {
            return Err(TtsError::EmptyAudio);
        }

        Ok(SynthesisResult {
            audio: Bytes::from(audio),
            media_type: MediaType::Mpeg,
        })
    }

    fn name(&self) -> &'static str {
        "gtts"
    }
}
