//! TTS engine implementations.

pub mod gemini;
pub mod gtts;
pub mod local;
#[cfg(feature = "matcha")]
pub mod matcha;

use async_trait::async_trait;
use bytes::Bytes;

use farore_core::types::VoiceParams;

use crate::error::TtsError;

/// Media type of a finished synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Wav,
    Mpeg,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Wav => "audio/wav",
            MediaType::Mpeg => "audio/mpeg",
        }
    }
}

/// A fully generated audio clip. Streamed to the caller and not retained.
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    pub audio: Bytes,
    pub media_type: MediaType,
}

/// Capability shared by every engine: text in, audio bytes out.
///
/// Implementations must be cheap to call concurrently; the local engine is
/// constructed once at startup and shared, cloud engines hold only a
/// reqwest client and connection parameters.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(
        &self,
        text: &str,
        params: &VoiceParams,
    ) -> Result<SynthesisResult, TtsError>;

    /// Engine name for logs and error messages.
    fn name(&self) -> &'static str;
}
