//! Engine selection and fallback.
//!
//! The order of attempts is fixed by the request's engine selector:
//!
//! ```text
//! local   → local only                 (failure is terminal)
//! gtts    → cloud-simple only          (failure is terminal)
//! gemini  → cloud-generative only      (failure is terminal)
//! auto    → local, then cloud-simple   (one fallback step, then terminal)
//! ```
//!
//! `auto` never reaches the generative backend; it is only served when
//! explicitly selected.

use std::sync::Arc;

use tracing::{debug, warn};

use farore_core::types::{EngineKind, VoiceParams};

use crate::engine::{SynthesisResult, Synthesizer};
use crate::error::TtsError;

/// A synthesis request after parameter merging, as the router hands it
/// to the policy.
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: String,
    pub params: VoiceParams,
    pub engine: EngineKind,
}

/// Routes requests to engines. Built once at startup; the local slot stays
/// empty for the process lifetime when initialization failed.
pub struct Dispatcher {
    local: Option<Arc<dyn Synthesizer>>,
    cloud_simple: Arc<dyn Synthesizer>,
    generative: Arc<dyn Synthesizer>,
}

impl Dispatcher {
    pub fn new(
        local: Option<Arc<dyn Synthesizer>>,
        cloud_simple: Arc<dyn Synthesizer>,
        generative: Arc<dyn Synthesizer>,
    ) -> Self {
        Self {
            local,
            cloud_simple,
            generative,
        }
    }

    pub fn local_available(&self) -> bool {
        self.local.is_some()
    }

    pub async fn dispatch(&self, req: &SynthesisRequest) -> Result<SynthesisResult, TtsError> {
        let text = req.text.trim();
        if text.is_empty() {
            return Err(TtsError::EmptyText);
        }
        // NaN fails this comparison too
        if !(req.params.speed > 0.0) {
            return Err(TtsError::InvalidSpeed(req.params.speed));
        }

        match req.engine {
            EngineKind::Local => match &self.local {
                Some(engine) => engine.synthesize(text, &req.params).await,
                None => Err(TtsError::EngineUnavailable(
                    "local engine is not initialized (model assets missing?)".into(),
                )),
            },
            EngineKind::Gtts => self.cloud_simple.synthesize(text, &req.params).await,
            EngineKind::Gemini => self.generative.synthesize(text, &req.params).await,
            EngineKind::Auto => {
                if let Some(engine) = &self.local {
                    match engine.synthesize(text, &req.params).await {
                        Ok(result) => return Ok(result),
                        Err(e) => {
                            warn!("local engine failed, falling back to cloud-simple: {e}");
                        }
                    }
                } else {
                    debug!("local engine unavailable, using cloud-simple");
                }
                self.cloud_simple.synthesize(text, &req.params).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MediaType;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedEngine {
        name: &'static str,
        media_type: MediaType,
        result: Result<&'static [u8], fn() -> TtsError>,
        calls: AtomicUsize,
    }

    impl FixedEngine {
        fn ok(name: &'static str, media_type: MediaType, audio: &'static [u8]) -> Arc<Self> {
            Arc::new(Self {
                name,
                media_type,
                result: Ok(audio),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(name: &'static str, make_err: fn() -> TtsError) -> Arc<Self> {
            Arc::new(Self {
                name,
                media_type: MediaType::Wav,
                result: Err(make_err),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Synthesizer for FixedEngine {
        async fn synthesize(
            &self,
            _text: &str,
            _params: &VoiceParams,
        ) -> Result<SynthesisResult, TtsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.result {
                Ok(audio) => Ok(SynthesisResult {
                    audio: bytes::Bytes::from_static(audio),
                    media_type: self.media_type,
                }),
                Err(make_err) => Err(make_err()),
            }
        }

        fn name(&self) -> &'static str {
            self.name
        }
    }

    const WAV: &[u8] = b"local-wav";
    const MPEG: &[u8] = b"cloud-mpeg";

    fn request(engine: EngineKind) -> SynthesisRequest {
        SynthesisRequest {
            text: "你好".into(),
            params: VoiceParams::default(),
            engine,
        }
    }

    #[tokio::test]
    async fn auto_prefers_local() {
        let local = FixedEngine::ok("local", MediaType::Wav, WAV);
        let cloud = FixedEngine::ok("gtts", MediaType::Mpeg, MPEG);
        let generative = FixedEngine::failing("gemini", || TtsError::EmptyAudio);
        let dispatcher = Dispatcher::new(
            Some(local.clone()),
            cloud.clone(),
            generative.clone(),
        );

        let result = dispatcher.dispatch(&request(EngineKind::Auto)).await.unwrap();
        assert_eq!(result.media_type, MediaType::Wav);
        assert_eq!(local.calls(), 1);
        assert_eq!(cloud.calls(), 0);
        assert_eq!(generative.calls(), 0);
    }

    #[tokio::test]
    async fn auto_without_local_uses_cloud_simple() {
        let cloud = FixedEngine::ok("gtts", MediaType::Mpeg, MPEG);
        let generative = FixedEngine::failing("gemini", || TtsError::EmptyAudio);
        let dispatcher = Dispatcher::new(None, cloud.clone(), generative);

        let result = dispatcher.dispatch(&request(EngineKind::Auto)).await.unwrap();
        assert_eq!(result.media_type, MediaType::Mpeg);
        assert_eq!(cloud.calls(), 1);
    }

    #[tokio::test]
    async fn auto_falls_back_on_local_failure() {
        let local = FixedEngine::failing("local", || TtsError::Backend("boom".into()));
        let cloud = FixedEngine::ok("gtts", MediaType::Mpeg, MPEG);
        let generative = FixedEngine::failing("gemini", || TtsError::EmptyAudio);
        let dispatcher = Dispatcher::new(Some(local.clone()), cloud.clone(), generative);

        let result = dispatcher.dispatch(&request(EngineKind::Auto)).await.unwrap();
        assert_eq!(result.media_type, MediaType::Mpeg);
        assert_eq!(local.calls(), 1);
        assert_eq!(cloud.calls(), 1);
    }

    #[tokio::test]
    async fn auto_falls_back_on_empty_local_audio() {
        let local = FixedEngine::failing("local", || TtsError::EmptyAudio);
        let cloud = FixedEngine::ok("gtts", MediaType::Mpeg, MPEG);
        let generative = FixedEngine::failing("gemini", || TtsError::EmptyAudio);
        let dispatcher = Dispatcher::new(Some(local), cloud.clone(), generative);

        let result = dispatcher.dispatch(&request(EngineKind::Auto)).await.unwrap();
        assert_eq!(result.media_type, MediaType::Mpeg);
    }

    #[tokio::test]
    async fn auto_has_no_second_fallback() {
        let local = FixedEngine::failing("local", || TtsError::Backend("local down".into()));
        let cloud = FixedEngine::failing("gtts", || TtsError::Backend("cloud down".into()));
        let generative = FixedEngine::ok("gemini", MediaType::Wav, WAV);
        let dispatcher = Dispatcher::new(
            Some(local),
            cloud.clone(),
            generative.clone(),
        );

        let err = dispatcher.dispatch(&request(EngineKind::Auto)).await.unwrap_err();
        assert!(matches!(err, TtsError::Backend(_)));
        // The generative backend is never part of the auto chain.
        assert_eq!(generative.calls(), 0);
    }

    #[tokio::test]
    async fn explicit_local_does_not_fall_back() {
        let cloud = FixedEngine::ok("gtts", MediaType::Mpeg, MPEG);
        let generative = FixedEngine::failing("gemini", || TtsError::EmptyAudio);
        let dispatcher = Dispatcher::new(None, cloud.clone(), generative);

        let err = dispatcher.dispatch(&request(EngineKind::Local)).await.unwrap_err();
        assert!(matches!(err, TtsError::EngineUnavailable(_)));
        assert_eq!(cloud.calls(), 0);
    }

    #[tokio::test]
    async fn explicit_gtts_failure_is_terminal() {
        let local = FixedEngine::ok("local", MediaType::Wav, WAV);
        let cloud = FixedEngine::failing("gtts", || TtsError::Backend("quota".into()));
        let generative = FixedEngine::failing("gemini", || TtsError::EmptyAudio);
        let dispatcher = Dispatcher::new(Some(local.clone()), cloud, generative);

        let err = dispatcher.dispatch(&request(EngineKind::Gtts)).await.unwrap_err();
        assert!(matches!(err, TtsError::Backend(_)));
        assert_eq!(local.calls(), 0);
    }

    #[tokio::test]
    async fn explicit_gemini_routes_to_generative() {
        let local = FixedEngine::ok("local", MediaType::Wav, WAV);
        let cloud = FixedEngine::ok("gtts", MediaType::Mpeg, MPEG);
        let generative = FixedEngine::ok("gemini", MediaType::Wav, WAV);
        let dispatcher = Dispatcher::new(
            Some(local),
            cloud.clone(),
            generative.clone(),
        );

        let result = dispatcher.dispatch(&request(EngineKind::Gemini)).await.unwrap();
        assert_eq!(result.media_type, MediaType::Wav);
        assert_eq!(generative.calls(), 1);
        assert_eq!(cloud.calls(), 0);
    }

    #[tokio::test]
    async fn empty_text_rejected_for_every_engine() {
        let local = FixedEngine::ok("local", MediaType::Wav, WAV);
        let cloud = FixedEngine::ok("gtts", MediaType::Mpeg, MPEG);
        let generative = FixedEngine::ok("gemini", MediaType::Wav, WAV);
        let dispatcher = Dispatcher::new(
            Some(local.clone()),
            cloud.clone(),
            generative.clone(),
        );

        for engine in [
            EngineKind::Auto,
            EngineKind::Local,
            EngineKind::Gtts,
            EngineKind::Gemini,
        ] {
            let req = SynthesisRequest {
                text: "   ".into(),
                params: VoiceParams::default(),
                engine,
            };
            let err = dispatcher.dispatch(&req).await.unwrap_err();
            assert!(matches!(err, TtsError::EmptyText), "engine {engine}");
        }
        assert_eq!(local.calls() + cloud.calls() + generative.calls(), 0);
    }

    #[tokio::test]
    async fn nonpositive_speed_rejected() {
        let cloud = FixedEngine::ok("gtts", MediaType::Mpeg, MPEG);
        let generative = FixedEngine::ok("gemini", MediaType::Wav, WAV);
        let dispatcher = Dispatcher::new(None, cloud, generative);

        for speed in [0.0, -1.0, f32::NAN] {
            let req = SynthesisRequest {
                text: "你好".into(),
                params: VoiceParams {
                    speed,
                    ..Default::default()
                },
                engine: EngineKind::Auto,
            };
            let err = dispatcher.dispatch(&req).await.unwrap_err();
            assert!(matches!(err, TtsError::InvalidSpeed(_)), "speed {speed}");
        }
    }
}
