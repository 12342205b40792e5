//! sherpa-onnx MatchaTTS backend for the local engine.
//!
//! Only compiled with the `matcha` feature; the native runtime and model
//! assets live on deploy hosts.

use std::sync::Mutex;

use sherpa_rs::tts::{CommonTtsConfig, MatchaTts, MatchaTtsConfig};

use super::local::{AcousticModel, RawAudio, catch_panic};
use crate::config::AppConfig;
use crate::error::TtsError;

fn path_string(path: &std::path::Path) -> String {
    path.to_string_lossy().into_owned()
}

pub struct MatchaModel {
    // The binding's generate call takes &mut self.
    tts: Mutex<MatchaTts>,
}

impl MatchaModel {
    pub fn load(config: &AppConfig) -> Result<Self, TtsError> {
        let paths = &config.matcha;

        let tts_config = MatchaTtsConfig {
            acoustic_model: path_string(&paths.acoustic_model),
            vocoder: path_string(&paths.vocoder),
            tokens: path_string(&paths.tokens),
            lexicon: paths
                .lexicon
                .as_deref()
                .map(path_string)
                .unwrap_or_default(),
            data_dir: paths
                .data_dir
                .as_deref()
                .map(path_string)
                .unwrap_or_default(),
            dict_dir: paths
                .dict_dir
                .as_deref()
                .map(path_string)
                .unwrap_or_default(),
            common_config: CommonTtsConfig {
                rule_fsts: paths.rule_fsts_joined(),
                max_num_sentences: 1,
                provider: Some("cpu".into()),
                num_threads: Some(config.num_threads as i32),
                ..Default::default()
            },
            ..Default::default()
        };

        // sherpa-onnx aborts via panic on a malformed config; contain it so
        // init_local degrades to cloud-only mode instead of crashing.
        let tts = catch_panic("matcha", move || MatchaTts::new(tts_config))?;

        Ok(Self {
            tts: Mutex::new(tts),
        })
    }
}

impl AcousticModel for MatchaModel {
    fn generate(&self, text: &str, speaker_id: u32, speed: f32) -> Result<RawAudio, TtsError> {
        let mut tts = self
            .tts
            .lock()
            .map_err(|_| TtsError::Backend("matcha engine lock poisoned".into()))?;

        let audio = tts
            .create(text, speaker_id as i32, speed)
            .map_err(|e| TtsError::Backend(format!("matcha generation failed: {e}")))?;

        Ok(RawAudio {
            samples: audio.samples,
            sample_rate: audio.sample_rate,
        })
    }
}
