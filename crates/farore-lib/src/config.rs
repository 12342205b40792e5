//! Process-wide configuration, read once from the environment at startup.
//!
//! Model asset paths follow the conventional layout of a sherpa-onnx
//! MatchaTTS export: an acoustic model (`model-steps-*.onnx`), a vocoder,
//! a tokens file, and optional lexicon / espeak data / rule FSTs, all under
//! one model directory. Explicit env vars override auto-discovery.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Default model directory when `SHERPA_MATCHA_DIR` is unset.
pub const DEFAULT_MODEL_DIR: &str = "models/matcha-zh-en";

const DEFAULT_NUM_THREADS: usize = 4;
const DEFAULT_RULE_FST_NAMES: &[&str] = &["phone-zh.fst", "date-zh.fst", "number-zh.fst"];

static RE_MODEL_STEPS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^model-steps-(\d+)\.onnx$").unwrap());

/// On-disk asset paths for the local Matcha engine.
#[derive(Debug, Clone)]
pub struct MatchaPaths {
    pub acoustic_model: PathBuf,
    pub vocoder: PathBuf,
    pub tokens: PathBuf,
    pub lexicon: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub dict_dir: Option<PathBuf>,
    pub rule_fsts: Vec<PathBuf>,
}

impl MatchaPaths {
    /// The assets without which the engine cannot be constructed.
    /// Returns the missing ones, empty when all are present.
    pub fn missing_mandatory(&self) -> Vec<&Path> {
        let mut missing = Vec::new();
        for path in [&self.acoustic_model, &self.vocoder, &self.tokens] {
            if !path.exists() {
                missing.push(path.as_path());
            }
        }
        missing
    }

    /// Rule FSTs as the comma-joined list the inference library expects.
    pub fn rule_fsts_joined(&self) -> String {
        self.rule_fsts
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Cloud-simple (translate endpoint) engine configuration.
#[derive(Debug, Clone)]
pub struct GttsConfig {
    pub endpoint: String,
    pub lang: String,
}

/// Cloud-generative engine configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub voice: String,
}

/// Everything the process reads from the environment. Immutable after
/// startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub matcha: MatchaPaths,
    pub num_threads: usize,
    pub gtts: GttsConfig,
    pub gemini: GeminiConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok().filter(|v| !v.is_empty()))
    }

    /// Build from an arbitrary key lookup. Split out from [`from_env`] so
    /// tests can drive it without mutating process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let model_dir = get("SHERPA_MATCHA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_DIR));

        let matcha = resolve_matcha_paths(&model_dir, &get);

        let num_threads = get("TTS_NUM_THREADS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_NUM_THREADS);

        let gtts = GttsConfig {
            endpoint: get("GTTS_ENDPOINT")
                .unwrap_or_else(|| "https://translate.google.com/translate_tts".into()),
            lang: get("GTTS_LANG").unwrap_or_else(|| "zh-TW".into()),
        };

        let gemini = GeminiConfig {
            endpoint: get("GEMINI_ENDPOINT")
                .unwrap_or_else(|| "https://generativelanguage.googleapis.com".into()),
            api_key: get("GEMINI_API_KEY"),
            model: get("GEMINI_TTS_MODEL")
                .unwrap_or_else(|| "gemini-2.5-flash-preview-tts".into()),
            voice: get("GEMINI_TTS_VOICE").unwrap_or_else(|| "Kore".into()),
        };

        Self {
            matcha,
            num_threads,
            gtts,
            gemini,
        }
    }
}

fn resolve_matcha_paths(
    model_dir: &Path,
    get: &impl Fn(&str) -> Option<String>,
) -> MatchaPaths {
    // Explicit path, legacy env var, newest export in the model dir,
    // legacy flat name, then the conventional default — in that order.
    let acoustic_model = get("SHERPA_MATCHA_ACOUSTIC_MODEL")
        .or_else(|| get("SHERPA_MATCHA_MODEL"))
        .map(PathBuf::from)
        .or_else(|| pick_latest_model_steps(model_dir))
        .unwrap_or_else(|| {
            let legacy = model_dir.join("model.onnx");
            if legacy.exists() {
                legacy
            } else {
                model_dir.join("model-steps-3.onnx")
            }
        });

    let vocoder = get("SHERPA_MATCHA_VOCODER")
        .map(PathBuf::from)
        .unwrap_or_else(|| model_dir.join("vocos-16khz-univ.onnx"));

    let tokens = get("SHERPA_MATCHA_TOKENS")
        .map(PathBuf::from)
        .unwrap_or_else(|| model_dir.join("tokens.txt"));

    let lexicon = get("SHERPA_MATCHA_LEXICON").map(PathBuf::from).or_else(|| {
        let default = model_dir.join("lexicon.txt");
        default.exists().then_some(default)
    });

    let data_dir = get("SHERPA_MATCHA_DATA_DIR").map(PathBuf::from).or_else(|| {
        let default = model_dir.join("espeak-ng-data");
        default.exists().then_some(default)
    });

    let dict_dir = get("SHERPA_MATCHA_DICT_DIR").map(PathBuf::from);

    let rule_fsts = match get("TTS_RULE_FSTS") {
        Some(list) => list.split(',').map(PathBuf::from).collect(),
        None => DEFAULT_RULE_FST_NAMES
            .iter()
            .map(|name| model_dir.join(name))
            .filter(|p| p.exists())
            .collect(),
    };

    debug!(?acoustic_model, ?vocoder, ?tokens, "resolved matcha paths");

    MatchaPaths {
        acoustic_model,
        vocoder,
        tokens,
        lexicon,
        data_dir,
        dict_dir,
        rule_fsts,
    }
}

/// Newest acoustic model export in `dir`, by step count
/// (`model-steps-3.onnx` < `model-steps-12.onnx`).
pub fn pick_latest_model_steps(dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    entries
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let name = path.file_name()?.to_str()?;
            let steps: u64 = RE_MODEL_STEPS.captures(name)?[1].parse().ok()?;
            Some((steps, path))
        })
        .max_by_key(|(steps, _)| *steps)
        .map(|(_, path)| path)
}
