//! Shared types for the farore TTS server.
//!
//! Kept here so downstream consumers can depend on request/engine types
//! without pulling in tokio, axum, or the inference stack.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Engine selector carried by a synthesis request.
///
/// A closed enumeration: an unrecognized selector string is rejected at the
/// edge instead of falling through a string comparison chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Local engine if available, cloud-simple otherwise.
    #[default]
    Auto,
    /// Local neural engine only. No fallback.
    Local,
    /// Cloud-simple (translate-endpoint) engine only. No fallback.
    Gtts,
    /// Cloud-generative engine only. No fallback.
    Gemini,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Auto => "auto",
            EngineKind::Local => "local",
            EngineKind::Gtts => "gtts",
            EngineKind::Gemini => "gemini",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(EngineKind::Auto),
            "local" => Ok(EngineKind::Local),
            "gtts" => Ok(EngineKind::Gtts),
            "gemini" => Ok(EngineKind::Gemini),
            other => Err(format!(
                "unknown engine '{other}'; valid engines: auto, local, gtts, gemini"
            )),
        }
    }
}

/// Requested voice gender. Accepted for API compatibility; no current
/// backend consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(format!(
                "unknown gender '{other}'; valid genders: male, female"
            )),
        }
    }
}

/// Per-request voice parameters, shared by every engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceParams {
    /// Speaker id for multi-speaker local models.
    pub speaker_id: u32,
    /// Playback-rate multiplier. Must be positive.
    pub speed: f32,
    pub gender: Option<Gender>,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            speaker_id: 0,
            speed: 1.0,
            gender: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_kind_from_str() {
        assert_eq!("auto".parse::<EngineKind>().unwrap(), EngineKind::Auto);
        assert_eq!("local".parse::<EngineKind>().unwrap(), EngineKind::Local);
        assert_eq!("gtts".parse::<EngineKind>().unwrap(), EngineKind::Gtts);
        assert_eq!("gemini".parse::<EngineKind>().unwrap(), EngineKind::Gemini);
    }

    #[test]
    fn engine_kind_rejects_unknown() {
        let err = "espeak".parse::<EngineKind>().unwrap_err();
        assert!(err.contains("espeak"));
        assert!(err.contains("auto"));
    }

    #[test]
    fn engine_kind_is_case_sensitive() {
        assert!("Auto".parse::<EngineKind>().is_err());
    }

    #[test]
    fn engine_kind_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&EngineKind::Gemini).unwrap(),
            "\"gemini\""
        );
        let parsed: EngineKind = serde_json::from_str("\"local\"").unwrap();
        assert_eq!(parsed, EngineKind::Local);
    }

    #[test]
    fn gender_from_str() {
        assert_eq!("male".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!("female".parse::<Gender>().unwrap(), Gender::Female);
        assert!("other".parse::<Gender>().is_err());
    }

    #[test]
    fn voice_params_default() {
        let p = VoiceParams::default();
        assert_eq!(p.speaker_id, 0);
        assert_eq!(p.speed, 1.0);
        assert!(p.gender.is_none());
    }
}
