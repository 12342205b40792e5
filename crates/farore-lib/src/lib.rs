//! farore-lib — TTS engines, fallback policy, and HTTP API.
//!
//! Depends on farore-core for pure types, text preparation, and WAV
//! encoding.

pub mod config;
pub mod engine;
pub mod error;
pub mod policy;
pub mod server;

// Re-export farore-core for convenience
pub use farore_core;
