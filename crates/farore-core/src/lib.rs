//! farore-core — Pure types, text preparation, and WAV encoding.
//!
//! No async runtime, no I/O, no platform dependencies.

pub mod audio;
pub mod text_prep;
pub mod types;
