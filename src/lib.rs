//! # sovits-client
//!
//! Async client for a GPT-SoVITS `api_v2` text-to-speech server.
//!
//! ## Overview
//!
//! The server keeps exactly one GPT + SoVITS model pair loaded and changes it through two
//! separate calls. This crate makes that safe to drive from concurrent code:
//!
//! - **Serialized switching**: [`ModelSwitchSerializer`] runs switches one at a time, in
//!   submission order; a failed switch never blocks the ones behind it
//! - **Switch skipping**: [`VoiceSynthesizer`] remembers the last pair it applied and only
//!   switches when a request needs a different voice
//! - **Local audio handles**: synthesized clips are kept in an [`AudioStore`] and addressed
//!   by `blob:` URLs until released
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sovits_client::{ModelSelection, SovitsConfig, VoiceConfig, VoiceSynthesizer};
//!
//! #[tokio::main]
//! async fn main() -> sovits_client::Result<()> {
//!     let synth = VoiceSynthesizer::from_config(SovitsConfig::default().with_env_overrides()?)?;
//!
//!     let voice = VoiceConfig::new(
//!         "refs/narrator.wav",
//!         ModelSelection::new(
//!             "GPT_weights_v2/narrator-e15.ckpt",
//!             "SoVITS_weights_v2/narrator_e8_s200.pth",
//!         ),
//!     );
//!
//!     let handle = synth.generate(&voice, "Hello there.", "narrator").await?;
//!     if let Some(clip) = synth.audio(&handle) {
//!         clip.save_to("hello.wav").await?;
//!     }
//!     synth.release(&handle);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`backend`] | Remote API trait and the reqwest implementation |
//! | [`switch`] | FIFO model switch queue |
//! | [`synth`] | Voice generation with model caching |
//! | [`audio`] | Local clip registry |
//! | [`config`] | Connection settings (YAML + env) |
//! | [`types`] | Model, voice and request types |

pub mod audio;
pub mod backend;
pub mod config;
pub mod switch;
pub mod synth;
pub mod types;

pub use audio::{AudioClip, AudioHandle, AudioStore};
pub use backend::{HttpBackend, HttpBackendBuilder, TtsBackend};
pub use config::SovitsConfig;
pub use switch::ModelSwitchSerializer;
pub use synth::{GenerationStage, SwitchGuard, VoiceSynthesizer};
pub use types::{
    MediaType, ModelSelection, ModelSlot, TextSplitMethod, TtsRequest, TuningParams, VoiceConfig,
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
