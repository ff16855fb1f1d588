//! Core data types shared by the backend, the switch queue and the synthesizer.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ModelSelection`] | GPT + SoVITS weight pair identifying a voice |
//! | [`ModelSlot`] | Which of the two backend slots a call targets |
//! | [`VoiceConfig`] | Reference audio, models, languages and tuning |
//! | [`TuningParams`] | Optional sampling knobs, defaulted on the wire |
//! | [`TtsRequest`] | Fully defaulted `POST /tts` payload |

pub mod model;
pub mod request;
pub mod voice;

pub use model::{ModelSelection, ModelSlot};
pub use request::TtsRequest;
pub use voice::{MediaType, TextSplitMethod, TuningParams, VoiceConfig};
