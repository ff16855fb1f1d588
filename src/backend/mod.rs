//! Remote TTS backend abstraction.
//!
//! The backend holds one mutable "loaded model pair" and exposes two operations:
//! loading weights into a slot and synthesizing text with whatever is loaded.
//! [`HttpBackend`] talks to a GPT-SoVITS `api_v2` server; tests plug in their own.

mod http;

pub use http::{error_detail, HttpBackend, HttpBackendBuilder};

use crate::types::{ModelSlot, TtsRequest};
use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;

#[async_trait]
pub trait TtsBackend: Send + Sync {
    /// Load `weights_id` into `slot`. Fails with [`Error::Switch`](crate::Error::Switch).
    async fn set_weights(&self, slot: ModelSlot, weights_id: &str) -> Result<()>;

    /// Render `request` with the currently loaded models and return the encoded audio.
    async fn synthesize(&self, request: &TtsRequest) -> Result<Bytes>;

    /// Identity of the remote model state. Backends returning the same key share one
    /// switch queue; `None` means only clones of the same `Arc` share it.
    fn queue_key(&self) -> Option<String> {
        None
    }
}
