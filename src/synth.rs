//! Voice generation on top of the switch queue.

use crate::audio::{AudioClip, AudioHandle, AudioStore};
use crate::backend::{HttpBackend, TtsBackend};
use crate::config::SovitsConfig;
use crate::switch::ModelSwitchSerializer;
use crate::types::{ModelSelection, TtsRequest, VoiceConfig};
use crate::{Error, ErrorContext, Result};
use arc_swap::ArcSwapOption;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, Instrument};

/// How `generate` guards the read-compare-switch-write on the model cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwitchGuard {
    /// No lock. Two concurrent calls that both see a stale cache both queue a switch.
    #[default]
    Optimistic,
    /// Hold an async mutex across the check and the switch, so a given change is applied once.
    Exclusive,
}

/// Progress of a single `generate` call, reported in debug logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    Validating,
    SwitchingModel,
    BuildingPayload,
    AwaitingSynthesis,
    Done,
    Failed,
}

pub struct VoiceSynthesizer {
    backend: Arc<dyn TtsBackend>,
    switcher: ModelSwitchSerializer,
    last_applied: ArcSwapOption<ModelSelection>,
    guard: SwitchGuard,
    switch_lock: tokio::sync::Mutex<()>,
    audio: AudioStore,
}

impl VoiceSynthesizer {
    /// Build a synthesizer on the switch queue shared by every synthesizer targeting the
    /// same backend (see [`ModelSwitchSerializer::shared`]). Must run inside a Tokio runtime.
    pub fn new(backend: Arc<dyn TtsBackend>) -> Result<Self> {
        let switcher = ModelSwitchSerializer::shared(backend.clone())?;
        Ok(Self::with_switcher(backend, switcher))
    }

    /// Build a synthesizer on an explicit queue.
    ///
    /// Synthesizers talking to the same backend must share one queue, otherwise their
    /// switches are not serialized against each other.
    pub fn with_switcher(backend: Arc<dyn TtsBackend>, switcher: ModelSwitchSerializer) -> Self {
        Self {
            backend,
            switcher,
            last_applied: ArcSwapOption::empty(),
            guard: SwitchGuard::default(),
            switch_lock: tokio::sync::Mutex::new(()),
            audio: AudioStore::new(),
        }
    }

    pub fn from_config(config: SovitsConfig) -> Result<Self> {
        let backend = HttpBackend::builder().config(config).build()?;
        Self::new(Arc::new(backend))
    }

    pub fn with_guard(mut self, guard: SwitchGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Synthesize `text` with `voice`, switching backend models only if they changed.
    ///
    /// `tag` only labels log lines. The returned handle stays valid until
    /// [`release`](Self::release) is called.
    pub async fn generate(
        &self,
        voice: &VoiceConfig,
        text: &str,
        tag: &str,
    ) -> Result<AudioHandle> {
        let span = info_span!("generate", tag = %tag);
        async {
            match self.run_generate(voice, text).await {
                Ok(handle) => {
                    debug!(stage = ?GenerationStage::Done);
                    Ok(handle)
                }
                Err(e) => {
                    debug!(stage = ?GenerationStage::Failed);
                    error!("voice generation failed: {}", e);
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_generate(&self, voice: &VoiceConfig, text: &str) -> Result<AudioHandle> {
        debug!(stage = ?GenerationStage::Validating);
        let text = validate(voice, text)?;
        info!(
            chars = text.chars().count(),
            preview = %preview(&text),
            "generating audio"
        );

        self.ensure_models(&voice.models).await?;

        debug!(stage = ?GenerationStage::BuildingPayload);
        let request = TtsRequest::from_voice(voice, text);

        debug!(stage = ?GenerationStage::AwaitingSynthesis);
        let data = self.backend.synthesize(&request).await?;
        info!(bytes = data.len(), "audio generated");

        Ok(self.audio.insert(AudioClip {
            data,
            format: request.media_type,
        }))
    }

    async fn ensure_models(&self, selection: &ModelSelection) -> Result<()> {
        match self.guard {
            SwitchGuard::Optimistic => self.switch_if_changed(selection).await,
            SwitchGuard::Exclusive => {
                let _held = self.switch_lock.lock().await;
                self.switch_if_changed(selection).await
            }
        }
    }

    async fn switch_if_changed(&self, selection: &ModelSelection) -> Result<()> {
        if self.last_applied.load_full().as_deref() == Some(selection) {
            debug!(%selection, "using cached models");
            return Ok(());
        }
        debug!(stage = ?GenerationStage::SwitchingModel, %selection);
        self.switcher.switch(selection.clone()).await?;
        self.last_applied.store(Some(Arc::new(selection.clone())));
        Ok(())
    }

    /// The request `generate` would send for this voice and text.
    pub fn build_request(&self, voice: &VoiceConfig, text: &str) -> TtsRequest {
        TtsRequest::from_voice(voice, text.trim())
    }

    /// Most recent successfully applied model pair.
    pub fn last_applied(&self) -> Option<ModelSelection> {
        self.last_applied.load_full().map(|s| (*s).clone())
    }

    /// Forget the cached model pair so the next `generate` switches unconditionally.
    pub fn invalidate_model_cache(&self) {
        self.last_applied.store(None);
    }

    pub fn audio(&self, handle: &AudioHandle) -> Option<AudioClip> {
        self.audio.get(handle)
    }

    pub fn release(&self, handle: &AudioHandle) -> bool {
        self.audio.release(handle)
    }

    pub fn audio_store(&self) -> &AudioStore {
        &self.audio
    }

    pub fn switcher(&self) -> &ModelSwitchSerializer {
        &self.switcher
    }

    pub fn guard(&self) -> SwitchGuard {
        self.guard
    }
}

/// Check required fields and return the trimmed text.
fn validate(voice: &VoiceConfig, text: &str) -> Result<String> {
    let required = [
        ("voice.ref_audio_path", voice.ref_audio_path.as_str()),
        ("voice.models.gpt_model_id", voice.models.gpt_model_id.as_str()),
        ("voice.models.sovits_model_id", voice.models.sovits_model_id.as_str()),
        ("text", text),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(Error::validation_with_context(
                "Missing required parameters for voice generation",
                ErrorContext::new()
                    .with_field_path(field)
                    .with_source("voice_synthesizer"),
            ));
        }
    }
    Ok(text.trim().to_string())
}

fn preview(text: &str) -> String {
    const MAX: usize = 100;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let head: String = text.chars().take(MAX).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice() -> VoiceConfig {
        VoiceConfig::new("ref.wav", ModelSelection::new("g.ckpt", "s.pth"))
    }

    #[test]
    fn test_validate_trims() {
        assert_eq!(validate(&voice(), "  hello \n").unwrap(), "hello");
    }

    #[test]
    fn test_validate_reports_field() {
        let mut v = voice();
        v.models.sovits_model_id.clear();
        let err = validate(&v, "hi").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("voice.models.sovits_model_id")
        );

        let err = validate(&voice(), "   ").unwrap_err();
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("text")
        );
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(150);
        let p = preview(&long);
        assert_eq!(p.chars().count(), 103);
        assert!(p.ends_with("..."));
        assert_eq!(preview("short"), "short");
    }
}
