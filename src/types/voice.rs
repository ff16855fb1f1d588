//! Voice configuration and synthesis tuning knobs.

use super::model::ModelSelection;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LANG: &str = "en";
pub const DEFAULT_TOP_K: u32 = 25;
pub const DEFAULT_TOP_P: f64 = 1.0;
pub const DEFAULT_TEMPERATURE: f64 = 0.6;
pub const DEFAULT_SPEED_FACTOR: f64 = 1.0;
pub const DEFAULT_SAMPLE_STEPS: u32 = 32;
pub const DEFAULT_SUPER_SAMPLING: bool = true;
pub const DEFAULT_FRAGMENT_INTERVAL: f64 = 0.15;
pub const DEFAULT_STREAMING_MODE: bool = false;
pub const DEFAULT_PARALLEL_INFER: bool = false;
pub const DEFAULT_REPETITION_PENALTY: f64 = 1.35;

/// Everything needed to speak with one voice.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// Reference clip the backend clones the voice from (server-side path).
    #[serde(default)]
    pub ref_audio_path: String,
    pub models: ModelSelection,
    /// Transcript of the reference clip.
    #[serde(default)]
    pub prompt_text: Option<String>,
    #[serde(default)]
    pub text_lang: Option<String>,
    #[serde(default)]
    pub prompt_lang: Option<String>,
    #[serde(default)]
    pub tuning: TuningParams,
}

impl VoiceConfig {
    pub fn new(ref_audio_path: impl Into<String>, models: ModelSelection) -> Self {
        Self {
            ref_audio_path: ref_audio_path.into(),
            models,
            ..Default::default()
        }
    }

    pub fn with_prompt_text(mut self, text: impl Into<String>) -> Self {
        self.prompt_text = Some(text.into());
        self
    }

    pub fn with_text_lang(mut self, lang: impl Into<String>) -> Self {
        self.text_lang = Some(lang.into());
        self
    }

    pub fn with_prompt_lang(mut self, lang: impl Into<String>) -> Self {
        self.prompt_lang = Some(lang.into());
        self
    }

    pub fn with_tuning(mut self, tuning: TuningParams) -> Self {
        self.tuning = tuning;
        self
    }
}

/// Optional sampling / rendering parameters. `None` means "use the client default".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningParams {
    pub top_k: Option<u32>,
    pub top_p: Option<f64>,
    pub temperature: Option<f64>,
    #[serde(alias = "speed")]
    pub speed_factor: Option<f64>,
    pub text_split_method: Option<TextSplitMethod>,
    pub sample_steps: Option<u32>,
    pub super_sampling: Option<bool>,
    pub fragment_interval: Option<f64>,
    pub streaming_mode: Option<bool>,
    pub media_type: Option<MediaType>,
    pub parallel_infer: Option<bool>,
    pub repetition_penalty: Option<f64>,
}

impl TuningParams {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_top_k(mut self, k: u32) -> Self {
        self.top_k = Some(k);
        self
    }
    pub fn with_top_p(mut self, p: f64) -> Self {
        self.top_p = Some(p);
        self
    }
    pub fn with_temperature(mut self, t: f64) -> Self {
        self.temperature = Some(t);
        self
    }
    pub fn with_speed_factor(mut self, s: f64) -> Self {
        self.speed_factor = Some(s);
        self
    }
    pub fn with_text_split_method(mut self, m: TextSplitMethod) -> Self {
        self.text_split_method = Some(m);
        self
    }
    pub fn with_media_type(mut self, m: MediaType) -> Self {
        self.media_type = Some(m);
        self
    }
    pub fn with_sample_steps(mut self, steps: u32) -> Self {
        self.sample_steps = Some(steps);
        self
    }
    pub fn with_super_sampling(mut self, on: bool) -> Self {
        self.super_sampling = Some(on);
        self
    }
    pub fn with_fragment_interval(mut self, secs: f64) -> Self {
        self.fragment_interval = Some(secs);
        self
    }
    pub fn with_streaming_mode(mut self, on: bool) -> Self {
        self.streaming_mode = Some(on);
        self
    }
    pub fn with_parallel_infer(mut self, p: bool) -> Self {
        self.parallel_infer = Some(p);
        self
    }
    pub fn with_repetition_penalty(mut self, penalty: f64) -> Self {
        self.repetition_penalty = Some(penalty);
        self
    }
}

/// Sentence splitting strategies understood by api_v2.
///
/// `cut0` no split, `cut1` every four sentences, `cut2` every 50 chars,
/// `cut3` on Chinese full stops, `cut4` on English full stops, `cut5` on any punctuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSplitMethod {
    Cut0,
    Cut1,
    Cut2,
    Cut3,
    Cut4,
    #[default]
    Cut5,
}

/// Container format the backend renders audio into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Wav,
    Ogg,
    Aac,
    Raw,
}

impl MediaType {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Ogg => "audio/ogg",
            Self::Aac => "audio/aac",
            Self::Raw => "application/octet-stream",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Ogg => "ogg",
            Self::Aac => "aac",
            Self::Raw => "pcm",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_config_from_yaml() {
        let yaml = r#"
ref_audio_path: refs/narrator.wav
models:
  gpt_model_id: GPT_weights_v2/narrator-e15.ckpt
  sovits_model_id: SoVITS_weights_v2/narrator_e8_s200.pth
prompt_text: "Hello there."
tuning:
  speed: 1.1
  text_split_method: cut2
  media_type: ogg
"#;
        let cfg: VoiceConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.ref_audio_path, "refs/narrator.wav");
        assert_eq!(cfg.prompt_text.as_deref(), Some("Hello there."));
        assert_eq!(cfg.tuning.speed_factor, Some(1.1));
        assert_eq!(cfg.tuning.text_split_method, Some(TextSplitMethod::Cut2));
        assert_eq!(cfg.tuning.media_type, Some(MediaType::Ogg));
        assert_eq!(cfg.tuning.top_k, None);
        assert_eq!(cfg.text_lang, None);
    }

    #[test]
    fn test_media_type_mime() {
        assert_eq!(MediaType::Wav.mime_type(), "audio/wav");
        assert_eq!(MediaType::default(), MediaType::Wav);
        assert_eq!(TextSplitMethod::default(), TextSplitMethod::Cut5);
    }
}
