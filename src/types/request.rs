//! Wire payload for `POST /tts`.

use super::voice::*;
use serde::{Deserialize, Serialize};

/// Fully defaulted synthesis request. Field names match the api_v2 wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TtsRequest {
    pub text: String,
    pub text_lang: String,
    pub ref_audio_path: String,
    pub prompt_lang: String,
    pub prompt_text: String,
    pub top_k: u32,
    pub top_p: f64,
    pub temperature: f64,
    pub speed_factor: f64,
    pub text_split_method: TextSplitMethod,
    pub sample_steps: u32,
    pub super_sampling: bool,
    pub fragment_interval: f64,
    pub streaming_mode: bool,
    pub media_type: MediaType,
    pub parallel_infer: bool,
    pub repetition_penalty: f64,
}

impl TtsRequest {
    /// Map a voice config plus already-normalized text onto the wire payload.
    pub fn from_voice(voice: &VoiceConfig, text: impl Into<String>) -> Self {
        let t = &voice.tuning;
        Self {
            text: text.into(),
            text_lang: non_empty_or(voice.text_lang.as_deref(), DEFAULT_LANG),
            ref_audio_path: voice.ref_audio_path.clone(),
            prompt_lang: non_empty_or(voice.prompt_lang.as_deref(), DEFAULT_LANG),
            prompt_text: voice.prompt_text.clone().unwrap_or_default(),
            top_k: t.top_k.unwrap_or(DEFAULT_TOP_K),
            top_p: t.top_p.unwrap_or(DEFAULT_TOP_P),
            temperature: t.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            speed_factor: t.speed_factor.unwrap_or(DEFAULT_SPEED_FACTOR),
            text_split_method: t.text_split_method.unwrap_or_default(),
            sample_steps: t.sample_steps.unwrap_or(DEFAULT_SAMPLE_STEPS),
            super_sampling: t.super_sampling.unwrap_or(DEFAULT_SUPER_SAMPLING),
            fragment_interval: t.fragment_interval.unwrap_or(DEFAULT_FRAGMENT_INTERVAL),
            streaming_mode: t.streaming_mode.unwrap_or(DEFAULT_STREAMING_MODE),
            media_type: t.media_type.unwrap_or_default(),
            parallel_infer: t.parallel_infer.unwrap_or(DEFAULT_PARALLEL_INFER),
            repetition_penalty: t.repetition_penalty.unwrap_or(DEFAULT_REPETITION_PENALTY),
        }
    }
}

// Empty language codes fall back too, the backend rejects "".
fn non_empty_or(value: Option<&str>, default: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ModelSelection;

    #[test]
    fn test_defaults_on_wire() {
        let voice = VoiceConfig::new("ref.wav", ModelSelection::new("g.ckpt", "s.pth"));
        let req = TtsRequest::from_voice(&voice, "Hello");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "text": "Hello",
                "text_lang": "en",
                "ref_audio_path": "ref.wav",
                "prompt_lang": "en",
                "prompt_text": "",
                "top_k": 25,
                "top_p": 1.0,
                "temperature": 0.6,
                "speed_factor": 1.0,
                "text_split_method": "cut5",
                "sample_steps": 32,
                "super_sampling": true,
                "fragment_interval": 0.15,
                "streaming_mode": false,
                "media_type": "wav",
                "parallel_infer": false,
                "repetition_penalty": 1.35,
            })
        );
    }

    #[test]
    fn test_overrides_are_kept() {
        let voice = VoiceConfig::new("ref.wav", ModelSelection::new("g", "s"))
            .with_text_lang("ja")
            .with_prompt_lang("zh")
            .with_prompt_text("prompt")
            .with_tuning(
                TuningParams::new()
                    .with_top_k(5)
                    .with_top_p(0.8)
                    .with_temperature(1.0)
                    .with_parallel_infer(true)
                    .with_media_type(MediaType::Ogg),
            );
        let req = TtsRequest::from_voice(&voice, "x");
        assert_eq!(req.text_lang, "ja");
        assert_eq!(req.prompt_lang, "zh");
        assert_eq!(req.prompt_text, "prompt");
        assert_eq!(req.top_k, 5);
        assert_eq!(req.top_p, 0.8);
        assert_eq!(req.temperature, 1.0);
        assert!(req.parallel_infer);
        assert_eq!(req.media_type, MediaType::Ogg);
        assert_eq!(req.sample_steps, DEFAULT_SAMPLE_STEPS);
    }

    #[test]
    fn test_render_overrides_reach_the_wire() {
        let voice = VoiceConfig::new("ref.wav", ModelSelection::new("g", "s")).with_tuning(
            TuningParams::new()
                .with_sample_steps(8)
                .with_super_sampling(false)
                .with_fragment_interval(0.3)
                .with_streaming_mode(true)
                .with_repetition_penalty(1.1),
        );
        let json = serde_json::to_value(TtsRequest::from_voice(&voice, "x")).unwrap();
        assert_eq!(json["sample_steps"], 8);
        assert_eq!(json["super_sampling"], false);
        assert_eq!(json["fragment_interval"], 0.3);
        assert_eq!(json["streaming_mode"], true);
        assert_eq!(json["repetition_penalty"], 1.1);
    }
}
