//! Model pair identifiers for the two loadable backend slots.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The pair of weight files that together make up a voice on the backend.
///
/// Compared structurally; two selections naming the same files are the same voice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ModelSelection {
    /// GPT (semantic / language) weights, usually a `.ckpt` path.
    #[serde(alias = "gpt_model")]
    pub gpt_model_id: String,
    /// SoVITS (acoustic / timbre) weights, usually a `.pth` path.
    #[serde(alias = "sovits_model")]
    pub sovits_model_id: String,
}

impl ModelSelection {
    pub fn new(gpt_model_id: impl Into<String>, sovits_model_id: impl Into<String>) -> Self {
        Self {
            gpt_model_id: gpt_model_id.into(),
            sovits_model_id: sovits_model_id.into(),
        }
    }

    /// Weights id for the given slot.
    pub fn id_for(&self, slot: ModelSlot) -> &str {
        match slot {
            ModelSlot::Gpt => &self.gpt_model_id,
            ModelSlot::Sovits => &self.sovits_model_id,
        }
    }
}

impl fmt::Display for ModelSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gpt={} sovits={}", self.gpt_model_id, self.sovits_model_id)
    }
}

/// One of the two independently loadable model artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelSlot {
    Gpt,
    Sovits,
}

impl ModelSlot {
    /// Slots in the order a switch applies them.
    pub const SWITCH_ORDER: [ModelSlot; 2] = [ModelSlot::Gpt, ModelSlot::Sovits];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gpt => "gpt",
            Self::Sovits => "sovits",
        }
    }
}

impl fmt::Display for ModelSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpt => f.write_str("GPT"),
            Self::Sovits => f.write_str("SoVITS"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        let a = ModelSelection::new("GPT_weights/a.ckpt", "SoVITS_weights/a.pth");
        let b = ModelSelection::new("GPT_weights/a.ckpt", "SoVITS_weights/a.pth");
        let c = ModelSelection::new("GPT_weights/a.ckpt", "SoVITS_weights/b.pth");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_slot_names() {
        assert_eq!(ModelSlot::Gpt.as_str(), "gpt");
        assert_eq!(ModelSlot::Sovits.to_string(), "SoVITS");
    }

    #[test]
    fn test_id_for_slot() {
        let sel = ModelSelection::new("g.ckpt", "s.pth");
        assert_eq!(sel.id_for(ModelSlot::Gpt), "g.ckpt");
        assert_eq!(sel.id_for(ModelSlot::Sovits), "s.pth");
        assert_eq!(ModelSlot::SWITCH_ORDER, [ModelSlot::Gpt, ModelSlot::Sovits]);
    }

    #[test]
    fn test_accepts_short_field_names() {
        let sel: ModelSelection =
            serde_json::from_str(r#"{"gpt_model":"g.ckpt","sovits_model":"s.pth"}"#).unwrap();
        assert_eq!(sel, ModelSelection::new("g.ckpt", "s.pth"));
    }
}
