use crate::types::ModelSlot;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path that caused the error (e.g., "voice.ref_audio_path", "config.base_url")
    pub field_path: Option<String>,
    /// Additional context about the error
    pub details: Option<String>,
    /// Source of the error (e.g., "switch_queue", "http_backend")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the client.
///
/// `Validation`, `Switch` and `Synthesis` are the three failure classes a caller of
/// [`VoiceSynthesizer::generate`](crate::VoiceSynthesizer::generate) should expect;
/// the rest cover transport and local setup problems.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Failed to switch {slot} model: {message}")]
    Switch { slot: ModelSlot, message: String },

    #[error("TTS generation failed (HTTP {status}): {message}")]
    Synthesis { status: u16, message: String },

    #[error("Network error: {message}{}", format_context(.context))]
    Network {
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Runtime error: {message}{}", format_context(.context))]
    Runtime {
        message: String,
        context: ErrorContext,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::validation_with_context(msg, ErrorContext::new())
    }

    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::configuration_with_context(msg, ErrorContext::new())
    }

    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn network_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Network {
            message: msg.into(),
            context,
        }
    }

    pub fn runtime_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Runtime {
            message: msg.into(),
            context,
        }
    }

    pub fn switch(slot: ModelSlot, msg: impl Into<String>) -> Self {
        Error::Switch {
            slot,
            message: msg.into(),
        }
    }

    pub fn synthesis(status: u16, msg: impl Into<String>) -> Self {
        Error::Synthesis {
            status,
            message: msg.into(),
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Validation { context, .. }
            | Error::Network { context, .. }
            | Error::Configuration { context, .. }
            | Error::Runtime { context, .. } => Some(context),
            _ => None,
        }
    }

    /// True when the failure happened before any request left the process.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    /// Slot whose weight update failed, for switch errors.
    pub fn failed_slot(&self) -> Option<ModelSlot> {
        match self {
            Error::Switch { slot, .. } => Some(*slot),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_is_rendered() {
        let err = Error::validation_with_context(
            "reference audio is required",
            ErrorContext::new()
                .with_field_path("voice.ref_audio_path")
                .with_source("voice_synthesizer"),
        );
        let msg = err.to_string();
        assert!(msg.starts_with("Validation error: reference audio is required"));
        assert!(msg.contains("field: voice.ref_audio_path"));
        assert!(msg.contains("source: voice_synthesizer"));
        assert!(err.is_validation());
    }

    #[test]
    fn test_switch_error_names_slot() {
        let err = Error::switch(ModelSlot::Sovits, "weights not found");
        assert_eq!(
            err.to_string(),
            "Failed to switch SoVITS model: weights not found"
        );
        assert_eq!(err.failed_slot(), Some(ModelSlot::Sovits));
        assert!(err.context().is_none());
    }

    #[test]
    fn test_synthesis_error_message() {
        let err = Error::synthesis(500, "model not found");
        assert_eq!(
            err.to_string(),
            "TTS generation failed (HTTP 500): model not found"
        );
    }
}
