//! Backend connection settings.
//!
//! Defaults target a local GPT-SoVITS `api_v2.py` instance. Values can come from a YAML
//! file and be overridden from the environment:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `SOVITS_BASE_URL` | `base_url` |
//! | `SOVITS_TIMEOUT_SECS` | `timeout_secs` (`0` disables the timeout) |

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:9880";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SovitsConfig {
    pub base_url: String,
    pub tts_path: String,
    pub gpt_weights_path: String,
    pub sovits_weights_path: String,
    pub timeout_secs: u64,
}

impl Default for SovitsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            tts_path: "/tts".to_string(),
            gpt_weights_path: "/set_gpt_weights".to_string(),
            sovits_weights_path: "/set_sovits_weights".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl SovitsConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(
                format!("Failed to read config file: {}", e),
                ErrorContext::new().with_details(path.display().to_string()),
            )
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Apply `SOVITS_*` environment variables on top of the current values.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(url) = env::var("SOVITS_BASE_URL") {
            if !url.trim().is_empty() {
                self.base_url = url.trim().to_string();
            }
        }
        if let Ok(raw) = env::var("SOVITS_TIMEOUT_SECS") {
            self.timeout_secs = raw.trim().parse::<u64>().map_err(|_| {
                Error::configuration_with_context(
                    format!("SOVITS_TIMEOUT_SECS is not a number: {:?}", raw),
                    ErrorContext::new().with_field_path("timeout_secs"),
                )
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.base_url).map_err(|e| {
            Error::configuration_with_context(
                format!("Invalid base_url: {}", e),
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(self.base_url.clone()),
            )
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::configuration_with_context(
                format!("Unsupported scheme: {}", url.scheme()),
                ErrorContext::new().with_field_path("base_url"),
            ));
        }
        Ok(())
    }

    /// `None` when the timeout is disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Join the base URL and an endpoint path.
    pub fn endpoint(&self, path: &str) -> String {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = SovitsConfig::default();
        assert_eq!(cfg.base_url, "http://127.0.0.1:9880");
        assert_eq!(cfg.endpoint(&cfg.tts_path), "http://127.0.0.1:9880/tts");
        assert_eq!(cfg.timeout(), Some(Duration::from_secs(120)));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_endpoint_joining() {
        let cfg = SovitsConfig::new("http://host:9880/tts-api/");
        assert_eq!(
            cfg.endpoint("set_gpt_weights"),
            "http://host:9880/tts-api/set_gpt_weights"
        );
    }

    #[test]
    fn test_yaml_partial() {
        let cfg = SovitsConfig::from_yaml_str("base_url: http://gpu-box:9880\ntimeout_secs: 0\n")
            .unwrap();
        assert_eq!(cfg.base_url, "http://gpu-box:9880");
        assert_eq!(cfg.tts_path, "/tts");
        assert_eq!(cfg.timeout(), None);
    }

    #[test]
    fn test_rejects_bad_url() {
        let err = SovitsConfig::from_yaml_str("base_url: not a url").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        let err = SovitsConfig::new("ftp://host").validate().unwrap_err();
        assert!(err.to_string().contains("Unsupported scheme"));
    }

    #[test]
    fn test_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sovits.yaml");
        std::fs::write(&path, "base_url: https://tts.example.com\n").unwrap();
        let cfg = SovitsConfig::from_yaml_file(&path).unwrap();
        assert_eq!(cfg.base_url, "https://tts.example.com");

        let missing = SovitsConfig::from_yaml_file(dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(missing, Error::Configuration { .. }));
    }
}
