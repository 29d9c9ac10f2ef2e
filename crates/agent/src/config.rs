use core_types::Viewport;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    /// Max chars of the direct-text preview on a layer.
    pub text_preview_len: usize,
    /// Tags never mirrored into the layer tree.
    pub ignored_tags: Vec<String>,
    pub viewport: Viewport,
    pub publish_debounce_ms: u64,
    pub catch_up_interval_ms: u64,
    pub catch_up_attempts: u32,
    /// Pending events before the bus starts dropping.
    pub event_capacity: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            text_preview_len: 50,
            ignored_tags: ["script", "style", "link", "meta", "noscript", "template"]
                .into_iter()
                .map(String::from)
                .collect(),
            viewport: Viewport::default(),
            publish_debounce_ms: 100,
            catch_up_interval_ms: 500,
            catch_up_attempts: 10,
            event_capacity: 256,
        }
    }
}

impl AgentConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn is_ignored_tag(&self, tag: &str) -> bool {
        self.ignored_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn publish_debounce(&self) -> Duration {
        Duration::from_millis(self.publish_debounce_ms)
    }

    pub fn catch_up_interval(&self) -> Duration {
        Duration::from_millis(self.catch_up_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(AgentConfig::from_toml_str("").unwrap(), AgentConfig::default());
    }

    #[test]
    fn partial_file_overrides_named_keys() {
        let cfg = AgentConfig::from_toml_str(
            "text_preview_len = 8\n[viewport]\nwidth = 640.0\nheight = 480.0\n",
        )
        .unwrap();
        assert_eq!(cfg.text_preview_len, 8);
        assert_eq!(cfg.viewport.width, 640.0);
        assert_eq!(cfg.catch_up_attempts, 10);
        assert!(cfg.is_ignored_tag("SCRIPT"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = AgentConfig::from_toml_str("text_preview = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
