//! Configuration model loaded from external sources.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::{DEFAULT_DEBOUNCE_MS, DEFAULT_PAGE_SIZE, DEFAULT_SEARCH_KEY};

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(default)]
/// Behaviour shared by every list screen.
pub struct ListSettings {
    /// Quiet period after the last keystroke before a search is committed.
    #[validate(range(max = 10000))]
    pub debounce_ms: u64,
    #[validate(range(min = 1, max = 1000))]
    pub default_page_size: usize,
    /// Query parameter carrying the search term.
    #[validate(length(min = 1))]
    pub search_key: String,
    /// Choices offered by the page size selector.
    #[validate(length(min = 1))]
    pub page_sizes: Vec<usize>,
    #[validate(nested)]
    pub page_strip: PageStripSettings,
}

impl ListSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            default_page_size: DEFAULT_PAGE_SIZE,
            search_key: DEFAULT_SEARCH_KEY.to_string(),
            page_sizes: vec![10, 20, 50, 100],
            page_strip: PageStripSettings::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Validate, PartialEq, Eq)]
#[serde(default)]
/// How many page links surround the edges and the current page.
pub struct PageStripSettings {
    #[validate(range(max = 10))]
    pub left_edge: usize,
    #[validate(range(max = 10))]
    pub left_current: usize,
    #[validate(range(max = 10))]
    pub right_current: usize,
    #[validate(range(max = 10))]
    pub right_edge: usize,
}

impl Default for PageStripSettings {
    fn default() -> Self {
        Self {
            left_edge: 2,
            left_current: 2,
            right_current: 4,
            right_edge: 2,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(default)]
/// Top-level configuration of the console's list layer.
pub struct ConsoleConfig {
    #[validate(nested)]
    pub lists: ListSettings,
}

impl ConsoleConfig {
    /// Loads `config/default.yaml`, the optional `config/{app_env}.yaml`
    /// overrides and `APP_*` environment variables.
    #[cfg(feature = "cli")]
    pub fn load(app_env: &str) -> Result<Self, ConfigError> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name("config/default"))
            .add_source(::config::File::with_name(&format!("config/{app_env}")).required(false))
            .add_source(::config::Environment::with_prefix("APP").separator("__"))
            .build()?;
        settings.try_deserialize::<ConsoleConfig>()?.validated()
    }

    pub fn validated(self) -> Result<Self, ConfigError> {
        self.validate()?;
        Ok(self)
    }
}

#[derive(Debug, Error)]
/// Errors raised while loading the console configuration.
pub enum ConfigError {
    #[cfg(feature = "cli")]
    #[error("failed to load settings: {0}")]
    Source(#[from] ::config::ConfigError),

    #[error("invalid settings: {0}")]
    Invalid(#[from] ValidationErrors),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ConsoleConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.lists.debounce(), Duration::from_millis(300));
        assert_eq!(config.lists.search_key, "key");
    }

    #[test]
    fn partial_documents_fill_in_defaults() {
        let config: ConsoleConfig =
            serde_json::from_str(r#"{"lists":{"default_page_size":20}}"#).unwrap();
        assert_eq!(config.lists.default_page_size, 20);
        assert_eq!(config.lists.debounce_ms, 300);
        assert_eq!(config.lists.page_strip, PageStripSettings::default());
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let config: ConsoleConfig =
            serde_json::from_str(r#"{"lists":{"default_page_size":0}}"#).unwrap();
        assert!(matches!(config.validated(), Err(ConfigError::Invalid(_))));
    }
}
