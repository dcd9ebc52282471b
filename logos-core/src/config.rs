use crate::error::{CoreError, Result};
use crate::links::parse_web_url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogosConfig {
    #[serde(default)]
    pub lyrics: LyricsConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub search_engines: SearchEngineConfig,
    /// Free-form per-provider tables; each provider crate reads its own section
    #[serde(default)]
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LyricsConfig {
    /// Registration order: search results merge in this order and
    /// `fetch_lyrics` routes to the first provider that claims an id
    #[serde(default = "default_providers")]
    pub providers: Vec<LyricsProviderType>,
    /// Optional deadline applied uniformly to every provider task of a search
    #[serde(default)]
    pub search_deadline_ms: Option<u64>,
}

fn default_providers() -> Vec<LyricsProviderType> {
    vec![
        LyricsProviderType::Songlyrics,
        LyricsProviderType::Lyricsfreak,
        LyricsProviderType::Biglyrics,
        LyricsProviderType::Chartlyrics,
    ]
}

impl Default for LyricsConfig {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            search_deadline_ms: None,
        }
    }
}

impl LyricsConfig {
    #[must_use]
    pub fn search_deadline(&self) -> Option<Duration> {
        self.search_deadline_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LyricsProviderType {
    Songlyrics,
    Lyricsfreak,
    Biglyrics,
    Chartlyrics,
}

impl LyricsProviderType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Songlyrics => "songlyrics",
            Self::Lyricsfreak => "lyricsfreak",
            Self::Biglyrics => "biglyrics",
            Self::Chartlyrics => "chartlyrics",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
    /// Read budget for search requests
    #[serde(default = "default_read_timeout")]
    pub read_timeout_ms: u64,
    /// Read budget for lyrics page requests
    #[serde(default = "default_lyrics_read_timeout")]
    pub lyrics_read_timeout_ms: u64,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Retries for transient failures (exponential backoff). Each retry can add a
    /// full timeout to a provider's latency.
    #[serde(default)]
    pub max_retries: u32,
}

const fn default_connect_timeout() -> u64 {
    5000
}

const fn default_read_timeout() -> u64 {
    6000
}

const fn default_lyrics_read_timeout() -> u64 {
    10000
}

const fn default_max_redirects() -> usize {
    5
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout(),
            read_timeout_ms: default_read_timeout(),
            lyrics_read_timeout_ms: default_lyrics_read_timeout(),
            max_redirects: default_max_redirects(),
            max_retries: 0,
        }
    }
}

impl HttpConfig {
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    #[must_use]
    pub const fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    #[must_use]
    pub const fn lyrics_read_timeout(&self) -> Duration {
        Duration::from_millis(self.lyrics_read_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchEngineConfig {
    #[serde(default = "default_duckduckgo_url")]
    pub duckduckgo_url: String,
    #[serde(default = "default_bing_url")]
    pub bing_url: String,
}

fn default_duckduckgo_url() -> String {
    "https://duckduckgo.com/html/".to_string()
}

fn default_bing_url() -> String {
    "https://www.bing.com/search".to_string()
}

impl Default for SearchEngineConfig {
    fn default() -> Self {
        Self {
            duckduckgo_url: default_duckduckgo_url(),
            bing_url: default_bing_url(),
        }
    }
}

/// Per-provider configuration sections (`[providers.<name>]`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProvidersConfig(BTreeMap<String, toml::Value>);

impl ProvidersConfig {
    /// Deserialize the section for `name`, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the section does not match the provider's config type.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let Some(value) = self.0.get(name) else {
            return Ok(None);
        };
        let section: T = value.clone().try_into()?;
        Ok(Some(section))
    }

    /// Deserialize the section for `name`, or the type's default when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the section does not match the provider's config type.
    pub fn get_or_default<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T> {
        Ok(self.get(name)?.unwrap_or_default())
    }
}

impl LogosConfig {
    /// Get the config file path (~/.config/logos/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        crate::paths::config_path()
    }

    /// Load the default config file, writing a template first if there is none.
    ///
    /// `provider_templates` are appended to the base template so every registered
    /// provider documents its own section.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, written, parsed or validated.
    pub fn load_or_create(provider_templates: &[&str]) -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let template = build_config_template(provider_templates);
            fs::write(&config_path, &template)?;
            tracing::info!("Wrote config template to {}", config_path.display());
            return Self::from_toml_str(&template);
        }

        Self::load(&config_path)
    }

    /// Load an explicit config file.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigNotFound`] if the file does not exist, or an
    /// error if it cannot be parsed or validated.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate config text.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or fails validation.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigInvalid`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.lyrics.providers.is_empty() {
            return Err(invalid("lyrics.providers must name at least one provider"));
        }
        let mut seen = HashSet::new();
        for provider in &self.lyrics.providers {
            if !seen.insert(provider) {
                return Err(invalid(format!(
                    "lyrics.providers lists {} more than once",
                    provider.as_str()
                )));
            }
        }
        if self.lyrics.search_deadline_ms == Some(0) {
            return Err(invalid("lyrics.search_deadline_ms must be greater than 0"));
        }
        for (field, value) in [
            ("http.connect_timeout_ms", self.http.connect_timeout_ms),
            ("http.read_timeout_ms", self.http.read_timeout_ms),
            ("http.lyrics_read_timeout_ms", self.http.lyrics_read_timeout_ms),
        ] {
            if value == 0 {
                return Err(invalid(format!("{field} must be greater than 0")));
            }
        }
        for (field, value) in [
            ("search_engines.duckduckgo_url", &self.search_engines.duckduckgo_url),
            ("search_engines.bing_url", &self.search_engines.bing_url),
        ] {
            if parse_web_url(value).is_none() {
                return Err(invalid(format!("{field} is not an http(s) URL: {value}")));
            }
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> CoreError {
    CoreError::ConfigInvalid {
        message: message.into(),
    }
}

/// Base template followed by each provider's section.
#[must_use]
pub fn build_config_template(provider_templates: &[&str]) -> String {
    let mut template = CONFIG_TEMPLATE.to_string();
    for section in provider_templates {
        template.push_str(section);
    }
    template
}

const CONFIG_TEMPLATE: &str = r#"# Logos Configuration
# ~/.config/logos/config.toml

[lyrics]
# Registration order matters: search results are merged in this order and
# lyrics requests go to the first provider that recognises the track id.
# Available: "songlyrics", "lyricsfreak", "biglyrics", "chartlyrics"
providers = ["songlyrics", "lyricsfreak", "biglyrics", "chartlyrics"]
# Optional deadline (ms) applied to every provider during a search
# search_deadline_ms = 15000

[http]
connect_timeout_ms = 5000
read_timeout_ms = 6000
lyrics_read_timeout_ms = 10000
max_redirects = 5
# Retries with exponential backoff; each retry may add a full timeout
max_retries = 0

[search_engines]
duckduckgo_url = "https://duckduckgo.com/html/"
bing_url = "https://www.bing.com/search"

"#;
