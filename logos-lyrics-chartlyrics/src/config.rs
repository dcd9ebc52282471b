//! ChartLyrics provider configuration.

use const_format::concatcp;
use logos_core::{CoreError, ProvidersConfig};
use serde::{Deserialize, Serialize};

/// Provider name used in config file and on produced tracks
pub const PROVIDER_NAME: &str = "chartlyrics";

pub const DEFAULT_BASE_URL: &str = "http://api.chartlyrics.com/apiv1.asmx";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartLyricsConfig {
    /// API root; `SearchLyric` and `GetLyric` are appended to it
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ChartLyricsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl ChartLyricsConfig {
    /// Read `[providers.chartlyrics]`, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the section cannot be parsed.
    pub fn from_providers(providers: &ProvidersConfig) -> Result<Self, CoreError> {
        providers.get_or_default(PROVIDER_NAME)
    }
}

/// Config template for the ChartLyrics provider.
pub const CONFIG_TEMPLATE: &str = concatcp!(
    "[providers.",
    PROVIDER_NAME,
    "]\n# The API is plain HTTP only\nbase_url = \"",
    DEFAULT_BASE_URL,
    "\"\n\n"
);
