pub mod config;
pub mod error;
pub mod html;
pub mod http;
pub mod links;
pub mod manager;
pub mod paths;
pub mod pipeline;
pub mod provider;
pub mod text;
pub mod track;

#[cfg(any(test, feature = "test-util"))]
pub mod test_utils;

pub use config::{
    build_config_template, HttpConfig, LogosConfig, LyricsConfig, LyricsProviderType,
    ProvidersConfig, SearchEngineConfig,
};

/// Re-export toml error type for config parsing error handling
pub use toml::de::Error as TomlParseError;
pub use error::{CoreError, Result};
pub use http::HttpClient;
pub use manager::{merge_results, LyricsManager, SearchOutcome};
pub use paths::{config_dir, config_path, CONFIG_DIR_NAME, CONFIG_FILE_NAME};
pub use pipeline::{FallbackPipeline, SearchEngine, SongRef, SongSite};
pub use provider::LyricsProvider;
pub use track::{ArtistGroup, DedupKey, Track};

/// Re-exported so provider crates name the same `Html`/`Url` types the
/// pipeline traits use.
pub use scraper::Html;
pub use url::Url;
