//! BigLyrics.net provider.
//!
//! BigLyrics' own search is unreliable, so discovery goes straight to the
//! search engines and keeps links shaped like `/{artist}_lyrics/{song}.html`.

pub mod config;

use async_trait::async_trait;
use logos_core::html::extract_lyrics;
use logos_core::links::{
    id_on_domain, path_segments, site_base_url, strip_suffix_ignore_case,
};
use logos_core::text::{humanize_slug, UNDERSCORE};
use logos_core::{
    http::browser_headers, CoreError, FallbackPipeline, HttpClient, HttpConfig, LogosConfig,
    LyricsProvider, SearchEngine, SongRef, SongSite, Track, Url,
};
use tracing::warn;

pub use config::{BigLyricsConfig, CONFIG_TEMPLATE, PROVIDER_NAME};

const SITE_DOMAIN: &str = "biglyrics.net";
const LYRICS_SELECTORS: &[&str] = &["div#lyric > div", "#lyric"];

/// BigLyrics.net lyrics provider
pub struct BigLyricsProvider {
    site: BigLyricsSite,
    pipeline: FallbackPipeline,
    lyrics_http: HttpClient,
}

impl BigLyricsProvider {
    /// Create the provider from the application config.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider section is malformed or an HTTP client
    /// cannot be created.
    pub fn new(config: &LogosConfig) -> Result<Self, CoreError> {
        let provider_config = BigLyricsConfig::from_providers(&config.providers)?;
        let engines = SearchEngine::from_config(&config.search_engines)?;
        Self::with_settings(&provider_config.base_url, &config.http, engines)
    }

    /// Create the provider with explicit search engines.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an http(s) URL or an HTTP client
    /// cannot be created.
    pub fn with_settings(
        base_url: &str,
        http: &HttpConfig,
        engines: Vec<SearchEngine>,
    ) -> Result<Self, CoreError> {
        let base_url = site_base_url(PROVIDER_NAME, base_url)?;
        let headers = browser_headers(&format!("{}/", base_url.as_str().trim_end_matches('/')))?;

        Ok(Self {
            site: BigLyricsSite { base_url },
            pipeline: FallbackPipeline::new(
                HttpClient::for_search(http, headers.clone())?,
                engines,
            ),
            lyrics_http: HttpClient::for_lyrics(http, headers)?,
        })
    }
}

#[async_trait]
impl LyricsProvider for BigLyricsProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn search(&self, term: &str) -> Result<Vec<Track>, CoreError> {
        if term.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.pipeline.search(&self.site, term).await)
    }

    async fn fetch_lyrics(&self, track_id: &str) -> Result<String, CoreError> {
        match self.lyrics_http.get_text(track_id).await {
            Ok(body) => Ok(extract_lyrics(&body, LYRICS_SELECTORS)),
            Err(e) => {
                warn!("BigLyrics page {} unavailable: {}", track_id, e);
                Ok(String::new())
            }
        }
    }

    fn can_handle(&self, track_id: &str) -> bool {
        id_on_domain(track_id, SITE_DOMAIN)
    }
}

struct BigLyricsSite {
    base_url: Url,
}

impl SongSite for BigLyricsSite {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn site_domain(&self) -> &str {
        SITE_DOMAIN
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn search_url(&self, _term: &str) -> Option<String> {
        None
    }

    /// `/{artist}_lyrics/{song}.html`, e.g. `/frank_sinatra_lyrics/my_way.html`
    fn song_page(&self, url: &Url) -> Option<SongRef> {
        if !self.is_own_link(url) {
            return None;
        }
        let segments = path_segments(url)?;
        let [folder, file] = segments.as_slice() else {
            return None;
        };
        let artist = strip_suffix_ignore_case(folder, "_lyrics")?;
        let song = strip_suffix_ignore_case(file, ".html")?;
        SongRef::new(
            humanize_slug(artist, UNDERSCORE),
            humanize_slug(song, UNDERSCORE),
        )
    }
}
