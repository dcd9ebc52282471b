//! LyricsFreak.com provider.
//!
//! The native search page has no usable result cards, so discovery scans it for
//! song links (`/{letter}/{artist}/{title}_{id}.html`) before falling back to
//! the search engines.

pub mod config;

use async_trait::async_trait;
use logos_core::html::extract_lyrics;
use logos_core::links::{
    id_on_domain, path_segments, site_base_url, strip_suffix_ignore_case,
};
use logos_core::text::{humanize_slug, PLUS_OR_DASH};
use logos_core::{
    http::browser_headers, CoreError, FallbackPipeline, HttpClient, HttpConfig, LogosConfig,
    LyricsProvider, SearchEngine, SongRef, SongSite, Track, Url,
};
use tracing::warn;

pub use config::{LyricsFreakConfig, CONFIG_TEMPLATE, PROVIDER_NAME};

const SITE_DOMAIN: &str = "www.lyricsfreak.com";
const HOST_DOMAIN: &str = "lyricsfreak.com";
const LYRICS_SELECTORS: &[&str] = &["div#content.lyrictxt", ".js-lyrics"];

/// LyricsFreak.com lyrics provider
pub struct LyricsFreakProvider {
    site: LyricsFreakSite,
    pipeline: FallbackPipeline,
    lyrics_http: HttpClient,
}

impl LyricsFreakProvider {
    /// Create the provider from the application config.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider section is malformed or an HTTP client
    /// cannot be created.
    pub fn new(config: &LogosConfig) -> Result<Self, CoreError> {
        let provider_config = LyricsFreakConfig::from_providers(&config.providers)?;
        let engines = SearchEngine::from_config(&config.search_engines)?;
        Self::with_settings(&provider_config.base_url, &config.http, engines)
    }

    /// Create the provider against an explicit site root and search engines.
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
            site: LyricsFreakSite { base_url },
            pipeline: FallbackPipeline::new(
                HttpClient::for_search(http, headers.clone())?,
                engines,
            ),
            lyrics_http: HttpClient::for_lyrics(http, headers)?,
        })
    }
}

#[async_trait]
impl LyricsProvider for LyricsFreakProvider {
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
                warn!("LyricsFreak page {} unavailable: {}", track_id, e);
                Ok(String::new())
            }
        }
    }

    fn can_handle(&self, track_id: &str) -> bool {
        id_on_domain(track_id, HOST_DOMAIN)
    }
}

struct LyricsFreakSite {
    base_url: Url,
}

impl SongSite for LyricsFreakSite {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn site_domain(&self) -> &str {
        SITE_DOMAIN
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn search_url(&self, term: &str) -> Option<String> {
        Some(format!(
            "{}/search.php?a=search&type=song&q={}",
            self.base_url.as_str().trim_end_matches('/'),
            urlencoding::encode(term)
        ))
    }

    /// `/{letter}/{artist-slug}/{title-slug}_{digits}.html`, e.g.
    /// `/q/queen/bohemian+rhapsody_20112599.html`
    fn song_page(&self, url: &Url) -> Option<SongRef> {
        if !self.is_own_link(url) {
            return None;
        }
        let segments = path_segments(url)?;
        let [letter, artist, file] = segments.as_slice() else {
            return None;
        };
        if !is_index_letter(letter) {
            return None;
        }
        let stem = strip_suffix_ignore_case(file, ".html")?;
        let (_, song_id) = stem.rsplit_once('_')?;
        if song_id.is_empty() || !song_id.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        // The slug before the first `_` is the title.
        let title = stem.split('_').next()?;
        SongRef::new(
            humanize_slug(artist, PLUS_OR_DASH),
            humanize_slug(title, PLUS_OR_DASH),
        )
    }
}

fn is_index_letter(segment: &str) -> bool {
    let mut chars = segment.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_alphanumeric())
}
