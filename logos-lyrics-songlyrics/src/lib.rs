//! SongLyrics.com provider.
//!
//! Songs live at `https://www.songlyrics.com/{artist-slug}/{song-slug}-lyrics/`.
//! Search runs the full fallback chain: the native result cards, then song links
//! on the same page, then DuckDuckGo and Bing `site:` searches.

pub mod config;

use async_trait::async_trait;
use logos_core::html::{element_text, extract_lyrics, selector};
use logos_core::links::{
    id_on_domain, path_segments, resolve, site_base_url, strip_suffix_ignore_case,
};
use logos_core::text::{humanize_slug, DASH};
use logos_core::{
    http::browser_headers, CoreError, FallbackPipeline, Html, HttpClient, HttpConfig,
    LogosConfig, LyricsProvider, SearchEngine, SongRef, SongSite, Track, Url,
};
use tracing::{debug, warn};

pub use config::{SongLyricsConfig, CONFIG_TEMPLATE, PROVIDER_NAME};

/// Domain used for `site:` queries
const SITE_DOMAIN: &str = "www.songlyrics.com";
/// Registrable domain accepted by `can_handle`
const HOST_DOMAIN: &str = "songlyrics.com";
const LYRICS_SELECTORS: &[&str] = &["#songLyricsDiv"];
/// Placeholder SongLyrics renders inside the lyrics container for missing songs
const MISSING_LYRICS_PREFIX: &str = "We do not have the lyrics for";

/// SongLyrics.com lyrics provider
pub struct SongLyricsProvider {
    site: SongLyricsSite,
    pipeline: FallbackPipeline,
    lyrics_http: HttpClient,
}

impl SongLyricsProvider {
    /// Create the provider from the application config.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider section is malformed or an HTTP client
    /// cannot be created.
    pub fn new(config: &LogosConfig) -> Result<Self, CoreError> {
        let provider_config = SongLyricsConfig::from_providers(&config.providers)?;
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
        let pipeline = FallbackPipeline::new(HttpClient::for_search(http, headers.clone())?, engines);
        let lyrics_http = HttpClient::for_lyrics(http, headers)?;

        Ok(Self {
            site: SongLyricsSite { base_url },
            pipeline,
            lyrics_http,
        })
    }
}

#[async_trait]
impl LyricsProvider for SongLyricsProvider {
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
        let body = match self.lyrics_http.get_text(track_id).await {
            Ok(body) => body,
            Err(e) => {
                warn!("SongLyrics page {} unavailable: {}", track_id, e);
                return Ok(String::new());
            }
        };

        let lyrics = extract_lyrics(&body, LYRICS_SELECTORS);
        if lyrics.starts_with(MISSING_LYRICS_PREFIX) {
            debug!("SongLyrics has no lyrics for {}", track_id);
            return Ok(String::new());
        }
        Ok(lyrics)
    }

    fn can_handle(&self, track_id: &str) -> bool {
        id_on_domain(track_id, HOST_DOMAIN)
    }
}

struct SongLyricsSite {
    base_url: Url,
}

impl SongSite for SongLyricsSite {
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
            "{}/index.php?section=search&searchW={}",
            self.base_url.as_str().trim_end_matches('/'),
            urlencoding::encode(term)
        ))
    }

    /// Result cards: `div.serpresult` with the song link in `h3 a` and the
    /// artist link in `p a`.
    fn parse_results(&self, document: &Html) -> Vec<Track> {
        let (Some(cards), Some(title_link), Some(artist_link)) =
            (selector("div.serpresult"), selector("h3 a"), selector("p a"))
        else {
            return Vec::new();
        };

        document
            .select(&cards)
            .filter_map(|card| {
                let title = card.select(&title_link).next()?;
                let artist = card.select(&artist_link).next()?;
                let url = resolve(&self.base_url, title.value().attr("href")?)?;
                let (title, artist) = (element_text(title), element_text(artist));
                if title.is_empty() || artist.is_empty() {
                    return None;
                }
                Some(Track::new(title, artist, url, PROVIDER_NAME))
            })
            .collect()
    }

    /// `/{artist-slug}/{song-slug}-lyrics/`
    fn song_page(&self, url: &Url) -> Option<SongRef> {
        if !self.is_own_link(url) {
            return None;
        }
        let segments = path_segments(url)?;
        let [artist, song] = segments.as_slice() else {
            return None;
        };
        let song = strip_suffix_ignore_case(song, "-lyrics")?;
        SongRef::new(humanize_slug(artist, DASH), humanize_slug(song, DASH))
    }
}
