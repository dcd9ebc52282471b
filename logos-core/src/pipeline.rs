//! Fallback discovery chain for providers that can only be scraped.
//!
//! Stages run in order and the first non-empty stage wins:
//!
//! * A: the provider's native search page, parsed with its result-card markup
//! * B: every link on that same page matching the provider's song-page shape
//! * C: a `site:` query on the first search engine, unwrapping redirect links
//! * D: the same query on the next search engine
//!
//! A failing stage (timeout, connection error, bad status) contributes nothing
//! and the chain moves on.

use scraper::Html;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::SearchEngineConfig;
use crate::error::{CoreError, Result};
use crate::html::collect_hrefs;
use crate::http::HttpClient;
use crate::links::{host_matches, parse_web_url, resolve, unwrap_redirect};
use crate::track::Track;

/// Artist and title recovered from a song page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongRef {
    pub artist: String,
    pub title: String,
}

impl SongRef {
    /// `None` if either part is blank.
    #[must_use]
    pub fn new(artist: String, title: String) -> Option<Self> {
        (!artist.trim().is_empty() && !title.trim().is_empty()).then_some(Self { artist, title })
    }
}

/// What a scraping provider tells the pipeline about its site.
pub trait SongSite: Send + Sync {
    /// Provider name stamped on produced tracks
    fn name(&self) -> &'static str;

    /// Domain used in `site:` queries (e.g. `www.songlyrics.com`)
    fn site_domain(&self) -> &str;

    /// Base URL relative links on the native search page resolve against
    fn base_url(&self) -> &Url;

    /// Native search URL, or `None` if the site has no usable search
    fn search_url(&self, term: &str) -> Option<String>;

    /// Stage A: structured results from the native search page
    fn parse_results(&self, _document: &Html) -> Vec<Track> {
        Vec::new()
    }

    /// Recognize a canonical song page URL
    fn song_page(&self, url: &Url) -> Option<SongRef>;

    /// Whether `url` is on this provider's site
    fn is_own_link(&self, url: &Url) -> bool {
        host_matches(url, self.site_domain())
            || (url.host_str().is_some() && url.host_str() == self.base_url().host_str())
    }
}

/// A web search engine used for `site:` discovery.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    pub name: &'static str,
    endpoint: Url,
    extra_query: &'static [(&'static str, &'static str)],
    /// Query parameter carrying the destination in the engine's redirect links
    redirect_param: Option<&'static str>,
}

impl SearchEngine {
    /// DuckDuckGo's HTML endpoint; result links are `/l/?uddg=<destination>` redirects.
    ///
    /// # Errors
    ///
    /// Returns an error if `endpoint` is not an http(s) URL.
    pub fn duckduckgo(endpoint: &str) -> Result<Self> {
        Ok(Self {
            name: "duckduckgo",
            endpoint: engine_url(endpoint)?,
            extra_query: &[],
            redirect_param: Some("uddg"),
        })
    }

    /// Bing web search; result links point straight at their destination.
    ///
    /// # Errors
    ///
    /// Returns an error if `endpoint` is not an http(s) URL.
    pub fn bing(endpoint: &str) -> Result<Self> {
        Ok(Self {
            name: "bing",
            endpoint: engine_url(endpoint)?,
            extra_query: &[("setlang", "en-US")],
            redirect_param: None,
        })
    }

    /// Stage C and D engines, in that order.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured endpoint is not an http(s) URL.
    pub fn from_config(config: &SearchEngineConfig) -> Result<Vec<Self>> {
        Ok(vec![
            Self::duckduckgo(&config.duckduckgo_url)?,
            Self::bing(&config.bing_url)?,
        ])
    }

    /// Full search URL for `query`.
    #[must_use]
    pub fn query_url(&self, query: &str) -> String {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", query);
            for (key, value) in self.extra_query {
                pairs.append_pair(key, value);
            }
        }
        url.into()
    }

    /// Provider links on a results page: direct links to the site are kept,
    /// redirect links are unwrapped. De-duplicated, first-seen order.
    #[must_use]
    pub fn site_links(&self, site: &dyn SongSite, body: &str) -> Vec<Url> {
        let mut links: Vec<Url> = Vec::new();
        for href in collect_hrefs(body) {
            let Some(url) = resolve(&self.endpoint, &href) else {
                continue;
            };
            let target = if site.is_own_link(&url) {
                Some(url)
            } else {
                self.redirect_param
                    .and_then(|param| unwrap_redirect(&url, param))
            };
            if let Some(target) = target {
                if !links.contains(&target) {
                    links.push(target);
                }
            }
        }
        links
    }
}

fn engine_url(endpoint: &str) -> Result<Url> {
    parse_web_url(endpoint).ok_or_else(|| CoreError::ConfigInvalid {
        message: format!("search engine endpoint is not an http(s) URL: {endpoint}"),
    })
}

/// Runs the A-D chain for any [`SongSite`].
#[derive(Clone)]
pub struct FallbackPipeline {
    http: HttpClient,
    engines: Vec<SearchEngine>,
}

impl FallbackPipeline {
    #[must_use]
    pub const fn new(http: HttpClient, engines: Vec<SearchEngine>) -> Self {
        Self { http, engines }
    }

    /// Discover tracks for `term`. Never fails; an exhausted chain is empty.
    pub async fn search(&self, site: &dyn SongSite, term: &str) -> Vec<Track> {
        let term = term.trim();
        if term.is_empty() {
            return Vec::new();
        }

        if let Some(search_url) = site.search_url(term) {
            match self.http.get_text(&search_url).await {
                Ok(body) => {
                    let tracks = native_results(site, &body);
                    if !tracks.is_empty() {
                        info!(
                            "{}: {} result(s) from native search",
                            site.name(),
                            tracks.len()
                        );
                        return tracks;
                    }
                    let tracks = song_links(site, &body);
                    if !tracks.is_empty() {
                        info!(
                            "{}: {} result(s) from song links on search page",
                            site.name(),
                            tracks.len()
                        );
                        return tracks;
                    }
                    debug!("{}: native search page yielded nothing", site.name());
                }
                Err(e) => warn!("{}: native search failed: {}", site.name(), e),
            }
        }

        for engine in &self.engines {
            let tracks = self.site_search(site, engine, term).await;
            if !tracks.is_empty() {
                info!(
                    "{}: {} result(s) via {} site search",
                    site.name(),
                    tracks.len(),
                    engine.name
                );
                return tracks;
            }
        }

        info!("{}: no results for {:?}", site.name(), term);
        Vec::new()
    }

    async fn site_search(&self, site: &dyn SongSite, engine: &SearchEngine, term: &str) -> Vec<Track> {
        let query = format!("site:{} {} lyrics", site.site_domain(), term);
        let url = engine.query_url(&query);
        let body = match self.http.get_text(&url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("{}: {} site search failed: {}", site.name(), engine.name, e);
                return Vec::new();
            }
        };
        let links = engine.site_links(site, &body);
        debug!(
            "{}: {} returned {} candidate link(s)",
            site.name(),
            engine.name,
            links.len()
        );
        tracks_from_urls(site, links)
    }
}

/// Stage A on a raw page body.
#[must_use]
pub fn native_results(site: &dyn SongSite, body: &str) -> Vec<Track> {
    let document = Html::parse_document(body);
    site.parse_results(&document)
}

/// Stage B: song-page links on a page, resolved against the site's base URL.
#[must_use]
pub fn song_links(site: &dyn SongSite, body: &str) -> Vec<Track> {
    let mut urls: Vec<Url> = Vec::new();
    for href in collect_hrefs(body) {
        if let Some(url) = resolve(site.base_url(), &href) {
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
    }
    tracks_from_urls(site, urls)
}

fn tracks_from_urls(site: &dyn SongSite, urls: Vec<Url>) -> Vec<Track> {
    urls.into_iter()
        .filter_map(|url| {
            let song = site.song_page(&url)?;
            Some(Track::new(song.title, song.artist, url, site.name()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use crate::html::{element_text, selector};
    use crate::links::{path_segments, strip_suffix_ignore_case};
    use crate::test_utils::{fast_http_config, StubResponse, StubServer};
    use crate::text::{humanize_slug, DASH};
    use reqwest::header::HeaderMap;

    /// Songs live at `https://lyrics.example/{artist}/{song}-lyrics/`.
    struct ExampleSite {
        base: Url,
        search_endpoint: Option<String>,
    }

    impl ExampleSite {
        fn new(search_endpoint: Option<String>) -> Self {
            Self {
                base: Url::parse("https://lyrics.example").unwrap(),
                search_endpoint,
            }
        }
    }

    impl SongSite for ExampleSite {
        fn name(&self) -> &'static str {
            "example"
        }

        fn site_domain(&self) -> &str {
            "lyrics.example"
        }

        fn base_url(&self) -> &Url {
            &self.base
        }

        fn search_url(&self, term: &str) -> Option<String> {
            self.search_endpoint
                .as_ref()
                .map(|endpoint| format!("{endpoint}?q={}", urlencoding::encode(term)))
        }

        fn parse_results(&self, document: &Html) -> Vec<Track> {
            let Some(cards) = selector("div.card a") else {
                return Vec::new();
            };
            document
                .select(&cards)
                .filter_map(|a| {
                    let url = resolve(&self.base, a.value().attr("href")?)?;
                    Some(Track::new(element_text(a), "Card Artist", url, self.name()))
                })
                .collect()
        }

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

    fn pipeline(server: &StubServer) -> FallbackPipeline {
        let http = HttpClient::for_search(&fast_http_config(), HeaderMap::new()).unwrap();
        let engines = vec![
            SearchEngine::duckduckgo(&server.url("/ddg")).unwrap(),
            SearchEngine::bing(&server.url("/bing")).unwrap(),
        ];
        FallbackPipeline::new(http, engines)
    }

    const ONE_SONG_LINK: &str = r#"<html><body>
        <a href="/about">About</a>
        <a href="/queen/bohemian-rhapsody-lyrics/">Bohemian Rhapsody</a>
        <a href="https://elsewhere.example/queen/x-lyrics/">Elsewhere</a>
    </body></html>"#;

    #[test]
    fn test_song_links_humanizes_matching_link() {
        let site = ExampleSite::new(None);
        let tracks = song_links(&site, ONE_SONG_LINK);
        assert_eq!(
            tracks,
            vec![Track::new(
                "Bohemian Rhapsody",
                "Queen",
                "https://lyrics.example/queen/bohemian-rhapsody-lyrics/",
                "example"
            )]
        );
    }

    #[test]
    fn test_duckduckgo_links_unwrapped_and_deduplicated() {
        let site = ExampleSite::new(None);
        let engine = SearchEngine::duckduckgo("https://duckduckgo.com/html/").unwrap();
        let body = r#"
            <a class="result__a" href="/l/?kh=1&uddg=https%3A%2F%2Flyrics.example%2Fqueen%2Fbohemian-rhapsody-lyrics%2F">r1</a>
            <a class="result__url" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Flyrics.example%2Fqueen%2Fbohemian-rhapsody-lyrics%2F&rut=abc">r1 again</a>
            <a href="https://lyrics.example/queen/another-one-bites-the-dust-lyrics/">direct</a>
            <a href="/l/?uddg=https%3A%2F%2Fother.example%2Fqueen%2Fx-lyrics%2F">other site</a>
            <a href="/l/?uddg=garbage">garbage</a>
            <a href="/html/?q=next+page">next</a>
        "#;
        let links: Vec<String> = engine
            .site_links(&site, body)
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(
            links,
            vec![
                "https://lyrics.example/queen/bohemian-rhapsody-lyrics/".to_string(),
                "https://lyrics.example/queen/another-one-bites-the-dust-lyrics/".to_string(),
                "https://other.example/queen/x-lyrics/".to_string(),
            ]
        );
        // The song-page filter then drops the foreign site
        let tracks = tracks_from_urls(&site, engine.site_links(&site, body));
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[1].title, "Another One Bites The Dust");
    }

    #[test]
    fn test_bing_keeps_only_direct_links() {
        let site = ExampleSite::new(None);
        let engine = SearchEngine::bing("https://www.bing.com/search").unwrap();
        let body = r#"
            <li class="b_algo"><h2><a href="https://lyrics.example/queen/bohemian-rhapsody-lyrics/">x</a></h2></li>
            <a href="https://www.bing.com/ck/a?u=a1aHR0cHM6Ly9seXJpY3MuZXhhbXBsZQ">wrapped</a>
        "#;
        let links = engine.site_links(&site, body);
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn test_query_urls() {
        let ddg = SearchEngine::duckduckgo("https://duckduckgo.com/html/").unwrap();
        assert_eq!(
            ddg.query_url("site:www.songlyrics.com queen lyrics"),
            "https://duckduckgo.com/html/?q=site%3Awww.songlyrics.com+queen+lyrics"
        );
        let bing = SearchEngine::bing("https://www.bing.com/search").unwrap();
        assert_eq!(
            bing.query_url("a b"),
            "https://www.bing.com/search?q=a+b&setlang=en-US"
        );
    }

    #[test]
    fn test_engines_from_config() {
        let engines = SearchEngine::from_config(&SearchEngineConfig::default()).unwrap();
        let names: Vec<_> = engines.iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["duckduckgo", "bing"]);
        assert!(SearchEngine::bing("ftp://example.com").is_err());
    }

    #[tokio::test]
    async fn test_stage_a_wins_without_touching_engines() {
        let server = StubServer::builder()
            .route(
                "/search",
                StubResponse::html(r#"<div class="card"><a href="/queen/song-lyrics/">Song</a></div>"#),
            )
            .start()
            .await
            .unwrap();
        let site = ExampleSite::new(Some(server.url("/search")));

        let tracks = pipeline(&server).search(&site, "queen").await;
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].artist, "Card Artist");
        assert_eq!(server.hits("/ddg"), 0);
        assert_eq!(server.hits("/bing"), 0);
    }

    #[tokio::test]
    async fn test_stage_b_used_when_cards_missing() {
        let server = StubServer::builder()
            .route("/search", StubResponse::html(ONE_SONG_LINK))
            .start()
            .await
            .unwrap();
        let site = ExampleSite::new(Some(server.url("/search")));

        let tracks = pipeline(&server).search(&site, "queen").await;
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].title, "Bohemian Rhapsody");
        assert_eq!(tracks[0].artist, "Queen");
        assert_eq!(server.hits("/ddg"), 0);
    }

    #[tokio::test]
    async fn test_failed_native_search_falls_through_to_duckduckgo() {
        let server = StubServer::builder()
            .route("/search", StubResponse::status(500))
            .route(
                "/ddg",
                StubResponse::html(r#"<a href="/l/?uddg=https%3A%2F%2Flyrics.example%2Fqueen%2Fbohemian-rhapsody-lyrics%2F">r</a>"#),
            )
            .start()
            .await
            .unwrap();
        let site = ExampleSite::new(Some(server.url("/search")));

        let tracks = pipeline(&server).search(&site, "bohemian").await;
        assert_eq!(tracks.len(), 1);
        assert_eq!(
            tracks[0].opaque_id,
            "https://lyrics.example/queen/bohemian-rhapsody-lyrics/"
        );
        assert_eq!(server.hits("/bing"), 0);
        let ddg_request = server
            .requests()
            .into_iter()
            .find(|r| r.starts_with("/ddg"))
            .unwrap();
        assert_eq!(
            ddg_request,
            "/ddg?q=site%3Alyrics.example+bohemian+lyrics"
        );
    }

    #[tokio::test]
    async fn test_bing_is_last_resort() {
        let server = StubServer::builder()
            .route("/search", StubResponse::html("<p>nothing here</p>"))
            .route("/ddg", StubResponse::html("<p>no results</p>"))
            .route(
                "/bing",
                StubResponse::html(r#"<a href="https://lyrics.example/queen/bohemian-rhapsody-lyrics">r</a>"#),
            )
            .start()
            .await
            .unwrap();
        let site = ExampleSite::new(Some(server.url("/search")));

        let tracks = pipeline(&server).search(&site, "bohemian").await;
        assert_eq!(tracks.len(), 1);
        assert_eq!(server.hits("/search"), 1);
        assert_eq!(server.hits("/ddg"), 1);
        assert_eq!(server.hits("/bing"), 1);
    }

    #[tokio::test]
    async fn test_exhausted_chain_is_empty() {
        let server = StubServer::builder().start().await.unwrap();
        let site = ExampleSite::new(None);

        let tracks = pipeline(&server).search(&site, "nothing").await;
        assert!(tracks.is_empty());
        assert_eq!(server.hits("/ddg"), 1);
        assert_eq!(server.hits("/bing"), 1);
    }

    #[tokio::test]
    async fn test_blank_term_makes_no_requests() {
        let server = StubServer::builder().start().await.unwrap();
        let site = ExampleSite::new(Some(server.url("/search")));

        assert!(pipeline(&server).search(&site, "   ").await.is_empty());
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn test_timed_out_stage_moves_on() {
        let server = StubServer::builder()
            .route(
                "/search",
                StubResponse::html(ONE_SONG_LINK).with_delay(std::time::Duration::from_secs(5)),
            )
            .route(
                "/ddg",
                StubResponse::html(r#"<a href="https://lyrics.example/queen/bohemian-rhapsody-lyrics/">r</a>"#),
            )
            .start()
            .await
            .unwrap();
        let site = ExampleSite::new(Some(server.url("/search")));
        let config = HttpConfig {
            connect_timeout_ms: 200,
            read_timeout_ms: 200,
            ..HttpConfig::default()
        };
        let http = HttpClient::for_search(&config, HeaderMap::new()).unwrap();
        let pipeline = FallbackPipeline::new(
            http,
            vec![SearchEngine::duckduckgo(&server.url("/ddg")).unwrap()],
        );

        let tracks = pipeline.search(&site, "queen").await;
        assert_eq!(tracks.len(), 1);
        assert_eq!(server.hits("/ddg"), 1);
    }
}
