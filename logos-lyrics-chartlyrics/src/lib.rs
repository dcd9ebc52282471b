//! ChartLyrics XML API provider.
//!
//! Track ids are `"{LyricId}|{LyricChecksum}"`: the API needs both halves to
//! return lyrics.

pub mod config;

use async_trait::async_trait;
use logos_core::http::api_headers;
use logos_core::links::site_base_url;
use logos_core::text::normalize_lyrics;
use logos_core::{CoreError, HttpClient, HttpConfig, LogosConfig, LyricsProvider, Track};
use roxmltree::{Document, Node};
use tracing::{debug, info, warn};

pub use config::{ChartLyricsConfig, CONFIG_TEMPLATE, PROVIDER_NAME};

const USER_AGENT: &str = "LogosLyrics/1.0 (Rust HTTP Client)";
const ACCEPT_XML: &str = "application/xml, text/xml";
/// Body of `<Lyric>` when the API knows the song but has no text
const NOT_FOUND_MARKER: &str = "Not found";

/// ChartLyrics API lyrics provider
pub struct ChartLyricsProvider {
    base_url: String,
    search_http: HttpClient,
    lyrics_http: HttpClient,
}

impl ChartLyricsProvider {
    /// Create the provider from the application config.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider section is malformed or an HTTP client
    /// cannot be created.
    pub fn new(config: &LogosConfig) -> Result<Self, CoreError> {
        let provider_config = ChartLyricsConfig::from_providers(&config.providers)?;
        Self::with_settings(&provider_config.base_url, &config.http)
    }

    /// Create the provider against an explicit API root.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an http(s) URL or an HTTP client
    /// cannot be created.
    pub fn with_settings(base_url: &str, http: &HttpConfig) -> Result<Self, CoreError> {
        let base_url = site_base_url(PROVIDER_NAME, base_url)?;
        let headers = api_headers(USER_AGENT, ACCEPT_XML);
        Ok(Self {
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            search_http: HttpClient::for_search(http, headers.clone())?,
            lyrics_http: HttpClient::for_lyrics(http, headers)?,
        })
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }
}

#[async_trait]
impl LyricsProvider for ChartLyricsProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn search(&self, term: &str) -> Result<Vec<Track>, CoreError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let body = match self
            .search_http
            .get_text_with_query(&self.endpoint("SearchLyric"), &[("artist", ""), ("song", term)])
            .await
        {
            Ok(body) => body,
            Err(e) => {
                warn!("ChartLyrics search failed: {}", e);
                return Ok(Vec::new());
            }
        };

        match parse_search_results(&body) {
            Ok(tracks) => {
                info!("ChartLyrics: {} result(s) for {:?}", tracks.len(), term);
                Ok(tracks)
            }
            Err(e) => {
                warn!("ChartLyrics search response unusable: {}", e);
                Ok(Vec::new())
            }
        }
    }

    async fn fetch_lyrics(&self, track_id: &str) -> Result<String, CoreError> {
        let Some((lyric_id, checksum)) = split_track_id(track_id) else {
            debug!("Not a ChartLyrics id: {:?}", track_id);
            return Ok(String::new());
        };

        let body = match self
            .lyrics_http
            .get_text_with_query(
                &self.endpoint("GetLyric"),
                &[("lyricId", lyric_id), ("lyricCheckSum", checksum)],
            )
            .await
        {
            Ok(body) => body,
            Err(e) => {
                warn!("ChartLyrics lyrics request failed: {}", e);
                return Ok(String::new());
            }
        };

        Ok(parse_lyric(&body).unwrap_or_else(|e| {
            warn!("ChartLyrics lyrics response unusable: {}", e);
            String::new()
        }))
    }

    fn can_handle(&self, track_id: &str) -> bool {
        split_track_id(track_id).is_some()
    }
}

/// Split `"{id}|{checksum}"`; both halves must be non-empty and there must be
/// exactly one separator.
fn split_track_id(track_id: &str) -> Option<(&str, &str)> {
    let (lyric_id, checksum) = track_id.split_once('|')?;
    if lyric_id.is_empty() || checksum.is_empty() || checksum.contains('|') {
        return None;
    }
    Some((lyric_id, checksum))
}

fn parse_xml(body: &str) -> Result<Document<'_>, CoreError> {
    Document::parse(body).map_err(|e| CoreError::Parse {
        what: "ChartLyrics XML".to_string(),
        reason: e.to_string(),
    })
}

/// Text of the first child element named `name`, trimmed; `None` if missing or blank.
fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

/// Tracks from a `SearchLyric` response. Entries missing any of id, checksum,
/// artist or song are skipped (the API pads results with empty elements).
fn parse_search_results(body: &str) -> Result<Vec<Track>, CoreError> {
    let document = parse_xml(body)?;
    Ok(document
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "SearchLyricResult")
        .filter_map(|result| {
            let lyric_id = child_text(result, "LyricId")?;
            let checksum = child_text(result, "LyricChecksum")?;
            let artist = child_text(result, "Artist")?;
            let song = child_text(result, "Song")?;
            Some(Track::new(
                song,
                artist,
                format!("{lyric_id}|{checksum}"),
                PROVIDER_NAME,
            ))
        })
        .collect())
}

/// Lyrics from a `GetLyric` response; empty when absent or "Not found".
fn parse_lyric(body: &str) -> Result<String, CoreError> {
    let document = parse_xml(body)?;
    let lyric = document
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "Lyric")
        .and_then(|n| n.text())
        .map(str::trim)
        .unwrap_or_default();

    if lyric == NOT_FOUND_MARKER {
        return Ok(String::new());
    }
    Ok(normalize_lyrics(lyric))
}

#[cfg(test)]
mod tests {
    use super::*;
    use logos_core::test_utils::{fast_http_config, StubResponse, StubServer};

    const SEARCH_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<ArrayOfSearchLyricResult xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns="http://api.chartlyrics.com/">
  <SearchLyricResult>
    <TrackId>0</TrackId>
    <LyricChecksum>a4a56a99ee00cd8e67872a7764d6f9c6</LyricChecksum>
    <LyricId>1710</LyricId>
    <SongUrl>http://www.chartlyrics.com/28h-sKWHZUa_Y8ZtORWAeQ/Bohemian+Rhapsody.aspx</SongUrl>
    <ArtistUrl>http://www.chartlyrics.com/28h-sKWHZUa_Y8ZtORWAeQ.aspx</ArtistUrl>
    <Artist>Queen</Artist>
    <Song>Bohemian Rhapsody</Song>
    <SongRank>9</SongRank>
  </SearchLyricResult>
  <SearchLyricResult>
    <LyricChecksum>0e0b4e3a3c2b</LyricChecksum>
    <LyricId>90210</LyricId>
    <Artist> Panic! At the Disco </Artist>
    <Song>Bohemian Rhapsody (Live)</Song>
  </SearchLyricResult>
  <SearchLyricResult>
    <LyricChecksum>ffff</LyricChecksum>
    <LyricId>1</LyricId>
    <Artist>   </Artist>
    <Song>No Artist</Song>
  </SearchLyricResult>
  <SearchLyricResult xsi:nil="true" />
</ArrayOfSearchLyricResult>"#;

    const LYRIC_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<GetLyricResult xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns="http://api.chartlyrics.com/">
  <TrackId>0</TrackId>
  <LyricChecksum>a4a56a99ee00cd8e67872a7764d6f9c6</LyricChecksum>
  <LyricId>1710</LyricId>
  <LyricSong>Bohemian Rhapsody</LyricSong>
  <LyricArtist>Queen</LyricArtist>
  <Lyric>Is this the real life?
Is this just fantasy?

Caught in a landslide,
No escape from reality</Lyric>
</GetLyricResult>"#;

    fn lyric_response(lyric: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?><GetLyricResult xmlns="http://api.chartlyrics.com/"><Lyric>{lyric}</Lyric></GetLyricResult>"#
        )
    }

    async fn stub_server(routes: Vec<(&str, StubResponse)>) -> StubServer {
        let mut builder = StubServer::builder();
        for (path, response) in routes {
            builder = builder.route(path, response);
        }
        builder.start().await.unwrap()
    }

    fn stub_provider(server: &StubServer) -> ChartLyricsProvider {
        ChartLyricsProvider::with_settings(&server.url("/apiv1.asmx"), &fast_http_config()).unwrap()
    }

    #[test]
    fn test_parse_search_results() {
        let tracks = parse_search_results(SEARCH_XML).unwrap();
        assert_eq!(
            tracks,
            vec![
                Track::new(
                    "Bohemian Rhapsody",
                    "Queen",
                    "1710|a4a56a99ee00cd8e67872a7764d6f9c6",
                    PROVIDER_NAME
                ),
                Track::new(
                    "Bohemian Rhapsody (Live)",
                    "Panic! At the Disco",
                    "90210|0e0b4e3a3c2b",
                    PROVIDER_NAME
                ),
            ]
        );
    }

    #[test]
    fn test_parse_malformed_xml() {
        assert!(matches!(
            parse_search_results("<ArrayOfSearchLyricResult><oops>"),
            Err(CoreError::Parse { .. })
        ));
    }

    #[test]
    fn test_parse_lyric() {
        assert_eq!(
            parse_lyric(LYRIC_XML).unwrap(),
            "Is this the real life?\nIs this just fantasy?\n\nCaught in a landslide,\nNo escape from reality"
        );
        assert_eq!(parse_lyric(&lyric_response("Not found")).unwrap(), "");
        assert_eq!(parse_lyric(&lyric_response("  \n ")).unwrap(), "");
        assert_eq!(parse_lyric("<GetLyricResult />").unwrap(), "");
        assert_eq!(
            parse_lyric(&lyric_response("Rock &amp; roll\r\nain't noise pollution")).unwrap(),
            "Rock & roll\nain't noise pollution"
        );
    }

    #[test]
    fn test_rejects_non_web_base_url() {
        assert!(matches!(
            ChartLyricsProvider::with_settings(
                "ftp://api.chartlyrics.com/apiv1.asmx",
                &fast_http_config()
            ),
            Err(CoreError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn test_track_id_shape() {
        let provider = ChartLyricsProvider::new(&LogosConfig::default()).unwrap();
        assert!(provider.can_handle("1710|a4a56a99ee00cd8e67872a7764d6f9c6"));
        assert!(!provider.can_handle("1710"));
        assert!(!provider.can_handle("|abc"));
        assert!(!provider.can_handle("1710|"));
        assert!(!provider.can_handle("1|2|3"));
        assert!(!provider.can_handle(""));
        assert!(!provider.can_handle("https://www.songlyrics.com/queen/bohemian-rhapsody-lyrics/"));
    }

    #[tokio::test]
    async fn test_search() {
        let server = stub_server(vec![(
            "/apiv1.asmx/SearchLyric",
            StubResponse::xml(SEARCH_XML),
        )])
        .await;
        let provider = stub_provider(&server);

        let tracks = provider.search(" bohemian rhapsody ").await.unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(
            server.requests(),
            vec!["/apiv1.asmx/SearchLyric?artist=&song=bohemian+rhapsody".to_string()]
        );
    }

    #[tokio::test]
    async fn test_search_failures_are_empty() {
        let server = stub_server(vec![(
            "/apiv1.asmx/SearchLyric",
            StubResponse::xml("<ArrayOfSearchLyricResult>"),
        )])
        .await;
        let provider = stub_provider(&server);
        assert!(provider.search("queen").await.unwrap().is_empty());

        let server = stub_server(vec![(
            "/apiv1.asmx/SearchLyric",
            StubResponse::status(500),
        )])
        .await;
        let provider = stub_provider(&server);
        assert!(provider.search("queen").await.unwrap().is_empty());
        assert!(provider.search("   ").await.unwrap().is_empty());
        assert_eq!(server.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_lyrics() {
        let server = stub_server(vec![("/apiv1.asmx/GetLyric", StubResponse::xml(LYRIC_XML))]).await;
        let provider = stub_provider(&server);

        let lyrics = provider
            .fetch_lyrics("1710|a4a56a99ee00cd8e67872a7764d6f9c6")
            .await
            .unwrap();
        assert!(lyrics.starts_with("Is this the real life?\nIs this just fantasy?"));
        assert_eq!(
            server.requests(),
            vec![
                "/apiv1.asmx/GetLyric?lyricId=1710&lyricCheckSum=a4a56a99ee00cd8e67872a7764d6f9c6"
                    .to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_lyrics_bad_id_skips_network() {
        let server = stub_server(vec![("/apiv1.asmx/GetLyric", StubResponse::xml(LYRIC_XML))]).await;
        let provider = stub_provider(&server);

        for id in ["1710", "|abc", "1|2|3", "https://www.songlyrics.com/x/y-lyrics/"] {
            assert_eq!(provider.fetch_lyrics(id).await.unwrap(), "");
        }
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_lyrics_not_found() {
        let server = stub_server(vec![(
            "/apiv1.asmx/GetLyric",
            StubResponse::xml(lyric_response("Not found")),
        )])
        .await;
        let provider = stub_provider(&server);

        assert_eq!(provider.fetch_lyrics("1|abc").await.unwrap(), "");
    }
}
