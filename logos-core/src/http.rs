//! HTTP plumbing shared by providers: one client per (provider, purpose) with its
//! own connect/read timeouts, bounded redirects and optional transient retries.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use tracing::debug;

use crate::config::HttpConfig;
use crate::error::{CoreError, Result};

/// User agent for providers that only serve browsers
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Default headers for scraping `referer`'s pages.
///
/// # Errors
///
/// Returns an error if `referer` is not a valid header value.
pub fn browser_headers(referer: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    let referer = HeaderValue::from_str(referer).map_err(|e| CoreError::ConfigInvalid {
        message: format!("invalid referer {referer:?}: {e}"),
    })?;
    headers.insert(REFERER, referer);
    Ok(headers)
}

/// Default headers for a structured API that identifies its clients by user agent.
#[must_use]
pub fn api_headers(user_agent: &'static str, accept: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(user_agent));
    headers.insert(ACCEPT, HeaderValue::from_static(accept));
    headers
}

/// GET-only client returning response bodies as text.
#[derive(Clone)]
pub struct HttpClient {
    client: ClientWithMiddleware,
}

impl HttpClient {
    /// Client for search requests (`http.read_timeout_ms`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn for_search(config: &HttpConfig, headers: HeaderMap) -> Result<Self> {
        Self::new(config, config.read_timeout(), headers)
    }

    /// Client for lyrics requests (`http.lyrics_read_timeout_ms`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn for_lyrics(config: &HttpConfig, headers: HeaderMap) -> Result<Self> {
        Self::new(config, config.lyrics_read_timeout(), headers)
    }

    /// Create a client with the given read timeout.
    ///
    /// The whole request is additionally capped at connect + read timeout so a
    /// slowly dripping server cannot hold a task past its budget.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &HttpConfig, read_timeout: Duration, headers: HeaderMap) -> Result<Self> {
        let redirect = if config.max_redirects == 0 {
            Policy::none()
        } else {
            Policy::limited(config.max_redirects)
        };

        let base_client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .read_timeout(read_timeout)
            .timeout(config.connect_timeout() + read_timeout)
            .redirect(redirect)
            .default_headers(headers)
            .build()?;

        let client = if config.max_retries == 0 {
            ClientBuilder::new(base_client).build()
        } else {
            let retry_policy =
                ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
            ClientBuilder::new(base_client)
                .with(RetryTransientMiddleware::new_with_policy(retry_policy))
                .build()
        };

        Ok(Self { client })
    }

    /// GET `url` and return the body of a successful response.
    ///
    /// # Errors
    ///
    /// Returns an error on connection failure, timeout, a non-success status or an
    /// unreadable body.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        self.get_text_with_query(url, &[]).await
    }

    /// GET `url` with query parameters appended (percent-encoded).
    ///
    /// # Errors
    ///
    /// Same as [`HttpClient::get_text`].
    pub async fn get_text_with_query(&self, url: &str, query: &[(&str, &str)]) -> Result<String> {
        debug!("GET {} {:?}", url, query);

        let mut request = self.client.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request.send().await?;
        let status = response.status();
        debug!("{} responded with {}", url, status);

        if !status.is_success() {
            return Err(CoreError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}
