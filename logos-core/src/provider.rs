use crate::error::CoreError;
use crate::track::Track;
use async_trait::async_trait;

/// Trait for lyrics providers
///
/// Implementations hold only immutable configuration (base URL, HTTP clients),
/// so every call is independent of the ones before it.
#[async_trait]
pub trait LyricsProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &'static str;

    /// Search for songs matching `term`.
    ///
    /// Transient failures (timeouts, connection errors, bad status, unparseable
    /// bodies) yield `Ok` with an empty list. An `Err` is a contract violation
    /// and is reported in the search diagnostics.
    async fn search(&self, term: &str) -> Result<Vec<Track>, CoreError>;

    /// Fetch plain-text lyrics for an id this provider produced.
    ///
    /// An empty string means no lyrics could be retrieved; it is not an error.
    async fn fetch_lyrics(&self, track_id: &str) -> Result<String, CoreError>;

    /// Whether `track_id` belongs to this provider. Must not perform I/O.
    fn can_handle(&self, track_id: &str) -> bool;
}
