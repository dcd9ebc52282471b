//! Aggregation across all registered providers.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, info};

use crate::error::{CoreError, Result};
use crate::provider::LyricsProvider;
use crate::track::{ArtistGroup, Track};

/// Aborts the fan-out tasks when a search is dropped before they finish.
struct AbortOnDrop(Vec<AbortHandle>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

/// Result of an aggregated search.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchOutcome {
    /// Deduplicated tracks grouped by artist, in first-appearance order
    pub groups: Vec<ArtistGroup>,
    /// Providers whose task failed outright, with the failure description.
    /// Diagnostic only; it never changes `groups`.
    pub errors: BTreeMap<String, String>,
}

/// Fans searches out to every provider and routes lyrics requests by id.
pub struct LyricsManager {
    providers: Vec<Arc<dyn LyricsProvider>>,
    search_deadline: Option<Duration>,
}

impl LyricsManager {
    /// Create a manager over `providers`, in registration order.
    #[must_use]
    pub fn new(providers: Vec<Arc<dyn LyricsProvider>>) -> Self {
        Self {
            providers,
            search_deadline: None,
        }
    }

    /// Bound every provider task of a search by `deadline`.
    #[must_use]
    pub const fn with_search_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.search_deadline = deadline;
        self
    }

    /// Registered provider names, in registration order
    #[must_use]
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Search every provider concurrently and merge the results.
    ///
    /// Waits for all providers. Results are merged in registration order (not
    /// completion order), ids no provider can route are dropped, duplicates are
    /// collapsed keeping the first occurrence, and survivors are grouped by artist.
    pub async fn search(&self, term: &str) -> SearchOutcome {
        let term = term.trim();
        if term.is_empty() {
            return SearchOutcome::default();
        }

        let term: Arc<str> = Arc::from(term);
        let deadline = self.search_deadline;
        let handles: Vec<_> = self
            .providers
            .iter()
            .map(|provider| {
                let provider = Arc::clone(provider);
                let term = Arc::clone(&term);
                tokio::spawn(async move {
                    let search = provider.search(&term);
                    match deadline {
                        Some(deadline) => tokio::time::timeout(deadline, search)
                            .await
                            .unwrap_or_else(|_| {
                                Err(CoreError::ProviderFailed {
                                    provider: provider.name().to_string(),
                                    reason: format!("timed out after {deadline:?}"),
                                })
                            }),
                        None => search.await,
                    }
                })
            })
            .collect();
        let _abort_on_drop = AbortOnDrop(handles.iter().map(JoinHandle::abort_handle).collect());

        let mut per_provider = Vec::with_capacity(handles.len());
        let mut errors = BTreeMap::new();
        for (provider, joined) in self.providers.iter().zip(join_all(handles).await) {
            let name = provider.name();
            match joined {
                Ok(Ok(tracks)) => {
                    debug!("{} returned {} track(s)", name, tracks.len());
                    per_provider.push(tracks);
                }
                Ok(Err(e)) => {
                    error!("Provider {} failed during search: {}", name, e);
                    errors.insert(name.to_string(), e.to_string());
                }
                Err(e) => {
                    error!("Provider {} search task aborted: {}", name, e);
                    errors.insert(name.to_string(), format!("search task aborted: {e}"));
                }
            }
        }

        let groups = merge_results(per_provider, |id| self.route(id).is_some());
        info!(
            "Search {:?}: {} artist group(s), {} provider error(s)",
            &*term,
            groups.len(),
            errors.len()
        );
        SearchOutcome { groups, errors }
    }

    /// Fetch lyrics from the first provider (in registration order) that claims `track_id`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] for a blank id and
    /// [`CoreError::NotFound`] when no provider claims it. An empty string from
    /// the provider is passed through as "no lyrics available".
    pub async fn fetch_lyrics(&self, track_id: &str) -> Result<String> {
        let track_id = track_id.trim();
        if track_id.is_empty() {
            return Err(CoreError::invalid_argument("track_id required"));
        }

        let provider = self.route(track_id).ok_or_else(|| CoreError::NotFound {
            id: track_id.to_string(),
        })?;
        info!("Fetching lyrics for {} from {}", track_id, provider.name());
        provider.fetch_lyrics(track_id).await
    }

    fn route(&self, track_id: &str) -> Option<&Arc<dyn LyricsProvider>> {
        self.providers.iter().find(|p| p.can_handle(track_id))
    }
}

/// Merge per-provider result lists (already in registration order) into artist groups.
///
/// Tracks whose id `is_routable` rejects, or whose artist/title normalize to
/// empty, are dropped. The first track for each dedup key wins; the first track
/// for each artist fixes the group's display name.
pub fn merge_results(
    per_provider: Vec<Vec<Track>>,
    is_routable: impl Fn(&str) -> bool,
) -> Vec<ArtistGroup> {
    let mut seen = HashSet::new();
    let mut groups: Vec<ArtistGroup> = Vec::new();
    let mut group_index: HashMap<String, usize> = HashMap::new();

    for track in per_provider.into_iter().flatten() {
        if track.opaque_id.trim().is_empty() || !is_routable(&track.opaque_id) {
            debug!(
                "Dropping {} result with unroutable id {:?}",
                track.source, track.opaque_id
            );
            continue;
        }
        let Some(key) = track.dedup_key() else {
            continue;
        };
        if !seen.insert(key.clone()) {
            continue;
        }
        let index = *group_index.entry(key.artist).or_insert_with(|| {
            groups.push(ArtistGroup {
                artist_name: track.artist.trim().to_string(),
                tracks: Vec::new(),
            });
            groups.len() - 1
        });
        groups[index].tracks.push(track);
    }

    groups
}
