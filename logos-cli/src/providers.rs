use std::sync::Arc;

use logos_core::{CoreError, LogosConfig, LyricsProvider, LyricsProviderType};
use logos_lyrics_biglyrics::BigLyricsProvider;
use logos_lyrics_chartlyrics::ChartLyricsProvider;
use logos_lyrics_lyricsfreak::LyricsFreakProvider;
use logos_lyrics_songlyrics::SongLyricsProvider;
use tracing::{error, info};

/// Provider sections appended to a freshly written config file
pub const PROVIDER_TEMPLATES: &[&str] = &[
    logos_lyrics_songlyrics::CONFIG_TEMPLATE,
    logos_lyrics_lyricsfreak::CONFIG_TEMPLATE,
    logos_lyrics_biglyrics::CONFIG_TEMPLATE,
    logos_lyrics_chartlyrics::CONFIG_TEMPLATE,
];

/// Create lyrics providers in the order `lyrics.providers` lists them.
///
/// A provider that fails to initialize is logged and skipped so the rest stay
/// usable.
pub fn create_providers(config: &LogosConfig) -> Vec<Arc<dyn LyricsProvider>> {
    config
        .lyrics
        .providers
        .iter()
        .filter_map(|provider_type| {
            info!("Initializing {} provider", provider_type.as_str());
            match create_provider(*provider_type, config) {
                Ok(provider) => Some(provider),
                Err(e) => {
                    error!(
                        "Failed to create {} provider: {}",
                        provider_type.as_str(),
                        e
                    );
                    None
                }
            }
        })
        .collect()
}

fn create_provider(
    provider_type: LyricsProviderType,
    config: &LogosConfig,
) -> Result<Arc<dyn LyricsProvider>, CoreError> {
    Ok(match provider_type {
        LyricsProviderType::Songlyrics => Arc::new(SongLyricsProvider::new(config)?),
        LyricsProviderType::Lyricsfreak => Arc::new(LyricsFreakProvider::new(config)?),
        LyricsProviderType::Biglyrics => Arc::new(BigLyricsProvider::new(config)?),
        LyricsProviderType::Chartlyrics => Arc::new(ChartLyricsProvider::new(config)?),
    })
}
