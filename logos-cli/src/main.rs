mod output;
mod providers;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use logos_core::{CoreError, LogosConfig, LyricsManager};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::output::{print_json, LyricsResponse, ProvidersResponse, SearchResponse, EXIT_CONFIG};
use crate::providers::{create_providers, PROVIDER_TEMPLATES};

/// Search lyrics across several lyrics sites and fetch them by track id.
#[derive(Debug, Parser)]
#[command(name = "logos", version, about)]
struct Cli {
    /// Config file to use instead of ~/.config/logos/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search every provider and print tracks grouped by artist
    Search {
        /// Free-text query, usually artist and/or song title
        term: String,
    },
    /// Fetch lyrics for a track id returned by `search`
    Lyrics { track_id: String },
    /// List providers in registration order
    Providers,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            print_json(&LyricsResponse::failure(&e));
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let manager = LyricsManager::new(create_providers(&config))
        .with_search_deadline(config.lyrics.search_deadline());
    info!(
        "Initialized {} lyrics provider(s): {:?}",
        manager.provider_names().len(),
        manager.provider_names()
    );

    match cli.command {
        Command::Search { term } => {
            let outcome = manager.search(&term).await;
            print_json(&SearchResponse::from(&outcome));
            ExitCode::SUCCESS
        }
        Command::Lyrics { track_id } => {
            let (response, status) =
                LyricsResponse::from_result(manager.fetch_lyrics(&track_id).await);
            print_json(&response);
            status
        }
        Command::Providers => {
            print_json(&ProvidersResponse {
                success: true,
                providers: manager.provider_names(),
            });
            ExitCode::SUCCESS
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<LogosConfig, CoreError> {
    match path {
        Some(path) => LogosConfig::load(path),
        None => LogosConfig::load_or_create(PROVIDER_TEMPLATES),
    }
}

/// Logs go to stderr; stdout carries only the JSON response.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
