//! JSON documents printed on stdout.

use std::collections::BTreeMap;
use std::process::ExitCode;

use logos_core::{ArtistGroup, CoreError, SearchOutcome};
use serde::Serialize;
use tracing::error;

/// Exit status for an unroutable track id or other lookup failure
const EXIT_NOT_FOUND: u8 = 1;
/// Exit status for a blank track id
const EXIT_INVALID_ARGUMENT: u8 = 2;
/// Exit status for configuration problems
pub const EXIT_CONFIG: u8 = 3;

#[derive(Debug, Serialize)]
pub struct SearchResponse<'a> {
    pub success: bool,
    pub results: &'a [ArtistGroup],
    /// Providers whose search failed outright
    pub debug_info: &'a BTreeMap<String, String>,
}

impl<'a> From<&'a SearchOutcome> for SearchResponse<'a> {
    fn from(outcome: &'a SearchOutcome) -> Self {
        Self {
            success: true,
            results: &outcome.groups,
            debug_info: &outcome.errors,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LyricsResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LyricsResponse {
    /// Response document and process exit status for a lyrics lookup.
    #[must_use]
    pub fn from_result(result: Result<String, CoreError>) -> (Self, ExitCode) {
        match result {
            Ok(lyrics) => (
                Self {
                    success: true,
                    lyrics: Some(lyrics),
                    error: None,
                },
                ExitCode::SUCCESS,
            ),
            Err(e) => {
                let status = match e {
                    CoreError::InvalidArgument { .. } => EXIT_INVALID_ARGUMENT,
                    _ => EXIT_NOT_FOUND,
                };
                (Self::failure(&e), ExitCode::from(status))
            }
        }
    }

    #[must_use]
    pub fn failure(error: &CoreError) -> Self {
        Self {
            success: false,
            lyrics: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProvidersResponse {
    pub success: bool,
    pub providers: Vec<&'static str>,
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => error!("Failed to serialize response: {}", e),
    }
}
