//! Client configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const API_BASE_ENV: &str = "CASEHUB_API_BASE";
pub const SESSION_FILE_ENV: &str = "CASEHUB_SESSION_FILE";

const FALLBACK_SESSION_FILE: &str = ".casehub-session.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base: String,
    pub session_file: PathBuf,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `CASEHUB_API_BASE`: default `http://localhost:8000`, trailing `/` trimmed
    /// - `CASEHUB_SESSION_FILE`: default `$HOME/.casehub/session.json`, or
    ///   `./.casehub-session.json` when `HOME` is unset
    #[must_use]
    pub fn from_env() -> Self {
        Self::resolve(
            std::env::var(API_BASE_ENV).ok().as_deref(),
            std::env::var(SESSION_FILE_ENV).ok().as_deref(),
            std::env::var("HOME").ok().as_deref(),
        )
    }

    /// Resolve config from raw values; blank values count as unset.
    #[must_use]
    pub fn resolve(api_base: Option<&str>, session_file: Option<&str>, home: Option<&str>) -> Self {
        let api_base = non_blank(api_base)
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
            .to_owned();
        let session_file = non_blank(session_file).map_or_else(|| default_session_file(home), PathBuf::from);
        Self { api_base, session_file }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::resolve(None, None, None)
    }
}

/// Load `.env` from the working directory if present. Existing variables win.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "failed to load .env"),
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|v| !v.is_empty())
}

fn default_session_file(home: Option<&str>) -> PathBuf {
    match non_blank(home) {
        Some(home) => PathBuf::from(home).join(".casehub").join("session.json"),
        None => PathBuf::from(FALLBACK_SESSION_FILE),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
