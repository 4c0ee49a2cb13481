use crate::error::{Result, SyncError};
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TAG: &str = "watchsync";
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_SEED: &str = "https://www.utfpr.edu.br/cursos/estudenautfpr";
pub const DEFAULT_SCOPE_MARKER: &str = "/estudenautfpr/";
pub const URL_LIST_FILENAME: &str = "collected_urls.txt";

/// One stage of a run. Phases always execute in this declaration order;
/// the configuration only picks which of them run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Reconcile,
    Crawl,
    Sync,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Reconcile, Phase::Crawl, Phase::Sync];
}

impl FromStr for Phase {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reconcile" | "reconciliation" => Ok(Phase::Reconcile),
            "crawl" | "traversal" => Ok(Phase::Crawl),
            "sync" => Ok(Phase::Sync),
            other => Err(SyncError::ConfigError(format!("unknown phase: {}", other))),
        }
    }
}

/// Immutable run configuration, assembled once at startup from environment
/// variables (and CLI overrides in the binary) and passed into each
/// component. Components never read the environment themselves.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub api_key: Option<String>,
    pub tag: String,
    pub filter_by_year: bool,
    pub phases: Vec<Phase>,
    pub data_dir: PathBuf,
    pub seeds: Vec<String>,
    pub scope_marker: String,
    pub accept_invalid_certs: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key lookup. `from_env` is the
    /// production path; tests inject a map.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let phases = match lookup("RUN_PHASES") {
            Some(raw) => parse_phases(&raw)?,
            None => Phase::ALL.to_vec(),
        };

        let seeds = match lookup("SEED_URLS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            None => vec![DEFAULT_SEED.to_string()],
        };

        Ok(Self {
            base_url: lookup("WATCH_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: lookup("WATCH_API_KEY").filter(|k| !k.is_empty()),
            tag: lookup("WATCH_TAG").unwrap_or_else(|| DEFAULT_TAG.to_string()),
            filter_by_year: lookup("FILTER_BY_YEAR").map(|v| parse_bool(&v)).unwrap_or(true),
            phases,
            data_dir: lookup("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            seeds,
            scope_marker: lookup("SCOPE_MARKER")
                .unwrap_or_else(|| DEFAULT_SCOPE_MARKER.to_string()),
            accept_invalid_certs: lookup("ACCEPT_INVALID_CERTS")
                .map(|v| parse_bool(&v))
                .unwrap_or(true),
        })
    }

    pub fn url_list_path(&self) -> PathBuf {
        self.data_dir.join(URL_LIST_FILENAME)
    }

    pub fn runs_phase(&self, phase: Phase) -> bool {
        self.phases.contains(&phase)
    }

    /// The API key is required for every phase; a missing key is fatal for
    /// the whole run, before any phase starts.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| SyncError::ConfigError("WATCH_API_KEY is not set".to_string()))
    }
}

/// Accepts `true`/`1`/`t` in any case, everything else is false.
pub fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "t")
}

/// Parse a comma-separated phase list; result is deduplicated and ordered
/// by execution order, not by how the list was written.
pub fn parse_phases(raw: &str) -> Result<Vec<Phase>> {
    let mut phases: Vec<Phase> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Phase::from_str)
        .collect::<Result<_>>()?;
    phases.sort();
    phases.dedup();
    Ok(phases)
}
