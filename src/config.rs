//! Runtime configuration.
//!
//! Everything is read once at process start. `Config::from_env` loads a
//! `.env` file if one exists, then reads the variables below; anything
//! unset falls back to its default.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `DOCSLICE_MAX_CHUNK_SIZE` | `500` |
//! | `DOCSLICE_CHUNK_UNIT` | `characters` |
//! | `HIGHLIGHTS_API_KEY` | unset |
//! | `HIGHLIGHTS_ENDPOINT` | `https://api.highlights.mk1.ai/search` |
//! | `HIGHLIGHTS_TOP_N` | `10` |
//! | `HIGHLIGHTS_TIMEOUT_SECS` | `60` |
//! | `HIGHLIGHTS_MAX_PAYLOAD_CHARS` | `200000` |
//! | `BOX_CLIENT_ID`, `BOX_CLIENT_SECRET`, `BOX_SUBJECT_ID` | unset |

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, SizeUnit};

/// Default chunk limit.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 500;

/// Default highlighting endpoint.
pub const DEFAULT_HIGHLIGHTS_ENDPOINT: &str = "https://api.highlights.mk1.ai/search";

/// Value shipped in example `.env` files; treated as "no key".
const PLACEHOLDER_API_KEY: &str = "your_highlights_api_key_here";

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Chunking limits.
    pub chunker: ChunkerConfig,
    /// Highlighting service settings.
    pub highlights: HighlightsConfig,
    /// Document-storage credentials.
    pub storage: StorageCredentials,
}

/// Chunk size limit and its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Maximum size of a chunk.
    pub max_chunk_size: usize,
    /// What `max_chunk_size` counts.
    pub unit: SizeUnit,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            unit: SizeUnit::Characters,
        }
    }
}

/// Highlighting service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightsConfig {
    /// API key; `None` means highlights are simulated.
    pub api_key: Option<String>,
    /// Search endpoint URL.
    pub endpoint: String,
    /// Highlights requested per call.
    pub top_n: usize,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Upper bound on the characters of chunk text sent in one request.
    pub max_payload_chars: usize,
}

impl Default for HighlightsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_HIGHLIGHTS_ENDPOINT.to_string(),
            top_n: 10,
            timeout_secs: 60,
            max_payload_chars: 200_000,
        }
    }
}

/// Credentials for the document-storage service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageCredentials {
    /// OAuth client id.
    pub client_id: Option<String>,
    /// OAuth client secret.
    pub client_secret: Option<String>,
    /// User or enterprise the client acts as.
    pub subject_id: Option<String>,
}

impl StorageCredentials {
    /// Names of the variables that were not set.
    #[must_use]
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("BOX_CLIENT_ID", &self.client_id),
            ("BOX_CLIENT_SECRET", &self.client_secret),
            ("BOX_SUBJECT_ID", &self.subject_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }
}

impl Config {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    ///
    /// ```rust
    /// use docslice::{Config, SizeUnit};
    ///
    /// let config = Config::from_lookup(|key| match key {
    ///     "DOCSLICE_CHUNK_UNIT" => Some("tokens".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    ///
    /// assert_eq!(config.chunker.unit, SizeUnit::Tokens);
    /// assert_eq!(config.chunker.max_chunk_size, 500);
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(size) = parse_var(&get, "DOCSLICE_MAX_CHUNK_SIZE")? {
            if size == 0 {
                return Err(Error::InvalidConfiguration(
                    "DOCSLICE_MAX_CHUNK_SIZE must be > 0".to_string(),
                ));
            }
            config.chunker.max_chunk_size = size;
        }
        if let Some(unit) = parse_var(&get, "DOCSLICE_CHUNK_UNIT")? {
            config.chunker.unit = unit;
        }

        config.highlights.api_key =
            get("HIGHLIGHTS_API_KEY").filter(|key| key != PLACEHOLDER_API_KEY);
        if let Some(endpoint) = get("HIGHLIGHTS_ENDPOINT") {
            config.highlights.endpoint = endpoint;
        }
        if let Some(top_n) = parse_var(&get, "HIGHLIGHTS_TOP_N")? {
            config.highlights.top_n = top_n;
        }
        if let Some(timeout) = parse_var(&get, "HIGHLIGHTS_TIMEOUT_SECS")? {
            config.highlights.timeout_secs = timeout;
        }
        if let Some(limit) = parse_var(&get, "HIGHLIGHTS_MAX_PAYLOAD_CHARS")? {
            config.highlights.max_payload_chars = limit;
        }

        config.storage = StorageCredentials {
            client_id: get("BOX_CLIENT_ID"),
            client_secret: get("BOX_CLIENT_SECRET"),
            subject_id: get("BOX_SUBJECT_ID"),
        };

        Ok(config)
    }
}

fn parse_var<T, G>(get: &G, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| Error::InvalidConfiguration(format!("{key}='{raw}': {e}")))
        })
        .transpose()
}
