use std::env;
use std::path::Path;
use std::time::Duration;

use tracing::debug;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];
const MODEL_VAR: &str = "GEMINI_MODEL";
const API_BASE_VAR: &str = "GEMINI_API_BASE";
const TIMEOUT_VAR: &str = "SMART_SEARCH_TIMEOUT_SECS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "GEMINI_API_KEY not set (GOOGLE_API_KEY is also accepted). Get one at https://aistudio.google.com/apikey"
    )]
    ApiKeyNotSet,

    #[error("invalid timeout '{0}': expected a whole number of seconds greater than zero")]
    InvalidTimeout(String),

    #[error("invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to load env file {path}: {source}")]
    EnvFile {
        path: String,
        #[source]
        source: dotenvy::Error,
    },
}

#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Command-line values that take precedence over the environment.
#[derive(Debug, Default)]
pub struct Overrides {
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Process-wide settings, resolved once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: ApiKey,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env(overrides: &Overrides) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok(), overrides)
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        overrides: &Overrides,
    ) -> Result<Self, ConfigError> {
        let api_key = API_KEY_VARS
            .into_iter()
            .find_map(|var| non_blank(lookup(var)))
            .ok_or(ConfigError::ApiKeyNotSet)?;

        let model = non_blank(overrides.model.clone())
            .or_else(|| non_blank(lookup(MODEL_VAR)))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let timeout = match overrides.timeout_secs {
            Some(0) => return Err(ConfigError::InvalidTimeout("0".into())),
            Some(secs) => Duration::from_secs(secs),
            None => match non_blank(lookup(TIMEOUT_VAR)) {
                Some(raw) => parse_timeout(&raw)?,
                None => DEFAULT_TIMEOUT,
            },
        };

        let api_base = match non_blank(lookup(API_BASE_VAR)) {
            Some(raw) => validate_api_base(&raw)?,
            None => DEFAULT_API_BASE.to_string(),
        };

        Ok(Self {
            api_key: ApiKey(api_key),
            model,
            api_base,
            timeout,
        })
    }
}

/// Load `path`, or `./.env` when no path is given. Variables already present in
/// the process environment are never overwritten. A missing `./.env` is fine;
/// a missing explicit file is not.
pub fn load_env_file(path: Option<&Path>) -> Result<(), ConfigError> {
    match path {
        Some(p) => dotenvy::from_path(p).map_err(|source| ConfigError::EnvFile {
            path: p.display().to_string(),
            source,
        }),
        None => match dotenvy::dotenv() {
            Ok(found) => {
                debug!(path = %found.display(), "loaded env file");
                Ok(())
            }
            Err(e) if e.not_found() => Ok(()),
            Err(source) => Err(ConfigError::EnvFile {
                path: ".env".into(),
                source,
            }),
        },
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}

fn validate_api_base(raw: &str) -> Result<String, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };
    let parsed = url::Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
    if parsed.scheme() != "https" {
        return Err(invalid("the API key is only sent over https"));
    }
    Ok(raw.trim_end_matches('/').to_string())
}
