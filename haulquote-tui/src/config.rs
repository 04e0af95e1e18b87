//! Runtime configuration from arguments and the environment.

use std::env;
use std::path::PathBuf;

use haulquote_core::StateId;

const DEFAULT_PRICING_FILE: &str = "pricing.json";
const DEFAULT_REQUESTS_FILE: &str = "requests.json";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub(crate) enum ConfigError {
    #[error("HAULQUOTE_REMOTE_STATES is set but HAULQUOTE_FEE_URL is not")]
    RemoteStatesWithoutUrl,
    #[error("HAULQUOTE_FEE_URL must start with http:// or https://, got '{0}'")]
    InvalidFeeUrl(String),
    #[error("unexpected extra argument '{0}'")]
    ExtraArgument(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RemoteConfig {
    pub base_url: String,
    pub states: Vec<StateId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TelemetryConfig {
    /// Logging is off unless a file is given; the terminal belongs to the UI.
    pub log_file: Option<PathBuf>,
    pub log_filter: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AppConfig {
    pub pricing_path: PathBuf,
    pub requests_path: PathBuf,
    pub remote: Option<RemoteConfig>,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Read `.env`, the process environment, and command line arguments.
    pub(crate) fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_sources(env::args().skip(1), |key| env::var(key).ok())
    }

    pub(crate) fn from_sources<A, F>(args: A, var: F) -> Result<Self, ConfigError>
    where
        A: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut args = args.into_iter();
        let pricing_path = args
            .next()
            .map_or_else(|| PathBuf::from(DEFAULT_PRICING_FILE), PathBuf::from);
        let requests_path = args
            .next()
            .map_or_else(|| PathBuf::from(DEFAULT_REQUESTS_FILE), PathBuf::from);
        if let Some(extra) = args.next() {
            return Err(ConfigError::ExtraArgument(extra));
        }

        let lookup = |key: &str| var(key).filter(|value| !value.trim().is_empty());

        let states: Vec<StateId> = lookup("HAULQUOTE_REMOTE_STATES")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|code| !code.is_empty())
                    .map(StateId::new)
                    .collect()
            })
            .unwrap_or_default();

        let remote = match lookup("HAULQUOTE_FEE_URL") {
            Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                return Err(ConfigError::InvalidFeeUrl(url));
            }
            Some(base_url) if !states.is_empty() => Some(RemoteConfig { base_url, states }),
            Some(_) => None,
            None if states.is_empty() => None,
            None => return Err(ConfigError::RemoteStatesWithoutUrl),
        };

        Ok(Self {
            pricing_path,
            requests_path,
            remote,
            telemetry: TelemetryConfig {
                log_file: lookup("HAULQUOTE_LOG_FILE").map(PathBuf::from),
                log_filter: lookup("HAULQUOTE_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned()),
            },
        })
    }
}
