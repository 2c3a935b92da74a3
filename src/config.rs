use std::env;
use std::time::Duration;

use log::LevelFilter;
use url::Url;

use crate::error::ConfigError;

pub const REST_URL_VAR: &str = "BP_ACTIVITY_REST_URL";
pub const USER_ID_VAR: &str = "BP_ACTIVITY_USER_ID";
pub const TIMEOUT_VAR: &str = "BP_ACTIVITY_TIMEOUT_SECS";
pub const LOG_VAR: &str = "BP_ACTIVITY_LOG";

const DEFAULT_REST_URL: &str = "http://localhost/wp-json/buddypress/v1/";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where the BuddyPress REST API lives and who is asking.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Namespace root, e.g. `https://example.com/wp-json/buddypress/v1/`.
    pub rest_url: Url,
    pub current_user: Option<u64>,
    pub timeout: Duration,
    pub log_level: LevelFilter,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key lookup; unset or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        let rest_url = get(REST_URL_VAR).unwrap_or_else(|| DEFAULT_REST_URL.to_owned());
        let mut settings = Settings {
            rest_url: parse_rest_url(&rest_url)?,
            current_user: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_level: LevelFilter::Info,
        };

        if let Some(raw) = get(USER_ID_VAR) {
            settings.current_user = Some(parse_user_id(&raw)?);
        }
        if let Some(raw) = get(TIMEOUT_VAR) {
            let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: TIMEOUT_VAR,
                value: raw.clone(),
            })?;
            settings.timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = get(LOG_VAR) {
            settings.log_level = raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: LOG_VAR,
                value: raw.clone(),
            })?;
        }
        Ok(settings)
    }
}

/// WordPress user ids start at 1; 0 is what WordPress reports for a visitor.
pub fn parse_user_id(raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ConfigError::InvalidValue {
            key: USER_ID_VAR,
            value: raw.to_owned(),
        }),
    }
}

// `Url::join` drops the last path segment unless the base ends with a slash.
fn parse_rest_url(raw: &str) -> Result<Url, ConfigError> {
    let normalized = if raw.ends_with('/') {
        raw.to_owned()
    } else {
        format!("{}/", raw)
    };
    Url::parse(&normalized).map_err(|source| ConfigError::InvalidUrl {
        url: raw.to_owned(),
        source,
    })
}
