use std::time::Duration;

use log::{debug, error};
use serde::Deserialize;
use url::Url;

use crate::config::Settings;
use crate::error::FetchError;
use crate::model::{ActivityRecord, ActivityType, DisplayConfig};

pub const ACTIVITY_PATH: &str = "activity";

/// Request parameters for the activity endpoint, derived from a display configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityQuery {
    pub per_page: u32,
    pub favorites: bool,
    pub user_id: Option<u64>,
}

impl ActivityQuery {
    /// "my" and "favorites" need to know who is asking; "all" ignores the user.
    pub fn for_config(config: &DisplayConfig, current_user: Option<u64>) -> Result<Self, FetchError> {
        let per_page = config.number_of_items;
        match config.activity_type {
            ActivityType::All => Ok(Self {
                per_page,
                favorites: false,
                user_id: None,
            }),
            ActivityType::My => Ok(Self {
                per_page,
                favorites: false,
                user_id: Some(current_user.ok_or(FetchError::MissingUser { scope: "my" })?),
            }),
            ActivityType::Favorites => Ok(Self {
                per_page,
                favorites: true,
                user_id: Some(current_user.ok_or(FetchError::MissingUser { scope: "favorite" })?),
            }),
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("per_page", self.per_page.to_string())];
        if self.favorites {
            pairs.push(("scope", "favorites".to_owned()));
        }
        if let Some(user_id) = self.user_id {
            pairs.push(("user_id", user_id.to_string()));
        }
        pairs
    }
}

/// Anything that can answer an activity query.
pub trait ActivitySource: Send + Sync {
    fn fetch(&self, query: &ActivityQuery) -> Result<Vec<ActivityRecord>, FetchError>;
}

/// Shape of a WordPress REST error body.
#[derive(Deserialize)]
struct RestError {
    message: String,
}

/// Blocking client for the BuddyPress REST namespace.
pub struct RestClient {
    base: Url,
    http: reqwest::blocking::Client,
}

impl RestClient {
    pub fn new(base: Url, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { base, http })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        Self::new(settings.rest_url.clone(), settings.timeout)
    }

    pub fn endpoint(&self, query: &ActivityQuery) -> Result<Url, FetchError> {
        let mut url = self
            .base
            .join(ACTIVITY_PATH)
            .map_err(|source| FetchError::InvalidUrl {
                url: self.base.to_string(),
                source,
            })?;
        url.query_pairs_mut().extend_pairs(query.query_pairs());
        Ok(url)
    }
}

impl ActivitySource for RestClient {
    fn fetch(&self, query: &ActivityQuery) -> Result<Vec<ActivityRecord>, FetchError> {
        let url = self.endpoint(query)?;
        debug!("fetching activities from {}", url);
        let response = self.http.get(url.clone()).send().map_err(|err| {
            error!("Error fetching activities from {}: {:?}", url, err);
            FetchError::from(err)
        })?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            let message = serde_json::from_str::<RestError>(&body)
                .map(|rest| rest.message)
                .unwrap_or_else(|_| {
                    status
                        .canonical_reason()
                        .unwrap_or("unexpected response")
                        .to_owned()
                });
            error!("activity endpoint {} answered {}: {}", url, status, message);
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let records: Vec<ActivityRecord> = serde_json::from_str(&body)?;
        debug!("received {} activities", records.len());
        Ok(records)
    }
}
