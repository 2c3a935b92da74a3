use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong between building a query and holding a list of records.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("a logged-in user is required to list {scope} activities")]
    MissingUser { scope: &'static str },

    #[error("invalid service URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("service responded with {status}: {message}")]
    Status { status: u16, message: String },

    #[error("could not decode activities: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid block attributes: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("invalid service URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}
