//! Turns fetched activity records into what either surface draws.
//!
//! Both the live preview and the static renderer go through [`build_listing`], so titles,
//! content fallbacks, headings and relative times are computed in exactly one place.

use chrono::{DateTime, Utc};

use crate::error::FetchError;
use crate::html_text::extract_text;
use crate::model::{ActivityRecord, DisplayConfig};
use crate::time_ago::{parse_activity_date, time_ago};

pub const NO_TITLE: &str = "No title";
pub const NO_CONTENT: &str = "No content";
pub const NO_ACTIVITIES: &str = "No activities found.";
pub const ERROR_PREFIX: &str = "Error loading activities:";

/// One activity, ready to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRow {
    pub activity_id: u64,
    pub display_title: String,
    pub display_content: String,
    pub relative_time: Option<String>,
    pub avatar_url: Option<String>,
    pub layout_class: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// The fetch failed; the message replaces the whole list.
    Failed(String),
    /// Nothing came back. Not an error.
    Empty,
    Rows {
        heading: Option<&'static str>,
        rows: Vec<ViewRow>,
    },
}

impl Listing {
    pub fn message(&self) -> Option<String> {
        match self {
            Listing::Failed(message) => Some(format!("{} {}", ERROR_PREFIX, message)),
            Listing::Empty => Some(NO_ACTIVITIES.to_owned()),
            Listing::Rows { .. } => None,
        }
    }
}

pub fn build_row(record: &ActivityRecord, config: &DisplayConfig, now: DateTime<Utc>) -> ViewRow {
    let display_title = record
        .title
        .as_deref()
        .map(extract_text)
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_owned());
    let display_content = record
        .content_html()
        .map(extract_text)
        .filter(|content| !content.is_empty())
        .unwrap_or_else(|| NO_CONTENT.to_owned());
    let relative_time = if config.show_date {
        record
            .date
            .as_deref()
            .and_then(parse_activity_date)
            .map(|date| time_ago(date, now))
    } else {
        None
    };

    ViewRow {
        activity_id: record.id,
        display_title,
        display_content,
        relative_time,
        avatar_url: record.avatar_thumb().map(str::to_owned),
        layout_class: config.layout.css_class(),
    }
}

/// Rows for at most `number_of_items` records, in source order.
pub fn build_rows(records: &[ActivityRecord], config: &DisplayConfig, now: DateTime<Utc>) -> Vec<ViewRow> {
    records
        .iter()
        .take(config.number_of_items as usize)
        .map(|record| build_row(record, config, now))
        .collect()
}

pub fn build_listing(records: &[ActivityRecord], config: &DisplayConfig, now: DateTime<Utc>) -> Listing {
    if records.is_empty() || config.number_of_items == 0 {
        return Listing::Empty;
    }
    Listing::Rows {
        heading: config.heading(),
        rows: build_rows(records, config, now),
    }
}

pub fn listing_for(
    result: &Result<Vec<ActivityRecord>, FetchError>,
    config: &DisplayConfig,
    now: DateTime<Utc>,
) -> Listing {
    match result {
        Ok(records) => build_listing(records, config, now),
        Err(err) => Listing::Failed(err.to_string()),
    }
}
