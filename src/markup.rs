//! Static HTML for the server-rendered block.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use log::{info, warn};
use url::Url;

use crate::fetcher::{ActivityQuery, ActivitySource};
use crate::model::DisplayConfig;
use crate::pipeline::{listing_for, Listing, ViewRow};

/// Fetches once and renders the block, the way a page request does.
///
/// Never fails: fetch errors and empty results come back as a message paragraph.
pub fn render_block(
    source: &dyn ActivitySource,
    config: &DisplayConfig,
    current_user: Option<u64>,
    now: DateTime<Utc>,
) -> String {
    let config = config.clone().resolved();
    let result = ActivityQuery::for_config(&config, current_user).and_then(|query| source.fetch(&query));
    match &result {
        Ok(records) => info!("rendering {} activities", records.len().min(config.number_of_items as usize)),
        Err(err) => warn!("rendering activity error state: {}", err),
    }
    render_listing(&listing_for(&result, &config, now), &config)
}

pub fn render_listing(listing: &Listing, config: &DisplayConfig) -> String {
    let (heading, rows) = match listing {
        Listing::Rows { heading, rows } => (heading, rows),
        other => {
            let message = other.message().unwrap_or_default();
            return format!("<p>{}</p>", escape_html(&message));
        }
    };

    let mut out = String::new();
    out.push_str("<div class=\"activity-listing\">\n");
    if let Some(heading) = heading {
        let _ = writeln!(out, "  <h2 class=\"wb-heading\">{}</h2>", escape_html(heading));
    }
    out.push_str("  <ul class=\"activity-front-ul\">\n");
    for row in rows {
        render_row(&mut out, row, config.avatar_size);
    }
    out.push_str("  </ul>\n");
    out.push_str("</div>\n");
    out
}

fn render_row(out: &mut String, row: &ViewRow, avatar_size: u32) {
    let title = escape_html(&row.display_title);
    let _ = writeln!(
        out,
        "    <li class=\"wb-activity-item {}\" key=\"{}\">",
        escape_html(row.layout_class),
        row.activity_id
    );
    out.push_str("      <div class=\"wb-activity-meta\">\n");
    if let Some(src) = row.avatar_url.as_deref().and_then(safe_url) {
        let _ = writeln!(
            out,
            "        <img class=\"wb-activity-user-avatar\" src=\"{}\" alt=\"{}\" style=\"width: {size}px; height: {size}px;\"/>",
            escape_html(&src),
            title,
            size = avatar_size
        );
    }
    out.push_str("        <div>\n");
    let _ = write!(out, "          <span class=\"wb-activity-timedate\">{}", title);
    if let Some(time) = &row.relative_time {
        let _ = write!(out, "&nbsp;&nbsp;<strong>{}</strong> ", escape_html(time));
    }
    out.push_str("</span>\n");
    out.push_str("        </div>\n");
    out.push_str("      </div>\n");
    let _ = writeln!(
        out,
        "      <div class=\"wb-activity-content\">\n        <p>{}</p>\n      </div>",
        escape_html(&row.display_content)
    );
    out.push_str("    </li>\n");
}

/// Escapes text for use in element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Accepts http(s) and protocol-relative avatar URLs; anything else is dropped.
pub fn safe_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let (parsed, protocol_relative) = match raw.strip_prefix("//") {
        Some(rest) => (Url::parse(&format!("https://{}", rest)), true),
        None => (Url::parse(raw), false),
    };
    match parsed {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            let serialized = url.to_string();
            if protocol_relative {
                serialized.strip_prefix("https:").map(str::to_owned)
            } else {
                Some(serialized)
            }
        }
        Ok(url) => {
            warn!("dropping avatar with unsupported scheme {:?}", url.scheme());
            None
        }
        Err(err) => {
            warn!("dropping unparseable avatar URL {:?}: {}", raw, err);
            None
        }
    }
}
