use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const MIN_ITEMS: u32 = 1;
pub const MAX_ITEMS: u32 = 20;
pub const MIN_AVATAR_SIZE: u32 = 20;
pub const MAX_AVATAR_SIZE: u32 = 100;

/// Which slice of the activity stream to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ActivityType {
    #[default]
    All,
    My,
    Favorites,
}

impl ActivityType {
    pub const ALL: [ActivityType; 3] = [ActivityType::All, ActivityType::My, ActivityType::Favorites];

    pub fn heading(self) -> &'static str {
        match self {
            ActivityType::All => "All Activities",
            ActivityType::My => "My Activities",
            ActivityType::Favorites => "My Favorite Activities",
        }
    }
}

// Anything the block editor did not write falls back to the full stream.
impl From<String> for ActivityType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "my" => ActivityType::My,
            "favorites" => ActivityType::Favorites,
            _ => ActivityType::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Layout {
    #[default]
    List,
    Grid,
}

impl Layout {
    pub fn css_class(self) -> &'static str {
        match self {
            Layout::List => "activity-list",
            Layout::Grid => "activity-grid",
        }
    }
}

impl From<String> for Layout {
    fn from(value: String) -> Self {
        if value == "grid" {
            Layout::Grid
        } else {
            Layout::List
        }
    }
}

/// Block attributes, as the editor persists them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayConfig {
    pub number_of_items: u32,
    pub activity_type: ActivityType,
    pub layout: Layout,
    pub show_date: bool,
    pub avatar_size: u32,
    pub hide_heading: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            number_of_items: 5,
            activity_type: ActivityType::All,
            layout: Layout::List,
            show_date: true,
            avatar_size: 45,
            hide_heading: false,
        }
    }
}

impl DisplayConfig {
    /// Parses block attributes, filling in defaults for absent fields and clamping ranges.
    pub fn from_json(attributes: &str) -> Result<Self, ConfigError> {
        if attributes.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: DisplayConfig = serde_json::from_str(attributes)?;
        Ok(config.resolved())
    }

    pub fn resolved(mut self) -> Self {
        self.number_of_items = self.number_of_items.clamp(MIN_ITEMS, MAX_ITEMS);
        self.avatar_size = self.avatar_size.clamp(MIN_AVATAR_SIZE, MAX_AVATAR_SIZE);
        self
    }

    pub fn heading(&self) -> Option<&'static str> {
        if self.hide_heading {
            None
        } else {
            Some(self.activity_type.heading())
        }
    }

    pub fn refetch_key(&self) -> RefetchKey {
        RefetchKey {
            activity_type: self.activity_type,
            number_of_items: self.number_of_items,
        }
    }
}

/// The only configuration fields that change what gets fetched.
///
/// Everything else (avatar size, layout, dates, heading) re-renders the rows already held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RefetchKey {
    pub activity_type: ActivityType,
    pub number_of_items: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserAvatar {
    #[serde(default)]
    pub thumb: Option<String>,
}

/// One item of the BuddyPress activity stream. Only the fields the listing reads are kept.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityRecord {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<Rendered>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub user_avatar: Option<UserAvatar>,
}

impl ActivityRecord {
    pub fn content_html(&self) -> Option<&str> {
        self.content
            .as_ref()
            .and_then(|content| content.rendered.as_deref())
            .filter(|html| !html.trim().is_empty())
    }

    pub fn avatar_thumb(&self) -> Option<&str> {
        self.user_avatar
            .as_ref()
            .and_then(|avatar| avatar.thumb.as_deref())
            .filter(|thumb| !thumb.trim().is_empty())
    }
}
