//! Listing parameters: which feed to walk and over what time span
//!
//! Both enums parse from the lowercase names the platform uses in its URLs.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Listing category (the feed ordering)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    /// Currently trending posts
    Hot,

    /// Highest scoring posts within a time window
    Top,

    /// Newest posts first
    New,
}

impl Category {
    /// Returns the path segment used in listing URLs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hot => "hot",
            Self::Top => "top",
            Self::New => "new",
        }
    }

    /// Returns true if the time window parameter affects this listing
    pub fn uses_time_window(&self) -> bool {
        matches!(self, Self::Top)
    }
}

impl FromStr for Category {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hot" => Ok(Self::Hot),
            "top" => Ok(Self::Top),
            "new" => Ok(Self::New),
            _ => Err(ConfigError::InvalidCategory(s.to_string())),
        }
    }
}

impl TryFrom<String> for Category {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Time window for `top` listings (sent as the `t` query parameter)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeWindow {
    Hour,
    #[default]
    Day,
    Week,
    Month,
    Year,
    All,
}

impl TimeWindow {
    /// Returns the query value used by the platform
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
            Self::All => "all",
        }
    }

    /// Returns all time windows, shortest first
    pub fn all() -> [Self; 6] {
        [
            Self::Hour,
            Self::Day,
            Self::Week,
            Self::Month,
            Self::Year,
            Self::All,
        ]
    }
}

impl FromStr for TimeWindow {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::all()
            .into_iter()
            .find(|window| window.as_str() == wanted)
            .ok_or_else(|| ConfigError::InvalidTimeWindow(s.to_string()))
    }
}

impl TryFrom<String> for TimeWindow {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeWindow> for String {
    fn from(value: TimeWindow) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
