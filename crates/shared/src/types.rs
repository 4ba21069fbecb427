use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A status string that is not one of the known values.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown {kind} status: {value}")]
pub struct ParseStatusError {
    pub kind: &'static str,
    pub value: String,
}

// ============================================================================
// Agent status
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    #[default]
    Active,
    Inactive,
    Archived,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Active => "active",
            AgentStatus::Inactive => "inactive",
            AgentStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AgentStatus::Active),
            "inactive" => Ok(AgentStatus::Inactive),
            "archived" => Ok(AgentStatus::Archived),
            other => Err(ParseStatusError {
                kind: "agent",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for AgentStatus {
    type Error = ParseStatusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ============================================================================
// Meeting status
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    #[default]
    Upcoming,
    Active,
    Completed,
    Processing,
    Cancelled,
}

impl MeetingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingStatus::Upcoming => "upcoming",
            MeetingStatus::Active => "active",
            MeetingStatus::Completed => "completed",
            MeetingStatus::Processing => "processing",
            MeetingStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for MeetingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeetingStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(MeetingStatus::Upcoming),
            "active" => Ok(MeetingStatus::Active),
            "completed" => Ok(MeetingStatus::Completed),
            "processing" => Ok(MeetingStatus::Processing),
            "cancelled" => Ok(MeetingStatus::Cancelled),
            other => Err(ParseStatusError {
                kind: "meeting",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for MeetingStatus {
    type Error = ParseStatusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ============================================================================
// Agent list filters
// ============================================================================

/// Status filter for agent listing; `All` disables the status condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatusFilter {
    #[default]
    All,
    Active,
    Inactive,
    Archived,
}

impl AgentStatusFilter {
    /// The concrete status to match, or `None` for `All`.
    pub fn as_status(&self) -> Option<AgentStatus> {
        match self {
            AgentStatusFilter::All => None,
            AgentStatusFilter::Active => Some(AgentStatus::Active),
            AgentStatusFilter::Inactive => Some(AgentStatus::Inactive),
            AgentStatusFilter::Archived => Some(AgentStatus::Archived),
        }
    }
}

/// Query parameters for the paginated agent listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentFilters {
    #[serde(default)]
    pub search: String,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub status: AgentStatusFilter,
}

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for AgentFilters {
    fn default() -> Self {
        Self {
            search: String::new(),
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            status: AgentStatusFilter::All,
        }
    }
}

// ============================================================================
// Pagination envelope
// ============================================================================

/// One page of a filtered listing, with the totals the UI needs to
/// render pagination controls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, page: u32, page_size: u32) -> Self {
        let total_pages = ((total as u64).div_ceil(page_size as u64)) as u32;
        Self {
            items,
            total,
            page,
            page_size,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_round_trip_through_strings() {
        for status in ["active", "inactive", "archived"] {
            assert_eq!(status.parse::<AgentStatus>().unwrap().as_str(), status);
        }
        for status in ["upcoming", "active", "completed", "processing", "cancelled"] {
            assert_eq!(status.parse::<MeetingStatus>().unwrap().as_str(), status);
        }
        assert!("bogus".parse::<AgentStatus>().is_err());
        assert!("bogus".parse::<MeetingStatus>().is_err());
    }

    #[test]
    fn filters_apply_defaults_for_missing_fields() {
        let filters: AgentFilters = serde_json::from_str("{}").unwrap();
        assert_eq!(filters.search, "");
        assert_eq!(filters.page, 1);
        assert_eq!(filters.page_size, 10);
        assert_eq!(filters.status, AgentStatusFilter::All);
    }

    #[test]
    fn status_filter_maps_to_concrete_status() {
        assert_eq!(AgentStatusFilter::All.as_status(), None);
        assert_eq!(
            AgentStatusFilter::Archived.as_status(),
            Some(AgentStatus::Archived)
        );
    }

    #[test]
    fn page_totals_round_up() {
        let page = Page::new(vec![1, 2, 3], 15, 2, 10);
        assert_eq!(page.total_pages, 2);
        assert_eq!(Page::<i32>::new(vec![], 0, 1, 10).total_pages, 0);
        assert_eq!(Page::<i32>::new(vec![], 10, 1, 10).total_pages, 1);
        assert_eq!(Page::<i32>::new(vec![], 11, 1, 10).total_pages, 2);
    }
}
