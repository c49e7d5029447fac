use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a hackathon relative to its submission window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Upcoming,
    Running,
    Ended,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Upcoming => "upcoming",
            Status::Running => "running",
            Status::Ended => "ended",
        };
        f.write_str(label)
    }
}

/// Canonical hackathon record used by the single-URL scrape path.
///
/// Serializes to the wire shape `id/name/startDate/endDate/status/testHack/tags`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HackathonRecord {
    pub id: String,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub status: Status,
    pub test_hack: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Narrower record persisted by the bulk listing pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestedDocument {
    pub id: String,
    pub name: String,
    pub submission_period: Option<String>,
    pub status: Status,
}
