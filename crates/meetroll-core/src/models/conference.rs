use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A meeting space as returned by `spaces.create`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Space {
    /// Resource name, `spaces/{space}`
    pub name: String,
    #[serde(rename = "meetingUri", default)]
    pub meeting_uri: Option<String>,
    #[serde(rename = "meetingCode", default)]
    pub meeting_code: Option<String>,
}

impl Space {
    pub fn meeting_uri_display(&self) -> &str {
        self.meeting_uri.as_deref().unwrap_or("(none)")
    }

    pub fn meeting_code_display(&self) -> &str {
        self.meeting_code.as_deref().unwrap_or("(none)")
    }
}

/// A single session of a space. The conference is still running while
/// `end_time` is unset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConferenceRecord {
    /// Resource name, `conferenceRecords/{conference_record}`
    pub name: String,
    /// Owning space, `spaces/{space}`
    #[serde(default)]
    pub space: Option<String>,
    #[serde(rename = "startTime", default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(rename = "endTime", default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(rename = "expireTime", default)]
    pub expire_time: Option<DateTime<Utc>>,
}

impl ConferenceRecord {
    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }

    pub fn status_display(&self) -> &'static str {
        if self.is_active() {
            "active"
        } else {
            "ended"
        }
    }

    /// Format the start time for display, or "unknown" if the API omitted it
    pub fn start_display(&self) -> String {
        self.start_time
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}
