use chrono::NaiveDateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Start/end of a Calendar v3 event. Timed events carry `dateTime` plus a
/// zone name; all-day events carry only `date`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct EventTime {
    #[serde(rename = "dateTime", skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(rename = "timeZone", skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl EventTime {
    pub fn from_local(local: NaiveDateTime, zone: &Tz) -> Self {
        EventTime {
            date_time: Some(local.format("%Y-%m-%dT%H:%M:%S").to_string()),
            time_zone: Some(zone.name().to_string()),
            date: None,
        }
    }

    /// What to show the user for this boundary, whichever wire shape it has.
    pub fn display(&self) -> &str {
        self.date_time
            .as_deref()
            .or(self.date.as_deref())
            .unwrap_or("unknown")
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub summary: String,
    pub start: EventTime,
    pub end: EventTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}
