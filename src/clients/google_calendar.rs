use chrono::{NaiveDateTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::models::event::{CalendarEvent, DeleteOutcome, EventTime};

const CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";

pub type ClientError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Serialize)]
struct InsertEventRequest {
    summary: String,
    start: EventTime,
    end: EventTime,
}

#[derive(Debug, Deserialize)]
struct EventsListResponse {
    items: Option<Vec<CalendarEvent>>,
}

/// Thin client for the Calendar v3 events collection. Assumes an
/// already-valid bearer token; refreshing credentials is bootstrap's job.
pub struct GoogleCalendarClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    calendar_id: String,
    time_zone: Tz,
}

impl GoogleCalendarClient {
    pub fn new(access_token: String, calendar_id: String, time_zone: Tz) -> Self {
        Self::with_base_url(CALENDAR_API.to_string(), access_token, calendar_id, time_zone)
    }

    pub fn with_base_url(
        base_url: String,
        access_token: String,
        calendar_id: String,
        time_zone: Tz,
    ) -> Self {
        GoogleCalendarClient {
            http: reqwest::Client::new(),
            base_url,
            access_token,
            calendar_id,
            time_zone,
        }
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/{}/events", self.base_url, self.calendar_id)
    }

    pub async fn insert_event(
        &self,
        summary: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<CalendarEvent, ClientError> {
        let body = InsertEventRequest {
            summary: summary.to_string(),
            start: EventTime::from_local(start, &self.time_zone),
            end: EventTime::from_local(end, &self.time_zone),
        };

        let response = self
            .http
            .post(self.events_url())
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(format!("Event insert failed: HTTP {}: {}", status, text).into());
        }

        let created: CalendarEvent = serde_json::from_str(&text)
            .map_err(|e| format!("Failed to parse insert response: {}", e))?;
        Ok(created)
    }

    pub async fn list_upcoming(&self, max_results: u32) -> Result<Vec<CalendarEvent>, ClientError> {
        let time_min = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let max_results = max_results.to_string();

        let response = self
            .http
            .get(self.events_url())
            .bearer_auth(&self.access_token)
            .query(&[
                ("timeMin", time_min.as_str()),
                ("maxResults", max_results.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(format!("Event list failed: HTTP {}: {}", status, text).into());
        }

        let body: EventsListResponse = serde_json::from_str(&text)
            .map_err(|e| format!("Failed to parse list response: {}", e))?;
        let mut items = body.items.unwrap_or_default();
        items.retain(|event| event.status.as_deref() != Some("cancelled"));
        Ok(items)
    }

    pub async fn delete_event(&self, event_id: &str) -> Result<DeleteOutcome, ClientError> {
        let response = self
            .http
            .delete(format!("{}/{}", self.events_url(), event_id))
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Ok(DeleteOutcome::NotFound);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(format!("Event delete failed: HTTP {}: {}", status, text).into());
        }
        Ok(DeleteOutcome::Deleted)
    }
}
