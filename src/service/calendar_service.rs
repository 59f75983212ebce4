use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::clients::google_calendar::{ClientError, GoogleCalendarClient};
use crate::models::event::{CalendarEvent, DeleteOutcome};

/// The three calendar operations the conversation flow needs. No retries;
/// failures surface to the calling handler.
#[async_trait]
pub trait CalendarApi: Send + Sync {
    async fn insert_event(
        &self,
        summary: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<CalendarEvent, ClientError>;

    async fn list_upcoming(&self, max_results: u32) -> Result<Vec<CalendarEvent>, ClientError>;

    async fn delete_event(&self, event_id: &str) -> Result<DeleteOutcome, ClientError>;
}

pub struct CalendarService {
    client: GoogleCalendarClient,
}

impl CalendarService {
    pub fn new(client: GoogleCalendarClient) -> Self {
        CalendarService { client }
    }
}

#[async_trait]
impl CalendarApi for CalendarService {
    async fn insert_event(
        &self,
        summary: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<CalendarEvent, ClientError> {
        self.client.insert_event(summary, start, end).await
    }

    async fn list_upcoming(&self, max_results: u32) -> Result<Vec<CalendarEvent>, ClientError> {
        self.client.list_upcoming(max_results).await
    }

    async fn delete_event(&self, event_id: &str) -> Result<DeleteOutcome, ClientError> {
        self.client.delete_event(event_id).await
    }
}
