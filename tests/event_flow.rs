use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use tokio::sync::Mutex;

use calendarBot::clients::google_calendar::ClientError;
use calendarBot::models::event::{CalendarEvent, DeleteOutcome, EventTime};
use calendarBot::service::calendar_service::CalendarApi;
use calendarBot::service::event_flow::{self, Reply};
use calendarBot::service::session::{SessionState, SessionStore};

struct FakeCalendar {
    fail: bool,
    events: Vec<CalendarEvent>,
    inserted: StdMutex<Vec<(String, NaiveDateTime, NaiveDateTime)>>,
    deleted: StdMutex<Vec<String>>,
}

impl FakeCalendar {
    fn new(events: Vec<CalendarEvent>) -> Self {
        FakeCalendar {
            fail: false,
            events,
            inserted: StdMutex::new(Vec::new()),
            deleted: StdMutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        let mut fake = Self::new(Vec::new());
        fake.fail = true;
        fake
    }
}

#[async_trait]
impl CalendarApi for FakeCalendar {
    async fn insert_event(
        &self,
        summary: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<CalendarEvent, ClientError> {
        if self.fail {
            return Err("calendar unavailable".into());
        }
        self.inserted
            .lock()
            .unwrap()
            .push((summary.to_string(), start, end));
        Ok(timed_event("created-id", summary))
    }

    async fn list_upcoming(&self, _max_results: u32) -> Result<Vec<CalendarEvent>, ClientError> {
        if self.fail {
            return Err("calendar unavailable".into());
        }
        Ok(self.events.clone())
    }

    async fn delete_event(&self, event_id: &str) -> Result<DeleteOutcome, ClientError> {
        if self.fail {
            return Err("calendar unavailable".into());
        }
        self.deleted.lock().unwrap().push(event_id.to_string());
        Ok(DeleteOutcome::Deleted)
    }
}

fn timed_event(id: &str, summary: &str) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        summary: summary.to_string(),
        start: EventTime {
            date_time: Some("2024-06-02T10:00:00+03:00".to_string()),
            time_zone: Some("Europe/Moscow".to_string()),
            date: None,
        },
        end: EventTime {
            date_time: Some("2024-06-02T11:00:00+03:00".to_string()),
            time_zone: Some("Europe/Moscow".to_string()),
            date: None,
        },
        status: None,
    }
}

fn picked_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn sessions_awaiting_time() -> Mutex<SessionStore> {
    let mut store = SessionStore::new();
    store.set(7, SessionState::AwaitingTime(picked_date()));
    Mutex::new(store)
}

fn sessions_awaiting_delete(events: Vec<CalendarEvent>) -> Mutex<SessionStore> {
    let mut store = SessionStore::new();
    store.set(7, SessionState::AwaitingDeleteChoice(events));
    Mutex::new(store)
}

#[tokio::test]
async fn time_entry_creates_a_one_hour_event() {
    let sessions = sessions_awaiting_time();
    let calendar = FakeCalendar::new(Vec::new());

    let reply = event_flow::handle_text(&sessions, &calendar, 7, "14:00", picked_date()).await;

    assert_eq!(
        reply,
        Reply::Text("✅ Event created: 2024-06-01 14:00".to_string())
    );
    let inserted = calendar.inserted.lock().unwrap();
    assert_eq!(inserted.len(), 1);
    let (summary, start, end) = &inserted[0];
    assert_eq!(summary, event_flow::EVENT_SUMMARY);
    assert_eq!(*end - *start, chrono::Duration::hours(1));
    assert_eq!(
        *start,
        picked_date().and_hms_opt(14, 0, 0).unwrap()
    );
    assert_eq!(*sessions.lock().await.state(7), SessionState::Idle);
}

#[tokio::test]
async fn unpadded_hour_parses_like_the_padded_form() {
    let sessions = sessions_awaiting_time();
    let calendar = FakeCalendar::new(Vec::new());

    let reply = event_flow::handle_text(&sessions, &calendar, 7, "9:30", picked_date()).await;

    assert_eq!(
        reply,
        Reply::Text("✅ Event created: 2024-06-01 09:30".to_string())
    );
}

#[tokio::test]
async fn invalid_times_keep_the_pending_date_for_retry() {
    for input in ["25:00", "9:3", "12:xx"] {
        let sessions = sessions_awaiting_time();
        let calendar = FakeCalendar::new(Vec::new());

        let reply = event_flow::handle_text(&sessions, &calendar, 7, input, picked_date()).await;

        assert_eq!(
            reply,
            Reply::Text(event_flow::INVALID_TIME_REPLY.to_string()),
            "{input}"
        );
        assert!(calendar.inserted.lock().unwrap().is_empty());
        assert_eq!(
            *sessions.lock().await.state(7),
            SessionState::AwaitingTime(picked_date())
        );
    }
}

#[tokio::test]
async fn insert_failure_reports_generically_and_keeps_state() {
    let sessions = sessions_awaiting_time();
    let calendar = FakeCalendar::failing();

    let reply = event_flow::handle_text(&sessions, &calendar, 7, "14:00", picked_date()).await;

    assert_eq!(
        reply,
        Reply::Text(event_flow::GATEWAY_FAILURE_REPLY.to_string())
    );
    assert_eq!(
        *sessions.lock().await.state(7),
        SessionState::AwaitingTime(picked_date())
    );
}

#[tokio::test]
async fn delete_event_lists_candidates_and_stores_them() {
    let events = vec![timed_event("a", "Dentist"), timed_event("b", "Standup")];
    let sessions = Mutex::new(SessionStore::new());
    let calendar = FakeCalendar::new(events.clone());

    let reply =
        event_flow::handle_text(&sessions, &calendar, 7, "🗑 Delete event", picked_date()).await;

    let Reply::Text(text) = reply else {
        panic!("expected a plain text reply");
    };
    assert!(text.contains("1. Dentist — 2024-06-02T10:00:00+03:00"));
    assert!(text.contains("2. Standup"));
    assert!(text.ends_with("Enter the number of the event to delete:"));
    assert_eq!(
        *sessions.lock().await.state(7),
        SessionState::AwaitingDeleteChoice(events)
    );
}

#[tokio::test]
async fn out_of_range_delete_numbers_keep_the_candidates() {
    let events = vec![timed_event("a", "Dentist"), timed_event("b", "Standup")];
    for input in ["0", "3"] {
        let sessions = sessions_awaiting_delete(events.clone());
        let calendar = FakeCalendar::new(events.clone());

        let reply = event_flow::handle_text(&sessions, &calendar, 7, input, picked_date()).await;

        assert_eq!(
            reply,
            Reply::Text(event_flow::INVALID_NUMBER_REPLY.to_string()),
            "{input}"
        );
        assert!(calendar.deleted.lock().unwrap().is_empty());
        assert_eq!(
            *sessions.lock().await.state(7),
            SessionState::AwaitingDeleteChoice(events.clone())
        );
    }
}

#[tokio::test]
async fn in_range_delete_number_deletes_the_matching_event() {
    let events = vec![timed_event("a", "Dentist"), timed_event("b", "Standup")];
    let sessions = sessions_awaiting_delete(events.clone());
    let calendar = FakeCalendar::new(events);

    let reply = event_flow::handle_text(&sessions, &calendar, 7, "2", picked_date()).await;

    assert_eq!(
        reply,
        Reply::Text(event_flow::EVENT_DELETED_REPLY.to_string())
    );
    assert_eq!(*calendar.deleted.lock().unwrap(), vec!["b".to_string()]);
    assert_eq!(*sessions.lock().await.state(7), SessionState::Idle);
}

#[tokio::test]
async fn delete_failure_keeps_the_candidates_for_retry() {
    let events = vec![timed_event("a", "Dentist")];
    let sessions = sessions_awaiting_delete(events.clone());
    let calendar = FakeCalendar::failing();

    let reply = event_flow::handle_text(&sessions, &calendar, 7, "1", picked_date()).await;

    assert_eq!(
        reply,
        Reply::Text(event_flow::GATEWAY_FAILURE_REPLY.to_string())
    );
    assert_eq!(
        *sessions.lock().await.state(7),
        SessionState::AwaitingDeleteChoice(events)
    );
}

#[tokio::test]
async fn empty_lists_yield_empty_result_messages_without_state_change() {
    let sessions = Mutex::new(SessionStore::new());
    let calendar = FakeCalendar::new(Vec::new());

    let reply =
        event_flow::handle_text(&sessions, &calendar, 7, "🗑 Delete event", picked_date()).await;
    assert_eq!(
        reply,
        Reply::Text(event_flow::NO_EVENTS_TO_DELETE_REPLY.to_string())
    );
    assert_eq!(*sessions.lock().await.state(7), SessionState::Idle);

    let reply =
        event_flow::handle_text(&sessions, &calendar, 7, "📂 Show events", picked_date()).await;
    assert_eq!(
        reply,
        Reply::Text(event_flow::NO_UPCOMING_EVENTS_REPLY.to_string())
    );
    assert_eq!(*sessions.lock().await.state(7), SessionState::Idle);
}

#[tokio::test]
async fn show_events_renders_a_bulleted_list_and_stores_nothing() {
    let events = vec![timed_event("a", "Dentist")];
    let sessions = Mutex::new(SessionStore::new());
    let calendar = FakeCalendar::new(events);

    let reply =
        event_flow::handle_text(&sessions, &calendar, 7, "📂 Show events", picked_date()).await;

    let Reply::Text(text) = reply else {
        panic!("expected a plain text reply");
    };
    assert!(text.starts_with("📌 Upcoming events:\n"));
    assert!(text.contains("- Dentist — 2024-06-02T10:00:00+03:00"));
    assert_eq!(*sessions.lock().await.state(7), SessionState::Idle);
}

#[tokio::test]
async fn start_replies_with_the_three_button_menu() {
    let sessions = Mutex::new(SessionStore::new());
    let calendar = FakeCalendar::new(Vec::new());

    let reply = event_flow::handle_text(&sessions, &calendar, 7, "/start", picked_date()).await;

    let Reply::Menu { text, keyboard } = reply else {
        panic!("expected the menu reply");
    };
    assert_eq!(text, event_flow::GREETING_REPLY);
    assert_eq!(keyboard.keyboard.len(), 3);
}

#[tokio::test]
async fn create_event_renders_the_year_step_and_clears_pending_state() {
    let sessions = sessions_awaiting_time();
    let calendar = FakeCalendar::new(Vec::new());

    let reply =
        event_flow::handle_text(&sessions, &calendar, 7, "📅 Create event", picked_date()).await;

    let Reply::Inline { text, .. } = reply else {
        panic!("expected an inline keyboard reply");
    };
    assert_eq!(text, "📅 Select a year");
    assert_eq!(*sessions.lock().await.state(7), SessionState::Idle);
}

#[tokio::test]
async fn completed_pick_moves_the_session_to_awaiting_time() {
    let sessions = Mutex::new(SessionStore::new());

    let edit =
        event_flow::handle_callback(&sessions, 7, "datepick:day:2024-06-01", picked_date()).await;

    assert!(edit.text.contains("Date selected: 2024-06-01"));
    assert!(edit.text.contains("HH:MM"));
    assert!(edit.keyboard.is_none());
    assert_eq!(
        *sessions.lock().await.state(7),
        SessionState::AwaitingTime(picked_date())
    );
}

#[tokio::test]
async fn unrecognized_text_gets_the_fallback_reply() {
    let sessions = Mutex::new(SessionStore::new());
    let calendar = FakeCalendar::new(Vec::new());

    let reply =
        event_flow::handle_text(&sessions, &calendar, 7, "what can you do?", picked_date()).await;

    assert_eq!(
        reply,
        Reply::Text(event_flow::UNRECOGNIZED_REPLY.to_string())
    );
}
