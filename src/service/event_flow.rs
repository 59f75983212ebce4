use chrono::{Duration, NaiveDate};
use teloxide::types::{InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup};
use tokio::sync::Mutex;
use tracing::warn;

use crate::service::calendar_service::CalendarApi;
use crate::service::date_picker::{self, PickerOutcome};
use crate::service::routing::{self, Intent, MENU_CREATE, MENU_DELETE, MENU_SHOW};
use crate::service::session::{SessionState, SessionStore};

pub const EVENT_SUMMARY: &str = "My event";
pub const UPCOMING_LIMIT: u32 = 5;

pub const GREETING_REPLY: &str = "Hi! 📌 I manage your Google Calendar.\nWhat shall we do?";
pub const UNRECOGNIZED_REPLY: &str = "🤖 I didn't understand that. Use the menu.";
pub const INVALID_TIME_REPLY: &str = "❌ Invalid time format. Use HH:MM.";
pub const INVALID_NUMBER_REPLY: &str = "❌ Invalid number.";
pub const NO_EVENTS_TO_DELETE_REPLY: &str = "📭 No events to delete.";
pub const NO_UPCOMING_EVENTS_REPLY: &str = "📭 No upcoming events.";
pub const EVENT_DELETED_REPLY: &str = "✅ Event deleted.";
pub const GATEWAY_FAILURE_REPLY: &str = "⚠️ Calendar request failed. Please try again.";

/// Outgoing reply to a text message. The transport layer decides how to ship
/// each variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Menu {
        text: String,
        keyboard: KeyboardMarkup,
    },
    Inline {
        text: String,
        keyboard: InlineKeyboardMarkup,
    },
}

/// Edit applied to the message that hosts the date-picker keyboard.
#[derive(Debug, Clone, PartialEq)]
pub struct EditReply {
    pub text: String,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

pub fn main_menu() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(MENU_CREATE)],
        vec![KeyboardButton::new(MENU_DELETE)],
        vec![KeyboardButton::new(MENU_SHOW)],
    ])
    .resize_keyboard()
}

/// Handle one authorized text message. The session lock is held only for the
/// state read and the final state write, never across a gateway call.
pub async fn handle_text(
    sessions: &Mutex<SessionStore>,
    calendar: &dyn CalendarApi,
    user_id: u64,
    text: &str,
    today: NaiveDate,
) -> Reply {
    let state = { sessions.lock().await.state(user_id).clone() };

    match routing::route_message(text, &state) {
        Intent::Start => Reply::Menu {
            text: GREETING_REPLY.to_string(),
            keyboard: main_menu(),
        },
        Intent::CreateEvent => handle_create(sessions, user_id, today).await,
        Intent::DeleteEvent => handle_delete_list(sessions, calendar, user_id).await,
        Intent::ShowEvents => handle_show(calendar).await,
        Intent::TimeEntry => handle_time_entry(sessions, calendar, user_id, text, &state).await,
        Intent::DeleteNumber(number) => {
            handle_delete_number(sessions, calendar, user_id, number, &state).await
        }
        Intent::Unrecognized => Reply::Text(UNRECOGNIZED_REPLY.to_string()),
    }
}

/// Handle one authorized callback tap from the date-picker keyboard.
pub async fn handle_callback(
    sessions: &Mutex<SessionStore>,
    user_id: u64,
    payload: &str,
    today: NaiveDate,
) -> EditReply {
    match date_picker::advance(payload, today) {
        PickerOutcome::Render { prompt, keyboard } => EditReply {
            text: prompt,
            keyboard: Some(keyboard),
        },
        PickerOutcome::Picked(date) => {
            sessions
                .lock()
                .await
                .set(user_id, SessionState::AwaitingTime(date));
            EditReply {
                text: format!("📅 Date selected: {}\n⌚ Enter a start time (HH:MM):", date),
                keyboard: None,
            }
        }
    }
}

async fn handle_create(sessions: &Mutex<SessionStore>, user_id: u64, today: NaiveDate) -> Reply {
    // Starting a fresh pick abandons any half-finished flow.
    sessions.lock().await.reset(user_id);
    match date_picker::start(today) {
        PickerOutcome::Render { prompt, keyboard } => Reply::Inline {
            text: prompt,
            keyboard,
        },
        PickerOutcome::Picked(_) => unreachable!("first step never finalizes"),
    }
}

async fn handle_time_entry(
    sessions: &Mutex<SessionStore>,
    calendar: &dyn CalendarApi,
    user_id: u64,
    text: &str,
    state: &SessionState,
) -> Reply {
    let SessionState::AwaitingTime(date) = state else {
        return Reply::Text(UNRECOGNIZED_REPLY.to_string());
    };
    let Some(time) = routing::parse_time_hhmm(text) else {
        // State stays pending so the user can retry.
        return Reply::Text(INVALID_TIME_REPLY.to_string());
    };

    let start = date.and_time(time);
    let end = start + Duration::hours(1);
    match calendar.insert_event(EVENT_SUMMARY, start, end).await {
        Ok(_) => {
            sessions.lock().await.reset(user_id);
            Reply::Text(format!(
                "✅ Event created: {}",
                start.format("%Y-%m-%d %H:%M")
            ))
        }
        Err(err) => {
            warn!(user_id, error = %err, "event insert failed");
            Reply::Text(GATEWAY_FAILURE_REPLY.to_string())
        }
    }
}

async fn handle_delete_list(
    sessions: &Mutex<SessionStore>,
    calendar: &dyn CalendarApi,
    user_id: u64,
) -> Reply {
    let events = match calendar.list_upcoming(UPCOMING_LIMIT).await {
        Ok(events) => events,
        Err(err) => {
            warn!(user_id, error = %err, "event list failed");
            return Reply::Text(GATEWAY_FAILURE_REPLY.to_string());
        }
    };
    if events.is_empty() {
        return Reply::Text(NO_EVENTS_TO_DELETE_REPLY.to_string());
    }

    let mut message = String::from("🗑 Found these events:\n");
    for (index, event) in events.iter().enumerate() {
        message.push_str(&format!(
            "{}. {} — {}\n",
            index + 1,
            event.summary,
            event.start.display()
        ));
    }
    message.push_str("\nEnter the number of the event to delete:");

    sessions
        .lock()
        .await
        .set(user_id, SessionState::AwaitingDeleteChoice(events));
    Reply::Text(message)
}

async fn handle_delete_number(
    sessions: &Mutex<SessionStore>,
    calendar: &dyn CalendarApi,
    user_id: u64,
    number: usize,
    state: &SessionState,
) -> Reply {
    let SessionState::AwaitingDeleteChoice(events) = state else {
        return Reply::Text(UNRECOGNIZED_REPLY.to_string());
    };
    if number == 0 || number > events.len() {
        // Candidates stay stored so the user can retry.
        return Reply::Text(INVALID_NUMBER_REPLY.to_string());
    }

    let event = &events[number - 1];
    match calendar.delete_event(&event.id).await {
        // Not-found means the event is already gone; either way there is
        // nothing left to delete.
        Ok(_) => {
            sessions.lock().await.reset(user_id);
            Reply::Text(EVENT_DELETED_REPLY.to_string())
        }
        Err(err) => {
            warn!(user_id, error = %err, "event delete failed");
            Reply::Text(GATEWAY_FAILURE_REPLY.to_string())
        }
    }
}

async fn handle_show(calendar: &dyn CalendarApi) -> Reply {
    let events = match calendar.list_upcoming(UPCOMING_LIMIT).await {
        Ok(events) => events,
        Err(err) => {
            warn!(error = %err, "event list failed");
            return Reply::Text(GATEWAY_FAILURE_REPLY.to_string());
        }
    };
    if events.is_empty() {
        return Reply::Text(NO_UPCOMING_EVENTS_REPLY.to_string());
    }

    let mut message = String::from("📌 Upcoming events:\n");
    for event in &events {
        message.push_str(&format!("- {} — {}\n", event.summary, event.start.display()));
    }
    Reply::Text(message)
}
