use chrono::NaiveTime;

use crate::service::session::SessionState;

pub const MENU_CREATE: &str = "📅 Create event";
pub const MENU_DELETE: &str = "🗑 Delete event";
pub const MENU_SHOW: &str = "📂 Show events";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Start,
    CreateEvent,
    DeleteEvent,
    ShowEvents,
    /// Session is awaiting a time and the text looks like one; the handler
    /// still validates the exact HH:MM shape.
    TimeEntry,
    DeleteNumber(usize),
    Unrecognized,
}

/// Classify one incoming text. Text is overloaded (time entry vs. menu labels
/// vs. delete index), so order matters: state-dependent readings win where
/// they are unambiguous, then literal menu matches, then the numeric delete
/// index, then the fallback.
pub fn route_message(text: &str, state: &SessionState) -> Intent {
    let trimmed = text.trim();

    if matches!(state, SessionState::AwaitingTime(_)) && trimmed.contains(':') {
        return Intent::TimeEntry;
    }

    match trimmed {
        "/start" => return Intent::Start,
        MENU_CREATE => return Intent::CreateEvent,
        MENU_DELETE => return Intent::DeleteEvent,
        MENU_SHOW => return Intent::ShowEvents,
        _ => {}
    }

    if matches!(state, SessionState::AwaitingDeleteChoice(_))
        && !trimmed.is_empty()
        && trimmed.chars().all(|c| c.is_ascii_digit())
    {
        if let Ok(number) = trimmed.parse::<usize>() {
            return Intent::DeleteNumber(number);
        }
    }

    Intent::Unrecognized
}

/// Strict HH:MM parse: one- or two-digit 24h hour, exactly two-digit minute.
pub fn parse_time_hhmm(text: &str) -> Option<NaiveTime> {
    let (hour, minute) = text.trim().split_once(':')?;
    if hour.is_empty() || hour.len() > 2 || !hour.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if minute.len() != 2 || !minute.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    NaiveTime::from_hms_opt(hour.parse().ok()?, minute.parse().ok()?, 0)
}
