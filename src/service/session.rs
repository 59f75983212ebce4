use std::collections::HashMap;

use chrono::NaiveDate;

use crate::models::event::CalendarEvent;

/// Conversation state for one sender. A session is either idle, waiting for a
/// start time after a finished date pick, or waiting for a delete index after
/// a rendered candidate list. The enum makes the two pending shapes mutually
/// exclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingTime(NaiveDate),
    AwaitingDeleteChoice(Vec<CalendarEvent>),
}

/// In-process session map keyed by sender id. Entries are created lazily,
/// reset to idle once consumed, never removed; nothing survives a restart.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<u64, SessionState>,
}

const IDLE: SessionState = SessionState::Idle;

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, user_id: u64) -> &SessionState {
        self.sessions.get(&user_id).unwrap_or(&IDLE)
    }

    pub fn set(&mut self, user_id: u64, state: SessionState) {
        self.sessions.insert(user_id, state);
    }

    pub fn reset(&mut self, user_id: u64) {
        self.sessions.insert(user_id, SessionState::Idle);
    }
}
