use std::sync::Arc;

use chrono::Utc;
use chrono_tz::Tz;
use teloxide::prelude::*;
use teloxide::types::MaybeInaccessibleMessage;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::service::access;
use crate::service::calendar_service::CalendarApi;
use crate::service::event_flow::{self, Reply};
use crate::service::session::SessionStore;

pub struct BotHandler {
    bot: Bot,
    authorized_user: Option<u64>,
    time_zone: Tz,
    sessions: Arc<Mutex<SessionStore>>,
    calendar: Arc<dyn CalendarApi>,
}

impl BotHandler {
    pub fn new(
        bot: Bot,
        authorized_user: Option<u64>,
        time_zone: Tz,
        calendar: Arc<dyn CalendarApi>,
    ) -> Self {
        BotHandler {
            bot,
            authorized_user,
            time_zone,
            sessions: Arc::new(Mutex::new(SessionStore::new())),
            calendar,
        }
    }

    pub async fn start(self: Arc<Self>) {
        info!("Starting Telegram dispatcher");

        let handler = dptree::entry()
            .branch(
                Update::filter_message().endpoint({
                    let bot_handler = Arc::clone(&self);
                    move |msg: Message| {
                        let bot_handler = Arc::clone(&bot_handler);
                        async move {
                            bot_handler.handle_message(msg).await;
                            respond(())
                        }
                    }
                }),
            )
            .branch(
                Update::filter_callback_query().endpoint({
                    let bot_handler = Arc::clone(&self);
                    move |q: CallbackQuery| {
                        let bot_handler = Arc::clone(&bot_handler);
                        async move {
                            bot_handler.handle_callback(q).await;
                            respond(())
                        }
                    }
                }),
            );

        Dispatcher::builder(self.bot.clone(), handler)
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }

    /// Sender-identity gate wrapped around every handler. Replies with the
    /// fixed denial and short-circuits on a mismatch.
    async fn check_access(&self, user_id: u64, chat_id: ChatId) -> bool {
        if access::is_authorized(self.authorized_user, user_id) {
            return true;
        }
        warn!(user_id, "rejected interaction from unauthorized sender");
        let _ = self
            .bot
            .send_message(chat_id, access::ACCESS_DENIED_REPLY)
            .await;
        false
    }

    async fn handle_message(&self, msg: Message) {
        let Some(user_id) = msg.from.as_ref().map(|u| u.id.0) else {
            return;
        };
        let Some(text) = msg.text() else {
            return;
        };
        if !self.check_access(user_id, msg.chat.id).await {
            return;
        }

        let today = Utc::now().with_timezone(&self.time_zone).date_naive();
        let reply =
            event_flow::handle_text(&self.sessions, self.calendar.as_ref(), user_id, text, today)
                .await;

        let sent = match reply {
            Reply::Text(text) => self.bot.send_message(msg.chat.id, text).await,
            Reply::Menu { text, keyboard } => {
                self.bot
                    .send_message(msg.chat.id, text)
                    .reply_markup(keyboard)
                    .await
            }
            Reply::Inline { text, keyboard } => {
                self.bot
                    .send_message(msg.chat.id, text)
                    .reply_markup(keyboard)
                    .await
            }
        };
        if let Err(err) = sent {
            warn!(user_id, error = %err, "failed to send reply");
        }
    }

    async fn handle_callback(&self, q: CallbackQuery) {
        let user_id = q.from.id.0;
        let _ = self.bot.answer_callback_query(q.id.clone()).await;

        let Some(MaybeInaccessibleMessage::Regular(message)) = q.message else {
            return;
        };
        if !self.check_access(user_id, message.chat.id).await {
            return;
        }
        let Some(data) = q.data else {
            return;
        };

        let today = Utc::now().with_timezone(&self.time_zone).date_naive();
        let edit = event_flow::handle_callback(&self.sessions, user_id, &data, today).await;

        let result = match edit.keyboard {
            Some(keyboard) => {
                self.bot
                    .edit_message_text(message.chat.id, message.id, edit.text)
                    .reply_markup(keyboard)
                    .await
            }
            None => {
                self.bot
                    .edit_message_text(message.chat.id, message.id, edit.text)
                    .await
            }
        };
        if let Err(err) = result {
            warn!(user_id, error = %err, "failed to edit picker message");
        }
    }
}
