use std::sync::Arc;

use teloxide::Bot;

use crate::clients::google_calendar::GoogleCalendarClient;
use crate::config::BotConfig;
use crate::handlers::telegram::BotHandler;
use crate::service::calendar_service::{CalendarApi, CalendarService};

pub async fn run_bot(config: BotConfig) {
    let bot = Bot::new(&config.telegram_token);
    let client = GoogleCalendarClient::new(
        config.google_access_token,
        config.calendar_id,
        config.time_zone,
    );
    let calendar: Arc<dyn CalendarApi> = Arc::new(CalendarService::new(client));

    let handler = Arc::new(BotHandler::new(
        bot,
        config.authorized_user_id,
        config.time_zone,
        calendar,
    ));
    handler.start().await;
}
