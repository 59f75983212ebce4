#![allow(non_snake_case)]

use std::env;

use calendarBot::config::{AppConfig, BotConfig};
use calendarBot::runtime;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match env::var("CONFIG_FILE") {
        Ok(path) => AppConfig::from_file(&path).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    };

    let get_prop = |key: &str| -> Option<String> {
        config.get(key).or_else(|| env::var(key).ok())
    };

    let bot_config = match BotConfig::load(get_prop) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Configuration error: {}", err);
            std::process::exit(1);
        }
    };

    runtime::run_bot(bot_config).await;
}
