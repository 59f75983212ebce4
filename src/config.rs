use std::collections::HashMap;
use std::fs;

use chrono_tz::Tz;

const DEFAULT_CALENDAR_ID: &str = "primary";
const DEFAULT_TIME_ZONE: Tz = chrono_tz::Europe::Moscow;

#[derive(Debug, Default, Clone)]
pub struct AppConfig {
    values: HashMap<String, String>,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self, String> {
        let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
        let mut values = HashMap::new();
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(format!("Invalid config line {}: {}", idx + 1, line));
            };
            let key = key.trim();
            let mut value = value.trim().to_string();
            if (value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\''))
            {
                value = value[1..value.len() - 1].to_string();
            }
            values.insert(key.to_string(), value);
        }
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Typed view of everything the bot needs before it starts. Immutable for the
/// process lifetime.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram_token: String,
    pub authorized_user_id: Option<u64>,
    pub calendar_id: String,
    pub google_access_token: String,
    pub time_zone: Tz,
}

impl BotConfig {
    pub fn load(get: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let telegram_token = get("TELEGRAM_BOT_TOKEN")
            .ok_or_else(|| "TELEGRAM_BOT_TOKEN must be set".to_string())?;
        let google_access_token = get("GOOGLE_ACCESS_TOKEN")
            .ok_or_else(|| "GOOGLE_ACCESS_TOKEN must be set".to_string())?;
        // A missing or malformed id leaves the bot with no authorized user,
        // which denies every sender.
        let authorized_user_id =
            get("AUTHORIZED_USER_ID").and_then(|v| v.trim().parse::<u64>().ok());
        let calendar_id = get("CALENDAR_ID").unwrap_or_else(|| DEFAULT_CALENDAR_ID.to_string());
        let time_zone = match get("TIME_ZONE") {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|_| format!("Invalid TIME_ZONE: {}", name))?,
            None => DEFAULT_TIME_ZONE,
        };
        Ok(BotConfig {
            telegram_token,
            authorized_user_id,
            calendar_id,
            google_access_token,
            time_zone,
        })
    }
}
