use chrono::{Datelike, NaiveDate};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Callback payloads look like `datepick:<step>:<partial selection>`, e.g.
/// `datepick:month:2024-06`. The whole selection round-trips through the
/// payload, so rendering is a pure function of it and no step state lives on
/// the server.
pub const CALLBACK_PREFIX: &str = "datepick";

const YEAR_SPAN: i32 = 4;
const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, PartialEq)]
pub enum PickerOutcome {
    /// Intermediate step: show (or re-show) a prompt plus a keyboard.
    Render {
        prompt: String,
        keyboard: InlineKeyboardMarkup,
    },
    /// The walk is complete.
    Picked(NaiveDate),
}

/// First render of a selection round: the year grid.
pub fn start(today: NaiveDate) -> PickerOutcome {
    render_years(today)
}

/// Decode one callback payload and either advance to the next step or yield
/// the finalized date. Malformed or stale payloads restart at the year step
/// rather than failing the flow.
pub fn advance(payload: &str, today: NaiveDate) -> PickerOutcome {
    let mut parts = payload.splitn(3, ':');
    let (Some(prefix), Some(step), Some(value)) = (parts.next(), parts.next(), parts.next())
    else {
        return render_years(today);
    };
    if prefix != CALLBACK_PREFIX {
        return render_years(today);
    }

    match step {
        "year" => match value.parse::<i32>() {
            Ok(year) => render_months(year),
            Err(_) => render_years(today),
        },
        "month" => match parse_year_month(value) {
            Some((year, month)) => render_days(year, month, today),
            None => render_years(today),
        },
        "day" => match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            Ok(date) => PickerOutcome::Picked(date),
            Err(_) => render_years(today),
        },
        _ => render_years(today),
    }
}

fn parse_year_month(value: &str) -> Option<(i32, u32)> {
    let (year, month) = value.split_once('-')?;
    let year = year.parse::<i32>().ok()?;
    let month = month.parse::<u32>().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some((year, month))
}

fn render_years(today: NaiveDate) -> PickerOutcome {
    let first = today.year();
    let buttons: Vec<InlineKeyboardButton> = (first..first + YEAR_SPAN)
        .map(|year| {
            InlineKeyboardButton::callback(
                year.to_string(),
                format!("{}:year:{}", CALLBACK_PREFIX, year),
            )
        })
        .collect();
    PickerOutcome::Render {
        prompt: "📅 Select a year".to_string(),
        keyboard: InlineKeyboardMarkup::new(vec![buttons]),
    }
}

fn render_months(year: i32) -> PickerOutcome {
    let rows: Vec<Vec<InlineKeyboardButton>> = MONTH_LABELS
        .chunks(4)
        .enumerate()
        .map(|(row, labels)| {
            labels
                .iter()
                .enumerate()
                .map(|(col, label)| {
                    let month = row * 4 + col + 1;
                    InlineKeyboardButton::callback(
                        *label,
                        format!("{}:month:{}-{:02}", CALLBACK_PREFIX, year, month),
                    )
                })
                .collect()
        })
        .collect();
    PickerOutcome::Render {
        prompt: "📅 Select a month".to_string(),
        keyboard: InlineKeyboardMarkup::new(rows),
    }
}

fn render_days(year: i32, month: u32, today: NaiveDate) -> PickerOutcome {
    let Some(days) = days_in_month(year, month) else {
        return render_years(today);
    };
    let rows: Vec<Vec<InlineKeyboardButton>> = (1..=days)
        .map(|day| {
            InlineKeyboardButton::callback(
                day.to_string(),
                format!("{}:day:{}-{:02}-{:02}", CALLBACK_PREFIX, year, month, day),
            )
        })
        .collect::<Vec<_>>()
        .chunks(7)
        .map(|chunk| chunk.to_vec())
        .collect();
    PickerOutcome::Render {
        prompt: "📅 Select a day".to_string(),
        keyboard: InlineKeyboardMarkup::new(rows),
    }
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next_month.and_then(|d| d.pred_opt()).map(|d| d.day())
}
