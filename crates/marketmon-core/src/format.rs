//! Presentational formatting shared by every renderer.

use time::Month;

use crate::UtcDateTime;

pub const NOT_AVAILABLE: &str = "N/A";

/// US-dollar amount with thousands separators: `$1,234.56`, `-$1.23`.
///
/// The minus sign follows the value, not its rounding: `-0.001` is `-$0.00`.
pub fn format_price(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}${}.{cents}", group_thousands(whole))
}

pub fn format_optional_price(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_owned(), format_price)
}

pub fn format_volume(volume: Option<u64>) -> String {
    volume.map_or_else(
        || NOT_AVAILABLE.to_owned(),
        |volume| group_thousands(&volume.to_string()),
    )
}

/// Compact capitalization: `$2.50T`, `$812.34B`, `$5.00M`, else a full price.
pub fn format_market_cap(value: Option<f64>) -> String {
    let Some(value) = value else {
        return NOT_AVAILABLE.to_owned();
    };
    if value >= 1e12 {
        format!("${:.2}T", value / 1e12)
    } else if value >= 1e9 {
        format!("${:.2}B", value / 1e9)
    } else if value >= 1e6 {
        format!("${:.2}M", value / 1e6)
    } else {
        format_price(value)
    }
}

/// Signed absolute and relative change: `+$1.23 (+0.45%)`.
///
/// Each part is signed by its own value with the same rule as
/// [`format_price`], so `-0.001` shows as `-$0.00 (-0.00%)`.
pub fn format_change(change: f64, percent: f64) -> String {
    format!(
        "{}{} ({}{:.2}%)",
        sign_of(change),
        format_price(change.abs()),
        sign_of(percent),
        percent.abs()
    )
}

fn sign_of(value: f64) -> &'static str {
    if value < 0.0 {
        "-"
    } else {
        "+"
    }
}

/// Direction of a change; zero counts as up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    pub fn of(change: f64) -> Self {
        if change >= 0.0 {
            Self::Up
        } else {
            Self::Down
        }
    }

    pub const fn arrow(self) -> &'static str {
        match self {
            Self::Up => "▲",
            Self::Down => "▼",
        }
    }
}

/// `HH:MM:SS` in UTC. Falls back to the raw input when it does not parse.
pub fn format_time_of_day(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return NOT_AVAILABLE.to_owned();
    };
    match UtcDateTime::parse(raw) {
        Ok(ts) => {
            let ts = ts.into_inner();
            format!("{:02}:{:02}:{:02}", ts.hour(), ts.minute(), ts.second())
        }
        Err(_) => raw.to_owned(),
    }
}

/// `17 de octubre de 2026, 14:05:09` in UTC.
pub fn format_long_date(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return NOT_AVAILABLE.to_owned();
    };
    match UtcDateTime::parse(raw) {
        Ok(ts) => {
            let ts = ts.into_inner();
            format!(
                "{} de {} de {}, {:02}:{:02}:{:02}",
                ts.day(),
                spanish_month(ts.month()),
                ts.year(),
                ts.hour(),
                ts.minute(),
                ts.second()
            )
        }
        Err(_) => raw.to_owned(),
    }
}

fn spanish_month(month: Month) -> &'static str {
    match month {
        Month::January => "enero",
        Month::February => "febrero",
        Month::March => "marzo",
        Month::April => "abril",
        Month::May => "mayo",
        Month::June => "junio",
        Month::July => "julio",
        Month::August => "agosto",
        Month::September => "septiembre",
        Month::October => "octubre",
        Month::November => "noviembre",
        Month::December => "diciembre",
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (len - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
