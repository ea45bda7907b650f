//! Conversions between stored 24h times and what people type or read.

use std::sync::LazyLock;

use regex::Regex;

static TIME_INPUT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d{1,2}):?(\d{0,2})\s*(am|pm|a|p)?$").ok());

/// Render a stored `HH:MM` time as `h:MM AM/PM`.
///
/// Blank input renders as an empty string.
#[must_use]
pub fn format_12h(time24: &str) -> String {
    let time24 = time24.trim();
    if time24.is_empty() {
        return String::new();
    }
    let (hours, minutes) = time24.split_once(':').unwrap_or((time24, "00"));
    let Ok(hour) = hours.parse::<u32>() else {
        return time24.to_owned();
    };
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    let meridiem = if hour >= 12 { "PM" } else { "AM" };
    format!("{hour12}:{minutes} {meridiem}")
}

/// Convert free-form time input to stored `HH:MM`.
///
/// Accepts `14:30`, `2:30 pm`, `1030p`, `9a`, and similar. Input that is
/// already five characters with a colon is returned as-is; anything that
/// cannot be parsed is returned unchanged.
#[must_use]
pub fn parse_time_input(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    if input.contains(':') && input.len() == 5 {
        return input.to_owned();
    }

    let Some(pattern) = TIME_INPUT.as_ref() else {
        return input.to_owned();
    };
    let lowered = input.to_lowercase();
    let Some(caps) = pattern.captures(&lowered) else {
        return input.to_owned();
    };

    let Some(mut hours) = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) else {
        return input.to_owned();
    };
    let minutes = caps
        .get(2)
        .map(|m| m.as_str())
        .filter(|m| !m.is_empty())
        .and_then(|m| m.parse::<u32>().ok())
        .unwrap_or(0);

    if let Some(meridiem) = caps.get(3).map(|m| m.as_str()) {
        if meridiem.starts_with('p') && hours != 12 {
            hours += 12;
        }
        if meridiem.starts_with('a') && hours == 12 {
            hours = 0;
        }
    }

    format!("{hours:02}:{minutes:02}")
}
