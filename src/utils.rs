use chrono::{DateTime, TimeZone};
use std::fmt::Display;

/// `HH:MM:SS` prefix used on every status line.
pub fn format_clock<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    at.format("%H:%M:%S").to_string()
}
