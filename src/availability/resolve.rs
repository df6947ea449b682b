//! Turns a recurring weekly slot into the concrete calendar dates a mentee can
//! pick from. Everything here works on local calendar days and never reads
//! the clock; callers pass the first day of the window in.

use time::{Date, Duration, Weekday};

pub const DEFAULT_WINDOW_DAYS: u32 = 14;

/// Day symbols as stored on availability slots.
pub const WEEKDAYS: [(&str, Weekday); 7] = [
    ("Sunday", Weekday::Sunday),
    ("Monday", Weekday::Monday),
    ("Tuesday", Weekday::Tuesday),
    ("Wednesday", Weekday::Wednesday),
    ("Thursday", Weekday::Thursday),
    ("Friday", Weekday::Friday),
    ("Saturday", Weekday::Saturday),
];

pub fn parse_weekday(symbol: &str) -> Option<Weekday> {
    WEEKDAYS
        .iter()
        .find(|(name, _)| *name == symbol)
        .map(|&(_, day)| day)
}

/// Dates within `window_length_days` days from `window_start` (inclusive)
/// that fall on `day_of_week`, ascending.
///
/// An unrecognised day symbol resolves to no dates at all.
pub fn resolve_dates(day_of_week: &str, window_start: Date, window_length_days: u32) -> Vec<Date> {
    let Some(target) = parse_weekday(day_of_week) else {
        return Vec::new();
    };
    dates_on(target, window_start, window_length_days)
}

pub fn dates_on(target: Weekday, window_start: Date, window_length_days: u32) -> Vec<Date> {
    (0..window_length_days)
        .map_while(|offset| window_start.checked_add(Duration::days(offset.into())))
        .filter(|date| date.weekday() == target)
        .collect()
}
