//! Parsing and rendering of the two temporal columns.
//!
//! Accepted inputs, after trimming:
//!
//! - `YYYY-MM-DD`
//! - `YYYY-MM-DD HH:MM:SS[.fraction]`, with a space or `T` separator
//! - the same with a trailing `+HH:MM` offset, or any RFC 3339 timestamp
//!
//! Offsets are dropped after parsing; the wall-clock value is kept.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

pub fn parse_timestamp(input: &str) -> Option<PrimitiveDateTime> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(date) = Date::parse(input, format_description!("[year]-[month]-[day]")) {
        return Some(PrimitiveDateTime::new(date, Time::MIDNIGHT));
    }

    let spaced = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]"
    );
    let t_separated = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
    );
    if let Ok(value) = PrimitiveDateTime::parse(input, spaced) {
        return Some(value);
    }
    if let Ok(value) = PrimitiveDateTime::parse(input, t_separated) {
        return Some(value);
    }

    let spaced_with_offset = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]][offset_hour sign:mandatory]:[offset_minute]"
    );
    OffsetDateTime::parse(input, spaced_with_offset)
        .or_else(|_| OffsetDateTime::parse(input, &Rfc3339))
        .ok()
        .map(|value| PrimitiveDateTime::new(value.date(), value.time()))
}

/// Calendar date of any accepted timestamp shape.
pub fn parse_calendar_date(input: &str) -> Option<Date> {
    parse_timestamp(input).map(PrimitiveDateTime::date)
}

pub fn format_date(date: Date) -> String {
    date.to_string()
}

/// `YYYY-MM-DD HH:MM:SS`, with a fraction only when one is present.
pub fn format_timestamp(value: PrimitiveDateTime) -> String {
    let mut rendered = format!(
        "{} {:02}:{:02}:{:02}",
        value.date(),
        value.hour(),
        value.minute(),
        value.second()
    );

    let nanos = value.nanosecond();
    if nanos != 0 {
        let fraction = format!("{nanos:09}");
        rendered.push('.');
        rendered.push_str(fraction.trim_end_matches('0'));
    }

    rendered
}

fn local_now_offset() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Today on the local clock, falling back to UTC when the offset is unknown.
pub fn local_today() -> Date {
    local_now_offset().date()
}

/// Local wall-clock time truncated to whole seconds.
pub fn local_now() -> PrimitiveDateTime {
    let now = local_now_offset();
    let time = now.time().replace_nanosecond(0).unwrap_or(now.time());
    PrimitiveDateTime::new(now.date(), time)
}
