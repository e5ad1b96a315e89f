//! Helpers for building tracking events out of narration captures.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Captures;

use crate::shipment::{Location, TrackingEvent};

pub(crate) static MONTH_NAME: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    HashMap::from([
        ("january", 1),
        ("jan", 1),
        ("february", 2),
        ("feb", 2),
        ("march", 3),
        ("mar", 3),
        ("april", 4),
        ("apr", 4),
        ("may", 5),
        ("june", 6),
        ("jun", 6),
        ("july", 7),
        ("jul", 7),
        ("august", 8),
        ("aug", 8),
        ("september", 9),
        ("sept", 9),
        ("sep", 9),
        ("october", 10),
        ("oct", 10),
        ("november", 11),
        ("nov", 11),
        ("december", 12),
        ("dec", 12),
    ])
});

pub fn month_from_name(name: &str) -> Option<u32> {
    MONTH_NAME.get(name.trim().trim_end_matches('.').to_lowercase().as_str()).copied()
}

/// Calendar date from the `month`, `day` and `year` capture groups.
pub fn date_from(caps: &Captures<'_>) -> Option<NaiveDate> {
    let month = month_from_name(caps.name("month")?.as_str())?;
    let day: u32 = caps.name("day")?.as_str().parse().ok()?;
    let year: i32 = caps.name("year")?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Wall-clock time from a 12-hour reading. `meridiem` is `a` or `p`.
pub fn clock_from(hour: u32, minute: u32, meridiem: &str) -> Option<NaiveTime> {
    if !(1..=12).contains(&hour) {
        return None;
    }

    let hour = match (meridiem.to_ascii_lowercase().as_str(), hour) {
        ("a", 12) => 0,
        ("a", h) => h,
        ("p", 12) => 12,
        ("p", h) => h + 12,
        _ => return None,
    };

    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Wall-clock time from the `hour`, `minute` and `meridiem` capture groups.
pub fn time_from(caps: &Captures<'_>) -> Option<NaiveTime> {
    let hour: u32 = caps.name("hour")?.as_str().parse().ok()?;
    let minute: u32 = caps.name("minute")?.as_str().parse().ok()?;
    clock_from(hour, minute, caps.name("meridiem")?.as_str())
}

/// Parse a standalone date such as `October 9, 2013`.
pub fn parse_event_date(text: &str) -> Option<NaiveDate> {
    let caps = regex!(r"(?i)^\s*(?P<month>[a-z]+)\.?\s+(?P<day>\d{1,2}),?\s+(?P<year>\d{4})\s*$").captures(text)?;
    date_from(&caps)
}

/// Parse a standalone 12-hour time such as `10:16 am`.
pub fn parse_event_time(text: &str) -> Option<NaiveTime> {
    let caps =
        regex!(r"(?i)^\s*(?P<hour>\d{1,2}):(?P<minute>\d{2})\s*(?P<meridiem>[ap])\.?\s*m\.?\s*$").captures(text)?;
    time_from(&caps)
}

/// Split the trailing `City, ST 12345` segment of a narration line.
///
/// Each part is optional; a segment without a comma is read as state/zip
/// when it looks like one and as a city otherwise.
pub fn location_from(segment: Option<&str>) -> Location {
    let Some(segment) = segment.map(str::trim).filter(|s| !s.is_empty()) else {
        return Location::default();
    };

    let (city, tail) = match segment.rsplit_once(',') {
        Some((city, tail)) => (Some(city.trim()), tail.trim()),
        None => (None, segment),
    };

    let state_zip = regex!(r"^(?P<state>[A-Za-z]{2})?\s*(?P<zip>\d{5}(?:-\d{4})?)?$");
    match state_zip.captures(tail).filter(|caps| caps.get(0).is_some_and(|m| !m.as_str().is_empty())) {
        Some(caps) => Location::new(
            city,
            caps.name("state").map(|m| m.as_str().to_ascii_uppercase()).as_deref(),
            caps.name("zip").map(|m| m.as_str()),
        ),
        None => {
            // Whole tail is a place name.
            let city = match city {
                Some(city) if tail.is_empty() => city.to_string(),
                Some(city) => format!("{}, {}", city, tail),
                None => tail.to_string(),
            };
            Location::new(Some(city.as_str()), None, None)
        }
    }
}

/// Assemble an event. Narration carries no zone, so local time is read as
/// UTC.
pub fn event_at(description: &str, date: NaiveDate, time: NaiveTime, location: Location) -> TrackingEvent {
    TrackingEvent {
        description: description.trim().to_uppercase(),
        time: Utc.from_utc_datetime(&NaiveDateTime::new(date, time)),
        location,
    }
}
