//! Tracking narration rules, highest priority first.
//!
//! Canonical shape:
//!
//! ```text
//! Out for Delivery, October 9, 2013, 10:16 am, BROOKLYN, NY 11201
//! <description>,    <month> <d>, <yyyy>, <h:mm> <am|pm>, <city>, <ST> <zip>
//! ```
//!
//! The description is matched lazily up to the first `, <month> <day>, <year>`
//! so descriptions that contain commas (`Delivered, In/At Mailbox`) survive.

use chrono::NaiveTime;

use crate::engine::Features;
use crate::rules::tracking::helpers::{date_from, event_at, location_from, time_from};
use crate::shipment::TrackingEvent;
use crate::Rule;

/// `<description>, <month> <day>, <year>, <h:mm> <am|pm>[, <location>]`
fn rule_narration_with_time() -> Rule<TrackingEvent> {
    rule! {
        name: "narration with time of day",
        pattern: r"(?i)^\s*(?P<desc>.+?)\s*,\s*(?P<month>january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec)\.?\s+(?P<day>\d{1,2})\s*,\s*(?P<year>\d{4})\s*,\s*(?P<hour>\d{1,2}):(?P<minute>\d{2})\s*(?P<meridiem>[ap])\.?\s*m\.?\s*(?:,\s*(?P<location>.*?))?\s*$",
        features: Features::MONTHISH | Features::CLOCK,
        prod: |caps| -> Option<TrackingEvent> {
            let date = date_from(caps)?;
            let time = time_from(caps)?;
            let location = location_from(caps.name("location").map(|m| m.as_str()));
            Some(event_at(caps.name("desc")?.as_str(), date, time, location))
        },
    }
}

/// `<description>, <month> <day>, <year>[, <location>]` (midnight).
fn rule_narration_date_only() -> Rule<TrackingEvent> {
    rule! {
        name: "narration with date only",
        pattern: r"(?i)^\s*(?P<desc>.+?)\s*,\s*(?P<month>january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec)\.?\s+(?P<day>\d{1,2})\s*,\s*(?P<year>\d{4})\s*(?:,\s*(?P<location>.*?))?\s*$",
        features: Features::MONTHISH | Features::HAS_DIGITS,
        prod: |caps| -> Option<TrackingEvent> {
            let location = caps.name("location").map(|m| m.as_str());
            // A clock here means the timed rule rejected the line.
            if location.is_some_and(|l| regex!(r"^\d{1,2}:\d{2}").is_match(l)) {
                return None;
            }

            let date = date_from(caps)?;
            let midnight = NaiveTime::from_hms_opt(0, 0, 0)?;
            Some(event_at(caps.name("desc")?.as_str(), date, midnight, location_from(location)))
        },
    }
}

pub fn get() -> Vec<Rule<TrackingEvent>> {
    vec![rule_narration_with_time(), rule_narration_date_only()]
}
