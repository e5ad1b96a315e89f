//! Rate and tracking value objects produced by the response extractors.

use std::fmt;

use chrono::{DateTime, Utc};

/// Price of one service for the requested packages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rate {
    /// Carrier-assigned identifier (`CLASSID` / `ID`).
    pub service_code: String,
    /// Display name with vendor markup removed.
    pub service_name: String,
    /// Total price in cents (USD). Zero means the service is named but not
    /// offered for the active account type.
    pub price: i64,
    /// Per-package prices in cents, in package order.
    pub package_rates: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
}

impl Location {
    pub fn new(city: Option<&str>, state: Option<&str>, postal_code: Option<&str>) -> Self {
        let owned = |s: Option<&str>| s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        Self { city: owned(city), state: owned(state), postal_code: owned(postal_code) }
    }

    pub fn is_empty(&self) -> bool {
        self.city.is_none() && self.state.is_none() && self.postal_code.is_none()
    }

    /// Tracking locations are always domestic.
    pub fn country(&self) -> Option<&'static str> {
        if self.is_empty() { None } else { Some("USA") }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> =
            [&self.city, &self.state, &self.postal_code].into_iter().filter_map(|p| p.as_deref()).collect();
        f.write_str(&parts.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingEvent {
    /// Upper-cased event description, e.g. `OUT FOR DELIVERY`.
    pub description: String,
    pub time: DateTime<Utc>,
    pub location: Location,
}

impl TrackingEvent {
    pub fn status(&self) -> TrackingStatus {
        TrackingStatus::from_description(&self.description)
    }
}

/// Shipment status derived from an event description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackingStatus {
    Accepted,
    Processed,
    Departed,
    ArrivedAtFacility,
    InTransit,
    OutForDelivery,
    NoticeLeft,
    Delivered,
    Unknown,
}

/// Checked in order; the first fragment contained in the description wins.
const STATUS_LOOKUP: &[(&str, TrackingStatus)] = &[
    ("OUT FOR DELIVERY", TrackingStatus::OutForDelivery),
    ("NOTICE LEFT", TrackingStatus::NoticeLeft),
    ("DELIVERED", TrackingStatus::Delivered),
    ("ARRIV", TrackingStatus::ArrivedAtFacility),
    ("DEPART", TrackingStatus::Departed),
    ("PROCESSED", TrackingStatus::Processed),
    ("SORTING", TrackingStatus::Processed),
    ("ACCEPT", TrackingStatus::Accepted),
];

impl TrackingStatus {
    pub fn from_description(description: &str) -> Self {
        let upper = description.to_uppercase();
        STATUS_LOOKUP
            .iter()
            .find(|(fragment, _)| upper.contains(fragment))
            .map(|(_, status)| *status)
            .unwrap_or(TrackingStatus::InTransit)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TrackingStatus::Accepted => "accepted",
            TrackingStatus::Processed => "processed",
            TrackingStatus::Departed => "departed",
            TrackingStatus::ArrivedAtFacility => "arrived_at_facility",
            TrackingStatus::InTransit => "in_transit",
            TrackingStatus::OutForDelivery => "out_for_delivery",
            TrackingStatus::NoticeLeft => "notice_left",
            TrackingStatus::Delivered => "delivered",
            TrackingStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TrackingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingResponse {
    /// Tracking number as supplied by the caller.
    pub tracking_number: String,
    /// Events in ascending time order.
    pub events: Vec<TrackingEvent>,
    pub status: TrackingStatus,
    pub delivered: bool,
    /// Time of the delivery event, when delivered.
    pub actual_delivery_date: Option<DateTime<Utc>>,
    /// Never reported by this vendor's tracking payload.
    pub destination: Option<Location>,
}

impl TrackingResponse {
    pub fn latest_event(&self) -> Option<&TrackingEvent> {
        self.events.last()
    }
}
