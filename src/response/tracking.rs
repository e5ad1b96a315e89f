//! Tracking extraction and assembly.
//!
//! `<TrackDetail>` entries come newest-first and `<TrackSummary>` holds the
//! latest event. Each entry is either a one-line narration or a set of
//! structured `Event*` children; both end up as [`TrackingEvent`]s.

use chrono::NaiveTime;
use roxmltree::Node;
use tracing::{debug, warn};

use super::document::{Document, Payload, child, child_text, elements};
use crate::api::parse_event;
use crate::error::{ResponseError, ResponseErrorKind};
use crate::rules::tracking::helpers::{event_at, parse_event_date, parse_event_time};
use crate::shipment::{Location, TrackingEvent, TrackingResponse, TrackingStatus};

pub(crate) fn extract_tracking(doc: &Document<'_>, tracking_number: &str) -> Result<TrackingResponse, ResponseError> {
    if doc.payload() != Payload::Tracking {
        return Err(doc.error(ResponseErrorKind::UnknownRoot, "expected a tracking response, got a rate response"));
    }

    let events: Vec<TrackingEvent> = match doc.track_info(tracking_number)? {
        Some(info) => elements(info, "TrackDetail").chain(elements(info, "TrackSummary")).filter_map(event_from_node).collect(),
        None => Vec::new(),
    };

    debug!(tracking_number, events = events.len(), "extracted tracking events");
    Ok(assemble(tracking_number, events))
}

fn event_from_node(node: Node<'_, '_>) -> Option<TrackingEvent> {
    if child(node, "Event").is_some() {
        return structured_event(node);
    }

    let line = node.text()?.trim();
    if line.is_empty() {
        return None;
    }

    let event = parse_event(line);
    if event.is_none() {
        warn!(line, "skipping unrecognised tracking line");
    }
    event
}

/// `<Event>`, `<EventDate>`, `<EventTime>` and the `EventCity` /
/// `EventState` / `EventZIPCode` location parts.
fn structured_event(node: Node<'_, '_>) -> Option<TrackingEvent> {
    let description = child_text(node, "Event").filter(|d| !d.is_empty())?;

    let Some(date) = child_text(node, "EventDate").and_then(parse_event_date) else {
        warn!(description, "skipping tracking event without a readable date");
        return None;
    };
    let time = match child_text(node, "EventTime").filter(|t| !t.is_empty()) {
        Some(text) => match parse_event_time(text) {
            Some(time) => time,
            None => {
                warn!(description, time = text, "skipping tracking event with an unreadable time");
                return None;
            }
        },
        None => NaiveTime::from_hms_opt(0, 0, 0)?,
    };

    let location = Location::new(
        child_text(node, "EventCity"),
        child_text(node, "EventState"),
        child_text(node, "EventZIPCode"),
    );
    Some(event_at(description, date, time, location))
}

/// Order `events` by time and derive the shipment status from the latest one.
///
/// The sort is stable, so events sharing a timestamp keep their input order.
pub fn assemble(tracking_number: &str, mut events: Vec<TrackingEvent>) -> TrackingResponse {
    events.sort_by_key(|event| event.time);

    let status = events.last().map(TrackingEvent::status).unwrap_or(TrackingStatus::Unknown);
    let delivered = status == TrackingStatus::Delivered;
    let actual_delivery_date = if delivered { events.last().map(|event| event.time) } else { None };

    TrackingResponse {
        tracking_number: tracking_number.to_string(),
        events,
        status,
        delivered,
        actual_delivery_date,
        destination: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const NARRATED: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/tracking_response.xml"));
    const STRUCTURED: &str =
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/tracking_structured_response.xml"));

    fn track(body: &str) -> TrackingResponse {
        let doc = Document::parse_str(body).unwrap();
        extract_tracking(&doc, "9102901000462189604217").unwrap()
    }

    #[test]
    fn narrated_history_is_ordered_oldest_first() {
        let response = track(NARRATED);

        assert_eq!(response.tracking_number, "9102901000462189604217");
        assert_eq!(response.events.len(), 7);
        assert_eq!(response.status, TrackingStatus::OutForDelivery);
        assert!(!response.delivered);
        assert_eq!(response.actual_delivery_date, None);
        assert_eq!(response.destination, None);

        let first = &response.events[0];
        assert_eq!(first.description, "ACCEPTANCE");
        assert_eq!(first.location.city.as_deref(), Some("NORTH BERGEN"));

        let latest = response.latest_event().unwrap();
        assert_eq!(latest.description, "OUT FOR DELIVERY");
        assert_eq!(latest.time, Utc.with_ymd_and_hms(2013, 10, 9, 10, 16, 0).unwrap());
        assert_eq!(latest.location.to_string(), "BROOKLYN, NY, 11201");

        assert!(response.events.windows(2).all(|pair| pair[0].time <= pair[1].time));
    }

    #[test]
    fn structured_history_reports_delivery() {
        let response = track(STRUCTURED);

        assert_eq!(response.events.len(), 3);
        assert_eq!(response.status, TrackingStatus::Delivered);
        assert!(response.delivered);

        let delivered_at = Utc.with_ymd_and_hms(2013, 10, 10, 14, 2, 0).unwrap();
        assert_eq!(response.actual_delivery_date, Some(delivered_at));

        let latest = response.latest_event().unwrap();
        assert_eq!(latest.description, "DELIVERED, IN/AT MAILBOX");
        assert_eq!(latest.location.state.as_deref(), Some("NY"));
        assert_eq!(latest.location.postal_code.as_deref(), Some("11201"));
        assert_eq!(latest.location.country(), Some("USA"));
    }

    #[test]
    fn unreadable_lines_are_skipped() {
        let body = r#"<TrackResponse><TrackInfo ID="X">
            <TrackSummary>Your item was delivered at 8:10 am on June 1 in BOSTON MA 02109.</TrackSummary>
            <TrackDetail>Acceptance, May 30, 2014, 3:55 pm, BOSTON, MA 02109</TrackDetail>
        </TrackInfo></TrackResponse>"#;
        let doc = Document::parse_str(body).unwrap();
        let response = extract_tracking(&doc, "X").unwrap();

        assert_eq!(response.events.len(), 1);
        assert_eq!(response.status, TrackingStatus::Accepted);
    }

    #[test]
    fn only_the_requested_tracking_number_is_read() {
        let body = r#"<TrackResponse>
            <TrackInfo ID="AAA"><TrackSummary>Out for Delivery, October 9, 2013, 10:16 am, BROOKLYN, NY 11201</TrackSummary></TrackInfo>
            <TrackInfo ID="BBB"><TrackSummary>Delivered, October 10, 2013, 2:02 pm, BROOKLYN, NY 11201</TrackSummary></TrackInfo>
        </TrackResponse>"#;
        let doc = Document::parse_str(body).unwrap();

        let response = extract_tracking(&doc, "AAA").unwrap();
        assert_eq!(response.events.len(), 1);
        assert_eq!(response.status, TrackingStatus::OutForDelivery);
        assert!(!response.delivered);

        let response = extract_tracking(&doc, "BBB").unwrap();
        assert_eq!(response.events.len(), 1);
        assert!(response.delivered);
    }

    #[test]
    fn another_numbers_error_does_not_fail_the_parse() {
        let body = r#"<TrackResponse>
            <TrackInfo ID="AAA"><TrackSummary>Out for Delivery, October 9, 2013, 10:16 am, BROOKLYN, NY 11201</TrackSummary></TrackInfo>
            <TrackInfo ID="BBB"><Error><Number>-2147219283</Number><Description>The Postal Service could not locate the tracking information for your request.</Description></Error></TrackInfo>
        </TrackResponse>"#;
        let doc = Document::parse_str(body).unwrap();

        let response = extract_tracking(&doc, "AAA").unwrap();
        assert_eq!(response.status, TrackingStatus::OutForDelivery);

        let err = extract_tracking(&doc, "BBB").unwrap_err();
        assert_eq!(err.kind, ResponseErrorKind::NotFound);
        assert_eq!(err.response, body);
    }

    #[test]
    fn assemble_keeps_input_order_for_equal_times() {
        let at = Utc.with_ymd_and_hms(2013, 10, 9, 10, 16, 0).unwrap();
        let event = |description: &str| TrackingEvent {
            description: description.to_string(),
            time: at,
            location: Location::default(),
        };

        let response = assemble("X", vec![event("ARRIVAL AT UNIT"), event("DELIVERED")]);
        assert_eq!(response.status, TrackingStatus::Delivered);
        assert_eq!(response.actual_delivery_date, Some(at));

        let response = assemble("X", vec![event("DELIVERED"), event("ARRIVAL AT UNIT")]);
        assert_eq!(response.status, TrackingStatus::ArrivedAtFacility);
        assert!(!response.delivered);
    }

    #[test]
    fn no_events_means_unknown_status() {
        let response = assemble("X", Vec::new());
        assert_eq!(response.status, TrackingStatus::Unknown);
        assert!(response.events.is_empty());
        assert_eq!(response.actual_delivery_date, None);
    }

    #[test]
    fn rate_document_is_not_a_tracking_response() {
        let doc = Document::parse_str("<RateV4Response><Package ID=\"0\"/></RateV4Response>").unwrap();
        let err = extract_tracking(&doc, "X").unwrap_err();
        assert_eq!(err.kind, ResponseErrorKind::UnknownRoot);
    }
}
