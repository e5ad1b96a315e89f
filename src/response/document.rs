//! Envelope detection.
//!
//! Three failure shapes are folded into one [`ResponseError`]: a vendor
//! `<Error>` envelope (at the root or under a `<Package>` / `<TrackInfo>`),
//! a tracking "not found" marker inside an otherwise normal payload, and a
//! body that is not well-formed XML at all.
//!
//! Tracking errors belong to one tracking number, so they are only checked
//! on the `<TrackInfo>` picked by [`Document::track_info`].

use roxmltree::Node;

use crate::error::{ResponseError, ResponseErrorKind};

/// Kind of successful payload, decided by the root element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Payload {
    /// `RateV4Response`
    DomesticRates,
    /// `IntlRateV2Response`
    InternationalRates,
    /// `TrackResponse`
    Tracking,
}

impl Payload {
    fn from_root(name: &str) -> Option<Self> {
        match name {
            "RateV4Response" => Some(Payload::DomesticRates),
            "IntlRateV2Response" => Some(Payload::InternationalRates),
            "TrackResponse" => Some(Payload::Tracking),
            _ => None,
        }
    }

    pub fn is_rates(self) -> bool {
        matches!(self, Payload::DomesticRates | Payload::InternationalRates)
    }
}

/// A parsed response body that passed error detection.
#[derive(Debug)]
pub struct Document<'a> {
    body: &'a str,
    xml: roxmltree::Document<'a>,
    payload: Payload,
}

impl<'a> Document<'a> {
    pub fn parse(bytes: &'a [u8]) -> Result<Self, ResponseError> {
        let body = std::str::from_utf8(bytes).map_err(|err| {
            ResponseError::new(
                ResponseErrorKind::Malformed,
                format!("response is not valid UTF-8: {}", err),
                String::from_utf8_lossy(bytes),
            )
        })?;
        Self::parse_str(body)
    }

    pub fn parse_str(body: &'a str) -> Result<Self, ResponseError> {
        let xml = roxmltree::Document::parse(body).map_err(|err| {
            ResponseError::new(ResponseErrorKind::Malformed, format!("malformed XML response: {}", err), body)
        })?;

        let root = xml.root_element();
        if root.has_tag_name("Error") {
            return Err(vendor_error(root, body));
        }

        let name = root.tag_name().name();
        let payload = Payload::from_root(name).ok_or_else(|| {
            ResponseError::new(
                ResponseErrorKind::UnknownRoot,
                format!("Unknown root node in XML response: '{}'", name),
                body,
            )
        })?;

        if payload.is_rates() {
            if let Some(error) = elements(root, "Package").find_map(|package| child(package, "Error")) {
                return Err(vendor_error(error, body));
            }
        }

        Ok(Document { body, xml, payload })
    }

    pub fn payload(&self) -> Payload {
        self.payload
    }

    /// The raw response body.
    pub fn body(&self) -> &'a str {
        self.body
    }

    pub(crate) fn root(&self) -> Node<'_, 'a> {
        self.xml.root_element()
    }

    /// The `<TrackInfo>` for `tracking_number`, or the first one when no `ID`
    /// matches. Fails when that record carries an error or a not-found
    /// marker; other records are not inspected.
    pub(crate) fn track_info(&self, tracking_number: &str) -> Result<Option<Node<'_, 'a>>, ResponseError> {
        let wanted = tracking_number.trim();
        let info = elements(self.root(), "TrackInfo")
            .find(|info| info.attribute("ID").is_some_and(|id| id.trim() == wanted))
            .or_else(|| elements(self.root(), "TrackInfo").next());

        match info {
            Some(info) => check_track_info(info, self.body).map(|()| Some(info)),
            None => Ok(None),
        }
    }

    /// An error carrying this document's raw body.
    pub(crate) fn error(&self, kind: ResponseErrorKind, message: impl Into<String>) -> ResponseError {
        ResponseError::new(kind, message, self.body)
    }
}

fn is_not_found(text: &str) -> bool {
    regex!(r"(?i)there is no record of that mail item|this information has not been included in this test server\.|delivery status information is not available|could not locate the tracking information")
        .is_match(text)
}

fn vendor_error(error: Node<'_, '_>, body: &str) -> ResponseError {
    let number = child_text(error, "Number").map(str::to_string);
    let message = child_text(error, "Description").unwrap_or("unknown vendor error").to_string();
    ResponseError::new(ResponseErrorKind::Vendor { number }, message, body)
}

fn check_track_info(info: Node<'_, '_>, body: &str) -> Result<(), ResponseError> {
    if let Some(error) = child(info, "Error") {
        let mut err = vendor_error(error, body);
        if is_not_found(&err.message) {
            err.kind = ResponseErrorKind::NotFound;
        }
        return Err(err);
    }

    for status in ["StatusSummary", "TrackSummary"] {
        if let Some(text) = child_text(info, status).filter(|text| is_not_found(text)) {
            return Err(ResponseError::new(ResponseErrorKind::NotFound, text, body));
        }
    }
    Ok(())
}

pub(crate) fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.is_element() && n.has_tag_name(name))
}

/// Trimmed text of the first child element called `name`.
pub(crate) fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    child(node, name)?.text().map(str::trim)
}

pub(crate) fn elements<'a, 'input>(node: Node<'a, 'input>, name: &'static str) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |n| n.is_element() && n.has_tag_name(name))
}
