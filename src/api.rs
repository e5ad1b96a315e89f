use crate::constraints::LabeledConstraints;
use crate::engine::RuleSet;
use crate::error::{MalformedConstraintSentence, ResponseError};
use crate::package::Package;
use crate::request::Service;
use crate::response::{Document, Payload, extract_rates, extract_tracking};
use crate::rules::constraints::helpers::normalize_sentence;
use crate::shipment::{Rate, TrackingEvent, TrackingResponse};
use once_cell::sync::Lazy;

static CONSTRAINT_RULES: Lazy<RuleSet<Vec<LabeledConstraints>>> =
    Lazy::new(|| RuleSet::new(crate::rules::constraints::rules::get()));
static NARRATION_RULES: Lazy<RuleSet<TrackingEvent>> = Lazy::new(|| RuleSet::new(crate::rules::tracking::rules::get()));

/// Which price column of a rate response applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AccountType {
    #[default]
    Retail,
    CommercialBase,
    CommercialPlus,
}

impl AccountType {
    /// Accepts `retail`, `commercial_base` / `commercial base` / `base` and
    /// `commercial_plus` / `commercial plus` / `plus`.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "retail" => Some(AccountType::Retail),
            "commercial_base" | "base" | "commercial" => Some(AccountType::CommercialBase),
            "commercial_plus" | "plus" => Some(AccountType::CommercialPlus),
            _ => None,
        }
    }
}

/// What to do with a limit sentence no grammar understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UnmatchedSentence {
    /// Drop the service for the package.
    #[default]
    Reject,
    /// Keep the service, enforcing only its weight limit.
    Unconstrained,
}

/// Options for rate extraction.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub account_type: AccountType,
    /// Service that was requested, if the request named one.
    pub service: Option<Service>,
    /// First-class mail type sent with a first-class `service`.
    pub first_class_mail_type: Option<String>,
    pub unmatched_sentence: UnmatchedSentence,
}

/// Parse a vendor limit sentence into one or more alternative constraint
/// sets.
///
/// # Example
/// ```
/// use mailpiece::{Limit, parse_constraints};
///
/// let parsed = parse_constraints(r#"Max. length 42", max. length plus girth 79""#).unwrap();
/// assert_eq!(parsed[0].constraints.get(Limit::Length), Some(42.0));
/// assert_eq!(parsed[0].constraints.get(Limit::LengthPlusGirth), Some(79.0));
/// ```
pub fn parse_constraints(sentence: &str) -> Result<Vec<LabeledConstraints>, MalformedConstraintSentence> {
    CONSTRAINT_RULES
        .first_match(&normalize_sentence(sentence))
        .map(|matched| matched.value)
        .ok_or_else(|| MalformedConstraintSentence { sentence: sentence.to_string() })
}

/// Rule-level detail of a constraint parse, for debugging grammars.
#[derive(Debug, Clone)]
pub struct ConstraintTrace {
    /// Sentence after normalization.
    pub normalized: String,
    /// Rules the trigger scan left active, in priority order.
    pub active_rules: Vec<&'static str>,
    /// Rule whose production fired, if any.
    pub rule: Option<&'static str>,
    pub result: Result<Vec<LabeledConstraints>, MalformedConstraintSentence>,
}

pub fn parse_constraints_verbose(sentence: &str) -> ConstraintTrace {
    let normalized = normalize_sentence(sentence);
    let active_rules = CONSTRAINT_RULES.active_rule_names(&normalized);

    let (rule, result) = match CONSTRAINT_RULES.first_match(&normalized) {
        Some(matched) => (Some(matched.rule), Ok(matched.value)),
        None => (None, Err(MalformedConstraintSentence { sentence: sentence.to_string() })),
    };

    ConstraintTrace { normalized, active_rules, rule, result }
}

/// Parse one narrated tracking line, e.g.
/// `Out for Delivery, October 9, 2013, 10:16 am, BROOKLYN, NY 11201`.
pub fn parse_event(line: &str) -> Option<TrackingEvent> {
    NARRATION_RULES.first_match(line.trim()).map(|matched| matched.value)
}

/// Interpret a rate response for `packages`.
pub fn parse_rates(body: &[u8], packages: &[Package], options: &Options) -> Result<Vec<Rate>, ResponseError> {
    let doc = Document::parse(body)?;
    extract_rates(&doc, packages, options)
}

/// Interpret a tracking response for `tracking_number`.
pub fn parse_tracking(body: &[u8], tracking_number: &str) -> Result<TrackingResponse, ResponseError> {
    let doc = Document::parse(body)?;
    extract_tracking(&doc, tracking_number)
}

/// Result of [`parse_response`].
#[derive(Debug, Clone, PartialEq)]
pub enum Interpreted {
    Rates(Vec<Rate>),
    Tracking(TrackingResponse),
}

/// Interpret any supported response, routing on its root element.
pub fn parse_response(
    body: &[u8],
    packages: &[Package],
    tracking_number: &str,
    options: &Options,
) -> Result<Interpreted, ResponseError> {
    let doc = Document::parse(body)?;
    match doc.payload() {
        Payload::Tracking => extract_tracking(&doc, tracking_number).map(Interpreted::Tracking),
        Payload::DomesticRates | Payload::InternationalRates => {
            extract_rates(&doc, packages, options).map(Interpreted::Rates)
        }
    }
}
