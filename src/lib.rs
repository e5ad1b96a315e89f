//! Rule-based interpretation of USPS Web Tools responses.
//!
//! The crate turns already-fetched response bodies into typed values:
//!
//! - free-text size-limit sentences into [`ConstraintSet`]s,
//! - rate responses into [`Rate`]s (with per-account price selection and
//!   package validity checks),
//! - tracking responses into a chronologically ordered [`TrackingResponse`].
//!
//! Transport, authentication and request templating belong to the caller;
//! every entry point takes bytes or text and is pure.

use regex::{Captures, Regex};

#[macro_use]
mod macros;
mod api;
mod constraints;
mod engine;
mod error;
mod package;
mod request;
mod response;
mod rules;
mod shipment;

pub use api::{
    AccountType, ConstraintTrace, Interpreted, Options, UnmatchedSentence, parse_constraints,
    parse_constraints_verbose, parse_event, parse_rates, parse_response, parse_tracking,
};
pub use constraints::{ConstraintSet, ConstraintSpec, LabeledConstraints, Limit, limits_for_service};
pub use error::{Error, MalformedConstraintSentence, ResponseError, ResponseErrorKind, Result};
pub use package::{Package, SizeCode, UnitSystem, is_valid};
pub use request::{FirstClassMailType, Service, zip5};
pub use response::{Document, Payload, assemble};
pub use shipment::{Location, Rate, TrackingEvent, TrackingResponse, TrackingStatus};

use crate::engine::Features;

/// Production function of a rule: receives the regex captures of a match and
/// optionally returns a value. Returning `None` lets the next rule try.
pub(crate) type Production<T> = fn(&Captures<'_>) -> Option<T>;

/// A recognition rule: a name, a compiled pattern, the input features it
/// needs before it is worth trying, and a production.
///
/// Rules are evaluated in declaration order and the first production that
/// returns `Some` wins.
pub(crate) struct Rule<T> {
    pub name: &'static str,
    pub pattern: &'static Regex,
    /// Features the trigger scan must report for this rule to be tried.
    pub features: Features,
    pub production: Production<T>,
}

impl<T> std::fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .field("production", &"<function>")
            .field("features", &self.features)
            .finish()
    }
}
