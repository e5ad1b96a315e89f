//! Structured size and weight limits.
//!
//! A [`ConstraintSet`] maps [`Limit`] keys to inclusive upper bounds in
//! inches / pounds; a missing key means the axis is unconstrained. Some
//! vendor sentences are ambiguous and yield several alternative sets, which a
//! [`ConstraintSpec::AnyOf`] models as a disjunction.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::api::{UnmatchedSentence, parse_constraints};
use crate::error::MalformedConstraintSentence;
use crate::rules::constraints::helpers::{flat_rate_boxes, flat_rate_envelope};

/// A constrained package quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Limit {
    Length,
    Width,
    Height,
    Weight,
    LengthPlusGirth,
    LengthPlusWidthPlusHeight,
}

impl Limit {
    pub const ALL: [Limit; 6] = [
        Limit::Length,
        Limit::Width,
        Limit::Height,
        Limit::Weight,
        Limit::LengthPlusGirth,
        Limit::LengthPlusWidthPlusHeight,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Limit::Length => "length",
            Limit::Width => "width",
            Limit::Height => "height",
            Limit::Weight => "weight",
            Limit::LengthPlusGirth => "length_plus_girth",
            Limit::LengthPlusWidthPlusHeight => "length_plus_width_plus_height",
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper bounds per [`Limit`]; absent keys are unconstrained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintSet {
    limits: BTreeMap<Limit, f64>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy with `limit` bounded by `value`.
    pub fn with(mut self, limit: Limit, value: f64) -> Self {
        self.limits.insert(limit, value);
        self
    }

    pub fn get(&self, limit: Limit) -> Option<f64> {
        self.limits.get(&limit).copied()
    }

    pub fn contains(&self, limit: Limit) -> bool {
        self.limits.contains_key(&limit)
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.limits.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Limit, f64)> + '_ {
        self.limits.iter().map(|(limit, value)| (*limit, *value))
    }
}

impl FromIterator<(Limit, f64)> for ConstraintSet {
    fn from_iter<I: IntoIterator<Item = (Limit, f64)>>(iter: I) -> Self {
        ConstraintSet { limits: iter.into_iter().collect() }
    }
}

impl fmt::Display for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (idx, (limit, value)) in self.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", limit, value)?;
        }
        f.write_str("}")
    }
}

/// One interpretation of a limit sentence, optionally tagged with the
/// flat-rate product it was recognised as.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledConstraints {
    pub constraints: ConstraintSet,
    pub label: Option<&'static str>,
}

impl LabeledConstraints {
    pub fn unlabeled(constraints: ConstraintSet) -> Self {
        Self { constraints, label: None }
    }

    pub fn labeled(constraints: ConstraintSet, label: &'static str) -> Self {
        Self { constraints, label: Some(label) }
    }
}

/// Limits a package has to satisfy: one set, or any one of several.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintSpec {
    Single(ConstraintSet),
    AnyOf(Vec<ConstraintSet>),
}

impl ConstraintSpec {
    /// A spec with no bounds at all.
    pub fn unconstrained() -> Self {
        ConstraintSpec::Single(ConstraintSet::new())
    }

    /// Collapse parser output: one interpretation becomes `Single`, several
    /// become `AnyOf`.
    pub fn from_parsed(parsed: Vec<LabeledConstraints>) -> Self {
        let mut sets: Vec<ConstraintSet> = parsed.into_iter().map(|p| p.constraints).collect();
        if sets.len() == 1 {
            ConstraintSpec::Single(sets.remove(0))
        } else {
            ConstraintSpec::AnyOf(sets)
        }
    }

    /// Add a weight bound to every alternative.
    pub fn with_weight(self, pounds: f64) -> Self {
        match self {
            ConstraintSpec::Single(set) => ConstraintSpec::Single(set.with(Limit::Weight, pounds)),
            ConstraintSpec::AnyOf(sets) => {
                ConstraintSpec::AnyOf(sets.into_iter().map(|set| set.with(Limit::Weight, pounds)).collect())
            }
        }
    }

    pub fn alternatives(&self) -> &[ConstraintSet] {
        match self {
            ConstraintSpec::Single(set) => std::slice::from_ref(set),
            ConstraintSpec::AnyOf(sets) => sets,
        }
    }
}

/// Resolve the limits of one vendor service node.
///
/// Flat-rate envelopes and boxes are recognised from the service name first,
/// since their limit sentences are boilerplate. Otherwise `sentence` (the
/// `MaxDimensions` text, if any) is parsed. `max_weight` is merged into every
/// alternative. A sentence no grammar understands is handled per `policy`.
pub fn limits_for_service(
    service_name: &str,
    sentence: Option<&str>,
    max_weight: Option<f64>,
    policy: UnmatchedSentence,
) -> Result<ConstraintSpec, MalformedConstraintSentence> {
    let spec = if regex!(r"(?i)flat.rate.box").is_match(service_name) {
        ConstraintSpec::from_parsed(flat_rate_boxes())
    } else if regex!(r"(?i)flat.rate.envelope").is_match(service_name) {
        ConstraintSpec::from_parsed(vec![flat_rate_envelope()])
    } else {
        match sentence.map(str::trim).filter(|s| !s.is_empty()) {
            None => ConstraintSpec::unconstrained(),
            Some(sentence) => match parse_constraints(sentence) {
                Ok(parsed) => ConstraintSpec::from_parsed(parsed),
                Err(err) if policy == UnmatchedSentence::Unconstrained => {
                    debug!(service = service_name, sentence = err.sentence.as_str(), "treating unrecognised limits as unconstrained");
                    ConstraintSpec::unconstrained()
                }
                Err(err) => return Err(err),
            },
        }
    };

    Ok(match max_weight {
        Some(pounds) => spec.with_weight(pounds),
        None => spec,
    })
}
