//! Size-limit sentence rules, highest priority first.
//!
//! Inputs have already been through `normalize_sentence`, so inch marks are
//! plain `"` and whitespace is single spaces. Numbers use mixed fraction
//! notation (`9 1/2"`, `12-1/2"`) as well as decimals.

use crate::constraints::{ConstraintSet, LabeledConstraints, Limit};
use crate::engine::Features;
use crate::rules::constraints::helpers::{
    box_dimensions, clause_limits, first_dimension_pair, flat_rate_boxes, flat_rate_envelope, inches, known_envelope,
    sorted_axes,
};
use crate::Rule;

type Parsed = Vec<LabeledConstraints>;

/// Flat-rate box boilerplate: the service covers two physical boxes.
fn rule_flat_rate_box() -> Rule<Parsed> {
    rule! {
        name: "flat-rate box boilerplate",
        pattern: r"(?i)flat[\s-]*rate[\s-]*box",
        features: Features::FLAT_RATE,
        prod: |_caps| -> Option<Parsed> {
            Some(flat_rate_boxes())
        },
    }
}

/// Flat-rate envelope boilerplate, e.g.
/// `USPS-supplied Priority Mail flat-rate envelope 9 1/2" x 12 1/2."`
fn rule_flat_rate_envelope() -> Rule<Parsed> {
    rule! {
        name: "flat-rate envelope boilerplate",
        pattern: r"(?i)^(.*flat[\s-]*rate[\s-]*envelope.*)$",
        features: Features::FLAT_RATE,
        prod: |caps| -> Option<Parsed> {
            let sentence = caps.get(1)?.as_str();
            let envelope = first_dimension_pair(sentence)
                .and_then(|(a, b)| known_envelope(a, b))
                .unwrap_or_else(flat_rate_envelope);
            Some(vec![envelope])
        },
    }
}

/// `Max. length 46", width 35", height 46" and max. length plus girth 108"`
///
/// The three single-axis values are re-sorted so the longest is `length`.
fn rule_three_bounds_and_girth() -> Rule<Parsed> {
    rule! {
        name: "max length, width, height and length plus girth",
        pattern: r#"(?i)max(?:imum|\.)?\s*(?:length|width|height)\s*(?P<a>\d+(?:[\s-]+\d+/\d+|\.\d+)?)\s*"\s*,\s*(?:max(?:imum|\.)?\s*)?(?:length|width|height)\s*(?P<b>\d+(?:[\s-]+\d+/\d+|\.\d+)?)\s*"\s*,?\s*(?:max(?:imum|\.)?\s*)?(?:length|width|height)\s*(?P<c>\d+(?:[\s-]+\d+/\d+|\.\d+)?)\s*"\s*,?\s*(?:and\s+)?max(?:imum|\.)?\s*length\s+plus\s+girth\s*(?P<girth>\d+(?:[\s-]+\d+/\d+|\.\d+)?)\s*""#,
        features: Features::INCH_MARK | Features::GIRTHISH,
        prod: |caps| -> Option<Parsed> {
            let axes = sorted_axes(vec![inches(caps, "a")?, inches(caps, "b")?, inches(caps, "c")?]);
            let set = axes.with(Limit::LengthPlusGirth, inches(caps, "girth")?);
            Some(vec![LabeledConstraints::unlabeled(set)])
        },
    }
}

/// `Max. length 42", max. length plus girth 79"` (also `Max.length`).
fn rule_length_and_girth() -> Rule<Parsed> {
    rule! {
        name: "max length and length plus girth",
        pattern: r#"(?i)max(?:imum|\.)?\s*length\s*(?P<length>\d+(?:[\s-]+\d+/\d+|\.\d+)?)\s*"\s*,?\s*(?:and\s+)?max(?:imum|\.)?\s*length\s+plus\s+girth\s*(?P<girth>\d+(?:[\s-]+\d+/\d+|\.\d+)?)\s*""#,
        features: Features::INCH_MARK | Features::GIRTHISH,
        prod: |caps| -> Option<Parsed> {
            let set = ConstraintSet::new()
                .with(Limit::Length, inches(caps, "length")?)
                .with(Limit::LengthPlusGirth, inches(caps, "girth")?);
            Some(vec![LabeledConstraints::unlabeled(set)])
        },
    }
}

/// `USPS-Produced Box: 13-5/8" x 11-7/8" x 3-3/8" or 11" x 8-1/2" x 5-1/2"`
///
/// Each listed box is one alternative.
fn rule_produced_box() -> Rule<Parsed> {
    rule! {
        name: "produced box dimensions",
        pattern: r#"(?i)\bbox\s*:\s*(?P<dims>.*\d.*)$"#,
        features: Features::INCH_MARK,
        prod: |caps| -> Option<Parsed> {
            box_dimensions(caps.name("dims")?.as_str())
        },
    }
}

/// A bare `9 1/2" X 12 1/2"` pair, optionally behind an `... Envelope:`
/// label and followed by a `<br>` note, is only meaningful as a known
/// flat-rate envelope size.
fn rule_envelope_dimension_pair() -> Rule<Parsed> {
    rule! {
        name: "bare envelope dimension pair",
        pattern: r#"(?i)^\s*(?:[^"<]*?\benvelope\s*:\s*)?(?P<a>\d+(?:[\s-]+\d+/\d+|\.\d+)?|\d+/\d+)\s*"\s*x\s*(?P<b>\d+(?:[\s-]+\d+/\d+|\.\d+)?|\d+/\d+)\s*\.?\s*"?\s*\.?\s*(?:<br\s*/?>.*)?$"#,
        features: Features::INCH_MARK,
        prod: |caps| -> Option<Parsed> {
            known_envelope(inches(caps, "a")?, inches(caps, "b")?).map(|envelope| vec![envelope])
        },
    }
}

/// `Maximum length and girth combined 108"`
fn rule_girth_combined() -> Rule<Parsed> {
    rule! {
        name: "length and girth combined",
        pattern: r#"(?i)max(?:imum|\.)?\s*length\s+and\s+girth\s+combined\s*(?P<girth>\d+(?:[\s-]+\d+/\d+|\.\d+)?)\s*""#,
        features: Features::GIRTHISH | Features::COMBINED,
        prod: |caps| -> Option<Parsed> {
            let set = ConstraintSet::new().with(Limit::LengthPlusGirth, inches(caps, "girth")?);
            Some(vec![LabeledConstraints::unlabeled(set)])
        },
    }
}

/// `Max. length 24", Max. length, height, depth combined 36"`
fn rule_length_width_height_combined() -> Rule<Parsed> {
    rule! {
        name: "max length and length, height, depth combined",
        pattern: r#"(?i)max(?:imum|\.)?\s*length\s*(?P<length>\d+(?:[\s-]+\d+/\d+|\.\d+)?)\s*"\s*,\s*max(?:imum|\.)?\s*length\s*,\s*(?:width|height|depth)\s*,?\s*(?:and\s+)?(?:width|height|depth)\s+combined\s*(?P<sum>\d+(?:[\s-]+\d+/\d+|\.\d+)?)\s*""#,
        features: Features::INCH_MARK | Features::COMBINED,
        prod: |caps| -> Option<Parsed> {
            let set = ConstraintSet::new()
                .with(Limit::Length, inches(caps, "length")?)
                .with(Limit::LengthPlusWidthPlusHeight, inches(caps, "sum")?);
            Some(vec![LabeledConstraints::unlabeled(set)])
        },
    }
}

/// Clause-by-clause reading for phrasings the named grammars miss.
fn rule_axis_clauses() -> Rule<Parsed> {
    rule! {
        name: "axis clauses",
        pattern: r"(?s)^(.*)$",
        features: Features::HAS_DIGITS | Features::AXISISH,
        prod: |caps| -> Option<Parsed> {
            clause_limits(caps.get(1)?.as_str()).map(|set| vec![LabeledConstraints::unlabeled(set)])
        },
    }
}

pub fn get() -> Vec<Rule<Parsed>> {
    vec![
        rule_flat_rate_box(),
        rule_flat_rate_envelope(),
        rule_produced_box(),
        rule_three_bounds_and_girth(),
        rule_length_and_girth(),
        rule_envelope_dimension_pair(),
        rule_girth_combined(),
        rule_length_width_height_combined(),
        rule_axis_clauses(),
    ]
}
