//! Helpers shared by the size-limit rules.

use regex::Captures;

use crate::constraints::{ConstraintSet, LabeledConstraints, Limit};

pub const FLAT_RATE_ENVELOPE: &str = "Flat Rate Envelope";
pub const FLAT_RATE_BOX: &str = "Flat Rate Box";

/// Synthetic thickness given to flat-rate envelopes.
pub const ENVELOPE_HEIGHT: f64 = 0.75;

/// (long side, short side) of the vendor's flat-rate envelopes, standard
/// envelope first.
pub const KNOWN_ENVELOPES: &[(f64, f64)] = &[(12.5, 9.5), (15.0, 9.5), (10.0, 6.0), (10.0, 5.0), (10.0, 7.0)];

/// The two physical boxes sold under one flat-rate box service name.
pub const FLAT_RATE_BOXES: [[f64; 3]; 2] = [[11.0, 8.5, 5.5], [13.625, 11.875, 3.375]];

/// Undo the HTML escaping vendors leave in limit sentences, unify quote
/// marks to `"` and collapse whitespace.
pub fn normalize_sentence(sentence: &str) -> String {
    let unescaped = sentence
        .replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#x22;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");

    let quoted: String = unescaped
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{2033}' => '"',
            other => other,
        })
        .collect();

    quoted.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse inch notation: `46`, `13.625`, `1/2`, `9 1/2` or `12-1/2`.
pub fn parse_inches(text: &str) -> Option<f64> {
    let text = text.trim();
    let (whole, fraction) = match text.rsplit_once(|c: char| c.is_whitespace() || c == '-') {
        Some((whole, fraction)) if fraction.contains('/') => (Some(whole.trim()), fraction),
        _ if text.contains('/') => (None, text),
        _ => return text.parse::<f64>().ok().filter(|v| *v > 0.0),
    };

    let (numerator, denominator) = fraction.split_once('/')?;
    let numerator: f64 = numerator.trim().parse().ok()?;
    let denominator: f64 = denominator.trim().parse().ok()?;
    if denominator == 0.0 {
        return None;
    }

    let whole: f64 = match whole {
        Some(w) => w.parse().ok()?,
        None => 0.0,
    };

    Some(whole + numerator / denominator).filter(|v| *v > 0.0)
}

/// Parse the inch value held by capture group `name`.
pub fn inches(caps: &Captures<'_>, name: &str) -> Option<f64> {
    parse_inches(caps.name(name)?.as_str())
}

/// Assign single-axis bounds so the largest becomes `length`, then `width`,
/// then `height`. Extra values are ignored.
pub fn sorted_axes(mut values: Vec<f64>) -> ConstraintSet {
    values.sort_by(|a, b| b.total_cmp(a));
    [Limit::Length, Limit::Width, Limit::Height].into_iter().zip(values).collect()
}

pub fn envelope(long: f64, short: f64) -> LabeledConstraints {
    LabeledConstraints::labeled(
        ConstraintSet::new()
            .with(Limit::Length, long)
            .with(Limit::Width, short)
            .with(Limit::Height, ENVELOPE_HEIGHT),
        FLAT_RATE_ENVELOPE,
    )
}

/// The standard flat-rate envelope.
pub fn flat_rate_envelope() -> LabeledConstraints {
    let (long, short) = KNOWN_ENVELOPES[0];
    envelope(long, short)
}

/// Match a bare `a" x b"` pair against the known envelope sizes, in either
/// order.
pub fn known_envelope(a: f64, b: f64) -> Option<LabeledConstraints> {
    let (long, short) = if a >= b { (a, b) } else { (b, a) };
    KNOWN_ENVELOPES
        .iter()
        .find(|(l, s)| (l - long).abs() < 1e-9 && (s - short).abs() < 1e-9)
        .map(|(l, s)| envelope(*l, *s))
}

/// Both flat-rate boxes, as alternatives.
pub fn flat_rate_boxes() -> Vec<LabeledConstraints> {
    FLAT_RATE_BOXES
        .iter()
        .map(|[length, width, height]| {
            LabeledConstraints::labeled(
                ConstraintSet::new()
                    .with(Limit::Length, *length)
                    .with(Limit::Width, *width)
                    .with(Limit::Height, *height),
                FLAT_RATE_BOX,
            )
        })
        .collect()
}

/// Every `a" x b" x c"` box listed in `text` (joined by `or` / commas), as
/// flat-rate box alternatives in listed order.
pub fn box_dimensions(text: &str) -> Option<Vec<LabeledConstraints>> {
    let boxes: Vec<LabeledConstraints> = regex!(
        r#"(?i)(\d+(?:[\s-]+\d+/\d+|\.\d+)?|\d+/\d+)\s*"\s*x\s*(\d+(?:[\s-]+\d+/\d+|\.\d+)?|\d+/\d+)\s*"\s*x\s*(\d+(?:[\s-]+\d+/\d+|\.\d+)?|\d+/\d+)\s*""#
    )
    .captures_iter(text)
    .map(|caps| {
        let axes = (1..=3).map(|i| parse_inches(caps.get(i)?.as_str())).collect::<Option<Vec<f64>>>()?;
        Some(LabeledConstraints::labeled(sorted_axes(axes), FLAT_RATE_BOX))
    })
    .collect::<Option<_>>()?;

    if boxes.is_empty() { None } else { Some(boxes) }
}

/// First `a" x b"` pair found anywhere in `sentence`.
pub fn first_dimension_pair(sentence: &str) -> Option<(f64, f64)> {
    let caps = regex!(r#"(?i)(\d+(?:[\s-]+\d+/\d+|\.\d+)?|\d+/\d+)\s*"?\s*x\s*(\d+(?:[\s-]+\d+/\d+|\.\d+)?|\d+/\d+)"#)
        .captures(sentence)?;
    Some((parse_inches(caps.get(1)?.as_str())?, parse_inches(caps.get(2)?.as_str())?))
}

/// Loose clause-by-clause reading of a limit sentence, for phrasings none
/// of the named grammars cover.
///
/// The sentence is split on commas and "and". A clause naming three axes is
/// a length+width+height sum, a clause naming girth and one axis is a
/// length-plus-girth bound, any other clause with an axis is a single-axis
/// bound. Returns `None` when no clause carried a number.
pub fn clause_limits(sentence: &str) -> Option<ConstraintSet> {
    let lower = sentence.to_ascii_lowercase();
    let mut set = ConstraintSet::new();
    let mut single_axis = Vec::new();

    for clause in regex!(r"(?:,|\band\b)+").split(&lower) {
        let axes = ["length", "width", "height", "depth"].iter().filter(|axis| clause.contains(*axis)).count();
        if axes == 0 {
            continue;
        }

        let Some(value) = regex!(r"\d+(?:[\s-]+\d+/\d+|\.\d+)?|\d+/\d+")
            .find(clause)
            .and_then(|m| parse_inches(m.as_str()))
        else {
            continue;
        };

        if axes >= 3 {
            set = set.with(Limit::LengthPlusWidthPlusHeight, value);
        } else if clause.contains("girth") && axes == 1 {
            set = set.with(Limit::LengthPlusGirth, value);
        } else {
            single_axis.push(value);
        }
    }

    for (limit, value) in sorted_axes(single_axis).iter() {
        set = set.with(limit, value);
    }

    if set.is_empty() { None } else { Some(set) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inch_notation() {
        let cases: Vec<(f64, &str)> = vec![
            (46.0, "46"),
            (13.625, "13.625"),
            (0.5, "1/2"),
            (9.5, "9 1/2"),
            (12.5, "12-1/2"),
            (15.25, "15  1/4"),
        ];
        for (expected, input) in cases {
            assert_eq!(parse_inches(input), Some(expected), "input {:?}", input);
        }
        assert_eq!(parse_inches("1/0"), None);
        assert_eq!(parse_inches("0"), None);
        assert_eq!(parse_inches("abc"), None);
    }

    #[test]
    fn normalizes_escaped_quotes() {
        assert_eq!(normalize_sentence("Max. length 42&quot;,\n  max. length plus girth 79&quot;"), "Max. length 42\", max. length plus girth 79\"");
        assert_eq!(normalize_sentence("9 1/2\u{201D} X 12 1/2\u{201D}"), "9 1/2\" X 12 1/2\"");
    }

    #[test]
    fn sorted_axes_puts_longest_first() {
        let set = sorted_axes(vec![35.0, 46.0, 40.0]);
        assert_eq!(set.get(Limit::Length), Some(46.0));
        assert_eq!(set.get(Limit::Width), Some(40.0));
        assert_eq!(set.get(Limit::Height), Some(35.0));
    }

    #[test]
    fn known_envelope_accepts_either_order() {
        assert_eq!(known_envelope(9.5, 12.5), Some(flat_rate_envelope()));
        assert_eq!(known_envelope(15.0, 9.5).map(|e| e.constraints.get(Limit::Length)), Some(Some(15.0)));
        assert_eq!(known_envelope(8.0, 8.0), None);
    }

    #[test]
    fn listed_boxes() {
        let boxes = box_dimensions(r#"13-5/8" x 11-7/8" x 3-3/8" or 11" x 8-1/2" x 5-1/2""#).unwrap();
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].constraints.get(Limit::Width), Some(11.875));
        assert_eq!(boxes[1].constraints.get(Limit::Height), Some(5.5));
        assert_eq!(box_dimensions(r#"13" x 11""#), None);
    }

    #[test]
    fn clause_reading() {
        let set = clause_limits("Max. length 60\", width 24\" and max. length plus girth 108\"").unwrap();
        assert_eq!(
            set,
            ConstraintSet::new()
                .with(Limit::Length, 60.0)
                .with(Limit::Width, 24.0)
                .with(Limit::LengthPlusGirth, 108.0)
        );
        assert_eq!(clause_limits("Maximum weight 4 pounds"), None);
    }
}
