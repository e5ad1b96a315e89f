//! Trigger scanning (input pre-classification).
//!
//! Computes a [`Features`] mask from the raw input so the rule set can skip
//! rules that cannot possibly match (a girth grammar on a sentence that never
//! mentions girth, a narration grammar on a line without a month).

bitflags::bitflags! {
    /// Coarse features of an input string.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Features: u32 {
        const HAS_DIGITS = 1 << 0;
        const INCH_MARK  = 1 << 1;
        const FRACTION   = 1 << 2;
        const AXISISH    = 1 << 3;
        const GIRTHISH   = 1 << 4;
        const COMBINED   = 1 << 5;
        const FLAT_RATE  = 1 << 6;
        const MONTHISH   = 1 << 7;
        const CLOCK      = 1 << 8;
    }
}

const MONTHS: &[&str] = &[
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
    "jan",
    "feb",
    "mar",
    "apr",
    "jun",
    "jul",
    "aug",
    "sep",
    "sept",
    "oct",
    "nov",
    "dec",
];

const AXES: &[&str] = &["length", "width", "height", "depth"];

impl Features {
    /// Scan `input` for coarse features.
    ///
    /// Uses `to_ascii_lowercase()`: every vendor phrase recognised today is
    /// ASCII English.
    pub fn scan(input: &str) -> Self {
        let mut features = Features::empty();
        let lower = input.to_ascii_lowercase();

        if input.bytes().any(|b| b.is_ascii_digit()) {
            features |= Features::HAS_DIGITS;
        }

        if input.contains('"') {
            features |= Features::INCH_MARK;
        }

        if input.contains('/') {
            features |= Features::FRACTION;
        }

        if AXES.iter().any(|axis| lower.contains(axis)) {
            features |= Features::AXISISH;
        }

        if lower.contains("girth") {
            features |= Features::GIRTHISH;
        }

        if lower.contains("combined") {
            features |= Features::COMBINED;
        }

        if lower.contains("flat") && lower.contains("rate") {
            features |= Features::FLAT_RATE;
        }

        let has_month = lower
            .split(|c: char| !c.is_ascii_alphabetic())
            .any(|word| MONTHS.contains(&word));
        if has_month {
            features |= Features::MONTHISH;
        }

        let has_meridiem = ["am", "pm", "a.m", "p.m"].iter().any(|m| lower.contains(m));
        if input.contains(':') && has_meridiem {
            features |= Features::CLOCK;
        }

        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_limit_sentence() {
        let f = Features::scan("Max. length 46\", width 35\", height 46\" and max. length plus girth 108\"");
        assert!(f.contains(Features::HAS_DIGITS | Features::INCH_MARK | Features::AXISISH | Features::GIRTHISH));
        assert!(!f.contains(Features::FLAT_RATE));
        assert!(!f.contains(Features::MONTHISH));
    }

    #[test]
    fn scan_narration_line() {
        let f = Features::scan("Out for Delivery, October 9, 2013, 10:16 am, BROOKLYN, NY 11201");
        assert!(f.contains(Features::MONTHISH | Features::CLOCK | Features::HAS_DIGITS));
        assert!(!f.contains(Features::INCH_MARK));
    }

    #[test]
    fn month_words_need_word_boundaries() {
        // "Mailbox" must not read as a month abbreviation.
        assert!(!Features::scan("Delivered, In/At Mailbox").contains(Features::MONTHISH));
    }
}
