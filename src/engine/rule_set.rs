//! First-match evaluation over an ordered rule table.

use super::trigger::Features;
use crate::Rule;
use tracing::{debug, trace};

/// Result of a successful rule run.
#[derive(Debug, Clone, PartialEq)]
pub struct Matched<T> {
    /// Name of the rule whose production fired.
    pub rule: &'static str,
    pub value: T,
}

/// An ordered, immutable rule table.
///
/// Built once (usually behind a `Lazy` static) and shared read-only between
/// threads; evaluation keeps no state between calls.
#[derive(Debug)]
pub struct RuleSet<T: 'static> {
    rules: Vec<Rule<T>>,
}

impl<T: 'static> RuleSet<T> {
    pub fn new(rules: Vec<Rule<T>>) -> Self {
        RuleSet { rules }
    }

    /// Rules whose feature requirements are satisfied by `features`, in
    /// priority order.
    pub fn active(&self, features: Features) -> impl Iterator<Item = &Rule<T>> {
        self.rules.iter().filter(move |rule| features.contains(rule.features))
    }

    /// Names of the rules that would be tried for `input`.
    pub fn active_rule_names(&self, input: &str) -> Vec<&'static str> {
        self.active(Features::scan(input)).map(|rule| rule.name).collect()
    }

    /// Try each active rule in order and return the first production that
    /// yields a value.
    pub fn first_match(&self, input: &str) -> Option<Matched<T>> {
        let features = Features::scan(input);
        trace!(target: "mailpiece::engine", ?features, input, "trigger scan");

        for rule in self.active(features) {
            let Some(caps) = rule.pattern.captures(input) else {
                continue;
            };

            match (rule.production)(&caps) {
                Some(value) => {
                    debug!(target: "mailpiece::engine", rule = rule.name, input, "rule matched");
                    return Some(Matched { rule: rule.name, value });
                }
                None => {
                    trace!(target: "mailpiece::engine", rule = rule.name, "pattern matched but production declined");
                }
            }
        }

        debug!(target: "mailpiece::engine", input, "no rule matched");
        None
    }
}
