//! Ordered rule engine.
//!
//! Both free-text grammars this crate understands (size-limit sentences and
//! tracking narration) are expressed as small ordered tables of [`Rule`]s.
//! Running a table over an input is a short pipeline:
//!
//! ```text
//! input ── Features::scan ──┐            (trigger.rs)
//!                           │  gate rules whose required features are absent
//!                           v
//!               RuleSet::first_match     (rule_set.rs)
//!                 - try each active rule in declaration order
//!                 - regex captures -> production
//!                 - first `Some` wins
//!                           │
//!                           v
//!                    Matched { rule, value }
//! ```
//!
//! The trigger scan is a heuristic: false positives only cost a regex
//! attempt, but a missing feature bit hides a rule, so keep the scan generous.
//!
//! ## Adding a phrasing
//!
//! - Write a new `rule!` in the relevant `src/rules/**/rules.rs` and insert
//!   it into `get()` at the priority it should have.
//! - If the rule keys on a new cheap signal, add a `Features` bit and teach
//!   `Features::scan` to set it.
//!
//! Rule firing is traced with `tracing::debug!` under the `mailpiece::engine`
//! target.
//!
//! [`Rule`]: crate::Rule

#[path = "engine/rule_set.rs"]
mod rule_set;
#[path = "engine/trigger.rs"]
mod trigger;

pub use rule_set::RuleSet;
pub use trigger::Features;
