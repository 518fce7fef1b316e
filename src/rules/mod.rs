//! Detection rules
//!
//! A [`RuleSet`] is an ordered, immutable list of regex rules tagged with a
//! [`Category`] and [`Severity`]. Matching is per line and purely textual;
//! adding a rule never touches the matching code.

pub mod builtin;
pub mod ruleset;
pub mod types;

pub use builtin::builtin_rule_specs;
pub use ruleset::{ExclusionSpec, PathRules, RuleSet};
pub use types::{Category, Rule, RuleHit, RuleSpec, Severity};
