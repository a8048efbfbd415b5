//! Substitution rules.
//!
//! A rule pairs a byte pattern with an equal-length replacement. Rules are
//! parsed from `<delim><pattern><delim><replacement>` strings given on the
//! command line or in rule files, and collected into a [`RuleStore`].
//! Patterns are raw bytes; rule text does not have to be UTF-8.

pub mod rule;
pub mod store;

pub use rule::{Rule, RuleError};
pub use store::{RuleOrder, RuleSource, RuleStore};
