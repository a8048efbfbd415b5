pub mod verdict;

pub use verdict::{Decision, Outcome, PassReason, Verdict};
