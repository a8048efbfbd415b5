use crate::rules::{Rule, RuleStore};
use clap::ValueEnum;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Upper bound on substitutions a single rule may make in one payload.
pub const DEFAULT_REWRITE_LIMIT: usize = 65_535;

/// How a rule's matches are searched for after a substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ScanMode {
    /// Rescan from the start of the payload after every substitution, so
    /// matches created by a replacement are rewritten too
    #[default]
    Restart,
    /// One left-to-right pass, resuming after each replaced region
    SinglePass,
}

/// Options controlling the pattern rewriter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteOptions {
    /// Scan strategy
    pub scan: ScanMode,
    /// Maximum substitutions per rule and payload
    pub limit: usize,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            scan: ScanMode::default(),
            limit: DEFAULT_REWRITE_LIMIT,
        }
    }
}

/// Finds the first occurrence of `pattern` in `haystack`.
///
/// A plain byte-by-byte search; payloads are bounded by the IP total length.
pub fn find(pattern: &[u8], haystack: &[u8]) -> Option<usize> {
    if pattern.is_empty() || pattern.len() > haystack.len() {
        return None;
    }

    haystack
        .windows(pattern.len())
        .position(|window| window == pattern)
}

/// Applies every rule to `payload` in store order, in place.
///
/// The payload length never changes; only bytes inside the slice are
/// overwritten.
///
/// # Arguments
///
/// * `payload` - The TCP payload to rewrite
/// * `rules` - Rules to apply, in evaluation order
/// * `options` - Scan strategy and substitution limit
///
/// # Returns
///
/// The total number of substitutions made
///
/// # Example
///
/// ```
/// use qsed::network::modules::rewrite::{rewrite, RewriteOptions};
/// use qsed::rules::RuleStore;
///
/// let mut rules = RuleStore::new();
/// rules.add_spec("/AABB/00FF").unwrap();
///
/// let mut payload = *b"AABBCCAABB";
/// assert_eq!(rewrite(&mut payload, &rules, &RewriteOptions::default()), 2);
/// assert_eq!(&payload, b"00FFCC00FF");
/// ```
pub fn rewrite(payload: &mut [u8], rules: &RuleStore, options: &RewriteOptions) -> usize {
    rules
        .iter()
        .map(|rule| apply_rule(payload, rule, options))
        .sum()
}

/// Applies a single rule to `payload`, returning the number of substitutions.
pub fn apply_rule(payload: &mut [u8], rule: &Rule, options: &RewriteOptions) -> usize {
    match options.scan {
        ScanMode::Restart => rewrite_restarting(payload, rule, options.limit),
        ScanMode::SinglePass => rewrite_single_pass(payload, rule, options.limit),
    }
}

fn replace_at(payload: &mut [u8], offset: usize, rule: &Rule) {
    payload[offset..offset + rule.length()].copy_from_slice(rule.replacement());
    debug!("Rule match at offset {}, changing payload: {}", offset, rule);
}

fn rewrite_restarting(payload: &mut [u8], rule: &Rule, limit: usize) -> usize {
    let mut count = 0;

    while let Some(offset) = find(rule.pattern(), payload) {
        if count >= limit {
            warn!(
                "Rule {} still matches after {} substitutions, leaving the rest of the payload alone",
                rule, count
            );
            break;
        }

        replace_at(payload, offset, rule);
        count += 1;
    }

    count
}

fn rewrite_single_pass(payload: &mut [u8], rule: &Rule, limit: usize) -> usize {
    let mut count = 0;
    let mut start = 0;

    while count < limit {
        let Some(found) = find(rule.pattern(), &payload[start..]) else {
            break;
        };

        let offset = start + found;
        replace_at(payload, offset, rule);
        start = offset + rule.length();
        count += 1;
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleOrder;
    use proptest::prelude::*;

    fn store(specs: &[&str]) -> RuleStore {
        let mut store = RuleStore::with_order(RuleOrder::Registration);
        for spec in specs {
            store.add_spec(spec).unwrap();
        }
        store
    }

    fn single_pass() -> RewriteOptions {
        RewriteOptions {
            scan: ScanMode::SinglePass,
            ..Default::default()
        }
    }

    #[test]
    fn test_find() {
        assert_eq!(find(b"bc", b"abcd"), Some(1));
        assert_eq!(find(b"cd", b"abcd"), Some(2));
        assert_eq!(find(b"abcd", b"abcd"), Some(0));
        assert_eq!(find(b"x", b"abcd"), None);
        assert_eq!(find(b"abcde", b"abcd"), None);
        assert_eq!(find(b"", b"abcd"), None);
    }

    #[test]
    fn test_substitution() {
        let rules = store(&["/AABB/00FF"]);
        let mut payload = *b"AABBCCAABB";

        let count = rewrite(&mut payload, &rules, &RewriteOptions::default());

        assert_eq!(count, 2);
        assert_eq!(&payload, b"00FFCC00FF");
    }

    #[test]
    fn test_match_at_payload_end() {
        let rules = store(&["/end/END"]);
        let mut payload = *b"the end";
        assert_eq!(rewrite(&mut payload, &rules, &RewriteOptions::default()), 1);
        assert_eq!(&payload, b"the END");
    }

    #[test]
    fn test_empty_and_short_payloads() {
        let rules = store(&["/abc/xyz"]);

        let mut empty: [u8; 0] = [];
        assert_eq!(rewrite(&mut empty, &rules, &RewriteOptions::default()), 0);

        let mut short = *b"ab";
        assert_eq!(rewrite(&mut short, &rules, &RewriteOptions::default()), 0);
        assert_eq!(&short, b"ab");
    }

    #[test]
    fn test_restart_rewrites_created_matches() {
        // each replacement creates a new "ab" one position to the left
        let rules = store(&["/ab/ba"]);
        let mut payload = *b"aaab";

        let count = rewrite(&mut payload, &rules, &RewriteOptions::default());

        assert_eq!(&payload, b"baaa");
        assert_eq!(count, 3);
    }

    #[test]
    fn test_single_pass_skips_created_matches() {
        let rules = store(&["/ab/ba"]);
        let mut payload = *b"aaab";

        let count = rewrite(&mut payload, &rules, &single_pass());

        assert_eq!(&payload, b"aaba");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_single_pass_non_overlapping() {
        let rules = store(&["/aa/bb"]);
        let mut payload = *b"aaaaa";
        assert_eq!(rewrite(&mut payload, &rules, &single_pass()), 2);
        assert_eq!(&payload, b"bbbba");
    }

    #[test]
    fn test_limit_stops_rescanning() {
        let rules = store(&["/ab/ba"]);
        let mut payload = *b"aaab";
        let options = RewriteOptions {
            scan: ScanMode::Restart,
            limit: 2,
        };

        assert_eq!(rewrite(&mut payload, &rules, &options), 2);
        assert_eq!(&payload, b"abaa");
    }

    #[test]
    fn test_rules_apply_in_store_order() {
        let mut payload = *b"abc";
        rewrite(&mut payload, &store(&["/a/x", "/x/y"]), &RewriteOptions::default());
        assert_eq!(&payload, b"ybc");

        let mut payload = *b"abc";
        rewrite(&mut payload, &store(&["/x/y", "/a/x"]), &RewriteOptions::default());
        assert_eq!(&payload, b"xbc");
    }

    #[test]
    fn test_idempotent_with_disjoint_rules() {
        let rules = store(&["/AABB/00FF"]);
        let mut payload = *b"AABBCCAABB";
        rewrite(&mut payload, &rules, &RewriteOptions::default());
        let once = payload;

        let disjoint = store(&["/AABB/00FF", "/zz/yy"]);
        assert_eq!(rewrite(&mut payload, &disjoint, &RewriteOptions::default()), 0);
        assert_eq!(payload, once);
    }

    proptest! {
        #[test]
        fn rewrite_preserves_length(
            mut payload in proptest::collection::vec(0u8..4, 0..256),
            pattern in proptest::collection::vec(0u8..4, 1..4),
            seed in any::<u8>(),
            single in any::<bool>(),
        ) {
            let replacement: Vec<u8> = pattern.iter().map(|b| b.wrapping_add(seed | 1)).collect();
            let mut rules = RuleStore::new();
            rules.add(pattern, replacement).unwrap();
            let options = RewriteOptions {
                scan: if single { ScanMode::SinglePass } else { ScanMode::Restart },
                limit: 1024,
            };

            let len = payload.len();
            rewrite(&mut payload, &rules, &options);
            prop_assert_eq!(payload.len(), len);
        }
    }
}
