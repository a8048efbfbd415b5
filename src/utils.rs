//! Utility functions for packet processing.
//!
//! This module contains shared utility functions used throughout the application.

use crate::network::modules::stats::RewriteStats;
use crate::rules::RuleStore;
use log::info;

/// Logs packet statistics: how many packets arrived, how many TCP packets
/// were modified and how many were passed through untouched.
///
/// # Arguments
///
/// * `stats` - Totals collected by the receiving loop
pub fn log_statistics(stats: &RewriteStats) {
    info!(
        "Received Packets: {}, Rewritten: {} of {} TCP ({:.2}%, recent {:.2}%), Substitutions: {}, Passed Through: {}, Transport Errors: {}",
        stats.received,
        stats.rewritten,
        stats.tcp,
        stats.total_rewrite_rate() * 100.0,
        stats.recent_rewrite_rate() * 100.0,
        stats.substitutions,
        stats.passed_through(),
        stats.transport_errors
    );
}

/// Logs every rule in evaluation order, in hex.
pub fn log_rules(rules: &RuleStore) {
    info!("{} rule(s) loaded, {:?} order", rules.len(), rules.order());
    for (index, rule) in rules.iter().enumerate() {
        info!("  rule {}: {}", index + 1, rule);
    }
}
