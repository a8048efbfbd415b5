use crate::network::modules::stats::util::ewma::Ewma;
use crate::network::types::verdict::{Outcome, PassReason};

/// Smoothing factor for the recent rewrite rate
const REWRITE_RATE_ALPHA: f64 = 0.005;

/// Statistics for the packets seen by the rewrite engine.
///
/// Counts every packet by outcome, and keeps an exponentially weighted
/// moving average of how often TCP packets end up modified.
#[derive(Debug, Clone)]
pub struct RewriteStats {
    /// Packets received from the transport
    pub received: usize,
    /// TCP packets whose payload was scanned
    pub tcp: usize,
    /// TCP packets with at least one substitution
    pub rewritten: usize,
    /// Substitutions across all packets
    pub substitutions: usize,
    /// IPv4 packets carrying another protocol
    pub non_tcp: usize,
    /// Packets that were not IPv4
    pub not_ipv4: usize,
    /// IPv4 fragments
    pub fragments: usize,
    /// Packets with inconsistent headers
    pub malformed: usize,
    /// Failed receive or verdict calls
    pub transport_errors: usize,

    ewma: Ewma,
}

impl Default for RewriteStats {
    fn default() -> Self {
        Self::new(REWRITE_RATE_ALPHA)
    }
}

impl RewriteStats {
    /// Creates zeroed statistics with the given EWMA smoothing factor.
    pub fn new(alpha: f64) -> Self {
        Self {
            received: 0,
            tcp: 0,
            rewritten: 0,
            substitutions: 0,
            non_tcp: 0,
            not_ipv4: 0,
            fragments: 0,
            malformed: 0,
            transport_errors: 0,
            ewma: Ewma::new(alpha),
        }
    }

    /// Records the outcome of one processed packet.
    pub fn record(&mut self, outcome: &Outcome) {
        self.received += 1;

        match outcome {
            Outcome::Tcp { substitutions } => {
                self.tcp += 1;
                self.substitutions += substitutions;
                if *substitutions > 0 {
                    self.rewritten += 1;
                }
                self.ewma.update(if *substitutions > 0 { 1.0 } else { 0.0 });
            }
            Outcome::PassThrough(PassReason::NonTcp { .. }) => self.non_tcp += 1,
            Outcome::PassThrough(PassReason::NotIpv4 { .. }) => self.not_ipv4 += 1,
            Outcome::PassThrough(PassReason::Fragment) => self.fragments += 1,
            Outcome::PassThrough(PassReason::Malformed(_)) => self.malformed += 1,
        }
    }

    /// Records a failed transport call.
    pub fn record_transport_error(&mut self) {
        self.transport_errors += 1;
    }

    /// Packets that were passed through without inspection
    pub fn passed_through(&self) -> usize {
        self.non_tcp + self.not_ipv4 + self.fragments + self.malformed
    }

    /// Fraction of TCP packets modified since tracking began
    pub fn total_rewrite_rate(&self) -> f64 {
        if self.tcp == 0 {
            0.0
        } else {
            self.rewritten as f64 / self.tcp as f64
        }
    }

    /// Recent fraction of TCP packets modified, based on the EWMA
    pub fn recent_rewrite_rate(&self) -> f64 {
        self.ewma.get().unwrap_or(0.0)
    }
}
