use crate::network::core::header::HeaderError;
use std::fmt;

/// Decision returned to the transport for an intercepted packet.
///
/// Packets are never dropped or held back, so accepting is the only decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
}

/// Why a packet was passed through without being inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassReason {
    /// IPv4 carrying another transport protocol
    NonTcp { protocol: u8 },
    /// Not an IPv4 packet
    NotIpv4 { version: u8 },
    /// An IPv4 fragment
    Fragment,
    /// Headers failed validation
    Malformed(HeaderError),
}

/// What processing did to a packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The TCP payload was scanned and the checksum recomputed
    Tcp { substitutions: usize },
    /// The packet flows on untouched
    PassThrough(PassReason),
}

/// Verdict for one packet, tagged with the transport's packet id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Identifier of the packet this verdict applies to
    pub packet_id: u32,
    /// Accept or otherwise
    pub decision: Decision,
    /// Length of the packet, unchanged by processing
    pub length: usize,
    /// What processing did
    pub outcome: Outcome,
}

impl Verdict {
    /// Accepts a packet with the given outcome.
    pub fn accept(packet_id: u32, length: usize, outcome: Outcome) -> Self {
        Self {
            packet_id,
            decision: Decision::Accept,
            length,
            outcome,
        }
    }

    /// Accepts a packet unmodified.
    pub fn pass(packet_id: u32, length: usize, reason: PassReason) -> Self {
        Self::accept(packet_id, length, Outcome::PassThrough(reason))
    }

    /// Whether the transport must attach the processed bytes to the verdict.
    ///
    /// Pass-through verdicts let the original bytes flow, so they carry no payload.
    pub fn carries_payload(&self) -> bool {
        matches!(self.outcome, Outcome::Tcp { .. })
    }

    /// Number of substitutions made, zero for pass-through packets
    pub fn substitutions(&self) -> usize {
        match self.outcome {
            Outcome::Tcp { substitutions } => substitutions,
            Outcome::PassThrough(_) => 0,
        }
    }
}

impl fmt::Display for PassReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassReason::NonTcp { protocol } => write!(f, "protocol {} is not TCP", protocol),
            PassReason::NotIpv4 { version } => write!(f, "IP version {} is not IPv4", version),
            PassReason::Fragment => write!(f, "IPv4 fragment"),
            PassReason::Malformed(e) => write!(f, "malformed header: {}", e),
        }
    }
}
