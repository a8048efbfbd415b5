use crate::network::core::checksum::tcp_checksum;
use crate::network::core::header::{self, HeaderInfo, ParsedPacket};
use crate::network::core::PacketData;
use crate::network::modules::rewrite::{rewrite, RewriteOptions};
use crate::network::types::verdict::{Outcome, PassReason, Verdict};
use crate::rules::RuleStore;
use log::{debug, trace};
use std::sync::Arc;

/// Rewrites the TCP payload of intercepted packets.
///
/// Holds the rule set shared with the rest of the program. Processing never
/// changes a packet's length, so the verdict can always hand the same
/// number of bytes back to the transport.
#[derive(Debug, Clone)]
pub struct PacketProcessor {
    rules: Arc<RuleStore>,
    options: RewriteOptions,
}

impl PacketProcessor {
    pub fn new(rules: Arc<RuleStore>, options: RewriteOptions) -> Self {
        Self { rules, options }
    }

    /// Rules applied to every TCP payload, in evaluation order
    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    /// Processes one packet in place and returns its verdict.
    ///
    /// TCP over unfragmented IPv4 has every rule applied to its payload,
    /// after which the TCP checksum is recomputed. Anything else, including
    /// packets whose headers do not add up, is accepted unmodified.
    ///
    /// # Arguments
    ///
    /// * `packet` - The intercepted packet; its bytes are rewritten in place
    ///
    /// # Returns
    ///
    /// An accept verdict. It carries the rewritten bytes only for TCP packets.
    pub fn process(&self, packet: &mut PacketData) -> Verdict {
        let length = packet.size();

        let info = match header::parse(&packet.data) {
            Ok(ParsedPacket::Tcp(info)) => info,
            Ok(ParsedPacket::NonTcp { protocol }) => {
                trace!("Packet {} is protocol {}, passing through", packet.id, protocol);
                return Verdict::pass(packet.id, length, PassReason::NonTcp { protocol });
            }
            Ok(ParsedPacket::NotIpv4 { version }) => {
                trace!("Packet {} is IP version {}, passing through", packet.id, version);
                return Verdict::pass(packet.id, length, PassReason::NotIpv4 { version });
            }
            Ok(ParsedPacket::Fragment) => {
                trace!("Packet {} is a fragment, passing through", packet.id);
                return Verdict::pass(packet.id, length, PassReason::Fragment);
            }
            Err(e) => {
                debug!("Packet {} has malformed headers, passing through: {}", packet.id, e);
                return Verdict::pass(packet.id, length, PassReason::Malformed(e));
            }
        };

        let substitutions = rewrite(
            &mut packet.data[info.payload_range()],
            &self.rules,
            &self.options,
        );
        update_checksum(&mut packet.data, &info);

        let verdict = Verdict::accept(packet.id, length, Outcome::Tcp { substitutions });
        if verdict.substitutions() > 0 {
            debug!(
                "Packet {} ({} -> {}): {} substitution(s) in {} payload bytes, {:?} after arrival",
                packet.id,
                info.source,
                info.destination,
                verdict.substitutions(),
                info.payload_len(),
                packet.age()
            );
        }

        verdict
    }
}

/// Recomputes the TCP checksum of a parsed packet and stores it big-endian.
fn update_checksum(data: &mut [u8], info: &HeaderInfo) {
    data[info.checksum_range()].fill(0);
    let checksum = tcp_checksum(
        info.segment_len(),
        info.source,
        info.destination,
        &data[info.segment_range()],
    );
    data[info.checksum_range()].copy_from_slice(&checksum.to_be_bytes());
}
