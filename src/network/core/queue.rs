//! The boundary between the rewrite engine and the packet interception
//! transport.

use crate::error::{QsedError, Result};
use crate::network::core::packet_data::PacketData;
use crate::network::types::verdict::Verdict;
use std::collections::VecDeque;

/// A source of intercepted packets that accepts a verdict for each one.
///
/// Packets are handed out one at a time; `verdict` must be called for a
/// packet before the next `recv`.
pub trait PacketQueue {
    /// Takes the next intercepted packet.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(PacketData))` - A packet awaiting a verdict
    /// * `Ok(None)` - Nothing is queued right now
    /// * `Err(QsedError::Transport)` - If the transport failed
    fn recv(&mut self) -> Result<Option<PacketData>>;

    /// Returns a packet to the transport with its verdict.
    ///
    /// When the verdict carries a payload, `packet.data` replaces the
    /// original packet contents.
    fn verdict(&mut self, packet: PacketData, verdict: &Verdict) -> Result<()>;

    /// Whether the queue will never yield another packet
    fn is_closed(&self) -> bool {
        false
    }
}

/// A packet together with the verdict it received.
#[derive(Debug, Clone)]
pub struct Delivered {
    pub packet: PacketData,
    pub verdict: Verdict,
}

impl Delivered {
    /// The bytes that continue on the network path.
    pub fn bytes_on_wire<'a>(&'a self, original: &'a [u8]) -> &'a [u8] {
        if self.verdict.carries_payload() {
            &self.packet.data
        } else {
            original
        }
    }
}

/// In-memory queue fed from a list of packets.
///
/// Closes once all packets have been received and records every verdict.
#[derive(Debug, Default)]
pub struct MemoryQueue {
    pending: VecDeque<PacketData>,
    in_flight: Option<u32>,
    delivered: Vec<Delivered>,
}

impl MemoryQueue {
    /// Creates a queue holding the given raw packets, numbered from 1.
    pub fn new<I, P>(packets: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Vec<u8>>,
    {
        let pending = packets
            .into_iter()
            .zip(1u32..)
            .map(|(data, id)| PacketData::new(id, data))
            .collect();

        Self {
            pending,
            in_flight: None,
            delivered: Vec::new(),
        }
    }

    /// Packets that received a verdict, in order.
    pub fn delivered(&self) -> &[Delivered] {
        &self.delivered
    }
}

impl PacketQueue for MemoryQueue {
    fn recv(&mut self) -> Result<Option<PacketData>> {
        if let Some(id) = self.in_flight {
            return Err(QsedError::transport(
                "recv",
                format!("packet {} is still awaiting a verdict", id),
            ));
        }

        let packet = self.pending.pop_front();
        self.in_flight = packet.as_ref().map(|p| p.id);
        Ok(packet)
    }

    fn verdict(&mut self, packet: PacketData, verdict: &Verdict) -> Result<()> {
        match self.in_flight.take() {
            Some(id) if id == packet.id && id == verdict.packet_id => {
                self.delivered.push(Delivered {
                    packet,
                    verdict: verdict.clone(),
                });
                Ok(())
            }
            _ => Err(QsedError::transport(
                "verdict",
                format!("packet {} was not received from this queue", packet.id),
            )),
        }
    }

    fn is_closed(&self) -> bool {
        self.pending.is_empty() && self.in_flight.is_none()
    }
}
