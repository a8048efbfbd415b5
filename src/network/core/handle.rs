//! NFQUEUE handle management.
//!
//! This module binds a netfilter queue, hands its packets to the rewrite
//! engine and returns verdicts, taking care of cleanup on shutdown.

use crate::error::{QsedError, Result};
use crate::network::core::packet_data::PacketData;
use crate::network::core::queue::PacketQueue;
use crate::network::types::verdict::{Decision, Verdict};
use log::{debug, error, info};
use nfq::{Message, Queue};
use std::io;

/// Default queue number, as used by `iptables -j NFQUEUE` without `--queue-num`.
pub const DEFAULT_QUEUE_NUM: u16 = 0;

/// Configuration for binding a netfilter queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    /// Queue number to bind
    pub queue_num: u16,
    /// Whether `recv` returns immediately when no packet is queued
    pub nonblocking: bool,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            queue_num: DEFAULT_QUEUE_NUM,
            nonblocking: true,
        }
    }
}

impl QueueConfig {
    /// Creates a new QueueConfig for the given queue number.
    pub fn with_queue(queue_num: u16) -> Self {
        Self {
            queue_num,
            ..Default::default()
        }
    }
}

/// Owns a bound netfilter queue.
///
/// Holds at most one message between `recv` and `verdict`; the kernel keeps
/// the packet until its verdict is issued.
pub struct NfQueueHandle {
    queue: Queue,
    config: QueueConfig,
    in_flight: Option<Message>,
    bound: bool,
}

impl NfQueueHandle {
    /// Opens a netfilter queue socket and binds it.
    ///
    /// Requires `CAP_NET_ADMIN`.
    ///
    /// # Returns
    ///
    /// * `Ok(NfQueueHandle)` - If the queue was bound successfully
    /// * `Err(QsedError::Transport)` - If opening or binding failed
    pub fn open(config: QueueConfig) -> Result<Self> {
        let mut queue = Queue::open().map_err(|e| {
            error!("Failed to open netfilter queue socket: {}", e);
            QsedError::transport("opening netfilter queue", e)
        })?;

        info!("Binding this socket to queue {}", config.queue_num);
        queue.bind(config.queue_num).map_err(|e| {
            error!(
                "Failed to bind queue {} (is CAP_NET_ADMIN available?): {}",
                config.queue_num, e
            );
            QsedError::transport("binding netfilter queue", e)
        })?;

        queue.set_nonblocking(config.nonblocking);
        debug!("Queue {} bound, nonblocking={}", config.queue_num, config.nonblocking);

        Ok(Self {
            queue,
            config,
            in_flight: None,
            bound: true,
        })
    }

    /// Returns the configuration this handle was opened with.
    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Unbinds the queue if it is still bound.
    pub fn close(&mut self) -> Result<()> {
        if self.bound {
            debug!("Unbinding from queue {}", self.config.queue_num);
            self.bound = false;
            self.queue
                .unbind(self.config.queue_num)
                .map_err(|e| QsedError::transport("unbinding netfilter queue", e))?;
        }
        Ok(())
    }
}

impl PacketQueue for NfQueueHandle {
    fn recv(&mut self) -> Result<Option<PacketData>> {
        match self.queue.recv() {
            Ok(message) => {
                let packet = PacketData::new(message.get_packet_id(), message.get_payload());
                self.in_flight = Some(message);
                Ok(Some(packet))
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(QsedError::transport("receiving packet", e)),
        }
    }

    fn verdict(&mut self, packet: PacketData, verdict: &Verdict) -> Result<()> {
        let mut message = self.in_flight.take().ok_or_else(|| {
            QsedError::transport(
                "setting verdict",
                format!("packet {} is not awaiting a verdict", packet.id),
            )
        })?;

        if verdict.carries_payload() {
            message.set_payload(packet.data);
        }

        match verdict.decision {
            Decision::Accept => message.set_verdict(nfq::Verdict::Accept),
        }

        self.queue
            .verdict(message)
            .map_err(|e| QsedError::transport("setting verdict", e))
    }
}

impl Drop for NfQueueHandle {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!("Error closing netfilter queue on drop: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_config_default() {
        let config = QueueConfig::default();
        assert_eq!(config.queue_num, DEFAULT_QUEUE_NUM);
        assert!(config.nonblocking);
    }

    #[test]
    fn test_queue_config_with_queue() {
        let config = QueueConfig::with_queue(7);
        assert_eq!(config.queue_num, 7);
        assert!(config.nonblocking);
    }
}
