//! Packet receiving loop.
//!
//! This module pulls packets off a transport queue, runs them through the
//! processor and hands each one back with its verdict until shutdown.

use crate::error::{QsedError, Result};
use crate::network::core::PacketQueue;
use crate::network::modules::stats::RewriteStats;
use crate::network::processing::processor::PacketProcessor;
use crate::utils::log_statistics;
use log::{debug, error, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Transport failures in a row after which the loop gives up.
pub const MAX_CONSECUTIVE_FAILURES: usize = 16;

/// Timing options for the receiving loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiveOptions {
    /// How often statistics are logged
    pub stats_interval: Duration,
    /// How long to sleep when the queue has nothing to offer
    pub idle_wait: Duration,
}

impl Default for ReceiveOptions {
    fn default() -> Self {
        Self {
            stats_interval: Duration::from_secs(2),
            idle_wait: Duration::from_millis(1),
        }
    }
}

/// Receives, processes and returns packets until shutdown.
///
/// Every packet gets exactly one verdict. The loop ends when `running` is
/// cleared, when the queue reports it is closed, or when the transport
/// fails [`MAX_CONSECUTIVE_FAILURES`] times without a successful packet in
/// between.
///
/// # Arguments
///
/// * `queue` - Transport to receive packets from and return verdicts to
/// * `processor` - Rewrites each packet
/// * `running` - Atomic flag that controls when receiving should stop
/// * `options` - Logging interval and idle wait
///
/// # Returns
///
/// * `Ok(RewriteStats)` - Totals for the whole run, on a clean shutdown
/// * `Err(QsedError::Transport)` - If the transport kept failing
pub fn receive_packets<Q: PacketQueue>(
    queue: &mut Q,
    processor: &PacketProcessor,
    running: &AtomicBool,
    options: &ReceiveOptions,
) -> Result<RewriteStats> {
    let mut statistics = RewriteStats::default();
    let mut consecutive_failures = 0;
    let mut last_log_time = Instant::now();

    info!("Starting packet interception.");

    while running.load(Ordering::SeqCst) {
        let failure = match queue.recv() {
            Ok(Some(mut packet)) => {
                let verdict = processor.process(&mut packet);
                statistics.record(&verdict.outcome);

                match queue.verdict(packet, &verdict) {
                    Ok(()) => {
                        consecutive_failures = 0;
                        None
                    }
                    Err(e) => Some(e),
                }
            }
            Ok(None) => {
                if queue.is_closed() {
                    debug!("Queue closed, leaving receive loop");
                    break;
                }
                thread::sleep(options.idle_wait);
                None
            }
            Err(e) => Some(e),
        };

        if let Some(e) = failure {
            error!("{}", e);
            statistics.record_transport_error();
            consecutive_failures += 1;

            if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                log_statistics(&statistics);
                return Err(QsedError::Transport(format!(
                    "giving up after {} consecutive failures, last: {}",
                    consecutive_failures, e
                )));
            }
        }

        // Periodically log statistics
        if last_log_time.elapsed() >= options.stats_interval {
            log_statistics(&statistics);
            last_log_time = Instant::now();
        }
    }

    debug!("Shutting down packet receiving loop");
    log_statistics(&statistics);
    Ok(statistics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::core::fixtures::{
        http_get_packet, stored_checksum, udp_packet, HTTP_GET_REWRITTEN_CHECKSUM,
    };
    use crate::network::core::{MemoryQueue, PacketData};
    use crate::network::modules::rewrite::RewriteOptions;
    use crate::network::types::verdict::Verdict;
    use crate::rules::RuleStore;
    use std::sync::Arc;

    fn processor() -> PacketProcessor {
        let mut rules = RuleStore::new();
        rules.add_spec("/AABB/00FF").unwrap();
        PacketProcessor::new(Arc::new(rules), RewriteOptions::default())
    }

    fn fast() -> ReceiveOptions {
        ReceiveOptions {
            stats_interval: Duration::from_secs(60),
            idle_wait: Duration::ZERO,
        }
    }

    /// Fails a fixed number of receives before each packet, then closes.
    struct FlakyQueue {
        inner: MemoryQueue,
        failures_per_packet: usize,
        failed: usize,
    }

    impl PacketQueue for FlakyQueue {
        fn recv(&mut self) -> Result<Option<PacketData>> {
            if self.failed < self.failures_per_packet {
                self.failed += 1;
                return Err(QsedError::transport("recv", "interrupted"));
            }
            self.failed = 0;
            self.inner.recv()
        }

        fn verdict(&mut self, packet: PacketData, verdict: &Verdict) -> Result<()> {
            self.inner.verdict(packet, verdict)
        }

        fn is_closed(&self) -> bool {
            self.inner.is_closed()
        }
    }

    #[test]
    fn test_every_packet_gets_a_verdict() {
        let mut queue = MemoryQueue::new(vec![http_get_packet(), udp_packet(), http_get_packet()]);
        let running = AtomicBool::new(true);

        let stats = receive_packets(&mut queue, &processor(), &running, &fast()).unwrap();

        let delivered = queue.delivered();
        assert_eq!(delivered.len(), 3);
        assert_eq!(
            delivered.iter().map(|d| d.verdict.packet_id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(stored_checksum(&delivered[0].packet.data), HTTP_GET_REWRITTEN_CHECKSUM);
        assert_eq!(delivered[1].bytes_on_wire(&udp_packet()), &udp_packet()[..]);

        assert_eq!(stats.received, 3);
        assert_eq!(stats.tcp, 2);
        assert_eq!(stats.substitutions, 4);
        assert_eq!(stats.non_tcp, 1);
        assert_eq!(stats.transport_errors, 0);
    }

    #[test]
    fn test_stops_when_not_running() {
        let mut queue = MemoryQueue::new(vec![http_get_packet()]);
        let running = AtomicBool::new(false);

        let stats = receive_packets(&mut queue, &processor(), &running, &fast()).unwrap();

        assert_eq!(stats.received, 0);
        assert!(queue.delivered().is_empty());
    }

    #[test]
    fn test_recovers_from_intermittent_failures() {
        let mut queue = FlakyQueue {
            inner: MemoryQueue::new(vec![http_get_packet(), http_get_packet()]),
            failures_per_packet: MAX_CONSECUTIVE_FAILURES - 1,
            failed: 0,
        };
        let running = AtomicBool::new(true);

        let stats = receive_packets(&mut queue, &processor(), &running, &fast()).unwrap();

        assert_eq!(queue.inner.delivered().len(), 2);
        assert_eq!(stats.received, 2);
        assert!(stats.transport_errors >= 2 * (MAX_CONSECUTIVE_FAILURES - 1));
    }

    #[test]
    fn test_gives_up_after_consecutive_failures() {
        let mut queue = FlakyQueue {
            inner: MemoryQueue::new(vec![http_get_packet()]),
            failures_per_packet: MAX_CONSECUTIVE_FAILURES,
            failed: 0,
        };
        let running = AtomicBool::new(true);

        let result = receive_packets(&mut queue, &processor(), &running, &fast());

        assert!(matches!(result, Err(QsedError::Transport(_))));
        assert!(queue.inner.delivered().is_empty());
    }
}
