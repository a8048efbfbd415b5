//! Core network functionality.
//!
//! This module contains the packet buffer, the header view and checksum
//! arithmetic, and the transport boundary through which packets arrive.

pub mod checksum;
#[cfg(target_os = "linux")]
pub mod handle;
pub mod header;
pub mod packet_data;
pub mod queue;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export commonly used types
#[cfg(target_os = "linux")]
pub use handle::{NfQueueHandle, QueueConfig};
pub use header::{HeaderError, HeaderInfo, ParsedPacket};
pub use packet_data::PacketData;
pub use queue::{MemoryQueue, PacketQueue};
