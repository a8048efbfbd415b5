use std::time::Instant;

/// Represents an intercepted network packet with metadata for processing.
///
/// The buffer is owned by whoever is processing the packet; the
/// transport hands it out on receive and takes it back with the verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketData {
    /// Opaque identifier assigned by the transport
    pub id: u32,

    /// Raw packet bytes, starting at the IP header
    pub data: Vec<u8>,

    /// Timestamp when the packet was received
    pub arrival_time: Instant,
}

impl PacketData {
    /// Creates a `PacketData` instance, recording the current time as arrival time.
    pub fn new(id: u32, data: impl Into<Vec<u8>>) -> Self {
        PacketData {
            id,
            data: data.into(),
            arrival_time: Instant::now(),
        }
    }

    /// Returns the size of the packet in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Returns the time elapsed since the packet was received
    pub fn age(&self) -> std::time::Duration {
        self.arrival_time.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_data_creation() {
        let packet_data = PacketData::new(7, vec![1, 2, 3, 4]);

        assert_eq!(packet_data.id, 7);
        assert_eq!(packet_data.data[..], [1, 2, 3, 4]);
        assert_eq!(packet_data.size(), 4);

        // Verify that the arrival time is recent
        assert!(packet_data.age().as_secs() < 1);
    }
}
