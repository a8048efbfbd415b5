//! TCP checksum computation over the IPv4 pseudo-header, as defined in
//! [IETF RFC 793] and [IETF RFC 1071].
//!
//! [IETF RFC 793]: https://tools.ietf.org/html/rfc793#section-3.1
//! [IETF RFC 1071]: https://tools.ietf.org/html/rfc1071

use crate::network::core::header::{PROTOCOL_TCP, TCP_CHECKSUM_OFFSET};
use std::net::Ipv4Addr;

/// Sums the IPv4 pseudo-header.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                       Source Address                          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                     Destination Address                       |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     Zero      |    Protocol   |         Segment Length        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
pub fn pseudo_header_sum(source: Ipv4Addr, destination: Ipv4Addr, segment_len: u16) -> u32 {
    let src = u32::from(source);
    let dst = u32::from(destination);

    (src >> 16)
        + (src & 0xffff)
        + (dst >> 16)
        + (dst & 0xffff)
        + u32::from(PROTOCOL_TCP)
        + u32::from(segment_len)
}

/// Folds carries back into the low 16 bits until none remain.
pub fn fold(mut sum: u32) -> u16 {
    while sum >> 16 != 0 {
        sum = (sum & 0xffff) + (sum >> 16);
    }
    sum as u16
}

/// Adds the big-endian 16-bit words of `segment` to `sum`, treating the
/// TCP checksum field as zero. An odd trailing byte is padded with a zero
/// low byte.
fn add_segment(sum: u32, segment: &[u8]) -> u32 {
    let checksum_word = TCP_CHECKSUM_OFFSET / 2;

    segment
        .chunks(2)
        .enumerate()
        .filter(|(index, _)| *index != checksum_word)
        .fold(sum, |acc, (_, word)| {
            let value = match *word {
                [high, low] => u16::from_be_bytes([high, low]),
                [high] => u16::from_be_bytes([high, 0]),
                _ => 0,
            };
            // fold as we go so segments of any size stay within 32 bits
            let acc = acc + u32::from(value);
            (acc & 0xffff) + (acc >> 16)
        })
}

/// Computes the folded, uncomplemented one's-complement sum over the
/// pseudo-header and `segment`, with the checksum field counted as zero.
pub fn ones_complement_sum(
    segment_len: u16,
    source: Ipv4Addr,
    destination: Ipv4Addr,
    segment: &[u8],
) -> u16 {
    let sum = pseudo_header_sum(source, destination, segment_len);
    fold(add_segment(sum, segment))
}

/// Computes the TCP checksum of `segment` (header and payload).
///
/// The value the segment currently holds in its checksum field is ignored.
/// Write the result into the packet with `to_be_bytes`.
///
/// # Arguments
///
/// * `segment_len` - TCP segment length, as carried in the pseudo-header
/// * `source` - IPv4 source address
/// * `destination` - IPv4 destination address
/// * `segment` - The TCP header followed by the payload
pub fn tcp_checksum(
    segment_len: u16,
    source: Ipv4Addr,
    destination: Ipv4Addr,
    segment: &[u8],
) -> u16 {
    debug_assert_eq!(usize::from(segment_len), segment.len());
    !ones_complement_sum(segment_len, source, destination, segment)
}

/// Checks the checksum currently stored in `segment`.
///
/// Returns `false` for segments too short to carry a TCP header.
pub fn verify_tcp_checksum(source: Ipv4Addr, destination: Ipv4Addr, segment: &[u8]) -> bool {
    let Ok(segment_len) = u16::try_from(segment.len()) else {
        return false;
    };
    if segment.len() < TCP_CHECKSUM_OFFSET + 2 {
        return false;
    }

    let stored = u16::from_be_bytes([
        segment[TCP_CHECKSUM_OFFSET],
        segment[TCP_CHECKSUM_OFFSET + 1],
    ]);
    let sum = ones_complement_sum(segment_len, source, destination, segment);
    fold(u32::from(sum) + u32::from(stored)) == 0xffff
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::core::fixtures::{
        HELLO_WORLD_CHECKSUM, HELLO_WORLD_PACKET, HTTP_GET_CHECKSUM, HTTP_GET_PACKET,
        OPTIONS_CHECKSUM, OPTIONS_PACKET,
    };
    use proptest::prelude::*;

    const SOURCE: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 10);
    const DESTINATION: Ipv4Addr = Ipv4Addr::new(93, 184, 216, 34);

    fn segment_checksum(packet: &[u8]) -> u16 {
        let segment = &packet[20..];
        tcp_checksum(segment.len() as u16, SOURCE, DESTINATION, segment)
    }

    #[test]
    fn test_known_checksums() {
        assert_eq!(segment_checksum(&HELLO_WORLD_PACKET), HELLO_WORLD_CHECKSUM);
        assert_eq!(segment_checksum(&HTTP_GET_PACKET), HTTP_GET_CHECKSUM);
    }

    #[test]
    fn test_checksum_covers_tcp_options() {
        let segment = &OPTIONS_PACKET[24..];
        assert_eq!(
            tcp_checksum(segment.len() as u16, SOURCE, DESTINATION, segment),
            OPTIONS_CHECKSUM
        );

        // flipping a byte of the MSS option must change the checksum
        let mut packet = OPTIONS_PACKET;
        packet[47] ^= 0x01;
        assert!(!verify_tcp_checksum(SOURCE, DESTINATION, &packet[24..]));
    }

    #[test]
    fn test_stored_checksum_is_ignored() {
        let mut packet = HELLO_WORLD_PACKET;
        packet[36] = 0xde;
        packet[37] = 0xad;
        assert_eq!(segment_checksum(&packet), HELLO_WORLD_CHECKSUM);
    }

    #[test]
    fn test_odd_length_segment() {
        // "hello world" leaves the segment with an odd byte count
        assert_eq!((HELLO_WORLD_PACKET.len() - 20) % 2, 1);
        assert!(verify_tcp_checksum(SOURCE, DESTINATION, &HELLO_WORLD_PACKET[20..]));
    }

    #[test]
    fn test_verify_detects_corruption() {
        let mut packet = HTTP_GET_PACKET;
        assert!(verify_tcp_checksum(SOURCE, DESTINATION, &packet[20..]));
        packet[45] ^= 0x01;
        assert!(!verify_tcp_checksum(SOURCE, DESTINATION, &packet[20..]));
        assert!(!verify_tcp_checksum(SOURCE, DESTINATION, &packet[20..30]));
    }

    #[test]
    fn test_fold() {
        assert_eq!(fold(0x0001_fffe), 0xffff);
        assert_eq!(fold(0x0002_ffff), 0x0002);
        assert_eq!(fold(0x1234), 0x1234);
    }

    #[test]
    fn test_pseudo_header_sum() {
        let sum = pseudo_header_sum(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2), 20);
        assert_eq!(sum, 0x0a00 + 0x0001 + 0x0a00 + 0x0002 + 6 + 20);
    }

    proptest! {
        #[test]
        fn complement_recovers_folded_sum(
            segment in proptest::collection::vec(any::<u8>(), 20..1500),
            src in any::<u32>(),
            dst in any::<u32>(),
        ) {
            let len = segment.len() as u16;
            let (src, dst) = (Ipv4Addr::from(src), Ipv4Addr::from(dst));
            let checksum = tcp_checksum(len, src, dst, &segment);
            prop_assert_eq!(!checksum, ones_complement_sum(len, src, dst, &segment));
        }

        #[test]
        fn written_checksum_verifies(
            mut segment in proptest::collection::vec(any::<u8>(), 20..1500),
            src in any::<u32>(),
            dst in any::<u32>(),
        ) {
            let (src, dst) = (Ipv4Addr::from(src), Ipv4Addr::from(dst));
            let checksum = tcp_checksum(segment.len() as u16, src, dst, &segment);
            segment[TCP_CHECKSUM_OFFSET..TCP_CHECKSUM_OFFSET + 2]
                .copy_from_slice(&checksum.to_be_bytes());
            prop_assert!(verify_tcp_checksum(src, dst, &segment));
        }
    }
}
