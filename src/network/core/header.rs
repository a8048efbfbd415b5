//! Bounds-checked IPv4/TCP header views.
//!
//! [`parse`] validates every length field before it is used, so the
//! offsets in a returned [`HeaderInfo`] always lie inside the buffer.

use std::net::Ipv4Addr;
use std::ops::Range;
use thiserror::Error;

/// Minimal IPv4 header length (IHL = 5)
pub const IPV4_MIN_HEADER_LEN: usize = 20;

/// Minimal TCP header length (data offset = 5)
pub const TCP_MIN_HEADER_LEN: usize = 20;

/// IANA protocol number for TCP
pub const PROTOCOL_TCP: u8 = 6;

/// Offset of the checksum field within the TCP header
pub const TCP_CHECKSUM_OFFSET: usize = 16;

const FLAG_MORE_FRAGMENTS: u16 = 0x2000;
const FRAGMENT_OFFSET_MASK: u16 = 0x1fff;

/// Reasons a buffer is rejected as a TCP/IPv4 packet.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HeaderError {
    /// The buffer cannot hold even a minimal IPv4 header
    #[error("buffer of {len} bytes is shorter than an IPv4 header")]
    Truncated { len: usize },

    /// The IP total length field points past the end of the buffer
    #[error("declared total length {total_len} exceeds buffer of {buffer_len} bytes")]
    TotalLengthExceedsBuffer { total_len: usize, buffer_len: usize },

    /// The IHL field is too small or reaches past the packet
    #[error("invalid IP header length {header_len} for packet of {total_len} bytes")]
    InvalidIpHeaderLength { header_len: usize, total_len: usize },

    /// The data offset field is too small or reaches past the segment
    #[error("invalid TCP header length {header_len}, {available} bytes available")]
    InvalidTcpHeaderLength { header_len: usize, available: usize },
}

/// Classification of a buffer handed over by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedPacket {
    /// A complete TCP segment over IPv4
    Tcp(HeaderInfo),
    /// IPv4 carrying something other than TCP
    NonTcp { protocol: u8 },
    /// Not an IPv4 packet
    NotIpv4 { version: u8 },
    /// An IPv4 fragment; its payload cannot be inspected on its own
    Fragment,
}

/// Validated header fields and derived offsets of a TCP/IPv4 packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderInfo {
    /// IP header length in bytes
    pub ip_header_len: usize,
    /// TCP header length in bytes
    pub tcp_header_len: usize,
    /// Declared IP total length in bytes
    pub total_len: usize,
    /// Source address
    pub source: Ipv4Addr,
    /// Destination address
    pub destination: Ipv4Addr,
}

impl HeaderInfo {
    /// Offset of the first payload byte
    pub fn payload_offset(&self) -> usize {
        self.ip_header_len + self.tcp_header_len
    }

    /// Number of payload bytes
    pub fn payload_len(&self) -> usize {
        self.total_len - self.payload_offset()
    }

    /// Byte range of the TCP payload
    pub fn payload_range(&self) -> Range<usize> {
        self.payload_offset()..self.total_len
    }

    /// Byte range of the TCP segment, header included
    pub fn segment_range(&self) -> Range<usize> {
        self.ip_header_len..self.total_len
    }

    /// Length of the TCP segment as carried in the pseudo-header
    pub fn segment_len(&self) -> u16 {
        // total_len comes from a 16-bit field
        (self.total_len - self.ip_header_len) as u16
    }

    /// Byte range of the TCP checksum field
    pub fn checksum_range(&self) -> Range<usize> {
        let start = self.ip_header_len + TCP_CHECKSUM_OFFSET;
        start..start + 2
    }
}

fn read_u16(buffer: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([buffer[offset], buffer[offset + 1]])
}

fn read_addr(buffer: &[u8], offset: usize) -> Ipv4Addr {
    Ipv4Addr::new(
        buffer[offset],
        buffer[offset + 1],
        buffer[offset + 2],
        buffer[offset + 3],
    )
}

/// Parses the IPv4 and TCP headers at the start of `buffer`.
///
/// Non-TCP, non-IPv4 and fragmented packets are classified rather than
/// rejected, so the caller can pass them through untouched.
///
/// # Returns
///
/// * `Ok(ParsedPacket)` - The classification, with header offsets for TCP
/// * `Err(HeaderError)` - If any length field is inconsistent with the buffer
pub fn parse(buffer: &[u8]) -> Result<ParsedPacket, HeaderError> {
    if buffer.len() < IPV4_MIN_HEADER_LEN {
        return Err(HeaderError::Truncated { len: buffer.len() });
    }

    let version = buffer[0] >> 4;
    if version != 4 {
        return Ok(ParsedPacket::NotIpv4 { version });
    }

    let protocol = buffer[9];
    if protocol != PROTOCOL_TCP {
        return Ok(ParsedPacket::NonTcp { protocol });
    }

    let fragment = read_u16(buffer, 6);
    if fragment & FLAG_MORE_FRAGMENTS != 0 || fragment & FRAGMENT_OFFSET_MASK != 0 {
        return Ok(ParsedPacket::Fragment);
    }

    let total_len = usize::from(read_u16(buffer, 2));
    if total_len > buffer.len() {
        return Err(HeaderError::TotalLengthExceedsBuffer {
            total_len,
            buffer_len: buffer.len(),
        });
    }

    let ip_header_len = usize::from(buffer[0] & 0x0f) * 4;
    if ip_header_len < IPV4_MIN_HEADER_LEN || ip_header_len > total_len {
        return Err(HeaderError::InvalidIpHeaderLength {
            header_len: ip_header_len,
            total_len,
        });
    }

    let available = total_len - ip_header_len;
    if available < TCP_MIN_HEADER_LEN {
        return Err(HeaderError::InvalidTcpHeaderLength {
            header_len: 0,
            available,
        });
    }

    let tcp_header_len = usize::from(buffer[ip_header_len + 12] >> 4) * 4;
    if tcp_header_len < TCP_MIN_HEADER_LEN || tcp_header_len > available {
        return Err(HeaderError::InvalidTcpHeaderLength {
            header_len: tcp_header_len,
            available,
        });
    }

    Ok(ParsedPacket::Tcp(HeaderInfo {
        ip_header_len,
        tcp_header_len,
        total_len,
        source: read_addr(buffer, 12),
        destination: read_addr(buffer, 16),
    }))
}
