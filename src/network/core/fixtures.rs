//! Captured IPv4/TCP packets with known-good checksums, shared by unit tests.

/// 192.168.1.10:49152 -> 93.184.216.34:80, PSH|ACK, payload "hello world",
/// TCP checksum 0x4bf7.
pub const HELLO_WORLD_PACKET: [u8; 51] = [
    0x45, 0x00, 0x00, 0x33, 0x1c, 0x46, 0x40, 0x00, 0x40, 0x06, 0x26, 0xf2, 0xc0, 0xa8, 0x01,
    0x0a, 0x5d, 0xb8, 0xd8, 0x22, 0xc0, 0x00, 0x00, 0x50, 0x01, 0x02, 0x03, 0x04, 0x0a, 0x0b,
    0x0c, 0x0d, 0x50, 0x18, 0xff, 0xff, 0x4b, 0xf7, 0x00, 0x00, 0x68, 0x65, 0x6c, 0x6c, 0x6f,
    0x20, 0x77, 0x6f, 0x72, 0x6c, 0x64,
];

pub const HELLO_WORLD_CHECKSUM: u16 = 0x4bf7;

/// Same flow, payload "GET /AABBCCAABB HTTP/1.1\r\n\r\n", TCP checksum 0xb4c9.
pub const HTTP_GET_PACKET: [u8; 68] = [
    0x45, 0x00, 0x00, 0x44, 0x1c, 0x46, 0x40, 0x00, 0x40, 0x06, 0x26, 0xe1, 0xc0, 0xa8, 0x01,
    0x0a, 0x5d, 0xb8, 0xd8, 0x22, 0xc0, 0x00, 0x00, 0x50, 0x01, 0x02, 0x03, 0x04, 0x0a, 0x0b,
    0x0c, 0x0d, 0x50, 0x18, 0xff, 0xff, 0xb4, 0xc9, 0x00, 0x00, 0x47, 0x45, 0x54, 0x20, 0x2f,
    0x41, 0x41, 0x42, 0x42, 0x43, 0x43, 0x41, 0x41, 0x42, 0x42, 0x20, 0x48, 0x54, 0x54, 0x50,
    0x2f, 0x31, 0x2e, 0x31, 0x0d, 0x0a, 0x0d, 0x0a,
];

pub const HTTP_GET_CHECKSUM: u16 = 0xb4c9;

/// Checksum of [`HTTP_GET_PACKET`] once `AABB` has been rewritten to `00FF`.
pub const HTTP_GET_REWRITTEN_CHECKSUM: u16 = 0xcee3;

pub fn http_get_packet() -> Vec<u8> {
    HTTP_GET_PACKET.to_vec()
}

/// The hello world packet relabelled as UDP.
pub fn udp_packet() -> Vec<u8> {
    let mut packet = HELLO_WORLD_PACKET.to_vec();
    packet[9] = 17;
    packet
}

/// Reads the TCP checksum stored in a packet with a 20 byte IP header.
///
/// Use the parsed `checksum_range` for packets carrying IP options.
pub fn stored_checksum(packet: &[u8]) -> u16 {
    u16::from_be_bytes([packet[36], packet[37]])
}

/// Same flow with a 24 byte IP header (NOP padding) and a 24 byte TCP header
/// (MSS option), payload "abc-abc-!", TCP checksum 0x1bec.
pub const OPTIONS_PACKET: [u8; 57] = [
    0x46, 0x00, 0x00, 0x39, 0x1c, 0x46, 0x40, 0x00, 0x40, 0x06, 0x23, 0xeb, 0xc0, 0xa8, 0x01,
    0x0a, 0x5d, 0xb8, 0xd8, 0x22, 0x01, 0x01, 0x01, 0x00, 0xc0, 0x00, 0x00, 0x50, 0x01, 0x02,
    0x03, 0x04, 0x0a, 0x0b, 0x0c, 0x0d, 0x60, 0x18, 0xff, 0xff, 0x1b, 0xec, 0x00, 0x00, 0x02,
    0x04, 0x05, 0xb4, 0x61, 0x62, 0x63, 0x2d, 0x61, 0x62, 0x63, 0x2d, 0x21,
];

pub const OPTIONS_CHECKSUM: u16 = 0x1bec;

/// Checksum of [`OPTIONS_PACKET`] once `abc` has been rewritten to `XYZ`.
pub const OPTIONS_REWRITTEN_CHECKSUM: u16 = 0x3ffe;
