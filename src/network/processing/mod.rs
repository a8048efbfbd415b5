pub mod processor;
pub mod receiver;

pub use processor::PacketProcessor;
pub use receiver::{receive_packets, ReceiveOptions, MAX_CONSECUTIVE_FAILURES};
