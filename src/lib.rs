//! # qsed - a transparent in-path editor for TCP payloads
//!
//! qsed takes packets that netfilter hands to a userspace queue, replaces
//! fixed-length byte patterns inside their TCP payloads and returns them
//! with a corrected TCP checksum. Nothing else about a packet changes: its
//! length, headers and verdict stay the same.
//!
//! ## Features
//!
//! * Substitution rules - `<delim><pattern><delim><replacement>`, inline or from rule files
//! * Checksum repair - The TCP checksum is recomputed for every TCP packet
//! * Pass-through - Non-TCP, non-IPv4, fragmented and malformed packets flow on untouched
//! * Scan modes - Rescan from the start after each substitution, or a single pass
//!
//! ## Architecture
//!
//! * `rules`: parsing and ordering of substitution rules
//! * `network::core`: header parsing, checksums and the packet queue boundary
//! * `network::modules`: the pattern rewriter and statistics
//! * `network::processing`: per-packet processing and the receive loop
//! * `settings`: TOML configuration and command-line flags
//!
//! ## Quick Start
//!
//! ```rust
//! use qsed::prelude::*;
//! use std::sync::Arc;
//!
//! let settings = SettingsBuilder::new().rule("/AABB/00FF").build();
//! let rules = settings.build_rule_store().unwrap();
//! let processor = PacketProcessor::new(Arc::new(rules), settings.rewrite_options());
//!
//! // a UDP datagram is accepted untouched
//! let header = vec![0x45, 0, 0, 20, 0, 0, 0, 0, 64, 17, 0, 0, 10, 0, 0, 1, 10, 0, 0, 2];
//! let mut packet = PacketData::new(1, header);
//! let verdict = processor.process(&mut packet);
//! assert!(!verdict.carries_payload());
//! ```

/// Centralized error handling
pub mod error;
/// Network packet rewriting functionality
pub mod network;
/// Prelude for convenient imports
pub mod prelude;
/// Substitution rules and the rule store
pub mod rules;
/// Configuration settings and command-line flags
pub mod settings;
/// Shared utility functions
pub mod utils;

// Re-export commonly used types
pub use error::{QsedError, Result};
