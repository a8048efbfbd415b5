//! Prelude module for convenient imports.
//!
//! This module re-exports commonly used types and traits from the crate,
//! allowing users to import everything they need with a single use statement:
//!
//! ```rust
//! use qsed::prelude::*;
//! ```

// Error handling
pub use crate::error::{QsedError, Result};

// Rules
pub use crate::rules::{Rule, RuleError, RuleOrder, RuleStore};

// Network core
#[cfg(target_os = "linux")]
pub use crate::network::core::{NfQueueHandle, QueueConfig};
pub use crate::network::core::{MemoryQueue, PacketData, PacketQueue};

// Rewriting and processing
pub use crate::network::modules::rewrite::{RewriteOptions, ScanMode};
pub use crate::network::processing::{receive_packets, PacketProcessor, ReceiveOptions};
pub use crate::network::types::verdict::{Outcome, PassReason, Verdict};

// Statistics
pub use crate::network::modules::stats::RewriteStats;

// Settings
pub use crate::settings::{Cli, Settings, SettingsBuilder};
