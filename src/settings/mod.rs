//! Settings for the rewrite engine.
//!
//! Settings come from an optional TOML file, with command-line flags
//! layered on top of it.
//!
//! # Example
//!
//! ```rust
//! use qsed::settings::builder::SettingsBuilder;
//!
//! let settings = SettingsBuilder::new()
//!     .rule("/AABB/00FF")
//!     .queue(3)
//!     .build();
//!
//! let rules = settings.build_rule_store().unwrap();
//! assert_eq!(rules.len(), 1);
//! ```

pub mod builder;
pub mod cli;
pub mod manipulation;

// Re-export commonly used types
pub use builder::SettingsBuilder;
pub use cli::Cli;
pub use manipulation::Settings;

/// Default seconds between statistics log lines
pub(crate) fn default_stats_interval() -> u64 {
    2
}

pub(crate) fn default_rewrite_limit() -> usize {
    crate::network::modules::rewrite::DEFAULT_REWRITE_LIMIT
}
