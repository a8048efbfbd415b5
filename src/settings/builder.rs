//! Fluent construction of [`Settings`].
//!
//! # Example
//!
//! ```rust
//! use qsed::network::modules::rewrite::ScanMode;
//! use qsed::settings::builder::SettingsBuilder;
//!
//! let settings = SettingsBuilder::new()
//!     .rule("/GET /PUT ")
//!     .rule_file("/etc/qsed/rules.txt")
//!     .scan(ScanMode::SinglePass)
//!     .build();
//!
//! assert_eq!(settings.rules.len(), 1);
//! ```

use crate::network::modules::rewrite::ScanMode;
use crate::rules::{RuleOrder, RuleSource};
use crate::settings::manipulation::Settings;
use std::path::PathBuf;

/// Builder for constructing `Settings`.
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    settings: Settings,
}

impl From<Settings> for SettingsBuilder {
    /// Starts from existing settings, such as ones loaded from a file.
    fn from(settings: Settings) -> Self {
        Self { settings }
    }
}

impl SettingsBuilder {
    /// Creates a new builder with default settings and no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the netfilter queue number.
    pub fn queue(mut self, queue_num: u16) -> Self {
        self.settings.queue_num = queue_num;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.settings.verbose = verbose;
        self
    }

    /// Appends an inline rule.
    ///
    /// # Arguments
    ///
    /// * `spec` - Rule text, `<delim><pattern><delim><replacement>`
    pub fn rule(mut self, spec: impl Into<String>) -> Self {
        self.settings.rules.push(spec.into());
        self
    }

    /// Appends a rule file.
    pub fn rule_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings.rule_files.push(path.into());
        self
    }

    /// Appends a command-line rule source. Sources load after the
    /// configured rule files and rules, in the order they were added.
    pub fn source(mut self, source: RuleSource) -> Self {
        self.settings.sources.push(source);
        self
    }

    pub fn rule_order(mut self, order: RuleOrder) -> Self {
        self.settings.rule_order = order;
        self
    }

    pub fn scan(mut self, scan: ScanMode) -> Self {
        self.settings.scan = scan;
        self
    }

    /// Caps substitutions per rule and payload.
    pub fn rewrite_limit(mut self, limit: usize) -> Self {
        self.settings.rewrite_limit = limit;
        self
    }

    /// Sets the number of seconds between statistics log lines.
    pub fn stats_interval(mut self, secs: u64) -> Self {
        self.settings.stats_interval_secs = secs;
        self
    }

    /// Builds the final `Settings`.
    pub fn build(self) -> Settings {
        self.settings
    }
}
