use crate::error::{QsedError, Result};
use crate::network::modules::rewrite::{RewriteOptions, ScanMode};
use crate::network::processing::ReceiveOptions;
use crate::rules::{RuleOrder, RuleSource, RuleStore};
use crate::settings::{default_rewrite_limit, default_stats_interval};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[cfg(target_os = "linux")]
use crate::network::core::QueueConfig;

/// Everything needed to run the rewrite engine.
///
/// Every field has a default, so a configuration file only needs to name
/// what it changes.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Netfilter queue number to bind
    pub queue_num: u16,

    /// Enables debug logging and prints the rule list at startup
    pub verbose: bool,

    /// Inline rules, `<delim><pattern><delim><replacement>`
    pub rules: Vec<String>,

    /// Files holding one rule per line
    pub rule_files: Vec<PathBuf>,

    /// Order in which rules are evaluated
    pub rule_order: RuleOrder,

    /// How payloads are rescanned after a substitution
    pub scan: ScanMode,

    /// Maximum substitutions per rule and payload
    pub rewrite_limit: usize,

    /// Seconds between statistics log lines
    pub stats_interval_secs: u64,

    /// Rules and rule files from the command line, in the order given
    #[serde(skip)]
    pub sources: Vec<RuleSource>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            queue_num: 0,
            verbose: false,
            rules: Vec::new(),
            rule_files: Vec::new(),
            rule_order: RuleOrder::default(),
            scan: ScanMode::default(),
            rewrite_limit: default_rewrite_limit(),
            stats_interval_secs: default_stats_interval(),
            sources: Vec::new(),
        }
    }
}

impl Settings {
    /// Loads settings from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML configuration file
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - The loaded settings
    /// * `Err(QsedError::Config)` - If the file is unreadable or not valid TOML
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| QsedError::config(path, e))?;
        let settings = toml::from_str(&content).map_err(|e| QsedError::config(path, e))?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Saves the settings to a TOML file.
    ///
    /// Command-line sources are folded into `rule_files` and `rules`, which
    /// load in that order when the file is read back.
    ///
    /// # Returns
    ///
    /// * `Err(QsedError::InvalidSetting)` - If an inline rule is not UTF-8,
    ///   which TOML cannot hold
    /// * `Err(QsedError::Config)` - If the file cannot be written
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut persisted = self.clone();
        for source in persisted.sources.drain(..) {
            match source {
                RuleSource::File(file) => persisted.rule_files.push(file),
                RuleSource::Inline(spec) => {
                    let spec = String::from_utf8(spec).map_err(|e| QsedError::InvalidSetting {
                        name: "rules",
                        message: format!(
                            "'{}' is not UTF-8 and cannot be saved as TOML",
                            String::from_utf8_lossy(e.as_bytes())
                        ),
                    })?;
                    persisted.rules.push(spec);
                }
            }
        }

        let content =
            toml::to_string_pretty(&persisted).map_err(|e| QsedError::config(path, e))?;
        fs::write(path, content).map_err(|e| QsedError::config(path, e))?;
        Ok(())
    }

    /// Checks values that parse but cannot be run with.
    ///
    /// # Returns
    ///
    /// * `Err(QsedError::InvalidSetting)` - If `rewrite_limit` is zero, which
    ///   would leave every payload untouched
    pub fn validate(&self) -> Result<()> {
        if self.rewrite_limit == 0 {
            return Err(QsedError::InvalidSetting {
                name: "rewrite_limit",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Builds the rule store: the configured rule files, then the configured
    /// inline rules, then the command-line sources in the order given.
    ///
    /// # Returns
    ///
    /// * `Ok(RuleStore)` - A non-empty rule store
    /// * `Err(QsedError::InvalidRule)` - If any rule fails to parse
    /// * `Err(QsedError::Config)` - If a rule file cannot be read
    /// * `Err(QsedError::NoRules)` - If no rules were configured at all
    /// * `Err(QsedError::InvalidSetting)` - If [`Settings::validate`] fails
    pub fn build_rule_store(&self) -> Result<RuleStore> {
        self.validate()?;
        let mut store = RuleStore::with_order(self.rule_order);

        for file in &self.rule_files {
            store.load_from_file(file)?;
        }

        for spec in &self.rules {
            store.add_spec(spec)?;
        }

        for source in &self.sources {
            store.load_source(source)?;
        }

        if store.is_empty() {
            return Err(QsedError::NoRules);
        }

        Ok(store)
    }

    pub fn rewrite_options(&self) -> RewriteOptions {
        RewriteOptions {
            scan: self.scan,
            limit: self.rewrite_limit,
        }
    }

    /// Receive loop timing; intervals below one second are raised to one.
    pub fn receive_options(&self) -> ReceiveOptions {
        ReceiveOptions {
            stats_interval: Duration::from_secs(self.stats_interval_secs.max(1)),
            ..Default::default()
        }
    }

    #[cfg(target_os = "linux")]
    pub fn queue_config(&self) -> QueueConfig {
        QueueConfig::with_queue(self.queue_num)
    }
}
