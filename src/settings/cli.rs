//! Command-line interface.
//!
//! Flags are layered over the configuration file: scalar flags replace the
//! file's values, while `-s` and `-f` add rule sources after its rules.
//! Rule arguments are raw bytes, so a rule need not be valid UTF-8.

use crate::error::Result;
use crate::network::modules::rewrite::ScanMode;
use crate::rules::{RuleOrder, RuleSource};
use crate::settings::builder::SettingsBuilder;
use crate::settings::manipulation::Settings;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

/// Rewrites TCP payloads of packets queued by netfilter.
///
/// Every occurrence of a pattern is replaced by a replacement of the same
/// length, and the TCP checksum is fixed up. Send traffic to the queue with
/// e.g. `iptables -A OUTPUT -p tcp --dport 80 -j NFQUEUE --queue-num 0`.
#[derive(Parser, Debug)]
#[command(name = "qsed", version)]
pub struct Cli {
    /// Substitution rule `<delim><pattern><delim><replacement>`, e.g. `/foo/bar`
    #[arg(short = 's', long = "substitute", value_name = "RULE", allow_hyphen_values = true)]
    pub substitute: Vec<OsString>,

    /// File with one rule per line; `#` starts a comment line
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Netfilter queue number [default: 0]
    #[arg(short = 'q', long = "queue", value_name = "NUM")]
    pub queue: Option<u16>,

    /// Debug logging, and print the rules at startup
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// TOML settings file
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Order in which rules are evaluated [default: newest-first]
    #[arg(long = "rule-order", value_enum)]
    pub rule_order: Option<RuleOrder>,

    /// How payloads are rescanned after a substitution [default: restart]
    #[arg(long = "scan", value_enum)]
    pub scan: Option<ScanMode>,

    /// Maximum substitutions per rule and payload [default: 65535]
    #[arg(long = "rewrite-limit", value_name = "N")]
    pub rewrite_limit: Option<usize>,

    /// Seconds between statistics log lines [default: 2]
    #[arg(long = "stats-interval", value_name = "SECS")]
    pub stats_interval: Option<u64>,

    /// Write the resolved settings to a TOML file and exit
    #[arg(long = "write-config", value_name = "PATH")]
    pub write_config: Option<PathBuf>,

    /// `-s` and `-f` values in command-line order
    #[arg(skip)]
    pub sources: Vec<RuleSource>,
}

impl Cli {
    /// Parses the process arguments, exiting with usage on error.
    pub fn parse_args() -> Self {
        let matches = Self::command().get_matches();
        Self::from_matches(&matches).unwrap_or_else(|e| e.exit())
    }

    /// Parses `args`, keeping the relative order of `-s` and `-f`.
    pub fn try_parse_args_from<I, T>(args: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command().try_get_matches_from(args)?;
        Self::from_matches(&matches)
    }

    fn from_matches(matches: &ArgMatches) -> std::result::Result<Self, clap::Error> {
        let mut cli = Self::from_arg_matches(matches)?;
        cli.sources = ordered_sources(matches);
        Ok(cli)
    }

    /// Resolves the effective settings: the configuration file, if any,
    /// with the command-line flags applied on top.
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - The merged settings
    /// * `Err(QsedError::Config)` - If the configuration file is unusable
    /// * `Err(QsedError::InvalidSetting)` - If a merged value cannot be run with
    pub fn settings(&self) -> Result<Settings> {
        let base = match &self.config {
            Some(path) => Settings::load_from_file(path)?,
            None => Settings::default(),
        };
        let settings = self.apply(base);
        settings.validate()?;
        Ok(settings)
    }

    /// Applies the command-line flags on top of `base`.
    pub fn apply(&self, base: Settings) -> Settings {
        let mut builder = SettingsBuilder::from(base);

        if let Some(queue) = self.queue {
            builder = builder.queue(queue);
        }
        if self.verbose {
            builder = builder.verbose(true);
        }
        if let Some(order) = self.rule_order {
            builder = builder.rule_order(order);
        }
        if let Some(scan) = self.scan {
            builder = builder.scan(scan);
        }
        if let Some(limit) = self.rewrite_limit {
            builder = builder.rewrite_limit(limit);
        }
        if let Some(secs) = self.stats_interval {
            builder = builder.stats_interval(secs);
        }

        for source in self.rule_sources() {
            builder = builder.source(source);
        }

        builder.build()
    }

    fn rule_sources(&self) -> Vec<RuleSource> {
        if !self.sources.is_empty() {
            return self.sources.clone();
        }

        // parsed without argument indices: files, then inline rules
        let files = self.files.iter().cloned().map(RuleSource::File);
        let inline = self.substitute.iter().map(|spec| RuleSource::Inline(os_bytes(spec)));
        files.chain(inline).collect()
    }
}

/// Merges the `-s` and `-f` values by their position on the command line.
fn ordered_sources(matches: &ArgMatches) -> Vec<RuleSource> {
    let mut sources: Vec<(usize, RuleSource)> = Vec::new();

    if let (Some(indices), Some(values)) = (
        matches.indices_of("substitute"),
        matches.get_many::<OsString>("substitute"),
    ) {
        sources.extend(indices.zip(values).map(|(i, v)| (i, RuleSource::Inline(os_bytes(v)))));
    }
    if let (Some(indices), Some(values)) =
        (matches.indices_of("files"), matches.get_many::<PathBuf>("files"))
    {
        sources.extend(indices.zip(values).map(|(i, v)| (i, RuleSource::File(v.clone()))));
    }

    sources.sort_by_key(|(index, _)| *index);
    sources.into_iter().map(|(_, source)| source).collect()
}

#[cfg(unix)]
fn os_bytes(value: &OsStr) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    value.as_bytes().to_vec()
}

#[cfg(not(unix))]
fn os_bytes(value: &OsStr) -> Vec<u8> {
    value.to_string_lossy().into_owned().into_bytes()
}
