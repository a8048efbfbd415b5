use crate::error::{QsedError, Result};
use crate::rules::rule::{Rule, RuleError};
use clap::ValueEnum;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Order in which rules are evaluated against a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RuleOrder {
    /// The most recently added rule runs first
    #[default]
    NewestFirst,
    /// Rules run in the order they were added
    Registration,
}

/// Where a rule comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    /// A single rule spec, as raw bytes
    Inline(Vec<u8>),
    /// A file with one rule per line
    File(PathBuf),
}

/// Ordered set of substitution rules.
///
/// Built once at startup and then only read; the packet processor holds it
/// behind an `Arc` so it can be shared as an immutable snapshot.
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    /// Rules kept in evaluation order
    rules: Vec<Rule>,
    order: RuleOrder,
}

impl RuleStore {
    /// Creates an empty store using the default newest-first order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with the given evaluation order.
    pub fn with_order(order: RuleOrder) -> Self {
        Self {
            rules: Vec::new(),
            order,
        }
    }

    /// Returns the evaluation order of this store.
    pub fn order(&self) -> RuleOrder {
        self.order
    }

    /// Adds a rule built from raw pattern and replacement bytes.
    pub fn add(
        &mut self,
        pattern: impl Into<Vec<u8>>,
        replacement: impl Into<Vec<u8>>,
    ) -> std::result::Result<(), RuleError> {
        let rule = Rule::new(pattern, replacement)?;
        self.push(rule);
        Ok(())
    }

    /// Parses a `<delim><pattern><delim><replacement>` rule and adds it.
    pub fn add_spec(&mut self, spec: &str) -> std::result::Result<(), RuleError> {
        self.add_spec_bytes(spec.as_bytes())
    }

    /// Like [`RuleStore::add_spec`], for rules that are not valid UTF-8.
    pub fn add_spec_bytes(&mut self, spec: &[u8]) -> std::result::Result<(), RuleError> {
        let rule = Rule::parse_bytes(spec)?;
        self.push(rule);
        Ok(())
    }

    fn push(&mut self, rule: Rule) {
        debug!("Adding rule {}", rule);
        match self.order {
            RuleOrder::NewestFirst => self.rules.insert(0, rule),
            RuleOrder::Registration => self.rules.push(rule),
        }
    }

    /// Loads one rule per line from `text`.
    ///
    /// Empty lines and lines starting with `#` are skipped. One trailing
    /// `\r` is stripped from each line, nothing else. Nothing is added
    /// unless every line parses.
    ///
    /// # Arguments
    ///
    /// * `text` - Rule file contents, in any encoding
    /// * `origin` - Name of the source, used in error messages
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of rules added
    /// * `Err(RuleError::Line)` - The first malformed line
    pub fn load_from_bytes(
        &mut self,
        text: &[u8],
        origin: &str,
    ) -> std::result::Result<usize, RuleError> {
        let mut parsed = Vec::new();

        for (index, line) in text.split(|&byte| byte == b'\n').enumerate() {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line.is_empty() || line.starts_with(b"#") {
                continue;
            }

            let rule = Rule::parse_bytes(line).map_err(|error| RuleError::Line {
                origin: origin.to_string(),
                line: index + 1,
                error: Box::new(error),
            })?;
            parsed.push(rule);
        }

        let count = parsed.len();
        for rule in parsed {
            self.push(rule);
        }
        Ok(count)
    }

    /// Reads a rule file and loads it with [`RuleStore::load_from_bytes`].
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let text = fs::read(path)
            .map_err(|e| QsedError::config(path, format!("cannot read rule file: {}", e)))?;
        let count = self.load_from_bytes(&text, &path.display().to_string())?;
        debug!("Loaded {} rules from {}", count, path.display());
        Ok(count)
    }

    /// Loads an inline rule or a rule file.
    ///
    /// # Returns
    ///
    /// The number of rules added
    pub fn load_source(&mut self, source: &RuleSource) -> Result<usize> {
        match source {
            RuleSource::Inline(spec) => {
                self.add_spec_bytes(spec)?;
                Ok(1)
            }
            RuleSource::File(path) => self.load_from_file(path),
        }
    }

    /// Returns whether no rules have been added.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Iterates the rules in evaluation order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }
}

impl<'a> IntoIterator for &'a RuleStore {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
