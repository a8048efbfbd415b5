use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while building substitution rules.
///
/// Every variant names the offending rule so configuration failures can be
/// reported back to the user verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// The rule text has no second delimiter separating the two halves
    #[error("incorrect rule '{0}': expected <delim><pattern><delim><replacement>")]
    MissingDelimiter(String),

    /// The delimiter shows up again inside the replacement
    #[error("incorrect rule '{0}': delimiter must not appear inside the replacement")]
    DelimiterInReplacement(String),

    /// Pattern and replacement are empty
    #[error("rule '{0}' is empty")]
    Empty(String),

    /// Pattern and replacement differ in length
    #[error("pattern and replacement must be the same length: '{rule}' ({pattern} vs {replacement} bytes)")]
    LengthMismatch {
        rule: String,
        pattern: usize,
        replacement: usize,
    },

    /// Pattern and replacement are byte-identical, which can never terminate a rescan
    #[error("rule '{0}' replaces a pattern with itself")]
    Identical(String),

    /// A rule inside a rule file failed to parse
    #[error("{origin}:{line}: {error}")]
    Line {
        origin: String,
        line: usize,
        error: Box<RuleError>,
    },
}

/// A fixed-length substitution: every occurrence of `pattern` is
/// overwritten with `replacement`, which has exactly the same length.
///
/// # Example
///
/// ```
/// use qsed::rules::Rule;
///
/// let rule: Rule = "/foo/bar".parse().unwrap();
/// assert_eq!(rule.pattern(), b"foo");
/// assert_eq!(rule.replacement(), b"bar");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pattern: Box<[u8]>,
    replacement: Box<[u8]>,
}

impl Rule {
    /// Creates a rule from raw bytes.
    ///
    /// # Returns
    ///
    /// * `Err(RuleError)` - If the halves differ in length, are empty, or are identical
    pub fn new(
        pattern: impl Into<Vec<u8>>,
        replacement: impl Into<Vec<u8>>,
    ) -> Result<Self, RuleError> {
        let pattern = pattern.into();
        let replacement = replacement.into();
        let label = || {
            format!(
                "{} -> {}",
                String::from_utf8_lossy(&pattern),
                String::from_utf8_lossy(&replacement)
            )
        };
        Self::validate(&pattern, &replacement, label)?;

        Ok(Self {
            pattern: pattern.into_boxed_slice(),
            replacement: replacement.into_boxed_slice(),
        })
    }

    /// Parses `<delim><pattern><delim><replacement>` from raw bytes.
    ///
    /// The delimiter is the first character and the pattern ends at its next
    /// occurrence. Both halves are taken verbatim, so they may hold any byte,
    /// not just UTF-8 text.
    ///
    /// ```
    /// use qsed::rules::Rule;
    ///
    /// let rule = Rule::parse_bytes(b"/caf\xe9/CAF\xc9").unwrap();
    /// assert_eq!(rule.pattern(), b"caf\xe9");
    /// ```
    pub fn parse_bytes(spec: &[u8]) -> Result<Self, RuleError> {
        let label = || String::from_utf8_lossy(spec).into_owned();

        let delim_len = delimiter_len(spec).ok_or_else(|| RuleError::MissingDelimiter(label()))?;
        let (delim, rest) = spec.split_at(delim_len);

        let split = find_subslice(rest, delim).ok_or_else(|| RuleError::MissingDelimiter(label()))?;
        let pattern = &rest[..split];
        let replacement = &rest[split + delim_len..];

        if find_subslice(replacement, delim).is_some() {
            return Err(RuleError::DelimiterInReplacement(label()));
        }

        Self::validate(pattern, replacement, label)?;

        Ok(Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        })
    }

    fn validate(
        pattern: &[u8],
        replacement: &[u8],
        label: impl Fn() -> String,
    ) -> Result<(), RuleError> {
        if pattern.len() != replacement.len() {
            return Err(RuleError::LengthMismatch {
                rule: label(),
                pattern: pattern.len(),
                replacement: replacement.len(),
            });
        }

        if pattern.is_empty() {
            return Err(RuleError::Empty(label()));
        }

        if pattern == replacement {
            return Err(RuleError::Identical(label()));
        }

        Ok(())
    }

    /// Bytes searched for in the payload
    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    /// Bytes written over each match
    pub fn replacement(&self) -> &[u8] {
        &self.replacement
    }

    /// Length shared by pattern and replacement, always at least one
    pub fn length(&self) -> usize {
        self.pattern.len()
    }
}

impl FromStr for Rule {
    type Err = RuleError;

    /// Parses `<delim><pattern><delim><replacement>`, see [`Rule::parse_bytes`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_bytes(s.as_bytes())
    }
}

/// Length of the leading character of `spec`: a whole UTF-8 sequence when
/// the text starts with one, otherwise a single byte.
fn delimiter_len(spec: &[u8]) -> Option<usize> {
    let first = *spec.first()?;
    if first.is_ascii() {
        return Some(1);
    }

    let utf8_len = (2..=4).find(|&len| {
        spec.get(..len)
            .is_some_and(|prefix| std::str::from_utf8(prefix).is_ok())
    });
    Some(utf8_len.unwrap_or(1))
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

impl fmt::Display for Rule {
    /// Formats the rule as hex, `pattern -> replacement`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.pattern.iter() {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, " -> ")?;
        for byte in self.replacement.iter() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}
