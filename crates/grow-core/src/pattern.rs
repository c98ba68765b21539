use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};
use tracing::debug;

/// An unordered set of input patterns.
///
/// Each pattern is a regular expression that must match a whole word (or run
/// of words) somewhere in the input, ignoring case. Patterns that are not
/// valid regular expressions match as literal text. Empty patterns are never
/// stored. Iteration order is sorted and therefore stable across runs.
///
/// Each pattern is compiled once, when it is inserted.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: BTreeMap<String, Option<Regex>>,
}

impl PatternSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pattern. Returns `false` if it was empty or already present.
    pub fn insert(&mut self, pattern: impl Into<String>) -> bool {
        let pattern = pattern.into();
        if pattern.is_empty() || self.patterns.contains_key(&pattern) {
            return false;
        }
        let matcher = compile(&pattern);
        self.patterns.insert(pattern, matcher);
        true
    }

    /// Remove a pattern by value.
    pub fn remove(&mut self, pattern: &str) -> bool {
        self.patterns.remove(pattern).is_some()
    }

    /// Number of patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the set has no patterns.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Iterate patterns in their stable order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.patterns.keys().map(String::as_str)
    }

    /// Whether any pattern matches `input`.
    pub fn matches(&self, input: &str) -> bool {
        self.patterns
            .values()
            .flatten()
            .any(|matcher| matcher.is_match(input))
    }
}

/// Build the whole-word, case-insensitive matcher for one pattern.
fn compile(pattern: &str) -> Option<Regex> {
    let build = |body: &str| {
        RegexBuilder::new(&format!(r"\b(?:{body})\b"))
            .case_insensitive(true)
            .build()
    };
    match build(pattern) {
        Ok(re) => Some(re),
        Err(err) => {
            debug!(pattern, error = %err, "pattern is not a valid regex, matching literally");
            build(&regex::escape(pattern)).ok()
        }
    }
}

impl PartialEq for PatternSet {
    fn eq(&self, other: &Self) -> bool {
        self.patterns.keys().eq(other.patterns.keys())
    }
}

impl Eq for PatternSet {}

impl<S: Into<String>> FromIterator<S> for PatternSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for pattern in iter {
            set.insert(pattern);
        }
        set
    }
}

impl<S: Into<String>> Extend<S> for PatternSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for pattern in iter {
            self.insert(pattern);
        }
    }
}
