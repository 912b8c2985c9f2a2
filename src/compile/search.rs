//! Locates syntax delimiters in template source.

use crate::types::syntax::{Kind, Syntax};

/// Finds the configured delimiters in template source.
///
/// Patterns are kept sorted longest first so that when several patterns match
/// at the same position the longest one wins, e.g. `{%` over `{`.
#[derive(Debug, Clone)]
pub struct Searcher {
    patterns: Vec<(Kind, String)>,
}

impl Searcher {
    pub fn new(syntax: Syntax<'_>) -> Self {
        let mut patterns = syntax.patterns;
        patterns.push((Kind::LineJoin, String::from("\\\r\n")));
        patterns.push((Kind::LineJoin, String::from("\\\n")));
        patterns.sort_by(|(_, a), (_, b)| b.len().cmp(&a.len()));
        Self { patterns }
    }

    /// Returns the kind and end offset of the longest pattern accepted by
    /// `accept` that starts exactly at `i`.
    pub fn starts_with<F>(&self, source: &str, i: usize, accept: F) -> Option<(Kind, usize)>
    where
        F: Fn(Kind) -> bool,
    {
        let rest = &source[i..];
        self.patterns
            .iter()
            .filter(|(kind, _)| accept(*kind))
            .find(|(_, pattern)| rest.starts_with(pattern.as_str()))
            .map(|(kind, pattern)| (*kind, i + pattern.len()))
    }

    /// Returns the kind, start and end offsets of the first pattern accepted
    /// by `accept` at or after `i`.
    pub fn find_at<F>(&self, source: &str, i: usize, accept: F) -> Option<(Kind, usize, usize)>
    where
        F: Fn(Kind) -> bool,
    {
        source[i..]
            .char_indices()
            .map(|(d, _)| i + d)
            .find_map(|j| {
                self.starts_with(source, j, &accept)
                    .map(|(kind, k)| (kind, j, k))
            })
    }
}
