use std::ops::{Index, Range};

/// A byte range `m..n` in the template source.
///
/// Every token, node and error carries one so that diagnostics can point at
/// the exact text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub m: usize,
    pub n: usize,
}

impl Span {
    /// Returns the smallest span covering both spans.
    pub fn combine(self, other: Self) -> Self {
        Self {
            m: self.m.min(other.m),
            n: self.n.max(other.n),
        }
    }
}

impl From<Range<usize>> for Span {
    fn from(Range { start, end }: Range<usize>) -> Self {
        Self { m: start, n: end }
    }
}

impl Index<Span> for str {
    type Output = str;

    fn index(&self, Span { m, n }: Span) -> &str {
        &self[m..n]
    }
}
