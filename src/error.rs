use std::cmp::max;
use std::fmt;

use crate::types::span::Span;

/// An error that can occur during template compilation or rendering.
#[derive(Clone)]
pub struct Error {
    kind: ErrorKind,
    msg: String,
    span: Option<(String, Span)>,
}

/// The category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The template source is malformed, e.g. an unclosed block or an unknown
    /// tag. Returned from compilation.
    Syntax,
    /// An expression tried to traverse into a value that cannot be traversed,
    /// e.g. indexing into a string with a key. Returned from rendering.
    Render,
    /// The render context could not be converted into a [`Value`][crate::Value].
    Serialize,
}

impl Error {
    /// Construct a new syntax error pointing at the given span.
    pub(crate) fn syntax(msg: impl Into<String>, source: &str, span: impl Into<Span>) -> Self {
        Self::with_span(ErrorKind::Syntax, msg, source, span)
    }

    /// Construct a new render error pointing at the given span.
    pub(crate) fn render(msg: impl Into<String>, source: &str, span: impl Into<Span>) -> Self {
        Self::with_span(ErrorKind::Render, msg, source, span)
    }

    fn with_span(
        kind: ErrorKind,
        msg: impl Into<String>,
        source: &str,
        span: impl Into<Span>,
    ) -> Self {
        Self {
            kind,
            msg: msg.into(),
            span: Some((source.to_owned(), span.into())),
        }
    }

    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message without any source information.
    pub fn message(&self) -> &str {
        &self.msg
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: fmt::Display,
    {
        Self {
            kind: ErrorKind::Serialize,
            msg: msg.to_string(),
            span: None,
        }
    }
}

impl std::error::Error for Error {}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            Some((source, span)) => fmt_pretty(&self.msg, source, *span, f),
            None => write!(f, "{}", self.msg),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            Some((source, span)) => {
                if f.alternate() {
                    fmt_pretty(&self.msg, source, *span, f)
                } else {
                    write!(f, "{} between bytes {} and {}", self.msg, span.m, span.n)
                }
            }
            None => write!(f, "{}", self.msg),
        }
    }
}

fn fmt_pretty(msg: &str, source: &str, span: Span, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let lines: Vec<_> = source.split_terminator('\n').collect();
    let (line, col) = to_line_col(&lines, span.m);
    let width = max(1, display_width(&source[span.m..span.n]));
    let code = lines
        .get(line)
        .or_else(|| lines.last())
        .copied()
        .unwrap_or_default();

    let num = (line + 1).to_string();
    let pad = display_width(&num);
    let pipe = "|";
    let underline = "^".repeat(width);

    write!(
        f,
        "\n \
        {0:pad$} {pipe}\n \
        {num:>} {pipe} {code}\n \
        {0:pad$} {pipe} {underline:>width$} {msg}\n",
        "",
        pad = pad,
        pipe = pipe,
        num = num,
        code = code,
        underline = underline,
        width = col + width,
        msg = msg
    )
}

fn to_line_col(lines: &[&str], offset: usize) -> (usize, usize) {
    let mut n = 0;
    for (i, line) in lines.iter().enumerate() {
        let len = line.len() + 1;
        if n + len > offset {
            return (i, display_width(&line[..offset - n]));
        }
        n += len;
    }
    (
        lines.len().saturating_sub(1),
        lines.last().map(|l| display_width(l)).unwrap_or(0),
    )
}

#[cfg(feature = "unicode")]
fn display_width(s: &str) -> usize {
    unicode_width::UnicodeWidthStr::width(s)
}

#[cfg(not(feature = "unicode"))]
fn display_width(s: &str) -> usize {
    s.chars().count()
}
