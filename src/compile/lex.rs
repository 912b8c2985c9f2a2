use crate::compile::parse::Keyword;
use crate::types::span::Span;
use crate::types::syntax::Kind;
use crate::{Engine, Error, Result};

/// A lexer that tokenizes the template source into distinct chunks so that the
/// parser doesn't have to operate on raw text.
///
/// The lexer is implemented as a fallible iterator. The parser should
/// repeatedly call the [`.next()?`][Lexer::next] method to return the next
/// non-whitespace token until [`None`] is returned.
///
/// Line joins (a backslash directly before a line ending) are removed here:
/// the raw text on either side is emitted as two separate [`Token::Raw`]
/// tokens and the marker itself produces no token at all.
pub struct Lexer<'engine, 'source> {
    /// A reference to the engine containing the syntax searcher.
    engine: &'engine Engine<'engine>,

    /// The original template source.
    pub source: &'source str,

    /// A cursor over the template source.
    cursor: usize,

    /// The current state of the lexer.
    state: State,

    /// The previous non-whitespace token within the current tag.
    prev: Option<Token>,

    /// A buffer to store the next token.
    next: Option<(Token, Span)>,
}

/// The state of the lexer.
///
/// The lexer requires state because the tokenization is different when
/// tokenizing text between expression and block syntax, e.g. `#{ expr }`,
/// `{% if cond %}`.
#[derive(Debug, Clone, Copy)]
enum State {
    /// Within raw template.
    Template,

    /// Between expression or block tags.
    Block {
        /// The span of the begin tag.
        begin: Span,
        /// The end token we are expecting.
        end: Token,
    },

    /// Between comment tags.
    Comment {
        /// The span of the begin tag.
        begin: Span,
    },
}

/// The unit yielded by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Raw template
    Raw,
    /// Begin expression tag, e.g. `#{`
    BeginExpr,
    /// End expression tag, e.g. `}`
    EndExpr,
    /// Begin block tag, e.g. `{%`
    BeginBlock,
    /// End block tag, e.g. `%}`
    EndBlock,
    /// Begin comment tag, e.g. `{#`
    BeginComment,
    /// End comment tag, e.g. `#}`
    EndComment,
    /// A dotted path following the short expression prefix, e.g. `user.name`
    /// in `$user.name`
    ShortExpr,
    /// `.`
    Dot,
    /// `,`
    Comma,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `-`
    Minus,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// Sequence of spaces, tabs, line endings or line joins
    Whitespace,
    /// A keyword like `if` or `for`
    Keyword,
    /// An attribute or variable
    Ident,
    /// An index into a list, e.g. the `0` in `changes.0`
    Index,
    /// An integer or float literal, e.g. `19` or `0.5`
    Number,
    /// A string literal, e.g. `'created'` or `"Hello World!\n"`
    String,
}

impl<'engine, 'source> Lexer<'engine, 'source> {
    /// Construct a new lexer.
    pub fn new(engine: &'engine Engine<'engine>, source: &'source str) -> Self {
        Self {
            engine,
            source,
            cursor: 0,
            state: State::Template,
            prev: None,
            next: None,
        }
    }

    /// Returns the next non-whitespace token and its span.
    pub fn next(&mut self) -> Result<Option<(Token, Span)>> {
        loop {
            match self.lex()? {
                Some((tk, sp)) if !tk.is_whitespace() => return Ok(Some((tk, sp))),
                None => return Ok(None),
                _ => continue,
            }
        }
    }

    /// Returns the next token and span.
    fn lex(&mut self) -> Result<Option<(Token, Span)>> {
        if let Some(next) = self.next.take() {
            return Ok(Some(next));
        }

        loop {
            let i = self.cursor;

            if self.source[i..].is_empty() {
                return match self.state {
                    State::Template => Ok(None),
                    State::Block { begin, end } => Err(self.err_unclosed(begin, end)),
                    State::Comment { begin } => Err(self.err_unclosed(begin, Token::EndComment)),
                };
            }

            let lexed = match self.state {
                State::Template => self.lex_template(i)?,
                State::Block { begin, end } => Some(self.lex_block(begin, end, i)?),
                State::Comment { begin } => Some(self.lex_comment(begin, i)?),
            };

            // Nothing is emitted for a line join directly at the cursor.
            if lexed.is_some() {
                return Ok(lexed);
            }
        }
    }

    fn lex_template(&mut self, i: usize) -> Result<Option<(Token, Span)>> {
        // We are within raw template, that means all we have to do is
        // find the next begin tag, short expression or line join from `i`.
        // The following diagram helps describe the variable naming.
        //
        // xxxxxxx{%xxxxxxxxx
        //    ^   ^ ^
        //    i   j k

        let raw = |j: usize| (i < j).then(|| (Token::Raw, Span::from(i..j)));

        let mut from = i;
        loop {
            let searcher = &self.engine.searcher;
            let found = searcher.find_at(self.source, from, |k| {
                k.is_begin() || k == Kind::LineJoin
            });

            match found {
                None => {
                    let j = self.source.len();
                    self.cursor = j;
                    return Ok(raw(j));
                }

                Some((Kind::LineJoin, j, k)) => {
                    self.cursor = k;
                    return Ok(raw(j));
                }

                Some((Kind::ShortExpr, j, k)) => {
                    let prefix = &self.source[j..k];

                    // The prefix written twice is an escaped prefix, emit
                    // the raw text including a single prefix.
                    if self.source[k..].starts_with(prefix) {
                        self.cursor = k + prefix.len();
                        return Ok(raw(k));
                    }

                    match self.lex_short_expr(k) {
                        Some(n) => {
                            self.cursor = n;
                            let path = (Token::ShortExpr, Span::from(k..n));
                            if i == j {
                                return Ok(Some(path));
                            }
                            self.next = Some(path);
                            return Ok(raw(j));
                        }
                        // Not followed by a path, so the prefix is just text.
                        None => {
                            from = k;
                        }
                    }
                }

                Some((kind, j, k)) => {
                    let tk = Token::from_kind(kind);
                    let begin = Span::from(j..k);
                    self.cursor = k;
                    self.prev = None;
                    self.state = match tk {
                        Token::BeginComment => State::Comment { begin },
                        _ => State::Block {
                            begin,
                            end: tk.pair(),
                        },
                    };
                    if i == j {
                        return Ok(Some((tk, begin)));
                    }
                    // We must first emit the raw token, so we store the
                    // begin tag token in the `next` buffer.
                    self.next = Some((tk, begin));
                    return Ok(raw(j));
                }
            }
        }
    }

    fn lex_block(&mut self, begin: Span, end: Token, i: usize) -> Result<(Token, Span)> {
        // We are between two tags #{ ... } or {% ... %} that means we
        // must parse template syntax relevant tokens and also lookout
        // for the corresponding end tag `end`.

        let searcher = &self.engine.searcher;
        let delim = searcher.starts_with(self.source, i, |k| k != Kind::ShortExpr);

        let (tk, j) = match delim {
            Some((kind, j)) => {
                let tk = Token::from_kind(kind);
                if tk == end {
                    // A matching end tag! Update the state and
                    // return the token.
                    self.state = State::Template;
                    self.cursor = j;
                    return Ok((tk, Span::from(i..j)));
                }
                if tk.is_begin_tag() {
                    return Err(self.err_unclosed(begin, end));
                }
                if !tk.is_whitespace() {
                    return Err(self.err_unexpected_token(tk, i..j));
                }
                (tk, j)
            }
            None => {
                // We iterate over chars because that is nicer than operating on
                // raw bytes. The map call here fixes the index to be relative
                // to the actual template source.
                let mut iter = self.source[i..].char_indices().map(|(d, c)| (i + d, c));

                let (i, c) = match iter.next() {
                    Some(next) => next,
                    None => return Err(self.err_unclosed(begin, end)),
                };

                match c {
                    // Single character to token mappings.
                    '.' => (Token::Dot, i + 1),
                    ',' => (Token::Comma, i + 1),
                    '(' => (Token::LParen, i + 1),
                    ')' => (Token::RParen, i + 1),
                    '[' => (Token::LBracket, i + 1),
                    ']' => (Token::RBracket, i + 1),
                    '-' => (Token::Minus, i + 1),

                    // Two character operators.
                    '=' | '!' => match iter.next() {
                        Some((_, '=')) if c == '=' => (Token::EqEq, i + 2),
                        Some((_, '=')) => (Token::NotEq, i + 2),
                        _ => return Err(self.err_unexpected_character(i..i + 1)),
                    },

                    // Multi-character tokens with a distinct start character.
                    '"' | '\'' => self.lex_string(iter, i, c)?,
                    c if c.is_ascii_digit() => match self.prev {
                        Some(Token::Dot) => (Token::Index, self.lex_digits(i)),
                        _ => (Token::Number, self.lex_number(i)),
                    },
                    c if is_whitespace(c) => (Token::Whitespace, self.lex_while(iter, is_whitespace)),
                    c if is_ident_start(c) => self.lex_ident_or_keyword(iter, i),

                    // Any other character...
                    _ => {
                        return Err(self.err_unexpected_character(i..(i + c.len_utf8())));
                    }
                }
            }
        };

        if !tk.is_whitespace() {
            self.prev = Some(tk);
        }

        // Finally, we need to update the cursor.
        self.cursor = j;

        Ok((tk, Span::from(i..j)))
    }

    fn lex_comment(&mut self, begin: Span, i: usize) -> Result<(Token, Span)> {
        // We are between two comment tags {# ... #}, that means all we
        // have to do is find the corresponding end tag. The following
        // diagram helps describe the variable naming.
        //
        // x{#cccccc#}xxxxxx
        //    ^     ^ ^
        //    i     j k

        let searcher = &self.engine.searcher;
        match searcher.find_at(self.source, i, |k| k == Kind::EndComment) {
            Some((_, j, k)) => {
                self.cursor = k;
                self.state = State::Template;
                let end = (Token::EndComment, Span::from(j..k));
                if i == j {
                    // The current cursor is exactly at the token.
                    Ok(end)
                } else {
                    // We must first emit the raw token, so we store the end
                    // tag token in the `next` buffer.
                    self.next = Some(end);
                    Ok((Token::Raw, Span::from(i..j)))
                }
            }
            None => Err(self.err_unclosed(begin, Token::EndComment)),
        }
    }

    /// Returns the end of a dotted path starting at `i`, if there is one.
    ///
    /// A trailing `.` that is not followed by an identifier is not part of the
    /// path, so `$name.` ends a sentence as expected.
    fn lex_short_expr(&self, i: usize) -> Option<usize> {
        let mut n = self.ident_end(i)?;
        while self.source[n..].starts_with('.') {
            match self.ident_end(n + 1) {
                Some(m) => n = m,
                None => break,
            }
        }
        Some(n)
    }

    fn ident_end(&self, i: usize) -> Option<usize> {
        let mut iter = self.source[i..].char_indices().map(|(d, c)| (i + d, c));
        match iter.next() {
            Some((_, c)) if is_ident_start(c) => Some(self.lex_while(iter, is_ident)),
            _ => None,
        }
    }

    fn lex_string<I>(&mut self, iter: I, i: usize, quote: char) -> Result<(Token, usize)>
    where
        I: Iterator<Item = (usize, char)> + Clone,
    {
        let mut escaped = false;
        for (j, c) in iter {
            match c {
                '\r' | '\n' => {
                    return Err(self.err_undelimited_string(i..j));
                }
                c if c == quote && !escaped => {
                    return Ok((Token::String, j + 1));
                }
                '\\' => escaped = !escaped,
                _ => escaped = false,
            }
        }
        Err(self.err_undelimited_string(i..self.source.len()))
    }

    fn lex_number(&self, i: usize) -> usize {
        let mut j = self.lex_digits(i);
        let rest = &self.source[j..];
        if rest.starts_with('.') && rest[1..].starts_with(|c: char| c.is_ascii_digit()) {
            j = self.lex_digits(j + 1);
        }
        let rest = &self.source[j..];
        if rest.starts_with(['e', 'E']) {
            let mut m = j + 1;
            if self.source[m..].starts_with(['+', '-']) {
                m += 1;
            }
            if self.source[m..].starts_with(|c: char| c.is_ascii_digit()) {
                j = self.lex_digits(m);
            }
        }
        j
    }

    fn lex_digits(&self, i: usize) -> usize {
        let iter = self.source[i..].char_indices().map(|(d, c)| (i + d, c));
        self.lex_while(iter, |c| c.is_ascii_digit() || c == '_')
    }

    fn lex_ident_or_keyword<I>(&mut self, iter: I, i: usize) -> (Token, usize)
    where
        I: Iterator<Item = (usize, char)> + Clone,
    {
        let j = self.lex_while(iter, is_ident);
        let tk = match Keyword::all().contains(&&self.source[i..j]) {
            true => Token::Keyword,
            false => Token::Ident,
        };
        (tk, j)
    }

    fn lex_while<I, P>(&self, mut iter: I, pred: P) -> usize
    where
        I: Iterator<Item = (usize, char)> + Clone,
        P: Fn(char) -> bool,
    {
        loop {
            match iter.clone().next() {
                Some((_, c)) if pred(c) => {
                    iter.next();
                }
                Some((j, _)) => return j,
                None => return self.source.len(),
            }
        }
    }

    fn err_unclosed(&self, begin: Span, end: Token) -> Error {
        let tag = match end {
            Token::EndExpr => "expression",
            Token::EndBlock => "block",
            _ => "comment",
        };
        let delim = &self.source[begin];
        Error::syntax(format!("unclosed {tag} `{delim}`"), self.source, begin)
    }

    fn err_unexpected_token(&self, tk: Token, span: impl Into<Span>) -> Error {
        let tk = tk.human();
        Error::syntax(format!("unexpected {tk}"), self.source, span)
    }

    fn err_unexpected_character(&self, span: impl Into<Span>) -> Error {
        Error::syntax("unexpected character", self.source, span)
    }

    fn err_undelimited_string(&self, span: impl Into<Span>) -> Error {
        Error::syntax("undelimited string", self.source, span)
    }
}

impl Token {
    pub fn human(&self) -> &'static str {
        match self {
            Self::Raw => "raw template",
            Self::BeginExpr => "begin expression",
            Self::EndExpr => "end expression",
            Self::BeginBlock => "begin block",
            Self::EndBlock => "end block",
            Self::BeginComment => "begin comment",
            Self::EndComment => "end comment",
            Self::ShortExpr => "short expression",
            Self::Dot => "member access operator",
            Self::Comma => "comma",
            Self::LParen => "opening parenthesis",
            Self::RParen => "closing parenthesis",
            Self::LBracket => "opening bracket",
            Self::RBracket => "closing bracket",
            Self::Minus => "minus",
            Self::EqEq => "equality operator",
            Self::NotEq => "inequality operator",
            Self::Whitespace => "whitespace",
            Self::Keyword => "keyword",
            Self::Ident => "identifier",
            Self::Index => "index",
            Self::Number => "number",
            Self::String => "string",
        }
    }

    /// Returns the corresponding end tag for a begin tag.
    fn pair(&self) -> Self {
        match self {
            Self::BeginExpr => Self::EndExpr,
            Self::BeginBlock => Self::EndBlock,
            _ => Self::EndComment,
        }
    }

    fn is_begin_tag(&self) -> bool {
        matches!(
            self,
            Self::BeginExpr | Self::BeginBlock | Self::BeginComment
        )
    }

    fn is_whitespace(&self) -> bool {
        matches!(self, Self::Whitespace)
    }

    fn from_kind(kind: Kind) -> Self {
        match kind {
            Kind::BeginExpr => Self::BeginExpr,
            Kind::EndExpr => Self::EndExpr,
            Kind::BeginBlock => Self::BeginBlock,
            Kind::EndBlock => Self::EndBlock,
            Kind::BeginComment => Self::BeginComment,
            Kind::EndComment => Self::EndComment,
            Kind::ShortExpr => Self::ShortExpr,
            // Within a tag a line join is simply whitespace.
            Kind::LineJoin => Self::Whitespace,
        }
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, '\t' | ' ' | '\r' | '\n')
}

#[cfg(feature = "unicode")]
pub(crate) fn is_ident_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}

#[cfg(feature = "unicode")]
pub(crate) fn is_ident(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}

#[cfg(not(feature = "unicode"))]
pub(crate) fn is_ident_start(c: char) -> bool {
    matches!(c, 'A'..='Z' | 'a'..='z' | '_')
}

#[cfg(not(feature = "unicode"))]
pub(crate) fn is_ident(c: char) -> bool {
    matches!(c, '0'..='9' | 'A'..='Z' | 'a'..='z' | '_')
}
