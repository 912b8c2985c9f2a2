use std::fmt::Display;

use crate::compile::lex::{Lexer, Token};
use crate::types::ast;
use crate::types::span::Span;
use crate::{Engine, Error, Result, Value};

/// A parser that constructs an AST from a token stream.
///
/// Statements are parsed without recursion using a stack of open blocks.
/// Expressions are parsed by recursive descent, limited to [`MAX_DEPTH`]
/// levels and [`MAX_NODES`] nodes. The parser sometimes needs to
/// peek at the next token to know how to proceed and uses the `peeked` buffer
/// to do this.
pub struct Parser<'engine, 'source> {
    /// A lexer that tokenizes the template source.
    tokens: Lexer<'engine, 'source>,

    /// Remember a peeked value, even if it was `None`
    peeked: Option<Option<(Token, Span)>>,

    /// How many parentheses, brackets, argument lists and `not`s enclose the
    /// expression being parsed.
    depth: usize,

    /// The number of operator, access and call nodes in the current
    /// expression.
    nodes: usize,
}

/// The maximum nesting depth of an expression.
const MAX_DEPTH: usize = 64;

/// The maximum number of nodes in a single expression.
///
/// This also bounds the height of the expression tree, and with it the
/// recursion needed to evaluate or drop it.
const MAX_NODES: usize = 512;

/// Stores the state of a statement during parsing.
enum State {
    /// A partial `if` statement.
    If {
        /// The condition in the `if` block.
        cond: ast::Expr,
        /// The span of the `if` tag.
        span: Span,
    },

    /// A partial `for` statement.
    For {
        /// The loop variables.
        vars: ast::LoopVars,
        /// The value we are iterating over.
        iterable: ast::Expr,
        /// The span of the `for` tag.
        span: Span,
    },

    /// A partial `choose` statement.
    Choose {
        choose: PartialChoose,
        /// The span of the `choose` tag.
        span: Span,
    },
}

/// The branches of a `choose` statement collected so far.
struct PartialChoose {
    subject: Option<ast::Expr>,
    branches: Vec<ast::When>,
    otherwise: Option<ast::Scope>,
    /// The branch whose body is currently on top of the scope stack.
    open: Option<Branch>,
}

enum Branch {
    When(ast::Expr),
    Otherwise,
}

/// A parsed block definition.
enum Block {
    If(ast::Expr),
    For(ast::LoopVars, ast::Expr),
    Choose(Option<ast::Expr>),
    When(ast::Expr),
    Otherwise,
    End,
}

/// A keyword in the template syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Keyword {
    If,
    For,
    In,
    Choose,
    When,
    Otherwise,
    End,
    Not,
    And,
    Or,
    True,
    False,
    None,
}

impl<'engine, 'source> Parser<'engine, 'source> {
    /// Construct a new parser.
    pub fn new(engine: &'engine Engine<'engine>, source: &'source str) -> Self {
        Self {
            tokens: Lexer::new(engine, source),
            peeked: None,
            depth: 0,
            nodes: 0,
        }
    }

    /// Parses a template.
    ///
    /// This function works using two stacks:
    /// - A stack of blocks e.g. `{% if cond %}` or `{% choose %}`.
    /// - A stack of scopes which collect each parsed node.
    ///
    /// A `choose` block does not push a scope itself, only its `when` and
    /// `otherwise` branches do. Until the first branch is opened nothing but
    /// whitespace, comments and branch tags may appear.
    pub fn parse_template(mut self) -> Result<ast::Scope> {
        let mut blocks: Vec<State> = vec![];
        let mut scopes = vec![ast::Scope::new()];

        while let Some(next) = self.next()? {
            let node = match next {
                // Simply raw template, emit a single node for it.
                (Token::Raw, span) => {
                    let text = &self.source()[span];
                    if is_choose_head(&blocks) {
                        if text.trim().is_empty() {
                            continue;
                        }
                        return Err(Error::syntax(
                            "unexpected text in `choose` block",
                            self.source(),
                            span,
                        ));
                    }
                    ast::Node::Text(text.to_owned())
                }

                // The start of a comment, e.g. `{# ... #}`
                (Token::BeginComment, _) => {
                    if self.is_next(Token::Raw)? {
                        self.expect(Token::Raw)?;
                    }
                    self.expect(Token::EndComment)?;
                    continue;
                }

                // The start of an expression, e.g. `#{ ticket.id }`
                (Token::BeginExpr, begin) => {
                    let expr = self.parse_expr()?;
                    let end = self.expect(Token::EndExpr)?;
                    self.check_not_choose_head(&blocks, begin.combine(end))?;
                    ast::Node::Interp(expr)
                }

                // A short expression, e.g. `$ticket.id`
                (Token::ShortExpr, span) => {
                    self.check_not_choose_head(&blocks, span)?;
                    ast::Node::Interp(self.parse_short_expr(span)?)
                }

                // The start of a block, e.g. `{% if cond %}`
                (Token::BeginBlock, begin) => {
                    let block = self.parse_block()?;
                    let end = self.expect(Token::EndBlock)?;
                    let span = begin.combine(end);

                    match block {
                        // The start of an `if` statement. For example:
                        //
                        //   {% if cond %}
                        //
                        // We must push a block to the block stack and a scope
                        // to the scope stack because an if statement starts a
                        // new scope.
                        Block::If(cond) => {
                            self.check_not_choose_head(&blocks, span)?;
                            blocks.push(State::If { cond, span });
                            scopes.push(ast::Scope::new());
                            continue;
                        }

                        // The start of a `for` statement. For example:
                        //
                        //   {% for vars in iterable %}
                        //
                        Block::For(vars, iterable) => {
                            self.check_not_choose_head(&blocks, span)?;
                            blocks.push(State::For {
                                vars,
                                iterable,
                                span,
                            });
                            scopes.push(ast::Scope::new());
                            continue;
                        }

                        // The start of a `choose` statement. For example:
                        //
                        //   {% choose ticket.status %}
                        //
                        // No scope is pushed until the first branch.
                        Block::Choose(subject) => {
                            self.check_not_choose_head(&blocks, span)?;
                            let choose = PartialChoose {
                                subject,
                                branches: Vec::new(),
                                otherwise: None,
                                open: None,
                            };
                            blocks.push(State::Choose { choose, span });
                            continue;
                        }

                        // A `when` branch. For example:
                        //
                        //   {% when 'closed' %}
                        //
                        // The previous branch, if any, is closed and a new
                        // scope is started for this one.
                        Block::When(cond) => {
                            let choose = match blocks.last_mut() {
                                Some(State::Choose { choose, .. }) => choose,
                                _ => {
                                    return Err(Error::syntax(
                                        "unexpected `when` block",
                                        self.source(),
                                        span,
                                    ))
                                }
                            };
                            if choose.has_otherwise() {
                                return Err(Error::syntax(
                                    "unexpected `when` block after `otherwise`",
                                    self.source(),
                                    span,
                                ));
                            }
                            choose.close_branch(&mut scopes);
                            choose.open = Some(Branch::When(cond));
                            scopes.push(ast::Scope::new());
                            continue;
                        }

                        // The `otherwise` branch. For example:
                        //
                        //   {% otherwise %}
                        //
                        Block::Otherwise => {
                            let choose = match blocks.last_mut() {
                                Some(State::Choose { choose, .. }) => choose,
                                _ => {
                                    return Err(Error::syntax(
                                        "unexpected `otherwise` block",
                                        self.source(),
                                        span,
                                    ))
                                }
                            };
                            if choose.has_otherwise() {
                                return Err(Error::syntax(
                                    "duplicate `otherwise` block",
                                    self.source(),
                                    span,
                                ));
                            }
                            choose.close_branch(&mut scopes);
                            choose.open = Some(Branch::Otherwise);
                            scopes.push(ast::Scope::new());
                            continue;
                        }

                        // The end of the innermost open statement. For
                        // example:
                        //
                        //   {% end %}
                        //
                        Block::End => match blocks.pop() {
                            Some(State::If { cond, .. }) => {
                                let body = pop_scope(&mut scopes);
                                ast::Node::If(ast::If { cond, body })
                            }
                            Some(State::For { vars, iterable, .. }) => {
                                let body = pop_scope(&mut scopes);
                                ast::Node::ForLoop(ast::ForLoop {
                                    vars,
                                    iterable,
                                    body,
                                })
                            }
                            Some(State::Choose { mut choose, .. }) => {
                                choose.close_branch(&mut scopes);
                                ast::Node::Choose(ast::Choose {
                                    subject: choose.subject,
                                    branches: choose.branches,
                                    otherwise: choose.otherwise,
                                })
                            }
                            None => {
                                return Err(Error::syntax(
                                    "unexpected `end` block",
                                    self.source(),
                                    span,
                                ));
                            }
                        },
                    }
                }
                (tk, span) => {
                    return Err(self.err_unexpected_token("template", tk, span));
                }
            };
            scopes
                .last_mut()
                .expect("parser bug: no scope to push to")
                .push(node);
        }

        if let Some(block) = blocks.last() {
            let (msg, span) = match block {
                State::If { span, .. } => ("unclosed `if` block", span),
                State::For { span, .. } => ("unclosed `for` block", span),
                State::Choose { span, .. } => ("unclosed `choose` block", span),
            };
            return Err(Error::syntax(msg, self.source(), *span));
        }

        assert!(
            scopes.len() == 1,
            "parser bug: we should end with a single scope"
        );

        Ok(pop_scope(&mut scopes))
    }

    /// Parses a single block. All of the following are valid blocks.
    ///
    ///   if ticket.new and not ticket.hidden
    ///
    ///   for key, value in changes
    ///
    ///   choose
    ///
    ///   choose ticket.status
    ///
    ///   when 'closed'
    ///
    ///   otherwise
    ///
    ///   end
    ///
    fn parse_block(&mut self) -> Result<Block> {
        let (tk, span) = self.parse()?;
        let kw = match tk {
            Token::Keyword => Keyword::from_str(&self.source()[span]),
            Token::Ident => return Err(self.err_unknown_tag(span)),
            tk => return Err(self.err_unexpected_token("tag", tk, span)),
        };
        match kw {
            Keyword::If => Ok(Block::If(self.parse_expr()?)),
            Keyword::For => {
                let vars = self.parse_loop_vars()?;
                self.expect_keyword(Keyword::In)?;
                let iterable = self.parse_expr()?;
                Ok(Block::For(vars, iterable))
            }
            Keyword::Choose => {
                if self.is_next(Token::EndBlock)? {
                    Ok(Block::Choose(None))
                } else {
                    Ok(Block::Choose(Some(self.parse_expr()?)))
                }
            }
            Keyword::When => Ok(Block::When(self.parse_expr()?)),
            Keyword::Otherwise => Ok(Block::Otherwise),
            Keyword::End => Ok(Block::End),
            _ => Err(self.err_unknown_tag(span)),
        }
    }

    /// Parses loop variable(s).
    ///
    /// This is either a single identifier or two comma separated identifiers.
    /// Both of the following are valid:
    ///
    ///   item
    ///
    ///   key, value
    ///
    fn parse_loop_vars(&mut self) -> Result<ast::LoopVars> {
        let key = self.parse_ident()?;
        if !self.is_next(Token::Comma)? {
            return Ok(ast::LoopVars::Item(key));
        }
        self.expect(Token::Comma)?;
        let value = self.parse_ident()?;
        let span = key.span.combine(value.span);
        Ok(ast::LoopVars::KeyValue(ast::KeyValue { key, value, span }))
    }

    /// Parses an expression.
    ///
    /// Operators in increasing order of precedence are `or`, `and`, `not` and
    /// the comparisons `==` and `!=`. For example:
    ///
    ///   ticket.owner == author or not changes
    ///
    fn parse_expr(&mut self) -> Result<ast::Expr> {
        self.depth = 0;
        self.nodes = 0;
        self.parse_or()
    }

    /// Parses an expression enclosed in parentheses, brackets or an argument
    /// list.
    fn parse_nested(&mut self, span: Span) -> Result<ast::Expr> {
        self.enter(span)?;
        let expr = self.parse_or()?;
        self.depth -= 1;
        Ok(expr)
    }

    fn parse_or(&mut self) -> Result<ast::Expr> {
        let mut lhs = self.parse_and()?;
        while self.is_next_keyword(Keyword::Or)? {
            let span = self.expect_keyword(Keyword::Or)?;
            self.add_node(span)?;
            let rhs = self.parse_and()?;
            lhs = binary(ast::BinOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<ast::Expr> {
        let mut lhs = self.parse_not()?;
        while self.is_next_keyword(Keyword::And)? {
            let span = self.expect_keyword(Keyword::And)?;
            self.add_node(span)?;
            let rhs = self.parse_not()?;
            lhs = binary(ast::BinOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> Result<ast::Expr> {
        if self.is_next_keyword(Keyword::Not)? {
            let span = self.expect_keyword(Keyword::Not)?;
            self.enter(span)?;
            self.add_node(span)?;
            let expr = self.parse_not()?;
            self.depth -= 1;
            return Ok(ast::Expr::Not(ast::Not {
                expr: Box::new(expr),
                span,
            }));
        }
        self.parse_cmp()
    }

    fn parse_cmp(&mut self) -> Result<ast::Expr> {
        let lhs = self.parse_postfix()?;
        let (op, span) = match self.peek()? {
            Some((Token::EqEq, span)) => (ast::BinOp::Eq, span),
            Some((Token::NotEq, span)) => (ast::BinOp::Ne, span),
            _ => return Ok(lhs),
        };
        self.parse()?;
        self.add_node(span)?;
        let rhs = self.parse_postfix()?;
        Ok(binary(op, lhs, rhs))
    }

    /// Parses a primary expression followed by any number of accesses and
    /// method calls.
    ///
    ///   ticket.changes['owner'].new
    ///
    ///   changes.0
    ///
    ///   ticket.summary.ljust(20, '.')
    ///
    fn parse_postfix(&mut self) -> Result<ast::Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek()? {
                Some((Token::Dot, dot)) => {
                    self.expect(Token::Dot)?;
                    expr = self.parse_member(expr, dot)?;
                }
                Some((Token::LBracket, open)) => {
                    self.expect(Token::LBracket)?;
                    self.add_node(open)?;
                    let key = self.parse_nested(open)?;
                    let close = self.expect(Token::RBracket)?;
                    expr = ast::Expr::Access(ast::Access {
                        receiver: Box::new(expr),
                        key: ast::Key::Item(Box::new(key)),
                        span: open.combine(close),
                    });
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// Parses the part after a `.`, which is a list index, an attribute or a
    /// method call.
    fn parse_member(&mut self, receiver: ast::Expr, dot: Span) -> Result<ast::Expr> {
        let receiver = Box::new(receiver);
        let (tk, span) = self.parse()?;
        self.add_node(span)?;
        match (tk, span) {
            (Token::Index, span) => {
                let value = self.parse_integer(&self.source()[span], span)?;
                let key = ast::Expr::Literal(ast::Literal { value, span });
                Ok(ast::Expr::Access(ast::Access {
                    receiver,
                    key: ast::Key::Item(Box::new(key)),
                    span,
                }))
            }
            // Keywords are fine as attribute names, e.g. `build.end`.
            (Token::Ident | Token::Keyword, span) => {
                let ident = ast::Ident { span };
                if !self.is_next(Token::LParen)? {
                    return Ok(ast::Expr::Access(ast::Access {
                        receiver,
                        key: ast::Key::Attr(ident),
                        span,
                    }));
                }
                let name = &self.source()[span];
                let method = ast::Method::from_name(name).ok_or_else(|| {
                    Error::syntax(format!("unknown method `{name}`"), self.source(), span)
                })?;
                let open = self.expect(Token::LParen)?;
                let (args, close) = self.parse_args(open)?;
                let arity = method.arity();
                if !arity.contains(&args.len()) {
                    return Err(self.err_arity(method, args.len(), span.combine(close)));
                }
                Ok(ast::Expr::Call(ast::Call {
                    receiver,
                    method,
                    args,
                    span: dot.combine(close),
                }))
            }
            (tk, span) => Err(self.err_unexpected_token("identifier or index", tk, span)),
        }
    }

    /// Parses method call arguments up to and including the closing
    /// parenthesis.
    fn parse_args(&mut self, open: Span) -> Result<(Vec<ast::Expr>, Span)> {
        let mut args = Vec::new();
        loop {
            if let Some((Token::RParen, span)) = self.peek()? {
                self.expect(Token::RParen)?;
                return Ok((args, span));
            }
            args.push(self.parse_nested(open)?);
            if !self.is_next(Token::Comma)? {
                let span = self.expect(Token::RParen)?;
                return Ok((args, span));
            }
            self.expect(Token::Comma)?;
        }
    }

    /// Parses a variable, literal or parenthesized expression.
    fn parse_primary(&mut self) -> Result<ast::Expr> {
        let expr = match self.parse()? {
            (Token::Ident, span) => ast::Expr::Var(ast::Ident { span }),

            (Token::Keyword, span) => {
                let value = match Keyword::from_str(&self.source()[span]) {
                    Keyword::True => Value::Bool(true),
                    Keyword::False => Value::Bool(false),
                    Keyword::None => Value::None,
                    _ => {
                        let kw = &self.source()[span];
                        return Err(Error::syntax(
                            format!("expected expression, found keyword `{kw}`"),
                            self.source(),
                            span,
                        ));
                    }
                };
                ast::Expr::Literal(ast::Literal { value, span })
            }

            (Token::Minus, sign) => {
                let span = self.expect(Token::Number)?;
                ast::Expr::Literal(self.parse_literal_number(span, Some(sign))?)
            }

            (Token::Number, span) => ast::Expr::Literal(self.parse_literal_number(span, None)?),

            (Token::String, span) => {
                let value = Value::String(self.parse_string(span)?);
                ast::Expr::Literal(ast::Literal { value, span })
            }

            (Token::LParen, span) => {
                let expr = self.parse_nested(span)?;
                self.expect(Token::RParen)?;
                expr
            }

            (tk, span) => {
                return Err(self.err_unexpected_token("expression", tk, span));
            }
        };
        Ok(expr)
    }

    /// Builds the expression for a short expression path like `ticket.id`.
    fn parse_short_expr(&mut self, span: Span) -> Result<ast::Expr> {
        self.nodes = 0;
        let source = self.source();
        let end_of = |m: usize| source[m..span.n].find('.').map_or(span.n, |d| m + d);

        let n = end_of(span.m);
        let mut expr = ast::Expr::Var(ast::Ident {
            span: Span::from(span.m..n),
        });
        let mut m = n;
        while m < span.n {
            let ident = ast::Ident {
                span: Span::from(m + 1..end_of(m + 1)),
            };
            self.add_node(ident.span)?;
            expr = ast::Expr::Access(ast::Access {
                receiver: Box::new(expr),
                key: ast::Key::Attr(ident),
                span: ident.span,
            });
            m = ident.span.n;
        }
        Ok(expr)
    }

    /// Parses an integer or a float, negated if there was a leading minus.
    fn parse_literal_number(&self, span: Span, sign: Option<Span>) -> Result<ast::Literal> {
        let raw: String = self.source()[span].chars().filter(|&c| c != '_').collect();
        let full = sign.map_or(span, |s| s.combine(span));
        let value = if raw.contains(['.', 'e', 'E']) {
            let float: f64 = raw
                .parse()
                .map_err(|_| Error::syntax("invalid float literal", self.source(), span))?;
            match sign {
                Some(_) => Value::Float(-float),
                None => Value::Float(float),
            }
        } else {
            match sign {
                Some(_) => self.parse_integer(&format!("-{raw}"), full)?,
                None => self.parse_integer(&raw, full)?,
            }
        };
        Ok(ast::Literal { value, span: full })
    }

    fn parse_integer(&self, raw: &str, span: Span) -> Result<Value> {
        let digits: String = raw.chars().filter(|&c| c != '_').collect();
        digits.parse().map(Value::Integer).map_err(|_| {
            Error::syntax(
                "integer literal out of range for 64-bit integer",
                self.source(),
                span,
            )
        })
    }

    /// Parses a string and handles escape characters.
    fn parse_string(&self, span: Span) -> Result<String> {
        let raw = &self.source()[span];
        let inner = &raw[1..raw.len() - 1];
        if !inner.contains('\\') {
            return Ok(inner.to_owned());
        }

        let mut string = String::with_capacity(inner.len());
        let mut iter = inner.char_indices().map(|(i, c)| (span.m + 1 + i, c));
        while let Some((i, c)) = iter.next() {
            if c != '\\' {
                string.push(c);
                continue;
            }
            let c = match iter.next() {
                Some((_, 'n')) => '\n',
                Some((_, 'r')) => '\r',
                Some((_, 't')) => '\t',
                Some((_, '\\')) => '\\',
                Some((_, '\'')) => '\'',
                Some((_, '"')) => '"',
                Some((j, esc)) => {
                    return Err(Error::syntax(
                        "unknown escape character",
                        self.source(),
                        i..j + esc.len_utf8(),
                    ));
                }
                None => {
                    return Err(Error::syntax(
                        "unknown escape character",
                        self.source(),
                        i..i + 1,
                    ));
                }
            };
            string.push(c);
        }
        Ok(string)
    }

    /// Expects the given keyword.
    fn expect_keyword(&mut self, exp: Keyword) -> Result<Span> {
        let span = self.expect(Token::Keyword)?;
        let kw = Keyword::from_str(&self.source()[span]);
        if kw != exp {
            let exp = exp.human();
            let kw = &self.source()[span];
            return Err(Error::syntax(
                format!("expected keyword `{exp}`, found keyword `{kw}`"),
                self.source(),
                span,
            ));
        }
        Ok(span)
    }

    /// Parses an identifier.
    fn parse_ident(&mut self) -> Result<ast::Ident> {
        let span = self.expect(Token::Ident)?;
        Ok(ast::Ident { span })
    }

    /// Parses any token.
    fn parse(&mut self) -> Result<(Token, Span)> {
        match self.next()? {
            Some((tk, sp)) => Ok((tk, sp)),
            None => Err(self.err_unexpected_eof("token")),
        }
    }

    /// Parses the specified token and returns its span.
    fn expect(&mut self, exp: Token) -> Result<Span> {
        match self.next()? {
            Some((tk, span)) if tk == exp => Ok(span),
            Some((tk, span)) => Err(self.err_unexpected_token(exp.human(), tk, span)),
            None => Err(self.err_unexpected_eof(exp.human())),
        }
    }

    /// Returns `true` if the next token is a keyword equal to the provided one.
    fn is_next_keyword(&mut self, exp: Keyword) -> Result<bool> {
        Ok(self
            .peek()?
            .map(|(tk, sp)| tk == Token::Keyword && Keyword::from_str(&self.source()[sp]) == exp)
            .unwrap_or(false))
    }

    /// Returns `true` if the next token is equal to the provided one.
    fn is_next(&mut self, token: Token) -> Result<bool> {
        Ok(self.peek()?.map(|(tk, _)| tk == token).unwrap_or(false))
    }

    /// Returns a copy of the next token without affecting the result of the
    /// following `.next()` call.
    fn peek(&mut self) -> Result<Option<(Token, Span)>> {
        match self.peeked {
            Some(peeked) => Ok(peeked),
            None => {
                let peeked = self.tokens.next()?;
                self.peeked = Some(peeked);
                Ok(peeked)
            }
        }
    }

    /// Returns the next token and span in the stream.
    fn next(&mut self) -> Result<Option<(Token, Span)>> {
        match self.peeked.take() {
            Some(v) => Ok(v),
            None => self.tokens.next(),
        }
    }

    fn source(&self) -> &'source str {
        self.tokens.source
    }

    /// Only `when`, `otherwise` and `end` may directly follow a `choose` tag.
    fn check_not_choose_head(&self, blocks: &[State], span: Span) -> Result<()> {
        if is_choose_head(blocks) {
            return Err(Error::syntax(
                "expected `when`, `otherwise` or `end` in `choose` block",
                self.source(),
                span,
            ));
        }
        Ok(())
    }

    fn enter(&mut self, span: Span) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(Error::syntax(
                "expression is nested too deeply",
                self.source(),
                span,
            ));
        }
        Ok(())
    }

    fn add_node(&mut self, span: Span) -> Result<()> {
        self.nodes += 1;
        if self.nodes > MAX_NODES {
            return Err(Error::syntax("expression is too long", self.source(), span));
        }
        Ok(())
    }

    fn err_unexpected_eof(&self, exp: impl Display) -> Error {
        let n = self.source().len();
        Error::syntax(format!("expected {exp}, found EOF"), self.source(), n..n)
    }

    fn err_unexpected_token(&self, exp: impl Display, got: Token, span: Span) -> Error {
        let got = got.human();
        Error::syntax(format!("expected {exp}, found {got}"), self.source(), span)
    }

    fn err_unknown_tag(&self, span: Span) -> Error {
        let name = &self.source()[span];
        Error::syntax(format!("unknown tag `{name}`"), self.source(), span)
    }

    fn err_arity(&self, method: ast::Method, got: usize, span: Span) -> Error {
        let arity = method.arity();
        let (min, max) = (*arity.start(), *arity.end());
        let exp = match (min, max) {
            (0, 0) => String::from("no arguments"),
            (1, 1) => String::from("1 argument"),
            (m, n) if m == n => format!("{m} arguments"),
            (m, n) => format!("{m} to {n} arguments"),
        };
        let name = method.name();
        Error::syntax(
            format!("method `{name}` expects {exp}, found {got}"),
            self.source(),
            span,
        )
    }
}

impl PartialChoose {
    fn has_otherwise(&self) -> bool {
        self.otherwise.is_some() || matches!(self.open, Some(Branch::Otherwise))
    }

    /// Moves the open branch's scope off the scope stack into the statement.
    fn close_branch(&mut self, scopes: &mut Vec<ast::Scope>) {
        match self.open.take() {
            Some(Branch::When(cond)) => {
                let body = pop_scope(scopes);
                self.branches.push(ast::When { cond, body });
            }
            Some(Branch::Otherwise) => {
                self.otherwise = Some(pop_scope(scopes));
            }
            None => {}
        }
    }
}

fn is_choose_head(blocks: &[State]) -> bool {
    matches!(
        blocks.last(),
        Some(State::Choose {
            choose: PartialChoose { open: None, .. },
            ..
        })
    )
}

fn pop_scope(scopes: &mut Vec<ast::Scope>) -> ast::Scope {
    scopes.pop().expect("parser bug: scope stack is empty")
}

fn binary(op: ast::BinOp, lhs: ast::Expr, rhs: ast::Expr) -> ast::Expr {
    ast::Expr::Binary(ast::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

impl Keyword {
    pub(crate) const fn all() -> &'static [&'static str] {
        &[
            "if", "for", "in", "choose", "when", "otherwise", "end", "not", "and", "or", "true",
            "True", "false", "False", "none", "None",
        ]
    }

    const fn human(&self) -> &'static str {
        match self {
            Self::If => "if",
            Self::For => "for",
            Self::In => "in",
            Self::Choose => "choose",
            Self::When => "when",
            Self::Otherwise => "otherwise",
            Self::End => "end",
            Self::Not => "not",
            Self::And => "and",
            Self::Or => "or",
            Self::True => "true",
            Self::False => "false",
            Self::None => "none",
        }
    }

    fn from_str(s: &str) -> Self {
        match s {
            "if" => Self::If,
            "for" => Self::For,
            "in" => Self::In,
            "choose" => Self::Choose,
            "when" => Self::When,
            "otherwise" => Self::Otherwise,
            "end" => Self::End,
            "not" => Self::Not,
            "and" => Self::And,
            "or" => Self::Or,
            "true" | "True" => Self::True,
            "false" | "False" => Self::False,
            "none" | "None" => Self::None,
            _ => unreachable!(),
        }
    }
}
