//! AST representing a parsed template.
//!
//! The tree is plain data. Identifiers are stored as spans into the template
//! source so the source must travel with the tree.

use std::borrow::Cow;
use std::ops::RangeInclusive;

use crate::types::span::Span;
use crate::Value;

#[derive(Debug)]
pub struct Template<'source> {
    pub source: Cow<'source, str>,
    pub scope: Scope,
}

#[derive(Debug, Default)]
pub struct Scope {
    pub nodes: Vec<Node>,
}

#[derive(Debug)]
pub enum Node {
    Text(String),
    Interp(Expr),
    If(If),
    Choose(Choose),
    ForLoop(ForLoop),
}

#[derive(Debug)]
pub struct If {
    pub cond: Expr,
    pub body: Scope,
}

#[derive(Debug)]
pub struct Choose {
    /// Branches are compared against this value instead of tested for
    /// truthiness when present.
    pub subject: Option<Expr>,
    pub branches: Vec<When>,
    pub otherwise: Option<Scope>,
}

#[derive(Debug)]
pub struct When {
    pub cond: Expr,
    pub body: Scope,
}

#[derive(Debug)]
pub struct ForLoop {
    pub vars: LoopVars,
    pub iterable: Expr,
    pub body: Scope,
}

#[derive(Debug)]
pub enum LoopVars {
    Item(Ident),
    KeyValue(KeyValue),
}

#[derive(Debug)]
pub struct KeyValue {
    pub key: Ident,
    pub value: Ident,
    pub span: Span,
}

#[derive(Debug)]
pub enum Expr {
    Var(Ident),
    Literal(Literal),
    Access(Access),
    Call(Call),
    Not(Not),
    Binary(Binary),
}

/// A member or item access, e.g. `ticket.id` or `changes['owner']`.
#[derive(Debug)]
pub struct Access {
    pub receiver: Box<Expr>,
    pub key: Key,
    /// The span of the key part only, used for error reporting.
    pub span: Span,
}

#[derive(Debug)]
pub enum Key {
    Attr(Ident),
    Item(Box<Expr>),
}

/// A method call, e.g. `name.ljust(20)`.
#[derive(Debug)]
pub struct Call {
    pub receiver: Box<Expr>,
    pub method: Method,
    pub args: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Upper,
    Lower,
    Title,
    Capitalize,
    Strip,
    Lstrip,
    Rstrip,
    Ljust,
    Rjust,
    Center,
    Join,
    Keys,
    Values,
    Items,
}

#[derive(Debug)]
pub struct Not {
    pub expr: Box<Expr>,
    pub span: Span,
}

#[derive(Debug)]
pub struct Binary {
    pub op: BinOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Eq,
    Ne,
    And,
    Or,
}

#[derive(Debug, Clone, Copy)]
pub struct Ident {
    pub span: Span,
}

#[derive(Debug)]
pub struct Literal {
    pub value: Value,
    pub span: Span,
}

impl Scope {
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Appends a node, merging adjacent text.
    pub fn push(&mut self, node: Node) {
        if let Node::Text(text) = &node {
            if text.is_empty() {
                return;
            }
        }
        match (self.nodes.last_mut(), node) {
            (Some(Node::Text(prev)), Node::Text(text)) => prev.push_str(&text),
            (_, node) => self.nodes.push(node),
        }
    }
}

/// Blocks can be nested arbitrarily deep, so nested scopes are flattened
/// onto a heap stack instead of being dropped recursively.
impl Drop for Scope {
    fn drop(&mut self) {
        let mut nodes = std::mem::take(&mut self.nodes);
        while let Some(node) = nodes.pop() {
            match node {
                Node::If(mut node) => nodes.append(&mut node.body.nodes),
                Node::ForLoop(mut node) => nodes.append(&mut node.body.nodes),
                Node::Choose(mut node) => {
                    for branch in &mut node.branches {
                        nodes.append(&mut branch.body.nodes);
                    }
                    if let Some(otherwise) = &mut node.otherwise {
                        nodes.append(&mut otherwise.nodes);
                    }
                }
                Node::Text(_) | Node::Interp(_) => {}
            }
        }
    }
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Self::Var(ident) => ident.span,
            Self::Literal(lit) => lit.span,
            Self::Access(access) => access.receiver.span().combine(access.span),
            Self::Call(call) => call.receiver.span().combine(call.span),
            Self::Not(not) => not.span.combine(not.expr.span()),
            Self::Binary(binary) => binary.lhs.span().combine(binary.rhs.span()),
        }
    }
}

impl Method {
    pub fn from_name(name: &str) -> Option<Self> {
        let method = match name {
            "upper" => Self::Upper,
            "lower" => Self::Lower,
            "title" => Self::Title,
            "capitalize" => Self::Capitalize,
            "strip" => Self::Strip,
            "lstrip" => Self::Lstrip,
            "rstrip" => Self::Rstrip,
            "ljust" => Self::Ljust,
            "rjust" => Self::Rjust,
            "center" => Self::Center,
            "join" => Self::Join,
            "keys" => Self::Keys,
            "values" => Self::Values,
            "items" => Self::Items,
            _ => return None,
        };
        Some(method)
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Upper => "upper",
            Self::Lower => "lower",
            Self::Title => "title",
            Self::Capitalize => "capitalize",
            Self::Strip => "strip",
            Self::Lstrip => "lstrip",
            Self::Rstrip => "rstrip",
            Self::Ljust => "ljust",
            Self::Rjust => "rjust",
            Self::Center => "center",
            Self::Join => "join",
            Self::Keys => "keys",
            Self::Values => "values",
            Self::Items => "items",
        }
    }

    /// The number of arguments the method accepts.
    pub const fn arity(&self) -> RangeInclusive<usize> {
        match self {
            Self::Ljust | Self::Rjust | Self::Center => 1..=2,
            Self::Join => 1..=1,
            _ => 0..=0,
        }
    }
}
