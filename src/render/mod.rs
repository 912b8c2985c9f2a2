//! Render a compiled template by walking its tree.

mod fmt;
mod iter;
mod methods;
mod stack;
mod value;

use std::borrow::Cow;
use std::slice;

use crate::render::iter::{Item, LoopIter};
use crate::render::stack::{Binding, Stack};
use crate::render::value::{index, Key};
use crate::types::ast;
use crate::{Error, Result, Value};

/// Render a template to a string using the given globals.
pub(crate) fn template(template: &ast::Template<'_>, globals: &Value) -> Result<String> {
    let source: &str = &template.source;
    let mut renderer = Renderer {
        source,
        stack: Stack::new(globals),
        buf: String::with_capacity(source.len()),
    };
    renderer.render(&template.scope)?;
    debug!(
        len = source.len(),
        output = renderer.buf.len(),
        "rendered template"
    );
    Ok(renderer.buf)
}

struct Renderer<'render> {
    source: &'render str,
    stack: Stack<'render>,
    buf: String,
}

/// A unit of pending work.
///
/// Blocks can be nested arbitrarily deep so instead of recursing the renderer
/// keeps a stack of frames and always works on the top one.
enum Frame<'render> {
    /// The remaining nodes of a scope.
    Scope(slice::Iter<'render, ast::Node>),

    /// A `for` loop between iterations.
    Loop {
        vars: &'render ast::LoopVars,
        iter: LoopIter<'render>,
        body: &'render ast::Scope,
        /// The number of variables bound by the previous iteration.
        bound: usize,
    },
}

impl<'render> Renderer<'render> {
    fn render(&mut self, scope: &'render ast::Scope) -> Result<()> {
        let mut frames = vec![Frame::Scope(scope.nodes.iter())];

        while let Some(frame) = frames.last_mut() {
            let next = match frame {
                Frame::Scope(nodes) => match nodes.next() {
                    Some(node) => self.render_node(node)?,
                    None => {
                        frames.pop();
                        continue;
                    }
                },

                Frame::Loop {
                    vars,
                    iter,
                    body,
                    bound,
                } => {
                    self.stack.pop(*bound);
                    *bound = 0;
                    match iter.next() {
                        Some(item) => {
                            *bound = self.bind(vars, item)?;
                            let body: &'render ast::Scope = *body;
                            Some(Frame::Scope(body.nodes.iter()))
                        }
                        None => {
                            frames.pop();
                            continue;
                        }
                    }
                }
            };

            if let Some(next) = next {
                frames.push(next);
            }
        }

        Ok(())
    }

    /// Renders a single node, returning a frame if the node has a body that
    /// should be rendered next.
    fn render_node(&mut self, node: &'render ast::Node) -> Result<Option<Frame<'render>>> {
        match node {
            ast::Node::Text(text) => {
                self.buf.push_str(text);
            }

            ast::Node::Interp(expr) => {
                if let Some(value) = self.eval(expr)? {
                    // Writing to a `String` never fails.
                    let _ = fmt::format(&mut self.buf, &value);
                }
            }

            ast::Node::If(ast::If { cond, body }) => {
                if self.eval_truthy(cond)? {
                    return Ok(Some(Frame::Scope(body.nodes.iter())));
                }
            }

            ast::Node::Choose(choose) => {
                if let Some(body) = self.choose_branch(choose)? {
                    return Ok(Some(Frame::Scope(body.nodes.iter())));
                }
            }

            ast::Node::ForLoop(ast::ForLoop {
                vars,
                iterable,
                body,
            }) => {
                if let Some(iterable) = self.eval(iterable)? {
                    return Ok(Some(Frame::Loop {
                        vars,
                        iter: LoopIter::new(iterable),
                        body,
                        bound: 0,
                    }));
                }
            }
        }
        Ok(None)
    }

    /// Pushes the loop variables for one iteration and returns how many were
    /// pushed.
    fn bind(&mut self, vars: &ast::LoopVars, item: Item<'render>) -> Result<usize> {
        let source = self.source;
        match vars {
            ast::LoopVars::Item(ident) => {
                self.stack.push(&source[ident.span], item.into_value());
                Ok(1)
            }
            ast::LoopVars::KeyValue(kv) => {
                let (key, value) = item.into_pair(source, kv)?;
                self.stack.push(&source[kv.key.span], key);
                self.stack.push(&source[kv.value.span], value);
                Ok(2)
            }
        }
    }

    /// Returns the body of the first matching branch.
    ///
    /// Without a subject a branch matches when its condition is truthy. With a
    /// subject a branch matches when its value equals the subject.
    fn choose_branch(&self, choose: &'render ast::Choose) -> Result<Option<&'render ast::Scope>> {
        let subject = match &choose.subject {
            Some(expr) => Some(self.eval(expr)?),
            None => None,
        };
        for branch in &choose.branches {
            let matched = match &subject {
                Some(subject) => equals(subject.as_deref(), self.eval(&branch.cond)?.as_deref()),
                None => self.eval_truthy(&branch.cond)?,
            };
            if matched {
                return Ok(Some(&branch.body));
            }
        }
        Ok(choose.otherwise.as_ref())
    }

    fn eval_truthy(&self, expr: &'render ast::Expr) -> Result<bool> {
        Ok(is_truthy(self.eval(expr)?.as_deref()))
    }

    /// Evaluates an expression, returning `None` if a lookup along the way
    /// was absent.
    fn eval(&self, expr: &'render ast::Expr) -> Result<Option<Cow<'render, Value>>> {
        match expr {
            ast::Expr::Var(ident) => {
                let value = self.lookup(ident).map(|binding| match binding {
                    Binding::Borrowed(v) => Cow::Borrowed(v),
                    Binding::Owned(v) => Cow::Owned(v.clone()),
                });
                Ok(value)
            }

            ast::Expr::Literal(lit) => Ok(Some(Cow::Borrowed(&lit.value))),

            ast::Expr::Access(_) => self.eval_access(expr),

            ast::Expr::Call(call) => {
                let receiver = match self.eval(&call.receiver)? {
                    Some(receiver) => receiver,
                    None => return Ok(None),
                };
                let mut args = Vec::with_capacity(call.args.len());
                for arg in &call.args {
                    match self.eval(arg)? {
                        Some(arg) => args.push(arg),
                        None => return Ok(None),
                    }
                }
                let value = methods::call(self.source, call.method, &receiver, &args, call.span)?;
                Ok(Some(Cow::Owned(value)))
            }

            ast::Expr::Not(not) => {
                let value = self.eval(&not.expr)?;
                Ok(Some(Cow::Owned(Value::Bool(!is_truthy(
                    value.as_deref(),
                )))))
            }

            ast::Expr::Binary(binary) => {
                let lhs = self.eval(&binary.lhs)?;
                match binary.op {
                    ast::BinOp::Eq | ast::BinOp::Ne => {
                        let rhs = self.eval(&binary.rhs)?;
                        let eq = equals(lhs.as_deref(), rhs.as_deref());
                        let value = match binary.op {
                            ast::BinOp::Eq => eq,
                            _ => !eq,
                        };
                        Ok(Some(Cow::Owned(Value::Bool(value))))
                    }
                    // Both short circuit and return one of the operands.
                    ast::BinOp::And => match is_truthy(lhs.as_deref()) {
                        true => self.eval(&binary.rhs),
                        false => Ok(lhs),
                    },
                    ast::BinOp::Or => match is_truthy(lhs.as_deref()) {
                        true => Ok(lhs),
                        false => self.eval(&binary.rhs),
                    },
                }
            }
        }
    }

    fn lookup(&self, ident: &ast::Ident) -> Option<Binding<'_, 'render>> {
        let name = &self.source[ident.span];
        let binding = self.stack.lookup(name);
        if binding.is_none() {
            trace!(name, "variable is absent");
        }
        binding
    }

    /// Evaluates a chain of accesses like `ticket.changes['owner'].new`.
    ///
    /// The whole chain is resolved by reference from its root, so a root that
    /// is owned only has the value at the end of the chain cloned.
    fn eval_access(&self, expr: &'render ast::Expr) -> Result<Option<Cow<'render, Value>>> {
        let mut path = Vec::new();
        let mut root = expr;
        while let ast::Expr::Access(access) = root {
            path.push(access);
            root = &*access.receiver;
        }
        path.reverse();

        if let ast::Expr::Var(ident) = root {
            return match self.lookup(ident) {
                Some(Binding::Borrowed(v)) => self.resolve_path(v, &path),
                Some(Binding::Owned(v)) => Ok(self.resolve_path(v, &path)?.map(into_owned)),
                None => Ok(None),
            };
        }
        match self.eval(root)? {
            Some(Cow::Borrowed(v)) => self.resolve_path(v, &path),
            Some(Cow::Owned(v)) => Ok(self.resolve_path(&v, &path)?.map(into_owned)),
            None => Ok(None),
        }
    }

    fn resolve_path<'a>(
        &self,
        value: &'a Value,
        path: &[&'render ast::Access],
    ) -> Result<Option<Cow<'a, Value>>> {
        let mut value = Cow::Borrowed(value);
        for access in path {
            let item;
            let key = match &access.key {
                ast::Key::Attr(ident) => Key::Str(&self.source[ident.span]),
                ast::Key::Item(expr) => {
                    item = match self.eval(expr)? {
                        Some(item) => item,
                        None => return Ok(None),
                    };
                    match &*item {
                        Value::String(s) => Key::Str(s),
                        Value::Integer(i) => Key::Int(*i),
                        other => {
                            let human = other.human();
                            return Err(Error::render(
                                format!("cannot index with {human}"),
                                self.source,
                                expr.span(),
                            ));
                        }
                    }
                }
            };

            let found = match value {
                Cow::Borrowed(v) => index(self.source, v, key, access.span)?,
                Cow::Owned(v) => index(self.source, &v, key, access.span)?.map(into_owned),
            };
            value = match found {
                Some(found) => found,
                None => return Ok(None),
            };
        }
        Ok(Some(value))
    }
}

fn into_owned<'a>(value: Cow<'_, Value>) -> Cow<'a, Value> {
    Cow::Owned(value.into_owned())
}

/// Absent values are falsy.
fn is_truthy(value: Option<&Value>) -> bool {
    value.map_or(false, Value::is_truthy)
}

/// Absent values are never equal to anything, not even another absent value.
fn equals(lhs: Option<&Value>, rhs: Option<&Value>) -> bool {
    match (lhs, rhs) {
        (Some(lhs), Some(rhs)) => lhs == rhs,
        _ => false,
    }
}
