use std::borrow::Cow;

use crate::Value;

/// The variables visible while rendering.
///
/// Loop variables are pushed on top of the globals and shadow them for the
/// duration of the loop body. The globals are never modified.
#[derive(Debug)]
pub struct Stack<'render> {
    globals: &'render Value,
    vars: Vec<(&'render str, Cow<'render, Value>)>,
}

/// A resolved root variable.
#[derive(Debug, Clone, Copy)]
pub enum Binding<'stack, 'render> {
    /// Borrowed from the globals or from a borrowed loop value.
    Borrowed(&'render Value),
    /// A loop value owned by the stack, only valid until the stack changes.
    Owned(&'stack Value),
}

impl<'render> Stack<'render> {
    pub fn new(globals: &'render Value) -> Self {
        Self {
            globals,
            vars: Vec::new(),
        }
    }

    /// Resolves a root variable, innermost binding first.
    pub fn lookup(&self, name: &str) -> Option<Binding<'_, 'render>> {
        if let Some((_, value)) = self.vars.iter().rev().find(|(var, _)| *var == name) {
            let binding = match value {
                Cow::Borrowed(v) => Binding::Borrowed(*v),
                Cow::Owned(v) => Binding::Owned(v),
            };
            return Some(binding);
        }
        match self.globals {
            Value::Map(map) => map.get(name).map(Binding::Borrowed),
            _ => None,
        }
    }

    pub fn push(&mut self, name: &'render str, value: Cow<'render, Value>) {
        self.vars.push((name, value));
    }

    /// Removes the `n` most recently pushed variables.
    pub fn pop(&mut self, n: usize) {
        let len = self.vars.len().saturating_sub(n);
        self.vars.truncate(len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value;

    #[test]
    fn stack_shadows_globals() {
        let globals = value! { author: "alice" };
        let mut stack = Stack::new(&globals);
        let get = |stack: &Stack<'_>, name| match stack.lookup(name)? {
            Binding::Borrowed(v) => Some(v.clone()),
            Binding::Owned(v) => Some(v.clone()),
        };
        assert_eq!(get(&stack, "author"), Some(Value::from("alice")));

        stack.push("author", Cow::Owned(Value::from("bob")));
        assert_eq!(get(&stack, "author"), Some(Value::from("bob")));

        stack.pop(1);
        assert_eq!(get(&stack, "author"), Some(Value::from("alice")));
        assert!(stack.lookup("missing").is_none());
    }

    #[test]
    fn stack_lookup_owned_is_not_copied() {
        let globals = value! {};
        let mut stack = Stack::new(&globals);
        stack.push("row", Cow::Owned(value! { id: 1, tags: ["a", "b"] }));

        let (a, b) = match (stack.lookup("row"), stack.lookup("row")) {
            (Some(Binding::Owned(a)), Some(Binding::Owned(b))) => (a, b),
            bindings => panic!("expected owned bindings, found {bindings:?}"),
        };
        assert!(std::ptr::eq(a, b));
        assert!(std::ptr::eq(a, &*stack.vars[0].1));
    }

    #[test]
    fn stack_lookup_borrowed_keeps_render_lifetime() {
        let globals = value! { rows: [1, 2] };
        let mut stack = Stack::new(&globals);
        let rows = match stack.lookup("rows") {
            Some(Binding::Borrowed(v)) => v,
            binding => panic!("expected borrowed binding, found {binding:?}"),
        };
        stack.push("x", Cow::Borrowed(rows));
        assert!(matches!(stack.lookup("x"), Some(Binding::Borrowed(v)) if std::ptr::eq(v, rows)));
    }
}
