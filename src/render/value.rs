use std::borrow::Cow;

use crate::types::span::Span;
use crate::{Error, Result, Value};

/// A resolved lookup key.
#[derive(Debug, Clone, Copy)]
pub enum Key<'a> {
    /// An attribute name or a string subscript, e.g. `ticket.id` or
    /// `ticket['id']`.
    Str(&'a str),
    /// An integer subscript, e.g. `changes.0` or `changes[-1]`.
    Int(i64),
}

/// Index into a value using the given key.
///
/// Missing map keys and out of range list indexes are absent. Indexing into a
/// value that cannot be traversed is an error.
pub fn index<'a>(
    source: &str,
    value: &'a Value,
    key: Key<'_>,
    span: Span,
) -> Result<Option<Cow<'a, Value>>> {
    match (value, key) {
        (Value::Map(map), Key::Str(k)) => Ok(map.get(k).map(Cow::Borrowed)),
        (Value::Map(map), Key::Int(i)) => Ok(map.get(&i.to_string()).map(Cow::Borrowed)),

        (Value::List(list), Key::Int(i)) => {
            Ok(wrap_index(i, list.len()).map(|i| Cow::Borrowed(&list[i])))
        }

        (Value::String(string), Key::Int(i)) => {
            let len = string.chars().count();
            let c = wrap_index(i, len).and_then(|i| string.chars().nth(i));
            Ok(c.map(|c| Cow::Owned(Value::String(c.into()))))
        }

        (Value::List(_) | Value::String(_), Key::Str(_)) => {
            let human = value.human();
            Err(Error::render(
                format!("cannot index into {human} with a string"),
                source,
                span,
            ))
        }

        (value, _) => {
            let human = value.human();
            Err(Error::render(
                format!("cannot index into {human}"),
                source,
                span,
            ))
        }
    }
}

/// Negative indexes count from the end.
fn wrap_index(i: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let i = if i < 0 { i + len } else { i };
    (0..len).contains(&i).then(|| i as usize)
}
