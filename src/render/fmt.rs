//! The canonical string form of a [`Value`].

use std::fmt::{self, Write};

use crate::Value;

/// Writes a value as it appears in rendered output.
///
/// `None` is written as nothing and strings are passed through unescaped.
/// Collections are written in a bracketed form with quoted strings, e.g.
/// `['a', 'b']` and `{'k': 1}`. Booleans are `true` and `false` at any
/// depth, and a `None` item is `none`, matching the literal syntax.
pub fn format(f: &mut impl Write, value: &Value) -> fmt::Result {
    match value {
        Value::None => Ok(()),
        Value::String(s) => f.write_str(s),
        value => format_nested(f, value),
    }
}

/// Returns the canonical string form of a value.
pub fn to_string(value: &Value) -> String {
    let mut s = String::new();
    // Writing to a `String` never fails.
    let _ = format(&mut s, value);
    s
}

fn format_nested(f: &mut impl Write, value: &Value) -> fmt::Result {
    match value {
        Value::None => f.write_str("none"),
        Value::Bool(b) => write!(f, "{b}"),
        Value::Integer(n) => write!(f, "{n}"),
        // The `Debug` form is the shortest representation that round trips
        // and keeps the `.0` on integral floats.
        Value::Float(n) => write!(f, "{n:?}"),
        Value::String(s) => format_quoted(f, s),
        Value::List(list) => {
            f.write_char('[')?;
            for (i, item) in list.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                format_nested(f, item)?;
            }
            f.write_char(']')
        }
        Value::Map(map) => {
            f.write_char('{')?;
            for (i, (key, value)) in map.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                format_quoted(f, key)?;
                f.write_str(": ")?;
                format_nested(f, value)?;
            }
            f.write_char('}')
        }
    }
}

fn format_quoted(f: &mut impl Write, s: &str) -> fmt::Result {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    f.write_char(quote)?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c == quote => {
                f.write_char('\\')?;
                f.write_char(c)?;
            }
            c => f.write_char(c)?,
        }
    }
    f.write_char(quote)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value;

    #[test]
    fn format_scalars() {
        assert_eq!(to_string(&Value::None), "");
        assert_eq!(to_string(&Value::Bool(true)), "true");
        assert_eq!(to_string(&Value::Bool(false)), "false");
        assert_eq!(to_string(&Value::Integer(-7)), "-7");
        assert_eq!(to_string(&Value::Float(3.0)), "3.0");
        assert_eq!(to_string(&Value::Float(0.1)), "0.1");
        assert_eq!(to_string(&Value::from("it's")), "it's");
    }

    #[test]
    fn format_collections() {
        let value = value!([ "a", 1, 2.5, None, true ]);
        assert_eq!(to_string(&value), "['a', 1, 2.5, none, true]");

        let value = value!({ owner: "it's", cc: ["x"] });
        assert_eq!(to_string(&value), "{'owner': \"it's\", 'cc': ['x']}");
    }
}
