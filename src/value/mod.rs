//! Defines the [`Value`] enum, representing any valid renderable data.

mod from;
#[cfg(feature = "serde")]
mod ser;

use std::mem;

pub use std::vec::Vec as List;

#[cfg(feature = "serde")]
pub use crate::value::ser::to_value;

/// An insertion-ordered map, used for [`Value::Map`].
pub type Map<K, V> = indexmap::IndexMap<K, V>;

/// Data to be rendered represented as a recursive enum.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(List<Value>),
    Map(Map<String, Value>),
}

impl Value {
    /// Returns whether the value satisfies a conditional.
    ///
    /// `None`, `false`, zero, the empty string and empty collections are
    /// falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::None => false,
            Self::Bool(b) => *b,
            Self::Integer(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::String(s) => !s.is_empty(),
            Self::List(l) => !l.is_empty(),
            Self::Map(m) => !m.is_empty(),
        }
    }

    pub(crate) fn human(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(s), Self::Bool(o)) => s == o,
            (Self::Integer(s), Self::Integer(o)) => s == o,
            (Self::Float(s), Self::Float(o)) => s == o,
            (Self::Integer(s), Self::Float(o)) | (Self::Float(o), Self::Integer(s)) => {
                *s as f64 == *o
            }
            (Self::String(s), Self::String(o)) => s == o,
            (Self::List(s), Self::List(o)) => s == o,
            (Self::Map(s), Self::Map(o)) => s == o,
            _ => mem::discriminant(self) == mem::discriminant(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_truthiness() {
        let falsy = [
            Value::None,
            Value::Bool(false),
            Value::Integer(0),
            Value::Float(0.0),
            Value::from(""),
            Value::List(List::new()),
            Value::Map(Map::new()),
        ];
        for value in falsy {
            assert!(!value.is_truthy(), "{value:?} should be falsy");
        }
        let truthy = [
            Value::Bool(true),
            Value::Integer(-1),
            Value::Float(0.5),
            Value::from("s"),
            Value::from([1]),
            Value::from([("a", 1)]),
        ];
        for value in truthy {
            assert!(value.is_truthy(), "{value:?} should be truthy");
        }
    }

    #[test]
    fn value_eq_numeric() {
        assert_eq!(Value::Integer(2), Value::Float(2.0));
        assert_ne!(Value::Integer(2), Value::from("2"));
        assert_eq!(Value::None, Value::None);
    }
}
