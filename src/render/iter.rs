use std::borrow::Cow;
use std::slice;
use std::vec;

use indexmap::map;

use crate::types::ast;
use crate::{Error, Result, Value};

/// Iterates over the value in a `for` statement.
///
/// Lists yield their elements and maps yield their entries in insertion
/// order. Any other value yields nothing, strings included. A string is still
/// a sequence of characters elsewhere: `s.0` indexes a character and
/// `sep.join(s)` joins them.
pub enum LoopIter<'render> {
    ListBorrowed(slice::Iter<'render, Value>),
    ListOwned(vec::IntoIter<Value>),
    MapBorrowed(map::Iter<'render, String, Value>),
    MapOwned(map::IntoIter<String, Value>),
    Empty,
}

/// A single iteration of a loop.
pub enum Item<'render> {
    /// A list element.
    Element(Cow<'render, Value>),
    /// A map entry.
    Entry(String, Cow<'render, Value>),
}

impl<'render> LoopIter<'render> {
    pub fn new(iterable: Cow<'render, Value>) -> Self {
        match iterable {
            Cow::Borrowed(Value::List(list)) => Self::ListBorrowed(list.iter()),
            Cow::Borrowed(Value::Map(map)) => Self::MapBorrowed(map.iter()),
            Cow::Owned(Value::List(list)) => Self::ListOwned(list.into_iter()),
            Cow::Owned(Value::Map(map)) => Self::MapOwned(map.into_iter()),
            _ => Self::Empty,
        }
    }
}

impl<'render> Iterator for LoopIter<'render> {
    type Item = Item<'render>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = match self {
            Self::ListBorrowed(iter) => Item::Element(Cow::Borrowed(iter.next()?)),
            Self::ListOwned(iter) => Item::Element(Cow::Owned(iter.next()?)),
            Self::MapBorrowed(iter) => {
                let (k, v) = iter.next()?;
                Item::Entry(k.clone(), Cow::Borrowed(v))
            }
            Self::MapOwned(iter) => {
                let (k, v) = iter.next()?;
                Item::Entry(k, Cow::Owned(v))
            }
            Self::Empty => return None,
        };
        Some(item)
    }
}

impl<'render> Item<'render> {
    /// The value bound to a single loop variable, a list element or a map
    /// key.
    pub fn into_value(self) -> Cow<'render, Value> {
        match self {
            Self::Element(value) => value,
            Self::Entry(key, _) => Cow::Owned(Value::String(key)),
        }
    }

    /// The values bound to two loop variables.
    ///
    /// A map entry gives its key and value. A list element must itself be a
    /// two element list.
    pub fn into_pair(
        self,
        source: &str,
        kv: &ast::KeyValue,
    ) -> Result<(Cow<'render, Value>, Cow<'render, Value>)> {
        let err = |msg: String| Error::render(msg, source, kv.span);
        match self {
            Self::Entry(key, value) => Ok((Cow::Owned(Value::String(key)), value)),
            Self::Element(Cow::Borrowed(Value::List(list))) => match list.as_slice() {
                [k, v] => Ok((Cow::Borrowed(k), Cow::Borrowed(v))),
                _ => Err(err(format!(
                    "expected 2 values to unpack, found {}",
                    list.len()
                ))),
            },
            Self::Element(Cow::Owned(Value::List(list))) => {
                let [k, v]: [Value; 2] = list.try_into().map_err(|list: Vec<Value>| {
                    err(format!("expected 2 values to unpack, found {}", list.len()))
                })?;
                Ok((Cow::Owned(k), Cow::Owned(v)))
            }
            Self::Element(value) => {
                let human = value.human();
                Err(err(format!("cannot unpack {human} into two variables")))
            }
        }
    }
}
