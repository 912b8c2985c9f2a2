/// Construct a [`Value`][crate::Value] using a JSON-like literal.
///
/// Map keys are identifiers, values are `None`, nested `{ ... }` maps,
/// `[ ... ]` lists or any single token that converts into a value. Wrap
/// longer expressions in parentheses.
///
/// # Examples
///
/// ```
/// let value = herald::value! {
///     ticket: {
///         id: 42,
///         summary: "Crash on startup",
///         cc: ["alice", "bob"],
///         milestone: None,
///     },
///     author: (String::from("carol")),
/// };
/// ```
#[macro_export]
macro_rules! value {
    () => {
        $crate::value!({})
    };

    (None) => {
        $crate::Value::None
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::List(::std::vec![$($crate::value!($elem)),*])
    };

    ({ $($key:ident : $val:tt),* $(,)? }) => {{
        #[allow(unused_mut)]
        let mut map = $crate::Map::new();
        $(
            map.insert(::std::string::String::from(stringify!($key)), $crate::value!($val));
        )*
        $crate::Value::Map(map)
    }};

    ($($key:ident : $val:tt),+ $(,)?) => {
        $crate::value!({ $($key : $val),+ })
    };

    ($other:expr) => {
        $crate::Value::from($other)
    };
}

#[cfg(test)]
mod tests {
    use crate::{List, Map, Value};

    #[test]
    fn value_none() {
        assert_eq!(value!(None), Value::None);
    }

    #[test]
    fn value_empty_map() {
        assert_eq!(value! {}, Value::Map(Map::new()));
    }

    #[test]
    fn value_string() {
        assert_eq!(value!("testing..."), Value::from("testing..."));
    }

    #[test]
    fn value_list() {
        let v = value!(["testing...", None, {}, []]);
        assert_eq!(
            v,
            Value::List(vec![
                Value::from("testing..."),
                Value::None,
                Value::Map(Map::new()),
                Value::List(List::new()),
            ])
        );
    }

    #[test]
    fn value_map_keeps_insertion_order() {
        let v = value! { type: "defect", id: 7, status: (String::from("new")), };
        let Value::Map(map) = v else {
            panic!("expected map")
        };
        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["type", "id", "status"]);
        assert_eq!(map["id"], Value::Integer(7));
    }

    #[test]
    fn value_map_nested() {
        let v = value!({
            author: "alice",
            change: {
                fields: { owner: { old: "bob", new: "carol" } },
                comment: None,
            },
        });
        let exp = Value::from([
            ("author", Value::from("alice")),
            (
                "change",
                Value::from([
                    (
                        "fields",
                        Value::from([(
                            "owner",
                            Value::from([("old", "bob"), ("new", "carol")]),
                        )]),
                    ),
                    ("comment", Value::None),
                ]),
            ),
        ]);
        assert_eq!(v, exp);
    }
}
