#![cfg(feature = "serde")]

use std::collections::BTreeMap;

use serde::Serialize;

use herald::{to_value, value, ErrorKind, List, Value};

#[test]
fn to_value_scalars() {
    assert_eq!(to_value(true).unwrap(), Value::Bool(true));
    assert_eq!(to_value(7_u8).unwrap(), Value::Integer(7));
    assert_eq!(to_value(-7_i64).unwrap(), Value::Integer(-7));
    assert_eq!(to_value(0.5_f32).unwrap(), Value::Float(0.5));
    assert_eq!(to_value('a').unwrap(), Value::from("a"));
    assert_eq!(to_value("testing...").unwrap(), Value::from("testing..."));
}

#[test]
fn to_value_u64_out_of_range() {
    assert_eq!(to_value(42_u64).unwrap(), Value::Integer(42));
    let err = to_value(u64::MAX).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serialize);
    assert_eq!(
        err.to_string(),
        "out of range integral type conversion attempted"
    );
}

#[test]
fn to_value_option_and_unit() {
    assert_eq!(to_value(None::<i32>).unwrap(), Value::None);
    assert_eq!(to_value(Some("x")).unwrap(), Value::from("x"));
    assert_eq!(to_value(()).unwrap(), Value::None);

    #[derive(Serialize)]
    struct Marker;
    assert_eq!(to_value(Marker).unwrap(), Value::None);
}

#[test]
fn to_value_sequences() {
    assert_eq!(to_value(vec!["a", "b"]).unwrap(), value!(["a", "b"]));
    assert_eq!(to_value(("a", 1)).unwrap(), value!(["a", 1]));
    assert_eq!(to_value(List::<i32>::new()).unwrap(), value!([]));
}

#[test]
fn to_value_struct_keeps_field_order() {
    #[derive(Serialize)]
    struct Change {
        new: &'static str,
        old: &'static str,
    }

    let value = to_value(Change {
        new: "closed",
        old: "new",
    })
    .unwrap();
    let Value::Map(map) = value else {
        panic!("expected map");
    };
    let keys: Vec<_> = map.keys().map(String::as_str).collect();
    assert_eq!(keys, ["new", "old"]);
}

#[test]
fn to_value_map_keys() {
    let strings: BTreeMap<_, _> = [("b", 2), ("a", 1)].into_iter().collect();
    assert_eq!(to_value(strings).unwrap(), value! { a: 1, b: 2 });

    let ints: BTreeMap<_, _> = [(10, "ten")].into_iter().collect();
    let Value::Map(map) = to_value(ints).unwrap() else {
        panic!("expected map");
    };
    assert_eq!(map.get("10"), Some(&Value::from("ten")));

    let err = to_value(FloatKeys(vec![(1.5, 1)])).unwrap_err();
    assert_eq!(err.to_string(), "map key must be a string");
}

/// Serializes as a map with float keys.
struct FloatKeys(Vec<(f64, i32)>);

impl Serialize for FloatKeys {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
    }
}

#[test]
fn to_value_enum_variants() {
    #[derive(Serialize)]
    enum Event {
        Created,
        Renamed(&'static str),
        Moved(&'static str, &'static str),
        Changed { field: &'static str },
    }

    assert_eq!(to_value(Event::Created).unwrap(), Value::from("Created"));
    assert_eq!(
        to_value(Event::Renamed("wiki")).unwrap(),
        value! { Renamed: "wiki" }
    );
    assert_eq!(
        to_value(Event::Moved("a", "b")).unwrap(),
        value! { Moved: ["a", "b"] }
    );
    assert_eq!(
        to_value(Event::Changed { field: "owner" }).unwrap(),
        value! { Changed: { field: "owner" } }
    );
}

#[test]
fn to_value_value_is_identity() {
    let value = value! { ticket: { id: 1, cc: ["a", None], closed: false, score: 0.5 } };
    assert_eq!(to_value(&value).unwrap(), value);
}
