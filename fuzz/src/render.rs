#![no_main]

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde::Serialize;

#[derive(Debug, Serialize, Arbitrary)]
#[serde(untagged)]
enum Value {
    None,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

fuzz_target!(|data: (&str, BTreeMap<String, Value>)| {
    let (source, context) = data;
    let mut engine = herald::Engine::new();
    if engine.add_template("fuzz", source).is_err() {
        return;
    }
    // Rendering may fail on traversal errors but must never panic.
    let _ = engine.get_template("fuzz").unwrap().render(&context);
});
