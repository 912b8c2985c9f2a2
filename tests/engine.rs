#![cfg(feature = "serde")]

use std::collections::BTreeMap;

use herald::{value, Engine, ErrorKind, Syntax, Value};

#[test]
fn engine_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Engine<'_>>();
    assert_send_sync::<herald::Template<'_>>();
    assert_send_sync::<herald::TemplateRef<'_>>();
    assert_send_sync::<herald::Error>();
}

#[test]
fn engine_add_and_get_template() {
    let mut engine = Engine::new();
    engine.add_template("subject", "#{ id }: $summary").unwrap();
    let template = engine.get_template("subject").unwrap();
    assert_eq!(template.source(), "#{ id }: $summary");
    let result = template
        .render(value! { id: 7, summary: "Crash" })
        .unwrap();
    assert_eq!(result, "7: Crash");
}

#[test]
fn engine_add_template_owned() {
    let mut engine = Engine::new();
    let name = String::from("body");
    let source = String::from("Hello $name!");
    engine.add_template(name, source).unwrap();
    let result = engine
        .get_template("body")
        .unwrap()
        .render_from(&value! { name: "alice" })
        .unwrap();
    assert_eq!(result, "Hello alice!");
}

#[test]
fn engine_add_template_replaces() {
    let mut engine = Engine::new();
    engine.add_template("t", "first").unwrap();
    engine.add_template("t", "second").unwrap();
    let result = engine.get_template("t").unwrap().render(value! {}).unwrap();
    assert_eq!(result, "second");
}

#[test]
fn engine_add_template_err_keeps_previous() {
    let mut engine = Engine::new();
    engine.add_template("t", "first").unwrap();
    let err = engine.add_template("t", "{% if a %}").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(engine.get_template("t").unwrap().source(), "first");
}

#[test]
fn engine_get_template_missing() {
    let engine = Engine::new();
    assert!(engine.get_template("missing").is_none());
}

#[test]
fn engine_remove_template() {
    let mut engine = Engine::new();
    engine.add_template("t", "lorem").unwrap();
    engine.remove_template("t");
    assert!(engine.get_template("t").is_none());
    engine.remove_template("t");
}

#[test]
fn engine_compile_source() {
    let source = String::from("lorem #{ ipsum }");
    let template = Engine::new().compile(&source).unwrap();
    assert_eq!(template.source(), "lorem #{ ipsum }");
}

#[test]
fn engine_template_renders_many_times() {
    let mut engine = Engine::new();
    engine.add_template("t", "#{ n }").unwrap();
    let template = engine.get_template("t").unwrap();
    for n in 0..3 {
        assert_eq!(template.render(value! { n: n }).unwrap(), n.to_string());
    }
}

#[test]
fn engine_with_syntax() {
    let syntax = Syntax::builder()
        .expr("<?", "?>")
        .block("<%", "%>")
        .comment("<#", "#>")
        .build();
    let engine = Engine::with_syntax(syntax);
    let template = engine
        .compile("<# note #><% for x in xs %><? x ?>#{ x }<% end %>")
        .unwrap();
    let result = template.render(value! { xs: ["a", "b"] }).unwrap();
    assert_eq!(result, "a#{ x }b#{ x }");
}

#[test]
fn engine_with_syntax_short_expr() {
    let syntax = Syntax::builder().expr("{{", "}}").short_expr("@").build();
    let result = Engine::with_syntax(syntax)
        .compile("{{ a }} and @b.c and $b and @@")
        .unwrap()
        .render(value! { a: 1, b: { c: 2 } })
        .unwrap();
    assert_eq!(result, "1 and 2 and $b and @");
}

#[test]
fn engine_with_syntax_partial() {
    let syntax = Syntax::builder().block("<%", "%>").build();
    let result = Engine::with_syntax(syntax)
        .compile("{% if a %}<% if a %>yes<% end %>")
        .unwrap()
        .render(value! { a: true })
        .unwrap();
    assert_eq!(result, "{% if a %}yes");
}

#[test]
fn engine_render_serializable() {
    #[derive(serde::Serialize)]
    struct Context {
        ticket: Ticket,
        changes: BTreeMap<&'static str, (&'static str, &'static str)>,
    }

    #[derive(serde::Serialize)]
    struct Ticket {
        id: u64,
        owner: Option<String>,
        kind: Kind,
    }

    #[derive(serde::Serialize)]
    #[serde(rename_all = "lowercase")]
    enum Kind {
        Defect,
    }

    let ctx = Context {
        ticket: Ticket {
            id: 42,
            owner: None,
            kind: Kind::Defect,
        },
        changes: [("status", ("new", "closed"))].into_iter().collect(),
    };
    let result = Engine::new()
        .compile(
            "##{ ticket.id } #{ ticket.kind } [#{ ticket.owner }]\
             {% for field, change in changes %} #{ field }: #{ change.0 } -> #{ change.1 }{% end %}",
        )
        .unwrap()
        .render(&ctx)
        .unwrap();
    assert_eq!(result, "#42 defect [] status: new -> closed");
}

#[test]
fn engine_render_err_map_key() {
    let ctx: BTreeMap<bool, i32> = [(true, 1)].into_iter().collect();
    let err = Engine::new()
        .compile("lorem")
        .unwrap()
        .render(&ctx)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serialize);
    assert_eq!(err.to_string(), "map key must be a string");
}

#[test]
fn engine_render_err_integer_range() {
    let err = Engine::new()
        .compile("#{ n }")
        .unwrap()
        .render(BTreeMap::from([("n", u64::MAX)]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serialize);
}

#[test]
fn engine_to_value() {
    let value = herald::to_value(BTreeMap::from([("a", vec![1, 2])])).unwrap();
    assert_eq!(value, value! { a: [1, 2] });
    assert!(matches!(value, Value::Map(_)));
}

#[test]
fn engine_debug() {
    let mut engine = Engine::new();
    engine.add_template("t", "lorem").unwrap();
    let debug = format!("{:?}", engine);
    assert!(debug.starts_with("Engine {"));
    assert!(debug.contains("\"t\""));
}
