use herald::{value, Engine, ErrorKind, Map, Value};

#[track_caller]
fn render(source: &str, ctx: Value) -> String {
    Engine::new()
        .compile(source)
        .unwrap()
        .render_from(&ctx)
        .unwrap()
}

#[test]
fn render_raw() {
    assert_eq!(render("lorem ipsum", value! {}), "lorem ipsum");
}

#[test]
fn render_comment() {
    assert_eq!(render("lorem {# ipsum #}dolor", value! {}), "lorem dolor");
}

#[test]
fn render_expr_string() {
    let result = render("lorem #{ ipsum }", value! { ipsum: "dolor" });
    assert_eq!(result, "lorem dolor");
}

#[test]
fn render_expr_not_escaped() {
    let result = render("#{ html }", value! { html: "<b>&amp;</b>" });
    assert_eq!(result, "<b>&amp;</b>");
}

#[test]
fn render_expr_bool() {
    let result = render("#{ yes } #{ no }", value! { yes: true, no: false });
    assert_eq!(result, "true false");
}

#[test]
fn render_expr_bool_nested() {
    let ctx = value! { flag: true, flags: [true, false], opts: { cc: false, owner: None } };
    let result = render("#{ flag } #{ flags } #{ opts } #{ flags.1 }", ctx);
    assert_eq!(result, "true [true, false] {'cc': false, 'owner': none} false");
}

#[test]
fn render_expr_numbers() {
    let result = render(
        "#{ int } #{ neg } #{ float } #{ whole }",
        value! { int: 123, neg: (-4_i64), float: 0.5, whole: 3.0 },
    );
    assert_eq!(result, "123 -4 0.5 3.0");
}

#[test]
fn render_expr_none() {
    let result = render("[#{ owner }]", value! { owner: None });
    assert_eq!(result, "[]");
}

#[test]
fn render_expr_collections() {
    let result = render(
        "#{ cc } #{ ticket }",
        value! { cc: ["alice", "bob"], ticket: { id: 1, tags: [] } },
    );
    assert_eq!(result, "['alice', 'bob'] {'id': 1, 'tags': []}");
}

#[test]
fn render_expr_literals() {
    let result = render(
        r#"#{ 'a' } #{ "b\tc" } #{ 1 } #{ -2.5 } #{ True } #{ none }|"#,
        value! {},
    );
    assert_eq!(result, "a b\tc 1 -2.5 true |");
}

#[test]
fn render_expr_missing_key() {
    assert_eq!(render("#{ x }", value! {}), "");
    assert_eq!(render("a#{ x.y.z }b", value! { x: {} }), "ab");
    assert_eq!(render("#{ x['y'] }", value! { x: { z: 1 } }), "");
}

#[test]
fn render_expr_non_map_globals() {
    assert_eq!(render("[#{ x }]", value!(["x"])), "[]");
}

#[test]
fn render_expr_attribute_and_index() {
    let ctx = value! {
        ticket: { summary: "Crash", changes: { owner: ["alice", "bob"] } },
        field: "owner",
    };
    assert_eq!(
        render("#{ ticket['summary'] } #{ ticket.changes[field][1] }", ctx),
        "Crash bob"
    );
}

#[test]
fn render_expr_list_index() {
    let ctx = value! { xs: ["a", "b", "c"] };
    assert_eq!(
        render("#{ xs.0 }#{ xs[1] }#{ xs[-1] }[#{ xs[3] }]", ctx),
        "abc[]"
    );
}

#[test]
fn render_expr_nested_list_index() {
    let ctx = value! { changes: [["status", "new", "closed"]] };
    assert_eq!(render("#{ changes.0.2 }", ctx), "closed");
}

#[test]
fn render_expr_map_integer_key() {
    let mut revisions = Map::new();
    revisions.insert("1".into(), Value::from("initial"));
    let ctx = value! { revisions: (Value::Map(revisions)) };
    assert_eq!(render("#{ revisions[1] }|#{ revisions.1 }|#{ revisions[2] }", ctx), "initial|initial|");
}

#[test]
fn render_expr_string_index() {
    let ctx = value! { name: "héllo" };
    assert_eq!(render("#{ name[1] }#{ name[-1] }", ctx), "éo");
}

#[test]
fn render_short_expr() {
    let ctx = value! { author: { name: "alice" } };
    assert_eq!(render("by $author.name.", ctx), "by alice.");
}

#[test]
fn render_short_expr_escaped_and_literal() {
    let ctx = value! { price: 5 };
    assert_eq!(render("$$$price or $ 5 or $5", ctx), "$5 or $ 5 or $5");
}

#[test]
fn render_short_expr_missing() {
    assert_eq!(render("[$ticket.owner]", value! { ticket: {} }), "[]");
}

#[test]
fn render_line_join() {
    assert_eq!(render("lorem \\\nipsum", value! {}), "lorem ipsum");
    assert_eq!(render("lorem \\\r\nipsum", value! {}), "lorem ipsum");
    assert_eq!(render("lorem \\ipsum\\", value! {}), "lorem \\ipsum\\");
}

#[test]
fn render_line_join_around_tags() {
    let source = "{% if a %}\\\nyes\\\n{% end %}\\\n!";
    assert_eq!(render(source, value! { a: true }), "yes!");
    assert_eq!(render(source, value! { a: false }), "!");
}

#[test]
fn render_if_truthiness() {
    let source = "{% if x %}A{% end %}";
    for x in [
        value!(None),
        value!(false),
        value!(0),
        value!(0.0),
        value!(""),
        value!([]),
        value!({}),
    ] {
        assert_eq!(render(source, value! { x: (x.clone()) }), "", "{x:?}");
    }
    for x in [
        value!(true),
        value!(1),
        value!(-0.5),
        value!("s"),
        value!([1]),
        value!({ a: None }),
    ] {
        assert_eq!(render(source, value! { x: (x.clone()) }), "A", "{x:?}");
    }
    assert_eq!(render(source, value! {}), "");
}

#[test]
fn render_if_not() {
    let source = "{% if not x %}A{% end %}";
    assert_eq!(render(source, value! {}), "A");
    assert_eq!(render(source, value! { x: "s" }), "");
}

#[test]
fn render_if_nested() {
    let source = "{% if a %}a{% if b %}b{% end %}{% end %}";
    assert_eq!(render(source, value! { a: true, b: true }), "ab");
    assert_eq!(render(source, value! { a: true, b: false }), "a");
    assert_eq!(render(source, value! { a: false, b: true }), "");
}

#[test]
fn render_expr_and_or() {
    let ctx = value! { empty: "", name: "alice", zero: 0 };
    assert_eq!(render("#{ empty or 'nobody' }", ctx.clone()), "nobody");
    assert_eq!(render("#{ name or 'nobody' }", ctx.clone()), "alice");
    assert_eq!(render("#{ name and zero }", ctx.clone()), "0");
    assert_eq!(render("[#{ empty and name }]", ctx.clone()), "[]");
    assert_eq!(render("#{ missing or name }", ctx), "alice");
}

#[test]
fn render_expr_precedence() {
    let ctx = value! { a: true, b: false, c: true };
    assert_eq!(render("#{ not b and c }", ctx.clone()), "true");
    assert_eq!(render("#{ a or b and not c }", ctx.clone()), "true");
    assert_eq!(render("#{ (a or b) and not c }", ctx), "false");
}

#[test]
fn render_expr_equality() {
    let ctx = value! { n: 2, s: "closed", xs: [1, 2] };
    assert_eq!(render("#{ n == 2.0 } #{ n != 2 }", ctx.clone()), "true false");
    assert_eq!(render("#{ s == 'closed' } #{ s == 'new' }", ctx.clone()), "true false");
    assert_eq!(render("#{ xs == xs } #{ n == '2' }", ctx.clone()), "true false");
    assert_eq!(render("#{ none == None }", ctx), "true");
}

#[test]
fn render_expr_equality_absent() {
    let ctx = value! {};
    assert_eq!(render("#{ missing == other }", ctx.clone()), "false");
    assert_eq!(render("#{ missing == none }", ctx.clone()), "false");
    assert_eq!(render("#{ missing != 'x' }", ctx), "true");
}

#[test]
fn render_choose_first_truthy() {
    let source = "{% choose %}{% when False %}1{% when True %}2{% otherwise %}3{% end %}";
    assert_eq!(render(source, value! {}), "2");
}

#[test]
fn render_choose_otherwise() {
    let source = "{% choose %}{% when a %}1{% when b %}2{% otherwise %}3{% end %}";
    assert_eq!(render(source, value! { a: false }), "3");
    assert_eq!(render(source, value! { b: "yes" }), "2");
}

#[test]
fn render_choose_without_otherwise() {
    let source = "{% choose %}{% when a %}1{% end %}!";
    assert_eq!(render(source, value! {}), "!");
}

#[test]
fn render_choose_empty() {
    assert_eq!(render("{% choose %}{% end %}", value! {}), "");
    assert_eq!(render("{% choose %}\n  \n{% end %}", value! {}), "");
}

#[test]
fn render_choose_subject() {
    let source = "{% choose ticket.status %}
  {% when 'new' %}new\\
{% when 'closed' %}closed\\
{% otherwise %}other\\
{% end %}";
    let status = |s: &str| value! { ticket: { status: s } };
    assert_eq!(render(source, status("new")), "new");
    assert_eq!(render(source, status("closed")), "closed");
    assert_eq!(render(source, status("reopened")), "other");
    assert_eq!(render(source, value! {}), "other");
}

#[test]
fn render_choose_subject_numeric() {
    let source = "{% choose n %}{% when 1 %}one{% when 2 %}two{% end %}";
    assert_eq!(render(source, value! { n: 2.0 }), "two");
}

#[test]
fn render_choose_nested() {
    let source = "\
{% choose %}\\
{% when a %}\\
{% choose %}{% when b %}ab{% otherwise %}a{% end %}\\
{% otherwise %}\\
none\\
{% end %}";
    assert_eq!(render(source, value! { a: true, b: true }), "ab");
    assert_eq!(render(source, value! { a: true }), "a");
    assert_eq!(render(source, value! {}), "none");
}

#[test]
fn render_choose_branch_body_whitespace_kept() {
    let source = "{% choose %}{% when a %} x {% end %}";
    assert_eq!(render(source, value! { a: true }), " x ");
}

#[test]
fn render_for_list() {
    let source = "{% for x in xs %}#{ x },{% end %}";
    assert_eq!(render(source, value! { xs: ["a", "b", "c"] }), "a,b,c,");
}

#[test]
fn render_for_map_keys_in_insertion_order() {
    let source = "{% for k in m %}#{ k }{% end %}";
    assert_eq!(render(source, value! { m: { a: 1, b: 2 } }), "ab");
    assert_eq!(render(source, value! { m: { b: 1, a: 2 } }), "ba");
}

#[test]
fn render_for_map_key_value() {
    let source = "{% for k, v in m %}#{ k }=#{ v };{% end %}";
    assert_eq!(render(source, value! { m: { b: 1, a: "x" } }), "b=1;a=x;");
}

#[test]
fn render_for_items() {
    let source = "{% for k, v in m.items() %}#{ k }=#{ v };{% end %}";
    assert_eq!(render(source, value! { m: { owner: "bob" } }), "owner=bob;");
}

#[test]
fn render_for_unpack_pairs() {
    let source = "{% for old, new in changes %}#{ old }->#{ new } {% end %}";
    let ctx = value! { changes: [["a", "b"], ["c", None]] };
    assert_eq!(render(source, ctx), "a->b c-> ");
}

#[test]
fn render_for_not_iterable() {
    let source = "[{% for x in xs %}#{ x }{% end %}]";
    assert_eq!(render(source, value! {}), "[]");
    assert_eq!(render(source, value! { xs: "abc" }), "[]");
    assert_eq!(render(source, value! { xs: 3 }), "[]");
    assert_eq!(render(source, value! { xs: None }), "[]");
}

#[test]
fn render_for_string_yields_nothing() {
    let source = "[{% for c in s %}#{ c }{% end %}] #{ s.0 } #{ s[-1] } #{ '-'.join(s) }";
    assert_eq!(render(source, value! { s: "abc" }), "[] a c a-b-c");
}

#[test]
fn render_for_shadows_globals() {
    let source = "{% for x in xs %}#{ x }{% end %}#{ x }";
    assert_eq!(render(source, value! { x: "g", xs: ["a", "b"] }), "abg");
}

#[test]
fn render_for_nested() {
    let source = "{% for row in rows %}{% for x in row %}#{ x }{% end %};{% end %}";
    let ctx = value! { rows: [[1, 2], [], [3]] };
    assert_eq!(render(source, ctx), "12;;3;");
}

#[test]
fn render_for_nested_shadowing() {
    let source = "{% for x in a %}{% for x in b %}#{ x }{% end %}#{ x }{% end %}";
    let ctx = value! { a: ["1", "2"], b: ["x"] };
    assert_eq!(render(source, ctx), "x1x2");
}

#[test]
fn render_for_loop_var_access() {
    let source = "{% for change in changes %}#{ change.field }:#{ change['new'] } {% end %}";
    let ctx = value! { changes: [{ field: "owner", new: "bob" }, { field: "cc" }] };
    assert_eq!(render(source, ctx), "owner:bob cc: ");
}

#[test]
fn render_is_pure() {
    let template = Engine::new().compile("#{ a }{% for x in xs %}#{ x }{% end %}").unwrap();
    let first = value! { a: 1, xs: ["x"] };
    let second = value! { a: 2 };
    assert_eq!(template.render_from(&first).unwrap(), "1x");
    assert_eq!(template.render_from(&second).unwrap(), "2");
    assert_eq!(template.render_from(&first).unwrap(), "1x");
    assert_eq!(first, value! { a: 1, xs: ["x"] });
}

#[test]
fn render_err_index_into_string() {
    let err = Engine::new()
        .compile("lorem #{ ticket.summary.text }")
        .unwrap()
        .render_from(&value! { ticket: { summary: "Crash" } })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Render);
    assert_eq!(
        format!("{:#}", err),
        "
   |
 1 | lorem #{ ticket.summary.text }
   |                         ^^^^ cannot index into string with a string
"
    );
}

#[test]
fn render_err_index_into_none() {
    let err = Engine::new()
        .compile("#{ ticket.milestone.name }")
        .unwrap()
        .render_from(&value! { ticket: { milestone: None } })
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "cannot index into none between bytes 20 and 24"
    );
}

#[test]
fn render_err_index_into_integer() {
    let err = Engine::new()
        .compile("#{ n[0] }")
        .unwrap()
        .render_from(&value! { n: 3 })
        .unwrap_err();
    assert_eq!(
        format!("{:#}", err),
        "
   |
 1 | #{ n[0] }
   |     ^^^ cannot index into integer
"
    );
}

#[test]
fn render_err_index_list_with_string() {
    let err = Engine::new()
        .compile("#{ xs.name }")
        .unwrap()
        .render_from(&value! { xs: [] })
        .unwrap_err();
    assert_eq!(err.message(), "cannot index into list with a string");
}

#[test]
fn render_err_index_with_bool() {
    let err = Engine::new()
        .compile("#{ m[true] }")
        .unwrap()
        .render_from(&value! { m: {} })
        .unwrap_err();
    assert_eq!(err.to_string(), "cannot index with bool between bytes 5 and 9");
}

#[test]
fn render_err_unpack() {
    let err = Engine::new()
        .compile("{% for a, b in xs %}{% end %}")
        .unwrap()
        .render_from(&value! { xs: [1] })
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "cannot unpack integer into two variables between bytes 7 and 11"
    );

    let err = Engine::new()
        .compile("{% for a, b in xs %}{% end %}")
        .unwrap()
        .render_from(&value! { xs: [[1, 2, 3]] })
        .unwrap_err();
    assert_eq!(err.message(), "expected 2 values to unpack, found 3");
}

#[test]
fn render_err_in_branch_not_taken_is_ignored() {
    let result = render("{% if false %}#{ n.x }{% end %}ok", value! { n: 1 });
    assert_eq!(result, "ok");
}

#[test]
fn render_deeply_nested_blocks() {
    let depth = 10_000;
    let source = format!("{}A{}", "{% if a %}".repeat(depth), "{% end %}".repeat(depth));
    assert_eq!(render(&source, value! { a: true }), "A");

    let source = format!(
        "{}#{{ x }}{}",
        "{% for x in xs %}".repeat(depth),
        "{% end %}".repeat(depth)
    );
    assert_eq!(render(&source, value! { xs: [7] }), "7");
}

#[test]
fn render_nested_loops_over_owned_values() {
    let source = "\
{% for k, row in m.items() %}\
#{ k }:{% for t in row.tags %} #{ t.upper() }{% end %} (#{ row.info.id });{% end %}";
    let ctx = value! {
        m: {
            a: { tags: ["x", "y"], info: { id: 1 } },
            b: { tags: [], info: { id: 2 } },
        }
    };
    assert_eq!(render(source, ctx), "a: X Y (1);b: (2);");
}
