//! Objects and arrays: literals, member access, delete, in, instanceof

use super::*;
use domprobe::value::array_elements;

#[test]
fn object_literal_and_member_read() {
    assert_eq!(
        eval(vec![
            var_decl("o", Some(object(vec![("a", num(1.0)), ("b", num(2.0))]))),
            expr_stmt(member(ident("o"), "b")),
        ]),
        JsValue::Number(2.0)
    );
}

#[test]
fn member_write_then_read_round_trips() {
    // o.x = 5; o.x
    assert_eq!(
        eval(vec![
            var_decl("o", Some(object(vec![]))),
            expr_stmt(assign("=", member(ident("o"), "x"), num(5.0))),
            expr_stmt(member(ident("o"), "x")),
        ]),
        JsValue::Number(5.0)
    );
}

#[test]
fn computed_access_uses_the_evaluated_key() {
    assert_eq!(
        eval(vec![
            var_decl("o", Some(object(vec![("ab", num(9.0))]))),
            var_decl("k", Some(str_lit("a"))),
            expr_stmt(member_computed(
                ident("o"),
                binop("+", ident("k"), str_lit("b")),
            )),
        ]),
        JsValue::Number(9.0)
    );
}

#[test]
fn array_literal_indexing_and_length() {
    assert_eq!(
        eval(vec![
            var_decl("a", Some(array(vec![num(10.0), num(20.0), num(30.0)]))),
            expr_stmt(binop(
                "+",
                member_computed(ident("a"), num(2.0)),
                member(ident("a"), "length"),
            )),
        ]),
        JsValue::Number(33.0)
    );
}

#[test]
fn elided_array_elements_are_undefined() {
    let result = eval(vec![expr_stmt(json!({
        "type": "ArrayExpression",
        "elements": [ {"type": "Literal", "value": 1}, null, {"type": "Literal", "value": 3} ]
    }))]);
    let arr = result.as_object().expect("array expected").clone();
    assert_eq!(
        array_elements(&arr),
        vec![JsValue::Number(1.0), JsValue::Undefined, JsValue::Number(3.0)]
    );
}

#[test]
fn nested_member_chains() {
    assert_eq!(
        eval(vec![
            var_decl(
                "o",
                Some(object(vec![("inner", object(vec![("deep", str_lit("found"))]))])),
            ),
            expr_stmt(member(member(ident("o"), "inner"), "deep")),
        ]),
        JsValue::from("found")
    );
}

#[test]
fn compound_assignment_on_members() {
    assert_eq!(
        eval(vec![
            var_decl("o", Some(object(vec![("n", num(10.0))]))),
            expr_stmt(assign("*=", member(ident("o"), "n"), num(3.0))),
            expr_stmt(member(ident("o"), "n")),
        ]),
        JsValue::Number(30.0)
    );
}

#[test]
fn update_expression_on_members() {
    assert_eq!(
        eval(vec![
            var_decl("o", Some(object(vec![("n", num(7.0))]))),
            expr_stmt(update("++", member(ident("o"), "n"), false)),
            expr_stmt(member(ident("o"), "n")),
        ]),
        JsValue::Number(8.0)
    );
}

#[test]
fn delete_removes_a_member() {
    // delete o.a; "a" in o
    assert_eq!(
        eval(vec![
            var_decl("o", Some(object(vec![("a", num(1.0))]))),
            expr_stmt(unary("delete", member(ident("o"), "a"))),
            expr_stmt(binop("in", str_lit("a"), ident("o"))),
        ]),
        JsValue::Boolean(false)
    );
}

#[test]
fn delete_reports_success() {
    assert_eq!(
        eval(vec![
            var_decl("o", Some(object(vec![("a", num(1.0))]))),
            expr_stmt(unary("delete", member(ident("o"), "a"))),
        ]),
        JsValue::Boolean(true)
    );
}

#[test]
fn delete_on_an_identifier_targets_the_context() {
    use domprobe::value::create_object;
    use domprobe::PropertyKey;

    let context = create_object();
    context
        .borrow_mut()
        .set_property(PropertyKey::from("doomed"), JsValue::Number(1.0));
    let mut interp = Interpreter::with_context(context.clone());
    assert_eq!(
        eval_with(&mut interp, vec![expr_stmt(unary("delete", ident("doomed")))]),
        JsValue::Boolean(true)
    );
    assert!(!context
        .borrow()
        .has_own_property(&PropertyKey::from("doomed")));
}

#[test]
fn in_operator_sees_members() {
    assert_eq!(
        eval(vec![
            var_decl("o", Some(object(vec![("a", num(1.0))]))),
            expr_stmt(binop("in", str_lit("a"), ident("o"))),
        ]),
        JsValue::Boolean(true)
    );
}

#[test]
fn instanceof_walks_the_prototype_chain() {
    // function T() {} var t = new T(); t instanceof T
    assert_eq!(
        eval(vec![
            func_decl("T", &[], vec![]),
            expr_stmt(assign(
                "=",
                member(ident("T"), "prototype"),
                object(vec![]),
            )),
            var_decl("t", Some(new_expr(ident("T"), vec![]))),
            expr_stmt(binop("instanceof", ident("t"), ident("T"))),
        ]),
        JsValue::Boolean(true)
    );
}

#[test]
fn instanceof_is_false_for_unrelated_objects() {
    assert_eq!(
        eval(vec![
            func_decl("T", &[], vec![]),
            expr_stmt(assign(
                "=",
                member(ident("T"), "prototype"),
                object(vec![]),
            )),
            var_decl("o", Some(object(vec![]))),
            expr_stmt(binop("instanceof", ident("o"), ident("T"))),
        ]),
        JsValue::Boolean(false)
    );
}

#[test]
fn writes_through_the_context_are_visible_to_the_host() {
    use domprobe::value::create_object;
    use domprobe::PropertyKey;

    let context = create_object();
    context
        .borrow_mut()
        .set_property(PropertyKey::from("shared"), JsValue::Object(create_object()));
    let mut interp = Interpreter::with_context(context.clone());
    eval_with(
        &mut interp,
        vec![expr_stmt(assign(
            "=",
            member(ident("shared"), "touched"),
            bool_lit(true),
        ))],
    );
    let shared = context
        .borrow()
        .get_property(&PropertyKey::from("shared"))
        .unwrap();
    let touched = shared
        .as_object()
        .unwrap()
        .borrow()
        .get_property(&PropertyKey::from("touched"));
    assert_eq!(touched, Some(JsValue::Boolean(true)));
}
