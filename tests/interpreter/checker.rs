//! Checker hook and collection recording

use std::rc::Rc;

use super::*;
use domprobe::host::{browser_context, create_element, create_jquery_set};
use domprobe::value::create_object;
use domprobe::{CheckRequest, CheckStatus, Checker, DomMutationChecker, PropertyKey};

fn dom_interpreter() -> (Interpreter, JsValue) {
    let context = browser_context();
    let element = JsValue::Object(create_element("div"));
    context
        .borrow_mut()
        .set_property(PropertyKey::from("el"), element.clone());
    let mut interp = Interpreter::with_context(context);
    interp.set_checker(Rc::new(DomMutationChecker));
    (interp, element)
}

#[test]
fn style_assignment_is_attributed_to_the_owning_element() {
    // el.style.color = "red"
    let (mut interp, element) = dom_interpreter();
    eval_with(
        &mut interp,
        vec![expr_stmt(assign(
            "=",
            member(member(ident("el"), "style"), "color"),
            str_lit("red"),
        ))],
    );
    let entries = interp.collection().entries();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].element.strict_equals(&element));
    assert_eq!(entries[0].kind, "style");
    let info = entries[0].info.as_ref().expect("assignment carries info");
    assert_eq!(info.code, "el.style.color = \"red\"");
    assert_eq!(info.script_url.as_str(), "test.js");
}

#[test]
fn the_style_write_itself_still_happens() {
    let (mut interp, element) = dom_interpreter();
    eval_with(
        &mut interp,
        vec![expr_stmt(assign(
            "=",
            member(member(ident("el"), "style"), "color"),
            str_lit("red"),
        ))],
    );
    let style = element
        .as_object()
        .unwrap()
        .borrow()
        .get_property(&PropertyKey::from("style"))
        .unwrap();
    let color = style
        .as_object()
        .unwrap()
        .borrow()
        .get_property(&PropertyKey::from("color"));
    assert_eq!(color, Some(JsValue::from("red")));
}

#[test]
fn class_list_mutation_is_recorded_through_parent() {
    // el.classList.add("active")
    let (mut interp, element) = dom_interpreter();
    eval_with(
        &mut interp,
        vec![expr_stmt(call(
            member(member(ident("el"), "classList"), "add"),
            vec![str_lit("active")],
        ))],
    );
    let entries = interp.collection().entries();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].element.strict_equals(&element));
    assert_eq!(entries[0].kind, "class");
}

#[test]
fn set_attribute_is_recorded_against_the_element() {
    let (mut interp, element) = dom_interpreter();
    eval_with(
        &mut interp,
        vec![expr_stmt(call(
            member(ident("el"), "setAttribute"),
            vec![str_lit("id"), str_lit("main")],
        ))],
    );
    let entries = interp.collection().entries();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].element.strict_equals(&element));
    assert_eq!(entries[0].kind, "attribute");
    let info = entries[0].info.as_ref().expect("call carries info");
    assert_eq!(info.code, "el.setAttribute(\"id\", \"main\")");
}

#[test]
fn attribute_node_writes_resolve_to_the_owner_element() {
    // var a = el.getAttributeNode("id"); a.value = "next"
    let (mut interp, element) = dom_interpreter();
    eval_with(
        &mut interp,
        vec![
            expr_stmt(call(
                member(ident("el"), "setAttribute"),
                vec![str_lit("id"), str_lit("first")],
            )),
            var_decl(
                "a",
                Some(call(
                    member(ident("el"), "getAttributeNode"),
                    vec![str_lit("id")],
                )),
            ),
            expr_stmt(assign("=", member(ident("a"), "value"), str_lit("next"))),
        ],
    );
    let entries = interp.collection().entries();
    assert_eq!(entries.len(), 2);
    assert!(entries[1].element.strict_equals(&element));
    assert_eq!(entries[1].kind, "attribute");
}

#[test]
fn nested_flagged_calls_are_suppressed() {
    // jQuery's attr() calls setAttribute on each element internally; only
    // the outer site is recorded
    let (mut interp, element) = dom_interpreter();
    let set = JsValue::Object(create_jquery_set(vec![element.clone()]));
    if let JsValue::Object(ctx) = interp.context().clone() {
        ctx.borrow_mut()
            .set_property(PropertyKey::from("wrapped"), set);
    }
    eval_with(
        &mut interp,
        vec![expr_stmt(call(
            member(ident("wrapped"), "attr"),
            vec![str_lit("role"), str_lit("note")],
        ))],
    );
    let entries = interp.collection().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, "attribute");
    assert!(entries[0].element.strict_equals(&element));
}

#[test]
fn jquery_sets_flatten_to_one_entry_per_element() {
    let (mut interp, first) = dom_interpreter();
    let second = JsValue::Object(create_element("span"));
    let set = JsValue::Object(create_jquery_set(vec![first.clone(), second.clone()]));
    if let JsValue::Object(ctx) = interp.context().clone() {
        ctx.borrow_mut()
            .set_property(PropertyKey::from("pair"), set);
    }
    eval_with(
        &mut interp,
        vec![expr_stmt(call(
            member(ident("pair"), "css"),
            vec![str_lit("color"), str_lit("blue")],
        ))],
    );
    let entries = interp.collection().entries();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].element.strict_equals(&first));
    assert!(entries[1].element.strict_equals(&second));
    assert_eq!(entries[0].kind, "style");
    assert_eq!(interp.collection().entries_for(&first).count(), 1);
}

#[test]
fn unflagged_sites_record_nothing() {
    let (mut interp, _) = dom_interpreter();
    eval_with(
        &mut interp,
        vec![
            var_decl("o", Some(object(vec![("color", str_lit("red"))]))),
            expr_stmt(assign("=", member(ident("o"), "color"), str_lit("blue"))),
            expr_stmt(call(member(ident("el"), "getAttribute"), vec![str_lit("id")])),
        ],
    );
    assert!(interp.collection().is_empty());
}

#[test]
fn check_flag_is_cleared_when_the_flagged_call_throws() {
    struct FlagEverything;
    impl Checker for FlagEverything {
        fn dispatch(&self, _request: &CheckRequest<'_>) -> Option<CheckStatus> {
            Some(CheckStatus::new("any"))
        }
    }

    let mut interp = Interpreter::new();
    interp.set_checker(Rc::new(FlagEverything));
    // var o = { boom: function () { throw 1 } }; o.boom()
    let body = vec![
        var_decl(
            "o",
            Some(object(vec![(
                "boom",
                func_expr(None, &[], vec![throw_stmt(num(1.0))]),
            )])),
        ),
        expr_stmt(call(member(ident("o"), "boom"), vec![])),
    ];
    let err = interp.execute(&program(body), "test.js").unwrap_err();
    assert!(err.is_thrown());
    assert!(interp.is_idle(), "check flag must be lowered on error paths");
    assert_eq!(interp.collection().len(), 1);
}

#[test]
fn status_target_overrides_the_receiver() {
    struct RedirectingChecker {
        target: JsValue,
    }
    impl Checker for RedirectingChecker {
        fn dispatch(&self, request: &CheckRequest<'_>) -> Option<CheckStatus> {
            if request.callee.as_str() == Some("paint") {
                Some(CheckStatus::with_target("custom", self.target.clone()))
            } else {
                None
            }
        }
    }

    let stand_in = JsValue::Object(create_object());
    let mut interp = Interpreter::new();
    interp.set_checker(Rc::new(RedirectingChecker {
        target: stand_in.clone(),
    }));
    eval_with(
        &mut interp,
        vec![
            var_decl(
                "o",
                Some(object(vec![(
                    "paint",
                    func_expr(None, &[], vec![ret(Some(null_lit()))]),
                )])),
            ),
            expr_stmt(call(member(ident("o"), "paint"), vec![])),
        ],
    );
    let entries = interp.collection().entries();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].element.strict_equals(&stand_in));
    assert_eq!(entries[0].kind, "custom");
}

#[test]
fn direct_calls_have_no_receiver_and_skip_the_checker() {
    struct FlagEverything;
    impl Checker for FlagEverything {
        fn dispatch(&self, _request: &CheckRequest<'_>) -> Option<CheckStatus> {
            Some(CheckStatus::new("any"))
        }
    }

    let mut interp = Interpreter::new();
    interp.set_checker(Rc::new(FlagEverything));
    eval_with(
        &mut interp,
        vec![
            func_decl("f", &[], vec![ret(Some(num(1.0)))]),
            expr_stmt(call(ident("f"), vec![])),
        ],
    );
    assert!(interp.collection().is_empty());
}

#[test]
fn collection_survives_take() {
    let (mut interp, _) = dom_interpreter();
    eval_with(
        &mut interp,
        vec![expr_stmt(call(
            member(ident("el"), "setAttribute"),
            vec![str_lit("a"), str_lit("1")],
        ))],
    );
    let taken = interp.take_collection();
    assert_eq!(taken.len(), 1);
    assert!(interp.collection().is_empty());
}
