//! Integration tests for the interpreter, organized by feature
//!
//! The interpreter consumes ESTree nodes from an external parser, so these
//! tests build programs as ESTree JSON, the way an esprima/acorn producer
//! would hand them over.

mod checker;
mod objects;

use domprobe::ast::Program;
use domprobe::{Interpreter, JsValue};
use serde_json::{json, Value};

/// Build a program from ESTree statement nodes
pub fn program(body: Vec<Value>) -> Program {
    serde_json::from_value(json!({"type": "Program", "body": body})).unwrap()
}

/// Evaluate a statement list on a fresh interpreter and return the value
/// of the last completed statement
pub fn eval(body: Vec<Value>) -> JsValue {
    let mut interp = Interpreter::new();
    eval_with(&mut interp, body)
}

/// Evaluate a statement list on the given interpreter
pub fn eval_with(interp: &mut Interpreter, body: Vec<Value>) -> JsValue {
    let result = interp.execute(&program(body), "test.js").unwrap();
    assert!(interp.is_idle(), "interpreter left signals pending");
    result
}

// ============ NODE BUILDERS ============

pub fn num(n: f64) -> Value {
    json!({"type": "Literal", "value": n})
}

pub fn str_lit(s: &str) -> Value {
    json!({"type": "Literal", "value": s})
}

pub fn bool_lit(b: bool) -> Value {
    json!({"type": "Literal", "value": b})
}

pub fn null_lit() -> Value {
    json!({"type": "Literal", "value": null})
}

pub fn ident(name: &str) -> Value {
    json!({"type": "Identifier", "name": name})
}

pub fn this_expr() -> Value {
    json!({"type": "ThisExpression"})
}

pub fn expr_stmt(expression: Value) -> Value {
    json!({"type": "ExpressionStatement", "expression": expression})
}

pub fn block(body: Vec<Value>) -> Value {
    json!({"type": "BlockStatement", "body": body})
}

pub fn var_decl(name: &str, init: Option<Value>) -> Value {
    vars("var", vec![(name, init)])
}

pub fn vars(kind: &str, declarations: Vec<(&str, Option<Value>)>) -> Value {
    let declarations: Vec<Value> = declarations
        .into_iter()
        .map(|(name, init)| {
            json!({
                "type": "VariableDeclarator",
                "id": ident(name),
                "init": init
            })
        })
        .collect();
    json!({"type": "VariableDeclaration", "kind": kind, "declarations": declarations})
}

pub fn func_decl(name: &str, params: &[&str], body: Vec<Value>) -> Value {
    json!({
        "type": "FunctionDeclaration",
        "id": ident(name),
        "params": params.iter().map(|p| ident(p)).collect::<Vec<_>>(),
        "body": block(body)
    })
}

pub fn func_expr(name: Option<&str>, params: &[&str], body: Vec<Value>) -> Value {
    json!({
        "type": "FunctionExpression",
        "id": name.map(ident),
        "params": params.iter().map(|p| ident(p)).collect::<Vec<_>>(),
        "body": block(body)
    })
}

pub fn ret(argument: Option<Value>) -> Value {
    json!({"type": "ReturnStatement", "argument": argument})
}

pub fn binop(operator: &str, left: Value, right: Value) -> Value {
    json!({"type": "BinaryExpression", "operator": operator, "left": left, "right": right})
}

pub fn logical(operator: &str, left: Value, right: Value) -> Value {
    json!({"type": "LogicalExpression", "operator": operator, "left": left, "right": right})
}

pub fn unary(operator: &str, argument: Value) -> Value {
    json!({"type": "UnaryExpression", "operator": operator, "argument": argument})
}

pub fn update(operator: &str, argument: Value, prefix: bool) -> Value {
    json!({"type": "UpdateExpression", "operator": operator, "argument": argument, "prefix": prefix})
}

pub fn assign(operator: &str, left: Value, right: Value) -> Value {
    json!({"type": "AssignmentExpression", "operator": operator, "left": left, "right": right})
}

pub fn cond(test: Value, consequent: Value, alternate: Value) -> Value {
    json!({
        "type": "ConditionalExpression",
        "test": test,
        "consequent": consequent,
        "alternate": alternate
    })
}

pub fn seq(expressions: Vec<Value>) -> Value {
    json!({"type": "SequenceExpression", "expressions": expressions})
}

pub fn member(object: Value, property: &str) -> Value {
    json!({
        "type": "MemberExpression",
        "object": object,
        "property": ident(property),
        "computed": false
    })
}

pub fn member_computed(object: Value, property: Value) -> Value {
    json!({
        "type": "MemberExpression",
        "object": object,
        "property": property,
        "computed": true
    })
}

pub fn call(callee: Value, arguments: Vec<Value>) -> Value {
    json!({"type": "CallExpression", "callee": callee, "arguments": arguments})
}

pub fn new_expr(callee: Value, arguments: Vec<Value>) -> Value {
    json!({"type": "NewExpression", "callee": callee, "arguments": arguments})
}

pub fn array(elements: Vec<Value>) -> Value {
    json!({"type": "ArrayExpression", "elements": elements})
}

pub fn object(properties: Vec<(&str, Value)>) -> Value {
    let properties: Vec<Value> = properties
        .into_iter()
        .map(|(key, value)| {
            json!({"type": "Property", "key": ident(key), "value": value, "kind": "init"})
        })
        .collect();
    json!({"type": "ObjectExpression", "properties": properties})
}

pub fn if_stmt(test: Value, consequent: Value, alternate: Option<Value>) -> Value {
    json!({
        "type": "IfStatement",
        "test": test,
        "consequent": consequent,
        "alternate": alternate
    })
}

pub fn while_stmt(test: Value, body: Value) -> Value {
    json!({"type": "WhileStatement", "test": test, "body": body})
}

pub fn do_while(body: Value, test: Value) -> Value {
    json!({"type": "DoWhileStatement", "body": body, "test": test})
}

pub fn for_stmt(
    init: Option<Value>,
    test: Option<Value>,
    update: Option<Value>,
    body: Value,
) -> Value {
    json!({
        "type": "ForStatement",
        "init": init,
        "test": test,
        "update": update,
        "body": body
    })
}

pub fn for_in(var_name: &str, right: Value, body: Value) -> Value {
    json!({
        "type": "ForInStatement",
        "left": vars("var", vec![(var_name, None)]),
        "right": right,
        "body": body
    })
}

pub fn labeled(name: &str, body: Value) -> Value {
    json!({"type": "LabeledStatement", "label": ident(name), "body": body})
}

pub fn brk(label: Option<&str>) -> Value {
    json!({"type": "BreakStatement", "label": label.map(ident)})
}

pub fn cont(label: Option<&str>) -> Value {
    json!({"type": "ContinueStatement", "label": label.map(ident)})
}

pub fn switch_stmt(discriminant: Value, cases: Vec<(Option<Value>, Vec<Value>)>) -> Value {
    let cases: Vec<Value> = cases
        .into_iter()
        .map(|(test, consequent)| {
            json!({"type": "SwitchCase", "test": test, "consequent": consequent})
        })
        .collect();
    json!({"type": "SwitchStatement", "discriminant": discriminant, "cases": cases})
}

pub fn try_stmt(
    body: Vec<Value>,
    handler: Option<(&str, Vec<Value>)>,
    finalizer: Option<Vec<Value>>,
) -> Value {
    json!({
        "type": "TryStatement",
        "block": block(body),
        "handler": handler.map(|(param, body)| json!({
            "type": "CatchClause",
            "param": ident(param),
            "body": block(body)
        })),
        "finalizer": finalizer.map(block)
    })
}

pub fn throw_stmt(argument: Value) -> Value {
    json!({"type": "ThrowStatement", "argument": argument})
}
