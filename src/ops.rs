//! Operator tables
//!
//! String-keyed maps from operator text to implementation, looked up by the
//! expression evaluators. Binary, unary and update operators are pure value
//! functions. Logical operators receive the unevaluated subexpressions plus
//! the interpreter so short-circuiting stays observable. The `delete` unary
//! operator and plain `=` assignment live in the interpreter itself because
//! they need closure and context state.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::ast::Expression;
use crate::error::JsError;
use crate::interpreter::Interpreter;
use crate::value::{JsValue, PropertyKey};

pub type BinaryFn = fn(&JsValue, &JsValue) -> Result<JsValue, JsError>;
pub type UnaryFn = fn(&JsValue) -> Result<JsValue, JsError>;
pub type UpdateFn = fn(&JsValue) -> JsValue;
pub type LogicalFn =
    fn(&mut Interpreter, &Expression, &Expression) -> Result<JsValue, JsError>;

/// The pluggable operator maps consulted by the expression evaluators
pub struct OperatorTables {
    pub binary: FxHashMap<&'static str, BinaryFn>,
    pub unary: FxHashMap<&'static str, UnaryFn>,
    pub update: FxHashMap<&'static str, UpdateFn>,
    pub logical: FxHashMap<&'static str, LogicalFn>,
}

impl Default for OperatorTables {
    fn default() -> Self {
        let mut binary: FxHashMap<&'static str, BinaryFn> = FxHashMap::default();
        binary.insert("+", add);
        binary.insert("-", |l, r| num(l.to_number() - r.to_number()));
        binary.insert("*", |l, r| num(l.to_number() * r.to_number()));
        binary.insert("/", |l, r| num(l.to_number() / r.to_number()));
        binary.insert("%", |l, r| num(l.to_number() % r.to_number()));
        binary.insert("<", |l, r| compare(l, r, |o| o == std::cmp::Ordering::Less));
        binary.insert("<=", |l, r| {
            compare(l, r, |o| o != std::cmp::Ordering::Greater)
        });
        binary.insert(">", |l, r| {
            compare(l, r, |o| o == std::cmp::Ordering::Greater)
        });
        binary.insert(">=", |l, r| compare(l, r, |o| o != std::cmp::Ordering::Less));
        binary.insert("==", |l, r| Ok(JsValue::Boolean(l.loose_equals(r))));
        binary.insert("!=", |l, r| Ok(JsValue::Boolean(!l.loose_equals(r))));
        binary.insert("===", |l, r| Ok(JsValue::Boolean(l.strict_equals(r))));
        binary.insert("!==", |l, r| Ok(JsValue::Boolean(!l.strict_equals(r))));
        binary.insert("&", |l, r| {
            num((to_i32(l) & to_i32(r)) as f64)
        });
        binary.insert("|", |l, r| {
            num((to_i32(l) | to_i32(r)) as f64)
        });
        binary.insert("^", |l, r| {
            num((to_i32(l) ^ to_i32(r)) as f64)
        });
        binary.insert("<<", |l, r| {
            num((to_i32(l) << (to_u32(r) & 0x1f)) as f64)
        });
        binary.insert(">>", |l, r| {
            num((to_i32(l) >> (to_u32(r) & 0x1f)) as f64)
        });
        binary.insert(">>>", |l, r| {
            num((to_u32(l) >> (to_u32(r) & 0x1f)) as f64)
        });
        binary.insert("in", in_operator);
        binary.insert("instanceof", instanceof_operator);

        let mut unary: FxHashMap<&'static str, UnaryFn> = FxHashMap::default();
        unary.insert("-", |v| num(-v.to_number()));
        unary.insert("+", |v| num(v.to_number()));
        unary.insert("!", |v| Ok(JsValue::Boolean(!v.to_boolean())));
        unary.insert("~", |v| num(!to_i32(v) as f64));
        unary.insert("typeof", |v| Ok(JsValue::from(v.type_of())));
        unary.insert("void", |_| Ok(JsValue::Undefined));

        let mut update: FxHashMap<&'static str, UpdateFn> = FxHashMap::default();
        update.insert("++", |v| JsValue::Number(v.to_number() + 1.0));
        update.insert("--", |v| JsValue::Number(v.to_number() - 1.0));

        let mut logical: FxHashMap<&'static str, LogicalFn> = FxHashMap::default();
        logical.insert("&&", logical_and);
        logical.insert("||", logical_or);

        Self {
            binary,
            unary,
            update,
            logical,
        }
    }
}

fn num(n: f64) -> Result<JsValue, JsError> {
    Ok(JsValue::Number(n))
}

fn to_i32(v: &JsValue) -> i32 {
    let n = v.to_number();
    if n.is_nan() || n.is_infinite() {
        0
    } else {
        n as i64 as i32
    }
}

fn to_u32(v: &JsValue) -> u32 {
    to_i32(v) as u32
}

/// `+` concatenates when either side is a string, adds otherwise
fn add(l: &JsValue, r: &JsValue) -> Result<JsValue, JsError> {
    if l.is_string() || r.is_string() {
        let mut s = l.to_js_string().to_string();
        s.push_str(&r.to_js_string());
        Ok(JsValue::from(s))
    } else {
        num(l.to_number() + r.to_number())
    }
}

fn compare(
    l: &JsValue,
    r: &JsValue,
    pick: fn(std::cmp::Ordering) -> bool,
) -> Result<JsValue, JsError> {
    // String-string comparisons are lexicographic, everything else numeric
    let result = match (l, r) {
        (JsValue::String(a), JsValue::String(b)) => Some(a.as_str().cmp(b.as_str())),
        _ => l.to_number().partial_cmp(&r.to_number()),
    };
    Ok(JsValue::Boolean(result.map(pick).unwrap_or(false)))
}

fn in_operator(l: &JsValue, r: &JsValue) -> Result<JsValue, JsError> {
    let JsValue::Object(obj) = r else {
        return Err(JsError::type_error(
            "Cannot use 'in' operator to search in a non-object",
        ));
    };
    let key = PropertyKey::from_value(l);
    Ok(JsValue::Boolean(obj.borrow().get_property(&key).is_some()))
}

/// Walks the left operand's prototype chain looking for the right
/// operand's `prototype` object
fn instanceof_operator(l: &JsValue, r: &JsValue) -> Result<JsValue, JsError> {
    let JsValue::Object(ctor) = r else {
        return Err(JsError::type_error(
            "Right-hand side of 'instanceof' is not callable",
        ));
    };
    if !ctor.borrow().is_callable() {
        return Err(JsError::type_error(
            "Right-hand side of 'instanceof' is not callable",
        ));
    }
    let Some(JsValue::Object(proto)) = ctor.borrow().get_property(&PropertyKey::from("prototype"))
    else {
        return Ok(JsValue::Boolean(false));
    };
    let JsValue::Object(obj) = l else {
        return Ok(JsValue::Boolean(false));
    };
    let mut cursor = obj.borrow().prototype.clone();
    while let Some(link) = cursor {
        if Rc::ptr_eq(&link, &proto) {
            return Ok(JsValue::Boolean(true));
        }
        cursor = link.borrow().prototype.clone();
    }
    Ok(JsValue::Boolean(false))
}

fn logical_and(
    interp: &mut Interpreter,
    left: &Expression,
    right: &Expression,
) -> Result<JsValue, JsError> {
    let l = interp.evaluate(left)?;
    if !l.to_boolean() {
        return Ok(l);
    }
    interp.evaluate(right)
}

fn logical_or(
    interp: &mut Interpreter,
    left: &Expression,
    right: &Expression,
) -> Result<JsValue, JsError> {
    let l = interp.evaluate(left)?;
    if l.to_boolean() {
        return Ok(l);
    }
    interp.evaluate(right)
}
