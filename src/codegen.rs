//! Compact expression printing
//!
//! Regenerates a single-line source rendering of an expression node for
//! call-site records. The output favors readability over fidelity: nested
//! compound operands are parenthesized unconditionally rather than by
//! precedence.

use crate::ast::{Expression, FunctionExpr, LiteralValue, ObjectProp};
use crate::value::format_number;

/// Render an expression as compact source text
pub fn expr_to_source(expr: &Expression) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr);
    out
}

fn write_expr(out: &mut String, expr: &Expression) {
    match expr {
        Expression::ThisExpression => out.push_str("this"),
        Expression::Identifier { name } => out.push_str(name),
        Expression::Literal { value, regex, raw } => {
            if let Some(r) = regex {
                out.push('/');
                out.push_str(&r.pattern);
                out.push('/');
                out.push_str(&r.flags);
            } else if let Some(raw) = raw {
                out.push_str(raw);
            } else {
                write_literal(out, value);
            }
        }
        Expression::ArrayExpression { elements } => {
            out.push('[');
            for (i, elem) in elements.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                if let Some(e) = elem {
                    write_expr(out, e);
                }
            }
            out.push(']');
        }
        Expression::ObjectExpression { properties } => {
            out.push('{');
            for (i, prop) in properties.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_prop(out, prop);
            }
            out.push('}');
        }
        Expression::FunctionExpression(func) => write_function(out, func),
        Expression::UnaryExpression { operator, argument } => {
            out.push_str(operator);
            if operator.chars().all(|c| c.is_ascii_alphabetic()) {
                out.push(' ');
            }
            write_operand(out, argument);
        }
        Expression::UpdateExpression {
            operator,
            argument,
            prefix,
        } => {
            if *prefix {
                out.push_str(operator);
                write_operand(out, argument);
            } else {
                write_operand(out, argument);
                out.push_str(operator);
            }
        }
        Expression::BinaryExpression {
            operator,
            left,
            right,
        }
        | Expression::LogicalExpression {
            operator,
            left,
            right,
        } => {
            write_operand(out, left);
            out.push(' ');
            out.push_str(operator);
            out.push(' ');
            write_operand(out, right);
        }
        Expression::AssignmentExpression {
            operator,
            left,
            right,
        } => {
            write_expr(out, left);
            out.push(' ');
            out.push_str(operator);
            out.push(' ');
            write_expr(out, right);
        }
        Expression::MemberExpression {
            object,
            property,
            computed,
        } => {
            write_operand(out, object);
            if *computed {
                out.push('[');
                write_expr(out, property);
                out.push(']');
            } else {
                out.push('.');
                write_expr(out, property);
            }
        }
        Expression::ConditionalExpression {
            test,
            consequent,
            alternate,
        } => {
            write_operand(out, test);
            out.push_str(" ? ");
            write_operand(out, consequent);
            out.push_str(" : ");
            write_operand(out, alternate);
        }
        Expression::CallExpression { callee, arguments } => {
            write_operand(out, callee);
            write_args(out, arguments);
        }
        Expression::NewExpression { callee, arguments } => {
            out.push_str("new ");
            write_operand(out, callee);
            write_args(out, arguments);
        }
        Expression::SequenceExpression { expressions } => {
            for (i, e) in expressions.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(out, e);
            }
        }
    }
}

/// Parenthesize compound operands so the rendering stays unambiguous
fn write_operand(out: &mut String, expr: &Expression) {
    let compound = matches!(
        expr,
        Expression::BinaryExpression { .. }
            | Expression::LogicalExpression { .. }
            | Expression::AssignmentExpression { .. }
            | Expression::ConditionalExpression { .. }
            | Expression::SequenceExpression { .. }
            | Expression::FunctionExpression(_)
    );
    if compound {
        out.push('(');
        write_expr(out, expr);
        out.push(')');
    } else {
        write_expr(out, expr);
    }
}

fn write_args(out: &mut String, args: &[Expression]) {
    out.push('(');
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_expr(out, arg);
    }
    out.push(')');
}

fn write_prop(out: &mut String, prop: &ObjectProp) {
    if prop.computed {
        out.push('[');
        write_expr(out, &prop.key);
        out.push(']');
    } else {
        write_expr(out, &prop.key);
    }
    out.push_str(": ");
    write_expr(out, &prop.value);
}

fn write_function(out: &mut String, func: &FunctionExpr) {
    out.push_str("function ");
    if let Some(id) = &func.id {
        out.push_str(&id.name);
    }
    out.push('(');
    for (i, param) in func.params.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&param.name);
    }
    out.push_str(") { ... }");
}

fn write_literal(out: &mut String, value: &LiteralValue) {
    match value {
        LiteralValue::Null => out.push_str("null"),
        LiteralValue::Boolean(true) => out.push_str("true"),
        LiteralValue::Boolean(false) => out.push_str("false"),
        LiteralValue::Number(n) => out.push_str(&format_number(*n)),
        LiteralValue::String(s) => {
            out.push('"');
            for c in s.chars() {
                match c {
                    '"' => out.push_str("\\\""),
                    '\\' => out.push_str("\\\\"),
                    '\n' => out.push_str("\\n"),
                    _ => out.push(c),
                }
            }
            out.push('"');
        }
        LiteralValue::Opaque(_) => out.push_str("{}"),
    }
}
