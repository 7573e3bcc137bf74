//! Hoisting pre-pass
//!
//! Collects the names a statement list brings into scope before any of its
//! statements run: `var` declarations and function declarations, recursing
//! into every statement position that stays in the same (function-level)
//! scope. Initializers are not evaluated here.

use crate::ast::{ForInLeft, ForInit, Statement, VariableKind};
use crate::value::JsString;

/// The names hoisted by a statement list, in first-appearance order
pub fn hoisted_names(body: &[Statement]) -> Vec<JsString> {
    let mut names: Vec<JsString> = Vec::new();
    collect(body, &mut names);
    names
}

fn push_name(names: &mut Vec<JsString>, name: &str) {
    if !names.iter().any(|n| n.as_str() == name) {
        names.push(name.into());
    }
}

fn collect(body: &[Statement], names: &mut Vec<JsString>) {
    for stmt in body {
        collect_one(stmt, names);
    }
}

fn collect_one(stmt: &Statement, names: &mut Vec<JsString>) {
    match stmt {
        Statement::FunctionDeclaration(decl) => push_name(names, &decl.id.name),
        Statement::VariableDeclaration(decl) => {
            if decl.kind == VariableKind::Var {
                for declarator in &decl.declarations {
                    push_name(names, &declarator.id.name);
                }
            }
        }
        Statement::BlockStatement { body } => collect(body, names),
        Statement::IfStatement {
            consequent,
            alternate,
            ..
        } => {
            collect_one(consequent, names);
            if let Some(alt) = alternate {
                collect_one(alt, names);
            }
        }
        Statement::SwitchStatement { cases, .. } => {
            for case in cases {
                collect(&case.consequent, names);
            }
        }
        Statement::TryStatement {
            block,
            handler,
            finalizer,
        } => {
            collect(&block.body, names);
            if let Some(h) = handler {
                collect(&h.body.body, names);
            }
            if let Some(f) = finalizer {
                collect(&f.body, names);
            }
        }
        Statement::ForStatement { init, body, .. } => {
            if let Some(ForInit::Declaration(decl)) = init {
                if decl.kind == VariableKind::Var {
                    for declarator in &decl.declarations {
                        push_name(names, &declarator.id.name);
                    }
                }
            }
            collect_one(body, names);
        }
        Statement::ForInStatement { left, body, .. } => {
            if let ForInLeft::Declaration(decl) = left {
                if decl.kind == VariableKind::Var {
                    for declarator in &decl.declarations {
                        push_name(names, &declarator.id.name);
                    }
                }
            }
            collect_one(body, names);
        }
        Statement::WhileStatement { body, .. } | Statement::DoWhileStatement { body, .. } => {
            collect_one(body, names);
        }
        Statement::LabeledStatement { body, .. } => collect_one(body, names),
        _ => {}
    }
}
