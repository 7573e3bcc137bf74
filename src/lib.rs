//! Tree-walking interpreter for ESTree JavaScript ASTs
//!
//! Executes a parsed program against a browser-like host context while a
//! pluggable checker observes member assignments and method calls,
//! recording DOM-mutating operations into an append-only collection. The
//! AST is supplied externally (any ESTree emitter works, typically as
//! JSON); the interpreter models hoisting, closures, `this`, labelled
//! control flow, exceptions, `for-in`, short-circuit logic, computed
//! member access, `delete` and `arguments` without modifying the host
//! objects it observes.
//!
//! # Example
//!
//! ```
//! use domprobe::{Interpreter, JsValue};
//! use serde_json::json;
//!
//! let ast = json!({
//!     "type": "Program",
//!     "body": [
//!         {"type": "VariableDeclaration", "kind": "var", "declarations": [{
//!             "type": "VariableDeclarator",
//!             "id": {"type": "Identifier", "name": "a"},
//!             "init": {"type": "Literal", "value": 1}
//!         }]},
//!         {"type": "ExpressionStatement", "expression": {
//!             "type": "AssignmentExpression",
//!             "operator": "+=",
//!             "left": {"type": "Identifier", "name": "a"},
//!             "right": {"type": "Literal", "value": 2}
//!         }}
//!     ]
//! });
//! let program = serde_json::from_value(ast).unwrap();
//!
//! let mut interp = Interpreter::new();
//! let result = interp.execute(&program, "inline.js").unwrap();
//! assert_eq!(result, JsValue::Number(3.0));
//! ```

pub mod ast;
pub mod checker;
pub mod codegen;
pub mod error;
pub mod flow;
pub mod hoist;
pub mod host;
pub mod interpreter;
pub mod ops;
pub mod reference;
pub mod scope;
pub mod value;

pub use checker::{CheckRequest, CheckStatus, Checker, Collection, CollectionEntry, DomMutationChecker};
pub use error::JsError;
pub use interpreter::Interpreter;
pub use reference::{CallTarget, Place, SiteInfo};
pub use value::{HostClass, JsObject, JsObjectRef, JsString, JsValue, PropertyKey};
