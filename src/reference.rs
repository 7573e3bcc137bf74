//! The reference layer
//!
//! Assignment, `delete`, update and call evaluation all address a location
//! rather than a value. A [`Place`] is a writable slot: a variable on the
//! closure stack or a member of an evaluated object. A [`CallTarget`] is a
//! callable reference: a directly evaluated function or a method slot on a
//! receiver. [`SiteInfo`] is attached to assignments and calls only, so the
//! checker can report where an operation came from.

use crate::value::{JsString, JsValue, PropertyKey};

/// Call-site metadata recorded alongside checker hits
#[derive(Debug, Clone, PartialEq)]
pub struct SiteInfo {
    /// Regenerated source text of the assignment or call expression
    pub code: String,
    /// URL of the script the site belongs to
    pub script_url: JsString,
}

/// A writable location
#[derive(Debug, Clone)]
pub enum Place {
    /// A variable reference; resolved against the closure stack
    Var(JsString),
    /// A member slot on an already-evaluated object
    Member { object: JsValue, key: PropertyKey },
}

/// A callable reference, distinguished from a plain member read so the
/// execute step can choose method-call over member-read
#[derive(Debug, Clone)]
pub enum CallTarget {
    /// The callee expression evaluated to a function directly
    Direct(JsValue),
    /// A method slot: the function is fetched from `object[key]` and the
    /// object becomes the receiver
    Method { object: JsValue, key: PropertyKey },
}
