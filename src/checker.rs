//! Call-site checking and the artifact collection
//!
//! A checker classifies a call site (or member assignment) by its receiver
//! and method key. A non-`None` status makes the interpreter record one
//! collection entry per affected element. The interpreter treats the status
//! opaquely apart from its `kind` and optional `target`.

use crate::reference::SiteInfo;
use crate::value::{HostClass, JsValue, PropertyKey};

/// What the checker sees for one site: the host global, the receiver the
/// method or property lives on, and the accessed key
#[derive(Debug)]
pub struct CheckRequest<'a> {
    pub context: &'a JsValue,
    pub caller: &'a JsValue,
    pub callee: &'a PropertyKey,
}

/// A positive verdict: the operation kind, and optionally the object the
/// record should be attributed to instead of the receiver
#[derive(Debug, Clone)]
pub struct CheckStatus {
    pub kind: String,
    pub target: Option<JsValue>,
}

impl CheckStatus {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            target: None,
        }
    }

    pub fn with_target(kind: impl Into<String>, target: JsValue) -> Self {
        Self {
            kind: kind.into(),
            target: Some(target),
        }
    }
}

/// External decision procedure consulted at every checkable site
pub trait Checker {
    fn dispatch(&self, request: &CheckRequest<'_>) -> Option<CheckStatus>;
}

/// One recorded operation
#[derive(Debug, Clone)]
pub struct CollectionEntry {
    /// The affected host element
    pub element: JsValue,
    /// The status kind reported by the checker
    pub kind: String,
    /// Call-site metadata, when the site carried any
    pub info: Option<SiteInfo>,
}

/// Append-only store of recorded operations
#[derive(Debug, Default)]
pub struct Collection {
    entries: Vec<CollectionEntry>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, element: JsValue, kind: String, info: Option<SiteInfo>) {
        tracing::debug!(kind = %kind, "collection append");
        self.entries.push(CollectionEntry {
            element,
            kind,
            info,
        });
    }

    pub fn entries(&self) -> &[CollectionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries recorded against one specific element (object identity)
    pub fn entries_for<'a>(
        &'a self,
        element: &'a JsValue,
    ) -> impl Iterator<Item = &'a CollectionEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.element.strict_equals(element))
    }
}

/// The stock checker: flags the classic DOM-mutation surface.
///
/// Receivers are classified by host class; the key then selects the
/// operation kind. Sites on non-host receivers are never flagged.
#[derive(Debug, Default)]
pub struct DomMutationChecker;

impl Checker for DomMutationChecker {
    fn dispatch(&self, request: &CheckRequest<'_>) -> Option<CheckStatus> {
        let key = request.callee.as_str()?;
        match request.caller.host_class()? {
            HostClass::CssStyleDeclaration => Some(CheckStatus::new("style")),
            HostClass::DomTokenList => match key {
                "add" | "remove" | "toggle" => Some(CheckStatus::new("class")),
                _ => None,
            },
            HostClass::Attr => match key {
                "value" => Some(CheckStatus::new("attribute")),
                _ => None,
            },
            HostClass::Element => match key {
                "setAttribute" | "removeAttribute" => Some(CheckStatus::new("attribute")),
                "appendChild" | "insertBefore" | "replaceChild" | "removeChild" => {
                    Some(CheckStatus::new("dom"))
                }
                "innerHTML" | "outerHTML" => Some(CheckStatus::new("html")),
                _ => None,
            },
            HostClass::JQuery => match key {
                "attr" | "removeAttr" => Some(CheckStatus::new("attribute")),
                "css" => Some(CheckStatus::new("style")),
                "addClass" | "removeClass" | "toggleClass" => Some(CheckStatus::new("class")),
                "html" | "append" | "prepend" | "remove" => Some(CheckStatus::new("dom")),
                _ => None,
            },
        }
    }
}
