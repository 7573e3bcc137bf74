//! Control-flow signal register
//!
//! Break, continue and return are not modelled as exceptions or completion
//! records but as a small bitset that statement evaluators read between
//! sibling children. Loops and labelled statements clear the bits they own;
//! return is cleared only by the function-exit protocol and by `try` blocks
//! that observed it.

use crate::value::JsString;

const BREAK: u8 = 0b001;
const CONTINUE: u8 = 0b010;
const RETURN: u8 = 0b100;

/// The interpreter-wide control-flow register: a bitset of pending signals
/// plus the label a pending break/continue is targeting (if any).
#[derive(Debug, Default)]
pub struct FlowState {
    bits: u8,
    label: Option<JsString>,
}

impl FlowState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no signal is pending
    pub fn is_idle(&self) -> bool {
        self.bits == 0
    }

    /// True when any of break/continue/return is pending
    pub fn interrupted(&self) -> bool {
        self.bits != 0
    }

    pub fn has_return(&self) -> bool {
        self.bits & RETURN != 0
    }

    pub fn has_break(&self) -> bool {
        self.bits & BREAK != 0
    }

    pub fn has_continue(&self) -> bool {
        self.bits & CONTINUE != 0
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_break(&mut self, label: Option<JsString>) {
        self.bits |= BREAK;
        if label.is_some() {
            self.label = label;
        }
    }

    pub fn set_continue(&mut self, label: Option<JsString>) {
        self.bits |= CONTINUE;
        if label.is_some() {
            self.label = label;
        }
    }

    pub fn set_return(&mut self) {
        self.bits |= RETURN;
    }

    /// Cleared by function exit and by `try` blocks that saw a return
    pub fn clear_return(&mut self) {
        self.bits &= !RETURN;
    }

    /// Drop every pending signal. Used at the script boundary.
    pub fn reset(&mut self) {
        self.bits = 0;
        self.label = None;
    }

    fn label_matches(&self, label: Option<&str>) -> bool {
        self.label.is_none() || self.label.as_deref() == label
    }

    /// The shared loop-exit decision. Called by every loop after its body,
    /// with the label the loop carries (from an enclosing labelled statement).
    ///
    /// Returns true when the loop must stop iterating. Pending signals owned
    /// by this loop (an unlabelled or matching break/continue) are consumed;
    /// signals targeting an outer construct are left pending so it can see
    /// them. A pending return always terminates the loop and is never
    /// touched here.
    pub fn loop_should_break(&mut self, label: Option<&str>) -> bool {
        if self.bits & RETURN != 0 {
            return true;
        }
        if self.bits & BREAK != 0 {
            if self.label_matches(label) {
                self.bits &= !BREAK;
                self.label = None;
            }
            return true;
        }
        if self.bits & CONTINUE != 0 {
            if self.label_matches(label) {
                self.bits &= !CONTINUE;
                self.label = None;
                return false;
            }
            return true;
        }
        false
    }

    /// Labelled-statement fall-through: a break that named this statement's
    /// label is consumed here once the body has returned. Return is never
    /// cleared by a label.
    pub fn consume_labeled_break(&mut self, label: &str) {
        if self.label.as_deref() == Some(label) {
            self.bits &= !BREAK;
            self.label = None;
        }
    }

    /// A switch consumes an unlabelled break once its case tail has run.
    /// A labelled break escapes to the enclosing labelled statement.
    pub fn finish_switch(&mut self) {
        if self.label.is_none() {
            self.bits &= !BREAK;
        }
    }
}
