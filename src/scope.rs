//! Lexical environments
//!
//! Variable scope is function-level only: a frame is pushed on function
//! entry and popped (by environment restoration) on exit. Blocks do not
//! open frames. Closures capture an independent snapshot of the whole stack
//! at function-value creation; invoking the function installs a shallow
//! handle to that snapshot, so state written by one call of a closure is
//! visible to its next call while staying invisible to the live stack the
//! snapshot was taken from.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::value::{JsString, JsValue};

/// One frame of bindings, shared between a live stack and the call
/// environments derived from a captured snapshot.
pub type Frame = Rc<RefCell<FxHashMap<JsString, JsValue>>>;

fn new_frame() -> Frame {
    Rc::new(RefCell::new(FxHashMap::default()))
}

/// A stack of frames mapping identifier to value.
///
/// `Clone` is shallow: the clone shares frame storage with the original.
/// Use [`ClosureStack::capture`] for the independent snapshot a closure
/// must hold.
#[derive(Debug, Clone)]
pub struct ClosureStack {
    frames: Vec<Frame>,
}

impl ClosureStack {
    /// A fresh stack with a single (outermost) frame
    pub fn new() -> Self {
        Self {
            frames: vec![new_frame()],
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push_frame(&mut self) {
        self.frames.push(new_frame());
    }

    pub fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Handle to the innermost frame
    pub fn innermost(&self) -> Frame {
        Rc::clone(self.frames.last().expect("closure stack is never empty"))
    }

    /// Define `name` on the innermost frame, shadowing any outer binding
    pub fn define(&self, name: impl Into<JsString>, value: JsValue) {
        self.innermost().borrow_mut().insert(name.into(), value);
    }

    /// Walk outward until a frame defines `name` and write there, falling
    /// back to the outermost frame when none does
    pub fn update(&self, name: &str, value: JsValue) {
        for frame in self.frames.iter().rev() {
            if frame.borrow().contains_key(name) {
                frame.borrow_mut().insert(name.into(), value);
                return;
            }
        }
        self.frames[0].borrow_mut().insert(name.into(), value);
    }

    /// Lexical lookup, innermost frame first
    pub fn get(&self, name: &str) -> Option<JsValue> {
        for frame in self.frames.iter().rev() {
            if let Some(value) = frame.borrow().get(name) {
                return Some(value.clone());
            }
        }
        None
    }

    /// True if any frame defines `name`
    pub fn has(&self, name: &str) -> bool {
        self.frames.iter().any(|f| f.borrow().contains_key(name))
    }

    /// Snapshot the stack for capture by a closure. Every frame is cloned,
    /// so later writes and pops on the live stack are invisible to the
    /// snapshot (and vice versa).
    pub fn capture(&self) -> ClosureStack {
        ClosureStack {
            frames: self
                .frames
                .iter()
                .map(|f| Rc::new(RefCell::new(f.borrow().clone())))
                .collect(),
        }
    }
}

impl Default for ClosureStack {
    fn default() -> Self {
        Self::new()
    }
}
