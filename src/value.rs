//! JavaScript value representation
//!
//! The core JsValue type and related structures for representing values at
//! runtime. Host objects (elements, style declarations, token lists,
//! attributes, jQuery-like sets) are ordinary objects carrying a
//! [`HostClass`] marker, so the interpreter can classify them without
//! touching their property storage.

use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::Statement;
use crate::error::JsError;
use crate::scope::ClosureStack;

/// Immutable, cheaply cloneable string
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JsString(Rc<str>);

impl JsString {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for JsString {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for JsString {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for JsString {
    fn from(s: &str) -> Self {
        JsString(Rc::from(s))
    }
}

impl From<String> for JsString {
    fn from(s: String) -> Self {
        JsString(Rc::from(s.as_str()))
    }
}

impl fmt::Display for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A JavaScript value
#[derive(Debug, Clone, Default)]
pub enum JsValue {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(JsString),
    Object(JsObjectRef),
}

impl JsValue {
    pub fn is_null_or_undefined(&self) -> bool {
        matches!(self, JsValue::Null | JsValue::Undefined)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, JsValue::String(_))
    }

    /// Check if this value is callable (a function object)
    pub fn is_callable(&self) -> bool {
        match self {
            JsValue::Object(obj) => obj.borrow().is_callable(),
            _ => false,
        }
    }

    pub fn as_object(&self) -> Option<&JsObjectRef> {
        match self {
            JsValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Host classification of an object value, if any
    pub fn host_class(&self) -> Option<HostClass> {
        match self {
            JsValue::Object(obj) => match obj.borrow().exotic {
                ExoticObject::Host(class) => Some(class),
                _ => None,
            },
            _ => None,
        }
    }

    /// The typeof result for this value
    pub fn type_of(&self) -> &'static str {
        match self {
            JsValue::Undefined => "undefined",
            JsValue::Null => "object", // historical quirk
            JsValue::Boolean(_) => "boolean",
            JsValue::Number(_) => "number",
            JsValue::String(_) => "string",
            JsValue::Object(obj) => {
                if obj.borrow().is_callable() {
                    "function"
                } else {
                    "object"
                }
            }
        }
    }

    /// ToBoolean
    pub fn to_boolean(&self) -> bool {
        match self {
            JsValue::Undefined | JsValue::Null => false,
            JsValue::Boolean(b) => *b,
            JsValue::Number(n) => *n != 0.0 && !n.is_nan(),
            JsValue::String(s) => !s.is_empty(),
            JsValue::Object(_) => true,
        }
    }

    /// ToNumber. Objects convert to NaN; there is no ToPrimitive pass.
    pub fn to_number(&self) -> f64 {
        match self {
            JsValue::Undefined => f64::NAN,
            JsValue::Null => 0.0,
            JsValue::Boolean(true) => 1.0,
            JsValue::Boolean(false) => 0.0,
            JsValue::Number(n) => *n,
            JsValue::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().unwrap_or(f64::NAN)
                }
            }
            JsValue::Object(_) => f64::NAN,
        }
    }

    /// ToString
    pub fn to_js_string(&self) -> JsString {
        match self {
            JsValue::Undefined => "undefined".into(),
            JsValue::Null => "null".into(),
            JsValue::Boolean(true) => "true".into(),
            JsValue::Boolean(false) => "false".into(),
            JsValue::Number(n) => format_number(*n).into(),
            JsValue::String(s) => s.clone(),
            JsValue::Object(obj) => {
                if obj.borrow().is_callable() {
                    "function".into()
                } else {
                    "[object Object]".into()
                }
            }
        }
    }

    /// Strict equality (`===`)
    pub fn strict_equals(&self, other: &JsValue) -> bool {
        match (self, other) {
            (JsValue::Undefined, JsValue::Undefined) => true,
            (JsValue::Null, JsValue::Null) => true,
            (JsValue::Boolean(a), JsValue::Boolean(b)) => a == b,
            (JsValue::Number(a), JsValue::Number(b)) => a == b,
            (JsValue::String(a), JsValue::String(b)) => a == b,
            (JsValue::Object(a), JsValue::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Loose equality (`==`) with the usual primitive coercions. Objects
    /// never coerce; they compare by identity only.
    pub fn loose_equals(&self, other: &JsValue) -> bool {
        match (self, other) {
            (JsValue::Undefined | JsValue::Null, JsValue::Undefined | JsValue::Null) => true,
            (JsValue::Number(_), JsValue::String(_))
            | (JsValue::String(_), JsValue::Number(_))
            | (JsValue::Boolean(_), _)
            | (_, JsValue::Boolean(_)) => {
                let (l, r) = (self.to_number(), other.to_number());
                l == r
            }
            _ => self.strict_equals(other),
        }
    }
}

impl PartialEq for JsValue {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

impl From<bool> for JsValue {
    fn from(b: bool) -> Self {
        JsValue::Boolean(b)
    }
}

impl From<f64> for JsValue {
    fn from(n: f64) -> Self {
        JsValue::Number(n)
    }
}

impl From<&str> for JsValue {
    fn from(s: &str) -> Self {
        JsValue::String(s.into())
    }
}

impl From<String> for JsValue {
    fn from(s: String) -> Self {
        JsValue::String(s.into())
    }
}

/// Format a number the way scripts observe it (integral values print
/// without a fraction)
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == n.trunc() && n.abs() < 1e21 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

pub type JsObjectRef = Rc<RefCell<JsObject>>;

/// A JavaScript object
#[derive(Debug)]
pub struct JsObject {
    /// Prototype link
    pub prototype: Option<JsObjectRef>,
    /// Object properties, in insertion order (drives `for-in`)
    pub properties: IndexMap<PropertyKey, Property>,
    /// Exotic object behavior
    pub exotic: ExoticObject,
}

impl JsObject {
    /// Create a new ordinary object
    pub fn new() -> Self {
        Self {
            prototype: None,
            properties: IndexMap::new(),
            exotic: ExoticObject::Ordinary,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.exotic, ExoticObject::Function(_))
    }

    /// Get a property, searching the prototype chain
    pub fn get_property(&self, key: &PropertyKey) -> Option<JsValue> {
        if let Some(prop) = self.properties.get(key) {
            return Some(prop.value.clone());
        }
        if let Some(ref proto) = self.prototype {
            return proto.borrow().get_property(key);
        }
        None
    }

    /// Set an own property (creating it when absent)
    pub fn set_property(&mut self, key: PropertyKey, value: JsValue) {
        if let Some(prop) = self.properties.get_mut(&key) {
            if prop.writable {
                prop.value = value;
            }
        } else {
            self.properties.insert(key, Property::data(value));
        }
    }

    /// Define a property with explicit attributes
    pub fn define_property(&mut self, key: PropertyKey, prop: Property) {
        self.properties.insert(key, prop);
    }

    pub fn has_own_property(&self, key: &PropertyKey) -> bool {
        self.properties.contains_key(key)
    }

    /// Remove an own property; true unless the property resisted
    pub fn delete_property(&mut self, key: &PropertyKey) -> bool {
        match self.properties.get(key) {
            Some(prop) if !prop.configurable => false,
            _ => {
                self.properties.shift_remove(key);
                true
            }
        }
    }

    /// Own enumerable keys, in insertion order
    pub fn own_enumerable_keys(&self) -> Vec<PropertyKey> {
        self.properties
            .iter()
            .filter(|(_, prop)| prop.enumerable)
            .map(|(key, _)| key.clone())
            .collect()
    }
}

impl Default for JsObject {
    fn default() -> Self {
        Self::new()
    }
}

/// Property key (string or array index)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    String(JsString),
    Index(u32),
}

impl PropertyKey {
    pub fn from_value(value: &JsValue) -> Self {
        match value {
            JsValue::Number(n) => {
                let idx = *n as u32;
                if idx as f64 == *n && *n >= 0.0 {
                    PropertyKey::Index(idx)
                } else {
                    PropertyKey::String(value.to_js_string())
                }
            }
            _ => PropertyKey::from(value.to_js_string()),
        }
    }

    /// The key as a name, the way `for-in` yields it
    pub fn to_js_string(&self) -> JsString {
        match self {
            PropertyKey::String(s) => s.clone(),
            PropertyKey::Index(i) => i.to_string().into(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyKey::String(s) => Some(s.as_str()),
            PropertyKey::Index(_) => None,
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        if let Ok(idx) = s.parse::<u32>() {
            if idx.to_string() == s {
                return PropertyKey::Index(idx);
            }
        }
        PropertyKey::String(s.into())
    }
}

impl From<JsString> for PropertyKey {
    fn from(s: JsString) -> Self {
        PropertyKey::from(s.as_str())
    }
}

impl From<u32> for PropertyKey {
    fn from(idx: u32) -> Self {
        PropertyKey::Index(idx)
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::String(s) => write!(f, "{}", s),
            PropertyKey::Index(i) => write!(f, "{}", i),
        }
    }
}

/// Object property descriptor
#[derive(Debug, Clone)]
pub struct Property {
    pub value: JsValue,
    pub writable: bool,
    pub enumerable: bool,
    pub configurable: bool,
}

impl Property {
    pub fn data(value: JsValue) -> Self {
        Self {
            value,
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }

    pub fn with_attributes(value: JsValue, writable: bool, enumerable: bool, configurable: bool) -> Self {
        Self {
            value,
            writable,
            enumerable,
            configurable,
        }
    }
}

/// Exotic object behavior
#[derive(Debug)]
pub enum ExoticObject {
    Ordinary,
    Array { length: u32 },
    Function(JsFunction),
    Regex { pattern: String, flags: String },
    Host(HostClass),
}

/// Host-object classification used by the checker and by the member-read
/// `parent` attachment rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostClass {
    Element,
    CssStyleDeclaration,
    DomTokenList,
    Attr,
    JQuery,
}

/// A callable value
#[derive(Debug)]
pub enum JsFunction {
    /// Script-defined function
    Interpreted(FunctionAgent),
    /// Native Rust function
    Native(NativeFunction),
}

/// Everything a script-defined function closes over. Built when a function
/// expression or declaration is evaluated; immutable once created.
#[derive(Debug, Clone)]
pub struct FunctionAgent {
    pub name: Option<JsString>,
    /// Formal parameter names
    pub params: Rc<[JsString]>,
    /// Names to pre-bind as undefined on every invocation (`var`s and inner
    /// function declarations of the body)
    pub hoistings: Rc<[JsString]>,
    pub body: Rc<[Statement]>,
    /// The captured closure snapshot. Frame storage is shared with every
    /// invocation of this function value, never with the stack it was
    /// captured from.
    pub closure: ClosureStack,
    pub script_url: JsString,
}

/// Native function signature
pub type NativeFn =
    fn(&mut crate::interpreter::Interpreter, JsValue, &[JsValue]) -> Result<JsValue, JsError>;

/// Native function wrapper
#[derive(Clone)]
pub struct NativeFunction {
    pub name: String,
    pub func: NativeFn,
    pub arity: usize,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

// Helper functions for creating objects

/// Create a new ordinary object
pub fn create_object() -> JsObjectRef {
    Rc::new(RefCell::new(JsObject::new()))
}

/// Create a new array-like object with a non-enumerable `length`
pub fn create_array(elements: Vec<JsValue>) -> JsObjectRef {
    let len = elements.len() as u32;
    let mut obj = JsObject {
        prototype: None,
        properties: IndexMap::new(),
        exotic: ExoticObject::Array { length: len },
    };
    for (i, elem) in elements.into_iter().enumerate() {
        obj.properties
            .insert(PropertyKey::Index(i as u32), Property::data(elem));
    }
    obj.properties.insert(
        PropertyKey::from("length"),
        Property::with_attributes(JsValue::Number(len as f64), true, false, false),
    );
    Rc::new(RefCell::new(obj))
}

/// Append to an array-like object, keeping `length` in step
pub fn array_push(array: &JsObjectRef, value: JsValue) {
    let mut obj = array.borrow_mut();
    let len = match &mut obj.exotic {
        ExoticObject::Array { length } => {
            *length += 1;
            *length - 1
        }
        _ => return,
    };
    obj.properties
        .insert(PropertyKey::Index(len), Property::data(value));
    obj.properties.insert(
        PropertyKey::from("length"),
        Property::with_attributes(JsValue::Number((len + 1) as f64), true, false, false),
    );
}

/// The indexed elements of an array-like object
pub fn array_elements(array: &JsObjectRef) -> Vec<JsValue> {
    let obj = array.borrow();
    let len = match obj.exotic {
        ExoticObject::Array { length } => length,
        _ => 0,
    };
    (0..len)
        .map(|i| {
            obj.get_property(&PropertyKey::Index(i))
                .unwrap_or(JsValue::Undefined)
        })
        .collect()
}

/// Create a function object with the observable `length` (arity) and
/// `name` properties
pub fn create_function(func: JsFunction) -> JsObjectRef {
    let (arity, name) = match &func {
        JsFunction::Interpreted(agent) => (
            agent.params.len(),
            agent.name.as_ref().map(|n| n.to_string()).unwrap_or_default(),
        ),
        JsFunction::Native(native) => (native.arity, native.name.clone()),
    };
    let mut obj = JsObject {
        prototype: None,
        properties: IndexMap::new(),
        exotic: ExoticObject::Function(func),
    };
    obj.properties.insert(
        PropertyKey::from("length"),
        Property::with_attributes(JsValue::Number(arity as f64), false, false, true),
    );
    obj.properties.insert(
        PropertyKey::from("name"),
        Property::with_attributes(JsValue::from(name), false, false, true),
    );
    Rc::new(RefCell::new(obj))
}

/// Create a host object of the given class
pub fn create_host_object(class: HostClass) -> JsObjectRef {
    let mut obj = JsObject::new();
    obj.exotic = ExoticObject::Host(class);
    Rc::new(RefCell::new(obj))
}
