//! Browser-like host objects
//!
//! The interpreter runs scripts against a host context it does not own.
//! This module builds the usual suspects of that context: elements with
//! `style`, `classList` and attribute methods, attribute nodes, a minimal
//! `document`, and a jQuery-like array wrapper. Host methods are native
//! functions installed as ordinary properties; the interpreter calls them
//! through the same protocol as script-defined functions.

use crate::error::JsError;
use crate::interpreter::Interpreter;
use crate::value::{
    array_elements, array_push, create_array, create_function, create_host_object, create_object,
    ExoticObject, HostClass, JsFunction, JsObjectRef, JsValue, NativeFunction, Property,
    PropertyKey,
};

fn install_native(obj: &JsObjectRef, name: &'static str, arity: usize, func: crate::value::NativeFn) {
    let f = create_function(JsFunction::Native(NativeFunction {
        name: name.to_string(),
        func,
        arity,
    }));
    obj.borrow_mut().define_property(
        PropertyKey::from(name),
        Property::with_attributes(JsValue::Object(f), true, false, true),
    );
}

fn this_object(this: &JsValue, what: &str) -> Result<JsObjectRef, JsError> {
    this.as_object()
        .cloned()
        .ok_or_else(|| JsError::type_error(format!("{} called on a non-object receiver", what)))
}

fn arg(args: &[JsValue], i: usize) -> JsValue {
    args.get(i).cloned().unwrap_or(JsValue::Undefined)
}

// ============ ELEMENTS ============

/// Create an element with `style`, `classList`, an empty attribute map and
/// the usual mutation methods
pub fn create_element(tag: &str) -> JsObjectRef {
    let element = create_host_object(HostClass::Element);
    {
        let mut el = element.borrow_mut();
        el.set_property(
            PropertyKey::from("tagName"),
            JsValue::from(tag.to_uppercase()),
        );
        el.set_property(
            PropertyKey::from("style"),
            JsValue::Object(create_host_object(HostClass::CssStyleDeclaration)),
        );
        el.set_property(
            PropertyKey::from("classList"),
            JsValue::Object(create_token_list()),
        );
        el.set_property(PropertyKey::from("attributes"), JsValue::Object(create_object()));
        el.set_property(
            PropertyKey::from("childNodes"),
            JsValue::Object(create_array(Vec::new())),
        );
    }
    install_native(&element, "setAttribute", 2, element_set_attribute);
    install_native(&element, "getAttribute", 1, element_get_attribute);
    install_native(&element, "getAttributeNode", 1, element_get_attribute_node);
    install_native(&element, "removeAttribute", 1, element_remove_attribute);
    install_native(&element, "appendChild", 1, element_append_child);
    install_native(&element, "removeChild", 1, element_remove_child);
    element
}

fn attributes_of(element: &JsObjectRef) -> Result<JsObjectRef, JsError> {
    match element.borrow().get_property(&PropertyKey::from("attributes")) {
        Some(JsValue::Object(attrs)) => Ok(attrs),
        _ => Err(JsError::type_error("element has no attribute map")),
    }
}

fn element_set_attribute(
    _interp: &mut Interpreter,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let element = this_object(&this, "setAttribute")?;
    let name = arg(args, 0).to_js_string();
    let value = arg(args, 1).to_js_string();
    let attrs = attributes_of(&element)?;
    let key = PropertyKey::from(name.as_str());
    let existing = attrs.borrow().get_property(&key);
    match existing {
        Some(JsValue::Object(attr)) => {
            attr.borrow_mut()
                .set_property(PropertyKey::from("value"), JsValue::String(value));
        }
        _ => {
            let attr = create_attr(name.as_str(), value.as_str(), &this);
            attrs.borrow_mut().set_property(key, JsValue::Object(attr));
        }
    }
    Ok(JsValue::Undefined)
}

fn element_get_attribute(
    _interp: &mut Interpreter,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let element = this_object(&this, "getAttribute")?;
    let name = arg(args, 0).to_js_string();
    let attrs = attributes_of(&element)?;
    let attr = attrs.borrow().get_property(&PropertyKey::from(name.as_str()));
    match attr {
        Some(JsValue::Object(attr)) => Ok(attr
            .borrow()
            .get_property(&PropertyKey::from("value"))
            .unwrap_or(JsValue::Null)),
        _ => Ok(JsValue::Null),
    }
}

fn element_get_attribute_node(
    _interp: &mut Interpreter,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let element = this_object(&this, "getAttributeNode")?;
    let name = arg(args, 0).to_js_string();
    let attrs = attributes_of(&element)?;
    let attr = attrs.borrow().get_property(&PropertyKey::from(name.as_str()));
    Ok(attr.unwrap_or(JsValue::Null))
}

fn element_remove_attribute(
    _interp: &mut Interpreter,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let element = this_object(&this, "removeAttribute")?;
    let name = arg(args, 0).to_js_string();
    let attrs = attributes_of(&element)?;
    attrs
        .borrow_mut()
        .delete_property(&PropertyKey::from(name.as_str()));
    Ok(JsValue::Undefined)
}

fn element_append_child(
    _interp: &mut Interpreter,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let element = this_object(&this, "appendChild")?;
    let child = arg(args, 0);
    let child_nodes = element.borrow().get_property(&PropertyKey::from("childNodes"));
    match child_nodes {
        Some(JsValue::Object(children)) => {
            array_push(&children, child.clone());
            Ok(child)
        }
        _ => Err(JsError::type_error("element has no child list")),
    }
}

fn element_remove_child(
    _interp: &mut Interpreter,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let element = this_object(&this, "removeChild")?;
    let child = arg(args, 0);
    let children = match element.borrow().get_property(&PropertyKey::from("childNodes")) {
        Some(JsValue::Object(children)) => children,
        _ => return Err(JsError::type_error("element has no child list")),
    };
    let remaining: Vec<JsValue> = array_elements(&children)
        .into_iter()
        .filter(|c| !c.strict_equals(&child))
        .collect();
    rewrite_array(&children, remaining);
    Ok(child)
}

/// Replace an array-like object's indexed contents in place
fn rewrite_array(array: &JsObjectRef, elements: Vec<JsValue>) {
    let mut obj = array.borrow_mut();
    let old_len = match obj.exotic {
        ExoticObject::Array { length } => length,
        _ => return,
    };
    for i in 0..old_len {
        obj.properties.shift_remove(&PropertyKey::Index(i));
    }
    let len = elements.len() as u32;
    for (i, elem) in elements.into_iter().enumerate() {
        obj.properties
            .insert(PropertyKey::Index(i as u32), Property::data(elem));
    }
    obj.exotic = ExoticObject::Array { length: len };
    obj.properties.insert(
        PropertyKey::from("length"),
        Property::with_attributes(JsValue::Number(len as f64), true, false, false),
    );
}

// ============ ATTRIBUTES ============

/// Create an attribute node bound to its owner element
pub fn create_attr(name: &str, value: &str, owner: &JsValue) -> JsObjectRef {
    let attr = create_host_object(HostClass::Attr);
    {
        let mut a = attr.borrow_mut();
        a.set_property(PropertyKey::from("name"), JsValue::from(name));
        a.set_property(PropertyKey::from("value"), JsValue::from(value));
        a.set_property(PropertyKey::from("ownerElement"), owner.clone());
    }
    attr
}

// ============ TOKEN LISTS ============

fn create_token_list() -> JsObjectRef {
    let list = create_host_object(HostClass::DomTokenList);
    list.borrow_mut().set_property(
        PropertyKey::from("length"),
        JsValue::Number(0.0),
    );
    install_native(&list, "add", 1, token_list_add);
    install_native(&list, "remove", 1, token_list_remove);
    install_native(&list, "toggle", 1, token_list_toggle);
    install_native(&list, "contains", 1, token_list_contains);
    list
}

fn tokens_of(list: &JsObjectRef) -> Vec<JsValue> {
    let obj = list.borrow();
    let len = obj
        .get_property(&PropertyKey::from("length"))
        .map(|v| v.to_number() as u32)
        .unwrap_or(0);
    (0..len)
        .filter_map(|i| obj.get_property(&PropertyKey::Index(i)))
        .collect()
}

fn store_tokens(list: &JsObjectRef, tokens: Vec<JsValue>) {
    let mut obj = list.borrow_mut();
    let old_len = obj
        .get_property(&PropertyKey::from("length"))
        .map(|v| v.to_number() as u32)
        .unwrap_or(0);
    for i in 0..old_len {
        obj.properties.shift_remove(&PropertyKey::Index(i));
    }
    let len = tokens.len() as f64;
    for (i, token) in tokens.into_iter().enumerate() {
        obj.set_property(PropertyKey::Index(i as u32), token);
    }
    obj.set_property(PropertyKey::from("length"), JsValue::Number(len));
}

fn token_list_has(list: &JsObjectRef, token: &JsValue) -> bool {
    tokens_of(list).iter().any(|t| t.strict_equals(token))
}

fn token_list_add(
    _interp: &mut Interpreter,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let list = this_object(&this, "classList.add")?;
    for a in args {
        let token = JsValue::String(a.to_js_string());
        if !token_list_has(&list, &token) {
            let mut tokens = tokens_of(&list);
            tokens.push(token);
            store_tokens(&list, tokens);
        }
    }
    Ok(JsValue::Undefined)
}

fn token_list_remove(
    _interp: &mut Interpreter,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let list = this_object(&this, "classList.remove")?;
    for a in args {
        let token = JsValue::String(a.to_js_string());
        let tokens: Vec<JsValue> = tokens_of(&list)
            .into_iter()
            .filter(|t| !t.strict_equals(&token))
            .collect();
        store_tokens(&list, tokens);
    }
    Ok(JsValue::Undefined)
}

fn token_list_toggle(
    interp: &mut Interpreter,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let list = this_object(&this, "classList.toggle")?;
    let token = JsValue::String(arg(args, 0).to_js_string());
    if token_list_has(&list, &token) {
        token_list_remove(interp, this, args)?;
        Ok(JsValue::Boolean(false))
    } else {
        token_list_add(interp, this, args)?;
        Ok(JsValue::Boolean(true))
    }
}

fn token_list_contains(
    _interp: &mut Interpreter,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let list = this_object(&this, "classList.contains")?;
    let token = JsValue::String(arg(args, 0).to_js_string());
    Ok(JsValue::Boolean(token_list_has(&list, &token)))
}

// ============ JQUERY-LIKE SETS ============

/// Wrap elements into a jQuery-like array-like set with the usual
/// mutation helpers
pub fn create_jquery_set(elements: Vec<JsValue>) -> JsObjectRef {
    let set = create_host_object(HostClass::JQuery);
    {
        let mut s = set.borrow_mut();
        let len = elements.len() as f64;
        for (i, el) in elements.into_iter().enumerate() {
            s.set_property(PropertyKey::Index(i as u32), el);
        }
        s.define_property(
            PropertyKey::from("length"),
            Property::with_attributes(JsValue::Number(len), true, false, false),
        );
    }
    install_native(&set, "get", 0, jquery_get);
    install_native(&set, "attr", 2, jquery_attr);
    install_native(&set, "css", 2, jquery_css);
    install_native(&set, "addClass", 1, jquery_add_class);
    set
}

/// The elements of a jQuery-like set, in index order
pub fn jquery_elements(set: &JsObjectRef) -> Vec<JsValue> {
    let obj = set.borrow();
    let len = obj
        .get_property(&PropertyKey::from("length"))
        .map(|v| v.to_number() as u32)
        .unwrap_or(0);
    (0..len)
        .filter_map(|i| obj.get_property(&PropertyKey::Index(i)))
        .collect()
}

fn jquery_get(
    _interp: &mut Interpreter,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let set = this_object(&this, "get")?;
    let elements = jquery_elements(&set);
    match args.first() {
        Some(index) => {
            let i = index.to_number() as usize;
            Ok(elements.get(i).cloned().unwrap_or(JsValue::Undefined))
        }
        None => Ok(JsValue::Object(create_array(elements))),
    }
}

fn jquery_attr(
    interp: &mut Interpreter,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let set = this_object(&this, "attr")?;
    for el in jquery_elements(&set) {
        element_set_attribute(interp, el, args)?;
    }
    Ok(this)
}

fn jquery_css(
    _interp: &mut Interpreter,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let set = this_object(&this, "css")?;
    let name = arg(args, 0).to_js_string();
    let value = arg(args, 1);
    for el in jquery_elements(&set) {
        if let Some(JsValue::Object(style)) = el
            .as_object()
            .and_then(|o| o.borrow().get_property(&PropertyKey::from("style")))
        {
            style
                .borrow_mut()
                .set_property(PropertyKey::from(name.as_str()), value.clone());
        }
    }
    Ok(this)
}

fn jquery_add_class(
    interp: &mut Interpreter,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let set = this_object(&this, "addClass")?;
    for el in jquery_elements(&set) {
        if let Some(list) = el
            .as_object()
            .and_then(|o| o.borrow().get_property(&PropertyKey::from("classList")))
        {
            token_list_add(interp, list, args)?;
        }
    }
    Ok(this)
}

// ============ DOCUMENT AND CONTEXT ============

fn document_create_element(
    _interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let tag = arg(args, 0).to_js_string();
    Ok(JsValue::Object(create_element(tag.as_str())))
}

fn jquery_constructor(
    _interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let elements: Vec<JsValue> = args
        .iter()
        .filter(|a| a.as_object().is_some())
        .cloned()
        .collect();
    Ok(JsValue::Object(create_jquery_set(elements)))
}

/// Build a browser-like global: `document` with `createElement` and a
/// `body` element, plus a jQuery-like wrapper under `jQuery` and `$`
pub fn browser_context() -> JsObjectRef {
    let context = create_object();
    let document = create_object();
    install_native(&document, "createElement", 1, document_create_element);
    document.borrow_mut().set_property(
        PropertyKey::from("body"),
        JsValue::Object(create_element("body")),
    );
    context
        .borrow_mut()
        .set_property(PropertyKey::from("document"), JsValue::Object(document));

    let jquery = create_function(JsFunction::Native(NativeFunction {
        name: "jQuery".to_string(),
        func: jquery_constructor,
        arity: 1,
    }));
    context
        .borrow_mut()
        .set_property(PropertyKey::from("jQuery"), JsValue::Object(jquery.clone()));
    context
        .borrow_mut()
        .set_property(PropertyKey::from("$"), JsValue::Object(jquery));
    context
}
