//! Host value model.
//!
//! The engine validates loosely-typed values of the kind a JSON-ish host
//! language hands around: primitives plus shared, mutable containers.
//!
//! Design goals:
//! - Containers are reference types (`Rc<RefCell<..>>`) so cyclic data can be
//!   expressed and identity is observable; the cycle machinery keys on it.
//! - Objects keep insertion order and may carry a class name.
//! - `PartialEq` is deep and tolerates cycles; `to_json` refuses them.
pub mod number;
pub mod preview;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use ordered_float::OrderedFloat;

use crate::error::ValueError;

pub use number::{format_number, to_number};
pub use preview::preview;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    BigInt(i128),
    String(String),
    Symbol(Symbol),
    Function(Function),
    Array(Array),
    Object(Object),
}

/// Opaque identity handle with a description.
#[derive(Clone)]
pub struct Symbol(Rc<str>);

/// Opaque callable handle; only its identity and name are observable.
#[derive(Clone)]
pub struct Function(Rc<str>);

#[derive(Clone)]
pub struct Array(Rc<RefCell<Vec<Value>>>);

#[derive(Clone)]
pub struct Object(Rc<ObjectCell>);

struct ObjectCell {
    class: Option<String>,
    entries: RefCell<IndexMap<String, Value>>,
}

/// The subset of values a literal schema can pin down.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    Undefined,
    Null,
    Bool(bool),
    Number(OrderedFloat<f64>),
    String(String),
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Value {
    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(Array::new(items.into_iter().collect()))
    }
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        let object = Object::new();
        for (key, value) in entries {
            object.insert(key, value);
        }
        Value::Object(object)
    }
    /// An object whose prototype is a named class rather than a plain mapping.
    pub fn instance<K: Into<String>>(
        class: impl Into<String>,
        entries: impl IntoIterator<Item = (K, Value)>,
    ) -> Self {
        let object = Object::with_class(class);
        for (key, value) in entries {
            object.insert(key, value);
        }
        Value::Object(object)
    }
    pub fn symbol(description: &str) -> Self {
        Value::Symbol(Symbol(Rc::from(description)))
    }
    pub fn function(name: &str) -> Self {
        Value::Function(Function(Rc::from(name)))
    }

    /// The host `typeof` of this value.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Function(_) => "function",
            Value::Array(_) | Value::Object(_) => "object",
        }
    }

    /// Arrays and objects: the values that can hold properties.
    pub fn is_object_like(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Object(_))
    }

    /// Address of the shared allocation, for values compared by reference.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::Array(array) => Some(array.id()),
            Value::Object(object) => Some(object.id()),
            Value::Function(function) => Some(Rc::as_ptr(&function.0) as *const u8 as usize),
            Value::Symbol(symbol) => Some(Rc::as_ptr(&symbol.0) as *const u8 as usize),
            _ => None,
        }
    }

    /// Host `===`: primitives by value (NaN never equal), the rest by identity.
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            _ => match (self.identity(), other.identity()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    /// Property lookup; missing properties read as `undefined`.
    pub fn property(&self, key: &str) -> Value {
        match self {
            Value::Object(object) => object.get(key).unwrap_or(Value::Undefined),
            Value::Array(array) => {
                if key == "length" {
                    return Value::Number(array.len() as f64);
                }
                key.parse::<usize>()
                    .ok()
                    .and_then(|index| array.get(index))
                    .unwrap_or(Value::Undefined)
            }
            _ => Value::Undefined,
        }
    }

    pub fn has_own(&self, key: &str) -> bool {
        match self {
            Value::Object(object) => object.contains_key(key),
            Value::Array(array) => key.parse::<usize>().is_ok_and(|index| index < array.len()),
            _ => false,
        }
    }

    /// Fresh container with the same entries; other values are cloned as-is.
    pub fn shallow_copy(&self) -> Value {
        match self {
            Value::Array(array) => Value::Array(Array::new(array.snapshot())),
            Value::Object(object) => {
                let copy = match object.class() {
                    Some(class) => Object::with_class(class),
                    None => Object::new(),
                };
                copy.assign(object);
                Value::Object(copy)
            }
            other => other.clone(),
        }
    }

    /// Lossy conversion to JSON.
    ///
    /// `undefined`, functions and symbols are dropped from objects and become
    /// `null` in arrays; non-finite numbers become `null`; bigints that do not
    /// fit an `i64` are rendered as strings. Cyclic data is an error.
    pub fn to_json(&self) -> Result<serde_json::Value, ValueError> {
        let mut stack = Vec::new();
        Ok(to_json_inner(self, &mut stack)?.unwrap_or(serde_json::Value::Null))
    }
}

fn to_json_inner(
    value: &Value,
    stack: &mut Vec<usize>,
) -> Result<Option<serde_json::Value>, ValueError> {
    use serde_json::Value as Json;
    let json = match value {
        Value::Undefined | Value::Function(_) | Value::Symbol(_) => return Ok(None),
        Value::Null => Json::Null,
        Value::Bool(flag) => Json::Bool(*flag),
        Value::Number(number) => number_to_json(*number),
        Value::BigInt(big) => match i64::try_from(*big) {
            Ok(small) => Json::from(small),
            Err(_) => Json::String(big.to_string()),
        },
        Value::String(text) => Json::String(text.clone()),
        Value::Array(array) => {
            if stack.contains(&array.id()) {
                return Err(ValueError::Cyclic);
            }
            stack.push(array.id());
            let mut items = Vec::with_capacity(array.len());
            for item in array.snapshot() {
                items.push(to_json_inner(&item, stack)?.unwrap_or(Json::Null));
            }
            stack.pop();
            Json::Array(items)
        }
        Value::Object(object) => {
            if stack.contains(&object.id()) {
                return Err(ValueError::Cyclic);
            }
            stack.push(object.id());
            let mut map = serde_json::Map::new();
            for (key, item) in object.snapshot() {
                if let Some(json) = to_json_inner(&item, stack)? {
                    map.insert(key, json);
                }
            }
            stack.pop();
            Json::Object(map)
        }
    };
    Ok(Some(json))
}

fn number_to_json(number: f64) -> serde_json::Value {
    const SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if number.fract() == 0.0 && number.abs() <= SAFE_INTEGER {
        return serde_json::Value::from(number as i64);
    }
    serde_json::Number::from_f64(number)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

impl Symbol {
    pub fn description(&self) -> &str {
        &self.0
    }
}

impl Function {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Array {
    pub fn new(items: Vec<Value>) -> Self {
        Array(Rc::new(RefCell::new(items)))
    }
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const u8 as usize
    }
    pub fn ptr_eq(&self, other: &Array) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().get(index).cloned()
    }
    /// Copy of the current elements; callers never hold the borrow across validation.
    pub fn snapshot(&self) -> Vec<Value> {
        self.0.borrow().clone()
    }
    /// Writes `value` at `index`, padding any gap with `undefined`.
    pub fn set(&self, index: usize, value: Value) {
        let mut items = self.0.borrow_mut();
        if index >= items.len() {
            items.resize(index + 1, Value::Undefined);
        }
        items[index] = value;
    }
    pub fn push(&self, value: Value) {
        self.0.borrow_mut().push(value);
    }
    pub fn replace(&self, items: Vec<Value>) {
        *self.0.borrow_mut() = items;
    }
}

impl Object {
    pub fn new() -> Self {
        Object(Rc::new(ObjectCell { class: None, entries: RefCell::new(IndexMap::new()) }))
    }
    pub fn with_class(class: impl Into<String>) -> Self {
        Object(Rc::new(ObjectCell {
            class: Some(class.into()),
            entries: RefCell::new(IndexMap::new()),
        }))
    }
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const u8 as usize
    }
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
    /// `None` for plain objects.
    pub fn class(&self) -> Option<&str> {
        self.0.class.as_deref()
    }
    pub fn len(&self) -> usize {
        self.0.entries.borrow().len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.entries.borrow().is_empty()
    }
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.entries.borrow().get(key).cloned()
    }
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.entries.borrow().contains_key(key)
    }
    pub fn keys(&self) -> Vec<String> {
        self.0.entries.borrow().keys().cloned().collect()
    }
    pub fn snapshot(&self) -> Vec<(String, Value)> {
        self.0.entries.borrow().iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.0.entries.borrow_mut().insert(key.into(), value);
    }
    /// Copies every entry of `source` onto `self`, overwriting existing keys.
    pub fn assign(&self, source: &Object) {
        if self.ptr_eq(source) {
            return;
        }
        for (key, value) in source.snapshot() {
            self.insert(key, value);
        }
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

impl LiteralValue {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Undefined => Some(LiteralValue::Undefined),
            Value::Null => Some(LiteralValue::Null),
            Value::Bool(flag) => Some(LiteralValue::Bool(*flag)),
            Value::Number(number) => Some(LiteralValue::Number(OrderedFloat(*number))),
            Value::String(text) => Some(LiteralValue::String(text.clone())),
            _ => None,
        }
    }
    pub fn to_value(&self) -> Value {
        match self {
            LiteralValue::Undefined => Value::Undefined,
            LiteralValue::Null => Value::Null,
            LiteralValue::Bool(flag) => Value::Bool(*flag),
            LiteralValue::Number(number) => Value::Number(number.0),
            LiteralValue::String(text) => Value::String(text.clone()),
        }
    }
    pub fn type_of(&self) -> &'static str {
        match self {
            LiteralValue::Undefined => "undefined",
            LiteralValue::Null => "object",
            LiteralValue::Bool(_) => "boolean",
            LiteralValue::Number(_) => "number",
            LiteralValue::String(_) => "string",
        }
    }
    /// `===` against a host value, so `NaN` matches nothing.
    pub fn matches(&self, value: &Value) -> bool {
        self.to_value().strict_equals(value)
    }
    pub fn preview(&self) -> String {
        preview(&self.to_value())
    }
}

/// Template-string rendering: strings verbatim, everything else as printed by the host.
impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Undefined => f.write_str("undefined"),
            LiteralValue::Null => f.write_str("null"),
            LiteralValue::Bool(flag) => write!(f, "{flag}"),
            LiteralValue::Number(number) => f.write_str(&format_number(number.0)),
            LiteralValue::String(text) => f.write_str(text),
        }
    }
}

// ------------------------------- Equality --------------------------------- //

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        deep_equal(self, other, &mut Vec::new())
    }
}

fn deep_equal(a: &Value, b: &Value, seen: &mut Vec<(usize, usize)>) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y || (x.is_nan() && y.is_nan()),
        (Value::Array(x), Value::Array(y)) => {
            if x.ptr_eq(y) || seen.contains(&(x.id(), y.id())) {
                return true;
            }
            seen.push((x.id(), y.id()));
            let (left, right) = (x.snapshot(), y.snapshot());
            left.len() == right.len()
                && left.iter().zip(right.iter()).all(|(p, q)| deep_equal(p, q, seen))
        }
        (Value::Object(x), Value::Object(y)) => {
            if x.ptr_eq(y) || seen.contains(&(x.id(), y.id())) {
                return true;
            }
            seen.push((x.id(), y.id()));
            if x.class() != y.class() || x.len() != y.len() {
                return false;
            }
            x.snapshot().iter().all(|(key, left)| match y.get(key) {
                Some(right) => deep_equal(left, &right, seen),
                None => false,
            })
        }
        _ => a.strict_equals(b),
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&preview(self))
    }
}

// ------------------------------ Conversions ------------------------------- //

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(flag) => Value::Bool(flag),
            serde_json::Value::Number(number) => Value::Number(number.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(text) => Value::String(text),
            serde_json::Value::Array(items) => Value::array(items.into_iter().map(Value::from)),
            serde_json::Value::Object(map) => {
                Value::object(map.into_iter().map(|(k, v)| (k, Value::from(v))))
            }
        }
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Bool(flag)
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Value::Number(number)
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Value::Number(number as f64)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::String(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::String(text)
    }
}

impl From<LiteralValue> for Value {
    fn from(literal: LiteralValue) -> Self {
        literal.to_value()
    }
}

impl From<bool> for LiteralValue {
    fn from(flag: bool) -> Self {
        LiteralValue::Bool(flag)
    }
}

impl From<f64> for LiteralValue {
    fn from(number: f64) -> Self {
        LiteralValue::Number(OrderedFloat(number))
    }
}

impl From<i64> for LiteralValue {
    fn from(number: i64) -> Self {
        LiteralValue::Number(OrderedFloat(number as f64))
    }
}

impl From<&str> for LiteralValue {
    fn from(text: &str) -> Self {
        LiteralValue::String(text.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(text: String) -> Self {
        LiteralValue::String(text)
    }
}

// ------------------------------- Tests ------------------------------------ //
