//! Runtime values produced by decoding and consumed by encoding.
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::Error;
use crate::schema::Registry;

/// A value that knows how to turn itself into its transport form.
pub trait SelfSerialize: fmt::Debug + Send + Sync {
    fn type_name(&self) -> &str;
    fn to_transport(&self, registry: &Registry) -> Result<Value, Error>;
}

#[derive(Debug, Clone)]
pub enum Data {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Data>),
    Map(IndexMap<String, Data>),
    Object(Object),
    Enum(EnumValue),
    Native(Arc<dyn SelfSerialize>),
}

/// Per-field state of an [`Object`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slot<'a> {
    Unset,
    Null,
    Value(&'a Data),
}

/// A mapped object: its type name and the fields that have been assigned.
///
/// A field missing from `slots` is unset, which is not the same as `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    type_name: String,
    slots: IndexMap<String, Data>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub enum_type: String,
    pub case: String,
    /// Backing scalar; `None` for unit enums.
    pub value: Option<Value>,
}

// ------------------------------- Object ---------------------------------- //

impl Object {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self { type_name: type_name.into(), slots: IndexMap::new() }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Data>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Data>) {
        self.slots.insert(field.into(), value.into());
    }

    pub fn unset(&mut self, field: &str) -> Option<Data> {
        self.slots.shift_remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&Data> {
        self.slots.get(field)
    }

    pub fn is_set(&self, field: &str) -> bool {
        self.slots.contains_key(field)
    }

    pub fn slot(&self, field: &str) -> Slot<'_> {
        match self.slots.get(field) {
            None => Slot::Unset,
            Some(Data::Null) => Slot::Null,
            Some(value) => Slot::Value(value),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Data)> {
        self.slots.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl EnumValue {
    pub fn backed(enum_type: impl Into<String>, case: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { enum_type: enum_type.into(), case: case.into(), value: Some(value.into()) }
    }

    pub fn unit(enum_type: impl Into<String>, case: impl Into<String>) -> Self {
        Self { enum_type: enum_type.into(), case: case.into(), value: None }
    }
}

// -------------------------------- Data ----------------------------------- //

impl Data {
    pub fn is_null(&self) -> bool {
        matches!(self, Data::Null)
    }

    /// Plain containers, as opposed to mapped objects.
    pub fn is_collection(&self) -> bool {
        matches!(self, Data::List(_) | Data::Map(_))
    }

    /// Objects in the broad sense: mapped objects, enum cases and natives.
    pub fn is_object_like(&self) -> bool {
        matches!(self, Data::Object(_) | Data::Enum(_) | Data::Native(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self { Data::Bool(b) => Some(*b), _ => None }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self { Data::Int(i) => Some(*i), _ => None }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Data::Float(f) => Some(*f),
            Data::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self { Data::String(s) => Some(s), _ => None }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self { Data::Object(o) => Some(o), _ => None }
    }

    pub fn into_object(self) -> Option<Object> {
        match self { Data::Object(o) => Some(o), _ => None }
    }

    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self { Data::Enum(e) => Some(e), _ => None }
    }

    /// Short type label used in error messages.
    pub fn kind(&self) -> &str {
        match self {
            Data::Null => "null",
            Data::Bool(_) => "bool",
            Data::Int(_) => "int",
            Data::Float(_) => "float",
            Data::String(_) => "string",
            Data::List(_) | Data::Map(_) => "array",
            Data::Object(o) => o.type_name(),
            Data::Enum(e) => &e.enum_type,
            Data::Native(n) => n.type_name(),
        }
    }

    /// Render as a transport value for diagnostics only. Objects, enums and
    /// natives become descriptive strings.
    pub fn describe(&self) -> Value {
        match self {
            Data::Null => Value::Null,
            Data::Bool(b) => Value::Bool(*b),
            Data::Int(i) => Value::from(*i),
            Data::Float(f) => Value::from(*f),
            Data::String(s) => Value::String(s.clone()),
            Data::List(items) => Value::Array(items.iter().map(Data::describe).collect()),
            Data::Map(map) => Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.describe())).collect()
            ),
            Data::Object(o) => Value::String(format!("object({})", o.type_name())),
            Data::Enum(e) => Value::String(format!("{}::{}", e.enum_type, e.case)),
            Data::Native(n) => Value::String(format!("object({})", n.type_name())),
        }
    }
}

impl PartialEq for Data {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Data::Null, Data::Null) => true,
            (Data::Bool(a), Data::Bool(b)) => a == b,
            (Data::Int(a), Data::Int(b)) => a == b,
            (Data::Float(a), Data::Float(b)) => a == b,
            (Data::String(a), Data::String(b)) => a == b,
            (Data::List(a), Data::List(b)) => a == b,
            (Data::Map(a), Data::Map(b)) => a == b,
            (Data::Object(a), Data::Object(b)) => a == b,
            (Data::Enum(a), Data::Enum(b)) => a == b,
            (Data::Native(a), Data::Native(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Structural conversion of plain JSON. Numbers that fit `i64` become `Int`.
impl From<Value> for Data {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Data::Null,
            Value::Bool(b) => Data::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Data::Int(i),
                None => Data::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Data::String(s),
            Value::Array(items) => Data::List(items.into_iter().map(Data::from).collect()),
            Value::Object(map) => Data::Map(map.into_iter().map(|(k, v)| (k, Data::from(v))).collect()),
        }
    }
}

impl From<&Value> for Data {
    fn from(value: &Value) -> Self {
        Data::from(value.clone())
    }
}

impl From<bool> for Data {
    fn from(b: bool) -> Self { Data::Bool(b) }
}

impl From<i64> for Data {
    fn from(i: i64) -> Self { Data::Int(i) }
}

impl From<i32> for Data {
    fn from(i: i32) -> Self { Data::Int(i64::from(i)) }
}

impl From<f64> for Data {
    fn from(f: f64) -> Self { Data::Float(f) }
}

impl From<&str> for Data {
    fn from(s: &str) -> Self { Data::String(s.to_string()) }
}

impl From<String> for Data {
    fn from(s: String) -> Self { Data::String(s) }
}

impl From<Object> for Data {
    fn from(o: Object) -> Self { Data::Object(o) }
}

impl From<EnumValue> for Data {
    fn from(e: EnumValue) -> Self { Data::Enum(e) }
}

impl From<Vec<Data>> for Data {
    fn from(items: Vec<Data>) -> Self { Data::List(items) }
}

impl<T: Into<Data>> From<Option<T>> for Data {
    fn from(value: Option<T>) -> Self {
        value.map_or(Data::Null, Into::into)
    }
}

// ------------------------------- Tests ------------------------------------ //
