//! JSON text at the edges of the mapping engines.
use std::fmt;

use serde_json::Value;

use crate::de::Deserializer;
use crate::error::Error;
use crate::schema::Registry;
use crate::ser::Serializer;
use crate::value::{Data, Object, SelfSerialize};

/// Decodes UTF-8 JSON text into a mapped value of one type.
#[derive(Debug, Clone, Copy)]
pub struct JsonDeserializer<'a> {
    inner: Deserializer<'a>,
}

impl<'a> JsonDeserializer<'a> {
    pub fn new(registry: &'a Registry, type_name: &'a str) -> Self {
        Self { inner: Deserializer::new(registry, type_name) }
    }

    pub fn deserialize(&self, json: &str) -> Result<Data, Error> {
        let value: Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(Error::incorrect_type(".", self.inner.type_name(), value));
        }
        self.inner.deserialize(&value)
    }

    pub fn deserialize_object(&self, json: &str) -> Result<Object, Error> {
        match self.deserialize(json)? {
            Data::Object(object) => Ok(object),
            other => Err(Error::incorrect_type(".", self.inner.type_name(), other.describe())),
        }
    }
}

/// Encodes a mapped object as compact JSON text.
#[derive(Debug, Clone, Copy)]
pub struct JsonSerializer<'a> {
    inner: Serializer<'a>,
}

impl<'a> JsonSerializer<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { inner: Serializer::new(registry) }
    }

    pub fn serialize(&self, object: &Object) -> Result<String, Error> {
        let map = self.inner.serialize(object)?;
        Ok(serde_json::to_string(&map)?)
    }

    pub fn serialize_pretty(&self, object: &Object) -> Result<String, Error> {
        let map = self.inner.serialize(object)?;
        Ok(serde_json::to_string_pretty(&map)?)
    }
}

/// Typed Rust values that map through a registered object type.
///
/// Implementors only convert to and from [`Object`]; the JSON entry points
/// are provided. Every `JsonMapped` type is also [`SelfSerialize`], so it can
/// be stored in a field as [`Data::Native`].
pub trait JsonMapped: Sized {
    const TYPE_NAME: &'static str;

    fn from_object(object: Object) -> Result<Self, Error>;

    fn to_object(&self) -> Object;

    fn from_json(registry: &Registry, json: &str) -> Result<Self, Error> {
        let object = JsonDeserializer::new(registry, Self::TYPE_NAME).deserialize_object(json)?;
        Self::from_object(object)
    }

    /// Like [`JsonMapped::from_json`], but bad input (invalid data or invalid
    /// JSON syntax) yields `Ok(None)`. Configuration errors are still returned.
    fn try_from_json(registry: &Registry, json: &str) -> Result<Option<Self>, Error> {
        match Self::from_json(registry, json) {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.is_invalid_input() || matches!(error, Error::Json(_)) => Ok(None),
            Err(error) => Err(error),
        }
    }

    fn json_serialize(&self, registry: &Registry) -> Result<Value, Error> {
        Serializer::new(registry).serialize(&self.to_object()).map(Value::Object)
    }

    fn to_json(&self, registry: &Registry) -> Result<String, Error> {
        JsonSerializer::new(registry).serialize(&self.to_object())
    }
}

impl<T> SelfSerialize for T
where
    T: JsonMapped + fmt::Debug + Send + Sync,
{
    fn type_name(&self) -> &str {
        T::TYPE_NAME
    }

    fn to_transport(&self, registry: &Registry) -> Result<Value, Error> {
        self.json_serialize(registry)
    }
}
