//! Custom codec hooks and the codecs bundled with the registry.
use std::fmt;

use serde_json::Value;

use crate::de::Deserializer;
use crate::error::Error;
use crate::schema::Registry;
use crate::ser::Serializer;
use crate::value::Data;

/// Turns a field (or item) value into its transport form.
pub trait Encoder: fmt::Debug + Send + Sync {
    fn encode(&self, value: &Data, registry: &Registry) -> Result<Value, Error>;
}

/// Turns a transport value into a field (or item) value.
///
/// `path` locates the value in the input, for the codec's own error messages.
pub trait Decoder: fmt::Debug + Send + Sync {
    fn decode(&self, value: &Value, path: &str, registry: &Registry) -> Result<Data, Error>;
}

/// Emits the backing value of a backed enum case and rejects anything else.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackedEnumEncoder;

impl Encoder for BackedEnumEncoder {
    fn encode(&self, value: &Data, _registry: &Registry) -> Result<Value, Error> {
        match value {
            Data::Enum(e) => e.value.clone().ok_or_else(|| {
                Error::unsupported_input(e.enum_type.as_str(), Some("Only backed enums are supported by BackedEnumEncoder."))
            }),
            other => Err(Error::unsupported_input(
                other.kind(),
                Some("Only backed enums are supported by BackedEnumEncoder."),
            )),
        }
    }
}

/// The serialization engine used as a codec: encodes an object as a mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectEncoder;

impl Encoder for ObjectEncoder {
    fn encode(&self, value: &Data, registry: &Registry) -> Result<Value, Error> {
        match value {
            Data::Object(object) => Serializer::new(registry).serialize(object).map(Value::Object),
            other => Err(Error::unsupported_input(other.kind(), Some("ObjectEncoder only encodes mapped objects."))),
        }
    }
}

/// The deserialization engine used as a codec, for one fixed type.
#[derive(Debug, Clone)]
pub struct TypedDecoder {
    type_name: String,
}

impl TypedDecoder {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self { type_name: type_name.into() }
    }
}

impl Decoder for TypedDecoder {
    fn decode(&self, value: &Value, path: &str, registry: &Registry) -> Result<Data, Error> {
        Deserializer::new(registry, &self.type_name).decode(value, path)
    }
}

/// Carries a value as a JSON document embedded in a string.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTextCodec;

impl Encoder for JsonTextCodec {
    fn encode(&self, value: &Data, registry: &Registry) -> Result<Value, Error> {
        let transport = Serializer::new(registry).transport("", value)?;
        Ok(Value::String(serde_json::to_string(&transport)?))
    }
}

impl Decoder for JsonTextCodec {
    fn decode(&self, value: &Value, path: &str, _registry: &Registry) -> Result<Data, Error> {
        let Value::String(text) = value else {
            return Err(Error::incorrect_type(path, "string", value.clone()));
        };
        let decoded: Value =
            serde_json::from_str(text).map_err(|_| Error::incorrect_type(path, "JSON text", value.clone()))?;
        Ok(Data::from(decoded))
    }
}
