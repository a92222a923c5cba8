//! Deserialization engine: generic JSON values into mapped objects.
//!
//! One [`Deserializer`] is a view of the registry fixed on a target type. It
//! walks the target's schema, resolves every field against its declared type,
//! and recurses into a fresh view for nested object, enum and item types.
//! Unknown input keys are ignored.
//!
//! Decoding is not transactional: when a field fails, the partially filled
//! object is dropped and only the error is returned.
pub mod enums;
pub mod items;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::Error;
use crate::ir::Field;
use crate::schema::{Declaration, Registry};
use crate::value::{Data, Object};

#[derive(Debug, Clone, Copy)]
pub struct Deserializer<'a> {
    registry: &'a Registry,
    type_name: &'a str,
}

impl<'a> Deserializer<'a> {
    pub fn new(registry: &'a Registry, type_name: &'a str) -> Self {
        Self { registry, type_name }
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    pub fn type_name(&self) -> &'a str {
        self.type_name
    }

    /// Decode a root value. Paths in errors start at `.`.
    pub fn deserialize(&self, value: &Value) -> Result<Data, Error> {
        self.decode(value, "")
    }

    /// Decode a root value that must produce an object.
    pub fn deserialize_object(&self, value: &Value) -> Result<Object, Error> {
        match self.deserialize(value)? {
            Data::Object(object) => Ok(object),
            other => Err(Error::incorrect_type("", "object", other.describe())),
        }
    }

    /// Decode `value` found at `path` into the target type.
    pub fn decode(&self, value: &Value, path: &str) -> Result<Data, Error> {
        let schema = match self.registry.declaration(self.type_name)? {
            Declaration::Enum(schema) => return enums::decode_enum(schema, value, path),
            Declaration::Object(schema) => schema,
        };
        let Value::Object(map) = value else {
            return Err(Error::incorrect_type(path, self.type_name, value.clone()));
        };

        debug!(ty = self.type_name, path, "decoding object");
        let mut result = Object::new(self.type_name);
        for field in schema.fields() {
            self.decode_field(map, path, field, &mut result)?;
        }
        Ok(Data::Object(result))
    }

    fn decode_field(&self, map: &Map<String, Value>, path: &str, field: &Field, result: &mut Object) -> Result<(), Error> {
        let name = field.serialized_name();
        let field_path = format!("{path}.{name}");

        let Some(value) = map.get(name) else {
            if field.is_required() {
                return Err(Error::missing(field_path, field.type_name()));
            }
            if let Some(default) = &field.default {
                result.set(field.name.clone(), default.clone());
            } else {
                trace!(path = %field_path, "optional field absent, left unset");
            }
            return Ok(());
        };

        if value.is_null() {
            if !field.allows_null() {
                let expected = field.type_name().unwrap_or_else(|| "not null".to_string());
                return Err(Error::incorrect_type(field_path, expected, Value::Null));
            }
            // an explicit allow_null over a type without null cannot hold the value
            if field.type_allows_null() {
                result.set(field.name.clone(), Data::Null);
            }
            return Ok(());
        }

        if !field.is_mappable() {
            return Err(Error::Unmappable { path: field_path });
        }

        if let Some(decoder) = &field.decoder {
            let decoded = decoder.decode(value, &field_path, self.registry)?;
            self.check_decoded(field, &decoded, &field_path)?;
            result.set(field.name.clone(), decoded);
            return Ok(());
        }

        let resolved = match &field.ty {
            Some(ty) => self.resolve(ty, value, &field_path)?,
            None => Data::from(value),
        };

        let resolved = if resolved.is_collection() && field.maps_items() {
            self.decode_items(field, value, &field_path)?
        } else {
            resolved
        };

        result.set(field.name.clone(), resolved);
        Ok(())
    }

    /// Codec output has to be something the field can hold.
    fn check_decoded(&self, field: &Field, decoded: &Data, path: &str) -> Result<(), Error> {
        let Some(ty) = &field.ty else { return Ok(()) };
        let fits = if decoded.is_null() { field.type_allows_null() } else { self.admits(ty, decoded) };
        if fits {
            Ok(())
        } else {
            Err(Error::incorrect_type(path, ty.to_string(), decoded.describe()))
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
