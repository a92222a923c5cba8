//! Serialization engine: mapped objects into generic JSON mappings.
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::codec::Encoder;
use crate::error::Error;
use crate::ir::Field;
use crate::schema::Registry;
use crate::value::{Data, Object, Slot};

/// Walks an object's schema and emits its fields in declaration order.
///
/// Errors name the field relative to the object being encoded, without the
/// path of enclosing objects.
#[derive(Debug, Clone, Copy)]
pub struct Serializer<'a> {
    registry: &'a Registry,
}

impl<'a> Serializer<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    pub fn serialize(&self, object: &Object) -> Result<Map<String, Value>, Error> {
        let schema = self.registry.object_schema(object.type_name())?;
        debug!(ty = object.type_name(), "encoding object");

        let mut out = Map::new();
        for field in schema.fields() {
            let value = match object.slot(&field.name) {
                Slot::Unset => {
                    if field.is_required() {
                        return Err(Error::missing(field.name.as_str(), None));
                    }
                    trace!(field = %field.name, "unset optional field skipped");
                    continue;
                }
                Slot::Null => {
                    if !field.allows_null() {
                        return Err(Error::incorrect_type(field.name.as_str(), "not null", Value::Null));
                    }
                    Value::Null
                }
                Slot::Value(value) => self.encode_field(field, value)?,
            };
            out.insert(field.serialized_name().to_string(), value);
        }
        Ok(out)
    }

    fn encode_field(&self, field: &Field, value: &Data) -> Result<Value, Error> {
        if !field.is_mappable() {
            return Err(Error::Unmappable { path: field.name.clone() });
        }
        if let Some(encoder) = &field.encoder {
            return encoder.encode(value, self.registry);
        }
        if let Some(encoder) = &field.item_encoder {
            match value {
                Data::List(items) => {
                    return items
                        .iter()
                        .map(|item| self.encode_item(field, encoder.as_ref(), item))
                        .collect::<Result<Vec<_>, _>>()
                        .map(Value::Array);
                }
                Data::Map(entries) => {
                    return entries
                        .iter()
                        .map(|(key, item)| Ok((key.clone(), self.encode_item(field, encoder.as_ref(), item)?)))
                        .collect::<Result<Map<_, _>, Error>>()
                        .map(Value::Object);
                }
                _ => {}
            }
        }
        self.transport(&field.name, value)
    }

    fn encode_item(&self, field: &Field, encoder: &dyn Encoder, item: &Data) -> Result<Value, Error> {
        if !item.is_object_like() {
            return Err(Error::incorrect_type(field.name.as_str(), "object", item.describe()));
        }
        encoder.encode(item, self.registry)
    }

    /// Default transport form of a value that has no codec of its own.
    ///
    /// `name` is the field reported when an enum case is not backed.
    pub fn transport(&self, name: &str, value: &Data) -> Result<Value, Error> {
        Ok(match value {
            Data::Null => Value::Null,
            Data::Bool(b) => Value::Bool(*b),
            Data::Int(i) => Value::from(*i),
            Data::Float(f) => Value::from(*f),
            Data::String(s) => Value::String(s.clone()),
            Data::Native(native) => native.to_transport(self.registry)?,
            Data::Enum(e) => match &e.value {
                Some(backing) => backing.clone(),
                None => return Err(Error::incorrect_type(name, "BackedEnum", value.describe())),
            },
            Data::Object(object) => Value::Object(self.serialize(object)?),
            Data::List(items) => Value::Array(
                items.iter().map(|item| self.transport(name, item)).collect::<Result<_, _>>()?
            ),
            Data::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, item)| Ok((key.clone(), self.transport(name, item)?)))
                    .collect::<Result<_, Error>>()?
            ),
        })
    }
}

// ------------------------------- Tests ------------------------------------ //
