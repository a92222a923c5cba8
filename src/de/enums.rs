use serde_json::Value;

use crate::error::Error;
use crate::resolve::check_builtin;
use crate::schema::{BackingKind, EnumSchema};
use crate::value::{Data, EnumValue};

const UNBACKED: &str = "Enums must be backed by a scalar type.";

/// Find the case of a backed enum whose backing value equals `value`.
pub fn decode_enum(schema: &EnumSchema, value: &Value, path: &str) -> Result<Data, Error> {
    let Some(backing) = schema.backing() else {
        return Err(Error::unsupported_type(path, schema.name(), Some(UNBACKED)));
    };

    if !check_builtin(backing.builtin(), value) {
        return Err(invalid_backing(schema, backing, value));
    }

    schema
        .cases()
        .iter()
        .find(|case| case.value.as_ref() == Some(value))
        .map(|case| Data::Enum(EnumValue {
            enum_type: schema.name().to_string(),
            case: case.name.clone(),
            value: case.value.clone(),
        }))
        .ok_or_else(|| invalid_backing(schema, backing, value))
}

fn invalid_backing(schema: &EnumSchema, backing: BackingKind, value: &Value) -> Error {
    let options = schema
        .cases()
        .iter()
        .filter_map(|case| case.value.as_ref())
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();
    Error::InvalidEnumBacking {
        enum_type: schema.name().to_string(),
        backing: backing.builtin().name().to_string(),
        options,
        actual: value.clone(),
    }
}
