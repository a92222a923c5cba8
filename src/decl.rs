//! Declaration files: object and enum types described as JSON.
//!
//! ```json
//! { "types": {
//!     "Person": { "kind": "object", "fields": [
//!         { "name": "name", "type": "string" },
//!         { "name": "age", "type": "int", "required": false, "default": 0 } ] },
//!     "Level": { "kind": "enum", "backing": "int", "cases": { "Low": 1, "High": 2 } } } }
//! ```
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::de::Deserializer;
use crate::error::Error;
use crate::ir::{Field, Ty};
use crate::resolve::check_builtin;
use crate::schema::{BackingKind, EnumSchema, ObjectSchema, Registry};
use crate::value::Data;

// ————————————————————————————————————————————————————————————————————————————
// FILE FORMAT
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeclFile {
    pub types: IndexMap<String, TypeDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeDecl {
    Object {
        #[serde(default)]
        fields: Vec<FieldDecl>,
    },
    Enum {
        #[serde(default)]
        backing: Option<BackingKind>,
        /// Case name to backing value. Unit enums use `null` values.
        #[serde(default)]
        cases: IndexMap<String, Value>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type", default)]
    pub ty: Option<String>,
    #[serde(default)]
    pub rename: Option<String>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub allow_null: Option<bool>,
    /// `Some(Value::Null)` when the file says `"default": null`.
    #[serde(default, deserialize_with = "present")]
    pub default: Option<Value>,
    #[serde(default)]
    pub item_type: Option<String>,
    #[serde(default)]
    pub encoder: Option<String>,
    #[serde(default)]
    pub decoder: Option<String>,
    #[serde(default)]
    pub item_encoder: Option<String>,
    #[serde(default)]
    pub item_decoder: Option<String>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

// ————————————————————————————————————————————————————————————————————————————
// LOADING
// ————————————————————————————————————————————————————————————————————————————

impl DeclFile {
    pub fn from_str(source: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let source = std::fs::read_to_string(path)?;
        Self::from_str(&source)
    }

    /// Register every declared type into a registry carrying the bundled
    /// named codecs.
    pub fn into_registry(self) -> Result<Registry, Error> {
        let mut registry = Registry::new();
        self.register_into(&mut registry)?;
        Ok(registry)
    }

    /// Defaults are resolved against their declared types only after every
    /// type is registered, so they may name any type in the file.
    pub fn register_into(self, registry: &mut Registry) -> Result<(), Error> {
        let mut objects = Vec::new();
        for (name, decl) in self.types {
            match decl {
                TypeDecl::Enum { backing, cases } => {
                    registry.register_enum(enum_schema(&name, backing, cases)?);
                }
                TypeDecl::Object { fields } => objects.push((name, fields)),
            }
        }

        let mut pending = Vec::new();
        for (name, fields) in objects {
            let mut schema = ObjectSchema::new(name.as_str());
            let mut defaults = Vec::new();
            for field in fields {
                let (field, default) = field.build(&name, registry)?;
                schema = schema.field(field);
                defaults.push(default);
            }
            registry.register(schema);
            pending.push((name, defaults));
        }

        for (name, defaults) in pending {
            let declared = registry.object_schema(&name)?.clone();
            let mut schema = ObjectSchema::new(name.as_str());
            for (field, default) in declared.fields().iter().cloned().zip(defaults) {
                let field = match default {
                    Some(raw) => {
                        let value = resolve_default(registry, &name, &field, &raw)?;
                        field.default_value(value)
                    }
                    None => field,
                };
                schema = schema.field(field);
            }
            debug!(ty = %name, fields = schema.fields().len(), "declared object type");
            registry.register(schema);
        }
        Ok(())
    }
}

fn enum_schema(name: &str, backing: Option<BackingKind>, cases: IndexMap<String, Value>) -> Result<EnumSchema, Error> {
    let Some(kind) = backing else {
        let mut schema = EnumSchema::unit(name);
        for (case, value) in cases {
            if !value.is_null() {
                return Err(Error::Declaration(format!("case '{name}::{case}' has a value but '{name}' declares no backing")));
            }
            schema = schema.unit_case(case);
        }
        return Ok(schema);
    };

    let mut schema = EnumSchema::backed(name, kind);
    for (case, value) in cases {
        if !check_builtin(kind.builtin(), &value) {
            return Err(Error::Declaration(format!(
                "case '{name}::{case}' value {value} does not match backing '{}'",
                kind.builtin().name()
            )));
        }
        schema = schema.case(case, value);
    }
    Ok(schema)
}

impl FieldDecl {
    /// The field with its raw default in place, plus that raw default for
    /// later resolution.
    fn build(self, owner: &str, registry: &Registry) -> Result<(Field, Option<Value>), Error> {
        let mut field = match &self.ty {
            Some(src) => {
                let (ty, nullable) = Ty::parse(src).map_err(|e| match e {
                    Error::Declaration(msg) => Error::Declaration(format!("{owner}.{}: {msg}", self.name)),
                    other => other,
                })?;
                let field = Field::new(self.name.as_str(), ty);
                if nullable { field.nullable() } else { field }
            }
            None => Field::untyped(self.name.as_str()),
        };
        if let Some(rename) = self.rename {
            field = field.rename(rename);
        }
        if let Some(required) = self.required {
            field = field.required(required);
        }
        if let Some(allow) = self.allow_null {
            field = field.allow_null(allow);
        }
        if let Some(item_type) = self.item_type {
            field = field.item_type(item_type);
        }
        if let Some(name) = &self.encoder {
            field = field.encoder(registry.encoder(name)?);
        }
        if let Some(name) = &self.decoder {
            field = field.decoder(registry.decoder(name)?);
        }
        if let Some(name) = &self.item_encoder {
            field = field.item_encoder(registry.encoder(name)?);
        }
        if let Some(name) = &self.item_decoder {
            field = field.item_decoder(registry.decoder(name)?);
        }
        if let Some(default) = &self.default {
            field = field.default_value(Data::from(default));
        }
        Ok((field, self.default))
    }
}

/// Decode a declared default the way an input value for the field would be
/// decoded. Enum defaults are written as the case's backing value.
fn resolve_default(registry: &Registry, owner: &str, field: &Field, raw: &Value) -> Result<Data, Error> {
    let Some(ty) = field.ty.as_ref().filter(|_| !raw.is_null()) else {
        return Ok(Data::from(raw));
    };
    let path = format!("{owner}.{}", field.name);
    let engine = Deserializer::new(registry, owner);
    let resolved = engine.resolve(ty, raw, &path).and_then(|data| {
        if data.is_collection() && field.maps_items() {
            engine.decode_items(field, raw, &path)
        } else {
            Ok(data)
        }
    });
    resolved.map_err(|e| Error::Declaration(format!("default of '{path}': {e}")))
}
