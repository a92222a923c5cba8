//! Object and enum schemas, and the registry that resolves type names to them.
use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::codec::{BackedEnumEncoder, Decoder, Encoder, JsonTextCodec, ObjectEncoder, TypedDecoder};
use crate::error::Error;
use crate::ir::{Builtin, Field};
use crate::value::{EnumValue, Object};

// ------------------------------- Schemas ---------------------------------- //

/// Ordered fields of one object type. Order is declaration order.
#[derive(Debug, Clone)]
pub struct ObjectSchema {
    name: String,
    fields: Vec<Field>,
}

impl ObjectSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), fields: Vec::new() }
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackingKind {
    Int,
    String,
}

impl BackingKind {
    pub fn builtin(self) -> Builtin {
        match self {
            BackingKind::Int => Builtin::Int,
            BackingKind::String => Builtin::String,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnumCase {
    pub name: String,
    pub value: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct EnumSchema {
    name: String,
    backing: Option<BackingKind>,
    cases: Vec<EnumCase>,
}

impl EnumSchema {
    pub fn backed(name: impl Into<String>, backing: BackingKind) -> Self {
        Self { name: name.into(), backing: Some(backing), cases: Vec::new() }
    }

    pub fn unit(name: impl Into<String>) -> Self {
        Self { name: name.into(), backing: None, cases: Vec::new() }
    }

    pub fn case(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.cases.push(EnumCase { name: name.into(), value: Some(value.into()) });
        self
    }

    pub fn unit_case(mut self, name: impl Into<String>) -> Self {
        self.cases.push(EnumCase { name: name.into(), value: None });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backing(&self) -> Option<BackingKind> {
        self.backing
    }

    pub fn cases(&self) -> &[EnumCase] {
        &self.cases
    }

    pub fn value_of(&self, case: &str) -> Option<EnumValue> {
        self.cases.iter().find(|c| c.name == case).map(|c| EnumValue {
            enum_type: self.name.clone(),
            case: c.name.clone(),
            value: c.value.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub enum Declaration {
    Object(ObjectSchema),
    Enum(EnumSchema),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Object(schema) => schema.name(),
            Declaration::Enum(schema) => schema.name(),
        }
    }
}

// ------------------------------- Registry --------------------------------- //

/// Resolves type names to declarations. Read-only once built, so it can be
/// shared across threads.
#[derive(Debug, Clone)]
pub struct Registry {
    types: HashMap<String, Arc<Declaration>>,
    encoders: HashMap<String, Arc<dyn Encoder>>,
    decoders: HashMap<String, Arc<dyn Decoder>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// A registry with the bundled named codecs and no types.
    pub fn new() -> Self {
        let mut registry = Self { types: HashMap::new(), encoders: HashMap::new(), decoders: HashMap::new() };
        registry.register_encoder("backed_enum", Arc::new(BackedEnumEncoder));
        registry.register_encoder("object", Arc::new(ObjectEncoder));
        registry.register_encoder("json_text", Arc::new(JsonTextCodec));
        registry.register_decoder("json_text", Arc::new(JsonTextCodec));
        registry
    }

    pub fn register(&mut self, schema: ObjectSchema) -> &mut Self {
        self.types.insert(schema.name().to_string(), Arc::new(Declaration::Object(schema)));
        self
    }

    pub fn register_enum(&mut self, schema: EnumSchema) -> &mut Self {
        self.types.insert(schema.name().to_string(), Arc::new(Declaration::Enum(schema)));
        self
    }

    pub fn register_encoder(&mut self, name: impl Into<String>, encoder: Arc<dyn Encoder>) -> &mut Self {
        self.encoders.insert(name.into(), encoder);
        self
    }

    pub fn register_decoder(&mut self, name: impl Into<String>, decoder: Arc<dyn Decoder>) -> &mut Self {
        self.decoders.insert(name.into(), decoder);
        self
    }

    pub fn declaration(&self, name: &str) -> Result<&Declaration, Error> {
        self.types
            .get(name)
            .map(|decl| decl.as_ref())
            .ok_or_else(|| Error::UnknownType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn object_schema(&self, name: &str) -> Result<&ObjectSchema, Error> {
        match self.declaration(name)? {
            Declaration::Object(schema) => Ok(schema),
            Declaration::Enum(_) => Err(Error::Declaration(format!("'{name}' is an enum, not an object type"))),
        }
    }

    pub fn enum_schema(&self, name: &str) -> Result<&EnumSchema, Error> {
        match self.declaration(name)? {
            Declaration::Enum(schema) => Ok(schema),
            Declaration::Object(_) => Err(Error::Declaration(format!("'{name}' is an object type, not an enum"))),
        }
    }

    /// Named encoder lookup used by declaration files.
    pub fn encoder(&self, name: &str) -> Result<Arc<dyn Encoder>, Error> {
        self.encoders
            .get(name)
            .cloned()
            .ok_or_else(|| Error::Declaration(format!("unknown encoder '{name}'")))
    }

    /// Named decoder lookup; `typed:<Type>` yields a decoder for that type.
    pub fn decoder(&self, name: &str) -> Result<Arc<dyn Decoder>, Error> {
        if let Some(ty) = name.strip_prefix("typed:") {
            return Ok(Arc::new(TypedDecoder::new(ty)));
        }
        self.decoders
            .get(name)
            .cloned()
            .ok_or_else(|| Error::Declaration(format!("unknown decoder '{name}'")))
    }

    /// A fresh object with every declared default applied and every other
    /// field unset.
    pub fn instantiate(&self, name: &str) -> Result<Object, Error> {
        let schema = self.object_schema(name)?;
        let mut object = Object::new(name);
        for field in schema.fields() {
            if let Some(default) = &field.default {
                object.set(field.name.clone(), default.clone());
            }
        }
        Ok(object)
    }

    pub fn enum_case(&self, enum_type: &str, case: &str) -> Result<EnumValue, Error> {
        self.enum_schema(enum_type)?
            .value_of(case)
            .ok_or_else(|| Error::Declaration(format!("enum '{enum_type}' has no case '{case}'")))
    }
}
