//! Declared-type IR: what a field says it holds and how it may be mapped.
use std::fmt;
use std::sync::Arc;

use crate::codec::{Decoder, Encoder};
use crate::error::Error;
use crate::value::Data;

/// Type name that refers back to the object type currently being mapped.
pub const SELF_TYPE: &str = "self";

/// Builtin keywords that exist in declarations but have no mapping.
const RESERVED: &[&str] = &["void", "never", "callable", "iterable", "resource", "static"];

// ------------------------------- Types ----------------------------------- //

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Bool,
    Int,
    Float,
    String,
    Array,
    Object,
    Mixed,
    False,
    True,
}

impl Builtin {
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Bool => "bool",
            Builtin::Int => "int",
            Builtin::Float => "float",
            Builtin::String => "string",
            Builtin::Array => "array",
            Builtin::Object => "object",
            Builtin::Mixed => "mixed",
            Builtin::False => "false",
            Builtin::True => "true",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "bool" => Builtin::Bool,
            "int" => Builtin::Int,
            "float" => Builtin::Float,
            "string" => Builtin::String,
            "array" => Builtin::Array,
            "object" => Builtin::Object,
            "mixed" => Builtin::Mixed,
            "false" => Builtin::False,
            "true" => Builtin::True,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ty {
    Builtin(Builtin),
    /// Object type, enum type, or [`SELF_TYPE`].
    Named(String),
    /// Builtin keyword without a mapping; always fails to resolve.
    Reserved(String),
    /// Members in trial order.
    Union(Vec<Ty>),
    Intersection(Vec<Ty>),
}

impl Ty {
    pub fn bool() -> Self { Ty::Builtin(Builtin::Bool) }
    pub fn int() -> Self { Ty::Builtin(Builtin::Int) }
    pub fn float() -> Self { Ty::Builtin(Builtin::Float) }
    pub fn string() -> Self { Ty::Builtin(Builtin::String) }
    pub fn array() -> Self { Ty::Builtin(Builtin::Array) }
    pub fn object() -> Self { Ty::Builtin(Builtin::Object) }
    pub fn mixed() -> Self { Ty::Builtin(Builtin::Mixed) }
    pub fn named(name: impl Into<String>) -> Self { Ty::Named(name.into()) }
    pub fn self_type() -> Self { Ty::Named(SELF_TYPE.to_string()) }

    /// Build a union. Directly nested unions are flattened into this one.
    pub fn union(members: impl IntoIterator<Item = Ty>) -> Self {
        let mut flat = Vec::new();
        for member in members {
            match member {
                Ty::Union(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        Ty::Union(flat)
    }

    pub fn intersection(members: impl IntoIterator<Item = Ty>) -> Self {
        Ty::Intersection(members.into_iter().collect())
    }

    /// Whether the type itself accepts `null` regardless of any `?` marker.
    pub fn admits_null(&self) -> bool {
        match self {
            Ty::Builtin(Builtin::Mixed) => true,
            Ty::Union(members) => members.iter().any(Ty::admits_null),
            _ => false,
        }
    }

    /// Parse the textual grammar (`?T`, `A|B|null`, `A&B`, `A|(B&C)`).
    ///
    /// Returns the type and whether the declaration was nullable.
    pub fn parse(src: &str) -> Result<(Ty, bool), Error> {
        let src = src.trim();
        if let Some(rest) = src.strip_prefix('?') {
            let (ty, _) = Self::parse(rest)?;
            if matches!(ty, Ty::Union(_) | Ty::Intersection(_)) {
                return Err(Error::Declaration(format!("'?' cannot prefix a compound type: {src}")));
            }
            return Ok((ty, true));
        }

        let mut nullable = false;
        let mut members = Vec::new();
        for part in split_top_level(src, '|')? {
            let part = part.trim();
            if part == "null" {
                nullable = true;
                continue;
            }
            let inner = part
                .strip_prefix('(')
                .and_then(|p| p.strip_suffix(')'))
                .unwrap_or(part);
            if inner.contains('&') {
                let names = inner
                    .split('&')
                    .map(|name| parse_name(name.trim()))
                    .collect::<Result<Vec<_>, _>>()?;
                members.push(Ty::Intersection(names));
            } else if inner.contains('(') || inner.contains(')') {
                return Err(Error::Declaration(format!("unbalanced parentheses in type: {src}")));
            } else {
                members.push(parse_name(inner)?);
            }
        }

        match members.len() {
            0 => Err(Error::Declaration(format!("type declares no mappable member: {src}"))),
            1 => Ok((members.remove(0), nullable)),
            _ => Ok((Ty::union(members), nullable)),
        }
    }
}

fn parse_name(name: &str) -> Result<Ty, Error> {
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || matches!(c, '_' | ':' | '\\')) {
        return Err(Error::Declaration(format!("invalid type name: '{name}'")));
    }
    if let Some(kind) = Builtin::from_name(name) {
        return Ok(Ty::Builtin(kind));
    }
    if RESERVED.contains(&name) {
        return Ok(Ty::Reserved(name.to_string()));
    }
    Ok(Ty::Named(name.to_string()))
}

fn split_top_level(src: &str, sep: char) -> Result<Vec<&str>, Error> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in src.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(&src[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
        if depth < 0 || depth > 1 {
            return Err(Error::Declaration(format!("unbalanced parentheses in type: {src}")));
        }
    }
    if depth != 0 {
        return Err(Error::Declaration(format!("unbalanced parentheses in type: {src}")));
    }
    parts.push(&src[start..]);
    Ok(parts)
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Builtin(kind) => f.write_str(kind.name()),
            Ty::Named(name) | Ty::Reserved(name) => f.write_str(name),
            Ty::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 { f.write_str("|")?; }
                    match member {
                        Ty::Intersection(_) => write!(f, "({member})")?,
                        _ => write!(f, "{member}")?,
                    }
                }
                Ok(())
            }
            Ty::Intersection(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 { f.write_str("&")?; }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
        }
    }
}

// ------------------------------- Fields ---------------------------------- //

/// Mapping metadata of one field.
#[derive(Debug, Clone)]
pub struct Field {
    /// Source identifier; slots on [`crate::value::Object`] are keyed by it.
    pub name: String,
    pub rename: Option<String>,
    pub ty: Option<Ty>,
    /// `?T` / `null|T` on the declaration itself.
    pub ty_nullable: bool,
    pub required: Option<bool>,
    pub allow_null: Option<bool>,
    pub default: Option<Data>,
    pub item_type: Option<String>,
    pub encoder: Option<Arc<dyn Encoder>>,
    pub decoder: Option<Arc<dyn Decoder>>,
    pub item_encoder: Option<Arc<dyn Encoder>>,
    pub item_decoder: Option<Arc<dyn Decoder>>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: Ty) -> Self {
        Self { ty: Some(ty), ..Self::untyped(name) }
    }

    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rename: None,
            ty: None,
            ty_nullable: false,
            required: None,
            allow_null: None,
            default: None,
            item_type: None,
            encoder: None,
            decoder: None,
            item_encoder: None,
            item_decoder: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.ty_nullable = true;
        self
    }

    pub fn rename(mut self, serialized: impl Into<String>) -> Self {
        self.rename = Some(serialized.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn allow_null(mut self, allow: bool) -> Self {
        self.allow_null = Some(allow);
        self
    }

    pub fn default_value(mut self, value: impl Into<Data>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn item_type(mut self, ty: impl Into<String>) -> Self {
        self.item_type = Some(ty.into());
        self
    }

    pub fn encoder(mut self, encoder: Arc<dyn Encoder>) -> Self {
        self.encoder = Some(encoder);
        self
    }

    pub fn decoder(mut self, decoder: Arc<dyn Decoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    pub fn item_encoder(mut self, encoder: Arc<dyn Encoder>) -> Self {
        self.item_encoder = Some(encoder);
        self
    }

    pub fn item_decoder(mut self, decoder: Arc<dyn Decoder>) -> Self {
        self.item_decoder = Some(decoder);
        self
    }

    pub fn serialized_name(&self) -> &str {
        self.rename.as_deref().unwrap_or(&self.name)
    }

    /// Required unless overridden or a default exists.
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(self.default.is_none())
    }

    pub fn type_allows_null(&self) -> bool {
        match &self.ty {
            None => true,
            Some(ty) => self.ty_nullable || ty.admits_null(),
        }
    }

    /// Nullable unless overridden or the declared type forbids null.
    pub fn allows_null(&self) -> bool {
        self.allow_null.unwrap_or_else(|| self.type_allows_null())
    }

    pub fn type_name(&self) -> Option<String> {
        self.ty.as_ref().map(Ty::to_string)
    }

    pub fn maps_items(&self) -> bool {
        self.item_type.is_some() || self.item_decoder.is_some()
    }

    /// Some type information or codec is needed to map anything.
    pub fn is_mappable(&self) -> bool {
        self.ty.is_some()
            || self.encoder.is_some()
            || self.decoder.is_some()
            || self.item_type.is_some()
            || self.item_encoder.is_some()
            || self.item_decoder.is_some()
    }
}

// ------------------------------- Tests ------------------------------------ //
