//! Map generic JSON values onto declared object types and back.
pub mod cli;
pub mod codec;
pub mod de;
pub mod decl;
pub mod error;
pub mod ir;
pub mod json;
pub mod resolve;
pub mod schema;
pub mod ser;
pub mod value;

#[cfg(test)]
mod fixtures;

pub use de::Deserializer;
pub use decl::DeclFile;
pub use error::Error;
pub use ir::{Field, Ty};
pub use json::{JsonDeserializer, JsonMapped, JsonSerializer};
pub use schema::{BackingKind, EnumSchema, ObjectSchema, Registry};
pub use ser::Serializer;
pub use value::{Data, EnumValue, Object, SelfSerialize, Slot};
