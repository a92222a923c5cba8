//! Shared test registry.
use std::sync::Arc;

use serde_json::Value;

use crate::codec::{BackedEnumEncoder, Decoder, Encoder, ObjectEncoder};
use crate::de::Deserializer;
use crate::error::Error;
use crate::ir::{Field, Ty};
use crate::schema::{BackingKind, EnumSchema, ObjectSchema, Registry};
use crate::ser::Serializer;
use crate::value::{Data, EnumValue, SelfSerialize};

/// Opaque string codec: a whole value as embedded JSON text, decoded back
/// into one fixed type.
#[derive(Debug)]
pub struct EmbeddedJson {
    pub type_name: &'static str,
}

impl Encoder for EmbeddedJson {
    fn encode(&self, value: &Data, registry: &Registry) -> Result<Value, Error> {
        let transport = Serializer::new(registry).transport("", value)?;
        Ok(Value::String(serde_json::to_string(&transport)?))
    }
}

impl Decoder for EmbeddedJson {
    fn decode(&self, value: &Value, path: &str, registry: &Registry) -> Result<Data, Error> {
        let text = value.as_str().ok_or_else(|| Error::incorrect_type(path, "string", value.clone()))?;
        let inner: Value =
            serde_json::from_str(text).map_err(|_| Error::incorrect_type(path, "JSON text", value.clone()))?;
        Deserializer::new(registry, self.type_name).decode(&inner, path)
    }
}

#[derive(Debug)]
pub struct Stamp(pub u32);

impl SelfSerialize for Stamp {
    fn type_name(&self) -> &str {
        "Stamp"
    }

    fn to_transport(&self, _registry: &Registry) -> Result<Value, Error> {
        Ok(Value::String(format!("stamp-{}", self.0)))
    }
}

fn embedded(type_name: &'static str) -> Arc<EmbeddedJson> {
    Arc::new(EmbeddedJson { type_name })
}

pub fn registry() -> Registry {
    let mut registry = Registry::new();

    registry.register(
        ObjectSchema::new("TestClass")
            .field(Field::new("name", Ty::string()))
            .field(Field::new("age", Ty::int()).required(false).default_value(0))
            .field(Field::new("originalName", Ty::string()).nullable().rename("changedName").default_value(Data::Null))
            .field(Field::new("nullable", Ty::int()).nullable().required(false).allow_null(false).default_value(Data::Null))
            .field(Field::new("boolOrInt", Ty::union([Ty::int(), Ty::bool()])).default_value(false))
            .field(Field::new("secondTestClass", Ty::named("SecondTestClass")).nullable().default_value(Data::Null))
            .field(Field::new("mixed", Ty::mixed()).default_value(Data::Null))
            .field(Field::new("float", Ty::float()).nullable().default_value(Data::Null))
            .field(Field::new("array", Ty::array()).nullable().required(false).default_value(Data::Null)),
    );

    registry.register(ObjectSchema::new("SecondTestClass").field(Field::new("y", Ty::int())));

    registry.register(
        ObjectSchema::new("SerializerTestClass")
            .field(Field::new("name", Ty::string()))
            .field(Field::new("age", Ty::int()).required(true).default_value(0))
            .field(Field::new("notNullable", Ty::string()).nullable().allow_null(false).default_value("asd"))
            .field(Field::new("secondTestClass", Ty::named("SecondTestClass")).nullable().required(false))
            .field(Field::new("testClass", Ty::named("TestClass")).nullable().required(false)),
    );

    registry.register(
        ObjectSchema::new("DefaultValueTestClass")
            .field(Field::new("intWithDefault", Ty::int()).required(false).default_value(0))
            .field(Field::new("intWithoutDefault", Ty::int()).required(false))
            .field(Field::new("nullableIntWithoutDefault", Ty::int()).nullable().required(false))
            .field(Field::new("stringWithDefault", Ty::string()).required(false).default_value(""))
            .field(Field::new("stringWithoutDefault", Ty::string()).required(false))
            .field(Field::new("nullableStringWithoutDefault", Ty::string()).nullable().required(false)),
    );

    let nullable_with_null_default = |name: &str, ty: Ty| Field::new(name, ty).nullable().default_value(Data::Null);
    registry.register(
        ObjectSchema::new("BuiltInTypeTestClass")
            .field(nullable_with_null_default("int", Ty::int()))
            .field(nullable_with_null_default("float", Ty::float()))
            .field(nullable_with_null_default("string", Ty::string()))
            .field(nullable_with_null_default("array", Ty::array()))
            .field(nullable_with_null_default("object", Ty::object()))
            .field(nullable_with_null_default("self", Ty::self_type()))
            .field(nullable_with_null_default("false", Ty::Builtin(crate::ir::Builtin::False)))
            .field(nullable_with_null_default("true", Ty::Builtin(crate::ir::Builtin::True))),
    );

    registry.register(
        ObjectSchema::new("ArrayTests")
            .field(Field::untyped("untypedArray").item_type("BuiltInTypeTestClass").default_value(Data::List(vec![])))
            .field(Field::new("array", Ty::array()).default_value(Data::List(vec![])))
            .field(Field::new("typedArray", Ty::array()).item_type("BuiltInTypeTestClass").default_value(Data::List(vec![]))),
    );

    let object_items: Arc<dyn Encoder> = Arc::new(ObjectEncoder);
    registry.register(
        ObjectSchema::new("ArraySerializeTests")
            .field(
                Field::untyped("untypedArray")
                    .item_type("BuiltInTypeTestClass")
                    .item_encoder(object_items.clone())
                    .default_value(Data::List(vec![])),
            )
            .field(Field::new("array", Ty::array()).item_encoder(object_items.clone()).default_value(Data::List(vec![])))
            .field(
                Field::new("typedArray", Ty::array())
                    .item_type("BuiltInTypeTestClass")
                    .item_encoder(object_items)
                    .default_value(Data::List(vec![])),
            )
            .field(
                Field::new("backedEnumArray", Ty::array())
                    .item_encoder(Arc::new(BackedEnumEncoder))
                    .default_value(Data::List(vec![Data::Enum(EnumValue::backed("TestBackedEnum", "A", "a"))])),
            )
            .field(Field::new("stringArray", Ty::array()).default_value(Data::List(vec![Data::from("")])))
            .field(Field::new("intArray", Ty::array()).default_value(Data::List(vec![Data::Int(0)]))),
    );

    registry.register(
        ObjectSchema::new("CustomSerializerTestClass")
            .field(
                Field::new("testClass", Ty::named("SecondTestClass"))
                    .encoder(embedded("SecondTestClass"))
                    .decoder(embedded("SecondTestClass")),
            )
            .field(
                Field::new("testArray", Ty::array())
                    .item_encoder(embedded("SecondTestClass"))
                    .item_decoder(embedded("SecondTestClass"))
                    .default_value(Data::List(vec![])),
            ),
    );

    registry.register(
        ObjectSchema::new("CustomSerializerInvalidTypeTestClass")
            .field(
                Field::new("testClass", Ty::named("TestClass"))
                    .encoder(embedded("SecondTestClass"))
                    .decoder(embedded("SecondTestClass")),
            ),
    );

    registry.register(
        ObjectSchema::new("IntersectionTestClass")
            .field(Field::new("x", Ty::intersection([Ty::named("Throwable"), Ty::named("Iterator")]))),
    );
    registry.register(
        ObjectSchema::new("UnionIntersectionTestClass").field(Field::new(
            "x",
            Ty::union([Ty::bool(), Ty::intersection([Ty::named("Throwable"), Ty::named("Iterator")])]),
        )),
    );

    registry.register(
        ObjectSchema::new("BackedEnumTestClass").field(
            Field::new("enum", Ty::named("TestBackedEnum")).default_value(EnumValue::backed("TestBackedEnum", "A", "a")),
        ),
    );
    registry.register(
        ObjectSchema::new("IntBackedEnumTestClass").field(Field::new("level", Ty::named("IntBackedEnum"))),
    );
    registry.register(
        ObjectSchema::new("EnumTestClass")
            .field(Field::new("enum", Ty::named("TestEnum")).default_value(EnumValue::unit("TestEnum", "A"))),
    );
    registry.register_enum(
        EnumSchema::backed("TestBackedEnum", BackingKind::String).case("A", "a").case("B", "b").case("C", "c"),
    );
    registry.register_enum(EnumSchema::backed("IntBackedEnum", BackingKind::Int).case("A", 1).case("B", 2).case("C", 3));
    registry.register_enum(EnumSchema::unit("TestEnum").unit_case("A").unit_case("B"));

    registry.register(ObjectSchema::new("Strict").field(Field::untyped("anything").allow_null(false)));
    registry.register(
        ObjectSchema::new("Lenient").field(Field::new("count", Ty::int()).allow_null(true).required(false)),
    );

    registry
}
