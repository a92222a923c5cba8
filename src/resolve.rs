//! Type resolution: builtin checks, named dispatch and union trials.
use serde_json::Value;
use tracing::trace;

use crate::de::Deserializer;
use crate::error::Error;
use crate::ir::{Builtin, SELF_TYPE, Ty};
use crate::value::Data;

const INTERSECTION_UNSUPPORTED: &str = "Intersection types are not supported";

/// Whether a raw value has the shape a builtin kind requires.
pub fn check_builtin(kind: Builtin, value: &Value) -> bool {
    match kind {
        Builtin::Bool => value.is_boolean(),
        Builtin::Int => value.is_i64(),
        Builtin::Float => value.is_number(),
        Builtin::String => value.is_string(),
        Builtin::Array => value.is_array() || value.is_object(),
        Builtin::Object => value.is_array() || value.is_object(),
        Builtin::Mixed => true,
        Builtin::False => value == &Value::Bool(false),
        Builtin::True => value == &Value::Bool(true),
    }
}

fn builtin_data(kind: Builtin, value: &Value) -> Data {
    match (kind, value) {
        (Builtin::Float, Value::Number(n)) => Data::Float(n.as_f64().unwrap_or(f64::NAN)),
        _ => Data::from(value),
    }
}

fn intersection_error(path: &str, ty: &Ty) -> Error {
    Error::unsupported_type(path, ty.to_string(), Some(INTERSECTION_UNSUPPORTED))
}

impl Deserializer<'_> {
    /// Resolve `value` against `ty` at `path` (the field path).
    pub(crate) fn resolve(&self, ty: &Ty, value: &Value, path: &str) -> Result<Data, Error> {
        match ty {
            Ty::Builtin(kind) => {
                if !check_builtin(*kind, value) {
                    return Err(Error::incorrect_type(path, kind.name(), value.clone()));
                }
                Ok(builtin_data(*kind, value))
            }
            Ty::Named(name) => self.resolve_named(name, value, path),
            Ty::Reserved(name) => Err(Error::unsupported_type(path, name.as_str(), None)),
            Ty::Union(members) => self.resolve_union(members, value, path),
            Ty::Intersection(_) => Err(intersection_error(path, ty)),
        }
    }

    fn resolve_named(&self, name: &str, value: &Value, path: &str) -> Result<Data, Error> {
        if name == SELF_TYPE {
            return self.decode(value, path);
        }
        Deserializer::new(self.registry(), name).decode(value, path)
    }

    /// First member that accepts the value wins.
    fn resolve_union(&self, members: &[Ty], value: &Value, path: &str) -> Result<Data, Error> {
        let mut attempted = Vec::with_capacity(members.len());
        for member in members {
            if let Ty::Intersection(_) = member {
                return Err(intersection_error(path, member));
            }
            attempted.push(member.to_string());
            match self.resolve(member, value, path) {
                Ok(data) => return Ok(data),
                Err(error) if error.is_invalid_input() => {
                    trace!(path, member = %member, %error, "union member rejected value");
                }
                Err(error) => return Err(error),
            }
        }
        Err(Error::incorrect_type(path, attempted.join("|"), value.clone()))
    }

    /// Whether an already decoded value conforms to `ty`.
    pub(crate) fn admits(&self, ty: &Ty, data: &Data) -> bool {
        match ty {
            Ty::Builtin(kind) => match kind {
                Builtin::Bool => matches!(data, Data::Bool(_)),
                Builtin::Int => matches!(data, Data::Int(_)),
                Builtin::Float => matches!(data, Data::Float(_) | Data::Int(_)),
                Builtin::String => matches!(data, Data::String(_)),
                Builtin::Array => data.is_collection(),
                Builtin::Object => {
                    matches!(data, Data::List(_) | Data::Map(_) | Data::Object(_) | Data::Native(_))
                }
                Builtin::Mixed => true,
                Builtin::False => matches!(data, Data::Bool(false)),
                Builtin::True => matches!(data, Data::Bool(true)),
            },
            Ty::Named(name) => {
                let name = if name == SELF_TYPE { self.type_name() } else { name.as_str() };
                match data {
                    Data::Object(o) => o.type_name() == name,
                    Data::Enum(e) => e.enum_type == name,
                    Data::Native(n) => n.type_name() == name,
                    _ => false,
                }
            }
            Ty::Union(members) => members.iter().any(|member| self.admits(member, data)),
            Ty::Reserved(_) | Ty::Intersection(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Registry;
    use serde_json::json;

    #[test]
    fn builtin_checks() {
        assert!(check_builtin(Builtin::Int, &json!(1)));
        assert!(!check_builtin(Builtin::Int, &json!(1.5)));
        assert!(!check_builtin(Builtin::Int, &json!("1")));
        assert!(check_builtin(Builtin::Float, &json!(1)));
        assert!(check_builtin(Builtin::Float, &json!(1.5)));
        assert!(check_builtin(Builtin::Array, &json!([1])));
        assert!(check_builtin(Builtin::Array, &json!({"k": 1})));
        assert!(check_builtin(Builtin::Object, &json!([1])));
        assert!(check_builtin(Builtin::Object, &json!({"k": 1})));
        assert!(!check_builtin(Builtin::Object, &json!("k")));
        assert!(check_builtin(Builtin::Mixed, &Value::Null));
        assert!(check_builtin(Builtin::False, &json!(false)));
        assert!(!check_builtin(Builtin::False, &json!(true)));
        assert!(check_builtin(Builtin::True, &json!(true)));
        assert!(!check_builtin(Builtin::Bool, &json!(0)));
    }

    #[test]
    fn float_widens_ints() {
        let registry = Registry::new();
        let de = Deserializer::new(&registry, "Any");
        assert_eq!(de.resolve(&Ty::float(), &json!(1), ".f").unwrap(), Data::Float(1.0));
    }

    #[test]
    fn union_prefers_first_matching_member() {
        let registry = Registry::new();
        let de = Deserializer::new(&registry, "Any");
        let ty = Ty::union([Ty::int(), Ty::bool()]);
        assert_eq!(de.resolve(&ty, &json!(true), ".u").unwrap(), Data::Bool(true));
        assert_eq!(de.resolve(&ty, &json!(1), ".u").unwrap(), Data::Int(1));

        let ty = Ty::union([Ty::float(), Ty::int()]);
        assert_eq!(de.resolve(&ty, &json!(1), ".u").unwrap(), Data::Float(1.0));
    }

    #[test]
    fn union_failure_names_every_member() {
        let registry = Registry::new();
        let de = Deserializer::new(&registry, "Any");
        let ty = Ty::union([Ty::int(), Ty::bool()]);
        let err = de.resolve(&ty, &json!("not-either"), ".boolOrInt").unwrap_err();
        assert_eq!(err.to_string(), "Expected '.boolOrInt' to be 'int|bool' found: \"not-either\"");
    }

    #[test]
    fn intersections_fail_directly_and_inside_unions() {
        let registry = Registry::new();
        let de = Deserializer::new(&registry, "Any");
        let inter = Ty::intersection([Ty::named("Throwable"), Ty::named("Iterator")]);
        let direct = de.resolve(&inter, &json!("123"), ".x").unwrap_err();
        let nested = de.resolve(&Ty::union([Ty::bool(), inter.clone()]), &json!("123"), ".x").unwrap_err();
        assert_eq!(direct.to_string(), nested.to_string());
        assert_eq!(
            direct.to_string(),
            "Unsupported type 'Throwable&Iterator' for property '.x': Intersection types are not supported"
        );
    }

    #[test]
    fn union_propagates_configuration_errors() {
        let registry = Registry::new();
        let de = Deserializer::new(&registry, "Any");
        let ty = Ty::union([Ty::named("Missing"), Ty::bool()]);
        assert!(matches!(de.resolve(&ty, &json!(true), ".u"), Err(Error::UnknownType(_))));
    }

    #[test]
    fn reserved_kinds_are_unsupported() {
        let registry = Registry::new();
        let de = Deserializer::new(&registry, "Any");
        let err = de.resolve(&Ty::Reserved("iterable".into()), &json!([]), ".it").unwrap_err();
        assert!(matches!(err, Error::UnsupportedType { ref ty, .. } if ty == "iterable"));
    }
}
