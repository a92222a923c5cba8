use indexmap::IndexMap;
use serde_json::Value;
use tracing::trace;

use super::Deserializer;
use crate::error::Error;
use crate::ir::{Field, SELF_TYPE};
use crate::value::Data;

impl Deserializer<'_> {
    /// Map every element of a raw collection on its own, keeping keys and order.
    pub(crate) fn decode_items(&self, field: &Field, raw: &Value, path: &str) -> Result<Data, Error> {
        match raw {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| self.decode_item(field, item, &format!("{path}.{index}")))
                .collect::<Result<Vec<_>, _>>()
                .map(Data::List),
            Value::Object(entries) => entries
                .iter()
                .map(|(key, item)| Ok((key.clone(), self.decode_item(field, item, &format!("{path}.{key}"))?)))
                .collect::<Result<IndexMap<_, _>, Error>>()
                .map(Data::Map),
            other => Ok(Data::from(other)),
        }
    }

    fn decode_item(&self, field: &Field, item: &Value, path: &str) -> Result<Data, Error> {
        trace!(path, "decoding collection item");
        if let Some(decoder) = &field.item_decoder {
            return decoder.decode(item, path, self.registry());
        }
        match field.item_type.as_deref() {
            Some(SELF_TYPE) => self.decode(item, path),
            Some(item_type) => Deserializer::new(self.registry(), item_type).decode(item, path),
            None => Ok(Data::from(item)),
        }
    }
}
