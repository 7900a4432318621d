use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Loosely-typed OpenStreetMap style tag bag.
///
/// Both Overpass `tags` and OpenCage `components`/`annotations.OSM` arrive as
/// flat JSON objects whose values are usually, but not always, strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OsmTags(BTreeMap<String, Value>);

impl OsmTags {
    /// Non-empty string form of a tag. Numbers and booleans are stringified;
    /// nested values are ignored.
    pub fn get(&self, key: &str) -> Option<String> {
        let text = match self.0.get(key)? {
            Value::String(text) => text.clone(),
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => flag.to_string(),
            Value::Null | Value::Array(_) | Value::Object(_) => return None,
        };

        (!text.is_empty()).then_some(text)
    }

    /// First key in `keys` holding a non-empty value.
    pub fn first_of(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.get(key))
    }
}

impl<K, V> FromIterator<(K, V)> for OsmTags
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
