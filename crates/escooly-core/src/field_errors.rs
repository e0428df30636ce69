//! Flattened validation errors.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Field name to a single error message, in the order the server sent them.
///
/// Servers report validation failures as `{"field": ["msg", ...]}`. Forms
/// only show one message per field, so each list is reduced to its first
/// entry (an empty list becomes `""`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(String, String)>,
}

impl FieldErrors {
    /// Flatten a server `errors` object.
    ///
    /// Returns `None` if `errors` is not a JSON object. A bare string value
    /// is treated as a one-message list; any other value flattens to `""`.
    pub fn flatten(errors: &Value) -> Option<Self> {
        let map = errors.as_object()?;
        Some(Self::from_map(map))
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        let entries = map
            .iter()
            .map(|(field, messages)| {
                let first = match messages {
                    Value::Array(list) => list.first().and_then(Value::as_str).unwrap_or(""),
                    Value::String(message) => message.as_str(),
                    _ => "",
                };
                (field.clone(), first.to_string())
            })
            .collect();
        Self { entries }
    }

    /// Message for a field, if the server reported one.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, message)| message.as_str())
    }

    /// The first reported message, used for the one-line notification.
    pub fn first_message(&self) -> Option<&str> {
        self.entries.first().map(|(_, message)| message.as_str())
    }

    /// Iterate `(field, message)` pairs in server order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The flattened map as a JSON object.
    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(field, message)| (field.clone(), Value::String(message.clone())))
            .collect();
        Value::Object(map)
    }
}

impl Serialize for FieldErrors {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.iter())
    }
}
