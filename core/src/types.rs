//! The todo record as it is stored and returned.
//!
//! # Design
//! Field names match case-insensitively (`"ID"`, `"Text"`), missing or `null`
//! fields decode to their zero values (`""` / `false`) and unknown fields are
//! ignored. A top-level `null` is an empty record. Anything else that is not
//! a JSON object is rejected.

use std::fmt;

use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// A single todo item. `id` is supplied by the caller and doubles as the
/// suffix of the storage key.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Todo {
    pub id: String,
    pub text: String,
    pub done: bool,
}

impl Todo {
    pub fn new(id: impl Into<String>, text: impl Into<String>, done: bool) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            done,
        }
    }

    /// Decode the first JSON value in `bytes`. Anything after it is ignored;
    /// an empty or whitespace-only input is an end-of-input error.
    pub fn decode_first(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let mut values = serde_json::Deserializer::from_slice(bytes).into_iter::<Todo>();
        match values.next() {
            Some(result) => result,
            None => serde_json::from_slice::<Todo>(bytes),
        }
    }
}

impl<'de> Deserialize<'de> for Todo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TodoVisitor)
    }
}

struct TodoVisitor;

impl<'de> Visitor<'de> for TodoVisitor {
    type Value = Todo;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a todo object")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Todo, E> {
        Ok(Todo::default())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Todo, A::Error> {
        let mut todo = Todo::default();
        while let Some(key) = map.next_key::<String>()? {
            if key.eq_ignore_ascii_case("id") {
                todo.id = map.next_value::<Option<String>>()?.unwrap_or_default();
            } else if key.eq_ignore_ascii_case("text") {
                todo.text = map.next_value::<Option<String>>()?.unwrap_or_default();
            } else if key.eq_ignore_ascii_case("done") {
                todo.done = map.next_value::<Option<bool>>()?.unwrap_or_default();
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(todo)
    }
}
