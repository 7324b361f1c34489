//! Save data for a single file
//!
//! An ordered `key -> token` map plus the serializer used to encode and
//! decode entries. Inert data: it never touches the disk itself.

use std::any::type_name;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{Result, SaveDataError};
use crate::mode::TokenMode;
use crate::serializer::JsonSerializer;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveData {
    data: Map<String, Value>,
    serializer: JsonSerializer,
}

impl SaveData {
    pub fn empty(serializer: JsonSerializer) -> Self {
        Self {
            data: Map::new(),
            serializer,
        }
    }

    pub fn loaded(data: Map<String, Value>, serializer: JsonSerializer) -> Self {
        Self { data, serializer }
    }

    /// Whole document as a token tree
    pub fn saved_token(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn into_token(self) -> Map<String, Value> {
        self.data
    }

    pub fn serializer(&self) -> &JsonSerializer {
        &self.serializer
    }

    /// Encode `value` with `mode` and store it at `key`, replacing any
    /// previous entry
    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T, mode: TokenMode) -> Result<()> {
        let token = (mode.encoder::<T>())(&self.serializer, value).map_err(|source| {
            SaveDataError::Encoding {
                key: key.to_string(),
                type_name: type_name::<T>(),
                source,
            }
        })?;
        self.data.insert(key.to_string(), token);
        Ok(())
    }

    /// Decode the entry at `key` as `T`
    ///
    /// Returns `None` when the key is absent, or when the stored token can't
    /// be read as `T` (logged, since stale or foreign data is expected).
    pub fn try_get<T>(&self, key: &str, mode: TokenMode) -> Option<T>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        let existing = self.data.get(key)?;
        match (mode.decoder::<T>())(&self.serializer, existing) {
            Ok(value) => Some(value),
            Err(err) => {
                log::error!(
                    "Failed to load data of type {} for key {}. Raw json: {}",
                    type_name::<T>(),
                    key,
                    raw_json(existing)
                );
                log::debug!("{} decode error for key {key}: {err}", mode.as_str());
                None
            }
        }
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Remove `key`; true if it was present
    pub fn delete_key(&mut self, key: &str) -> bool {
        self.data.shift_remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }
}

/// Strings are shown bare, everything else as compact JSON
fn raw_json(token: &Value) -> String {
    match token {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
