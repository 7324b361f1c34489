//! Generic JSON serializer
//!
//! Converts typed values to and from `serde_json::Value` tokens, and writes or
//! parses whole documents. Behaviour is controlled by [`SerializerSettings`]:
//! - discriminator emission (`TypeHints`)
//! - null handling for top-level document entries
//! - indentation of written documents
//! - scalar coercion when a stored scalar doesn't match the requested type

use std::io::Write;

use serde::Serialize;
use serde::Serializer as _;
use serde::de::DeserializeOwned;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Number, Value};

use crate::error::{DecodeError, EncodeError};
use crate::finite::ensure_finite;
use crate::poly::strip_type_hints;

/// When to keep `$type` discriminators in encoded tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeHints {
    /// Only where the runtime type differs from the declared one
    #[default]
    Auto,
    /// Never; polymorphic slots always read back as their base type
    Never,
}

/// How null-valued top-level entries are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullValues {
    Include,
    #[default]
    Ignore,
}

/// Layout of written documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Formatting {
    /// Two-space pretty printing
    #[default]
    Indented,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializerSettings {
    pub type_hints: TypeHints,
    pub null_values: NullValues,
    pub formatting: Formatting,
    /// Read numbers/bools as strings and numeric or boolean strings as scalars
    pub coerce_scalars: bool,
}

impl Default for SerializerSettings {
    fn default() -> Self {
        Self {
            type_hints: TypeHints::Auto,
            null_values: NullValues::Ignore,
            formatting: Formatting::Indented,
            coerce_scalars: true,
        }
    }
}

/// Configured generic serializer instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonSerializer {
    settings: SerializerSettings,
}

impl JsonSerializer {
    pub fn new(settings: SerializerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SerializerSettings {
        &self.settings
    }

    /// Encode a value into a token
    pub fn to_token<T: Serialize + ?Sized>(&self, value: &T) -> Result<Value, EncodeError> {
        ensure_finite(value)?;
        let mut token = serde_json::to_value(value)?;
        if self.settings.type_hints == TypeHints::Never {
            strip_type_hints(&mut token);
        }
        Ok(token)
    }

    /// Decode a token into `T`, falling back to a coerced scalar if allowed
    pub fn from_token<T: DeserializeOwned>(&self, token: &Value) -> Result<T, DecodeError> {
        let err = match T::deserialize(token) {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if self.settings.coerce_scalars {
            if let Some(coerced) = coerce_scalar(token) {
                if let Ok(value) = T::deserialize(&coerced) {
                    return Ok(value);
                }
            }
        }
        Err(err.into())
    }

    /// Write a document's entries as one JSON object
    pub fn write_document<W: Write>(
        &self,
        writer: W,
        entries: &Map<String, Value>,
    ) -> serde_json::Result<()> {
        let skip_nulls = self.settings.null_values == NullValues::Ignore;
        let kept = entries.iter().filter(|(_, v)| !(skip_nulls && v.is_null()));

        match self.settings.formatting {
            Formatting::Indented => {
                let mut ser = serde_json::Serializer::with_formatter(
                    writer,
                    PrettyFormatter::with_indent(b"  "),
                );
                (&mut ser).collect_map(kept)
            }
            Formatting::None => {
                let mut ser = serde_json::Serializer::new(writer);
                (&mut ser).collect_map(kept)
            }
        }
    }

    /// Parse document text; anything but a JSON object is an error
    pub fn parse_document(&self, text: &str) -> serde_json::Result<Map<String, Value>> {
        serde_json::from_str(text)
    }
}

/// Alternative reading of a scalar token, if it has one
fn coerce_scalar(token: &Value) -> Option<Value> {
    match token {
        Value::Number(n) => Some(Value::String(n.to_string())),
        Value::Bool(b) => Some(Value::String(b.to_string())),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(b) = s.parse::<bool>() {
                Some(Value::Bool(b))
            } else if let Ok(i) = s.parse::<i64>() {
                Some(Value::Number(i.into()))
            } else if let Ok(u) = s.parse::<u64>() {
                Some(Value::Number(u.into()))
            } else {
                s.parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
            }
        }
        _ => None,
    }
}
