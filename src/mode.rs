//! Encoding mode dispatch
//!
//! Each [`TokenMode`] maps to an `(encode, decode)` pair of plain functions.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{DecodeError, EncodeError};
use crate::serializer::JsonSerializer;
use crate::structural;

/// Which serializer pipeline governs an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenMode {
    /// Type-aware serde pipeline: primitives, enums, collections and
    /// polymorphic families. Strict on mismatch.
    Generic,
    /// Field-introspection pipeline: objects only, no discriminators,
    /// lenient on mismatch.
    Structural,
}

pub type EncodeFn<T> = fn(&JsonSerializer, &T) -> Result<Value, EncodeError>;
pub type DecodeFn<T> = fn(&JsonSerializer, &Value) -> Result<T, DecodeError>;

impl TokenMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenMode::Generic => "generic",
            TokenMode::Structural => "structural",
        }
    }

    pub fn encoder<T: Serialize + ?Sized>(self) -> EncodeFn<T> {
        match self {
            TokenMode::Generic => |serializer, value| serializer.to_token(value),
            TokenMode::Structural => |_, value| structural::encode(value),
        }
    }

    pub fn decoder<T>(self) -> DecodeFn<T>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        match self {
            TokenMode::Generic => |serializer, token| serializer.from_token(token),
            TokenMode::Structural => |_, token| structural::decode(token),
        }
    }
}
