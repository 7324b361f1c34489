//! Error types for the save system
//!
//! Only encoding and I/O failures surface to callers. Decoding failures and
//! malformed save files are logged and recovered where they happen.

use thiserror::Error;

/// Errors returned by save system operations
#[derive(Debug, Error)]
pub enum SaveDataError {
    /// A value could not be converted to a JSON token
    #[error("Failed to save data for key {key} of type {type_name}: {source}")]
    Encoding {
        key: String,
        type_name: &'static str,
        #[source]
        source: EncodeError,
    },

    /// The text channel failed to open, read or write
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing a document through the serializer failed
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The current file could not be read, so writing it could destroy data
    #[error("Refusing to save {file}: it failed to load, refresh it first")]
    NotLoaded { file: String },

    /// A settings file exists but could not be used
    #[error("invalid save system settings: {0}")]
    Settings(String),
}

/// Why a single value could not be encoded
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error(transparent)]
    Serializer(#[from] serde_json::Error),

    /// Structural mode only understands values with named fields
    #[error("structural encoding needs an object with named fields, got {0}")]
    NotAnObject(&'static str),

    /// NaN and infinities have no JSON representation
    #[error("cannot store non-finite float {0}")]
    NonFinite(f64),
}

/// Why a stored token could not be decoded into the requested type
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error(transparent)]
    Serializer(#[from] serde_json::Error),

    #[error("structural decoding needs an object token, got {0}")]
    NotAnObject(&'static str),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, SaveDataError>;

/// Short name of a token's JSON kind, for diagnostics
pub(crate) fn token_kind(token: &serde_json::Value) -> &'static str {
    match token {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
