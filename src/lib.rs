//! Simple Save - key/value JSON save files for games
//!
//! Core modules:
//! - `save_data`: One save file's entries, encoded per key
//! - `mode`: Generic vs structural encoding dispatch
//! - `serializer`: Configured generic JSON serializer
//! - `structural`: Lenient field-introspection encoding
//! - `poly`: Polymorphic families and the `$type` discriminator
//! - `persistence`: Text channels and document save/load
//! - `context`: Explicit save context (current file + channel + serializer)
//! - `simple_save`: Process-wide convenience wrapper around one context
//! - `settings`: Save folder/file/serializer configuration

pub mod context;
pub mod error;
mod finite;
pub mod mode;
pub mod persistence;
pub mod poly;
pub mod save_data;
pub mod serializer;
pub mod settings;
pub mod simple_save;
pub mod structural;

#[cfg(test)]
mod test_support;

pub use context::SaveContext;
pub use error::{DecodeError, EncodeError, Result, SaveDataError};
pub use mode::TokenMode;
pub use persistence::{FileSystemPersistence, MemoryPersistence, PersistSaves, PersistText};
pub use poly::{Poly, Polymorphic, SaveType, TYPE_KEY, TypeTag};
pub use save_data::SaveData;
pub use serializer::{Formatting, JsonSerializer, NullValues, SerializerSettings, TypeHints};
pub use settings::{SaveSystemSettings, SerializationType};

/// Re-exports used by the `polymorphic!` macro
#[doc(hidden)]
pub mod __private {
    pub use serde;
    pub use serde_json;

    pub use crate::finite::ensure_finite;
}
