//! Save/load persistence
//!
//! Features:
//! - `PersistText`: text channel keyed by logical file name
//! - File system and in-memory channels
//! - `PersistSaves`: writes/reads whole `SaveData` documents through a channel
//! - Malformed files are reported and skipped, never propagated

pub mod file_system;
pub mod memory;

pub use file_system::FileSystemPersistence;
pub use memory::MemoryPersistence;

use std::io::{self, Read, Write};

use crate::error::Result;
use crate::save_data::SaveData;
use crate::serializer::JsonSerializer;

/// Scoped text read/write keyed by a logical name
///
/// Sinks and sources are released when dropped.
pub trait PersistText: Send {
    /// Open a sink for `context_key`, creating or truncating it
    fn write_to(&self, context_key: &str) -> io::Result<Box<dyn Write + '_>>;

    /// Open a source for `context_key`, or `None` if nothing is stored there
    fn read_from(&self, context_key: &str) -> io::Result<Option<Box<dyn Read + '_>>>;

    fn delete(&self, context_key: &str) -> io::Result<()>;

    /// Remove every file managed by this channel
    fn delete_all(&self) -> io::Result<()>;
}

/// Persist and load [`SaveData`] through any [`PersistText`]
pub trait PersistSaves {
    /// Write `save` as one JSON document under `context_key`
    fn persist_save_to(&self, context_key: &str, save: &SaveData) -> Result<()>;

    /// Load the document under `context_key`
    ///
    /// `Ok(None)` when nothing is stored there, or when the stored text is not
    /// a JSON object (logged with the raw text).
    fn load_save_from(
        &self,
        context_key: &str,
        serializer: &JsonSerializer,
    ) -> Result<Option<SaveData>>;
}

impl<P: PersistText + ?Sized> PersistSaves for P {
    fn persist_save_to(&self, context_key: &str, save: &SaveData) -> Result<()> {
        let mut writer = self.write_to(context_key)?;
        save.serializer()
            .write_document(&mut writer, save.saved_token())?;
        writer.flush()?;
        Ok(())
    }

    fn load_save_from(
        &self,
        context_key: &str,
        serializer: &JsonSerializer,
    ) -> Result<Option<SaveData>> {
        let Some(mut reader) = self.read_from(context_key)? else {
            return Ok(None);
        };
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        drop(reader);

        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => {
                log::error!(
                    "Failed to load data for {context_key}.json, malformed Json. Raw json: {}",
                    String::from_utf8_lossy(err.as_bytes())
                );
                log::error!("{err}");
                return Ok(None);
            }
        };

        match serializer.parse_document(&text) {
            Ok(data) => Ok(Some(SaveData::loaded(data, *serializer))),
            Err(err) => {
                log::error!(
                    "Failed to load data for {context_key}.json, malformed Json. Raw json: {text}"
                );
                log::error!("{err}");
                Ok(None)
            }
        }
    }
}
