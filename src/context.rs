//! Save context
//!
//! Owns one text channel, one serializer and the save data of the current
//! file. The current file is loaded lazily on first access; a missing or
//! malformed file starts out empty. A file that can't be read at all also
//! starts out empty, but then refuses to be saved over until a `refresh`
//! succeeds.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Result, SaveDataError};
use crate::mode::TokenMode;
use crate::persistence::{PersistSaves, PersistText};
use crate::save_data::SaveData;
use crate::serializer::JsonSerializer;

pub struct SaveContext {
    persistence: Box<dyn PersistText>,
    serializer: JsonSerializer,
    default_save_file_name: String,
    save_file_name: String,
    current: Option<SaveData>,
    load_failed: bool,
}

impl SaveContext {
    pub fn new(
        persistence: Box<dyn PersistText>,
        serializer: JsonSerializer,
        save_file_name: &str,
    ) -> Self {
        Self {
            persistence,
            serializer,
            default_save_file_name: save_file_name.to_string(),
            save_file_name: save_file_name.to_string(),
            current: None,
            load_failed: false,
        }
    }

    pub fn save_file_name(&self) -> &str {
        &self.save_file_name
    }

    pub fn persistence(&self) -> &dyn PersistText {
        self.persistence.as_ref()
    }

    pub fn serializer(&self) -> &JsonSerializer {
        &self.serializer
    }

    fn load_current(&mut self) -> Option<SaveData> {
        match self
            .persistence
            .load_save_from(&self.save_file_name, &self.serializer)
        {
            Ok(loaded) => loaded,
            Err(err) => {
                log::error!("Failed to read save file {}: {err}", self.save_file_name);
                self.load_failed = true;
                None
            }
        }
    }

    /// Save data of the current file, loading it on first access
    pub fn current(&mut self) -> &mut SaveData {
        if self.current.is_none() {
            self.current = self.load_current();
        }
        let serializer = self.serializer;
        self.current
            .get_or_insert_with(|| SaveData::empty(serializer))
    }

    /// Write the current file to disk
    ///
    /// Fails without writing when the file could not be read on first access.
    pub fn save(&mut self) -> Result<()> {
        self.current();
        if self.load_failed {
            return Err(SaveDataError::NotLoaded {
                file: self.save_file_name.clone(),
            });
        }
        let Self {
            persistence,
            save_file_name,
            current,
            ..
        } = self;
        match current {
            Some(data) => {
                log::debug!("Saving {} entries to {save_file_name}", data.len());
                persistence.persist_save_to(save_file_name, data)
            }
            None => Ok(()),
        }
    }

    /// Reload the current file, discarding unsaved changes
    ///
    /// In-memory data is kept when the file is missing or malformed.
    pub fn refresh(&mut self) -> Result<()> {
        let loaded = self
            .persistence
            .load_save_from(&self.save_file_name, &self.serializer)?;
        self.load_failed = false;
        if let Some(loaded) = loaded {
            self.current = Some(loaded);
        }
        Ok(())
    }

    /// Switch to another save file, saving the current one first
    ///
    /// Does nothing (and touches no files) when `name` is already current.
    pub fn change_save_file(&mut self, name: &str) -> Result<()> {
        if name == self.save_file_name {
            return Ok(());
        }
        self.save()?;
        log::info!("Switching save file {} -> {name}", self.save_file_name);
        self.save_file_name = name.to_string();
        self.current = None;
        self.load_failed = false;
        self.refresh()
    }

    pub fn change_save_file_to_default(&mut self) -> Result<()> {
        let name = self.default_save_file_name.clone();
        self.change_save_file(&name)
    }

    /// Value at `key`, or `default` when absent or unreadable as `T`
    pub fn get<T>(&mut self, key: &str, default: T, mode: TokenMode) -> T
    where
        T: Serialize + DeserializeOwned + Default,
    {
        self.current().try_get(key, mode).unwrap_or(default)
    }

    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T, mode: TokenMode) -> Result<()> {
        self.current().set(key, value, mode)
    }

    pub fn get_string(&mut self, key: &str, default: &str) -> String {
        self.get(key, default.to_string(), TokenMode::Generic)
    }

    pub fn set_string(&mut self, key: &str, value: &str) -> Result<()> {
        self.set(key, value, TokenMode::Generic)
    }

    pub fn get_int(&mut self, key: &str, default: i32) -> i32 {
        self.get(key, default, TokenMode::Generic)
    }

    pub fn set_int(&mut self, key: &str, value: i32) -> Result<()> {
        self.set(key, &value, TokenMode::Generic)
    }

    pub fn get_float(&mut self, key: &str, default: f32) -> f32 {
        self.get(key, default, TokenMode::Generic)
    }

    pub fn set_float(&mut self, key: &str, value: f32) -> Result<()> {
        self.set(key, &value, TokenMode::Generic)
    }

    pub fn get_bool(&mut self, key: &str, default: bool) -> bool {
        self.get(key, default, TokenMode::Generic)
    }

    pub fn set_bool(&mut self, key: &str, value: bool) -> Result<()> {
        self.set(key, &value, TokenMode::Generic)
    }

    pub fn get_enum<E>(&mut self, key: &str, default: E) -> E
    where
        E: Serialize + DeserializeOwned + Default,
    {
        self.get(key, default, TokenMode::Generic)
    }

    pub fn set_enum<E: Serialize>(&mut self, key: &str, value: E) -> Result<()> {
        self.set(key, &value, TokenMode::Generic)
    }

    pub fn has_key(&mut self, key: &str) -> bool {
        self.current().has_key(key)
    }

    pub fn delete_key(&mut self, key: &str) -> bool {
        self.current().delete_key(key)
    }

    /// Clear the current file in memory and on disk
    pub fn delete_all(&mut self) -> Result<()> {
        self.current = Some(SaveData::empty(self.serializer));
        self.persistence.delete(&self.save_file_name)?;
        self.load_failed = false;
        Ok(())
    }

    /// Drop in-memory data without saving; the next access reloads from disk
    pub fn forget_unsaved(&mut self) {
        self.current = None;
        self.load_failed = false;
    }
}

impl std::fmt::Debug for SaveContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveContext")
            .field("save_file_name", &self.save_file_name)
            .field("loaded", &self.current.is_some())
            .field("load_failed", &self.load_failed)
            .finish_non_exhaustive()
    }
}
