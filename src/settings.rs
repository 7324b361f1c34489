//! Save system settings
//!
//! Read once when the default save context is first used. Changes made after
//! that are ignored unless forced through
//! [`simple_save::force_override_settings`](crate::simple_save::force_override_settings).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::context::SaveContext;
use crate::error::{Result, SaveDataError};
use crate::persistence::FileSystemPersistence;
use crate::serializer::{JsonSerializer, SerializerSettings, TypeHints};

/// Settings file looked up by the default save context
pub const SETTINGS_FILE: &str = "simple_save_settings.json";

/// Serializer presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SerializationType {
    /// Indented, type hints where needed, nulls omitted, scalar coercion
    #[default]
    Standard,
    /// Same as `Standard` but never writes type hints
    Plain,
}

impl SerializationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SerializationType::Standard => "Standard",
            SerializationType::Plain => "Plain",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "standard" => Some(SerializationType::Standard),
            "plain" => Some(SerializationType::Plain),
            _ => None,
        }
    }

    pub fn serializer_settings(&self) -> SerializerSettings {
        match self {
            SerializationType::Standard => SerializerSettings::default(),
            SerializationType::Plain => SerializerSettings {
                type_hints: TypeHints::Never,
                ..SerializerSettings::default()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SaveSystemSettings {
    /// Base directory for all save folders
    pub persistent_data_path: PathBuf,
    /// Folder under `persistent_data_path` holding the save files
    pub save_folder_name: String,
    /// Save file used until the first `change_save_file`
    pub default_save_file_name: String,
    pub serialization_type: SerializationType,
}

impl Default for SaveSystemSettings {
    fn default() -> Self {
        Self {
            persistent_data_path: PathBuf::from("."),
            save_folder_name: "SaveContexts".to_string(),
            default_save_file_name: "root".to_string(),
            serialization_type: SerializationType::Standard,
        }
    }
}

impl SaveSystemSettings {
    pub fn new(
        persistent_data_path: impl Into<PathBuf>,
        save_folder_name: &str,
        default_save_file_name: &str,
    ) -> Self {
        Self {
            persistent_data_path: persistent_data_path.into(),
            save_folder_name: save_folder_name.to_string(),
            default_save_file_name: default_save_file_name.to_string(),
            ..Self::default()
        }
    }

    pub fn full_save_folder_path(&self) -> PathBuf {
        self.persistent_data_path.join(&self.save_folder_name)
    }

    pub fn create_serializer(&self) -> JsonSerializer {
        JsonSerializer::new(self.serialization_type.serializer_settings())
    }

    /// Context writing to [`full_save_folder_path`](Self::full_save_folder_path)
    pub fn create_context(&self) -> SaveContext {
        SaveContext::new(
            Box::new(FileSystemPersistence::at_folder(self.full_save_folder_path())),
            self.create_serializer(),
            &self.default_save_file_name,
        )
    }

    /// Read settings from a JSON file; missing keys take their defaults
    pub fn try_load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&json)
            .map_err(|e| SaveDataError::Settings(format!("{}: {e}", path.display())))?;
        if settings.save_folder_name.is_empty() || settings.default_save_file_name.is_empty() {
            return Err(SaveDataError::Settings(format!(
                "{}: folder and file names must not be empty",
                path.display()
            )));
        }
        Ok(settings)
    }

    /// Read settings from a JSON file, or use defaults
    pub fn load(path: &Path) -> Self {
        if path.is_file() {
            match Self::try_load(path) {
                Ok(settings) => {
                    log::info!("Loaded save system settings from {}", path.display());
                    return settings;
                }
                Err(err) => log::warn!("Ignoring save system settings: {err}"),
            }
        }

        log::info!("Using default save system settings");
        Self::default()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Save system settings saved");
        Ok(())
    }
}
