//! File system text channel
//!
//! Each logical name maps to `<folder>/<name>.json`. The folder is created on
//! first use.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use super::PersistText;

/// File extension of managed save files
const EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct FileSystemPersistence {
    directory: PathBuf,
}

impl FileSystemPersistence {
    pub fn at_folder(path: impl Into<PathBuf>) -> Self {
        Self {
            directory: path.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the file backing `context_key`
    pub fn file_path(&self, context_key: &str) -> PathBuf {
        self.directory.join(format!("{context_key}.{EXTENSION}"))
    }

    fn ensure_file_path(&self, context_key: &str) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.directory)?;
        Ok(self.file_path(context_key))
    }
}

impl PersistText for FileSystemPersistence {
    fn write_to(&self, context_key: &str) -> io::Result<Box<dyn Write + '_>> {
        let path = self.ensure_file_path(context_key)?;
        log::info!("Saving to {}", path.display());
        Ok(Box::new(BufWriter::new(File::create(path)?)))
    }

    fn read_from(&self, context_key: &str) -> io::Result<Option<Box<dyn Read + '_>>> {
        let path = self.file_path(context_key);
        if !path.is_file() {
            log::warn!("No file found at {}", path.display());
            return Ok(None);
        }
        log::info!("Reading from {}", path.display());
        Ok(Some(Box::new(BufReader::new(File::open(path)?))))
    }

    fn delete(&self, context_key: &str) -> io::Result<()> {
        let path = self.file_path(context_key);
        if path.is_file() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn delete_all(&self) -> io::Result<()> {
        if !self.directory.is_dir() {
            return Ok(());
        }
        for entry in fs::read_dir(&self.directory)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == EXTENSION) {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_folder_and_read_returns_text() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemPersistence::at_folder(dir.path().join("SaveContexts"));
        {
            let mut writer = store.write_to("root").unwrap();
            writer.write_all(b"{\"a\": 1}").unwrap();
            writer.flush().unwrap();
        }
        assert!(store.file_path("root").is_file());

        let mut text = String::new();
        store
            .read_from("root")
            .unwrap()
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "{\"a\": 1}");
    }

    #[test]
    fn test_read_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemPersistence::at_folder(dir.path().join("never-created"));
        assert!(store.read_from("root").unwrap().is_none());
        assert!(!store.directory().exists());
    }

    #[test]
    fn test_write_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemPersistence::at_folder(dir.path());
        fs::write(store.file_path("root"), "a much longer previous save").unwrap();
        {
            let mut writer = store.write_to("root").unwrap();
            writer.write_all(b"{}").unwrap();
        }
        assert_eq!(fs::read_to_string(store.file_path("root")).unwrap(), "{}");
    }

    #[test]
    fn test_delete_and_delete_all_only_touch_json_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemPersistence::at_folder(dir.path());
        fs::write(store.file_path("one"), "{}").unwrap();
        fs::write(store.file_path("two"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "keep me").unwrap();

        store.delete("one").unwrap();
        store.delete("one").unwrap();
        assert!(!store.file_path("one").exists());
        assert!(store.file_path("two").exists());

        store.delete_all().unwrap();
        assert!(!store.file_path("two").exists());
        assert!(dir.path().join("notes.txt").exists());
    }
}
