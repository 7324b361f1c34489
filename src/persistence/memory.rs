//! In-memory text channel
//!
//! Cheap to clone; clones share the same files. Writes land when the sink is
//! flushed or dropped.

use std::collections::BTreeMap;
use std::io::{self, Cursor, Read, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use super::PersistText;

#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    files: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the given `(name, text)` files
    pub fn with_files<I, K, V>(files: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        {
            let mut map = store.files.lock();
            for (name, text) in files {
                map.insert(name.into(), text.into().into_bytes());
            }
        }
        store
    }

    pub fn insert(&self, context_key: &str, text: &str) {
        self.insert_bytes(context_key, text.as_bytes().to_vec());
    }

    pub fn insert_bytes(&self, context_key: &str, bytes: Vec<u8>) {
        self.files.lock().insert(context_key.to_string(), bytes);
    }

    /// Stored text for `context_key`
    pub fn file(&self, context_key: &str) -> Option<String> {
        self.files
            .lock()
            .get(context_key)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn names(&self) -> Vec<String> {
        self.files.lock().keys().cloned().collect()
    }
}

impl PersistText for MemoryPersistence {
    fn write_to(&self, context_key: &str) -> io::Result<Box<dyn Write + '_>> {
        self.files.lock().insert(context_key.to_string(), Vec::new());
        Ok(Box::new(MemoryWriter {
            files: &self.files,
            context_key: context_key.to_string(),
            buffer: Vec::new(),
        }))
    }

    fn read_from(&self, context_key: &str) -> io::Result<Option<Box<dyn Read + '_>>> {
        let Some(bytes) = self.files.lock().get(context_key).cloned() else {
            log::warn!("No file found for {context_key}");
            return Ok(None);
        };
        Ok(Some(Box::new(Cursor::new(bytes))))
    }

    fn delete(&self, context_key: &str) -> io::Result<()> {
        self.files.lock().remove(context_key);
        Ok(())
    }

    fn delete_all(&self) -> io::Result<()> {
        self.files.lock().clear();
        Ok(())
    }
}

/// Buffers writes and replaces the stored file on flush/drop
struct MemoryWriter<'a> {
    files: &'a Mutex<BTreeMap<String, Vec<u8>>>,
    context_key: String,
    buffer: Vec<u8>,
}

impl Write for MemoryWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.files
            .lock()
            .insert(self.context_key.clone(), self.buffer.clone());
        Ok(())
    }
}

impl Drop for MemoryWriter<'_> {
    fn drop(&mut self) {
        let buffer = std::mem::take(&mut self.buffer);
        self.files.lock().insert(std::mem::take(&mut self.context_key), buffer);
    }
}
