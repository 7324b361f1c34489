//! Process-wide convenience API
//!
//! A thin wrapper around one default [`SaveContext`], created on first use
//! from [`SaveSystemSettings`] (read from [`SETTINGS_FILE`] when present).
//! Everything here forwards to that context; code that wants its own channel
//! or serializer should hold a `SaveContext` directly.
//!
//! Call [`on_application_quit`] from the host's shutdown path, or keep a
//! [`QuitGuard`] alive for the life of the program, to save on exit.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::context::SaveContext;
use crate::error::Result;
use crate::mode::TokenMode;
use crate::settings::{SETTINGS_FILE, SaveSystemSettings};

/// Mode used by [`get`] and [`set`]
pub const DEFAULT_MODE: TokenMode = TokenMode::Structural;

struct DefaultSave {
    settings: Option<SaveSystemSettings>,
    context: Option<SaveContext>,
}

fn load_settings() -> SaveSystemSettings {
    SaveSystemSettings::load(Path::new(SETTINGS_FILE))
}

impl DefaultSave {
    fn settings(&mut self) -> &SaveSystemSettings {
        self.settings.get_or_insert_with(load_settings)
    }

    fn context(&mut self) -> &mut SaveContext {
        let settings = self.settings.get_or_insert_with(load_settings);
        self.context.get_or_insert_with(|| settings.create_context())
    }
}

static DEFAULT: Lazy<Mutex<DefaultSave>> = Lazy::new(|| {
    Mutex::new(DefaultSave {
        settings: None,
        context: None,
    })
});

fn with_context<R>(f: impl FnOnce(&mut SaveContext) -> R) -> R {
    f(DEFAULT.lock().context())
}

/// Replace the settings used by the default context
///
/// Drops the current default context without saving it. Meant for startup
/// and tests; warns when a context was already in use.
pub fn force_override_settings(settings: SaveSystemSettings, suppress_warning_dangerously: bool) {
    let mut default = DEFAULT.lock();
    if !suppress_warning_dangerously && default.context.is_some() {
        log::warn!(
            "Forcing override of save system settings after they have already been used. \
             This is dangerous and should only be done during startup."
        );
    }
    default.settings = Some(settings);
    default.context = None;
}

pub fn settings() -> SaveSystemSettings {
    DEFAULT.lock().settings().clone()
}

pub fn full_save_folder_path() -> PathBuf {
    DEFAULT.lock().settings().full_save_folder_path()
}

pub fn save_file_name() -> String {
    with_context(|ctx| ctx.save_file_name().to_string())
}

/// Save the current file to disk
pub fn save() -> Result<()> {
    with_context(SaveContext::save)
}

/// Reload the current file from disk, overwriting unsaved changes
///
/// Loading happens automatically on first access; this is only needed to
/// pick up edits made to the file outside this API.
pub fn refresh() -> Result<()> {
    with_context(SaveContext::refresh)
}

/// Change the save file in use, saving the current one first if different
pub fn change_save_file(name: &str) -> Result<()> {
    with_context(|ctx| ctx.change_save_file(name))
}

pub fn change_save_file_to_default() -> Result<()> {
    with_context(SaveContext::change_save_file_to_default)
}

/// Value at `key` (structural mode), or `default`
pub fn get<T>(key: &str, default: T) -> T
where
    T: Serialize + DeserializeOwned + Default,
{
    get_with_mode(key, default, DEFAULT_MODE)
}

pub fn get_with_mode<T>(key: &str, default: T, mode: TokenMode) -> T
where
    T: Serialize + DeserializeOwned + Default,
{
    with_context(|ctx| ctx.get(key, default, mode))
}

/// Store `value` at `key` (structural mode)
pub fn set<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<()> {
    set_with_mode(key, value, DEFAULT_MODE)
}

pub fn set_with_mode<T: Serialize + ?Sized>(key: &str, value: &T, mode: TokenMode) -> Result<()> {
    with_context(|ctx| ctx.set(key, value, mode))
}

pub fn get_string(key: &str, default: &str) -> String {
    with_context(|ctx| ctx.get_string(key, default))
}

pub fn set_string(key: &str, value: &str) -> Result<()> {
    with_context(|ctx| ctx.set_string(key, value))
}

pub fn get_int(key: &str, default: i32) -> i32 {
    with_context(|ctx| ctx.get_int(key, default))
}

pub fn set_int(key: &str, value: i32) -> Result<()> {
    with_context(|ctx| ctx.set_int(key, value))
}

pub fn get_float(key: &str, default: f32) -> f32 {
    with_context(|ctx| ctx.get_float(key, default))
}

pub fn set_float(key: &str, value: f32) -> Result<()> {
    with_context(|ctx| ctx.set_float(key, value))
}

pub fn get_bool(key: &str, default: bool) -> bool {
    with_context(|ctx| ctx.get_bool(key, default))
}

pub fn set_bool(key: &str, value: bool) -> Result<()> {
    with_context(|ctx| ctx.set_bool(key, value))
}

pub fn get_enum<E>(key: &str, default: E) -> E
where
    E: Serialize + DeserializeOwned + Default,
{
    with_context(|ctx| ctx.get_enum(key, default))
}

pub fn set_enum<E: Serialize>(key: &str, value: E) -> Result<()> {
    with_context(|ctx| ctx.set_enum(key, value))
}

pub fn has_key(key: &str) -> bool {
    with_context(|ctx| ctx.has_key(key))
}

pub fn delete_key(key: &str) -> bool {
    with_context(|ctx| ctx.delete_key(key))
}

/// Clear the current file in memory and on disk
pub fn delete_all() -> Result<()> {
    with_context(SaveContext::delete_all)
}

/// Remove every save file in the save folder
pub fn delete_all_files() -> Result<()> {
    with_context(|ctx| ctx.persistence().delete_all())?;
    Ok(())
}

/// Save on application exit; failures are logged
pub fn on_application_quit() {
    if let Err(err) = save() {
        log::error!("Failed to save {} on quit: {err}", save_file_name());
    }
}

/// Calls [`on_application_quit`] when dropped
#[must_use = "the save happens when the guard is dropped"]
#[derive(Debug, Default)]
pub struct QuitGuard;

impl QuitGuard {
    pub fn new() -> Self {
        Self
    }
}

impl Drop for QuitGuard {
    fn drop(&mut self) {
        on_application_quit();
    }
}

/// Drop in-memory data without saving, as if the process was killed
#[cfg(test)]
fn emulate_forced_quit() {
    with_context(SaveContext::forget_unsaved);
}

/// Save and drop in-memory data, as if the process exited normally
#[cfg(test)]
fn emulate_managed_application_quit() {
    drop(QuitGuard::new());
    emulate_forced_quit();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{FileSystemPersistence, PersistText};
    use crate::test_support::capture_logs;
    use serde::Deserialize;
    use std::io::Write;

    /// Serializes tests sharing the default context
    static TEST_LOCK: Mutex<()> = parking_lot::const_mutex(());

    /// Point the default context at a fresh folder for one test
    fn fresh(dir: &tempfile::TempDir) {
        let settings = SaveSystemSettings::new(dir.path(), "TestFolder", "rootTest");
        force_override_settings(settings, true);
        change_save_file_to_default().unwrap();
    }

    /// Write straight to the current save file, bypassing the save system
    fn side_write_to_file(contents: &str) {
        let external = FileSystemPersistence::at_folder(full_save_folder_path());
        let mut writer = external.write_to(&save_file_name()).unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
        writer.flush().unwrap();
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Vector2 {
        x: f32,
        y: f32,
    }

    #[test]
    fn test_string_int_float_bool() {
        let _lock = TEST_LOCK.lock();
        let dir = tempfile::tempdir().unwrap();
        fresh(&dir);

        set_string("s", "testValue").unwrap();
        set_int("i", 5).unwrap();
        set_float("f", 4.2).unwrap();
        set_bool("b", true).unwrap();
        assert_eq!(get_string("s", ""), "testValue");
        assert_eq!(get_int("i", 0), 5);
        assert_eq!(get_float("f", 0.0), 4.2);
        assert!(get_bool("b", false));
    }

    #[test]
    fn test_default_mode_is_structural() {
        let _lock = TEST_LOCK.lock();
        let dir = tempfile::tempdir().unwrap();
        fresh(&dir);

        set("pos", &Vector2 { x: 1.0, y: 2.0 }).unwrap();
        assert_eq!(get("pos", Vector2::default()), Vector2 { x: 1.0, y: 2.0 });
        assert!(set("count", &3).is_err());
        assert_eq!(get_with_mode("pos", 0, TokenMode::Generic), 0);
    }

    #[test]
    fn test_managed_quit_saves_but_forced_quit_does_not() {
        let _lock = TEST_LOCK.lock();
        let dir = tempfile::tempdir().unwrap();
        fresh(&dir);

        set_string("kept", "testValue").unwrap();
        emulate_managed_application_quit();
        assert_eq!(get_string("kept", ""), "testValue");

        set_string("lost", "testValue").unwrap();
        emulate_forced_quit();
        assert_eq!(get_string("lost", ""), "");
    }

    #[test]
    fn test_change_save_file_and_back() {
        let _lock = TEST_LOCK.lock();
        let dir = tempfile::tempdir().unwrap();
        fresh(&dir);

        set_string("testKey", "testValue1").unwrap();
        let previous = save_file_name();

        change_save_file("newTestFile").unwrap();
        assert_eq!(get_string("testKey", ""), "");
        set_string("testKey", "testValue2").unwrap();

        change_save_file(&previous).unwrap();
        assert_eq!(get_string("testKey", ""), "testValue1");
        change_save_file("newTestFile").unwrap();
        assert_eq!(get_string("testKey", ""), "testValue2");
    }

    #[test]
    fn test_external_write_then_refresh() {
        let _lock = TEST_LOCK.lock();
        let dir = tempfile::tempdir().unwrap();
        fresh(&dir);

        set_string("testKey", "testValue1295").unwrap();
        side_write_to_file(r#"{"testKey":"testValueWrittenToFile"}"#);
        refresh().unwrap();
        assert_eq!(get_string("testKey", ""), "testValueWrittenToFile");
    }

    #[test]
    fn test_malformed_file_does_not_load() {
        let _lock = TEST_LOCK.lock();
        let logs = capture_logs();
        let dir = tempfile::tempdir().unwrap();
        fresh(&dir);

        set_string("testKey", "testValue1295").unwrap();
        side_write_to_file(r#"{{testKey":"testValueWrittenToFile"}"#);
        refresh().unwrap();
        assert_eq!(get_string("testKey", ""), "testValue1295");
        assert!(logs.has_error("Failed to load data for rootTest.json, malformed Json"));
    }

    #[test]
    fn test_malformed_file_on_first_access_starts_empty() {
        let _lock = TEST_LOCK.lock();
        let logs = capture_logs();
        let dir = tempfile::tempdir().unwrap();
        fresh(&dir);

        side_write_to_file(r#"{{testKey":"testValueWrittenToFile"}"#);
        emulate_forced_quit();
        assert_eq!(get_string("testKey", "fallback"), "fallback");
        assert!(logs.has_error(
            r#"Failed to load data for rootTest.json, malformed Json. Raw json: {{testKey":"testValueWrittenToFile"}"#
        ));
    }

    #[test]
    fn test_delete_key_and_delete_all() {
        let _lock = TEST_LOCK.lock();
        let dir = tempfile::tempdir().unwrap();
        fresh(&dir);

        set_string("a", "1").unwrap();
        set_string("b", "2").unwrap();
        assert!(has_key("a"));
        assert!(delete_key("a"));
        assert!(!has_key("a"));

        save().unwrap();
        delete_all().unwrap();
        assert_eq!(get_string("b", ""), "");
        assert!(!full_save_folder_path().join("rootTest.json").exists());
    }

    #[test]
    fn test_delete_all_files_clears_folder() {
        let _lock = TEST_LOCK.lock();
        let dir = tempfile::tempdir().unwrap();
        fresh(&dir);

        set_enum("mode", crate::settings::SerializationType::Plain).unwrap();
        save().unwrap();
        change_save_file("second").unwrap();
        save().unwrap();
        assert!(full_save_folder_path().join("rootTest.json").exists());

        delete_all_files().unwrap();
        assert!(!full_save_folder_path().join("rootTest.json").exists());
        assert!(!full_save_folder_path().join("second.json").exists());
    }
}
