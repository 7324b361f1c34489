//! Simple Save demo
//!
//! Edits entries of a save file from the command line.
//!
//! ```text
//! simple-save [--settings <file>] [--file <name>] <command>
//!
//!   show                   print the whole save file
//!   get <key>              print one entry
//!   set <key> <text>       store a string
//!   set-int <key> <n>      store an integer
//!   set-float <key> <x>    store a float
//!   set-bool <key> <b>     store a bool
//!   delete <key>           remove one entry
//!   clear                  delete the save file
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use simple_save::settings::SETTINGS_FILE;
use simple_save::{SaveContext, SaveSystemSettings};

fn usage() -> ExitCode {
    eprintln!(
        "usage: simple-save [--settings <file>] [--file <name>] \
         <show | get KEY | set KEY TEXT | set-int KEY N | set-float KEY X | set-bool KEY B | delete KEY | clear>"
    );
    ExitCode::from(2)
}

fn main() -> ExitCode {
    env_logger::init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let mut settings_path = PathBuf::from(SETTINGS_FILE);
    let mut file_name = None;

    while args.len() >= 2 && args[0].starts_with("--") {
        let value = args.remove(1);
        match args.remove(0).as_str() {
            "--settings" => settings_path = PathBuf::from(value),
            "--file" => file_name = Some(value),
            _ => return usage(),
        }
    }

    let settings = SaveSystemSettings::load(&settings_path);
    log::info!(
        "Save folder: {} ({} serialization)",
        settings.full_save_folder_path().display(),
        settings.serialization_type.as_str()
    );
    let mut ctx = settings.create_context();
    if let Some(name) = file_name {
        if let Err(err) = ctx.change_save_file(&name) {
            log::error!("Could not switch to {name}: {err}");
            return ExitCode::FAILURE;
        }
    }

    match run(&mut ctx, &args) {
        Some(Ok(())) => ExitCode::SUCCESS,
        Some(Err(err)) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
        None => usage(),
    }
}

/// Run one command; `None` for unrecognised input
fn run(ctx: &mut SaveContext, args: &[String]) -> Option<simple_save::Result<()>> {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let result = match args.as_slice() {
        ["show"] => {
            let text = serde_json::to_string_pretty(ctx.current().saved_token());
            text.map(|text| println!("{text}")).map_err(Into::into)
        }
        ["get", key] => {
            match ctx.current().saved_token().get(*key) {
                Some(token) => println!("{token}"),
                None => println!("(no entry for {key})"),
            }
            Ok(())
        }
        ["set", key, text] => ctx.set_string(key, text).and_then(|_| ctx.save()),
        ["set-int", key, n] => {
            let n = n.parse().ok()?;
            ctx.set_int(key, n).and_then(|_| ctx.save())
        }
        ["set-float", key, x] => {
            let x = x.parse().ok()?;
            ctx.set_float(key, x).and_then(|_| ctx.save())
        }
        ["set-bool", key, b] => {
            let b = b.parse().ok()?;
            ctx.set_bool(key, b).and_then(|_| ctx.save())
        }
        ["delete", key] => {
            if !ctx.delete_key(key) {
                log::warn!("No entry for {key}");
            }
            ctx.save()
        }
        ["clear"] => ctx.delete_all(),
        _ => return None,
    };
    Some(result)
}
