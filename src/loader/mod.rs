//! Background item loading: a directory scan or an input file.

mod ignore;
mod item;
mod scan;

pub use ignore::{IgnoreRules, DEFAULT_GLOBAL_IGNORE};
pub use item::{file_display_string, Item};
pub use scan::DirectoryScanner;

use crate::config::PickerConfig;
use crate::event::{EventSender, Notification};
use crate::log_info;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    pub root: PathBuf,
    pub input_file: Option<PathBuf>,
    pub display_as_file: bool,
    pub ignore_file: Option<PathBuf>,
    pub gitignores_enabled: bool,
}

impl From<&PickerConfig> for LoaderConfig {
    fn from(config: &PickerConfig) -> Self {
        Self {
            root: config.root.clone(),
            input_file: config.input_file.clone(),
            display_as_file: config.input_display_as_file,
            ignore_file: config.ignore_file.clone(),
            gitignores_enabled: config.gitignores_enabled,
        }
    }
}

/// Start the `loader` thread; it ends with `Completed` or `FatalError`.
pub fn spawn_loader(
    config: LoaderConfig,
    notes: EventSender<Notification>,
) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("loader".to_string())
        .spawn(move || {
            let started = Instant::now();
            let note = match load_items(&config, &notes) {
                Ok(items) => {
                    log_info(&format!(
                        "loaded {} items in {} ms",
                        items.len(),
                        started.elapsed().as_millis()
                    ));
                    Notification::Completed { items }
                }
                Err(err) => Notification::FatalError {
                    message: err.to_string(),
                },
            };
            notes.send(note);
        })
}

pub fn load_items(config: &LoaderConfig, notes: &EventSender<Notification>) -> io::Result<Vec<Item>> {
    if let Some(path) = &config.input_file {
        return read_input_file(path, config.display_as_file);
    }
    let mut scanner = DirectoryScanner::new(&config.root, config.gitignores_enabled, notes)?;
    let global = IgnoreRules::global(config.ignore_file.as_deref(), scanner.root());
    let rules = scanner.root_rules(global);
    scanner.scan(rules).map_err(|err| {
        io::Error::new(
            err.kind(),
            format!("cannot read {}: {err}", config.root.display()),
        )
    })
}

fn read_input_file(path: &std::path::Path, display_as_file: bool) -> io::Result<Vec<Item>> {
    let text = fs::read_to_string(path).map_err(|err| {
        io::Error::new(err.kind(), format!("cannot read {}: {err}", path.display()))
    })?;
    Ok(text
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| Item::external(line, display_as_file))
        .collect())
}
