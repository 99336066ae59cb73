//! Command-line parsing and the startup environment snapshot.

mod settings;

use crate::{LogConfig, LogLevel};
use clap::Parser;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

pub use settings::{EditorLaunchMode, FastSwitchSearch, FuzzySearchMode, Rgb, Settings};

pub const DEFAULT_TTY_RESET: &str = "stty sane";
pub const DEFAULT_INPUT_LABEL: &str = "Files";
pub const IPC_URL_VAR: &str = "VILARK_IPC_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("VILARK_DEBUG_LOG_LEVEL must be INFO or DEBUG, got {0:?}")]
    InvalidLogLevel(String),
    #[error("could not parse EDITOR {value:?}: {reason}")]
    Editor { value: String, reason: String },
    #[error("settings file {path}: {source}")]
    SettingsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("settings file {path}: {source}")]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Interactive fuzzy picker; opens the chosen file in $EDITOR.
#[derive(Debug, Parser, Clone)]
#[command(name = "vilark", about, version, long_version = long_version())]
pub struct Cli {
    /// Directory to browse recursively (default: current directory)
    #[arg(value_name = "DIRECTORY")]
    pub directory: Option<PathBuf>,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\nFuzzy file picker for the terminal"
    )
}

/// Everything read from the environment, captured once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerConfig {
    pub root: PathBuf,
    pub preserve_terminal: bool,
    /// Set when we already run inside another picker's editor.
    pub inherited_ipc_url: Option<String>,
    pub tty_reset: String,
    /// Program and leading arguments, split shell-style.
    pub editor: Option<Vec<String>>,
    pub output_file: Option<PathBuf>,
    pub input_file: Option<PathBuf>,
    pub input_display_as_file: bool,
    pub input_label: String,
    pub settings_file: Option<PathBuf>,
    pub ignore_file: Option<PathBuf>,
    pub gitignores_enabled: bool,
    pub log: LogConfig,
}

impl PickerConfig {
    pub fn from_env(cli: &Cli) -> Result<Self, ConfigError> {
        Self::from_lookup(cli, |name| env::var(name).ok())
    }

    pub fn from_lookup<F>(cli: &Cli, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.is_empty());
        let flag = |name: &str| non_empty(name).is_some_and(|value| value != "0");
        let home = non_empty("HOME").map(PathBuf::from);

        let level = match non_empty("VILARK_DEBUG_LOG_LEVEL") {
            None => LogLevel::Info,
            Some(raw) => LogLevel::parse(&raw).ok_or(ConfigError::InvalidLogLevel(raw))?,
        };
        let log = LogConfig {
            path: non_empty("VILARK_DEBUG_LOG").map(PathBuf::from),
            level,
            trace_path: non_empty("VILARK_TRACE_LOG")
                .map(PathBuf::from)
                .unwrap_or_else(|| env::temp_dir().join("vilark_trace.jsonl")),
        };

        let editor = match non_empty("EDITOR") {
            None => None,
            Some(value) => {
                let words = shell_words::split(&value).map_err(|err| ConfigError::Editor {
                    value: value.clone(),
                    reason: err.to_string(),
                })?;
                Some(words).filter(|words| !words.is_empty())
            }
        };

        // An explicitly empty VILARK_IGNORE_FILE disables global rules.
        let ignore_file = match lookup("VILARK_IGNORE_FILE") {
            Some(value) if value.is_empty() => None,
            Some(value) => Some(PathBuf::from(value)),
            None => home
                .as_ref()
                .map(|home| home.join(".config/vilark/ignore_rules.txt")),
        };

        Ok(Self {
            root: cli.directory.clone().unwrap_or_else(|| PathBuf::from(".")),
            preserve_terminal: flag("VILARK_PRESERVE_TERMINAL"),
            inherited_ipc_url: non_empty(IPC_URL_VAR),
            tty_reset: non_empty("VILARK_TTY_RESET").unwrap_or_else(|| DEFAULT_TTY_RESET.to_string()),
            editor,
            output_file: non_empty("VILARK_OUTPUT_FILE").map(PathBuf::from),
            input_file: non_empty("VILARK_INPUT_FILE").map(PathBuf::from),
            input_display_as_file: non_empty("VILARK_INPUT_DISPLAY").as_deref() == Some("DIR_BAR_FILE"),
            input_label: non_empty("VILARK_INPUT_LABEL")
                .unwrap_or_else(|| DEFAULT_INPUT_LABEL.to_string()),
            settings_file: non_empty("VILARK_SETTINGS_FILE")
                .map(PathBuf::from)
                .or_else(|| home.as_ref().map(|home| home.join(".config/vilark/settings.json"))),
            ignore_file,
            gitignores_enabled: !flag("VILARK_NO_GITIGNORES"),
            log,
        })
    }

    /// True when a chosen item should be handed to an editor.
    pub fn has_editor(&self) -> bool {
        self.editor.is_some()
    }

    /// The IPC listener runs only for editor sessions that are not nested.
    pub fn wants_ipc_listener(&self) -> bool {
        self.has_editor() && self.inherited_ipc_url.is_none()
    }
}
