use super::ConfigError;
use crate::log_info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FuzzySearchMode {
    /// Query words must match left to right.
    #[default]
    WordOrdered,
    WordUnordered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EditorLaunchMode {
    /// Exec the editor in place of the picker.
    Replace,
    /// Run the editor as a child and come back afterwards.
    #[default]
    Child,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FastSwitchSearch {
    #[default]
    Preserve,
    Clear,
}

impl FuzzySearchMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::WordOrdered => Self::WordUnordered,
            Self::WordUnordered => Self::WordOrdered,
        }
    }
}

impl EditorLaunchMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Replace => Self::Child,
            Self::Child => Self::Replace,
        }
    }
}

impl FastSwitchSearch {
    pub fn toggled(self) -> Self {
        match self {
            Self::Preserve => Self::Clear,
            Self::Clear => Self::Preserve,
        }
    }
}

/// Colour stored as `rgb(r,g,b)` in the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        let inner = raw
            .trim()
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| format!("expected rgb(r,g,b), got {raw:?}"))?;
        let parts: Vec<u8> = inner
            .split(',')
            .map(|part| part.trim().parse::<u8>())
            .collect::<Result<_, _>>()
            .map_err(|err| format!("bad colour component in {raw:?}: {err}"))?;
        match parts.as_slice() {
            [r, g, b] => Ok(Rgb::new(*r, *g, *b)),
            _ => Err(format!("expected three components in {raw:?}")),
        }
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// User preferences persisted between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Settings {
    pub fuzzy_search_mode: FuzzySearchMode,
    pub editor_launch_mode: EditorLaunchMode,
    pub fast_switch_search: FastSwitchSearch,
    #[serde(rename = "SelectionFGColor")]
    pub selection_fg: Rgb,
    #[serde(rename = "SelectionBGColor")]
    pub selection_bg: Rgb,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fuzzy_search_mode: FuzzySearchMode::default(),
            editor_launch_mode: EditorLaunchMode::default(),
            fast_switch_search: FastSwitchSearch::default(),
            selection_fg: Rgb::new(10, 30, 50),
            selection_bg: Rgb::new(222, 236, 249),
        }
    }
}

impl Settings {
    /// Read settings, falling back to defaults (and logging) on any problem.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::read(path) {
            Ok(Some(settings)) => settings,
            Ok(None) => Self::default(),
            Err(err) => {
                log_info(&format!("ignoring settings file: {err}"));
                Self::default()
            }
        }
    }

    /// `Ok(None)` when the file does not exist.
    pub fn read(path: &Path) -> Result<Option<Self>, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::SettingsIo {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| ConfigError::SettingsParse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Write through `<file>.tmp` and rename over the target.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::SettingsIo {
            path: path.to_path_buf(),
            source,
        };
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| {
            ConfigError::SettingsParse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;
        Ok(())
    }
}
