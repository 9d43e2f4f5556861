//! src/config.rs
//! ============================================================================
//! # Config: Settings File Loader and File Locations
//!
//! The settings file is a hand-edited INI-style text file:
//!
//! ```text
//! ; comment
//! [font]
//! name = Fixedsys
//! size = 16
//! [colors]
//! background = #fff
//! [actions]
//! bat, cmd   = '>' cmd /c
//! png jpg    = '*' viewer -fs $
//! :ctrl      = notepad
//! ```
//!
//! Section names and keys are case-insensitive. Malformed lines become
//! [`ParseWarning`]s; nothing in the file can make a load fail.
//!
//! Settings and state are looked up next to the executable first (portable
//! install) and otherwise in the platform config directory from
//! [`directories`](https://docs.rs/directories).

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{AppError, ParseWarning};
use crate::model::file_types::{FileTypeRegistry, FileTypeRule, LookupKey};

pub const SETTINGS_FILE: &str = "launcher.ini";
pub const STATE_FILE: &str = "launcher.state";

/// An RGB color, written as `#rgb` or `#rrggbb` (the `#` is optional).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[must_use]
    pub fn parse(spec: &str) -> Option<Self> {
        let hex = spec.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(hex, 16).ok()?;
        match hex.len() {
            3 => {
                let nibble = |shift: u32| ((value >> shift) & 0xF) as u8 * 17;
                Some(Self::new(nibble(8), nibble(4), nibble(0)))
            }
            6 => Some(Self::new(
                (value >> 16) as u8,
                (value >> 8) as u8,
                value as u8,
            )),
            _ => None,
        }
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FontSettings {
    pub name: String,
    pub size: i32,
    pub weight: i32,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            name: "Fixedsys".to_string(),
            size: 16,
            weight: 400,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorScheme {
    pub background: Rgb,
    pub prefix: Rgb,
    pub text: Rgb,
    pub subdir: Rgb,
    pub select_background: Rgb,
    pub select_prefix: Rgb,
    pub select_text: Rgb,
    pub select_subdir: Rgb,
    pub dir_background: Rgb,
    pub dir_text: Rgb,
    pub scrollbar: Rgb,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            background: Rgb::new(255, 255, 255),
            prefix: Rgb::new(128, 128, 128),
            text: Rgb::new(0, 0, 0),
            subdir: Rgb::new(0, 0, 128),
            select_background: Rgb::new(0, 120, 215),
            select_prefix: Rgb::new(192, 192, 192),
            select_text: Rgb::new(255, 255, 255),
            select_subdir: Rgb::new(255, 255, 192),
            dir_background: Rgb::new(192, 192, 192),
            dir_text: Rgb::new(0, 0, 0),
            scrollbar: Rgb::new(0, 120, 215),
        }
    }
}

impl ColorScheme {
    fn slot(&mut self, key: &str) -> Option<&mut Rgb> {
        Some(match key {
            "background" => &mut self.background,
            "prefix" => &mut self.prefix,
            "text" => &mut self.text,
            "subdir" => &mut self.subdir,
            "selectbackground" => &mut self.select_background,
            "selectprefix" => &mut self.select_prefix,
            "selecttext" => &mut self.select_text,
            "selectsubdir" => &mut self.select_subdir,
            "dirbackground" => &mut self.dir_background,
            "dirtext" => &mut self.dir_text,
            "scrollbar" => &mut self.scrollbar,
            _ => return None,
        })
    }
}

/// One `[actions]` row: the keys it binds and the rule they share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionSpec {
    pub keys: Vec<LookupKey>,
    pub rule: FileTypeRule,
}

/// Main configuration struct for the application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Config {
    pub font: FontSettings,
    pub colors: ColorScheme,
    pub actions: Vec<ActionSpec>,
}

impl Config {
    /// Parses settings text, using the process environment for `%VAR%`.
    #[must_use]
    pub fn parse(text: &str) -> (Self, Vec<ParseWarning>) {
        Self::parse_with_env(text, |name| std::env::var(name).ok())
    }

    pub fn parse_with_env<F>(text: &str, env: F) -> (Self, Vec<ParseWarning>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let mut warnings = Vec::new();
        let mut section = String::new();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if line.len() >= 2 && line.starts_with('[') && line.ends_with(']') {
                section = line[1..line.len() - 1].trim().to_lowercase();
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                warnings.push(ParseWarning::new(line_no, line, "expected 'key = value'"));
                continue;
            };
            let key = key.trim_end().to_lowercase();
            let value = value.trim_start();
            if key.is_empty() {
                warnings.push(ParseWarning::new(line_no, line, "empty key"));
                continue;
            }

            if section == "actions" {
                cfg.parse_action(line_no, line, &key, value, &env, &mut warnings);
                continue;
            }

            let mut bad = |reason: &str| warnings.push(ParseWarning::new(line_no, line, reason));
            match (section.as_str(), key.as_str()) {
                ("font", "name") => cfg.font.name = value.to_string(),
                ("font", "size") => match value.parse() {
                    Ok(v) => cfg.font.size = v,
                    Err(_) => bad("font size is not an integer"),
                },
                ("font", "weight") => match value.parse() {
                    Ok(v) => cfg.font.weight = v,
                    Err(_) => bad("font weight is not an integer"),
                },
                ("colors", name) => match (cfg.colors.slot(name), Rgb::parse(value)) {
                    (Some(slot), Some(color)) => *slot = color,
                    (Some(_), None) => bad("invalid color spec"),
                    (None, _) => bad("unrecognized key"),
                },
                _ => bad("unrecognized key"),
            }
        }

        (cfg, warnings)
    }

    fn parse_action<F>(
        &mut self,
        line_no: usize,
        line: &str,
        key: &str,
        value: &str,
        env: &F,
        warnings: &mut Vec<ParseWarning>,
    ) where
        F: Fn(&str) -> Option<String>,
    {
        let mut keys = Vec::new();
        for token in key
            .split(|c: char| matches!(c, ',' | ';' | '|') || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            match LookupKey::parse(token) {
                Some(k) => keys.push(k),
                None => warnings.push(ParseWarning::new(
                    line_no,
                    line,
                    format!("invalid action key '{token}'"),
                )),
            }
        }
        if keys.is_empty() {
            return;
        }
        let rule = FileTypeRule::parse(value, env);
        self.actions.push(ActionSpec { keys, rule });
    }

    /// Builds a fresh registry from the `[actions]` rows.
    #[must_use]
    pub fn registry(&self) -> FileTypeRegistry {
        let mut registry = FileTypeRegistry::new();
        for spec in &self.actions {
            registry.insert(spec.keys.iter().cloned(), spec.rule.clone());
        }
        registry
    }

    /// Reads and parses a settings file. Warnings are logged and returned.
    pub fn load(path: &Path) -> Result<(Self, Vec<ParseWarning>), AppError> {
        let text = std::fs::read_to_string(path).map_err(|source| AppError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loading settings from {}", path.display());

        let (cfg, warnings) = Self::parse(&text);
        for w in &warnings {
            warn!(marker = "SETTINGS_WARNING", "{}: {w}", path.display());
        }
        Ok((cfg, warnings))
    }

    /// Like [`Config::load`], but a missing file yields `None` instead of an error.
    pub fn load_optional(path: &Path) -> Result<Option<Self>, AppError> {
        match Self::load(path) {
            Ok((cfg, _)) => Ok(Some(cfg)),
            Err(AppError::ConfigIo { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                info!("No settings file at {}, using defaults", path.display());
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Effective settings as TOML, for `--dump-config`.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Where the launcher keeps its files, plus the directories tools are searched in.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub settings_file: PathBuf,
    pub state_file: PathBuf,
    /// Directory of the running executable.
    pub exec_dir: String,
    /// Working directory at startup.
    pub start_dir: String,
}

impl AppPaths {
    /// Resolves file locations. `override_dir` wins; otherwise the executable's
    /// directory is used when it holds a settings file, else the platform
    /// config directory.
    pub fn discover(override_dir: Option<&Path>) -> Result<Self, AppError> {
        let exe = std::env::current_exe()?;
        let exec_dir = exe
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        let start_dir = std::env::current_dir()?.to_string_lossy().into_owned();

        let base = match override_dir {
            Some(dir) => dir.to_path_buf(),
            None if Path::new(&exec_dir).join(SETTINGS_FILE).is_file() => PathBuf::from(&exec_dir),
            None => Self::config_dir()?,
        };

        Ok(Self::in_dir(&base, exec_dir, start_dir))
    }

    /// Paths for an explicit base directory.
    #[must_use]
    pub fn in_dir(base: &Path, exec_dir: String, start_dir: String) -> Self {
        Self {
            settings_file: base.join(SETTINGS_FILE),
            state_file: base.join(STATE_FILE),
            exec_dir,
            start_dir,
        }
    }

    /// Returns the platform config directory using `directories::ProjectDirs`.
    pub fn config_dir() -> Result<PathBuf, AppError> {
        let proj_dirs = ProjectDirs::from("org", "dirlaunch", "dirlaunch").ok_or_else(|| {
            AppError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "could not determine config directory",
            ))
        })?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }
}
