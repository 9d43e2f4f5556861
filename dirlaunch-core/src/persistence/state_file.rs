//! ``src/persistence/state_file.rs``
//! ============================================================================
//! # State File: machine-written session state
//!
//! One record per line, typed by its first character:
//!
//! | prefix | meaning                                   |
//! |--------|-------------------------------------------|
//! | `@`    | `width,height,x,y` window geometry        |
//! | `\`    | last current directory                    |
//! | `.`    | last selected entry name                  |
//! | `*`    | a recorded default, as `directory + entry`|
//! | `#`    | comment                                   |

use std::{
    collections::BTreeMap,
    fmt::Write as _,
    path::{Path, PathBuf},
};

use chrono::Local;
use tracing::{debug, info, warn};

use crate::error::{AppError, ParseWarning};
use crate::fs::path_utils;

/// Geometry below this (in either dimension) is ignored on load.
pub const MIN_WINDOW_EXTENT: i32 = 20;

/// Case-folded directory path -> sort key of its default entry.
pub type DefaultsMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRect {
    pub width: i32,
    pub height: i32,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedState {
    pub window: Option<WindowRect>,
    pub last_directory: Option<String>,
    pub last_selection: Option<String>,
    pub defaults: DefaultsMap,
}

impl PersistedState {
    #[must_use]
    pub fn parse(text: &str) -> (Self, Vec<ParseWarning>) {
        let mut state = Self::default();
        let mut warnings = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            let mut chars = line.chars();
            let Some(kind) = chars.next() else {
                continue;
            };
            let body = chars.as_str().trim();
            // An empty directory record is the volume list.
            if kind == '\\' {
                state.last_directory = Some(body.to_string());
                continue;
            }
            if body.is_empty() {
                continue;
            }

            match kind {
                '@' => match parse_geometry(body) {
                    Some(rect) => state.window = Some(rect),
                    None => debug!("Ignoring window geometry {body:?}"),
                },
                '.' => state.last_selection = Some(body.to_string()),
                '*' => {
                    let (dir, entry) = split_default(body);
                    state
                        .defaults
                        .insert(path_utils::case_fold(&dir), path_utils::case_fold(&entry));
                }
                '#' => {}
                other => warnings.push(ParseWarning::new(
                    idx + 1,
                    line,
                    format!("invalid line type '{other}'"),
                )),
            }
        }

        (state, warnings)
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "# dirlaunch state file, written {}; it is overwritten on every save",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        if let Some(w) = self.window {
            let _ = writeln!(out, "@{},{},{},{}", w.width, w.height, w.x, w.y);
        }
        if let Some(dir) = &self.last_directory {
            let _ = writeln!(out, "\\{dir}");
        }
        if let Some(name) = &self.last_selection {
            let _ = writeln!(out, ".{name}");
        }
        for (dir, entry) in &self.defaults {
            let _ = writeln!(out, "*{}", path_utils::join_path(dir, entry));
        }
        out
    }
}

fn parse_geometry(body: &str) -> Option<WindowRect> {
    let coords: Vec<i32> = body
        .split([',', ' ', '|'])
        .filter(|s| !s.is_empty())
        .map(|s| s.trim().parse().ok())
        .collect::<Option<_>>()?;
    match coords.as_slice() {
        &[width, height, x, y] if width > MIN_WINDOW_EXTENT && height > MIN_WINDOW_EXTENT => {
            Some(WindowRect {
                width,
                height,
                x,
                y,
            })
        }
        _ => None,
    }
}

// A default recorded for the volume list is stored as the bare volume root.
fn split_default(joined: &str) -> (String, String) {
    if path_utils::is_volume_root(joined) {
        return (String::new(), joined.to_string());
    }
    (
        path_utils::dir_name(joined),
        path_utils::base_name(joined).to_string(),
    )
}

/// Reads and writes the state file. Unforced saves happen at most once per
/// session; forced saves always write.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
    saved_once: bool,
}

impl StateStore {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            saved_once: false,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file means a fresh state.
    pub fn load(&self) -> Result<PersistedState, AppError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No state file at {}", self.path.display());
                return Ok(PersistedState::default());
            }
            Err(source) => {
                return Err(AppError::StateIo {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let (state, warnings) = PersistedState::parse(&text);
        for w in &warnings {
            warn!(marker = "STATE_WARNING", "{}: {w}", self.path.display());
        }
        Ok(state)
    }

    /// Writes `state`. Returns `false` when an unforced save was skipped.
    pub fn save(&mut self, state: &PersistedState, force: bool) -> Result<bool, AppError> {
        if !force && self.saved_once {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| AppError::StateIo {
                path: self.path.clone(),
                source,
            })?;
        }
        std::fs::write(&self.path, state.render()).map_err(|source| AppError::StateIo {
            path: self.path.clone(),
            source,
        })?;
        debug!(
            marker = "STATE_SAVED",
            operation_type = "persist",
            forced = force,
            "Saved state to {}",
            self.path.display()
        );
        if !force {
            self.saved_once = true;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_line_types() {
        let text = "\
# comment
@640,480,10,20
\\C:\\work
.notes.txt
*c:\\work\\notes.txt
*C:\\
?what
@5,5,0,0
";
        let (state, warnings) = PersistedState::parse(text);
        assert_eq!(
            state.window,
            Some(WindowRect {
                width: 640,
                height: 480,
                x: 10,
                y: 20
            })
        );
        assert_eq!(state.last_directory.as_deref(), Some("C:\\work"));
        assert_eq!(state.last_selection.as_deref(), Some("notes.txt"));
        assert_eq!(state.defaults.get("c:\\work").map(String::as_str), Some("notes.txt"));
        assert_eq!(state.defaults.get("").map(String::as_str), Some("c:\\"));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].line_no, 7);
    }

    #[test]
    fn too_small_geometry_is_ignored() {
        let (state, _) = PersistedState::parse("@20,400,0,0\n");
        assert_eq!(state.window, None);
        let (state, _) = PersistedState::parse("@100,x,0,0\n");
        assert_eq!(state.window, None);
    }

    #[test]
    fn round_trip_through_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = StateStore::new(dir.path().join("nested").join("launcher.state"));

        let mut state = PersistedState {
            window: Some(WindowRect {
                width: 120,
                height: 40,
                x: 0,
                y: 0,
            }),
            last_directory: Some("/srv/work".into()),
            last_selection: Some("Notes.txt".into()),
            defaults: DefaultsMap::new(),
        };
        state.defaults.insert("/srv/work".into(), "notes.txt".into());
        state.defaults.insert("/".into(), "srv".into());
        state.defaults.insert(String::new(), "/".into());

        assert!(store.save(&state, false).unwrap());
        assert_eq!(store.load().unwrap(), state);

        // A second unforced save is skipped, a forced one is not.
        state.last_selection = Some("other".into());
        assert!(!store.save(&state, false).unwrap());
        assert_eq!(store.load().unwrap().last_selection.as_deref(), Some("Notes.txt"));
        assert!(store.save(&state, true).unwrap());
        assert_eq!(store.load().unwrap().last_selection.as_deref(), Some("other"));
    }

    #[test]
    fn volume_list_directory_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = StateStore::new(dir.path().join("launcher.state"));
        let state = PersistedState {
            last_directory: Some(String::new()),
            last_selection: Some("/".into()),
            ..PersistedState::default()
        };

        store.save(&state, true).unwrap();
        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.lines().any(|l| l == "\\"));
        assert_eq!(store.load().unwrap().last_directory.as_deref(), Some(""));
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("none.state"));
        assert_eq!(store.load().unwrap(), PersistedState::default());
    }
}
