//! ``src/model/session.rs``
//! ============================================================================
//! # `NavigationSession`: the navigation engine
//!
//! Owns everything the launcher mutates while browsing: the listing and
//! cursor, the file-type registry, the tool cache, the per-directory
//! defaults, quick-search state and the state-file store. Every operation
//! either completes or leaves the session exactly as it was.

use std::{io, time::Instant};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::controller::launcher::ProcessLauncher;
use crate::error::AppError;
use crate::fs::{
    dir_entry::{DirEntry, find_in_listing},
    dir_scanner::load_directory,
    path_utils::{self, PathKind},
};
use crate::model::{
    file_types::{FileTypeRegistry, Modifiers},
    nav_state::NavigationState,
    quick_search::QuickSearch,
    tool_resolver::ToolResolver,
};
use crate::persistence::state_file::{DefaultsMap, PersistedState, StateStore, WindowRect};

/// What an activation ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// A file-type rule started a helper tool.
    Launched { program: String, args: Vec<String> },
    /// The selection was a directory and is now current.
    Entered,
    /// The path was handed to the platform opener.
    Opened(String),
    /// Nothing selected.
    Nothing,
}

#[derive(Debug)]
pub struct NavigationSession {
    state: NavigationState,
    config: Config,
    registry: FileTypeRegistry,
    tools: ToolResolver,
    defaults: DefaultsMap,
    quick_search: QuickSearch,
    store: Option<StateStore>,
    window: Option<WindowRect>,
}

impl NavigationSession {
    #[must_use]
    pub fn new(config: Config, tools: ToolResolver, store: Option<StateStore>) -> Self {
        let registry = config.registry();
        Self {
            state: NavigationState::default(),
            config,
            registry,
            tools,
            defaults: DefaultsMap::new(),
            quick_search: QuickSearch::new(),
            store,
            window: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &NavigationState {
        &self.state
    }

    pub const fn state_mut(&mut self) -> &mut NavigationState {
        &mut self.state
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn registry(&self) -> &FileTypeRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn defaults(&self) -> &DefaultsMap {
        &self.defaults
    }

    /// Current quick-search term (possibly stale; it resets on the next key
    /// after the timeout).
    #[must_use]
    pub fn quick_search_term(&self) -> &str {
        self.quick_search.term()
    }

    #[must_use]
    pub const fn window(&self) -> Option<WindowRect> {
        self.window
    }

    pub const fn set_window(&mut self, window: Option<WindowRect>) {
        self.window = window;
    }

    /// Takes over defaults and geometry from a loaded state file.
    pub fn restore(&mut self, persisted: &PersistedState) {
        self.defaults = persisted.defaults.clone();
        self.window = persisted.window;
    }

    /// Enters the first usable starting point: `explicit` (from the command
    /// line), the persisted last directory, `start_dir`, then the volume list.
    pub fn open_initial(
        &mut self,
        explicit: Option<&str>,
        persisted: &PersistedState,
        start_dir: &str,
    ) -> Result<(), AppError> {
        let mut candidates: Vec<(String, Option<String>)> = Vec::new();
        if let Some(path) = explicit {
            candidates.push((path.to_string(), None));
        }
        if let Some(last) = persisted
            .last_directory
            .as_ref()
            .filter(|d| path_utils::classify(d) == PathKind::Dir)
        {
            candidates.push((last.clone(), persisted.last_selection.clone()));
        }
        candidates.push((start_dir.to_string(), None));
        candidates.push((String::new(), None));

        let mut last_err = None;
        for (path, select) in candidates {
            match self.enter_path(&path, select.as_deref(), true) {
                Ok(_) => return Ok(()),
                Err(e) => {
                    warn!("Cannot start in {path:?}: {e}");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| AppError::not_accessible("", io::ErrorKind::NotFound.into())))
    }

    /// Makes the directory at (or containing) `path` current.
    ///
    /// Returns `Ok(false)` when that directory is already current and no
    /// reload was forced. On any error the session is unchanged.
    pub fn enter_path(
        &mut self,
        path: &str,
        preferred: Option<&str>,
        force_reload: bool,
    ) -> Result<bool, AppError> {
        let path = path_utils::trim_trailing_separators(path);
        let kind = path_utils::classify(path);
        let dir = match kind {
            PathKind::Missing => {
                return Err(AppError::not_accessible(path, io::ErrorKind::NotFound.into()));
            }
            PathKind::Dir => path.to_string(),
            PathKind::File => path_utils::dir_name(path),
        };
        if dir == self.state.current_dir && !force_reload {
            return Ok(false);
        }

        let entries = load_directory(&dir, &self.registry)?;
        self.state.replace_listing(dir, entries);

        let entries = &self.state.entries;
        self.state.default_index = self
            .defaults
            .get(&path_utils::case_fold(&self.state.current_dir))
            .and_then(|key| find_in_listing(entries, key));

        let explicit = preferred
            .filter(|name| kind == PathKind::Dir && !name.is_empty())
            .and_then(|name| find_in_listing(entries, name));
        let from_file = (kind == PathKind::File)
            .then(|| find_in_listing(entries, path_utils::base_name(path)))
            .flatten();
        let exited = exited_child(&self.state.previous_dir, &self.state.current_dir)
            .and_then(|child| find_in_listing(entries, &child));

        let selection = explicit
            .or(from_file)
            .or(exited)
            .or(self.state.default_index)
            .unwrap_or(0);
        self.state.goto(selection as isize);

        info!(
            marker = "DIRECTORY_ENTERED",
            operation_type = "navigation",
            entries = self.state.entries.len(),
            "Entered {:?}",
            self.state.current_dir
        );
        Ok(true)
    }

    /// Goes up one level. From a volume root this is the volume list.
    pub fn enter_parent(&mut self) -> Result<bool, AppError> {
        if self.state.current_dir.is_empty() {
            return Ok(false);
        }
        let parent = path_utils::dir_name(&self.state.current_dir);
        self.enter_path(&parent, None, false)
    }

    /// Moves to the directory `delta` places away from the current one in
    /// its parent's listing. `..` and files are never entered.
    pub fn enter_sibling(&mut self, delta: isize) -> Result<bool, AppError> {
        let current = self.state.current_dir.clone();
        if current.is_empty() {
            return Ok(false);
        }
        let parent = path_utils::dir_name(&current);
        let listing = load_directory(&parent, &self.registry)?;

        // In the volume list the entry is the volume root itself.
        let own_name = if parent.is_empty() {
            current.as_str()
        } else {
            path_utils::base_name(&current)
        };
        let Some(index) = find_in_listing(&listing, own_name) else {
            debug!("{current:?} not found in its parent listing");
            return Ok(false);
        };

        let target = index as isize + delta;
        let Some(sibling) = usize::try_from(target).ok().and_then(|i| listing.get(i)) else {
            return Ok(false);
        };
        if !sibling.is_dir || sibling.is_parent_link() {
            return Ok(false);
        }
        let path = path_utils::join_path(&parent, &sibling.name);
        self.enter_path(&path, None, false)
    }

    /// Runs the selection: a matching modifier or file-type rule launches
    /// its tool, a directory is entered, anything else goes to the platform
    /// opener.
    pub fn activate<L>(&mut self, modifiers: Modifiers, launcher: &L) -> Result<Activation, AppError>
    where
        L: ProcessLauncher + ?Sized,
    {
        let Some(entry) = self.state.selected_entry().cloned() else {
            return Ok(Activation::Nothing);
        };
        let path = path_utils::join_path(&self.state.current_dir, &entry.name);

        let rule = self
            .registry
            .for_modifiers(modifiers)
            .cloned()
            .or_else(|| entry.file_type.clone().filter(|_| !entry.is_dir))
            .filter(|rule| rule.has_action());

        if let Some(rule) = rule {
            let program = self.tools.resolve(&rule.command)?;
            let command_dir = path_utils::dir_name(&program);
            let args = rule.build_arguments(&path, &command_dir);

            self.save_quietly(true);
            launcher.spawn_detached(&program, &args, &self.state.current_dir)?;
            return Ok(Activation::Launched { program, args });
        }

        if entry.is_dir {
            self.enter_path(&path, None, false)?;
            return Ok(Activation::Entered);
        }

        self.save_quietly(true);
        launcher.shell_open(&path, &self.state.current_dir)?;
        Ok(Activation::Opened(path))
    }

    /// Records `index` as this directory's default, or clears the default
    /// when `index` is not a real entry. Always saves state.
    pub fn set_default(&mut self, index: Option<usize>) -> Result<(), AppError> {
        let key = path_utils::case_fold(&self.state.current_dir);
        let target = index.filter(|&i| {
            self.state
                .entries
                .get(i)
                .is_some_and(|e| !e.is_parent_link())
        });

        match target {
            Some(i) => {
                self.state.default_index = Some(i);
                self.defaults
                    .insert(key, self.state.entries[i].sort_key.to_string());
            }
            None => {
                self.state.default_index = None;
                self.defaults.remove(&key);
            }
        }
        self.save(true).map(|_| ())
    }

    /// Feeds a typed character to quick search and selects the match.
    pub fn quick_search(&mut self, c: char, now: Instant) -> Option<usize> {
        let hit = self
            .quick_search
            .input(c, now, &self.state.entries, self.state.selected)?;
        self.state.goto(hit as isize);
        Some(hit)
    }

    pub fn cancel_quick_search(&mut self) {
        self.quick_search.expire();
    }

    /// Swaps in new settings: rebuilds the registry, drops the tool cache
    /// and refreshes the listing.
    pub fn reload(&mut self, config: Config) -> Result<(), AppError> {
        self.registry = config.registry();
        self.config = config;
        self.tools.clear_cache();
        info!(rules = self.registry.len(), "Settings reloaded");
        self.refresh()
    }

    /// Re-reads the current directory, keeping the selected name and the
    /// scroll offset (clamped to the new listing).
    pub fn refresh(&mut self) -> Result<(), AppError> {
        let keep: Option<String> = self.state.selected_entry().map(|e| e.name.to_string());
        let old_scroll = self.state.scroll_offset;
        let current = self.state.current_dir.clone();
        self.enter_path(&current, keep.as_deref(), true)?;
        self.state.scroll_offset = old_scroll;
        let selected = self.state.selected.map_or(0, |s| s as isize);
        self.state.goto(selected);
        Ok(())
    }

    #[must_use]
    pub fn snapshot(&self) -> PersistedState {
        PersistedState {
            window: self.window,
            last_directory: Some(self.state.current_dir.clone()),
            last_selection: self.state.selected_entry().map(|e| e.name.to_string()),
            defaults: self.defaults.clone(),
        }
    }

    /// Writes the state file. Returns `false` if nothing was written.
    pub fn save(&mut self, force: bool) -> Result<bool, AppError> {
        let snapshot = self.snapshot();
        match self.store.as_mut() {
            Some(store) => store.save(&snapshot, force),
            None => Ok(false),
        }
    }

    fn save_quietly(&mut self, force: bool) {
        if let Err(e) = self.save(force) {
            warn!("State not saved: {e}");
        }
    }

    /// Entry at `index` in the current listing.
    #[must_use]
    pub fn entry(&self, index: usize) -> Option<&DirEntry> {
        self.state.entries.get(index)
    }
}

/// Name of the entry in `current` that leads back towards `previous`, when
/// `previous` lies below `current`.
fn exited_child(previous: &str, current: &str) -> Option<String> {
    if previous.is_empty() {
        return None;
    }
    if current.is_empty() {
        return path_utils::volume_root_of(previous);
    }
    let rest = previous.strip_prefix(current)?;
    let rest = if current.ends_with(path_utils::is_path_sep) {
        rest
    } else {
        rest.strip_prefix(path_utils::is_path_sep)?
    };
    let child = path_utils::first_component(rest);
    (!child.is_empty()).then(|| child.to_string())
}
