//! ``src/model/tool_resolver.rs``
//!
//! Resolves a bare tool name to an absolute path, searching the program's own
//! directory, then the initial working directory, then `PATH`. Hits are
//! memoized until the next settings reload.

use ahash::AHashMap;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::fs::path_utils::{self, PathKind};

#[derive(Debug, Clone, Default)]
pub struct ToolResolver {
    search_dirs: Vec<String>,
    cache: AHashMap<String, String>,
}

impl ToolResolver {
    /// A resolver over an explicit, ordered directory list.
    #[must_use]
    pub fn new(search_dirs: Vec<String>) -> Self {
        Self {
            search_dirs: search_dirs.into_iter().filter(|d| !d.is_empty()).collect(),
            cache: AHashMap::new(),
        }
    }

    /// Own directory, then the start directory (if different), then `PATH`.
    #[must_use]
    pub fn from_environment(exec_dir: &str, start_dir: &str) -> Self {
        let mut dirs = vec![exec_dir.to_string()];
        if start_dir != exec_dir {
            dirs.push(start_dir.to_string());
        }
        if let Some(path) = std::env::var_os("PATH") {
            dirs.extend(
                std::env::split_paths(&path)
                    .filter_map(|p| p.to_str().map(str::to_owned)),
            );
        }
        Self::new(dirs)
    }

    #[must_use]
    pub fn search_dirs(&self) -> &[String] {
        &self.search_dirs
    }

    /// Forgets all memoized lookups.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Appends the platform executable suffix when the name has no extension.
    #[must_use]
    pub fn canonical_name(tool: &str) -> String {
        if path_utils::file_ext(tool).is_empty() {
            format!("{tool}{}", std::env::consts::EXE_SUFFIX)
        } else {
            tool.to_string()
        }
    }

    pub fn resolve(&mut self, tool: &str) -> Result<String, AppError> {
        let tool = Self::canonical_name(tool);

        if path_utils::is_absolute_path(&tool) && path_utils::classify(&tool) != PathKind::Missing {
            return Ok(tool);
        }

        if let Some(hit) = self.cache.get(&tool) {
            return Ok(hit.clone());
        }

        for dir in &self.search_dirs {
            let candidate = path_utils::join_path(dir, &tool);
            if path_utils::classify(&candidate) == PathKind::File {
                debug!(
                    marker = "TOOL_RESOLVED",
                    operation_type = "tool_lookup",
                    "{tool} -> {candidate}"
                );
                self.cache.insert(tool, candidate.clone());
                return Ok(candidate);
            }
        }

        warn!("Tool {tool:?} not found in {} search directories", self.search_dirs.len());
        Err(AppError::NotFound(tool))
    }
}
