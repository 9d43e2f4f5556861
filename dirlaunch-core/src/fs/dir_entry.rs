//! `src/fs/dir_entry.rs`
//! ============================================================
//! One row of a directory listing.
//!
//! Entries are immutable once built: a directory load produces a fresh
//! `Vec<DirEntry>` that replaces the previous listing in one move.

use std::{cmp::Ordering, sync::Arc};

use compact_str::{CompactString, format_compact};

use crate::fs::path_utils;
use crate::model::file_types::{FileTypeRegistry, FileTypeRule};

/// Name of the synthesized parent-directory entry.
pub const PARENT_DIR: &str = "..";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub is_dir: bool,

    /// Raw name as reported by the OS.
    pub name: CompactString,

    /// Prefix glyph plus name; directories are bracketed.
    pub display: CompactString,

    /// Case-folded `name`.
    pub sort_key: CompactString,

    /// Only set for files whose extension has a registered rule.
    pub file_type: Option<Arc<FileTypeRule>>,
}

impl DirEntry {
    #[must_use]
    pub fn directory(name: &str) -> Self {
        Self {
            is_dir: true,
            name: CompactString::new(name),
            display: format_compact!("[{name}]"),
            sort_key: CompactString::new(path_utils::case_fold(name)),
            file_type: None,
        }
    }

    /// A file entry, annotated from `registry` by its lowercased extension.
    #[must_use]
    pub fn file(name: &str, registry: &FileTypeRegistry) -> Self {
        let file_type = registry.for_extension(&path_utils::file_ext(name)).cloned();
        let prefix = file_type.as_ref().map_or(' ', |rule| rule.prefix);

        Self {
            is_dir: false,
            name: CompactString::new(name),
            display: format_compact!("{prefix}{name}"),
            sort_key: CompactString::new(path_utils::case_fold(name)),
            file_type,
        }
    }

    #[must_use]
    pub fn parent() -> Self {
        Self::directory(PARENT_DIR)
    }

    #[inline]
    #[must_use]
    pub fn is_parent_link(&self) -> bool {
        self.name == PARENT_DIR
    }

    /// The glyph in front of a file name (`' '` when none applies).
    #[must_use]
    pub fn prefix_glyph(&self) -> Option<char> {
        if self.is_dir {
            None
        } else {
            self.display.chars().next()
        }
    }
}

/// Directories first, then ascending by case-folded name.
#[must_use]
pub fn listing_order(a: &DirEntry, b: &DirEntry) -> Ordering {
    b.is_dir
        .cmp(&a.is_dir)
        .then_with(|| a.sort_key.cmp(&b.sort_key))
}

/// Index of the entry whose sort key matches `name` case-insensitively.
#[must_use]
pub fn find_in_listing(entries: &[DirEntry], name: &str) -> Option<usize> {
    let key = path_utils::case_fold(name);
    entries.iter().position(|e| e.sort_key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::file_types::LookupKey;

    #[test]
    fn display_and_sort_key() {
        let dir = DirEntry::directory("Proj");
        assert_eq!(dir.display, "[Proj]");
        assert_eq!(dir.sort_key, "proj");
        assert!(dir.file_type.is_none());
        assert_eq!(dir.prefix_glyph(), None);

        let mut reg = FileTypeRegistry::new();
        reg.insert(
            [LookupKey::parse("bat").unwrap()],
            FileTypeRule {
                prefix: '>',
                command: "cmd".into(),
                args: "/c \"$\"".into(),
            },
        );
        let bat = DirEntry::file("Build.BAT", &reg);
        assert_eq!(bat.display, ">Build.BAT");
        assert_eq!(bat.prefix_glyph(), Some('>'));
        assert!(bat.file_type.is_some());

        let txt = DirEntry::file("notes.txt", &reg);
        assert_eq!(txt.display, " notes.txt");
        assert!(txt.file_type.is_none());
    }

    #[test]
    fn directories_sort_first() {
        let reg = FileTypeRegistry::new();
        let mut entries = vec![
            DirEntry::file("a.txt", &reg),
            DirEntry::directory("Zeta"),
            DirEntry::parent(),
            DirEntry::directory("alpha"),
        ];
        entries.sort_by(listing_order);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["..", "alpha", "Zeta", "a.txt"]);
        assert_eq!(find_in_listing(&entries, "ZETA"), Some(2));
        assert_eq!(find_in_listing(&entries, "missing"), None);
    }
}
