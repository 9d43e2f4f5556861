//! ``src/fs/dir_scanner.rs``
//!
//! # `Directory Scanner`: Filesystem Listing
//!
//! Loads a directory into a sorted `Vec<DirEntry>`. The empty path is the
//! volume list pseudo-directory. Nothing is handed back until the listing is
//! complete, so a failed load never disturbs the caller's current view.

use std::{
    fs::{self, ReadDir},
    path::Path,
    time::{Duration, Instant},
};

use tracing::{debug, info};

use crate::error::AppError;
use crate::fs::dir_entry::{DirEntry, listing_order};
use crate::model::file_types::FileTypeRegistry;

/// Lists `path`, or the available volumes when `path` is empty.
///
/// Hidden entries and names starting with `.` are skipped. Real directories
/// always get a synthesized `..` entry; the volume list never does.
pub fn load_directory(path: &str, registry: &FileTypeRegistry) -> Result<Vec<DirEntry>, AppError> {
    let start_time = Instant::now();

    let mut entries: Vec<DirEntry> = if path.is_empty() {
        list_volumes().into_iter().map(|v| DirEntry::directory(&v)).collect()
    } else {
        let read_dir: ReadDir =
            fs::read_dir(Path::new(path)).map_err(|e| AppError::not_accessible(path, e))?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    debug!("Skipping unreadable entry in {path:?}: {e}");
                    continue;
                }
            };

            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                debug!("Skipping non-UTF-8 name in {path:?}");
                continue;
            };
            if name.starts_with('.') || is_hidden(&entry) {
                continue;
            }

            // Follow symlinks so a link to a directory behaves like one.
            let is_dir = fs::metadata(entry.path())
                .map(|m| m.is_dir())
                .or_else(|_| entry.file_type().map(|t| t.is_dir()))
                .unwrap_or(false);

            entries.push(if is_dir {
                DirEntry::directory(&name)
            } else {
                DirEntry::file(&name, registry)
            });
        }
        entries.push(DirEntry::parent());
        entries
    };

    entries.sort_by(listing_order);

    let duration: Duration = start_time.elapsed();
    info!(
        marker = "DIRECTORY_SCAN",
        operation_type = "load_directory",
        entries = entries.len(),
        duration_us = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX),
        "Loaded {:?} in {:?}",
        path,
        duration
    );

    Ok(entries)
}

#[cfg(windows)]
fn is_hidden(entry: &fs::DirEntry) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;

    entry
        .metadata()
        .map(|m| m.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0)
        .unwrap_or(false)
}

#[cfg(not(windows))]
const fn is_hidden(_entry: &fs::DirEntry) -> bool {
    // Dot-files are the only hidden files here; they are filtered by name.
    false
}

/// Currently available volume roots.
#[cfg(windows)]
#[must_use]
pub fn list_volumes() -> Vec<String> {
    (b'A'..=b'Z')
        .map(|letter| format!("{}:\\", letter as char))
        .filter(|root| Path::new(root).exists())
        .collect()
}

/// Currently available volume roots.
#[cfg(not(windows))]
#[must_use]
pub fn list_volumes() -> Vec<String> {
    vec![String::from("/")]
}
