//! `src/fs/path_utils.rs`
//!
//! String-level path helpers. Paths are kept as plain strings throughout the
//! navigator because they double as case-folded map keys and are written
//! verbatim to the state file. Both `/` and `\` count as separators, and a
//! drive prefix (`X:`) marks an absolute path on every platform.

use std::path::{MAIN_SEPARATOR, Path};

/// Classification of a path on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Missing,
    File,
    Dir,
}

#[inline]
#[must_use]
pub const fn is_path_sep(c: char) -> bool {
    c == '\\' || c == '/'
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// `X:...` or anything starting with a separator.
#[must_use]
pub fn is_absolute_path(path: &str) -> bool {
    has_drive_prefix(path) || path.starts_with(is_path_sep)
}

/// `X:`, `X:\`, `X:/`, or a lone separator.
#[must_use]
pub fn is_volume_root(path: &str) -> bool {
    if has_drive_prefix(path) {
        return path.len() == 2 || (path.len() == 3 && path[2..].starts_with(is_path_sep));
    }
    path.len() == 1 && path.starts_with(is_path_sep)
}

#[must_use]
pub fn last_separator_index(path: &str) -> Option<usize> {
    path.rfind(is_path_sep)
}

/// File name part of a path.
#[must_use]
pub fn base_name(path: &str) -> &str {
    match last_separator_index(path) {
        Some(sep) => &path[sep + 1..],
        None => path,
    }
}

/// Directory part of a path. Returns the empty string (the volume list) for a
/// volume root, and keeps the trailing separator when the parent is a root.
#[must_use]
pub fn dir_name(path: &str) -> String {
    if is_volume_root(path) {
        return String::new();
    }
    let Some(sep) = last_separator_index(path) else {
        return String::new();
    };
    if sep == 0 {
        return path[..1].to_string();
    }
    let parent = &path[..sep];
    if is_volume_root(parent) {
        return path[..=sep].to_string();
    }
    parent.to_string()
}

/// Lowercased extension without the dot, or `""`.
#[must_use]
pub fn file_ext(path: &str) -> String {
    let name = base_name(path);
    match name.rfind('.') {
        Some(dot) => name[dot + 1..].to_lowercase(),
        None => String::new(),
    }
}

/// Joins `b` onto `a`. `..` walks up one level, an absolute `b` (or an
/// empty `a`) replaces `a` entirely. Drive-letter paths only count as
/// absolute on Windows; elsewhere `a:b` is an ordinary file name.
#[must_use]
pub fn join_path(a: &str, b: &str) -> String {
    if b.is_empty() {
        return a.to_string();
    }
    if b == ".." {
        return dir_name(a);
    }
    if b.starts_with(is_path_sep) || (cfg!(windows) && has_drive_prefix(b)) || a.is_empty() {
        return b.to_string();
    }
    if a.ends_with(is_path_sep) {
        format!("{a}{b}")
    } else {
        format!("{a}{MAIN_SEPARATOR}{b}")
    }
}

/// Drops trailing separators, except the one that belongs to a volume root.
#[must_use]
pub fn trim_trailing_separators(path: &str) -> &str {
    let mut trimmed = path;
    while trimmed.len() > 1 && trimmed.ends_with(is_path_sep) && !is_volume_root(trimmed) {
        trimmed = &trimmed[..trimmed.len() - 1];
    }
    trimmed
}

/// The volume root an absolute path lives on, as listed in the volume list.
#[must_use]
pub fn volume_root_of(path: &str) -> Option<String> {
    if has_drive_prefix(path) {
        let sep = path[2..]
            .chars()
            .next()
            .filter(|c| is_path_sep(*c))
            .unwrap_or(MAIN_SEPARATOR);
        return Some(format!("{}{sep}", &path[..2]));
    }
    path.chars().next().filter(|c| is_path_sep(*c)).map(String::from)
}

/// First path component of a relative path.
#[must_use]
pub fn first_component(relative: &str) -> &str {
    match relative.find(is_path_sep) {
        Some(sep) => &relative[..sep],
        None => relative,
    }
}

/// Case-folded form used for sort keys and defaults-map keys.
#[inline]
#[must_use]
pub fn case_fold(s: &str) -> String {
    s.to_lowercase()
}

/// Classifies a path. The empty path is the volume list and counts as a directory.
#[must_use]
pub fn classify(path: &str) -> PathKind {
    if path.is_empty() {
        return PathKind::Dir;
    }
    match std::fs::metadata(Path::new(path)) {
        Ok(meta) if meta.is_dir() => PathKind::Dir,
        Ok(_) => PathKind::File,
        Err(_) => PathKind::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_and_volume_roots() {
        assert!(is_absolute_path("C:\\work"));
        assert!(is_absolute_path("/usr/bin"));
        assert!(!is_absolute_path("tools\\cmd.exe"));

        assert!(is_volume_root("C:"));
        assert!(is_volume_root("c:\\"));
        assert!(is_volume_root("/"));
        assert!(!is_volume_root("C:\\work"));
        assert!(!is_volume_root(""));
    }

    #[test]
    fn dir_name_keeps_root_separator() {
        assert_eq!(dir_name("C:\\work\\proj"), "C:\\work");
        assert_eq!(dir_name("C:\\work"), "C:\\");
        assert_eq!(dir_name("C:\\"), "");
        assert_eq!(dir_name("/home/user"), "/home");
        assert_eq!(dir_name("/home"), "/");
        assert_eq!(dir_name("/"), "");
        assert_eq!(dir_name("plain"), "");
    }

    #[test]
    fn base_name_and_extension() {
        assert_eq!(base_name("C:\\work\\build.bat"), "build.bat");
        assert_eq!(base_name("/a/b/c.TXT"), "c.TXT");
        assert_eq!(base_name("noslash"), "noslash");
        assert_eq!(file_ext("C:\\work\\Build.BAT"), "bat");
        assert_eq!(file_ext("C:\\dir.d\\Makefile"), "");
        assert_eq!(file_ext(""), "");
    }

    #[test]
    fn join_handles_parent_and_absolute() {
        assert_eq!(join_path("C:\\work\\proj", ".."), "C:\\work");
        assert_eq!(join_path("/a", "/b"), "/b");
        assert_eq!(join_path("", "C:\\"), "C:\\");
        assert_eq!(join_path("C:\\", "work"), "C:\\work");
        assert_eq!(join_path("/a", ""), "/a");
        assert_eq!(join_path("/a", "b"), format!("/a{MAIN_SEPARATOR}b"));
    }

    #[test]
    fn join_treats_drive_names_by_platform() {
        if cfg!(windows) {
            assert_eq!(join_path("C:\\work", "D:\\x"), "D:\\x");
        } else {
            assert_eq!(join_path("/srv", "a:b"), format!("/srv{MAIN_SEPARATOR}a:b"));
            assert_eq!(join_path("/srv", "1:x"), format!("/srv{MAIN_SEPARATOR}1:x"));
        }
        // Never a drive: the first byte is not a letter.
        assert_eq!(join_path("C:\\", "1:x"), "C:\\1:x");
    }

    #[test]
    fn volume_root_and_components() {
        assert_eq!(volume_root_of("C:\\work\\proj").as_deref(), Some("C:\\"));
        assert_eq!(volume_root_of("/home/user").as_deref(), Some("/"));
        assert_eq!(volume_root_of("relative"), None);
        assert_eq!(first_component("proj\\sub"), "proj");
        assert_eq!(first_component("proj"), "proj");
        assert_eq!(trim_trailing_separators("/a/b//"), "/a/b");
        assert_eq!(trim_trailing_separators("C:\\"), "C:\\");
        assert_eq!(trim_trailing_separators("/"), "/");
    }

    #[test]
    fn classify_volume_list_and_missing() {
        assert_eq!(classify(""), PathKind::Dir);
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_string_lossy().to_string();
        assert_eq!(classify(&root), PathKind::Dir);
        std::fs::write(dir.path().join("f.txt"), b"x").unwrap();
        assert_eq!(classify(&join_path(&root, "f.txt")), PathKind::File);
        assert_eq!(classify(&join_path(&root, "nope")), PathKind::Missing);
    }
}
