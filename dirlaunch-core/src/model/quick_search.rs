//! ``src/model/quick_search.rs``
//!
//! Type-to-select. Characters typed in quick succession build up a
//! case-folded prefix; after [`QUICK_SEARCH_TIMEOUT`] of inactivity the next
//! character starts a fresh term.

use std::time::{Duration, Instant};

use crate::fs::dir_entry::DirEntry;

pub const QUICK_SEARCH_TIMEOUT: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Default)]
pub struct QuickSearch {
    term: String,
    deadline: Option<Instant>,
}

impl QuickSearch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Forces the current term to expire (Escape).
    pub fn expire(&mut self) {
        self.deadline = None;
    }

    /// Feeds one typed character and returns the index to select, if any.
    /// Control characters are ignored and do not touch the term.
    pub fn input(
        &mut self,
        c: char,
        now: Instant,
        entries: &[DirEntry],
        selection: Option<usize>,
    ) -> Option<usize> {
        if c.is_control() {
            return None;
        }

        if self.deadline.is_none_or(|deadline| now > deadline) {
            self.term.clear();
        }
        self.deadline = Some(now + QUICK_SEARCH_TIMEOUT);
        self.term.extend(c.to_lowercase());

        self.find(entries, selection)
    }

    /// Scans once around the list, starting just after `selection` and
    /// ending on the selection itself.
    #[must_use]
    pub fn find(&self, entries: &[DirEntry], selection: Option<usize>) -> Option<usize> {
        let len = entries.len();
        if len == 0 || self.term.is_empty() {
            return None;
        }
        let start = selection.map_or(0, |s| s + 1);
        (0..len)
            .map(|offset| (start + offset) % len)
            .find(|&i| entries[i].sort_key.starts_with(self.term.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::file_types::FileTypeRegistry;

    fn listing(names: &[&str]) -> Vec<DirEntry> {
        let reg = FileTypeRegistry::new();
        names.iter().map(|n| DirEntry::file(n, &reg)).collect()
    }

    #[test]
    fn narrows_within_timeout_and_restarts_after() {
        let entries = listing(&["bootstrap.sh", "build.bat", "config.ini"]);
        let mut qs = QuickSearch::new();
        let t0 = Instant::now();

        let mut sel = Some(2);
        sel = qs.input('b', t0, &entries, sel).or(sel);
        assert_eq!(sel, Some(0));
        sel = qs.input('U', t0 + Duration::from_millis(300), &entries, sel).or(sel);
        assert_eq!(sel, Some(1));
        assert_eq!(qs.term(), "bu");

        let late = t0 + Duration::from_millis(300) + QUICK_SEARCH_TIMEOUT + Duration::from_millis(1);
        sel = qs.input('b', late, &entries, sel).or(sel);
        assert_eq!(qs.term(), "b");
        // Starts just after build.bat and wraps to bootstrap.sh.
        assert_eq!(sel, Some(0));
    }

    #[test]
    fn escape_forces_expiry() {
        let entries = listing(&["alpha", "beta"]);
        let mut qs = QuickSearch::new();
        let t0 = Instant::now();
        qs.input('a', t0, &entries, None);
        qs.expire();
        assert_eq!(qs.input('b', t0, &entries, Some(0)), Some(1));
        assert_eq!(qs.term(), "b");
    }

    #[test]
    fn current_selection_is_checked_last() {
        let entries = listing(&["abc", "xyz"]);
        let mut qs = QuickSearch::new();
        assert_eq!(qs.input('a', Instant::now(), &entries, Some(0)), Some(0));
    }

    #[test]
    fn no_match_and_control_chars() {
        let entries = listing(&["abc"]);
        let mut qs = QuickSearch::new();
        assert_eq!(qs.input('\u{1b}', Instant::now(), &entries, Some(0)), None);
        assert_eq!(qs.term(), "");
        assert_eq!(qs.input('z', Instant::now(), &entries, Some(0)), None);
        assert_eq!(qs.input('z', Instant::now(), &[], None), None);
    }
}
