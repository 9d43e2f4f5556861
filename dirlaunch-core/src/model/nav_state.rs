//! ``src/model/nav_state.rs``
//! ============================================================================
//! # `NavigationState`: listing, cursor and scroll window
//!
//! Holds the current directory's entries together with the selection, the
//! scroll offset and the default marker. Every mutation keeps two invariants:
//! the selection is `None` only for an empty listing and is otherwise a valid
//! index, and the visible window never runs past either end of the listing.

use std::ops::Range;

use crate::fs::{dir_entry::DirEntry, path_utils};

#[derive(Debug, Clone)]
pub struct NavigationState {
    /// Empty string means the volume list.
    pub current_dir: String,

    pub previous_dir: String,

    pub entries: Vec<DirEntry>,

    pub selected: Option<usize>,

    /// First visible row.
    pub scroll_offset: usize,

    /// Index of the recorded default entry, if it is in this listing.
    pub default_index: Option<usize>,

    /// Number of entry rows the host can show.
    pub viewport_rows: usize,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            current_dir: String::new(),
            previous_dir: String::new(),
            entries: Vec::new(),
            selected: None,
            scroll_offset: 0,
            default_index: None,
            viewport_rows: 20,
        }
    }
}

impl NavigationState {
    #[must_use]
    pub fn selected_entry(&self) -> Option<&DirEntry> {
        self.selected.and_then(|idx| self.entries.get(idx))
    }

    /// Full path of the selection, or the current directory when nothing (or
    /// the parent link) is selected.
    #[must_use]
    pub fn current_item(&self) -> String {
        match self.selected_entry() {
            Some(entry) if !entry.is_parent_link() => {
                path_utils::join_path(&self.current_dir, &entry.name)
            }
            _ => self.current_dir.clone(),
        }
    }

    #[must_use]
    pub fn visible_range(&self) -> Range<usize> {
        let start = self.scroll_offset.min(self.entries.len());
        let end = (start + self.viewport_rows).min(self.entries.len());
        start..end
    }

    #[must_use]
    pub fn visible_entries(&self) -> &[DirEntry] {
        &self.entries[self.visible_range()]
    }

    fn max_scroll(&self) -> usize {
        self.entries.len().saturating_sub(self.viewport_rows.max(1))
    }

    /// Update the viewport when the host is resized, keeping the selection visible.
    pub fn set_viewport_rows(&mut self, rows: usize) {
        self.viewport_rows = rows.max(1);
        self.goto(self.selected.map_or(0, |s| s as isize));
    }

    /// Selects `target` clamped into the listing and scrolls by the smallest
    /// amount that makes it visible.
    pub fn goto(&mut self, target: isize) {
        let Some(last) = self.entries.len().checked_sub(1) else {
            self.selected = None;
            self.scroll_offset = 0;
            return;
        };
        let sel = target.clamp(0, last as isize) as usize;
        self.selected = Some(sel);

        let rows = self.viewport_rows.max(1);
        let scroll_min = (sel + 1).saturating_sub(rows);
        if self.scroll_offset < scroll_min {
            self.scroll_offset = scroll_min;
        }
        if self.scroll_offset > sel {
            self.scroll_offset = sel;
        }
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
    }

    pub fn move_by(&mut self, delta: isize) {
        let from = self.selected.map_or(0, |s| s as isize);
        self.goto(from + delta);
    }

    /// Page up (move selection up by viewport height)
    pub fn page_up(&mut self) {
        self.move_by(-self.page_step());
    }

    /// Page down (move selection down by viewport height)
    pub fn page_down(&mut self) {
        self.move_by(self.page_step());
    }

    pub fn select_first(&mut self) {
        self.goto(0);
    }

    pub fn select_last(&mut self) {
        self.goto(self.entries.len() as isize - 1);
    }

    // One row of overlap between pages.
    fn page_step(&self) -> isize {
        self.viewport_rows.saturating_sub(1).max(1) as isize
    }

    /// Scrolls without moving the selection (mouse wheel).
    pub fn scroll_to(&mut self, offset: isize) {
        self.scroll_offset = offset.clamp(0, self.max_scroll() as isize) as usize;
    }

    /// Entry index shown on viewport row `row`, if any.
    #[must_use]
    pub fn index_at_row(&self, row: usize) -> Option<usize> {
        let idx = self.scroll_offset + row;
        (row < self.viewport_rows && idx < self.entries.len()).then_some(idx)
    }

    /// Swaps in a freshly loaded listing for `dir`.
    pub(crate) fn replace_listing(&mut self, dir: String, entries: Vec<DirEntry>) {
        self.previous_dir = std::mem::replace(&mut self.current_dir, dir);
        self.entries = entries;
        self.scroll_offset = 0;
        self.selected = None;
        self.default_index = None;
    }
}
