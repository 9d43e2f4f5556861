//! src/controller/actions.rs
//! ============================================================================
//! # Actions: what the host asks the navigator to do
//!
//! Raw terminal events are turned into `Action`s by
//! [`InputMapper`](crate::controller::key_map::InputMapper) and applied to the
//! session by the event loop.

use crate::model::file_types::Modifiers;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    Home,
    End,

    /// Left/Right: previous or next sibling directory.
    Sibling(isize),

    /// Backspace.
    Parent,

    /// F5: re-read settings and the current directory.
    Reload,

    /// Space: record the selection as this directory's default.
    SetDefault,

    /// Enter, with the modifiers held at the time.
    Activate(Modifiers),

    QuickSearch(char),

    /// First Escape: cancels quick search and arms quitting.
    CancelQuickSearch,

    /// Mouse wheel, in rows.
    ScrollBy(isize),

    /// Left click on a viewport row.
    ClickRow(usize),

    /// A pasted or dropped path.
    EnterPath(String),

    /// Terminal resized to this many columns and rows.
    Resize(u16, u16),

    Quit,
}
