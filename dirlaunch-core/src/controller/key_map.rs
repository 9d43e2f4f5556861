//! src/controller/key_map.rs
//! ============================================================================
//! # Input mapping
//!
//! Translates crossterm key, mouse and paste events into [`Action`]s. The
//! mapper carries the little state the bindings need: whether a first Escape
//! has armed quitting, and the last click for double-click detection.

use std::time::{Duration, Instant};

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::controller::actions::Action;
use crate::model::file_types::Modifiers;

/// Second click on the same row within this window activates it.
pub const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(500);

/// Rows scrolled per wheel notch.
pub const WHEEL_STEP: isize = 3;

#[must_use]
pub fn modifiers_of(mods: KeyModifiers) -> Modifiers {
    Modifiers {
        ctrl: mods.contains(KeyModifiers::CONTROL),
        shift: mods.contains(KeyModifiers::SHIFT),
        alt: mods.contains(KeyModifiers::ALT),
    }
}

#[derive(Debug, Default)]
pub struct InputMapper {
    escape_armed: bool,
    last_click: Option<(usize, Instant)>,
}

impl InputMapper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn escape_armed(&self) -> bool {
        self.escape_armed
    }

    pub fn map_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        if key.code != KeyCode::Esc {
            self.escape_armed = false;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let action = match key.code {
            KeyCode::Up => Action::MoveUp,
            KeyCode::Down => Action::MoveDown,
            KeyCode::Left => Action::Sibling(-1),
            KeyCode::Right => Action::Sibling(1),
            KeyCode::PageUp => Action::PageUp,
            KeyCode::PageDown => Action::PageDown,
            KeyCode::Home => Action::Home,
            KeyCode::End => Action::End,
            KeyCode::Backspace => Action::Parent,
            KeyCode::F(5) => Action::Reload,
            KeyCode::Enter => Action::Activate(modifiers_of(key.modifiers)),
            KeyCode::Esc => {
                if self.escape_armed {
                    Action::Quit
                } else {
                    self.escape_armed = true;
                    Action::CancelQuickSearch
                }
            }
            KeyCode::Char('q' | 'Q') if ctrl => Action::Quit,
            KeyCode::Char(' ') => Action::SetDefault,
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                Action::QuickSearch(c)
            }
            _ => return None,
        };
        Some(action)
    }

    /// Maps a mouse event over a list whose first row is at `list_top` and
    /// which is `list_rows` tall.
    pub fn map_mouse(&mut self, event: MouseEvent, list_top: u16, list_rows: u16) -> Option<Action> {
        match event.kind {
            MouseEventKind::ScrollUp => Some(Action::ScrollBy(-WHEEL_STEP)),
            MouseEventKind::ScrollDown => Some(Action::ScrollBy(WHEEL_STEP)),
            MouseEventKind::Down(MouseButton::Left) => {
                self.escape_armed = false;
                let row = event.row.checked_sub(list_top)?;
                (row < list_rows).then_some(Action::ClickRow(usize::from(row)))
            }
            _ => None,
        }
    }

    /// Records a click on entry `index`; returns `true` when it completes a
    /// double click on an entry that was already selected.
    pub fn register_click(&mut self, index: usize, already_selected: bool, now: Instant) -> bool {
        let double = already_selected
            && self.last_click.is_some_and(|(last, at)| {
                last == index && now.saturating_duration_since(at) <= DOUBLE_CLICK_WINDOW
            });
        self.last_click = if double { None } else { Some((index, now)) };
        double
    }

    /// Turns pasted text into a path: first line, trimmed, outer quotes removed.
    #[must_use]
    pub fn map_paste(text: &str) -> Option<Action> {
        let line = text.lines().next()?.trim();
        let path = line
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .or_else(|| line.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
            .unwrap_or(line)
            .trim();
        (!path.is_empty()).then(|| Action::EnterPath(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode, mods: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: mods,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn navigation_keys() {
        let mut m = InputMapper::new();
        assert_eq!(m.map_key(press(KeyCode::Up, KeyModifiers::NONE)), Some(Action::MoveUp));
        assert_eq!(
            m.map_key(press(KeyCode::Right, KeyModifiers::NONE)),
            Some(Action::Sibling(1))
        );
        assert_eq!(
            m.map_key(press(KeyCode::Backspace, KeyModifiers::NONE)),
            Some(Action::Parent)
        );
        assert_eq!(m.map_key(press(KeyCode::F(5), KeyModifiers::NONE)), Some(Action::Reload));
        assert_eq!(
            m.map_key(press(KeyCode::Char(' '), KeyModifiers::NONE)),
            Some(Action::SetDefault)
        );
        assert_eq!(
            m.map_key(press(KeyCode::Char('B'), KeyModifiers::SHIFT)),
            Some(Action::QuickSearch('B'))
        );
        assert_eq!(m.map_key(press(KeyCode::Char('x'), KeyModifiers::ALT)), None);
    }

    #[test]
    fn enter_carries_modifiers() {
        let mut m = InputMapper::new();
        let action = m.map_key(press(KeyCode::Enter, KeyModifiers::CONTROL | KeyModifiers::SHIFT));
        assert_eq!(
            action,
            Some(Action::Activate(Modifiers {
                ctrl: true,
                shift: true,
                alt: false
            }))
        );
    }

    #[test]
    fn double_escape_quits_and_other_keys_disarm() {
        let mut m = InputMapper::new();
        let esc = press(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(m.map_key(esc), Some(Action::CancelQuickSearch));
        assert!(m.escape_armed());
        m.map_key(press(KeyCode::Down, KeyModifiers::NONE));
        assert!(!m.escape_armed());
        assert_eq!(m.map_key(esc), Some(Action::CancelQuickSearch));
        assert_eq!(m.map_key(esc), Some(Action::Quit));
        assert_eq!(
            m.map_key(press(KeyCode::Char('q'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
    }

    #[test]
    fn key_release_is_ignored() {
        let mut m = InputMapper::new();
        let mut ev = press(KeyCode::Enter, KeyModifiers::NONE);
        ev.kind = KeyEventKind::Release;
        assert_eq!(m.map_key(ev), None);
    }

    #[test]
    fn mouse_rows_and_wheel() {
        let mut m = InputMapper::new();
        let click = |row| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 4,
            row,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(m.map_mouse(click(0), 1, 10), None);
        assert_eq!(m.map_mouse(click(3), 1, 10), Some(Action::ClickRow(2)));
        assert_eq!(m.map_mouse(click(11), 1, 10), None);
        let wheel = MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 0,
            row: 5,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(m.map_mouse(wheel, 1, 10), Some(Action::ScrollBy(WHEEL_STEP)));
    }

    #[test]
    fn double_click_needs_same_selected_row_in_time() {
        let mut m = InputMapper::new();
        let t0 = Instant::now();
        assert!(!m.register_click(4, false, t0));
        assert!(m.register_click(4, true, t0 + Duration::from_millis(300)));
        // A third click starts over.
        assert!(!m.register_click(4, true, t0 + Duration::from_millis(400)));
        assert!(!m.register_click(4, true, t0 + Duration::from_millis(1000)));
        assert!(!m.register_click(5, true, t0 + Duration::from_millis(1100)));
    }

    #[test]
    fn paste_strips_quotes() {
        assert_eq!(
            InputMapper::map_paste("\"C:\\Program Files\"\r\n"),
            Some(Action::EnterPath("C:\\Program Files".into()))
        );
        assert_eq!(
            InputMapper::map_paste("  /srv/data  "),
            Some(Action::EnterPath("/srv/data".into()))
        );
        assert_eq!(InputMapper::map_paste("   "), None);
        assert_eq!(InputMapper::map_paste(""), None);
    }
}
