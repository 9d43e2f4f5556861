//! ``src/controller/event_loop.rs``
//! ============================================================================
//! # Event Loop: terminal host for the navigation session
//!
//! Reads crossterm events, maps them to [`Action`]s and applies them to the
//! [`NavigationSession`]. Failures never end the loop; they become a
//! status-line notification that fades after a few seconds.

use std::{
    ops::ControlFlow,
    path::PathBuf,
    time::{Duration, Instant},
};

use crossterm::event::{Event as TermEvent, EventStream};
use futures::StreamExt;
use ratatui::{Terminal, backend::Backend, layout::Rect};
use tracing::{debug, error, info, trace, warn};

use crate::config::Config;
use crate::controller::{
    actions::Action,
    key_map::InputMapper,
    launcher::ProcessLauncher,
};
use crate::error::AppError;
use crate::model::{
    file_types::Modifiers,
    session::{Activation, NavigationSession},
};
use crate::persistence::state_file::WindowRect;
use crate::view::ui::{Notification, UIRenderer, split_screen};

/// How long a notification stays on the status line.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

const TICK: Duration = Duration::from_millis(250);

pub struct EventLoop<L: ProcessLauncher> {
    session: NavigationSession,
    launcher: L,
    mapper: InputMapper,
    renderer: UIRenderer,
    settings_file: PathBuf,
    screen: Rect,
    notification: Option<(Notification, Instant)>,
}

impl<L: ProcessLauncher> EventLoop<L> {
    pub fn new(session: NavigationSession, launcher: L, settings_file: PathBuf) -> Self {
        Self {
            session,
            launcher,
            mapper: InputMapper::new(),
            renderer: UIRenderer::new(),
            settings_file,
            screen: Rect::default(),
            notification: None,
        }
    }

    #[must_use]
    pub const fn session(&self) -> &NavigationSession {
        &self.session
    }

    #[must_use]
    pub const fn launcher(&self) -> &L {
        &self.launcher
    }

    #[must_use]
    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref().map(|(n, _)| n)
    }

    pub fn notify(&mut self, notification: Notification, now: Instant) {
        self.notification = Some((notification, now));
    }

    /// Runs until the user quits or the terminal goes away, then performs the
    /// once-per-session state save.
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let size = terminal
            .size()
            .map_err(|e| AppError::Terminal(e.to_string()))?;
        self.apply(Action::Resize(size.width, size.height), Instant::now());

        let mut events = EventStream::new();
        let mut tick = tokio::time::interval(TICK);
        info!("Event loop started");

        loop {
            self.expire_notification(Instant::now());
            let note = self.notification.as_ref().map(|(n, _)| n);
            terminal
                .draw(|f| self.renderer.render(f, &self.session, note))
                .map_err(|e| AppError::Terminal(e.to_string()))?;

            let action = tokio::select! {
                maybe_event = events.next() => match maybe_event {
                    Some(Ok(event)) => {
                        trace!("Terminal event received: {:?}", event);
                        self.map_event(event)
                    }
                    Some(Err(e)) => return Err(AppError::Terminal(e.to_string())),
                    None => {
                        info!("Terminal event stream closed");
                        Some(Action::Quit)
                    }
                },
                _ = tick.tick() => None,
            };

            if let Some(action) = action {
                debug!("Applying {:?}", action);
                if self.apply(action, Instant::now()).is_break() {
                    break;
                }
            }
        }

        if let Err(e) = self.session.save(false) {
            warn!("State not saved on exit: {e}");
        }
        info!("Event loop terminated cleanly");
        Ok(())
    }

    fn map_event(&mut self, event: TermEvent) -> Option<Action> {
        match event {
            TermEvent::Key(key) => self.mapper.map_key(key),
            TermEvent::Mouse(mouse) => {
                let [_, list, _] = split_screen(self.screen);
                self.mapper.map_mouse(mouse, list.y, list.height)
            }
            TermEvent::Paste(text) => InputMapper::map_paste(&text),
            TermEvent::Resize(cols, rows) => Some(Action::Resize(cols, rows)),
            _ => None,
        }
    }

    fn expire_notification(&mut self, now: Instant) {
        if self
            .notification
            .as_ref()
            .is_some_and(|(_, at)| now.saturating_duration_since(*at) >= NOTIFICATION_TTL)
        {
            self.notification = None;
        }
    }

    /// Applies one action. `Break` means quit.
    pub fn apply(&mut self, action: Action, now: Instant) -> ControlFlow<()> {
        if self.move_cursor(&action) {
            return ControlFlow::Continue(());
        }
        let result = match action {
            Action::Quit => {
                info!("Quit requested");
                return ControlFlow::Break(());
            }
            Action::MoveUp
            | Action::MoveDown
            | Action::PageUp
            | Action::PageDown
            | Action::Home
            | Action::End
            | Action::ScrollBy(_) => Ok(()),
            Action::Sibling(delta) => self.session.enter_sibling(delta).map(drop),
            Action::Parent => self.session.enter_parent().map(drop),
            Action::Reload => self.reload(now),
            Action::SetDefault => {
                let selected = self.session.state().selected;
                self.session.set_default(selected)
            }
            Action::Activate(modifiers) => self.activate(modifiers, now),
            Action::QuickSearch(c) => {
                self.session.quick_search(c, now);
                Ok(())
            }
            Action::CancelQuickSearch => {
                self.session.cancel_quick_search();
                Ok(())
            }
            Action::ClickRow(row) => self.click_row(row, now),
            Action::EnterPath(path) => self.session.enter_path(&path, None, false).map(drop),
            Action::Resize(cols, rows) => {
                self.resize(cols, rows);
                Ok(())
            }
        };

        if let Err(e) = result {
            if e.is_user_facing() {
                warn!(marker = "USER_ERROR", "{e}");
            } else {
                error!("{e}");
            }
            self.notify(Notification::error(e.to_string()), now);
        }
        ControlFlow::Continue(())
    }

    /// Cursor and scroll moves, which cannot fail.
    fn move_cursor(&mut self, action: &Action) -> bool {
        let state = self.session.state_mut();
        match *action {
            Action::MoveUp => state.move_by(-1),
            Action::MoveDown => state.move_by(1),
            Action::PageUp => state.page_up(),
            Action::PageDown => state.page_down(),
            Action::Home => state.select_first(),
            Action::End => state.select_last(),
            Action::ScrollBy(delta) => state.scroll_to(state.scroll_offset as isize + delta),
            _ => return false,
        }
        true
    }

    fn activate(&mut self, modifiers: Modifiers, now: Instant) -> Result<(), AppError> {
        match self.session.activate(modifiers, &self.launcher)? {
            Activation::Launched { program, .. } => {
                self.notify(Notification::info(format!("Started {program}")), now);
            }
            Activation::Opened(path) => {
                self.notify(Notification::info(format!("Opened {path}")), now);
            }
            Activation::Entered | Activation::Nothing => {}
        }
        Ok(())
    }

    fn click_row(&mut self, row: usize, now: Instant) -> Result<(), AppError> {
        let state = self.session.state();
        let Some(index) = state.index_at_row(row) else {
            return Ok(());
        };
        let already_selected = state.selected == Some(index);
        if self.mapper.register_click(index, already_selected, now) {
            self.activate(Modifiers::NONE, now)
        } else {
            self.session.state_mut().goto(index as isize);
            Ok(())
        }
    }

    fn reload(&mut self, now: Instant) -> Result<(), AppError> {
        let (config, warnings) = match Config::load(&self.settings_file) {
            Ok(loaded) => loaded,
            Err(AppError::ConfigIo { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                // Settings stay as they are; only the listing is refreshed.
                warn!("No settings file at {}", self.settings_file.display());
                self.session.refresh()?;
                self.notify(
                    Notification::info(format!(
                        "No settings file at {}, keeping current settings",
                        self.settings_file.display()
                    )),
                    now,
                );
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        self.session.reload(config)?;
        let message = if warnings.is_empty() {
            "Settings reloaded".to_string()
        } else {
            format!("Settings reloaded with {} warning(s)", warnings.len())
        };
        self.notify(Notification::info(message), now);
        Ok(())
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        self.screen = Rect::new(0, 0, cols, rows);
        let [_, list, _] = split_screen(self.screen);
        self.session.state_mut().set_viewport_rows(usize::from(list.height));
        self.session.set_window(Some(WindowRect {
            width: i32::from(cols),
            height: i32::from(rows),
            x: 0,
            y: 0,
        }));
    }
}
