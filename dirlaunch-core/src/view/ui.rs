//! src/view/ui.rs
//! ============================================================
//! Draws one frame from the navigation session: a directory header, the
//! visible slice of the listing with a scrollbar, and a status line.
//! Nothing here mutates the session.

use ratatui::{
    prelude::*,
    widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};

use crate::config::{ColorScheme, Rgb};
use crate::fs::dir_entry::DirEntry;
use crate::model::session::NavigationSession;

/// Shown in the header when the volume list is current.
pub const VOLUME_LIST_TITLE: &str = "(volumes)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub is_error: bool,
}

impl Notification {
    pub fn error<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }

    pub fn info<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }
}

#[inline]
const fn color(c: Rgb) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

/// Header, list and status rows for a terminal of the given size.
#[must_use]
pub fn split_screen(area: Rect) -> [Rect; 3] {
    Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(area)
}

#[derive(Debug, Default)]
pub struct UIRenderer;

impl UIRenderer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        f: &mut Frame<'_>,
        session: &NavigationSession,
        notification: Option<&Notification>,
    ) {
        let [header, list, status] = split_screen(f.area());
        let colors = &session.config().colors;

        self.draw_header(f, session, colors, header);
        self.draw_list(f, session, colors, list);
        self.draw_status(f, session, colors, notification, status);
    }

    fn draw_header(&self, f: &mut Frame<'_>, session: &NavigationSession, colors: &ColorScheme, area: Rect) {
        let dir = session.state().current_dir.as_str();
        let mut spans = vec![Span::raw(if dir.is_empty() { VOLUME_LIST_TITLE } else { dir })];

        let term = session.quick_search_term();
        if !term.is_empty() {
            spans.push(Span::raw(format!("  /{term}")));
        }

        let style = Style::default()
            .fg(color(colors.dir_text))
            .bg(color(colors.dir_background));
        f.render_widget(Paragraph::new(Line::from(spans)).style(style), area);
    }

    fn draw_list(&self, f: &mut Frame<'_>, session: &NavigationSession, colors: &ColorScheme, area: Rect) {
        let state = session.state();
        let range = state.visible_range();

        let lines: Vec<Line<'_>> = state.entries[range.clone()]
            .iter()
            .zip(range.clone())
            .map(|(entry, idx)| {
                entry_line(
                    entry,
                    colors,
                    state.selected == Some(idx),
                    state.default_index == Some(idx),
                    area.width,
                )
            })
            .collect();

        let background = Style::default().bg(color(colors.background));
        f.render_widget(Paragraph::new(lines).style(background), area);

        if state.entries.len() > area.height as usize {
            let mut scroll = ScrollbarState::new(state.entries.len())
                .viewport_content_length(area.height as usize)
                .position(state.scroll_offset);
            let bar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None)
                .thumb_style(Style::default().fg(color(colors.scrollbar)));
            f.render_stateful_widget(bar, area, &mut scroll);
        }
    }

    fn draw_status(
        &self,
        f: &mut Frame<'_>,
        session: &NavigationSession,
        colors: &ColorScheme,
        notification: Option<&Notification>,
        area: Rect,
    ) {
        let state = session.state();
        let (text, style) = match notification {
            Some(n) if n.is_error => (
                n.message.clone(),
                Style::default().fg(Color::White).bg(Color::Red),
            ),
            Some(n) => (
                n.message.clone(),
                Style::default().fg(color(colors.dir_text)).bg(color(colors.dir_background)),
            ),
            None => {
                let position = state
                    .selected
                    .map_or_else(String::new, |s| format!("{}/{}  ", s + 1, state.entries.len()));
                (
                    format!("{position}{}", state.current_item()),
                    Style::default().fg(color(colors.dir_text)).bg(color(colors.dir_background)),
                )
            }
        };
        f.render_widget(Paragraph::new(text).style(style), area);
    }
}

fn entry_line<'a>(
    entry: &'a DirEntry,
    colors: &ColorScheme,
    selected: bool,
    is_default: bool,
    width: u16,
) -> Line<'a> {
    let (bg, prefix_fg, text_fg, dir_fg) = if selected {
        (
            colors.select_background,
            colors.select_prefix,
            colors.select_text,
            colors.select_subdir,
        )
    } else {
        (colors.background, colors.prefix, colors.text, colors.subdir)
    };
    let base = Style::default().bg(color(bg));
    let marker = Span::styled(if is_default { "*" } else { " " }, base.fg(color(prefix_fg)));

    let mut spans = vec![marker];
    match entry.prefix_glyph() {
        Some(glyph) => {
            spans.push(Span::styled(glyph.to_string(), base.fg(color(prefix_fg))));
            spans.push(Span::styled(entry.name.as_str(), base.fg(color(text_fg))));
        }
        None => spans.push(Span::styled(entry.display.as_str(), base.fg(color(dir_fg)))),
    }

    // Fill the selected row to the edge.
    if selected {
        let used: usize = spans.iter().map(Span::width).sum();
        let pad = usize::from(width).saturating_sub(used);
        spans.push(Span::styled(" ".repeat(pad), base));
    }
    Line::from(spans)
}
