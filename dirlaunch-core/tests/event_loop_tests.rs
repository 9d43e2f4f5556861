mod common;

use std::{
    ops::ControlFlow,
    time::{Duration, Instant},
};

use common::{Fixture, Launch, RecordingLauncher, selected_name};
use dirlaunch_core::{
    controller::{Action, EventLoop},
    fs::dir_entry::find_in_listing,
};

fn event_loop(fx: &Fixture, actions: &str) -> EventLoop<RecordingLauncher> {
    let mut session = fx.session(actions);
    session.enter_path(&fx.work, None, false).unwrap();
    let settings = fx.dir.path().join("state").join("launcher.ini");
    EventLoop::new(session, RecordingLauncher::default(), settings)
}

#[test]
fn resize_sets_viewport_and_window() {
    let fx = Fixture::new();
    let mut el = event_loop(&fx, "");
    let now = Instant::now();

    assert_eq!(el.apply(Action::Resize(80, 12), now), ControlFlow::Continue(()));
    // Header and status line take one row each.
    assert_eq!(el.session().state().viewport_rows, 10);
    let window = el.session().window().unwrap();
    assert_eq!((window.width, window.height, window.x, window.y), (80, 12, 0, 0));
}

#[test]
fn cursor_actions_move_selection() {
    let fx = Fixture::new();
    let mut el = event_loop(&fx, "");
    let now = Instant::now();

    el.apply(Action::End, now);
    assert_eq!(selected_name(el.session()).as_deref(), Some("notes.txt"));
    el.apply(Action::MoveUp, now);
    assert_eq!(selected_name(el.session()).as_deref(), Some("build.bat"));
    el.apply(Action::Home, now);
    assert_eq!(el.session().state().selected, Some(0));
    el.apply(Action::ScrollBy(3), now);
    assert_eq!(el.session().state().scroll_offset, 0);
}

#[test]
fn double_click_on_selected_row_activates() {
    let fx = Fixture::new();
    let mut el = event_loop(&fx, "txt = viewer.sh\n");
    el.apply(Action::Resize(80, 12), Instant::now());
    let row = find_in_listing(&el.session().state().entries, "notes.txt").unwrap();

    let t0 = Instant::now();
    el.apply(Action::ClickRow(row), t0);
    assert_eq!(selected_name(el.session()).as_deref(), Some("notes.txt"));
    assert!(el.launcher().launches.borrow().is_empty());

    el.apply(Action::ClickRow(row), t0 + Duration::from_millis(200));
    let launches = el.launcher().launches.borrow();
    assert_eq!(launches.len(), 1);
    assert!(matches!(&launches[0], Launch::Spawn { args, .. } if args == &[fx.path("notes.txt")]));
    assert!(el.notification().is_some_and(|n| !n.is_error));
}

#[test]
fn failures_become_notifications() {
    let fx = Fixture::new();
    let mut el = event_loop(&fx, "");
    let now = Instant::now();

    let flow = el.apply(Action::EnterPath(fx.path("nowhere")), now);
    assert_eq!(flow, ControlFlow::Continue(()));
    let note = el.notification().unwrap();
    assert!(note.is_error);
    assert!(note.message.contains("nowhere"));
    assert_eq!(el.session().state().current_dir, fx.work);
}

#[test]
fn pasted_path_is_entered() {
    let fx = Fixture::new();
    let mut el = event_loop(&fx, "");
    el.apply(Action::EnterPath(fx.path("proj/src")), Instant::now());
    assert_eq!(el.session().state().current_dir, fx.path("proj/src"));
}

#[test]
fn reload_without_settings_file_keeps_current_rules() {
    let fx = Fixture::new();
    let mut el = event_loop(&fx, "txt = '~' viewer.sh\n");
    let now = Instant::now();
    assert_eq!(el.session().registry().len(), 1);

    std::fs::write(fx.path("later.txt"), b"").unwrap();
    el.apply(Action::Reload, now);

    assert_eq!(el.session().registry().len(), 1);
    let later = find_in_listing(&el.session().state().entries, "later.txt").unwrap();
    assert_eq!(el.session().entry(later).unwrap().prefix_glyph(), Some('~'));
    let note = el.notification().unwrap();
    assert!(!note.is_error);
    assert!(note.message.contains("keeping current settings"));
}

#[test]
fn reload_reads_settings_file() {
    let fx = Fixture::new();
    let mut el = event_loop(&fx, "txt = '~' viewer.sh\n");
    let settings = fx.dir.path().join("state").join("launcher.ini");
    std::fs::create_dir_all(settings.parent().unwrap()).unwrap();
    std::fs::write(&settings, "[actions]\nbat = '>' viewer.sh\n").unwrap();

    el.apply(Action::Reload, Instant::now());

    let entries = &el.session().state().entries;
    let notes = find_in_listing(entries, "notes.txt").unwrap();
    let build = find_in_listing(entries, "build.bat").unwrap();
    assert!(entries[notes].file_type.is_none());
    assert_eq!(entries[notes].prefix_glyph(), Some(' '));
    assert_eq!(entries[build].prefix_glyph(), Some('>'));
    assert_eq!(
        el.notification().map(|n| n.message.as_str()),
        Some("Settings reloaded")
    );
}

#[test]
fn quit_breaks_the_loop() {
    let fx = Fixture::new();
    let mut el = event_loop(&fx, "");
    assert_eq!(el.apply(Action::Quit, Instant::now()), ControlFlow::Break(()));
}
