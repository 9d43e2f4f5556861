//! src/main.rs
//! Terminal directory navigator and program launcher

use std::{
    io::{self, Stdout},
    panic::PanicHookInfo,
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{error, info, warn};

use dirlaunch_core::{
    config::{AppPaths, Config},
    controller::{event_loop::EventLoop, launcher::SystemLauncher},
    fs::path_utils,
    logging::{LoggerBuilder, LoggerConfig},
    model::{session::NavigationSession, tool_resolver::ToolResolver},
    persistence::state_file::{PersistedState, StateStore},
};

type AppTerminal = Terminal<CrosstermBackend<Stdout>>;

#[derive(Debug, Parser)]
#[command(name = "dirlaunch", version, about = "Keyboard-driven directory navigator and launcher")]
struct Cli {
    /// Directory (or file) to start in
    path: Option<String>,

    /// Directory holding launcher.ini and launcher.state
    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Print the effective settings as TOML and exit
    #[arg(long)]
    dump_config: bool,

    /// Log level or filter directive, e.g. `debug` or `dirlaunch_core=trace`
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = AppPaths::discover(cli.config_dir.as_deref())
        .context("Failed to resolve configuration paths")?;
    let log_base = paths
        .settings_file
        .parent()
        .map(PathBuf::from)
        .unwrap_or_default();
    let _log_guard = LoggerBuilder::new()
        .with_config(LoggerConfig::in_dir(&log_base))
        .with_level(&cli.log_level)
        .build()
        .context("Failed to initialize logging")?;
    info!("Starting dirlaunch with settings at {}", paths.settings_file.display());

    let config = Config::load_optional(&paths.settings_file)
        .context("Failed to read settings file")?
        .unwrap_or_default();

    if cli.dump_config {
        print!("{}", config.to_toml().context("Failed to serialize settings")?);
        return Ok(());
    }

    let store = StateStore::new(&paths.state_file);
    let persisted = store.load().unwrap_or_else(|e| {
        warn!("Ignoring unreadable state file: {e}");
        PersistedState::default()
    });

    let tools = ToolResolver::from_environment(&paths.exec_dir, &paths.start_dir);
    let mut session = NavigationSession::new(config, tools, Some(store));
    session.restore(&persisted);

    let explicit = cli.path.as_deref().map(|p| {
        if path_utils::is_absolute_path(p) {
            p.to_string()
        } else {
            path_utils::join_path(&paths.start_dir, p)
        }
    });
    session
        .open_initial(explicit.as_deref(), &persisted, &paths.start_dir)
        .context("No starting directory could be opened")?;

    setup_panic_handler();
    let mut terminal = setup_terminal().context("Failed to initialize terminal")?;

    let mut event_loop = EventLoop::new(session, SystemLauncher, paths.settings_file.clone());
    let outcome = event_loop.run(&mut terminal).await;

    cleanup_terminal(&mut terminal)?;
    outcome.context("Application runtime error")?;

    info!("Application exited cleanly");
    Ok(())
}

fn setup_terminal() -> Result<AppTerminal> {
    enable_raw_mode().context("Failed to enable raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)
        .context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    info!("Terminal setup complete");
    Ok(terminal)
}

fn cleanup_terminal(terminal: &mut AppTerminal) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        DisableMouseCapture,
        LeaveAlternateScreen
    )
    .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    info!("Terminal cleanup complete");
    Ok(())
}

fn setup_panic_handler() {
    let original_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info: &PanicHookInfo<'_>| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), DisableMouseCapture, LeaveAlternateScreen);

        error!("Application panicked: {}", panic_info);
        original_hook(panic_info);
    }));
}
