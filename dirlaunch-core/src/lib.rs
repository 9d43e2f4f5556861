pub mod error;

pub mod config;

pub mod controller {

    pub mod actions;
    pub use actions::Action;

    pub mod event_loop;
    pub use event_loop::EventLoop;

    pub mod key_map;

    pub mod launcher;
    pub use launcher::{ProcessLauncher, SystemLauncher};
}

pub mod model {
    pub mod file_types;
    pub use file_types::{FileTypeRegistry, FileTypeRule, LookupKey, Modifiers};

    pub mod nav_state;
    pub use nav_state::NavigationState;

    pub mod quick_search;

    pub mod session;
    pub use session::{Activation, NavigationSession};

    pub mod tool_resolver;
    pub use tool_resolver::ToolResolver;
}

pub mod view {
    pub mod ui;
}

pub mod fs {
    pub mod dir_entry;

    pub mod dir_scanner;

    pub mod path_utils;
}

pub mod persistence {
    pub mod state_file;
}

pub mod logging;
pub use logging::LoggerBuilder;

pub use config::Config;
pub use error::AppError;
