//! src/controller/launcher.rs
//!
//! The process boundary: starting helper tools and handing files to the
//! platform's default opener. Both are fire-and-forget: nothing waits on
//! the child except a small reaper thread that collects its exit status.

use std::{
    process::{Child, Command, ExitStatus, Stdio},
    thread::{self, JoinHandle},
};

use tracing::{debug, info, warn};

use crate::error::AppError;

pub trait ProcessLauncher {
    /// Starts `program` with `args` in `cwd` without waiting for it.
    fn spawn_detached(&self, program: &str, args: &[String], cwd: &str) -> Result<(), AppError>;

    /// Opens `path` with whatever the platform associates with it.
    fn shell_open(&self, path: &str, cwd: &str) -> Result<(), AppError>;
}

/// Launches real processes through `std::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl SystemLauncher {
    fn spawn(mut command: Command, cwd: &str, label: &str) -> Result<(), AppError> {
        if !cwd.is_empty() {
            command.current_dir(cwd);
        }
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = command
            .spawn()
            .map_err(|e| AppError::launch_failed(label, e))?;
        info!(
            marker = "PROCESS_LAUNCHED",
            operation_type = "launch",
            pid = child.id(),
            "Started {label}"
        );
        if let Err(e) = reap_in_background(child) {
            warn!("No reaper thread for {label}: {e}");
        }
        Ok(())
    }
}

/// Waits for `child` on a detached thread so it never lingers as a zombie.
fn reap_in_background(mut child: Child) -> std::io::Result<JoinHandle<Option<ExitStatus>>> {
    let pid = child.id();
    thread::Builder::new()
        .name(format!("reap-{pid}"))
        .spawn(move || match child.wait() {
            Ok(status) => {
                debug!(pid, %status, "Launched process exited");
                Some(status)
            }
            Err(e) => {
                warn!(pid, "Waiting on launched process failed: {e}");
                None
            }
        })
}

impl ProcessLauncher for SystemLauncher {
    fn spawn_detached(&self, program: &str, args: &[String], cwd: &str) -> Result<(), AppError> {
        let mut command = Command::new(program);
        command.args(args);
        Self::spawn(command, cwd, program)
    }

    fn shell_open(&self, path: &str, cwd: &str) -> Result<(), AppError> {
        let command = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.args(["/C", "start", ""]).arg(path);
            c
        } else if cfg!(target_os = "macos") {
            let mut c = Command::new("open");
            c.arg(path);
            c
        } else {
            let mut c = Command::new("xdg-open");
            c.arg(path);
            c
        };
        Self::spawn(command, cwd, path)
    }
}
