#![allow(dead_code)]

use std::{cell::RefCell, fs, path::Path};

use dirlaunch_core::{
    AppError, Config,
    controller::launcher::ProcessLauncher,
    fs::path_utils,
    model::{session::NavigationSession, tool_resolver::ToolResolver},
    persistence::state_file::StateStore,
};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launch {
    Spawn {
        program: String,
        args: Vec<String>,
        cwd: String,
    },
    Open {
        path: String,
        cwd: String,
    },
}

/// Records launches instead of starting processes.
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    pub launches: RefCell<Vec<Launch>>,
}

impl ProcessLauncher for RecordingLauncher {
    fn spawn_detached(&self, program: &str, args: &[String], cwd: &str) -> Result<(), AppError> {
        self.launches.borrow_mut().push(Launch::Spawn {
            program: program.to_string(),
            args: args.to_vec(),
            cwd: cwd.to_string(),
        });
        Ok(())
    }

    fn shell_open(&self, path: &str, cwd: &str) -> Result<(), AppError> {
        self.launches.borrow_mut().push(Launch::Open {
            path: path.to_string(),
            cwd: cwd.to_string(),
        });
        Ok(())
    }
}

/// A scratch tree:
///
/// ```text
/// work/
///   proj/src/
///   tools/viewer.sh
///   build.bat
///   notes.txt
/// state/
/// ```
pub struct Fixture {
    pub dir: TempDir,
    pub work: String,
    pub tools: String,
    pub state_file: std::path::PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::Builder::new().prefix("nav").tempdir().unwrap();
        let work = dir.path().join("work");
        fs::create_dir_all(work.join("proj").join("src")).unwrap();
        fs::create_dir_all(work.join("tools")).unwrap();
        fs::write(work.join("tools").join("viewer.sh"), b"#!/bin/sh\n").unwrap();
        fs::write(work.join("build.bat"), b"@echo off\n").unwrap();
        fs::write(work.join("notes.txt"), b"hello\n").unwrap();

        let work_str = path_str(&work);
        let tools = path_utils::join_path(&work_str, "tools");
        let state_file = dir.path().join("state").join("launcher.state");
        Self {
            dir,
            work: work_str,
            tools,
            state_file,
        }
    }

    pub fn path(&self, relative: &str) -> String {
        relative
            .split('/')
            .fold(self.work.clone(), |acc, part| path_utils::join_path(&acc, part))
    }

    pub fn config(&self, actions: &str) -> Config {
        let text = format!("[actions]\n{actions}");
        Config::parse_with_env(&text, |_| None).0
    }

    pub fn session(&self, actions: &str) -> NavigationSession {
        NavigationSession::new(
            self.config(actions),
            ToolResolver::new(vec![self.tools.clone()]),
            Some(StateStore::new(&self.state_file)),
        )
    }
}

pub fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

pub fn names(session: &NavigationSession) -> Vec<String> {
    session
        .state()
        .entries
        .iter()
        .map(|e| e.name.to_string())
        .collect()
}

pub fn selected_name(session: &NavigationSession) -> Option<String> {
    session.state().selected_entry().map(|e| e.name.to_string())
}
