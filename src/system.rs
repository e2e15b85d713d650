use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tracing::debug;

/// Access to external programs: lookup on the search path and synchronous execution.
pub trait Launcher {
    fn find(&self, program: &str) -> Option<PathBuf>;

    fn run(&self, program: &Path, args: &[String]) -> io::Result<Output>;
}

/// Launcher backed by the real process environment.
#[derive(Debug, Default, Clone)]
pub struct SystemLauncher {
    search_path: Option<OsString>,
}

impl SystemLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search `path` instead of the `PATH` environment variable.
    #[cfg(test)]
    pub fn with_search_path(path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(path.into()),
        }
    }
}

impl Launcher for SystemLauncher {
    fn find(&self, program: &str) -> Option<PathBuf> {
        // Read on every call; the helper may be installed while we run.
        let path = match &self.search_path {
            Some(path) => Some(path.clone()),
            None => std::env::var_os("PATH"),
        }?;
        let cwd = std::env::current_dir().ok()?;
        match which::which_in(program, Some(path), cwd) {
            Ok(found) => Some(found),
            Err(e) => {
                debug!("{} not found: {}", program, e);
                None
            }
        }
    }

    fn run(&self, program: &Path, args: &[String]) -> io::Result<Output> {
        debug!("Running {} {:?}", program.display(), args);
        // The quit reader owns stdin.
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()?;
        debug!("{} exited with {}", program.display(), output.status);
        Ok(output)
    }
}
