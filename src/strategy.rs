use crate::platform::Platform;
use crate::system::Launcher;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, error};

/// Preferred pointer utility on macOS. Needs no accessibility grant.
pub const CLICLICK: &str = "cliclick";
const OSASCRIPT: &str = "osascript";
const POWERSHELL: &str = "powershell";

/// Nudge by one pixel, hold 10ms, move back.
const CLICLICK_ARGS: [&str; 3] = ["m:+1,+1", "w:10", "m:-1,-1"];

const APPLESCRIPT: &str = r#"
tell application "System Events"
    set currentPos to (get position of mouse)
    set mouseX to item 1 of currentPos
    set mouseY to item 2 of currentPos
    set mouse position to {mouseX + 1, mouseY + 1}
    delay 0.01
    set mouse position to {mouseX, mouseY}
end tell
"#;

const POWERSHELL_SCRIPT: &str = r#"
Add-Type -TypeDefinition '
    using System;
    using System.Runtime.InteropServices;
    public class Win32 {
        [DllImport("user32.dll")]
        public static extern bool GetCursorPos(out POINT lpPoint);
        [DllImport("user32.dll")]
        public static extern bool SetCursorPos(int x, int y);
        public struct POINT { public int x; public int y; }
    }
';
$pos = New-Object Win32+POINT;
[Win32]::GetCursorPos([ref]$pos) | Out-Null;
[Win32]::SetCursorPos($pos.x + 1, $pos.y + 1) | Out-Null;
Start-Sleep -Milliseconds 10;
[Win32]::SetCursorPos($pos.x, $pos.y) | Out-Null;
"#;

/// Which mechanism performed (or tried to perform) the nudge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `cliclick` found on the search path.
    Helper,
    /// AppleScript through System Events.
    Fallback,
    /// PowerShell calling user32 directly.
    Native,
}

impl Route {
    pub fn label(&self) -> &'static str {
        match self {
            Route::Helper => "helper",
            Route::Fallback => "fallback",
            Route::Native => "native",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub route: Route,
    pub name: &'static str,
    pub program: PathBuf,
    pub args: Vec<String>,
}

#[derive(Debug, Error)]
pub enum NudgeError {
    #[error("could not launch {program}: {source}")]
    Launch {
        program: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("{program} failed ({status}){}", stderr_detail(.stderr))]
    Exit {
        program: &'static str,
        status: String,
        stderr: String,
    },
    #[error("Unsupported operating system: {os}")]
    Unsupported { os: String },
}

fn stderr_detail(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr)
    }
}

/// Result of a single tick's attempt. Carries no state into the next tick.
#[derive(Debug)]
pub struct Outcome {
    pub route: Option<Route>,
    pub result: Result<(), NudgeError>,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

pub struct Strategy<L: Launcher> {
    platform: Platform,
    launcher: L,
}

impl<L: Launcher> Strategy<L> {
    pub fn new(platform: Platform, launcher: L) -> Self {
        Self { platform, launcher }
    }

    #[cfg(test)]
    pub(crate) fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Decide what to run for this tick. The helper lookup is never cached.
    pub fn plan(&self) -> Result<Invocation, NudgeError> {
        match &self.platform {
            Platform::MacOs => match self.launcher.find(CLICLICK) {
                Some(program) => Ok(Invocation {
                    route: Route::Helper,
                    name: CLICLICK,
                    program,
                    args: CLICLICK_ARGS.iter().map(|arg| arg.to_string()).collect(),
                }),
                None => {
                    debug!("{} not found on PATH, falling back to AppleScript", CLICLICK);
                    Ok(Invocation {
                        route: Route::Fallback,
                        name: OSASCRIPT,
                        program: PathBuf::from(OSASCRIPT),
                        args: vec!["-e".to_string(), APPLESCRIPT.to_string()],
                    })
                }
            },
            Platform::Windows => Ok(Invocation {
                route: Route::Native,
                name: POWERSHELL,
                program: PathBuf::from(POWERSHELL),
                args: vec![
                    "-NoProfile".to_string(),
                    "-Command".to_string(),
                    POWERSHELL_SCRIPT.to_string(),
                ],
            }),
            Platform::Unsupported(os) => Err(NudgeError::Unsupported { os: os.clone() }),
        }
    }

    /// Move the pointer one unit and back. Never fails outward.
    pub fn simulate(&self) -> Outcome {
        let invocation = match self.plan() {
            Ok(invocation) => invocation,
            Err(err) => {
                error!("{}", err);
                return Outcome {
                    route: None,
                    result: Err(err),
                };
            }
        };

        let result = match self.launcher.run(&invocation.program, &invocation.args) {
            Ok(output) if output.status.success() => Ok(()),
            Ok(output) => Err(NudgeError::Exit {
                program: invocation.name,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
            Err(source) => Err(NudgeError::Launch {
                program: invocation.name,
                source,
            }),
        };

        Outcome {
            route: Some(invocation.route),
            result,
        }
    }

    /// Remediation shown next to a failed attempt.
    pub fn hint(&self) -> Option<&'static str> {
        match self.platform {
            Platform::MacOs => {
                Some("Try 'brew install cliclick' or grant accessibility permissions")
            }
            Platform::Windows => {
                Some("Check that PowerShell is installed and allowed to run scripts")
            }
            Platform::Unsupported(_) => None,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::path::Path;
    use std::process::{ExitStatus, Output};

    #[cfg(unix)]
    pub(crate) fn exit_status(code: i32) -> ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        ExitStatus::from_raw(code << 8)
    }

    #[cfg(windows)]
    pub(crate) fn exit_status(code: i32) -> ExitStatus {
        use std::os::windows::process::ExitStatusExt;
        ExitStatus::from_raw(code as u32)
    }

    /// Records every lookup and run instead of touching the system.
    pub(crate) struct FakeLauncher {
        pub helper: Option<PathBuf>,
        pub exit_code: Option<i32>,
        pub stderr: &'static str,
        pub finds: Cell<usize>,
        pub runs: RefCell<Vec<(PathBuf, Vec<String>)>>,
    }

    impl FakeLauncher {
        pub(crate) fn new(helper: Option<&str>, exit_code: Option<i32>) -> Self {
            Self {
                helper: helper.map(PathBuf::from),
                exit_code,
                stderr: "",
                finds: Cell::new(0),
                runs: RefCell::new(Vec::new()),
            }
        }
    }

    impl Launcher for FakeLauncher {
        fn find(&self, program: &str) -> Option<PathBuf> {
            assert_eq!(program, CLICLICK);
            self.finds.set(self.finds.get() + 1);
            self.helper.clone()
        }

        fn run(&self, program: &Path, args: &[String]) -> io::Result<Output> {
            self.runs
                .borrow_mut()
                .push((program.to_path_buf(), args.to_vec()));
            match self.exit_code {
                Some(code) => Ok(Output {
                    status: exit_status(code),
                    stdout: Vec::new(),
                    stderr: self.stderr.as_bytes().to_vec(),
                }),
                None => Err(io::Error::new(io::ErrorKind::NotFound, "program not found")),
            }
        }
    }

    #[test]
    fn test_macos_prefers_helper() {
        let strategy = Strategy::new(
            Platform::MacOs,
            FakeLauncher::new(Some("/opt/homebrew/bin/cliclick"), Some(0)),
        );

        let outcome = strategy.simulate();

        assert!(outcome.is_success());
        assert_eq!(outcome.route, Some(Route::Helper));
        let runs = strategy.launcher.runs.borrow();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].0, PathBuf::from("/opt/homebrew/bin/cliclick"));
        assert_eq!(runs[0].1, vec!["m:+1,+1", "w:10", "m:-1,-1"]);
    }

    #[test]
    fn test_macos_falls_back_to_applescript() {
        let strategy = Strategy::new(Platform::MacOs, FakeLauncher::new(None, Some(0)));

        let outcome = strategy.simulate();

        assert!(outcome.is_success());
        assert_eq!(outcome.route, Some(Route::Fallback));
        let runs = strategy.launcher.runs.borrow();
        assert_eq!(runs[0].0, PathBuf::from("osascript"));
        assert_eq!(runs[0].1[0], "-e");
        assert!(runs[0].1[1].contains("set mouse position to {mouseX + 1, mouseY + 1}"));
        assert!(runs[0].1[1].contains("set mouse position to {mouseX, mouseY}"));
    }

    #[test]
    fn test_windows_uses_powershell() {
        let strategy = Strategy::new(Platform::Windows, FakeLauncher::new(None, Some(0)));

        let outcome = strategy.simulate();

        assert!(outcome.is_success());
        assert_eq!(outcome.route, Some(Route::Native));
        assert_eq!(strategy.launcher.finds.get(), 0);
        let runs = strategy.launcher.runs.borrow();
        assert_eq!(runs[0].0, PathBuf::from("powershell"));
        assert!(runs[0].1.contains(&"-Command".to_string()));
        let script = runs[0].1.last().unwrap();
        assert!(script.contains("GetCursorPos"));
        assert!(script.contains("SetCursorPos($pos.x + 1, $pos.y + 1)"));
        assert!(script.contains("SetCursorPos($pos.x, $pos.y)"));
    }

    #[test]
    fn test_unsupported_never_runs_anything() {
        let strategy = Strategy::new(
            Platform::from_os("linux"),
            FakeLauncher::new(Some("/usr/bin/cliclick"), Some(0)),
        );

        let outcome = strategy.simulate();

        assert!(outcome.route.is_none());
        assert!(matches!(
            outcome.result,
            Err(NudgeError::Unsupported { ref os }) if os == "linux"
        ));
        assert!(strategy.launcher.runs.borrow().is_empty());
        assert_eq!(strategy.hint(), None);
    }

    #[test]
    fn test_exit_failure_carries_stderr() {
        let mut launcher = FakeLauncher::new(None, Some(1));
        launcher.stderr = "execution error: not allowed assistive access\n";
        let strategy = Strategy::new(Platform::MacOs, launcher);

        let outcome = strategy.simulate();

        let err = outcome.result.unwrap_err();
        assert!(matches!(err, NudgeError::Exit { program: "osascript", .. }));
        let message = err.to_string();
        assert!(message.starts_with("osascript failed ("));
        assert!(message.ends_with("): execution error: not allowed assistive access"));
    }

    #[test]
    fn test_launch_failure() {
        let strategy = Strategy::new(Platform::Windows, FakeLauncher::new(None, None));

        let outcome = strategy.simulate();

        assert_eq!(outcome.route, Some(Route::Native));
        let err = outcome.result.unwrap_err();
        assert!(matches!(err, NudgeError::Launch { program: "powershell", .. }));
        assert_eq!(err.to_string(), "could not launch powershell: program not found");
    }

    #[test]
    fn test_repeated_failures_are_independent() {
        let strategy = Strategy::new(
            Platform::MacOs,
            FakeLauncher::new(Some("/usr/local/bin/cliclick"), Some(1)),
        );

        let outcomes: Vec<Outcome> = (0..5).map(|_| strategy.simulate()).collect();

        assert!(outcomes.iter().all(|o| !o.is_success()));
        assert!(outcomes.iter().all(|o| o.route == Some(Route::Helper)));
        assert_eq!(strategy.launcher.finds.get(), 5);
        assert_eq!(strategy.launcher.runs.borrow().len(), 5);
    }

    #[test]
    fn test_helper_rechecked_every_tick() {
        let mut strategy = Strategy::new(Platform::MacOs, FakeLauncher::new(None, Some(0)));
        assert_eq!(strategy.simulate().route, Some(Route::Fallback));

        strategy.launcher.helper = Some(PathBuf::from("/usr/local/bin/cliclick"));
        assert_eq!(strategy.simulate().route, Some(Route::Helper));

        strategy.launcher.helper = None;
        assert_eq!(strategy.simulate().route, Some(Route::Fallback));
    }
}
