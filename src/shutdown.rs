use anyhow::{Context, Result};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::io::{self, BufRead, IsTerminal};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info};

/// Exact console lines that stop the tool.
pub const QUIT_COMMANDS: [&str; 3] = ["q", "quit", "exit"];

/// Why the activity loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// SIGINT or SIGTERM (Ctrl+C / Ctrl+Break on Windows).
    Signal,
    /// A quit command typed on the console.
    Keyboard,
    /// Every shutdown source went away.
    Disconnected,
}

impl Shutdown {
    pub fn message(&self) -> &'static str {
        match self {
            Shutdown::Signal => "Shutdown signal received. Stopping keep-alive tool...",
            Shutdown::Keyboard => "Keyboard quit received. Stopping keep-alive tool...",
            Shutdown::Disconnected => "Shutdown sources closed. Stopping keep-alive tool...",
        }
    }
}

/// Single-slot channel shared by every shutdown source.
pub fn channel() -> (Sender<Shutdown>, Receiver<Shutdown>) {
    bounded(1)
}

/// Request shutdown. Later requests are dropped once the slot is taken.
pub fn request(tx: &Sender<Shutdown>, reason: Shutdown) {
    match tx.try_send(reason) {
        Ok(()) => debug!("Shutdown requested: {:?}", reason),
        Err(TrySendError::Full(_)) => debug!("Shutdown already pending, ignoring {:?}", reason),
        Err(TrySendError::Disconnected(_)) => {}
    }
}

/// Route SIGINT/SIGTERM into the shutdown channel.
pub fn install_signal_handler(tx: Sender<Shutdown>) -> Result<()> {
    ctrlc::set_handler(move || request(&tx, Shutdown::Signal))
        .context("Failed to install signal handler")
}

pub fn is_quit_command(line: &str) -> bool {
    QUIT_COMMANDS.contains(&line)
}

/// Pause after an empty or failed read so a dead stdin does not spin.
const READ_BACKOFF: Duration = Duration::from_millis(100);

/// What an empty read means for the quit watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOfInput {
    /// A terminal keeps delivering lines after Ctrl+D; keep reading.
    Retry,
    /// Piped or redirected input is finished for good.
    Stop,
}

impl EndOfInput {
    pub fn for_stdin() -> Self {
        if io::stdin().is_terminal() {
            EndOfInput::Retry
        } else {
            EndOfInput::Stop
        }
    }
}

/// Read console lines until a quit command arrives, then request shutdown once.
///
/// Malformed lines, empty reads and read errors are transient. Only an empty
/// read under [`EndOfInput::Stop`] ends the watcher without a request.
pub fn watch_for_quit<R: BufRead>(mut input: R, tx: &Sender<Shutdown>, eof: EndOfInput) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match input.read_until(b'\n', &mut buf) {
            Ok(0) if eof == EndOfInput::Stop => {
                debug!("Console input closed, quit commands disabled");
                return;
            }
            Ok(0) => {
                thread::sleep(READ_BACKOFF);
                continue;
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!("Console read failed, retrying: {}", e);
                thread::sleep(READ_BACKOFF);
                continue;
            }
        }

        let Ok(line) = std::str::from_utf8(strip_line_ending(&buf)) else {
            continue;
        };
        if is_quit_command(line) {
            info!("Quit command {:?} received", line);
            request(tx, Shutdown::Keyboard);
            return;
        }
    }
}

/// Run [`watch_for_quit`] over stdin on its own thread.
pub fn spawn_quit_watcher(tx: Sender<Shutdown>) -> Result<JoinHandle<()>> {
    let eof = EndOfInput::for_stdin();
    thread::Builder::new()
        .name("quit-watcher".to_string())
        .spawn(move || watch_for_quit(io::stdin().lock(), &tx, eof))
        .context("Failed to spawn console reader")
}

fn strip_line_ending(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}
