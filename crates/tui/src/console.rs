//! Crossterm-backed terminal used by the binary.

use std::{
    env,
    io::{self, BufRead, IsTerminal, StdinLock, Write},
    process::{self, Command},
    sync::atomic::{AtomicBool, Ordering},
};

use anyhow::{bail, Result};
use crossterm::{
    cursor::MoveTo,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self, Clear, ClearType},
};
use haulage_core::Terminal;
use tracing::{debug, warn};

const INPUT_MARKER: &str = "\n\n> ";

/// How the screen is cleared on the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenPlatform {
    /// ANSI capable terminals.
    Unix,
    /// Windows console, cleared through `cls`.
    Windows,
}

impl ScreenPlatform {
    /// Resolve the platform of the running process.
    pub fn detect() -> Result<Self> {
        Self::from_os(env::consts::OS)
    }

    fn from_os(os: &str) -> Result<Self> {
        match os {
            "linux" | "macos" | "freebsd" | "netbsd" | "openbsd" | "dragonfly" | "illumos"
            | "solaris" => Ok(Self::Unix),
            "windows" => Ok(Self::Windows),
            other => bail!("unsupported platform {other}: cannot clear the terminal screen"),
        }
    }
}

/// Terminal reading from stdin and writing to stdout.
pub struct Console {
    stdin: StdinLock<'static>,
    platform: ScreenPlatform,
}

impl Console {
    pub fn new(platform: ScreenPlatform) -> Self {
        Self {
            stdin: io::stdin().lock(),
            platform,
        }
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        if self.stdin.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "standard input closed",
            ));
        }
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }
}

impl Terminal for Console {
    fn prompt_line(&mut self, prompt: &str) -> io::Result<String> {
        write_prompt(prompt)?;
        self.read_line()
    }

    fn prompt_sensitive(&mut self, prompt: &str) -> io::Result<String> {
        write_prompt(prompt)?;
        // Nothing is echoed when input is piped, so a plain read is enough.
        if !io::stdin().is_terminal() {
            return self.read_line();
        }
        let secret = {
            let _scope = MaskedInputScope::enter()?;
            let _raw = RawModeGuard::enable()?;
            read_hidden()?
        };
        println!();
        Ok(secret)
    }

    fn write_line(&mut self, text: &str) {
        println!("{text}");
    }

    fn clear_screen(&mut self) {
        let result = match self.platform {
            ScreenPlatform::Unix => {
                let mut stdout = io::stdout();
                execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))
            }
            ScreenPlatform::Windows => Command::new("cmd")
                .args(["/c", "cls"])
                .status()
                .map(|_| ()),
        };
        if let Err(err) = result {
            debug!(%err, "failed to clear screen");
        }
    }
}

fn write_prompt(prompt: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "{prompt}{INPUT_MARKER}")?;
    stdout.flush()
}

/// Keeps the terminal in raw mode (no echo) until dropped.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(err) = terminal::disable_raw_mode() {
            warn!(%err, "failed to restore terminal mode");
        }
    }
}

/// Set while a masked prompt owns the terminal.
static MASKED_INPUT_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Routes SIGINT and SIGTERM to a terminal restore while alive.
///
/// Must be entered before raw mode is enabled and dropped after it is
/// disabled, so no signal can land while echo is off and unhandled.
struct MaskedInputScope;

impl MaskedInputScope {
    fn enter() -> io::Result<Self> {
        signals::install_watcher()?;
        MASKED_INPUT_ACTIVE.store(true, Ordering::SeqCst);
        Ok(Self)
    }
}

impl Drop for MaskedInputScope {
    fn drop(&mut self) {
        MASKED_INPUT_ACTIVE.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignalResponse {
    RestoreAndExit,
    Default,
}

fn signal_response() -> SignalResponse {
    if MASKED_INPUT_ACTIVE.load(Ordering::SeqCst) {
        SignalResponse::RestoreAndExit
    } else {
        SignalResponse::Default
    }
}

#[cfg(unix)]
mod signals {
    use std::{
        io,
        sync::atomic::{AtomicBool, Ordering},
        thread,
    };

    use signal_hook::{
        consts::{SIGINT, SIGTERM},
        iterator::Signals,
        low_level,
    };
    use tracing::{debug, warn};

    use super::{interrupt, signal_response, SignalResponse};

    static WATCHER_STARTED: AtomicBool = AtomicBool::new(false);

    /// Start the signal thread once. Outside masked prompts it re-raises
    /// signals with their default action.
    pub(super) fn install_watcher() -> io::Result<()> {
        if WATCHER_STARTED.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let started = Signals::new([SIGINT, SIGTERM]).and_then(|mut signals| {
            thread::Builder::new()
                .name("signal-watcher".to_string())
                .spawn(move || {
                    for signal in signals.forever() {
                        debug!(signal, "signal received");
                        match signal_response() {
                            SignalResponse::RestoreAndExit => interrupt(),
                            SignalResponse::Default => {
                                if let Err(err) = low_level::emulate_default_handler(signal) {
                                    warn!(%err, signal, "failed to re-raise signal");
                                    std::process::exit(1);
                                }
                            }
                        }
                    }
                })
                .map(drop)
        });
        if started.is_err() {
            WATCHER_STARTED.store(false, Ordering::SeqCst);
        }
        started
    }
}

#[cfg(not(unix))]
mod signals {
    use std::io;

    /// Ctrl+C reaches the raw-mode reader as a key press on this platform.
    pub(super) fn install_watcher() -> io::Result<()> {
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq)]
enum KeyOutcome {
    Continue,
    Submit,
    Interrupt,
    Closed,
}

fn apply_key(secret: &mut String, key: KeyEvent) -> KeyOutcome {
    if key.kind == KeyEventKind::Release {
        return KeyOutcome::Continue;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => KeyOutcome::Submit,
        // A line typed ahead of raw mode keeps its `\n`, which decodes as Ctrl+J.
        KeyCode::Char('j' | 'm') if ctrl => KeyOutcome::Submit,
        KeyCode::Char('c') if ctrl => KeyOutcome::Interrupt,
        KeyCode::Char('d') if ctrl && secret.is_empty() => KeyOutcome::Closed,
        KeyCode::Backspace => {
            secret.pop();
            KeyOutcome::Continue
        }
        KeyCode::Char(ch) if !ctrl => {
            secret.push(ch);
            KeyOutcome::Continue
        }
        _ => KeyOutcome::Continue,
    }
}

fn read_hidden() -> io::Result<String> {
    let mut secret = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        match apply_key(&mut secret, key) {
            KeyOutcome::Continue => {}
            KeyOutcome::Submit => return Ok(secret),
            KeyOutcome::Interrupt => interrupt(),
            KeyOutcome::Closed => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "input closed during password entry",
                ))
            }
        }
    }
}

/// Restore echo and quit. Reached from a Ctrl+C key press in raw mode or
/// from a signal delivered while a masked prompt is open.
fn interrupt() -> ! {
    if let Err(err) = terminal::disable_raw_mode() {
        warn!(%err, "failed to restore terminal mode on interrupt");
    }
    println!();
    warn!("interrupted during password entry");
    process::exit(1);
}
