//! Copying the finished script to the system clipboard.
//!
//! Every copy opens a fresh clipboard holder, writes once and drops it before
//! returning, whether the write worked or not. The outcome is shown through a
//! [`CopyStatus`] that clears itself once its display window has passed.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use arboard::Clipboard;

use crate::core::runtime::{self, ClipboardBackend, DisplaySession};
use crate::settings::ClipboardSettings;

const DEFAULT_STATUS_CLEAR: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    Failed,
}

impl CopyOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            CopyOutcome::Copied => "Copied!",
            CopyOutcome::Failed => "Failed!",
        }
    }
}

/// Short-lived handle that receives one piece of text.
pub trait ClipboardHolder {
    fn set_text(&mut self, text: &str) -> Result<(), String>;
}

pub trait ClipboardProvider {
    fn open(&self) -> Result<Box<dyn ClipboardHolder>, String>;
}

pub struct SystemClipboard {
    session: DisplaySession,
    backend: ClipboardBackend,
}

impl SystemClipboard {
    pub fn detect(settings: &ClipboardSettings) -> Self {
        let session = runtime::current_session();
        let backend = runtime::resolve_clipboard_backend(
            session,
            settings.prefer_wl_copy,
            runtime::find_in_path("wl-copy"),
        );
        log::debug!("clipboard session={} backend={backend:?}", session.name());
        Self { session, backend }
    }
}

impl ClipboardProvider for SystemClipboard {
    fn open(&self) -> Result<Box<dyn ClipboardHolder>, String> {
        if let ClipboardBackend::WlCopy(program) = &self.backend {
            return Ok(Box::new(WlCopyHolder {
                program: program.clone(),
            }));
        }
        match Clipboard::new() {
            Ok(clipboard) => Ok(Box::new(ArboardHolder(clipboard))),
            Err(_) if self.session == DisplaySession::Headless => {
                Err("No display session detected".to_string())
            }
            Err(err) => Err(err.to_string()),
        }
    }
}

struct ArboardHolder(Clipboard);

impl ClipboardHolder for ArboardHolder {
    fn set_text(&mut self, text: &str) -> Result<(), String> {
        self.0
            .set_text(text.to_string())
            .map_err(|err| err.to_string())
    }
}

struct WlCopyHolder {
    program: PathBuf,
}

impl ClipboardHolder for WlCopyHolder {
    fn set_text(&mut self, text: &str) -> Result<(), String> {
        let Err(wl_err) = pipe_to(&self.program, text) else {
            return Ok(());
        };
        // If both fail, report the wl-copy error.
        Clipboard::new()
            .and_then(|mut clipboard| clipboard.set_text(text.to_string()))
            .map_err(|_| wl_err)
    }
}

fn pipe_to(program: &Path, text: &str) -> Result<(), String> {
    let mut child = Command::new(program)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .spawn()
        .map_err(|err| format!("{}: {err}", program.display()))?;

    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(text.as_bytes()).map_err(|err| err.to_string()),
        None => Err(format!("{} has no stdin", program.display())),
    };
    // The child is always reaped, even when the write failed.
    if let Err(err) = written {
        let _ = child.kill();
        let _ = child.wait();
        return Err(err);
    }

    let status = child.wait().map_err(|err| err.to_string())?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("{} exited with {status}", program.display()))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CopyStatus {
    shown: Option<(CopyOutcome, Instant)>,
    clear_after: Duration,
}

impl CopyStatus {
    pub fn new(clear_after: Duration) -> Self {
        Self {
            shown: None,
            clear_after,
        }
    }

    pub fn record(&mut self, outcome: CopyOutcome, now: Instant) {
        self.shown = Some((outcome, now));
    }

    pub fn current(&self, now: Instant) -> Option<CopyOutcome> {
        let (outcome, at) = self.shown?;
        if now.saturating_duration_since(at) >= self.clear_after {
            return None;
        }
        Some(outcome)
    }
}

pub struct ClipboardExporter {
    provider: Box<dyn ClipboardProvider>,
    status: CopyStatus,
}

impl ClipboardExporter {
    pub fn new(provider: Box<dyn ClipboardProvider>, clear_after: Duration) -> Self {
        let clear_after = if clear_after.is_zero() {
            DEFAULT_STATUS_CLEAR
        } else {
            clear_after
        };
        Self {
            provider,
            status: CopyStatus::new(clear_after),
        }
    }

    pub fn system(settings: &ClipboardSettings) -> Self {
        Self::new(
            Box::new(SystemClipboard::detect(settings)),
            Duration::from_millis(settings.status_clear_ms),
        )
    }

    pub fn copy(&mut self, text: &str) -> CopyOutcome {
        self.copy_at(text, Instant::now())
    }

    pub fn copy_at(&mut self, text: &str, now: Instant) -> CopyOutcome {
        let result = match self.provider.open() {
            Ok(mut holder) => {
                let result = holder.set_text(text);
                drop(holder);
                result
            }
            Err(err) => Err(err),
        };

        let outcome = match result {
            Ok(()) => {
                log::debug!("copied {} bytes to clipboard", text.len());
                CopyOutcome::Copied
            }
            Err(err) => {
                log::warn!("clipboard copy failed (len={}): {err}", text.len());
                CopyOutcome::Failed
            }
        };
        self.status.record(outcome, now);
        outcome
    }

    pub fn status(&self) -> Option<CopyOutcome> {
        self.status.current(Instant::now())
    }

    pub fn status_at(&self, now: Instant) -> Option<CopyOutcome> {
        self.status.current(now)
    }
}
