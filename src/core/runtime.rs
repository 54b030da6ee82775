use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplaySession {
    Wayland,
    X11,
    /// macOS or Windows, where the clipboard needs no display server.
    Native,
    Headless,
}

impl DisplaySession {
    pub fn name(&self) -> &'static str {
        match self {
            DisplaySession::Wayland => "wayland",
            DisplaySession::X11 => "x11",
            DisplaySession::Native => "native",
            DisplaySession::Headless => "headless",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardBackend {
    /// Pipe the text into this `wl-copy` binary.
    WlCopy(PathBuf),
    Arboard,
}

pub fn current_session() -> DisplaySession {
    if cfg!(any(target_os = "macos", target_os = "windows")) {
        return DisplaySession::Native;
    }
    session_from_env(
        env::var("XDG_SESSION_TYPE").ok().as_deref(),
        env::var_os("WAYLAND_DISPLAY").is_some(),
        env::var_os("DISPLAY").is_some(),
    )
}

fn session_from_env(
    declared: Option<&str>,
    wayland_display: bool,
    x_display: bool,
) -> DisplaySession {
    match declared.map(str::to_ascii_lowercase).as_deref() {
        Some("wayland") => DisplaySession::Wayland,
        Some("x11") => DisplaySession::X11,
        _ if wayland_display => DisplaySession::Wayland,
        _ if x_display => DisplaySession::X11,
        _ => DisplaySession::Headless,
    }
}

/// Wayland sessions prefer `wl-copy` when it is on `PATH`; everything else
/// goes through arboard.
pub fn resolve_clipboard_backend(
    session: DisplaySession,
    prefer_wl_copy: bool,
    wl_copy: Option<PathBuf>,
) -> ClipboardBackend {
    match (session, prefer_wl_copy, wl_copy) {
        (DisplaySession::Wayland, true, Some(path)) => ClipboardBackend::WlCopy(path),
        _ => ClipboardBackend::Arboard,
    }
}

pub fn find_in_path(name: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
