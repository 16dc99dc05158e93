//! FFmpeg binary discovery and process helpers.

use std::path::PathBuf;
use std::process::Command;

/// Create a Command configured to hide the console window on Windows.
/// This prevents FFmpeg from popping up a black console window during execution.
pub fn create_hidden_command(program: &PathBuf) -> Command {
    let mut cmd = Command::new(program);

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NO_WINDOW: u32 = 0x08000000;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }

    cmd
}

/// Find ffmpeg binary using ffmpeg-sidecar's API with validation.
/// Tests if the binary works, falls back to system PATH if not.
pub fn find_ffmpeg() -> Option<PathBuf> {
    let sidecar_path = ffmpeg_sidecar::paths::ffmpeg_path();

    if test_binary(&sidecar_path) {
        log::debug!("[FFMPEG] Using sidecar path: {}", sidecar_path.display());
        return Some(sidecar_path);
    }

    log::debug!(
        "[FFMPEG] Sidecar path failed ({}), trying system PATH",
        sidecar_path.display()
    );

    let binary_name = if cfg!(windows) {
        "ffmpeg.exe"
    } else {
        "ffmpeg"
    };

    if let Some(path) = find_in_system_path(binary_name) {
        if test_binary(&path) {
            log::debug!("[FFMPEG] Using system PATH: {}", path.display());
            return Some(path);
        }
    }

    log::warn!("[FFMPEG] No working ffmpeg found");
    None
}

/// Find ffprobe binary using ffmpeg-sidecar's API with validation.
/// Tests if the binary works, falls back to system PATH if not.
pub fn find_ffprobe() -> Option<PathBuf> {
    let sidecar_path = ffmpeg_sidecar::ffprobe::ffprobe_path();

    if test_binary(&sidecar_path) {
        log::debug!("[FFPROBE] Using sidecar path: {}", sidecar_path.display());
        return Some(sidecar_path);
    }

    let binary_name = if cfg!(windows) {
        "ffprobe.exe"
    } else {
        "ffprobe"
    };

    if let Some(path) = find_in_system_path(binary_name) {
        if test_binary(&path) {
            log::debug!("[FFPROBE] Using system PATH: {}", path.display());
            return Some(path);
        }
    }

    log::warn!("[FFPROBE] No working ffprobe found");
    None
}

/// Test if a binary works by running -version.
fn test_binary(path: &PathBuf) -> bool {
    Command::new(path)
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Find an executable in system PATH.
fn find_in_system_path(name: &str) -> Option<PathBuf> {
    let cmd = if cfg!(windows) { "where" } else { "which" };

    Command::new(cmd).arg(name).output().ok().and_then(|output| {
        if output.status.success() {
            let path_str = String::from_utf8_lossy(&output.stdout);
            let first_line = path_str.lines().next()?.trim();
            if !first_line.is_empty() {
                return Some(PathBuf::from(first_line));
            }
        }
        None
    })
}
