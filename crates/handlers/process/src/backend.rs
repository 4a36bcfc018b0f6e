use crate::error::ProcessError;
use std::fmt::Debug;

/// Operating-system process control used by the process handler.
///
/// Process ids are plain numbers; backends decide how a path maps to running processes.
pub trait ProcessBackend: Debug + Send + Sync {
    /// Ids of running processes started from `path`.
    ///
    /// # Errors
    /// Returns an error if the process table cannot be inspected.
    fn find(&self, path: &str) -> Result<Vec<u32>, ProcessError>;

    /// Starts `path` without waiting for it and returns the new process id.
    ///
    /// # Errors
    /// Returns an error if the executable cannot be started.
    fn spawn(&self, path: &str) -> Result<u32, ProcessError>;

    /// Asks the process to exit on its own (close its windows, handle `SIGTERM`).
    ///
    /// # Errors
    /// Returns an error if the request cannot be delivered.
    fn request_close(&self, pid: u32) -> Result<(), ProcessError>;

    fn is_alive(&self, pid: u32) -> bool;

    /// Terminates the process and every descendant, without giving them a chance to
    /// clean up. A process that is already gone is not an error.
    ///
    /// # Errors
    /// Returns an error if a termination signal cannot be delivered.
    fn kill_tree(&self, pid: u32) -> Result<(), ProcessError>;
}

/// Short process name for an executable path: the file name without directories or
/// an `.exe` extension. Both `/` and `\` separate directories.
///
/// ```rust
/// assert_eq!(knob_process::friendly_name("C:\\app\\tool.exe"), "tool");
/// assert_eq!(knob_process::friendly_name("/usr/bin/top"), "top");
/// ```
#[must_use]
pub fn friendly_name(path: &str) -> &str {
    let file = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match file.len().checked_sub(4) {
        Some(stem) if file.is_char_boundary(stem) && file[stem..].eq_ignore_ascii_case(".exe") => {
            &file[..stem]
        },
        _ => file,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn friendly_name_strips_directories_and_extension() {
        assert_eq!(friendly_name("C:\\app\\tool.exe"), "tool");
        assert_eq!(friendly_name("C:/app/TOOL.EXE"), "TOOL");
        assert_eq!(friendly_name("tool"), "tool");
        assert_eq!(friendly_name("/opt/app/tool.sh"), "tool.sh");
        assert_eq!(friendly_name(".exe"), "");
    }
}
