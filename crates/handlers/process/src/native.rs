//! Linux process control through `/proc` and POSIX signals.

use crate::backend::{ProcessBackend, friendly_name};
use crate::error::{ProcessError, ProcessErrorExt};
use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use tracing::{debug, trace};

/// Longest process name the kernel keeps in `/proc/<pid>/stat`.
const COMM_LEN: usize = 15;

/// One row of the process table.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ProcEntry {
    pid: u32,
    comm: String,
    state: char,
    ppid: u32,
}

/// Parses `/proc/<pid>/stat`: `pid (comm) state ppid ...`.
///
/// `comm` may itself contain spaces and parentheses, so it spans from the first `(` to
/// the last `)`.
fn parse_stat(stat: &str) -> Option<ProcEntry> {
    let open = stat.find('(')?;
    let close = stat.rfind(')')?;
    let pid = stat[..open].trim().parse().ok()?;
    let comm = stat.get(open + 1..close)?.to_owned();
    let mut rest = stat[close + 1..].split_whitespace();
    let state = rest.next()?.chars().next()?;
    let ppid = rest.next()?.parse().ok()?;
    Some(ProcEntry { pid, comm, state, ppid })
}

fn read_entry(pid: u32) -> Option<ProcEntry> {
    fs::read_to_string(format!("/proc/{pid}/stat")).ok().as_deref().and_then(parse_stat)
}

fn to_pid(pid: u32) -> Result<Pid, ProcessError> {
    i32::try_from(pid).map(Pid::from_raw).map_err(|_| ProcessError::InvalidPid {
        message: pid.to_string().into(),
        context: Some("Process id out of range".into()),
    })
}

/// Sends `signal`, treating an already-gone process as success.
fn signal(pid: u32, signal: Signal) -> Result<(), ProcessError> {
    match kill(to_pid(pid)?, signal) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(source) => Err(source).context(format!("{signal} to {pid}")),
    }
}

/// [`ProcessBackend`] for Linux.
///
/// Matches processes by executable path or by [`friendly_name`], closes them with
/// `SIGTERM` and force-kills with `SIGKILL`. Children spawned by this backend are
/// reaped so they do not linger as zombies.
#[derive(Debug, Default)]
pub struct LinuxProcesses {
    spawned: Mutex<Vec<Child>>,
}

impl LinuxProcesses {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn scan() -> Result<Vec<ProcEntry>, ProcessError> {
        let entries = fs::read_dir("/proc").context("Listing /proc")?;
        Ok(entries
            .flatten()
            .filter_map(|entry| entry.file_name().to_str().and_then(|name| name.parse().ok()))
            .filter_map(read_entry)
            .filter(|entry| entry.state != 'Z')
            .collect())
    }

    fn reap(&self) {
        self.spawned.lock().retain_mut(|child| !matches!(child.try_wait(), Ok(Some(_)) | Err(_)));
    }

    fn matches(entry: &ProcEntry, path: &str, name: &str) -> bool {
        let exe = fs::read_link(format!("/proc/{}/exe", entry.pid)).ok();
        if exe.as_deref() == Some(Path::new(path)) {
            return true;
        }
        if let Some(exe_name) = exe.as_deref().and_then(Path::to_str).map(friendly_name)
            && exe_name == name
        {
            return true;
        }
        let truncated = name.get(..COMM_LEN).unwrap_or(name);
        entry.comm == truncated
    }

    /// Descendants of `root`, children before grandchildren.
    fn descendants(root: u32, table: &[ProcEntry]) -> Vec<u32> {
        let mut children: HashMap<u32, Vec<u32>> = HashMap::new();
        for entry in table {
            children.entry(entry.ppid).or_default().push(entry.pid);
        }

        let mut found = Vec::new();
        let mut frontier = vec![root];
        while let Some(pid) = frontier.pop() {
            for &child in children.get(&pid).map(Vec::as_slice).unwrap_or_default() {
                if child != root && !found.contains(&child) {
                    found.push(child);
                    frontier.push(child);
                }
            }
        }
        found
    }
}

impl ProcessBackend for LinuxProcesses {
    fn find(&self, path: &str) -> Result<Vec<u32>, ProcessError> {
        self.reap();
        let name = friendly_name(path);
        let own = std::process::id();
        let pids: Vec<u32> = Self::scan()?
            .iter()
            .filter(|entry| entry.pid != own && Self::matches(entry, path, name))
            .map(|entry| entry.pid)
            .collect();
        trace!(path, ?pids, "Matched processes");
        Ok(pids)
    }

    fn spawn(&self, path: &str) -> Result<u32, ProcessError> {
        let child = Command::new(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .context(format!("Starting {path}"))?;
        let pid = child.id();
        self.spawned.lock().push(child);
        Ok(pid)
    }

    fn request_close(&self, pid: u32) -> Result<(), ProcessError> {
        debug!(pid, "Sending SIGTERM");
        signal(pid, Signal::SIGTERM)
    }

    fn is_alive(&self, pid: u32) -> bool {
        self.reap();
        read_entry(pid).is_some_and(|entry| entry.state != 'Z')
    }

    fn kill_tree(&self, pid: u32) -> Result<(), ProcessError> {
        let table = Self::scan()?;
        let descendants = Self::descendants(pid, &table);
        let mut result = Ok(());
        for &child in descendants.iter().rev() {
            debug!(pid = child, parent = pid, "Sending SIGKILL to descendant");
            result = result.and(signal(child, Signal::SIGKILL));
        }
        debug!(pid, "Sending SIGKILL");
        result = result.and(signal(pid, Signal::SIGKILL));
        self.reap();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stat_with_awkward_comm() {
        let entry = parse_stat("4242 (my (odd) tool) S 1 4242 4242 0 -1").unwrap();
        let expected = ProcEntry { pid: 4242, comm: "my (odd) tool".into(), state: 'S', ppid: 1 };
        assert_eq!(entry, expected);
        assert!(parse_stat("garbage").is_none());
    }

    #[test]
    fn descendants_are_listed_parents_first() {
        let table = [
            ProcEntry { pid: 10, comm: "root".into(), state: 'S', ppid: 1 },
            ProcEntry { pid: 11, comm: "child".into(), state: 'S', ppid: 10 },
            ProcEntry { pid: 12, comm: "grandchild".into(), state: 'S', ppid: 11 },
            ProcEntry { pid: 20, comm: "other".into(), state: 'S', ppid: 1 },
        ];
        assert_eq!(LinuxProcesses::descendants(10, &table), vec![11, 12]);
        assert!(LinuxProcesses::descendants(20, &table).is_empty());
    }

    #[test]
    fn out_of_range_pid_is_rejected() {
        let backend = LinuxProcesses::new();
        assert!(!backend.is_alive(u32::MAX));
        assert!(matches!(backend.request_close(u32::MAX), Err(ProcessError::InvalidPid { .. })));
    }

    #[test]
    fn own_process_is_never_matched() {
        let backend = LinuxProcesses::new();
        let exe = std::env::current_exe().unwrap();
        let pids = backend.find(exe.to_str().unwrap()).unwrap();
        assert!(!pids.contains(&std::process::id()));
    }
}
