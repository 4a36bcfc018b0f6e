#![allow(dead_code)]

use knob_process::{ProcessBackend, ProcessError, friendly_name};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};

pub const TOOL: &str = "C:\\app\\tool.exe";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Spawned(u32),
    CloseRequested(u32),
    Killed(u32),
}

#[derive(Debug, Clone)]
struct FakeProcess {
    path: String,
    alive: bool,
    /// Ignores close requests.
    stubborn: bool,
    parent: Option<u32>,
}

#[derive(Debug, Default)]
struct Table {
    next_pid: u32,
    processes: BTreeMap<u32, FakeProcess>,
    events: Vec<Event>,
    stubborn_next: bool,
    unkillable: BTreeSet<u32>,
}

/// In-memory process table matching by friendly name, like a desktop task list.
#[derive(Debug, Default)]
pub struct FakeProcesses {
    table: Mutex<Table>,
}

impl FakeProcesses {
    /// The next spawned process ignores close requests.
    pub fn stubborn_next(&self) {
        self.table.lock().stubborn_next = true;
    }

    /// Killing the tree of `pid` fails and leaves it running.
    pub fn fail_kill(&self, pid: u32) {
        self.table.lock().unkillable.insert(pid);
    }

    /// Adds a child of `parent` that only dies with its tree.
    pub fn spawn_child(&self, parent: u32, path: &str) -> u32 {
        let mut table = self.table.lock();
        table.next_pid += 1;
        let pid = 1000 + table.next_pid;
        let child =
            FakeProcess { path: path.to_owned(), alive: true, stubborn: true, parent: Some(parent) };
        table.processes.insert(pid, child);
        pid
    }

    pub fn events(&self) -> Vec<Event> {
        self.table.lock().events.clone()
    }

    pub fn alive(&self, pid: u32) -> bool {
        self.table.lock().processes.get(&pid).is_some_and(|p| p.alive)
    }
}

impl ProcessBackend for FakeProcesses {
    fn find(&self, path: &str) -> Result<Vec<u32>, ProcessError> {
        let name = friendly_name(path);
        let table = self.table.lock();
        Ok(table
            .processes
            .iter()
            .filter(|(_, p)| p.alive && friendly_name(&p.path).eq_ignore_ascii_case(name))
            .map(|(&pid, _)| pid)
            .collect())
    }

    fn spawn(&self, path: &str) -> Result<u32, ProcessError> {
        let mut table = self.table.lock();
        table.next_pid += 1;
        let pid = 1000 + table.next_pid;
        let stubborn = std::mem::take(&mut table.stubborn_next);
        table
            .processes
            .insert(pid, FakeProcess { path: path.to_owned(), alive: true, stubborn, parent: None });
        table.events.push(Event::Spawned(pid));
        Ok(pid)
    }

    fn request_close(&self, pid: u32) -> Result<(), ProcessError> {
        let mut table = self.table.lock();
        table.events.push(Event::CloseRequested(pid));
        if let Some(process) = table.processes.get_mut(&pid)
            && !process.stubborn
        {
            process.alive = false;
        }
        Ok(())
    }

    fn is_alive(&self, pid: u32) -> bool {
        self.alive(pid)
    }

    fn kill_tree(&self, pid: u32) -> Result<(), ProcessError> {
        let mut table = self.table.lock();
        if table.unkillable.contains(&pid) {
            return Err(ProcessError::InvalidPid {
                message: pid.to_string().into(),
                context: Some("Access denied".into()),
            });
        }
        let mut doomed = vec![pid];
        let mut index = 0;
        while let Some(&current) = doomed.get(index) {
            let children: Vec<u32> = table
                .processes
                .iter()
                .filter(|(_, p)| p.parent == Some(current))
                .map(|(&child, _)| child)
                .collect();
            doomed.extend(children);
            index += 1;
        }
        for victim in doomed {
            if let Some(process) = table.processes.get_mut(&victim) {
                process.alive = false;
            }
            table.events.push(Event::Killed(victim));
        }
        Ok(())
    }
}
