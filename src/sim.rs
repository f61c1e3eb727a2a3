//! ## Simulated Provider
//!
//! An in-memory [`SessionProvider`] for tests and offline development.
//! Replies are scripted per command, every write is journaled, and each
//! provider operation can be told to fail so the session state machine can
//! be exercised without hardware.
//!

use crate::provider::{ProviderHandle, SessionProvider, Status};

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

/// Simulator status codes, ordered like the real provider's: negative is failure.
pub const SIM_OK: Status = 0;
pub const SIM_ERR_IO: Status = -1;
pub const SIM_ERR_TIMEOUT: Status = -2;
pub const SIM_ERR_NOT_FOUND: Status = -3;

#[derive(Debug, Default)]
struct SimState {
    responses: HashMap<String, String>,
    pending: VecDeque<String>,
    writes: Vec<String>,
    read_attempts: usize,
    closes: usize,
    timeout_ms: u32,
    next_handle: u32,
    fail_open: bool,
    fail_close: bool,
    fail_write: bool,
    fail_read: bool,
    fail_clear: bool,
}

/// ### Sim Provider
///
/// Scripted instrument simulator. Cloning shares the underlying state, so a
/// test can hand one clone to the session and keep another to inspect the
/// write journal afterwards.
///
#[derive(Debug, Clone, Default)]
pub struct SimProvider {
    state: Rc<RefCell<SimState>>,
}

impl SimProvider {
    pub fn new() -> SimProvider {
        SimProvider::default()
    }

    /// Script the reply the instrument sends after `command` is written.
    pub fn respond(&self, command: &str, reply: &str) {
        self.state
            .borrow_mut()
            .responses
            .insert(command.to_string(), reply.to_string());
    }

    /// Every command written so far, oldest first.
    pub fn writes(&self) -> Vec<String> {
        self.state.borrow().writes.clone()
    }

    /// Number of read operations attempted, successful or not.
    pub fn read_attempts(&self) -> usize {
        self.state.borrow().read_attempts
    }

    /// Number of close operations attempted.
    pub fn closes(&self) -> usize {
        self.state.borrow().closes
    }

    /// The timeout the session configured at open.
    pub fn configured_timeout_ms(&self) -> u32 {
        self.state.borrow().timeout_ms
    }

    pub fn fail_open(&self, fail: bool) {
        self.state.borrow_mut().fail_open = fail;
    }

    pub fn fail_close(&self, fail: bool) {
        self.state.borrow_mut().fail_close = fail;
    }

    pub fn fail_write(&self, fail: bool) {
        self.state.borrow_mut().fail_write = fail;
    }

    pub fn fail_read(&self, fail: bool) {
        self.state.borrow_mut().fail_read = fail;
    }

    pub fn fail_clear(&self, fail: bool) {
        self.state.borrow_mut().fail_clear = fail;
    }
}

impl SessionProvider for SimProvider {
    fn open(&mut self, _resource: &str, timeout_ms: u32) -> (ProviderHandle, Status) {
        let mut state = self.state.borrow_mut();
        if state.fail_open {
            return (ProviderHandle(0), SIM_ERR_NOT_FOUND);
        }
        state.next_handle += 1;
        state.timeout_ms = timeout_ms;
        (ProviderHandle(state.next_handle), SIM_OK)
    }

    fn close(&mut self, _handle: ProviderHandle) -> Status {
        let mut state = self.state.borrow_mut();
        state.closes += 1;
        if state.fail_close {
            SIM_ERR_IO
        } else {
            SIM_OK
        }
    }

    fn write(&mut self, _handle: ProviderHandle, data: &[u8]) -> (usize, Status) {
        let mut state = self.state.borrow_mut();
        let command = String::from_utf8_lossy(data).to_string();
        state.writes.push(command.clone());
        if state.fail_write {
            return (0, SIM_ERR_IO);
        }
        if let Some(reply) = state.responses.get(command.trim()).cloned() {
            state.pending.push_back(reply);
        }
        (data.len(), SIM_OK)
    }

    fn read(&mut self, _handle: ProviderHandle, max_len: usize) -> (Vec<u8>, Status) {
        let mut state = self.state.borrow_mut();
        state.read_attempts += 1;
        if state.fail_read {
            return (b"<garbage>".to_vec(), SIM_ERR_IO);
        }
        match state.pending.pop_front() {
            Some(reply) => {
                let mut bytes = reply.into_bytes();
                bytes.truncate(max_len);
                (bytes, SIM_OK)
            }
            None => (Vec::new(), SIM_ERR_TIMEOUT),
        }
    }

    fn clear(&mut self, _handle: ProviderHandle) -> Status {
        let mut state = self.state.borrow_mut();
        state.pending.clear();
        if state.fail_clear {
            SIM_ERR_IO
        } else {
            SIM_OK
        }
    }

    fn describe_status(&self, status: Status) -> String {
        match status {
            SIM_OK => "operation completed successfully".to_string(),
            SIM_ERR_IO => "simulated i/o failure".to_string(),
            SIM_ERR_TIMEOUT => "operation timed out before any data arrived".to_string(),
            SIM_ERR_NOT_FOUND => "no instrument at the given resource".to_string(),
            other => format!("unknown status {other}"),
        }
    }
}
