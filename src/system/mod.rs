use std::{fmt, io};

use crate::cutils::cerr;

use self::signal::SignalNumber;

pub(crate) mod poll;

pub(crate) mod signal;

pub(crate) mod wait;

/// Identifier of an operating system process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(pub(crate) libc::pid_t);

impl ProcessId {
    pub fn new(id: libc::pid_t) -> Self {
        Self(id)
    }

    pub fn get(&self) -> libc::pid_t {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The process ID of the calling process.
pub(crate) fn process_id() -> ProcessId {
    ProcessId::new(std::process::id() as libc::pid_t)
}

/// Send a signal to a process with the specified ID.
pub(crate) fn kill(pid: ProcessId, signal: SignalNumber) -> io::Result<()> {
    // SAFETY: This function cannot cause UB even if `pid` is not a valid process ID or if
    // `signal` is not a valid signal code.
    cerr(unsafe { libc::kill(pid.get(), signal) }).map(|_| ())
}

/// Get the process group ID of a process with the specified ID.
pub(crate) fn getpgid(pid: ProcessId) -> io::Result<ProcessId> {
    // SAFETY: This function cannot cause UB even if `pid` is not a valid process ID.
    cerr(unsafe { libc::getpgid(pid.get()) }).map(ProcessId::new)
}

pub(crate) fn make_zeroed_sigaction() -> libc::sigaction {
    // SAFETY: `sigaction` is POD, the all-zeroes pattern is a valid value.
    unsafe { std::mem::MaybeUninit::<libc::sigaction>::zeroed().assume_init() }
}
