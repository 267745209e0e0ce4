#![deny(unsafe_code)]

#[cfg(unix)]
mod escalate;
#[cfg(unix)]
mod event;
mod interface;
#[cfg(unix)]
mod supervise;

use std::io;

pub use interface::RunOptions;

#[cfg(unix)]
use crate::{
    log::{dev_info, dev_warn},
    system::{process_id, signal::SignalSet, ProcessId},
};

#[cfg(unix)]
use self::{
    event::{EventRegistry, StopReason},
    supervise::SuperviseClosure,
};

/// Exit reason for the supervised script command.
#[derive(Debug)]
pub enum ExitReason {
    Code(i32),
    Signal(i32),
}

/// Run a lifecycle script command, relaying the signals the supervisor receives until the
/// command terminates.
///
/// Returns the [`ExitReason`] of the command and a function that restores the original
/// dispositions of the handled signals once it is called.
#[cfg(unix)]
pub fn run_script(options: &RunOptions) -> io::Result<(ExitReason, impl FnOnce())> {
    let mut command = options.build_command();

    // Block all the signals until the handlers are set up so that a fast-exiting command cannot
    // lose its SIGCHLD.
    let original_set = match SignalSet::full().and_then(|set| set.block()) {
        Ok(original_set) => Some(original_set),
        Err(err) => {
            dev_warn!("cannot block signals: {err}");
            None
        }
    };

    let command_pid = match command.spawn() {
        Ok(child) => ProcessId::new(child.id() as libc::pid_t),
        Err(err) => {
            if let Some(set) = original_set {
                if let Err(err) = set.set_mask() {
                    dev_warn!("cannot restore signal mask: {err}");
                }
            }
            return Err(err);
        }
    };

    dev_info!("executed command with pid {command_pid}");

    let mut registry = EventRegistry::new();

    let closure = SuperviseClosure::new(command_pid, process_id(), &mut registry);

    // Restore the signal mask now that the handlers have been set up. Any signal that arrived
    // in the meantime is delivered here and lands in the stream.
    if let Some(set) = original_set {
        if let Err(err) = set.set_mask() {
            dev_warn!("cannot restore signal mask: {err}");
        }
    }

    let mut closure = closure?;

    let exit_reason = match registry.event_loop(&mut closure) {
        StopReason::Break(err) => return Err(err),
        StopReason::Exit(reason) => reason,
    };

    Ok((exit_reason, move || drop(closure.signal_handlers)))
}

/// Run a lifecycle script command synchronously.
///
/// This platform has no POSIX-style signal and process-group model, so the whole relay and
/// escalation subsystem is a documented no-op: the supervisor waits for the command and
/// surfaces its exit code.
#[cfg(not(unix))]
pub fn run_script(options: &RunOptions) -> io::Result<(ExitReason, impl FnOnce())> {
    let status = options.build_command().spawn()?.wait()?;

    Ok((ExitReason::Code(status.code().unwrap_or(1)), || ()))
}
