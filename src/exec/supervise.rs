use std::io;

use signal_hook::consts::*;

use super::escalate::{is_termination_signal, Escalation, EscalationPolicy};
use super::event::{EventRegistry, Process};
use super::ExitReason;
use crate::log::{dev_error, dev_info, dev_warn};
use crate::system::{
    getpgid, kill,
    signal::{
        register_handlers, signal_fmt, SignalHandler, SignalHandlerBehavior, SignalNumber,
        SignalStream,
    },
    wait::{Wait, WaitError, WaitOptions},
    ProcessId,
};

/// Event-loop state for one supervised script invocation.
///
/// Owns the only handle to the child and the process-wide signal handlers; both live exactly as
/// long as this invocation.
pub(super) struct SuperviseClosure {
    command_pid: Option<ProcessId>,
    supervisor_pid: ProcessId,
    escalation: EscalationPolicy,
    signal_stream: &'static SignalStream,
    pub(super) signal_handlers: [SignalHandler; SuperviseClosure::SIGNALS.len()],
}

impl SuperviseClosure {
    const SIGNALS: [SignalNumber; 12] = [
        SIGINT, SIGQUIT, SIGTSTP, SIGTERM, SIGHUP, SIGALRM, SIGPIPE, SIGUSR1, SIGUSR2, SIGCHLD,
        SIGCONT, SIGWINCH,
    ];

    pub(super) fn new(
        command_pid: ProcessId,
        supervisor_pid: ProcessId,
        registry: &mut EventRegistry<Self>,
    ) -> io::Result<Self> {
        let signal_stream = SignalStream::init()?;

        registry.register_read_event(signal_stream, SuperviseEvent::Signal);

        let signal_handlers = register_handlers(Self::SIGNALS)?;

        Ok(Self {
            command_pid: Some(command_pid),
            supervisor_pid,
            escalation: EscalationPolicy::new(),
            signal_stream,
            signal_handlers,
        })
    }

    /// Decides if the signal sent by the process with `signaler_pid` PID is self-terminating.
    ///
    /// A signal is self-terminating if `signaler_pid`:
    /// - is the same PID of the command, or
    /// - is in the process group of the command and either the supervisor or the command is the
    ///   leader.
    fn is_self_terminating(&self, signaler_pid: ProcessId) -> bool {
        if signaler_pid.get() != 0 {
            if Some(signaler_pid) == self.command_pid {
                return true;
            }

            if let Ok(signaler_pgrp) = getpgid(signaler_pid) {
                if Some(signaler_pgrp) == self.command_pid || signaler_pgrp == self.supervisor_pid
                {
                    return true;
                }
            }
        }

        false
    }

    /// Suspend the supervisor itself after the command was stopped.
    fn suspend_self(&self, signal: SignalNumber) {
        // SIGTSTP needs its default disposition back for the stop to take effect; the streaming
        // handler would swallow it otherwise. SIGSTOP cannot be caught in the first place.
        let sigtstp_handler = if signal == SIGTSTP {
            SignalHandler::register(signal, SignalHandlerBehavior::Default)
                .map_err(|err| dev_warn!("cannot set handler for {}: {err}", signal_fmt(signal)))
                .ok()
        } else {
            None
        };

        if let Err(err) = kill(self.supervisor_pid, signal) {
            dev_warn!(
                "cannot send {} to {} (supervisor): {err}",
                signal_fmt(signal),
                self.supervisor_pid
            );
        }

        drop(sigtstp_handler);
    }

    fn handle_sigchld(&mut self, command_pid: ProcessId, registry: &mut EventRegistry<Self>) {
        let status = loop {
            match command_pid.wait(WaitOptions::new().untraced().no_hang()) {
                Err(WaitError::Io(err)) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(WaitError::Io(err)) => {
                    dev_warn!("cannot wait for {command_pid} (command): {err}");
                    return;
                }
                // A stray SIGCHLD with nothing to reap yet.
                Err(WaitError::NotReady) => return,
                Ok((_pid, status)) => break status,
            }
        };

        if let Some(exit_code) = status.exit_status() {
            dev_info!("{command_pid} (command) exited with status code {exit_code}");
            registry.set_exit(ExitReason::Code(exit_code));
            self.command_pid = None;
        } else if let Some(signal) = status.stop_signal() {
            dev_info!(
                "{command_pid} (command) was stopped by {}",
                signal_fmt(signal)
            );
            self.suspend_self(signal);
        } else if let Some(signal) = status.term_signal() {
            dev_info!(
                "{command_pid} (command) was terminated by {}",
                signal_fmt(signal)
            );
            registry.set_exit(ExitReason::Signal(signal));
            self.command_pid = None;
        } else if status.did_continue() {
            dev_info!("{command_pid} (command) continued execution");
        } else {
            dev_warn!("unexpected wait status for {command_pid} (command)");
        }
    }

    fn on_signal(&mut self, registry: &mut EventRegistry<Self>) {
        let info = match self.signal_stream.recv() {
            Ok(info) => info,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => return,
            Err(err) => {
                dev_error!("supervisor could not receive signal: {err}");
                registry.set_break(err);
                return;
            }
        };

        dev_info!("received {} from {}", signal_fmt(info.signal()), info.pid());

        let Some(command_pid) = self.command_pid else {
            dev_info!("command was terminated, ignoring signal");
            return;
        };

        match info.signal() {
            SIGCHLD => self.handle_sigchld(command_pid, registry),
            signal => {
                // Skip the signal if it was sent by the command itself or its process group;
                // relaying it would feed the command its own signal back.
                if info.is_user_signaled() && self.is_self_terminating(info.pid()) {
                    return;
                }

                // Relay the identical signal kind; the command may have installed a handler of
                // its own to run asynchronous cleanup. Delivery failure means the command just
                // exited: benign, swallowed.
                kill(command_pid, signal).ok();

                if is_termination_signal(signal)
                    && self.escalation.signal_relayed() == Escalation::ForceKill
                {
                    dev_warn!(
                        "{command_pid} (command) did not honor {}, killing it",
                        signal_fmt(signal)
                    );
                    kill(command_pid, SIGKILL).ok();
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum SuperviseEvent {
    Signal,
}

impl Process for SuperviseClosure {
    type Event = SuperviseEvent;
    type Break = io::Error;
    type Exit = ExitReason;

    fn on_event(&mut self, event: Self::Event, registry: &mut EventRegistry<Self>) {
        match event {
            SuperviseEvent::Signal => self.on_signal(registry),
        }
    }
}
