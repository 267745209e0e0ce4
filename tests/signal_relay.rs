//! Black-box tests for the supervisor binary: spawn `scriptmon` around real `sh` scripts and
//! observe its exit status and the fate of the grandchild.
#![cfg(unix)]

use std::io::{BufRead, BufReader};
use std::os::unix::process::ExitStatusExt;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

const SCRIPTMON: &str = env!("CARGO_BIN_EXE_scriptmon");

fn supervise(script: &str) -> Child {
    Command::new(SCRIPTMON)
        .args(["--", "sh", "-c", script])
        .stderr(Stdio::piped())
        .spawn()
        .unwrap()
}

/// Read one line from the supervisor's (inherited) stderr.
fn stderr_line(child: &mut Child) -> String {
    let stderr = child.stderr.as_mut().unwrap();
    let mut line = String::new();
    BufReader::new(stderr).read_line(&mut line).unwrap();
    line.trim().to_string()
}

fn send(child: &Child, signal: libc::c_int) {
    let ret = unsafe { libc::kill(child.id() as libc::pid_t, signal) };
    assert_eq!(ret, 0, "cannot signal the supervisor");
}

/// Wait for the supervisor to finish, failing the test instead of hanging forever.
fn wait_bounded(child: &mut Child) -> ExitStatus {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        if let Some(status) = child.try_wait().unwrap() {
            return status;
        }
        if Instant::now() > deadline {
            child.kill().ok();
            panic!("supervisor did not reach a terminal state");
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}

#[test]
fn passes_through_the_exit_code_of_a_voluntary_exit() {
    let mut child = supervise("exit 17");

    let status = wait_bounded(&mut child);
    assert_eq!(status.code(), Some(17));
    assert_eq!(status.signal(), None);
}

#[test]
fn mirrors_a_self_raised_fatal_signal() {
    // the script brings the fatal signal upon itself; nobody signals the supervisor
    let mut child = supervise("kill -SEGV $$");

    let status = wait_bounded(&mut child);
    assert_eq!(status.code(), None);
    assert_eq!(status.signal(), Some(libc::SIGSEGV));
}

#[test]
fn relays_term_to_the_child_before_dying_of_it() {
    let mut child = supervise("echo $$ >&2; exec sleep 30");

    let script_pid: libc::pid_t = stderr_line(&mut child).parse().unwrap();
    // the script is alive and signalable
    assert_eq!(unsafe { libc::kill(script_pid, 0) }, 0);

    send(&child, libc::SIGTERM);

    let status = wait_bounded(&mut child);
    assert_eq!(status.code(), None);
    assert_eq!(status.signal(), Some(libc::SIGTERM));

    // the relayed SIGTERM reached the script: its pid is gone
    assert_eq!(unsafe { libc::kill(script_pid, 0) }, -1);
}

#[test]
fn waits_for_asynchronous_cleanup_after_a_single_interrupt() {
    // the script traps INT, takes its time cleaning up, then exits on its own
    let mut child = supervise("trap 'sleep 0.2; exit 3' INT; echo ready >&2; while :; do sleep 0.1; done");

    assert_eq!(stderr_line(&mut child), "ready");
    send(&child, libc::SIGINT);

    // one interrupt is the free pass: no forced kill, the voluntary exit code survives
    let status = wait_bounded(&mut child);
    assert_eq!(status.code(), Some(3));
    assert_eq!(status.signal(), None);
}

#[test]
fn force_kills_a_child_that_ignores_repeated_interrupts() {
    let mut child = supervise("trap '' INT; echo ready >&2; while :; do sleep 0.1; done");

    assert_eq!(stderr_line(&mut child), "ready");

    send(&child, libc::SIGINT);
    // give the first interrupt time to be relayed (and ignored) before losing patience
    std::thread::sleep(Duration::from_millis(300));
    send(&child, libc::SIGINT);

    // the second interrupt escalates to a forced kill and the supervisor mirrors it
    let status = wait_bounded(&mut child);
    assert_eq!(status.code(), None);
    assert_eq!(status.signal(), Some(libc::SIGKILL));
}

#[test]
fn reports_a_start_failure_without_engaging_the_relay() {
    let mut child = Command::new(SCRIPTMON)
        .args(["--", "/nonexistent/lifecycle-script"])
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    let status = wait_bounded(&mut child);
    assert_eq!(status.code(), Some(1));

    let diagnostics = stderr_line(&mut child);
    assert!(diagnostics.contains("cannot execute"), "{diagnostics:?}");
}
