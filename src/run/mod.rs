use std::io;
use std::path::Path;
use std::process::exit;

use crate::common::Error;
use crate::exec::{self, ExitReason, RunOptions};
use crate::log::{dev_info, user_error, ScriptmonLogger};

mod cli;
mod help;

use cli::{ScriptAction, ScriptOptions};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn run_script(options: &ScriptOptions, cmd: &[String]) -> Result<(), Error> {
    let command = Path::new(&cmd[0]);

    let run_options = RunOptions {
        command,
        arguments: &cmd[1..],
        chdir: options.chdir.as_deref(),
    };

    let (reason, restore_signal_handlers) =
        exec::run_script(&run_options).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => Error::StartFailure {
                command: command.to_path_buf(),
                inner: err,
            },
            _ => Error::Io(err),
        })?;

    // Run any clean-up code before this line; the process terminates in the match below.
    restore_signal_handlers();

    match reason {
        ExitReason::Code(code) => exit(code),
        #[cfg(unix)]
        ExitReason::Signal(signal) => {
            // The original dispositions were just restored, so the default action terminates us
            // here and the supervisor's death is indistinguishable from the command's.
            crate::system::kill(crate::system::process_id(), signal).ok();

            // the signal is blocked in an inherited mask or its default action does not
            // terminate; fall back to the shell's exit status convention
            exit(128 + signal)
        }
        #[cfg(not(unix))]
        ExitReason::Signal(_) => exit(1),
    }
}

fn scriptmon_process() -> Result<(), Error> {
    ScriptmonLogger::new("scriptmon: ").into_global_logger();

    dev_info!("development logs are enabled");

    match ScriptOptions::from_env() {
        Ok(options) => match &options.action {
            ScriptAction::Help => {
                eprintln_ignore_io_error!("{}", help::long_help_message());
                exit(0);
            }
            ScriptAction::Version => {
                eprintln_ignore_io_error!("scriptmon {VERSION}");
                exit(0);
            }
            ScriptAction::Run(cmd) => {
                // special case for when no command is given
                if cmd.is_empty() {
                    eprintln_ignore_io_error!("{}", help::USAGE_MSG);
                    exit(1);
                }

                run_script(&options, cmd)
            }
        },
        Err(e) => {
            eprintln_ignore_io_error!("{e}\n{}", help::USAGE_MSG);
            exit(1);
        }
    }
}

pub fn main() {
    match scriptmon_process() {
        Ok(()) => (),
        Err(error) => {
            user_error!("{error}");
            exit(1);
        }
    }
}
