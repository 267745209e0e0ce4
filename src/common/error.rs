use std::{fmt, io, path::PathBuf};

#[derive(Debug)]
pub enum Error {
    /// The script command could not be spawned at all; no child exists and no signal relay was
    /// ever engaged.
    StartFailure { command: PathBuf, inner: io::Error },
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::StartFailure { command, inner } => {
                write!(f, "cannot execute '{}': {inner}", command.display())
            }
            Error::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::PathBuf;

    use super::Error;

    #[test]
    fn start_failure_names_the_command() {
        let error = Error::StartFailure {
            command: PathBuf::from("/bin/imaginary"),
            inner: io::ErrorKind::NotFound.into(),
        };

        let message = error.to_string();
        assert!(message.starts_with("cannot execute '/bin/imaginary':"));
    }
}
