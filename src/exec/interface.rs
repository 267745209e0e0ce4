use std::path::Path;
use std::process::Command;

/// Options needed to run one lifecycle script command.
///
/// The package runner sitting above the supervisor decides the argv and the working directory.
/// Standard IO is inherited so the script's diagnostics reach whoever launched the supervisor.
pub struct RunOptions<'a> {
    pub command: &'a Path,
    pub arguments: &'a [String],
    pub chdir: Option<&'a Path>,
}

impl RunOptions<'_> {
    pub(crate) fn build_command(&self) -> Command {
        let mut command = Command::new(self.command);
        command.args(self.arguments);

        if let Some(path) = self.chdir {
            command.current_dir(path);
        }

        command
    }
}
