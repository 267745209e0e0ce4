pub const USAGE_MSG: &str = "\
usage: scriptmon [-D directory] [--] <command> [args ...]
       scriptmon -h | -V";

const DESCRIPTOR: &str = "scriptmon - run a package lifecycle script with faithful signal relay";

const HELP_MSG: &str = "Options:
  -D, --chdir=directory         change the working directory before running the command
  -h, --help                    display help message and exit
  -V, --version                 display version information and exit
  --                            stop processing command line arguments";

pub fn long_help_message() -> String {
    format!("{DESCRIPTOR}\n{USAGE_MSG}\n{HELP_MSG}")
}
