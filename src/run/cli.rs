use std::path::PathBuf;

#[derive(Debug, Default, PartialEq, Clone)]
pub enum ScriptAction {
    #[default]
    Help,
    Version,
    Run(Vec<String>),
}

#[derive(Debug, Default, PartialEq, Clone)]
pub struct ScriptOptions {
    pub chdir: Option<PathBuf>,
    // resulting action enum
    pub action: ScriptAction,
    // actions
    help: bool,
    version: bool,
    // arguments passed straight through, either separated by -- or just trailing.
    external_args: Vec<String>,
}

enum ScriptArg {
    Flag(String),
    Argument(String, String),
    Rest(Vec<String>),
}

impl ScriptOptions {
    const TAKES_ARGUMENT_SHORT: &'static [char] = &['D'];
    const TAKES_ARGUMENT: &'static [&'static str] = &["chdir"];

    /// argument assignments and shorthand options preprocessing
    fn normalize_arguments<I>(iter: I) -> Result<Vec<ScriptArg>, String>
    where
        I: IntoIterator<Item = String>,
    {
        // the first argument is the scriptmon command - so we can skip it
        let mut arg_iter = iter.into_iter().skip(1);
        let mut processed: Vec<ScriptArg> = vec![];

        while let Some(arg) = arg_iter.next() {
            match arg.as_str() {
                "--" => {
                    processed.push(ScriptArg::Rest(arg_iter.collect()));
                    break;
                }
                long_arg if long_arg.starts_with("--") => {
                    if long_arg.contains('=') {
                        // convert assignment to normal tokens
                        let (key, value) = long_arg.split_once('=').unwrap();
                        // only accept arguments when one is expected
                        if !Self::TAKES_ARGUMENT.contains(&&key[2..]) {
                            Err(format!("'{key}' does not take any arguments"))?;
                        }
                        processed.push(ScriptArg::Argument(key.to_string(), value.to_string()));
                    } else if Self::TAKES_ARGUMENT.contains(&&long_arg[2..]) {
                        if let Some(next) = arg_iter.next() {
                            processed.push(ScriptArg::Argument(arg, next));
                        } else {
                            Err(format!("'{arg}' expects an argument"))?;
                        }
                    } else {
                        processed.push(ScriptArg::Flag(arg));
                    }
                }
                short_arg if short_arg.starts_with('-') && short_arg.len() > 1 => {
                    // split combined shorthand options
                    let mut chars = short_arg[1..].chars();

                    while let Some(curr) = chars.next() {
                        let flag = format!("-{curr}");
                        // the remaining characters are the argument of an expecting option
                        if Self::TAKES_ARGUMENT_SHORT.contains(&curr) {
                            let rest: String = chars.collect();
                            let value = if rest.is_empty() {
                                arg_iter
                                    .next()
                                    .ok_or_else(|| format!("'{flag}' expects an argument"))?
                            } else {
                                rest
                            };
                            processed.push(ScriptArg::Argument(flag, value));
                            break;
                        } else {
                            processed.push(ScriptArg::Flag(flag));
                        }
                    }
                }
                _ => {
                    // the first freestanding token starts the script command
                    let mut rest = vec![arg];
                    rest.extend(arg_iter);
                    processed.push(ScriptArg::Rest(rest));
                    break;
                }
            }
        }

        Ok(processed)
    }

    /// parse commandline arguments from the process environment
    pub fn from_env() -> Result<ScriptOptions, String> {
        Self::parse_arguments(std::env::args())
    }

    /// parse commandline arguments
    fn parse_arguments<I>(arguments: I) -> Result<ScriptOptions, String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = ScriptOptions::default();

        for arg in Self::normalize_arguments(arguments)? {
            match arg {
                ScriptArg::Flag(flag) => match flag.as_str() {
                    "-h" | "--help" => options.help = true,
                    "-V" | "--version" => options.version = true,
                    _ => Err(format!("unexpected argument '{flag}'"))?,
                },
                ScriptArg::Argument(key, value) => match key.as_str() {
                    "-D" | "--chdir" => options.chdir = Some(PathBuf::from(value)),
                    _ => Err(format!("unexpected argument '{key}'"))?,
                },
                ScriptArg::Rest(rest) => options.external_args = rest,
            }
        }

        options.resolve_action();
        Ok(options)
    }

    fn resolve_action(&mut self) {
        if self.help {
            self.action = ScriptAction::Help;
        } else if self.version {
            self.action = ScriptAction::Version;
        } else {
            self.action = ScriptAction::Run(std::mem::take(&mut self.external_args));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::{ScriptAction, ScriptOptions};

    fn parse(args: &[&str]) -> Result<ScriptOptions, String> {
        let args = std::iter::once("scriptmon")
            .chain(args.iter().copied())
            .map(str::to_string);
        ScriptOptions::parse_arguments(args)
    }

    #[test]
    fn command_after_separator() {
        let options = parse(&["--", "sh", "-c", "exit 0"]).unwrap();
        assert_eq!(
            options.action,
            ScriptAction::Run(vec!["sh".into(), "-c".into(), "exit 0".into()])
        );
    }

    #[test]
    fn trailing_command_without_separator() {
        let options = parse(&["sh", "-c", "echo hi"]).unwrap();
        // the "-c" belongs to the command, not to scriptmon
        assert_eq!(
            options.action,
            ScriptAction::Run(vec!["sh".into(), "-c".into(), "echo hi".into()])
        );
    }

    #[test]
    fn chdir_variants() {
        for args in [
            &["--chdir", "/tmp", "--", "true"][..],
            &["--chdir=/tmp", "--", "true"][..],
            &["-D", "/tmp", "--", "true"][..],
            &["-D/tmp", "--", "true"][..],
        ] {
            let options = parse(args).unwrap();
            assert_eq!(options.chdir, Some(PathBuf::from("/tmp")));
            assert_eq!(options.action, ScriptAction::Run(vec!["true".into()]));
        }
    }

    #[test]
    fn chdir_needs_an_argument() {
        assert!(parse(&["--chdir"]).is_err());
        assert!(parse(&["-D"]).is_err());
    }

    #[test]
    fn help_and_version_flags() {
        assert_eq!(parse(&["-h"]).unwrap().action, ScriptAction::Help);
        assert_eq!(parse(&["--help"]).unwrap().action, ScriptAction::Help);
        assert_eq!(parse(&["-V"]).unwrap().action, ScriptAction::Version);
        assert_eq!(parse(&["--version"]).unwrap().action, ScriptAction::Version);
    }

    #[test]
    fn rejects_unknown_options() {
        assert!(parse(&["--frobnicate"]).is_err());
        assert!(parse(&["-x", "--", "true"]).is_err());
        assert!(parse(&["--help=now"]).is_err());
    }

    #[test]
    fn no_arguments_is_an_empty_run() {
        let options = parse(&[]).unwrap();
        assert_eq!(options.action, ScriptAction::Run(vec![]));
    }
}
