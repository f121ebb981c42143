use clap::Parser;
use std::path::PathBuf;

pub mod dispatcher;
pub mod help;

/// scriptkit: one command line over the build, test and format tools of a project.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    help_template = { help::cli_help_template() },
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Root directory of the toolkit whose scripts are run.
    #[arg(long, env = "SCRIPTKIT_TOOLKIT_ROOT", value_name = "DIR")]
    pub toolkit_root: Option<PathBuf>,

    /// Directory holding the toolkit's `scripts` and `config` directories.
    #[arg(long, env = "SCRIPTKIT_FILES_DIR", value_name = "DIR")]
    pub files_dir: Option<PathBuf>,

    /// Log every command before it runs.
    #[arg(long)]
    pub debug: bool,

    /// Discard the output of spawned commands.
    #[arg(long)]
    pub silent: bool,

    /// The script name followed by the arguments forwarded to it.
    /// Everything after the script name belongs to the script, flags included.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "SCRIPT [ARGS]")]
    pub args: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_after_script_are_forwarded() {
        let cli = Cli::try_parse_from([
            "scriptkit",
            "--silent",
            "build",
            "--watch",
            "--debug",
        ])
        .unwrap();
        assert!(cli.silent);
        assert!(!cli.debug);
        assert_eq!(cli.args, vec!["build", "--watch", "--debug"]);
    }

    #[test]
    fn test_no_script_is_accepted() {
        let cli = Cli::try_parse_from(["scriptkit", "--toolkit-root", "/opt/toolkit"]).unwrap();
        assert_eq!(cli.toolkit_root, Some(PathBuf::from("/opt/toolkit")));
        assert!(cli.args.is_empty());
    }
}
