use crate::cli::help;
use crate::core::project::Project;
use crate::core::script_kit::ScriptError;
use crate::models::{ResultError, ScriptOutput};
use std::path::Path;

/// The command line that started the process, read once by the binary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliInvocation {
    /// Path or name of the program, as found in `argv[0]`.
    pub program: String,
    /// Script name followed by its arguments.
    pub args: Vec<String>,
}

impl CliInvocation {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Base name of the program, e.g. `toolkit` for `/usr/bin/toolkit`.
    pub fn bin_name(&self) -> String {
        Path::new(&self.program)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.clone())
    }

    /// `"bin script args..."`, quoted, as shown in failure messages.
    pub fn command_line(&self) -> String {
        format!("\"{} {}\"", self.bin_name(), self.args.join(" ").trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CliOptions {
    /// Whether the outcome may ask for process termination.
    pub exit: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self { exit: true }
    }
}

/// What the caller should do once a CLI run is over.
#[derive(Debug)]
pub enum CliOutcome {
    /// Terminate the process with this code.
    Exit(i32),
    /// Keep running; the script's output is handed back.
    Returned(ScriptOutput),
    /// No script was run and exiting is disabled.
    NotRun,
}

/// Runs the script named by the first argument and reduces its results to a
/// CLI outcome. Nothing here terminates the process.
///
/// # Errors
/// `ScriptError::Execution` when the script cannot be executed or its body
/// fails.
pub fn execute_from_cli(
    project: &Project,
    invocation: &CliInvocation,
    options: &CliOptions,
) -> Result<CliOutcome, ScriptError> {
    let command = invocation.command_line();
    let (script, args) = match invocation.args.split_first() {
        Some((script, args)) if project.has_script(script).is_some() => (script, args),
        other => {
            if let Some((script, _)) = other {
                log::error!("{}", format!(t!("dispatcher.error.script_not_found"), script = script));
            }
            println!(
                "{}",
                help::scripts_help(&invocation.bin_name(), &project.available_scripts())
            );
            return Ok(if options.exit {
                CliOutcome::Exit(1)
            } else {
                CliOutcome::NotRun
            });
        }
    };

    let output = project
        .execute_script_file(script, args)
        .map_err(|source| ScriptError::Execution {
            command: command.clone(),
            source: Box::new(source),
        })?;

    let mut success = true;
    let mut should_exit = options.exit;
    let mut emit_general_error = false;
    let mut structured_errors = Vec::new();

    for result in output.results() {
        success = success && result.is_success();
        should_exit = should_exit && result.exit.unwrap_or(true);
        match &result.error {
            Some(ResultError::Structured(error)) => {
                log::error!("{}", error);
                structured_errors.push(error);
            }
            Some(ResultError::Message(message)) => log::error!("{}", message),
            None if !result.is_success() => emit_general_error = true,
            None => {}
        }
    }

    if emit_general_error {
        log::error!(
            "{}",
            format!(t!("dispatcher.error.finished_with_error"), script = script, command = command)
        );
    }
    for error in structured_errors {
        log::error!("{:?}", error);
    }

    Ok(if should_exit {
        CliOutcome::Exit(if success { 0 } else { 1 })
    } else {
        CliOutcome::Returned(output)
    })
}
