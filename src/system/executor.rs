// src/system/executor.rs

use crate::models::{Executable, ResultError, ScriptResult, SpawnOptions, StdioMode};
use anyhow::anyhow;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command as StdCommand, Stdio};

/// Project-wide defaults applied to every spawned process.
#[derive(Debug, Clone)]
pub struct SpawnContext {
    pub cwd: PathBuf,
    pub stdio: StdioMode,
}

/// A program, its arguments and options, ready to be turned into a process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub options: SpawnOptions,
}

impl Invocation {
    /// Flattens a non-group executable. A bare command line is split with
    /// shell-like rules, so `"eslint --fix src"` runs `eslint` with two
    /// arguments. Returns `None` for groups and empty command lines.
    pub fn from_executable(executable: &Executable) -> Option<Self> {
        match executable {
            Executable::Bare(command_line) => {
                let trimmed = command_line.trim();
                let parts = if trimmed.contains(char::is_whitespace) {
                    shlex::split(trimmed)?
                } else {
                    vec![trimmed.to_string()]
                };
                let (program, args) = parts.split_first()?;
                if program.is_empty() {
                    return None;
                }
                Some(Self {
                    program: program.clone(),
                    args: args.to_vec(),
                    options: SpawnOptions::default(),
                })
            }
            Executable::WithArgs {
                command,
                args,
                options,
            } => Some(Self {
                program: command.clone(),
                args: args.clone(),
                options: options.clone().unwrap_or_default(),
            }),
            Executable::Group(_) => None,
        }
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Builds the process command. Stdio is left to the caller.
    pub fn to_command(&self, context: &SpawnContext) -> StdCommand {
        let cwd = self.options.cwd.as_deref().unwrap_or(&context.cwd);
        let mut command = StdCommand::new(&self.program);
        command
            .args(&self.args)
            .current_dir(dunce::simplified(cwd))
            .envs(&self.options.env);
        command
    }

    fn stdio_mode(&self, context: &SpawnContext) -> StdioMode {
        self.options.stdio.unwrap_or(context.stdio)
    }
}

fn apply_stdio(command: &mut StdCommand, mode: StdioMode) {
    match mode {
        StdioMode::Inherit => {
            command
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit());
        }
        StdioMode::Ignore => {
            command
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null());
        }
    }
}

/// Spawns a process and blocks until it exits.
///
/// Never fails: a process that cannot be started yields a result without a
/// status and with a structured error, so serial runs can treat it like any
/// other failing step.
pub fn spawn_sync(invocation: &Invocation, context: &SpawnContext) -> ScriptResult {
    let command_line = invocation.command_line();
    let mode = invocation.stdio_mode(context);
    log::debug!("Spawning '{}'", command_line);

    let mut command = invocation.to_command(context);
    apply_stdio(&mut command, mode);

    let status = match command.status() {
        Ok(status) => status,
        // Windows built-ins like `echo` only exist inside `cmd`.
        Err(e) if e.kind() == ErrorKind::NotFound && cfg!(target_os = "windows") => {
            log::debug!(
                "Command '{}' not found. Retrying with cmd /C.",
                invocation.program
            );
            let cwd = invocation.options.cwd.as_deref().unwrap_or(&context.cwd);
            let mut fallback = StdCommand::new("cmd");
            fallback
                .arg("/C")
                .arg(&command_line)
                .current_dir(dunce::simplified(cwd))
                .envs(&invocation.options.env);
            apply_stdio(&mut fallback, mode);
            match fallback.status() {
                Ok(status) => status,
                Err(e) => return spawn_failure(&command_line, e),
            }
        }
        Err(e) => return spawn_failure(&command_line, e),
    };

    if !status.success() {
        log::debug!("'{}' exited with {:?}", command_line, status.code());
    }
    ScriptResult {
        status: status.code(),
        ..ScriptResult::default()
    }
}

fn spawn_failure(command_line: &str, e: std::io::Error) -> ScriptResult {
    log::debug!("'{}' could not be spawned: {}", command_line, e);
    ScriptResult::failure(
        None,
        ResultError::Structured(anyhow!("Command '{}' could not be executed: {}", command_line, e)),
    )
}

/// Default working directory for spawned processes when none is configured.
pub fn current_dir_or(fallback: &Path) -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| fallback.to_path_buf())
}
