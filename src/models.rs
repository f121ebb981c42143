// src/models.rs

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

// --- EXECUTABLES ---

/// How the standard streams of a spawned process are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StdioMode {
    /// Share the parent's stdin, stdout and stderr.
    #[default]
    Inherit,
    /// Discard all output and provide no input.
    Ignore,
}

/// Options applied when spawning one process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnOptions {
    pub cwd: Option<PathBuf>,
    pub stdio: Option<StdioMode>,
    pub env: HashMap<String, String>,
}

impl SpawnOptions {
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_stdio(mut self, stdio: StdioMode) -> Self {
        self.stdio = Some(stdio);
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

/// A description of one unit of work for the execution engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Executable {
    /// A command without arguments. A command line containing whitespace is
    /// split into program and arguments before spawning.
    Bare(String),
    /// A program with its ordered argument list.
    WithArgs {
        command: String,
        args: Vec<String>,
        options: Option<SpawnOptions>,
    },
    /// Labelled executables started concurrently. Order is kept; `None`
    /// members are dropped before running.
    Group(Vec<(String, Option<Executable>)>),
}

impl Executable {
    pub fn bare(command: impl Into<String>) -> Self {
        Self::Bare(command.into())
    }

    pub fn with_args<I, S>(command: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::WithArgs {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
            options: None,
        }
    }

    pub fn with_options<I, S>(command: impl Into<String>, args: I, options: SpawnOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::WithArgs {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
            options: Some(options),
        }
    }

    pub fn group<I, N>(members: I) -> Self
    where
        I: IntoIterator<Item = (N, Option<Executable>)>,
        N: Into<String>,
    {
        Self::Group(
            members
                .into_iter()
                .map(|(name, exe)| (name.into(), exe))
                .collect(),
        )
    }

    /// The command line as a single string, used in logs and by the external
    /// concurrent runner. Groups render their members separated by ` & `.
    pub fn command_line(&self) -> String {
        match self {
            Self::Bare(command) => command.clone(),
            Self::WithArgs { command, args, .. } => {
                if args.is_empty() {
                    command.clone()
                } else {
                    format!("{} {}", command, args.join(" "))
                }
            }
            Self::Group(members) => members
                .iter()
                .filter_map(|(_, exe)| exe.as_ref().map(Self::command_line))
                .collect::<Vec<_>>()
                .join(" & "),
        }
    }
}

impl From<&str> for Executable {
    fn from(command: &str) -> Self {
        Self::Bare(command.to_string())
    }
}

impl From<String> for Executable {
    fn from(command: String) -> Self {
        Self::Bare(command)
    }
}

// --- RESULTS ---

/// The error carried by a `ScriptResult`.
#[derive(Debug)]
pub enum ResultError {
    /// A structured error, e.g. the I/O error of a failed spawn.
    Structured(anyhow::Error),
    /// A plain message.
    Message(String),
}

impl fmt::Display for ResultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structured(e) => write!(f, "{:#}", e),
            Self::Message(m) => f.write_str(m),
        }
    }
}

/// The outcome of running one executable or one script body.
#[derive(Debug, Default)]
pub struct ScriptResult {
    /// Exit code; `Some(0)` is success. `None` when the process never reported
    /// a code (failed to spawn, or was terminated by a signal).
    pub status: Option<i32>,
    pub error: Option<ResultError>,
    /// Results of the steps that ran before a failing step of a serial run.
    pub previous_results: Option<Vec<ScriptResult>>,
    /// Whether this result lets the dispatcher terminate the process.
    /// Absent means yes.
    pub exit: Option<bool>,
}

impl ScriptResult {
    pub fn success() -> Self {
        Self::with_status(0)
    }

    pub fn with_status(status: i32) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn failure(status: Option<i32>, error: ResultError) -> Self {
        Self {
            status,
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn message(status: i32, message: impl Into<String>) -> Self {
        Self::failure(Some(status), ResultError::Message(message.into()))
    }

    /// Marks this result as not wanting the process to be terminated.
    pub fn without_exit(mut self) -> Self {
        self.exit = Some(false);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == Some(0)
    }
}

/// What a script body hands back to the dispatcher.
#[derive(Debug)]
pub enum ScriptOutput {
    Single(ScriptResult),
    Many(Vec<ScriptResult>),
}

impl ScriptOutput {
    /// Normalises the output into a list of results.
    pub fn into_results(self) -> Vec<ScriptResult> {
        match self {
            Self::Single(result) => vec![result],
            Self::Many(results) => results,
        }
    }

    pub fn results(&self) -> Vec<&ScriptResult> {
        match self {
            Self::Single(result) => vec![result],
            Self::Many(results) => results.iter().collect(),
        }
    }
}

impl From<ScriptResult> for ScriptOutput {
    fn from(result: ScriptResult) -> Self {
        Self::Single(result)
    }
}

impl From<Vec<ScriptResult>> for ScriptOutput {
    fn from(results: Vec<ScriptResult>) -> Self {
        Self::Many(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_rendering() {
        assert_eq!(Executable::bare("tsc").command_line(), "tsc");
        assert_eq!(
            Executable::with_args("tsc", ["--outDir", "lib"]).command_line(),
            "tsc --outDir lib"
        );
        let group = Executable::group([
            ("a", Some(Executable::bare("lint"))),
            ("b", None),
            ("c", Some(Executable::with_args("jest", ["--ci"]))),
        ]);
        assert_eq!(group.command_line(), "lint & jest --ci");
    }

    #[test]
    fn test_script_result_success_requires_zero_status() {
        assert!(ScriptResult::success().is_success());
        assert!(!ScriptResult::with_status(2).is_success());
        let spawn_failure = ScriptResult::failure(
            None,
            ResultError::Structured(anyhow::anyhow!("not found")),
        );
        assert!(!spawn_failure.is_success());
        assert!(spawn_failure.error.is_some());
    }

    #[test]
    fn test_script_output_normalises_to_list() {
        let single: ScriptOutput = ScriptResult::success().into();
        assert_eq!(single.into_results().len(), 1);
        let many: ScriptOutput = vec![ScriptResult::success(), ScriptResult::with_status(1)].into();
        let results = many.into_results();
        assert_eq!(results.len(), 2);
        assert_eq!(results.get(1).and_then(|r| r.status), Some(1));
    }
}
