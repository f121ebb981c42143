// src/core/project.rs

use crate::constants::{
    BIN_DIR, COMPILED_FILES_DIR, CONCURRENT_RUNNER_BIN, CONFIG_DIR, MANIFEST_FILENAME,
    SCRIPTS_DIR, SOURCE_FILES_DIR,
};
use crate::core::manifest::{Manifest, ManifestError, split_path};
use crate::core::paths::{self, RootError, absolute, relative_path};
use crate::core::registry::ScriptRegistry;
use crate::core::script_kit::{ScriptError, ScriptKit};
use crate::core::script_locator::ScriptLocator;
use crate::models::{Executable, ScriptOutput, ScriptResult, StdioMode};
use crate::system::concurrent::{self, ConcurrentRunner, GroupOptions};
use crate::system::executor::{self, Invocation, SpawnContext};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Why a `Project` could not be built.
#[derive(Error, Debug)]
pub enum ProjectError {
    /// The toolkit or the project around it could not be located.
    #[error("Cannot initialize project.\n{source}")]
    Initialization {
        #[source]
        source: RootError,
    },
}

/// Failures of the project file helpers.
#[derive(Error, Debug)]
pub enum FileError {
    /// `write_file` was given `null`.
    #[error("Cannot write file. File data cannot be null or undefined.")]
    EmptyData,
    #[error("Cannot create file: {}\n{source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Copying from the toolkit into the project failed.
    #[error("Cannot copy file: {} to {}\n{source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything a `Project` needs from the outside world. Sourced once at the
/// program's entry point.
#[derive(Debug, Clone, Default)]
pub struct ProjectOptions {
    /// Log every executed command line.
    pub debug: bool,
    /// Discard the output of spawned processes.
    pub silent: bool,
    /// Root of the toolkit. When absent it is derived from `call_sites`.
    pub toolkit_root: Option<PathBuf>,
    /// Directory holding `scripts/` and `config/`. Defaults to the toolkit's
    /// `src` when it has scripts, `lib` otherwise.
    pub files_dir: Option<PathBuf>,
    /// Locations that led to this call, innermost first.
    pub call_sites: Vec<PathBuf>,
    /// Working directory for spawned processes and relative paths.
    pub cwd: Option<PathBuf>,
    /// Environment snapshot used by `env_is_set` / `parse_env`.
    pub env: HashMap<String, String>,
    /// Runner for named groups. When absent, the project's installed
    /// `concurrently` is used if there is one, the native runner otherwise.
    pub concurrent_runner: Option<ConcurrentRunner>,
}

/// The consuming project as seen from the toolkit, plus the machinery to run
/// the toolkit's scripts on it.
#[derive(Debug)]
pub struct Project {
    debug: bool,
    silent: bool,
    project_root: PathBuf,
    project_pkg: Manifest,
    toolkit_root: PathBuf,
    toolkit_pkg: Manifest,
    files_dir: PathBuf,
    cwd: PathBuf,
    env: HashMap<String, String>,
    concurrent_runner: ConcurrentRunner,
    registry: ScriptRegistry,
}

impl Project {
    /// Resolves the toolkit and project roots and loads both manifests.
    ///
    /// # Errors
    /// `ProjectError::Initialization` wrapping the root resolution failure.
    pub fn new(options: ProjectOptions, registry: ScriptRegistry) -> Result<Self, ProjectError> {
        Self::init(options, registry).map_err(|source| ProjectError::Initialization { source })
    }

    fn init(options: ProjectOptions, registry: ScriptRegistry) -> Result<Self, RootError> {
        let toolkit_root = match options.toolkit_root {
            Some(root) => absolute(&root),
            None => paths::resolve_toolkit_root(
                &options.call_sites,
                Path::new(env!("CARGO_MANIFEST_DIR")),
            )?,
        };
        let toolkit_pkg = Manifest::read(&toolkit_root.join(MANIFEST_FILENAME))?;
        let project = paths::resolve_project_package(&toolkit_root, &toolkit_pkg)?;

        let files_dir = match options.files_dir {
            Some(dir) => absolute(&dir),
            None => default_files_dir(&toolkit_root),
        };
        let cwd = match options.cwd {
            Some(cwd) => absolute(&cwd),
            None => executor::current_dir_or(&project.root),
        };
        let concurrent_runner = options.concurrent_runner.unwrap_or_else(|| {
            let runner = project.root.join(BIN_DIR).join(CONCURRENT_RUNNER_BIN);
            if runner.is_file() {
                ConcurrentRunner::External(runner)
            } else {
                ConcurrentRunner::Native
            }
        });

        if options.debug {
            log::warn!("Debug mode is on");
        }
        log::debug!(
            "Project root: '{}', toolkit root: '{}', files dir: '{}'",
            project.root.display(),
            toolkit_root.display(),
            files_dir.display()
        );

        Ok(Self {
            debug: options.debug,
            silent: options.silent,
            project_root: project.root,
            project_pkg: project.manifest,
            toolkit_root,
            toolkit_pkg,
            files_dir,
            cwd,
            env: options.env,
            concurrent_runner,
            registry,
        })
    }

    // --- Identity ---

    /// The name of the project.
    pub fn name(&self) -> Option<&str> {
        self.project_pkg.name()
    }

    /// The full project manifest.
    pub fn package(&self) -> &Manifest {
        &self.project_pkg
    }

    /// The `name` of the toolkit's manifest.
    pub fn toolkit_name(&self) -> Option<&str> {
        self.toolkit_pkg.name()
    }

    /// Directory holding the toolkit's manifest.
    pub fn toolkit_root_dir(&self) -> &Path {
        &self.toolkit_root
    }

    /// Directory holding the project's manifest.
    pub fn root_dir(&self) -> &Path {
        &self.project_root
    }

    /// The command name of the toolkit's binary: the toolkit name when `bin`
    /// is a string, the first key when it is an object.
    pub fn toolkit_bin(&self) -> Option<String> {
        match self.toolkit_pkg.get(&["bin"])? {
            Value::String(_) => self.toolkit_name().map(str::to_string),
            Value::Object(bins) => bins.keys().next().cloned(),
            _ => None,
        }
    }

    /// Whether the manifest declares `types`.
    pub fn is_typescript(&self) -> bool {
        self.package_has("types")
    }

    /// Whether the project is compiled via TypeScript or Babel.
    pub fn is_compiled(&self) -> bool {
        self.is_typescript() || self.package_has("scripts.build")
    }

    /// Debug mode.
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Working directory of spawned processes.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// The runner chosen for named groups at construction time.
    pub fn concurrent_runner(&self) -> &ConcurrentRunner {
        &self.concurrent_runner
    }

    // --- Directories ---

    /// The files directory: parent of `scripts/` and `config/`.
    pub fn src_dir(&self) -> &Path {
        &self.files_dir
    }

    /// Where script files are looked up.
    pub fn scripts_dir(&self) -> PathBuf {
        self.files_dir.join(SCRIPTS_DIR)
    }

    /// Shared configuration shipped with the toolkit.
    pub fn config_dir(&self) -> PathBuf {
        self.files_dir.join(CONFIG_DIR)
    }

    /// `parts` joined onto the project root.
    pub fn from_root<P: AsRef<Path>>(&self, parts: &[P]) -> PathBuf {
        join_all(&self.project_root, parts)
    }

    /// `parts` joined onto the toolkit root.
    pub fn from_toolkit_root<P: AsRef<Path>>(&self, parts: &[P]) -> PathBuf {
        join_all(&self.toolkit_root, parts)
    }

    /// `parts` joined onto the config directory.
    pub fn from_config_dir<P: AsRef<Path>>(&self, parts: &[P]) -> PathBuf {
        join_all(&self.config_dir(), parts)
    }

    /// `parts` joined onto the scripts directory.
    pub fn from_scripts_dir<P: AsRef<Path>>(&self, parts: &[P]) -> PathBuf {
        join_all(&self.scripts_dir(), parts)
    }

    /// `./`-prefixed path, relative to the working directory, of an executable
    /// installed in the project's `node_modules/.bin`.
    pub fn bin(&self, executable: &str) -> String {
        let target = self.project_root.join(BIN_DIR).join(executable);
        let relative = relative_path(&self.cwd, &target);
        format!(".{}{}", std::path::MAIN_SEPARATOR, relative.display())
    }

    // --- Manifest ---

    /// Whether the dotted `json_path` (e.g. `scripts.build`) exists in the
    /// project manifest.
    pub fn package_has(&self, json_path: &str) -> bool {
        self.project_pkg.has(&split_path(json_path))
    }

    /// The manifest value at the dotted `json_path`.
    pub fn package_get(&self, json_path: &str) -> Option<&Value> {
        self.project_pkg.get(&split_path(json_path))
    }

    /// Sets a manifest value and rewrites the manifest on disk.
    pub fn package_set(&mut self, json_path: &str, value: Value) -> Result<(), ManifestError> {
        self.project_pkg.set(&split_path(json_path), value);
        let path = self.project_root.join(MANIFEST_FILENAME);
        self.project_pkg.write(&path)?;
        log::info!("Manifest updated: {} ({})", path.display(), json_path);
        Ok(())
    }

    /// Whether any of `deps` is listed in `dependencies`, `devDependencies`
    /// or `peerDependencies`.
    pub fn has_any_dep(&self, deps: &[&str]) -> bool {
        deps.iter().any(|dep| {
            ["dependencies", "devDependencies", "peerDependencies"]
                .iter()
                .any(|section| self.project_pkg.has(&[section, dep]))
        })
    }

    // --- Files ---

    /// Whether any of `file_names` exists under the project root.
    pub fn has_any_file(&self, file_names: &[&str]) -> bool {
        file_names
            .iter()
            .any(|name| self.project_root.join(name).exists())
    }

    /// Writes `data` to `file_name` under the project root. Strings are written
    /// as-is, other JSON values pretty-printed; a trailing newline is added.
    pub fn write_file(&self, file_name: &str, data: &Value) -> Result<(), FileError> {
        let content = match data {
            Value::Null => return Err(FileError::EmptyData),
            Value::String(text) => text.clone(),
            other => serde_json::to_string_pretty(other).map_err(|e| FileError::Write {
                path: self.project_root.join(file_name),
                source: std::io::Error::other(e),
            })?,
        };

        let file_path = self.project_root.join(file_name);
        let write_err = |source| FileError::Write {
            path: file_path.clone(),
            source,
        };
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(&file_path, format!("{}\n", content)).map_err(write_err)?;
        log::info!("File written: {}", file_path.display());
        Ok(())
    }

    /// Copies a file or directory from the toolkit into the project.
    pub fn copy_file(&self, source_file: &str, new_file: &str) -> Result<(), FileError> {
        let from = self.toolkit_root.join(source_file);
        let to = self.project_root.join(new_file);
        copy_recursive(&from, &to).map_err(|source| FileError::Copy {
            from: from.clone(),
            to: to.clone(),
            source,
        })?;
        log::info!("Copied file: {} to {}", from.display(), to.display());
        Ok(())
    }

    // --- Environment ---

    /// Set, non-empty and not the literal `undefined`.
    pub fn env_is_set(&self, name: &str) -> bool {
        self.env
            .get(name)
            .is_some_and(|value| !value.is_empty() && value != "undefined")
    }

    /// The variable decoded as JSON, or as a plain string when it is not JSON.
    /// `default` when the variable is not set.
    pub fn parse_env(&self, name: &str, default: Option<Value>) -> Option<Value> {
        if !self.env_is_set(name) {
            return default;
        }
        let raw = self.env.get(name)?;
        Some(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone())))
    }

    // --- Scripts ---

    /// A locator over `scripts_dir()`.
    pub fn locator(&self) -> ScriptLocator {
        ScriptLocator::new(self.scripts_dir())
    }

    /// Script names available in the scripts directory, sorted.
    pub fn available_scripts(&self) -> Vec<String> {
        self.locator().list_available()
    }

    /// Full path of the script, or `None` when there is none.
    pub fn has_script(&self, script_file: &str) -> Option<PathBuf> {
        self.locator().locate(script_file)
    }

    /// Bodies of the scripts this binary can run.
    pub fn registry(&self) -> &ScriptRegistry {
        &self.registry
    }

    /// Runs the body registered for the script `script_file` with `args`.
    pub fn execute_script_file(
        &self,
        script_file: &str,
        args: &[String],
    ) -> Result<ScriptOutput, ScriptError> {
        let kit = ScriptKit::new(self, script_file)?;
        let key = kit.script_key();
        let script = self.registry.get(&key).ok_or_else(|| ScriptError::Export {
            name: script_file.to_string(),
        })?;
        log::debug!("Running script '{}' with {:?}", key, args);
        script(args, &kit).map_err(|source| ScriptError::Failed {
            name: script_file.to_string(),
            source,
        })
    }

    // --- Execution ---

    fn spawn_context(&self) -> SpawnContext {
        SpawnContext {
            cwd: self.cwd.clone(),
            stdio: if self.silent {
                StdioMode::Ignore
            } else {
                StdioMode::Inherit
            },
        }
    }

    /// Runs executables serially, in order. `None` entries are skipped.
    ///
    /// Stops at the first failing step and returns its result with the
    /// results of the steps before it in `previous_results`. When every step
    /// succeeds the result has status 0 and all step results. Groups run
    /// their members concurrently as a single step.
    pub fn execute<I>(&self, executables: I) -> ScriptResult
    where
        I: IntoIterator,
        I::Item: Into<Option<Executable>>,
    {
        let executables: Vec<Option<Executable>> =
            executables.into_iter().map(Into::into).collect();

        match executables.as_slice() {
            [] => ScriptResult::success(),
            [single] => self.execute_single(single.as_ref()),
            many => {
                let mut results = Vec::with_capacity(many.len());
                for executable in many.iter().flatten() {
                    let mut result = self.execute_single(Some(executable));
                    if !result.is_success() {
                        result.previous_results = Some(results);
                        return result;
                    }
                    results.push(result);
                }
                ScriptResult {
                    previous_results: Some(results),
                    ..ScriptResult::success()
                }
            }
        }
    }

    fn execute_single(&self, executable: Option<&Executable>) -> ScriptResult {
        let Some(executable) = executable else {
            return ScriptResult::success();
        };
        if self.debug {
            log::debug!("Executing: {}", executable.command_line());
        }

        match executable {
            Executable::Group(members) => self.execute_group(members, &GroupOptions::default()),
            other => match Invocation::from_executable(other) {
                Some(invocation) => executor::spawn_sync(&invocation, &self.spawn_context()),
                None => ScriptResult::message(1, format!("Nothing to run in '{}'.", other.command_line())),
            },
        }
    }

    /// Runs the members of a named group concurrently. `None` members are
    /// dropped; an empty group succeeds without starting anything.
    pub fn execute_group(
        &self,
        members: &[(String, Option<Executable>)],
        options: &GroupOptions,
    ) -> ScriptResult {
        let members: Vec<(String, Executable)> = members
            .iter()
            .filter_map(|(name, exe)| exe.clone().map(|exe| (name.clone(), exe)))
            .collect();
        if members.is_empty() {
            return ScriptResult::success();
        }
        if let Some((name, _)) = members
            .iter()
            .find(|(_, exe)| matches!(exe, Executable::Group(_)))
        {
            return ScriptResult::message(
                1,
                format!("Group member '{}' is itself a group; groups cannot be nested.", name),
            );
        }

        let context = self.spawn_context();
        match &self.concurrent_runner {
            ConcurrentRunner::External(runner) => {
                concurrent::run_external(runner, &members, options, &context)
            }
            ConcurrentRunner::Native => concurrent::run_native(&members, options, &context),
        }
    }
}

fn join_all<P: AsRef<Path>>(base: &Path, parts: &[P]) -> PathBuf {
    parts.iter().fold(base.to_path_buf(), |acc, part| acc.join(part))
}

fn default_files_dir(toolkit_root: &Path) -> PathBuf {
    let source = toolkit_root.join(SOURCE_FILES_DIR);
    if source.join(SCRIPTS_DIR).is_dir() {
        source
    } else {
        toolkit_root.join(COMPILED_FILES_DIR)
    }
}

fn copy_recursive(from: &Path, to: &Path) -> std::io::Result<()> {
    if from.is_file() {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(from, to)?;
        return Ok(());
    }
    if !from.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("'{}' does not exist", from.display()),
        ));
    }
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(std::io::Error::other)?;
        let relative = entry.path().strip_prefix(from).map_err(std::io::Error::other)?;
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
