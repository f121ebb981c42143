// src/core/script_kit.rs

use crate::constants::{CONFIG_DIR, INDEX_STEM, SCRIPT_EXTENSIONS, SCRIPTS_DIR};
use crate::core::paths::relative_path;
use crate::core::project::Project;
use crate::models::ScriptOutput;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Script \"{name}\" cannot be found in \"{}\"", .scripts_dir.display())]
    NotFound { name: String, scripts_dir: PathBuf },
    #[error("\"{name}\" does not export a \"script\" function.")]
    Export { name: String },
    #[error("Script directory '{}' is not inside a 'scripts' directory.", .directory.display())]
    ConfigDirectory { directory: PathBuf },
    #[error("Script \"{name}\" failed: {source:#}")]
    Failed {
        name: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("Cannot finish the execution of {command}\n{source}")]
    Execution {
        command: String,
        #[source]
        source: Box<ScriptError>,
    },
}

/// Helpers scoped to the one script file being executed.
#[derive(Debug)]
pub struct ScriptKit<'p> {
    project: &'p Project,
    script_file: PathBuf,
    config_dir: PathBuf,
}

impl<'p> ScriptKit<'p> {
    /// Binds the script `script_file` of `project`.
    ///
    /// A directory script is bound to its index file (`index.ts`, then
    /// `index.js`).
    pub fn new(project: &'p Project, script_file: &str) -> Result<Self, ScriptError> {
        let not_found = || ScriptError::NotFound {
            name: script_file.to_string(),
            scripts_dir: project.scripts_dir(),
        };
        let located = project.has_script(script_file).ok_or_else(not_found)?;
        let bound = if located.is_dir() {
            index_file(&located).ok_or_else(not_found)?
        } else {
            located
        };

        let directory = bound.parent().map(Path::to_path_buf).unwrap_or_default();
        let config_dir = config_dir_for(&directory)?;
        log::debug!("Script '{}' bound to '{}'", script_file, bound.display());

        Ok(Self {
            project,
            script_file: bound,
            config_dir,
        })
    }

    pub fn project(&self) -> &'p Project {
        self.project
    }

    pub fn script_file(&self) -> &Path {
        &self.script_file
    }

    /// The directory holding the script file.
    pub fn dir(&self) -> &Path {
        self.script_file.parent().unwrap_or(Path::new(""))
    }

    /// The `config` sibling of the nearest enclosing `scripts` directory.
    /// Works the same for source and compiled script trees.
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// File extension without the dot; empty when there is none.
    pub fn extension(&self) -> &str {
        self.script_file
            .extension()
            .and_then(OsStr::to_str)
            .unwrap_or("")
    }

    /// Registry key of the bound script: its path under the scripts directory,
    /// `/`-separated, with the extension and a trailing `index` removed.
    pub fn script_key(&self) -> String {
        script_key(&self.project.scripts_dir(), &self.script_file)
    }

    /// Absolute path of `parts` relative to the script directory.
    pub fn here<P: AsRef<Path>>(&self, parts: &[P]) -> PathBuf {
        parts
            .iter()
            .fold(self.dir().to_path_buf(), |acc, part| acc.join(part))
    }

    /// Same as `here`, relative to the working directory and prefixed with
    /// `./` so it can be dropped into a command line.
    pub fn here_relative<P: AsRef<Path>>(&self, parts: &[P]) -> String {
        let relative = relative_path(self.project.cwd(), &self.here(parts));
        format!(".{}{}", std::path::MAIN_SEPARATOR, relative.display())
    }

    /// Executes the script `name` that lives next to this one.
    pub fn execute_sub_script(&self, name: &str, args: &[String]) -> Result<ScriptOutput, ScriptError> {
        let base = relative_path(&self.project.scripts_dir(), self.dir());
        let script_file = base.join(name);
        let script_file = script_file.to_string_lossy();
        log::debug!("Executing sub-script '{}'", script_file);
        self.project.execute_script_file(&script_file, args)
    }
}

fn index_file(dir: &Path) -> Option<PathBuf> {
    SCRIPT_EXTENSIONS
        .iter()
        .map(|extension| dir.join(format!("{}.{}", INDEX_STEM, extension)))
        .find(|candidate| candidate.is_file())
}

/// Drops every segment after, and including, the last `scripts` segment of
/// `directory` and appends `config`.
pub fn config_dir_for(directory: &Path) -> Result<PathBuf, ScriptError> {
    let components: Vec<Component<'_>> = directory.components().collect();
    let position = components
        .iter()
        .rposition(|c| c.as_os_str() == OsStr::new(SCRIPTS_DIR))
        .ok_or_else(|| ScriptError::ConfigDirectory {
            directory: directory.to_path_buf(),
        })?;
    let mut config_dir: PathBuf = components.iter().take(position).collect();
    config_dir.push(CONFIG_DIR);
    Ok(config_dir)
}

/// Derives the registry key of `script_file` under `scripts_dir`.
pub fn script_key(scripts_dir: &Path, script_file: &Path) -> String {
    let mut relative = relative_path(scripts_dir, script_file);
    if relative
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext))
    {
        relative.set_extension("");
    }
    if relative.file_name() == Some(OsStr::new(INDEX_STEM)) {
        relative.pop();
    }
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
