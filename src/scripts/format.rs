//! `format`: formats project files with `prettier`.
//!
//! The toolkit's prettier config is used unless the project has its own
//! (`--config`, a prettierrc file or `prettier` in the manifest). The same goes
//! for the ignore file. `--no-write` reports without writing.

use crate::core::commons::{has_flag, positional_args};
use crate::core::project::Project;
use crate::core::script_kit::ScriptKit;
use crate::models::{Executable, ScriptOutput};
use anyhow::Result;

const PRETTIER_CONFIG_FILES: [&str; 7] = [
    ".prettierrc",
    ".prettierrc.yaml",
    ".prettierrc.yml",
    ".prettierrc.json",
    ".prettierrc.js",
    ".prettierrc.toml",
    "prettier.config.js",
];
const DEFAULT_FILES: &str = "**/*.+(js|jsx|json|less|css|ts|tsx|md)";

pub fn prettier_plan(project: &Project, args: &[String]) -> Executable {
    let mut prettier_args = Vec::new();

    let builtin_config = !has_flag(args, "--config")
        && !project.has_any_file(&PRETTIER_CONFIG_FILES)
        && !project.package_has("prettier");
    if builtin_config {
        prettier_args.push("--config".to_string());
        prettier_args.push(project.from_config_dir(&[".prettierrc.js"]).display().to_string());
    }

    if !has_flag(args, "--ignore-path") && !project.has_any_file(&[".prettierignore"]) {
        prettier_args.push("--ignore-path".to_string());
        prettier_args.push(project.from_config_dir(&[".prettierignore"]).display().to_string());
    }

    if !has_flag(args, "--no-write") {
        prettier_args.push("--write".to_string());
    }
    if positional_args(args).is_empty() {
        prettier_args.push(DEFAULT_FILES.to_string());
    }

    // Absolute paths (e.g. from a pre-commit hook) become globs relative to the
    // working directory, so the ignore file still applies.
    let cwd_prefix = format!("{}{}", project.cwd().display(), std::path::MAIN_SEPARATOR);
    prettier_args.extend(
        args.iter()
            .filter(|a| *a != "--no-write")
            .map(|a| a.replace(&cwd_prefix, "")),
    );
    Executable::with_args("prettier", prettier_args)
}

pub fn script(args: &[String], kit: &ScriptKit<'_>) -> Result<ScriptOutput> {
    let project = kit.project();
    Ok(project.execute([prettier_plan(project, args)]).into())
}
