//! `test`: runs `jest`.
//!
//! Watches by default outside CI. `--no-watch`, `--coverage`,
//! `--updateSnapshot` and `--watchAll` turn watching off. The toolkit's jest
//! config is used unless the project brings its own.

use crate::core::commons::has_flag;
use crate::core::project::Project;
use crate::core::script_kit::ScriptKit;
use crate::models::{Executable, ScriptOutput, SpawnOptions};
use anyhow::Result;
use serde_json::{Value, json};

const NO_WATCH_FLAGS: [&str; 4] = ["--no-watch", "--coverage", "--updateSnapshot", "--watchAll"];

/// The jest configuration used when the project has none.
pub fn jest_config(project: &Project) -> Value {
    let dir = if project.is_compiled() { "src" } else { "lib" };
    let root = if project.has_any_file(&["src"]) {
        project.from_root(&["src"])
    } else {
        project.from_root(&["lib"])
    };

    let mut config = json!({
        "roots": [root.display().to_string()],
        "moduleFileExtensions": ["ts", "tsx", "js", "jsx"],
        "collectCoverageFrom": [format!("{}/**/*.+(js|jsx|ts|tsx)", dir)],
        "testMatch": [
            "**/__tests__/**/*.+(js|jsx|ts|tsx)",
            "**/*.(test|spec).(js|jsx|ts|tsx)"
        ]
    });
    if project.is_typescript()
        && let Some(object) = config.as_object_mut()
    {
        object.insert(
            "transform".to_string(),
            json!({ "^.+\\.(js|ts|jsx|tsx)$": "ts-jest" }),
        );
        object.insert(
            "globals".to_string(),
            json!({ "ts-jest": { "tsConfigFile": "tsconfig-test.json" } }),
        );
    }
    config
}

/// Whether jest should run in watch mode for `args`.
pub fn will_watch(project: &Project, args: &[String]) -> bool {
    !project.env_is_set("CI") && !NO_WATCH_FLAGS.iter().any(|flag| has_flag(args, flag))
}

pub fn jest_plan(project: &Project, args: &[String]) -> Executable {
    let mut jest_args = Vec::new();

    let builtin_config = !has_flag(args, "--config")
        && !project.has_any_file(&["jest.config.js"])
        && !project.package_has("jest");
    if builtin_config {
        jest_args.push("--config".to_string());
        jest_args.push(jest_config(project).to_string());
    }
    if will_watch(project, args) {
        jest_args.push("--watch".to_string());
    }
    jest_args.extend(args.iter().filter(|a| *a != "--no-watch").cloned());

    let options = SpawnOptions::default()
        .with_env("BABEL_ENV", "test")
        .with_env("NODE_ENV", "test");
    Executable::with_options("jest", jest_args, options)
}

/// In watch mode the result does not ask for process termination.
pub fn script(args: &[String], kit: &ScriptKit<'_>) -> Result<ScriptOutput> {
    let project = kit.project();
    let result = project.execute([jest_plan(project, args)]);
    Ok(if will_watch(project, args) {
        result.without_exit().into()
    } else {
        result.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Fixture, fixture};

    fn args_of(executable: Executable) -> Vec<String> {
        match executable {
            Executable::WithArgs { args, .. } => args,
            _ => Vec::new(),
        }
    }

    #[test]
    fn test_watch_and_builtin_config_by_default() {
        let Fixture { project, _temp, .. } = fixture();
        let args = args_of(jest_plan(&project, &[]));
        assert_eq!(args.first().map(String::as_str), Some("--config"));
        assert_eq!(args.last().map(String::as_str), Some("--watch"));

        let config: Value = serde_json::from_str(args.get(1).unwrap()).unwrap();
        assert_eq!(
            config.get("transform").and_then(|t| t.get("^.+\\.(js|ts|jsx|tsx)$")),
            Some(&json!("ts-jest"))
        );
        assert_eq!(
            config.get("collectCoverageFrom"),
            Some(&json!(["src/**/*.+(js|jsx|ts|tsx)"]))
        );
    }

    #[test]
    fn test_coverage_disables_watch() {
        let Fixture { project, _temp, .. } = fixture();
        let args = args_of(jest_plan(
            &project,
            &["--coverage".to_string(), "--config".to_string(), "jest.json".to_string()],
        ));
        assert_eq!(args, vec!["--coverage", "--config", "jest.json"]);
        assert!(!will_watch(&project, &["--no-watch".to_string()]));
    }

    #[test]
    fn test_spawn_environment() {
        let Fixture { project, _temp, .. } = fixture();
        let plan = jest_plan(&project, &[]);
        let env = match &plan {
            Executable::WithArgs {
                options: Some(options),
                ..
            } => Some(&options.env),
            _ => None,
        };
        assert_eq!(env.and_then(|e| e.get("NODE_ENV")).map(String::as_str), Some("test"));
        assert_eq!(env.and_then(|e| e.get("BABEL_ENV")).map(String::as_str), Some("test"));
    }
}
