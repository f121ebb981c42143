// tests/cli.rs

use scriptkit::cli::dispatcher::{CliInvocation, CliOptions, CliOutcome, execute_from_cli};
use scriptkit::core::project::{Project, ProjectOptions};
use scriptkit::core::registry::ScriptRegistry;
use scriptkit::models::{Executable, ScriptResult};
use scriptkit::system::concurrent::ConcurrentRunner;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// `app/` depending on a toolkit installed at `app/node_modules/kit`, which
/// ships `lint.js` and `release/index.js`.
fn setup() -> (TempDir, PathBuf) {
    let temp = tempfile::tempdir().unwrap();
    let app = temp.path().join("app");
    let kit = app.join("node_modules").join("kit");
    write(&app.join("package.json"), r#"{ "name": "app", "version": "2.0.0" }"#);
    write(
        &kit.join("package.json"),
        r#"{ "name": "kit", "bin": { "kit": "lib/index.js" } }"#,
    );
    write(&kit.join("lib/scripts/lint.js"), "");
    write(&kit.join("lib/scripts/release/index.js"), "");
    write(&kit.join("lib/scripts/release/notes.js"), "");
    (temp, kit)
}

fn project(kit: &Path, registry: ScriptRegistry) -> Project {
    Project::new(
        ProjectOptions {
            toolkit_root: Some(kit.to_path_buf()),
            cwd: kit.parent().and_then(Path::parent).map(Path::to_path_buf),
            silent: true,
            concurrent_runner: Some(ConcurrentRunner::Native),
            ..Default::default()
        },
        registry,
    )
    .unwrap()
}

#[test]
fn test_script_body_sees_project_and_kit() {
    let (_temp, kit) = setup();
    let registry = ScriptRegistry::new().with("lint", |args, script_kit| {
        let project = script_kit.project();
        assert_eq!(project.name(), Some("app"));
        assert_eq!(project.toolkit_bin().as_deref(), Some("kit"));
        assert_eq!(script_kit.extension(), "js");
        assert!(script_kit.config_dir().ends_with("lib/config"));
        Ok(ScriptResult::with_status(if args.is_empty() { 0 } else { 2 }).into())
    });
    let project = project(&kit, registry);

    let ok = execute_from_cli(&project, &CliInvocation::new("kit", ["lint"]), &CliOptions::default());
    assert!(matches!(ok, Ok(CliOutcome::Exit(0))));
    let failed = execute_from_cli(
        &project,
        &CliInvocation::new("kit", ["lint", "--fix"]),
        &CliOptions::default(),
    );
    assert!(matches!(failed, Ok(CliOutcome::Exit(1))));
}

#[cfg(unix)]
#[test]
fn test_directory_script_and_sub_script() {
    let (_temp, kit) = setup();
    let registry = ScriptRegistry::new()
        .with("release", |args, script_kit| {
            Ok(script_kit.execute_sub_script("notes", args)?)
        })
        .with("release/notes", |_args, script_kit| {
            let results = vec![
                ScriptResult::success(),
                script_kit.project().execute([Executable::bare("true")]),
            ];
            Ok(results.into())
        });
    let project = project(&kit, registry);

    let outcome = execute_from_cli(
        &project,
        &CliInvocation::new("kit", ["release"]),
        &CliOptions { exit: false },
    );
    assert!(
        matches!(&outcome, Ok(CliOutcome::Returned(output)) if output.results().len() == 2),
        "{:?}",
        outcome
    );
}

#[test]
fn test_binary_prints_available_scripts_for_unknown_script() {
    let (_temp, kit) = setup();
    let output = Command::new(env!("CARGO_BIN_EXE_scriptkit"))
        .arg("--toolkit-root")
        .arg(&kit)
        .arg("unknown")
        .env("NO_COLOR", "1")
        .env("RUST_LOG", "warn")
        .env_remove("SCRIPTKIT_FILES_DIR")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("lint"));
    assert!(stdout.contains("release"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Script could not be found: unknown"));
}

#[test]
fn test_binary_reports_missing_toolkit() {
    let temp = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_scriptkit"))
        .arg("--toolkit-root")
        .arg(temp.path().join("missing"))
        .arg("build")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Cannot initialize project."));
}
