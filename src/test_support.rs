// src/test_support.rs
//
// A throwaway project with a toolkit installed under `node_modules/toolkit`.

use crate::core::project::{Project, ProjectOptions};
use crate::core::registry::ScriptRegistry;
use crate::models::{ScriptOutput, ScriptResult};
use crate::system::concurrent::ConcurrentRunner;
use anyhow::anyhow;
use serde_json::json;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub(crate) struct Fixture {
    pub(crate) project: Project,
    pub(crate) root: PathBuf,
    pub(crate) _temp: TempDir,
}

const SCRIPT_FILES: [&str; 12] = [
    "create-file.js",
    "create-file.d.ts",
    "create-file.js.map",
    "error-script.js",
    "multiple-results.js",
    "non-exiting.js",
    "non-exporting.js",
    "throw-script.js",
    "ts-script.ts",
    "super-script/index.ts",
    "super-script/sub-script.ts",
    "super-script/sub-script.d.ts",
];

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

pub(crate) fn registry() -> ScriptRegistry {
    ScriptRegistry::new()
        .with("create-file", |args, kit| {
            let name = args.first().map(String::as_str).unwrap_or("created.txt");
            kit.project().write_file(name, &json!("created"))?;
            Ok(ScriptResult::success().into())
        })
        .with("error-script", |_args, _kit| {
            Ok(ScriptResult::message(1, "Script failed on purpose.").into())
        })
        .with("multiple-results", |_args, _kit| {
            Ok(ScriptOutput::Many(vec![
                ScriptResult::success(),
                ScriptResult::success(),
            ]))
        })
        .with("non-exiting", |_args, _kit| {
            Ok(ScriptResult::success().without_exit().into())
        })
        .with("throw-script", |_args, _kit| Err(anyhow!("Some error")))
        .with("ts-script", |_args, _kit| Ok(ScriptResult::success().into()))
        .with("super-script", |args, kit| {
            Ok(kit.execute_sub_script("sub-script", args)?)
        })
        .with("super-script/sub-script", |args, _kit| {
            Ok(ScriptResult::with_status(i32::from(!args.is_empty())).into())
        })
}

/// Silent project with the native group runner.
pub(crate) fn fixture() -> Fixture {
    fixture_with(Some(ConcurrentRunner::Native), |_| {})
}

/// Like `fixture`, with `runner` passed through as is and `prepare` called on
/// the project root before the `Project` is built.
pub(crate) fn fixture_with(
    runner: Option<ConcurrentRunner>,
    prepare: impl FnOnce(&Path),
) -> Fixture {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().to_path_buf();
    let toolkit = root.join("node_modules").join("toolkit");

    write(
        &root.join("package.json"),
        &serde_json::to_string_pretty(&json!({
            "name": "project-ts",
            "version": "1.0.0",
            "types": "lib/index.d.ts",
            "scripts": { "test": "toolkit test", "build": "toolkit build" },
            "dependencies": { "dotenv": "^16.0.0" },
            "devDependencies": { "eslint": "^8.0.0" },
            "peerDependencies": { "browserify": "^17.0.0" }
        }))
        .unwrap(),
    );
    write(
        &toolkit.join("package.json"),
        r#"{ "name": "toolkit", "version": "0.1.0", "bin": "lib/index.js" }"#,
    );
    write(&toolkit.join("text-file.txt"), "Hello world!\n");
    for file in SCRIPT_FILES {
        write(&toolkit.join("lib").join("scripts").join(file), "");
    }
    fs::create_dir_all(toolkit.join("lib").join("config")).unwrap();
    prepare(&root);

    let env: HashMap<String, String> = [
        ("SCRIPTKIT_TEST_VALUE", "value"),
        ("SCRIPTKIT_TEST_EMPTY", ""),
        ("SCRIPTKIT_TEST_UNDEFINED", "undefined"),
        ("SCRIPTKIT_TEST_JSON", r#"{"a": 1}"#),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let project = Project::new(
        ProjectOptions {
            toolkit_root: Some(toolkit),
            cwd: Some(root.clone()),
            env,
            silent: true,
            concurrent_runner: runner,
            ..Default::default()
        },
        registry(),
    )
    .unwrap();

    Fixture {
        project,
        root,
        _temp: temp,
    }
}
