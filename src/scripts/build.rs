//! `build`: compiles the project with TypeScript or Babel depending on the
//! project type.
//!
//! TypeScript builds copy the non-TypeScript files next to `tsc` with an rsync
//! helper, because `tsc` refuses `--allowJs` together with `--declaration`.
//! Babel builds ignore test files and test helpers unless `--ignore` is given.
//! Both clean the output directory first unless `--no-clean` is passed.

use crate::core::commons::{has_flag, replace_argument_name};
use crate::core::project::Project;
use crate::core::script_kit::ScriptKit;
use crate::models::{Executable, ScriptOutput};
use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;

const DEFAULT_OUT_DIR: &str = "lib";
const SOURCE_DIR: &str = "src";
/// `.ts` files, except `.d.ts` declaration files.
const TS_SOURCE_PATTERN: &str = "/(^.?|.[^d]|[^.]d|[^.][^d]).ts$/";
const BABEL_IGNORE: &str = "__tests__,__mocks__,__test_supplements__,__test_helpers__,**/*.test.js,**/*.spec.js,**/*.test.ts,**/*.spec.ts,**/*.test.jsx,**/*.spec.jsx,**/*.test.tsx,**/*.spec.tsx";

/// Dispatches to `build/tsc` or `build/babel`.
pub fn script(args: &[String], kit: &ScriptKit<'_>) -> Result<ScriptOutput> {
    let sub_script = if kit.project().is_typescript() {
        "tsc"
    } else {
        "babel"
    };
    Ok(kit.execute_sub_script(sub_script, args)?)
}

/// The `tsc` and rsync steps of a TypeScript build, run as one group.
pub fn tsc_plan(raw_args: &[String], rsync_script: &str) -> Executable {
    let args = replace_argument_name(raw_args, &["--out-dir"], "--outDir");
    let mut tsc_args = Vec::new();
    if !has_flag(&args, "--outDir") {
        tsc_args.extend(["--outDir".to_string(), DEFAULT_OUT_DIR.to_string()]);
    }
    tsc_args.extend(args.iter().filter(|a| *a != "--no-clean").cloned());

    let rsync = if has_flag(&args, "--watch") {
        // Single quotes survive the JSON quoting of the external runner.
        Executable::bare(format!(
            "chokidar -i '{}' --initial --verbose -c '{} {{event}} {{path}}' '{}'",
            TS_SOURCE_PATTERN, rsync_script, SOURCE_DIR
        ))
    } else {
        Executable::bare(rsync_script)
    };

    Executable::group([
        ("tsc", Some(Executable::with_args("tsc", tsc_args))),
        ("rsync", Some(rsync)),
    ])
}

pub fn tsc(args: &[String], kit: &ScriptKit<'_>) -> Result<ScriptOutput> {
    let args = replace_argument_name(args, &["--out-dir"], "--outDir");
    if !has_flag(&args, "--outDir") && !has_flag(&args, "--no-clean") {
        clean(kit.project(), DEFAULT_OUT_DIR)?;
    }
    let rsync_script = kit.here_relative(&["..", "..", "helper-scripts", "rsync-non-ts.sh"]);
    log::debug!("rsync helper: {}", rsync_script);
    Ok(kit.project().execute([tsc_plan(&args, &rsync_script)]).into())
}

/// `babel src --out-dir lib` plus the default ignore globs.
pub fn babel_plan(raw_args: &[String]) -> Executable {
    let args = replace_argument_name(raw_args, &["--outDir"], "--out-dir");
    let mut babel_args = vec![SOURCE_DIR.to_string()];
    if !has_flag(&args, "--out-dir") && !has_flag(&args, "-d") {
        babel_args.extend(["--out-dir".to_string(), DEFAULT_OUT_DIR.to_string()]);
    }
    if !has_flag(&args, "--ignore") {
        babel_args.extend(["--ignore".to_string(), BABEL_IGNORE.to_string()]);
    }
    babel_args.extend(args.iter().filter(|a| *a != "--no-clean").cloned());
    Executable::with_args("babel", babel_args)
}

pub fn babel(args: &[String], kit: &ScriptKit<'_>) -> Result<ScriptOutput> {
    let custom_out_dir = has_flag(args, "--out-dir") || has_flag(args, "--outDir") || has_flag(args, "-d");
    if !custom_out_dir && !has_flag(args, "--no-clean") {
        clean(kit.project(), DEFAULT_OUT_DIR)?;
    }
    Ok(kit.project().execute([babel_plan(args)]).into())
}

fn clean(project: &Project, dir: &str) -> Result<()> {
    let target = project.from_root(&[dir]);
    match fs::remove_dir_all(&target) {
        Ok(()) => {
            log::info!("Cleaned {}", target.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Cannot clean {}", target.display())),
    }
}
