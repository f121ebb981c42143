// src/bin/scriptkit.rs

use anyhow::Result;
use clap::Parser;
use colored::*;
use scriptkit::{
    cli::{
        Cli,
        dispatcher::{self, CliInvocation, CliOptions, CliOutcome},
    },
    core::project::{Project, ProjectOptions},
    scripts,
};
use std::env;

/// The entry point of `scriptkit`. The only place that reads the process
/// environment or terminates the process.
fn main() {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("\n{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    log::debug!("CLI args parsed: {:?}", cli);

    let options = ProjectOptions {
        debug: cli.debug,
        silent: cli.silent,
        toolkit_root: cli.toolkit_root,
        files_dir: cli.files_dir,
        call_sites: env::current_exe().into_iter().collect(),
        cwd: env::current_dir().ok(),
        env: env::vars().collect(),
        concurrent_runner: None,
    };
    let project = Project::new(options, scripts::builtin_registry())?;

    let program = env::args().next().unwrap_or_else(|| "scriptkit".to_string());
    let invocation = CliInvocation::new(program, cli.args);

    match dispatcher::execute_from_cli(&project, &invocation, &CliOptions::default())? {
        CliOutcome::Exit(code) => Ok(code),
        CliOutcome::Returned(output) => {
            log::debug!("Script asked to keep running: {:?}", output);
            Ok(0)
        }
        CliOutcome::NotRun => Ok(0),
    }
}
