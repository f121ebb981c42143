// src/system/concurrent.rs

use crate::core::color;
use crate::core::commons::wrap_value;
use crate::models::{Executable, ScriptResult, StdioMode};
use crate::system::executor::{Invocation, SpawnContext, spawn_sync};
use colored::Colorize;
use std::fmt::Write as _;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
/// How long output forwarding may lag behind the last member exiting.
const OUTPUT_GRACE: Duration = Duration::from_millis(500);

/// Who runs the members of a named group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConcurrentRunner {
    /// A `concurrently`-compatible binary, spawned with the generated argument list.
    External(PathBuf),
    /// Members are started in-process and their output is prefixed here.
    Native,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupOptions {
    /// Kill the remaining members as soon as one of them fails.
    pub kill_others: bool,
}

impl Default for GroupOptions {
    fn default() -> Self {
        Self { kill_others: true }
    }
}

/// Builds the argument list of the external runner for `members`.
///
/// One name, one prefix colour and one quoted command per member, in the
/// order given. Colours cycle through the palette.
pub fn concurrently_args(members: &[(String, Executable)], options: &GroupOptions) -> Vec<String> {
    let names = members
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(",");
    let colors = (0..members.len())
        .map(color::prefix_color_spec)
        .collect::<Vec<_>>()
        .join(",");

    let mut args = Vec::with_capacity(members.len() + 7);
    if options.kill_others {
        args.push("--kill-others-on-fail".to_string());
    }
    args.extend([
        "--prefix".to_string(),
        "[{name}]".to_string(),
        "--names".to_string(),
        names,
        "--prefix-colors".to_string(),
        colors,
    ]);
    args.extend(members.iter().map(|(_, exe)| {
        let line = exe.command_line();
        serde_json::to_string(&line).unwrap_or_else(|_| wrap_value(&line))
    }));
    args
}

/// Runs a group through an external `concurrently`-style binary. Its exit
/// status is the status of the whole group.
pub fn run_external(
    runner: &Path,
    members: &[(String, Executable)],
    options: &GroupOptions,
    context: &SpawnContext,
) -> ScriptResult {
    let invocation = Invocation {
        program: runner.to_string_lossy().into_owned(),
        args: concurrently_args(members, options),
        options: Default::default(),
    };
    spawn_sync(&invocation, context)
}

struct Member<'a> {
    name: &'a str,
    child: Option<Child>,
    killed: bool,
    /// `None` while running; the exit code (if any) once finished.
    finished: Option<Option<i32>>,
}

impl Member<'_> {
    fn failed(&self) -> bool {
        matches!(self.finished, Some(code) if code != Some(0))
    }
}

/// Starts every member at once, prefixes their output lines with the
/// coloured member name and waits for all of them.
///
/// The aggregate status is 0 only if every member exited with 0, otherwise 1.
pub fn run_native(
    members: &[(String, Executable)],
    options: &GroupOptions,
    context: &SpawnContext,
) -> ScriptResult {
    let silent = context.stdio == StdioMode::Ignore;
    if !silent {
        print_header(members);
    }

    let mut running: Vec<Member<'_>> = Vec::with_capacity(members.len());
    let mut readers = Vec::new();

    for (position, (name, exe)) in members.iter().enumerate() {
        let Some(invocation) = Invocation::from_executable(exe) else {
            log::error!("Group member '{}' has nothing to run.", name);
            running.push(Member {
                name,
                child: None,
                killed: false,
                finished: Some(None),
            });
            continue;
        };

        let mut command = invocation.to_command(context);
        let member_silent = invocation.options.stdio.unwrap_or(context.stdio) == StdioMode::Ignore;
        command.stdin(Stdio::null());
        if member_silent {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        } else {
            command.stdout(Stdio::piped()).stderr(Stdio::piped());
        }

        match command.spawn() {
            Ok(mut child) => {
                log::debug!("Started group member '{}' (PID: {})", name, child.id());
                let prefix = color::paint_prefix(name, position).to_string();
                if let Some(stdout) = child.stdout.take() {
                    readers.push((prefix.clone(), false, Box::new(stdout) as Box<dyn Read + Send>));
                }
                if let Some(stderr) = child.stderr.take() {
                    readers.push((prefix, true, Box::new(stderr) as Box<dyn Read + Send>));
                }
                running.push(Member {
                    name,
                    child: Some(child),
                    killed: false,
                    finished: None,
                });
            }
            Err(e) => {
                log::error!("{} could not be started: {}", color::paint_prefix(name, position), e);
                running.push(Member {
                    name,
                    child: None,
                    killed: false,
                    finished: Some(None),
                });
            }
        }
    }

    // Forwarders are not joined: a grandchild of a killed member can keep a
    // pipe open long after the member itself is gone.
    let (done_tx, done_rx) = mpsc::channel();
    let forwarders = readers.len();
    for (prefix, to_stderr, reader) in readers {
        let done = done_tx.clone();
        thread::spawn(move || {
            forward_lines(reader, &prefix, to_stderr);
            let _ = done.send(());
        });
    }
    drop(done_tx);

    wait_all(&mut running, options);

    let deadline = Instant::now() + OUTPUT_GRACE;
    for _ in 0..forwarders {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if done_rx.recv_timeout(remaining).is_err() {
            log::debug!("Leaving group output forwarding behind; a pipe is still open.");
            break;
        }
    }

    let all_succeeded = running.iter().all(|m| m.finished == Some(Some(0)));
    if !silent {
        println!("{}", "└─ End group.".dimmed());
    }
    if all_succeeded {
        ScriptResult::success()
    } else {
        for member in running.iter().filter(|m| m.failed()) {
            log::debug!("Group member '{}' failed with {:?}", member.name, member.finished);
        }
        ScriptResult::with_status(1)
    }
}

fn wait_all(members: &mut [Member<'_>], options: &GroupOptions) {
    let mut killing = options.kill_others && members.iter().any(Member::failed);
    loop {
        let mut all_done = true;
        for member in members.iter_mut() {
            if member.finished.is_some() {
                continue;
            }
            let Some(child) = member.child.as_mut() else {
                member.finished = Some(None);
                continue;
            };
            if killing && !member.killed {
                member.killed = true;
                log::debug!("Killing group member '{}' (PID: {})", member.name, child.id());
                kill_children(child.id());
                if let Err(e) = child.kill() {
                    log::warn!("Failed to kill '{}': {}", member.name, e);
                }
            }
            match child.try_wait() {
                Ok(Some(status)) => {
                    member.finished = Some(status.code());
                    if !status.success() && options.kill_others {
                        killing = true;
                    }
                }
                Ok(None) => all_done = false,
                Err(e) => {
                    log::warn!("Lost track of '{}': {}", member.name, e);
                    member.finished = Some(None);
                }
            }
        }
        if all_done {
            break;
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

/// Terminates the processes started by `pid`, such as the commands of a
/// `sh -c` line. The member itself is killed separately, so failures here
/// are only logged.
#[cfg(unix)]
fn kill_children(pid: u32) {
    let result = Command::new("pkill")
        .args(["-TERM", "-P", &pid.to_string()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    match result {
        // pkill exits with 1 when nothing matched.
        Ok(status) if status.code().is_some_and(|code| code > 1) => {
            log::debug!("pkill exited with {} for children of {}", status, pid);
        }
        Err(e) => log::debug!("Cannot signal children of {}: {}", pid, e),
        Ok(_) => {}
    }
}

#[cfg(not(unix))]
fn kill_children(pid: u32) {
    let _ = Command::new("taskkill")
        .args(["/T", "/F", "/PID", &pid.to_string()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
}

fn forward_lines(reader: Box<dyn Read + Send>, prefix: &str, to_stderr: bool) {
    for line in BufReader::new(reader).lines().map_while(Result::ok) {
        if to_stderr {
            eprintln!("{} {}", prefix, line);
        } else {
            println!("{} {}", prefix, line);
        }
    }
}

fn print_header(members: &[(String, Executable)]) {
    let mut header_block = String::with_capacity(members.len() * 80);
    let _ = writeln!(
        header_block,
        "{}",
        format!("┌─ Running {} commands concurrently...", members.len()).dimmed()
    );
    let inter_arrow = "├─>".dimmed();
    for (position, (name, exe)) in members.iter().enumerate() {
        let _ = writeln!(
            header_block,
            "{} {} {}",
            inter_arrow,
            color::paint_prefix(name, position),
            exe.command_line().green()
        );
    }
    print!("{}", header_block);
}
