//! # System Interaction Layer
//!
//! Everything that spawns or supervises external processes lives here, kept
//! apart from the project model in `core`.
//!
//! ## Modules
//!
//! - **`executor`**: Turns an `Executable` into a child process and waits for it,
//!   including the `cmd.exe` fallback on Windows.
//! - **`concurrent`**: Runs a named group of executables at the same time, either
//!   through an installed `concurrently` binary or with the built-in runner that
//!   prefixes each output line with the member's name.

pub mod concurrent;
pub mod executor;
