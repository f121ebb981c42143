//! # Bundled Scripts
//!
//! Thin wrappers over the tools a toolkit usually offers. Each one only builds
//! a command line from the project's state and its arguments, then hands it to
//! `Project::execute`.
//!
//! A toolkit ships the matching files in its scripts directory (`build/index.ts`,
//! `build/tsc.ts`, `format.ts`, ...); the bodies below are registered under the
//! same keys.

use crate::core::registry::ScriptRegistry;

pub mod build;
pub mod format;
pub mod test;

/// Registry holding every bundled script.
pub fn builtin_registry() -> ScriptRegistry {
    ScriptRegistry::new()
        .with("build", build::script)
        .with("build/tsc", build::tsc)
        .with("build/babel", build::babel)
        .with("format", format::script)
        .with("test", test::script)
}
