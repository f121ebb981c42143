// src/core/registry.rs

use crate::core::script_kit::ScriptKit;
use crate::models::ScriptOutput;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// The contract every script body implements.
pub type ScriptFn =
    Arc<dyn Fn(&[String], &ScriptKit<'_>) -> anyhow::Result<ScriptOutput> + Send + Sync>;

/// Script bodies by script key (`"format"`, `"build"`, `"build/tsc"`).
///
/// A script file found on disk without a body here is reported as a script
/// that does not export a script function.
#[derive(Clone, Default)]
pub struct ScriptRegistry {
    scripts: BTreeMap<String, ScriptFn>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the body for `key`.
    pub fn register<F>(&mut self, key: impl Into<String>, script: F) -> &mut Self
    where
        F: Fn(&[String], &ScriptKit<'_>) -> anyhow::Result<ScriptOutput> + Send + Sync + 'static,
    {
        self.scripts.insert(key.into(), Arc::new(script));
        self
    }

    /// Builder-style `register`.
    pub fn with<F>(mut self, key: impl Into<String>, script: F) -> Self
    where
        F: Fn(&[String], &ScriptKit<'_>) -> anyhow::Result<ScriptOutput> + Send + Sync + 'static,
    {
        self.register(key, script);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ScriptFn> {
        self.scripts.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.scripts.contains_key(key)
    }

    /// Registered keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.scripts.keys().map(String::as_str)
    }
}

impl fmt::Debug for ScriptRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.scripts.keys()).finish()
    }
}
