// src/core/script_locator.rs

use crate::constants::SCRIPT_EXTENSIONS;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

lazy_static! {
    static ref SCRIPT_EXTENSION_RE: Regex = Regex::new(r"\.(js|ts)$").expect("valid regex");
    static ref IGNORED_ENTRY_RE: Regex = Regex::new(r"(\.d\.ts|\.map)$").expect("valid regex");
}

/// Maps script names to files under a scripts directory.
#[derive(Debug, Clone)]
pub struct ScriptLocator {
    scripts_dir: PathBuf,
}

impl ScriptLocator {
    pub fn new(scripts_dir: impl Into<PathBuf>) -> Self {
        Self {
            scripts_dir: scripts_dir.into(),
        }
    }

    pub fn scripts_dir(&self) -> &Path {
        &self.scripts_dir
    }

    /// Finds the file or directory for `name`.
    ///
    /// 1. `scripts_dir/name` if it exists (file or directory).
    /// 2. Without an extension: `name.ts`, then `name.js`.
    ///
    /// Absence is `None`, never an error.
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }
        let script_path = self.scripts_dir.join(name);
        if script_path.exists() {
            return Some(script_path);
        }
        if Path::new(name).extension().is_none() {
            for extension in SCRIPT_EXTENSIONS {
                let file_path = self.scripts_dir.join(format!("{}.{}", name, extension));
                if file_path.exists() {
                    return Some(file_path);
                }
            }
        }
        None
    }

    /// Sorted, de-duplicated names of the scripts directly under the scripts
    /// directory, extensions stripped. A missing directory lists nothing.
    pub fn list_available(&self) -> Vec<String> {
        let names: BTreeSet<String> = WalkDir::new(&self.scripts_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter(|name| !IGNORED_ENTRY_RE.is_match(name))
            .map(|name| SCRIPT_EXTENSION_RE.replace(&name, "").into_owned())
            .filter(|name| !name.is_empty())
            .collect();
        names.into_iter().collect()
    }
}
