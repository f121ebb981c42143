// src/constants.rs

/// The name of the manifest file of a project or toolkit.
pub const MANIFEST_FILENAME: &str = "package.json";

/// The directory (under the files directory) holding the script files.
pub const SCRIPTS_DIR: &str = "scripts";

/// The directory (sibling of `scripts`) holding tool configuration files.
pub const CONFIG_DIR: &str = "config";

/// Files directory used while the toolkit is developed from source.
pub const SOURCE_FILES_DIR: &str = "src";

/// Files directory used when the toolkit runs from its compiled output.
pub const COMPILED_FILES_DIR: &str = "lib";

/// Extensions tried, in order, when a script name has none.
pub const SCRIPT_EXTENSIONS: &[&str] = &["ts", "js"];

/// The stem of the entry point of a directory script.
pub const INDEX_STEM: &str = "index";

/// Directory (relative to a project root) holding installed tool binaries.
pub const BIN_DIR: &str = "node_modules/.bin";

/// Binary name of the external concurrent-process runner.
pub const CONCURRENT_RUNNER_BIN: &str = "concurrently";
