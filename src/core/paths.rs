// src/core/paths.rs

use crate::constants::MANIFEST_FILENAME;
use crate::core::manifest::{Manifest, ManifestError};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RootError {
    #[error("Cannot get module root.")]
    RootNotFound,
    #[error("Cannot find project root (searched upward from '{searched_from}').")]
    ProjectRootNotFound { searched_from: PathBuf },
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// A manifest together with the directory that holds it.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageLocation {
    pub root: PathBuf,
    pub manifest: Manifest,
}

/// Finds the manifest nearest to `start`, looking at `start` itself and then
/// every ancestor. Returns `Ok(None)` when the filesystem root is reached.
pub fn find_manifest_upward(start: &Path) -> Result<Option<PackageLocation>, RootError> {
    let start = absolute(start);
    for dir in start.ancestors() {
        let candidate = dir.join(MANIFEST_FILENAME);
        if candidate.is_file() {
            log::debug!("Manifest found at '{}'", candidate.display());
            let manifest = Manifest::read(&candidate)?;
            return Ok(Some(PackageLocation {
                root: dir.to_path_buf(),
                manifest,
            }));
        }
    }
    Ok(None)
}

/// Resolves the root of the toolkit that uses this library.
///
/// `call_sites` is the chain of source or binary locations that led to the
/// current code, innermost first. The first one living outside `own_root`
/// belongs to the toolkit; the directory of the manifest nearest to it is the
/// toolkit root.
///
/// # Errors
/// `RootError::RootNotFound` when every call site is inside `own_root` or no
/// manifest exists above the external one.
pub fn resolve_toolkit_root<I, P>(call_sites: I, own_root: &Path) -> Result<PathBuf, RootError>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let own_root = absolute(own_root);
    let external = call_sites.into_iter().find(|site| {
        let site = absolute(site.as_ref());
        let parent = site.parent().unwrap_or(site.as_path());
        !parent.starts_with(&own_root)
    });

    let Some(site) = external else {
        return Err(RootError::RootNotFound);
    };
    log::debug!("External call site: '{}'", site.as_ref().display());

    find_manifest_upward(site.as_ref())?
        .map(|location| location.root)
        .ok_or(RootError::RootNotFound)
}

/// Resolves the consuming project's root and manifest.
///
/// The toolkit normally lives inside the project (e.g. under
/// `node_modules/<toolkit>`), so the search starts one level above the toolkit
/// root. When nothing is found there and the manifest at the toolkit root names
/// the toolkit itself, the toolkit is operating on itself.
pub fn resolve_project_package(
    toolkit_root: &Path,
    toolkit_manifest: &Manifest,
) -> Result<PackageLocation, RootError> {
    let toolkit_root = absolute(toolkit_root);
    let outside = toolkit_root.parent().unwrap_or(toolkit_root.as_path());

    if let Some(location) = find_manifest_upward(outside)? {
        return Ok(location);
    }

    let own = find_manifest_upward(&toolkit_root)?;
    let self_hosted = match (&own, toolkit_manifest.name()) {
        (Some(location), Some(toolkit_name)) => location.manifest.name() == Some(toolkit_name),
        _ => false,
    };
    if !self_hosted {
        return Err(RootError::ProjectRootNotFound {
            searched_from: outside.to_path_buf(),
        });
    }

    log::debug!("Toolkit '{}' is used on itself.", toolkit_root.display());
    Ok(PackageLocation {
        root: toolkit_root,
        manifest: toolkit_manifest.clone(),
    })
}

/// Makes `path` absolute against the current directory without touching the
/// filesystem, and normalises `.` and `..` components.
pub fn absolute(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    normalize(&joined)
}

/// Lexically removes `.` and resolves `..` components.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Computes the path of `to` relative to `from`. Both are expected to be
/// absolute; the result may start with `..`.
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from = normalize(dunce::simplified(from));
    let to = normalize(dunce::simplified(to));
    let from_parts: Vec<Component<'_>> = from.components().collect();
    let to_parts: Vec<Component<'_>> = to.components().collect();

    let common = from_parts
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = PathBuf::new();
    for _ in from_parts.iter().skip(common) {
        result.push("..");
    }
    for part in to_parts.iter().skip(common) {
        result.push(part.as_os_str());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_manifest(dir: &Path, name: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(
            dir.join(MANIFEST_FILENAME),
            format!(r#"{{"name":"{}","version":"1.0.0"}}"#, name),
        )
        .unwrap();
    }

    #[test]
    fn test_project_package_found_above_installed_toolkit() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("app");
        let toolkit_root = root.join("node_modules").join("toolkit");
        write_manifest(&root, "app");
        write_manifest(&toolkit_root, "toolkit");
        let toolkit_manifest = Manifest::read(&toolkit_root.join(MANIFEST_FILENAME)).unwrap();

        let location = resolve_project_package(&toolkit_root, &toolkit_manifest).unwrap();
        assert_eq!(location.root, absolute(&root));
        assert_eq!(location.manifest.name(), Some("app"));

        // Same filesystem state, same answer.
        let again = resolve_project_package(&toolkit_root, &toolkit_manifest).unwrap();
        assert_eq!(location, again);
    }

    #[test]
    fn test_project_package_self_hosted() {
        let temp = tempdir().unwrap();
        let toolkit_root = temp.path().join("toolkit");
        write_manifest(&toolkit_root, "toolkit");
        let toolkit_manifest = Manifest::read(&toolkit_root.join(MANIFEST_FILENAME)).unwrap();

        let location = resolve_project_package(&toolkit_root, &toolkit_manifest).unwrap();
        assert_eq!(location.root, absolute(&toolkit_root));
        assert_eq!(location.manifest, toolkit_manifest);
    }

    #[test]
    fn test_project_package_not_found_for_foreign_manifest() {
        let temp = tempdir().unwrap();
        let toolkit_root = temp.path().join("toolkit");
        write_manifest(&toolkit_root, "something-else");
        let toolkit_manifest = Manifest::from_value(serde_json::json!({"name": "toolkit"})).unwrap();

        let err = resolve_project_package(&toolkit_root, &toolkit_manifest).unwrap_err();
        assert!(matches!(err, RootError::ProjectRootNotFound { .. }));
    }

    #[test]
    fn test_toolkit_root_skips_own_call_sites() {
        let temp = tempdir().unwrap();
        let own_root = temp.path().join("scriptkit");
        let toolkit_root = temp.path().join("my-toolkit");
        write_manifest(&toolkit_root, "my-toolkit");
        fs::create_dir_all(toolkit_root.join("bin")).unwrap();

        let sites = vec![
            own_root.join("src").join("core").join("project.rs"),
            toolkit_root.join("bin").join("my-toolkit"),
        ];
        let resolved = resolve_toolkit_root(&sites, &own_root).unwrap();
        assert_eq!(resolved, absolute(&toolkit_root));
    }

    #[test]
    fn test_toolkit_root_without_external_call_site() {
        let temp = tempdir().unwrap();
        let own_root = temp.path().join("scriptkit");
        let sites = vec![own_root.join("src").join("lib.rs")];
        let err = resolve_toolkit_root(&sites, &own_root).unwrap_err();
        assert!(matches!(err, RootError::RootNotFound));
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            relative_path(Path::new("/a/b/c"), Path::new("/a/b/d/e")),
            PathBuf::from("../d/e")
        );
        assert_eq!(
            relative_path(Path::new("/a/b"), Path::new("/a/b/scripts")),
            PathBuf::from("scripts")
        );
        assert_eq!(relative_path(Path::new("/a"), Path::new("/a")), PathBuf::new());
    }

    #[test]
    fn test_normalize_handles_parent_components() {
        assert_eq!(
            normalize(Path::new("/a/b/../c/./d")),
            PathBuf::from("/a/c/d")
        );
    }
}
