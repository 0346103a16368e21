//! Workflow discovery module
//!
//! Scans a directory tree for workflow documents (`*.json`)

use brandos_libs::AppError;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Directory names skipped unless the caller overrides them
pub const DEFAULT_EXCLUDES: [&str; 3] = ["node_modules", ".git", "target"];

/// Service responsible for finding workflow documents on disk
pub struct DiscoveryService {
    /// Root directory to scan
    root: PathBuf,
    /// Directory names that are never descended into
    excludes: Vec<String>,
}

impl DiscoveryService {
    /// Create a new discovery service
    ///
    /// # Arguments
    ///
    /// * `root` - Directory to scan recursively
    /// * `excludes` - Directory names to skip (matched on the name, at any depth)
    pub fn new<P: AsRef<Path>>(root: P, excludes: Vec<String>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            excludes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Discover every `*.json` file below the root
    ///
    /// Symbolic links are not followed; a linked document is logged and skipped.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<PathBuf>)` - Paths sorted lexicographically
    /// * `Err(AppError)` - The root is missing or not a directory
    pub fn discover_documents(&self) -> Result<Vec<PathBuf>, AppError> {
        if !self.root.is_dir() {
            return Err(AppError::ConfigError(format!(
                "Workflow root {:?} is not a directory",
                self.root
            )));
        }

        let mut paths = Vec::new();

        for entry in WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !self.is_excluded(e))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under {:?}: {}", self.root, e);
                    continue;
                }
            };

            if entry.path().extension() != Some(OsStr::new("json")) {
                continue;
            }

            if entry.path_is_symlink() {
                debug!("Skipping symlinked document {:?}", entry.path());
            } else if entry.file_type().is_file() {
                paths.push(entry.into_path());
            }
        }

        paths.sort();
        debug!("Discovered {} workflow documents under {:?}", paths.len(), self.root);
        Ok(paths)
    }

    /// Path of a discovered document relative to the root, with `/` separators
    pub fn relative_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.excludes.iter().any(|x| x == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn default_excludes() -> Vec<String> {
        DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_discover_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let service = DiscoveryService::new(temp_dir.path(), default_excludes());

        let result = service.discover_documents();
        assert!(result.is_ok());
        assert_eq!(result.unwrap().len(), 0);
    }

    #[test]
    fn test_discover_recursively_and_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("campaigns/spring")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::write(root.join("b.json"), "{}").unwrap();
        fs::write(root.join("a.json"), "{}").unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();
        fs::write(root.join("campaigns/spring/hero.json"), "{}").unwrap();
        fs::write(root.join("node_modules/pkg/package.json"), "{}").unwrap();

        let service = DiscoveryService::new(root, default_excludes());
        let found: Vec<String> = service
            .discover_documents()
            .unwrap()
            .iter()
            .map(|p| service.relative_path(p))
            .collect();

        assert_eq!(found, vec!["a.json", "b.json", "campaigns/spring/hero.json"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_documents_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("real.json"), "{}").unwrap();
        std::os::unix::fs::symlink(root.join("real.json"), root.join("link.json")).unwrap();

        let service = DiscoveryService::new(root, default_excludes());
        let found: Vec<String> = service
            .discover_documents()
            .unwrap()
            .iter()
            .map(|p| service.relative_path(p))
            .collect();

        assert_eq!(found, vec!["real.json"]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let service = DiscoveryService::new(temp_dir.path().join("missing"), Vec::new());
        assert!(matches!(
            service.discover_documents(),
            Err(AppError::ConfigError(_))
        ));
    }
}
