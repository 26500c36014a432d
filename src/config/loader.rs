//! Config file discovery and loading.
//!
//! The first existing file wins: search directories are tried in order and,
//! within each directory, the file names are tried in order.

use super::types::Config;
use crate::error::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable holding a colon-separated list of search directories.
pub const CONFIG_PATH_ENV: &str = "SIFT_CONFIG_PATH";

/// File names looked for in each search directory.
pub const CONFIG_FILE_NAMES: &[&str] = &[".siftrc", "sift.yaml", "sift.yml"];

/// System-wide config directory.
pub const SYSTEM_CONFIG_DIR: &str = "/etc/sift";

/// Where to look for the config file.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Directories searched in order
    pub search_dirs: Vec<PathBuf>,
    /// File names tried inside each directory
    pub file_names: Vec<String>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover search directories from the environment.
    ///
    /// `SIFT_CONFIG_PATH` replaces the default search list (`~`, `/etc/sift`)
    /// when set.
    pub fn discover() -> Self {
        let search_dirs = match std::env::var(CONFIG_PATH_ENV) {
            Ok(value) => Self::split_search_path(&value),
            Err(_) => {
                let mut defaults = Vec::new();
                if let Some(home) = dirs::home_dir() {
                    defaults.push(home);
                }
                defaults.push(PathBuf::from(SYSTEM_CONFIG_DIR));
                defaults
            }
        };
        Self::with_dirs(search_dirs)
    }

    /// Create paths with explicit search directories and the default file names.
    pub fn with_dirs(search_dirs: Vec<PathBuf>) -> Self {
        Self {
            search_dirs,
            file_names: CONFIG_FILE_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn split_search_path(value: &str) -> Vec<PathBuf> {
        value
            .split(':')
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .collect()
    }

    /// Every candidate path, in search order.
    pub fn candidates(&self) -> Vec<PathBuf> {
        self.search_dirs
            .iter()
            .flat_map(|dir| self.file_names.iter().map(move |name| dir.join(name)))
            .collect()
    }

    /// First candidate that exists on disk.
    pub fn find(&self) -> Option<PathBuf> {
        self.candidates().into_iter().find(|path| path.is_file())
    }
}

/// Loads and validates the global config.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    pub paths: ConfigPaths,
}

impl ConfigLoader {
    pub fn new(paths: ConfigPaths) -> Self {
        Self { paths }
    }

    /// Load from `explicit` if given, otherwise from the first file found in
    /// the search paths.
    pub fn load(&self, explicit: Option<&Path>) -> ConfigResult<Config> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                debug!("No config specified, looking in default locations");
                self.paths.find().ok_or_else(|| ConfigError::NotFound {
                    searched: self.paths.candidates(),
                })?
            }
        };
        Self::load_file(&path)
    }

    /// Load a specific config file.
    pub fn load_file(path: &Path) -> ConfigResult<Config> {
        debug!(path = %path.display(), "Loading config");
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Config::from_yaml_str(&content, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::tests::MINIMAL_CONFIG;
    use tempfile::TempDir;

    #[test]
    fn test_split_search_path_skips_empty() {
        let dirs = ConfigPaths::split_search_path("/a::/b:");
        assert_eq!(dirs, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
    }

    #[test]
    fn test_candidates_are_dir_major() {
        let paths = ConfigPaths::with_dirs(vec![PathBuf::from("/x"), PathBuf::from("/y")]);
        let candidates = paths.candidates();
        assert_eq!(candidates.len(), 6);
        assert_eq!(candidates[0], PathBuf::from("/x/.siftrc"));
        assert_eq!(candidates[1], PathBuf::from("/x/sift.yaml"));
        assert_eq!(candidates[3], PathBuf::from("/y/.siftrc"));
    }

    #[test]
    fn test_first_directory_wins() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("first");
        let second = temp.path().join("second");
        std::fs::create_dir_all(&first).unwrap();
        std::fs::create_dir_all(&second).unwrap();
        std::fs::write(first.join("sift.yml"), MINIMAL_CONFIG).unwrap();
        std::fs::write(second.join(".siftrc"), MINIMAL_CONFIG).unwrap();

        let paths = ConfigPaths::with_dirs(vec![first.clone(), second]);
        assert_eq!(paths.find(), Some(first.join("sift.yml")));
    }

    #[test]
    fn test_load_not_found() {
        let temp = TempDir::new().unwrap();
        let loader = ConfigLoader::new(ConfigPaths::with_dirs(vec![temp.path().to_path_buf()]));
        let err = loader.load(None).unwrap_err();
        match err {
            ConfigError::NotFound { searched } => assert_eq!(searched.len(), 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_explicit_bypasses_search() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.yaml");
        std::fs::write(&path, MINIMAL_CONFIG).unwrap();

        let loader = ConfigLoader::new(ConfigPaths::with_dirs(vec![]));
        let config = loader.load(Some(path.as_path())).unwrap();
        assert_eq!(config.source(), path.as_path());
    }

    #[test]
    fn test_load_explicit_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let loader = ConfigLoader::new(ConfigPaths::with_dirs(vec![]));
        let err = loader.load(Some(temp.path().join("nope.yaml").as_path())).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
