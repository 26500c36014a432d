//! Reading recipe files and the auxiliary files they reference.

use std::io;
use std::path::{Path, PathBuf};

/// Source of file contents for recipe loading.
///
/// Implementations decide where bytes come from; the recipe loader only
/// needs whole-file text and line lists.
pub trait FileResolver {
    /// Full contents of `path` as text.
    fn read_text(&self, path: &Path) -> io::Result<String>;

    /// Contents of `path` as lines.
    ///
    /// Trailing whitespace is trimmed and blank lines are dropped.
    fn read_lines(&self, path: &Path) -> io::Result<Vec<String>> {
        let text = self.read_text(path)?;
        Ok(text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// Reads straight from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFileResolver;

impl FileResolver for FsFileResolver {
    fn read_text(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

impl<R: FileResolver + ?Sized> FileResolver for &R {
    fn read_text(&self, path: &Path) -> io::Result<String> {
        (**self).read_text(path)
    }

    fn read_lines(&self, path: &Path) -> io::Result<Vec<String>> {
        (**self).read_lines(path)
    }
}

/// Resolve a path referenced from a recipe.
///
/// Relative paths are taken relative to the directory holding the recipe;
/// recipes without a source path leave them untouched.
pub fn resolve_relative(path: &Path, recipe_path: Option<&Path>) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match recipe_path.and_then(Path::parent) {
        Some(dir) => dir.join(path),
        None => path.to_path_buf(),
    }
}
