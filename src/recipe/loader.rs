//! Loading recipes from disk.

use super::document::RecipeDocument;
use super::files::{FileResolver, FsFileResolver};
use super::types::Recipe;
use super::validate::{MissingGlobalsPolicy, RecipeValidator};
use crate::config::ConfigProvider;
use crate::error::{RecipeError, RecipeResult};
use std::path::Path;
use tracing::{debug, info, warn};

/// Loads and validates recipes.
///
/// Loading a recipe file first makes sure the global config is loaded, so a
/// missing or broken config surfaces as [`RecipeError::Configuration`].
pub struct RecipeLoader<'a, R = FsFileResolver> {
    provider: &'a ConfigProvider,
    validator: RecipeValidator<R>,
}

impl<'a> RecipeLoader<'a, FsFileResolver> {
    pub fn new(provider: &'a ConfigProvider) -> Self {
        Self {
            provider,
            validator: RecipeValidator::new(),
        }
    }
}

impl<'a, R: FileResolver> RecipeLoader<'a, R> {
    /// Read recipe files and the files they reference through `resolver`.
    pub fn with_resolver<S: FileResolver>(self, resolver: S) -> RecipeLoader<'a, S> {
        RecipeLoader {
            provider: self.provider,
            validator: RecipeValidator::with_resolver(resolver)
                .missing_globals(self.validator.policy()),
        }
    }

    pub fn with_missing_globals(mut self, policy: MissingGlobalsPolicy) -> Self {
        self.validator = self.validator.missing_globals(policy);
        self
    }

    /// Load the recipe at `path`, or the built-in defaults when `path` is `None`.
    pub fn load(&self, path: Option<&Path>) -> RecipeResult<Recipe> {
        let Some(path) = path else {
            debug!("No recipe file given, using default recipe");
            return self.validator.validate(RecipeDocument::defaults());
        };

        self.provider.ensure_loaded(None)?;

        let text = self
            .validator
            .resolver()
            .read_text(path)
            .map_err(|source| RecipeError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let recipe = RecipeDocument::parse(&text, Some(path))
            .and_then(|document| self.validator.validate(document))
            .inspect_err(|e| warn!(path = %path.display(), code = %e.code(), "{}", e))?;

        info!(
            path = %path.display(),
            entries = recipe.task_recipes().len(),
            "Loaded recipe"
        );
        Ok(recipe)
    }

    /// Validate recipe text that did not come from a file.
    ///
    /// The global config is not consulted.
    pub fn load_str(&self, text: &str, source_path: Option<&Path>) -> RecipeResult<Recipe> {
        let document = RecipeDocument::parse(text, source_path)?;
        self.validator.validate(document)
    }
}
