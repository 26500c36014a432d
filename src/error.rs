//! Structured error types for configuration and recipe loading.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Input errors
    RecipeIo,
    RecipeSyntax,

    // Validation errors
    InvalidEntry,
    MissingGlobals,
    MissingTaskKey,
    DuplicateTaskKind,
    UnknownGlobalsKey,
    InvalidGlobalsValue,
    ConflictingJobLists,

    // Global configuration errors
    Configuration,

    // Anything else (output rendering, logging setup)
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::RecipeIo => "RECIPE_IO",
            ErrorCode::RecipeSyntax => "RECIPE_SYNTAX",
            ErrorCode::InvalidEntry => "INVALID_ENTRY",
            ErrorCode::MissingGlobals => "MISSING_GLOBALS",
            ErrorCode::MissingTaskKey => "MISSING_TASK_KEY",
            ErrorCode::DuplicateTaskKind => "DUPLICATE_TASK_KIND",
            ErrorCode::UnknownGlobalsKey => "UNKNOWN_GLOBALS_KEY",
            ErrorCode::InvalidGlobalsValue => "INVALID_GLOBALS_VALUE",
            ErrorCode::ConflictingJobLists => "CONFLICTING_JOB_LISTS",
            ErrorCode::Configuration => "CONFIGURATION",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors raised while establishing the global configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No config file exists in any search location.
    #[error("no config file found (searched: {})", display_paths(.searched))]
    NotFound { searched: Vec<PathBuf> },

    #[error("could not read config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file '{}' is not valid YAML: {source}", .path.display())]
    Syntax {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("config file '{}' must contain a mapping at the top level", .path.display())]
    NotAMapping { path: PathBuf },

    /// A required field is absent from the config file.
    #[error("required config attribute {}:{field} not in config", .path.display())]
    MissingRequired { path: PathBuf, field: String },

    /// A required field is present but null.
    #[error("config attribute {}:{field} is not set", .path.display())]
    Unset { path: PathBuf, field: String },

    /// A field has the wrong type.
    #[error("invalid value in config file '{}': {source}", .path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("an issue occurred while parsing the dependency config: {0}")]
    Dependencies(String),
}

/// Errors raised while loading or validating a recipe.
///
/// Every variant is terminal for the current load: no partially validated
/// recipe is ever returned alongside one of these.
#[derive(Debug, Error)]
pub enum RecipeError {
    /// The recipe file, or a file it references, could not be read.
    #[error("failed to read recipe input '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse recipe file '{}': {source}", display_source(.path))]
    Syntax {
        path: Option<PathBuf>,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("recipe '{}' must be a mapping of entry names to entries", display_source(.path))]
    NotAMapping { path: Option<PathBuf> },

    #[error("recipe '{}' has no \"globals\" entry", display_source(.path))]
    MissingGlobals { path: Option<PathBuf> },

    #[error("recipe entry '{entry}' is invalid: {reason}")]
    InvalidEntry { entry: String, reason: String },

    #[error(
        "recipe entry '{entry}' has no \"task\" key; all recipe entries must name the task they configure"
    )]
    MissingTaskKey { entry: String },

    #[error(
        "recipe entries '{first}' and '{second}' both configure task {task}; \
         to run the same task several times, use separate recipes"
    )]
    DuplicateTaskKind {
        task: String,
        first: String,
        second: String,
    },

    #[error("unknown key '{key}' in recipe globals")]
    UnknownGlobalsKey { key: String },

    #[error("recipe globals key '{key}' must be {expected}")]
    InvalidGlobalsValue { key: String, expected: &'static str },

    #[error("jobs present in both jobsAllowlist and jobsDenylist: {}", .jobs.join(", "))]
    ConflictingJobLists { jobs: Vec<String> },

    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

impl RecipeError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            RecipeError::Io { .. } => ErrorCode::RecipeIo,
            RecipeError::Syntax { .. } | RecipeError::NotAMapping { .. } => {
                ErrorCode::RecipeSyntax
            }
            RecipeError::MissingGlobals { .. } => ErrorCode::MissingGlobals,
            RecipeError::InvalidEntry { .. } => ErrorCode::InvalidEntry,
            RecipeError::MissingTaskKey { .. } => ErrorCode::MissingTaskKey,
            RecipeError::DuplicateTaskKind { .. } => ErrorCode::DuplicateTaskKind,
            RecipeError::UnknownGlobalsKey { .. } => ErrorCode::UnknownGlobalsKey,
            RecipeError::InvalidGlobalsValue { .. } => ErrorCode::InvalidGlobalsValue,
            RecipeError::ConflictingJobLists { .. } => ErrorCode::ConflictingJobLists,
            RecipeError::Configuration(_) => ErrorCode::Configuration,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "nothing".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_source(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => p.display().to_string(),
        None => "<inline>".to_string(),
    }
}

/// Result type for recipe operations.
pub type RecipeResult<T> = std::result::Result<T, RecipeError>;

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
