//! Execution recipes.
//!
//! A recipe is a YAML mapping of entry names to entries. The reserved
//! `globals` entry holds run-wide settings; every other entry overrides the
//! parameters of one task kind:
//!
//! ```yaml
//! globals:
//!   debugTasks: false
//!   jobsAllowlist: []
//!   jobsDenylist: [HadoopJob]
//!   filterPatternsFile: patterns.txt
//! plaso_base:
//!   task: PlasoTask
//!   hashers: all
//! ```
//!
//! Loading goes path → text → [`RecipeDocument`] → [`RecipeValidator`] →
//! [`Recipe`].

mod document;
mod files;
mod loader;
mod types;
mod validate;

pub use document::RecipeDocument;
pub use files::{FileResolver, FsFileResolver, resolve_relative};
pub use loader::RecipeLoader;
pub use types::*;
pub use validate::{MissingGlobalsPolicy, RecipeValidator};
