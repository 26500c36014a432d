//! Recipe validation.
//!
//! Checks run in a fixed order and the first failure aborts the load:
//! 1. every non-globals entry names a `task`
//! 2. no two entries configure the same task kind
//! 3. globals fields missing from the document take their defaults
//! 4. globals holds only known keys, each with the right type
//! 5. `filterPatternsFile` / `yaraRulesFile` are expanded
//! 6. no job is both allow- and denylisted

use super::document::RecipeDocument;
use super::files::{FileResolver, FsFileResolver, resolve_relative};
use super::types::{
    FILTER_PATTERNS_FILE, GLOBALS_FIELDS, GLOBALS_KEY, GlobalsRecipe, Recipe, TaskRecipe,
    YARA_RULES_FILE,
};
use crate::error::{RecipeError, RecipeResult};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::debug;

/// What to do with a recipe document that has no `globals` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingGlobalsPolicy {
    /// Fill in the default globals, as for a run without a recipe file.
    #[default]
    Synthesize,
    /// Fail with [`RecipeError::MissingGlobals`].
    Reject,
}

/// Turns a [`RecipeDocument`] into a [`Recipe`].
#[derive(Debug, Clone, Default)]
pub struct RecipeValidator<R = FsFileResolver> {
    resolver: R,
    missing_globals: MissingGlobalsPolicy,
}

impl RecipeValidator<FsFileResolver> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: FileResolver> RecipeValidator<R> {
    /// Validator reading auxiliary files through `resolver`.
    pub fn with_resolver(resolver: R) -> Self {
        Self {
            resolver,
            missing_globals: MissingGlobalsPolicy::default(),
        }
    }

    pub fn missing_globals(mut self, policy: MissingGlobalsPolicy) -> Self {
        self.missing_globals = policy;
        self
    }

    pub fn policy(&self) -> MissingGlobalsPolicy {
        self.missing_globals
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Validate a document. Nothing is returned unless every check passes.
    pub fn validate(&self, document: RecipeDocument) -> RecipeResult<Recipe> {
        let (source_path, mut entries) = document.into_parts();
        let globals = entries.remove(GLOBALS_KEY);

        let task_recipes = collect_task_recipes(entries)?;

        let globals = match globals {
            Some(value) => value,
            None if self.missing_globals == MissingGlobalsPolicy::Reject => {
                return Err(RecipeError::MissingGlobals { path: source_path });
            }
            None => {
                debug!("Recipe has no globals entry, using defaults");
                Value::Null
            }
        };
        let globals = self.build_globals(globals, source_path.as_deref())?;

        debug!(
            entries = task_recipes.len(),
            debug_tasks = globals.debug_tasks,
            "Recipe validated"
        );
        Ok(Recipe::new(source_path, globals, task_recipes))
    }

    fn build_globals(
        &self,
        value: Value,
        source_path: Option<&Path>,
    ) -> RecipeResult<GlobalsRecipe> {
        let explicit = match value {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(RecipeError::InvalidEntry {
                    entry: GLOBALS_KEY.to_string(),
                    reason: format!("expected a mapping, found {}", type_name(&other)),
                });
            }
        };

        let fields = with_defaults(explicit);

        for key in fields.keys() {
            let known = GLOBALS_FIELDS.contains(&key.as_str())
                || key == FILTER_PATTERNS_FILE
                || key == YARA_RULES_FILE;
            if !known {
                return Err(RecipeError::UnknownGlobalsKey { key: key.clone() });
            }
        }

        let mut globals = GlobalsRecipe {
            debug_tasks: bool_field(&fields, "debugTasks")?,
            jobs_allowlist: string_list_field(&fields, "jobsAllowlist")?,
            jobs_denylist: string_list_field(&fields, "jobsDenylist")?,
            yara_rules: string_field(&fields, "yaraRules")?,
            filter_patterns: string_list_field(&fields, "filterPatterns")?,
        };

        if let Some(file) = path_field(&fields, FILTER_PATTERNS_FILE)? {
            let path = resolve_relative(&file, source_path);
            debug!(path = %path.display(), "Expanding filter patterns file");
            globals.filter_patterns = self
                .resolver
                .read_lines(&path)
                .map_err(|source| RecipeError::Io { path, source })?;
        }

        if let Some(file) = path_field(&fields, YARA_RULES_FILE)? {
            let path = resolve_relative(&file, source_path);
            debug!(path = %path.display(), "Expanding yara rules file");
            globals.yara_rules = self
                .resolver
                .read_text(&path)
                .map_err(|source| RecipeError::Io { path, source })?;
        }

        check_job_lists(&globals)?;
        Ok(globals)
    }
}

/// Extract the task entries, then reject duplicate task kinds.
///
/// Task kinds name task types and are compared exactly, so `Kind1` and
/// `kind1` are different kinds. Job names in the allow and deny lists are
/// compared ignoring case, matching how job dependencies are keyed.
fn collect_task_recipes(entries: Map<String, Value>) -> RecipeResult<BTreeMap<String, TaskRecipe>> {
    let mut parsed = Vec::with_capacity(entries.len());
    for (name, value) in entries {
        let mut params = match value {
            Value::Object(map) => map,
            Value::Null => return Err(RecipeError::MissingTaskKey { entry: name }),
            other => {
                return Err(RecipeError::InvalidEntry {
                    reason: format!("expected a mapping, found {}", type_name(&other)),
                    entry: name,
                });
            }
        };
        let task = match params.remove("task") {
            None | Some(Value::Null) => return Err(RecipeError::MissingTaskKey { entry: name }),
            Some(Value::String(task)) if !task.trim().is_empty() => task,
            Some(_) => {
                return Err(RecipeError::InvalidEntry {
                    entry: name,
                    reason: "\"task\" must be a non-empty string".to_string(),
                });
            }
        };
        parsed.push(TaskRecipe::new(name, task, params));
    }

    let mut seen: HashMap<String, String> = HashMap::new();
    let mut recipes = BTreeMap::new();
    for entry in parsed {
        if let Some(first) = seen.get(entry.task()) {
            return Err(RecipeError::DuplicateTaskKind {
                task: entry.task().to_string(),
                first: first.clone(),
                second: entry.name().to_string(),
            });
        }
        seen.insert(entry.task().to_string(), entry.name().to_string());
        recipes.insert(entry.name().to_string(), entry);
    }
    Ok(recipes)
}

/// Fill globals fields the document leaves out, or sets to null, from the
/// built-in defaults. Explicit values win, including `false`, `""` and `[]`.
fn with_defaults(mut explicit: Map<String, Value>) -> Map<String, Value> {
    explicit.retain(|_, value| !value.is_null());
    if let Ok(Value::Object(defaults)) = serde_json::to_value(GlobalsRecipe::default()) {
        for (key, value) in defaults {
            explicit.entry(key).or_insert(value);
        }
    }
    explicit
}

fn check_job_lists(globals: &GlobalsRecipe) -> RecipeResult<()> {
    let mut jobs: Vec<String> = globals
        .jobs_allowlist
        .iter()
        .filter(|job| {
            globals
                .jobs_denylist
                .iter()
                .any(|denied| denied.eq_ignore_ascii_case(job))
        })
        .cloned()
        .collect();
    if jobs.is_empty() {
        return Ok(());
    }
    jobs.sort();
    jobs.dedup();
    Err(RecipeError::ConflictingJobLists { jobs })
}

fn invalid(key: &str, expected: &'static str) -> RecipeError {
    RecipeError::InvalidGlobalsValue {
        key: key.to_string(),
        expected,
    }
}

fn bool_field(fields: &Map<String, Value>, key: &str) -> RecipeResult<bool> {
    match fields.get(key) {
        Some(Value::Bool(b)) => Ok(*b),
        _ => Err(invalid(key, "a boolean")),
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> RecipeResult<String> {
    match fields.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(invalid(key, "a string")),
    }
}

fn string_list_field(fields: &Map<String, Value>, key: &str) -> RecipeResult<Vec<String>> {
    let Some(Value::Array(items)) = fields.get(key) else {
        return Err(invalid(key, "a list of strings"));
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.clone()),
            _ => Err(invalid(key, "a list of strings")),
        })
        .collect()
}

fn path_field(fields: &Map<String, Value>, key: &str) -> RecipeResult<Option<PathBuf>> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if !s.is_empty() => Ok(Some(PathBuf::from(s))),
        Some(_) => Err(invalid(key, "a file path")),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
