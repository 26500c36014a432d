//! Validated recipe types.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Reserved entry name for run-wide settings.
pub const GLOBALS_KEY: &str = "globals";

/// Canonical keys of the globals entry.
pub const GLOBALS_FIELDS: &[&str] = &[
    "debugTasks",
    "jobsAllowlist",
    "jobsDenylist",
    "yaraRules",
    "filterPatterns",
];

/// Globals key whose file contents replace `filterPatterns`.
pub const FILTER_PATTERNS_FILE: &str = "filterPatternsFile";

/// Globals key whose file contents replace `yaraRules`.
pub const YARA_RULES_FILE: &str = "yaraRulesFile";

/// Run-wide settings from the `globals` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalsRecipe {
    pub debug_tasks: bool,
    pub jobs_allowlist: Vec<String>,
    pub jobs_denylist: Vec<String>,
    pub yara_rules: String,
    pub filter_patterns: Vec<String>,
}

impl GlobalsRecipe {
    /// Whether a job may run under this recipe.
    ///
    /// Denylisted jobs never run. A non-empty allowlist restricts the run to
    /// the jobs it names. Job names are compared case-insensitively.
    pub fn is_job_allowed(&self, job: &str) -> bool {
        let listed = |list: &[String]| list.iter().any(|j| j.eq_ignore_ascii_case(job));
        if listed(&self.jobs_denylist) {
            return false;
        }
        self.jobs_allowlist.is_empty() || listed(&self.jobs_allowlist)
    }
}

/// Per-task overrides from a named recipe entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRecipe {
    #[serde(skip)]
    name: String,
    task: String,
    #[serde(flatten)]
    params: Map<String, Value>,
}

impl TaskRecipe {
    pub(crate) fn new(name: String, task: String, params: Map<String, Value>) -> Self {
        Self { name, task, params }
    }

    /// Entry name in the recipe document.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Task kind this entry configures.
    pub fn task(&self) -> &str {
        &self.task
    }

    /// Task-specific parameters, excluding `task`.
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }
}

/// A validated recipe.
///
/// Only produced by successful validation and never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    source_path: Option<PathBuf>,
    globals: GlobalsRecipe,
    task_recipes: BTreeMap<String, TaskRecipe>,
}

impl Recipe {
    pub(crate) fn new(
        source_path: Option<PathBuf>,
        globals: GlobalsRecipe,
        task_recipes: BTreeMap<String, TaskRecipe>,
    ) -> Self {
        Self {
            source_path,
            globals,
            task_recipes,
        }
    }

    /// The built-in recipe used when no recipe file is given.
    pub fn defaults() -> Self {
        Self::new(None, GlobalsRecipe::default(), BTreeMap::new())
    }

    /// File the recipe was loaded from; `None` for built-in defaults.
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn globals(&self) -> &GlobalsRecipe {
        &self.globals
    }

    /// Task entries keyed by entry name (excludes `globals`).
    pub fn task_recipes(&self) -> &BTreeMap<String, TaskRecipe> {
        &self.task_recipes
    }

    /// Entry configuring the given task kind, if any.
    pub fn recipe_for_task(&self, task: &str) -> Option<&TaskRecipe> {
        self.task_recipes.values().find(|entry| entry.task == task)
    }

    /// JSON form of the recipe, shaped like the recipe file.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Serialize for Recipe {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.task_recipes.len() + 1))?;
        map.serialize_entry(GLOBALS_KEY, &self.globals)?;
        for (name, entry) in &self.task_recipes {
            map.serialize_entry(name, entry)?;
        }
        map.end()
    }
}
