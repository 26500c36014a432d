//! Parsed but unvalidated recipe documents.

use super::types::{GLOBALS_KEY, GlobalsRecipe};
use crate::error::{RecipeError, RecipeResult};
use serde::de::{self, Deserialize, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A recipe document straight out of the YAML parser.
///
/// Entry names are the keys of the top-level mapping and must be strings.
/// When a name appears twice the later entry replaces the earlier one, with a
/// warning, so entry names are unique once parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDocument {
    source_path: Option<PathBuf>,
    entries: Map<String, Value>,
}

impl RecipeDocument {
    /// Parse recipe text.
    ///
    /// An empty document parses as an empty mapping.
    pub fn parse(text: &str, source_path: Option<&Path>) -> RecipeResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self {
                source_path: source_path.map(Path::to_path_buf),
                entries: Map::new(),
            });
        }

        let top: TopLevel = serde_yaml::from_str(text).map_err(|source| RecipeError::Syntax {
            path: source_path.map(Path::to_path_buf),
            source,
        })?;

        let pairs = match top {
            TopLevel::Mapping(pairs) => pairs,
            TopLevel::Empty => Vec::new(),
            TopLevel::Other => {
                return Err(RecipeError::NotAMapping {
                    path: source_path.map(Path::to_path_buf),
                });
            }
        };

        let mut entries = Map::new();
        for (key, value) in pairs {
            let name = match key {
                serde_yaml::Value::String(name) => name,
                other => {
                    return Err(RecipeError::InvalidEntry {
                        entry: entry_label(&other),
                        reason: "entry names must be strings".to_string(),
                    });
                }
            };
            if entries.insert(name.clone(), value).is_some() {
                warn!(
                    entry = %name,
                    path = ?source_path,
                    "Recipe entry defined more than once, keeping the last definition"
                );
            }
        }

        Ok(Self {
            source_path: source_path.map(Path::to_path_buf),
            entries,
        })
    }

    /// The built-in document: a single `globals` entry holding the defaults.
    pub fn defaults() -> Self {
        let mut entries = Map::new();
        let globals = serde_json::to_value(GlobalsRecipe::default()).unwrap_or_default();
        entries.insert(GLOBALS_KEY.to_string(), globals);
        Self {
            source_path: None,
            entries,
        }
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn entries(&self) -> &Map<String, Value> {
        &self.entries
    }

    pub fn has_globals(&self) -> bool {
        self.entries.contains_key(GLOBALS_KEY)
    }

    pub(crate) fn into_parts(self) -> (Option<PathBuf>, Map<String, Value>) {
        (self.source_path, self.entries)
    }
}

/// Top-level shape of a recipe document, keeping every mapping pair in
/// document order so non-string and repeated keys can be reported.
enum TopLevel {
    Mapping(Vec<(serde_yaml::Value, Value)>),
    Empty,
    Other,
}

impl<'de> Deserialize<'de> for TopLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TopLevelVisitor)
    }
}

struct TopLevelVisitor;

impl<'de> Visitor<'de> for TopLevelVisitor {
    type Value = TopLevel;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping of recipe entries")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<TopLevel, A::Error> {
        let mut pairs = Vec::new();
        while let Some((key, value)) = map.next_entry()? {
            pairs.push((key, value));
        }
        Ok(TopLevel::Mapping(pairs))
    }

    fn visit_unit<E: de::Error>(self) -> Result<TopLevel, E> {
        Ok(TopLevel::Empty)
    }

    fn visit_none<E: de::Error>(self) -> Result<TopLevel, E> {
        Ok(TopLevel::Empty)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<TopLevel, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(TopLevel::Other)
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<TopLevel, E> {
        Ok(TopLevel::Other)
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<TopLevel, E> {
        Ok(TopLevel::Other)
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<TopLevel, E> {
        Ok(TopLevel::Other)
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<TopLevel, E> {
        Ok(TopLevel::Other)
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<TopLevel, E> {
        Ok(TopLevel::Other)
    }
}

/// Printable form of a non-string entry name.
fn entry_label(key: &serde_yaml::Value) -> String {
    match serde_yaml::to_string(key) {
        Ok(text) => text.trim_end().to_string(),
        Err(_) => format!("{key:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_mapping() {
        let doc = RecipeDocument::parse(
            "globals:\n  debugTasks: true\nplaso:\n  task: PlasoTask\n",
            Some(Path::new("r.yaml")),
        )
        .unwrap();
        assert!(doc.has_globals());
        assert_eq!(doc.entries()["plaso"], json!({"task": "PlasoTask"}));
        assert_eq!(doc.source_path(), Some(Path::new("r.yaml")));
    }

    #[test]
    fn test_parse_empty_is_empty_mapping() {
        let doc = RecipeDocument::parse("", None).unwrap();
        assert!(doc.entries().is_empty());
        assert!(!doc.has_globals());
    }

    #[test]
    fn test_unterminated_mapping_is_syntax_error() {
        let err = RecipeDocument::parse("globals: {debugTasks: true", None).unwrap_err();
        assert!(matches!(err, RecipeError::Syntax { .. }));
    }

    #[test]
    fn test_sequence_is_not_a_mapping() {
        let err = RecipeDocument::parse("- a\n- b\n", Some(Path::new("r.yaml"))).unwrap_err();
        assert!(matches!(err, RecipeError::NotAMapping { .. }));
        assert!(err.to_string().contains("r.yaml"));
    }

    #[test]
    fn test_scalar_is_not_a_mapping() {
        let err = RecipeDocument::parse("just text\n", None).unwrap_err();
        assert!(matches!(err, RecipeError::NotAMapping { .. }));
    }

    #[test]
    fn test_null_document_is_empty_mapping() {
        let doc = RecipeDocument::parse("~\n", None).unwrap();
        assert!(doc.entries().is_empty());
    }

    #[test]
    fn test_non_string_entry_name_rejected() {
        let err = RecipeDocument::parse("1: {task: K}\n", None).unwrap_err();
        match err {
            RecipeError::InvalidEntry { entry, reason } => {
                assert_eq!(entry, "1");
                assert!(reason.contains("must be strings"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_repeated_entry_name_keeps_last() {
        let doc = RecipeDocument::parse("a: {task: K1}\na: {task: K2}\n", None).unwrap();
        assert_eq!(doc.entries().len(), 1);
        assert_eq!(doc.entries()["a"], json!({"task": "K2"}));
    }

    #[test]
    fn test_defaults_document() {
        let doc = RecipeDocument::defaults();
        assert_eq!(doc.entries().len(), 1);
        assert_eq!(
            doc.entries()[GLOBALS_KEY],
            json!({
                "debugTasks": false,
                "jobsAllowlist": [],
                "jobsDenylist": [],
                "yaraRules": "",
                "filterPatterns": []
            })
        );
    }
}
