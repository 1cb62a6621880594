//! Generation configuration (`docdts.toml`) and the built-in tables.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::GenerateResult;

/// Settings and fixed tables for one generation run.
///
/// Every field has a default, so a configuration file only needs to list what
/// it overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Name used in the trailing `export default` statement.
    pub export_name: String,
    /// Spaces per indentation level.
    pub indent: usize,
    /// Maximum length of a doc comment summary before it is abbreviated.
    pub description_width: usize,
    /// Include emitter warnings as comments at the end of the output.
    pub verbose: bool,
    /// Legacy namespace paths and their canonical replacement.
    pub namespace_aliases: IndexMap<String, String>,
    /// Names that always render as one fixed reference.
    pub absolute_names: IndexMap<String, String>,
    /// Full-name prefixes whose classes and items are skipped entirely.
    pub excluded_prefixes: Vec<String>,
    /// Undocumented types synthesized as empty interfaces.
    pub ambient_types: Vec<String>,
    /// Type parameters per class full name, e.g. `["T = any"]`.
    pub generics: IndexMap<String, Vec<String>>,
    /// Literal type names appended to a class's `implements` list.
    pub extra_implements: IndexMap<String, Vec<String>>,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            export_name: "Ember".to_string(),
            indent: 4,
            description_width: 120,
            verbose: false,
            namespace_aliases: table(&[("Em", "Ember"), ("Ember.Handlebars.helpers", "Ember.Handlebars")]),
            absolute_names: table(&[
                ("Ember.Object", "Ember.Object"),
                ("Ember.Array", "Ember.Array"),
                ("Ember.Error", "Ember.Error"),
                ("Ember.String", "Ember.String"),
                ("Ember.Function", "Ember.Function"),
            ]),
            excluded_prefixes: strings(&["Ember.Test", "Ember.Templates.helpers"]),
            ambient_types: strings(&["Transition", "Descriptor", "JQuery"]),
            generics: IndexMap::from([("Ember.NativeArray".to_string(), strings(&["T = any"]))]),
            extra_implements: IndexMap::from([(
                "Ember.NativeArray".to_string(),
                strings(&["Array<T>"]),
            )]),
        }
    }
}

impl GenerateConfig {
    /// Parse a TOML configuration.
    pub fn from_toml(src: &str) -> GenerateResult<Self> {
        Ok(toml::from_str(src)?)
    }

    /// Load a configuration file, falling back to the defaults when it does
    /// not exist.
    pub fn load_or_default(path: &Path) -> GenerateResult<Self> {
        match fs::read_to_string(path) {
            Ok(src) => Self::from_toml(&src),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Whether `full_name` is excluded: equal to a prefix or nested under one.
    pub fn is_excluded(&self, full_name: &str) -> bool {
        self.excluded_prefixes.iter().any(|prefix| {
            full_name == prefix
                || full_name
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    }

    /// Translate a namespace path through the alias table.
    ///
    /// Matches the whole path or a leading dotted prefix of it.
    pub fn canonical_namespace(&self, path: &str) -> String {
        for (alias, canonical) in &self.namespace_aliases {
            if path == alias {
                return canonical.clone();
            }
            if let Some(rest) = path.strip_prefix(alias.as_str()) {
                if rest.starts_with('.') {
                    return format!("{}{}", canonical, rest);
                }
            }
        }
        path.to_string()
    }
}

fn table(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
