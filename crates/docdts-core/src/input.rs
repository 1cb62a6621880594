//! Serde model of the documentation data (`data.json`).
//!
//! Only the fields the pipeline reads are modeled; everything else in the
//! document is ignored. Flags in real-world data show up as booleans, `0`/`1`
//! or strings, so they all go through [`deserialize_flag`].

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::GenerateResult;

/// The whole documentation document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocFile {
    /// Class records keyed by full dotted name, in document order.
    #[serde(default)]
    pub classes: IndexMap<String, ClassRecord>,
    /// Member records, in document order.
    #[serde(default)]
    pub classitems: Vec<ItemRecord>,
}

impl DocFile {
    pub fn from_json(src: &str) -> GenerateResult<Self> {
        Ok(serde_json::from_str(src)?)
    }

    pub fn from_value(value: Value) -> GenerateResult<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRecord {
    /// Falls back to the key in [`DocFile::classes`] when absent.
    #[serde(default)]
    pub name: String,
    pub extends: Option<String>,
    #[serde(default, deserialize_with = "deserialize_names")]
    pub uses: Vec<String>,
    #[serde(default, rename = "extension_for", deserialize_with = "deserialize_names")]
    pub extension_for: Vec<String>,
    pub access: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub deprecated: bool,
    pub deprecation_message: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub class: String,
    pub name: Option<String>,
    pub itemtype: Option<String>,
    #[serde(default, rename = "static", deserialize_with = "deserialize_flag")]
    pub is_static: bool,
    pub params: Option<Vec<ParamRecord>>,
    #[serde(rename = "return")]
    pub returns: Option<ReturnRecord>,
    /// Property type.
    #[serde(rename = "type")]
    pub ty: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub chainable: bool,
    pub access: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub deprecated: bool,
    pub deprecation_message: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParamRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub optional: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReturnRecord {
    #[serde(rename = "type")]
    pub ty: Option<String>,
    pub description: Option<String>,
}

impl ClassRecord {
    pub fn is_private(&self) -> bool {
        self.access.as_deref() == Some("private")
    }

    pub fn location(&self) -> Option<String> {
        location(self.file.as_deref(), self.line)
    }
}

impl ItemRecord {
    pub fn is_private(&self) -> bool {
        self.access.as_deref() == Some("private")
    }

    /// `file:line` for diagnostics, when known.
    pub fn location(&self) -> Option<String> {
        location(self.file.as_deref(), self.line)
    }
}

fn location(file: Option<&str>, line: Option<u32>) -> Option<String> {
    match (file, line) {
        (Some(file), Some(line)) => Some(format!("{}:{}", file, line)),
        (Some(file), None) => Some(file.to_string()),
        _ => None,
    }
}

/// Accept `true`/`false`, numbers and strings as a flag.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !matches!(s.trim(), "" | "0" | "false"),
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    })
}

/// Accept a single name or a list of names.
fn deserialize_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Names {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<Names>::deserialize(deserializer)? {
        Some(Names::One(name)) => vec![name],
        Some(Names::Many(names)) => names,
        None => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classes_keep_document_order() {
        let doc = DocFile::from_value(json!({
            "classes": {
                "Zeta": { "name": "Zeta" },
                "Alpha": { "name": "Alpha" },
                "Mid": { "name": "Mid" }
            },
            "classitems": []
        }))
        .unwrap();
        let names: Vec<_> = doc.classes.keys().cloned().collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_flags_accept_numbers_and_strings() {
        let doc = DocFile::from_value(json!({
            "classitems": [
                { "class": "A", "name": "a", "static": 1, "deprecated": true },
                { "class": "A", "name": "b", "static": 0, "deprecated": "" },
                { "class": "A", "name": "c", "static": "true" }
            ]
        }))
        .unwrap();
        let items = &doc.classitems;
        assert!(items[0].is_static && items[0].deprecated);
        assert!(!items[1].is_static && !items[1].deprecated);
        assert!(items[2].is_static);
    }

    #[test]
    fn test_item_fields() {
        let doc = DocFile::from_value(json!({
            "classitems": [{
                "class": "Ember.Foo",
                "name": "bar",
                "itemtype": "method",
                "params": [{ "name": "a", "type": "String", "optional": true }],
                "return": { "type": "Boolean" },
                "access": "private",
                "deprecationMessage": "use baz",
                "file": "foo.js",
                "line": 12
            }]
        }))
        .unwrap();
        let item = &doc.classitems[0];
        assert_eq!(item.returns.as_ref().unwrap().ty.as_deref(), Some("Boolean"));
        assert!(item.params.as_ref().unwrap()[0].optional);
        assert!(item.is_private());
        assert_eq!(item.deprecation_message.as_deref(), Some("use baz"));
        assert_eq!(item.location().as_deref(), Some("foo.js:12"));
    }

    #[test]
    fn test_uses_accepts_single_name() {
        let doc = DocFile::from_value(json!({
            "classes": { "A": { "name": "A", "uses": "Ember.Evented" } }
        }))
        .unwrap();
        assert_eq!(doc.classes["A"].uses, vec!["Ember.Evented"]);
    }
}
