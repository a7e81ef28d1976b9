// Copyright 2024 Fedora Modularity Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Reading the translatable parts of modulemd documents.
//!
//! Koji stores the complete modulemd YAML of every module build. Only
//! a few of its fields are meant for humans: the summary, the
//! description and the descriptions of the installation profiles.

use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModulemdError {
    #[error("Invalid modulemd YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Expected exactly one modulemd document, found {0}")]
    DocumentCount(usize),
}

/// The human readable fields of a module stream.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ModuleDocument {
    pub name: Option<String>,
    pub stream: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    /// Profile name to profile description.
    pub profiles: BTreeMap<String, String>,
}

/// A string to translate, together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatableString {
    /// Source reference, e.g. `nodejs;10;summary`.
    pub source: String,
    pub text: String,
}

#[derive(Deserialize)]
struct Data {
    name: Option<serde_yaml::Value>,
    stream: Option<serde_yaml::Value>,
    summary: Option<String>,
    description: Option<String>,
    #[serde(default)]
    profiles: BTreeMap<String, Profile>,
}

#[derive(Deserialize)]
struct Profile {
    description: Option<String>,
}

/// Render a YAML scalar as text. Streams such as `10` or `5.26` are
/// numbers as far as YAML is concerned.
fn scalar(value: serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl ModuleDocument {
    /// Parse the modulemd stream document in `yaml`.
    ///
    /// Other documents in the same stream, such as `modulemd-defaults`,
    /// are ignored, but there must be exactly one `modulemd` document.
    pub fn parse(yaml: &str) -> Result<ModuleDocument, ModulemdError> {
        let mut documents = Vec::new();
        for document in serde_yaml::Deserializer::from_str(yaml) {
            let value = serde_yaml::Value::deserialize(document)?;
            if value.get("document").and_then(serde_yaml::Value::as_str) != Some("modulemd") {
                continue;
            }
            let data = value.get("data").cloned().unwrap_or_default();
            documents.push(serde_yaml::from_value::<Data>(data)?);
        }

        if documents.len() != 1 {
            return Err(ModulemdError::DocumentCount(documents.len()));
        }
        let data = documents.remove(0);
        Ok(ModuleDocument {
            name: data.name.and_then(scalar),
            stream: data.stream.and_then(scalar),
            summary: data.summary,
            description: data.description,
            profiles: data
                .profiles
                .into_iter()
                .filter_map(|(name, profile)| Some((name, profile.description?)))
                .collect(),
        })
    }

    /// The strings to translate, labeled with `name;stream;field`
    /// source references. Blank fields are skipped.
    pub fn translatable_strings(&self, name: &str, stream: &str) -> Vec<TranslatableString> {
        let mut strings = Vec::new();
        let mut push = |field: String, text: &Option<String>| {
            if let Some(text) = text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
                strings.push(TranslatableString {
                    source: format!("{name};{stream};{field}"),
                    text: String::from(text),
                });
            }
        };

        push(String::from("summary"), &self.summary);
        push(String::from("description"), &self.description);
        for (profile, description) in &self.profiles {
            push(
                format!("profile;{profile};description"),
                &Some(description.clone()),
            );
        }
        strings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NODEJS: &str = "\
document: modulemd
version: 2
data:
  name: nodejs
  stream: 10
  summary: Javascript runtime
  description: >-
    Node.js is a platform built on Chrome's JavaScript runtime.
  license:
    module: [MIT]
  profiles:
    default:
      description: The default installation.
      rpms: [nodejs, npm]
    development:
      rpms: [nodejs-devel]
";

    #[test]
    fn test_parse() {
        let doc = ModuleDocument::parse(NODEJS).unwrap();
        assert_eq!(
            doc,
            ModuleDocument {
                name: Some(String::from("nodejs")),
                stream: Some(String::from("10")),
                summary: Some(String::from("Javascript runtime")),
                description: Some(String::from(
                    "Node.js is a platform built on Chrome's JavaScript runtime."
                )),
                profiles: BTreeMap::from([(
                    String::from("default"),
                    String::from("The default installation.")
                )]),
            }
        );
    }

    #[test]
    fn test_parse_skips_other_documents() {
        let yaml = format!(
            "---\ndocument: modulemd-defaults\nversion: 1\ndata:\n  module: nodejs\n...\n---\n{NODEJS}"
        );
        let doc = ModuleDocument::parse(&yaml).unwrap();
        assert_eq!(doc.name.as_deref(), Some("nodejs"));
    }

    #[test]
    fn test_parse_no_modulemd() {
        assert!(matches!(
            ModuleDocument::parse("document: modulemd-defaults\ndata: {}\n"),
            Err(ModulemdError::DocumentCount(0))
        ));
    }

    #[test]
    fn test_parse_two_modulemds() {
        let yaml = format!("---\n{NODEJS}---\n{NODEJS}");
        assert!(matches!(
            ModuleDocument::parse(&yaml),
            Err(ModulemdError::DocumentCount(2))
        ));
    }

    #[test]
    fn test_parse_invalid_yaml() {
        assert!(matches!(
            ModuleDocument::parse("document: modulemd\ndata: [unclosed\n"),
            Err(ModulemdError::Yaml(_))
        ));
    }

    #[test]
    fn test_translatable_strings() {
        let doc = ModuleDocument::parse(NODEJS).unwrap();
        assert_eq!(
            doc.translatable_strings("nodejs", "10")
                .iter()
                .map(|s| (s.source.as_str(), s.text.as_str()))
                .collect::<Vec<_>>(),
            &[
                ("nodejs;10;summary", "Javascript runtime"),
                (
                    "nodejs;10;description",
                    "Node.js is a platform built on Chrome's JavaScript runtime."
                ),
                (
                    "nodejs;10;profile;default;description",
                    "The default installation."
                ),
            ]
        );
    }

    #[test]
    fn test_translatable_strings_skips_blank_fields() {
        let doc = ModuleDocument {
            summary: Some(String::from("  ")),
            description: None,
            ..ModuleDocument::default()
        };
        assert!(doc.translatable_strings("foo", "bar").is_empty());
    }
}
