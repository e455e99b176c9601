//! package.json document model
//!
//! Handles:
//! - dependencies
//! - devDependencies
//! - peerDependencies
//! - optionalDependencies
//! - bundledDependencies (object form only)
//!
//! Key order of the document is kept through `serde_json`'s `preserve_order`.

use super::formatting::ManifestFormatting;
use crate::domain::{Dependency, DependencyGroup};
use crate::error::ManifestError;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// A loaded package.json with its original formatting
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    document: Map<String, Value>,
    formatting: ManifestFormatting,
}

impl Manifest {
    /// Read and parse package.json at `path`
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        if !path.exists() {
            return Err(ManifestError::not_found(path));
        }
        let content = super::read_manifest(path)?;
        Self::parse(path, &content)
    }

    /// Parse package.json content; `path` is kept for saving and error messages
    pub fn parse(path: &Path, content: &str) -> Result<Self, ManifestError> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| ManifestError::json_parse_error(path, e.to_string()))?;

        let Value::Object(document) = value else {
            return Err(ManifestError::NotAnObject {
                path: path.to_path_buf(),
            });
        };

        Ok(Self {
            path: path.to_path_buf(),
            document,
            formatting: ManifestFormatting::detect(content),
        })
    }

    /// Declared dependencies of the given groups, in group order then key order
    ///
    /// Groups that are not objects and entries that are not strings are ignored.
    pub fn dependencies(&self, groups: &[DependencyGroup]) -> Vec<Dependency> {
        let mut groups = groups.to_vec();
        groups.sort();
        groups.dedup();

        let mut dependencies = Vec::new();
        for group in groups {
            let Some(entries) = self.document.get(group.key()).and_then(Value::as_object) else {
                continue;
            };
            for (name, range) in entries {
                if let Some(range) = range.as_str() {
                    dependencies.push(Dependency::new(name.clone(), range, group));
                }
            }
        }
        dependencies
    }

    /// Current range of one entry
    pub fn range(&self, group: DependencyGroup, name: &str) -> Option<&str> {
        self.document
            .get(group.key())
            .and_then(Value::as_object)
            .and_then(|entries| entries.get(name))
            .and_then(Value::as_str)
    }

    /// Replace the range of an existing entry in place
    ///
    /// Returns false when the entry does not exist; key position is unchanged.
    pub fn set_range(&mut self, group: DependencyGroup, name: &str, range: &str) -> bool {
        let Some(entries) = self
            .document
            .get_mut(group.key())
            .and_then(Value::as_object_mut)
        else {
            return false;
        };
        match entries.get_mut(name) {
            Some(value) if value.is_string() => {
                *value = Value::String(range.to_string());
                true
            }
            _ => false,
        }
    }

    /// Serialize the document with the captured formatting
    pub fn render(&self) -> Result<String, ManifestError> {
        let mut out = Vec::new();
        let result = match self.formatting.indent.unit() {
            Some(unit) => {
                let formatter = PrettyFormatter::with_indent(&unit);
                let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
                self.document.serialize(&mut serializer)
            }
            None => {
                let mut serializer = serde_json::Serializer::new(&mut out);
                self.document.serialize(&mut serializer)
            }
        };
        result.map_err(|e| ManifestError::SerializeError {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        let mut rendered = String::from_utf8(out).map_err(|e| ManifestError::SerializeError {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        if self.formatting.trailing_newline {
            rendered.push('\n');
        }
        Ok(rendered)
    }

    /// Persist the document atomically at its original path
    pub fn save(&self) -> Result<(), ManifestError> {
        let content = self.render()?;
        super::write_manifest(&self.path, &content)
    }
}
