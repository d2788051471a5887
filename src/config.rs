//! One interface over the three physical encodings of a Spring
//! configuration key: a dotted Properties key, a dotted YAML scalar key,
//! and a nested YAML mapping path. Recipes read and write "the value at
//! key K" here and never care which encoding the file uses.

use crate::error::Result;
use crate::matcher::PropertyKeyMatcher;
use crate::properties::PropertiesDocument;
use crate::text::TextEdit;
use crate::yaml::YamlDocument;
use std::path::Path;

/// A configuration file in either format.
pub enum ConfigFile {
    Properties(PropertiesDocument),
    Yaml(YamlDocument),
}

/// A leaf key/value occurrence, addressable for edits via its index.
#[derive(Debug, Clone)]
pub struct ConfigEntry {
    /// Flattened dotted key.
    pub key: String,
    /// Current value text.
    pub value: String,
    pub(crate) index: usize,
}

impl ConfigFile {
    /// Parses the file according to its extension. Returns None for paths
    /// that are not configuration files.
    pub fn parse(source: &str, path: &Path) -> Result<Option<Self>> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "properties" => Ok(Some(Self::Properties(PropertiesDocument::parse(source)))),
            "yml" | "yaml" => {
                let doc = YamlDocument::parse(source)?;
                // A file that does not parse cleanly is skipped rather than
                // risk a corrupting edit.
                if doc.has_errors() {
                    return Ok(None);
                }
                Ok(Some(Self::Yaml(doc)))
            }
            _ => Ok(None),
        }
    }

    /// The original source text.
    pub fn source(&self) -> &str {
        match self {
            Self::Properties(doc) => doc.source(),
            Self::Yaml(doc) => doc.source(),
        }
    }

    /// All leaf entries in file order.
    pub fn entries(&self) -> Vec<ConfigEntry> {
        match self {
            Self::Properties(doc) => doc
                .entries()
                .iter()
                .enumerate()
                .map(|(index, e)| ConfigEntry {
                    key: e.key.clone(),
                    value: e.value.clone(),
                    index,
                })
                .collect(),
            Self::Yaml(doc) => doc
                .pairs()
                .iter()
                .enumerate()
                .filter(|(_, p)| p.is_leaf())
                .map(|(index, p)| ConfigEntry {
                    key: p.flat_key(),
                    value: p.value_text.clone().unwrap_or_default(),
                    index,
                })
                .collect(),
        }
    }

    /// Entries whose key matches.
    pub fn find(&self, matcher: &PropertyKeyMatcher) -> Vec<ConfigEntry> {
        self.entries()
            .into_iter()
            .filter(|e| matcher.matches(&e.key))
            .collect()
    }

    /// The value of the first matching key.
    pub fn value_of(&self, matcher: &PropertyKeyMatcher) -> Option<String> {
        self.find(matcher).into_iter().next().map(|e| e.value)
    }

    /// Replaces an entry's value.
    pub fn set_value(&self, entry: &ConfigEntry, new_value: &str) -> TextEdit {
        match self {
            Self::Properties(doc) => doc.set_value(&doc.entries()[entry.index], new_value),
            Self::Yaml(doc) => doc.set_value(&doc.pairs()[entry.index], new_value),
        }
    }

    /// Adds the key in the file's native encoding if it is absent.
    pub fn add(&self, key: &str, value: &str, comment: Option<&str>) -> Vec<TextEdit> {
        match self {
            Self::Properties(doc) => {
                let matcher = PropertyKeyMatcher::relaxed(key);
                if doc.find(&matcher).is_empty() {
                    doc.add(key, value, comment)
                } else {
                    Vec::new()
                }
            }
            Self::Yaml(doc) => doc.add(key, value, comment),
        }
    }

    /// Removes an entry (and, in YAML, any parents left empty).
    pub fn delete(&self, entry: &ConfigEntry) -> Vec<TextEdit> {
        match self {
            Self::Properties(doc) => doc.delete(&doc.entries()[entry.index]),
            Self::Yaml(doc) => doc.delete(&doc.pairs()[entry.index]),
        }
    }

    /// Comments an entry out, optionally with an explanatory header line.
    pub fn comment_out(&self, entry: &ConfigEntry, comment: &str, with_header: bool) -> Vec<TextEdit> {
        match self {
            Self::Properties(doc) => {
                doc.comment_out(&doc.entries()[entry.index], comment, with_header)
            }
            Self::Yaml(doc) => doc.comment_out(&doc.pairs()[entry.index], comment, with_header),
        }
    }

    /// Renames the matched prefix of an entry's key. None when the rename
    /// cannot be expressed in place.
    pub fn rename_key(
        &self,
        entry: &ConfigEntry,
        matcher: &PropertyKeyMatcher,
        new_prefix: &str,
    ) -> Option<TextEdit> {
        match self {
            Self::Properties(doc) => {
                doc.rename_key(&doc.entries()[entry.index], matcher, new_prefix)
            }
            Self::Yaml(doc) => doc.rename_key(&doc.pairs()[entry.index], matcher, new_prefix),
        }
    }

    /// Deletes the key (and its whole subtree, for a YAML mapping node).
    pub fn delete_key(&self, matcher: &PropertyKeyMatcher) -> Vec<TextEdit> {
        match self {
            Self::Properties(doc) => doc
                .entries()
                .iter()
                .filter(|e| matcher.matches_key_or_subkey(&e.key))
                .flat_map(|e| doc.delete(e))
                .collect(),
            Self::Yaml(doc) => doc
                .pairs()
                .iter()
                .filter(|p| matcher.matches_path(&p.segments()))
                .flat_map(|p| doc.delete(p))
                .collect(),
        }
    }

    /// Comments the key out. Adjacent Properties entries under the same key
    /// collapse beneath a single header comment.
    pub fn comment_out_key(&self, matcher: &PropertyKeyMatcher, comment: &str) -> Vec<TextEdit> {
        match self {
            Self::Properties(doc) => {
                let mut edits = Vec::new();
                let mut first = true;
                for entry in doc
                    .entries()
                    .iter()
                    .filter(|e| matcher.matches_key_or_subkey(&e.key))
                {
                    edits.extend(doc.comment_out(entry, comment, first));
                    first = false;
                }
                edits
            }
            Self::Yaml(doc) => doc
                .pairs()
                .iter()
                .filter(|p| matcher.matches_path(&p.segments()))
                .flat_map(|p| doc.comment_out(p, comment, true))
                .collect(),
        }
    }

    /// Renames a key prefix across the file, skipping excepted subkeys.
    ///
    /// Declines entirely (empty plan) when the new key already exists — a
    /// merge would need value reconciliation — or when, in YAML, an
    /// excepted subkey sits inside the mapping node that would be renamed
    /// wholesale.
    pub fn rename_key_edits(
        &self,
        matcher: &PropertyKeyMatcher,
        new_prefix: &str,
        exceptions: &[PropertyKeyMatcher],
    ) -> Vec<TextEdit> {
        let collision = PropertyKeyMatcher::new(new_prefix, matcher.is_relaxed());
        if self
            .entries()
            .iter()
            .any(|e| collision.matches_key_or_subkey(&e.key))
        {
            return Vec::new();
        }

        match self {
            Self::Properties(doc) => doc
                .entries()
                .iter()
                .filter(|e| {
                    !exceptions
                        .iter()
                        .any(|ex| ex.matches_key_or_subkey(&e.key))
                })
                .filter_map(|e| doc.rename_key(e, matcher, new_prefix))
                .collect(),
            Self::Yaml(doc) => {
                let excepted = doc.pairs().iter().any(|p| {
                    exceptions
                        .iter()
                        .any(|ex| ex.matches_key_or_subkey(&p.flat_key()))
                });
                if excepted {
                    return Vec::new();
                }
                doc.pairs()
                    .iter()
                    .filter_map(|p| doc.rename_key(p, matcher, new_prefix))
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::apply_edits;

    #[test]
    fn test_same_logical_key_across_encodings() {
        let properties = ConfigFile::parse("server.servlet.path=/tmp/x\n", Path::new("a.properties"))
            .unwrap()
            .unwrap();
        let nested = ConfigFile::parse(
            "server:\n  servlet:\n    path: /tmp/x\n",
            Path::new("a.yml"),
        )
        .unwrap()
        .unwrap();
        let dotted = ConfigFile::parse("server.servlet.path: /tmp/x\n", Path::new("a.yaml"))
            .unwrap()
            .unwrap();

        let matcher = PropertyKeyMatcher::relaxed("server.servletPath");
        for file in [&properties, &nested, &dotted] {
            assert_eq!(file.value_of(&matcher).as_deref(), Some("/tmp/x"));
        }
    }

    #[test]
    fn test_add_uses_native_encoding() {
        let properties = ConfigFile::parse("", Path::new("a.properties")).unwrap().unwrap();
        let out = apply_edits("", properties.add("server.servlet.path", "/tmp/x", None)).unwrap();
        assert_eq!(out, "server.servlet.path=/tmp/x\n");

        let yaml = ConfigFile::parse("", Path::new("a.yml")).unwrap().unwrap();
        let out = apply_edits("", yaml.add("server.servlet.path", "/tmp/x", None)).unwrap();
        assert_eq!(out, "server:\n  servlet:\n    path: /tmp/x\n");
    }

    #[test]
    fn test_non_config_path() {
        assert!(ConfigFile::parse("x", Path::new("App.java")).unwrap().is_none());
    }
}
