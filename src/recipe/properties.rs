//! Recipes over Spring configuration files (`.properties`, `.yml`).
//!
//! Every recipe here goes through [`ConfigFile`], so a logical key is
//! handled the same whether it is written as a dotted Properties key, a
//! dotted YAML scalar, or a nested YAML mapping. All of them recompute the
//! prospective value and produce no edit when it equals the current one,
//! which is what makes a second run a no-op.

use super::{ExecutionContext, Recipe};
use crate::config::ConfigFile;
use crate::error::Result;
use crate::matcher::{FileMatcher, PropertyKeyMatcher, file};
use crate::text::apply_edits;
use crate::yaml::YamlDocument;
use regex::Regex;
use std::path::Path;

/// Adds a configuration key if it is absent, in the file's native encoding.
pub struct AddSpringProperty {
    property: String,
    value: String,
    comment: Option<String>,
}

impl AddSpringProperty {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            comment: None,
        }
    }

    /// Adds an explanatory comment above the inserted entry.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

impl Recipe for AddSpringProperty {
    fn name(&self) -> &str {
        "add-spring-property"
    }

    fn description(&self) -> &str {
        "Add a configuration property if it is not already present"
    }

    fn file_matcher(&self) -> FileMatcher {
        file::spring_config_files()
    }

    fn run(&self, source: &str, path: &Path, _ctx: &mut ExecutionContext) -> Result<String> {
        let Some(config) = ConfigFile::parse(source, path)? else {
            return Ok(source.to_string());
        };
        let edits = config.add(&self.property, &self.value, self.comment.as_deref());
        apply_edits(source, edits)
    }
}

/// Renames a configuration key and its subkeys, minus exceptions.
pub struct ChangeSpringPropertyKey {
    old: String,
    new: String,
    except: Vec<String>,
    relaxed: bool,
}

impl ChangeSpringPropertyKey {
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
            except: Vec::new(),
            relaxed: true,
        }
    }

    /// Excludes a subkey (relative to the old key) from the rename.
    pub fn except(mut self, subkey: impl Into<String>) -> Self {
        self.except.push(subkey.into());
        self
    }

    /// Requires verbatim key text instead of relaxed binding.
    pub fn exact(mut self) -> Self {
        self.relaxed = false;
        self
    }
}

impl Recipe for ChangeSpringPropertyKey {
    fn name(&self) -> &str {
        "change-spring-property-key"
    }

    fn description(&self) -> &str {
        "Rename a configuration property key, keeping subkeys"
    }

    fn file_matcher(&self) -> FileMatcher {
        file::spring_config_files()
    }

    fn run(&self, source: &str, path: &Path, _ctx: &mut ExecutionContext) -> Result<String> {
        let Some(config) = ConfigFile::parse(source, path)? else {
            return Ok(source.to_string());
        };
        let matcher = PropertyKeyMatcher::new(&self.old, self.relaxed);
        let exceptions: Vec<PropertyKeyMatcher> = self
            .except
            .iter()
            .map(|sub| PropertyKeyMatcher::new(format!("{}.{}", self.old, sub), self.relaxed))
            .collect();
        let edits = config.rename_key_edits(&matcher, &self.new, &exceptions);
        apply_edits(source, edits)
    }
}

/// Sets or rewrites the value of a configuration key.
pub struct ChangeSpringPropertyValue {
    property: String,
    new_value: String,
    old_value: Option<String>,
    regex: bool,
    relaxed: bool,
}

impl ChangeSpringPropertyValue {
    pub fn new(property: impl Into<String>, new_value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            new_value: new_value.into(),
            old_value: None,
            regex: false,
            relaxed: true,
        }
    }

    /// Only changes entries whose current value equals (or, in regex mode,
    /// matches) this value.
    pub fn when_old_value(mut self, old_value: impl Into<String>) -> Self {
        self.old_value = Some(old_value.into());
        self
    }

    /// Treats the old value as a regex and the new value as its
    /// replacement, with capture-group references.
    pub fn regex(mut self) -> Self {
        self.regex = true;
        self
    }

    /// Requires verbatim key text instead of relaxed binding.
    pub fn exact(mut self) -> Self {
        self.relaxed = false;
        self
    }

    /// The prospective value for an entry, or None to leave it alone.
    fn next_value(&self, current: &str) -> Result<Option<String>> {
        match (&self.old_value, self.regex) {
            (Some(pattern), true) => {
                let re = Regex::new(pattern)?;
                if !re.is_match(current) {
                    return Ok(None);
                }
                Ok(Some(re.replace_all(current, self.new_value.as_str()).into_owned()))
            }
            (Some(old), false) => {
                if current == old {
                    Ok(Some(self.new_value.clone()))
                } else {
                    Ok(None)
                }
            }
            (None, _) => Ok(Some(self.new_value.clone())),
        }
    }
}

impl Recipe for ChangeSpringPropertyValue {
    fn name(&self) -> &str {
        "change-spring-property-value"
    }

    fn description(&self) -> &str {
        "Change the value of a configuration property"
    }

    fn file_matcher(&self) -> FileMatcher {
        file::spring_config_files()
    }

    fn run(&self, source: &str, path: &Path, _ctx: &mut ExecutionContext) -> Result<String> {
        let Some(config) = ConfigFile::parse(source, path)? else {
            return Ok(source.to_string());
        };
        let matcher = PropertyKeyMatcher::new(&self.property, self.relaxed);
        let mut edits = Vec::new();
        for entry in config.find(&matcher) {
            if let Some(next) = self.next_value(&entry.value)? {
                edits.push(config.set_value(&entry, &next));
            }
        }
        apply_edits(source, edits)
    }
}

/// Removes a configuration key (including its subtree).
pub struct DeleteSpringProperty {
    property: String,
    relaxed: bool,
}

impl DeleteSpringProperty {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            relaxed: true,
        }
    }

    /// Requires verbatim key text instead of relaxed binding.
    pub fn exact(mut self) -> Self {
        self.relaxed = false;
        self
    }
}

impl Recipe for DeleteSpringProperty {
    fn name(&self) -> &str {
        "delete-spring-property"
    }

    fn description(&self) -> &str {
        "Remove a configuration property and its subkeys"
    }

    fn file_matcher(&self) -> FileMatcher {
        file::spring_config_files()
    }

    fn run(&self, source: &str, path: &Path, _ctx: &mut ExecutionContext) -> Result<String> {
        let Some(config) = ConfigFile::parse(source, path)? else {
            return Ok(source.to_string());
        };
        let matcher = PropertyKeyMatcher::new(&self.property, self.relaxed);
        apply_edits(source, config.delete_key(&matcher))
    }
}

/// Comments a configuration key out under an explanatory header.
pub struct CommentOutSpringPropertyKey {
    property: String,
    comment: String,
}

impl CommentOutSpringPropertyKey {
    pub fn new(property: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            comment: comment.into(),
        }
    }
}

impl Recipe for CommentOutSpringPropertyKey {
    fn name(&self) -> &str {
        "comment-out-spring-property-key"
    }

    fn description(&self) -> &str {
        "Disable a configuration property by commenting it out"
    }

    fn file_matcher(&self) -> FileMatcher {
        file::spring_config_files()
    }

    fn run(&self, source: &str, path: &Path, _ctx: &mut ExecutionContext) -> Result<String> {
        let Some(config) = ConfigFile::parse(source, path)? else {
            return Ok(source.to_string());
        };
        let matcher = PropertyKeyMatcher::relaxed(&self.property);
        apply_edits(source, config.comment_out_key(&matcher, &self.comment))
    }
}

/// Expands dot-joined YAML scalar keys into nested mappings, coalescing
/// siblings that share a prefix.
pub struct ExpandYamlProperties;

impl Recipe for ExpandYamlProperties {
    fn name(&self) -> &str {
        "expand-yaml-properties"
    }

    fn description(&self) -> &str {
        "Rewrite dotted YAML keys into nested mappings"
    }

    fn file_matcher(&self) -> FileMatcher {
        FileMatcher::new()
            .extensions(["yml", "yaml"])
            .exclude("**/target/**")
            .exclude("**/build/**")
    }

    fn run(&self, source: &str, _path: &Path, _ctx: &mut ExecutionContext) -> Result<String> {
        let doc = YamlDocument::parse(source)?;
        if doc.has_errors() {
            return Ok(source.to_string());
        }
        apply_edits(source, doc.expand())
    }
}
