//! File matching predicates for recipe targeting.

use crate::error::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Predicates selecting the files a recipe applies to.
#[derive(Default, Clone)]
pub struct FileMatcher {
    extensions: Vec<String>,
    include_globs: Vec<String>,
    exclude_globs: Vec<String>,
    content_patterns: Vec<String>,
}

impl FileMatcher {
    /// Creates a new file matcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Matches files with the given extension (without dot).
    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.extensions.push(ext.into());
        self
    }

    /// Matches files with any of the given extensions.
    pub fn extensions(mut self, exts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extensions.extend(exts.into_iter().map(Into::into));
        self
    }

    /// Includes files matching the glob pattern.
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include_globs.push(pattern.into());
        self
    }

    /// Excludes files matching the glob pattern.
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_globs.push(pattern.into());
        self
    }

    /// Matches files whose content contains the given regex pattern.
    pub fn contains_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.content_patterns.push(pattern.into());
        self
    }

    /// Collects all matching files from the given root directory.
    pub fn collect(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut matched = Vec::new();
        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let content_ok = |path: &Path| -> Result<bool> {
                if self.content_patterns.is_empty() {
                    return Ok(true);
                }
                match fs::read_to_string(path) {
                    Ok(content) => self.content_matches(&content),
                    Err(_) => Ok(false),
                }
            };
            if self.path_matches(root, path)? && content_ok(path)? {
                matched.push(path.to_path_buf());
            }
        }
        Ok(matched)
    }

    /// Tests a path (with content already in memory) against all predicates.
    /// Used by the runner, which holds working copies of files between
    /// recipe passes and cannot re-read them from disk.
    pub fn matches(&self, root: &Path, path: &Path, content: &str) -> Result<bool> {
        Ok(self.path_matches(root, path)? && self.content_matches(content)?)
    }

    fn path_matches(&self, root: &Path, path: &Path) -> Result<bool> {
        if !self.extensions.is_empty() {
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if !self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
                return Ok(false);
            }
        }

        let rel_path = path.strip_prefix(root).unwrap_or(path);
        if !self.include_globs.is_empty()
            && !build_glob_set(&self.include_globs)?.is_match(rel_path)
        {
            return Ok(false);
        }
        if !self.exclude_globs.is_empty()
            && build_glob_set(&self.exclude_globs)?.is_match(rel_path)
        {
            return Ok(false);
        }
        Ok(true)
    }

    fn content_matches(&self, content: &str) -> Result<bool> {
        for pattern in &self.content_patterns {
            if !Regex::new(pattern)?.is_match(content) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// The conventional matcher for Spring configuration files.
pub fn spring_config_files() -> FileMatcher {
    FileMatcher::new()
        .extensions(["properties", "yml", "yaml"])
        .exclude("**/target/**")
        .exclude("**/build/**")
}

/// The conventional matcher for Java sources.
pub fn java_sources() -> FileMatcher {
    FileMatcher::new()
        .extension("java")
        .exclude("**/target/**")
        .exclude("**/build/**")
}
