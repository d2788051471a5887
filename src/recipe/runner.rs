//! Fixpoint execution of a recipe catalog over a project tree.
//!
//! The runner holds working copies of every candidate file in memory and
//! applies the catalog in passes until a full pass changes nothing (or the
//! cycle bound is reached). Because every recipe treats "prospective value
//! equals current value" as no-change, the loop converges instead of
//! oscillating; the bound is a backstop, not the termination mechanism.

use super::{ExecutionContext, Recipe};
use crate::diff::{DiffSummary, unified_diff};
use crate::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// How many times scheduled follow-up recipes may themselves schedule more
/// work within one pass before the runner stops draining.
const MAX_SCHEDULE_DEPTH: usize = 8;

/// Default bound on catalog passes.
const DEFAULT_MAX_CYCLES: usize = 3;

/// One file's before/after state.
#[derive(Debug, Clone)]
pub struct FileChange {
    pub path: PathBuf,
    pub original: String,
    pub transformed: String,
}

impl FileChange {
    /// Returns true if the content was modified.
    pub fn is_modified(&self) -> bool {
        self.original != self.transformed
    }

    /// Writes the transformed content to disk.
    pub fn write(&self) -> Result<()> {
        if self.is_modified() {
            fs::write(&self.path, &self.transformed)?;
        }
        Ok(())
    }
}

/// A recipe failure on one file. Failures never abort the run.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeFailure {
    pub recipe: String,
    pub path: PathBuf,
    pub message: String,
}

/// Machine-readable summary of a run.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    /// Passes actually executed.
    pub cycles: usize,
    /// False when the cycle bound was hit while changes were still being
    /// produced — a non-idempotent recipe, which is a bug.
    pub converged: bool,
    pub files_scanned: usize,
    pub files_modified: usize,
    pub failures: Vec<RecipeFailure>,
    /// Unconsumed message-channel entries, e.g. a dependency the host build
    /// tool must add.
    pub signals: Vec<(String, String)>,
}

/// The result of a migration run.
pub struct RunResult {
    pub changes: Vec<FileChange>,
    pub summary: DiffSummary,
    pub report: RunReport,
}

impl RunResult {
    /// Returns the number of files that were modified.
    pub fn files_modified(&self) -> usize {
        self.changes.iter().filter(|c| c.is_modified()).count()
    }

    /// Generates a unified diff of all changes.
    pub fn diff(&self) -> String {
        self.changes
            .iter()
            .filter(|c| c.is_modified())
            .map(|c| unified_diff(&c.original, &c.transformed, &c.path))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Builder for executing recipes against a project directory.
pub struct MigrationRun {
    root: PathBuf,
    recipes: Vec<Box<dyn Recipe>>,
    dry_run: bool,
    max_cycles: usize,
}

impl MigrationRun {
    /// Creates a run rooted at the given project directory.
    pub fn in_project(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            recipes: Vec::new(),
            dry_run: false,
            max_cycles: DEFAULT_MAX_CYCLES,
        }
    }

    /// Adds a recipe to the catalog for this run.
    pub fn recipe(mut self, recipe: Box<dyn Recipe>) -> Self {
        self.recipes.push(recipe);
        self
    }

    /// Adds several recipes.
    pub fn recipes(mut self, recipes: impl IntoIterator<Item = Box<dyn Recipe>>) -> Self {
        self.recipes.extend(recipes);
        self
    }

    /// Enables dry-run mode (preview changes without writing).
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Overrides the pass bound.
    pub fn max_cycles(mut self, cycles: usize) -> Self {
        self.max_cycles = cycles.max(1);
        self
    }

    /// Executes the catalog to a fixpoint and returns the result.
    pub fn apply(self) -> Result<RunResult> {
        let mut ctx = ExecutionContext::new();
        let mut report = RunReport::default();

        // Union of every recipe's candidate files, with working copies held
        // in memory so dry runs and multi-pass execution see prior edits.
        let mut working: BTreeMap<PathBuf, String> = BTreeMap::new();
        for recipe in &self.recipes {
            for path in recipe.file_matcher().collect(&self.root)? {
                if !working.contains_key(&path) {
                    if let Ok(content) = fs::read_to_string(&path) {
                        working.insert(path, content);
                    }
                }
            }
        }
        report.files_scanned = working.len();
        let originals = working.clone();

        for _ in 0..self.max_cycles {
            report.cycles += 1;
            let mut changed = false;
            for recipe in &self.recipes {
                changed |=
                    self.run_pass(recipe.as_ref(), &mut working, &mut ctx, &mut report)?;
                // Follow-ups run on the result of the pass that scheduled
                // them, never concurrently with it.
                let mut depth = 0;
                loop {
                    let pending = ctx.take_scheduled();
                    if pending.is_empty() || depth >= MAX_SCHEDULE_DEPTH {
                        break;
                    }
                    depth += 1;
                    for follow_up in &pending {
                        changed |= self.run_pass(
                            follow_up.as_ref(),
                            &mut working,
                            &mut ctx,
                            &mut report,
                        )?;
                    }
                }
            }
            if !changed {
                report.converged = true;
                break;
            }
        }

        let changes: Vec<FileChange> = originals
            .into_iter()
            .map(|(path, original)| {
                let transformed = working.remove(&path).unwrap_or_else(|| original.clone());
                FileChange {
                    path,
                    original,
                    transformed,
                }
            })
            .collect();

        let mut summary = DiffSummary::default();
        for change in &changes {
            summary.merge(&DiffSummary::from_texts(
                &change.original,
                &change.transformed,
            ));
        }
        report.files_modified = changes.iter().filter(|c| c.is_modified()).count();
        report.signals = ctx.drain_messages();

        if !self.dry_run {
            for change in &changes {
                change.write()?;
            }
        }

        Ok(RunResult {
            changes,
            summary,
            report,
        })
    }

    fn run_pass(
        &self,
        recipe: &dyn Recipe,
        working: &mut BTreeMap<PathBuf, String>,
        ctx: &mut ExecutionContext,
        report: &mut RunReport,
    ) -> Result<bool> {
        let matcher = recipe.file_matcher();
        let mut updates: Vec<(PathBuf, String)> = Vec::new();

        for (path, content) in working.iter() {
            if !matcher.matches(&self.root, path, content)? {
                continue;
            }
            match recipe.run(content, path, ctx) {
                Ok(output) => {
                    if output != *content {
                        updates.push((path.clone(), output));
                    }
                }
                Err(e) => report.failures.push(RecipeFailure {
                    recipe: recipe.name().to_string(),
                    path: path.clone(),
                    message: e.to_string(),
                }),
            }
        }

        let changed = !updates.is_empty();
        for (path, output) in updates {
            working.insert(path, output);
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::FileMatcher;
    use std::io::Write;
    use tempfile::TempDir;

    /// Replaces literal text; used to exercise the runner machinery.
    struct Replace {
        needle: &'static str,
        replacement: &'static str,
    }

    impl Recipe for Replace {
        fn name(&self) -> &str {
            "replace"
        }
        fn description(&self) -> &str {
            "test replace"
        }
        fn file_matcher(&self) -> FileMatcher {
            FileMatcher::new().extension("properties")
        }
        fn run(&self, source: &str, _path: &Path, _ctx: &mut ExecutionContext) -> Result<String> {
            Ok(source.replace(self.needle, self.replacement))
        }
    }

    /// Posts a message on change; a scheduled follow-up consumes it.
    struct Trigger;

    impl Recipe for Trigger {
        fn name(&self) -> &str {
            "trigger"
        }
        fn description(&self) -> &str {
            "test trigger"
        }
        fn file_matcher(&self) -> FileMatcher {
            FileMatcher::new().extension("properties")
        }
        fn run(&self, source: &str, _path: &Path, ctx: &mut ExecutionContext) -> Result<String> {
            if source.contains("legacy") {
                ctx.put_message("needs-marker", "true");
                ctx.schedule(Box::new(Consumer));
                return Ok(source.replace("legacy", "modern"));
            }
            Ok(source.to_string())
        }
    }

    struct Consumer;

    impl Recipe for Consumer {
        fn name(&self) -> &str {
            "consumer"
        }
        fn description(&self) -> &str {
            "test consumer"
        }
        fn file_matcher(&self) -> FileMatcher {
            FileMatcher::new().extension("properties")
        }
        fn run(&self, source: &str, _path: &Path, ctx: &mut ExecutionContext) -> Result<String> {
            if ctx.poll_message("needs-marker").is_some() && !source.contains("# marker") {
                return Ok(format!("# marker\n{source}"));
            }
            Ok(source.to_string())
        }
    }

    fn project_with(content: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::File::create(dir.path().join("application.properties"))
            .unwrap()
            .write_all(content.as_bytes())
            .unwrap();
        dir
    }

    #[test]
    fn test_run_converges_and_writes() {
        let dir = project_with("server.port=8080\n");
        let result = MigrationRun::in_project(dir.path())
            .recipe(Box::new(Replace {
                needle: "8080",
                replacement: "9090",
            }))
            .apply()
            .unwrap();

        assert!(result.report.converged);
        assert_eq!(result.files_modified(), 1);
        let content =
            std::fs::read_to_string(dir.path().join("application.properties")).unwrap();
        assert_eq!(content, "server.port=9090\n");
    }

    #[test]
    fn test_dry_run_leaves_disk_untouched() {
        let dir = project_with("server.port=8080\n");
        let result = MigrationRun::in_project(dir.path())
            .recipe(Box::new(Replace {
                needle: "8080",
                replacement: "9090",
            }))
            .dry_run()
            .apply()
            .unwrap();

        assert_eq!(result.files_modified(), 1);
        assert!(result.diff().contains("-server.port=8080"));
        let content =
            std::fs::read_to_string(dir.path().join("application.properties")).unwrap();
        assert_eq!(content, "server.port=8080\n");
    }

    #[test]
    fn test_second_run_is_noop() {
        let dir = project_with("server.port=8080\n");
        let run = || {
            MigrationRun::in_project(dir.path())
                .recipe(Box::new(Replace {
                    needle: "8080",
                    replacement: "9090",
                }))
                .apply()
                .unwrap()
        };
        assert_eq!(run().files_modified(), 1);
        assert_eq!(run().files_modified(), 0);
    }

    #[test]
    fn test_scheduled_recipe_sees_triggering_pass_result() {
        let dir = project_with("mode=legacy\n");
        let result = MigrationRun::in_project(dir.path())
            .recipe(Box::new(Trigger))
            .apply()
            .unwrap();

        assert!(result.report.converged);
        let content =
            std::fs::read_to_string(dir.path().join("application.properties")).unwrap();
        assert_eq!(content, "# marker\nmode=modern\n");
        // The message was consumed, so it is not a leftover signal.
        assert!(result.report.signals.is_empty());
    }

    #[test]
    fn test_unconsumed_message_surfaces_as_signal() {
        struct PostOnly;
        impl Recipe for PostOnly {
            fn name(&self) -> &str {
                "post-only"
            }
            fn description(&self) -> &str {
                "posts a message"
            }
            fn file_matcher(&self) -> FileMatcher {
                FileMatcher::new().extension("properties")
            }
            fn run(
                &self,
                source: &str,
                _path: &Path,
                ctx: &mut ExecutionContext,
            ) -> Result<String> {
                ctx.put_message("dependency.javax-validation", "required");
                Ok(source.to_string())
            }
        }

        let dir = project_with("a=1\n");
        let result = MigrationRun::in_project(dir.path())
            .recipe(Box::new(PostOnly))
            .apply()
            .unwrap();
        assert_eq!(
            result.report.signals,
            vec![("dependency.javax-validation".into(), "required".into())]
        );
    }
}
