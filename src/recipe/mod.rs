//! The recipe framework: one trait per transformation rule, an execution
//! context for cross-recipe signaling, and the fixpoint runner.
//!
//! A recipe is a pure function from source text to source text. Returning
//! the input unchanged is the universal "no match / decline" answer; the
//! runner treats output equality as no-change, which is what lets it cycle
//! the whole catalog to a fixpoint. Recipes never abort a run: per-file
//! errors are recorded and the batch continues.

pub mod catalog;
pub mod java;
pub mod properties;
pub mod runner;

pub use runner::{FileChange, MigrationRun, RunReport, RunResult};

use crate::error::Result;
use crate::matcher::FileMatcher;
use std::collections::HashMap;
use std::path::Path;

/// One named source-to-source transformation rule.
pub trait Recipe: Send + Sync {
    /// Unique name for this recipe.
    fn name(&self) -> &str;

    /// Human-readable description of what this recipe does.
    fn description(&self) -> &str;

    /// The files this recipe applies to.
    fn file_matcher(&self) -> FileMatcher;

    /// Rewrites one file. Returns the new text, which equals the input when
    /// the recipe found nothing to do (or declined).
    fn run(&self, source: &str, path: &Path, ctx: &mut ExecutionContext) -> Result<String>;
}

/// Run-scoped scratch state shared by the recipes of one execution.
///
/// The message channel lets a triggering recipe signal a dependent one
/// without direct coupling: messages are read-and-clear, and whatever is
/// left unconsumed at the end of the run is surfaced in the run report for
/// the host build tooling. The schedule queue holds follow-up recipes that
/// must run on the *result* of the current pass, strictly after it.
#[derive(Default)]
pub struct ExecutionContext {
    messages: HashMap<String, String>,
    scheduled: Vec<Box<dyn Recipe>>,
}

impl ExecutionContext {
    /// Creates a fresh context. State never survives across runs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Posts a message for a dependent recipe.
    pub fn put_message(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.messages.insert(key.into(), value.into());
    }

    /// Reads and clears a message.
    pub fn poll_message(&mut self, key: &str) -> Option<String> {
        self.messages.remove(key)
    }

    /// Drains every unconsumed message, for the run report.
    pub fn drain_messages(&mut self) -> Vec<(String, String)> {
        let mut drained: Vec<_> = self.messages.drain().collect();
        drained.sort();
        drained
    }

    /// Schedules a recipe to run after the current pass completes.
    pub fn schedule(&mut self, recipe: Box<dyn Recipe>) {
        self.scheduled.push(recipe);
    }

    /// Takes the pending follow-up recipes, in scheduling order.
    pub fn take_scheduled(&mut self) -> Vec<Box<dyn Recipe>> {
        std::mem::take(&mut self.scheduled)
    }
}
