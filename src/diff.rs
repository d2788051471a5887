//! Diff rendering for previewing migrations.

use similar::{ChangeTag, TextDiff};
use std::fmt::Write;
use std::path::Path;

/// Generates a unified diff between the original and migrated text.
pub fn unified_diff(original: &str, modified: &str, path: &Path) -> String {
    render_diff(original, modified, path, false)
}

/// Unified diff with ANSI colors for terminal display.
pub fn colorized_diff(original: &str, modified: &str, path: &Path) -> String {
    render_diff(original, modified, path, true)
}

fn render_diff(original: &str, modified: &str, path: &Path, color: bool) -> String {
    const RED: &str = "\x1b[31m";
    const GREEN: &str = "\x1b[32m";
    const CYAN: &str = "\x1b[36m";
    const RESET: &str = "\x1b[0m";

    let paint = |code: &'static str| if color { code } else { "" };
    let diff = TextDiff::from_lines(original, modified);
    let mut output = String::new();

    writeln!(
        &mut output,
        "{}--- a/{}{}",
        paint(CYAN),
        path.display(),
        paint(RESET)
    )
    .unwrap();
    writeln!(
        &mut output,
        "{}+++ b/{}{}",
        paint(CYAN),
        path.display(),
        paint(RESET)
    )
    .unwrap();

    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            writeln!(&mut output).unwrap();
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let (sign, code) = match change.tag() {
                    ChangeTag::Delete => ("-", paint(RED)),
                    ChangeTag::Insert => ("+", paint(GREEN)),
                    ChangeTag::Equal => (" ", ""),
                };
                let reset = if code.is_empty() { "" } else { paint(RESET) };
                write!(&mut output, "{code}{sign}{}{reset}", change.value()).unwrap();
            }
        }
    }

    output
}

/// Line counts across a set of changes.
#[derive(Debug, Default)]
pub struct DiffSummary {
    pub files_changed: usize,
    pub insertions: usize,
    pub deletions: usize,
}

impl DiffSummary {
    /// Summarizes the change from one text to another.
    pub fn from_texts(original: &str, modified: &str) -> Self {
        let diff = TextDiff::from_lines(original, modified);
        let mut insertions = 0;
        let mut deletions = 0;

        for change in diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Insert => insertions += 1,
                ChangeTag::Delete => deletions += 1,
                ChangeTag::Equal => {}
            }
        }

        Self {
            files_changed: usize::from(insertions > 0 || deletions > 0),
            insertions,
            deletions,
        }
    }

    /// Accumulates another summary into this one.
    pub fn merge(&mut self, other: &DiffSummary) {
        self.files_changed += other.files_changed;
        self.insertions += other.insertions;
        self.deletions += other.deletions;
    }

    /// True when nothing changed.
    pub fn is_empty(&self) -> bool {
        self.insertions == 0 && self.deletions == 0
    }
}

impl std::fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} file(s) changed, {} insertions(+), {} deletions(-)",
            self.files_changed, self.insertions, self.deletions
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unified_diff_marks_changed_lines() {
        let diff = unified_diff(
            "server.port=8080\nname=demo\n",
            "server.port=9090\nname=demo\n",
            Path::new("application.properties"),
        );
        assert!(diff.contains("--- a/application.properties"));
        assert!(diff.contains("-server.port=8080"));
        assert!(diff.contains("+server.port=9090"));
        assert!(diff.contains(" name=demo"));
    }

    #[test]
    fn test_summary_counts() {
        let summary = DiffSummary::from_texts("a\nb\n", "a\nc\nd\n");
        assert_eq!(summary.files_changed, 1);
        assert_eq!(summary.insertions, 2);
        assert_eq!(summary.deletions, 1);
        assert!(!summary.is_empty());

        let unchanged = DiffSummary::from_texts("a\n", "a\n");
        assert!(unchanged.is_empty());
    }
}
