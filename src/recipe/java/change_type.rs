//! Rewrites references to a renamed type.

use crate::error::Result;
use crate::java::{JavaSource, imports};
use crate::matcher::{FileMatcher, file};
use crate::recipe::{ExecutionContext, Recipe};
use crate::text::{TextEdit, apply_edits};
use std::path::Path;

/// Message posted when a deprecated validation constraint was replaced and
/// the target API must be on the classpath. The host build tooling consumes
/// it from the run report.
pub const MSG_VALIDATION_API_REQUIRED: &str = "dependency.javax-validation";

/// Rewrites the import of a type and, when the simple name changed, every
/// reference to it. Only acts on files that actually bind the old name
/// (explicit import or fully qualified reference); a file where the new
/// simple name is already taken by another import is declined wholesale.
pub struct ChangeType {
    old: String,
    new: String,
}

impl ChangeType {
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
        }
    }

    fn old_simple(&self) -> &str {
        self.old.rsplit('.').next().unwrap_or(&self.old)
    }

    fn new_simple(&self) -> &str {
        self.new.rsplit('.').next().unwrap_or(&self.new)
    }

    /// Plans this rename against one file. Exposed for the batch recipes
    /// that bundle several renames into a single pass.
    pub fn plan(&self, java: &JavaSource) -> Vec<TextEdit> {
        let decls = imports::imports(java);
        let has_import = decls.iter().any(|i| !i.is_wildcard && i.fqn == self.old);

        // Another type already owns the new simple name: renaming references
        // would capture them.
        if self.old_simple() != self.new_simple()
            && decls
                .iter()
                .any(|i| i.fqn != self.old && i.simple_name() == Some(self.new_simple()))
        {
            return Vec::new();
        }

        let mut edits = Vec::new();
        for decl in &decls {
            if !decl.is_wildcard && decl.fqn == self.old {
                let keyword = if decl.is_static { "import static" } else { "import" };
                edits.push(TextEdit::replace(
                    decl.span.clone(),
                    format!("{keyword} {};", self.new),
                ));
            }
        }

        java.walk(&mut |node| {
            match node.kind() {
                // Fully qualified references, e.g. in annotations or casts.
                "scoped_type_identifier" | "scoped_identifier" => {
                    if java.text(node) == self.old && !inside_import(node) {
                        edits.push(TextEdit::replace(node.byte_range(), self.new.clone()));
                    }
                }
                "type_identifier" | "identifier" => {
                    if has_import
                        && self.old_simple() != self.new_simple()
                        && java.text(node) == self.old_simple()
                        && !inside_import(node)
                        && !inside_scoped_name(node)
                    {
                        edits.push(TextEdit::replace(
                            node.byte_range(),
                            self.new_simple().to_string(),
                        ));
                    }
                }
                _ => {}
            }
        });
        edits
    }
}

fn inside_import(node: tree_sitter::Node) -> bool {
    std::iter::successors(node.parent(), |n| n.parent()).any(|n| n.kind() == "import_declaration")
}

fn inside_scoped_name(node: tree_sitter::Node) -> bool {
    node.parent()
        .map(|p| matches!(p.kind(), "scoped_type_identifier" | "scoped_identifier"))
        .unwrap_or(false)
}

impl Recipe for ChangeType {
    fn name(&self) -> &str {
        "change-type"
    }

    fn description(&self) -> &str {
        "Rewrite references to a renamed type"
    }

    fn file_matcher(&self) -> FileMatcher {
        file::java_sources()
    }

    fn run(&self, source: &str, _path: &Path, _ctx: &mut ExecutionContext) -> Result<String> {
        let java = JavaSource::parse(source)?;
        if java.has_errors() {
            return Ok(source.to_string());
        }
        apply_edits(source, self.plan(&java))
    }
}

/// Replaces the deprecated `org.hibernate.validator.constraints` annotations
/// with their `javax.validation` successors, signaling that the validation
/// API dependency is now required.
pub struct ChangeValidationAnnotations;

const RENAMES: &[(&str, &str)] = &[
    (
        "org.hibernate.validator.constraints.NotEmpty",
        "javax.validation.constraints.NotEmpty",
    ),
    (
        "org.hibernate.validator.constraints.NotBlank",
        "javax.validation.constraints.NotBlank",
    ),
    (
        "org.hibernate.validator.constraints.Email",
        "javax.validation.constraints.Email",
    ),
];

impl Recipe for ChangeValidationAnnotations {
    fn name(&self) -> &str {
        "change-validation-annotations"
    }

    fn description(&self) -> &str {
        "Migrate deprecated Hibernate validation constraints to javax.validation"
    }

    fn file_matcher(&self) -> FileMatcher {
        file::java_sources().contains_pattern(r"org\.hibernate\.validator\.constraints")
    }

    fn run(&self, source: &str, _path: &Path, ctx: &mut ExecutionContext) -> Result<String> {
        let java = JavaSource::parse(source)?;
        if java.has_errors() {
            return Ok(source.to_string());
        }
        let mut edits = Vec::new();
        for (old, new) in RENAMES {
            edits.extend(ChangeType::new(*old, *new).plan(&java));
        }
        if edits.iter().any(|e| !e.is_noop(source)) {
            ctx.put_message(MSG_VALIDATION_API_REQUIRED, "javax.validation:validation-api");
        }
        apply_edits(source, edits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(recipe: &dyn Recipe, source: &str) -> (String, ExecutionContext) {
        let mut ctx = ExecutionContext::new();
        let out = recipe.run(source, Path::new("A.java"), &mut ctx).unwrap();
        (out, ctx)
    }

    #[test]
    fn test_rewrites_import_and_references() {
        let source = "import javax.persistence.Entity;\n\n@Entity\nclass A {\n}\n";
        let recipe = ChangeType::new("javax.persistence.Entity", "jakarta.persistence.Entity");
        let (out, _) = run(&recipe, source);
        assert!(out.contains("import jakarta.persistence.Entity;"));
        // Simple name unchanged, so the annotation reference stays.
        assert!(out.contains("@Entity"));
    }

    #[test]
    fn test_rewrites_simple_name_when_it_changes() {
        let source = "import a.OldName;\n\nclass A {\n    OldName field;\n}\n";
        let recipe = ChangeType::new("a.OldName", "b.NewName");
        let (out, _) = run(&recipe, source);
        assert!(out.contains("import b.NewName;"));
        assert!(out.contains("NewName field;"));
        assert!(!out.contains("OldName"));
    }

    #[test]
    fn test_rewrites_fully_qualified_reference() {
        let source = "class A {\n    @org.hibernate.validator.constraints.NotEmpty\n    String name;\n}\n";
        let recipe = ChangeType::new(
            "org.hibernate.validator.constraints.NotEmpty",
            "javax.validation.constraints.NotEmpty",
        );
        let (out, _) = run(&recipe, source);
        assert!(out.contains("@javax.validation.constraints.NotEmpty"));
    }

    #[test]
    fn test_declines_when_new_simple_name_taken() {
        let source = "import a.Old;\nimport c.New;\n\nclass A {\n    Old x;\n    New y;\n}\n";
        let recipe = ChangeType::new("a.Old", "b.New");
        let (out, _) = run(&recipe, source);
        assert_eq!(out, source);
    }

    #[test]
    fn test_validation_migration_posts_signal() {
        let source = "import org.hibernate.validator.constraints.NotEmpty;\n\nclass A {\n    @NotEmpty\n    String name;\n}\n";
        let (out, mut ctx) = run(&ChangeValidationAnnotations, source);
        assert!(out.contains("import javax.validation.constraints.NotEmpty;"));
        assert!(ctx.poll_message(MSG_VALIDATION_API_REQUIRED).is_some());
    }

    #[test]
    fn test_validation_migration_idempotent_without_signal() {
        let source = "import javax.validation.constraints.NotEmpty;\n\nclass A {\n    @NotEmpty\n    String name;\n}\n";
        let (out, mut ctx) = run(&ChangeValidationAnnotations, source);
        assert_eq!(out, source);
        assert!(ctx.poll_message(MSG_VALIDATION_API_REQUIRED).is_none());
    }
}
