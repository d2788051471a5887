//! Import-list maintenance for Java rewrites.
//!
//! Removal uses a file-wide usage scan: an import only goes away when no
//! identifier outside the import block still references its simple name.

use super::JavaSource;
use crate::format::full_line_span;
use crate::text::TextEdit;
use std::ops::Range;

/// One `import` declaration.
#[derive(Debug, Clone)]
pub struct ImportDecl {
    /// The imported name, without `import`/`static`/`;`.
    pub fqn: String,
    pub is_static: bool,
    pub is_wildcard: bool,
    /// Span of the whole declaration.
    pub span: Range<usize>,
}

impl ImportDecl {
    /// The simple name this import brings into scope (None for wildcards).
    pub fn simple_name(&self) -> Option<&str> {
        if self.is_wildcard {
            None
        } else {
            Some(self.fqn.rsplit('.').next().unwrap_or(&self.fqn))
        }
    }

    /// The package portion of the imported name.
    pub fn package(&self) -> &str {
        self.fqn.rsplit_once('.').map(|(p, _)| p).unwrap_or("")
    }
}

/// Parses the file's import declarations.
pub fn imports(java: &JavaSource) -> Vec<ImportDecl> {
    let root = java.root();
    let mut cursor = root.walk();
    root.named_children(&mut cursor)
        .filter(|n| n.kind() == "import_declaration")
        .map(|n| {
            let text = java.text(n);
            let body = text
                .trim_start_matches("import")
                .trim_end_matches(';')
                .trim();
            let is_static = body.starts_with("static ");
            let body = body.trim_start_matches("static").trim();
            let is_wildcard = body.ends_with(".*");
            let fqn = body.trim_end_matches(".*").to_string();
            ImportDecl {
                fqn,
                is_static,
                is_wildcard,
                span: n.byte_range(),
            }
        })
        .collect()
}

/// Resolves a simple type name against the import list. Returns the fully
/// qualified name when an explicit import covers it, the name itself when it
/// is already qualified, and None otherwise — wildcard imports and
/// same-package types cannot be resolved syntactically and stay unknown.
pub fn resolve_simple_name(java: &JavaSource, name: &str) -> Option<String> {
    if name.contains('.') {
        return Some(name.to_string());
    }
    imports(java)
        .iter()
        .find(|i| !i.is_static && i.simple_name() == Some(name))
        .map(|i| i.fqn.clone())
}

/// True when the file has a non-static import for exactly this name, or a
/// wildcard import of its package.
pub fn covers(java: &JavaSource, fqn: &str) -> bool {
    let package = fqn.rsplit_once('.').map(|(p, _)| p).unwrap_or("");
    imports(java).iter().any(|i| {
        !i.is_static && (i.fqn == fqn || (i.is_wildcard && i.fqn == package))
    })
}

/// Plans an import insertion, keeping the import block sorted. Returns None
/// when the import is unnecessary (already covered, `java.lang`, or the
/// file's own package).
pub fn add_import(java: &JavaSource, fqn: &str) -> Option<TextEdit> {
    let package = fqn.rsplit_once('.').map(|(p, _)| p).unwrap_or("");
    if package == "java.lang" || covers(java, fqn) {
        return None;
    }
    if java.package().as_deref() == Some(package) {
        return None;
    }

    let statement = format!("import {fqn};\n");
    let existing = imports(java);

    if let Some(after) = existing.iter().rev().find(|i| i.fqn.as_str() < fqn) {
        let at = full_line_span(java.source(), &after.span).end;
        return Some(TextEdit::insert(at, statement));
    }
    if let Some(first) = existing.first() {
        let at = full_line_span(java.source(), &first.span).start;
        return Some(TextEdit::insert(at, statement));
    }

    // No import block yet: start one after the package declaration.
    let root = java.root();
    let mut cursor = root.walk();
    match root
        .named_children(&mut cursor)
        .find(|n| n.kind() == "package_declaration")
    {
        Some(pkg) => {
            let at = full_line_span(java.source(), &pkg.byte_range()).end;
            Some(TextEdit::insert(at, format!("\n{statement}")))
        }
        None => Some(TextEdit::insert(0, format!("{statement}\n"))),
    }
}

/// Plans removal of the import for `fqn` if nothing in the file still uses
/// its simple name. The scan covers the whole file outside the import block,
/// since a name may be used far from the edit that dropped a reference.
pub fn remove_import_if_unused(java: &JavaSource, fqn: &str) -> Option<TextEdit> {
    let import = imports(java).into_iter().find(|i| !i.is_wildcard && i.fqn == fqn)?;
    let simple = import.simple_name()?.to_string();

    let mut used = false;
    java.walk(&mut |node| {
        if used || !matches!(node.kind(), "identifier" | "type_identifier") {
            return;
        }
        if java.text(node) != simple {
            return;
        }
        // Ignore occurrences inside import declarations.
        let mut parent = node.parent();
        while let Some(p) = parent {
            if p.kind() == "import_declaration" {
                return;
            }
            parent = p.parent();
        }
        used = true;
    });

    if used {
        return None;
    }
    let mut span = full_line_span(java.source(), &import.span);
    // Removing the block's last import also takes the blank separator line,
    // so the file does not accumulate empty lines.
    if imports(java).len() == 1 && java.source()[span.end..].starts_with('\n') {
        span.end += 1;
    }
    Some(TextEdit::delete(span))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::apply_edits;

    const SOURCE: &str = r#"package com.example;

import java.util.List;
import org.springframework.beans.factory.annotation.Autowired;

public class A {
    @Autowired
    private List<String> names;
}
"#;

    #[test]
    fn test_parse_imports() {
        let java = JavaSource::parse(SOURCE).unwrap();
        let decls = imports(&java);
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].fqn, "java.util.List");
        assert_eq!(decls[0].simple_name(), Some("List"));
        assert!(!decls[0].is_wildcard);
    }

    #[test]
    fn test_resolve_simple_name() {
        let java = JavaSource::parse(SOURCE).unwrap();
        assert_eq!(
            resolve_simple_name(&java, "Autowired").as_deref(),
            Some("org.springframework.beans.factory.annotation.Autowired")
        );
        assert_eq!(resolve_simple_name(&java, "Unknown"), None);
    }

    #[test]
    fn test_add_import_sorted() {
        let java = JavaSource::parse(SOURCE).unwrap();
        let edit = add_import(&java, "java.util.Map").unwrap();
        let out = apply_edits(SOURCE, vec![edit]).unwrap();
        assert!(out.contains("import java.util.List;\nimport java.util.Map;\n"));
    }

    #[test]
    fn test_add_import_skips_existing_and_java_lang() {
        let java = JavaSource::parse(SOURCE).unwrap();
        assert!(add_import(&java, "java.util.List").is_none());
        assert!(add_import(&java, "java.lang.String").is_none());
    }

    #[test]
    fn test_add_first_import_after_package() {
        let source = "package com.example;\n\npublic class A {\n}\n";
        let java = JavaSource::parse(source).unwrap();
        let edit = add_import(&java, "java.util.List").unwrap();
        let out = apply_edits(source, vec![edit]).unwrap();
        assert_eq!(
            out,
            "package com.example;\n\nimport java.util.List;\n\npublic class A {\n}\n"
        );
    }

    #[test]
    fn test_remove_unused_import() {
        let source = "package p;\n\nimport java.util.List;\n\npublic class A {\n}\n";
        let java = JavaSource::parse(source).unwrap();
        let edit = remove_import_if_unused(&java, "java.util.List").unwrap();
        let out = apply_edits(source, vec![edit]).unwrap();
        assert_eq!(out, "package p;\n\npublic class A {\n}\n");
    }

    #[test]
    fn test_keep_import_still_used_elsewhere() {
        let java = JavaSource::parse(SOURCE).unwrap();
        assert!(remove_import_if_unused(&java, "java.util.List").is_none());
    }
}
