//! Annotation patterns: fully qualified name plus optional argument
//! assertions.

use crate::java::{JavaSource, imports};
use tree_sitter::Node;

/// Matches annotations by fully qualified type name, optionally requiring
/// specific argument values. Handles both explicit `name = value` pairs and
/// the positional single-`value` form.
#[derive(Debug, Clone)]
pub struct AnnotationMatcher {
    fqn: String,
    simple_name: String,
    required_arguments: Vec<(String, String)>,
}

impl AnnotationMatcher {
    /// Creates a matcher for the given fully qualified annotation type.
    /// A leading `@` is accepted and ignored.
    pub fn new(fqn: impl Into<String>) -> Self {
        let fqn = fqn.into().trim_start_matches('@').to_string();
        let simple_name = fqn.rsplit('.').next().unwrap_or(&fqn).to_string();
        Self {
            fqn,
            simple_name,
            required_arguments: Vec::new(),
        }
    }

    /// Requires an argument. Use the name `value` for the positional form.
    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.required_arguments.push((name.into(), value.into()));
        self
    }

    /// The fully qualified name this matcher looks for.
    pub fn fqn(&self) -> &str {
        &self.fqn
    }

    /// Tests an `annotation` or `marker_annotation` node.
    ///
    /// A simple name in source only matches when the file's imports actually
    /// bind it to this matcher's type (explicit import, wildcard import of
    /// the package, or `java.lang`). An unresolvable name is a non-match.
    pub fn matches(&self, java: &JavaSource, annotation: Node) -> bool {
        if !matches!(annotation.kind(), "annotation" | "marker_annotation") {
            return false;
        }
        let written = java.annotation_name(annotation);
        if !self.name_matches(java, written) {
            return false;
        }
        self.required_arguments
            .iter()
            .all(|(name, value)| self.has_argument(java, annotation, name, value))
    }

    fn name_matches(&self, java: &JavaSource, written: &str) -> bool {
        if written.contains('.') {
            return written == self.fqn;
        }
        if written != self.simple_name {
            return false;
        }
        if imports::covers(java, &self.fqn) {
            return true;
        }
        self.package() == "java.lang"
    }

    fn package(&self) -> &str {
        self.fqn.rsplit_once('.').map(|(p, _)| p).unwrap_or("")
    }

    fn has_argument(&self, java: &JavaSource, annotation: Node, name: &str, value: &str) -> bool {
        let Some(arguments) = java.annotation_arguments(annotation) else {
            return false;
        };
        let mut cursor = arguments.walk();
        for child in arguments.named_children(&mut cursor) {
            let (arg_name, arg_value) = match child.kind() {
                "element_value_pair" => {
                    let key = child.child_by_field_name("key").map(|k| java.text(k));
                    let val = child.child_by_field_name("value").map(|v| java.text(v));
                    match (key, val) {
                        (Some(k), Some(v)) => (k, v),
                        _ => continue,
                    }
                }
                // A lone element is the positional `value` argument.
                _ => ("value", java.text(child)),
            };
            if arg_name == name && literal_equals(arg_value, value) {
                return true;
            }
        }
        false
    }
}

/// Compares argument text, treating a quoted string literal and its content
/// as equal.
fn literal_equals(written: &str, expected: &str) -> bool {
    if written == expected {
        return true;
    }
    unquote(written) == unquote(expected)
}

fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"package com.example;

import org.springframework.beans.factory.annotation.Autowired;
import org.springframework.web.bind.annotation.RequestMapping;

public class A {
    @Autowired
    private B b;

    @RequestMapping(value = "/orders", method = RequestMethod.GET)
    void list() {}

    @SuppressWarnings("unchecked")
    void raw() {}
}
"#;

    fn annotation_named<'a>(java: &'a JavaSource, name: &str) -> Node<'a> {
        let mut found = None;
        java.walk(&mut |n| {
            if matches!(n.kind(), "annotation" | "marker_annotation")
                && java.annotation_name(n) == name
                && found.is_none()
            {
                found = Some(n);
            }
        });
        found.unwrap()
    }

    #[test]
    fn test_match_by_import_resolution() {
        let java = JavaSource::parse(SOURCE).unwrap();
        let node = annotation_named(&java, "Autowired");

        let matcher =
            AnnotationMatcher::new("org.springframework.beans.factory.annotation.Autowired");
        assert!(matcher.matches(&java, node));

        // Same simple name, different package: the import does not bind it.
        let wrong = AnnotationMatcher::new("jakarta.annotation.Autowired");
        assert!(!wrong.matches(&java, node));
    }

    #[test]
    fn test_named_argument_assertion() {
        let java = JavaSource::parse(SOURCE).unwrap();
        let node = annotation_named(&java, "RequestMapping");

        let base = AnnotationMatcher::new(
            "org.springframework.web.bind.annotation.RequestMapping",
        );
        assert!(base.clone().with_argument("value", "/orders").matches(&java, node));
        assert!(
            base.clone()
                .with_argument("method", "RequestMethod.GET")
                .matches(&java, node)
        );
        assert!(!base.with_argument("value", "/other").matches(&java, node));
    }

    #[test]
    fn test_positional_value_argument() {
        let java = JavaSource::parse(SOURCE).unwrap();
        let node = annotation_named(&java, "SuppressWarnings");

        let matcher = AnnotationMatcher::new("java.lang.SuppressWarnings")
            .with_argument("value", "unchecked");
        assert!(matcher.matches(&java, node));
    }

    #[test]
    fn test_marker_annotation_with_required_argument_fails() {
        let java = JavaSource::parse(SOURCE).unwrap();
        let node = annotation_named(&java, "Autowired");
        let matcher =
            AnnotationMatcher::new("org.springframework.beans.factory.annotation.Autowired")
                .with_argument("required", "false");
        assert!(!matcher.matches(&java, node));
    }
}
