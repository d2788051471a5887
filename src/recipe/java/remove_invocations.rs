//! Deletes matching method calls from statements and fluent chains.

use crate::error::Result;
use crate::format::{alone_on_line, full_line_span};
use crate::java::types::{NoTypeInfo, TypeResolver};
use crate::java::{JavaCursor, JavaSource};
use crate::matcher::{FileMatcher, MethodMatcher, file};
use crate::recipe::{ExecutionContext, Recipe};
use crate::text::{TextEdit, apply_edits};
use std::path::Path;
use tree_sitter::Node;

/// Removes invocations of the given method signatures.
///
/// A call is removable in exactly two situations:
///
/// - it is a bare statement (result discarded), in which case the whole
///   statement goes when nothing but a plain receiver would remain;
/// - its return type is assignable to its receiver's type, so splicing the
///   receiver into the call's place (`a.foo().bar()` -> `a.bar()`) leaves
///   the expression's static type — and the code's compilability — intact.
///
/// The second check needs resolved types; without a resolver the engine
/// cannot prove safety and leaves value-position calls alone.
pub struct RemoveMethodInvocations {
    matchers: Vec<MethodMatcher>,
    resolver: Box<dyn TypeResolver>,
}

impl RemoveMethodInvocations {
    /// Creates the recipe from `<type> <name>(<params>)` signature patterns.
    /// Invalid patterns are rejected up front.
    pub fn new(signatures: impl IntoIterator<Item = impl AsRef<str>>) -> Result<Self> {
        let matchers = signatures
            .into_iter()
            .map(|s| MethodMatcher::parse(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            matchers,
            resolver: Box::new(NoTypeInfo),
        })
    }

    /// Supplies type attribution for the assignability check.
    pub fn with_resolver(mut self, resolver: Box<dyn TypeResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    fn is_match(&self, java: &JavaSource, node: Node) -> bool {
        self.matchers
            .iter()
            .any(|m| m.matches_invocation(java, node, self.resolver.as_ref()))
    }

    /// Plans the removal of one matched invocation, or None when it cannot
    /// be removed safely.
    fn plan_removal(&self, java: &JavaSource, node: Node) -> Option<TextEdit> {
        let source = java.source();
        let receiver = node.child_by_field_name("object");
        let cursor = JavaCursor::new(node);

        if cursor.in_statement_position() {
            let remaining_chain = receiver
                .map(|r| r.kind() == "method_invocation")
                .unwrap_or(false);
            if !remaining_chain {
                // `a.foo();` with a plain (or no) receiver: the statement
                // has no effect left, so it goes entirely.
                let statement = node.parent()?;
                let span = statement.byte_range();
                let span = if alone_on_line(source, &span) {
                    full_line_span(source, &span)
                } else {
                    span
                };
                return Some(TextEdit::delete(span));
            }
            // `a.bar().foo();`: prune `.foo()` and keep the chain statement.
            return Some(TextEdit::delete(receiver?.end_byte()..node.end_byte()));
        }

        // Value position: splicing the receiver in place of the call must
        // not change the expression's static type.
        let receiver = receiver?;
        let signature = self.resolver.invocation_signature(java, node)?;
        let receiver_type = self.resolver.expression_type(java, receiver)?;
        if !self
            .resolver
            .is_assignable(&signature.return_type, &receiver_type)
        {
            return None;
        }
        Some(TextEdit::delete(receiver.end_byte()..node.end_byte()))
    }
}

impl Recipe for RemoveMethodInvocations {
    fn name(&self) -> &str {
        "remove-method-invocations"
    }

    fn description(&self) -> &str {
        "Delete calls to the given methods, preserving surrounding chains"
    }

    fn file_matcher(&self) -> FileMatcher {
        file::java_sources()
    }

    fn run(&self, source: &str, _path: &Path, _ctx: &mut ExecutionContext) -> Result<String> {
        let java = JavaSource::parse(source)?;
        if java.has_errors() {
            return Ok(source.to_string());
        }

        let mut matched: Vec<Node> = java
            .nodes_of_kind("method_invocation")
            .into_iter()
            .filter(|n| self.is_match(&java, *n))
            .collect();
        matched.sort_by_key(|n| n.start_byte());

        let mut edits: Vec<TextEdit> = Vec::new();
        for node in matched {
            if let Some(edit) = self.plan_removal(&java, node) {
                // A removal nested inside an already-planned one is moot.
                let contained = edits
                    .iter()
                    .any(|e| e.start <= edit.start && edit.end <= e.end);
                if !contained {
                    edits.push(edit);
                }
            }
        }
        apply_edits(source, edits)
    }
}
