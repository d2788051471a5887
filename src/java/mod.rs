//! Structural view of a Java compilation unit.
//!
//! Wraps the tree-sitter parse tree with the lookups recipes need: classes,
//! fields, constructors, annotations, and the relational predicates ("sole
//! constructor", "has superclass") that gate the riskier rewrites. All
//! predicates are computed from the current text on every call — an earlier
//! edit in the same pass can change the answer, so nothing is cached.

pub mod imports;
pub mod types;

use crate::error::Result;
use crate::lang::{Java, Language};
use tree_sitter::{Node, Tree};

/// A parsed Java source file.
pub struct JavaSource {
    source: String,
    tree: Tree,
}

impl JavaSource {
    /// Parses Java source text.
    pub fn parse(source: &str) -> Result<Self> {
        let tree = Java.parse(source)?;
        Ok(Self {
            source: source.to_string(),
            tree,
        })
    }

    /// Returns the original source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the tree root.
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Returns true if the parse tree contains errors.
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Text of a node.
    pub fn text(&self, node: Node) -> &str {
        &self.source[node.byte_range()]
    }

    /// Visits every node in the tree.
    pub fn walk<'s>(&'s self, f: &mut impl FnMut(Node<'s>)) {
        walk_node(self.root(), f);
    }

    /// Collects every node of the given kind.
    pub fn nodes_of_kind<'s>(&'s self, kind: &str) -> Vec<Node<'s>> {
        let mut nodes = Vec::new();
        self.walk(&mut |n| {
            if n.kind() == kind {
                nodes.push(n);
            }
        });
        nodes
    }

    /// The package name declared by the file, if any.
    pub fn package(&self) -> Option<String> {
        let decl = self
            .root()
            .named_children(&mut self.root().walk())
            .find(|n| n.kind() == "package_declaration")?;
        let name = decl
            .named_children(&mut decl.walk())
            .find(|n| n.kind() == "scoped_identifier" || n.kind() == "identifier")?;
        Some(self.text(name).to_string())
    }

    /// All class declarations, outermost first.
    pub fn classes(&self) -> Vec<Node<'_>> {
        self.nodes_of_kind("class_declaration")
    }

    /// A class's simple name.
    pub fn class_name<'a>(&'a self, class: Node<'a>) -> &'a str {
        class
            .child_by_field_name("name")
            .map(|n| self.text(n))
            .unwrap_or("")
    }

    /// Direct members of a class body with the given kind.
    pub fn members_of_kind<'a>(&self, class: Node<'a>, kind: &str) -> Vec<Node<'a>> {
        let Some(body) = class.child_by_field_name("body") else {
            return Vec::new();
        };
        let mut cursor = body.walk();
        body.named_children(&mut cursor)
            .filter(|n| n.kind() == kind)
            .collect()
    }

    /// Field declarations directly in the class body.
    pub fn fields<'a>(&self, class: Node<'a>) -> Vec<Node<'a>> {
        self.members_of_kind(class, "field_declaration")
    }

    /// Constructor declarations directly in the class body.
    pub fn constructors<'a>(&self, class: Node<'a>) -> Vec<Node<'a>> {
        self.members_of_kind(class, "constructor_declaration")
    }

    /// True if the class declares an explicit superclass.
    pub fn has_superclass(&self, class: Node) -> bool {
        class.child_by_field_name("superclass").is_some()
    }

    /// The class's single constructor, if it has exactly one.
    pub fn sole_constructor<'a>(&self, class: Node<'a>) -> Option<Node<'a>> {
        let ctors = self.constructors(class);
        if ctors.len() == 1 { Some(ctors[0]) } else { None }
    }

    /// The `modifiers` child of a declaration, if present.
    pub fn modifiers<'a>(&self, decl: Node<'a>) -> Option<Node<'a>> {
        let mut cursor = decl.walk();
        decl.children(&mut cursor).find(|n| n.kind() == "modifiers")
    }

    /// Annotations attached to a declaration.
    pub fn annotations<'a>(&self, decl: Node<'a>) -> Vec<Node<'a>> {
        let Some(modifiers) = self.modifiers(decl) else {
            return Vec::new();
        };
        let mut cursor = modifiers.walk();
        modifiers
            .children(&mut cursor)
            .filter(|n| n.kind() == "annotation" || n.kind() == "marker_annotation")
            .collect()
    }

    /// True if a declaration carries the given modifier keyword.
    pub fn has_modifier(&self, decl: Node, keyword: &str) -> bool {
        let Some(modifiers) = self.modifiers(decl) else {
            return false;
        };
        let mut cursor = modifiers.walk();
        modifiers.children(&mut cursor).any(|n| n.kind() == keyword)
    }

    /// The name of an annotation as written (simple or qualified).
    pub fn annotation_name<'a>(&'a self, annotation: Node<'a>) -> &'a str {
        annotation
            .child_by_field_name("name")
            .map(|n| self.text(n))
            .unwrap_or("")
    }

    /// The argument list of an annotation, if it has one.
    pub fn annotation_arguments<'a>(&self, annotation: Node<'a>) -> Option<Node<'a>> {
        annotation.child_by_field_name("arguments")
    }

    /// Variable declarators of a field declaration.
    pub fn declarators<'a>(&self, field: Node<'a>) -> Vec<Node<'a>> {
        let mut cursor = field.walk();
        field
            .children_by_field_name("declarator", &mut cursor)
            .collect()
    }
}

fn walk_node<'t>(node: Node<'t>, f: &mut impl FnMut(Node<'t>)) {
    f(node);
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_node(child, f);
    }
}

/// A position in the tree: the node plus its parent chain up to the root.
/// Created fresh per visit, never stored.
#[derive(Clone, Copy)]
pub struct JavaCursor<'t> {
    node: Node<'t>,
}

impl<'t> JavaCursor<'t> {
    pub fn new(node: Node<'t>) -> Self {
        Self { node }
    }

    /// The node this cursor points at.
    pub fn node(&self) -> Node<'t> {
        self.node
    }

    /// Walks up the parent chain.
    pub fn ancestors(&self) -> impl Iterator<Item = Node<'t>> {
        std::iter::successors(self.node.parent(), |n| n.parent())
    }

    /// The nearest enclosing node of the given kind.
    pub fn enclosing(&self, kind: &str) -> Option<Node<'t>> {
        self.ancestors().find(|n| n.kind() == kind)
    }

    /// The class declaration this node sits in, if any.
    pub fn enclosing_class(&self) -> Option<Node<'t>> {
        self.enclosing("class_declaration")
    }

    /// True when the node is used as a bare statement: its direct parent is
    /// an expression statement, so the value is discarded.
    pub fn in_statement_position(&self) -> bool {
        self.node
            .parent()
            .map(|p| p.kind() == "expression_statement")
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"package com.example;

import org.springframework.stereotype.Service;

@Service
public class OrderService extends BaseService {

    @Deprecated
    private final OrderRepository repository = null;

    public OrderService() {
    }

    public void process() {
        repository.findAll().clear();
    }
}
"#;

    #[test]
    fn test_package_and_classes() {
        let java = JavaSource::parse(SOURCE).unwrap();
        assert_eq!(java.package().as_deref(), Some("com.example"));
        let classes = java.classes();
        assert_eq!(classes.len(), 1);
        assert_eq!(java.class_name(classes[0]), "OrderService");
        assert!(java.has_superclass(classes[0]));
    }

    #[test]
    fn test_fields_and_constructors() {
        let java = JavaSource::parse(SOURCE).unwrap();
        let class = java.classes()[0];
        assert_eq!(java.fields(class).len(), 1);
        assert!(java.sole_constructor(class).is_some());

        let field = java.fields(class)[0];
        assert!(java.has_modifier(field, "final"));
        assert!(java.has_modifier(field, "private"));
        assert!(!java.has_modifier(field, "static"));
    }

    #[test]
    fn test_annotations() {
        let java = JavaSource::parse(SOURCE).unwrap();
        let class = java.classes()[0];
        let class_annotations = java.annotations(class);
        assert_eq!(class_annotations.len(), 1);
        assert_eq!(java.annotation_name(class_annotations[0]), "Service");

        let field = java.fields(class)[0];
        let field_annotations = java.annotations(field);
        assert_eq!(field_annotations.len(), 1);
        assert_eq!(java.annotation_name(field_annotations[0]), "Deprecated");
    }

    #[test]
    fn test_cursor_statement_position() {
        let java = JavaSource::parse(SOURCE).unwrap();
        let invocations = java.nodes_of_kind("method_invocation");
        // `repository.findAll().clear()` is the outermost invocation and a
        // bare statement; `repository.findAll()` is not.
        let outer = invocations
            .iter()
            .find(|n| java.text(**n).ends_with("clear()"))
            .unwrap();
        assert!(JavaCursor::new(*outer).in_statement_position());
        let inner = invocations
            .iter()
            .find(|n| java.text(**n).ends_with("findAll()"))
            .unwrap();
        assert!(!JavaCursor::new(*inner).in_statement_position());

        let cursor = JavaCursor::new(*inner);
        assert!(cursor.enclosing_class().is_some());
    }
}
