//! Migrates field injection to constructor injection.

use crate::error::Result;
use crate::format::{alone_on_line, full_line_span, indent_at, line_end_after};
use crate::java::{JavaSource, imports};
use crate::matcher::{AnnotationMatcher, FileMatcher, file};
use crate::recipe::{ExecutionContext, Recipe};
use crate::text::{TextEdit, apply_edits};
use std::path::Path;
use tree_sitter::Node;

const AUTOWIRED: &str = "org.springframework.beans.factory.annotation.Autowired";
const VALUE: &str = "org.springframework.beans.factory.annotation.Value";

/// Rewrites `@Autowired` fields into constructor parameters: the annotation
/// is stripped, the field becomes `final`, any initializer is dropped, and
/// the constructor gains a parameter and a `this.x = x;` assignment per
/// field, in field declaration order.
///
/// The recipe declines whole classes rather than guess: a class with more
/// than one constructor, a constructor that already takes parameters, or an
/// explicit superclass is left byte-identical. Individual fields are skipped
/// when they are static, declare several variables at once, or also carry
/// `@Value` (property injection, not a bean).
pub struct FieldInjectionToConstructorInjection {
    annotation: String,
}

impl Default for FieldInjectionToConstructorInjection {
    fn default() -> Self {
        Self::new(AUTOWIRED)
    }
}

impl FieldInjectionToConstructorInjection {
    /// Migrates fields carrying the given injection annotation.
    pub fn new(annotation: impl Into<String>) -> Self {
        Self {
            annotation: annotation.into(),
        }
    }
}

/// One field selected for migration.
struct MigratedField<'t> {
    field: Node<'t>,
    annotation: Node<'t>,
    type_text: String,
    name: String,
}

impl Recipe for FieldInjectionToConstructorInjection {
    fn name(&self) -> &str {
        "field-injection-to-constructor-injection"
    }

    fn description(&self) -> &str {
        "Convert annotated field injection to constructor injection"
    }

    fn file_matcher(&self) -> FileMatcher {
        file::java_sources()
    }

    fn run(&self, source: &str, _path: &Path, _ctx: &mut ExecutionContext) -> Result<String> {
        let java = JavaSource::parse(source)?;
        if java.has_errors() {
            return Ok(source.to_string());
        }
        let matcher = AnnotationMatcher::new(&self.annotation);
        let value_matcher = AnnotationMatcher::new(VALUE);

        let mut edits = Vec::new();
        let mut annotation_stripped = false;
        for class in java.classes() {
            if let Some(plan) = self.plan_class(&java, class, &matcher, &value_matcher) {
                annotation_stripped = true;
                edits.extend(plan);
            }
        }

        // The injection annotation's import goes once nothing references it.
        // Planned against the post-edit text, where the stripped annotations
        // are really gone.
        let migrated = apply_edits(source, edits)?;
        if annotation_stripped {
            let java = JavaSource::parse(&migrated)?;
            if let Some(edit) = imports::remove_import_if_unused(&java, &self.annotation) {
                return apply_edits(&migrated, vec![edit]);
            }
        }
        Ok(migrated)
    }
}

impl FieldInjectionToConstructorInjection {
    fn plan_class(
        &self,
        java: &JavaSource,
        class: Node,
        matcher: &AnnotationMatcher,
        value_matcher: &AnnotationMatcher,
    ) -> Option<Vec<TextEdit>> {
        // Conservative skips: anything that would require real
        // dependency-injection reasoning leaves the class untouched.
        if java.has_superclass(class) {
            return None;
        }
        let constructors = java.constructors(class);
        if constructors.len() > 1 {
            return None;
        }
        let existing = constructors.first().copied();
        if let Some(ctor) = existing {
            let has_params = ctor
                .child_by_field_name("parameters")
                .map(|p| p.named_child_count() > 0)
                .unwrap_or(false);
            if has_params {
                return None;
            }
        }

        let mut migrated = Vec::new();
        for field in java.fields(class) {
            let Some(annotation) = java
                .annotations(field)
                .into_iter()
                .find(|a| matcher.matches(java, *a))
            else {
                continue;
            };
            if java.has_modifier(field, "static") {
                continue;
            }
            if java
                .annotations(field)
                .into_iter()
                .any(|a| value_matcher.matches(java, a))
            {
                continue;
            }
            let declarators = java.declarators(field);
            if declarators.len() != 1 {
                continue;
            }
            let Some(ty) = field.child_by_field_name("type") else {
                continue;
            };
            let Some(name) = declarators[0].child_by_field_name("name") else {
                continue;
            };
            migrated.push(MigratedField {
                field,
                annotation,
                type_text: java.text(ty).to_string(),
                name: java.text(name).to_string(),
            });
        }
        if migrated.is_empty() {
            return None;
        }

        let mut edits = Vec::new();
        for entry in &migrated {
            edits.extend(self.rewrite_field(java, entry));
        }
        edits.extend(self.rewrite_constructor(java, class, existing, &migrated));
        Some(edits)
    }

    fn rewrite_field(&self, java: &JavaSource, entry: &MigratedField) -> Vec<TextEdit> {
        let source = java.source();
        let mut edits = Vec::new();

        // Strip the injection annotation with whatever whitespace tied it to
        // the declaration.
        let span = entry.annotation.byte_range();
        if alone_on_line(source, &span) {
            edits.push(TextEdit::delete(full_line_span(source, &span)));
        } else {
            let mut end = span.end;
            while source[end..].starts_with([' ', '\t']) {
                end += 1;
            }
            edits.push(TextEdit::delete(span.start..end));
        }

        if !java.has_modifier(entry.field, "final") {
            if let Some(ty) = entry.field.child_by_field_name("type") {
                edits.push(TextEdit::insert(ty.start_byte(), "final "));
            }
        }

        // Drop any initializer.
        let declarator = java.declarators(entry.field)[0];
        if declarator.child_by_field_name("value").is_some() {
            if let Some(name) = declarator.child_by_field_name("name") {
                edits.push(TextEdit::delete(name.end_byte()..declarator.end_byte()));
            }
        }
        edits
    }

    fn rewrite_constructor(
        &self,
        java: &JavaSource,
        class: Node,
        existing: Option<Node>,
        migrated: &[MigratedField],
    ) -> Vec<TextEdit> {
        let source = java.source();
        let parameters = migrated
            .iter()
            .map(|f| format!("{} {}", f.type_text, f.name))
            .collect::<Vec<_>>()
            .join(", ");

        let member_indent = indent_at(source, migrated[0].field.start_byte()).to_string();
        let class_indent = indent_at(source, class.start_byte());
        let unit = if member_indent.len() > class_indent.len() {
            member_indent.len() - class_indent.len()
        } else {
            4
        };
        let statement_indent = format!("{}{}", member_indent, " ".repeat(unit));
        let assignments: String = migrated
            .iter()
            .map(|f| format!("{statement_indent}this.{0} = {0};\n", f.name))
            .collect();

        match existing {
            Some(ctor) => {
                let mut edits = Vec::new();
                if let Some(params) = ctor.child_by_field_name("parameters") {
                    edits.push(TextEdit::replace(
                        params.byte_range(),
                        format!("({parameters})"),
                    ));
                }
                if let Some(body) = ctor.child_by_field_name("body") {
                    let body_span = body.byte_range();
                    let inner = &source[body_span.start + 1..body_span.end - 1];
                    if inner.trim().is_empty() {
                        edits.push(TextEdit::replace(
                            body_span,
                            format!("{{\n{assignments}{member_indent}}}"),
                        ));
                    } else {
                        // Assignments go after the existing statements, just
                        // before the closing brace's line.
                        let at = crate::format::line_start(source, body_span.end - 1);
                        edits.push(TextEdit::insert(at, assignments));
                    }
                }
                edits
            }
            None => {
                let class_name = java.class_name(class);
                let last_field = migrated.last().unwrap().field;
                let at = line_end_after(source, last_field.end_byte());
                let text = format!(
                    "\n{member_indent}public {class_name}({parameters}) {{\n{assignments}{member_indent}}}\n"
                );
                vec![TextEdit::insert(at, text)]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str) -> String {
        let mut ctx = ExecutionContext::new();
        FieldInjectionToConstructorInjection::default()
            .run(source, Path::new("A.java"), &mut ctx)
            .unwrap()
    }

    const IMPORT: &str = "import org.springframework.beans.factory.annotation.Autowired;\n";

    #[test]
    fn test_generates_constructor_for_annotated_fields() {
        let source = format!(
            "{IMPORT}\npublic class OrderService {{\n    @Autowired\n    private OrderRepository repository;\n}}\n"
        );
        let out = run(&source);
        assert_eq!(
            out,
            "public class OrderService {\n    private final OrderRepository repository;\n\n    public OrderService(OrderRepository repository) {\n        this.repository = repository;\n    }\n}\n"
        );
    }

    #[test]
    fn test_two_fields_keep_declaration_order() {
        let source = format!(
            "{IMPORT}\npublic class A {{\n    @Autowired\n    private B b;\n\n    @Autowired\n    private C c;\n}}\n"
        );
        let out = run(&source);
        assert!(out.contains("public A(B b, C c) {"));
        let b_assign = out.find("this.b = b;").unwrap();
        let c_assign = out.find("this.c = c;").unwrap();
        assert!(b_assign < c_assign);
    }

    #[test]
    fn test_existing_no_arg_constructor_is_extended() {
        let source = format!(
            "{IMPORT}\npublic class A {{\n    @Autowired\n    private B b;\n\n    public A() {{\n        super();\n    }}\n}}\n"
        );
        let out = run(&source);
        assert!(out.contains("public A(B b) {"));
        // Existing statements stay, assignments are appended after them.
        let sup = out.find("super();").unwrap();
        let assign = out.find("this.b = b;").unwrap();
        assert!(sup < assign);
    }

    #[test]
    fn test_initializer_is_removed() {
        let source = format!(
            "{IMPORT}\npublic class A {{\n    @Autowired\n    private B b = null;\n}}\n"
        );
        let out = run(&source);
        assert!(out.contains("private final B b;"));
        assert!(!out.contains("= null"));
    }

    #[test]
    fn test_final_not_doubled() {
        let source = format!(
            "{IMPORT}\npublic class A {{\n    @Autowired\n    private final B b;\n}}\n"
        );
        let out = run(&source);
        assert!(out.contains("private final B b;"));
        assert!(!out.contains("final final"));
    }

    #[test]
    fn test_class_with_parameterized_constructor_untouched() {
        let source = format!(
            "{IMPORT}\npublic class A {{\n    @Autowired\n    private B b;\n\n    public A(C c) {{\n    }}\n}}\n"
        );
        assert_eq!(run(&source), source);
    }

    #[test]
    fn test_class_with_two_constructors_untouched() {
        let source = format!(
            "{IMPORT}\npublic class A {{\n    @Autowired\n    private B b;\n\n    public A() {{\n    }}\n\n    public A(C c) {{\n    }}\n}}\n"
        );
        assert_eq!(run(&source), source);
    }

    #[test]
    fn test_subclass_untouched() {
        let source = format!(
            "{IMPORT}\npublic class A extends Base {{\n    @Autowired\n    private B b;\n}}\n"
        );
        assert_eq!(run(&source), source);
    }

    #[test]
    fn test_static_and_value_fields_skipped() {
        let source = format!(
            "{IMPORT}import org.springframework.beans.factory.annotation.Value;\n\npublic class A {{\n    @Autowired\n    private static B b;\n\n    @Autowired\n    @Value(\"${{x}}\")\n    private String x;\n}}\n"
        );
        assert_eq!(run(&source), source);
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let source = format!(
            "{IMPORT}\npublic class A {{\n    @Autowired\n    private B b;\n}}\n"
        );
        let once = run(&source);
        assert_eq!(run(&once), once);
    }

    #[test]
    fn test_annotation_on_same_line_as_declaration() {
        let source =
            format!("{IMPORT}\npublic class A {{\n    @Autowired private B b;\n}}\n");
        let out = run(&source);
        assert!(out.contains("    private final B b;"));
        assert!(out.contains("public A(B b) {"));
    }
}
