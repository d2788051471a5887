//! Deletes an argument from an annotation.

use crate::error::Result;
use crate::format::separator_after_deletion;
use crate::java::JavaSource;
use crate::matcher::{AnnotationMatcher, FileMatcher, file};
use crate::recipe::{ExecutionContext, Recipe};
use crate::text::{TextEdit, apply_edits};
use std::path::Path;
use tree_sitter::Node;

/// Removes an attribute from every matching annotation. With no attribute
/// name, the whole argument list goes. When the removal leaves the
/// annotation directly touching the next token (`@PathVariable("id")Long`),
/// a single space is synthesized; text that is already separated is left
/// alone, so a second run changes nothing.
pub struct RemoveAnnotationAttribute {
    annotation: String,
    attribute: Option<String>,
}

impl RemoveAnnotationAttribute {
    /// Removes the entire argument list of the annotation.
    pub fn all_arguments(annotation: impl Into<String>) -> Self {
        Self {
            annotation: annotation.into(),
            attribute: None,
        }
    }

    /// Removes one named attribute (use `value` for the positional form).
    pub fn named(annotation: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            annotation: annotation.into(),
            attribute: Some(attribute.into()),
        }
    }
}

impl Recipe for RemoveAnnotationAttribute {
    fn name(&self) -> &str {
        "remove-annotation-attribute"
    }

    fn description(&self) -> &str {
        "Remove an argument from an annotation"
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

        let mut edits = Vec::new();
        for annotation in java.nodes_of_kind("annotation") {
            if !matcher.matches(&java, annotation) {
                continue;
            }
            let Some(arguments) = java.annotation_arguments(annotation) else {
                continue;
            };
            edits.extend(self.plan(&java, arguments));
        }
        apply_edits(source, edits)
    }
}

impl RemoveAnnotationAttribute {
    fn plan(&self, java: &JavaSource, arguments: Node) -> Vec<TextEdit> {
        let mut cursor = arguments.walk();
        let elements: Vec<Node> = arguments.named_children(&mut cursor).collect();

        let target_index = match &self.attribute {
            None => None,
            Some(name) => {
                let found = elements.iter().position(|e| {
                    match e.kind() {
                        "element_value_pair" => e
                            .child_by_field_name("key")
                            .map(|k| java.text(k) == name)
                            .unwrap_or(false),
                        // A lone element is the positional `value`.
                        _ => name == "value" && elements.len() == 1,
                    }
                });
                match found {
                    Some(i) => Some(i),
                    None => return Vec::new(),
                }
            }
        };

        match target_index {
            // Whole list, or the only argument: drop the parentheses too and
            // keep the tokens on either side apart.
            None => self.drop_argument_list(java, arguments),
            Some(_) if elements.len() == 1 => self.drop_argument_list(java, arguments),
            Some(i) => {
                let span = if i + 1 < elements.len() {
                    elements[i].start_byte()..elements[i + 1].start_byte()
                } else {
                    elements[i - 1].end_byte()..elements[i].end_byte()
                };
                vec![TextEdit::delete(span)]
            }
        }
    }

    fn drop_argument_list(&self, java: &JavaSource, arguments: Node) -> Vec<TextEdit> {
        let span = arguments.byte_range();
        let separator = separator_after_deletion(java.source(), &span);
        vec![TextEdit::replace(span, separator)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATH_VARIABLE: &str = "org.springframework.web.bind.annotation.PathVariable";

    fn run(recipe: &RemoveAnnotationAttribute, source: &str) -> String {
        let mut ctx = ExecutionContext::new();
        recipe.run(source, Path::new("A.java"), &mut ctx).unwrap()
    }

    fn controller(param: &str) -> String {
        format!(
            "import org.springframework.web.bind.annotation.PathVariable;\n\nclass A {{\n    void get({param}) {{}}\n}}\n"
        )
    }

    #[test]
    fn test_space_preserved_when_already_separated() {
        let recipe = RemoveAnnotationAttribute::all_arguments(PATH_VARIABLE);
        let out = run(&recipe, &controller("@PathVariable(\"id\") Long id"));
        assert!(out.contains("@PathVariable Long id"));
    }

    #[test]
    fn test_space_synthesized_when_tokens_touch() {
        let recipe = RemoveAnnotationAttribute::all_arguments(PATH_VARIABLE);
        let out = run(&recipe, &controller("@PathVariable(\"id\")Long id"));
        // Exactly one space, not zero and not two.
        assert!(out.contains("@PathVariable Long id"));
        assert!(!out.contains("@PathVariable  Long id"));
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let recipe = RemoveAnnotationAttribute::all_arguments(PATH_VARIABLE);
        let once = run(&recipe, &controller("@PathVariable(\"id\")Long id"));
        assert_eq!(run(&recipe, &once), once);
    }

    #[test]
    fn test_named_attribute_among_several() {
        let source = "import org.springframework.web.bind.annotation.RequestMapping;\n\nclass A {\n    @RequestMapping(value = \"/x\", method = RequestMethod.GET)\n    void get() {}\n}\n";
        let recipe = RemoveAnnotationAttribute::named(
            "org.springframework.web.bind.annotation.RequestMapping",
            "method",
        );
        let out = run(&recipe, source);
        assert!(out.contains("@RequestMapping(value = \"/x\")"));
    }

    #[test]
    fn test_first_of_two_attributes() {
        let source = "import org.springframework.web.bind.annotation.RequestMapping;\n\nclass A {\n    @RequestMapping(value = \"/x\", method = RequestMethod.GET)\n    void get() {}\n}\n";
        let recipe = RemoveAnnotationAttribute::named(
            "org.springframework.web.bind.annotation.RequestMapping",
            "value",
        );
        let out = run(&recipe, source);
        assert!(out.contains("@RequestMapping(method = RequestMethod.GET)"));
    }

    #[test]
    fn test_missing_attribute_is_no_change() {
        let source = controller("@PathVariable(\"id\") Long id");
        let recipe = RemoveAnnotationAttribute::named(PATH_VARIABLE, "required");
        assert_eq!(run(&recipe, &source), source);
    }

    #[test]
    fn test_unrelated_annotation_untouched() {
        let source = controller("@RequestParam(\"id\") Long id");
        let recipe = RemoveAnnotationAttribute::all_arguments(PATH_VARIABLE);
        assert_eq!(run(&recipe, &source), source);
    }
}
