//! Declarative recipe manifests.
//!
//! A migration is described in YAML and loaded into recipe instances:
//!
//! ```yaml
//! recipes:
//!   - type: change-spring-property-key
//!     old: server.servlet.path
//!     new: server.servlet.context-path
//!   - type: field-injection-to-constructor-injection
//! ```

use super::Recipe;
use super::java::{
    ChangeType, ChangeValidationAnnotations, FieldInjectionToConstructorInjection,
    RemoveAnnotationAttribute, RemoveMethodInvocations,
};
use super::properties::{
    AddSpringProperty, ChangeSpringPropertyKey, ChangeSpringPropertyValue,
    CommentOutSpringPropertyKey, DeleteSpringProperty, ExpandYamlProperties,
};
use crate::error::{MigrateError, Result};
use serde::Deserialize;
use std::path::Path;

/// A migration manifest: the ordered list of recipes to run.
#[derive(Debug, Deserialize)]
pub struct Manifest {
    pub recipes: Vec<RecipeSpec>,
}

/// One recipe entry in a manifest.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RecipeSpec {
    AddSpringProperty {
        property: String,
        value: String,
        #[serde(default)]
        comment: Option<String>,
    },
    ChangeSpringPropertyKey {
        old: String,
        new: String,
        #[serde(default)]
        except: Vec<String>,
    },
    ChangeSpringPropertyValue {
        property: String,
        value: String,
        #[serde(default)]
        old_value: Option<String>,
        #[serde(default)]
        regex: bool,
    },
    DeleteSpringProperty {
        property: String,
    },
    CommentOutSpringPropertyKey {
        property: String,
        comment: String,
    },
    ExpandYamlProperties,
    FieldInjectionToConstructorInjection {
        #[serde(default)]
        annotation: Option<String>,
    },
    RemoveMethodInvocations {
        signatures: Vec<String>,
    },
    RemoveAnnotationAttribute {
        annotation: String,
        #[serde(default)]
        attribute: Option<String>,
    },
    ChangeType {
        old: String,
        new: String,
    },
    ChangeValidationAnnotations,
}

impl RecipeSpec {
    /// Instantiates the recipe this entry describes.
    pub fn into_recipe(self) -> Result<Box<dyn Recipe>> {
        Ok(match self {
            Self::AddSpringProperty {
                property,
                value,
                comment,
            } => {
                let mut recipe = AddSpringProperty::new(property, value);
                if let Some(comment) = comment {
                    recipe = recipe.with_comment(comment);
                }
                Box::new(recipe)
            }
            Self::ChangeSpringPropertyKey { old, new, except } => {
                let mut recipe = ChangeSpringPropertyKey::new(old, new);
                for sub in except {
                    recipe = recipe.except(sub);
                }
                Box::new(recipe)
            }
            Self::ChangeSpringPropertyValue {
                property,
                value,
                old_value,
                regex,
            } => {
                let mut recipe = ChangeSpringPropertyValue::new(property, value);
                if let Some(old_value) = old_value {
                    recipe = recipe.when_old_value(old_value);
                }
                if regex {
                    recipe = recipe.regex();
                }
                Box::new(recipe)
            }
            Self::DeleteSpringProperty { property } => {
                Box::new(DeleteSpringProperty::new(property))
            }
            Self::CommentOutSpringPropertyKey { property, comment } => {
                Box::new(CommentOutSpringPropertyKey::new(property, comment))
            }
            Self::ExpandYamlProperties => Box::new(ExpandYamlProperties),
            Self::FieldInjectionToConstructorInjection { annotation } => match annotation {
                Some(fqn) => Box::new(FieldInjectionToConstructorInjection::new(fqn)),
                None => Box::new(FieldInjectionToConstructorInjection::default()),
            },
            Self::RemoveMethodInvocations { signatures } => {
                Box::new(RemoveMethodInvocations::new(signatures)?)
            }
            Self::RemoveAnnotationAttribute {
                annotation,
                attribute,
            } => match attribute {
                Some(name) => Box::new(RemoveAnnotationAttribute::named(annotation, name)),
                None => Box::new(RemoveAnnotationAttribute::all_arguments(annotation)),
            },
            Self::ChangeType { old, new } => Box::new(ChangeType::new(old, new)),
            Self::ChangeValidationAnnotations => Box::new(ChangeValidationAnnotations),
        })
    }
}

/// Loads a manifest from YAML text.
pub fn load_manifest(text: &str) -> Result<Vec<Box<dyn Recipe>>> {
    let manifest: Manifest = serde_yaml::from_str(text)?;
    if manifest.recipes.is_empty() {
        return Err(MigrateError::InvalidManifest(
            "manifest declares no recipes".to_string(),
        ));
    }
    manifest
        .recipes
        .into_iter()
        .map(RecipeSpec::into_recipe)
        .collect()
}

/// Loads a manifest from a file.
pub fn load_manifest_file(path: &Path) -> Result<Vec<Box<dyn Recipe>>> {
    load_manifest(&std::fs::read_to_string(path)?)
}

/// Names and descriptions of every recipe the manifest format can declare.
pub fn builtin_recipes() -> Vec<(&'static str, &'static str)> {
    vec![
        ("add-spring-property", "Add a configuration property if it is not already present"),
        ("change-spring-property-key", "Rename a configuration property key, keeping subkeys"),
        ("change-spring-property-value", "Change the value of a configuration property"),
        ("delete-spring-property", "Remove a configuration property and its subkeys"),
        ("comment-out-spring-property-key", "Disable a configuration property by commenting it out"),
        ("expand-yaml-properties", "Rewrite dotted YAML keys into nested mappings"),
        ("field-injection-to-constructor-injection", "Convert annotated field injection to constructor injection"),
        ("remove-method-invocations", "Delete calls to the given methods, preserving surrounding chains"),
        ("remove-annotation-attribute", "Remove an argument from an annotation"),
        ("change-type", "Rewrite references to a renamed type"),
        ("change-validation-annotations", "Migrate deprecated Hibernate validation constraints to javax.validation"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_manifest() {
        let recipes = load_manifest(
            r#"
recipes:
  - type: change-spring-property-key
    old: server.servlet.path
    new: server.servlet.context-path
    except: [extra]
  - type: add-spring-property
    property: spring.main.banner-mode
    value: "off"
  - type: field-injection-to-constructor-injection
  - type: remove-method-invocations
    signatures:
      - "org.slf4j.Logger debug(..)"
"#,
        )
        .unwrap();
        assert_eq!(recipes.len(), 4);
        assert_eq!(recipes[0].name(), "change-spring-property-key");
        assert_eq!(recipes[3].name(), "remove-method-invocations");
    }

    #[test]
    fn test_empty_manifest_rejected() {
        assert!(load_manifest("recipes: []").is_err());
    }

    #[test]
    fn test_unknown_recipe_type_rejected() {
        assert!(load_manifest("recipes:\n  - type: does-not-exist\n").is_err());
    }

    #[test]
    fn test_invalid_signature_pattern_rejected() {
        let result = load_manifest(
            "recipes:\n  - type: remove-method-invocations\n    signatures: [\"no-parens\"]\n",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_every_builtin_has_distinct_name() {
        let names: Vec<&str> = builtin_recipes().iter().map(|(n, _)| *n).collect();
        let mut deduped = names.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(names.len(), deduped.len());
    }
}
