//! # Spring Migrate
//!
//! A catalog of automated migration recipes for Spring Boot projects.
//! Recipes rewrite Java sources, `.properties` files, and YAML
//! configuration across framework API and configuration-schema changes:
//! renaming property keys, migrating deprecated annotations, converting
//! field injection to constructor injection, and so on.
//!
//! Every recipe follows the same three-stage pipeline: a structural matcher
//! locates target constructs, an edit planner reduces the change to
//! byte-range edits against the original text, and the formatting helpers
//! repair whitespace and imports around the edit. Untouched bytes are
//! carried over verbatim, so a rewrite is a no-op on unrelated text — and
//! re-running any recipe on its own output changes nothing, which lets the
//! runner cycle a whole catalog to a fixpoint.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use spring_migrate::prelude::*;
//!
//! // Rename a property across .properties and .yml files, then migrate
//! // field injection, previewing the changes as a diff.
//! let result = MigrationRun::in_project("./my-service")
//!     .recipe(Box::new(ChangeSpringPropertyKey::new(
//!         "server.servlet.path",
//!         "server.servlet.context-path",
//!     )))
//!     .recipe(Box::new(FieldInjectionToConstructorInjection::default()))
//!     .dry_run()
//!     .apply()?;
//!
//! println!("{}", result.diff());
//! # Ok::<(), spring_migrate::error::MigrateError>(())
//! ```
//!
//! ## Declarative manifests
//!
//! ```rust,no_run
//! use spring_migrate::prelude::*;
//!
//! let recipes = load_manifest(
//!     "recipes:\n  - type: delete-spring-property\n    property: spring.jmx.enabled\n",
//! )?;
//! let result = MigrationRun::in_project(".").recipes(recipes).apply()?;
//! println!("{} file(s) modified", result.files_modified());
//! # Ok::<(), spring_migrate::error::MigrateError>(())
//! ```
//!
//! ## File formats
//!
//! - Java (tree-sitter; the [`lang::LanguageRegistry`] is open for
//!   additional grammars such as Kotlin)
//! - YAML 1.1, including multi-document files
//! - Line-oriented `.properties`

pub mod config;
pub mod diff;
pub mod error;
pub mod format;
pub mod java;
pub mod lang;
pub mod matcher;
pub mod properties;
pub mod recipe;
pub mod text;
pub mod yaml;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{ConfigEntry, ConfigFile};
    pub use crate::diff::DiffSummary;
    pub use crate::error::{MigrateError, Result};
    pub use crate::java::JavaSource;
    pub use crate::java::types::{MethodSignature, NoTypeInfo, SourceTypeTable, TypeResolver};
    pub use crate::lang::{Java, Language, LanguageRegistry, Yaml};
    pub use crate::matcher::{
        AnnotationMatcher, FileMatcher, MethodMatcher, PropertyKeyMatcher,
    };
    pub use crate::properties::PropertiesDocument;
    pub use crate::recipe::catalog::{load_manifest, load_manifest_file};
    pub use crate::recipe::java::{
        ChangeType, ChangeValidationAnnotations, FieldInjectionToConstructorInjection,
        RemoveAnnotationAttribute, RemoveMethodInvocations,
    };
    pub use crate::recipe::properties::{
        AddSpringProperty, ChangeSpringPropertyKey, ChangeSpringPropertyValue,
        CommentOutSpringPropertyKey, DeleteSpringProperty, ExpandYamlProperties,
    };
    pub use crate::recipe::{
        ExecutionContext, FileChange, MigrationRun, Recipe, RunReport, RunResult,
    };
    pub use crate::text::{TextEdit, apply_edits};
    pub use crate::yaml::YamlDocument;
}

pub use prelude::*;
