//! YAML language support.

use super::Language;
use tree_sitter::Language as TsLanguage;

/// YAML 1.1 documents, including multi-document files.
pub struct Yaml;

impl Language for Yaml {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn extensions(&self) -> &[&'static str] {
        &["yml", "yaml"]
    }

    fn grammar(&self) -> TsLanguage {
        tree_sitter_yaml::LANGUAGE.into()
    }
}
