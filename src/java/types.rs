//! Type attribution seam.
//!
//! Full type resolution belongs to the host toolchain; the engine only
//! depends on this trait. The contract everywhere is conservative: an
//! unresolved type means "unknown", and a predicate that needs type
//! identity answers false on unknown rather than guessing — a false
//! positive would produce a wrong edit, a false negative only misses one.

use super::{JavaSource, imports};
use std::collections::HashMap;
use tree_sitter::Node;

/// A resolved method signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    /// Fully qualified declaring type.
    pub declaring_type: String,
    pub name: String,
    /// Fully qualified parameter types.
    pub parameter_types: Vec<String>,
    /// Fully qualified return type.
    pub return_type: String,
}

/// Supplies resolved type information for expressions and invocations.
pub trait TypeResolver: Send + Sync {
    /// The signature of a method invocation, if known.
    fn invocation_signature(&self, _java: &JavaSource, _node: Node) -> Option<MethodSignature> {
        None
    }

    /// The static type of an expression, if known.
    fn expression_type(&self, _java: &JavaSource, _node: Node) -> Option<String> {
        None
    }

    /// Whether a value of type `from` can stand where `to` is expected.
    /// Without a class hierarchy the only safe answer is type equality.
    fn is_assignable(&self, from: &str, to: &str) -> bool {
        from == to
    }
}

/// The default resolver: knows nothing.
pub struct NoTypeInfo;

impl TypeResolver for NoTypeInfo {}

/// A table-driven resolver built from the source file's own declarations
/// plus signatures registered by the caller.
///
/// Variable types come from field, parameter, and local declarations in the
/// same file, resolved against the import list — a syntactic approximation
/// that is exact for the common single-file case and simply unknown
/// elsewhere. Method signatures must be registered explicitly, keyed by
/// `ReceiverType#name`.
#[derive(Default)]
pub struct SourceTypeTable {
    variables: HashMap<String, String>,
    methods: HashMap<String, MethodSignature>,
}

impl SourceTypeTable {
    /// Builds the variable-type table from a source file.
    pub fn from_source(java: &JavaSource) -> Self {
        let mut variables = HashMap::new();
        java.walk(&mut |node| {
            let declared = match node.kind() {
                "field_declaration" | "local_variable_declaration" => {
                    let ty = node.child_by_field_name("type");
                    let mut cursor = node.walk();
                    let names: Vec<Node> = node
                        .children_by_field_name("declarator", &mut cursor)
                        .filter_map(|d| d.child_by_field_name("name"))
                        .collect();
                    ty.map(|t| (t, names))
                }
                "formal_parameter" => {
                    let ty = node.child_by_field_name("type");
                    let name = node.child_by_field_name("name");
                    ty.map(|t| (t, name.into_iter().collect()))
                }
                _ => None,
            };
            if let Some((ty, names)) = declared {
                let type_text = base_type_name(java.text(ty));
                let fqn = imports::resolve_simple_name(java, &type_text)
                    .or_else(|| java_lang_type(&type_text))
                    .unwrap_or(type_text);
                for name in names {
                    variables.insert(java.text(name).to_string(), fqn.clone());
                }
            }
        });
        Self {
            variables,
            methods: HashMap::new(),
        }
    }

    /// Registers a known method signature.
    pub fn with_method(mut self, signature: MethodSignature) -> Self {
        let key = format!("{}#{}", signature.declaring_type, signature.name);
        self.methods.insert(key, signature);
        self
    }

    /// The declared type of a variable, if the file declares it.
    pub fn variable_type(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(|s| s.as_str())
    }
}

impl TypeResolver for SourceTypeTable {
    fn invocation_signature(&self, java: &JavaSource, node: Node) -> Option<MethodSignature> {
        let name = node.child_by_field_name("name")?;
        let receiver_type = node
            .child_by_field_name("object")
            .and_then(|o| self.expression_type(java, o))?;
        let key = format!("{}#{}", receiver_type, java.text(name));
        self.methods.get(&key).cloned()
    }

    fn expression_type(&self, java: &JavaSource, node: Node) -> Option<String> {
        match node.kind() {
            "identifier" => self.variable_type(java.text(node)).map(String::from),
            "field_access" => {
                let field = node.child_by_field_name("field")?;
                self.variable_type(java.text(field)).map(String::from)
            }
            "method_invocation" => self
                .invocation_signature(java, node)
                .map(|s| s.return_type),
            _ => None,
        }
    }
}

/// Strips generics from a type name: `List<String>` -> `List`.
fn base_type_name(text: &str) -> String {
    text.split('<').next().unwrap_or(text).trim().to_string()
}

/// Implicitly-imported `java.lang` types that appear without an import.
fn java_lang_type(simple: &str) -> Option<String> {
    const JAVA_LANG: &[&str] = &[
        "String", "Object", "Integer", "Long", "Short", "Byte", "Double", "Float", "Boolean",
        "Character", "Number", "Void", "Class", "Iterable", "Runnable", "Thread", "Exception",
        "RuntimeException", "Throwable", "Error", "StringBuilder", "Comparable",
    ];
    if JAVA_LANG.contains(&simple) {
        Some(format!("java.lang.{simple}"))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"import java.util.List;

public class A {
    private List<String> names;

    void run(String label) {
        A other = this;
        names.clear();
    }
}
"#;

    #[test]
    fn test_variable_types_from_declarations() {
        let java = JavaSource::parse(SOURCE).unwrap();
        let table = SourceTypeTable::from_source(&java);
        assert_eq!(table.variable_type("names"), Some("java.util.List"));
        assert_eq!(table.variable_type("label"), Some("java.lang.String"));
        assert_eq!(table.variable_type("other"), Some("A"));
        assert_eq!(table.variable_type("missing"), None);
    }

    #[test]
    fn test_invocation_signature_lookup() {
        let java = JavaSource::parse(SOURCE).unwrap();
        let table = SourceTypeTable::from_source(&java).with_method(MethodSignature {
            declaring_type: "java.util.List".into(),
            name: "clear".into(),
            parameter_types: vec![],
            return_type: "void".into(),
        });
        let invocation = java.nodes_of_kind("method_invocation")[0];
        let signature = table.invocation_signature(&java, invocation).unwrap();
        assert_eq!(signature.name, "clear");
        assert_eq!(signature.declaring_type, "java.util.List");
    }

    #[test]
    fn test_no_type_info_is_conservative() {
        let java = JavaSource::parse(SOURCE).unwrap();
        let invocation = java.nodes_of_kind("method_invocation")[0];
        assert!(NoTypeInfo.invocation_signature(&java, invocation).is_none());
        assert!(NoTypeInfo.is_assignable("A", "A"));
        assert!(!NoTypeInfo.is_assignable("A", "B"));
    }
}
