//! Method signature patterns with `*` and `..` wildcards.
//!
//! The pattern grammar is `<receiver-type> <method-name>(<parameters>)`:
//!
//! - `java.util.List add(..)` — any overload of `List.add`
//! - `org.example..* set*(java.lang.String)` — setters taking one String on
//!   any type under `org.example`
//! - `*..* toString()` — `toString()` on any type
//!
//! In a type position `*` matches exactly one dotted segment and `..` any
//! number (including zero); in the parameter list `*` matches one argument
//! and `..` any tail. Matching prefers resolved signatures from the
//! [`TypeResolver`]; without resolution it degrades to syntactic name
//! matching, and only for patterns whose type and parameter positions are
//! all wildcards — a concrete type position that cannot be checked is a
//! non-match, never an assumed match.

use crate::error::{MigrateError, Result};
use crate::java::JavaSource;
use crate::java::types::{MethodSignature, TypeResolver};
use tree_sitter::Node;

/// A parsed method pattern.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    type_segments: Vec<String>,
    name_pattern: String,
    parameters: Vec<String>,
}

impl MethodMatcher {
    /// Parses a `<type> <name>(<params>)` pattern.
    pub fn parse(pattern: &str) -> Result<Self> {
        let invalid = |message: &str| MigrateError::InvalidPattern {
            pattern: pattern.to_string(),
            message: message.to_string(),
        };

        let open = pattern.find('(').ok_or_else(|| invalid("missing '('"))?;
        if !pattern.trim_end().ends_with(')') {
            return Err(invalid("missing ')'"));
        }
        let head = pattern[..open].trim();
        let args = pattern[open + 1..pattern.trim_end().len() - 1].trim();

        let (type_part, name_part) = head
            .rsplit_once(char::is_whitespace)
            .ok_or_else(|| invalid("expected '<type> <name>(..)'"))?;
        let name_part = name_part.trim();
        if name_part.is_empty() {
            return Err(invalid("empty method name"));
        }

        let parameters = if args.is_empty() {
            Vec::new()
        } else {
            args.split(',').map(|a| a.trim().to_string()).collect()
        };

        Ok(Self {
            type_segments: parse_type_segments(type_part.trim()),
            name_pattern: name_part.to_string(),
            parameters,
        })
    }

    /// Matches a resolved signature.
    pub fn matches_signature(&self, signature: &MethodSignature) -> bool {
        if !glob_match(&self.name_pattern, &signature.name) {
            return false;
        }
        let target: Vec<&str> = signature.declaring_type.split('.').collect();
        let pattern: Vec<&str> = self.type_segments.iter().map(|s| s.as_str()).collect();
        if !segments_match(&pattern, &target) {
            return false;
        }
        let params: Vec<&str> = signature
            .parameter_types
            .iter()
            .map(|s| s.as_str())
            .collect();
        let param_patterns: Vec<&str> = self.parameters.iter().map(|s| s.as_str()).collect();
        parameters_match(&param_patterns, &params)
    }

    /// Matches a `method_invocation` node, using the resolver when it can
    /// supply a signature and degrading to syntactic matching otherwise.
    pub fn matches_invocation(
        &self,
        java: &JavaSource,
        node: Node,
        resolver: &dyn TypeResolver,
    ) -> bool {
        if node.kind() != "method_invocation" {
            return false;
        }
        if let Some(signature) = resolver.invocation_signature(java, node) {
            return self.matches_signature(&signature);
        }

        // Degraded path: only patterns that assert nothing about types may
        // match without type information.
        if !self.type_is_wildcard() || !self.parameters_are_wildcard() {
            return false;
        }
        let name = node
            .child_by_field_name("name")
            .map(|n| java.text(n))
            .unwrap_or("");
        if !glob_match(&self.name_pattern, name) {
            return false;
        }
        let arg_count = node
            .child_by_field_name("arguments")
            .map(|a| a.named_child_count())
            .unwrap_or(0);
        self.parameter_count_matches(arg_count)
    }

    /// True when every type segment is a wildcard.
    pub fn type_is_wildcard(&self) -> bool {
        self.type_segments.iter().all(|s| s == "*" || s == "..")
    }

    fn parameters_are_wildcard(&self) -> bool {
        self.parameters.iter().all(|p| p == "*" || p == "..")
    }

    fn parameter_count_matches(&self, count: usize) -> bool {
        if self.parameters.iter().any(|p| p == "..") {
            let fixed = self.parameters.iter().filter(|p| *p != "..").count();
            count >= fixed
        } else {
            self.parameters.len() == count
        }
    }
}

/// Splits a type pattern on dots; the empty segment a `..` leaves behind
/// becomes the any-segments wildcard.
fn parse_type_segments(pattern: &str) -> Vec<String> {
    pattern
        .split('.')
        .map(|s| if s.is_empty() { "..".to_string() } else { s.to_string() })
        .collect()
}

/// Matches dotted-segment patterns where `*` consumes one segment and `..`
/// any number.
fn segments_match(pattern: &[&str], target: &[&str]) -> bool {
    match pattern.split_first() {
        None => target.is_empty(),
        Some((&"..", rest)) => (0..=target.len())
            .any(|skip| segments_match(rest, &target[skip..])),
        Some((&seg, rest)) => match target.split_first() {
            Some((&head, tail)) => glob_match(seg, head) && segments_match(rest, tail),
            None => false,
        },
    }
}

/// Matches parameter-type patterns; `*` consumes one parameter, `..` any
/// run of them, and anything else is a dotted type pattern.
fn parameters_match(pattern: &[&str], params: &[&str]) -> bool {
    match pattern.split_first() {
        None => params.is_empty(),
        Some((&"..", rest)) => (0..=params.len())
            .any(|skip| parameters_match(rest, &params[skip..])),
        Some((&"*", rest)) => match params.split_first() {
            Some((_, tail)) => parameters_match(rest, tail),
            None => false,
        },
        Some((&ty, rest)) => match params.split_first() {
            Some((&head, tail)) => {
                let type_pattern = parse_type_segments(ty);
                let pattern_refs: Vec<&str> = type_pattern.iter().map(|s| s.as_str()).collect();
                let target: Vec<&str> = head.split('.').collect();
                segments_match(&pattern_refs, &target) && parameters_match(rest, tail)
            }
            None => false,
        },
    }
}

/// Glob matching with `*` only.
fn glob_match(pattern: &str, text: &str) -> bool {
    fn inner(p: &[u8], t: &[u8]) -> bool {
        match p.split_first() {
            None => t.is_empty(),
            Some((&b'*', rest)) => (0..=t.len()).any(|skip| inner(rest, &t[skip..])),
            Some((&c, rest)) => match t.split_first() {
                Some((&h, tail)) => c == h && inner(rest, tail),
                None => false,
            },
        }
    }
    inner(pattern.as_bytes(), text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::java::types::{NoTypeInfo, SourceTypeTable};

    fn sig(ty: &str, name: &str, params: &[&str]) -> MethodSignature {
        MethodSignature {
            declaring_type: ty.into(),
            name: name.into(),
            parameter_types: params.iter().map(|s| s.to_string()).collect(),
            return_type: "void".into(),
        }
    }

    #[test]
    fn test_exact_match() {
        let m = MethodMatcher::parse("java.util.List add(java.lang.Object)").unwrap();
        assert!(m.matches_signature(&sig("java.util.List", "add", &["java.lang.Object"])));
        assert!(!m.matches_signature(&sig("java.util.List", "add", &["java.lang.String"])));
        assert!(!m.matches_signature(&sig("java.util.Set", "add", &["java.lang.Object"])));
    }

    #[test]
    fn test_dotdot_in_package() {
        let m = MethodMatcher::parse("org.springframework..* get*()").unwrap();
        assert!(m.matches_signature(&sig(
            "org.springframework.http.ResponseEntity",
            "getBody",
            &[]
        )));
        assert!(!m.matches_signature(&sig("org.example.Thing", "getBody", &[])));
    }

    #[test]
    fn test_dotdot_matches_zero_segments() {
        let m = MethodMatcher::parse("org.example..Builder build(..)").unwrap();
        assert!(m.matches_signature(&sig("org.example.Builder", "build", &[])));
        assert!(m.matches_signature(&sig("org.example.deep.nested.Builder", "build", &["A"])));
    }

    #[test]
    fn test_parameter_wildcards() {
        let m = MethodMatcher::parse("a.B f(java.lang.String, ..)").unwrap();
        assert!(m.matches_signature(&sig("a.B", "f", &["java.lang.String"])));
        assert!(m.matches_signature(&sig("a.B", "f", &["java.lang.String", "int", "int"])));
        assert!(!m.matches_signature(&sig("a.B", "f", &["int"])));

        let single = MethodMatcher::parse("a.B f(*)").unwrap();
        assert!(single.matches_signature(&sig("a.B", "f", &["int"])));
        assert!(!single.matches_signature(&sig("a.B", "f", &[])));
    }

    #[test]
    fn test_invalid_patterns_rejected() {
        assert!(MethodMatcher::parse("java.util.List add").is_err());
        assert!(MethodMatcher::parse("add()").is_err());
    }

    #[test]
    fn test_degraded_match_requires_wildcard_type() {
        let java = JavaSource::parse("class A { void f(B b) { b.deprecatedCall(); } }").unwrap();
        let invocation = java.nodes_of_kind("method_invocation")[0];

        let wildcard = MethodMatcher::parse("*..* deprecatedCall()").unwrap();
        assert!(wildcard.matches_invocation(&java, invocation, &NoTypeInfo));

        // A concrete receiver type cannot be verified without resolution.
        let concrete = MethodMatcher::parse("com.x.B deprecatedCall()").unwrap();
        assert!(!concrete.matches_invocation(&java, invocation, &NoTypeInfo));
    }

    #[test]
    fn test_resolved_match_with_source_table() {
        let source = "class A { void f(com.x.B b) { b.call(); } }";
        let java = JavaSource::parse(source).unwrap();
        let invocation = java.nodes_of_kind("method_invocation")[0];
        let table = SourceTypeTable::from_source(&java).with_method(MethodSignature {
            declaring_type: "com.x.B".into(),
            name: "call".into(),
            parameter_types: vec![],
            return_type: "void".into(),
        });

        let concrete = MethodMatcher::parse("com.x.B call()").unwrap();
        assert!(concrete.matches_invocation(&java, invocation, &table));
    }
}
