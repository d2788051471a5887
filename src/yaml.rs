//! Position-preserving model of Spring YAML configuration files.
//!
//! tree-sitter supplies the parse tree; this module flattens every mapping
//! pair into a [`YamlPair`] carrying its key path and byte spans, and turns
//! mutations into [`TextEdit`]s. A logical key like `server.servlet.path`
//! may appear as a nested mapping chain, as a dotted scalar key, or as a mix
//! of both; the pair index makes all three addressable the same way.

use crate::error::Result;
use crate::format::{full_line_span, line_end_after};
use crate::lang::{Language, Yaml};
use crate::matcher::binding::PropertyKeyMatcher;
use crate::text::TextEdit;
use std::ops::Range;
use tree_sitter::{Node, Tree};

/// One mapping pair, flattened with its full key path from the document root.
#[derive(Debug, Clone)]
pub struct YamlPair {
    /// Raw key segments from the root; one per enclosing pair. A segment may
    /// itself be a dotted scalar.
    pub path: Vec<String>,
    /// This pair's own key text, unquoted.
    pub key_text: String,
    /// Byte span of the key scalar.
    pub key_span: Range<usize>,
    /// Byte span of the value node, if the pair has one.
    pub value_span: Option<Range<usize>>,
    /// Byte span of the whole pair, including a nested block value.
    pub pair_span: Range<usize>,
    /// Column the key starts at.
    pub indent: usize,
    /// Which `---`-separated document the pair belongs to.
    pub doc_index: usize,
    /// True when the value is a mapping (block or flow).
    pub is_mapping: bool,
    /// True for flow-style pairs (`{a: 1}`), which support value edits only.
    pub is_flow: bool,
    /// Scalar/sequence value text; None for mappings and missing values.
    pub value_text: Option<String>,
    /// True when the value starts on the same line as the key.
    pub value_on_key_line: bool,
}

impl YamlPair {
    /// The flattened dotted key.
    pub fn flat_key(&self) -> String {
        self.path.join(".")
    }

    /// Path segments as string slices, for matching.
    pub fn segments(&self) -> Vec<&str> {
        self.path.iter().map(|s| s.as_str()).collect()
    }

    /// True for a pair holding a scalar or sequence value.
    pub fn is_leaf(&self) -> bool {
        !self.is_mapping
    }
}

/// A parsed YAML file with a flattened pair index.
pub struct YamlDocument {
    source: String,
    tree: Tree,
    pairs: Vec<YamlPair>,
    indent_unit: usize,
}

impl YamlDocument {
    /// Parses a YAML file and builds the pair index.
    pub fn parse(source: &str) -> Result<Self> {
        let tree = Yaml.parse(source)?;
        let mut pairs = Vec::new();
        let root = tree.root_node();
        let mut doc_index = 0;
        {
            let mut cursor = root.walk();
            for child in root.children(&mut cursor) {
                if child.kind() == "document" {
                    collect_pairs(child, source, &mut Vec::new(), doc_index, &mut pairs);
                    doc_index += 1;
                }
            }
        }
        let indent_unit = detect_indent_unit(&pairs);
        Ok(Self {
            source: source.to_string(),
            tree,
            pairs,
            indent_unit,
        })
    }

    /// Returns the original source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns all pairs in document order.
    pub fn pairs(&self) -> &[YamlPair] {
        &self.pairs
    }

    /// Returns the detected indentation step.
    pub fn indent_unit(&self) -> usize {
        self.indent_unit
    }

    /// Returns true if the parse tree contains errors.
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Leaf pairs whose full path matches the key.
    pub fn find(&self, matcher: &PropertyKeyMatcher) -> Vec<&YamlPair> {
        self.pairs
            .iter()
            .filter(|p| p.is_leaf() && matcher.matches_path(&p.segments()))
            .collect()
    }

    /// Returns the value of the first matching leaf key.
    pub fn value_of(&self, matcher: &PropertyKeyMatcher) -> Option<&str> {
        self.pairs
            .iter()
            .find(|p| p.is_leaf() && matcher.matches_path(&p.segments()))
            .and_then(|p| p.value_text.as_deref())
    }

    /// Replaces a pair's value.
    pub fn set_value(&self, pair: &YamlPair, new_value: &str) -> TextEdit {
        match &pair.value_span {
            Some(span) => TextEdit::replace(span.clone(), new_value),
            None => TextEdit::insert(pair.pair_span.end, format!(" {new_value}")),
        }
    }

    /// Adds a key in nested block style, reusing the deepest existing prefix
    /// mapping. Returns no edits when the key already exists, and declines
    /// (empty plan) when a prefix of the key is bound to a scalar.
    pub fn add(&self, key: &str, value: &str, comment: Option<&str>) -> Vec<TextEdit> {
        let matcher = PropertyKeyMatcher::relaxed(key);
        if self
            .pairs
            .iter()
            .any(|p| matcher.matches_path(&p.segments()))
        {
            return Vec::new();
        }

        let segments: Vec<&str> = key.split('.').collect();
        // Deepest pair covering a strict prefix of the key in document 0.
        let mut host: Option<&YamlPair> = None;
        let mut consumed = 0;
        for pair in self.pairs.iter().filter(|p| p.doc_index == 0) {
            let path = pair.segments();
            let prefix = PropertyKeyMatcher::relaxed(path.join("."));
            if let Some(n) = prefix.match_prefix(&segments) {
                if n < segments.len() && n > consumed {
                    if !pair.is_mapping {
                        // Key prefix already bound to a scalar: conflict.
                        return Vec::new();
                    }
                    host = Some(pair);
                    consumed = n;
                }
            }
        }

        let remaining = &segments[consumed..];
        let (insert_at, base_indent) = match host {
            Some(pair) => {
                let child_indent = self
                    .pairs
                    .iter()
                    .find(|p| {
                        p.path.len() == pair.path.len() + 1
                            && p.path[..pair.path.len()] == pair.path[..]
                    })
                    .map(|p| p.indent)
                    .unwrap_or(pair.indent + self.indent_unit);
                (line_end_after(&self.source, pair.pair_span.end), child_indent)
            }
            None => (self.insertion_point_for_new_root(), 0),
        };

        let mut text = String::new();
        if insert_at == self.source.len() && !self.source.is_empty() && !self.source.ends_with('\n')
        {
            text.push('\n');
        }
        if let Some(comment) = comment {
            text.push_str(&format!("{}# {}\n", " ".repeat(base_indent), comment));
        }
        text.push_str(&nested_block(remaining, value, base_indent, self.indent_unit));
        vec![TextEdit::insert(insert_at, text)]
    }

    /// Removes a pair and any ancestor mappings left empty by the removal.
    /// Flow-style pairs are declined (empty plan).
    pub fn delete(&self, pair: &YamlPair) -> Vec<TextEdit> {
        if pair.is_flow {
            return Vec::new();
        }
        let mut doomed = pair;
        loop {
            let parent_path = &doomed.path[..doomed.path.len() - 1];
            if parent_path.is_empty() {
                break;
            }
            let siblings = self
                .pairs
                .iter()
                .filter(|p| {
                    p.doc_index == doomed.doc_index
                        && p.path.len() == doomed.path.len()
                        && p.path[..parent_path.len()] == *parent_path
                })
                .count();
            if siblings > 1 {
                break;
            }
            match self.pairs.iter().find(|p| {
                p.doc_index == doomed.doc_index && p.path == parent_path && p.is_mapping
            }) {
                Some(parent) => doomed = parent,
                None => break,
            }
        }
        vec![TextEdit::delete(full_line_span(&self.source, &doomed.pair_span))]
    }

    /// Comments a pair (and its nested block) out, optionally inserting an
    /// explanatory header comment above it.
    pub fn comment_out(
        &self,
        pair: &YamlPair,
        comment: &str,
        with_header: bool,
    ) -> Vec<TextEdit> {
        if pair.is_flow {
            return Vec::new();
        }
        let span = full_line_span(&self.source, &pair.pair_span);
        let mut edits = Vec::new();
        if with_header {
            edits.push(TextEdit::insert(
                span.start,
                format!("{}# {}\n", " ".repeat(pair.indent), comment),
            ));
        }
        let mut at = span.start;
        while at < span.end {
            if !self.source[at..span.end].trim_start().is_empty() {
                edits.push(TextEdit::insert(at, "# ".to_string()));
            }
            at = match self.source[at..span.end].find('\n') {
                Some(i) => at + i + 1,
                None => span.end,
            };
        }
        edits
    }

    /// Renames the part of a pair's key covered by the matcher, keeping any
    /// subkey suffix. Only renames that preserve the pair's position in the
    /// mapping hierarchy are attempted: the new key must nest under the same
    /// ancestors, otherwise the pair would have to move and the rename is
    /// declined (None).
    pub fn rename_key(
        &self,
        pair: &YamlPair,
        matcher: &PropertyKeyMatcher,
        new_key: &str,
    ) -> Option<TextEdit> {
        use crate::matcher::binding::{canonical_fragments, fragment_boundaries};

        let parent = &pair.path[..pair.path.len() - 1];
        let parent_fragments: Vec<String> = parent
            .iter()
            .flat_map(|s| canonical_fragments(s))
            .collect();
        let pattern = matcher.fragments();
        if parent_fragments.len() >= pattern.len()
            || parent_fragments[..] != pattern[..parent_fragments.len()]
        {
            return None;
        }

        // The pair's own key must carry the rest of the pattern.
        let rest = &pattern[parent_fragments.len()..];
        let key_fragments = canonical_fragments(&pair.key_text);
        if key_fragments.len() < rest.len() || key_fragments[..rest.len()] != rest[..] {
            return None;
        }

        // The replacement is the tail of the new key below the surviving
        // ancestors; the split must fall on a `.` boundary of the new key.
        let new_fragments = canonical_fragments(new_key);
        if new_fragments.len() < parent_fragments.len()
            || new_fragments[..parent_fragments.len()] != parent_fragments[..]
        {
            return None;
        }
        let new_tail = if parent_fragments.is_empty() {
            new_key
        } else {
            let bounds = fragment_boundaries(new_key);
            let cut = bounds[parent_fragments.len() - 1].end;
            if new_key.as_bytes().get(cut) != Some(&b'.') {
                return None;
            }
            &new_key[cut + 1..]
        };

        let mut replacement = new_tail.to_string();
        if key_fragments.len() > rest.len() {
            // Subkey suffix inside the same scalar stays.
            let bounds = fragment_boundaries(&pair.key_text);
            let suffix_start = bounds[rest.len()].start;
            let suffix = &pair.key_text[suffix_start..];
            let joined_by_separator = pair.key_text[..suffix_start].ends_with(['.', '-', '_']);
            if !joined_by_separator {
                replacement.push('.');
            } else {
                replacement.push(pair.key_text.as_bytes()[suffix_start - 1] as char);
            }
            replacement.push_str(suffix);
        }

        Some(TextEdit::replace(pair.key_span.clone(), replacement))
    }

    /// Rewrites dot-joined scalar keys into nested mappings, coalescing
    /// siblings that share a prefix and merging into existing sibling
    /// mappings. A group containing conflicting keys (one key both scalar
    /// and mapping) is left untouched.
    pub fn expand(&self) -> Vec<TextEdit> {
        use std::collections::BTreeMap;

        let mut groups: BTreeMap<(usize, Vec<String>), Vec<&YamlPair>> = BTreeMap::new();
        for pair in &self.pairs {
            if pair.is_flow || !pair.key_text.contains('.') {
                continue;
            }
            if pair.is_mapping || !pair.value_on_key_line {
                // Reindenting a block value is not a safe text move.
                continue;
            }
            let parent = pair.path[..pair.path.len() - 1].to_vec();
            groups.entry((pair.doc_index, parent)).or_default().push(pair);
        }

        let mut edits = Vec::new();
        'group: for ((doc_index, parent), candidates) in groups {
            let mut trie = Trie::default();
            for pair in &candidates {
                let segments: Vec<&str> = pair.key_text.split('.').collect();
                if !trie.insert(&segments, pair.value_text.clone().unwrap_or_default()) {
                    continue 'group;
                }
            }

            let siblings: Vec<&YamlPair> = self
                .pairs
                .iter()
                .filter(|p| {
                    p.doc_index == doc_index
                        && p.path.len() == parent.len() + 1
                        && p.path[..parent.len()] == parent[..]
                        && p.is_mapping
                        && !p.key_text.contains('.')
                })
                .collect();

            let mut group_edits = Vec::new();
            let mut fresh = String::new();
            let indent = candidates[0].indent;
            for (segment, node) in &trie.children {
                match siblings
                    .iter()
                    .find(|s| crate::matcher::binding::segments_equivalent(&s.key_text, segment))
                {
                    Some(host) => {
                        let Some(insert) = self.merge_into(host, node) else {
                            continue 'group;
                        };
                        group_edits.extend(insert);
                    }
                    None => {
                        fresh.push_str(&render_trie(
                            segment,
                            node,
                            indent,
                            self.indent_unit,
                        ));
                    }
                }
            }

            for pair in &candidates {
                group_edits.push(TextEdit::delete(full_line_span(
                    &self.source,
                    &pair.pair_span,
                )));
            }
            if !fresh.is_empty() {
                let anchor = full_line_span(&self.source, &candidates[0].pair_span);
                group_edits.push(TextEdit::insert(anchor.start, fresh));
            }
            edits.extend(group_edits);
        }
        edits
    }

    /// Plans insertion of a trie subtree into an existing mapping pair,
    /// descending through prefixes that already exist. Returns None when a
    /// segment on the way down is bound to a scalar.
    fn merge_into(&self, host: &YamlPair, node: &Trie) -> Option<Vec<TextEdit>> {
        let mut edits = Vec::new();
        if node.value.is_some() {
            return None;
        }
        for (segment, child) in &node.children {
            let existing = self.pairs.iter().find(|p| {
                p.doc_index == host.doc_index
                    && p.path.len() == host.path.len() + 1
                    && p.path[..host.path.len()] == host.path[..]
                    && crate::matcher::binding::segments_equivalent(&p.key_text, segment)
            });
            match existing {
                Some(deeper) if deeper.is_mapping => {
                    edits.extend(self.merge_into(deeper, child)?);
                }
                Some(_) => return None,
                None => {
                    let child_indent = self
                        .pairs
                        .iter()
                        .find(|p| {
                            p.path.len() == host.path.len() + 1
                                && p.path[..host.path.len()] == host.path[..]
                        })
                        .map(|p| p.indent)
                        .unwrap_or(host.indent + self.indent_unit);
                    let at = line_end_after(&self.source, host.pair_span.end);
                    edits.push(TextEdit::insert(
                        at,
                        render_trie(segment, child, child_indent, self.indent_unit),
                    ));
                }
            }
        }
        Some(edits)
    }

    fn insertion_point_for_new_root(&self) -> usize {
        // Append to the end of the first document, before any `---` that
        // starts a second one.
        let root = self.tree.root_node();
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            if child.kind() == "document" {
                return line_end_after(&self.source, child.end_byte());
            }
        }
        self.source.len()
    }
}

fn collect_pairs(
    node: Node,
    source: &str,
    path: &mut Vec<String>,
    doc_index: usize,
    out: &mut Vec<YamlPair>,
) {
    if node.kind() == "block_mapping_pair" || node.kind() == "flow_pair" {
        let Some(key) = node.child_by_field_name("key") else {
            return;
        };
        let key_text = scalar_text(key, source);
        let value = node.child_by_field_name("value");
        let mapping = value.map(|v| is_mapping_node(v)).unwrap_or(false);
        let value_text = match value {
            Some(v) if !mapping => Some(node_text(v, source).trim().to_string()),
            _ => None,
        };

        path.push(key_text.clone());
        out.push(YamlPair {
            path: path.clone(),
            key_text,
            key_span: key.byte_range(),
            value_span: value.map(|v| v.byte_range()),
            pair_span: node.byte_range(),
            indent: key.start_position().column,
            doc_index,
            is_mapping: mapping,
            is_flow: node.kind() == "flow_pair",
            value_text,
            value_on_key_line: value
                .map(|v| v.start_position().row == key.start_position().row)
                .unwrap_or(true),
        });
        if let Some(v) = value {
            let mut cursor = v.walk();
            for child in v.children(&mut cursor) {
                collect_pairs(child, source, path, doc_index, out);
            }
        }
        path.pop();
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_pairs(child, source, path, doc_index, out);
    }
}

fn is_mapping_node(value: Node) -> bool {
    let mut cursor = value.walk();
    for child in value.children(&mut cursor) {
        match child.kind() {
            "block_mapping" | "flow_mapping" => return true,
            "block_node" | "flow_node" => {
                if is_mapping_node(child) {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}

fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    &source[node.byte_range()]
}

/// Unquoted text of a key scalar.
fn scalar_text(node: Node, source: &str) -> String {
    let text = node_text(node, source).trim();
    let stripped = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .or_else(|| text.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')));
    stripped.unwrap_or(text).to_string()
}

fn detect_indent_unit(pairs: &[YamlPair]) -> usize {
    let mut unit = usize::MAX;
    for pair in pairs {
        for other in pairs {
            if other.path.len() == pair.path.len() + 1
                && other.path[..pair.path.len()] == pair.path[..]
                && other.indent > pair.indent
            {
                unit = unit.min(other.indent - pair.indent);
            }
        }
    }
    if unit == usize::MAX { 2 } else { unit }
}

/// Builds a nested block `a:\n  b:\n    c: value\n`.
pub fn nested_block(segments: &[&str], value: &str, base_indent: usize, unit: usize) -> String {
    let mut text = String::new();
    for (i, segment) in segments.iter().enumerate() {
        let indent = " ".repeat(base_indent + i * unit);
        if i + 1 == segments.len() {
            if value.is_empty() {
                text.push_str(&format!("{indent}{segment}:\n"));
            } else {
                text.push_str(&format!("{indent}{segment}: {value}\n"));
            }
        } else {
            text.push_str(&format!("{indent}{segment}:\n"));
        }
    }
    text
}

/// An insertion-ordered key tree used to coalesce dotted keys.
#[derive(Default)]
struct Trie {
    children: Vec<(String, Trie)>,
    value: Option<String>,
}

impl Trie {
    /// Inserts a path; false on conflict (duplicate leaf, or a key used
    /// both as scalar and as mapping).
    fn insert(&mut self, segments: &[&str], value: String) -> bool {
        match segments.split_first() {
            None => {
                if self.value.is_some() || !self.children.is_empty() {
                    return false;
                }
                self.value = Some(value);
                true
            }
            Some((head, tail)) => {
                if self.value.is_some() {
                    return false;
                }
                let child = match self.children.iter_mut().find(|(k, _)| k == head) {
                    Some((_, c)) => c,
                    None => {
                        self.children.push((head.to_string(), Trie::default()));
                        &mut self.children.last_mut().unwrap().1
                    }
                };
                child.insert(tail, value)
            }
        }
    }
}

fn render_trie(key: &str, node: &Trie, indent: usize, unit: usize) -> String {
    let pad = " ".repeat(indent);
    match &node.value {
        Some(value) if value.is_empty() => format!("{pad}{key}:\n"),
        Some(value) => format!("{pad}{key}: {value}\n"),
        None => {
            let mut text = format!("{pad}{key}:\n");
            for (child_key, child) in &node.children {
                text.push_str(&render_trie(child_key, child, indent + unit, unit));
            }
            text
        }
    }
}
