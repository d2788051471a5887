//! Lossless line model for Java `.properties` files.
//!
//! There is no grammar crate for the format, so the document is parsed into
//! line records that keep every byte position. All mutations are expressed
//! as [`TextEdit`]s against the original source, which preserves comments,
//! blank lines and key/value spacing that the edit does not touch.

use crate::matcher::binding::PropertyKeyMatcher;
use crate::text::TextEdit;
use std::ops::Range;

/// One `key=value` entry with its byte spans in the source.
#[derive(Debug, Clone)]
pub struct PropertyEntry {
    /// Raw key text as written (escapes untouched).
    pub key: String,
    /// Logical value with line continuations resolved.
    pub value: String,
    /// Byte span of the key text.
    pub key_span: Range<usize>,
    /// Byte span of the raw value text, including continuation lines.
    pub value_span: Range<usize>,
    /// Byte span of the whole entry: from line start through the trailing
    /// newline of its last continuation line.
    pub line_span: Range<usize>,
    /// False for a bare `key` line with no `=`/`:` separator.
    pub has_separator: bool,
}

/// A parsed properties file.
#[derive(Debug, Clone)]
pub struct PropertiesDocument {
    source: String,
    entries: Vec<PropertyEntry>,
}

impl PropertiesDocument {
    /// Parses a properties file. Parsing never fails: unrecognizable lines
    /// are simply not entries and are left untouched by every edit.
    pub fn parse(source: &str) -> Self {
        let mut entries = Vec::new();
        let bytes = source.as_bytes();
        let mut pos = 0;

        while pos < bytes.len() {
            let line_start = pos;
            let line_end = line_boundary(source, pos);
            let line = &source[line_start..line_end];
            pos = next_line_start(source, line_end);

            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }

            let indent = line.len() - trimmed.len();
            let content_start = line_start + indent;
            let sep = separator_offset(trimmed);

            let (raw_key, value_offset) = match sep {
                Some(i) => (&trimmed[..i], i + 1),
                None => (trimmed, trimmed.len()),
            };
            let key = raw_key.trim_end();
            let key_span = content_start..content_start + key.len();

            let value_raw_start = content_start
                + value_offset
                + trimmed[value_offset..]
                    .len()
                    .saturating_sub(trimmed[value_offset..].trim_start().len());

            // Follow line continuations: a value line ending in an odd number
            // of backslashes continues on the next line.
            let mut value = trimmed[value_offset..].trim_start().to_string();
            let mut value_end = line_end;
            let mut entry_end = pos;
            while ends_in_continuation(&value) && entry_end < source.len() {
                value.pop();
                let cont_start = entry_end;
                let cont_end = line_boundary(source, cont_start);
                value.push_str(source[cont_start..cont_end].trim_start());
                value_end = cont_end;
                entry_end = next_line_start(source, cont_end);
            }
            pos = entry_end;

            entries.push(PropertyEntry {
                key: key.to_string(),
                value,
                key_span,
                value_span: value_raw_start..value_end,
                line_span: line_start..entry_end,
                has_separator: sep.is_some(),
            });
        }

        Self {
            source: source.to_string(),
            entries,
        }
    }

    /// Returns the original source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns all entries in file order.
    pub fn entries(&self) -> &[PropertyEntry] {
        &self.entries
    }

    /// Returns entries whose key matches.
    pub fn find(&self, matcher: &PropertyKeyMatcher) -> Vec<&PropertyEntry> {
        self.entries
            .iter()
            .filter(|e| matcher.matches(&e.key))
            .collect()
    }

    /// Returns the value of the first matching key.
    pub fn value_of(&self, matcher: &PropertyKeyMatcher) -> Option<&str> {
        self.find(matcher).first().map(|e| e.value.as_str())
    }

    /// Replaces an entry's value.
    pub fn set_value(&self, entry: &PropertyEntry, new_value: &str) -> TextEdit {
        if !entry.has_separator {
            return TextEdit::insert(entry.key_span.end, format!("={new_value}"));
        }
        TextEdit::replace(entry.value_span.clone(), new_value)
    }

    /// Appends a new entry at the end of the file.
    pub fn add(&self, key: &str, value: &str, comment: Option<&str>) -> Vec<TextEdit> {
        let mut text = String::new();
        if !self.source.is_empty() && !self.source.ends_with('\n') {
            text.push('\n');
        }
        if let Some(comment) = comment {
            text.push_str(&format!("# {comment}\n"));
        }
        text.push_str(&format!("{key}={value}\n"));
        vec![TextEdit::insert(self.source.len(), text)]
    }

    /// Removes an entry. Comment lines above the entry are separate lines
    /// and stay in place, anchored to whatever follows.
    pub fn delete(&self, entry: &PropertyEntry) -> Vec<TextEdit> {
        vec![TextEdit::delete(entry.line_span.clone())]
    }

    /// Comments an entry out, prefixing it with an explanatory comment.
    ///
    /// When `with_header` is false only the entry itself is commented,
    /// letting a recipe collapse several adjacent entries under one header.
    pub fn comment_out(
        &self,
        entry: &PropertyEntry,
        comment: &str,
        with_header: bool,
    ) -> Vec<TextEdit> {
        let mut edits = Vec::new();
        if with_header {
            edits.push(TextEdit::insert(
                entry.line_span.start,
                format!("# {comment}\n"),
            ));
        }
        edits.push(TextEdit::insert(entry.line_span.start, "# ".to_string()));
        edits
    }

    /// Renames the matched prefix of an entry's key, keeping any subkey
    /// suffix. Returns None when the matcher does not align on a dot
    /// boundary of this key.
    pub fn rename_key(
        &self,
        entry: &PropertyEntry,
        matcher: &PropertyKeyMatcher,
        new_prefix: &str,
    ) -> Option<TextEdit> {
        let segments: Vec<&str> = entry.key.split('.').collect();
        let consumed = matcher.match_prefix(&segments)?;
        let prefix_len: usize = segments[..consumed]
            .iter()
            .map(|s| s.len())
            .sum::<usize>()
            + consumed.saturating_sub(1);
        let span = entry.key_span.start..entry.key_span.start + prefix_len;
        Some(TextEdit::replace(span, new_prefix))
    }
}

fn line_boundary(source: &str, from: usize) -> usize {
    source[from..]
        .find('\n')
        .map(|i| from + i)
        .unwrap_or(source.len())
}

fn next_line_start(source: &str, line_end: usize) -> usize {
    if line_end < source.len() {
        line_end + 1
    } else {
        line_end
    }
}

fn separator_offset(line: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '=' | ':' => return Some(i),
            _ => {}
        }
    }
    None
}

fn ends_in_continuation(value: &str) -> bool {
    value.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::apply_edits;

    #[test]
    fn test_parse_entries() {
        let doc = PropertiesDocument::parse(
            "# comment\nserver.port=8080\n\nspring.application.name: demo\n",
        );
        assert_eq!(doc.entries().len(), 2);
        assert_eq!(doc.entries()[0].key, "server.port");
        assert_eq!(doc.entries()[0].value, "8080");
        assert_eq!(doc.entries()[1].key, "spring.application.name");
        assert_eq!(doc.entries()[1].value, "demo");
    }

    #[test]
    fn test_value_of_with_relaxed_binding() {
        let doc = PropertiesDocument::parse("server.servletPath=/api\n");
        let matcher = PropertyKeyMatcher::relaxed("server.servlet-path");
        assert_eq!(doc.value_of(&matcher), Some("/api"));
    }

    #[test]
    fn test_set_value_preserves_surrounding_text() {
        let source = "# keep me\nserver.port = 8080\nother=x\n";
        let doc = PropertiesDocument::parse(source);
        let entry = &doc.entries()[0];
        let out = apply_edits(source, vec![doc.set_value(entry, "9090")]).unwrap();
        assert_eq!(out, "# keep me\nserver.port = 9090\nother=x\n");
    }

    #[test]
    fn test_delete_keeps_comments_anchored_to_next_line() {
        let source = "# ports\nserver.port=8080\nmanagement.port=8081\n";
        let doc = PropertiesDocument::parse(source);
        let entry = &doc.entries()[0];
        let out = apply_edits(source, doc.delete(entry)).unwrap();
        assert_eq!(out, "# ports\nmanagement.port=8081\n");
    }

    #[test]
    fn test_comment_out_with_header() {
        let source = "server.port=8080\n";
        let doc = PropertiesDocument::parse(source);
        let entry = &doc.entries()[0];
        let out = apply_edits(source, doc.comment_out(entry, "deprecated", true)).unwrap();
        assert_eq!(out, "# deprecated\n# server.port=8080\n");
    }

    #[test]
    fn test_rename_key_prefix_keeps_subkey() {
        let source = "spring.profiles.active=dev\n";
        let doc = PropertiesDocument::parse(source);
        let entry = &doc.entries()[0];
        let matcher = PropertyKeyMatcher::relaxed("spring.profiles");
        let edit = doc.rename_key(entry, &matcher, "spring.config.activate.on-profile");
        // `active` is a subkey of the renamed prefix.
        let out = apply_edits(source, vec![edit.unwrap()]).unwrap();
        assert_eq!(out, "spring.config.activate.on-profile.active=dev\n");
    }

    #[test]
    fn test_line_continuation() {
        let source = "greeting=hello \\\n    world\nnext=1\n";
        let doc = PropertiesDocument::parse(source);
        assert_eq!(doc.entries().len(), 2);
        assert_eq!(doc.entries()[0].value, "hello world");
        assert_eq!(doc.entries()[1].key, "next");
    }

    #[test]
    fn test_add_to_file_without_trailing_newline() {
        let source = "a=1";
        let doc = PropertiesDocument::parse(source);
        let out = apply_edits(source, doc.add("b", "2", None)).unwrap();
        assert_eq!(out, "a=1\nb=2\n");
    }
}
