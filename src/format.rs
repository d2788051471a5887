//! Whitespace and line-layout helpers used when planning edits.
//!
//! Deletions and insertions computed from tree node spans routinely need a
//! little context repair: a synthesized space when two tokens become
//! adjacent, a widened span when a construct owns its whole line. These are
//! the only places the engine manufactures whitespace, and every function is
//! non-destructive — it inspects the surrounding text and does nothing when
//! the text is already well formed.

use std::ops::Range;

/// Byte offset of the start of the line containing `at`.
pub fn line_start(source: &str, at: usize) -> usize {
    source[..at].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

/// Byte offset just past the newline that ends the line containing `at`
/// (or the end of the source).
pub fn line_end_after(source: &str, at: usize) -> usize {
    source[at..]
        .find('\n')
        .map(|i| at + i + 1)
        .unwrap_or(source.len())
}

/// Expands a span to cover whole lines, including the trailing newline.
pub fn full_line_span(source: &str, span: &Range<usize>) -> Range<usize> {
    line_start(source, span.start)..line_end_after(source, span.end)
}

/// The leading whitespace of the line containing `at`.
pub fn indent_at(source: &str, at: usize) -> &str {
    let start = line_start(source, at);
    let line = &source[start..];
    let trimmed = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - trimmed.len()]
}

/// True when a span is the only non-whitespace content on its line(s), so a
/// deletion should take the whole line with it.
pub fn alone_on_line(source: &str, span: &Range<usize>) -> bool {
    let before = &source[line_start(source, span.start)..span.start];
    let after_end = line_end_after(source, span.end);
    let after = source[span.end..after_end].trim_end_matches('\n');
    before.trim().is_empty() && after.trim().is_empty()
}

/// The separator to splice in when the text in `deleted` is removed: a
/// single space if the characters on either side would otherwise run
/// together, nothing if a separator already exists. Calling this on
/// already-separated text yields an empty string, which keeps the repair
/// idempotent.
pub fn separator_after_deletion(source: &str, deleted: &Range<usize>) -> &'static str {
    let prev = source[..deleted.start].chars().next_back();
    let next = source[deleted.end..].chars().next();
    match (prev, next) {
        (Some(p), Some(n)) if joins_token(p) && starts_token(n) => " ",
        _ => "",
    }
}

fn joins_token(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == ')' || c == '>'
}

fn starts_token(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '@'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_line_span() {
        let source = "one\ntwo three\nfour\n";
        // span of "three"
        let span = 8..13;
        assert_eq!(full_line_span(source, &span), 4..14);
    }

    #[test]
    fn test_indent_at() {
        let source = "class A {\n    int x;\n}\n";
        let at = source.find("int").unwrap();
        assert_eq!(indent_at(source, at), "    ");
    }

    #[test]
    fn test_alone_on_line() {
        let source = "    @Autowired\n    private Foo foo;\n";
        let ann = source.find("@Autowired").unwrap();
        assert!(alone_on_line(source, &(ann..ann + "@Autowired".len())));
        let private = source.find("private").unwrap();
        assert!(!alone_on_line(source, &(private..private + 7)));
    }

    #[test]
    fn test_separator_synthesized_when_tokens_touch() {
        let source = "@PathVariable(\"id\")Long id";
        let deleted = 13..19; // ("id")
        assert_eq!(separator_after_deletion(source, &deleted), " ");
    }

    #[test]
    fn test_separator_not_doubled() {
        let source = "@PathVariable(\"id\") Long id";
        let deleted = 13..19;
        assert_eq!(separator_after_deletion(source, &deleted), "");
    }
}
