//! Relaxed-binding comparison of configuration property keys.
//!
//! Spring binds `server.servlet-path`, `server.servletPath` and
//! `SERVER_SERVLETPATH` to the same property. The matcher reproduces that
//! rule: `.`, `-`, `_` and camelCase boundaries are equivalent separators and
//! comparison is case-insensitive. Exact mode compares the dotted key text
//! verbatim.

/// Splits one raw key segment into canonical lowercase fragments.
///
/// `servletPath` and `servlet-path` both yield `["servlet", "path"]`. A
/// segment may itself contain dots (a dotted YAML scalar key), which also
/// separate fragments.
pub fn canonical_fragments(segment: &str) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in segment.chars() {
        if ch == '.' || ch == '-' || ch == '_' {
            if !current.is_empty() {
                fragments.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            fragments.push(std::mem::take(&mut current));
        }
        current.extend(ch.to_lowercase());
        prev_lower = ch.is_lowercase() || ch.is_numeric();
    }
    if !current.is_empty() {
        fragments.push(current);
    }
    fragments
}

/// Canonical fragment sequence of a full dotted key.
pub fn canonical_key(key: &str) -> Vec<String> {
    key.split('.').flat_map(canonical_fragments).collect()
}

/// True when two raw key segments are the same key under relaxed binding.
pub fn segments_equivalent(a: &str, b: &str) -> bool {
    canonical_fragments(a) == canonical_fragments(b)
}

/// Byte ranges of each canonical fragment within the raw text. Separators
/// (`.`, `-`, `_`) fall between ranges; camelCase boundaries split without
/// consuming a byte.
pub fn fragment_boundaries(text: &str) -> Vec<std::ops::Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = None;
    let mut prev_lower = false;
    for (i, ch) in text.char_indices() {
        if ch == '.' || ch == '-' || ch == '_' {
            if let Some(s) = start.take() {
                ranges.push(s..i);
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower {
            if let Some(s) = start.take() {
                ranges.push(s..i);
            }
        }
        if start.is_none() {
            start = Some(i);
        }
        prev_lower = ch.is_lowercase() || ch.is_numeric();
    }
    if let Some(s) = start {
        ranges.push(s..text.len());
    }
    ranges
}

/// Matches configuration keys against a dotted key pattern, optionally with
/// relaxed binding.
#[derive(Debug, Clone)]
pub struct PropertyKeyMatcher {
    pattern: String,
    fragments: Vec<String>,
    relaxed: bool,
}

impl PropertyKeyMatcher {
    /// Creates a matcher using relaxed binding.
    pub fn relaxed(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let fragments = canonical_key(&pattern);
        Self {
            pattern,
            fragments,
            relaxed: true,
        }
    }

    /// Creates a matcher requiring verbatim key text.
    pub fn exact(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let fragments = canonical_key(&pattern);
        Self {
            pattern,
            fragments,
            relaxed: false,
        }
    }

    /// Creates a matcher with the given binding mode.
    pub fn new(pattern: impl Into<String>, relaxed: bool) -> Self {
        if relaxed {
            Self::relaxed(pattern)
        } else {
            Self::exact(pattern)
        }
    }

    /// Returns the pattern this matcher was built from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Canonical fragments of the pattern.
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// True when this matcher uses relaxed binding.
    pub fn is_relaxed(&self) -> bool {
        self.relaxed
    }

    /// Returns true if the full dotted key matches the pattern.
    pub fn matches(&self, key: &str) -> bool {
        if self.relaxed {
            canonical_key(key) == self.fragments
        } else {
            key == self.pattern
        }
    }

    /// Matches a key path given as raw segments (a nested YAML path, where
    /// each segment may itself be a dotted scalar).
    pub fn matches_path(&self, segments: &[&str]) -> bool {
        match self.match_prefix(segments) {
            Some(consumed) => consumed == segments.len(),
            None => false,
        }
    }

    /// Returns the number of leading raw segments that exactly exhaust the
    /// pattern, or None if the pattern does not align on a segment boundary.
    ///
    /// A pattern boundary falling inside a raw segment (`server` against the
    /// single segment `server-port` in exact-structure terms) is treated as
    /// no match rather than a partial one.
    pub fn match_prefix(&self, segments: &[&str]) -> Option<usize> {
        if !self.relaxed {
            let joined_pattern: Vec<&str> = self.pattern.split('.').collect();
            if segments.len() < joined_pattern.len() {
                return None;
            }
            if segments[..joined_pattern.len()] == joined_pattern[..] {
                return Some(joined_pattern.len());
            }
            return None;
        }

        let mut remaining: &[String] = &self.fragments;
        for (i, segment) in segments.iter().enumerate() {
            if remaining.is_empty() {
                return Some(i);
            }
            let frags = canonical_fragments(segment);
            if frags.len() > remaining.len() || frags[..] != remaining[..frags.len()] {
                return None;
            }
            remaining = &remaining[frags.len()..];
        }
        if remaining.is_empty() {
            Some(segments.len())
        } else {
            None
        }
    }

    /// Returns true if the pattern matches the key itself or any parent
    /// prefix of it (the key is the pattern or one of its subkeys).
    pub fn matches_key_or_subkey(&self, key: &str) -> bool {
        let segments: Vec<&str> = key.split('.').collect();
        self.match_prefix(&segments).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_fragments() {
        assert_eq!(canonical_fragments("servletPath"), vec!["servlet", "path"]);
        assert_eq!(canonical_fragments("servlet-path"), vec!["servlet", "path"]);
        assert_eq!(canonical_fragments("SERVLET_PATH"), vec!["servlet", "path"]);
        assert_eq!(canonical_fragments("port"), vec!["port"]);
    }

    #[test]
    fn test_relaxed_equivalence() {
        let matcher = PropertyKeyMatcher::relaxed("server.servlet.path");
        assert!(matcher.matches("server.servlet.path"));
        assert!(matcher.matches("server.servlet-path"));
        assert!(matcher.matches("server.servletPath"));
        assert!(matcher.matches("SERVER.SERVLET_PATH"));
        assert!(!matcher.matches("server.servlet.path.extra"));
        assert!(!matcher.matches("server.servlet"));
    }

    #[test]
    fn test_dash_acts_as_segment_separator() {
        // server-port and server.port are the same key under relaxed binding.
        let matcher = PropertyKeyMatcher::relaxed("server.port");
        assert!(matcher.matches("server-port"));
        assert!(matcher.matches("serverPort"));
    }

    #[test]
    fn test_exact_mode() {
        let matcher = PropertyKeyMatcher::exact("server.port");
        assert!(matcher.matches("server.port"));
        assert!(!matcher.matches("server-port"));
        assert!(!matcher.matches("server.Port"));
    }

    #[test]
    fn test_match_prefix_on_path_segments() {
        let matcher = PropertyKeyMatcher::relaxed("server.servlet");
        assert_eq!(matcher.match_prefix(&["server", "servlet", "path"]), Some(2));
        assert_eq!(matcher.match_prefix(&["server", "servlet"]), Some(2));
        assert_eq!(matcher.match_prefix(&["server"]), None);
        // Boundary inside a raw segment is not a match.
        assert_eq!(matcher.match_prefix(&["server", "servlet-path"]), None);
    }

    #[test]
    fn test_match_path_with_dotted_segment() {
        let matcher = PropertyKeyMatcher::relaxed("spring.main.banner-mode");
        assert!(matcher.matches_path(&["spring", "main.bannerMode"]));
        assert!(matcher.matches_path(&["spring.main", "banner-mode"]));
        assert!(!matcher.matches_path(&["spring", "main"]));
    }

    #[test]
    fn test_fragment_boundaries() {
        assert_eq!(fragment_boundaries("servlet-path"), vec![0..7, 8..12]);
        assert_eq!(fragment_boundaries("servletPath"), vec![0..7, 7..11]);
        assert_eq!(fragment_boundaries("a.b"), vec![0..1, 2..3]);
    }

    #[test]
    fn test_matches_key_or_subkey() {
        let matcher = PropertyKeyMatcher::relaxed("spring.profiles");
        assert!(matcher.matches_key_or_subkey("spring.profiles"));
        assert!(matcher.matches_key_or_subkey("spring.profiles.active"));
        assert!(!matcher.matches_key_or_subkey("spring.profile"));
    }
}
