//! Path matching logic.
//!
//! # Responsibilities
//! - Flag paths that fall inside a sensitive namespace
//! - Match concrete paths against `{param}` templates and capture values
//!
//! # Design Decisions
//! - Sensitive matching is substring containment anywhere in the path, so it
//!   over-excludes rather than under-excludes
//! - Path matching is case-sensitive
//! - Template placeholders match a non-empty run inside one segment
//! - No regex to guarantee O(n) matching

use std::collections::BTreeMap;

/// Trait for matching paths against conditions.
pub trait PathMatcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, path: &str) -> bool;
}

/// Matches any path containing one of the configured prefixes.
#[derive(Debug, Clone, Default)]
pub struct SensitivePrefixMatcher {
    prefixes: Vec<String>,
}

impl SensitivePrefixMatcher {
    /// Create a matcher from the configured deny-list. Blank entries are dropped.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.trim().is_empty())
                .collect(),
        }
    }

    /// The first configured prefix found in `path`, if any.
    pub fn matched_prefix(&self, path: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .find(|p| path.contains(p.as_str()))
            .map(String::as_str)
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

impl PathMatcher for SensitivePrefixMatcher {
    fn matches(&self, path: &str) -> bool {
        self.matched_prefix(path).is_some()
    }
}

/// A run of literal text or a placeholder inside one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Literal(String),
    Param(String),
}

/// One segment of a parsed path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    /// A segment holding at least one placeholder, e.g. `{name}.json`.
    Pattern(Vec<Part>),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        let parts = split_parts(raw);
        if parts.iter().any(|p| matches!(p, Part::Param(_))) {
            Segment::Pattern(parts)
        } else {
            Segment::Literal(raw.to_string())
        }
    }

    /// Literal text of the segment with placeholders removed.
    pub fn literal_text(&self) -> String {
        match self {
            Segment::Literal(lit) => lit.clone(),
            Segment::Pattern(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    Part::Literal(lit) => Some(lit.as_str()),
                    Part::Param(_) => None,
                })
                .collect(),
        }
    }
}

/// A parsed `{param}` path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn parse(template: &str) -> Self {
        let segments = template
            .split('/')
            .filter(|s| !s.is_empty())
            .map(Segment::parse)
            .collect();
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Placeholder names in order of appearance.
    pub fn params(&self) -> Vec<String> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Pattern(parts) => Some(parts),
                Segment::Literal(_) => None,
            })
            .flatten()
            .filter_map(|p| match p {
                Part::Param(name) => Some(name.clone()),
                Part::Literal(_) => None,
            })
            .collect()
    }

    pub fn has_params(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Pattern(_)))
    }

    /// Match a concrete path, returning raw captured values by name.
    pub fn capture(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut captured = BTreeMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Literal(_) => return None,
                Segment::Pattern(pattern) => {
                    if !capture_parts(pattern, part, &mut captured) {
                        return None;
                    }
                }
            }
        }
        Some(captured)
    }
}

impl PathMatcher for PathTemplate {
    fn matches(&self, path: &str) -> bool {
        self.capture(path).is_some()
    }
}

/// Split a segment into literal runs and `{name}` placeholders. Unclosed or
/// empty braces stay literal.
fn split_parts(raw: &str) -> Vec<Part> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut rest = raw;

    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let close = match after.find('}') {
            Some(close) => close,
            None => break,
        };
        let name = &after[..close];
        if name.is_empty() || name.contains('{') {
            literal.push_str(&rest[..=open]);
            rest = after;
            continue;
        }

        literal.push_str(&rest[..open]);
        if !literal.is_empty() {
            parts.push(Part::Literal(std::mem::take(&mut literal)));
        }
        parts.push(Part::Param(name.to_string()));
        rest = &after[close + 1..];
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        parts.push(Part::Literal(literal));
    }
    parts
}

/// Match one concrete segment against its parts. Placeholders take the
/// shortest non-empty value that lets the rest of the segment match.
fn capture_parts(parts: &[Part], text: &str, captured: &mut BTreeMap<String, String>) -> bool {
    let (first, rest) = match parts.split_first() {
        Some(split) => split,
        None => return text.is_empty(),
    };

    match first {
        Part::Literal(lit) => match text.strip_prefix(lit.as_str()) {
            Some(remaining) => capture_parts(rest, remaining, captured),
            None => false,
        },
        Part::Param(_) if text.is_empty() => false,
        Part::Param(name) => {
            for (end, _) in text.char_indices().skip(1).chain([(text.len(), ' ')]) {
                if capture_parts(rest, &text[end..], captured) {
                    captured.insert(name.clone(), text[..end].to_string());
                    return true;
                }
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitive_matcher_is_substring() {
        let matcher = SensitivePrefixMatcher::new(["/cache/", "/admin/"]);

        assert!(matcher.matches("/cache/clear"));
        assert!(matcher.matches("/v1/admin/users"));
        assert!(matcher.matches("/projects/cache/stats"));
        assert!(!matcher.matches("/cache"));
        assert!(!matcher.matches("/search"));
        assert_eq!(matcher.matched_prefix("/v1/admin/users"), Some("/admin/"));
    }

    #[test]
    fn test_blank_prefixes_ignored() {
        let matcher = SensitivePrefixMatcher::new(["", "  ", "/config/"]);
        assert_eq!(matcher.prefixes().len(), 1);
        assert!(!matcher.matches("/search"));
    }

    #[test]
    fn test_template_params() {
        let t = PathTemplate::parse("/projects/{project_id}/files/{file}");
        assert_eq!(t.params(), vec!["project_id", "file"]);
        assert!(t.has_params());
        assert!(!PathTemplate::parse("/cache/stats").has_params());
        // Half-open braces are literals.
        assert!(!PathTemplate::parse("/weird/{oops").has_params());
    }

    #[test]
    fn test_template_capture() {
        let t = PathTemplate::parse("/stats/{project_id}");

        let captured = t.capture("/stats/demo").unwrap();
        assert_eq!(captured.get("project_id").map(String::as_str), Some("demo"));

        assert!(t.capture("/stats").is_none());
        assert!(t.capture("/stats/demo/extra").is_none());
        assert!(t.capture("/other/demo").is_none());
        assert!(t.matches("stats/demo"));
    }

    #[test]
    fn test_placeholder_inside_segment() {
        let t = PathTemplate::parse("/files/{name}.json");
        assert!(t.has_params());
        assert_eq!(t.params(), vec!["name"]);
        assert_eq!(
            t.segments()[1],
            Segment::Pattern(vec![Part::Param("name".into()), Part::Literal(".json".into())])
        );

        let captured = t.capture("/files/report.v2.json").unwrap();
        assert_eq!(captured.get("name").map(String::as_str), Some("report.v2"));
        assert!(t.capture("/files/report.xml").is_none());
        assert!(t.capture("/files/.json").is_none());
    }

    #[test]
    fn test_several_placeholders_in_one_segment() {
        let t = PathTemplate::parse("/range/v{from}-{to}");
        assert_eq!(t.params(), vec!["from", "to"]);

        let captured = t.capture("/range/v1-10").unwrap();
        assert_eq!(captured.get("from").map(String::as_str), Some("1"));
        assert_eq!(captured.get("to").map(String::as_str), Some("10"));
        assert!(t.capture("/range/1-10").is_none());
        assert!(!PathTemplate::parse("/weird/{}").has_params());
    }
}
