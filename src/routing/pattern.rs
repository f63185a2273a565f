//! Route pattern compilation and matching.
//!
//! # Responsibilities
//! - Parse `/static/:param/*wildcard` patterns into segment specifiers
//! - Enforce pattern invariants at compile time
//! - Match a request path against a compiled pattern, extracting params
//!
//! # Design Decisions
//! - Static segments compare case-sensitively and exactly
//! - A param matches exactly one non-empty segment
//! - A wildcard is always last and captures the remainder of the path
//!   including its leading `/` (an absent remainder captures "")
//! - No regex, matching is a single left-to-right walk
//! - Segments are split on the raw path; bound values are percent-decoded

use std::fmt;

use percent_encoding::percent_decode_str;

use crate::routing::router::RouteError;

/// A single compiled segment of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Static(String),
    Param(String),
    Wildcard(String),
}

/// A compiled, validated route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

/// Name → value bindings extracted from a matched path, in pattern order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Values are stored percent-decoded.
    fn push(&mut self, name: &str, value: &str) {
        let value = percent_decode_str(value).decode_utf8_lossy();
        self.0.push((name.to_string(), value.into_owned()));
    }
}

impl Pattern {
    /// Compile a pattern such as `/employees/:username/*rest`.
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        let invalid = |reason: &str| RouteError::InvalidPattern {
            pattern: raw.to_string(),
            reason: reason.to_string(),
        };

        let Some(body) = raw.strip_prefix('/') else {
            return Err(invalid("pattern must start with '/'"));
        };

        let mut segments = Vec::new();
        let pieces: Vec<&str> = body.split('/').collect();
        let last = pieces.len() - 1;

        for (index, piece) in pieces.into_iter().enumerate() {
            let segment = if let Some(name) = piece.strip_prefix(':') {
                Segment::Param(name.to_string())
            } else if let Some(name) = piece.strip_prefix('*') {
                if index != last {
                    return Err(invalid("wildcard must be the final segment"));
                }
                Segment::Wildcard(name.to_string())
            } else {
                Segment::Static(piece.to_string())
            };

            if let Segment::Param(name) | Segment::Wildcard(name) = &segment {
                if name.is_empty() {
                    return Err(invalid("parameter name must not be empty"));
                }
                let duplicate = segments.iter().any(|s| {
                    matches!(s, Segment::Param(n) | Segment::Wildcard(n) if n == name)
                });
                if duplicate {
                    return Err(invalid(&format!("duplicate parameter name '{}'", name)));
                }
            }

            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of static segments before the first param or wildcard.
    /// Higher values are more specific and win ties during lookup.
    pub fn specificity(&self) -> usize {
        self.segments
            .iter()
            .take_while(|s| matches!(s, Segment::Static(_)))
            .count()
    }

    /// Match a request path, returning the extracted params on success.
    pub fn matches(&self, path: &str) -> Option<Params> {
        if !path.starts_with('/') {
            return None;
        }

        // Start of the next unconsumed segment; `None` once the path has no
        // separator left.
        let mut cursor = Some(1);
        let mut params = Params::default();

        for segment in &self.segments {
            if let Segment::Wildcard(name) = segment {
                let remainder = cursor.map_or("", |start| &path[start - 1..]);
                params.push(name, remainder);
                return Some(params);
            }

            let start = cursor?;
            let piece = match path[start..].find('/') {
                Some(offset) => {
                    cursor = Some(start + offset + 1);
                    &path[start..start + offset]
                }
                None => {
                    cursor = None;
                    &path[start..]
                }
            };

            match segment {
                Segment::Static(text) if text == piece => {}
                Segment::Param(name) if !piece.is_empty() => params.push(name, piece),
                _ => return None,
            }
        }

        cursor.is_none().then_some(params)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pattern: &str, path: &str) -> Option<Vec<(String, String)>> {
        Pattern::parse(pattern)
            .unwrap()
            .matches(path)
            .map(|p| p.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn test_static_segments_match_exactly() {
        assert_eq!(params("/employees", "/employees"), Some(vec![]));
        assert_eq!(params("/employees", "/Employees"), None);
        assert_eq!(params("/employees", "/employees/"), None);
        assert_eq!(params("/employees", "/employees/x"), None);
        assert_eq!(params("/api/json-employees/", "/api/json-employees/"), Some(vec![]));
        assert_eq!(params("/api/json-employees/", "/api/json-employees"), None);
        assert_eq!(params("/", "/"), Some(vec![]));
    }

    #[test]
    fn test_param_binds_one_non_empty_segment() {
        assert_eq!(
            params("/employee-template/:id", "/employee-template/7"),
            Some(vec![pair("id", "7")])
        );
        assert_eq!(params("/employee-template/:id", "/employee-template/"), None);
        assert_eq!(params("/employee-template/:id", "/employee-template"), None);
        assert_eq!(params("/employee-template/:id", "/employee-template/7/x"), None);
    }

    #[test]
    fn test_wildcard_captures_remainder_with_leading_separator() {
        let pattern = "/employees/:username/*rest";
        assert_eq!(
            params(pattern, "/employees/alice/foo/bar"),
            Some(vec![pair("username", "alice"), pair("rest", "/foo/bar")])
        );
        assert_eq!(
            params(pattern, "/employees/alice/"),
            Some(vec![pair("username", "alice"), pair("rest", "/")])
        );
        assert_eq!(
            params(pattern, "/employees/alice"),
            Some(vec![pair("username", "alice"), pair("rest", "")])
        );
        assert_eq!(params(pattern, "/employees//foo"), None);
    }

    #[test]
    fn test_bound_values_are_percent_decoded() {
        assert_eq!(
            params("/employees/:username/*rest", "/employees/al%20ice/f%2Fo"),
            Some(vec![pair("username", "al ice"), pair("rest", "/f/o")])
        );
        assert_eq!(
            params("/employee-template/:id", "/employee-template/9%FF"),
            Some(vec![pair("id", "9\u{FFFD}")])
        );
    }

    #[test]
    fn test_root_wildcard_captures_whole_path() {
        assert_eq!(params("/*path", "/a/b"), Some(vec![pair("path", "/a/b")]));
        assert_eq!(params("/query/*rest", "/query/"), Some(vec![pair("rest", "/")]));
        assert_eq!(params("/query/*rest", "/query"), Some(vec![pair("rest", "")]));
    }

    #[test]
    fn test_rejects_malformed_patterns() {
        assert!(Pattern::parse("employees").is_err());
        assert!(Pattern::parse("/files/*rest/more").is_err());
        assert!(Pattern::parse("/a/:id/b/:id").is_err());
        assert!(Pattern::parse("/a/:").is_err());
        assert!(Pattern::parse("/a/:name/*name").is_err());
    }

    #[test]
    fn test_specificity_counts_leading_static_segments() {
        assert_eq!(Pattern::parse("/employees").unwrap().specificity(), 1);
        assert_eq!(Pattern::parse("/employees/:u/*rest").unwrap().specificity(), 1);
        assert_eq!(Pattern::parse("/api/json-employees/:id").unwrap().specificity(), 2);
        assert_eq!(Pattern::parse("/:a/b").unwrap().specificity(), 0);
    }
}
