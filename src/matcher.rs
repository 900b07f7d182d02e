//! Route pattern conversion and matching.
//!
//! OpenAPI path templates (`/users/{id}`) are converted to the router's
//! pattern syntax (`/users/<id>`), which is then compiled to a regex.

use crate::error::RegistryError;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Opens a path parameter in a route pattern.
pub const PARAM_OPEN: char = '<';
/// Closes a path parameter in a route pattern.
pub const PARAM_CLOSE: char = '>';

/// Convert an OpenAPI path template into a route pattern.
///
/// Every `{` becomes [`PARAM_OPEN`] and every `}` becomes [`PARAM_CLOSE`];
/// nothing else is touched. Malformed templates pass through and are
/// rejected later by [`RoutePattern::compile`].
pub fn convert_path(template: &str) -> String {
    template
        .chars()
        .map(|ch| match ch {
            '{' => PARAM_OPEN,
            '}' => PARAM_CLOSE,
            other => other,
        })
        .collect()
}

enum PatternSegment {
    Literal(String),
    Param(String),
}

fn parse_segments(pattern: &str) -> Result<Vec<PatternSegment>, String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_param = false;

    for ch in pattern.chars() {
        match ch {
            PARAM_OPEN if in_param => {
                return Err(format!("nested '{}'", PARAM_OPEN));
            }
            PARAM_OPEN => {
                if !current.is_empty() {
                    segments.push(PatternSegment::Literal(std::mem::take(&mut current)));
                }
                in_param = true;
            }
            PARAM_CLOSE if in_param => {
                segments.push(PatternSegment::Param(std::mem::take(&mut current)));
                in_param = false;
            }
            PARAM_CLOSE => {
                return Err(format!("unmatched '{}'", PARAM_CLOSE));
            }
            other => current.push(other),
        }
    }

    if in_param {
        return Err(format!("unclosed '{}'", PARAM_OPEN));
    }
    if !current.is_empty() {
        segments.push(PatternSegment::Literal(current));
    }

    Ok(segments)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    pattern: String,
    regex: Regex,
    params: Vec<String>,
}

impl RoutePattern {
    /// Compile a route pattern such as `/users/<id>/posts/<pid>`.
    ///
    /// Parameter names must be identifiers and unique within the pattern.
    /// Each parameter matches exactly one non-empty path segment.
    pub fn compile(pattern: &str) -> Result<Self, RegistryError> {
        let malformed = |reason: String| RegistryError::MalformedPattern {
            pattern: pattern.to_string(),
            reason,
        };

        if !pattern.starts_with('/') {
            return Err(malformed("must start with '/'".to_string()));
        }

        let segments = parse_segments(pattern).map_err(malformed)?;

        let mut expr = String::with_capacity(pattern.len() + 16);
        expr.push('^');
        let mut params = Vec::new();
        let mut seen = HashSet::new();

        for segment in &segments {
            match segment {
                PatternSegment::Literal(lit) => expr.push_str(&regex::escape(lit)),
                PatternSegment::Param(name) => {
                    if !is_identifier(name) {
                        return Err(malformed(format!("invalid parameter name {:?}", name)));
                    }
                    if !seen.insert(name.as_str()) {
                        return Err(malformed(format!("parameter {:?} used twice", name)));
                    }
                    expr.push_str("([^/]+)");
                    params.push(name.clone());
                }
            }
        }
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|source| RegistryError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            params,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Parameter names in order of appearance.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Match `path`, returning the captured path parameters.
    pub fn captures(&self, path: &str) -> Option<HashMap<String, String>> {
        let captures = self.regex.captures(path)?;
        Some(
            self.params
                .iter()
                .zip(captures.iter().skip(1))
                .filter_map(|(name, m)| m.map(|m| (name.clone(), m.as_str().to_string())))
                .collect(),
        )
    }
}

/// Parse a query string into key-value pairs.
///
/// Values are percent-decoded. When a key repeats, the first value wins.
pub fn parse_query_string(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        params
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    params
}
