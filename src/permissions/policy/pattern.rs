/*!
 * Route Patterns
 * Literal paths and `[param]` dynamic segments compiled to anchored matchers
 */

use crate::core::errors::ConfigError;
use regex::Regex;

/// How a pattern relates to the paths below it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// The whole path must match
    Exact,
    /// The path must match or continue below it at a `/` boundary
    Prefix,
}

#[derive(Debug, Clone)]
enum Matcher {
    Literal(String),
    Dynamic(Regex),
}

/// A compiled route pattern such as `/team/[teamId]`
#[derive(Debug, Clone)]
pub struct RoutePattern {
    source: String,
    mode: MatchMode,
    matcher: Matcher,
}

impl RoutePattern {
    pub fn exact(pattern: &str) -> Result<Self, ConfigError> {
        Self::compile(pattern, MatchMode::Exact)
    }

    pub fn prefix(pattern: &str) -> Result<Self, ConfigError> {
        Self::compile(pattern, MatchMode::Prefix)
    }

    pub fn compile(pattern: &str, mode: MatchMode) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        if !pattern.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }
        if pattern.chars().any(char::is_whitespace) {
            return Err(invalid("must not contain whitespace"));
        }
        if pattern.contains('?') || pattern.contains('#') {
            return Err(invalid("must be a pathname without query or fragment"));
        }

        let source = normalize_path(pattern).to_string();
        if source.contains("//") {
            return Err(invalid("must not contain empty segments"));
        }

        let mut dynamic = false;
        let mut body = String::new();
        for segment in source.split('/').skip(1).filter(|s| !s.is_empty()) {
            body.push('/');
            if segment.starts_with('[') || segment.ends_with(']') {
                let name = segment
                    .strip_prefix('[')
                    .and_then(|s| s.strip_suffix(']'))
                    .ok_or_else(|| invalid("dynamic segments must be a whole segment like [id]"))?;
                if name.is_empty()
                    || !name
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
                {
                    return Err(invalid("dynamic segment names use letters, digits, '_' or '-'"));
                }
                dynamic = true;
                body.push_str("[^/]+");
            } else if segment.contains('[') || segment.contains(']') {
                return Err(invalid("brackets are only allowed around a whole segment"));
            } else {
                body.push_str(&regex::escape(segment));
            }
        }

        let matcher = if dynamic {
            let anchored = match mode {
                MatchMode::Exact => format!("^{}$", body),
                MatchMode::Prefix => format!("^{}(?:/.*)?$", body),
            };
            let regex = Regex::new(&anchored).map_err(|e| invalid(&e.to_string()))?;
            Matcher::Dynamic(regex)
        } else {
            Matcher::Literal(source.clone())
        };

        Ok(Self {
            source,
            mode,
            matcher,
        })
    }

    /// Test a normalized pathname
    pub fn matches(&self, path: &str) -> bool {
        match &self.matcher {
            Matcher::Dynamic(regex) => regex.is_match(path),
            Matcher::Literal(literal) => match self.mode {
                MatchMode::Exact => path == literal,
                MatchMode::Prefix => {
                    if literal == "/" {
                        return path.starts_with('/');
                    }
                    path == literal
                        || (path.starts_with(literal.as_str())
                            && path.as_bytes().get(literal.len()) == Some(&b'/'))
                }
            },
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.matcher, Matcher::Dynamic(_))
    }
}

/// Strip query/fragment and a trailing slash (except for the root)
pub fn normalize_path(pathname: &str) -> &str {
    let end = pathname.find(['?', '#']).unwrap_or(pathname.len());
    let path = &pathname[..end];
    if path.is_empty() {
        return "/";
    }
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}
