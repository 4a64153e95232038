//! Route patterns.
//!
//! A route is a regular expression that may also contain placeholders:
//!
//! - `<name>` captures one or more characters, greedily
//! - `<name?>` captures one or more characters, lazily
//!
//! The compiled pattern is anchored at both ends, so `find <user>` matches
//! `find alice` but not `please find alice`.
//!
//! ```rust
//! use omnibot_router::RoutePattern;
//!
//! let pattern = RoutePattern::compile("<a?> to <b>").unwrap();
//! let captures = pattern.captures("1 to 2 to 3").unwrap();
//! assert_eq!(captures.get("a"), Some("1"));
//! assert_eq!(captures.get("b"), Some("2 to 3"));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use omnibot_core::{RouterError, RouterResult};

/// Matches `<name>` and `<name?>`. Explicit named groups (`(?P<name>` and
/// `(?<name>`) are matched too so they can be left alone. A `<name>` after a
/// bare `?` quantifier is still a placeholder.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\(\?P?)?<(\w+)(\?)?>").expect("placeholder regex is valid"));

/// A compiled route.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    rule: String,
    regex: Regex,
}

impl RoutePattern {
    /// Compiles a route into an anchored regular expression.
    pub fn compile(rule: &str) -> RouterResult<Self> {
        let expanded = PLACEHOLDER.replace_all(rule, |caps: &regex::Captures<'_>| {
            if caps.get(1).is_some() {
                return caps[0].to_string();
            }
            let lazy = if caps.get(3).is_some() { "?" } else { "" };
            format!("(?P<{}>.+{lazy})", &caps[2])
        });
        let regex =
            Regex::new(&format!("^(?:{expanded})$")).map_err(|e| RouterError::InvalidPattern {
                pattern: rule.to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            rule: rule.to_string(),
            regex,
        })
    }

    /// Returns the route as it was registered.
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Returns the compiled regular expression source.
    pub fn as_regex_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns `true` if the whole of `text` matches this route.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Matches `text` and returns the named captures.
    ///
    /// Named groups that did not take part in the match are left out.
    pub fn captures(&self, text: &str) -> Option<Captures> {
        let caps = self.regex.captures(text)?;
        let values = self
            .regex
            .capture_names()
            .flatten()
            .filter_map(|name| {
                caps.name(name)
                    .map(|m| (name.to_string(), m.as_str().to_string()))
            })
            .collect();
        Some(Captures(values))
    }
}

/// Two patterns are the same route when they compile to the same expression.
impl PartialEq for RoutePattern {
    fn eq(&self, other: &Self) -> bool {
        self.regex.as_str() == other.regex.as_str()
    }
}

impl Eq for RoutePattern {}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rule)
    }
}

/// Named values captured by a route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures(BTreeMap<String, String>);

impl Captures {
    /// Creates an empty set of captures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a captured value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Returns the number of captured values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the underlying map.
    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

impl FromIterator<(String, String)> for Captures {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_route_is_anchored() {
        let pattern = RoutePattern::compile("ping").unwrap();
        assert!(pattern.is_match("ping"));
        assert!(!pattern.is_match("ping test"));
        assert!(!pattern.is_match("a ping"));
    }

    #[test]
    fn test_regex_route() {
        let pattern = RoutePattern::compile("123.*abc").unwrap();
        assert!(pattern.is_match("123 hello abc"));
        assert!(pattern.captures("123 hello abc").unwrap().is_empty());
    }

    #[test]
    fn test_alternation_stays_anchored() {
        let pattern = RoutePattern::compile("ping|pong").unwrap();
        assert!(pattern.is_match("pong"));
        assert!(!pattern.is_match("ping pong pang"));
    }

    #[test]
    fn test_named_placeholder() {
        let pattern = RoutePattern::compile("find <user>").unwrap();
        let captures = pattern.captures("find testuser").unwrap();
        assert_eq!(captures.get("user"), Some("testuser"));
        assert!(pattern.captures("find").is_none());
    }

    #[test]
    fn test_greedy_placeholder() {
        let pattern = RoutePattern::compile("<a> to <b>").unwrap();

        let captures = pattern.captures("1 to 2").unwrap();
        assert_eq!(captures.get("a"), Some("1"));
        assert_eq!(captures.get("b"), Some("2"));

        let captures = pattern.captures("1 to 2 to 3").unwrap();
        assert_eq!(captures.get("a"), Some("1 to 2"));
        assert_eq!(captures.get("b"), Some("3"));
    }

    #[test]
    fn test_lazy_placeholder() {
        let pattern = RoutePattern::compile("<a?> to <b>").unwrap();

        let captures = pattern.captures("1 to 2 to 3").unwrap();
        assert_eq!(captures.get("a"), Some("1"));
        assert_eq!(captures.get("b"), Some("2 to 3"));
    }

    #[test]
    fn test_optional_group_left_out() {
        let pattern = RoutePattern::compile("deploy(?: (?P<env>\\w+))?").unwrap();
        assert!(pattern.captures("deploy").unwrap().get("env").is_none());
        assert_eq!(
            pattern.captures("deploy prod").unwrap().get("env"),
            Some("prod")
        );
    }

    #[test]
    fn test_placeholder_after_optional_quantifier() {
        let pattern = RoutePattern::compile(r"find\s?<user>").unwrap();
        assert_eq!(
            pattern.captures("find alice").unwrap().get("user"),
            Some("alice")
        );
        assert_eq!(
            pattern.captures("findalice").unwrap().get("user"),
            Some("alice")
        );
    }

    #[test]
    fn test_placeholder_after_lazy_quantifier() {
        let pattern = RoutePattern::compile("x+?<a?> y").unwrap();
        let captures = pattern.captures("xx 1 y").unwrap();
        assert_eq!(captures.get("a"), Some("x 1"));
    }

    #[test]
    fn test_explicit_groups_left_alone() {
        let pattern = RoutePattern::compile("(?P<a>\\d+) (?<b>\\w+) <c>").unwrap();
        let captures = pattern.captures("12 ab rest").unwrap();
        assert_eq!(captures.get("a"), Some("12"));
        assert_eq!(captures.get("b"), Some("ab"));
        assert_eq!(captures.get("c"), Some("rest"));
    }

    #[test]
    fn test_same_route_is_equal() {
        let a = RoutePattern::compile("find <user>").unwrap();
        let b = RoutePattern::compile("find <user>").unwrap();
        let c = RoutePattern::compile("find <name>").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_invalid_pattern() {
        let err = RoutePattern::compile("find (").unwrap_err();
        assert!(matches!(err, RouterError::InvalidPattern { pattern, .. } if pattern == "find ("));
    }
}
