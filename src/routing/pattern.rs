//! Route template compilation.
//!
//! Turns a template such as `/{controller}/{action}/{id}` into an anchored
//! regular expression with one named capture group per placeholder:
//!
//! ```text
//! /{controller}/{action}/{id}     defaults: controller, action, id
//!     → ^/?(?P<controller>[^.?#/]+)?/?(?P<action>[^.?#/]+)?/?(?P<id>[^?#/]+)?$
//! ```
//!
//! Literal text between placeholders is copied verbatim, so it may itself
//! contain regex syntax (static routes rely on this, e.g. `/static/(.*)`).

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

use crate::routing::route::RouteError;

/// Placeholder token, optionally preceded by a slash: `/{name}` or `{name}`.
/// Names start with a letter or `_`, so regex quantifiers such as `\d{4}`
/// in literal text are left alone.
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/?\{([A-Za-z_][\w\-]*)\}").expect("placeholder regex is valid")
});

/// Segment fragment for `controller` and `action`; refuses `.` so a file
/// extension never ends up in an action name.
const RESERVED_SEGMENT: &str = r"[^\.\?#/]+";

/// Segment fragment for every other placeholder.
const DEFAULT_SEGMENT: &str = r"[^\?#/]+";

/// A compiled route template.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
    params: Vec<String>,
}

impl CompiledPattern {
    /// The anchored expression used for matching.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Placeholder names in the order they appear in the template.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Full-string match test.
    pub fn is_match(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }
}

/// Compile `pattern` for the route called `route_name`.
pub fn compile(
    route_name: &str,
    pattern: &str,
    defaults: &HashMap<String, String>,
    constraints: &HashMap<String, String>,
) -> Result<CompiledPattern, RouteError> {
    let mut params = Vec::new();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(pattern) {
        let token = caps.get(0).expect("group 0 always participates");
        out.push_str(&pattern[last..token.start()]);
        last = token.end();

        let name = &caps[1];
        if name.contains('-') {
            return Err(RouteError::InvalidParamName {
                route: route_name.to_string(),
                param: name.to_string(),
            });
        }
        out.push_str(&placeholder_fragment(&caps, name, defaults, constraints));
        params.push(name.to_string());
    }
    out.push_str(&pattern[last..]);

    if out.ends_with('/') {
        out.push('?');
    }

    let regex = Regex::new(&format!("^{out}$")).map_err(|source| RouteError::InvalidPattern {
        route: route_name.to_string(),
        source,
    })?;

    Ok(CompiledPattern { regex, params })
}

fn placeholder_fragment(
    caps: &Captures<'_>,
    name: &str,
    defaults: &HashMap<String, String>,
    constraints: &HashMap<String, String>,
) -> String {
    let has_slash = caps[0].starts_with('/');
    let segment = match constraints.get(name) {
        Some(constraint) => constraint.as_str(),
        None if name == "controller" || name == "action" => RESERVED_SEGMENT,
        None => DEFAULT_SEGMENT,
    };

    // A defaulted placeholder may be omitted along with its slash.
    let optional = defaults.contains_key(name);
    let slash = match (has_slash, optional) {
        (true, true) => "/?",
        (true, false) => "/",
        (false, _) => "",
    };
    let quantifier = if optional { "?" } else { "" };

    format!("{slash}(?P<{name}>{segment}){quantifier}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_compile_without_defaults() {
        let compiled = compile("r", "/{controller}/{action}/{id}", &map(&[]), &map(&[])).unwrap();
        assert_eq!(
            compiled.regex().as_str(),
            r"^/(?P<controller>[^\.\?#/]+)/(?P<action>[^\.\?#/]+)/(?P<id>[^\?#/]+)$"
        );
        assert_eq!(compiled.params(), ["controller", "action", "id"]);
    }

    #[test]
    fn test_defaults_make_segments_optional() {
        let defaults = map(&[("controller", "home"), ("action", "index"), ("id", "0")]);
        let compiled = compile("r", "/{controller}/{action}/{id}", &defaults, &map(&[])).unwrap();
        assert_eq!(
            compiled.regex().as_str(),
            r"^/?(?P<controller>[^\.\?#/]+)?/?(?P<action>[^\.\?#/]+)?/?(?P<id>[^\?#/]+)?$"
        );
        assert!(compiled.is_match("/"));
        assert!(compiled.is_match(""));
        assert!(compiled.is_match("/home"));
        assert!(compiled.is_match("/home/index/3"));
    }

    #[test]
    fn test_constraint_replaces_fragment() {
        let compiled = compile("r", "/post/{id}", &map(&[]), &map(&[("id", r"\d+")])).unwrap();
        assert!(compiled.is_match("/post/42"));
        assert!(!compiled.is_match("/post/abc"));
    }

    #[test]
    fn test_reserved_names_reject_dots() {
        let compiled = compile("r", "/{controller}/{file}", &map(&[]), &map(&[])).unwrap();
        assert!(compiled.is_match("/docs/readme.txt"));
        assert!(!compiled.is_match("/docs.v2/readme"));
    }

    #[test]
    fn test_trailing_slash_is_optional() {
        let compiled = compile("r", "/{controller}/{action}/", &map(&[]), &map(&[])).unwrap();
        assert!(compiled.is_match("/home/index/"));
        assert!(compiled.is_match("/home/index"));
    }

    #[test]
    fn test_literal_text_is_kept() {
        let compiled = compile("static", "/static/(.*)", &map(&[]), &map(&[])).unwrap();
        assert_eq!(compiled.regex().as_str(), "^/static/(.*)$");
        assert!(compiled.params().is_empty());
    }

    #[test]
    fn test_placeholder_without_slash() {
        let compiled =
            compile("r", "/blog-{year}", &map(&[("year", "2024")]), &map(&[("year", r"\d{4}")]))
                .unwrap();
        assert!(compiled.is_match("/blog-2023"));
        assert!(compiled.is_match("/blog-"));
        assert!(!compiled.is_match("/blog-23"));
    }

    #[test]
    fn test_is_full_string_match() {
        let compiled = compile("r", "/{controller}", &map(&[]), &map(&[])).unwrap();
        assert!(!compiled.is_match("/home/extra"));
        assert!(!compiled.is_match("prefix/home"));
    }

    #[test]
    fn test_hyphenated_name_rejected() {
        let err = compile("r", "/{post-id}", &map(&[]), &map(&[])).unwrap_err();
        assert!(matches!(err, RouteError::InvalidParamName { ref param, .. } if param == "post-id"));
    }

    #[test]
    fn test_literal_quantifier_is_not_a_placeholder() {
        let compiled = compile("archive", r"/archive/(\d{4})/{slug}", &map(&[]), &map(&[])).unwrap();
        assert_eq!(compiled.params(), ["slug"]);
        assert!(compiled.is_match("/archive/2024/hello"));
        assert!(!compiled.is_match("/archive/24/hello"));

        let compiled = compile("static", r"/files/(\w{2,8})", &map(&[]), &map(&[])).unwrap();
        assert!(compiled.params().is_empty());
        assert!(compiled.is_match("/files/report"));
    }

    #[test]
    fn test_invalid_constraint_rejected() {
        let err = compile("r", "/{id}", &map(&[]), &map(&[("id", "(")])).unwrap_err();
        assert!(matches!(err, RouteError::InvalidPattern { .. }));
    }
}
