//! Capture extraction for compiled routes.
//!
//! # Responsibilities
//! - Pull named groups out of a dynamic route match
//! - Resolve the file path of a static route match
//!
//! # Design Decisions
//! - Only named groups are reported; unnamed groups in literal pattern text
//!   are ignored for dynamic routes
//! - A named group that did not participate in the match reports an empty
//!   string, so defaults can be applied uniformly afterwards

use regex::Regex;
use std::collections::HashMap;

/// Named capture groups of a full match of `url`, or `None` when it does
/// not match.
pub fn named_groups(regex: &Regex, url: &str) -> Option<HashMap<String, String>> {
    let caps = regex.captures(url)?;
    let groups = regex
        .capture_names()
        .flatten()
        .map(|name| {
            let value = caps.name(name).map(|m| m.as_str()).unwrap_or_default();
            (name.to_string(), value.to_string())
        })
        .collect();
    Some(groups)
}

/// Relative file path for a static route: the first capture group when the
/// pattern has one, otherwise the whole matched text.
///
/// ```text
/// pattern /static/.*    url /static/logo.gif  → /static/logo.gif
/// pattern /static/(.*)  url /static/logo.gif  → logo.gif
/// ```
pub fn static_path(regex: &Regex, url: &str) -> Option<String> {
    let caps = regex.captures(url)?;
    let path = if caps.len() > 1 {
        caps.get(1).map(|m| m.as_str()).unwrap_or_default()
    } else {
        &caps[0]
    };
    Some(path.to_string())
}
