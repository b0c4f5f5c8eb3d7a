//! Minimal placeholder template engine.
//!
//! `{{ name }}` inserts an HTML-escaped value, `{{{ name }}}` inserts it raw.
//! Names may be dotted paths into nested objects (`{{ user.name }}`); a
//! missing value renders as nothing.

use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::view::{RenderError, TemplateEngine};

static TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\{\s*([\w\.]+)\s*\}\}\}|\{\{\s*([\w\.]+)\s*\}\}").expect("tag regex is valid")
});

/// File based engine substituting `{{ }}` tags.
#[derive(Debug, Default)]
pub struct PlaceholderTemplateEngine {
    cache: Option<DashMap<PathBuf, Arc<str>>>,
}

impl PlaceholderTemplateEngine {
    /// Reads the template file on every render.
    pub fn new() -> Self {
        Self { cache: None }
    }

    /// Keeps template sources in memory after the first read.
    pub fn cached() -> Self {
        Self {
            cache: Some(DashMap::new()),
        }
    }

    fn source(&self, path: &Path) -> Result<Arc<str>, RenderError> {
        if let Some(source) = self.cache.as_ref().and_then(|c| c.get(path).map(|s| Arc::clone(s.value()))) {
            return Ok(source);
        }
        let bytes = std::fs::read(path).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text: Arc<str> = String::from_utf8(bytes)
            .map_err(|_| RenderError::Template {
                path: path.to_path_buf(),
                message: "template is not valid UTF-8".to_string(),
            })?
            .into();
        if let Some(cache) = &self.cache {
            cache.entry(path.to_path_buf()).or_insert_with(|| Arc::clone(&text));
        }
        Ok(text)
    }
}

impl TemplateEngine for PlaceholderTemplateEngine {
    fn render(&self, path: &Path, data: &Value, sink: &mut Vec<u8>) -> Result<(), RenderError> {
        let source = self.source(path)?;
        let rendered = render_str(&source, data);
        sink.extend_from_slice(rendered.as_bytes());
        Ok(())
    }
}

/// Substitute every tag in `template`.
pub fn render_str(template: &str, data: &Value) -> String {
    TAG.replace_all(template, |caps: &Captures<'_>| match (caps.get(1), caps.get(2)) {
        (Some(raw), _) => lookup(data, raw.as_str()),
        (None, Some(escaped)) => escape_html(&lookup(data, escaped.as_str())),
        (None, None) => String::new(),
    })
    .into_owned()
}

fn lookup(data: &Value, path: &str) -> String {
    let found = path
        .split('.')
        .try_fold(data, |value, key| value.get(key));
    match found {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
