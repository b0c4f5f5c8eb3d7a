//! File system view lookup.
//!
//! # Responsibilities
//! - Map (controller, view) to a template file
//! - Wrap views in an optional layout
//! - Cache resolved paths across requests
//!
//! # Design Decisions
//! - Lookup order: `{root}/{controller}/{view}.{ext}`, then `{root}/shared/{view}.{ext}`
//! - The layout receives the rendered view as `body` (insert raw: `{{{ body }}}`)
//! - Cache keys are `controller_action_view`; concurrent requests may both
//!   miss, the first insert wins and both resolve to the same path

use dashmap::DashMap;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::PathsConfig;
use crate::view::{PlaceholderTemplateEngine, RenderError, TemplateEngine, ViewEngine, ViewRequest};

const SHARED_DIR: &str = "shared";

/// Default [`ViewEngine`] backed by a directory of templates.
pub struct DefaultViewEngine {
    root: PathBuf,
    extension: String,
    template_engine: Arc<dyn TemplateEngine>,
    cache: Option<DashMap<String, PathBuf>>,
}

impl DefaultViewEngine {
    pub fn new(root: impl Into<PathBuf>, template_engine: Arc<dyn TemplateEngine>) -> Self {
        Self {
            root: root.into(),
            extension: "html".to_string(),
            template_engine,
            cache: None,
        }
    }

    /// Engine for the configured view directory, using the placeholder
    /// template engine.
    pub fn from_config(paths: &PathsConfig) -> Self {
        let template_engine: Arc<dyn TemplateEngine> = if paths.cache_views {
            Arc::new(PlaceholderTemplateEngine::cached())
        } else {
            Arc::new(PlaceholderTemplateEngine::new())
        };
        let engine = Self::new(paths.view_root(), template_engine).with_extension(&paths.view_extension);
        if paths.cache_views {
            engine.with_cache()
        } else {
            engine
        }
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    pub fn with_cache(mut self) -> Self {
        self.cache = Some(DashMap::new());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn candidates(&self, controller: &str, name: &str) -> Vec<PathBuf> {
        let file = format!("{name}.{}", self.extension);
        let mut paths = Vec::with_capacity(2);
        if !controller.is_empty() {
            paths.push(self.root.join(controller).join(&file));
        }
        paths.push(self.root.join(SHARED_DIR).join(&file));
        paths
    }

    fn find(&self, key: String, candidates: Vec<PathBuf>) -> Result<PathBuf, Vec<PathBuf>> {
        if let Some(path) = self.cache.as_ref().and_then(|c| c.get(&key).map(|p| p.value().clone())) {
            return Ok(path);
        }
        match candidates.iter().find(|p| p.is_file()) {
            Some(found) => {
                if let Some(cache) = &self.cache {
                    cache.entry(key).or_insert_with(|| found.clone());
                }
                Ok(found.clone())
            }
            None => Err(candidates),
        }
    }

    fn lookup_layout(&self, controller: &str, layout: &str) -> Result<PathBuf, RenderError> {
        let key = format!("{controller}__layout_{layout}");
        self.find(key, self.candidates(controller, layout))
            .map_err(|searched| RenderError::LayoutNotFound {
                layout: layout.to_string(),
                searched,
            })
    }
}

impl ViewEngine for DefaultViewEngine {
    fn lookup_view(&self, controller: &str, action: &str, view_name: &str) -> Result<PathBuf, RenderError> {
        let key = format!("{controller}_{action}_{view_name}");
        self.find(key, self.candidates(controller, view_name))
            .map_err(|searched| RenderError::ViewNotFound {
                controller: controller.to_string(),
                action: action.to_string(),
                view: view_name.to_string(),
                searched,
            })
    }

    fn render(&self, request: &ViewRequest<'_>, data: &Value, sink: &mut Vec<u8>) -> Result<(), RenderError> {
        let view = self.lookup_view(request.controller, request.action, request.view())?;
        let Some(layout) = request.layout else {
            return self.template_engine.render(&view, data, sink);
        };

        let layout = self.lookup_layout(request.controller, layout)?;
        let mut body = Vec::new();
        self.template_engine.render(&view, data, &mut body)?;

        let mut layout_data = match data {
            Value::Object(map) => map.clone(),
            Value::Null => serde_json::Map::new(),
            other => serde_json::Map::from_iter([("model".to_string(), other.clone())]),
        };
        layout_data.insert(
            "body".to_string(),
            Value::String(String::from_utf8_lossy(&body).into_owned()),
        );
        self.template_engine.render(&layout, &Value::Object(layout_data), sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture() -> (tempfile::TempDir, DefaultViewEngine) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("home")).unwrap();
        std::fs::create_dir_all(root.join("shared")).unwrap();
        std::fs::write(root.join("home/index.html"), "<p>{{ greeting }}</p>").unwrap();
        std::fs::write(root.join("shared/about.html"), "about {{ name }}").unwrap();
        std::fs::write(root.join("shared/main.html"), "<main>{{{ body }}}</main><title>{{ title }}</title>").unwrap();

        let engine = DefaultViewEngine::new(root, Arc::new(PlaceholderTemplateEngine::new())).with_cache();
        (dir, engine)
    }

    #[test]
    fn test_lookup_order() {
        let (dir, engine) = fixture();
        assert_eq!(
            engine.lookup_view("home", "index", "index").unwrap(),
            dir.path().join("home/index.html")
        );
        assert_eq!(
            engine.lookup_view("home", "about", "about").unwrap(),
            dir.path().join("shared/about.html")
        );
    }

    #[test]
    fn test_lookup_miss_lists_searched_paths() {
        let (dir, engine) = fixture();
        match engine.lookup_view("home", "edit", "edit").unwrap_err() {
            RenderError::ViewNotFound { searched, view, .. } => {
                assert_eq!(view, "edit");
                assert_eq!(
                    searched,
                    vec![dir.path().join("home/edit.html"), dir.path().join("shared/edit.html")]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_lookup_is_cached() {
        let (dir, engine) = fixture();
        engine.lookup_view("home", "index", "index").unwrap();
        std::fs::remove_file(dir.path().join("home/index.html")).unwrap();
        assert!(engine.lookup_view("home", "index", "index").is_ok());
    }

    #[test]
    fn test_render_defaults_to_action() {
        let (_dir, engine) = fixture();
        let mut out = Vec::new();
        let request = ViewRequest {
            controller: "home",
            action: "index",
            ..Default::default()
        };
        engine.render(&request, &json!({ "greeting": "hi" }), &mut out).unwrap();
        assert_eq!(out, b"<p>hi</p>");
    }

    #[test]
    fn test_render_with_layout() {
        let (_dir, engine) = fixture();
        let mut out = Vec::new();
        let request = ViewRequest {
            controller: "home",
            action: "index",
            view_name: None,
            layout: Some("main"),
        };
        engine
            .render(&request, &json!({ "greeting": "hi", "title": "Home" }), &mut out)
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "<main><p>hi</p></main><title>Home</title>"
        );
    }

    #[test]
    fn test_missing_layout() {
        let (_dir, engine) = fixture();
        let request = ViewRequest {
            controller: "home",
            action: "index",
            view_name: None,
            layout: Some("nope"),
        };
        let err = engine.render(&request, &Value::Null, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, RenderError::LayoutNotFound { .. }));
    }
}
