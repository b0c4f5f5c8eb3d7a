//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled routes
//! - Look up the first route matching a URL path
//! - Return matched route data or explicit no-match
//!
//! # Design Decisions
//! - Routes are compiled when added; a table never holds an uncompiled route
//! - Insertion order is priority order (first match wins)
//! - O(n) scan (acceptable for typical route counts)
//! - No removal or reordering once built

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::RouteConfig;
use crate::routing::route::{Route, RouteData, RouteError};

/// Ordered list of compiled routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Arc<Route>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from config entries, preserving their order.
    pub fn from_config(configs: &[RouteConfig]) -> Result<Self, RouteError> {
        let mut table = Self::new();
        for config in configs {
            table.add_route(Route::from_config(config))?;
        }
        Ok(table)
    }

    /// Compile `route` and append it.
    pub fn add_route(&mut self, mut route: Route) -> Result<(), RouteError> {
        route.compile()?;
        tracing::debug!(
            name = route.name(),
            pattern = route.pattern(),
            is_static = route.is_static(),
            "Route added"
        );
        self.routes.push(Arc::new(route));
        Ok(())
    }

    /// Add a controller/action route.
    pub fn map(
        &mut self,
        name: &str,
        pattern: &str,
        defaults: HashMap<String, String>,
        constraints: HashMap<String, String>,
    ) -> Result<(), RouteError> {
        self.add_route(
            Route::new(name, pattern)
                .with_defaults(defaults)
                .with_constraints(constraints),
        )
    }

    /// Add a file-serving route.
    pub fn add_static(&mut self, name: &str, pattern: &str) -> Result<(), RouteError> {
        self.add_route(Route::static_files(name, pattern))
    }

    /// First route matching `url`. An empty url never matches.
    pub fn match_url(&self, url: &str) -> Option<RouteData> {
        if url.is_empty() {
            return None;
        }
        let matched = self.routes.iter().find_map(|route| route.match_url(url));
        match &matched {
            Some(rd) => tracing::trace!(url, route = rd.route.name(), "Route matched"),
            None => tracing::trace!(url, "No route matched"),
        }
        matched
    }

    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
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

    fn table() -> RouteTable {
        let mut table = RouteTable::new();
        table
            .map(
                "post",
                "/post/{action}/{id}",
                map(&[("controller", "post")]),
                map(&[("id", r"\d+")]),
            )
            .unwrap();
        table
            .map("nodefault", "/{controller}/{action}/{id}", map(&[]), map(&[]))
            .unwrap();
        table
            .map(
                "default",
                "/{controller}/{action}/{id}",
                map(&[("controller", "home"), ("action", "index"), ("id", "0")]),
                map(&[]),
            )
            .unwrap();
        table
    }

    #[test]
    fn test_first_match_wins() {
        let table = table();
        assert_eq!(table.match_url("/post/update/2").unwrap().route.name(), "post");
        assert_eq!(table.match_url("/home/index/3").unwrap().route.name(), "nodefault");
        assert_eq!(table.match_url("/p").unwrap().route.name(), "default");
        assert_eq!(table.match_url("/post/save").unwrap().route.name(), "default");
    }

    #[test]
    fn test_overlapping_routes_prefer_earlier() {
        let mut table = RouteTable::new();
        table.add_route(Route::new("a", "/{controller}/{action}")).unwrap();
        table.add_route(Route::new("b", "/{controller}/{action}")).unwrap();
        assert_eq!(table.match_url("/x/y").unwrap().route.name(), "a");
    }

    #[test]
    fn test_empty_url_never_matches() {
        assert!(table().match_url("").is_none());
    }

    #[test]
    fn test_no_match() {
        let mut table = RouteTable::new();
        table.add_static("static", "/static/(.*)").unwrap();
        assert!(table.match_url("/home/index").is_none());
        assert_eq!(
            table.match_url("/static/css/site.css").unwrap().file_path.as_deref(),
            Some("css/site.css")
        );
    }

    #[test]
    fn test_add_route_surfaces_compile_errors() {
        let mut table = RouteTable::new();
        assert!(table.add_route(Route::new("", "/x")).is_err());
        assert!(table.is_empty());
    }

    #[test]
    fn test_from_config_keeps_order() {
        let configs: Vec<RouteConfig> = toml::from_str::<crate::config::AppConfig>(
            r#"
            [[routes]]
            name = "static"
            pattern = "/static/(.*)"
            is_static = true

            [[routes]]
            name = "default"
            pattern = "/{controller}/{action}"
            defaults = { controller = "home", action = "index" }
            "#,
        )
        .unwrap()
        .routes;
        let table = RouteTable::from_config(&configs).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.routes()[0].name(), "static");
        assert!(table.match_url("/static/a.js").unwrap().is_static());
        assert_eq!(table.match_url("/").unwrap().controller, "home");
    }
}
