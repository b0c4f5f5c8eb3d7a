//! Controller and action registry.

use axum::http::Method;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::controller::{ActionHandler, RegistrationError};
use crate::filter::Filter;

/// Method key for actions that answer every HTTP method.
pub const ALL_METHODS: &str = "all";

/// Lowercased method, with `all` mapped to the empty wildcard.
pub(crate) fn normalize_method(method: &str) -> String {
    let method = method.to_ascii_lowercase();
    if method == ALL_METHODS {
        String::new()
    } else {
        method
    }
}

fn action_key(method: &str, action: &str) -> String {
    format!("{}_{}", normalize_method(method), action.to_ascii_lowercase())
}

/// One registered action.
#[derive(Clone)]
pub struct ActionInfo {
    name: String,
    controller: String,
    method: String,
    handler: ActionHandler,
    filters: Vec<Arc<dyn Filter>>,
}

impl ActionInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the owning controller.
    pub fn controller(&self) -> &str {
        &self.controller
    }

    /// Lowercased method, empty for the wildcard.
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn handler(&self) -> &ActionHandler {
        &self.handler
    }

    pub fn filters(&self) -> &[Arc<dyn Filter>] {
        &self.filters
    }
}

impl fmt::Debug for ActionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionInfo")
            .field("name", &self.name)
            .field("controller", &self.controller)
            .field("method", &self.method)
            .field("filters", &self.filters.len())
            .finish()
    }
}

/// A named group of actions sharing controller-level filters.
#[derive(Clone, Default)]
pub struct ControllerInfo {
    name: String,
    actions: HashMap<String, ActionInfo>,
    filters: Vec<Arc<dyn Filter>>,
}

impl ControllerInfo {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register `handler` for `method` (`"all"` for any method). Registering
    /// the same method and action twice is an error.
    pub fn reg_action(&mut self, method: &str, action: &str, handler: ActionHandler) -> Result<(), RegistrationError> {
        let key = action_key(method, action);
        if self.actions.contains_key(&key) {
            return Err(RegistrationError::DuplicateAction {
                method: display_method(method),
                controller: self.name.clone(),
                action: action.to_ascii_lowercase(),
            });
        }
        tracing::debug!(controller = %self.name, method = %method, action = %action, "Action registered");
        self.actions.insert(
            key,
            ActionInfo {
                name: action.to_ascii_lowercase(),
                controller: self.name.clone(),
                method: normalize_method(method),
                handler,
                filters: Vec::new(),
            },
        );
        Ok(())
    }

    /// The action for `method`, falling back to the any-method registration.
    pub fn get_action(&self, method: &str, action: &str) -> Option<&ActionInfo> {
        self.actions
            .get(&action_key(method, action))
            .or_else(|| self.actions.get(&action_key(ALL_METHODS, action)))
    }

    /// Filters applied to every action of this controller.
    pub fn add_filters(&mut self, filters: impl IntoIterator<Item = Arc<dyn Filter>>) {
        self.filters.extend(filters);
    }

    /// Filters applied to one registered action.
    pub fn add_action_filters(
        &mut self,
        method: &str,
        action: &str,
        filters: impl IntoIterator<Item = Arc<dyn Filter>>,
    ) -> Result<(), RegistrationError> {
        let info = self
            .actions
            .get_mut(&action_key(method, action))
            .ok_or_else(|| RegistrationError::UnknownAction {
                method: display_method(method),
                controller: self.name.clone(),
                action: action.to_ascii_lowercase(),
            })?;
        info.filters.extend(filters);
        Ok(())
    }

    pub fn filters(&self) -> &[Arc<dyn Filter>] {
        &self.filters
    }

    pub fn actions(&self) -> impl Iterator<Item = &ActionInfo> {
        self.actions.values()
    }
}

impl fmt::Debug for ControllerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerInfo")
            .field("name", &self.name)
            .field("actions", &self.actions.len())
            .field("filters", &self.filters.len())
            .finish()
    }
}

fn display_method(method: &str) -> String {
    match normalize_method(method) {
        m if m.is_empty() => "ALL".to_string(),
        m => m.to_ascii_uppercase(),
    }
}

/// Everything the dispatcher needs to run one action.
#[derive(Clone, Copy)]
pub struct ResolvedAction<'a> {
    pub controller: &'a ControllerInfo,
    pub action: &'a ActionInfo,
}

/// All registered controllers, keyed by lowercased name.
#[derive(Debug, Clone, Default)]
pub struct ControllerFactory {
    controllers: HashMap<String, ControllerInfo>,
}

impl ControllerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The controller named `name`, created on first use.
    pub fn controller_info_mut(&mut self, name: &str) -> &mut ControllerInfo {
        self.controllers
            .entry(name.to_ascii_lowercase())
            .or_insert_with(|| ControllerInfo::new(name))
    }

    pub fn controller_info(&self, name: &str) -> Option<&ControllerInfo> {
        self.controllers.get(&name.to_ascii_lowercase())
    }

    /// Resolve `(method, controller, action)` to a handler.
    pub fn get_action(&self, method: &Method, controller: &str, action: &str) -> Option<ResolvedAction<'_>> {
        let controller = self.controller_info(controller)?;
        let action = controller.get_action(method.as_str(), action)?;
        Some(ResolvedAction { controller, action })
    }

    pub fn controllers(&self) -> impl Iterator<Item = &ControllerInfo> {
        self.controllers.values()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ActionOutcome;
    use crate::http::{ActionResult, GenericResult, HttpContext};

    fn handler(body: &'static str) -> ActionHandler {
        Arc::new(move |_ctx: &mut HttpContext| -> ActionOutcome { Ok(GenericResult::raw(body).boxed()) })
    }

    fn body_of(info: &ActionInfo) -> Vec<u8> {
        let mut ctx = HttpContext::for_test("GET", "/");
        let mut result = (info.handler())(&mut ctx).unwrap();
        result.execute_result(&mut ctx).unwrap();
        ctx.response().body().to_vec()
    }

    #[test]
    fn test_wildcard_fallback() {
        let mut controller = ControllerInfo::new("Home");
        controller.reg_action("all", "Index", handler("any")).unwrap();

        let found = controller.get_action("GET", "index").unwrap();
        assert_eq!(found.method(), "");
        assert_eq!(body_of(found), b"any");
    }

    #[test]
    fn test_method_specific_wins() {
        let mut controller = ControllerInfo::new("home");
        controller.reg_action("all", "index", handler("any")).unwrap();
        controller.reg_action("get", "index", handler("get")).unwrap();

        assert_eq!(body_of(controller.get_action("GET", "index").unwrap()), b"get");
        assert_eq!(body_of(controller.get_action("POST", "index").unwrap()), b"any");
    }

    #[test]
    fn test_duplicate_registration() {
        let mut controller = ControllerInfo::new("home");
        controller.reg_action("get", "index", handler("a")).unwrap();
        let err = controller.reg_action("GET", "Index", handler("b")).unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateAction { .. }));
        assert_eq!(err.to_string(), "action GET home/index is already registered");

        controller.reg_action("post", "index", handler("c")).unwrap();
    }

    #[test]
    fn test_add_action_filters_unknown() {
        let mut controller = ControllerInfo::new("home");
        let err = controller
            .add_action_filters("get", "missing", Vec::new())
            .unwrap_err();
        assert!(matches!(err, RegistrationError::UnknownAction { .. }));
    }

    #[test]
    fn test_factory_lookup() {
        let mut factory = ControllerFactory::new();
        factory
            .controller_info_mut("Blog")
            .reg_action("get", "show", handler("show"))
            .unwrap();

        let resolved = factory.get_action(&Method::GET, "blog", "SHOW").unwrap();
        assert_eq!(resolved.controller.name(), "blog");
        assert_eq!(resolved.action.name(), "show");
        assert_eq!(resolved.action.controller(), "blog");
        assert!(factory.get_action(&Method::POST, "blog", "show").is_none());
        assert!(factory.get_action(&Method::GET, "admin", "show").is_none());
    }
}
