//! Fluent controller registration.
//!
//! ```
//! use trellis::controller::ControllerFactory;
//!
//! let mut factory = ControllerFactory::new();
//! factory
//!     .controller("home")
//!     .get("index", |ctx| Ok(ctx.html("<h1>home</h1>")))?
//!     .post("save", |ctx| Ok(ctx.redirect("/")))?;
//! # Ok::<(), trellis::controller::RegistrationError>(())
//! ```

use std::sync::Arc;

use crate::controller::{ActionOutcome, ControllerFactory, ControllerInfo, RegistrationError, ALL_METHODS};
use crate::filter::Filter;
use crate::http::HttpContext;

/// Registers actions on one controller.
pub struct ControllerBuilder<'a> {
    info: &'a mut ControllerInfo,
    last_action: Option<(String, String)>,
}

impl ControllerFactory {
    /// Start registering actions on `name`.
    pub fn controller(&mut self, name: &str) -> ControllerBuilder<'_> {
        ControllerBuilder {
            info: self.controller_info_mut(name),
            last_action: None,
        }
    }
}

impl<'a> ControllerBuilder<'a> {
    /// Register `handler` for `method`; `"all"` answers every method.
    pub fn action<F>(mut self, method: &str, action: &str, handler: F) -> Result<Self, RegistrationError>
    where
        F: Fn(&mut HttpContext) -> ActionOutcome + Send + Sync + 'static,
    {
        self.info.reg_action(method, action, Arc::new(handler))?;
        self.last_action = Some((method.to_string(), action.to_string()));
        Ok(self)
    }

    pub fn all<F>(self, action: &str, handler: F) -> Result<Self, RegistrationError>
    where
        F: Fn(&mut HttpContext) -> ActionOutcome + Send + Sync + 'static,
    {
        self.action(ALL_METHODS, action, handler)
    }

    pub fn get<F>(self, action: &str, handler: F) -> Result<Self, RegistrationError>
    where
        F: Fn(&mut HttpContext) -> ActionOutcome + Send + Sync + 'static,
    {
        self.action("get", action, handler)
    }

    pub fn post<F>(self, action: &str, handler: F) -> Result<Self, RegistrationError>
    where
        F: Fn(&mut HttpContext) -> ActionOutcome + Send + Sync + 'static,
    {
        self.action("post", action, handler)
    }

    pub fn put<F>(self, action: &str, handler: F) -> Result<Self, RegistrationError>
    where
        F: Fn(&mut HttpContext) -> ActionOutcome + Send + Sync + 'static,
    {
        self.action("put", action, handler)
    }

    pub fn delete<F>(self, action: &str, handler: F) -> Result<Self, RegistrationError>
    where
        F: Fn(&mut HttpContext) -> ActionOutcome + Send + Sync + 'static,
    {
        self.action("delete", action, handler)
    }

    /// Attach filters to the most recently registered action, or to the
    /// controller when no action has been registered through this builder.
    pub fn filters<I>(self, filters: I) -> Result<Self, RegistrationError>
    where
        I: IntoIterator<Item = Arc<dyn Filter>>,
    {
        match &self.last_action {
            Some((method, action)) => self.info.add_action_filters(method, action, filters)?,
            None => self.info.add_filters(filters),
        }
        Ok(self)
    }

    /// Shorthand for a single filter.
    pub fn filter(self, filter: impl Filter + 'static) -> Result<Self, RegistrationError> {
        self.filters([Arc::new(filter) as Arc<dyn Filter>])
    }
}
