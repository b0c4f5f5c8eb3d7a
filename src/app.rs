//! Application setup.
//!
//! # Responsibilities
//! - Collect routes, controllers, middlewares and the view engine
//! - Fail fast on configuration errors before anything is served
//! - Freeze everything into a shared [`RequestHandler`]
//!
//! # Design Decisions
//! - Setup is single-threaded and owns all state mutably; serving only ever
//!   sees the frozen handler behind an `Arc`
//! - Registration errors are `Err` values returned here, never panics

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{load_config, AppConfig, ConfigError};
use crate::controller::{ControllerBuilder, ControllerFactory, RegistrationError};
use crate::dispatch::RequestHandler;
use crate::middleware::{Middleware, MiddlewareChain};
use crate::routing::{RouteError, RouteTable};
use crate::view::{DefaultViewEngine, ViewEngine};

/// Errors that stop an application from starting.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("route table is empty")]
    NoRoutes,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

/// Mutable application state during setup.
pub struct Application {
    config: AppConfig,
    routes: RouteTable,
    controllers: ControllerFactory,
    middlewares: MiddlewareChain,
    view_engine: Option<Arc<dyn ViewEngine>>,
}

impl Application {
    /// An application with no routes yet; `config.routes` is ignored.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            routes: RouteTable::new(),
            controllers: ControllerFactory::new(),
            middlewares: MiddlewareChain::new(),
            view_engine: None,
        }
    }

    /// An application whose route table is built from `config.routes`.
    pub fn from_config(config: AppConfig) -> Result<Self, SetupError> {
        let routes = RouteTable::from_config(&config.routes)?;
        Ok(Self {
            routes,
            ..Self::new(config)
        })
    }

    /// Load, validate and apply a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, SetupError> {
        Self::from_config(load_config(path)?)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn routes_mut(&mut self) -> &mut RouteTable {
        &mut self.routes
    }

    pub fn controllers_mut(&mut self) -> &mut ControllerFactory {
        &mut self.controllers
    }

    /// Start registering actions on controller `name`.
    pub fn controller(&mut self, name: &str) -> ControllerBuilder<'_> {
        self.controllers.controller(name)
    }

    /// Append a middleware; middlewares run in the order they are added.
    pub fn middleware(&mut self, middleware: impl Middleware + 'static) -> &mut Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Replace the default file based view engine.
    pub fn view_engine(&mut self, engine: Arc<dyn ViewEngine>) -> &mut Self {
        self.view_engine = Some(engine);
        self
    }

    /// Freeze the application.
    pub fn build(self) -> Result<Arc<RequestHandler>, SetupError> {
        if self.routes.is_empty() {
            return Err(SetupError::NoRoutes);
        }
        let view_engine = self
            .view_engine
            .unwrap_or_else(|| Arc::new(DefaultViewEngine::from_config(&self.config.paths)));

        tracing::info!(
            routes = self.routes.len(),
            controllers = self.controllers.controllers().count(),
            middlewares = self.middlewares.len(),
            debug = self.config.debug,
            "Application built"
        );

        Ok(Arc::new(RequestHandler::new(
            self.routes,
            self.controllers,
            self.middlewares,
            Some(view_engine),
            Arc::new(self.config),
        )))
    }
}
