//! Shared application state handed to every request context.

use std::path::Path;
use std::sync::Arc;

use crate::binding::Binder;
use crate::config::ServerConfig;
use crate::directory::{EmployeeDirectory, InMemoryDirectory};
use crate::http::templates::{TemplateError, Templates};
use crate::observability::{TelemetrySink, TracingSink};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub directory: Arc<dyn EmployeeDirectory>,
    pub templates: Arc<Templates>,
    pub binder: Arc<Binder>,
    pub sink: Arc<dyn TelemetrySink>,
}

impl AppState {
    /// State for a running server: seeded directory, templates from
    /// `assets.templates_dir`, tracing sink.
    pub fn from_config(config: ServerConfig) -> Result<Self, TemplateError> {
        let templates = Templates::load(Path::new(&config.assets.templates_dir))?;
        Ok(Self::new(config, templates))
    }

    pub fn new(config: ServerConfig, templates: Templates) -> Self {
        Self {
            config: Arc::new(config),
            directory: Arc::new(InMemoryDirectory::seeded()),
            templates: Arc::new(templates),
            binder: Arc::new(Binder::default()),
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_directory(mut self, directory: Arc<dyn EmployeeDirectory>) -> Self {
        self.directory = directory;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_binder(mut self, binder: Binder) -> Self {
        self.binder = Arc::new(binder);
        self
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self::new(ServerConfig::default(), Templates::default())
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("templates", &self.templates)
            .field("binder", &self.binder)
            .finish_non_exhaustive()
    }
}
