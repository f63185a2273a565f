//! HTML rendering through liquid templates.
//!
//! Templates are parsed once at startup from `assets.templates_dir`; the
//! file stem becomes the template name (`index.liquid` → `index`).

use std::collections::HashMap;
use std::path::Path;

use liquid::model::Object;
use liquid::ParserBuilder;
use serde::Serialize;
use thiserror::Error;

use crate::directory::Employee;

const TEMPLATE_EXTENSION: &str = "liquid";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read templates: {0}")]
    Io(#[from] std::io::Error),

    #[error("template {name} failed to parse: {source}")]
    Parse {
        name: String,
        #[source]
        source: liquid::Error,
    },

    #[error("template {name} failed to render: {source}")]
    Render {
        name: String,
        #[source]
        source: liquid::Error,
    },

    #[error("template {0} is not loaded")]
    Missing(String),
}

/// Parsed templates keyed by name.
#[derive(Default)]
pub struct Templates {
    templates: HashMap<String, liquid::Template>,
}

impl std::fmt::Debug for Templates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.templates.keys().collect();
        names.sort();
        f.debug_struct("Templates").field("templates", &names).finish()
    }
}

impl Templates {
    /// Parse every `*.liquid` file in `dir`.
    pub fn load(dir: &Path) -> Result<Self, TemplateError> {
        let mut sources = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            sources.push((name.to_string(), std::fs::read_to_string(&path)?));
        }

        let templates = Self::from_sources(sources)?;
        tracing::info!(dir = %dir.display(), count = templates.len(), "Templates loaded");
        Ok(templates)
    }

    pub fn from_sources<I, N, S>(sources: I) -> Result<Self, TemplateError>
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: AsRef<str>,
    {
        let parser = ParserBuilder::with_stdlib()
            .build()
            .map_err(|source| TemplateError::Parse {
                name: "<parser>".to_string(),
                source,
            })?;

        let mut templates = HashMap::new();
        for (name, source) in sources {
            let name = name.into();
            let template = parser
                .parse(source.as_ref())
                .map_err(|source| TemplateError::Parse {
                    name: name.clone(),
                    source,
                })?;
            templates.insert(name, template);
        }
        Ok(Self { templates })
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn render(&self, name: &str, globals: &Object) -> Result<String, TemplateError> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| TemplateError::Missing(name.to_string()))?;
        template.render(globals).map_err(|source| TemplateError::Render {
            name: name.to_string(),
            source,
        })
    }

    /// The `index` template with `employees` bound to the full list.
    pub fn render_index(&self, employees: &[Employee]) -> Result<String, TemplateError> {
        self.render("index", &globals("index", "employees", employees)?)
    }

    /// The `employee` template with `employee` bound to one record.
    pub fn render_employee(&self, employee: &Employee) -> Result<String, TemplateError> {
        self.render("employee", &globals("employee", "employee", employee)?)
    }
}

fn globals<T: Serialize + ?Sized>(
    template: &str,
    key: &str,
    value: &T,
) -> Result<Object, TemplateError> {
    let value = liquid::model::to_value(&value).map_err(|source| TemplateError::Render {
        name: template.to_string(),
        source,
    })?;
    let mut globals = Object::new();
    globals.insert(key.to_string().into(), value);
    Ok(globals)
}
