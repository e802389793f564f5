//! The bundled documentation page templates.

use minijinja::{AutoEscape, Environment};
use serde::Serialize;
use thiserror::Error;

/// Every template the service can render, compiled into the binary.
const BUNDLED: [(&str, &str); 4] = [
    ("openapi.html", include_str!("../templates/openapi.html")),
    ("asyncapi.html", include_str!("../templates/asyncapi.html")),
    (
        "unsupported_version.html",
        include_str!("../templates/unsupported_version.html"),
    ),
    (
        "error_invalid_schema.html",
        include_str!("../templates/error_invalid_schema.html"),
    ),
];

/// Template errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A bundled template does not parse.
    #[error("template '{name}' failed to parse: {source}")]
    Parse {
        name: &'static str,
        #[source]
        source: minijinja::Error,
    },

    /// Rendering failed, or the template does not exist.
    #[error("template '{name}' failed to render: {source}")]
    Render {
        name: String,
        #[source]
        source: minijinja::Error,
    },
}

/// The parsed template set, shared read-only by all requests.
#[derive(Debug)]
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// Parse every bundled template.
    pub fn load() -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        // Context values are base64 and never contain markup.
        env.set_auto_escape_callback(|_| AutoEscape::None);

        for (name, source) in BUNDLED {
            env.add_template(name, source)
                .map_err(|source| TemplateError::Parse { name, source })?;
        }

        Ok(Self { env })
    }

    /// Render `name` with `context`.
    pub fn render<S: Serialize>(&self, name: &str, context: S) -> Result<String, TemplateError> {
        let render_error = |source| TemplateError::Render {
            name: name.to_string(),
            source,
        };
        self.env
            .get_template(name)
            .map_err(render_error)?
            .render(context)
            .map_err(render_error)
    }

    /// Names of the loaded templates.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.env.templates().map(|(name, _)| name)
    }
}
