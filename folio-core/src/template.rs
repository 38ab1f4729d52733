use std::path::Path;

use tera::{Context, Tera};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template error: {0}")]
    TeraError(#[from] tera::Error),
    #[error("Invalid theme path: {0}")]
    InvalidPath(String),
}

/// Templates compiled into the binary. A theme directory may override any
/// of them by file name.
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../theme/base.html")),
    ("about.html", include_str!("../theme/about.html")),
    ("projects.html", include_str!("../theme/projects.html")),
    ("blog.html", include_str!("../theme/blog.html")),
    ("post.html", include_str!("../theme/post.html")),
    ("publications.html", include_str!("../theme/publications.html")),
];

pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Only the built-in templates.
    pub fn builtin() -> Result<Self, TemplateError> {
        Ok(Self {
            tera: builtin_tera()?,
        })
    }

    /// Built-in templates overridden by every `*.html` file under
    /// `theme_dir`. A missing theme directory means no overrides.
    pub fn new<P: AsRef<Path>>(theme_dir: P) -> Result<Self, TemplateError> {
        let theme_dir = theme_dir.as_ref();
        if !theme_dir.is_dir() {
            return Self::builtin();
        }

        let glob = theme_dir.join("**").join("*.html");
        let glob = glob
            .to_str()
            .ok_or_else(|| TemplateError::InvalidPath(theme_dir.display().to_string()))?;

        // `parse` skips inheritance checks so theme files may extend a
        // built-in base; `extend` links everything afterwards.
        let mut tera = Tera::parse(glob)?;
        tera.extend(&builtin_tera()?)?;
        tracing::debug!(theme = %theme_dir.display(), "loaded theme templates");

        Ok(Self { tera })
    }

    /// Build a renderer from raw `(name, source)` pairs layered over the
    /// built-in templates.
    pub fn with_templates(templates: &[(&str, &str)]) -> Result<Self, TemplateError> {
        let mut tera = builtin_tera()?;
        tera.add_raw_templates(templates.to_vec())?;

        Ok(Self { tera })
    }

    pub fn has_template(&self, template: &str) -> bool {
        self.tera.get_template_names().any(|name| name == template)
    }

    pub fn render(&self, template: &str, context: &Context) -> Result<String, TemplateError> {
        Ok(self.tera.render(template, context)?)
    }
}

fn builtin_tera() -> Result<Tera, TemplateError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(BUILTIN_TEMPLATES.to_vec())?;
    Ok(tera)
}
