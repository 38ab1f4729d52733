use serde::Serialize;
use tera::Context;
use thiserror::Error;

use crate::config::SiteConfig;
use crate::content::ContentLoader;
use crate::page::PageKind;
use crate::post::{Post, PostRegistry};
use crate::template::{TemplateError, TemplateRenderer};

#[derive(Debug, Error)]
#[error("failed to render {target}: {source}")]
pub struct RenderError {
    pub target: String,
    #[source]
    pub source: TemplateError,
}

/// How the pipeline treats a template failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderPolicy {
    /// Fail the render. Batch builds use this so a broken template stops the
    /// build before anything is published.
    #[default]
    Strict,
    /// Log the failure and substitute an error page.
    Resilient,
}

#[derive(Debug, Clone, Copy)]
pub enum RenderTarget<'a> {
    Page(PageKind),
    Post(&'a Post),
}

impl RenderTarget<'_> {
    pub fn kind(&self) -> PageKind {
        match self {
            RenderTarget::Page(kind) => *kind,
            RenderTarget::Post(_) => PageKind::BlogPost,
        }
    }

    fn describe(&self) -> String {
        match self {
            RenderTarget::Page(kind) => format!("page {}", kind.template_name()),
            RenderTarget::Post(post) => format!("post {:?}", post.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Html(String),
    /// The template failed under [`RenderPolicy::Resilient`]; `html` is a
    /// stand-in error page.
    Recovered { html: String, reason: String },
}

impl Rendered {
    pub fn html(&self) -> &str {
        match self {
            Rendered::Html(html) | Rendered::Recovered { html, .. } => html,
        }
    }

    pub fn into_html(self) -> String {
        match self {
            Rendered::Html(html) | Rendered::Recovered { html, .. } => html,
        }
    }

    pub fn is_recovered(&self) -> bool {
        matches!(self, Rendered::Recovered { .. })
    }
}

#[derive(Serialize)]
struct PageInfo<'a> {
    kind: PageKind,
    title: &'a str,
}

/// Binds templates to their data: site config, post registry and content.
pub struct Renderer {
    templates: TemplateRenderer,
    site: SiteConfig,
    registry: PostRegistry,
    loader: ContentLoader,
}

impl Renderer {
    pub fn new(
        templates: TemplateRenderer,
        site: SiteConfig,
        registry: PostRegistry,
        loader: ContentLoader,
    ) -> Self {
        Self {
            templates,
            site,
            registry,
            loader,
        }
    }

    pub fn registry(&self) -> &PostRegistry {
        &self.registry
    }

    /// Render one page. Post bodies are loaded here, per call, and dropped
    /// with the returned context.
    pub fn render(
        &self,
        target: RenderTarget<'_>,
        policy: RenderPolicy,
    ) -> Result<Rendered, RenderError> {
        let context = self.context_for(target);
        let template = target.kind().template_name();

        match self.templates.render(template, &context) {
            Ok(html) => Ok(Rendered::Html(html)),
            Err(source) => {
                let err = RenderError {
                    target: target.describe(),
                    source,
                };
                match policy {
                    RenderPolicy::Strict => Err(err),
                    RenderPolicy::Resilient => {
                        tracing::error!(error = %err, "render failed, serving error page");
                        Ok(Rendered::Recovered {
                            html: error_page(&self.site.title),
                            reason: err.to_string(),
                        })
                    }
                }
            }
        }
    }

    fn context_for(&self, target: RenderTarget<'_>) -> Context {
        let kind = target.kind();
        let mut context = Context::new();
        context.insert("site", &self.site);
        context.insert("posts", self.registry.posts());

        match target {
            RenderTarget::Page(_) => {
                context.insert(
                    "page",
                    &PageInfo {
                        kind,
                        title: kind.title(),
                    },
                );
            }
            RenderTarget::Post(post) => {
                let loaded = self.loader.load_post(post);
                let title = if loaded.header.is_empty() {
                    kind.title()
                } else {
                    loaded.header.as_str()
                };
                context.insert("page", &PageInfo { kind, title });
                context.insert("post", &loaded);
            }
        }

        context
    }
}

fn error_page(site_title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>Error | {}</title></head>\n<body><h1>Something went wrong</h1><p>This page could not be rendered.</p></body>\n</html>\n",
        html_escape::encode_text(site_title)
    )
}
