pub mod builder;
pub mod config;
pub mod content;
pub mod markdown;
pub mod page;
pub mod post;
pub mod renderer;
pub mod template;

// Re-export main types
pub use builder::{BuildError, BuildReport, SiteBuilder, StaticBuild};
pub use content::{ContentLoader, FALLBACK_CONTENT};
pub use page::{PAGES, PageDef, PageKind};
pub use post::{Post, PostRegistry, RegistryError};
pub use renderer::{RenderError, RenderPolicy, RenderTarget, Rendered, Renderer};
pub use template::{TemplateError, TemplateRenderer};
