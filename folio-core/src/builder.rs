use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::config::SiteConfig;
use crate::content::ContentLoader;
use crate::page::{PAGES, post_output_file};
use crate::post::PostRegistry;
use crate::renderer::{RenderError, RenderPolicy, RenderTarget, Rendered, Renderer};
use crate::template::{TemplateError, TemplateRenderer};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Output directory {0} must have a parent directory and a name")]
    InvalidOutput(PathBuf),
    #[error("Assets directory {0} does not exist")]
    MissingAssets(PathBuf),
    #[error("Failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl BuildError {
    fn io(action: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> BuildError {
        let path = path.to_path_buf();
        move |source| BuildError::Io {
            action,
            path,
            source,
        }
    }
}

/// What a successful build produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub pages: usize,
    pub posts: usize,
    pub assets: usize,
    /// Targets replaced by an error page under [`RenderPolicy::Resilient`].
    pub recovered: Vec<String>,
}

impl BuildReport {
    pub fn files_written(&self) -> usize {
        self.pages + self.posts
    }
}

pub struct SiteBuilder {
    output_dir: PathBuf,
    assets_dir: PathBuf,
    theme_dir: Option<PathBuf>,
    content_root: PathBuf,
    site: SiteConfig,
    registry: PostRegistry,
    policy: RenderPolicy,
}

impl Default for SiteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteBuilder {
    pub fn new() -> Self {
        Self {
            output_dir: PathBuf::from("./dist"),
            assets_dir: PathBuf::from("./assets"),
            theme_dir: None,
            content_root: PathBuf::from("."),
            site: SiteConfig::default(),
            registry: PostRegistry::builtin(),
            policy: RenderPolicy::Strict,
        }
    }

    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = path.as_ref().to_path_buf();
        self
    }

    pub fn assets_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.assets_dir = path.as_ref().to_path_buf();
        self
    }

    pub fn theme_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.theme_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Directory that relative post content paths are resolved against.
    pub fn content_root<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.content_root = path.as_ref().to_path_buf();
        self
    }

    pub fn site_config(mut self, config: SiteConfig) -> Self {
        self.site = config;
        self
    }

    pub fn registry(mut self, registry: PostRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn policy(mut self, policy: RenderPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The render pipeline alone, for callers that serve pages instead of
    /// writing them.
    pub fn into_renderer(self) -> Result<Renderer, BuildError> {
        let templates = match &self.theme_dir {
            Some(dir) => TemplateRenderer::new(dir)?,
            None => TemplateRenderer::builtin()?,
        };

        Ok(Renderer::new(
            templates,
            self.site,
            self.registry,
            ContentLoader::new(&self.content_root),
        ))
    }

    pub fn build(self) -> Result<StaticBuild, BuildError> {
        let output_dir = self.output_dir.clone();
        let assets_dir = self.assets_dir.clone();
        let policy = self.policy;

        Ok(StaticBuild {
            renderer: self.into_renderer()?,
            output_dir,
            assets_dir,
            policy,
        })
    }
}

pub struct StaticBuild {
    renderer: Renderer,
    output_dir: PathBuf,
    assets_dir: PathBuf,
    policy: RenderPolicy,
}

impl StaticBuild {
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render every page and post into a staging directory next to the
    /// output directory, then swap it into place. On error the staging
    /// directory is discarded and the previous output is left as it was.
    pub fn generate(&self) -> Result<BuildReport, BuildError> {
        let staging = sibling(&self.output_dir, "staging")?;
        remove_stale(&staging)?;

        let result = self
            .generate_into(&staging)
            .and_then(|report| self.commit(&staging).map(|_| report));

        if result.is_err() {
            if let Err(err) = remove_if_exists(&staging) {
                tracing::warn!(error = %err, "could not clean up staging directory");
            }
        }

        let report = result?;
        tracing::info!(
            output = %self.output_dir.display(),
            pages = report.pages,
            posts = report.posts,
            assets = report.assets,
            recovered = report.recovered.len(),
            "site generated"
        );

        Ok(report)
    }

    fn generate_into(&self, root: &Path) -> Result<BuildReport, BuildError> {
        let mut report = BuildReport::default();

        for page in PAGES {
            let rendered = self
                .renderer
                .render(RenderTarget::Page(page.kind), self.policy)?;
            if let Rendered::Recovered { reason, .. } = &rendered {
                report.recovered.push(reason.clone());
            }
            write_page(&page.output_file(root), rendered.html())?;
            report.pages += 1;
        }

        for post in self.renderer.registry() {
            let rendered = self.renderer.render(RenderTarget::Post(post), self.policy)?;
            if let Rendered::Recovered { reason, .. } = &rendered {
                report.recovered.push(reason.clone());
            }
            write_page(&post_output_file(root, &post.id), rendered.html())?;
            report.posts += 1;
        }

        if self.assets_dir.is_dir() {
            report.assets = copy_assets(&self.assets_dir, &root.join("assets"))?;
        } else {
            match self.policy {
                RenderPolicy::Strict => {
                    return Err(BuildError::MissingAssets(self.assets_dir.clone()));
                }
                RenderPolicy::Resilient => {
                    let reason =
                        format!("assets directory {} does not exist", self.assets_dir.display());
                    tracing::warn!(
                        assets = %self.assets_dir.display(),
                        "no assets directory, skipping copy"
                    );
                    report.recovered.push(reason);
                }
            }
        }

        Ok(report)
    }

    fn commit(&self, staging: &Path) -> Result<(), BuildError> {
        let previous = sibling(&self.output_dir, "previous")?;
        remove_stale(&previous)?;

        let moved_aside = self.output_dir.exists();
        if moved_aside {
            std::fs::rename(&self.output_dir, &previous)
                .map_err(BuildError::io("move aside", &self.output_dir))?;
        }

        if let Err(err) = std::fs::rename(staging, &self.output_dir) {
            if moved_aside {
                if let Err(restore) = std::fs::rename(&previous, &self.output_dir) {
                    tracing::error!(
                        previous = %previous.display(),
                        error = %restore,
                        "could not restore previous output"
                    );
                }
            }
            return Err(BuildError::io("move staging into", &self.output_dir)(err));
        }

        remove_if_exists(&previous)
    }
}

fn write_page(path: &Path, html: &str) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(BuildError::io("create directory", parent))?;
    }
    std::fs::write(path, html).map_err(BuildError::io("write", path))?;
    tracing::debug!(path = %path.display(), "wrote page");

    Ok(())
}

/// Verbatim recursive copy. Returns the number of files copied.
fn copy_assets(from: &Path, to: &Path) -> Result<usize, BuildError> {
    let mut copied = 0;
    for entry in WalkDir::new(from).sort_by_file_name() {
        let entry = entry.map_err(|err| BuildError::Io {
            action: "read assets in",
            path: from.to_path_buf(),
            source: err.into(),
        })?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|_| BuildError::InvalidOutput(entry.path().to_path_buf()))?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(BuildError::io("create directory", &target))?;
        } else {
            std::fs::copy(entry.path(), &target).map_err(BuildError::io("copy asset to", &target))?;
            copied += 1;
        }
    }

    Ok(copied)
}

fn sibling(dir: &Path, suffix: &str) -> Result<PathBuf, BuildError> {
    let name = dir
        .file_name()
        .ok_or_else(|| BuildError::InvalidOutput(dir.to_path_buf()))?;
    let mut sibling_name = name.to_os_string();
    sibling_name.push(format!(".{suffix}"));

    Ok(dir.with_file_name(sibling_name))
}

/// Removes a leftover from an interrupted build, saying so first since the
/// path may hold something the user put there.
fn remove_stale(dir: &Path) -> Result<(), BuildError> {
    if dir.exists() {
        tracing::warn!(path = %dir.display(), "removing leftover directory from an earlier build");
    }
    remove_if_exists(dir)
}

fn remove_if_exists(dir: &Path) -> Result<(), BuildError> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(BuildError::Io {
            action: "remove",
            path: dir.to_path_buf(),
            source: err,
        }),
    }
}
