use anyhow::{Context, Result};
use clap::ArgMatches;
use config::{Config as ConfigBuilder, Environment, File};
use folio_core::config::SiteConfig;
use folio_core::{PostRegistry, RenderPolicy, SiteBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Complete configuration that merges CLI args, env vars, config files, and defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FolioConfig {
    /// Build configuration
    pub build: BuildConfig,
    /// Site configuration (from folio-core)
    pub site: SiteConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuildConfig {
    /// Output directory for generated site
    pub output: String,
    /// Static assets copied to (or served from) `/assets/`
    pub assets: String,
    /// Theme directory overriding the built-in templates
    pub theme: String,
    /// Post registry file
    pub posts: String,
    /// Directory that post content paths are relative to
    pub content_root: String,
    /// Configuration file path
    pub config: String,
    /// Host for the server
    pub host: String,
    /// Port for the server
    pub port: u16,
    /// Open browser automatically
    pub open: bool,
    /// Write an error page for templates that fail instead of aborting
    pub keep_going: bool,
    /// Default log level when RUST_LOG is unset
    pub log_level: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output: "./dist".to_string(),
            assets: "./assets".to_string(),
            theme: "./theme".to_string(),
            posts: "./posts.toml".to_string(),
            content_root: ".".to_string(),
            config: "./folio.toml".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8000,
            open: false,
            keep_going: false,
            log_level: "info".to_string(),
        }
    }
}

/// CLI argument ids and the config keys they override.
const CLI_OVERRIDES: &[(&str, &str)] = &[
    ("output", "build.output"),
    ("assets", "build.assets"),
    ("theme", "build.theme"),
    ("posts", "build.posts"),
    ("content-root", "build.content_root"),
    ("config", "build.config"),
    ("host", "build.host"),
    ("port", "build.port"),
];

impl FolioConfig {
    /// Load configuration with cascading precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables (FOLIO_*)
    /// 3. Configuration file
    /// 4. Defaults (lowest priority)
    pub fn load(args: &ArgMatches) -> Result<Self> {
        let config_file = string_arg(args, "config")
            .unwrap_or_else(|| BuildConfig::default().config);

        let mut builder = ConfigBuilder::builder();

        // 1. Start with defaults
        let defaults = Self::default();
        builder = builder.add_source(ConfigBuilder::try_from(&defaults)?);

        // 2. Add configuration file if it exists
        if Path::new(&config_file).exists() {
            builder = builder.add_source(File::from(Path::new(&config_file)));
        }

        // 3. Add environment variables with FOLIO_ prefix
        builder = builder.add_source(
            Environment::with_prefix("FOLIO")
                .prefix_separator("_")
                .separator("__"), // Use double underscore for nested keys
        );

        // 4. Override with CLI arguments (highest priority)
        let mut cli_overrides = HashMap::new();
        for (arg, key) in CLI_OVERRIDES {
            if let Some(value) = string_arg(args, arg) {
                cli_overrides.insert(key.to_string(), value);
            }
        }
        for (flag, key) in [("open", "build.open"), ("keep-going", "build.keep_going")] {
            if flag_arg(args, flag) {
                cli_overrides.insert(key.to_string(), "true".to_string());
            }
        }

        if !cli_overrides.is_empty() {
            builder = builder.add_source(ConfigBuilder::try_from(&cli_overrides)?);
        }

        let config = builder
            .build()
            .with_context(|| format!("failed to load configuration from {config_file}"))?;
        let folio_config: FolioConfig = config.try_deserialize()?;

        Ok(folio_config)
    }

    /// Get the build configuration
    pub fn build_config(&self) -> &BuildConfig {
        &self.build
    }

    pub fn policy(&self) -> RenderPolicy {
        if self.build.keep_going {
            RenderPolicy::Resilient
        } else {
            RenderPolicy::Strict
        }
    }

    /// Read the post registry named by the configuration.
    pub fn registry(&self) -> Result<PostRegistry> {
        PostRegistry::load_or_builtin(&self.build.posts)
            .with_context(|| format!("failed to load posts from {}", self.build.posts))
    }

    /// A site builder carrying every configured path.
    pub fn site_builder(&self) -> Result<SiteBuilder> {
        Ok(SiteBuilder::new()
            .site_config(self.site.clone())
            .registry(self.registry()?)
            .output_dir(&self.build.output)
            .assets_dir(&self.build.assets)
            .theme_dir(&self.build.theme)
            .content_root(&self.build.content_root)
            .policy(self.policy()))
    }
}

// Subcommands define different args, so absent ids are not an error here.
fn string_arg(args: &ArgMatches, id: &str) -> Option<String> {
    args.try_get_one::<String>(id).ok().flatten().cloned()
}

fn flag_arg(args: &ArgMatches, id: &str) -> bool {
    args.try_get_one::<bool>(id)
        .ok()
        .flatten()
        .copied()
        .unwrap_or(false)
}
