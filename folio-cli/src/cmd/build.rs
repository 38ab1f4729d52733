use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::config::FolioConfig;
use crate::logging;

/// Arguments shared by `build` and `serve`. Defaults live in
/// [`crate::config::BuildConfig`] so that config files and env vars can
/// override them.
pub fn add_site_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("assets")
                .short('a')
                .long("assets")
                .value_name("DIR")
                .help("Static assets directory [default: ./assets]"),
        )
        .arg(
            Arg::new("theme")
                .short('t')
                .long("theme")
                .value_name("DIR")
                .help("Theme directory overriding built-in templates [default: ./theme]"),
        )
        .arg(
            Arg::new("posts")
                .short('p')
                .long("posts")
                .value_name("FILE")
                .help("Post registry; built-in posts are used if it does not exist [default: ./posts.toml]"),
        )
        .arg(
            Arg::new("content-root")
                .long("content-root")
                .value_name("DIR")
                .help("Directory post content paths are relative to [default: .]"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file [default: ./folio.toml]"),
        )
}

pub fn make_subcommand() -> Command {
    add_site_args(Command::new("build"))
        .about("Render every page and post to a static site")
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory for generated site [default: ./dist]"),
        )
        .arg(
            Arg::new("keep-going")
                .long("keep-going")
                .help("Write an error page for a failing template and skip missing assets instead of aborting")
                .action(ArgAction::SetTrue),
        )
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    // Load cascading configuration
    let config = FolioConfig::load(args)?;
    logging::init(&config.build_config().log_level, args.get_flag("verbose"));

    let build = config.site_builder()?.build()?;
    let report = build
        .generate()
        .with_context(|| format!("build of {} failed", build.output_dir().display()))?;

    for reason in &report.recovered {
        tracing::warn!("{}", reason);
    }
    tracing::info!(
        "Site built successfully in {} ({} pages, {} posts, {} assets)",
        build.output_dir().display(),
        report.pages,
        report.posts,
        report.assets
    );

    Ok(())
}
