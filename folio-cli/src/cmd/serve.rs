use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use folio_server::{ServerConfig, SiteServer};
use std::path::PathBuf;

use crate::cmd::build::add_site_args;
use crate::config::FolioConfig;
use crate::logging;

pub fn make_subcommand() -> Command {
    add_site_args(Command::new("serve"))
        .about("Serve the site, rendering pages on each request")
        .arg(
            Arg::new("port")
                .long("port")
                .value_name("PORT")
                .help("Port to serve on [default: 8000]"),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Host to bind to [default: 127.0.0.1]"),
        )
        .arg(
            Arg::new("open")
                .long("open")
                .help("Open browser automatically")
                .action(ArgAction::SetTrue),
        )
}

pub async fn execute(args: &ArgMatches) -> Result<()> {
    // Load cascading configuration
    let config = FolioConfig::load(args)?;
    logging::init(&config.build_config().log_level, args.get_flag("verbose"));

    let build_config = config.build_config();
    let server_config = ServerConfig {
        host: build_config.host.clone(),
        port: build_config.port,
        assets: PathBuf::from(&build_config.assets),
        open: build_config.open,
    };

    let renderer = config.site_builder()?.into_renderer()?;
    tracing::info!("Loaded {} posts", renderer.registry().len());

    SiteServer::new(server_config, renderer).run().await
}
