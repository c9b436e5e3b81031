pub(crate) mod alerts;
mod health;
pub(crate) mod helpers;
pub(crate) mod thresholds;

use anyhow::Result;
use clap::Subcommand;
use serde_json::json;

use crate::output::{banner, print_json, OutputMode};

#[derive(Subcommand)]
pub enum Commands {
    #[command(subcommand)]
    Alerts(alerts::AlertsCmd),
    #[command(subcommand)]
    Thresholds(thresholds::ThresholdsCmd),
    Health(health::HealthArgs),
    /// Client version and the server it is configured for.
    Version,
}

pub async fn run(opts: crate::Opts) -> Result<()> {
    let mode = opts.output_mode();
    let client = helpers::ApiClient::new(&opts.server, opts.token);
    match opts.cmd {
        Commands::Alerts(cmd) => alerts::execute(cmd, mode, &client).await,
        Commands::Thresholds(cmd) => thresholds::execute(cmd, mode, &client).await,
        Commands::Health(args) => health::execute(args, mode, &client).await,
        Commands::Version => version(mode, client.base()),
    }
}

fn version(mode: OutputMode, server: &str) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    match mode {
        OutputMode::Json => print_json(&json!({
            "name": "fleetwatch",
            "version": version,
            "server": server,
        })),
        OutputMode::Human => {
            banner::print_version_block(version, server);
            Ok(())
        }
    }
}
