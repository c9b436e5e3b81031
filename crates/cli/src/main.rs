mod cmd;
mod output;
#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use cmd::Commands;
use output::OutputMode;

#[derive(Parser)]
#[command(name = "fleetwatch", version, about = "FleetWatch alert pipeline CLI")]
pub struct Opts {
    #[clap(subcommand)]
    cmd: Commands,

    #[arg(long, global = true, help = "Output as JSON")]
    json: bool,

    #[arg(
        long,
        global = true,
        env = "FLEETWATCH_SERVER",
        default_value = cmd::helpers::DEFAULT_SERVER,
        help = "REST server base URL"
    )]
    server: String,

    #[arg(long, global = true, env = "FLEETWATCH_TOKEN", hide_env_values = true, help = "Bearer token")]
    token: Option<String>,
}

impl Opts {
    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let opts = Opts::parse();
    cmd::run(opts).await
}
